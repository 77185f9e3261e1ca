pub mod list;
pub mod me;
pub mod show;

// Re-export handler functions for use in routing
pub use list::user_list;
pub use me::user_me;
pub use show::user_show;
