pub mod item_service;
pub mod user_sync;

pub use item_service::ItemService;
pub use user_sync::UserSync;
