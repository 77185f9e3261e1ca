pub mod items;
pub mod manager;
pub mod outbox;
pub mod users;

pub use items::{ItemRepository, ItemStore};
pub use manager::{DatabaseError, DatabaseManager};
pub use outbox::{EventDispatcher, LoggingDispatcher};
pub use users::{UserDirectory, UserRepository};
