// Per-key coordination for on-demand resource creation

pub mod keyed_mutex;
pub mod materializer;
pub mod presence;

pub use keyed_mutex::{KeyedGuard, KeyedMutex};
pub use materializer::{CreateError, MaterializeError, Materializer};
pub use presence::{Presence, PresenceCache};
