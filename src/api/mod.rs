pub mod client;
pub mod error;
pub mod events;
pub mod models;
pub mod service;

pub use error::{AuthError, DbError, StorageError};
pub use events::{SessionEvent, SessionEvents};
pub use models::{AppUser, Conversation, ConversationId, LatestMessage, UserIdentity};
pub use service::{AuthService, DatabaseService, StorageService};
