//! Collaborator contracts for the managed backend.
//!
//! Screens never reach for a global backend handle; they receive these
//! traits as `Arc<dyn ...>` so tests can substitute scripted doubles.
//! Every returned future resolves exactly once with the call's outcome.

use async_trait::async_trait;
use url::Url;

use super::error::{AuthError, DbError, StorageError};
use super::models::{AppUser, Conversation, ConversationId, UserIdentity};

#[async_trait]
pub trait AuthService: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<UserIdentity, AuthError>;

    async fn sign_up(&self, email: &str, password: &str) -> Result<UserIdentity, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;

    fn current_user(&self) -> Option<UserIdentity>;
}

#[async_trait]
pub trait DatabaseService: Send + Sync {
    /// All conversations of the user stored under `user_key`.
    async fn get_all_conversations(&self, user_key: &str) -> Result<Vec<Conversation>, DbError>;

    /// Id of an existing conversation between the current user and `target_user_key`.
    async fn conversation_exists(&self, target_user_key: &str) -> Result<ConversationId, DbError>;

    async fn delete_conversation(&self, id: &str) -> bool;

    async fn insert_user(&self, user: &AppUser) -> bool;

    async fn user_exists(&self, email: &str) -> bool;
}

#[async_trait]
pub trait StorageService: Send + Sync {
    async fn upload_profile_picture(&self, data: Vec<u8>, file_name: &str)
    -> Result<Url, StorageError>;

    async fn download_url(&self, path: &str) -> Result<Url, StorageError>;
}
