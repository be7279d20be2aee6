use async_trait::async_trait;
use reqwest::Client as HttpClient;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::api::error::{AuthError, DbError, StorageError};
use crate::api::models::{AppUser, Conversation, ConversationId, UserIdentity};
use crate::api::service::{AuthService, DatabaseService, StorageService};
use crate::app::AppConfig;
use crate::storage::{
    AUTH_EMAIL_KEY, AUTH_ID_TOKEN_KEY, AUTH_UID_KEY, SessionStore, remove_or_warn,
};
use crate::utils::safe_email;

/// REST client for the Firebase project described by [`AppConfig`].
///
/// The signed-in identity and its id token live in the session store so a
/// restarted client is still signed in.
pub struct ApiClient {
    http: HttpClient,
    config: AppConfig,
    session: Arc<dyn SessionStore>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordAuthResponse {
    local_id: String,
    email: String,
    id_token: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectMetadata {
    #[serde(default)]
    download_tokens: Option<String>,
}

impl ApiClient {
    pub fn new(config: AppConfig, session: Arc<dyn SessionStore>) -> Self {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_else(|_| HttpClient::new());
        Self {
            http,
            config,
            session,
        }
    }

    fn id_token(&self) -> Option<String> {
        self.session.get(AUTH_ID_TOKEN_KEY)
    }

    /// Forgets the stored identity after the backend rejected its token, so
    /// `current_user` reports nobody and screens send the user to sign-in.
    fn expire_session(&self) {
        log::info!("Id token rejected; signing out");
        for key in [AUTH_ID_TOKEN_KEY, AUTH_UID_KEY, AUTH_EMAIL_KEY] {
            remove_or_warn(self.session.as_ref(), key);
        }
    }

    fn current_user_key(&self) -> Option<String> {
        self.session.get(AUTH_EMAIL_KEY).map(|email| safe_email(&email))
    }

    async fn password_auth(
        &self,
        action: &str,
        email: &str,
        password: &str,
    ) -> Result<UserIdentity, AuthError> {
        let endpoint = format!(
            "{}/accounts:{}?key={}",
            self.config.auth_url, action, self.config.api_key
        );
        let body = serde_json::json!({
            "email": email,
            "password": password,
            "returnSecureToken": true,
        });
        log::debug!("auth request: {}", action);
        let resp = self.http.post(&endpoint).json(&body).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let code = serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| format!("HTTP {}", status));
            return Err(AuthError::from_code(&code));
        }
        let auth: PasswordAuthResponse = resp
            .json()
            .await
            .map_err(|e| AuthError::Rejected(e.to_string()))?;
        self.remember(&auth)?;
        Ok(UserIdentity {
            uid: auth.local_id,
            email: auth.email,
        })
    }

    fn remember(&self, auth: &PasswordAuthResponse) -> Result<(), AuthError> {
        let persist = |key: &str, value: &str| {
            self.session
                .set(key, value)
                .map_err(|e| AuthError::Rejected(format!("failed to persist session: {}", e)))
        };
        persist(AUTH_UID_KEY, &auth.local_id)?;
        persist(AUTH_EMAIL_KEY, &auth.email)?;
        persist(AUTH_ID_TOKEN_KEY, &auth.id_token)
    }

    /// `{database_url}/{path}.json`, each path segment percent-encoded.
    fn database_endpoint(&self, path: &str) -> Result<Url, DbError> {
        let mut url = Url::parse(&self.config.database_url)
            .map_err(|e| DbError::Malformed(format!("database url: {}", e)))?;
        let json_path = format!("{}.json", path);
        url.path_segments_mut()
            .map_err(|_| DbError::Malformed("database url cannot take a path".into()))?
            .pop_if_empty()
            .extend(json_path.split('/'));
        if let Some(token) = self.id_token() {
            url.query_pairs_mut().append_pair("auth", &token);
        }
        Ok(url)
    }

    fn check_db_status(&self, status: StatusCode) -> Result<(), DbError> {
        if status == StatusCode::UNAUTHORIZED {
            self.expire_session();
            return Err(DbError::Unauthorized);
        }
        if !status.is_success() {
            return Err(DbError::Network(format!("HTTP {}", status)));
        }
        Ok(())
    }

    async fn db_get(&self, path: &str) -> Result<Value, DbError> {
        log::debug!("database read: {}", path);
        let resp = self.http.get(self.database_endpoint(path)?).send().await?;
        self.check_db_status(resp.status())?;
        resp.json::<Value>()
            .await
            .map_err(|e| DbError::Malformed(e.to_string()))
    }

    async fn db_put(&self, path: &str, value: &Value) -> Result<(), DbError> {
        log::debug!("database write: {}", path);
        let resp = self
            .http
            .put(self.database_endpoint(path)?)
            .json(value)
            .send()
            .await?;
        self.check_db_status(resp.status())
    }

    async fn remove_conversation_entry(&self, path: &str, id: &str) -> Result<(), DbError> {
        let mut entries = match self.db_get(path).await? {
            Value::Null => return Err(DbError::NotFound),
            value => collection_entries(value)?,
        };
        let before = entries.len();
        entries.retain(|entry| entry.get("id").and_then(Value::as_str) != Some(id));
        if entries.len() == before {
            return Err(DbError::NotFound);
        }
        self.db_put(path, &Value::Array(entries)).await
    }

    async fn try_insert_user(&self, user: &AppUser) -> Result<(), DbError> {
        let key = user.safe_email();
        let record = serde_json::json!({
            "first_name": user.first_name,
            "last_name": user.last_name,
        });
        self.db_put(&key, &record).await?;

        let mut users = match self.db_get("users").await? {
            Value::Null => Vec::new(),
            value => collection_entries(value)?,
        };
        users.push(serde_json::json!({
            "name": user.full_name(),
            "email": key,
        }));
        self.db_put("users", &Value::Array(users)).await
    }

    fn object_endpoint(&self, path: &str) -> String {
        format!(
            "{}/v0/b/{}/o/{}",
            self.config.storage_url,
            self.config.storage_bucket,
            encode_component(path)
        )
    }

    fn check_storage_status(&self, status: StatusCode) -> Result<(), StorageError> {
        if status == StatusCode::UNAUTHORIZED {
            self.expire_session();
            return Err(StorageError::Unauthorized);
        }
        Ok(())
    }

    fn with_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.id_token() {
            Some(token) => req.header(AUTHORIZATION, format!("Firebase {}", token)),
            None => req,
        }
    }
}

/// Realtime Database returns arrays as objects once they become sparse.
fn collection_entries(value: Value) -> Result<Vec<Value>, DbError> {
    match value {
        Value::Array(items) => Ok(items.into_iter().filter(|v| !v.is_null()).collect()),
        Value::Object(map) => Ok(map.into_iter().map(|(_, v)| v).collect()),
        other => Err(DbError::Malformed(format!("expected a collection, got {}", other))),
    }
}

fn decode_conversations(value: Value) -> Result<Vec<Conversation>, DbError> {
    if value.is_null() {
        return Err(DbError::NotFound);
    }
    let conversations = collection_entries(value)?
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<Conversation>(entry) {
            Ok(conversation) => Some(conversation),
            Err(e) => {
                log::warn!("Skipping malformed conversation: {}", e);
                None
            }
        })
        .collect();
    Ok(conversations)
}

fn encode_component(input: &str) -> String {
    url::form_urlencoded::byte_serialize(input.as_bytes()).collect()
}

#[async_trait]
impl AuthService for ApiClient {
    async fn sign_in(&self, email: &str, password: &str) -> Result<UserIdentity, AuthError> {
        self.password_auth("signInWithPassword", email, password).await
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<UserIdentity, AuthError> {
        self.password_auth("signUp", email, password).await
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        for key in [AUTH_ID_TOKEN_KEY, AUTH_UID_KEY, AUTH_EMAIL_KEY] {
            self.session
                .remove(key)
                .map_err(|e| AuthError::Rejected(format!("failed to clear session: {}", e)))?;
        }
        Ok(())
    }

    fn current_user(&self) -> Option<UserIdentity> {
        Some(UserIdentity {
            uid: self.session.get(AUTH_UID_KEY)?,
            email: self.session.get(AUTH_EMAIL_KEY)?,
        })
    }
}

#[async_trait]
impl DatabaseService for ApiClient {
    async fn get_all_conversations(&self, user_key: &str) -> Result<Vec<Conversation>, DbError> {
        let value = self.db_get(&format!("{}/conversations", user_key)).await?;
        decode_conversations(value)
    }

    async fn conversation_exists(&self, target_user_key: &str) -> Result<ConversationId, DbError> {
        let me = self.current_user_key().ok_or(DbError::NotFound)?;
        let value = self
            .db_get(&format!("{}/conversations", target_user_key))
            .await?;
        decode_conversations(value)?
            .into_iter()
            .find(|c| c.other_user_email == me)
            .map(|c| c.id)
            .ok_or(DbError::NotFound)
    }

    async fn delete_conversation(&self, id: &str) -> bool {
        let Some(me) = self.current_user_key() else {
            log::warn!("Cannot delete conversation {}: not signed in", id);
            return false;
        };
        match self
            .remove_conversation_entry(&format!("{}/conversations", me), id)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Failed to delete conversation {}: {}", id, e);
                false
            }
        }
    }

    async fn insert_user(&self, user: &AppUser) -> bool {
        match self.try_insert_user(user).await {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Failed to insert user {}: {}", user.safe_email(), e);
                false
            }
        }
    }

    async fn user_exists(&self, email: &str) -> bool {
        match self.db_get(&safe_email(email)).await {
            Ok(value) => !value.is_null(),
            Err(e) => {
                log::warn!("User lookup failed: {}", e);
                false
            }
        }
    }
}

#[async_trait]
impl StorageService for ApiClient {
    async fn upload_profile_picture(
        &self,
        data: Vec<u8>,
        file_name: &str,
    ) -> Result<Url, StorageError> {
        let path = format!("images/{}", file_name);
        let endpoint = format!(
            "{}/v0/b/{}/o?uploadType=media&name={}",
            self.config.storage_url,
            self.config.storage_bucket,
            encode_component(&path)
        );
        let req = self
            .http
            .post(&endpoint)
            .header(CONTENT_TYPE, "image/png")
            .body(data);
        let resp = self.with_auth(req).send().await?;
        self.check_storage_status(resp.status())?;
        if !resp.status().is_success() {
            return Err(StorageError::UploadFailed(format!("HTTP {}", resp.status())));
        }
        self.download_url(&path).await
    }

    async fn download_url(&self, path: &str) -> Result<Url, StorageError> {
        let endpoint = self.object_endpoint(path);
        let resp = self.with_auth(self.http.get(&endpoint)).send().await?;
        self.check_storage_status(resp.status())?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(StorageError::NotFound);
        }
        if !resp.status().is_success() {
            return Err(StorageError::Network(format!("HTTP {}", resp.status())));
        }
        let meta: ObjectMetadata = resp
            .json()
            .await
            .map_err(|e| StorageError::Network(e.to_string()))?;
        let token = meta
            .download_tokens
            .as_deref()
            .and_then(|tokens| tokens.split(',').next())
            .filter(|token| !token.is_empty())
            .ok_or(StorageError::NotFound)?;
        let mut url = Url::parse(&endpoint).map_err(|e| StorageError::Network(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("alt", "media")
            .append_pair("token", token);
        Ok(url)
    }
}
