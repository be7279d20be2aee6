use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::api::client::ApiClient;
use crate::api::{AuthService, DatabaseService, SessionEvents, StorageService};
use crate::storage::{SessionStore, TomlSessionStore};
use crate::utils::normalize_base_url;

pub const DEFAULT_AUTH_URL: &str = "https://identitytoolkit.googleapis.com/v1";
pub const DEFAULT_STORAGE_URL: &str = "https://firebasestorage.googleapis.com";

/// Backend project settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub database_url: String,
    #[serde(default)]
    pub storage_bucket: String,
    #[serde(default = "default_auth_url")]
    pub auth_url: String,
    #[serde(default = "default_storage_url")]
    pub storage_url: String,
}

fn default_auth_url() -> String {
    DEFAULT_AUTH_URL.to_string()
}

fn default_storage_url() -> String {
    DEFAULT_STORAGE_URL.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            database_url: String::new(),
            storage_bucket: String::new(),
            auth_url: default_auth_url(),
            storage_url: default_storage_url(),
        }
    }
}

/// Shape of the web-app config the Firebase console exports.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConsoleConfig {
    api_key: String,
    #[serde(rename = "databaseURL")]
    database_url: String,
    storage_bucket: String,
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    // TOML is the native format; a console-exported JSON file is imported
    // and rewritten as TOML the first time it is found.
    fn toml_path() -> Option<PathBuf> {
        let base = BaseDirs::new()?;
        Some(base.config_dir().join("talksy.toml"))
    }

    fn console_json_path() -> Option<PathBuf> {
        let proj = ProjectDirs::from("com", "example", "Talksy")?;
        Some(proj.config_dir().join("firebase.json"))
    }

    pub fn load() -> Self {
        if let Some(path) = Self::toml_path() {
            if let Some(config) = Self::load_from(&path) {
                return config;
            }
        }

        if let Some(json) = Self::console_json_path() {
            if let Some(config) = Self::import_console_json(&json) {
                if let Some(path) = Self::toml_path() {
                    if let Err(e) = config.save_to(&path) {
                        log::warn!("Failed to write {}: {}", path.display(), e);
                    }
                }
                return config;
            }
        }

        Self::new()
    }

    pub fn load_from(path: &Path) -> Option<Self> {
        let text = fs::read_to_string(path).ok()?;
        match toml::from_str::<AppConfig>(&text) {
            Ok(config) => Some(config.normalized()),
            Err(e) => {
                log::warn!("Ignoring invalid config {}: {}", path.display(), e);
                None
            }
        }
    }

    pub fn import_console_json(path: &Path) -> Option<Self> {
        let bytes = fs::read(path).ok()?;
        let console = serde_json::from_slice::<ConsoleConfig>(&bytes).ok()?;
        Some(
            Self {
                api_key: console.api_key,
                database_url: console.database_url,
                storage_bucket: console.storage_bucket,
                ..Self::default()
            }
            .normalized(),
        )
    }

    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let toml = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
        fs::write(path, toml)
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty() && !self.database_url.is_empty() && !self.storage_bucket.is_empty()
    }

    fn normalized(mut self) -> Self {
        self.database_url = normalize_base_url(&self.database_url);
        self.auth_url = normalize_base_url(&self.auth_url);
        self.storage_url = normalize_base_url(&self.storage_url);
        self
    }
}

/// The injected backend collaborators every screen controller draws from.
#[derive(Clone)]
pub struct Services {
    pub auth: Arc<dyn AuthService>,
    pub database: Arc<dyn DatabaseService>,
    pub storage: Arc<dyn StorageService>,
    pub session: Arc<dyn SessionStore>,
    pub events: SessionEvents,
}

impl Services {
    /// Wires the REST client against `config`, with the session persisted
    /// in the platform data directory.
    pub fn connect(config: AppConfig) -> Self {
        let session: Arc<dyn SessionStore> = match TomlSessionStore::default_path() {
            Some(path) => Arc::new(TomlSessionStore::open(path)),
            None => {
                log::warn!("No data directory available; session will not persist");
                Arc::new(crate::storage::MemorySessionStore::new())
            }
        };
        let client = Arc::new(ApiClient::new(config, session.clone()));
        Self {
            auth: client.clone(),
            database: client.clone(),
            storage: client,
            session,
            events: SessionEvents::new(),
        }
    }
}
