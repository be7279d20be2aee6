use directories::ProjectDirs;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

pub const EMAIL_KEY: &str = "email";
pub const NAME_KEY: &str = "name";
pub const PROFILE_PICTURE_URL_KEY: &str = "profile_picture_url";
pub const AUTH_UID_KEY: &str = "auth_uid";
pub const AUTH_EMAIL_KEY: &str = "auth_email";
pub const AUTH_ID_TOKEN_KEY: &str = "auth_id_token";

/// Persisted session identity, read and written as plain string keys.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> std::io::Result<()>;

    fn remove(&self, key: &str) -> std::io::Result<()>;
}

/// Session values kept in a flat TOML table on disk.
pub struct TomlSessionStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl TomlSessionStore {
    pub fn default_path() -> Option<PathBuf> {
        let proj = ProjectDirs::from("com", "example", "Talksy")?;
        Some(proj.data_dir().join("session.toml"))
    }

    /// Opens the store at `path`. A missing or unreadable file yields an
    /// empty session rather than an error.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = fs::read_to_string(&path)
            .ok()
            .and_then(|text| match toml::from_str::<BTreeMap<String, String>>(&text) {
                Ok(values) => Some(values),
                Err(e) => {
                    log::warn!("Ignoring unreadable session file {}: {}", path.display(), e);
                    None
                }
            })
            .unwrap_or_default();
        Self {
            path,
            values: Mutex::new(values),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, values: &BTreeMap<String, String>) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = toml::to_string(values)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
        fs::write(&self.path, text)
    }
}

impl SessionStore for TomlSessionStore {
    fn get(&self, key: &str) -> Option<String> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> std::io::Result<()> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value.to_string());
        self.persist(&values)
    }

    fn remove(&self, key: &str) -> std::io::Result<()> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        if values.remove(key).is_some() {
            self.persist(&values)?;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemorySessionStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values<'a>(values: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let values = values
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            values: Mutex::new(values),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> std::io::Result<()> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> std::io::Result<()> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.remove(key);
        Ok(())
    }
}

/// Writes a session value, logging instead of failing the calling flow.
pub fn store_or_warn(store: &dyn SessionStore, key: &str, value: &str) {
    if let Err(e) = store.set(key, value) {
        log::warn!("Failed to persist session key {}: {}", key, e);
    }
}

pub fn remove_or_warn(store: &dyn SessionStore, key: &str) {
    if let Err(e) = store.remove(key) {
        log::warn!("Failed to clear session key {}: {}", key, e);
    }
}
