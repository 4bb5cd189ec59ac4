//! Persisted session values (tokens, cached profile, cached staff list).
//!
//! The store is a flat string map under fixed keys. Nothing is validated on
//! write; readers that decode a value fail soft and treat garbage as absent.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::{Context, Result};
use platera_types::{Role, UserProfile};

use crate::config::paths;

/// Fixed storage keys.
pub mod keys {
    pub const ACCESS_TOKEN: &str = "access_token";
    pub const REFRESH_TOKEN: &str = "refresh_token";
    pub const USER: &str = "user";
    pub const USER_TYPE: &str = "user_type";
    pub const MANAGER_TOKEN: &str = "manager_token";
    pub const STAFF_LIST: &str = "staff_list";

    /// Everything removed when a session ends.
    pub const SESSION: &[&str] = &[
        ACCESS_TOKEN,
        REFRESH_TOKEN,
        USER,
        USER_TYPE,
        MANAGER_TOKEN,
    ];
}

/// Session file name inside `PLATERA_HOME`.
const SESSION_FILE: &str = "session.json";

/// Key-value holder for session state.
///
/// Implementations synchronize internally; all methods take `&self`.
pub trait TokenStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn clear(&self, keys: &[&str]);

    /// Removes every session key (tokens, profile, role markers).
    fn clear_session(&self) {
        self.clear(keys::SESSION);
    }
}

pub fn access_token(store: &dyn TokenStore) -> Option<String> {
    store.get(keys::ACCESS_TOKEN).filter(|t| !t.is_empty())
}

pub fn refresh_token(store: &dyn TokenStore) -> Option<String> {
    store.get(keys::REFRESH_TOKEN).filter(|t| !t.is_empty())
}

/// Stores a fresh token pair.
pub fn store_tokens(store: &dyn TokenStore, access: &str, refresh: &str) {
    store.set(keys::ACCESS_TOKEN, access);
    store.set(keys::REFRESH_TOKEN, refresh);
}

/// Reads the cached profile. A blob that does not decode counts as absent.
pub fn cached_user(store: &dyn TokenStore) -> Option<UserProfile> {
    let raw = store.get(keys::USER)?;
    match serde_json::from_str(&raw) {
        Ok(user) => Some(user),
        Err(err) => {
            tracing::warn!(error = %err, "ignoring unreadable cached user profile");
            None
        }
    }
}

/// Caches the profile and its lower-case role marker.
pub fn store_user(store: &dyn TokenStore, user: &UserProfile) {
    match serde_json::to_string(user) {
        Ok(json) => store.set(keys::USER, &json),
        Err(err) => tracing::warn!(error = %err, "failed to serialize user profile"),
    }
    if user.role != Role::Unknown {
        store.set(keys::USER_TYPE, &user.role.id().to_ascii_lowercase());
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-process store; contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        lock(&self.values).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TokenStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.values).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        lock(&self.values).insert(key.to_string(), value.to_string());
    }

    fn clear(&self, keys: &[&str]) {
        let mut values = lock(&self.values);
        for key in keys {
            values.remove(*key);
        }
    }
}

/// Store persisted as a JSON object at `<PLATERA_HOME>/session.json`.
///
/// The file is written with 0600 permissions on unix. Every mutation rewrites
/// the whole file; write failures are logged and otherwise ignored.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: Mutex<HashMap<String, String>>,
}

impl FileStore {
    /// Returns the default session file path.
    pub fn default_path() -> PathBuf {
        paths::platera_home().join(SESSION_FILE)
    }

    /// Opens the default session file.
    pub fn open_default() -> Self {
        Self::open(Self::default_path())
    }

    /// Opens a session file. Missing or unreadable files start empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match load_map(&path) {
            Ok(values) => values,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "starting with empty session store");
                HashMap::new()
            }
        };
        Self {
            path,
            values: Mutex::new(values),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, values: &HashMap<String, String>) {
        if let Err(err) = save_map(&self.path, values) {
            tracing::warn!(path = %self.path.display(), error = %err, "failed to persist session store");
        }
    }
}

impl TokenStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.values).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut values = lock(&self.values);
        values.insert(key.to_string(), value.to_string());
        self.persist(&values);
    }

    fn clear(&self, keys: &[&str]) {
        let mut values = lock(&self.values);
        let before = values.len();
        for key in keys {
            values.remove(*key);
        }
        if values.len() != before {
            self.persist(&values);
        }
    }
}

fn load_map(path: &Path) -> Result<HashMap<String, String>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read session store from {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse session store from {}", path.display()))
}

fn save_map(path: &Path, values: &HashMap<String, String>) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let contents =
        serde_json::to_string_pretty(values).context("Failed to serialize session store")?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .with_context(|| format!("Failed to open {} for writing", path.display()))?;
        file.write_all(contents.as_bytes())
            .with_context(|| format!("Failed to write to {}", path.display()))?;
    }

    #[cfg(not(unix))]
    {
        fs::write(path, contents)
            .with_context(|| format!("Failed to write to {}", path.display()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    fn manager() -> UserProfile {
        serde_json::from_str(r#"{"id":1,"username":"mgr","user_type":"MANAGER"}"#).unwrap()
    }

    #[test]
    fn test_memory_store_get_set_clear() {
        let store = MemoryStore::new();
        store_tokens(&store, "a1", "r1");
        assert_eq!(access_token(&store).as_deref(), Some("a1"));
        assert_eq!(refresh_token(&store).as_deref(), Some("r1"));

        store.clear(&[keys::ACCESS_TOKEN]);
        assert!(access_token(&store).is_none());
        assert!(refresh_token(&store).is_some());
    }

    #[test]
    fn test_empty_token_counts_as_absent() {
        let store = MemoryStore::new();
        store.set(keys::ACCESS_TOKEN, "");
        assert!(access_token(&store).is_none());
    }

    #[test]
    fn test_corrupt_user_blob_reads_as_absent() {
        let store = MemoryStore::new();
        store.set(keys::USER, "{not json");
        assert!(cached_user(&store).is_none());
        store.set(keys::USER, r#"{"username":"no id"}"#);
        assert!(cached_user(&store).is_none());
    }

    #[test]
    fn test_store_user_writes_role_marker() {
        let store = MemoryStore::new();
        store_user(&store, &manager());
        assert_eq!(store.get(keys::USER_TYPE).as_deref(), Some("manager"));
        assert_eq!(cached_user(&store).unwrap().username, "mgr");
    }

    #[test]
    fn test_clear_session_keeps_staff_cache() {
        let store = MemoryStore::new();
        store_tokens(&store, "a", "r");
        store_user(&store, &manager());
        store.set(keys::MANAGER_TOKEN, "m");
        store.set(keys::STAFF_LIST, "[]");

        store.clear_session();

        assert_eq!(store.len(), 1);
        assert_eq!(store.get(keys::STAFF_LIST).as_deref(), Some("[]"));
    }

    #[test]
    fn test_file_store_persists_across_opens() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let store = FileStore::open(&path);
        store_tokens(&store, "access", "refresh");
        drop(store);

        let reopened = FileStore::open(&path);
        assert_eq!(access_token(&reopened).as_deref(), Some("access"));

        reopened.clear_session();
        let again = FileStore::open(&path);
        assert!(access_token(&again).is_none());
    }

    #[test]
    fn test_file_store_corrupt_file_starts_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "garbage").unwrap();

        let store = FileStore::open(&path);
        assert!(access_token(&store).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_file_store_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = FileStore::open(&path);
        store.set(keys::ACCESS_TOKEN, "a");

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
