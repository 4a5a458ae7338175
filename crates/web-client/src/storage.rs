//! Client-persisted session: a login flag and a display name under fixed keys.

use std::collections::HashMap;

pub const LOGGED_IN_KEY: &str = "userLoggedIn";
pub const USER_NAME_KEY: &str = "userName";

/// String key/value storage that survives page reloads.
pub trait SessionStorage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

/// In-memory [`SessionStorage`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_owned(), value.to_owned());
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub logged_in: bool,
    pub display_name: Option<String>,
}

impl Session {
    pub fn signed_in(display_name: impl Into<String>) -> Self {
        Self {
            logged_in: true,
            display_name: Some(display_name.into()),
        }
    }

    /// Only the exact value `"true"` counts as logged in.
    pub fn load(storage: &impl SessionStorage) -> Self {
        let logged_in = storage.get(LOGGED_IN_KEY).as_deref() == Some("true");
        Self {
            logged_in,
            display_name: logged_in.then(|| storage.get(USER_NAME_KEY)).flatten(),
        }
    }

    pub fn persist(&self, storage: &mut impl SessionStorage) {
        if !self.logged_in {
            Self::clear(storage);
            return;
        }
        storage.set(LOGGED_IN_KEY, "true");
        if let Some(name) = &self.display_name {
            storage.set(USER_NAME_KEY, name);
        }
    }

    pub fn clear(storage: &mut impl SessionStorage) {
        storage.remove(LOGGED_IN_KEY);
        storage.remove(USER_NAME_KEY);
    }
}
