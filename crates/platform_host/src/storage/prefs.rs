//! Lightweight preference storage contracts and adapters.
//!
//! Browser `localStorage` is synchronous with a finite quota, so this contract is synchronous as
//! well. Values are JSON text stored per key.

use std::{cell::RefCell, collections::HashMap, rc::Rc};

use serde::{de::DeserializeOwned, Serialize};

/// Host service for lightweight preference values (JSON stored as text per key).
pub trait PrefsStore {
    /// Loads a raw JSON string for a preference key.
    fn load_pref(&self, key: &str) -> Result<Option<String>, String>;

    /// Saves a raw JSON string for a preference key.
    fn save_pref(&self, key: &str, raw_json: &str) -> Result<(), String>;

    /// Deletes a preference key.
    fn delete_pref(&self, key: &str) -> Result<(), String>;
}

#[derive(Debug, Clone, Copy, Default)]
/// No-op preference store for unsupported targets and baseline tests.
pub struct NoopPrefsStore;

impl PrefsStore for NoopPrefsStore {
    fn load_pref(&self, _key: &str) -> Result<Option<String>, String> {
        Ok(None)
    }

    fn save_pref(&self, _key: &str, _raw_json: &str) -> Result<(), String> {
        Ok(())
    }

    fn delete_pref(&self, _key: &str) -> Result<(), String> {
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
/// In-memory preference store keyed by string, optionally bounded by a byte quota.
///
/// Clones share the same backing map, which lets tests keep a handle while the runtime owns
/// another.
pub struct MemoryPrefsStore {
    inner: Rc<RefCell<HashMap<String, String>>>,
    capacity_bytes: Option<usize>,
}

impl MemoryPrefsStore {
    /// Creates a store that rejects writes once keys plus values exceed `capacity_bytes`.
    pub fn with_capacity(capacity_bytes: usize) -> Self {
        Self {
            inner: Rc::default(),
            capacity_bytes: Some(capacity_bytes),
        }
    }

    /// Returns the number of bytes currently used by keys and values.
    pub fn used_bytes(&self) -> usize {
        self.inner
            .borrow()
            .iter()
            .map(|(key, value)| key.len() + value.len())
            .sum()
    }

    /// Returns the stored keys in sorted order.
    pub fn keys(&self) -> Vec<String> {
        let mut keys = self.inner.borrow().keys().cloned().collect::<Vec<_>>();
        keys.sort();
        keys
    }
}

impl PrefsStore for MemoryPrefsStore {
    fn load_pref(&self, key: &str) -> Result<Option<String>, String> {
        Ok(self.inner.borrow().get(key).cloned())
    }

    fn save_pref(&self, key: &str, raw_json: &str) -> Result<(), String> {
        if let Some(capacity) = self.capacity_bytes {
            let replaced = self
                .inner
                .borrow()
                .get(key)
                .map(|old| key.len() + old.len())
                .unwrap_or(0);
            let projected = self.used_bytes() - replaced + key.len() + raw_json.len();
            if projected > capacity {
                return Err(format!(
                    "prefs quota exceeded writing `{key}` ({projected} > {capacity} bytes)"
                ));
            }
        }
        self.inner
            .borrow_mut()
            .insert(key.to_string(), raw_json.to_string());
        Ok(())
    }

    fn delete_pref(&self, key: &str) -> Result<(), String> {
        self.inner.borrow_mut().remove(key);
        Ok(())
    }
}

/// Loads and deserializes a typed preference value through a [`PrefsStore`] implementation.
///
/// # Errors
///
/// Returns an error when the store or JSON deserialization fails.
pub fn load_pref_with<S: PrefsStore + ?Sized, T: DeserializeOwned>(
    store: &S,
    key: &str,
) -> Result<Option<T>, String> {
    let Some(raw) = store.load_pref(key)? else {
        return Ok(None);
    };
    let value = serde_json::from_str(&raw).map_err(|e| format!("`{key}`: {e}"))?;
    Ok(Some(value))
}

/// Serializes and saves a typed preference value through a [`PrefsStore`] implementation.
///
/// # Errors
///
/// Returns an error when serialization or store save fails.
pub fn save_pref_with<S: PrefsStore + ?Sized, T: Serialize + ?Sized>(
    store: &S,
    key: &str,
    value: &T,
) -> Result<(), String> {
    let raw = serde_json::to_string(value).map_err(|e| e.to_string())?;
    store.save_pref(key, &raw)
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct PrefThing {
        show_icons: bool,
    }

    #[test]
    fn memory_prefs_store_round_trip_and_delete() {
        let store = MemoryPrefsStore::default();
        let store_obj: &dyn PrefsStore = &store;

        store_obj.save_pref("pref.key", "{\"k\":1}").expect("save");
        assert_eq!(
            store_obj.load_pref("pref.key").expect("load"),
            Some("{\"k\":1}".to_string())
        );
        store_obj.delete_pref("pref.key").expect("delete");
        assert_eq!(store_obj.load_pref("pref.key").expect("load"), None);
    }

    #[test]
    fn typed_pref_helpers_round_trip() {
        let store = MemoryPrefsStore::default();
        let store_obj: &dyn PrefsStore = &store;
        save_pref_with(store_obj, "desktop", &PrefThing { show_icons: true })
            .expect("save typed pref");

        let loaded: Option<PrefThing> =
            load_pref_with(store_obj, "desktop").expect("load typed pref");
        assert_eq!(loaded, Some(PrefThing { show_icons: true }));
    }

    #[test]
    fn typed_load_reports_malformed_json_with_key() {
        let store = MemoryPrefsStore::default();
        store.save_pref("broken", "{not json").expect("save raw");
        let err = load_pref_with::<_, PrefThing>(&store, "broken").expect_err("malformed");
        assert!(err.contains("broken"));
    }

    #[test]
    fn bounded_store_rejects_writes_over_quota_and_keeps_old_value() {
        let store = MemoryPrefsStore::with_capacity(16);
        store.save_pref("k", "\"short\"").expect("fits");
        let err = store
            .save_pref("k", "\"this value is far too long\"")
            .expect_err("over quota");
        assert!(err.contains("quota"));
        assert_eq!(store.load_pref("k").expect("load"), Some("\"short\"".to_string()));

        // Replacing a value only counts the delta against the quota.
        store.save_pref("k", "\"shorter!\"").expect("replacement fits");
        assert_eq!(store.used_bytes(), 1 + "\"shorter!\"".len());
    }

    #[test]
    fn clones_share_backing_storage() {
        let store = MemoryPrefsStore::default();
        let handle = store.clone();
        store.save_pref("theme", "\"dark\"").expect("save");
        assert_eq!(handle.keys(), vec!["theme".to_string()]);
    }

    #[test]
    fn noop_prefs_store_is_empty_and_successful() {
        let store = NoopPrefsStore;
        let store_obj: &dyn PrefsStore = &store;
        assert_eq!(store_obj.load_pref("k").expect("load"), None);
        store_obj.save_pref("k", "{}").expect("save");
        store_obj.delete_pref("k").expect("delete");
    }
}
