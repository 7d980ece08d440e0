//! Collaborators supplied by the presentation layer.
//!
//! [`FieldStore`] holds session fields as JSON values under string keys.
//! [`Navigator`] switches the rendered route and shows notices.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Well-known store keys.
pub mod keys {
    pub const SELECTION: &str = "sel_dotpoints";
    pub const PRACTICE: &str = "_fp";
    pub const AI_SUGGESTED: &str = "ai_suggested";

    pub fn review_removed(route_key: &str) -> String {
        format!("review:{route_key}:removed")
    }
}

/// Errors from store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to encode '{key}': {reason}")]
    Encode { key: String, reason: String },
    #[error("failed to decode '{key}': {reason}")]
    Decode { key: String, reason: String },
}

/// Session-scoped keyed storage.
pub trait FieldStore {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<bool, StoreError>;
    fn keys(&self) -> Vec<String>;
}

/// Serialize `value` into the store under `key`.
pub fn put<T: Serialize + ?Sized>(
    store: &mut dyn FieldStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let encoded = serde_json::to_value(value).map_err(|e| StoreError::Encode {
        key: key.to_string(),
        reason: e.to_string(),
    })?;
    store.set(key, encoded)
}

/// Read and deserialize `key`, `None` when absent.
pub fn fetch<T: DeserializeOwned>(
    store: &dyn FieldStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    match store.get(key) {
        None => Ok(None),
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|e| StoreError::Decode {
                key: key.to_string(),
                reason: e.to_string(),
            }),
    }
}

/// Read `key`, falling back to `T::default()` when absent.
pub fn fetch_or_default<T: DeserializeOwned + Default>(
    store: &dyn FieldStore,
    key: &str,
) -> Result<T, StoreError> {
    Ok(fetch(store, key)?.unwrap_or_default())
}

/// In-memory store for tests and single-tab sessions.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    fields: BTreeMap<String, Value>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FieldStore for InMemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.fields.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
        self.fields.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool, StoreError> {
        Ok(self.fields.remove(key).is_some())
    }

    fn keys(&self) -> Vec<String> {
        self.fields.keys().cloned().collect()
    }
}

/// Route names the core navigates to outside the practice stages.
pub mod routes {
    pub const HOME: &str = "home";
    pub const EXAM_MODE: &str = "exam_mode";
    pub const CRAM_REVIEW: &str = "cram_review";
    pub const CRAM_HOW: &str = "cram_how";
    pub const SRS_REVIEW: &str = "srs_review";
    pub const SRS_MENU: &str = "srs_menu";
    pub const AI_REVIEW: &str = "ai_review";
}

/// A user-visible message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "lowercase")]
pub enum Notice {
    Info(String),
    Success(String),
    Warning(String),
}

/// Switches which screen renders next.
pub trait Navigator {
    fn navigate(&mut self, route: &str);

    fn notify(&mut self, _notice: Notice) {}
}

/// Navigator that records every call, for tests and demos.
#[derive(Debug, Clone, Default)]
pub struct RecordingNavigator {
    pub routes: Vec<String>,
    pub notices: Vec<Notice>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&str> {
        self.routes.last().map(String::as_str)
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&mut self, route: &str) {
        self.routes.push(route.to_string());
    }

    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }
}
