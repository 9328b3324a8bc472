// Settings Snapshot Port
// The core never reads process-wide state; the composition root loads a
// snapshot through a SettingsProvider and injects it.

use std::collections::HashMap;

use crate::error::Result;

/// Immutable, opaque mapping of setting name to value.
///
/// Stored verbatim by spawners for their whole lifetime; validation of
/// individual settings is each backend's responsibility.
#[derive(Debug, Clone, Default)]
pub struct SettingsSnapshot(HashMap<String, serde_json::Value>);

impl SettingsSnapshot {
    pub fn new(values: HashMap<String, serde_json::Value>) -> Self {
        Self(values)
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|v| v.as_str())
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(|v| v.as_i64())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, serde_json::Value)> for SettingsSnapshot {
    fn from_iter<T: IntoIterator<Item = (String, serde_json::Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Settings source interface (file, environment or in-memory stores)
pub trait SettingsProvider: Send + Sync {
    /// Load a point-in-time snapshot of the settings store. Queried at
    /// construction time only; spawners never re-read settings.
    fn snapshot(&self) -> Result<SettingsSnapshot>;
}
