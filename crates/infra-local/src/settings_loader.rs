// Settings adapter: optional TOML file overlaid with BROOD_* env vars

use std::collections::HashMap;
use std::path::PathBuf;

use config::{Config, Environment, File};

use brood_core::error::{Result, SpawnError};
use brood_core::port::{SettingsProvider, SettingsSnapshot};

/// Loads the process-wide settings snapshot.
///
/// Sources, later wins: an optional TOML file, then `BROOD_`-prefixed
/// environment variables with `__` as the section separator
/// (`BROOD_SPAWNER__PROCESS__TIMEOUT_MS=5000` maps to
/// `spawner.process.timeout_ms`). Nested sections flatten into the
/// dotted key form spawners look up.
pub struct FileSettings {
    path: Option<PathBuf>,
}

impl FileSettings {
    pub fn new(path: impl Into<Option<PathBuf>>) -> Self {
        Self { path: path.into() }
    }
}

impl SettingsProvider for FileSettings {
    fn snapshot(&self) -> Result<SettingsSnapshot> {
        let mut builder = Config::builder();
        if let Some(path) = &self.path {
            builder = builder.add_source(File::from(path.clone()).required(false));
        }
        let cfg = builder
            .add_source(
                Environment::with_prefix("BROOD")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| SpawnError::Config(e.to_string()))?;

        let tree: HashMap<String, serde_json::Value> = cfg
            .try_deserialize()
            .map_err(|e| SpawnError::Config(e.to_string()))?;

        let mut flat = HashMap::new();
        for (key, value) in tree {
            flatten(key, value, &mut flat);
        }
        Ok(SettingsSnapshot::new(flat))
    }
}

fn flatten(key: String, value: serde_json::Value, out: &mut HashMap<String, serde_json::Value>) {
    match value {
        serde_json::Value::Object(map) => {
            for (child, v) in map {
                flatten(format!("{key}.{child}"), v, out);
            }
        }
        leaf => {
            out.insert(key, leaf);
        }
    }
}
