// Task Domain Model

use std::fmt;

use serde::{Deserialize, Serialize};

use super::safe_path;

/// Job identifier (orchestrator namespace)
pub type JobId = String;

/// Task identifier: a job-wide ordinal plus a human-readable name.
///
/// Two on-disk forms derive from it and must not be conflated: the
/// `Display` form feeds results-pointer lookups (sanitized at the lookup
/// site with [`safe_path::to_safe_path`]), while [`TaskId::fs_name`]
/// names the task's own output directory under the job output root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId {
    uid: u64,
    name: String,
}

impl TaskId {
    pub fn new(uid: u64, name: impl Into<String>) -> Self {
        Self {
            uid,
            name: name.into(),
        }
    }

    pub fn uid(&self) -> u64 {
        self.uid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Filesystem-safe directory name, `<uid>-<name>` with unsafe
    /// characters replaced. The uid prefix survives truncation so long
    /// names cannot collide on their ordinal.
    pub fn fs_name(&self) -> String {
        let uid = self.uid.to_string();
        let room = safe_path::MAX_NAME_LEN.saturating_sub(uid.len() + 1);
        let name: String = safe_path::to_safe_path(&self.name)
            .chars()
            .take(room)
            .collect();
        if name.is_empty() {
            uid
        } else {
            format!("{uid}-{name}")
        }
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.uid, self.name)
    }
}

/// What a spawner actually launches: a command and its arguments.
/// Interpretation is backend-specific; the core only transports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Runnable {
    pub command: String,
    pub args: Vec<String>,
}

impl Runnable {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }
}

/// A unit of work with a stable identifier whose execution output is
/// captured to a directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub runnable: Runnable,
}

impl Task {
    pub fn new(id: TaskId, runnable: Runnable) -> Self {
        Self { id, runnable }
    }
}
