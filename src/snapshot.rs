//! The whole persisted state: both task partitions

use serde::{Deserialize, Serialize};

use crate::task::Task;

/// Active and completed tasks, in display order.
///
/// This is what is written to the local store and exported. Persistence always overwrites a whole snapshot.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "SnapshotDocument")]
pub struct Snapshot {
    pub active: Vec<Task>,
    pub completed: Vec<Task>,
}

/// The shapes a snapshot document can have
#[derive(Deserialize)]
#[serde(untagged)]
enum SnapshotDocument {
    /// Early versions of the app stored a bare array of (active) tasks
    Legacy(Vec<Task>),
    Partitioned {
        #[serde(default)]
        active: Vec<Task>,
        #[serde(default)]
        completed: Vec<Task>,
    },
}

impl From<SnapshotDocument> for Snapshot {
    fn from(doc: SnapshotDocument) -> Self {
        match doc {
            SnapshotDocument::Legacy(active) => Self { active, completed: Vec::new() },
            SnapshotDocument::Partitioned { active, completed } => Self { active, completed },
        }
    }
}

impl Snapshot {
    pub fn new(active: Vec<Task>, completed: Vec<Task>) -> Self {
        Self { active, completed }
    }

    /// Total count of tasks, in both partitions
    pub fn len(&self) -> usize {
        self.active.len() + self.completed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decode a snapshot, in its current or its legacy shape
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Compact encoding, used for the local store
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
