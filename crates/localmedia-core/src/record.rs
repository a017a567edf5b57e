//! Record store seam.
//!
//! The pipeline never talks to a schema or ORM directly; it reads and writes
//! field values through [`RecordStore`]. The orchestrators are the sole
//! writers after a hook chain completes. [`MemoryRecord`] is a shipped
//! in-process implementation, also used throughout the tests.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Opaque key-value attachment store on the owning record.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Read the current value at a field path.
    fn get(&self, field_path: &str) -> Option<Value>;

    /// Replace the value at a field path.
    fn set(&mut self, field_path: &str, value: Value);

    /// Whether the field has been written since the last save.
    fn is_modified(&self, field_path: &str) -> bool;

    /// Persist pending changes.
    async fn save(&mut self) -> anyhow::Result<()>;
}

/// Shared handle to a record. Hooks and orchestrators for one operation run
/// sequentially, so the lock is only ever briefly contended.
pub type RecordHandle = Arc<Mutex<dyn RecordStore>>;

/// In-memory record store.
#[derive(Debug, Default)]
pub struct MemoryRecord {
    values: HashMap<String, Value>,
    modified: HashSet<String>,
    save_count: usize,
}

impl MemoryRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(self) -> RecordHandle {
        Arc::new(Mutex::new(self))
    }

    /// Number of completed saves, for inspection in tests.
    pub fn save_count(&self) -> usize {
        self.save_count
    }
}

#[async_trait]
impl RecordStore for MemoryRecord {
    fn get(&self, field_path: &str) -> Option<Value> {
        self.values.get(field_path).cloned()
    }

    fn set(&mut self, field_path: &str, value: Value) {
        self.values.insert(field_path.to_string(), value);
        self.modified.insert(field_path.to_string());
    }

    fn is_modified(&self, field_path: &str) -> bool {
        self.modified.contains(field_path)
    }

    async fn save(&mut self) -> anyhow::Result<()> {
        self.modified.clear();
        self.save_count += 1;
        Ok(())
    }
}
