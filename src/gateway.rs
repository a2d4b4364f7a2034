//! The persistence gateway: loads the initial snapshot and persists every change
//!
//! Persistence is best-effort. Failures are logged using the `log::*` macros and never reach the caller:
//! the in-memory store remains the source of truth, and a failed write only risks losing the last change on restart.

use crate::config;
use crate::snapshot::Snapshot;
use crate::traits::{FallbackSource, KeyValueStore};

/// Where a loaded snapshot comes from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadSource {
    /// The local key-value store
    Local,
    /// The fallback document, because the local store held nothing usable
    Fallback,
    /// Neither source provided anything: the snapshot is empty
    Nothing,
}

/// What happened during [`Gateway::load_with_report`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadReport {
    pub source: LoadSource,
    /// False if reading the local store failed. What it holds is unknown, so it should not be overwritten
    pub local_readable: bool,
}

enum LocalRead {
    Found(Snapshot),
    /// Nothing, or nothing that can be decoded
    Missing,
    Unreadable,
}

/// Combines a local key-value store with a read-only fallback document
#[derive(Debug)]
pub struct Gateway<K, F>
where
    K: KeyValueStore,
    F: FallbackSource,
{
    /// Where snapshots are persisted
    local: K,
    /// Only read when `local` holds nothing
    fallback: F,
    /// The key `local` stores the snapshot under
    key: String,
}

impl<K, F> Gateway<K, F>
where
    K: KeyValueStore,
    F: FallbackSource,
{
    /// Create a gateway that uses the configured [`STORAGE_KEY`](crate::config::STORAGE_KEY)
    pub fn new(local: K, fallback: F) -> Self {
        Self::with_key(local, fallback, config::storage_key())
    }

    pub fn with_key(local: K, fallback: F, key: String) -> Self {
        Self { local, fallback, key }
    }

    /// Returns the local key-value store
    pub fn local(&self) -> &K { &self.local }
    /// Returns the local key-value store
    pub fn local_mut(&mut self) -> &mut K { &mut self.local }
    pub fn fallback(&self) -> &F { &self.fallback }
    pub fn key(&self) -> &str { &self.key }

    /// Load the initial snapshot.
    ///
    /// The local store is tried first, then the fallback document. If both fail, this returns an empty snapshot.
    pub async fn load(&self) -> Snapshot {
        self.load_with_report().await.0
    }

    /// Same as [`Self::load`], but also tells where the snapshot comes from, and whether the local store could be read
    pub async fn load_with_report(&self) -> (Snapshot, LoadReport) {
        let local_readable = match self.load_local() {
            LocalRead::Found(snapshot) => {
                return (snapshot, LoadReport { source: LoadSource::Local, local_readable: true });
            },
            LocalRead::Missing => true,
            LocalRead::Unreadable => false,
        };

        let content = match self.fallback.fetch().await {
            Err(err) => {
                log::warn!("Unable to fetch the fallback document: {}. Starting with an empty task list", err);
                return (Snapshot::default(), LoadReport { source: LoadSource::Nothing, local_readable });
            },
            Ok(content) => content,
        };
        match Snapshot::from_json(&content) {
            Err(err) => {
                log::warn!("Invalid fallback document: {}. Starting with an empty task list", err);
                (Snapshot::default(), LoadReport { source: LoadSource::Nothing, local_readable })
            },
            Ok(snapshot) => {
                log::info!("Loaded {} tasks from the fallback document", snapshot.len());
                (snapshot, LoadReport { source: LoadSource::Fallback, local_readable })
            },
        }
    }

    fn load_local(&self) -> LocalRead {
        let content = match self.local.get(&self.key) {
            Err(err) => {
                log::warn!("Local storage is unavailable: {}", err);
                return LocalRead::Unreadable;
            },
            Ok(None) => {
                log::debug!("Nothing is stored under {:?}", self.key);
                return LocalRead::Missing;
            },
            Ok(Some(content)) => content,
        };

        match Snapshot::from_json(&content) {
            Err(err) => {
                log::warn!("Ignoring invalid data stored under {:?}: {}", self.key, err);
                LocalRead::Missing
            },
            Ok(snapshot) => {
                log::info!("Loaded {} tasks from local storage", snapshot.len());
                LocalRead::Found(snapshot)
            },
        }
    }

    /// Store a whole snapshot, replacing the previous one
    pub fn save(&mut self, snapshot: &Snapshot) {
        let content = match snapshot.to_json() {
            Err(err) => {
                log::warn!("Unable to serialize: {}", err);
                return;
            },
            Ok(c) => c,
        };

        if let Err(err) = self.local.set(&self.key, &content) {
            log::warn!("Unable to save the task list: {}", err);
            return;
        }
        log::debug!("Saved {} tasks under {:?}", snapshot.len(), self.key);
    }

    /// Remove the persisted snapshot entirely
    pub fn clear(&mut self) {
        if let Err(err) = self.local.remove(&self.key) {
            log::warn!("Unable to clear the stored task list: {}", err);
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStore;
    use crate::fallback::StaticResource;

    const LEGACY: &str = r#"[{"text": "Call mom", "startTime": "10:30:00 AM", "endTime": "11:00:00 AM", "dueDate": "Tue Mar 05 2024"}]"#;

    fn fallback_file(folder: &tempfile::TempDir, content: &str) -> StaticResource {
        let path = folder.path().join("todos.json");
        std::fs::write(&path, content).unwrap();
        StaticResource::File(path)
    }

    #[tokio::test]
    async fn local_store_wins() {
        let folder = tempfile::tempdir().unwrap();
        let mut local = MemoryStore::new();
        local.set("todos", r#"{"active": [], "completed": []}"#).unwrap();

        let gateway = Gateway::with_key(local, fallback_file(&folder, LEGACY), "todos".to_string());
        assert!(gateway.load().await.is_empty());
    }

    #[tokio::test]
    async fn falls_back_to_the_static_document() {
        let folder = tempfile::tempdir().unwrap();
        let gateway = Gateway::with_key(MemoryStore::new(), fallback_file(&folder, LEGACY), "todos".to_string());

        let snapshot = gateway.load().await;
        assert_eq!(snapshot.active.len(), 1);
        assert_eq!(snapshot.active[0].text(), "Call mom");
    }

    #[tokio::test]
    async fn unreadable_local_store_falls_back() {
        let folder = tempfile::tempdir().unwrap();
        let gateway = Gateway::with_key(MemoryStore::unavailable(), fallback_file(&folder, LEGACY), "todos".to_string());
        let (snapshot, report) = gateway.load_with_report().await;
        assert_eq!(snapshot.active.len(), 1);
        assert_eq!(report, LoadReport { source: LoadSource::Fallback, local_readable: false });
    }

    #[tokio::test]
    async fn load_reports() {
        let folder = tempfile::tempdir().unwrap();
        let mut local = MemoryStore::new();
        local.set("todos", LEGACY).unwrap();
        let gateway = Gateway::with_key(local, StaticResource::Nothing, "todos".to_string());
        assert_eq!(gateway.load_with_report().await.1, LoadReport { source: LoadSource::Local, local_readable: true });

        let gateway = Gateway::with_key(MemoryStore::new(), fallback_file(&folder, LEGACY), "todos".to_string());
        assert_eq!(gateway.load_with_report().await.1, LoadReport { source: LoadSource::Fallback, local_readable: true });

        let gateway = Gateway::with_key(MemoryStore::unavailable(), StaticResource::Nothing, "todos".to_string());
        let (snapshot, report) = gateway.load_with_report().await;
        assert!(snapshot.is_empty());
        assert_eq!(report, LoadReport { source: LoadSource::Nothing, local_readable: false });
    }

    #[tokio::test]
    async fn corrupted_local_data_falls_back() {
        let folder = tempfile::tempdir().unwrap();
        let mut local = MemoryStore::new();
        local.set("todos", "{ this is not").unwrap();

        let gateway = Gateway::with_key(local, fallback_file(&folder, LEGACY), "todos".to_string());
        assert_eq!(gateway.load().await.active.len(), 1);
    }

    #[tokio::test]
    async fn everything_fails() {
        let folder = tempfile::tempdir().unwrap();
        let gateway = Gateway::with_key(MemoryStore::unavailable(), fallback_file(&folder, "<html>404</html>"), "todos".to_string());
        assert_eq!(gateway.load().await, Snapshot::default());

        let gateway = Gateway::with_key(MemoryStore::new(), StaticResource::Nothing, "todos".to_string());
        assert_eq!(gateway.load().await, Snapshot::default());
    }

    #[tokio::test]
    async fn save_clear() {
        let mut gateway = Gateway::with_key(MemoryStore::new(), StaticResource::Nothing, "todos".to_string());
        let folder = tempfile::tempdir().unwrap();
        let snapshot = Gateway::with_key(MemoryStore::new(), fallback_file(&folder, LEGACY), "k".to_string()).load().await;

        gateway.save(&snapshot);
        assert!(gateway.local().contains_key("todos"));
        assert_eq!(gateway.load().await, snapshot);

        gateway.clear();
        assert!(gateway.local().contains_key("todos") == false);
        assert!(gateway.load().await.is_empty());
    }

    #[test]
    fn write_failures_are_swallowed() {
        let mut gateway = Gateway::with_key(MemoryStore::unavailable(), StaticResource::Nothing, "todos".to_string());
        gateway.save(&Snapshot::default());
        gateway.clear();
    }
}
