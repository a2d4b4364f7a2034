use std::error::Error;

use async_trait::async_trait;

/// A local key-value store, such as the browser `localStorage` or a folder on disk
pub trait KeyValueStore {
    /// Returns the value stored under `key`, or `None` if there is none
    fn get(&self, key: &str) -> Result<Option<String>, Box<dyn Error>>;
    /// Store a value, replacing the previous one
    fn set(&mut self, key: &str, value: &str) -> Result<(), Box<dyn Error>>;
    /// Remove a key. Removing a key that does not exist is not an error
    fn remove(&mut self, key: &str) -> Result<(), Box<dyn Error>>;
}

/// A read-only document that provides the initial tasks when the local store has nothing
#[async_trait]
pub trait FallbackSource {
    /// Fetch the raw content of the document.
    /// This function may be slow (or fail), e.g. in case of a remote server
    async fn fetch(&self) -> Result<String, Box<dyn Error>>;
}
