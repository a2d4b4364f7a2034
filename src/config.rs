//! Support for library configuration options

use std::sync::{Arc, Mutex};
use once_cell::sync::Lazy;

/// Key under which the snapshot is kept in the local key-value store.
/// Feel free to override it when initing this library.
pub static STORAGE_KEY: Lazy<Arc<Mutex<String>>> = Lazy::new(|| Arc::new(Mutex::new("todos".to_string())));

/// Name of the file written by [`export_to_folder`](crate::export::export_to_folder).
/// Feel free to override it when initing this library.
pub static EXPORT_FILE_NAME: Lazy<Arc<Mutex<String>>> = Lazy::new(|| Arc::new(Mutex::new("todos.json".to_string())));

/// The current value of [`STORAGE_KEY`]
pub fn storage_key() -> String {
    read(&STORAGE_KEY)
}

/// The current value of [`EXPORT_FILE_NAME`]
pub fn export_file_name() -> String {
    read(&EXPORT_FILE_NAME)
}

fn read(setting: &Mutex<String>) -> String {
    // A panic while holding the lock cannot leave a String half-written
    setting.lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone()
}
