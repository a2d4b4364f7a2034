//! Export of the task list as a human-readable JSON document

use std::error::Error;
use std::path::{Path, PathBuf};

use crate::config;
use crate::snapshot::Snapshot;

/// Render a snapshot as indented JSON (two spaces), ready to be written to a file
pub fn serialize(snapshot: &Snapshot) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec_pretty(snapshot)
}

/// Read back an exported document. Documents made of a bare array of tasks are accepted as well
pub fn deserialize(content: &[u8]) -> Result<Snapshot, serde_json::Error> {
    serde_json::from_slice(content)
}

/// Write the export document into a folder, under the configured [`EXPORT_FILE_NAME`](crate::config::EXPORT_FILE_NAME).
///
/// Returns the path of the written file
pub fn export_to_folder(snapshot: &Snapshot, folder: &Path) -> Result<PathBuf, Box<dyn Error>> {
    let content = serialize(snapshot)?;
    let path = folder.join(sanitize_filename::sanitize(config::export_file_name()));
    if let Err(err) = std::fs::write(&path, content) {
        return Err(format!("Unable to write file {:?}: {}", path, err).into());
    }
    log::info!("Exported {} tasks to {:?}", snapshot.len(), path);
    Ok(path)
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use crate::task::{Task, TaskId};

    fn sample() -> Snapshot {
        let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        let due = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap().and_hms_opt(23, 0, 0).unwrap();
        let a = Task::new_with_parameters(TaskId::from(1), "Buy milk".to_string(), String::new(), nine, nine, due);
        let b = Task::new_with_parameters(TaskId::from(2), "Fix bike".to_string(), "rear tyre".to_string(), nine, nine, due);
        Snapshot::new(vec![a], vec![b])
    }

    #[test]
    fn round_trip_is_stable() {
        for snapshot in vec![Snapshot::default(), sample()] {
            let once = serialize(&snapshot).unwrap();
            let twice = serialize(&deserialize(&once).unwrap()).unwrap();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn indented() {
        let text = String::from_utf8(serialize(&sample()).unwrap()).unwrap();
        assert!(text.starts_with("{\n  \"active\": [\n    {\n      \"id\": 1,"));
        assert!(text.contains("\"completed\""));
    }

    #[test]
    fn legacy_array() {
        let legacy = br#"[{"text": "Call mom", "startTime": "10:30:00 AM", "endTime": "11:00:00 AM", "dueDate": "Tue Mar 05 2024"}]"#;
        let snapshot = deserialize(legacy).unwrap();
        assert_eq!(snapshot.active.len(), 1);
        assert!(snapshot.completed.is_empty());
    }

    #[test]
    fn export_file() {
        let folder = tempfile::tempdir().unwrap();
        let path = export_to_folder(&sample(), folder.path()).unwrap();
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("todos.json"));

        let written = std::fs::read(&path).unwrap();
        assert_eq!(deserialize(&written).unwrap(), sample());
    }
}
