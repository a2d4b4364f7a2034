//! The in-memory task store: active and completed partitions

use std::collections::HashSet;
use std::fmt::{Display, Formatter};

use chrono::{NaiveDateTime, NaiveTime, Timelike};

use crate::error::StoreError;
use crate::snapshot::Snapshot;
use crate::task::{Task, TaskId};

/// The two partitions of the task universe
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Partition {
    Active,
    Completed,
}

impl Display for Partition {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Completed => write!(f, "completed"),
        }
    }
}


/// Holds every task, either in the active or in the completed partition.
///
/// A task belongs to exactly one partition at a time, and keeps its id when it is moved.
/// Mutations are addressed by [`TaskId`]. Positional variants are provided for views that only know what they display,
/// they resolve the position to an id first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TaskStore {
    active: Vec<Task>,
    completed: Vec<Task>,
    /// The greatest id ever handed out or adopted
    last_id: Option<TaskId>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store holding the content of a snapshot
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let mut store = Self::new();
        store.merge(snapshot);
        store
    }

    pub fn active(&self) -> &[Task] { &self.active }
    pub fn completed(&self) -> &[Task] { &self.completed }

    pub fn partition(&self, partition: Partition) -> &[Task] {
        match partition {
            Partition::Active => &self.active,
            Partition::Completed => &self.completed,
        }
    }

    /// Total count of tasks, in both partitions
    pub fn len(&self) -> usize {
        self.active.len() + self.completed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a task and the partition it is in
    pub fn find(&self, id: TaskId) -> Option<(Partition, &Task)> {
        self.active.iter().find(|t| t.id() == id).map(|t| (Partition::Active, t))
            .or_else(|| self.completed.iter().find(|t| t.id() == id).map(|t| (Partition::Completed, t)))
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.active.clone(), self.completed.clone())
    }

    /// Drop the current content and adopt the content of a snapshot
    pub fn replace_with(&mut self, snapshot: Snapshot) {
        self.active.clear();
        self.completed.clear();
        self.merge(snapshot);
    }

    /// Append the content of a snapshot to the partitions.
    ///
    /// Tasks without an id, or whose id is already taken, get a fresh id.
    pub fn merge(&mut self, snapshot: Snapshot) {
        let incoming_max = snapshot.active.iter().chain(snapshot.completed.iter())
            .map(|t| t.id())
            .max();
        self.last_id = self.last_id.max(incoming_max);

        let mut taken: HashSet<TaskId> = self.active.iter().chain(self.completed.iter())
            .map(|t| t.id())
            .collect();

        for (partition, tasks) in vec![(Partition::Active, snapshot.active), (Partition::Completed, snapshot.completed)] {
            for task in tasks {
                let task = if task.id().is_assigned() == false || taken.contains(&task.id()) {
                    let id = self.fresh_id();
                    log::debug!("Task {:?} gets new id {} (was {})", task.text(), id, task.id());
                    task.with_id(id)
                } else {
                    task
                };
                taken.insert(task.id());
                match partition {
                    Partition::Active => self.active.push(task),
                    Partition::Completed => self.completed.push(task),
                }
            }
        }
    }

    fn fresh_id(&mut self) -> TaskId {
        let id = TaskId::from_clock(self.last_id);
        self.last_id = Some(id);
        id
    }

    /// Create a task and append it to the active partition.
    ///
    /// Blank texts are not valid tasks: in this case, nothing is created and `None` is returned.
    /// Times are kept to the second, which is the precision tasks are stored with.
    pub fn add(&mut self, text: String, notes: String,
               start_time: NaiveTime, end_time: NaiveTime, due_date: NaiveDateTime) -> Option<Task>
    {
        if text.trim().is_empty() {
            log::debug!("Ignoring a task with a blank text");
            return None;
        }

        let start_time = start_time.with_nanosecond(0).unwrap_or(start_time);
        let end_time = end_time.with_nanosecond(0).unwrap_or(end_time);
        let due_date = due_date.with_nanosecond(0).unwrap_or(due_date);
        let task = Task::new_with_parameters(self.fresh_id(), text, notes, start_time, end_time, due_date);
        log::debug!("Adding task {} ({:?})", task.id(), task.text());
        self.active.push(task.clone());
        Some(task)
    }

    /// Delete a task, whatever partition it is in
    pub fn remove_by_id(&mut self, id: TaskId) -> Result<Task, StoreError> {
        if let Some(pos) = position_of(&self.active, id) {
            return Ok(self.active.remove(pos));
        }
        match position_of(&self.completed, id) {
            Some(pos) => Ok(self.completed.remove(pos)),
            None => Err(StoreError::unknown(Partition::Active, id)),
        }
    }

    /// Move an active task to the end of the completed partition
    pub fn complete_by_id(&mut self, id: TaskId) -> Result<(), StoreError> {
        let pos = position_of(&self.active, id).ok_or_else(|| StoreError::unknown(Partition::Active, id))?;
        let task = self.active.remove(pos);
        self.completed.push(task);
        Ok(())
    }

    /// Move a completed task back to the end of the active partition
    pub fn restore_by_id(&mut self, id: TaskId) -> Result<(), StoreError> {
        let pos = position_of(&self.completed, id).ok_or_else(|| StoreError::unknown(Partition::Completed, id))?;
        let task = self.completed.remove(pos);
        self.active.push(task);
        Ok(())
    }

    /// Returns the id of the task displayed at a given position
    pub fn id_at(&self, partition: Partition, index: usize) -> Result<TaskId, StoreError> {
        let tasks = self.partition(partition);
        tasks.get(index)
            .map(|t| t.id())
            .ok_or(StoreError::IndexOutOfRange { partition, index, len: tasks.len() })
    }

    /// Delete the active task at a given position
    pub fn remove(&mut self, index: usize) -> Result<Task, StoreError> {
        let id = self.id_at(Partition::Active, index)?;
        self.remove_by_id(id)
    }

    /// Complete the active task at a given position
    pub fn complete(&mut self, index: usize) -> Result<(), StoreError> {
        let id = self.id_at(Partition::Active, index)?;
        self.complete_by_id(id)
    }

    /// Restore the completed task at a given position
    pub fn restore(&mut self, index: usize) -> Result<(), StoreError> {
        let id = self.id_at(Partition::Completed, index)?;
        self.restore_by_id(id)
    }

    /// Empty both partitions
    pub fn clear_all(&mut self) {
        self.active.clear();
        self.completed.clear();
    }
}

fn position_of(tasks: &[Task], id: TaskId) -> Option<usize> {
    tasks.iter().position(|t| t.id() == id)
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn nine() -> NaiveTime { NaiveTime::from_hms_opt(9, 0, 0).unwrap() }
    fn ten() -> NaiveTime { NaiveTime::from_hms_opt(10, 0, 0).unwrap() }
    fn march_5th() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 5).unwrap().and_hms_opt(12, 0, 0).unwrap()
    }

    fn add(store: &mut TaskStore, text: &str) -> Option<Task> {
        store.add(text.to_string(), String::new(), nine(), ten(), march_5th())
    }

    #[test]
    fn add_keeps_fields() {
        let mut store = TaskStore::new();
        let task = store.add("Buy milk".to_string(), "two bottles".to_string(), nine(), ten(), march_5th()).unwrap();

        assert_eq!(store.active().len(), 1);
        assert_eq!(store.active()[0], task);
        assert_eq!(task.text(), "Buy milk");
        assert_eq!(task.notes(), "two bottles");
        assert_eq!(task.start_time(), nine());
        assert_eq!(task.end_time(), ten());
        assert_eq!(task.due_date(), march_5th());
    }

    #[test]
    fn add_drops_sub_seconds() {
        let mut store = TaskStore::new();
        let precise = NaiveTime::from_hms_nano_opt(9, 0, 1, 235_522_705).unwrap();
        let due = march_5th().with_nanosecond(999_999_999).unwrap();
        let task = store.add("Buy milk".to_string(), String::new(), precise, precise, due).unwrap();

        assert_eq!(task.start_time(), NaiveTime::from_hms_opt(9, 0, 1).unwrap());
        assert_eq!(task.due_date(), march_5th());

        let reloaded = Snapshot::from_json(&store.snapshot().to_json().unwrap()).unwrap();
        assert_eq!(reloaded.active[0], task);
    }

    #[test]
    fn add_ignores_blank_text() {
        let mut store = TaskStore::new();
        add(&mut store, "something");
        let before = store.clone();

        for blank in &["", " ", "\t\n", "   "] {
            assert!(add(&mut store, blank).is_none());
        }
        assert_eq!(store, before);
    }

    #[test]
    fn ids_are_unique() {
        let mut store = TaskStore::new();
        let ids: HashSet<TaskId> = (0..50)
            .map(|i| add(&mut store, &format!("task {}", i)).unwrap().id())
            .collect();
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn complete_then_restore() {
        let mut store = TaskStore::new();
        add(&mut store, "first");
        add(&mut store, "second");
        let before = store.snapshot();
        let id = store.active()[1].id();

        store.complete(1).unwrap();
        assert_eq!(store.active().len(), 1);
        assert_eq!(store.completed().len(), 1);
        assert_eq!(store.completed()[0].id(), id);
        assert_eq!(store.len(), 2);

        store.restore(0).unwrap();
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn out_of_range() {
        let mut store = TaskStore::new();
        add(&mut store, "only one");
        store.complete(0).unwrap();
        add(&mut store, "another one");
        let before = store.clone();

        assert_eq!(store.remove(1), Err(StoreError::IndexOutOfRange { partition: Partition::Active, index: 1, len: 1 }));
        assert_eq!(store.complete(5), Err(StoreError::IndexOutOfRange { partition: Partition::Active, index: 5, len: 1 }));
        assert_eq!(store.restore(1), Err(StoreError::IndexOutOfRange { partition: Partition::Completed, index: 1, len: 1 }));
        assert_eq!(store, before);
    }

    #[test]
    fn by_id() {
        let mut store = TaskStore::new();
        let a = add(&mut store, "a").unwrap().id();
        let b = add(&mut store, "b").unwrap().id();

        store.complete_by_id(b).unwrap();
        assert_eq!(store.find(b).map(|(p, _)| p), Some(Partition::Completed));
        // b is not active anymore
        assert!(store.complete_by_id(b).is_err());
        assert!(store.restore_by_id(a).is_err());

        // completed tasks can be removed too
        assert_eq!(store.remove_by_id(b).unwrap().text(), "b");
        assert!(store.find(b).is_none());
        assert_eq!(store.remove_by_id(b), Err(StoreError::unknown(Partition::Active, b)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn clear_all() {
        let mut store = TaskStore::new();
        add(&mut store, "a");
        add(&mut store, "b");
        store.complete(0).unwrap();
        store.clear_all();
        assert!(store.is_empty());
        assert_eq!(store.snapshot(), Snapshot::default());
    }

    #[test]
    fn merge_assigns_missing_and_duplicate_ids() {
        let orphan = Task::new_with_parameters(TaskId::UNASSIGNED, "legacy".to_string(), String::new(), nine(), ten(), march_5th());
        let first = Task::new_with_parameters(TaskId::from(5), "first".to_string(), String::new(), nine(), ten(), march_5th());
        let clash = Task::new_with_parameters(TaskId::from(5), "clash".to_string(), String::new(), nine(), ten(), march_5th());

        let store = TaskStore::from_snapshot(Snapshot::new(vec![orphan, first], vec![clash]));
        assert_eq!(store.len(), 3);
        assert_eq!(store.active()[1].id(), TaskId::from(5));

        let ids: HashSet<TaskId> = store.active().iter().chain(store.completed()).map(|t| t.id()).collect();
        assert_eq!(ids.len(), 3);
        assert!(ids.iter().all(|id| id.is_assigned()));
    }

    #[test]
    fn fresh_ids_are_above_adopted_ones() {
        let future = Task::new_with_parameters(TaskId::from(u64::MAX / 2), "from the future".to_string(), String::new(), nine(), ten(), march_5th());
        let mut store = TaskStore::from_snapshot(Snapshot::new(vec![future], Vec::new()));
        let new = add(&mut store, "now").unwrap();
        assert!(new.id() > TaskId::from(u64::MAX / 2));
    }
}
