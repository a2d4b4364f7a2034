//! The application controller
//!
//! A [`TodoApp`] owns the task store and the persistence gateway. Views hold a reference to it, render its state,
//! and forward user intents (field edits, button presses) to its methods.

use std::error::Error;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime, NaiveTime, Timelike};

use crate::calendar::{self, DayGrid, Month};
use crate::error::StoreError;
use crate::export;
use crate::gateway::Gateway;
use crate::store::TaskStore;
use crate::task::{Task, TaskId};
use crate::traits::{FallbackSource, KeyValueStore};

/// Which view displays the tasks
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewMode {
    List,
    Calendar,
}

/// Whether the initial load has completed.
///
/// Nothing is written to storage while loading is pending, so that a change made before the load resolves
/// can never overwrite the persisted tasks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadState {
    Pending,
    Loaded,
}

/// The date/time pickers of the entry form
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PickerKind {
    StartTime,
    EndTime,
    DueDate,
}

/// The content of the entry form, before it is submitted
#[derive(Clone, Debug, PartialEq)]
pub struct Draft {
    pub input: String,
    pub notes: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub due_date: NaiveDateTime,
}

impl Draft {
    /// An empty form, whose pickers are set to the current local time (to the second, as tasks are stored)
    pub fn now() -> Self {
        let now = Local::now().naive_local();
        let now = now.with_nanosecond(0).unwrap_or(now);
        Self {
            input: String::new(),
            notes: String::new(),
            start_time: now.time(),
            end_time: now.time(),
            due_date: now,
        }
    }
}


/// The top-level application state
pub struct TodoApp<K, F>
where
    K: KeyValueStore,
    F: FallbackSource,
{
    store: TaskStore,
    gateway: Gateway<K, F>,
    load_state: LoadState,
    /// Cleared when the local store could not be read: what it holds is unknown, so this session never writes to it
    storage_writable: bool,

    draft: Draft,
    open_picker: Option<PickerKind>,

    view_mode: ViewMode,
    displayed_month: Month,
}

impl<K, F> TodoApp<K, F>
where
    K: KeyValueStore,
    F: FallbackSource,
{
    /// Create an application with an empty task list. Call [`Self::load`] to populate it
    pub fn new(gateway: Gateway<K, F>) -> Self {
        Self {
            store: TaskStore::new(),
            gateway,
            load_state: LoadState::Pending,
            storage_writable: true,
            draft: Draft::now(),
            open_picker: None,
            view_mode: ViewMode::List,
            displayed_month: Month::current(),
        }
    }

    pub fn store(&self) -> &TaskStore { &self.store }
    pub fn gateway(&self) -> &Gateway<K, F> { &self.gateway }
    pub fn gateway_mut(&mut self) -> &mut Gateway<K, F> { &mut self.gateway }
    pub fn load_state(&self) -> LoadState { self.load_state }
    /// Whether changes are written to the local store. This is false for the whole session once reading it failed
    pub fn is_storage_writable(&self) -> bool { self.storage_writable }
    pub fn draft(&self) -> &Draft { &self.draft }
    pub fn view_mode(&self) -> ViewMode { self.view_mode }
    pub fn displayed_month(&self) -> Month { self.displayed_month }
    pub fn open_picker(&self) -> Option<PickerKind> { self.open_picker }

    /// Populate the store from the persisted (or fallback) snapshot.
    ///
    /// Tasks that have been added while loading was pending are kept, after the loaded ones.
    /// Once this has completed, every change is persisted, unless the local store could not be read.
    /// An empty result is never written: loading alone cannot erase what is stored.
    pub async fn load(&mut self) {
        if self.load_state == LoadState::Loaded {
            log::debug!("Tasks have already been loaded");
            return;
        }

        let (loaded, report) = self.gateway.load_with_report().await;
        log::debug!("Initial tasks come from {:?}", report.source);
        let pending = self.store.snapshot();
        self.store.replace_with(loaded);
        if pending.is_empty() == false {
            log::info!("Keeping {} tasks created while loading", pending.len());
            self.store.merge(pending);
        }

        self.load_state = LoadState::Loaded;
        if report.local_readable == false {
            log::warn!("Local storage could not be read. Changes will only be kept in memory for this session");
            self.storage_writable = false;
            return;
        }
        if self.store.is_empty() == false {
            self.gateway.save(&self.store.snapshot());
        }
    }

    /// Write the store content, unless loading is still pending or the local store is off-limits
    fn persist(&mut self) {
        if self.load_state == LoadState::Pending {
            log::debug!("Not saving: the initial load has not completed yet");
            return;
        }
        if self.storage_writable == false {
            log::debug!("Not saving: local storage is unavailable for this session");
            return;
        }

        if self.store.is_empty() {
            self.gateway.clear();
        } else {
            self.gateway.save(&self.store.snapshot());
        }
    }

    //
    // Entry form
    //
    pub fn set_input(&mut self, input: String) { self.draft.input = input; }
    pub fn set_notes(&mut self, notes: String) { self.draft.notes = notes; }
    pub fn set_start_time(&mut self, time: NaiveTime) { self.draft.start_time = time; }
    pub fn set_end_time(&mut self, time: NaiveTime) { self.draft.end_time = time; }
    pub fn set_due_date(&mut self, due_date: NaiveDateTime) { self.draft.due_date = due_date; }

    /// Create a task from the entry form.
    ///
    /// On success, the text and notes fields are emptied. The pickers keep their values.
    pub fn submit(&mut self) -> Option<Task> {
        let draft = self.draft.clone();
        let task = self.add(draft.input, draft.notes, draft.start_time, draft.end_time, draft.due_date)?;
        self.draft.input.clear();
        self.draft.notes.clear();
        Some(task)
    }

    /// Show the picker dialog for a field of the entry form
    pub fn show_picker(&mut self, kind: PickerKind) {
        self.open_picker = Some(kind);
    }

    pub fn close_picker(&mut self) {
        self.open_picker = None;
    }

    /// The value the open picker dialog should initially select
    pub fn picker_selection(&self) -> Option<NaiveDateTime> {
        let day = self.draft.due_date.date();
        self.open_picker.map(|kind| match kind {
            PickerKind::StartTime => day.and_time(self.draft.start_time),
            PickerKind::EndTime => day.and_time(self.draft.end_time),
            PickerKind::DueDate => self.draft.due_date,
        })
    }

    /// Apply the value selected in the open picker dialog, and close it.
    /// Time pickers only keep the time of day.
    pub fn pick(&mut self, value: NaiveDateTime) {
        match self.open_picker.take() {
            None => log::debug!("Ignoring a picked value while no picker is open"),
            Some(PickerKind::StartTime) => self.draft.start_time = value.time(),
            Some(PickerKind::EndTime) => self.draft.end_time = value.time(),
            Some(PickerKind::DueDate) => self.draft.due_date = value,
        }
    }

    //
    // Task list
    //
    /// See [`TaskStore::add`]
    pub fn add(&mut self, text: String, notes: String,
               start_time: NaiveTime, end_time: NaiveTime, due_date: NaiveDateTime) -> Option<Task>
    {
        let task = self.store.add(text, notes, start_time, end_time, due_date)?;
        self.persist();
        Some(task)
    }

    /// Delete the active task displayed at a given position
    pub fn remove(&mut self, index: usize) -> Result<Task, StoreError> {
        let task = self.store.remove(index)?;
        self.persist();
        Ok(task)
    }

    /// Mark the active task displayed at a given position as completed
    pub fn complete(&mut self, index: usize) -> Result<(), StoreError> {
        self.store.complete(index)?;
        self.persist();
        Ok(())
    }

    /// Move the completed task displayed at a given position back to the active tasks
    pub fn restore(&mut self, index: usize) -> Result<(), StoreError> {
        self.store.restore(index)?;
        self.persist();
        Ok(())
    }

    pub fn remove_by_id(&mut self, id: TaskId) -> Result<Task, StoreError> {
        let task = self.store.remove_by_id(id)?;
        self.persist();
        Ok(task)
    }

    pub fn complete_by_id(&mut self, id: TaskId) -> Result<(), StoreError> {
        self.store.complete_by_id(id)?;
        self.persist();
        Ok(())
    }

    pub fn restore_by_id(&mut self, id: TaskId) -> Result<(), StoreError> {
        self.store.restore_by_id(id)?;
        self.persist();
        Ok(())
    }

    /// Delete every task, and the persisted snapshot.
    ///
    /// This is an explicit request to wipe the stored tasks, so it does not wait for the initial load:
    /// a load that resolves afterwards finds nothing stored. The persisted snapshot is left alone if the local store
    /// could not be read.
    pub fn clear_all(&mut self) {
        self.store.clear_all();
        if self.storage_writable {
            self.gateway.clear();
        }
    }

    /// The export document for the current tasks
    pub fn export_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        export::serialize(&self.store.snapshot())
    }

    /// Write the export document into a folder. Returns the path of the written file
    pub fn export(&self, folder: &Path) -> Result<PathBuf, Box<dyn Error>> {
        export::export_to_folder(&self.store.snapshot(), folder)
    }

    //
    // Calendar view
    //
    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
    }

    pub fn toggle_view(&mut self) -> ViewMode {
        self.view_mode = match self.view_mode {
            ViewMode::List => ViewMode::Calendar,
            ViewMode::Calendar => ViewMode::List,
        };
        self.view_mode
    }

    pub fn show_month(&mut self, month: Month) {
        self.displayed_month = month;
    }

    pub fn next_month(&mut self) -> Month {
        self.displayed_month = calendar::change_month(self.displayed_month, 1);
        self.displayed_month
    }

    pub fn previous_month(&mut self) -> Month {
        self.displayed_month = calendar::change_month(self.displayed_month, -1);
        self.displayed_month
    }

    /// The cells of the displayed month
    pub fn calendar_grid(&self) -> DayGrid {
        calendar::days_in_grid(self.displayed_month)
    }

    /// The active tasks due on a day of the displayed month
    pub fn tasks_on_day(&self, day: u32) -> Vec<&Task> {
        calendar::tasks_on_day(day, self.displayed_month, self.store.active()).collect()
    }
}
