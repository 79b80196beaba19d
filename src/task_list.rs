use crate::storage::{KeyValueStore, StorageError};
use crate::task::{normalize_title, IdClock, Task, TaskId};
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_STORAGE_KEY: &str = "my-todo";

#[derive(Debug, Error)]
enum PersistError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("malformed task list")]
    Codec(#[from] serde_json::Error),
}

/// The task collection behind the list screen.
///
/// `tasks` is the full collection, newest first, and is what gets written
/// to the store after every mutation. The visible list is derived from it
/// with the current search query and is never stored.
pub struct TaskList<S: KeyValueStore> {
    store: S,
    key: String,
    tasks: Vec<Task>,
    clock: IdClock,
    query: String,
    input: String,
    editing: Option<TaskId>,
}

impl<S: KeyValueStore> TaskList<S> {
    /// Reads the persisted collection. Anything that goes wrong leaves the
    /// list empty.
    pub fn load(store: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let tasks = match read_tasks(&store, &key) {
            Ok(Some(tasks)) => dedup_ids(tasks),
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(key = %key, error = %err, "could not load tasks, starting empty");
                Vec::new()
            }
        };
        debug!(key = %key, count = tasks.len(), "loaded tasks");
        Self {
            store,
            clock: IdClock::seeded(&tasks),
            key,
            tasks,
            query: String::new(),
            input: String::new(),
            editing: None,
        }
    }

    pub fn add(&mut self, title: &str) -> Option<TaskId> {
        let title = normalize_title(title)?;
        let Some(id) = self.clock.next() else {
            warn!(last = ?self.tasks.iter().map(|t| t.id).max(), "task ids exhausted, not adding");
            return None;
        };
        let task = Task::new(id, title);
        self.tasks.insert(0, task);
        self.persist();
        self.input.clear();
        Some(id)
    }

    /// Commits the input field: saves the edit in progress, or adds a new
    /// task when nothing is being edited.
    pub fn submit(&mut self) -> bool {
        if self.editing.is_some() {
            self.save_edit()
        } else {
            let title = self.input.clone();
            self.add(&title).is_some()
        }
    }

    pub fn begin_edit(&mut self, id: TaskId) -> bool {
        let Some(title) = self.find(id).map(|t| t.title.clone()) else {
            return false;
        };
        self.input = title;
        self.editing = Some(id);
        true
    }

    pub fn save_edit(&mut self) -> bool {
        let Some(id) = self.editing else {
            return false;
        };
        let Some(title) = normalize_title(&self.input) else {
            return false;
        };
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) {
            task.title = title;
        }
        self.persist();
        self.editing = None;
        self.input.clear();
        true
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
        self.input.clear();
    }

    pub fn delete(&mut self, id: TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.tasks.len() == before {
            return false;
        }
        if self.editing == Some(id) {
            self.cancel_edit();
        }
        self.persist();
        true
    }

    /// Returns the new completion state, or `None` for an unknown id.
    pub fn toggle_done(&mut self, id: TaskId) -> Option<bool> {
        let task = self.tasks.iter_mut().find(|t| t.id == id)?;
        task.is_done = !task.is_done;
        let done = task.is_done;
        self.persist();
        Some(done)
    }

    pub fn search(&mut self, query: &str) {
        self.query = query.to_string();
    }

    pub fn visible(&self) -> Vec<&Task> {
        if self.query.trim().is_empty() {
            self.tasks.iter().collect()
        } else {
            self.tasks.iter().filter(|t| t.matches(&self.query)).collect()
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn find(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut String {
        &mut self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn editing(&self) -> Option<TaskId> {
        self.editing
    }

    /// `(done, total)` over the whole collection.
    pub fn counts(&self) -> (usize, usize) {
        let done = self.tasks.iter().filter(|t| t.is_done).count();
        (done, self.tasks.len())
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // Failed writes are not retried; the next successful mutation rewrites
    // the whole collection anyway.
    fn persist(&mut self) {
        if let Err(err) = write_tasks(&mut self.store, &self.key, &self.tasks) {
            warn!(key = %self.key, error = %err, "could not save tasks, keeping changes in memory");
        }
    }
}

/// Keeps the first task for each id; later copies are dropped.
fn dedup_ids(tasks: Vec<Task>) -> Vec<Task> {
    let mut seen = HashSet::new();
    let before = tasks.len();
    let tasks: Vec<Task> = tasks.into_iter().filter(|t| seen.insert(t.id)).collect();
    if tasks.len() != before {
        warn!(dropped = before - tasks.len(), "stored tasks had duplicate ids");
    }
    tasks
}

fn read_tasks<S: KeyValueStore>(store: &S, key: &str) -> Result<Option<Vec<Task>>, PersistError> {
    match store.get(key)? {
        Some(data) => Ok(Some(serde_json::from_str(&data)?)),
        None => Ok(None),
    }
}

fn write_tasks<S: KeyValueStore>(store: &mut S, key: &str, tasks: &[Task]) -> Result<(), PersistError> {
    let data = serde_json::to_string(tasks)?;
    store.set(key, &data)?;
    Ok(())
}
