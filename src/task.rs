use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identity of a task: the creation time in Unix milliseconds.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct TaskId(pub i64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(rename = "isDone")]
    pub is_done: bool,
}

impl Task {
    pub fn new(id: TaskId, title: String) -> Self {
        Self {
            id,
            title,
            is_done: false,
        }
    }

    /// Case-insensitive substring match against the title.
    pub fn matches(&self, query: &str) -> bool {
        self.title.to_lowercase().contains(&query.to_lowercase())
    }
}

/// Trims a title, rejecting it when nothing is left.
pub fn normalize_title(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Hands out task ids from the wall clock, bumping past the previous id
/// when two tasks are created within the same millisecond.
#[derive(Debug, Default, Clone)]
pub struct IdClock {
    last: i64,
}

impl IdClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the clock so new ids sort after every id in `tasks`.
    pub fn seeded<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        let last = tasks.into_iter().map(|t| t.id.0).max().unwrap_or(0);
        Self { last }
    }

    /// `None` once the previous id was `i64::MAX`.
    pub fn next(&mut self) -> Option<TaskId> {
        self.next_at(Utc::now().timestamp_millis())
    }

    fn next_at(&mut self, now_millis: i64) -> Option<TaskId> {
        self.last = now_millis.max(self.last.checked_add(1)?);
        Some(TaskId(self.last))
    }
}
