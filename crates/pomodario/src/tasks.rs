//! Task checklist
//!
//! An ordered list of to-do items kept next to the timer. Order is
//! insertion order; deleting an item leaves the rest in place.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

/// A to-do item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Creation timestamp in milliseconds, unique within the list
    pub id: i64,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields to merge into an existing task
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub text: Option<String>,
    pub completed: Option<bool>,
}

impl TaskPatch {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Default::default()
        }
    }
}

/// The task list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskList {
    tasks: Vec<Task>,
}

impl TaskList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Append a task. Blank text is rejected and returns `None`.
    pub fn add(&mut self, text: &str, now: DateTime<Local>) -> Option<&Task> {
        if text.trim().is_empty() {
            return None;
        }

        let stamp = now.timestamp_millis();
        let id = match self.tasks.iter().map(|t| t.id).max() {
            Some(last) if last >= stamp => last + 1,
            _ => stamp,
        };

        self.tasks.push(Task {
            id,
            text: text.to_string(),
            completed: false,
            created_at: now.with_timezone(&Utc),
        });
        self.tasks.last()
    }

    /// Merge `patch` into the task with `id`. Blank replacement text is
    /// ignored. Returns false when no such task exists.
    pub fn update(&mut self, id: i64, patch: TaskPatch) -> bool {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return false;
        };

        if let Some(text) = patch.text.filter(|t| !t.trim().is_empty()) {
            task.text = text;
        }
        if let Some(completed) = patch.completed {
            task.completed = completed;
        }
        true
    }

    /// Remove the task with `id`. Returns false when no such task exists.
    pub fn delete(&mut self, id: i64) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        self.tasks.len() != before
    }

    /// Flip the completed flag of the task with `id`
    pub fn toggle_complete(&mut self, id: i64) -> bool {
        let Some(completed) = self.get(id).map(|t| !t.completed) else {
            return false;
        };
        self.update(id, TaskPatch::completed(completed))
    }

    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.completed).count()
    }

    pub fn pending_count(&self) -> usize {
        self.tasks.len() - self.completed_count()
    }
}
