use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// Date format used for due dates in documents, forms and CLI arguments.
pub const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` due date.
pub fn parse_due_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DUE_DATE_FORMAT)
        .map_err(|_| Error::Validation(format!("invalid due date: {s} (expected YYYY-MM-DD)")))
}

/// The three board lanes. A task's status is always the key of the lane holding it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Status {
    Todo,
    InProgress,
    Completed,
}

impl Status {
    /// Lanes in display order.
    pub const ALL: [Status; 3] = [Status::Todo, Status::InProgress, Status::Completed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Todo => "todo",
            Status::InProgress => "inProgress",
            Status::Completed => "completed",
        }
    }

    /// Column heading shown by the views.
    pub fn label(&self) -> &'static str {
        match self {
            Status::Todo => "To-Do",
            Status::InProgress => "In-Progress",
            Status::Completed => "Completed",
        }
    }

    pub fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "todo" | "to-do" => Ok(Status::Todo),
            "inprogress" | "in-progress" | "in_progress" => Ok(Status::InProgress),
            "completed" | "done" => Ok(Status::Completed),
            _ => Err(Error::Validation(format!("unknown status: {s}"))),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Work,
    Personal,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Work => "work",
            Category::Personal => "personal",
        }
    }

    pub fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "work" => Ok(Category::Work),
            "personal" => Ok(Category::Personal),
            _ => Err(Error::Validation(format!("unknown category: {s}"))),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Category filter applied by the views. `All` is the sentinel that keeps everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn from_str(s: &str) -> Result<Self> {
        if s.trim().is_empty() || s.eq_ignore_ascii_case("all") {
            Ok(CategoryFilter::All)
        } else {
            Category::from_str(s).map(CategoryFilter::Only)
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryFilter::All => "all",
            CategoryFilter::Only(c) => c.as_str(),
        }
    }

    pub fn matches(&self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(c) => *c == category,
        }
    }
}

/// How the board is rendered. Purely presentational.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    List,
    Board,
}

impl ViewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::List => "list",
            ViewMode::Board => "board",
        }
    }

    pub fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "list" => Ok(ViewMode::List),
            "board" => Ok(ViewMode::Board),
            _ => Err(Error::Validation(format!("unknown view mode: {s}"))),
        }
    }
}

/// A task as held in a lane: a store document plus its identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub due_date: NaiveDate,
    pub status: Status,
    pub category: Category,
}

impl Task {
    pub fn from_fields(id: String, fields: TaskFields) -> Self {
        Task {
            id,
            title: fields.title,
            due_date: fields.due_date,
            status: fields.status,
            category: fields.category,
        }
    }

    pub fn fields(&self) -> TaskFields {
        TaskFields {
            title: self.title.clone(),
            due_date: self.due_date,
            status: self.status,
            category: self.category,
        }
    }
}

/// The four document fields of a task, already validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskFields {
    pub title: String,
    pub due_date: NaiveDate,
    pub status: Status,
    pub category: Category,
}

impl TaskFields {
    /// Apply a patch on top of these fields and re-validate the result.
    pub fn merged(&self, patch: &TaskPatch) -> Result<TaskFields> {
        let merged = TaskFields {
            title: patch
                .title
                .as_deref()
                .map(|t| t.trim().to_string())
                .unwrap_or_else(|| self.title.clone()),
            due_date: patch.due_date.unwrap_or(self.due_date),
            status: patch.status.unwrap_or(self.status),
            category: patch.category.unwrap_or(self.category),
        };
        if merged.title.is_empty() {
            return Err(Error::Validation("title must not be empty".to_string()));
        }
        Ok(merged)
    }
}

/// Create-form payload. Defaults mirror a freshly opened form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    pub title: String,
    pub due_date: String,
    #[serde(default = "default_status")]
    pub status: Status,
    #[serde(default = "default_category")]
    pub category: Category,
}

fn default_status() -> Status {
    Status::Todo
}

fn default_category() -> Category {
    Category::Work
}

impl TaskDraft {
    pub fn new(title: impl Into<String>, due_date: impl Into<String>) -> Self {
        TaskDraft {
            title: title.into(),
            due_date: due_date.into(),
            status: default_status(),
            category: default_category(),
        }
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    /// Check the draft and turn it into document fields.
    pub fn validate(&self) -> Result<TaskFields> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(Error::Validation("title must not be empty".to_string()));
        }
        if self.due_date.trim().is_empty() {
            return Err(Error::Validation("due date is required".to_string()));
        }
        Ok(TaskFields {
            title: title.to_string(),
            due_date: parse_due_date(&self.due_date)?,
            status: self.status,
            category: self.category,
        })
    }
}

/// A partial or full set of task fields sent to the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

impl TaskPatch {
    /// A patch touching only the status field, as sent by lane moves.
    pub fn status(status: Status) -> Self {
        TaskPatch {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.due_date.is_none()
            && self.status.is_none()
            && self.category.is_none()
    }
}

impl From<&TaskFields> for TaskPatch {
    fn from(fields: &TaskFields) -> Self {
        TaskPatch {
            title: Some(fields.title.clone()),
            due_date: Some(fields.due_date),
            status: Some(fields.status),
            category: Some(fields.category),
        }
    }
}

/// Identity record yielded by a successful sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub display_name: String,
    pub email: String,
    pub avatar_url: Option<String>,
}
