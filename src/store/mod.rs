//! The document-store contract the board synchronizes against.

use crate::error::Result;
use crate::models::{Task, TaskFields, TaskPatch};

pub mod memory;

pub use memory::MemoryStore;

/// A flat collection of task documents keyed by store-assigned ids.
///
/// There is no query pushdown: callers enumerate everything and filter
/// client-side. Updating or deleting a missing document fails with
/// [`crate::error::Error::NotFound`].
pub trait TaskStore {
    /// Enumerate every document in the collection.
    fn list_tasks(&self) -> Result<Vec<Task>>;

    /// Insert a new document and return its generated id.
    fn create_task(&self, fields: &TaskFields) -> Result<String>;

    /// Overwrite the fields present in `patch`.
    fn update_task(&self, id: &str, patch: &TaskPatch) -> Result<()>;

    fn delete_task(&self, id: &str) -> Result<()>;
}

/// Generate a document id: 20 lowercase hex characters from a v4 UUID.
pub fn generate_id() -> String {
    let uuid = uuid::Uuid::new_v4();
    format!("{:032x}", uuid.as_u128())[..20].to_string()
}
