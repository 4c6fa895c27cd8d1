use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{TaskStore, generate_id};
use crate::error::{Error, Result};
use crate::models::{Task, TaskFields, TaskPatch};

/// Store operations, as recorded in the call log and used for failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    List,
    Create,
    Update,
    Delete,
}

/// One recorded call: the operation and the document id it targeted, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreCall {
    pub op: StoreOp,
    pub id: Option<String>,
    pub patch: Option<TaskPatch>,
}

#[derive(Debug, Default)]
struct Inner {
    documents: Vec<Task>,
    calls: Vec<StoreCall>,
    failing_ops: HashSet<StoreOp>,
    failing_ids: HashSet<String>,
}

/// In-memory document collection.
///
/// Clones share the same collection, so a test can keep a handle while the
/// board owns another one. Every call is logged, including failed ones.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store with existing documents, preserving their ids.
    pub fn with_documents(documents: Vec<Task>) -> Self {
        let store = Self::default();
        store.lock().documents = documents;
        store
    }

    /// Make every subsequent call of `op` fail until [`MemoryStore::recover`].
    pub fn fail_on(&self, op: StoreOp) {
        self.lock().failing_ops.insert(op);
    }

    /// Make every subsequent update or delete of document `id` fail.
    pub fn fail_for_id(&self, id: &str) {
        self.lock().failing_ids.insert(id.to_string());
    }

    /// Clear all injected failures.
    pub fn recover(&self) {
        let mut inner = self.lock();
        inner.failing_ops.clear();
        inner.failing_ids.clear();
    }

    pub fn documents(&self) -> Vec<Task> {
        self.lock().documents.clone()
    }

    pub fn document(&self, id: &str) -> Option<Task> {
        self.lock().documents.iter().find(|t| t.id == id).cloned()
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panicked test thread must not hide the collection from the others.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Inner {
    fn record(&mut self, op: StoreOp, id: Option<&str>, patch: Option<&TaskPatch>) -> Result<()> {
        self.calls.push(StoreCall {
            op,
            id: id.map(str::to_string),
            patch: patch.cloned(),
        });
        let id_fails = id.is_some_and(|id| self.failing_ids.contains(id));
        if self.failing_ops.contains(&op) || id_fails {
            return Err(Error::Store(format!("injected {op:?} failure")));
        }
        Ok(())
    }
}

impl TaskStore for MemoryStore {
    fn list_tasks(&self) -> Result<Vec<Task>> {
        let mut inner = self.lock();
        inner.record(StoreOp::List, None, None)?;
        Ok(inner.documents.clone())
    }

    fn create_task(&self, fields: &TaskFields) -> Result<String> {
        let mut inner = self.lock();
        inner.record(StoreOp::Create, None, None)?;
        let id = generate_id();
        inner
            .documents
            .push(Task::from_fields(id.clone(), fields.clone()));
        Ok(id)
    }

    fn update_task(&self, id: &str, patch: &TaskPatch) -> Result<()> {
        let mut inner = self.lock();
        inner.record(StoreOp::Update, Some(id), Some(patch))?;
        let doc = inner
            .documents
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        if let Some(title) = &patch.title {
            doc.title = title.clone();
        }
        if let Some(due_date) = patch.due_date {
            doc.due_date = due_date;
        }
        if let Some(status) = patch.status {
            doc.status = status;
        }
        if let Some(category) = patch.category {
            doc.category = category;
        }
        Ok(())
    }

    fn delete_task(&self, id: &str) -> Result<()> {
        let mut inner = self.lock();
        inner.record(StoreOp::Delete, Some(id), None)?;
        let before = inner.documents.len();
        inner.documents.retain(|t| t.id != id);
        if inner.documents.len() == before {
            return Err(Error::NotFound(id.to_string()));
        }
        Ok(())
    }
}
