//! The task board: three status lanes kept in step with a [`TaskStore`].
//!
//! Every mutation calls the store first and only touches local state once
//! that call succeeds, so a failed write never removes, duplicates or
//! misfiles a task locally. Failures are logged here and returned.

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::models::{Status, Task, TaskDraft, TaskPatch};
use crate::store::TaskStore;

mod lanes;
pub mod view;

pub use lanes::Lanes;
pub use view::{ViewFilter, filter_by_category, search};

/// Per-item result of a bulk operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkOutcome {
    pub succeeded: Vec<String>,
    pub failed: Vec<BulkFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkFailure {
    pub id: String,
    pub error: String,
}

impl BulkOutcome {
    fn fail(&mut self, id: String, err: &Error) {
        self.failed.push(BulkFailure {
            id,
            error: err.to_string(),
        });
    }
}

#[derive(Debug)]
pub struct TaskBoard<S> {
    store: S,
    lanes: Lanes,
    selection: Vec<String>,
}

impl<S: TaskStore> TaskBoard<S> {
    /// An empty board. Call [`TaskBoard::load`] to fill it.
    pub fn new(store: S) -> Self {
        TaskBoard {
            store,
            lanes: Lanes::default(),
            selection: Vec::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn lanes(&self) -> &Lanes {
        &self.lanes
    }

    pub fn lane(&self, status: Status) -> &[Task] {
        self.lanes.lane(status)
    }

    pub fn find(&self, id: &str) -> Option<&Task> {
        self.lanes.get(id)
    }

    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    /// One lane as the views show it: category filter, then title search.
    pub fn visible(&self, status: Status, filter: &ViewFilter) -> Vec<&Task> {
        filter.apply(self.lanes.lane(status))
    }

    /// Replace local state with the store's full collection, grouped by status.
    ///
    /// On failure the previous lanes are kept.
    pub fn load(&mut self) -> Result<()> {
        let tasks = self
            .store
            .list_tasks()
            .inspect_err(|e| error!(error = %e, "failed to fetch tasks"))?;
        self.lanes = Lanes::partition(tasks);
        let lanes = &self.lanes;
        self.selection.retain(|id| lanes.contains(id));
        debug!(
            todo = self.lanes.todo.len(),
            in_progress = self.lanes.in_progress.len(),
            completed = self.lanes.completed.len(),
            "board loaded"
        );
        Ok(())
    }

    /// Validate `draft`, create it in the store, then append it to its lane.
    pub fn create(&mut self, draft: &TaskDraft) -> Result<Task> {
        let fields = draft.validate()?;
        let id = self
            .store
            .create_task(&fields)
            .inspect_err(|e| error!(error = %e, title = %fields.title, "failed to create task"))?;
        let task = Task::from_fields(id, fields);
        info!(id = %task.id, status = %task.status, "task created");
        self.lanes.lane_mut(task.status).push(task.clone());
        Ok(task)
    }

    /// Merge `patch` into the task, write the full field set, then replace it locally.
    ///
    /// A status change moves the task to the end of its new lane.
    pub fn update(&mut self, id: &str, patch: &TaskPatch) -> Result<Task> {
        let (lane, pos) = self
            .lanes
            .locate(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        let fields = self.lanes.lane(lane)[pos].fields().merged(patch)?;

        self.store
            .update_task(id, &TaskPatch::from(&fields))
            .inspect_err(|e| error!(%id, error = %e, "failed to update task"))?;

        let updated = Task::from_fields(id.to_string(), fields);
        if updated.status == lane {
            self.lanes.lane_mut(lane)[pos] = updated.clone();
        } else {
            self.lanes.lane_mut(lane).remove(pos);
            self.lanes.lane_mut(updated.status).push(updated.clone());
        }
        info!(%id, status = %updated.status, "task updated");
        Ok(updated)
    }

    /// Delete the task from the store, then from its lane and the selection.
    ///
    /// An id that is on no lane fails with `NotFound` without touching the store.
    pub fn delete(&mut self, id: &str) -> Result<Task> {
        let (lane, pos) = self
            .lanes
            .locate(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;

        self.store
            .delete_task(id)
            .inspect_err(|e| error!(%id, error = %e, "failed to delete task"))?;

        let task = self.lanes.lane_mut(lane).remove(pos);
        self.selection.retain(|s| s != id);
        info!(%id, "task deleted");
        Ok(task)
    }

    /// Drag-and-drop: take `id` out of lane `from` and insert it into lane `to` at `index`.
    ///
    /// Crossing lanes writes the new status (and only the status) to the store
    /// first. Reordering within a lane is local. `index` is clamped to the
    /// destination length.
    pub fn move_task(&mut self, id: &str, from: Status, to: Status, index: usize) -> Result<()> {
        let pos = self
            .lanes
            .lane(from)
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;

        if from == to && pos == index {
            return Ok(());
        }

        if from != to {
            self.store
                .update_task(id, &TaskPatch::status(to))
                .inspect_err(|e| error!(%id, error = %e, "failed to move task"))?;
        }

        let mut task = self.lanes.lane_mut(from).remove(pos);
        task.status = to;
        let dest = self.lanes.lane_mut(to);
        let at = index.min(dest.len());
        dest.insert(at, task);
        debug!(%id, %from, %to, index = at, "task moved");
        Ok(())
    }

    /// Move `id` from whatever lane holds it.
    pub fn move_to(&mut self, id: &str, to: Status, index: usize) -> Result<()> {
        let (from, _) = self
            .lanes
            .locate(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        self.move_task(id, from, to, index)
    }

    // -- Selection --

    pub fn selected(&self) -> &[String] {
        &self.selection
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selection.iter().any(|s| s == id)
    }

    pub fn select(&mut self, id: &str) -> Result<()> {
        if !self.lanes.contains(id) {
            return Err(Error::NotFound(id.to_string()));
        }
        if !self.is_selected(id) {
            self.selection.push(id.to_string());
        }
        Ok(())
    }

    pub fn deselect(&mut self, id: &str) {
        self.selection.retain(|s| s != id);
    }

    /// Flip the checkbox for `id`. Returns whether it is selected afterwards.
    pub fn toggle_selected(&mut self, id: &str) -> Result<bool> {
        if self.is_selected(id) {
            self.deselect(id);
            Ok(false)
        } else {
            self.select(id)?;
            Ok(true)
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    // -- Bulk --

    /// Write `status` for every selected task, one store call each.
    ///
    /// Each successful write moves that task to the end of the `status` lane.
    /// Failures are logged and reported; the selection is cleared either way.
    pub fn bulk_set_status(&mut self, status: Status) -> BulkOutcome {
        let ids = std::mem::take(&mut self.selection);
        let mut outcome = BulkOutcome::default();

        for id in ids {
            let Some((lane, pos)) = self.lanes.locate(&id) else {
                warn!(%id, "selected task vanished before bulk status change");
                outcome.fail(id.clone(), &Error::NotFound(id));
                continue;
            };
            if let Err(e) = self.store.update_task(&id, &TaskPatch::status(status)) {
                error!(%id, error = %e, "bulk status change failed");
                outcome.fail(id, &e);
                continue;
            }
            if lane != status {
                let mut task = self.lanes.lane_mut(lane).remove(pos);
                task.status = status;
                self.lanes.lane_mut(status).push(task);
            }
            outcome.succeeded.push(id);
        }

        info!(
            %status,
            succeeded = outcome.succeeded.len(),
            failed = outcome.failed.len(),
            "bulk status change"
        );
        outcome
    }

    /// Delete every selected task. The selection is cleared either way.
    pub fn bulk_delete(&mut self) -> BulkOutcome {
        let ids = std::mem::take(&mut self.selection);
        let mut outcome = BulkOutcome::default();

        for id in ids {
            match self.delete(&id) {
                Ok(_) => outcome.succeeded.push(id),
                Err(e) => outcome.fail(id, &e),
            }
        }

        info!(
            succeeded = outcome.succeeded.len(),
            failed = outcome.failed.len(),
            "bulk delete"
        );
        outcome
    }
}
