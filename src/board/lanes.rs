use serde::Serialize;

use crate::models::{Status, Task};

/// Tasks partitioned by status. Each lane keeps the display order of its tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Lanes {
    pub todo: Vec<Task>,
    pub in_progress: Vec<Task>,
    pub completed: Vec<Task>,
}

impl Lanes {
    /// Group tasks into lanes by their status field, keeping enumeration order.
    pub fn partition(tasks: Vec<Task>) -> Self {
        let mut lanes = Lanes::default();
        for task in tasks {
            lanes.lane_mut(task.status).push(task);
        }
        lanes
    }

    pub fn lane(&self, status: Status) -> &[Task] {
        match status {
            Status::Todo => &self.todo,
            Status::InProgress => &self.in_progress,
            Status::Completed => &self.completed,
        }
    }

    pub(crate) fn lane_mut(&mut self, status: Status) -> &mut Vec<Task> {
        match status {
            Status::Todo => &mut self.todo,
            Status::InProgress => &mut self.in_progress,
            Status::Completed => &mut self.completed,
        }
    }

    /// Find the lane and position holding `id`.
    pub fn locate(&self, id: &str) -> Option<(Status, usize)> {
        Status::ALL.into_iter().find_map(|status| {
            self.lane(status)
                .iter()
                .position(|t| t.id == id)
                .map(|idx| (status, idx))
        })
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.locate(id).map(|(status, idx)| &self.lane(status)[idx])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.locate(id).is_some()
    }

    /// Iterate `(status, task)` over all lanes in display order.
    pub fn iter(&self) -> impl Iterator<Item = (Status, &Task)> {
        Status::ALL
            .into_iter()
            .flat_map(move |status| self.lane(status).iter().map(move |t| (status, t)))
    }

    pub fn len(&self) -> usize {
        self.todo.len() + self.in_progress.len() + self.completed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
