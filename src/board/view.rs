//! Read-only projections used by the list and board views.

use crate::models::{CategoryFilter, Task};

/// The filter bar state: a category filter plus a title search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewFilter {
    pub category: CategoryFilter,
    pub query: String,
}

impl ViewFilter {
    pub fn new(category: CategoryFilter, query: impl Into<String>) -> Self {
        ViewFilter {
            category,
            query: query.into(),
        }
    }

    /// Apply the category filter, then the search.
    pub fn apply<'a>(&self, tasks: &'a [Task]) -> Vec<&'a Task> {
        let needle = self.query.to_lowercase();
        tasks
            .iter()
            .filter(|t| self.category.matches(t.category))
            .filter(|t| t.title.to_lowercase().contains(&needle))
            .collect()
    }
}

/// Keep tasks whose category matches `filter`, in order.
pub fn filter_by_category<'a>(tasks: &'a [Task], filter: &CategoryFilter) -> Vec<&'a Task> {
    tasks.iter().filter(|t| filter.matches(t.category)).collect()
}

/// Keep tasks whose title contains `query`, ignoring case. An empty query keeps everything.
pub fn search<'a>(tasks: &'a [Task], query: &str) -> Vec<&'a Task> {
    let needle = query.to_lowercase();
    tasks
        .iter()
        .filter(|t| t.title.to_lowercase().contains(&needle))
        .collect()
}
