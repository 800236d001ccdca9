use tracing::trace;

use crate::task::TaskItem;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl CategoryFilter {
    pub fn parse(raw: &str) -> Self {
        match crate::task::normalize_category(raw) {
            None => CategoryFilter::All,
            Some(cat) if cat == "all" => CategoryFilter::All,
            Some(cat) => CategoryFilter::Only(cat),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub search: String,
    pub category: CategoryFilter,
}

impl FilterState {
    pub fn new(search: &str, category: &str) -> Self {
        Self {
            search: search.to_string(),
            category: CategoryFilter::parse(category),
        }
    }
}

// Pure projection: no state of its own, no effect on order or storage.
pub fn visible(task: &TaskItem, filter: &FilterState) -> bool {
    let matches_search = task
        .text
        .to_lowercase()
        .contains(&filter.search.to_lowercase());

    let matches_category = match &filter.category {
        CategoryFilter::All => true,
        CategoryFilter::Only(cat) => task.category.as_deref() == Some(cat.as_str()),
    };

    trace!(text = %task.text, matches_search, matches_category, "visibility");
    matches_search && matches_category
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<TaskItem> {
        vec![
            TaskItem::new("Buy milk", "home").expect("task"),
            TaskItem::new("Write report", "work").expect("task"),
        ]
    }

    fn visible_texts(tasks: &[TaskItem], filter: &FilterState) -> Vec<String> {
        tasks
            .iter()
            .filter(|t| visible(t, filter))
            .map(|t| t.text.clone())
            .collect()
    }

    #[test]
    fn search_is_case_insensitive() {
        let tasks = sample();
        let filter = FilterState::new("write", "all");
        assert_eq!(visible_texts(&tasks, &filter), vec!["Write report"]);
    }

    #[test]
    fn category_filter_selects_only_that_category() {
        let tasks = sample();
        let filter = FilterState::new("", "home");
        assert_eq!(visible_texts(&tasks, &filter), vec!["Buy milk"]);
    }

    #[test]
    fn no_match_yields_empty() {
        let tasks = sample();
        let filter = FilterState::new("xyz", "all");
        assert!(visible_texts(&tasks, &filter).is_empty());
    }

    #[test]
    fn uncategorized_task_matches_only_all() {
        let task = TaskItem::new("Mystery", "").expect("task");
        assert!(visible(&task, &FilterState::new("", "all")));
        assert!(!visible(&task, &FilterState::new("", "other")));
        assert!(!visible(&task, &FilterState::new("", "work")));
    }

    #[test]
    fn category_filter_value_is_normalized() {
        let tasks = sample();
        let filter = FilterState::new("", "  WORK ");
        assert_eq!(visible_texts(&tasks, &filter), vec!["Write report"]);
    }
}
