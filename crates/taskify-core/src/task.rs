use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TaskError;

pub const BUILTIN_CATEGORIES: &[&str] = &["work", "personal", "other"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskItem {
    #[serde(skip, default = "Uuid::new_v4")]
    pub id: Uuid,

    pub text: String,

    // None only for items restored from records predating the category
    // field; such items match no single-category filter, only "all".
    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub completed: bool,
}

impl TaskItem {
    pub fn new(text: &str, category: &str) -> Result<Self, TaskError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TaskError::EmptyInput);
        }

        Ok(Self {
            id: Uuid::new_v4(),
            text: text.to_string(),
            category: normalize_category(category),
            completed: false,
        })
    }

    pub fn badge(&self) -> &str {
        self.category.as_deref().unwrap_or("")
    }
}

pub fn normalize_category(raw: &str) -> Option<String> {
    let cat = raw.trim().to_lowercase();
    if cat.is_empty() { None } else { Some(cat) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_trims_text_and_lowercases_category() {
        let task = TaskItem::new("  Buy milk  ", "Home").expect("valid task");
        assert_eq!(task.text, "Buy milk");
        assert_eq!(task.category.as_deref(), Some("home"));
        assert!(!task.completed);
    }

    #[test]
    fn new_rejects_blank_text() {
        assert!(matches!(
            TaskItem::new("   ", "work"),
            Err(TaskError::EmptyInput)
        ));
        assert!(matches!(TaskItem::new("", "work"), Err(TaskError::EmptyInput)));
    }

    #[test]
    fn blank_category_is_unset() {
        let task = TaskItem::new("Call dentist", "  ").expect("valid task");
        assert_eq!(task.category, None);
        assert_eq!(task.badge(), "");
    }
}
