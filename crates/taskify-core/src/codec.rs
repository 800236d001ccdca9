use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::store::KvStore;
use crate::task::TaskItem;
use crate::theme::Theme;

pub const DATA_KEY: &str = "data";
pub const THEME_KEY: &str = "theme";

// Persisted shape of one task. Reads stay tolerant of records written by
// older versions: `badge` predates the category field, `checked` predates
// the completed flag, and anything else (delete controls and the like) is
// simply dropped on the floor.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredItem {
    text: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    category: Option<String>,

    #[serde(default, skip_serializing)]
    badge: Option<String>,

    #[serde(default, alias = "checked")]
    completed: bool,
}

impl From<&TaskItem> for StoredItem {
    fn from(task: &TaskItem) -> Self {
        Self {
            text: task.text.clone(),
            category: task.category.clone(),
            badge: None,
            completed: task.completed,
        }
    }
}

pub fn items_to_json(items: &[TaskItem]) -> anyhow::Result<String> {
    let records: Vec<StoredItem> = items.iter().map(StoredItem::from).collect();
    Ok(serde_json::to_string(&records)?)
}

// Parses a persisted payload, applying normalization. Import uses this too,
// so an exported file and a legacy store record go through the same repair.
pub fn items_from_json(raw: &str) -> anyhow::Result<Vec<TaskItem>> {
    let records: Vec<StoredItem> = serde_json::from_str(raw)?;
    Ok(normalize(records))
}

#[tracing::instrument(skip(store, items))]
pub fn save(store: &mut dyn KvStore, items: &[TaskItem], theme: Theme) -> anyhow::Result<()> {
    let payload = items_to_json(items)?;

    store.set(DATA_KEY, &payload)?;
    store.set(THEME_KEY, theme.as_str())?;

    debug!(count = items.len(), theme = theme.as_str(), "saved state");
    Ok(())
}

// Load never fails: a missing, unreadable, or malformed record yields the
// empty list and the default theme. Normalization runs on every load since
// the record on disk may have been written by an older version.
#[tracing::instrument(skip(store))]
pub fn load(store: &dyn KvStore) -> (Vec<TaskItem>, Theme) {
    let items = match store.get(DATA_KEY) {
        Ok(Some(raw)) => match items_from_json(&raw) {
            Ok(items) => items,
            Err(err) => {
                warn!(error = %err, "malformed task record, starting empty");
                Vec::new()
            }
        },
        Ok(None) => Vec::new(),
        Err(err) => {
            warn!(error = %err, "store unreadable, starting empty");
            Vec::new()
        }
    };

    let theme = match store.get(THEME_KEY) {
        Ok(Some(raw)) => Theme::parse_lossy(&raw),
        Ok(None) => Theme::default(),
        Err(err) => {
            warn!(error = %err, "theme unreadable, using default");
            Theme::default()
        }
    };

    debug!(count = items.len(), theme = theme.as_str(), "loaded state");
    (items, theme)
}

fn normalize(records: Vec<StoredItem>) -> Vec<TaskItem> {
    records
        .into_iter()
        .filter_map(|record| {
            let text = record.text.trim().to_string();
            if text.is_empty() {
                warn!("dropping restored item with empty text");
                return None;
            }

            let category = record
                .category
                .as_deref()
                .or(record.badge.as_deref())
                .and_then(crate::task::normalize_category);

            Some(TaskItem {
                id: uuid::Uuid::new_v4(),
                text,
                category,
                completed: record.completed,
            })
        })
        .collect()
}
