use tracing::{debug, instrument};
use uuid::Uuid;

use crate::codec;
use crate::error::TaskError;
use crate::filter::{CategoryFilter, FilterState, visible};
use crate::list::TaskList;
use crate::reorder::ItemBox;
use crate::store::KvStore;
use crate::task::TaskItem;
use crate::theme::Theme;

#[derive(Debug, Clone)]
pub enum Event {
    Added { text: String, category: String },
    Toggled(Uuid),
    DeleteRequested(Uuid),
    DeleteConfirmed,
    DeleteCancelled,
    Reordered { item: Uuid, before: Option<Uuid> },
    DragMoved {
        item: Uuid,
        pointer_y: f64,
        layout: Vec<ItemBox>,
    },
    SearchChanged(String),
    CategoryChanged(String),
    ThemeToggled,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Transition {
    Changed,
    Unchanged,
    Rejected(TaskError),
}

// The whole application state, owned explicitly rather than scattered
// through a UI layer. Every accepted mutation rewrites the full persisted
// record; filter changes are view-only and persist nothing.
pub struct App<S: KvStore> {
    pub list: TaskList,
    pub theme: Theme,
    pub filter: FilterState,
    store: S,
}

impl<S: KvStore> App<S> {
    #[instrument(skip(store))]
    pub fn load(store: S) -> Self {
        let (items, theme) = codec::load(&store);
        Self {
            list: TaskList::new(items),
            theme,
            filter: FilterState::default(),
            store,
        }
    }

    #[instrument(skip(self, event))]
    pub fn handle(&mut self, event: Event) -> anyhow::Result<Transition> {
        let transition = match event {
            Event::Added { text, category } => match self.list.add(&text, &category) {
                Ok(task) => {
                    debug!(text = %task.text, "task added");
                    Transition::Changed
                }
                Err(err) => Transition::Rejected(err),
            },
            Event::Toggled(id) => {
                if self.list.toggle(id) {
                    Transition::Changed
                } else {
                    Transition::Unchanged
                }
            }
            Event::DeleteRequested(id) => {
                // Nothing is persisted until the confirmation lands.
                self.list.request_delete(id);
                return Ok(Transition::Unchanged);
            }
            Event::DeleteConfirmed => {
                if self.list.confirm_delete().is_some() {
                    Transition::Changed
                } else {
                    Transition::Unchanged
                }
            }
            Event::DeleteCancelled => {
                self.list.cancel_delete();
                return Ok(Transition::Unchanged);
            }
            Event::Reordered { item, before } => {
                if self.list.reorder(item, before) {
                    Transition::Changed
                } else {
                    Transition::Unchanged
                }
            }
            Event::DragMoved {
                item,
                pointer_y,
                layout,
            } => {
                if self.list.reorder_to_pointer(item, pointer_y, &layout) {
                    Transition::Changed
                } else {
                    Transition::Unchanged
                }
            }
            Event::SearchChanged(search) => {
                self.filter.search = search;
                return Ok(Transition::Unchanged);
            }
            Event::CategoryChanged(category) => {
                self.filter.category = CategoryFilter::parse(&category);
                return Ok(Transition::Unchanged);
            }
            Event::ThemeToggled => {
                self.theme = self.theme.toggled();
                Transition::Changed
            }
        };

        if transition == Transition::Changed {
            self.persist()?;
        }
        Ok(transition)
    }

    pub fn visible_items(&self) -> Vec<&TaskItem> {
        self.list
            .items()
            .iter()
            .filter(|task| visible(task, &self.filter))
            .collect()
    }

    pub fn replace_items(&mut self, items: Vec<TaskItem>) -> anyhow::Result<()> {
        self.list = TaskList::new(items);
        self.persist()
    }

    fn persist(&mut self) -> anyhow::Result<()> {
        codec::save(&mut self.store, self.list.items(), self.theme)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemStore;

    fn app() -> App<MemStore> {
        App::load(MemStore::new())
    }

    fn added(text: &str, category: &str) -> Event {
        Event::Added {
            text: text.to_string(),
            category: category.to_string(),
        }
    }

    #[test]
    fn add_persists_and_survives_reload() {
        let mut app = app();
        assert_eq!(
            app.handle(added("Buy milk", "Home")).expect("handle"),
            Transition::Changed
        );
        assert_eq!(app.handle(Event::ThemeToggled).expect("handle"), Transition::Changed);

        let reloaded = App::load(app.store);
        assert_eq!(reloaded.list.len(), 1);
        assert_eq!(reloaded.list.items()[0].category.as_deref(), Some("home"));
        assert!(!reloaded.list.items()[0].completed);
        assert_eq!(reloaded.theme, Theme::Dark);
    }

    #[test]
    fn rejected_add_changes_nothing() {
        let mut app = app();
        assert_eq!(
            app.handle(added("   ", "work")).expect("handle"),
            Transition::Rejected(TaskError::EmptyInput)
        );
        assert!(app.list.is_empty());

        let reloaded = App::load(app.store);
        assert!(reloaded.list.is_empty());
    }

    #[test]
    fn reorder_event_survives_reload() {
        let mut app = app();
        for text in ["a", "b", "c"] {
            app.handle(added(text, "work")).expect("handle");
        }
        let a = app.list.ref_at(0).expect("ref");
        let c = app.list.ref_at(2).expect("ref");

        app.handle(Event::Reordered {
            item: c,
            before: Some(a),
        })
        .expect("handle");

        let reloaded = App::load(app.store);
        let texts: Vec<&str> = reloaded.list.items().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["c", "a", "b"]);
    }

    #[test]
    fn cancelled_delete_keeps_storage_untouched() {
        let mut app = app();
        app.handle(added("keep me", "work")).expect("handle");
        let id = app.list.ref_at(0).expect("ref");

        app.handle(Event::DeleteRequested(id)).expect("handle");
        app.handle(Event::DeleteCancelled).expect("handle");
        assert_eq!(app.handle(Event::DeleteConfirmed).expect("handle"), Transition::Unchanged);

        let reloaded = App::load(app.store);
        assert_eq!(reloaded.list.len(), 1);
    }

    #[test]
    fn confirmed_delete_removes_one_and_persists() {
        let mut app = app();
        app.handle(added("a", "work")).expect("handle");
        app.handle(added("b", "work")).expect("handle");
        let b = app.list.ref_at(1).expect("ref");

        app.handle(Event::DeleteRequested(b)).expect("handle");
        assert_eq!(app.handle(Event::DeleteConfirmed).expect("handle"), Transition::Changed);

        let reloaded = App::load(app.store);
        let texts: Vec<&str> = reloaded.list.items().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["a"]);
    }

    #[test]
    fn drag_event_reorders_through_the_engine() {
        let mut app = app();
        for text in ["a", "b", "c"] {
            app.handle(added(text, "work")).expect("handle");
        }
        let c = app.list.ref_at(2).expect("ref");

        app.handle(Event::DragMoved {
            item: c,
            pointer_y: 5.0,
            layout: vec![ItemBox::new(0.0, 40.0), ItemBox::new(40.0, 40.0)],
        })
        .expect("handle");

        let texts: Vec<&str> = app.list.items().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["c", "a", "b"]);
    }

    #[test]
    fn filter_events_update_visibility_without_persisting() {
        let mut app = app();
        app.handle(added("Buy milk", "home")).expect("handle");
        app.handle(added("Write report", "work")).expect("handle");

        app.handle(Event::SearchChanged("write".to_string())).expect("handle");
        let texts: Vec<&str> = app.visible_items().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["Write report"]);

        app.handle(Event::SearchChanged(String::new())).expect("handle");
        app.handle(Event::CategoryChanged("home".to_string())).expect("handle");
        let texts: Vec<&str> = app.visible_items().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["Buy milk"]);
    }
}
