use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::TaskError;
use crate::reorder::{ItemBox, insertion_anchor};
use crate::task::TaskItem;

// Owns the ordered collection. Mutations here are purely in-memory; the
// app layer persists the full list after every accepted mutation.
#[derive(Debug, Default)]
pub struct TaskList {
    items: Vec<TaskItem>,
    pending_delete: Option<Uuid>,
}

impl TaskList {
    pub fn new(items: Vec<TaskItem>) -> Self {
        Self {
            items,
            pending_delete: None,
        }
    }

    pub fn items(&self) -> &[TaskItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&TaskItem> {
        self.items.iter().find(|task| task.id == id)
    }

    fn position(&self, id: Uuid) -> Option<usize> {
        self.items.iter().position(|task| task.id == id)
    }

    pub fn ref_at(&self, index: usize) -> Option<Uuid> {
        self.items.get(index).map(|task| task.id)
    }

    pub fn add(&mut self, text: &str, category: &str) -> Result<&TaskItem, TaskError> {
        let task = TaskItem::new(text, category)?;
        debug!(text = %task.text, category = ?task.category, "appending task");
        self.items.push(task);
        let index = self.items.len() - 1;
        Ok(&self.items[index])
    }

    pub fn toggle(&mut self, id: Uuid) -> bool {
        let Some(index) = self.position(id) else {
            debug!(%id, "toggle on missing task ignored");
            return false;
        };
        self.items[index].completed = !self.items[index].completed;
        true
    }

    // Deletion is confirm-gated. Requesting the same task again while its
    // confirmation is pending re-confirms the existing request; requesting
    // another task replaces the pending one.
    pub fn request_delete(&mut self, id: Uuid) -> Option<&TaskItem> {
        if self.position(id).is_none() {
            debug!(%id, "delete request for missing task ignored");
            return None;
        }
        self.pending_delete = Some(id);
        self.get(id)
    }

    pub fn pending_delete(&self) -> Option<&TaskItem> {
        self.pending_delete.and_then(|id| self.get(id))
    }

    pub fn confirm_delete(&mut self) -> Option<TaskItem> {
        let id = self.pending_delete.take()?;
        let Some(index) = self.position(id) else {
            warn!(%id, "pending delete vanished before confirmation");
            return None;
        };
        let removed = self.items.remove(index);
        debug!(text = %removed.text, "deleted task");
        Some(removed)
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    pub fn reorder(&mut self, id: Uuid, before: Option<Uuid>) -> bool {
        let Some(from) = self.position(id) else {
            debug!(%id, "reorder of missing task ignored");
            return false;
        };

        let mut to = match before {
            Some(anchor) => {
                if anchor == id {
                    return false;
                }
                let Some(anchor_pos) = self.position(anchor) else {
                    debug!(%anchor, "reorder before missing anchor ignored");
                    return false;
                };
                anchor_pos
            }
            None => self.items.len(),
        };

        let task = self.items.remove(from);
        if from < to {
            to -= 1;
        }
        self.items.insert(to, task);
        debug!(from, to, "reordered task");
        true
    }

    // Drag path: `boxes` holds the geometry of every item except the dragged
    // one, in list order.
    pub fn reorder_to_pointer(&mut self, id: Uuid, pointer_y: f64, boxes: &[ItemBox]) -> bool {
        if self.position(id).is_none() {
            debug!(%id, "drag of missing task ignored");
            return false;
        }

        let others: Vec<Uuid> = self
            .items
            .iter()
            .filter(|task| task.id != id)
            .map(|task| task.id)
            .collect();
        if others.len() != boxes.len() {
            warn!(
                items = others.len(),
                boxes = boxes.len(),
                "drag layout out of sync with list"
            );
            return false;
        }

        let before = insertion_anchor(boxes, pointer_y).and_then(|index| others.get(index).copied());
        self.reorder(id, before)
    }

    pub fn counts(&self) -> (usize, usize) {
        let completed = self.items.iter().filter(|task| task.completed).count();
        (completed, self.items.len())
    }
}
