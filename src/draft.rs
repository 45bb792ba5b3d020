//! Session-local working copy of the reviewed update's action items.
//!
//! Completion flags live only here; they are never written into an update.

use std::collections::HashMap;

use crate::types::{ActionItem, Update};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftBuffer {
    update_id: Option<String>,
    items: Vec<ActionItem>,
    checked: HashMap<usize, bool>,
}

impl DraftBuffer {
    /// Point the buffer at `update`. Resets items and flags only when the
    /// identity changes; returns whether a reset happened.
    pub fn sync(&mut self, update: &Update) -> bool {
        if self.update_id.as_deref() == Some(update.id.as_str()) {
            return false;
        }
        self.reset_from(update);
        true
    }

    /// Unconditionally reload from `update`, discarding unsaved edits.
    pub fn reset_from(&mut self, update: &Update) {
        self.update_id = Some(update.id.clone());
        self.items = update.action_items.clone();
        self.checked.clear();
    }

    /// Detach from any update.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn update_id(&self) -> Option<&str> {
        self.update_id.as_deref()
    }

    pub fn items(&self) -> &[ActionItem] {
        &self.items
    }

    pub fn is_checked(&self, index: usize) -> bool {
        self.checked.get(&index).copied().unwrap_or(false)
    }

    /// Flip the completion flag for `index`; returns the new value.
    pub fn toggle(&mut self, index: usize) -> bool {
        let flag = self.checked.entry(index).or_insert(false);
        *flag = !*flag;
        *flag
    }

    pub fn checked_count(&self) -> usize {
        self.checked
            .iter()
            .filter(|(index, checked)| **checked && **index < self.items.len())
            .count()
    }

    /// Replace the item at `index`. Returns false if out of range.
    pub fn edit(&mut self, index: usize, item: ActionItem) -> bool {
        match self.items.get_mut(index) {
            Some(slot) => {
                *slot = item;
                true
            }
            None => false,
        }
    }

    pub fn push(&mut self, item: ActionItem) {
        self.items.push(item);
    }

    /// Remove the item at `index`, shifting later flags down with their items.
    pub fn remove(&mut self, index: usize) -> Option<ActionItem> {
        if index >= self.items.len() {
            return None;
        }
        let removed = self.items.remove(index);
        self.checked = self
            .checked
            .drain()
            .filter(|(i, _)| *i != index)
            .map(|(i, v)| if i > index { (i - 1, v) } else { (i, v) })
            .collect();
        Some(removed)
    }

    /// The update with its action items replaced by the draft's items.
    pub fn apply_to(&self, update: &Update) -> Update {
        Update {
            action_items: self.items.clone(),
            ..update.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::normalize_update;
    use serde_json::json;

    fn update_with_items(id: &str, tasks: &[&str]) -> Update {
        let items: Vec<_> = tasks.iter().map(|t| json!({"task": t})).collect();
        normalize_update(&json!({"update_id": id, "action_items": items}), "")
    }

    fn item(task: &str) -> ActionItem {
        ActionItem {
            task: task.to_string(),
            ..ActionItem::default()
        }
    }

    #[test]
    fn test_switching_update_discards_edits_and_flags() {
        let mut draft = DraftBuffer::default();
        assert!(draft.sync(&update_with_items("a", &["one", "two"])));
        draft.toggle(0);
        draft.push(item("unsaved"));

        assert!(draft.sync(&update_with_items("b", &["three"])));
        assert_eq!(draft.items(), &[item("three")]);
        assert!(!draft.is_checked(0));
        assert_eq!(draft.update_id(), Some("b"));
    }

    #[test]
    fn test_same_identity_keeps_draft() {
        let mut draft = DraftBuffer::default();
        let update = update_with_items("a", &["one"]);
        draft.sync(&update);
        draft.toggle(0);
        draft.push(item("two"));

        assert!(!draft.sync(&update));
        assert_eq!(draft.items().len(), 2);
        assert!(draft.is_checked(0));
    }

    #[test]
    fn test_toggle_does_not_touch_items() {
        let mut draft = DraftBuffer::default();
        let update = update_with_items("a", &["one"]);
        draft.sync(&update);
        assert!(draft.toggle(0));
        assert!(!draft.toggle(0));
        assert_eq!(draft.items(), update.action_items.as_slice());
    }

    #[test]
    fn test_remove_shifts_flags() {
        let mut draft = DraftBuffer::default();
        draft.sync(&update_with_items("a", &["one", "two", "three"]));
        draft.toggle(2);
        assert_eq!(draft.remove(0), Some(item("one")));
        assert!(draft.is_checked(1));
        assert!(!draft.is_checked(2));
        assert_eq!(draft.checked_count(), 1);
        assert_eq!(draft.remove(9), None);
    }

    #[test]
    fn test_edit_out_of_range() {
        let mut draft = DraftBuffer::default();
        draft.sync(&update_with_items("a", &["one"]));
        assert!(draft.edit(0, item("uno")));
        assert!(!draft.edit(1, item("dos")));
        assert_eq!(draft.items()[0].task, "uno");
    }

    #[test]
    fn test_apply_to_replaces_only_action_items() {
        let mut draft = DraftBuffer::default();
        let update = update_with_items("a", &["one"]);
        draft.sync(&update);
        draft.push(item("two"));
        let applied = draft.apply_to(&update);
        assert_eq!(applied.action_items.len(), 2);
        assert_eq!(applied.id, update.id);
        assert_eq!(applied.generated_at, update.generated_at);
    }
}
