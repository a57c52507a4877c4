//! Ordered-list operations shared by every entry collection.

use super::model::{CustomSectionEntry, ExperienceEntry};

/// Entries addressed by a stable string id.
pub trait Identified {
    fn id(&self) -> &str;
}

impl Identified for ExperienceEntry {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for CustomSectionEntry {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Removes the item at `from` and reinserts it at `to`.
/// Returns `false` and leaves the list untouched when either index is out of range.
pub fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from >= items.len() || to >= items.len() {
        return false;
    }
    if from != to {
        let item = items.remove(from);
        items.insert(to, item);
    }
    true
}

pub fn remove_by_id<T: Identified>(items: &mut Vec<T>, id: &str) -> bool {
    let before = items.len();
    items.retain(|item| item.id() != id);
    items.len() != before
}

pub fn find_by_id_mut<'a, T: Identified>(items: &'a mut [T], id: &str) -> Option<&'a mut T> {
    items.iter_mut().find(|item| item.id() == id)
}

pub fn find_by_id<'a, T: Identified>(items: &'a [T], id: &str) -> Option<&'a T> {
    items.iter().find(|item| item.id() == id)
}
