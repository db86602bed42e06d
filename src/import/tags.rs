//! Grouping of request items into folders by tag

use crate::models::{FolderItem, Item};

/// Collects items into one bucket per tag, in first-seen order.
///
/// Items without a tag stay at the top level, after every folder.
#[derive(Debug, Default)]
pub struct TagGrouper {
    buckets: Vec<(String, Vec<Item>)>,
    ungrouped: Vec<Item>,
}

impl TagGrouper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item under `tag`, or to the top level when there is none
    pub fn push(&mut self, tag: Option<&str>, item: Item) {
        let Some(tag) = tag else {
            self.ungrouped.push(item);
            return;
        };
        match self.buckets.iter_mut().find(|(name, _)| name == tag) {
            Some((_, items)) => items.push(item),
            None => self.buckets.push((tag.to_string(), vec![item])),
        }
    }

    /// Folders for each tag followed by the ungrouped items
    pub fn into_items(self) -> Vec<Item> {
        self.buckets
            .into_iter()
            .map(|(name, items)| Item::Folder(FolderItem::new(name, items)))
            .chain(self.ungrouped)
            .collect()
    }
}
