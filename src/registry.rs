//! The authoritative list of canvas items and their positions.
//!
//! Item positions and z-order only change through the operations here; the drag
//! controller, the loader and the drop zone all funnel their mutations through
//! this type on the UI thread.

use crate::constants::{INITIAL_ROW_Y, ITEM_SPACING_X, Z_DRAGGING, Z_RESTING};
use crate::error::{DeskError, DeskResult};
use crate::item::{CanvasItem, DirectoryEntry, DirectorySnapshot};
use eframe::egui::{pos2, Pos2, Vec2};
use std::collections::HashSet;

/// A relative move tagged with a monotonically increasing stamp. A stamp that
/// was already folded into an item's position is ignored when seen again.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Displacement {
    pub stamp: u64,
    pub delta: Vec2,
}

#[derive(Default)]
pub struct ItemRegistry {
    items: Vec<CanvasItem>,
}

impl ItemRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Collection Access
    // ─────────────────────────────────────────────────────────────────────────────

    pub fn items(&self) -> &[CanvasItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    pub fn get(&self, id: &str) -> Option<&CanvasItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    fn get_mut(&mut self, id: &str) -> DeskResult<&mut CanvasItem> {
        self.items
            .iter_mut()
            .find(|item| item.id() == id)
            .ok_or_else(|| DeskError::UnknownItem(id.to_string()))
    }

    pub fn folder_count(&self) -> usize {
        self.items.iter().filter(|item| item.is_folder()).count()
    }

    pub fn file_count(&self) -> usize {
        self.items.iter().filter(|item| !item.is_folder()).count()
    }

    /// Icon hint for an item appended after everything currently on the desk.
    pub fn next_icon_index(&self) -> usize {
        self.items.len() + 1
    }

    /// The item currently raised above the rest, if any.
    pub fn elevated(&self) -> Option<&CanvasItem> {
        self.items.iter().find(|item| item.z_index == Z_DRAGGING)
    }

    /// Indices in paint order: insertion order, raised items last.
    pub fn render_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.items.len()).collect();
        order.sort_by_key(|&i| self.items[i].z_index);
        order
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Population
    // ─────────────────────────────────────────────────────────────────────────────

    /// Replaces every item with a fresh layout of `folders` then `files`.
    ///
    /// Folders and files each count their own column from zero, so folder `i` and
    /// file `i` share the same `x`. Icon hints run on across both lists.
    pub fn populate_initial(&mut self, folders: &[DirectoryEntry], files: &[DirectoryEntry]) {
        let mut seen = HashSet::new();
        let mut items = Vec::with_capacity(folders.len() + files.len());

        let laid_out = folders
            .iter()
            .enumerate()
            .map(|(index, entry)| (entry, index, index + 1))
            .chain(
                files
                    .iter()
                    .enumerate()
                    .map(|(index, entry)| (entry, index, index + folders.len() + 1)),
            );

        for (entry, column, icon_index) in laid_out {
            if !seen.insert(entry.id.as_str()) {
                log::warn!("Listing repeats item {}; keeping the first", entry.id);
                continue;
            }
            let position = pos2(column as f32 * ITEM_SPACING_X, INITIAL_ROW_Y);
            items.push(CanvasItem::new(entry.clone(), position, icon_index));
        }

        self.items = items;
    }

    pub fn apply_snapshot(&mut self, snapshot: &DirectorySnapshot) {
        self.populate_initial(&snapshot.folders, &snapshot.files);
    }

    /// Adds an item after all existing ones. Existing items are left untouched.
    pub fn append(&mut self, item: CanvasItem) -> DeskResult<()> {
        if self.index_of(item.id()).is_some() {
            return Err(DeskError::DuplicateItem(item.id().to_string()));
        }
        if !(item.position.x.is_finite() && item.position.y.is_finite()) {
            return Err(DeskError::UploadFailure(format!(
                "item {} has a non-finite position",
                item.id()
            )));
        }
        self.items.push(item);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Position & Z-Order
    // ─────────────────────────────────────────────────────────────────────────────

    /// Folds `displacement` into the item's latest stored position and returns the
    /// result. Replaying an already-applied stamp changes nothing.
    pub fn update_position(&mut self, id: &str, displacement: Displacement) -> DeskResult<Pos2> {
        let item = self.get_mut(id)?;

        if item
            .last_stamp
            .is_some_and(|applied| displacement.stamp <= applied)
        {
            return Ok(item.position);
        }

        let next = item.position + displacement.delta;
        if !(next.x.is_finite() && next.y.is_finite()) {
            log::warn!("Ignoring non-finite move of {id}: {:?}", displacement.delta);
            return Ok(item.position);
        }

        item.position = next;
        item.last_stamp = Some(displacement.stamp);
        Ok(next)
    }

    pub fn set_dragging(&mut self, id: &str, is_dragging: bool) -> DeskResult<()> {
        let item = self.get_mut(id)?;
        item.z_index = if is_dragging { Z_DRAGGING } else { Z_RESTING };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::vec2;

    fn step(stamp: u64, dx: f32, dy: f32) -> Displacement {
        Displacement {
            stamp,
            delta: vec2(dx, dy),
        }
    }

    fn sample() -> ItemRegistry {
        let mut registry = ItemRegistry::new();
        registry.populate_initial(
            &[
                DirectoryEntry::folder("f1", "Docs"),
                DirectoryEntry::folder("f2", "Music"),
            ],
            &[
                DirectoryEntry::file("x1", "a.txt"),
                DirectoryEntry::file("x2", "b.txt"),
                DirectoryEntry::file("x3", "c.txt"),
            ],
        );
        registry
    }

    #[test]
    fn test_layout_uses_independent_counters() {
        let registry = sample();
        let positions: Vec<(String, Pos2)> = registry
            .items()
            .iter()
            .map(|item| (item.id().to_string(), item.position))
            .collect();
        assert_eq!(
            positions,
            vec![
                ("f1".to_string(), pos2(0.0, 0.0)),
                ("f2".to_string(), pos2(120.0, 0.0)),
                ("x1".to_string(), pos2(0.0, 0.0)),
                ("x2".to_string(), pos2(120.0, 0.0)),
                ("x3".to_string(), pos2(240.0, 0.0)),
            ]
        );
    }

    #[test]
    fn test_icon_indices_run_across_both_lists() {
        let registry = sample();
        let icons: Vec<usize> = registry.items().iter().map(|i| i.icon_index).collect();
        assert_eq!(icons, vec![1, 2, 3, 4, 5]);
        assert_eq!(registry.folder_count(), 2);
        assert_eq!(registry.file_count(), 3);
    }

    #[test]
    fn test_populate_replaces_everything() {
        let mut registry = sample();
        registry.populate_initial(&[], &[DirectoryEntry::file("y1", "new.md")]);
        assert_eq!(registry.len(), 1);
        assert!(registry.get("f1").is_none());
        assert_eq!(registry.get("y1").unwrap().icon_index, 1);
    }

    #[test]
    fn test_populate_drops_repeated_ids() {
        let mut registry = ItemRegistry::new();
        registry.populate_initial(
            &[DirectoryEntry::folder("dup", "first")],
            &[DirectoryEntry::file("dup", "second")],
        );
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("dup").unwrap().entry.name, "first");
    }

    #[test]
    fn test_append_keeps_existing_positions() {
        let mut registry = sample();
        let before: Vec<Pos2> = registry.items().iter().map(|i| i.position).collect();

        let item = CanvasItem::new(DirectoryEntry::file("u1", "up.bin"), pos2(300.0, 40.0), 6);
        registry.append(item).unwrap();

        assert_eq!(registry.len(), 6);
        assert_eq!(registry.items().last().unwrap().id(), "u1");
        let after: Vec<Pos2> = registry.items()[..5].iter().map(|i| i.position).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_append_rejects_existing_id() {
        let mut registry = sample();
        let clash = CanvasItem::new(DirectoryEntry::file("x1", "other"), pos2(9.0, 9.0), 99);
        assert!(matches!(
            registry.append(clash),
            Err(DeskError::DuplicateItem(id)) if id == "x1"
        ));
        assert_eq!(registry.len(), 5);
        assert_eq!(registry.get("x1").unwrap().entry.name, "a.txt");
    }

    #[test]
    fn test_update_position_accumulates() {
        let mut registry = sample();
        registry.update_position("x1", step(1, 50.0, 20.0)).unwrap();
        let end = registry.update_position("x1", step(2, 10.0, 0.0)).unwrap();
        assert_eq!(end, pos2(60.0, 20.0));
        assert_eq!(registry.get("x1").unwrap().position, pos2(60.0, 20.0));
    }

    #[test]
    fn test_update_position_replay_is_noop() {
        let mut registry = sample();
        registry.update_position("f2", step(7, 5.0, 5.0)).unwrap();
        registry.update_position("f2", step(7, 5.0, 5.0)).unwrap();
        registry.update_position("f2", step(3, 100.0, 100.0)).unwrap();
        assert_eq!(registry.get("f2").unwrap().position, pos2(125.0, 5.0));
    }

    #[test]
    fn test_update_position_rejects_non_finite() {
        let mut registry = sample();
        let pos = registry
            .update_position("f1", step(1, f32::NAN, 3.0))
            .unwrap();
        assert_eq!(pos, pos2(0.0, 0.0));
        registry
            .update_position("f1", step(2, 1.0, f32::INFINITY))
            .unwrap();
        assert!(registry.get("f1").unwrap().position.x.is_finite());
    }

    #[test]
    fn test_update_unknown_item() {
        let mut registry = sample();
        assert!(matches!(
            registry.update_position("nope", step(1, 1.0, 1.0)),
            Err(DeskError::UnknownItem(_))
        ));
    }

    #[test]
    fn test_set_dragging_raises_and_lowers() {
        let mut registry = sample();
        registry.set_dragging("x2", true).unwrap();
        assert_eq!(registry.elevated().unwrap().id(), "x2");
        assert!(registry
            .items()
            .iter()
            .filter(|i| i.id() != "x2")
            .all(|i| i.z_index == Z_RESTING));
        assert_eq!(*registry.render_order().last().unwrap(), 3);

        registry.set_dragging("x2", false).unwrap();
        assert!(registry.elevated().is_none());
        assert_eq!(registry.render_order(), vec![0, 1, 2, 3, 4]);
    }
}
