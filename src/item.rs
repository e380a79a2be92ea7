use crate::constants::{
    ICON_TINT_LIGHTNESS, ICON_TINT_SATURATION_MIN, ICON_TINT_SATURATION_RANGE, ITEM_HEIGHT,
    ITEM_WIDTH, Z_RESTING,
};
use eframe::egui::{self, Pos2, Rect, Vec2};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Folder,
    File,
}

/// A folder or file record from the workspace listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub kind: EntryKind,
    pub id: String,
    pub name: String,
}

impl DirectoryEntry {
    pub fn folder(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: EntryKind::Folder,
            id: id.into(),
            name: name.into(),
        }
    }

    pub fn file(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: EntryKind::File,
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Listing entry as the backend sends it. Extra fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteEntry {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

impl RemoteEntry {
    pub fn into_entry(self, kind: EntryKind) -> DirectoryEntry {
        DirectoryEntry {
            kind,
            id: self.id,
            name: self.name,
        }
    }
}

/// One complete listing. Folders and files always travel together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectorySnapshot {
    pub folders: Vec<DirectoryEntry>,
    pub files: Vec<DirectoryEntry>,
}

#[derive(Deserialize)]
pub(crate) struct RemoteSnapshot {
    #[serde(default, deserialize_with = "null_as_empty")]
    folders: Vec<RemoteEntry>,
    #[serde(default, deserialize_with = "null_as_empty")]
    files: Vec<RemoteEntry>,
}

// The backend serializes empty slices as `null`.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<RemoteEntry>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<RemoteEntry>>::deserialize(deserializer)?.unwrap_or_default())
}

impl From<RemoteSnapshot> for DirectorySnapshot {
    fn from(remote: RemoteSnapshot) -> Self {
        Self {
            folders: remote
                .folders
                .into_iter()
                .map(|e| e.into_entry(EntryKind::Folder))
                .collect(),
            files: remote
                .files
                .into_iter()
                .map(|e| e.into_entry(EntryKind::File))
                .collect(),
        }
    }
}

/// The upload response: the backend's freshly created file record, trusted as-is
/// apart from keeping the position finite.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadedRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
    #[serde(default)]
    pub icon: Option<usize>,
}

impl UploadedRecord {
    pub fn into_canvas_item(self, fallback_icon: usize) -> CanvasItem {
        let position = egui::pos2(finite_or_zero(self.x), finite_or_zero(self.y));
        let icon_index = self.icon.unwrap_or(fallback_icon);
        CanvasItem::new(DirectoryEntry::file(self.id, self.name), position, icon_index)
    }
}

fn finite_or_zero(value: Option<f64>) -> f32 {
    value
        .map(|v| v as f32)
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// A positioned icon on the desk.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasItem {
    pub entry: DirectoryEntry,
    pub position: Pos2,
    pub z_index: i32,
    pub icon_index: usize,
    /// Stamp of the last displacement folded into `position`.
    pub(crate) last_stamp: Option<u64>,
}

impl CanvasItem {
    pub fn new(entry: DirectoryEntry, position: Pos2, icon_index: usize) -> Self {
        Self {
            entry,
            position,
            z_index: Z_RESTING,
            icon_index,
            last_stamp: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.entry.id
    }

    pub fn is_folder(&self) -> bool {
        self.entry.kind == EntryKind::Folder
    }

    pub fn size() -> Vec2 {
        egui::vec2(ITEM_WIDTH, ITEM_HEIGHT)
    }

    pub fn rect(&self) -> Rect {
        Rect::from_min_size(self.position, Self::size())
    }

    pub fn icon_tint(&self) -> egui::Color32 {
        tint_from_icon_index(self.icon_index)
    }
}

fn tint_from_icon_index(icon_index: usize) -> egui::Color32 {
    // Golden-ratio stepping keeps neighbouring indices visually distinct.
    let h = (icon_index as f32 * 0.618_034).fract();
    let s = ICON_TINT_SATURATION_MIN + ((icon_index % 7) as f32 / 6.0) * ICON_TINT_SATURATION_RANGE;
    egui::Color32::from(egui::epaint::Hsva::new(h, s, ICON_TINT_LIGHTNESS, 1.0))
}
