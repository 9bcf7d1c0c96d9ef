//! Virtual filesystem data types shared across host contracts and the runtime store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Mime type assigned to plain-text documents created by the editor apps.
pub const DEFAULT_TEXT_MIME_TYPE: &str = "text/plain";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
/// Stable identifier of a virtual filesystem item.
pub struct FsItemId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// Virtual filesystem item kind.
pub enum FsItemKind {
    /// File entry with content.
    File,
    /// Folder entry that can hold children.
    Folder,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Node in the virtual filesystem.
///
/// `parent` is a back-reference only; the owning store holds the tree topology. `path` is a
/// denormalized copy of the ancestor chain kept in sync by the store.
pub struct FileSystemItem {
    /// Unique identifier.
    pub id: FsItemId,
    /// Display name, unique among siblings.
    pub name: String,
    /// File or folder.
    pub kind: FsItemKind,
    /// Text content (files only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Content mime type (files only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Content length in bytes (files only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Creation time.
    pub created: DateTime<Utc>,
    /// Last modification time.
    pub modified: DateTime<Utc>,
    /// Parent folder, or `None` for root-level items.
    pub parent: Option<FsItemId>,
    /// Materialized `/`-joined ancestor path.
    pub path: String,
}

impl FileSystemItem {
    /// Returns `true` for folders.
    pub fn is_folder(&self) -> bool {
        matches!(self.kind, FsItemKind::Folder)
    }

    /// Returns `true` for files.
    pub fn is_file(&self) -> bool {
        matches!(self.kind, FsItemKind::File)
    }

    /// Returns the lowercase extension of the item name, if any.
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    fn item(name: &str, kind: FsItemKind) -> FileSystemItem {
        let at = Utc.with_ymd_and_hms(2023, 10, 1, 12, 0, 0).unwrap();
        FileSystemItem {
            id: FsItemId(7),
            name: name.to_string(),
            kind,
            content: None,
            mime_type: None,
            size: None,
            created: at,
            modified: at,
            parent: None,
            path: format!("/{name}"),
        }
    }

    #[test]
    fn kind_serializes_as_lowercase_strings() {
        assert_eq!(
            serde_json::to_value(FsItemKind::Folder).expect("serialize"),
            json!("folder")
        );
        assert_eq!(
            serde_json::to_value(FsItemKind::File).expect("serialize"),
            json!("file")
        );
    }

    #[test]
    fn folder_serialization_omits_file_only_fields() {
        let value = serde_json::to_value(item("Music", FsItemKind::Folder)).expect("serialize");
        assert!(value.get("size").is_none());
        assert!(value.get("content").is_none());
        assert_eq!(value["created"], json!("2023-10-01T12:00:00Z"));
    }

    #[test]
    fn extension_ignores_dotfiles_and_bare_names() {
        assert_eq!(
            item("Report.DOCX", FsItemKind::File).extension().as_deref(),
            Some("docx")
        );
        assert_eq!(item(".profile", FsItemKind::File).extension(), None);
        assert_eq!(item("Makefile", FsItemKind::File).extension(), None);
    }
}
