//! Virtual filesystem store: a flat item list with parent pointers and cached paths.
//!
//! [`reduce_vfs`] is the only writer. Every successful mutation keeps two invariants intact: the
//! parent graph is acyclic, and each item's `path` equals the `/`-joined names of its ancestors.

use std::cmp::Ordering;

use chrono::{DateTime, TimeZone, Utc};
use platform_host::{
    join_child_path, normalize_virtual_path, rebase_descendant_path, FileSystemItem, FsItemId,
    FsItemKind, DEFAULT_TEXT_MIME_TYPE,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::SortDirection;
use crate::notifications::NotificationDraft;
use crate::reducer::RuntimeEffect;

/// Schema version written with every persisted [`VfsSnapshot`].
pub const VFS_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Persisted form of the virtual filesystem.
pub struct VfsSnapshot {
    /// Snapshot schema version.
    pub schema_version: u32,
    /// Every item, in store order.
    pub items: Vec<FileSystemItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Canonical VFS collection.
pub struct VfsState {
    next_id: u64,
    items: Vec<FileSystemItem>,
}

impl Default for VfsState {
    fn default() -> Self {
        Self {
            next_id: 1,
            items: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Commands accepted by [`reduce_vfs`].
pub enum VfsAction {
    /// Create a file under `parent` (or at the root).
    CreateFile {
        /// File name.
        name: String,
        /// Parent folder, `None` for root level.
        parent: Option<FsItemId>,
        /// Initial text content.
        content: String,
        /// Content mime type.
        mime_type: Option<String>,
    },
    /// Create a folder under `parent` (or at the root).
    CreateFolder {
        /// Folder name.
        name: String,
        /// Parent folder, `None` for root level.
        parent: Option<FsItemId>,
    },
    /// Delete an item and, for folders, every descendant.
    Delete {
        /// Item to delete.
        id: FsItemId,
    },
    /// Rename an item in place.
    Rename {
        /// Item to rename.
        id: FsItemId,
        /// New name.
        new_name: String,
    },
    /// Reparent an item.
    Move {
        /// Item to move.
        id: FsItemId,
        /// Destination folder, `None` for root level.
        new_parent: Option<FsItemId>,
    },
    /// Replace a file's content.
    UpdateContent {
        /// File to update.
        id: FsItemId,
        /// New text content.
        content: String,
    },
}

#[derive(Debug, Clone, PartialEq, Default)]
/// Result of a successful [`reduce_vfs`] call.
pub struct VfsOutcome {
    /// Id of the item created by a create command.
    pub created: Option<FsItemId>,
    /// Side effects for the runtime to execute.
    pub effects: Vec<RuntimeEffect>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// VFS command failures. State is untouched when one is returned.
pub enum VfsError {
    /// The target item does not exist.
    #[error("item {0:?} not found")]
    ItemNotFound(FsItemId),
    /// The parent item does not exist.
    #[error("parent {0:?} not found")]
    ParentNotFound(FsItemId),
    /// The parent item is a file.
    #[error("item {0:?} is not a folder")]
    NotAFolder(FsItemId),
    /// Content operations require a file.
    #[error("item {0:?} is not a file")]
    NotAFile(FsItemId),
    /// Empty name, `.`/`..`, or a name containing `/`.
    #[error("invalid name `{0}`")]
    InvalidName(String),
    /// A sibling already uses the name.
    #[error("an item named `{0}` already exists here")]
    NameConflict(String),
    /// A folder cannot be moved into itself or one of its descendants.
    #[error("cannot move a folder into itself or one of its descendants")]
    InvalidMove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Directory listing sort key.
pub enum SortKey {
    /// Case-insensitive name.
    #[default]
    Name,
    /// Lowercase extension.
    Type,
    /// Size in bytes.
    Size,
    /// Modification time.
    Modified,
}

/// Applies a [`VfsAction`] and returns the created id (if any) plus side effects.
///
/// # Errors
///
/// Returns [`VfsError`] for unknown ids, invalid or conflicting names, non-folder parents, and
/// moves that would create a cycle.
pub fn reduce_vfs(
    state: &mut VfsState,
    action: VfsAction,
    now: DateTime<Utc>,
) -> Result<VfsOutcome, VfsError> {
    let mut outcome = VfsOutcome::default();
    match action {
        VfsAction::CreateFile {
            name,
            parent,
            content,
            mime_type,
        } => {
            let path = state.prepare_child(parent, &name, None)?;
            let id = state.allocate_id();
            let size = content.len() as u64;
            state.items.push(FileSystemItem {
                id,
                name: name.clone(),
                kind: FsItemKind::File,
                content: Some(content),
                mime_type: Some(mime_type.unwrap_or_else(|| DEFAULT_TEXT_MIME_TYPE.to_string())),
                size: Some(size),
                created: now,
                modified: now,
                parent,
                path,
            });
            outcome.created = Some(id);
            outcome.effects.push(RuntimeEffect::Notify(NotificationDraft::success(
                "File Created",
                format!("{name} has been created"),
            )));
        }
        VfsAction::CreateFolder { name, parent } => {
            let path = state.prepare_child(parent, &name, None)?;
            let id = state.allocate_id();
            state.items.push(FileSystemItem {
                id,
                name: name.clone(),
                kind: FsItemKind::Folder,
                content: None,
                mime_type: None,
                size: None,
                created: now,
                modified: now,
                parent,
                path,
            });
            outcome.created = Some(id);
            outcome.effects.push(RuntimeEffect::Notify(NotificationDraft::success(
                "Folder Created",
                format!("{name} has been created"),
            )));
        }
        VfsAction::Delete { id } => {
            let name = state.require(id)?.name.clone();
            let mut doomed = state.descendant_ids(id);
            doomed.push(id);
            state.items.retain(|item| !doomed.contains(&item.id));
            outcome.effects.push(RuntimeEffect::Notify(NotificationDraft::info(
                "Item Deleted",
                format!("{name} has been deleted"),
            )));
        }
        VfsAction::Rename { id, new_name } => {
            let parent = state.require(id)?.parent;
            let path = state.prepare_child(parent, &new_name, Some(id))?;
            state.relocate(id, parent, new_name, path, now);
        }
        VfsAction::Move { id, new_parent } => {
            let item = state.require(id)?;
            let name = item.name.clone();
            let is_folder = item.is_folder();
            if let Some(target) = new_parent {
                if is_folder && (target == id || state.is_ancestor(id, target)) {
                    return Err(VfsError::InvalidMove);
                }
            }
            let path = state.prepare_child(new_parent, &name, Some(id))?;
            state.relocate(id, new_parent, name, path, now);
        }
        VfsAction::UpdateContent { id, content } => {
            let index = state.index_of(id)?;
            let item = &mut state.items[index];
            if !item.is_file() {
                return Err(VfsError::NotAFile(id));
            }
            item.size = Some(content.len() as u64);
            item.content = Some(content);
            item.modified = now;
        }
    }

    outcome.effects.insert(0, RuntimeEffect::PersistVfs);
    Ok(outcome)
}

impl VfsState {
    /// Builds the default tree shown on first boot.
    pub fn seeded() -> Self {
        let mut state = Self::default();
        let folder = FsItemKind::Folder;
        let desktop = state.push_seed("Desktop", folder, None, None, seed_date(2023, 10, 1));
        let documents = state.push_seed("Documents", folder, None, None, seed_date(2023, 10, 1));
        let downloads = state.push_seed("Downloads", folder, None, None, seed_date(2023, 10, 1));
        let pictures = state.push_seed("Pictures", folder, None, None, seed_date(2023, 9, 25));
        let music = state.push_seed("Music", folder, None, None, seed_date(2023, 9, 20));

        let files: [(&str, FsItemId, &str, u64, DateTime<Utc>); 8] = [
            (
                "Project Report.docx",
                documents,
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
                2_500,
                seed_date(2023, 10, 10),
            ),
            ("Resume.pdf", documents, "application/pdf", 1_200, seed_date(2023, 9, 28)),
            ("Vacation Photo.jpg", pictures, "image/jpeg", 3_500, seed_date(2023, 9, 15)),
            ("Family.png", pictures, "image/png", 2_800, seed_date(2023, 8, 20)),
            ("Favorite Song.mp3", music, "audio/mpeg", 8_500, seed_date(2023, 7, 15)),
            (
                "Installation.exe",
                downloads,
                "application/vnd.microsoft.portable-executable",
                15_000,
                seed_date(2023, 10, 5),
            ),
            ("Dataset.zip", downloads, "application/zip", 25_000, seed_date(2023, 9, 30)),
            ("Shortcut.lnk", desktop, "application/x-ms-shortcut", 1, seed_date(2023, 10, 10)),
        ];
        for (name, parent, mime, size, date) in files {
            let id = state.push_seed(name, FsItemKind::File, Some(parent), Some(mime), date);
            if let Ok(index) = state.index_of(id) {
                state.items[index].size = Some(size);
            }
        }

        let welcome = "Welcome to WebDesk.\nDouble-click a text file to open it in Notepad.\n";
        let id = state.push_seed(
            "Welcome.txt",
            FsItemKind::File,
            Some(documents),
            Some(DEFAULT_TEXT_MIME_TYPE),
            seed_date(2023, 10, 1),
        );
        if let Ok(index) = state.index_of(id) {
            let item = &mut state.items[index];
            item.size = Some(welcome.len() as u64);
            item.content = Some(welcome.to_string());
        }

        state
    }

    /// Rebuilds the store from a persisted snapshot, recomputing the id counter.
    pub fn from_snapshot(snapshot: VfsSnapshot) -> Self {
        let next_id = snapshot
            .items
            .iter()
            .map(|item| item.id.0)
            .max()
            .map_or(1, |max| max.saturating_add(1));
        Self {
            next_id,
            items: snapshot.items,
        }
    }

    /// Captures the persisted form of the store.
    pub fn snapshot(&self) -> VfsSnapshot {
        VfsSnapshot {
            schema_version: VFS_SCHEMA_VERSION,
            items: self.items.clone(),
        }
    }

    /// Every item, in insertion order.
    pub fn items(&self) -> &[FileSystemItem] {
        &self.items
    }

    /// Direct children of `parent` (`None` lists root-level items).
    pub fn files_in_folder(&self, parent: Option<FsItemId>) -> Vec<&FileSystemItem> {
        self.items
            .iter()
            .filter(|item| item.parent == parent)
            .collect()
    }

    pub fn file_by_id(&self, id: FsItemId) -> Option<&FileSystemItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Looks an item up by its exact stored path, then by the normalized form of `path`.
    pub fn file_by_path(&self, path: &str) -> Option<&FileSystemItem> {
        if let Some(item) = self.items.iter().find(|item| item.path == path) {
            return Some(item);
        }
        let path = normalize_virtual_path(path);
        self.items.iter().find(|item| item.path == path)
    }

    pub fn file_content(&self, id: FsItemId) -> Option<&str> {
        self.file_by_id(id)?.content.as_deref()
    }

    /// Every item below `id`, found by repeated parent lookups.
    pub fn descendant_ids(&self, id: FsItemId) -> Vec<FsItemId> {
        let mut found = Vec::new();
        let mut frontier = vec![id];
        while let Some(current) = frontier.pop() {
            for child in self.items.iter().filter(|item| item.parent == Some(current)) {
                if child.id != id && !found.contains(&child.id) {
                    found.push(child.id);
                    frontier.push(child.id);
                }
            }
        }
        found
    }

    /// Returns `true` when `ancestor` appears in the parent chain of `id`.
    pub fn is_ancestor(&self, ancestor: FsItemId, id: FsItemId) -> bool {
        let mut current = self.file_by_id(id).and_then(|item| item.parent);
        let mut hops = 0;
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            hops += 1;
            if hops > self.items.len() {
                return false;
            }
            current = self.file_by_id(parent).and_then(|item| item.parent);
        }
        false
    }

    /// First free name among `parent`'s children: `base`, then `base (1)`, `base (2)`, ...
    pub fn unique_child_name(&self, parent: Option<FsItemId>, base: &str) -> String {
        let taken = |name: &str| {
            self.items
                .iter()
                .any(|item| item.parent == parent && item.name == name)
        };
        if !taken(base) {
            return base.to_string();
        }
        let mut counter = 1u32;
        loop {
            let candidate = format!("{base} ({counter})");
            if !taken(&candidate) {
                return candidate;
            }
            counter += 1;
        }
    }

    fn allocate_id(&mut self) -> FsItemId {
        let id = FsItemId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    fn index_of(&self, id: FsItemId) -> Result<usize, VfsError> {
        self.items
            .iter()
            .position(|item| item.id == id)
            .ok_or(VfsError::ItemNotFound(id))
    }

    fn require(&self, id: FsItemId) -> Result<&FileSystemItem, VfsError> {
        self.file_by_id(id).ok_or(VfsError::ItemNotFound(id))
    }

    /// Validates `name` under `parent` and returns the child's materialized path.
    ///
    /// `ignore` skips the item being renamed or moved during the sibling conflict check.
    fn prepare_child(
        &self,
        parent: Option<FsItemId>,
        name: &str,
        ignore: Option<FsItemId>,
    ) -> Result<String, VfsError> {
        validate_name(name)?;
        let parent_path = match parent {
            Some(parent_id) => {
                let folder = self
                    .file_by_id(parent_id)
                    .ok_or(VfsError::ParentNotFound(parent_id))?;
                if !folder.is_folder() {
                    return Err(VfsError::NotAFolder(parent_id));
                }
                Some(folder.path.as_str())
            }
            None => None,
        };
        let conflict = self.items.iter().any(|item| {
            item.parent == parent && item.name == name && Some(item.id) != ignore
        });
        if conflict {
            return Err(VfsError::NameConflict(name.to_string()));
        }
        Ok(join_child_path(parent_path, name))
    }

    /// Applies a rename/move and rewrites every descendant path under the old base.
    fn relocate(
        &mut self,
        id: FsItemId,
        parent: Option<FsItemId>,
        name: String,
        path: String,
        now: DateTime<Utc>,
    ) {
        let Some(item) = self.items.iter_mut().find(|item| item.id == id) else {
            return;
        };
        let old_path = std::mem::replace(&mut item.path, path.clone());
        item.name = name;
        item.parent = parent;
        item.modified = now;

        if old_path == path {
            return;
        }
        for item in &mut self.items {
            if let Some(rebased) = rebase_descendant_path(&item.path, &old_path, &path) {
                item.path = rebased;
            }
        }
    }

    fn push_seed(
        &mut self,
        name: &str,
        kind: FsItemKind,
        parent: Option<FsItemId>,
        mime_type: Option<&str>,
        date: DateTime<Utc>,
    ) -> FsItemId {
        let parent_path = parent
            .and_then(|parent| self.file_by_id(parent))
            .map(|folder| folder.path.clone());
        let id = self.allocate_id();
        self.items.push(FileSystemItem {
            id,
            name: name.to_string(),
            kind,
            content: None,
            mime_type: mime_type.map(str::to_string),
            size: None,
            created: date,
            modified: date,
            parent,
            path: join_child_path(parent_path.as_deref(), name),
        });
        id
    }
}

fn validate_name(name: &str) -> Result<(), VfsError> {
    // Names must survive path normalization unchanged.
    if name.trim().is_empty()
        || name.trim() != name
        || name.contains(['/', '\\'])
        || name == "."
        || name == ".."
    {
        return Err(VfsError::InvalidName(name.to_string()));
    }
    Ok(())
}

fn seed_date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

/// Orders a directory listing: folders before files, then by `key` in `direction`.
///
/// Items missing the sort field (a folder's size, an extension-less name) sort first in either
/// direction. Ties keep their input order.
pub fn sorted_listing<'a>(
    items: impl IntoIterator<Item = &'a FileSystemItem>,
    key: SortKey,
    direction: SortDirection,
) -> Vec<&'a FileSystemItem> {
    let mut listing = items.into_iter().collect::<Vec<_>>();
    listing.sort_by(|a, b| {
        folder_rank(a)
            .cmp(&folder_rank(b))
            .then_with(|| compare_by_key(a, b, key, direction))
    });
    listing
}

fn folder_rank(item: &FileSystemItem) -> u8 {
    if item.is_folder() {
        0
    } else {
        1
    }
}

fn compare_by_key(
    a: &FileSystemItem,
    b: &FileSystemItem,
    key: SortKey,
    direction: SortDirection,
) -> Ordering {
    match key {
        SortKey::Name => directed(
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.name.cmp(&b.name)),
            direction,
        ),
        SortKey::Type => missing_first(a.extension(), b.extension(), direction),
        SortKey::Size => missing_first(a.size, b.size, direction),
        SortKey::Modified => directed(a.modified.cmp(&b.modified), direction),
    }
}

fn missing_first<T: Ord>(a: Option<T>, b: Option<T>, direction: SortDirection) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => directed(a.cmp(&b), direction),
    }
}

fn directed(ordering: Ordering, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}
