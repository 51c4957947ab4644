//! Folder and file types exchanged with the file manager API.

use serde::{Deserialize, Serialize};

use crate::core::pagination::Keyed;
use crate::utils::format::file_extension;

/// A folder row in a listing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderItem {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<i64>,
    #[serde(default)]
    pub sort_index: Option<i64>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "childFileCount")]
    pub file_count: Option<u64>,
    #[serde(default, alias = "childFolderCount")]
    pub sub_folder_count: Option<u64>,
    #[serde(default)]
    pub total_size: Option<u64>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// A stored file. Recycle bin entries carry `deleted_at` and the grace
/// period left.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileItem {
    pub id: i64,
    #[serde(alias = "fileName")]
    pub name: String,
    #[serde(default, alias = "fileSize")]
    pub size: u64,
    #[serde(default, alias = "fileType")]
    pub mime_type: Option<String>,
    #[serde(default, alias = "fileExtension")]
    pub extension: Option<String>,
    #[serde(default)]
    pub folder_id: Option<i64>,
    #[serde(default)]
    pub folder_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub upload_time: Option<String>,
    #[serde(default)]
    pub update_time: Option<String>,
    #[serde(default)]
    pub download_count: Option<u64>,
    #[serde(default)]
    pub preview_url: Option<String>,
    #[serde(default)]
    pub deleted_at: Option<String>,
    #[serde(default)]
    pub days_until_permanent_deletion: Option<i64>,
}

impl FileItem {
    /// Lowercased extension, from the server field or the name.
    pub fn ext(&self) -> Option<String> {
        self.extension
            .as_deref()
            .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .or_else(|| file_extension(&self.name))
    }
}

impl Keyed for FileItem {
    type Key = i64;

    fn key(&self) -> i64 {
        self.id
    }
}

/// Entry of a folder listing: either a subfolder or a file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FolderChild {
    Folder(FolderItem),
    File(FileItem),
}

/// Folder and file ids come from separate sequences.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChildKey {
    Folder(i64),
    File(i64),
}

impl Keyed for FolderChild {
    type Key = ChildKey;

    fn key(&self) -> ChildKey {
        match self {
            Self::Folder(folder) => ChildKey::Folder(folder.id),
            Self::File(file) => ChildKey::File(file.id),
        }
    }
}

impl FolderChild {
    pub fn name(&self) -> &str {
        match self {
            Self::Folder(folder) => &folder.name,
            Self::File(file) => &file.name,
        }
    }

    pub fn as_file(&self) -> Option<&FileItem> {
        match self {
            Self::File(file) => Some(file),
            Self::Folder(_) => None,
        }
    }

    pub fn as_folder(&self) -> Option<&FolderItem> {
        match self {
            Self::Folder(folder) => Some(folder),
            Self::File(_) => None,
        }
    }
}

/// Root folder summary (`GET /api/folders/root`).
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RootFolder {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub child_folder_count: u64,
    #[serde(default)]
    pub child_file_count: u64,
}

/// One breadcrumb segment.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct PathSegment {
    pub id: i64,
    pub name: String,
}

/// Response of `GET /api/folders/{id}/path`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct FolderPath {
    #[serde(default)]
    pub path: Vec<PathSegment>,
}

/// Create or update payload for a folder.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Partial update of a file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilePatch {
    #[serde(skip_serializing_if = "Option::is_none", rename = "fileName")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Layout of the file manager content area.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ViewLayout {
    #[default]
    Grid,
    List,
}
