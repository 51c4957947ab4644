//! Document and group types exchanged with the documents API.

use serde::{Deserialize, Serialize};

use crate::config::UNTITLED_DOCUMENT;
use crate::core::pagination::{Keyed, SortOrder};
use crate::utils::format::file_extension;

/// Content type of a document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocType {
    #[default]
    Md,
    Txt,
    Html,
    Pdf,
}

impl DocType {
    pub const ALL: [DocType; 4] = [Self::Md, Self::Txt, Self::Html, Self::Pdf];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Md => "md",
            Self::Txt => "txt",
            Self::Html => "html",
            Self::Pdf => "pdf",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Md => "Markdown",
            Self::Txt => "Plain text",
            Self::Html => "HTML",
            Self::Pdf => "PDF",
        }
    }

    pub fn extension(self) -> &'static str {
        self.as_str()
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::Md => "text/markdown",
            Self::Txt => "text/plain",
            Self::Html => "text/html",
            Self::Pdf => "application/pdf",
        }
    }

    /// Initial body of a newly created document.
    pub fn default_content(self) -> &'static str {
        match self {
            Self::Md => "# New document\n\nStart writing here…\n",
            Self::Txt | Self::Html | Self::Pdf => "",
        }
    }

    /// Whether the content is text that can be edited inline.
    pub fn is_text(self) -> bool {
        !matches!(self, Self::Pdf)
    }

    /// Document type for an uploaded file name.
    pub fn from_file_name(name: &str) -> Option<Self> {
        match file_extension(name)?.as_str() {
            "md" | "markdown" => Some(Self::Md),
            "txt" | "text" => Some(Self::Txt),
            "html" | "htm" => Some(Self::Html),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }

    /// Value for the `accept` attribute of a document file picker.
    pub fn accept() -> &'static str {
        ".md,.markdown,.txt,.html,.htm,.pdf"
    }
}

/// Publication state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocStatus {
    #[default]
    Draft,
    Published,
}

impl DocStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Published => "Published",
        }
    }
}

/// A document as returned by `/api/documents`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default, rename = "type", alias = "docType")]
    pub doc_type: DocType,
    #[serde(default)]
    pub status: DocStatus,
    #[serde(default)]
    pub group_id: Option<i64>,
    #[serde(default)]
    pub sort_index: Option<i64>,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Keyed for Document {
    type Key = i64;

    fn key(&self) -> i64 {
        self.id
    }
}

impl Document {
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            UNTITLED_DOCUMENT
        } else {
            &self.title
        }
    }

    /// File name used when uploading the document body.
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.display_title(), self.doc_type.extension())
    }

    pub fn is_published(&self) -> bool {
        self.status == DocStatus::Published
    }
}

/// Sort key of the document list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DocSortBy {
    #[default]
    Default,
    Title,
    CreatedAt,
    UpdatedAt,
}

impl DocSortBy {
    pub const ALL: [DocSortBy; 4] = [Self::Default, Self::Title, Self::CreatedAt, Self::UpdatedAt];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Title => "title",
            Self::CreatedAt => "createdAt",
            Self::UpdatedAt => "updatedAt",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Default => "Manual order",
            Self::Title => "Title",
            Self::CreatedAt => "Created",
            Self::UpdatedAt => "Last modified",
        }
    }

    pub fn parse(value: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|s| s.as_str() == value)
            .unwrap_or_default()
    }
}

/// Filters and ordering of a document listing.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DocumentQuery {
    pub q: String,
    pub group_id: Option<i64>,
    pub sort_by: DocSortBy,
    pub order: SortOrder,
}

impl Default for DocumentQuery {
    fn default() -> Self {
        Self {
            q: String::new(),
            group_id: None,
            sort_by: DocSortBy::Default,
            order: SortOrder::Asc,
        }
    }
}

impl DocumentQuery {
    /// Most recently modified first.
    pub fn latest() -> Self {
        Self {
            sort_by: DocSortBy::UpdatedAt,
            order: SortOrder::Desc,
            ..Self::default()
        }
    }
}

/// Partial update of document metadata.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<DocStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_index: Option<i64>,
}

/// One entry of a batch sort request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SortItem {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<i64>,
    pub sort_index: i64,
}

/// A document group (folder in the tree).
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<i64>,
    #[serde(default)]
    pub sort_index: Option<i64>,
}

/// Create or update payload for a group.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_index: Option<i64>,
}

/// Summary of a zip batch upload.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUploadReport {
    #[serde(default, alias = "successCount", alias = "documentCount")]
    pub created: u32,
    #[serde(default, alias = "failedCount")]
    pub failed: u32,
    #[serde(default)]
    pub errors: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_deserialize() {
        let doc: Document = serde_json::from_str(
            r#"{"id": 3, "title": "Plan", "type": "pdf", "status": "published",
                "groupId": 9, "sortIndex": null, "fileSize": 2048,
                "updatedAt": "2025-10-19 09:51:04"}"#,
        )
        .unwrap();
        assert_eq!(doc.doc_type, DocType::Pdf);
        assert!(doc.is_published());
        assert_eq!(doc.group_id, Some(9));
        assert_eq!(doc.sort_index, None);
        assert_eq!(doc.file_name(), "Plan.pdf");
    }

    #[test]
    fn test_minimal_document() {
        let doc: Document = serde_json::from_str(r#"{"id": 1}"#).unwrap();
        assert_eq!(doc.doc_type, DocType::Md);
        assert_eq!(doc.display_title(), "Untitled");
        assert_eq!(doc.file_name(), "Untitled.md");
    }

    #[test]
    fn test_doc_type_from_file() {
        assert_eq!(DocType::from_file_name("a.MD"), Some(DocType::Md));
        assert_eq!(DocType::from_file_name("paper.pdf"), Some(DocType::Pdf));
        assert_eq!(DocType::from_file_name("x.docx"), None);
    }

    #[test]
    fn test_patch_skips_none() {
        let patch = DocumentPatch {
            status: Some(DocStatus::Published),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            serde_json::json!({ "status": "published" })
        );
    }

    #[test]
    fn test_sort_by_parse() {
        assert_eq!(DocSortBy::parse("updatedAt"), DocSortBy::UpdatedAt);
        assert_eq!(DocSortBy::parse("nope"), DocSortBy::Default);
    }
}
