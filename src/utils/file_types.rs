//! File type tables: editable extensions, MIME types, document kinds.

use crate::utils::format::file_extension;

/// Extensions that open in the inline text editor.
pub const EDITABLE_TEXT_EXTENSIONS: &[&str] = &[
    // plain text
    "txt", "text", "log", "md", "markdown", "rst",
    // data
    "json", "jsonl", "xml", "csv", "tsv", "yaml", "yml",
    // scripts and sources
    "js", "mjs", "cjs", "ts", "jsx", "tsx", "vue", "svelte",
    "java", "kt", "scala", "groovy", "py", "pyw", "go", "mod", "sum",
    "rb", "rake", "gemspec", "php", "phtml",
    "c", "cpp", "cc", "cxx", "h", "hpp", "hxx", "cs", "vb", "swift", "rs",
    "dart", "lua", "pl", "r",
    // web
    "html", "htm", "xhtml", "css", "scss", "sass", "less", "styl",
    // config
    "properties", "env", "conf", "config", "ini", "toml", "cfg",
    "editorconfig", "gitignore", "gitattributes", "dockerignore",
    "eslintrc", "prettierrc", "babelrc",
    // build
    "gradle", "gradlew", "maven", "pom", "makefile", "mk", "cmake", "dockerfile",
    // shell
    "sh", "bash", "zsh", "fish", "bat", "cmd", "ps1", "psm1",
    // sql and markup
    "sql", "ddl", "dml", "svg", "rss", "atom", "graphql", "proto", "thrift",
];

/// Whether a file with this name can be edited as text.
pub fn is_editable_text(name: &str) -> bool {
    file_extension(name).is_some_and(|ext| EDITABLE_TEXT_EXTENSIONS.contains(&ext.as_str()))
}

/// MIME type for a file name, `application/octet-stream` when unknown.
pub fn mime_for_name(name: &str) -> &'static str {
    let Some(ext) = file_extension(name) else {
        return "application/octet-stream";
    };
    match ext.as_str() {
        "txt" | "text" | "log" | "env" | "conf" | "config" | "ini" | "cfg" => "text/plain",
        "md" | "markdown" => "text/markdown",
        "html" | "htm" => "text/html",
        "xhtml" => "application/xhtml+xml",
        "xml" => "application/xml",
        "svg" => "image/svg+xml",
        "css" => "text/css",
        "js" | "mjs" | "cjs" => "application/javascript",
        "ts" => "text/typescript",
        "json" => "application/json",
        "yaml" | "yml" => "application/yaml",
        "csv" => "text/csv",
        "tsv" => "text/tab-separated-values",
        "toml" => "application/toml",
        "sql" => "application/sql",
        "sh" | "bash" | "zsh" => "application/x-sh",
        "pdf" => "application/pdf",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "zip" => "application/zip",
        "gz" => "application/gzip",
        "tar" => "application/x-tar",
        "mp3" => "audio/mpeg",
        "mp4" => "video/mp4",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        _ if is_editable_text(name) => "text/plain",
        _ => "application/octet-stream",
    }
}

/// Whether an upload should be checked against the image size limit.
pub fn is_image(name: &str) -> bool {
    file_extension(name)
        .is_some_and(|ext| matches!(ext.as_str(), "jpg" | "jpeg" | "png" | "gif" | "webp" | "svg"))
}

/// Coarse category used to pick an icon.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileKind {
    Text,
    Code,
    Pdf,
    Image,
    Archive,
    Audio,
    Video,
    Sheet,
    Other,
}

pub fn file_kind(name: &str) -> FileKind {
    let Some(ext) = file_extension(name) else {
        return FileKind::Other;
    };
    match ext.as_str() {
        "pdf" => FileKind::Pdf,
        "jpg" | "jpeg" | "png" | "gif" | "webp" | "bmp" | "ico" | "svg" => FileKind::Image,
        "zip" | "rar" | "7z" | "tar" | "gz" => FileKind::Archive,
        "mp3" | "wav" | "ogg" | "flac" => FileKind::Audio,
        "mp4" | "avi" | "mov" | "webm" => FileKind::Video,
        "xls" | "xlsx" | "csv" | "tsv" => FileKind::Sheet,
        "txt" | "md" | "markdown" | "log" | "rst" | "doc" | "docx" => FileKind::Text,
        _ if is_editable_text(name) => FileKind::Code,
        _ => FileKind::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_editable() {
        assert!(is_editable_text("main.RS"));
        assert!(is_editable_text("notes.md"));
        assert!(!is_editable_text("photo.png"));
        assert!(!is_editable_text("Makefile"));
    }

    #[test]
    fn test_mime() {
        assert_eq!(mime_for_name("a.pdf"), "application/pdf");
        assert_eq!(mime_for_name("a.md"), "text/markdown");
        assert_eq!(mime_for_name("a.rs"), "text/plain");
        assert_eq!(mime_for_name("blob"), "application/octet-stream");
    }

    #[test]
    fn test_kind() {
        assert_eq!(file_kind("x.PDF"), FileKind::Pdf);
        assert_eq!(file_kind("x.py"), FileKind::Code);
        assert_eq!(file_kind("x.zip"), FileKind::Archive);
        assert_eq!(file_kind("x"), FileKind::Other);
    }
}
