//! Extension handling and MIME lookup for generated files.

/// Fallback content type for unknown extensions.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Extensions accepted by the plain-text operation.
pub const TEXT_EXTENSIONS: [&str; 6] = ["md", "txt", "html", "json", "xml", "csv"];

/// Static extension → MIME type table.
///
/// Lookup is case-insensitive; unknown extensions fall back to
/// `application/octet-stream`.
pub fn content_type_for_extension(extension: &str) -> &'static str {
    match extension.to_ascii_lowercase().as_str() {
        "md" => "text/markdown",
        "txt" => "text/plain",
        "html" => "text/html",
        "json" => "application/json",
        "xml" => "application/xml",
        "csv" => "text/csv",
        "pdf" => "application/pdf",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "doc" => "application/msword",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "xls" => "application/vnd.ms-excel",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "ppt" => "application/vnd.ms-powerpoint",
        "zip" => "application/zip",
        _ => OCTET_STREAM,
    }
}

/// Extract the extension of a file name, without the leading dot.
///
/// Returns `None` when the name has no dot, or ends with one.
pub fn extension_of(file_name: &str) -> Option<&str> {
    let (_, ext) = file_name.rsplit_once('.')?;
    if ext.is_empty() {
        None
    } else {
        Some(ext)
    }
}

/// Whether the extension is allowed for plain-text files.
pub fn is_text_extension(extension: &str) -> bool {
    let ext = extension.to_ascii_lowercase();
    TEXT_EXTENSIONS.contains(&ext.as_str())
}

/// Coerce a file name to carry the given extension.
///
/// Replaces any existing extension, or appends one when the name has none:
/// `report.txt` → `report.docx`, `report` → `report.docx`.
pub fn ensure_extension(file_name: &str, extension: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => format!("{stem}.{extension}"),
        _ => format!("{}.{extension}", file_name.trim_end_matches('.')),
    }
}
