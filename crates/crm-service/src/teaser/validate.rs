//! Pre-upload checks. Nothing reaches storage unless these pass.

use std::path::Path;

use crm_core::error::AppError;
use crm_storage::mime_from_path;

/// Largest accepted teaser.
pub const MAX_TEASER_BYTES: u64 = 10 * 1024 * 1024;

/// PDF, DOC and DOCX.
pub const ALLOWED_TEASER_MIME_TYPES: [&str; 3] = [
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

/// Validate a teaser against the default size limit.
pub fn validate_teaser_upload(file_name: &str, mime_type: &str, size: u64) -> Result<(), AppError> {
    validate_with_limit(file_name, mime_type, size, MAX_TEASER_BYTES)
}

pub(crate) fn validate_with_limit(
    file_name: &str,
    mime_type: &str,
    size: u64,
    max_bytes: u64,
) -> Result<(), AppError> {
    if file_name.trim().is_empty() {
        return Err(AppError::validation("File name is required"));
    }
    if size == 0 {
        return Err(AppError::validation("File is empty"));
    }
    if size > max_bytes {
        return Err(AppError::validation(format!(
            "File is too large: {size} bytes (max {max_bytes})"
        )));
    }
    if !ALLOWED_TEASER_MIME_TYPES.contains(&mime_type) {
        return Err(AppError::validation(format!(
            "Unsupported file type '{mime_type}'. Allowed: PDF, DOC, DOCX"
        )));
    }
    Ok(())
}

/// Browsers send `application/octet-stream` (or nothing) for unknown
/// types; fall back to the extension then.
pub(crate) fn effective_mime<'a>(file_name: &str, declared: &'a str) -> &'a str {
    let declared = declared.trim();
    if declared.is_empty() || declared == "application/octet-stream" {
        mime_from_path(file_name).unwrap_or(declared)
    } else {
        declared
    }
}

/// Reduce a client file name to a safe single path segment.
pub(crate) fn sanitize_file_name(file_name: &str) -> String {
    let base = Path::new(file_name)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name);

    let sanitized: String = base
        .chars()
        .filter_map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                Some(c)
            } else if c.is_whitespace() {
                Some('_')
            } else {
                None
            }
        })
        .take(200)
        .collect();

    let sanitized = sanitized.trim_start_matches('.').to_string();
    if sanitized.is_empty() {
        "teaser".to_string()
    } else {
        sanitized
    }
}
