//! Upload filename checks for the image analysis endpoint.

use crate::defaults::ALLOWED_IMAGE_EXTENSIONS;

/// Lowercased extension of an accepted image filename.
///
/// The comparison is case-insensitive and requires a dot, so `"png"` alone
/// is rejected.
pub fn image_extension(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .filter(|ext| ALLOWED_IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// Sanitize a filename for safe storage.
///
/// Keeps only the final path component and replaces characters outside
/// `[A-Za-z0-9._-]` with underscores. Leading dots are stripped so the result
/// is never a hidden file.
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let trimmed = cleaned.trim_start_matches('.');
    if trimmed.is_empty() {
        "upload".to_string()
    } else {
        trimmed.to_string()
    }
}
