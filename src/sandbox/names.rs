use crate::error::{AppError, AppResult};

/// Validate a client-supplied entry name.
/// - NUL ("\u{0000}") not allowed
/// - no empty, '.' or '..' segments
/// - with `allow_nested = false` the name must be a single segment ('/' and '\\' rejected)
pub fn validate_entry_name(name: &str, allow_nested: bool) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::user("invalid_name", "name cannot be empty"));
    }
    if name.chars().any(|c| c == '\u{0000}') {
        return Err(AppError::user("invalid_name", "name cannot contain NUL characters"));
    }
    if !allow_nested && (name.contains('/') || name.contains('\\')) {
        return Err(AppError::user("invalid_name", format!("name '{}' cannot contain path separators", name)));
    }
    for seg in name.trim_matches('/').split('/') {
        if seg.is_empty() {
            return Err(AppError::user("invalid_name", format!("empty segment in name '{}'", name)));
        }
        if seg == "." || seg == ".." {
            return Err(AppError::user("invalid_name", format!("segments '.' and '..' are not allowed in '{}'", name)));
        }
    }
    Ok(())
}

/// Reduce a declared upload filename to its last component.
/// Browsers may send "folder/file.txt" (or a Windows path) for directory uploads.
pub fn upload_basename(declared: &str) -> AppResult<String> {
    let base = declared.rsplit(['/', '\\']).next().unwrap_or("").to_string();
    validate_entry_name(&base, false)?;
    Ok(base)
}
