//! Prompt identifier codec.
//!
//! A prompt ID is the prompt's directory and name joined by `/`. Names never
//! contain a separator, so splitting at the final `/` recovers both parts.

use stitch_core::{AppError, AppResult};

/// Separator between directory and name inside an ID.
pub const ID_SEPARATOR: char = '/';

const MD_SUFFIX: &str = ".md";

/// Strip a trailing `.md` suffix, kept for legacy filename references.
pub fn strip_md_suffix(token: &str) -> &str {
    match token.strip_suffix(MD_SUFFIX) {
        Some(stem) if !stem.is_empty() => stem,
        _ => token,
    }
}

/// Generate the canonical ID for a prompt.
///
/// A trailing `.md` on `name` is dropped first. The name must be non-empty and
/// must not contain `/`.
///
/// # Example
/// ```
/// use stitch_prompt::id::{generate_id, parse_id};
///
/// let id = generate_id("/projects/api", "setup.md").unwrap();
/// assert_eq!(id, "/projects/api/setup");
/// assert_eq!(
///     parse_id(&id).unwrap(),
///     ("/projects/api".to_string(), "setup".to_string())
/// );
/// ```
pub fn generate_id(directory: &str, name: &str) -> AppResult<String> {
    let name = strip_md_suffix(name);

    if name.is_empty() {
        return Err(AppError::InvalidId(format!(
            "empty prompt name in directory '{}'",
            directory
        )));
    }

    if name.contains(ID_SEPARATOR) {
        return Err(AppError::InvalidId(format!(
            "prompt name '{}' must not contain '{}'",
            name, ID_SEPARATOR
        )));
    }

    Ok(format!("{}{}{}", directory, ID_SEPARATOR, name))
}

/// Split an ID back into `(directory, name)`.
///
/// Fails when the ID has no separator or ends with one.
pub fn parse_id(id: &str) -> AppResult<(String, String)> {
    let (directory, name) = id
        .rsplit_once(ID_SEPARATOR)
        .ok_or_else(|| AppError::InvalidId(format!("'{}' has no directory separator", id)))?;

    if name.is_empty() {
        return Err(AppError::InvalidId(format!("'{}' has an empty name", id)));
    }

    Ok((directory.to_string(), name.to_string()))
}

/// The name part of an ID, or the whole string when it has no separator.
pub fn terminal_segment(id: &str) -> &str {
    id.rsplit_once(ID_SEPARATOR).map_or(id, |(_, name)| name)
}

/// Whether a marker token names a prompt by full ID rather than simple name.
pub fn is_qualified(token: &str) -> bool {
    token.contains(ID_SEPARATOR)
}
