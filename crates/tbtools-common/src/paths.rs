//! Path utilities for manifest-relative path resolution.
//!
//! Manifests are written by hand and shared between Windows and POSIX
//! workstations, so these helpers operate on strings rather than
//! [`std::path::Path`]: a drive-letter path such as `D:\shows` must be treated
//! as absolute even when the tool runs on Linux.

/// Check if a path is absolute in either POSIX or Windows spelling.
///
/// Absolute means a leading `/` or `\`, a `file:///` URL, or a drive-letter
/// prefix (`C:`).
///
/// # Examples
///
/// ```
/// use tbtools_common::paths::is_absolute_path;
///
/// assert!(is_absolute_path("/proj/scenes"));
/// assert!(is_absolute_path("\\\\server\\share"));
/// assert!(is_absolute_path("C:\\proj"));
/// assert!(is_absolute_path("file:///C:/proj"));
/// assert!(!is_absolute_path("scenes/C01"));
/// ```
pub fn is_absolute_path(path: &str) -> bool {
    if path.starts_with("file:///") || path.starts_with('/') || path.starts_with('\\') {
        return true;
    }
    let mut chars = path.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some(drive), Some(':')) if drive.is_ascii_alphabetic()
    )
}

/// Join `leaf` onto `base`, inserting `/` unless `base` already ends with a
/// separator. An empty base yields `leaf` unchanged.
///
/// # Examples
///
/// ```
/// use tbtools_common::paths::join_paths;
///
/// assert_eq!(join_paths("/proj", "scenes"), "/proj/scenes");
/// assert_eq!(join_paths("D:\\proj\\", "scenes"), "D:\\proj\\scenes");
/// assert_eq!(join_paths("", "scenes"), "scenes");
/// ```
pub fn join_paths(base: &str, leaf: &str) -> String {
    if base.is_empty() {
        return leaf.to_string();
    }
    if base.ends_with('/') || base.ends_with('\\') {
        format!("{base}{leaf}")
    } else {
        format!("{base}/{leaf}")
    }
}

/// Resolve `raw` against an optional `base`.
///
/// Absolute paths are returned unchanged. Relative paths are joined onto
/// `base`; with no (or an empty) base the relative path is returned as-is.
///
/// # Examples
///
/// ```
/// use tbtools_common::paths::resolve_path;
///
/// assert_eq!(resolve_path("scenes", Some("/proj")), "/proj/scenes");
/// assert_eq!(resolve_path("/abs/scenes", Some("/proj")), "/abs/scenes");
/// assert_eq!(resolve_path("scenes", None), "scenes");
/// ```
pub fn resolve_path(raw: &str, base: Option<&str>) -> String {
    if raw.is_empty() || is_absolute_path(raw) {
        return raw.to_string();
    }
    match base {
        Some(base) if !base.is_empty() => join_paths(base, raw),
        _ => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drive_letter_is_absolute() {
        assert!(is_absolute_path("D:"));
        assert!(is_absolute_path("d:/anim"));
        assert!(!is_absolute_path("D"));
        assert!(!is_absolute_path(""));
        assert!(!is_absolute_path("1:foo"));
        assert!(!is_absolute_path(".:x"));
        assert_eq!(resolve_path("1:foo", Some("/proj")), "/proj/1:foo");
    }

    #[test]
    fn test_resolve_keeps_windows_absolute() {
        assert_eq!(
            resolve_path("E:\\bgs\\bg01.png", Some("/proj")),
            "E:\\bgs\\bg01.png"
        );
    }

    #[test]
    fn test_resolve_with_empty_base() {
        assert_eq!(resolve_path("scenes", Some("")), "scenes");
    }

    #[test]
    fn test_resolve_empty_raw() {
        assert_eq!(resolve_path("", Some("/proj")), "");
    }

    #[test]
    fn test_join_does_not_double_separator() {
        assert_eq!(join_paths("/proj/", "scenes"), "/proj/scenes");
        assert_eq!(
            join_paths(&join_paths("/proj", "scenes"), "C01"),
            "/proj/scenes/C01"
        );
    }
}
