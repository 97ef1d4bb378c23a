//! Path validation
//!
//! Security checks applied to every sandbox-relative path before any
//! filesystem I/O.

/// Absolute prefixes that must never be reachable through the sandbox
pub const RESERVED_PREFIXES: &[&str] = &["/data/", "/sdcard/", "/storage/"];

/// Validate that a sandbox-relative path is safe (no directory traversal,
/// no reserved system locations)
pub fn is_safe_path(path: &str) -> bool {
    if path.is_empty() {
        return false;
    }

    if path.contains("../") || path.contains("..\\") {
        return false;
    }

    !RESERVED_PREFIXES
        .iter()
        .any(|prefix| path.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_plain_relative_paths() {
        assert!(is_safe_path("save.dat"));
        assert!(is_safe_path("profiles/default/settings.ini"));
        assert!(is_safe_path("a..b/file"));
    }

    #[test]
    fn test_rejects_empty_path() {
        assert!(!is_safe_path(""));
    }

    #[test]
    fn test_rejects_traversal_segments() {
        assert!(!is_safe_path("../escape"));
        assert!(!is_safe_path("nested/../../escape"));
        assert!(!is_safe_path("..\\windows\\escape"));
    }

    #[test]
    fn test_rejects_reserved_prefixes() {
        assert!(!is_safe_path("/data/local/tmp/x"));
        assert!(!is_safe_path("/sdcard/Download/x"));
        assert!(!is_safe_path("/storage/emulated/0/x"));
    }
}
