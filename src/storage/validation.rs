//! Path validation
//!
//! Name cleaning and the checks that keep every stored file inside the
//! upload directory.

use std::path::{Component, Path, PathBuf};

use crate::error::StorageError;

/// Prefix and suffix of in-flight upload files inside the root
pub const TEMP_PREFIX: &str = ".upload-";
pub const TEMP_SUFFIX: &str = ".part";

/// Normalizes a client-supplied file name.
///
/// Backslashes become `/`, empty and `.` segments are dropped. `..` segments
/// are kept as they are so that traversal attempts stay visible to
/// [`validate_name`].
pub fn clean_name(raw: &str) -> String {
    let unified = raw.replace('\\', "/");
    let segments: Vec<&str> = unified
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect();
    let joined = segments.join("/");

    if unified.starts_with('/') {
        format!("/{joined}")
    } else {
        joined
    }
}

/// Rejects anything that is not a single plain file name.
pub fn validate_name(cleaned: &str) -> Result<(), StorageError> {
    if cleaned.is_empty()
        || cleaned.contains("..")
        || cleaned.contains('\0')
        || is_temp_name(cleaned)
    {
        return Err(StorageError::InvalidName(cleaned.to_string()));
    }

    let mut components = Path::new(cleaned).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(StorageError::InvalidName(cleaned.to_string())),
    }
}

/// True for names reserved for uploads that are still being written.
pub fn is_temp_name(name: &str) -> bool {
    name.starts_with(TEMP_PREFIX) && name.ends_with(TEMP_SUFFIX)
}

/// Lexically resolves `.` and `..` components without touching the filesystem.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// True when `path` is `root` itself or a descendant of it.
pub fn is_within_root(root: &Path, path: &Path) -> bool {
    path.starts_with(root)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_name_collapses_redundant_segments() {
        assert_eq!(clean_name("report.txt"), "report.txt");
        assert_eq!(clean_name("./report.txt"), "report.txt");
        assert_eq!(clean_name(".//report.txt"), "report.txt");
        assert_eq!(clean_name("docs\\report.txt"), "docs/report.txt");
        assert_eq!(clean_name("/etc/passwd"), "/etc/passwd");
    }

    #[test]
    fn test_clean_name_keeps_parent_segments() {
        assert_eq!(clean_name("a/../b.txt"), "a/../b.txt");
        assert_eq!(clean_name("../secret"), "../secret");
        assert_eq!(clean_name("..\\..\\boot.ini"), "../../boot.ini");
    }

    #[test]
    fn test_validate_name_accepts_plain_names() {
        assert!(validate_name("report.txt").is_ok());
        assert!(validate_name("archive.tar.gz").is_ok());
        assert!(validate_name("my file (1).pdf").is_ok());
    }

    #[test]
    fn test_validate_name_rejects_traversal() {
        for name in ["a/../b.txt", "../secret", "..", "notes..txt"] {
            assert!(
                matches!(validate_name(name), Err(StorageError::InvalidName(_))),
                "{name} should be rejected"
            );
        }
    }

    #[test]
    fn test_validate_name_rejects_non_plain_names() {
        for name in ["", "/etc/passwd", "docs/report.txt", "bad\0name"] {
            assert!(
                matches!(validate_name(name), Err(StorageError::InvalidName(_))),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_validate_name_rejects_in_flight_names() {
        assert!(is_temp_name(".upload-a1B2c3.part"));
        assert!(!is_temp_name("upload-a1B2c3.part"));
        assert!(!is_temp_name(".upload-notes.txt"));
        assert!(matches!(
            validate_name(".upload-a1B2c3.part"),
            Err(StorageError::InvalidName(_))
        ));
        assert!(validate_name(".hidden.part").is_ok());
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path(Path::new("/srv/uploads/./a/../b.txt")),
            PathBuf::from("/srv/uploads/b.txt")
        );
        assert_eq!(
            normalize_path(Path::new("/srv/uploads/../../etc/passwd")),
            PathBuf::from("/etc/passwd")
        );
    }

    #[test]
    fn test_is_within_root() {
        let root = Path::new("/srv/uploads");
        assert!(is_within_root(root, Path::new("/srv/uploads/a.txt")));
        assert!(!is_within_root(root, Path::new("/srv/uploads-other/a.txt")));
        assert!(!is_within_root(root, Path::new("/etc/passwd")));
    }
}
