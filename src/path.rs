//! Path utilities for source-path lookups

use std::path::{Component, Path, PathBuf};

/// Converts a qualified package name to its directory below a source root.
///
/// Package segments are separated by `.`; the unnamed package (empty string)
/// maps to the root itself.
///
/// # Arguments
///
/// * `package`: Qualified package name such as `org.example.util`
///
/// # Returns
///
/// Relative directory path, e.g. `org/example/util`
pub fn package_dir(package: &str) -> PathBuf {
    package
        .split('.')
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// Checks that a file name stays inside its package directory.
///
/// Relative names may contain subdirectories but no root, prefix, `.` or
/// `..` components.
///
/// # Arguments
///
/// * `name`: File name relative to a package directory
///
/// # Returns
///
/// True if the name is a plain relative path
pub fn is_relative_name(name: &str) -> bool {
    if name.is_empty() {
        return false;
    }

    Path::new(name)
        .components()
        .all(|component| matches!(component, Component::Normal(_)))
        && !name.split('/').any(|segment| segment == "." || segment == "..")
}
