// Lexical path helpers for deciding what to copy into the container
use std::path::{Component, Path, PathBuf};

/// Resolve `.` and `..` components without touching the filesystem
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let _ = out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Make `path` absolute against `base` and normalize it
pub fn absolutize(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize(path)
    } else {
        normalize(&base.join(path))
    }
}

/// Nearest directory containing both paths
///
/// Walks upward from `first` until `second` lies inside it. Both inputs are
/// expected to be absolute and normalized; the walk stops at the filesystem root.
pub fn common_ancestor(first: &Path, second: &Path) -> PathBuf {
    let mut parent = first;
    while !second.starts_with(parent) {
        match parent.parent() {
            Some(next) => parent = next,
            None => break,
        }
    }
    parent.to_path_buf()
}

/// Express `target` relative to `base` (both absolute and normalized)
pub fn relative_to(target: &Path, base: &Path) -> PathBuf {
    let target: Vec<Component> = target.components().collect();
    let base: Vec<Component> = base.components().collect();

    let shared = target
        .iter()
        .zip(base.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut out = PathBuf::new();
    for _ in shared..base.len() {
        out.push("..");
    }
    for component in &target[shared..] {
        out.push(component.as_os_str());
    }

    if out.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        out
    }
}

/// Directory the copied tree lands in inside the container
pub fn copy_destination(root: &Path) -> PathBuf {
    root.parent().unwrap_or(root).to_path_buf()
}
