//! Path normalization

/// Convert host separators to forward slashes.
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}

/// Join a walk-relative directory and an entry name with `/`.
///
/// The walk root is the empty string, so its children carry no prefix.
pub fn join_rel(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{dir}/{name}")
    }
}
