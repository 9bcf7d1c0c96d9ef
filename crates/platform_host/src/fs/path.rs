//! Virtual-path helpers shared across host abstractions.

/// Normalizes a virtual filesystem path using Explorer address-bar semantics.
///
/// This helper trims whitespace, converts backslashes to `/`, resolves `.`/`..`, ensures a
/// leading slash, and returns `/` for empty or fully-collapsed paths.
pub fn normalize_virtual_path(path: &str) -> String {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return "/".to_string();
    }

    let mut out = String::new();
    for segment in trimmed.replace('\\', "/").split('/') {
        if segment.is_empty() || segment == "." {
            continue;
        }
        if segment == ".." {
            if let Some(idx) = out.rfind('/') {
                out.truncate(idx);
            }
            continue;
        }
        out.push('/');
        out.push_str(segment);
    }

    if out.is_empty() {
        "/".to_string()
    } else {
        out
    }
}

/// Builds the materialized path of a child named `name` under `parent_path`.
///
/// Root-level items have no parent path and materialize as `/<name>`.
pub fn join_child_path(parent_path: Option<&str>, name: &str) -> String {
    format!("{}/{}", parent_path.unwrap_or(""), name)
}

/// Rewrites `path` from under `old_base` to under `new_base`.
///
/// Only strict descendants match: the prefix must be `old_base` followed by `/`, so renaming
/// `/Docs` never touches `/Docs2/...`. Returns `None` when `path` is not below `old_base`.
pub fn rebase_descendant_path(path: &str, old_base: &str, new_base: &str) -> Option<String> {
    let rest = path.strip_prefix(old_base)?;
    if !rest.starts_with('/') {
        return None;
    }
    Some(format!("{new_base}{rest}"))
}
