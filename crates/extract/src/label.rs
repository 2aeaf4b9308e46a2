//! Label derivation: base name without extension.

/// Returns whether `c` separates path components in a broadcast log path.
///
/// Both styles are accepted regardless of the host platform, since the
/// automation software may write Windows paths that are read elsewhere.
pub fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

/// Reduces `path` to its final component with the last extension removed.
///
/// A leading dot is part of the name, not an extension (`.jingle` stays
/// `.jingle`). Returns an empty string for an empty path or one that ends
/// in a separator.
pub fn derive_label(path: &str) -> String {
    let name = match path.rfind(is_separator) {
        Some(idx) => &path[idx + 1..],
        None => path,
    };

    let stem = match name.rfind('.') {
        Some(dot) if name[..dot].chars().any(|c| c != '.') => &name[..dot],
        _ => name,
    };

    stem.to_string()
}
