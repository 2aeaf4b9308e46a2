//! Fixed-offset path extraction from a raw log line.

/// Extracts the file path embedded in `line` at character offset `start`.
///
/// Every marker is searched case-insensitively in the tail of the line that
/// begins at `start`. The path ends where the earliest-ending match ends
/// (match start + marker length), which is not necessarily the match that
/// starts first. Matches ending at the same index yield the same path, so the
/// first marker in configured order is kept.
///
/// Returns `None` when the line is not longer than `start`, when no marker
/// occurs in the tail, or when the bounded path is blank. Offsets count
/// characters, not bytes.
pub fn extract_path<S: AsRef<str>>(line: &str, start: usize, markers: &[S]) -> Option<String> {
    let tail: Vec<char> = line.chars().skip(start).collect();
    if tail.is_empty() {
        return None;
    }

    let mut earliest_end: Option<usize> = None;
    for marker in markers {
        let needle: Vec<char> = marker.as_ref().chars().collect();
        if needle.is_empty() {
            continue;
        }
        let Some(pos) = find_ignore_case(&tail, &needle) else {
            continue;
        };
        let end = pos + needle.len();
        if earliest_end.is_none_or(|current| end < current) {
            earliest_end = Some(end);
        }
    }

    let end = earliest_end?;
    let path: String = tail[..end].iter().collect();
    let trimmed = path.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Returns the index of the first case-insensitive occurrence of `needle`.
fn find_ignore_case(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|window| {
        window
            .iter()
            .zip(needle)
            .all(|(&a, &b)| chars_eq_ignore_case(a, b))
    })
}

fn chars_eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}
