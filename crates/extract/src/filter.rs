//! Block-list filtering of extracted paths.

/// Returns whether `path` contains any of `exceptions`, ignoring case.
///
/// An absent path is never blocked; callers handle it before filtering.
pub fn is_blocked<S: AsRef<str>>(path: Option<&str>, exceptions: &[S]) -> bool {
    let Some(path) = path else {
        return false;
    };
    let path = path.to_lowercase();
    exceptions
        .iter()
        .any(|exception| path.contains(&exception.as_ref().to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXCEPTIONS: &[&str] = &[r"\Jingles", "/Jingles", r"\Promo", "/Promo"];

    #[test]
    fn blocks_matching_substring() {
        assert!(is_blocked(Some(r"C:\Music\Jingles\jingle01.mp3"), EXCEPTIONS));
        assert!(is_blocked(Some("/srv/Promo/spot.wav"), EXCEPTIONS));
    }

    #[test]
    fn match_is_case_insensitive() {
        assert!(is_blocked(Some(r"c:\music\jingles\a.mp3"), EXCEPTIONS));
        assert!(is_blocked(Some(r"C:\MUSIC\PROMO\B.MP3"), EXCEPTIONS));
    }

    #[test]
    fn separator_style_matters() {
        // `\Jingles` and `/Jingles` are separate entries.
        assert!(!is_blocked(Some("C:/Music/Jingles/a.mp3"), &[r"\Jingles"]));
    }

    #[test]
    fn unrelated_path_passes() {
        assert!(!is_blocked(Some(r"C:\Music\Shows\morning_show.mp3"), EXCEPTIONS));
    }

    #[test]
    fn absent_path_is_not_blocked() {
        assert!(!is_blocked(None, EXCEPTIONS));
    }

    #[test]
    fn empty_block_list_blocks_nothing() {
        let none: &[&str] = &[];
        assert!(!is_blocked(Some(r"C:\Music\Jingles\a.mp3"), none));
    }
}
