//! Source log reading.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use encoding_rs::{Encoding, UTF_8};

use crate::FallbackReason;

/// Reads and decodes the first line of the source log.
///
/// The line ends after the first `\n`, `\r\n` or lone `\r`, so the rest of
/// a large log never needs to be valid in `encoding`. The encoding must be
/// ASCII-compatible.
///
/// Legacy code pages decode their undefined bytes (0x98 in windows-1251) to
/// C1 control characters; such a line is reported as undecodable.
pub fn read_first_line(path: &Path, encoding: &'static Encoding) -> Result<String, FallbackReason> {
    let unavailable = |source| FallbackReason::SourceUnavailable {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(unavailable)?;
    let mut reader = BufReader::new(file);
    let mut raw = Vec::new();
    reader.read_until(b'\n', &mut raw).map_err(unavailable)?;

    if raw.is_empty() {
        return Err(FallbackReason::SourceEmpty {
            path: path.to_path_buf(),
        });
    }

    raw.truncate(line_end(&raw));

    let undecodable = || FallbackReason::Decode {
        path: path.to_path_buf(),
        encoding: encoding.name(),
    };

    let line = encoding
        .decode_without_bom_handling_and_without_replacement(&raw)
        .ok_or_else(undecodable)?;

    if encoding != UTF_8 && line.chars().any(is_c1_control) {
        return Err(undecodable());
    }

    Ok(line.into_owned())
}

/// Returns the length of the first line in `raw`, terminator included.
fn line_end(raw: &[u8]) -> usize {
    match raw.iter().position(|&b| b == b'\r') {
        Some(cr) if raw.get(cr + 1) == Some(&b'\n') => cr + 2,
        Some(cr) => cr + 1,
        None => raw.len(),
    }
}

fn is_c1_control(c: char) -> bool {
    ('\u{80}'..='\u{9f}').contains(&c)
}
