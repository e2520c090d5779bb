//! Line preparation and merchant detection

use tracing::debug;

/// Lines shorter than this (after trimming) are OCR noise
const MIN_LINE_CHARS: usize = 3;

/// Split recognized text into trimmed lines, dropping the short ones.
pub fn prepare_lines(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|line| line.chars().count() >= MIN_LINE_CHARS)
        .collect()
}

/// The first of the leading `scan` lines whose length lies strictly between
/// 3 and 50 characters.
pub fn detect_merchant<'a, S: AsRef<str>>(lines: &'a [S], scan: usize) -> Option<&'a str> {
    let merchant = lines
        .iter()
        .take(scan)
        .map(|line| line.as_ref().trim())
        .find(|line| {
            let len = line.chars().count();
            len > 3 && len < 50
        });
    debug!(?merchant, "merchant detection");
    merchant
}
