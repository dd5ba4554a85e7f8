//! Feedback parsing
//!
//! The evaluation service returns feedback as free text, usually a loose
//! bullet list. `parse` turns that into discrete, displayable points.

/// Split raw feedback text into ordered feedback points.
///
/// Segments are split on newlines, bullet characters (`•`) and hyphens,
/// trimmed, and empty segments dropped. Input order is preserved. Never
/// fails: any input (including the empty string) yields a possibly empty
/// list.
pub fn parse(raw: &str) -> Vec<String> {
    raw.split(['\n', '\u{2022}', '-'])
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}
