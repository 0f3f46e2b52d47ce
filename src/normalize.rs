use crate::error::{Result, ScraperError};
use chrono::NaiveDate;

/// Sentinel left behind where the source page's encoding broke down.
/// It stands in for whitespace the original markup had, not a real character.
const REPLACEMENT_CHAR: char = '\u{FFFD}';

/// Parse venue-specific date text into a canonical calendar date.
///
/// The caller supplies the source format derived from its markup conventions
/// (e.g. `%A %B %d %Y` for "Wednesday August 24 2016"). Failure aborts only
/// the record being extracted, never the whole run.
pub fn normalize_date(raw: &str, format: &str) -> Result<NaiveDate> {
    let scrubbed = scrub_replacement_chars(raw);
    let cleaned = scrubbed.trim();
    NaiveDate::parse_from_str(cleaned, format).map_err(|_| ScraperError::DateParse {
        text: cleaned.to_string(),
        format: format.to_string(),
    })
}

/// Replace encoding-artifact sentinels with spaces.
fn scrub_replacement_chars(raw: &str) -> String {
    raw.chars()
        .map(|c| if c == REPLACEMENT_CHAR { ' ' } else { c })
        .collect()
}

/// Clean up free text read from multi-fragment markup: trim the ends and
/// collapse embedded newline runs to single spaces.
pub fn clean_text(raw: &str) -> String {
    let trimmed = raw.trim();
    let mut out = String::with_capacity(trimmed.len());
    let mut pending_break = false;
    for c in trimmed.chars() {
        if c == '\n' || c == '\r' {
            pending_break = true;
        } else {
            if pending_break {
                out.push(' ');
                pending_break = false;
            }
            out.push(c);
        }
    }
    out
}
