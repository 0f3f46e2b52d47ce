/// Venue identifiers and page locations shared across the codebase.
/// The identifiers are what the CLI accepts; the venue names must match the
/// rows pre-seeded in storage.

// Venue identifiers (used in CLI and the extractor registry)
pub const CHAPEL_ID: &str = "chapel";
pub const BOTTOM_OF_THE_HILL_ID: &str = "bottom_of_the_hill";

// Canonical venue names (used as the storage lookup key)
pub const CHAPEL_VENUE_NAME: &str = "The Chapel";
pub const BOTTOM_OF_THE_HILL_VENUE_NAME: &str = "Bottom of the Hill";

// Site base URLs, used to absolutize relative show links
pub const CHAPEL_BASE_URL: &str = "http://www.thechapelsf.com";
pub const BOTTOM_OF_THE_HILL_BASE_URL: &str = "http://www.bottomofthehill.com";

// Calendar page URLs
pub const CHAPEL_CALENDAR_URL: &str = "http://www.thechapelsf.com/calendar/";
pub const BOTTOM_OF_THE_HILL_CALENDAR_URL: &str =
    "http://www.bottomofthehill.com/calendar.html";

/// The fixed (name, location) venue rows the pipeline expects in storage.
pub const SEEDED_VENUES: &[(&str, &str)] = &[
    (CHAPEL_VENUE_NAME, "sf"),
    (BOTTOM_OF_THE_HILL_VENUE_NAME, "sf"),
];

/// Get all supported venue identifiers
pub fn supported_venues() -> Vec<&'static str> {
    vec![CHAPEL_ID, BOTTOM_OF_THE_HILL_ID]
}
