pub mod bottom_of_the_hill;
pub mod chapel;

use crate::constants;
use crate::types::VenueExtractor;
use bottom_of_the_hill::BottomOfTheHillExtractor;
use chapel::ChapelExtractor;
use scraper::ElementRef;

/// Look up an extractor by its venue identifier.
pub fn create_extractor(venue_id: &str) -> Option<Box<dyn VenueExtractor>> {
    match venue_id {
        constants::CHAPEL_ID => Some(Box::new(ChapelExtractor::new())),
        constants::BOTTOM_OF_THE_HILL_ID => Some(Box::new(BottomOfTheHillExtractor::new())),
        _ => None,
    }
}

/// All venue extractors, in their fixed run order.
pub fn all_extractors() -> Vec<Box<dyn VenueExtractor>> {
    vec![
        Box::new(ChapelExtractor::new()),
        Box::new(BottomOfTheHillExtractor::new()),
    ]
}

/// Collect an element's text, trimmed; empty text reads as an absent field.
pub(crate) fn element_text(element: ElementRef) -> Option<String> {
    let text = element.text().collect::<String>().trim().to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Join a show link onto its site base when the markup carries a relative href.
pub(crate) fn absolutize(base: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else if href.starts_with('/') {
        format!("{base}{href}")
    } else {
        format!("{base}/{href}")
    }
}
