use crate::constants::{CHAPEL_BASE_URL, CHAPEL_CALENDAR_URL, CHAPEL_VENUE_NAME};
use crate::normalize::normalize_date;
use crate::types::{ShowRecord, VenueExtractor};
use crate::venues::{absolutize, element_text};
use chrono::NaiveDate;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Extractor for The Chapel's calendar page.
///
/// The page is a list of `.vevent` day blocks. Each block carries its date in
/// the `title` attribute of a `span.value-title` marker and holds zero or more
/// `div.one-event` show fragments.
pub struct ChapelExtractor;

impl Default for ChapelExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ChapelExtractor {
    pub fn new() -> Self {
        Self
    }

    fn parse_show(&self, show: ElementRef, date: Option<NaiveDate>) -> ShowRecord {
        let url_selector = Selector::parse(".url").unwrap();
        let supports_selector = Selector::parse(".supports").unwrap();
        let time_selector = Selector::parse(".start-time").unwrap();
        let age_selector = Selector::parse(".age-restriction").unwrap();
        let free_selector = Selector::parse(".free").unwrap();

        let mut record = ShowRecord::new(CHAPEL_VENUE_NAME);
        record.date = date;

        if let Some(link) = show.select(&url_selector).next() {
            record.headliner = element_text(link);
            if let Some(href) = link.value().attr("href") {
                record.url = Some(absolutize(CHAPEL_BASE_URL, href));
            }
        }

        record.supports = show
            .select(&supports_selector)
            .filter_map(element_text)
            .collect();
        record.time = show.select(&time_selector).next().and_then(element_text);
        record.age = show.select(&age_selector).next().and_then(element_text);

        // "free" is encoded by marker presence, not text
        if show.select(&free_selector).next().is_some() {
            record.cost = Some("Free".to_string());
        }

        record
    }

    /// Read the day's date out of the `span.value-title` title attribute,
    /// which embeds it in a longer ISO timestamp.
    fn parse_day_date(&self, day: ElementRef) -> Option<NaiveDate> {
        let date_selector = Selector::parse("span.value-title").unwrap();
        let date_pattern = Regex::new(r"[0-9-]+").unwrap();

        let title = day
            .select(&date_selector)
            .next()
            .and_then(|marker| marker.value().attr("title"))?;
        let text = date_pattern.find(title)?.as_str();
        match normalize_date(text, DATE_FORMAT) {
            Ok(date) => Some(date),
            Err(e) => {
                warn!(venue = CHAPEL_VENUE_NAME, error = %e, "failed to parse day marker");
                None
            }
        }
    }
}

impl VenueExtractor for ChapelExtractor {
    fn venue_name(&self) -> &'static str {
        CHAPEL_VENUE_NAME
    }

    fn calendar_url(&self) -> &'static str {
        CHAPEL_CALENDAR_URL
    }

    fn extract(&self, markup: &str) -> Vec<ShowRecord> {
        let document = Html::parse_document(markup);
        let day_selector = Selector::parse(".vevent").unwrap();
        let show_selector = Selector::parse("div.one-event").unwrap();

        let mut records = Vec::new();
        for day in document.select(&day_selector) {
            let date = self.parse_day_date(day);
            if date.is_none() {
                warn!(venue = CHAPEL_VENUE_NAME, "calendar day is missing its date marker");
            }
            for show in day.select(&show_selector) {
                records.push(self.parse_show(show, date));
            }
        }

        debug!(
            venue = CHAPEL_VENUE_NAME,
            count = records.len(),
            "extracted show records"
        );
        records
    }
}
