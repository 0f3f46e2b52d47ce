use crate::constants::{
    BOTTOM_OF_THE_HILL_BASE_URL, BOTTOM_OF_THE_HILL_CALENDAR_URL, BOTTOM_OF_THE_HILL_VENUE_NAME,
};
use crate::normalize::{clean_text, normalize_date};
use crate::types::{ShowRecord, VenueExtractor};
use crate::venues::{absolutize, element_text};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

const DATE_FORMAT: &str = "%A %B %d %Y";

/// Extractor for the Bottom of the Hill calendar page.
///
/// The page is one big `table#listings`; each calendar entry is a `tr` whose
/// show cell is marked by an inline style rather than a class. Band names all
/// share the `.band` class: the first is the headliner, the rest are supports,
/// in billed order.
pub struct BottomOfTheHillExtractor;

impl Default for BottomOfTheHillExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl BottomOfTheHillExtractor {
    pub fn new() -> Self {
        Self
    }

    fn parse_show(&self, cell: ElementRef) -> ShowRecord {
        let band_selector = Selector::parse(".band").unwrap();
        let link_selector = Selector::parse("a").unwrap();
        let date_selector = Selector::parse(".date").unwrap();
        let time_selector = Selector::parse(".time").unwrap();
        let age_selector = Selector::parse(".age").unwrap();
        let cover_selector = Selector::parse(".cover").unwrap();

        let mut record = ShowRecord::new(BOTTOM_OF_THE_HILL_VENUE_NAME);

        let mut bands = cell.select(&band_selector).filter_map(element_text);
        record.headliner = bands.next();
        record.supports = bands.collect();

        record.url = cell
            .select(&link_selector)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(|href| absolutize(BOTTOM_OF_THE_HILL_BASE_URL, href));

        // The date is split across several fragments, possibly polluted by
        // encoding artifacts the normalizer scrubs.
        let date_text = cell
            .select(&date_selector)
            .map(|fragment| fragment.text().collect::<String>())
            .collect::<Vec<_>>()
            .join(" ");
        record.date = match normalize_date(&date_text, DATE_FORMAT) {
            Ok(date) => Some(date),
            Err(e) => {
                warn!(venue = BOTTOM_OF_THE_HILL_VENUE_NAME, error = %e, "failed to parse show date");
                None
            }
        };

        let time_text = cell
            .select(&time_selector)
            .map(|fragment| fragment.text().collect::<String>())
            .collect::<String>();
        if !time_text.trim().is_empty() {
            record.time = Some(clean_text(&time_text));
        }

        // Age fragments that are pure formatting newlines are dropped.
        let age_text = cell
            .select(&age_selector)
            .map(|fragment| fragment.text().collect::<String>())
            .filter(|text| !text.contains('\n'))
            .collect::<String>();
        if !age_text.trim().is_empty() {
            record.age = Some(age_text.trim().to_string());
        }

        let cover_text = cell
            .select(&cover_selector)
            .map(|fragment| fragment.text().collect::<String>())
            .collect::<String>();
        if !cover_text.trim().is_empty() {
            record.cost = Some(clean_text(&cover_text));
        }

        record
    }
}

impl VenueExtractor for BottomOfTheHillExtractor {
    fn venue_name(&self) -> &'static str {
        BOTTOM_OF_THE_HILL_VENUE_NAME
    }

    fn calendar_url(&self) -> &'static str {
        BOTTOM_OF_THE_HILL_CALENDAR_URL
    }

    fn extract(&self, markup: &str) -> Vec<ShowRecord> {
        let document = Html::parse_document(markup);
        let row_selector = Selector::parse("table#listings tr").unwrap();
        let date_selector = Selector::parse(".date").unwrap();
        let cell_selector = Selector::parse("td").unwrap();
        // The highlighted show cell has no class of its own; this style prefix
        // is what distinguishes it from spacer and navigation cells.
        let style_pattern = Regex::new(r"vertical-align: top; background-color").unwrap();

        let mut records = Vec::new();
        for row in document.select(&row_selector) {
            // rows without a date are headers or spacers, not calendar entries
            if row.select(&date_selector).next().is_none() {
                continue;
            }

            let show_cell = row.select(&cell_selector).find(|td| {
                td.value()
                    .attr("style")
                    .is_some_and(|style| style_pattern.is_match(style))
            });
            match show_cell {
                Some(cell) => records.push(self.parse_show(cell)),
                None => {
                    warn!(
                        venue = BOTTOM_OF_THE_HILL_VENUE_NAME,
                        "calendar row has a date but no recognizable show cell"
                    );
                }
            }
        }

        debug!(
            venue = BOTTOM_OF_THE_HILL_VENUE_NAME,
            count = records.len(),
            "extracted show records"
        );
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const FIXTURE: &str = include_str!("../../tests/fixtures/bottom_of_the_hill_calendar.html");

    fn extract_fixture() -> Vec<ShowRecord> {
        BottomOfTheHillExtractor::new().extract(FIXTURE)
    }

    #[test]
    fn extracts_the_turnover_show_exactly() {
        let records = extract_fixture();
        let show = &records[0];
        assert_eq!(show.headliner.as_deref(), Some("Turnover"));
        assert_eq!(
            show.supports,
            vec!["Angel Dust".to_string(), "Triathalon".to_string()]
        );
        assert_eq!(show.date, NaiveDate::from_ymd_opt(2016, 8, 24));
        assert_eq!(
            show.cost.as_deref(),
            Some("$15 in advance / $17 at the door")
        );
        assert_eq!(
            show.url.as_deref(),
            Some("http://www.bottomofthehill.com/20160824.html")
        );
        assert_eq!(show.venue_name, BOTTOM_OF_THE_HILL_VENUE_NAME);
    }

    #[test]
    fn joins_time_fragments_and_collapses_newlines() {
        let records = extract_fixture();
        assert_eq!(
            records[0].time.as_deref(),
            Some("8:00PM doors -- music at 9:00PM")
        );
    }

    #[test]
    fn keeps_age_fragments_that_are_not_formatting_noise() {
        let records = extract_fixture();
        assert_eq!(records[0].age.as_deref(), Some("21 +"));
    }

    #[test]
    fn scrubs_replacement_characters_from_date_text() {
        let records = extract_fixture();
        assert_eq!(records[1].headliner.as_deref(), Some("Joyce Manor"));
        assert_eq!(records[1].date, NaiveDate::from_ymd_opt(2016, 8, 25));
    }

    #[test]
    fn skips_rows_without_a_date_marker() {
        // The fixture has header and spacer rows; only real entries survive.
        let records = extract_fixture();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn unparseable_date_degrades_to_an_incomplete_record() {
        let markup = r#"
            <table id="listings">
              <tr>
                <td style="vertical-align: top; background-color: #ffffcc">
                  <span class="date">sometime soon</span>
                  <span class="band">Mystery Band</span>
                </td>
              </tr>
            </table>"#;
        let records = BottomOfTheHillExtractor::new().extract(markup);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].headliner.as_deref(), Some("Mystery Band"));
        assert_eq!(records[0].date, None);
    }
}
