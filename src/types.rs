use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One extracted, not-yet-persisted concert listing.
///
/// Every field read from markup is independently optional: a missing marker
/// leaves the field absent rather than aborting the record. Records missing
/// either half of the dedup key (headliner, date) are rejected at persistence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShowRecord {
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub url: Option<String>,
    pub headliner: Option<String>,
    pub supports: Vec<String>,
    pub age: Option<String>,
    pub cost: Option<String>,
    pub venue_name: String,
}

impl ShowRecord {
    pub fn new(venue_name: &str) -> Self {
        Self {
            venue_name: venue_name.to_string(),
            ..Default::default()
        }
    }

    /// True when both dedup-key fields are usable.
    pub fn has_dedup_key(&self) -> bool {
        self.date.is_some() && self.headliner.as_deref().is_some_and(|h| !h.is_empty())
    }
}

/// A venue in the system, pre-seeded before any scrape run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    pub id: Option<Uuid>,
    pub name: String,
    pub location: String,
}

impl Venue {
    pub fn new(name: &str, location: &str) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            location: location.to_string(),
        }
    }
}

/// Durable form of a show record. Created once on first sighting of a
/// (headliner, date, time) triple, never updated or deleted by the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Concert {
    pub id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub date: NaiveDate,
    pub time: Option<String>,
    pub url: Option<String>,
    pub headliner: String,
    /// Supporting acts joined with commas, in billed order.
    pub supports: Option<String>,
    pub age: Option<String>,
    pub cost: Option<String>,
    pub venue_id: Uuid,
}

/// Outcome of offering one record to the concert store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeType {
    Created,
    Duplicate,
    Skipped,
}

/// Core trait each venue's calendar extractor implements.
///
/// `extract` is a pure function over raw markup; venue-specific field
/// locations and date formats are hard-coded per implementation.
pub trait VenueExtractor: Send + Sync {
    /// Canonical venue name, matching the pre-seeded venue row.
    fn venue_name(&self) -> &'static str;

    /// Calendar page to fetch.
    fn calendar_url(&self) -> &'static str;

    /// Extract show records from raw calendar markup, in document order.
    fn extract(&self, markup: &str) -> Vec<ShowRecord>;
}
