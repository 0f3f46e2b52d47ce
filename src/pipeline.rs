use crate::error::{Result, ScraperError};
use crate::fetch::PageFetcher;
use crate::storage::Storage;
use crate::types::{ChangeType, Concert, ShowRecord, VenueExtractor};
use chrono::Utc;
use metrics::{counter, histogram};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};

/// Offer one extracted record to the concert store.
///
/// A record missing its dedup key (headliner plus date) is skipped, not an
/// error: partial records are an expected product of messy markup. A record
/// whose (headliner, date, time) triple is already stored is reported as a
/// duplicate and left untouched.
pub async fn upsert_show(storage: &dyn Storage, record: &ShowRecord) -> Result<ChangeType> {
    let (Some(headliner), Some(date)) = (
        record.headliner.as_deref().filter(|h| !h.is_empty()),
        record.date,
    ) else {
        warn!(
            record = %serde_json::to_string(record).unwrap_or_default(),
            "record missing headliner or date, skipping"
        );
        return Ok(ChangeType::Skipped);
    };

    if storage
        .find_concert(headliner, date, record.time.as_deref())
        .await?
        .is_some()
    {
        return Ok(ChangeType::Duplicate);
    }

    let venue = storage
        .get_venue_by_name(&record.venue_name)
        .await?
        .ok_or_else(|| ScraperError::UnknownVenue(record.venue_name.clone()))?;
    let venue_id = venue.id.ok_or_else(|| ScraperError::Storage {
        message: format!("stored venue {} has no id", venue.name),
    })?;

    let supports = if record.supports.is_empty() {
        None
    } else {
        Some(record.supports.join(","))
    };

    let mut concert = Concert {
        id: None,
        created_at: Utc::now(),
        date,
        time: record.time.clone(),
        url: record.url.clone(),
        headliner: headliner.to_string(),
        supports,
        age: record.age.clone(),
        cost: record.cost.clone(),
        venue_id,
    };
    storage.create_concert(&mut concert).await?;
    info!(headliner, date = %date, venue = %record.venue_name, "created concert");
    Ok(ChangeType::Created)
}

/// Per-venue tally of one scrape run.
#[derive(Debug, Default)]
pub struct VenueRunResult {
    pub venue_name: String,
    pub extracted: usize,
    pub inserted: usize,
    pub duplicates: usize,
    pub skipped: usize,
    pub errors: Vec<String>,
}

impl VenueRunResult {
    fn new(venue_name: &str) -> Self {
        Self {
            venue_name: venue_name.to_string(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub venues: Vec<VenueRunResult>,
}

impl RunSummary {
    pub fn total_inserted(&self) -> usize {
        self.venues.iter().map(|v| v.inserted).sum()
    }

    pub fn total_duplicates(&self) -> usize {
        self.venues.iter().map(|v| v.duplicates).sum()
    }

    pub fn total_skipped(&self) -> usize {
        self.venues.iter().map(|v| v.skipped).sum()
    }

    pub fn total_errors(&self) -> usize {
        self.venues.iter().map(|v| v.errors.len()).sum()
    }
}

/// Drives fetch, extract and persist for a set of venues, one venue at a
/// time. A venue that fails to fetch is recorded and the run moves on; each
/// record commits individually, so one bad record never rolls back its
/// neighbors.
pub struct Orchestrator {
    fetcher: PageFetcher,
    storage: Arc<dyn Storage>,
}

impl Orchestrator {
    pub fn new(fetcher: PageFetcher, storage: Arc<dyn Storage>) -> Self {
        Self { fetcher, storage }
    }

    pub async fn run(&self, extractors: Vec<Box<dyn VenueExtractor>>) -> RunSummary {
        let mut summary = RunSummary::default();
        for extractor in extractors {
            summary.venues.push(self.run_venue(extractor.as_ref()).await);
        }
        summary
    }

    #[instrument(skip(self, extractor), fields(venue = extractor.venue_name()))]
    async fn run_venue(&self, extractor: &dyn VenueExtractor) -> VenueRunResult {
        let venue_name = extractor.venue_name();
        let mut result = VenueRunResult::new(venue_name);
        let started = Instant::now();

        let markup = match self.fetcher.fetch(extractor.calendar_url()).await {
            Ok(markup) => markup,
            Err(e) => {
                warn!(error = %e, "calendar fetch failed");
                counter!("scraper_fetch_errors_total", "venue" => venue_name).increment(1);
                result.errors.push(e.to_string());
                return result;
            }
        };

        let records = extractor.extract(&markup);
        result.extracted = records.len();
        counter!("scraper_records_extracted_total", "venue" => venue_name)
            .increment(records.len() as u64);

        for record in &records {
            match upsert_show(self.storage.as_ref(), record).await {
                Ok(ChangeType::Created) => result.inserted += 1,
                Ok(ChangeType::Duplicate) => result.duplicates += 1,
                Ok(ChangeType::Skipped) => result.skipped += 1,
                Err(e) => {
                    warn!(error = %e, "failed to persist record");
                    result.errors.push(e.to_string());
                }
            }
        }
        counter!("scraper_records_inserted_total", "venue" => venue_name)
            .increment(result.inserted as u64);
        histogram!("scraper_venue_run_seconds", "venue" => venue_name)
            .record(started.elapsed().as_secs_f64());

        info!(
            extracted = result.extracted,
            inserted = result.inserted,
            duplicates = result.duplicates,
            skipped = result.skipped,
            errors = result.errors.len(),
            "venue run complete"
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{seed_venues, InMemoryStorage};
    use chrono::NaiveDate;

    fn record(headliner: &str, date: Option<NaiveDate>, time: Option<&str>) -> ShowRecord {
        let mut record = ShowRecord::new("The Chapel");
        record.headliner = Some(headliner.to_string());
        record.date = date;
        record.time = time.map(str::to_string);
        record
    }

    #[tokio::test]
    async fn second_upsert_of_the_same_show_is_a_duplicate() {
        let storage = InMemoryStorage::new();
        seed_venues(&storage).await.unwrap();
        let date = NaiveDate::from_ymd_opt(2016, 8, 20);
        let show = record("Mild High Club", date, Some("8:00 PM"));

        assert_eq!(
            upsert_show(&storage, &show).await.unwrap(),
            ChangeType::Created
        );
        assert_eq!(
            upsert_show(&storage, &show).await.unwrap(),
            ChangeType::Duplicate
        );
        assert_eq!(storage.concert_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn same_show_at_a_different_time_inserts_again() {
        let storage = InMemoryStorage::new();
        seed_venues(&storage).await.unwrap();
        let date = NaiveDate::from_ymd_opt(2016, 8, 20);

        let matinee = record("Mild High Club", date, Some("2:00 PM"));
        let evening = record("Mild High Club", date, Some("8:00 PM"));
        upsert_show(&storage, &matinee).await.unwrap();
        assert_eq!(
            upsert_show(&storage, &evening).await.unwrap(),
            ChangeType::Created
        );
        assert_eq!(storage.concert_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn record_without_a_date_is_skipped_not_stored() {
        let storage = InMemoryStorage::new();
        seed_venues(&storage).await.unwrap();

        let show = record("Mystery Band", None, None);
        assert_eq!(
            upsert_show(&storage, &show).await.unwrap(),
            ChangeType::Skipped
        );
        assert_eq!(storage.concert_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn record_without_a_headliner_is_skipped_not_stored() {
        let storage = InMemoryStorage::new();
        seed_venues(&storage).await.unwrap();
        let date = NaiveDate::from_ymd_opt(2016, 8, 20);

        let mut show = record("Mild High Club", date, None);
        show.headliner = None;
        assert_eq!(
            upsert_show(&storage, &show).await.unwrap(),
            ChangeType::Skipped
        );

        // an empty headliner is as unusable as a missing one
        show.headliner = Some(String::new());
        assert_eq!(
            upsert_show(&storage, &show).await.unwrap(),
            ChangeType::Skipped
        );

        assert_eq!(storage.concert_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn unknown_venue_is_an_error_not_an_insert() {
        let storage = InMemoryStorage::new();
        seed_venues(&storage).await.unwrap();

        let mut show = record(
            "Turnover",
            NaiveDate::from_ymd_opt(2016, 8, 24),
            Some("9:00PM"),
        );
        show.venue_name = "The Fillmore".to_string();

        let err = upsert_show(&storage, &show).await.unwrap_err();
        assert!(matches!(err, ScraperError::UnknownVenue(name) if name == "The Fillmore"));
        assert_eq!(storage.concert_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn supports_are_comma_joined_in_billed_order() {
        let storage = InMemoryStorage::new();
        seed_venues(&storage).await.unwrap();

        let date = NaiveDate::from_ymd_opt(2016, 8, 24).unwrap();
        let mut show = record("Turnover", Some(date), Some("9:00PM"));
        show.supports = vec!["Angel Dust".to_string(), "Triathalon".to_string()];
        upsert_show(&storage, &show).await.unwrap();

        let stored = storage
            .find_concert("Turnover", date, Some("9:00PM"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.supports.as_deref(), Some("Angel Dust,Triathalon"));
    }
}
