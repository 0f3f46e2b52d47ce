use chrono::NaiveDate;
use concert_scraper::db::SqliteStorage;
use concert_scraper::pipeline::upsert_show;
use concert_scraper::storage::{seed_venues, InMemoryStorage, Storage};
use concert_scraper::types::{ChangeType, VenueExtractor};
use concert_scraper::venues::bottom_of_the_hill::BottomOfTheHillExtractor;
use concert_scraper::venues::chapel::ChapelExtractor;

const CHAPEL_FIXTURE: &str = include_str!("fixtures/chapel_calendar.html");
const BOTTOM_OF_THE_HILL_FIXTURE: &str = include_str!("fixtures/bottom_of_the_hill_calendar.html");

fn fixture_extractors() -> Vec<(Box<dyn VenueExtractor>, &'static str)> {
    vec![
        (Box::new(ChapelExtractor::new()), CHAPEL_FIXTURE),
        (
            Box::new(BottomOfTheHillExtractor::new()),
            BOTTOM_OF_THE_HILL_FIXTURE,
        ),
    ]
}

async fn scrape_fixtures(storage: &dyn Storage) -> (usize, usize, usize) {
    let (mut created, mut duplicates, mut skipped) = (0, 0, 0);
    for (extractor, markup) in fixture_extractors() {
        for record in extractor.extract(markup) {
            match upsert_show(storage, &record).await.unwrap() {
                ChangeType::Created => created += 1,
                ChangeType::Duplicate => duplicates += 1,
                ChangeType::Skipped => skipped += 1,
            }
        }
    }
    (created, duplicates, skipped)
}

#[tokio::test]
async fn full_pipeline_over_both_venue_fixtures() {
    let storage = InMemoryStorage::new();
    seed_venues(&storage).await.unwrap();

    // 3 Chapel shows plus 2 Bottom of the Hill shows
    let (created, duplicates, skipped) = scrape_fixtures(&storage).await;
    assert_eq!((created, duplicates, skipped), (5, 0, 0));
    assert_eq!(storage.concert_count().await.unwrap(), 5);
}

#[tokio::test]
async fn rescraping_the_same_pages_adds_nothing() {
    let storage = InMemoryStorage::new();
    seed_venues(&storage).await.unwrap();

    scrape_fixtures(&storage).await;
    let (created, duplicates, skipped) = scrape_fixtures(&storage).await;
    assert_eq!((created, duplicates, skipped), (0, 5, 0));
    assert_eq!(storage.concert_count().await.unwrap(), 5);
}

#[tokio::test]
async fn duplicate_across_passes_inserts_two_concerts_not_three() {
    let storage = InMemoryStorage::new();
    seed_venues(&storage).await.unwrap();
    let extractor = BottomOfTheHillExtractor::new();

    let records = extractor.extract(BOTTOM_OF_THE_HILL_FIXTURE);
    assert_eq!(records.len(), 2);
    for record in &records {
        assert_eq!(
            upsert_show(&storage, record).await.unwrap(),
            ChangeType::Created
        );
    }

    // a second extraction pass re-offers one of the same shows
    let rerun = extractor.extract(BOTTOM_OF_THE_HILL_FIXTURE);
    assert_eq!(
        upsert_show(&storage, &rerun[0]).await.unwrap(),
        ChangeType::Duplicate
    );
    assert_eq!(storage.concert_count().await.unwrap(), 2);
}

#[tokio::test]
async fn persisted_concert_carries_all_extracted_fields() {
    let storage = InMemoryStorage::new();
    seed_venues(&storage).await.unwrap();
    scrape_fixtures(&storage).await;

    let date = NaiveDate::from_ymd_opt(2016, 8, 24).unwrap();
    let turnover = storage
        .find_concert("Turnover", date, Some("8:00PM doors -- music at 9:00PM"))
        .await
        .unwrap()
        .expect("Turnover show persisted");

    assert_eq!(turnover.supports.as_deref(), Some("Angel Dust,Triathalon"));
    assert_eq!(turnover.age.as_deref(), Some("21 +"));
    assert_eq!(
        turnover.cost.as_deref(),
        Some("$15 in advance / $17 at the door")
    );
    assert_eq!(
        turnover.url.as_deref(),
        Some("http://www.bottomofthehill.com/20160824.html")
    );

    let venue = storage
        .get_venue_by_name("Bottom of the Hill")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(Some(turnover.venue_id), venue.id);
}

#[tokio::test]
async fn sqlite_backend_behaves_like_the_in_memory_one() {
    let dir = tempfile::tempdir().unwrap();
    let storage = SqliteStorage::open(dir.path().join("concerts.db")).unwrap();
    seed_venues(&storage).await.unwrap();

    let (created, _, _) = scrape_fixtures(&storage).await;
    assert_eq!(created, 5);

    let (created, duplicates, _) = scrape_fixtures(&storage).await;
    assert_eq!((created, duplicates), (0, 5));
    assert_eq!(storage.concert_count().await.unwrap(), 5);

    let date = NaiveDate::from_ymd_opt(2016, 8, 21).unwrap();
    let whitney = storage
        .find_concert("Whitney", date, Some("7:30 PM"))
        .await
        .unwrap()
        .expect("Whitney show persisted");
    assert_eq!(whitney.supports.as_deref(), Some("Michael Rault,Itasca"));
}
