use crate::constants::SEEDED_VENUES;
use crate::error::Result;
use crate::types::{Concert, Venue};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};
use uuid::Uuid;

/// Storage capability for venues and persisted concerts.
///
/// Passed explicitly to whatever needs it; acquired once per run. The
/// pipeline only ever looks venues up and inserts concerts: venues are
/// pre-seeded and concerts are never updated or deleted here.
#[async_trait]
pub trait Storage: Send + Sync {
    // Venue operations
    async fn create_venue(&self, venue: &mut Venue) -> Result<()>;
    async fn get_venue_by_name(&self, name: &str) -> Result<Option<Venue>>;

    // Concert operations
    async fn create_concert(&self, concert: &mut Concert) -> Result<()>;
    /// Exact match on the (headliner, date, time) dedup key. An absent time
    /// only matches an absent time.
    async fn find_concert(
        &self,
        headliner: &str,
        date: NaiveDate,
        time: Option<&str>,
    ) -> Result<Option<Concert>>;
    async fn concert_count(&self) -> Result<usize>;
}

/// Insert the fixed venue rows when they are not already present.
pub async fn seed_venues(storage: &dyn Storage) -> Result<()> {
    for (name, location) in SEEDED_VENUES {
        if storage.get_venue_by_name(name).await?.is_none() {
            let mut venue = Venue::new(name, location);
            storage.create_venue(&mut venue).await?;
            info!("Seeded venue: {}", name);
        }
    }
    Ok(())
}

/// In-memory storage implementation for development/testing
pub struct InMemoryStorage {
    venues: Arc<Mutex<HashMap<Uuid, Venue>>>,
    concerts: Arc<Mutex<HashMap<Uuid, Concert>>>,
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self {
            venues: Arc::new(Mutex::new(HashMap::new())),
            concerts: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn create_venue(&self, venue: &mut Venue) -> Result<()> {
        let id = Uuid::new_v4();
        venue.id = Some(id);

        let mut venues = self.venues.lock().unwrap();
        venues.insert(id, venue.clone());

        debug!("Created venue: {} with id {}", venue.name, id);
        Ok(())
    }

    async fn get_venue_by_name(&self, name: &str) -> Result<Option<Venue>> {
        let venues = self.venues.lock().unwrap();
        let venue = venues.values().find(|v| v.name == name).cloned();
        Ok(venue)
    }

    async fn create_concert(&self, concert: &mut Concert) -> Result<()> {
        let id = Uuid::new_v4();
        concert.id = Some(id);

        let mut concerts = self.concerts.lock().unwrap();
        concerts.insert(id, concert.clone());

        debug!("Created concert: {} with id {}", concert.headliner, id);
        Ok(())
    }

    async fn find_concert(
        &self,
        headliner: &str,
        date: NaiveDate,
        time: Option<&str>,
    ) -> Result<Option<Concert>> {
        let concerts = self.concerts.lock().unwrap();
        let concert = concerts
            .values()
            .find(|c| c.headliner == headliner && c.date == date && c.time.as_deref() == time)
            .cloned();
        Ok(concert)
    }

    async fn concert_count(&self) -> Result<usize> {
        Ok(self.concerts.lock().unwrap().len())
    }
}
