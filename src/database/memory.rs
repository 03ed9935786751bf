use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use super::models::planet::{Planet, PlanetData};
use super::store::{PlanetStore, StoreError};

#[derive(Default)]
struct Table {
    rows: BTreeMap<i32, Planet>,
    last_id: i32,
}

/// In-process planet store. Ids are assigned sequentially from 1 and never
/// reused, mirroring a serial primary key.
#[derive(Default)]
pub struct MemoryPlanetStore {
    table: RwLock<Table>,
}

impl MemoryPlanetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with the given payloads, in order.
    pub async fn seeded(planets: Vec<PlanetData>) -> Result<Self, StoreError> {
        let store = Self::new();
        for data in planets {
            store.create(data).await?;
        }
        Ok(store)
    }
}

#[async_trait]
impl PlanetStore for MemoryPlanetStore {
    async fn find_many(&self) -> Result<Vec<Planet>, StoreError> {
        let table = self.table.read().await;
        Ok(table.rows.values().cloned().collect())
    }

    async fn find_unique(&self, id: i32) -> Result<Option<Planet>, StoreError> {
        let table = self.table.read().await;
        Ok(table.rows.get(&id).cloned())
    }

    async fn create(&self, data: PlanetData) -> Result<Planet, StoreError> {
        let mut table = self.table.write().await;
        let id = table
            .last_id
            .checked_add(1)
            .ok_or_else(|| StoreError::ConstraintViolation("planet id sequence exhausted".into()))?;
        let now = Utc::now();
        let planet = Planet {
            id,
            description: data.initial_description(),
            name: data.name,
            diameter: data.diameter,
            moon: data.moon,
            photo_filename: None,
            created_at: now,
            updated_at: now,
        };
        table.last_id = id;
        table.rows.insert(id, planet.clone());
        debug!("Created planet {} in memory", id);
        Ok(planet)
    }

    async fn update(&self, id: i32, data: PlanetData) -> Result<Planet, StoreError> {
        let mut table = self.table.write().await;
        let planet = table.rows.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        planet.name = data.name;
        planet.diameter = data.diameter;
        planet.moon = data.moon;
        if let Some(description) = data.description {
            planet.description = description;
        }
        planet.updated_at = Utc::now();
        Ok(planet.clone())
    }

    async fn delete(&self, id: i32) -> Result<(), StoreError> {
        let mut table = self.table.write().await;
        table.rows.remove(&id).map(|_| ()).ok_or(StoreError::NotFound(id))
    }

    async fn set_photo(&self, id: i32, photo_filename: &str) -> Result<Planet, StoreError> {
        let mut table = self.table.write().await;
        let planet = table.rows.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        planet.photo_filename = Some(photo_filename.to_string());
        planet.updated_at = Utc::now();
        Ok(planet.clone())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
