use async_trait::async_trait;
use thiserror::Error;

use super::models::planet::{Planet, PlanetData};

/// Failures surfaced by a [`PlanetStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// No row matched the id of an update/delete.
    #[error("Planet {0} not found")]
    NotFound(i32),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Persistence boundary for planet records.
///
/// `find_unique` reports a missing row as `Ok(None)`; the mutating
/// operations report it as [`StoreError::NotFound`] so handlers can map it
/// to their own message.
#[async_trait]
pub trait PlanetStore: Send + Sync {
    async fn find_many(&self) -> Result<Vec<Planet>, StoreError>;

    async fn find_unique(&self, id: i32) -> Result<Option<Planet>, StoreError>;

    async fn create(&self, data: PlanetData) -> Result<Planet, StoreError>;

    async fn update(&self, id: i32, data: PlanetData) -> Result<Planet, StoreError>;

    async fn delete(&self, id: i32) -> Result<(), StoreError>;

    async fn set_photo(&self, id: i32, photo_filename: &str) -> Result<Planet, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}
