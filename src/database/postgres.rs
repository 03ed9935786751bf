use std::time::Duration;

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::{debug, info};

use super::models::planet::{Planet, PlanetData};
use super::store::{PlanetStore, StoreError};
use crate::config::DatabaseConfig;

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS "Planet" (
    "id" SERIAL PRIMARY KEY,
    "name" VARCHAR(128) NOT NULL,
    "description" TEXT,
    "diameter" INTEGER NOT NULL,
    "moon" INTEGER NOT NULL,
    "photoFilename" VARCHAR(255),
    "createdAt" TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    "updatedAt" TIMESTAMPTZ NOT NULL DEFAULT NOW()
)"#;

/// PostgreSQL-backed store over the `"Planet"` table.
#[derive(Clone)]
pub struct PgPlanetStore {
    pool: PgPool,
}

impl PgPlanetStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(&config.url)
            .await?;
        info!("Created database pool ({} connections max)", config.max_connections);
        Ok(Self::new(pool))
    }

    /// Create the planets table when it does not exist yet.
    pub async fn ensure_table(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("Closed database pool");
    }
}

fn classify(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() || db.is_check_violation() || db.is_foreign_key_violation() {
            return StoreError::ConstraintViolation(db.message().to_string());
        }
    }
    StoreError::Sqlx(err)
}

#[async_trait]
impl PlanetStore for PgPlanetStore {
    async fn find_many(&self) -> Result<Vec<Planet>, StoreError> {
        sqlx::query_as::<_, Planet>(r#"SELECT * FROM "Planet" ORDER BY "id""#)
            .fetch_all(&self.pool)
            .await
            .map_err(classify)
    }

    async fn find_unique(&self, id: i32) -> Result<Option<Planet>, StoreError> {
        sqlx::query_as::<_, Planet>(r#"SELECT * FROM "Planet" WHERE "id" = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(classify)
    }

    async fn create(&self, data: PlanetData) -> Result<Planet, StoreError> {
        let planet = sqlx::query_as::<_, Planet>(
            r#"INSERT INTO "Planet" ("name", "description", "diameter", "moon", "updatedAt")
               VALUES ($1, $2, $3, $4, NOW())
               RETURNING *"#,
        )
        .bind(&data.name)
        .bind(data.initial_description())
        .bind(data.diameter)
        .bind(data.moon)
        .fetch_one(&self.pool)
        .await
        .map_err(classify)?;

        debug!("Inserted planet {}", planet.id);
        Ok(planet)
    }

    async fn update(&self, id: i32, data: PlanetData) -> Result<Planet, StoreError> {
        let replace_description = data.description.is_some();
        sqlx::query_as::<_, Planet>(
            r#"UPDATE "Planet"
               SET "name" = $2,
                   "diameter" = $3,
                   "moon" = $4,
                   "description" = CASE WHEN $5 THEN $6 ELSE "description" END,
                   "updatedAt" = NOW()
               WHERE "id" = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(&data.name)
        .bind(data.diameter)
        .bind(data.moon)
        .bind(replace_description)
        .bind(data.description.flatten())
        .fetch_optional(&self.pool)
        .await
        .map_err(classify)?
        .ok_or(StoreError::NotFound(id))
    }

    async fn delete(&self, id: i32) -> Result<(), StoreError> {
        let result = sqlx::query(r#"DELETE FROM "Planet" WHERE "id" = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(classify)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    async fn set_photo(&self, id: i32, photo_filename: &str) -> Result<Planet, StoreError> {
        sqlx::query_as::<_, Planet>(
            r#"UPDATE "Planet" SET "photoFilename" = $2, "updatedAt" = NOW()
               WHERE "id" = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(photo_filename)
        .fetch_optional(&self.pool)
        .await
        .map_err(classify)?
        .ok_or(StoreError::NotFound(id))
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
