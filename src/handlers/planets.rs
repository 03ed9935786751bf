use axum::{extract::State, http::Method, Extension};

use crate::app::AppState;
use crate::database::{Planet, PlanetData, StoreError};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, Validated};

use super::planet_id::PlanetId;

/// Resource-scoped not-found: `Cannot <METHOD> /planets/<id>`.
pub(crate) fn planet_not_found(method: Method, id: i32, suffix: &str) -> ApiError {
    ApiError::resource_not_found(format!("Cannot {} /planets/{}{}", method, id, suffix))
}

/// GET /planets
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Planet>> {
    let planets = state.store.find_many().await?;
    Ok(ApiResponse::ok(planets))
}

/// GET /planets/:id
pub async fn show(State(state): State<AppState>, PlanetId(id): PlanetId) -> ApiResult<Planet> {
    match state.store.find_unique(id).await? {
        Some(planet) => Ok(ApiResponse::ok(planet)),
        None => Err(planet_not_found(Method::GET, id, "")),
    }
}

/// POST /planets
pub async fn create(
    State(state): State<AppState>,
    user: Option<Extension<AuthUser>>,
    Validated { body, .. }: Validated<PlanetData>,
) -> ApiResult<Planet> {
    let planet = state.store.create(body).await?;
    match user {
        Some(Extension(user)) => {
            tracing::info!("Created planet {} ({}) for {}", planet.id, planet.name, user.subject)
        }
        None => tracing::info!("Created planet {} ({})", planet.id, planet.name),
    }
    Ok(ApiResponse::created(planet))
}

/// PUT /planets/:id
pub async fn update(
    State(state): State<AppState>,
    PlanetId(id): PlanetId,
    Validated { body, .. }: Validated<PlanetData>,
) -> ApiResult<Planet> {
    match state.store.update(id, body).await {
        Ok(planet) => Ok(ApiResponse::ok(planet)),
        Err(StoreError::NotFound(_)) => Err(planet_not_found(Method::PUT, id, "")),
        Err(e) => Err(e.into()),
    }
}

/// DELETE /planets/:id
pub async fn delete(State(state): State<AppState>, PlanetId(id): PlanetId) -> ApiResult<()> {
    match state.store.delete(id).await {
        Ok(()) => {
            tracing::info!("Deleted planet {}", id);
            Ok(ApiResponse::no_content())
        }
        Err(StoreError::NotFound(_)) => Err(planet_not_found(Method::DELETE, id, "")),
        Err(e) => Err(e.into()),
    }
}
