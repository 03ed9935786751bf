use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::verify_token;
use crate::error::ApiError;
use crate::handlers::planet_id::PlanetId;

#[derive(Clone)]
pub struct AuthSettings {
    pub secret: Arc<str>,
}

impl AuthSettings {
    pub fn new(secret: impl Into<Arc<str>>) -> Self {
        Self { secret: secret.into() }
    }
}

/// Authenticated caller, inserted into request extensions by [`require_auth`].
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub subject: String,
}

/// Rejects requests without a valid `Authorization: Bearer <jwt>` header.
///
/// A path whose `:id` is not a planet id is reported as an unmatched route
/// before any credentials are looked at.
pub async fn require_auth(
    State(settings): State<AuthSettings>,
    params: Option<Path<HashMap<String, String>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Some(Path(params)) = &params {
        if params.get("id").is_some_and(|raw| PlanetId::parse(raw).is_none()) {
            return Err(ApiError::route_not_found(request.method(), request.uri().path()));
        }
    }

    let token = extract_bearer(request.headers()).map_err(|reason| {
        tracing::debug!("Rejected request: {}", reason);
        ApiError::Unauthorized
    })?;

    let claims = verify_token(token, &settings.secret).map_err(|e| {
        tracing::debug!("Rejected request: {}", e);
        ApiError::Unauthorized
    })?;

    request.extensions_mut().insert(AuthUser { subject: claims.sub });
    Ok(next.run(request).await)
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, &'static str> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or("Missing Authorization header")?
        .to_str()
        .map_err(|_| "Invalid Authorization header format")?;

    match value.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        Some(_) => Err("Empty JWT token"),
        None => Err("Authorization header must use Bearer token format"),
    }
}
