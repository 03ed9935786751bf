use std::collections::HashMap;

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::{header, request::Parts},
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::validation::{self, FieldError, Section, Validation, ValidationError, ValidationRequest};

/// Extractor that checks the request against `T::SCHEMAS` before the handler
/// runs, then deserializes the sanitized body into `T`.
///
/// Must be the last extractor of a handler since it consumes the body.
#[derive(Debug)]
pub struct Validated<T> {
    pub body: T,
    pub params: Value,
    pub query: Value,
}

#[async_trait]
impl<T, S> FromRequest<S> for Validated<T>
where
    T: Validation + DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let schemas = T::SCHEMAS;
        let (mut parts, body) = request.into_parts();

        let params = if schemas.params.is_some() {
            path_params(&mut parts, state).await
        } else {
            Value::Object(Map::new())
        };
        let query = if schemas.query.is_some() {
            query_params(&parts)?
        } else {
            Value::Object(Map::new())
        };

        let is_json = is_json_content(&parts);
        let bytes = Bytes::from_request(Request::from_parts(parts, body), state).await?;
        let body = if is_json && !bytes.is_empty() {
            serde_json::from_slice(&bytes)
                .map_err(|e| ApiError::malformed_body(format!("Malformed JSON body: {}", e)))?
        } else {
            Value::Object(Map::new())
        };

        let sanitized = validation::validate(&schemas, ValidationRequest { body, params, query })?;

        let body = serde_json::from_value(sanitized.body).map_err(|e| {
            ValidationError::single(Section::Body, FieldError::new(e.to_string(), ""))
        })?;

        Ok(Self {
            body,
            params: sanitized.params,
            query: sanitized.query,
        })
    }
}

async fn path_params<S: Send + Sync>(parts: &mut Parts, state: &S) -> Value {
    let params = Path::<HashMap<String, String>>::from_request_parts(parts, state)
        .await
        .map(|Path(params)| params)
        .unwrap_or_default();
    strings_to_object(params)
}

fn query_params(parts: &Parts) -> Result<Value, ApiError> {
    let Query(query) = Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
        .map_err(|rejection| ApiError::malformed_body(rejection.body_text()))?;
    Ok(strings_to_object(query))
}

fn strings_to_object(values: HashMap<String, String>) -> Value {
    Value::Object(values.into_iter().map(|(k, v)| (k, Value::String(v))).collect())
}

// Bodies that are not declared as JSON are treated as empty.
fn is_json_content(parts: &Parts) -> bool {
    parts
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| {
            let mime = ct.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
            mime == "application/json" || mime.ends_with("+json")
        })
        .unwrap_or(false)
}
