#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use planets_api::database::{MemoryPlanetStore, PlanetData};
use planets_api::{build_app, AppCapabilities, AppOptions, AppState};

pub const ORIGIN: &str = "http://localhost:8080";
pub const SECRET: &str = "test-secret";
pub const BOUNDARY: &str = "planets-test-boundary";

/// One application instance over a fresh in-memory store and upload dir.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryPlanetStore>,
    pub uploads: TempDir,
}

impl TestApp {
    pub async fn new() -> Result<Self> {
        Self::with_capabilities(AppCapabilities::default()).await
    }

    pub async fn with_capabilities(capabilities: AppCapabilities) -> Result<Self> {
        Self::seeded(capabilities, vec![]).await
    }

    pub async fn seeded(capabilities: AppCapabilities, planets: Vec<PlanetData>) -> Result<Self> {
        let options = AppOptions {
            capabilities,
            ..AppOptions::default()
        };
        Self::with_options(options, planets).await
    }

    /// Any options; the JWT secret is always [`SECRET`].
    pub async fn with_options(options: AppOptions, planets: Vec<PlanetData>) -> Result<Self> {
        let store = Arc::new(MemoryPlanetStore::seeded(planets).await?);
        let uploads = tempfile::tempdir().context("failed to create upload dir")?;
        let options = AppOptions {
            jwt_secret: SECRET.to_string(),
            ..options
        };
        let router = build_app(AppState::new(store.clone(), uploads.path()), &options);
        Ok(Self { router, store, uploads })
    }

    pub async fn send(&self, request: Request<Body>) -> Result<Response<Body>> {
        Ok(self.router.clone().oneshot(request).await?)
    }

    pub async fn get(&self, uri: &str) -> Result<Response<Body>> {
        self.send(Request::get(uri).header(header::ORIGIN, ORIGIN).body(Body::empty())?)
            .await
    }

    pub async fn delete(&self, uri: &str) -> Result<Response<Body>> {
        self.send(Request::delete(uri).header(header::ORIGIN, ORIGIN).body(Body::empty())?)
            .await
    }

    pub async fn json(&self, method: &str, uri: &str, body: &Value) -> Result<Response<Body>> {
        self.send(json_request(method, uri, body)?).await
    }
}

pub fn json_request(method: &str, uri: &str, body: &Value) -> Result<Request<Body>> {
    Ok(Request::builder()
        .method(method)
        .uri(uri)
        .header(header::ORIGIN, ORIGIN)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body)?))?)
}

/// multipart/form-data request with one file part per `(field, filename, mime, bytes)`.
pub fn multipart_request(uri: &str, files: &[(&str, &str, &str, &[u8])]) -> Result<Request<Body>> {
    let mut body = Vec::new();
    for (field, filename, mime, bytes) in files {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                field, filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", mime).as_bytes());
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Ok(Request::post(uri)
        .header(header::ORIGIN, ORIGIN)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))?)
}

pub async fn body_text(response: Response<Body>) -> Result<String> {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok(String::from_utf8(bytes.to_vec())?)
}

pub async fn body_json(response: Response<Body>) -> Result<Value> {
    let text = body_text(response).await?;
    serde_json::from_str(&text).with_context(|| format!("response is not JSON: {}", text))
}

pub fn content_type(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

pub fn header_value(response: &Response<Body>, name: &str) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

pub fn mercury() -> PlanetData {
    PlanetData::new("Mercury", 1234, 12)
}

pub fn venus() -> PlanetData {
    PlanetData::new("Venus", 5678, 2)
}

pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
pub const JPEG_BYTES: &[u8] = b"\xff\xd8\xff\xe0\0\x10JFIF\0";
