use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, Uri},
    middleware::from_fn_with_state,
    routing::{get, post, MethodRouter},
    Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::config::AppConfig;
use crate::database::PlanetStore;
use crate::error::ApiError;
use crate::handlers::{health, photo, planets};
use crate::middleware::{normalize_errors, require_auth, AuthSettings, ErrorPolicy};

/// Shared per-request state. Holds no mutable data of its own.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PlanetStore>,
    pub uploads_dir: Arc<PathBuf>,
}

impl AppState {
    pub fn new(store: Arc<dyn PlanetStore>, uploads_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            uploads_dir: Arc::new(uploads_dir.into()),
        }
    }
}

/// Optional behaviors of the assembled application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppCapabilities {
    /// Require a bearer token on write routes.
    pub auth: bool,
    /// Send the fixed allow-origin and allow-credentials headers.
    pub cors: bool,
    /// Include internal error detail in fault responses.
    pub error_detail: bool,
    /// Render not-found and fault responses as HTML pages.
    pub legacy_error_pages: bool,
}

impl Default for AppCapabilities {
    fn default() -> Self {
        Self {
            auth: false,
            cors: true,
            error_detail: true,
            legacy_error_pages: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppOptions {
    pub capabilities: AppCapabilities,
    pub cors_origin: HeaderValue,
    pub jwt_secret: String,
    pub max_request_size_bytes: usize,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            capabilities: AppCapabilities::default(),
            cors_origin: HeaderValue::from_static("http://localhost:8080"),
            jwt_secret: String::new(),
            max_request_size_bytes: 10 * 1024 * 1024,
        }
    }
}

impl AppOptions {
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let cors_origin = HeaderValue::from_str(&config.security.cors_origin)
            .map_err(|e| anyhow::anyhow!("invalid CORS origin {:?}: {}", config.security.cors_origin, e))?;

        if config.security.enable_auth && config.security.jwt_secret.is_empty() {
            anyhow::bail!("authentication is enabled but JWT_SECRET is not set");
        }

        Ok(Self {
            capabilities: AppCapabilities {
                auth: config.security.enable_auth,
                cors: config.security.enable_cors,
                error_detail: !config.is_production(),
                legacy_error_pages: config.api.legacy_error_pages,
            },
            cors_origin,
            jwt_secret: config.security.jwt_secret.clone(),
            max_request_size_bytes: config.api.max_request_size_bytes,
        })
    }
}

/// Assemble the whole application for one capability set.
pub fn build_app(state: AppState, options: &AppOptions) -> Router {
    let caps = options.capabilities;
    let auth = caps.auth.then(|| AuthSettings::new(options.jwt_secret.as_str()));
    let policy = ErrorPolicy {
        detail: caps.error_detail,
        legacy_pages: caps.legacy_error_pages,
    };
    let photos = ServeDir::new(state.uploads_dir.as_path());

    let router = Router::new()
        .route("/health", get(health::health))
        .merge(planet_routes(auth.as_ref()))
        .nest_service("/planets/photos", photos)
        .fallback(route_not_found)
        .layer(DefaultBodyLimit::max(options.max_request_size_bytes))
        .layer(from_fn_with_state(policy, normalize_errors))
        .with_state(state);

    let router = if caps.cors {
        router.layer(cors_layer(options.cors_origin.clone()))
    } else {
        router
    };

    router.layer(TraceLayer::new_for_http())
}

fn planet_routes(auth: Option<&AuthSettings>) -> Router<AppState> {
    Router::new()
        .route("/planets", get(planets::list).merge(guarded(auth, post(planets::create))))
        .route(
            "/planets/:id",
            get(planets::show).merge(guarded(
                auth,
                axum::routing::put(planets::update).delete(planets::delete),
            )),
        )
        .route("/planets/:id/photo", guarded(auth, post(photo::upload)))
}

// Write routes only; reads stay public.
fn guarded(auth: Option<&AuthSettings>, route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    match auth {
        Some(settings) => route.route_layer(from_fn_with_state(settings.clone(), require_auth)),
        None => route,
    }
}

fn cors_layer(origin: HeaderValue) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

async fn route_not_found(method: Method, uri: Uri) -> ApiError {
    ApiError::route_not_found(&method, uri.path())
}
