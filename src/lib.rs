use crate::config::db::DB;
use crate::config::rd::RD;
use crate::config::AppConfig;
use crate::errors::{any_error, ApiError};
use crate::middleware::check_access::check_access;
use crate::middleware::limit_request::limit_request;
use crate::route::{badge_api, bookmark_api, brand_api, follow_api, newsletter_api, tag_api, upload_api, user_api};
use crate::service::upload_service::{LocalStore, ObjectStore};
use anyhow::Context;
use axum::extract::DefaultBodyLimit;
use axum::handler::HandlerWithoutStateExt;
use axum::http::Uri;
use axum::response::{IntoResponse, Response};
use axum::Router;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::error;

pub mod config;
pub mod errors;
pub mod middleware;
pub mod model;
pub mod route;
pub mod service;
pub mod util;

// Application state shared across handlers
// Cloning AppState is cheap because it uses Arc internally to share resources like DB and Redis connections.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: Arc<DB>,
    pub rd: Arc<RD>,
    pub store: Arc<dyn ObjectStore>,
}

// Application router creation
// Note: The order of layers is important.
pub fn create_app(state: AppState) -> Router {
    let config = &state.config;

    // Objects are served by this app unless the store hands out absolute URLs.
    let mut uploads_route = Router::new();
    if config.upload.base_url.starts_with('/') {
        uploads_route = uploads_route.nest_service(
            &config.upload.base_url,
            ServeDir::new(config.upload.base_path.clone()).not_found_service(handle_404.into_service()),
        );
    }

    // Layers added last run first: the session is resolved before the rate limiter looks at it.
    let api_routes = Router::new()
        .merge(newsletter_api::create_routes())
        .merge(follow_api::create_routes())
        .merge(bookmark_api::create_routes())
        .merge(badge_api::create_routes())
        .merge(tag_api::create_routes())
        .merge(user_api::create_routes())
        .merge(brand_api::create_routes())
        .merge(upload_api::create_routes())
        .layer(axum::middleware::from_fn_with_state(state.clone(), limit_request))
        .layer(axum::middleware::from_fn_with_state(state.clone(), check_access));

    // The order of the layers is important.
    // https://docs.rs/axum/latest/axum/middleware/index.html#ordering
    let mut app = Router::new()
        .nest("/api", api_routes)
        .merge(uploads_route)
        .fallback(handle_404)
        .method_not_allowed_fallback(handle_405)
        .layer(
            ServiceBuilder::new()
                .layer(CatchPanicLayer::custom(handle_panic))
                .layer(DefaultBodyLimit::max(config.http.max_body_size as usize))
                .layer(config.http.cors.clone().into_layer()),
        );

    if config.log.log_requests {
        app = app.layer(TraceLayer::new_for_http());
    }
    app.with_state(state)
}

impl AppState {
    pub async fn new(config: AppConfig) -> anyhow::Result<Self> {
        let db = DB::new(&config.db.url, config.db.pool_size)
            .await
            .context("Cannot connect to database")?;

        // Redis only backs the rate limiter; without it there is nothing to connect to yet.
        let rd = if config.rate_limit.enabled {
            RD::new(&config.redis.url)
                .await
                .context("Cannot connect to redis server")?
        } else {
            RD::new_lazy(&config.redis.url)?
        };

        tokio::fs::create_dir_all(&config.upload.base_path)
            .await
            .with_context(|| format!("Cannot create upload directory {}", config.upload.base_path))?;
        let store = LocalStore::new(&config.upload.base_path, &config.upload.base_url);

        Ok(AppState {
            config: Arc::new(config),
            db: Arc::new(db),
            rd: Arc::new(rd),
            store: Arc::new(store),
        })
    }
}

pub async fn handle_404(_uri: Uri) -> ApiError {
    any_error(404, "Not Found", None)
}

async fn handle_405() -> ApiError {
    any_error(405, "Method Not Allowed", None)
}

// Custom panic handler, logs the panic and returns a 500 response
fn handle_panic(panic: Box<dyn std::any::Any + Send>) -> Response {
    let panic_message = if let Some(s) = panic.downcast_ref::<&str>() {
        *s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else {
        "Unknown panic"
    };

    error!("App panicked: {}", panic_message);
    any_error(500, "Internal Server Error", None).into_response()
}
