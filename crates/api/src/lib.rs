//! # Timeline API
//!
//! HTTP transport for the scheduling and booking engine. Handlers deserialize
//! requests, call one engine component and map its errors to status codes;
//! every rule lives in the engine and the stores behind it.
//!
//! - **Routes**: URL structure, one module per resource
//! - **Handlers**: extraction and response shaping
//! - **Middleware**: error mapping
//! - **Config**: environment configuration
//!
//! Authentication is handled upstream; acting user ids arrive in requests.

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use eyre::{Result, WrapErr};
use timeline_engine::Engine;
use tokio::net::TcpListener;
use tracing::info;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

/// Shared application state that is accessible to all request handlers
pub struct ApiState {
    pub engine: Engine,
}

/// Builds the router with every endpoint, without transport layers.
pub fn app(state: Arc<ApiState>) -> Router {
    Router::new()
        .merge(routes::health::routes())
        .merge(routes::timetable::routes())
        .merge(routes::schedule::routes())
        .merge(routes::slot::routes())
        .merge(routes::booking::routes())
        .merge(routes::feedback::routes())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|origin| {
            origin
                .parse::<axum::http::HeaderValue>()
                .wrap_err_with(|| format!("Invalid CORS origin: {origin}"))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::PATCH,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
            axum::http::header::ACCEPT,
        ])
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true))
}

/// Starts the API server with the provided configuration and engine
///
/// The caller installs the tracing subscriber.
///
/// # Example
///
/// ```no_run
/// # async fn run(engine: timeline_engine::Engine) -> eyre::Result<()> {
/// let config = timeline_api::config::ApiConfig::from_env()?;
/// timeline_api::start_server(config, engine).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_server(config: config::ApiConfig, engine: Engine) -> Result<()> {
    let state = Arc::new(ApiState { engine });
    let app = app(state);

    let app = match &config.cors_origins {
        Some(origins) => app.layer(cors_layer(origins)?),
        None => app,
    };

    // Requests past the timeout are dropped, which rolls back their transaction
    let app = app.layer(
        tower::ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout)))
            .into_inner(),
    );

    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
