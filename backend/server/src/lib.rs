//! Documentation of Dodle, a daily "guess the person" game backend.
//!
//!
//!
//! # General Infrastructure
//! - Frontend talks to this server over JSON only
//! - Server talks to Redis over the internal network, Redis is never exposed
//! - One person of the day per calendar date, local server time
//! - A scheduled job (cron, CI, anything that can send a header) hits the private create route once a day
//!
//!
//!
//! # Routes
//!
//! ## Public
//! - `GET /health`
//! - `GET /public/v1/persons`: full roster, `{"persons": [...]}`
//! - `POST /public/v1/guess/person/submit`: person-shaped guess, returns `{"correct", "person"}`
//! - `GET /public/v1/guess/person/hint`: today's hint as a JSON string
//! - `GET /public/v1/guess/person/yesterday`: yesterday's person
//! - `GET /public/v1/persons/yesterday`: same, older clients
//! - `GET /public/v1/guess/id`: `{"id"}` of the current round
//!
//! ## Private
//! Require the `API-Token` header.
//! - `POST /private/v1/guess/person/create`: select a new person of the day
//! - `GET /private/v1/guess/persons`: raw history
//! - `GET /private/v1/guess/persons/today`: today's raw selection
//!
//!
//!
//! # Retention
//!
//! History only keeps 10 days. Anything older is pruned every time a person is selected,
//! which also bounds how far back the no-repeat rule looks.
//!
//!
//!
//! # Setup
//!
//! Environment.
//! ```sh
//! RUST_PORT=1111
//! STORE=redis            # or memory
//! REDIS_URL=redis://127.0.0.1:6379
//! SEED_PATH=./data/persons.json
//! API_TOKEN=...          # or /run/secrets/API_TOKEN
//! RUST_LOG=dodle=info
//! ```
//!
//! Run locally without Redis.
//! ```sh
//! STORE=memory API_TOKEN=dev cargo run
//! ```
//!
//! Trigger a selection.
//! ```sh
//! curl -X POST -H "API-Token: dev" localhost:1111/private/v1/guess/person/create
//! ```
use std::{future::pending, sync::Arc, time::Duration};

use anyhow::Context;
use axum::{
    Router, middleware,
    http::{HeaderName, Method, header::CONTENT_TYPE},
    routing::{get, post},
};

use tokio::{net::TcpListener, signal};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
pub mod database;
pub mod error;
pub mod game;
pub mod person;
pub mod routes;
pub mod state;
pub mod store;
pub mod utils;

use routes::{
    create_handler, health_handler, hint_handler, history_handler, persons_handler,
    require_api_token, round_id_handler, submit_handler, today_handler, yesterday_handler,
};
use state::AppState;
use utils::API_TOKEN_HEADER;

pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static(API_TOKEN_HEADER)])
        .max_age(Duration::from_secs(60 * 60));

    let private = Router::new()
        .route("/private/v1/guess/person/create", post(create_handler))
        .route("/private/v1/guess/persons", get(history_handler))
        .route("/private/v1/guess/persons/today", get(today_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_token,
        ));

    Router::new()
        .route("/health", get(health_handler))
        .route("/public/v1/persons", get(persons_handler))
        .route("/public/v1/persons/yesterday", get(yesterday_handler))
        .route("/public/v1/guess/person/submit", post(submit_handler))
        .route("/public/v1/guess/person/hint", get(hint_handler))
        .route("/public/v1/guess/person/yesterday", get(yesterday_handler))
        .route("/public/v1/guess/id", get(round_id_handler))
        .merge(private)
        .layer(cors)
        .with_state(state)
}

pub async fn start_server() -> anyhow::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let state = AppState::new().await?;

    info!("Starting server...");

    let address = format!("0.0.0.0:{}", state.config.port);
    let app = build_router(state);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutting down...");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM. A handler that fails to install is logged and never fires.
async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Ctrl+C handler unavailable: {e}");
            pending::<()>().await;
        }
        "Ctrl+C"
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("SIGTERM handler unavailable: {e}");
                pending::<()>().await;
            }
        }
        "SIGTERM"
    };

    #[cfg(not(unix))]
    let terminate = async {
        pending::<()>().await;
        "SIGTERM"
    };

    let received = tokio::select! {
        name = interrupt => name,
        name = terminate => name,
    };
    info!("Received {received}, shutting down");
}
