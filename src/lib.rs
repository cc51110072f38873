//! # Landing Backend
//!
//! Form-submission backend for the marketing site: orders, contact
//! messages, and affiliate sign-ups, validated up front and persisted as
//! documents in MongoDB.
//!
//! Requests are stateless and each one is a single round trip to the store.
//! When the store is unreachable at startup the server still boots and the
//! `/test` diagnostics route reports the degraded state.

use axum::{
    routing::{get, post},
    Router,
};
use signal::{
    ctrl_c,
    unix::{signal, SignalKind},
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

pub mod config;
pub mod database;
pub mod error;
pub mod routes;
pub mod schemas;
pub mod state;

use routes::{
    create_affiliate_handler, create_message_handler, create_order_handler, list_orders_handler,
    root_handler, test_handler,
};
use state::AppState;

pub async fn start_server() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let state = AppState::new().await;

    info!("Starting server...");

    // Public marketing-site policy: every origin, method, and header, with
    // credentials. Mirroring the request expresses the wildcard that the
    // CORS spec forbids alongside credentials.
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true);

    let app = Router::new()
        .route("/", get(root_handler))
        .route("/test", get(test_handler))
        .route("/orders", post(create_order_handler).get(list_orders_handler))
        .route("/messages", post(create_message_handler))
        .route("/affiliates", post(create_affiliate_handler))
        .layer(cors)
        .with_state(state.clone());

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await.unwrap();
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    println!("Server shutting down...");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
