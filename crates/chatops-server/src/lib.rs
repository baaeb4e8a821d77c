pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Build the axum Router with all API routes and middleware.
pub fn build_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(routes::health::health))
        // Commands
        .route("/api/commands", get(routes::commands::list_commands))
        .route(
            "/api/commands/{name}",
            post(routes::commands::dispatch_command),
        )
        // Button callbacks
        .route("/api/actions", post(routes::actions::click))
        // Message store
        .route(
            "/api/messages/{correlation_id}",
            get(routes::messages::get_message),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

pub async fn serve(app_state: AppState, port: u16) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
    serve_on(app_state, listener).await
}

/// Serve on a pre-bound listener, so callers can bind port 0 and read the
/// actual port first.
pub async fn serve_on(
    app_state: AppState,
    listener: tokio::net::TcpListener,
) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let bot = app_state.config.bot.name.clone();
    let app = build_router(app_state);

    tracing::info!(bot = %bot, "chatops server listening on http://localhost:{actual_port}");

    axum::serve(listener, app).await?;
    Ok(())
}
