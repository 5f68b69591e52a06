//! Route definitions for the AgriLens API

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .nest("/plots", plot_routes())
        .route("/analysis/preview", post(handlers::preview_analysis))
        .nest("/dashboard", dashboard_routes())
        .route("/reports", get(handlers::get_plot_report))
        .route(
            "/profile",
            get(handlers::get_profile).put(handlers::update_profile),
        )
        .route("/assistant/chat", post(handlers::assistant_chat))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (public)
        .nest("/auth", auth_routes())
        .merge(protected)
}

/// Credential routes (public)
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(handlers::signup))
        .route("/login", post(handlers::login))
}

/// Plot routes (protected)
fn plot_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_plots).post(handlers::create_plot))
        .route("/export", get(handlers::export_plots))
        .route("/by-name/:name", get(handlers::get_plot_by_name))
        .route("/by-name/:name/analysis", post(handlers::refresh_analysis))
        .route("/by-name/:name/geojson", get(handlers::export_plot))
        .route("/:plot_id", get(handlers::get_plot))
}

/// Dashboard routes (protected)
fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::get_dashboard))
        .route("/chart.svg", get(handlers::get_trend_chart))
}
