//! HTTP transport: JSON pages, CSV export, and /health over axum.
//!
//! All handlers share one [`Dashboard`], so concurrent viewers hit the same
//! memoised table.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use std::time::Duration;

use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};

use crate::app::Dashboard;
use crate::error::{DashboardError, DashboardResult};
use crate::pages::analytics::{self, AnalyticsQuery};
use crate::pages::{bridge, home, trends};

#[derive(Debug, Deserialize)]
struct TrendsQuery {
    limit: Option<usize>,
}

/// HTTP server for dashboard viewers.
pub struct HttpTransport {
    dashboard: Dashboard,
}

impl HttpTransport {
    pub fn new(dashboard: Dashboard) -> Self {
        Self { dashboard }
    }

    /// Build the router with every dashboard endpoint.
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Router::new()
            .route("/health", get(handle_health))
            .route("/api/v1/home", get(handle_home))
            .route("/api/v1/analytics", get(handle_analytics))
            .route("/api/v1/trends", get(handle_trends))
            .route("/api/v1/bridges/:id", get(handle_bridge))
            .route("/api/v1/bridges/:id/volume", get(handle_volume))
            .route("/api/v1/export.csv", get(handle_export))
            .layer(cors)
            .with_state(self.dashboard.clone())
    }

    /// Run the HTTP server on the given address.
    pub async fn run(&self, addr: &str) -> DashboardResult<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("HTTP transport listening on {addr}");

        let sweeper = tokio::spawn(sweep_expired(self.dashboard.clone()));
        let served = axum::serve(listener, self.router()).await;
        sweeper.abort();
        served?;
        Ok(())
    }
}

/// Drop expired cache entries once per TTL.
async fn sweep_expired(dashboard: Dashboard) {
    let mut interval = tokio::time::interval(dashboard.ttl().max(Duration::from_secs(1)));
    interval.tick().await;
    loop {
        interval.tick().await;
        let removed = dashboard.cache().cleanup_expired();
        if removed > 0 {
            tracing::debug!(removed, "swept expired cache entries");
        }
    }
}

/// Health check endpoint.
async fn handle_health(State(dashboard): State<Dashboard>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "source": dashboard.source(),
        "cached_entries": dashboard.cache().len(),
    }))
}

async fn handle_home(State(dashboard): State<Dashboard>) -> Json<home::HomeView> {
    let table = dashboard.bridges().await;
    Json(home::build(&table))
}

async fn handle_analytics(
    State(dashboard): State<Dashboard>,
    Query(query): Query<AnalyticsQuery>,
) -> Json<analytics::AnalyticsView> {
    let table = dashboard.bridges().await;
    Json(analytics::build(&table, query))
}

async fn handle_trends(
    State(dashboard): State<Dashboard>,
    Query(query): Query<TrendsQuery>,
) -> Json<trends::TrendsView> {
    let table = dashboard.bridges().await;
    Json(trends::build(&table, query.limit.unwrap_or(trends::TOP_N)))
}

async fn handle_bridge(
    State(dashboard): State<Dashboard>,
    Path(id): Path<String>,
) -> Json<bridge::BridgeView> {
    let (table, details, volume) = tokio::join!(
        dashboard.bridges(),
        dashboard.bridge(&id),
        dashboard.bridge_volume(&id)
    );
    Json(bridge::build(&table, &id, (*details).as_ref(), (*volume).as_ref()))
}

async fn handle_volume(State(dashboard): State<Dashboard>, Path(id): Path<String>) -> Response {
    let volume = dashboard.bridge_volume(&id).await;
    match &*volume {
        Some(volume) => Json(volume.clone()).into_response(),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({ "error": crate::pages::DATA_UNAVAILABLE })),
        )
            .into_response(),
    }
}

async fn handle_export(State(dashboard): State<Dashboard>) -> Response {
    let table = dashboard.bridges().await;
    match xrsk_bridges::to_csv_string(&table) {
        Ok(csv) => (
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"xrsk_bridges.csv\"",
                ),
            ],
            csv,
        )
            .into_response(),
        Err(e) => {
            let e = DashboardError::from(e);
            tracing::warn!(error = %e, "CSV export failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}
