//! HTTP surface for the dashboard.
//!
//! `GET /api/options` returns the sidebar choices, `GET /api/dashboard` every
//! chart dataset for the requested filters. Both accept the same query:
//! `parties` (comma-separated), `body`, `month_from`, `month_to`.
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::info;

use super::charts::Dashboard;
use super::{BodyChoice, FilterOptions, Filters, month_bounds};
use crate::corpus::models::{EnrichedRow, EnrichedTable};

/// Errors returned to dashboard clients as `{"error": "..."}`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid query parameters (400).
    #[error("{0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Raw filter selections as sent by a client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardQuery {
    pub parties: Option<String>,
    pub body: Option<String>,
    pub month_from: Option<u32>,
    pub month_to: Option<u32>,
}

impl DashboardQuery {
    /// Turn the selections into [`Filters`]. Missing month bounds are taken
    /// from the party/chamber-filtered view, so the month range always applies
    /// once any row has a month.
    pub fn resolve(&self, rows: &[EnrichedRow]) -> Result<Filters, ApiError> {
        let parties = self.parties.as_deref().map(|list| {
            list.split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect()
        });
        let body = self
            .body
            .as_deref()
            .map(BodyChoice::from_label)
            .unwrap_or_default();
        let mut filters = Filters {
            parties,
            body,
            months: None,
        };

        let bounds = month_bounds(&filters.apply_sidebar(rows));
        if self.month_from.is_none() && self.month_to.is_none() {
            filters.months = bounds;
            return Ok(filters);
        }
        let from = self.month_from.or(bounds.map(|b| b.0)).unwrap_or(1);
        let to = self.month_to.or(bounds.map(|b| b.1)).unwrap_or(12);
        if from > to {
            return Err(ApiError::BadRequest(format!(
                "month_from ({from}) is after month_to ({to})"
            )));
        }
        filters.months = Some((from, to));
        Ok(filters)
    }
}

/// Shared, read-only dashboard state.
#[derive(Clone)]
pub struct AppState {
    pub table: Arc<EnrichedTable>,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub options: FilterOptions,
    pub dashboard: Dashboard,
}

/// Options and charts for one set of selections.
pub fn render(table: &EnrichedTable, query: &DashboardQuery) -> Result<DashboardResponse, ApiError> {
    let filters = query.resolve(&table.rows)?;
    let view = filters.apply(&table.rows);
    Ok(DashboardResponse {
        options: FilterOptions::compute(&table.rows, &filters),
        dashboard: Dashboard::from_view(&view),
    })
}

/// `GET /api/options`
pub async fn options(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<FilterOptions>, ApiError> {
    let filters = query.resolve(&state.table.rows)?;
    Ok(Json(FilterOptions::compute(&state.table.rows, &filters)))
}

/// `GET /api/dashboard`
pub async fn dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardResponse>, ApiError> {
    render(&state.table, &query).map(Json)
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/options", get(options))
        .route("/api/dashboard", get(dashboard))
        .with_state(state)
}

/// Serve the dashboard API until Ctrl-C.
pub async fn serve(table: EnrichedTable, bind: &str) -> Result<()> {
    let state = AppState {
        table: Arc::new(table),
    };
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    info!("Dashboard API listening on http://{bind}");

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down dashboard API");
        })
        .await
        .context("dashboard server failed")?;
    Ok(())
}
