//! HTTP API for the Press Estimator.
//!
//! This module exposes the estimation engine over a small REST API
//! built on [`axum`](https://crates.io/crates/axum).  The ERP's cost
//! calculation screen posts its current form state and renders the
//! breakdown it gets back.  The catalog is loaded from disk at startup
//! and can be reloaded without restarting the server.

use crate::catalog::{load_catalog_from_dir, Catalog};
use crate::config::Config;
use crate::engine::{estimate, estimate_batch};
use crate::error::EstimatorError;
use crate::models::{EstimateResponse, JobSpec};
use anyhow::Result;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

/// Application state shared across requests.
pub struct AppState {
    pub catalog_dir: PathBuf,
    pub catalog: RwLock<Catalog>,
}

impl AppState {
    pub fn new(catalog_dir: PathBuf, catalog: Catalog) -> Self {
        Self {
            catalog_dir,
            catalog: RwLock::new(catalog),
        }
    }
}

/// Entry counts per catalog, returned after a reload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSummary {
    pub papers: usize,
    pub plates: usize,
    pub sheet_sizes: usize,
    pub paper_sizes: usize,
    pub bindings: usize,
    pub laminations: usize,
    pub inks: usize,
}

impl From<&Catalog> for CatalogSummary {
    fn from(catalog: &Catalog) -> Self {
        Self {
            papers: catalog.papers.len(),
            plates: catalog.plates.len(),
            sheet_sizes: catalog.sheet_sizes.len(),
            paper_sizes: catalog.paper_sizes.len(),
            bindings: catalog.bindings.len(),
            laminations: catalog.laminations.len(),
            inks: catalog.inks.len(),
        }
    }
}

/// An error rendered as `{"error": "..."}` with a status code.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    fn internal(err: impl std::fmt::Display) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<EstimatorError> for ApiError {
    fn from(err: EstimatorError) -> Self {
        let status = match err {
            EstimatorError::UnknownPaperType(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, message = %self.message, "request failed");
        }
        let body = Json(serde_json::json!({"error": self.message}));
        (self.status, body).into_response()
    }
}

/// Build the API router with its state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/estimate", post(estimate_handler))
        .route("/api/estimate/batch", post(batch_handler))
        .route("/api/catalog", get(catalog_handler))
        .route("/api/catalog/reload", post(reload_handler))
        .route("/api/papers/:paper_type/thicknesses", get(thickness_handler))
        .with_state(state)
}

/// Load the catalog from `catalog_dir` and build the router around it.
/// Returns the router and a handle to the state.
pub fn build_router(catalog_dir: PathBuf) -> Result<(Router, Arc<AppState>)> {
    let catalog = load_catalog_from_dir(&catalog_dir)?;
    info!(
        dir = %catalog_dir.display(),
        entries = catalog.len(),
        "catalog loaded"
    );
    let state = Arc::new(AppState::new(catalog_dir, catalog));
    Ok((router(state.clone()), state))
}

/// Handler for POST /api/estimate
async fn estimate_handler(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<JobSpec>, JsonRejection>,
) -> Result<Json<EstimateResponse>, ApiError> {
    let Json(job) = payload?;
    debug!(pages = ?job.pages, quantity = ?job.quantity, "estimate requested");
    let catalog = app_state.catalog.read().await;
    Ok(Json(estimate(&job, &catalog).into()))
}

/// Handler for POST /api/estimate/batch
async fn batch_handler(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<Vec<JobSpec>>, JsonRejection>,
) -> Result<Json<Vec<EstimateResponse>>, ApiError> {
    let Json(jobs) = payload?;
    debug!(jobs = jobs.len(), "batch estimate requested");
    // Snapshot the catalog so the lock is not held while pricing.
    let catalog = app_state.catalog.read().await.clone();
    let breakdowns = tokio::task::spawn_blocking(move || estimate_batch(jobs, &catalog))
        .await
        .map_err(ApiError::internal)?;
    Ok(Json(
        breakdowns.into_iter().map(EstimateResponse::from).collect(),
    ))
}

/// Handler for GET /api/catalog
async fn catalog_handler(State(app_state): State<Arc<AppState>>) -> Json<Catalog> {
    Json(app_state.catalog.read().await.clone())
}

/// Handler for POST /api/catalog/reload
async fn reload_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<CatalogSummary>, ApiError> {
    let dir = app_state.catalog_dir.clone();
    let catalog = tokio::task::spawn_blocking(move || load_catalog_from_dir(&dir))
        .await
        .map_err(ApiError::internal)??;
    let summary = CatalogSummary::from(&catalog);
    *app_state.catalog.write().await = catalog;
    info!(?summary, "catalog reloaded");
    Ok(Json(summary))
}

/// Handler for GET /api/papers/:paper_type/thicknesses
async fn thickness_handler(
    State(app_state): State<Arc<AppState>>,
    Path(paper_type): Path<String>,
) -> Result<Json<Vec<u32>>, ApiError> {
    let options = app_state.catalog.read().await.thickness_options(&paper_type);
    match options {
        Some(options) => Ok(Json(options)),
        None => Err(EstimatorError::UnknownPaperType(paper_type).into()),
    }
}

/// Launch the API server.  Loads the catalog named by `config`, binds
/// to its address and runs until the server terminates.
pub async fn serve(config: &Config) -> Result<()> {
    let (router, _state) = build_router(config.catalog_dir.clone())?;
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "server listening");
    axum::serve(listener, router).await?;
    Ok(())
}
