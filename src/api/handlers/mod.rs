use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::browser::Browser;
use crate::db::{Database, ValidationError, DEFAULT_SEARCH_LIMIT};
use crate::models::*;
use crate::seed::{self, SeedError};

// ============================================================
// Error Handling
// ============================================================

/// Log an internal error and return a sanitized response to the client.
///
/// Validation failures and unknown seed sources describe the caller's input
/// and are returned as-is; anything else is logged and hidden behind a
/// generic 500.
fn internal_error(e: anyhow::Error) -> (StatusCode, String) {
    if let Some(err) = e.downcast_ref::<ValidationError>() {
        tracing::warn!("Validation error: {}", err);
        return (StatusCode::BAD_REQUEST, err.to_string());
    }
    if let Some(err) = e.downcast_ref::<SeedError>() {
        tracing::warn!("Seed error: {}", err);
        return (StatusCode::NOT_FOUND, err.to_string());
    }

    tracing::error!("Internal error: {:#}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
}

fn not_found() -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, "Resource not found".to_string())
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Resources
// ============================================================

#[derive(Debug, Deserialize)]
pub struct ListResourcesQuery {
    pub parent_id: Option<Uuid>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct BrowseQuery {
    pub search: Option<String>,
}

/// Search when a non-blank term is given, otherwise children of `parent_id`
/// (roots when absent).
pub async fn list_resources(
    State(db): State<Database>,
    Query(query): Query<ListResourcesQuery>,
) -> Result<Json<Vec<ResourceNode>>, (StatusCode, String)> {
    match query.search.as_deref().map(str::trim) {
        Some(term) if !term.is_empty() => db
            .search_resources(term, DEFAULT_SEARCH_LIMIT)
            .map(Json)
            .map_err(internal_error),
        _ => db
            .list_children(query.parent_id)
            .map(Json)
            .map_err(internal_error),
    }
}

pub async fn list_root_resources(
    State(db): State<Database>,
) -> Result<Json<Vec<ResourceNode>>, (StatusCode, String)> {
    db.get_root_resources().map(Json).map_err(internal_error)
}

pub async fn get_resource(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<ResourceNode>, (StatusCode, String)> {
    db.get_resource(id)
        .map_err(internal_error)?
        .map(Json)
        .ok_or_else(not_found)
}

pub async fn list_children(
    State(db): State<Database>,
    Path(parent_id): Path<Uuid>,
) -> Result<Json<Vec<ResourceNode>>, (StatusCode, String)> {
    db.get_children(parent_id).map(Json).map_err(internal_error)
}

pub async fn search_resources(
    State(db): State<Database>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<ResourceNode>>, (StatusCode, String)> {
    let term = query.q.trim();
    if term.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Search term must not be empty".to_string(),
        ));
    }

    db.search_resources(term, query.limit.unwrap_or(DEFAULT_SEARCH_LIMIT))
        .map(Json)
        .map_err(internal_error)
}

pub async fn browse(
    State(db): State<Database>,
    Query(query): Query<BrowseQuery>,
) -> Result<Json<BrowseView>, (StatusCode, String)> {
    let mut browser = Browser::new();
    if let Some(term) = query.search {
        browser.set_search(term);
    }
    browser.view(&db).map(Json).map_err(internal_error)
}

// ============================================================
// Seeds
// ============================================================

pub async fn list_seed_runs(
    State(db): State<Database>,
) -> Result<Json<Vec<SeedRun>>, (StatusCode, String)> {
    db.get_seed_runs().map(Json).map_err(internal_error)
}

pub async fn seed_all(
    State(db): State<Database>,
) -> Result<Json<Vec<SeedReport>>, (StatusCode, String)> {
    seed::seed_all(&db).map(Json).map_err(internal_error)
}

pub async fn reseed(
    State(db): State<Database>,
    Path(source): Path<String>,
) -> Result<Json<SeedReport>, (StatusCode, String)> {
    seed::reseed(&db, &source).map(Json).map_err(internal_error)
}

pub async fn reset(
    State(db): State<Database>,
) -> Result<Json<Vec<SeedReport>>, (StatusCode, String)> {
    tracing::info!("Resetting catalog");
    seed::reset(&db).map(Json).map_err(internal_error)
}
