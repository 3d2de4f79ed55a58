pub mod forms;
pub mod venues;
pub mod artists;
pub mod shows;

use axum::{
    extract::{FromRequest, FromRequestParts},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use crate::error::AppError;

pub fn routes() -> Router<Arc<crate::AppState>> {
    Router::new()
        .route("/", get(|| async { "Booking Directory v1.0" }))
        .route("/health", get(|| async { "OK" }))
        .merge(venues::routes())
        .merge(artists::routes())
        .merge(shows::routes())
        .fallback(not_found)
}

/// Urlencoded form body; rejections become `AppError`.
#[derive(FromRequest)]
#[from_request(via(axum_extra::extract::Form), rejection(AppError))]
pub struct AppForm<T>(pub T);

/// Path parameters; rejections become `AppError`.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

/// Row of a listing or search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntitySummary {
    pub id: i32,
    pub name: String,
    pub num_upcoming_shows: usize,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub search_term: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResults {
    pub count: usize,
    pub data: Vec<EntitySummary>,
    pub search_term: String,
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "success": false, "error": "Page not found" })),
    )
}
