use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use super::forms::ShowForm;
use super::AppForm;
use crate::error::Result;
use crate::models::ShowListing;
use crate::AppState;

// Shows can be listed and created, never edited or removed
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/shows", get(list_shows))
        .route("/shows/create", get(create_show_form).post(create_show))
}

// GET /shows
async fn list_shows(State(state): State<Arc<AppState>>) -> Result<Json<Vec<ShowListing>>> {
    Ok(Json(state.repo.list_shows().await?))
}

// GET /shows/create
async fn create_show_form(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({ "form": ShowForm::with_default_start(state.clock.now()) }))
}

// POST /shows/create
async fn create_show(
    State(state): State<Arc<AppState>>,
    AppForm(form): AppForm<ShowForm>,
) -> Result<impl IntoResponse> {
    form.validate()?;
    let show = state
        .repo
        .create_show(&form.into_new_show(state.clock.now()))
        .await?;
    tracing::info!("show {} listed", show.id);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "id": show.id,
            "message": "Show was successfully listed!",
        })),
    ))
}
