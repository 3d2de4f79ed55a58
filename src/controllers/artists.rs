use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use super::forms::{ArtistForm, GENRE_CHOICES, STATE_CHOICES};
use super::{AppForm, AppPath, EntitySummary, SearchForm, SearchResults};
use crate::error::{AppError, Result};
use crate::models::Artist;
use crate::schedule::{classify_shows, count_upcoming, ShowProjection};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/artists", get(list_artists))
        .route("/artists/search", post(search_artists))
        .route("/artists/create", get(create_artist_form).post(create_artist))
        .route("/artists/{artist_id}", get(show_artist))
        .route("/artists/{artist_id}/edit", get(edit_artist_form).post(edit_artist))
}

async fn find_artist_or_404(state: &AppState, artist_id: i32) -> Result<Artist> {
    state.repo.find_artist(artist_id).await?.ok_or_else(|| {
        tracing::warn!("artist {} not found", artist_id);
        AppError::NotFound(format!("Artist {}", artist_id))
    })
}

/* ---------- LISTING ---------- */

#[derive(Debug, Serialize)]
struct ArtistItem {
    id: i32,
    name: String,
}

// GET /artists
async fn list_artists(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse> {
    let artists: Vec<ArtistItem> = state
        .repo
        .list_artists()
        .await?
        .into_iter()
        .map(|artist| ArtistItem { id: artist.id, name: artist.name })
        .collect();
    Ok(Json(artists))
}

// POST /artists/search
async fn search_artists(
    State(state): State<Arc<AppState>>,
    AppForm(form): AppForm<SearchForm>,
) -> Result<Json<SearchResults>> {
    let now = state.clock.now();
    let artists = state.repo.search_artists(&form.search_term).await?;

    let mut data = Vec::with_capacity(artists.len());
    for artist in artists {
        let start_times = state.repo.artist_show_times(artist.id).await?;
        data.push(EntitySummary {
            id: artist.id,
            name: artist.name,
            num_upcoming_shows: count_upcoming(start_times, now),
        });
    }

    Ok(Json(SearchResults {
        count: data.len(),
        data,
        search_term: form.search_term,
    }))
}

/* ---------- DETAIL ---------- */

#[derive(Debug, Serialize)]
pub struct VenueAppearance {
    pub venue_id: i32,
    pub venue_name: String,
    pub venue_image_link: Option<String>,
    pub start_time: NaiveDateTime,
}

impl From<ShowProjection> for VenueAppearance {
    fn from(show: ShowProjection) -> Self {
        VenueAppearance {
            venue_id: show.counterpart_id,
            venue_name: show.counterpart_name,
            venue_image_link: show.counterpart_image_link,
            start_time: show.start_time,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ArtistDetail {
    pub id: i32,
    pub name: String,
    pub genres: Vec<String>,
    pub city: String,
    pub state: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub facebook_link: Option<String>,
    pub seeking_venue: bool,
    pub seeking_description: Option<String>,
    pub image_link: Option<String>,
    pub past_shows: Vec<VenueAppearance>,
    pub upcoming_shows: Vec<VenueAppearance>,
    pub past_shows_count: usize,
    pub upcoming_shows_count: usize,
}

// GET /artists/{artist_id}
async fn show_artist(
    State(state): State<Arc<AppState>>,
    AppPath(artist_id): AppPath<i32>,
) -> Result<Json<ArtistDetail>> {
    let artist = find_artist_or_404(&state, artist_id).await?;
    let now = state.clock.now();
    let shows = state.repo.artist_shows(artist.id).await?;
    let schedule = classify_shows(&shows, now)?;

    Ok(Json(ArtistDetail {
        genres: artist.genre_list(),
        id: artist.id,
        name: artist.name,
        city: artist.city,
        state: artist.state,
        phone: artist.phone,
        website: artist.website_link,
        facebook_link: artist.facebook_link,
        seeking_venue: artist.seeking_venue,
        seeking_description: artist.seeking_description,
        image_link: artist.image_link,
        past_shows: schedule.past_shows.into_iter().map(Into::into).collect(),
        upcoming_shows: schedule.upcoming_shows.into_iter().map(Into::into).collect(),
        past_shows_count: schedule.past_shows_count,
        upcoming_shows_count: schedule.upcoming_shows_count,
    }))
}

/* ---------- CREATE / EDIT ---------- */

// GET /artists/create
async fn create_artist_form() -> impl IntoResponse {
    Json(json!({
        "form": ArtistForm::default(),
        "genres": GENRE_CHOICES,
        "states": STATE_CHOICES,
    }))
}

// POST /artists/create
async fn create_artist(
    State(state): State<Arc<AppState>>,
    AppForm(form): AppForm<ArtistForm>,
) -> Result<impl IntoResponse> {
    form.validate()?;
    let artist = state.repo.create_artist(&form.into_input()).await?;
    tracing::info!("artist {} ({}) listed", artist.id, artist.name);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "id": artist.id,
            "message": format!("Artist {} was successfully listed!", artist.name),
        })),
    ))
}

// GET /artists/{artist_id}/edit
async fn edit_artist_form(
    State(state): State<Arc<AppState>>,
    AppPath(artist_id): AppPath<i32>,
) -> Result<impl IntoResponse> {
    let artist = find_artist_or_404(&state, artist_id).await?;
    let form = ArtistForm::from(&artist);
    Ok(Json(json!({
        "artist": { "id": artist.id, "name": artist.name },
        "form": form,
    })))
}

// POST /artists/{artist_id}/edit
async fn edit_artist(
    State(state): State<Arc<AppState>>,
    AppPath(artist_id): AppPath<i32>,
    AppForm(form): AppForm<ArtistForm>,
) -> Result<impl IntoResponse> {
    form.validate()?;
    let artist = state
        .repo
        .update_artist(artist_id, &form.into_input())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Artist {}", artist_id)))?;
    tracing::info!("artist {} updated", artist.id);

    Ok(Json(json!({
        "success": true,
        "id": artist.id,
        "message": format!("Artist {} was successfully updated!", artist.name),
    })))
}
