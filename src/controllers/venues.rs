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

use super::forms::{VenueForm, GENRE_CHOICES, STATE_CHOICES};
use super::{AppForm, AppPath, EntitySummary, SearchForm, SearchResults};
use crate::error::{AppError, Result};
use crate::models::Venue;
use crate::schedule::{classify_shows, count_upcoming, ShowProjection};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/venues", get(list_venues))
        .route("/venues/search", post(search_venues))
        .route("/venues/create", get(create_venue_form).post(create_venue))
        .route("/venues/{venue_id}", get(show_venue))
        .route("/venues/{venue_id}/edit", get(edit_venue_form).post(edit_venue))
        .route("/venues/{venue_id}/delete", get(delete_venue))
}

/* ---------- helpers ---------- */

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Area {
    pub city: String,
    pub state: String,
    pub venues: Vec<EntitySummary>,
}

/// Groups venues, already ordered by state and city, into one area per
/// distinct (city, state) pair.
fn group_by_area(venues: Vec<(Venue, usize)>) -> Vec<Area> {
    let mut areas: Vec<Area> = Vec::new();
    for (venue, num_upcoming_shows) in venues {
        let summary = EntitySummary {
            id: venue.id,
            name: venue.name,
            num_upcoming_shows,
        };
        match areas.last_mut() {
            Some(area) if area.city == venue.city && area.state == venue.state => {
                area.venues.push(summary)
            }
            _ => areas.push(Area {
                city: venue.city,
                state: venue.state,
                venues: vec![summary],
            }),
        }
    }
    areas
}

async fn summarize(state: &AppState, venue: Venue, now: NaiveDateTime) -> Result<(Venue, usize)> {
    let start_times = state.repo.venue_show_times(venue.id).await?;
    Ok((venue, count_upcoming(start_times, now)))
}

async fn find_venue_or_404(state: &AppState, venue_id: i32) -> Result<Venue> {
    state.repo.find_venue(venue_id).await?.ok_or_else(|| {
        tracing::warn!("venue {} not found", venue_id);
        AppError::NotFound(format!("Venue {}", venue_id))
    })
}

/* ---------- LISTING ---------- */

// GET /venues
async fn list_venues(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Area>>> {
    let now = state.clock.now();
    let venues = state.repo.list_venues().await?;

    let mut summaries = Vec::with_capacity(venues.len());
    for venue in venues {
        summaries.push(summarize(&state, venue, now).await?);
    }

    Ok(Json(group_by_area(summaries)))
}

// POST /venues/search
async fn search_venues(
    State(state): State<Arc<AppState>>,
    AppForm(form): AppForm<SearchForm>,
) -> Result<Json<SearchResults>> {
    let now = state.clock.now();
    let venues = state.repo.search_venues(&form.search_term).await?;

    let mut data = Vec::with_capacity(venues.len());
    for venue in venues {
        let (venue, num_upcoming_shows) = summarize(&state, venue, now).await?;
        data.push(EntitySummary {
            id: venue.id,
            name: venue.name,
            num_upcoming_shows,
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
pub struct ArtistAppearance {
    pub artist_id: i32,
    pub artist_name: String,
    pub artist_image_link: Option<String>,
    pub start_time: NaiveDateTime,
}

impl From<ShowProjection> for ArtistAppearance {
    fn from(show: ShowProjection) -> Self {
        ArtistAppearance {
            artist_id: show.counterpart_id,
            artist_name: show.counterpart_name,
            artist_image_link: show.counterpart_image_link,
            start_time: show.start_time,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VenueDetail {
    pub id: i32,
    pub name: String,
    pub genres: Vec<String>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub facebook_link: Option<String>,
    pub seeking_talent: bool,
    pub seeking_description: Option<String>,
    pub image_link: Option<String>,
    pub past_shows: Vec<ArtistAppearance>,
    pub upcoming_shows: Vec<ArtistAppearance>,
    pub past_shows_count: usize,
    pub upcoming_shows_count: usize,
}

// GET /venues/{venue_id}
async fn show_venue(
    State(state): State<Arc<AppState>>,
    AppPath(venue_id): AppPath<i32>,
) -> Result<Json<VenueDetail>> {
    let venue = find_venue_or_404(&state, venue_id).await?;
    let now = state.clock.now();
    let shows = state.repo.venue_shows(venue.id).await?;
    let schedule = classify_shows(&shows, now)?;

    Ok(Json(VenueDetail {
        genres: venue.genre_list(),
        id: venue.id,
        name: venue.name,
        address: venue.address,
        city: venue.city,
        state: venue.state,
        phone: venue.phone,
        website: venue.website_link,
        facebook_link: venue.facebook_link,
        seeking_talent: venue.seeking_talent,
        seeking_description: venue.seeking_description,
        image_link: venue.image_link,
        past_shows: schedule.past_shows.into_iter().map(Into::into).collect(),
        upcoming_shows: schedule.upcoming_shows.into_iter().map(Into::into).collect(),
        past_shows_count: schedule.past_shows_count,
        upcoming_shows_count: schedule.upcoming_shows_count,
    }))
}

/* ---------- CREATE / EDIT / DELETE ---------- */

// GET /venues/create
async fn create_venue_form() -> impl IntoResponse {
    Json(json!({
        "form": VenueForm::default(),
        "genres": GENRE_CHOICES,
        "states": STATE_CHOICES,
    }))
}

// POST /venues/create
async fn create_venue(
    State(state): State<Arc<AppState>>,
    AppForm(form): AppForm<VenueForm>,
) -> Result<impl IntoResponse> {
    form.validate()?;
    let venue = state.repo.create_venue(&form.into_input()).await?;
    tracing::info!("venue {} ({}) listed", venue.id, venue.name);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "id": venue.id,
            "message": format!("Venue {} was successfully listed!", venue.name),
        })),
    ))
}

// GET /venues/{venue_id}/edit
async fn edit_venue_form(
    State(state): State<Arc<AppState>>,
    AppPath(venue_id): AppPath<i32>,
) -> Result<impl IntoResponse> {
    let venue = find_venue_or_404(&state, venue_id).await?;
    let form = VenueForm::from(&venue);
    Ok(Json(json!({
        "venue": { "id": venue.id, "name": venue.name },
        "form": form,
    })))
}

// POST /venues/{venue_id}/edit
async fn edit_venue(
    State(state): State<Arc<AppState>>,
    AppPath(venue_id): AppPath<i32>,
    AppForm(form): AppForm<VenueForm>,
) -> Result<impl IntoResponse> {
    form.validate()?;
    let venue = state
        .repo
        .update_venue(venue_id, &form.into_input())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Venue {}", venue_id)))?;
    tracing::info!("venue {} updated", venue.id);

    Ok(Json(json!({
        "success": true,
        "id": venue.id,
        "message": format!("Venue {} was successfully updated!", venue.name),
    })))
}

// GET /venues/{venue_id}/delete
async fn delete_venue(
    State(state): State<Arc<AppState>>,
    AppPath(venue_id): AppPath<i32>,
) -> Result<impl IntoResponse> {
    if !state.repo.delete_venue(venue_id).await? {
        return Err(AppError::NotFound(format!("Venue {}", venue_id)));
    }
    tracing::info!("venue {} deleted", venue_id);

    Ok(Json(json!({
        "success": true,
        "message": format!("Venue {} was successfully deleted!", venue_id),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn venue(id: i32, city: &str, state: &str) -> Venue {
        Venue {
            id,
            name: format!("Venue {}", id),
            city: city.to_string(),
            state: state.to_string(),
            address: "1 Main St".to_string(),
            phone: None,
            genres: "{Jazz}".to_string(),
            image_link: None,
            website_link: None,
            facebook_link: None,
            seeking_talent: false,
            seeking_description: None,
        }
    }

    #[test]
    fn groups_consecutive_venues_by_city_and_state() {
        let areas = group_by_area(vec![
            (venue(1, "San Francisco", "CA"), 2),
            (venue(3, "San Francisco", "CA"), 0),
            (venue(2, "New York", "NY"), 1),
        ]);

        assert_eq!(areas.len(), 2);
        assert_eq!(areas[0].city, "San Francisco");
        assert_eq!(areas[0].venues.len(), 2);
        assert_eq!(areas[0].venues[0].num_upcoming_shows, 2);
        assert_eq!(areas[1].state, "NY");
        assert_eq!(areas[1].venues[0].id, 2);
    }

    #[test]
    fn same_city_in_another_state_is_a_new_area() {
        let areas = group_by_area(vec![
            (venue(1, "Portland", "ME"), 0),
            (venue(2, "Portland", "OR"), 0),
        ]);
        assert_eq!(areas.len(), 2);
    }

    #[test]
    fn no_venues_no_areas() {
        assert!(group_by_area(Vec::new()).is_empty());
    }
}
