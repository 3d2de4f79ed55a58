//! Integration tests for the directory HTTP surface.
//!
//! The router runs against the in-memory directory and a fixed clock, so
//! past/upcoming splits are deterministic.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{NaiveDate, NaiveDateTime};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use booking_directory::{
    app,
    clock::FixedClock,
    config::Config,
    repository::{DirectoryRepository, MemoryDirectory},
    AppState,
};

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 6, 1)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

fn setup() -> (Router, Arc<MemoryDirectory>) {
    let repo = Arc::new(MemoryDirectory::new());
    let config = Config::from_lookup(|_| None).expect("default config");
    let state = AppState::with_parts(
        config,
        repo.clone() as Arc<dyn DirectoryRepository>,
        Arc::new(FixedClock(now())),
    );
    (app(state), repo)
}

async fn send(app: &Router, method: Method, path: &str, form: Option<&[(&str, &str)]>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(path);
    let body = match form {
        Some(pairs) => {
            request = request.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
            Body::from(serde_urlencoded::to_string(pairs).unwrap())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(request.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn get(app: &Router, path: &str) -> (StatusCode, Value) {
    send(app, Method::GET, path, None).await
}

async fn post(app: &Router, path: &str, form: &[(&str, &str)]) -> (StatusCode, Value) {
    send(app, Method::POST, path, Some(form)).await
}

async fn create_venue(app: &Router, name: &str, city: &str, state: &str) -> i64 {
    let (status, body) = post(
        app,
        "/venues/create",
        &[
            ("name", name),
            ("city", city),
            ("state", state),
            ("address", "1015 Folsom Street"),
            ("phone", "123-123-1234"),
            ("genres", "Jazz"),
            ("genres", "Reggae"),
            ("image_link", "https://images.example/venue.jpg"),
            ("seeking_talent", "y"),
        ],
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["id"].as_i64().unwrap()
}

async fn create_artist(app: &Router, name: &str) -> i64 {
    let (status, body) = post(
        app,
        "/artists/create",
        &[
            ("name", name),
            ("city", "San Francisco"),
            ("state", "CA"),
            ("genres", "Rock n Roll"),
            ("image_link", "https://images.example/artist.jpg"),
        ],
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["id"].as_i64().unwrap()
}

async fn create_show(app: &Router, venue_id: i64, artist_id: i64, start_time: &str) -> StatusCode {
    let venue_id = venue_id.to_string();
    let artist_id = artist_id.to_string();
    post(
        app,
        "/shows/create",
        &[
            ("venue_id", venue_id.as_str()),
            ("artist_id", artist_id.as_str()),
            ("start_time", start_time),
        ],
    )
    .await
    .0
}

#[tokio::test]
async fn health_and_home_respond() {
    let (app, _) = setup();
    let response = app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (status, _) = get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn unknown_route_is_json_404() {
    let (app, _) = setup();
    let (status, body) = get(&app, "/nowhere").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn venue_detail_splits_past_and_upcoming() {
    let (app, _) = setup();
    let venue_id = create_venue(&app, "The Musical Hop", "San Francisco", "CA").await;
    let petals = create_artist(&app, "Guns N Petals").await;
    let sax = create_artist(&app, "The Wild Sax Band").await;

    assert_eq!(create_show(&app, venue_id, petals, "2019-05-21 21:30:00").await, StatusCode::CREATED);
    assert_eq!(create_show(&app, venue_id, sax, "2035-04-01 20:00:00").await, StatusCode::CREATED);
    // Exactly at the reference time counts as past
    assert_eq!(create_show(&app, venue_id, sax, "2025-06-01 12:00:00").await, StatusCode::CREATED);

    let (status, venue) = get(&app, &format!("/venues/{}", venue_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(venue["genres"], serde_json::json!(["Jazz", "Reggae"]));
    assert_eq!(venue["seeking_talent"], true);
    assert_eq!(venue["past_shows_count"], 2);
    assert_eq!(venue["upcoming_shows_count"], 1);
    assert_eq!(venue["past_shows"][0]["artist_name"], "Guns N Petals");
    assert_eq!(venue["past_shows"][1]["artist_id"], sax);
    assert_eq!(venue["upcoming_shows"][0]["artist_name"], "The Wild Sax Band");
    assert_eq!(
        venue["upcoming_shows"][0]["artist_image_link"],
        "https://images.example/artist.jpg"
    );
}

#[tokio::test]
async fn artist_detail_projects_venues() {
    let (app, _) = setup();
    let venue_id = create_venue(&app, "Park Square Live Music & Coffee", "San Francisco", "CA").await;
    let artist_id = create_artist(&app, "Matt Quevedo").await;
    create_show(&app, venue_id, artist_id, "2035-04-08T20:00").await;

    let (status, artist) = get(&app, &format!("/artists/{}", artist_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(artist["genres"], serde_json::json!(["Rock n Roll"]));
    assert_eq!(artist["past_shows_count"], 0);
    assert_eq!(artist["upcoming_shows"][0]["venue_id"], venue_id);
    assert_eq!(artist["upcoming_shows"][0]["venue_name"], "Park Square Live Music & Coffee");
    assert_eq!(artist["upcoming_shows"][0]["start_time"], "2035-04-08T20:00:00");
}

#[tokio::test]
async fn venues_are_grouped_by_area_with_upcoming_counts() {
    let (app, _) = setup();
    let hop = create_venue(&app, "The Musical Hop", "San Francisco", "CA").await;
    let dueling = create_venue(&app, "The Dueling Pianos Bar", "New York", "NY").await;
    let park = create_venue(&app, "Park Square", "San Francisco", "CA").await;
    let artist = create_artist(&app, "Guns N Petals").await;
    create_show(&app, hop, artist, "2035-01-01 20:00:00").await;
    create_show(&app, hop, artist, "2001-01-01 20:00:00").await;

    let (status, areas) = get(&app, "/venues").await;
    assert_eq!(status, StatusCode::OK);
    let areas = areas.as_array().unwrap();
    assert_eq!(areas.len(), 2);
    assert_eq!(areas[0]["city"], "San Francisco");
    assert_eq!(areas[0]["venues"][0]["id"], hop);
    assert_eq!(areas[0]["venues"][0]["num_upcoming_shows"], 1);
    assert_eq!(areas[0]["venues"][1]["id"], park);
    assert_eq!(areas[1]["state"], "NY");
    assert_eq!(areas[1]["venues"][0]["id"], dueling);
}

#[tokio::test]
async fn search_is_case_insensitive() {
    let (app, _) = setup();
    create_venue(&app, "The Musical Hop", "San Francisco", "CA").await;
    create_venue(&app, "Park Square Live Music & Coffee", "San Francisco", "CA").await;
    create_venue(&app, "The Dueling Pianos Bar", "New York", "NY").await;

    let (status, results) = post(&app, "/venues/search", &[("search_term", "Music")]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(results["count"], 2);
    assert_eq!(results["search_term"], "Music");

    let (_, results) = post(&app, "/venues/search", &[("search_term", "hop")]).await;
    assert_eq!(results["count"], 1);
    assert_eq!(results["data"][0]["name"], "The Musical Hop");
    assert_eq!(results["data"][0]["num_upcoming_shows"], 0);

    create_artist(&app, "Guns N Petals").await;
    create_artist(&app, "Matt Quevedo").await;
    let (_, results) = post(&app, "/artists/search", &[("search_term", "A")]).await;
    assert_eq!(results["count"], 2);
}

#[tokio::test]
async fn empty_search_term_matches_everything() {
    let (app, _) = setup();
    create_artist(&app, "Guns N Petals").await;
    create_artist(&app, "Matt Quevedo").await;
    let (_, results) = post(&app, "/artists/search", &[]).await;
    assert_eq!(results["count"], 2);
}

#[tokio::test]
async fn missing_records_are_404() {
    let (app, _) = setup();
    assert_eq!(get(&app, "/venues/42").await.0, StatusCode::NOT_FOUND);
    assert_eq!(get(&app, "/artists/42").await.0, StatusCode::NOT_FOUND);
    assert_eq!(get(&app, "/venues/42/edit").await.0, StatusCode::NOT_FOUND);
    assert_eq!(get(&app, "/venues/42/delete").await.0, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_form_is_rejected() {
    let (app, repo) = setup();
    let (status, body) = post(
        &app,
        "/venues/create",
        &[("name", ""), ("city", "SF"), ("state", "XX"), ("genres", "Polka")],
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let fields: Vec<&str> = body["fields"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|f| f.as_str())
        .collect();
    assert_eq!(fields, vec!["address", "genres", "name", "state"]);
    assert!(repo.list_venues().await.unwrap().is_empty());
}

#[tokio::test]
async fn show_requires_existing_venue_and_artist() {
    let (app, repo) = setup();
    let venue_id = create_venue(&app, "The Musical Hop", "San Francisco", "CA").await;
    assert_eq!(
        create_show(&app, venue_id, 7, "2035-01-01 20:00:00").await,
        StatusCode::BAD_REQUEST
    );
    assert!(repo.list_shows().await.unwrap().is_empty());
}

#[tokio::test]
async fn malformed_show_form_answers_json_bad_request() {
    let (app, repo) = setup();
    let (status, body) = post(
        &app,
        "/shows/create",
        &[("artist_id", ""), ("venue_id", "1"), ("start_time", "")],
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());
    assert!(repo.list_shows().await.unwrap().is_empty());
}

#[tokio::test]
async fn non_numeric_ids_answer_json_bad_request() {
    let (app, _) = setup();
    for path in ["/venues/abc", "/artists/abc/edit", "/venues/abc/delete"] {
        let (status, body) = get(&app, path).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", path);
        assert_eq!(body["success"], false, "{}", path);
        assert!(body["error"].is_string(), "{}", path);
    }
}

#[tokio::test]
async fn venues_are_deleted_only_through_the_delete_route() {
    let (app, repo) = setup();
    let venue_id = create_venue(&app, "The Dueling Pianos Bar", "New York", "NY").await;

    let (status, _) = send(&app, Method::DELETE, &format!("/venues/{}", venue_id), None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(repo.list_venues().await.unwrap().len(), 1);
}

#[tokio::test]
async fn edit_updates_and_prefills() {
    let (app, _) = setup();
    let artist_id = create_artist(&app, "Matt Quevedo").await;

    let (status, body) = get(&app, &format!("/artists/{}/edit", artist_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["form"]["genres"], serde_json::json!(["Rock n Roll"]));

    let (status, body) = post(
        &app,
        &format!("/artists/{}/edit", artist_id),
        &[
            ("name", "Matt Quevedo Trio"),
            ("city", "New York"),
            ("state", "NY"),
            ("genres", "Jazz"),
            ("genres", "Folk"),
            ("seeking_venue", "y"),
        ],
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Artist Matt Quevedo Trio was successfully updated!");

    let (_, artist) = get(&app, &format!("/artists/{}", artist_id)).await;
    assert_eq!(artist["genres"], serde_json::json!(["Jazz", "Folk"]));
    assert_eq!(artist["city"], "New York");
    assert_eq!(artist["seeking_venue"], true);
    assert_eq!(artist["image_link"], Value::Null);
}

#[tokio::test]
async fn deleting_venue_removes_its_shows() {
    let (app, _) = setup();
    let venue_id = create_venue(&app, "The Musical Hop", "San Francisco", "CA").await;
    let artist_id = create_artist(&app, "Guns N Petals").await;
    create_show(&app, venue_id, artist_id, "2035-01-01 20:00:00").await;

    let (status, _) = get(&app, &format!("/venues/{}/delete", venue_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(get(&app, &format!("/venues/{}", venue_id)).await.0, StatusCode::NOT_FOUND);

    let (_, shows) = get(&app, "/shows").await;
    assert_eq!(shows.as_array().unwrap().len(), 0);
    let (_, artist) = get(&app, &format!("/artists/{}", artist_id)).await;
    assert_eq!(artist["upcoming_shows_count"], 0);
}

#[tokio::test]
async fn shows_listing_joins_both_sides() {
    let (app, _) = setup();
    let venue_id = create_venue(&app, "The Musical Hop", "San Francisco", "CA").await;
    let artist_id = create_artist(&app, "Guns N Petals").await;
    create_show(&app, venue_id, artist_id, "2019-05-21 21:30:00").await;

    let (status, shows) = get(&app, "/shows").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(shows[0]["venue_name"], "The Musical Hop");
    assert_eq!(shows[0]["artist_name"], "Guns N Petals");
    assert_eq!(shows[0]["start_time"], "2019-05-21T21:30:00");

    let (_, artists) = get(&app, "/artists").await;
    assert_eq!(artists[0]["id"], artist_id);
}

#[tokio::test]
async fn show_form_defaults_to_current_time() {
    let (app, _) = setup();
    let (status, body) = get(&app, "/shows/create").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["form"]["start_time"], "2025-06-01 12:00:00");

    let venue_id = create_venue(&app, "The Musical Hop", "San Francisco", "CA").await;
    let artist_id = create_artist(&app, "Guns N Petals").await;
    assert_eq!(create_show(&app, venue_id, artist_id, "").await, StatusCode::CREATED);

    let (_, venue) = get(&app, &format!("/venues/{}", venue_id)).await;
    assert_eq!(venue["past_shows_count"], 1);
}
