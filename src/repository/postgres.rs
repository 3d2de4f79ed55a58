use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::{FromRow, PgPool};
use tracing::{debug, info};

use super::DirectoryRepository;
use crate::error::{AppError, Result};
use crate::genres::encode_genres;
use crate::models::{Artist, ArtistInput, NewShow, Show, ShowListing, Venue, VenueInput};
use crate::schedule::ShowEntry;

const VENUE_COLUMNS: &str = "id, name, city, state, address, phone, genres, image_link, \
    website_link, facebook_link, seeking_talent, seeking_description";

const ARTIST_COLUMNS: &str = "id, name, city, state, phone, genres, image_link, \
    website_link, facebook_link, seeking_venue, seeking_description";

/// PostgreSQL-backed directory
#[derive(Clone)]
pub struct PgDirectory {
    pool: PgPool,
}

impl PgDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Turns a free-text search term into an `ILIKE` pattern matching it anywhere.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn map_show_insert_error(err: sqlx::Error, show: &NewShow) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
            AppError::InvalidInput(format!(
                "venue {} or artist {} does not exist",
                show.venue_id, show.artist_id
            ))
        }
        _ => AppError::Database(err),
    }
}

/// Joined show row; the classifier only sees the `ShowEntry` it maps to.
#[derive(Debug, FromRow)]
struct ShowRow {
    counterpart_id: Option<i32>,
    counterpart_name: String,
    counterpart_image_link: Option<String>,
    start_time: Option<NaiveDateTime>,
}

impl From<ShowRow> for ShowEntry {
    fn from(row: ShowRow) -> Self {
        ShowEntry {
            counterpart_id: row.counterpart_id,
            counterpart_name: row.counterpart_name,
            counterpart_image_link: row.counterpart_image_link,
            start_time: row.start_time,
        }
    }
}

#[async_trait]
impl DirectoryRepository for PgDirectory {
    async fn list_venues(&self) -> Result<Vec<Venue>> {
        let venues = sqlx::query_as::<_, Venue>(&format!(
            "SELECT {} FROM venues ORDER BY lower(state), lower(city), id",
            VENUE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(venues)
    }

    async fn search_venues(&self, term: &str) -> Result<Vec<Venue>> {
        let venues = sqlx::query_as::<_, Venue>(&format!(
            "SELECT {} FROM venues WHERE name ILIKE $1 ORDER BY id",
            VENUE_COLUMNS
        ))
        .bind(like_pattern(term))
        .fetch_all(&self.pool)
        .await?;
        debug!("venue search {:?} matched {} rows", term, venues.len());
        Ok(venues)
    }

    async fn find_venue(&self, venue_id: i32) -> Result<Option<Venue>> {
        let venue = sqlx::query_as::<_, Venue>(&format!(
            "SELECT {} FROM venues WHERE id = $1",
            VENUE_COLUMNS
        ))
        .bind(venue_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(venue)
    }

    async fn create_venue(&self, input: &VenueInput) -> Result<Venue> {
        let venue = sqlx::query_as::<_, Venue>(&format!(
            r#"
            INSERT INTO venues (name, city, state, address, phone, genres, image_link,
                                website_link, facebook_link, seeking_talent, seeking_description)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {}
            "#,
            VENUE_COLUMNS
        ))
        .bind(&input.name)
        .bind(&input.city)
        .bind(&input.state)
        .bind(&input.address)
        .bind(&input.phone)
        .bind(encode_genres(&input.genres))
        .bind(&input.image_link)
        .bind(&input.website_link)
        .bind(&input.facebook_link)
        .bind(input.seeking_talent)
        .bind(&input.seeking_description)
        .fetch_one(&self.pool)
        .await?;
        info!("venue {} created", venue.id);
        Ok(venue)
    }

    async fn update_venue(&self, venue_id: i32, input: &VenueInput) -> Result<Option<Venue>> {
        let venue = sqlx::query_as::<_, Venue>(&format!(
            r#"
            UPDATE venues
            SET name = $2, city = $3, state = $4, address = $5, phone = $6, genres = $7,
                image_link = $8, website_link = $9, facebook_link = $10,
                seeking_talent = $11, seeking_description = $12
            WHERE id = $1
            RETURNING {}
            "#,
            VENUE_COLUMNS
        ))
        .bind(venue_id)
        .bind(&input.name)
        .bind(&input.city)
        .bind(&input.state)
        .bind(&input.address)
        .bind(&input.phone)
        .bind(encode_genres(&input.genres))
        .bind(&input.image_link)
        .bind(&input.website_link)
        .bind(&input.facebook_link)
        .bind(input.seeking_talent)
        .bind(&input.seeking_description)
        .fetch_optional(&self.pool)
        .await?;
        Ok(venue)
    }

    async fn delete_venue(&self, venue_id: i32) -> Result<bool> {
        // Shows go with the venue through ON DELETE CASCADE
        let deleted = sqlx::query("DELETE FROM venues WHERE id = $1")
            .bind(venue_id)
            .execute(&self.pool)
            .await?
            .rows_affected()
            > 0;
        Ok(deleted)
    }

    async fn list_artists(&self) -> Result<Vec<Artist>> {
        let artists = sqlx::query_as::<_, Artist>(&format!(
            "SELECT {} FROM artists ORDER BY id",
            ARTIST_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(artists)
    }

    async fn search_artists(&self, term: &str) -> Result<Vec<Artist>> {
        let artists = sqlx::query_as::<_, Artist>(&format!(
            "SELECT {} FROM artists WHERE name ILIKE $1 ORDER BY id",
            ARTIST_COLUMNS
        ))
        .bind(like_pattern(term))
        .fetch_all(&self.pool)
        .await?;
        debug!("artist search {:?} matched {} rows", term, artists.len());
        Ok(artists)
    }

    async fn find_artist(&self, artist_id: i32) -> Result<Option<Artist>> {
        let artist = sqlx::query_as::<_, Artist>(&format!(
            "SELECT {} FROM artists WHERE id = $1",
            ARTIST_COLUMNS
        ))
        .bind(artist_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(artist)
    }

    async fn create_artist(&self, input: &ArtistInput) -> Result<Artist> {
        let artist = sqlx::query_as::<_, Artist>(&format!(
            r#"
            INSERT INTO artists (name, city, state, phone, genres, image_link,
                                 website_link, facebook_link, seeking_venue, seeking_description)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            ARTIST_COLUMNS
        ))
        .bind(&input.name)
        .bind(&input.city)
        .bind(&input.state)
        .bind(&input.phone)
        .bind(encode_genres(&input.genres))
        .bind(&input.image_link)
        .bind(&input.website_link)
        .bind(&input.facebook_link)
        .bind(input.seeking_venue)
        .bind(&input.seeking_description)
        .fetch_one(&self.pool)
        .await?;
        info!("artist {} created", artist.id);
        Ok(artist)
    }

    async fn update_artist(&self, artist_id: i32, input: &ArtistInput) -> Result<Option<Artist>> {
        let artist = sqlx::query_as::<_, Artist>(&format!(
            r#"
            UPDATE artists
            SET name = $2, city = $3, state = $4, phone = $5, genres = $6,
                image_link = $7, website_link = $8, facebook_link = $9,
                seeking_venue = $10, seeking_description = $11
            WHERE id = $1
            RETURNING {}
            "#,
            ARTIST_COLUMNS
        ))
        .bind(artist_id)
        .bind(&input.name)
        .bind(&input.city)
        .bind(&input.state)
        .bind(&input.phone)
        .bind(encode_genres(&input.genres))
        .bind(&input.image_link)
        .bind(&input.website_link)
        .bind(&input.facebook_link)
        .bind(input.seeking_venue)
        .bind(&input.seeking_description)
        .fetch_optional(&self.pool)
        .await?;
        Ok(artist)
    }

    async fn venue_show_times(&self, venue_id: i32) -> Result<Vec<NaiveDateTime>> {
        let times = sqlx::query_scalar::<_, NaiveDateTime>(
            "SELECT start_time FROM shows WHERE venue_id = $1 ORDER BY id",
        )
        .bind(venue_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(times)
    }

    async fn artist_show_times(&self, artist_id: i32) -> Result<Vec<NaiveDateTime>> {
        let times = sqlx::query_scalar::<_, NaiveDateTime>(
            "SELECT start_time FROM shows WHERE artist_id = $1 ORDER BY id",
        )
        .bind(artist_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(times)
    }

    async fn venue_shows(&self, venue_id: i32) -> Result<Vec<ShowEntry>> {
        let shows = sqlx::query_as::<_, ShowRow>(
            r#"
            SELECT s.artist_id AS counterpart_id,
                   a.name AS counterpart_name,
                   a.image_link AS counterpart_image_link,
                   s.start_time
            FROM shows s
            JOIN artists a ON a.id = s.artist_id
            WHERE s.venue_id = $1
            ORDER BY s.id
            "#,
        )
        .bind(venue_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(shows.into_iter().map(ShowEntry::from).collect())
    }

    async fn artist_shows(&self, artist_id: i32) -> Result<Vec<ShowEntry>> {
        let shows = sqlx::query_as::<_, ShowRow>(
            r#"
            SELECT s.venue_id AS counterpart_id,
                   v.name AS counterpart_name,
                   v.image_link AS counterpart_image_link,
                   s.start_time
            FROM shows s
            JOIN venues v ON v.id = s.venue_id
            WHERE s.artist_id = $1
            ORDER BY s.id
            "#,
        )
        .bind(artist_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(shows.into_iter().map(ShowEntry::from).collect())
    }

    async fn list_shows(&self) -> Result<Vec<ShowListing>> {
        let shows = sqlx::query_as::<_, ShowListing>(
            r#"
            SELECT s.venue_id, v.name AS venue_name,
                   s.artist_id, a.name AS artist_name, a.image_link AS artist_image_link,
                   s.start_time
            FROM shows s
            JOIN venues v ON v.id = s.venue_id
            JOIN artists a ON a.id = s.artist_id
            ORDER BY s.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(shows)
    }

    async fn create_show(&self, show: &NewShow) -> Result<Show> {
        let created = sqlx::query_as::<_, Show>(
            r#"
            INSERT INTO shows (venue_id, artist_id, start_time)
            VALUES ($1, $2, $3)
            RETURNING id, venue_id, artist_id, start_time
            "#,
        )
        .bind(show.venue_id)
        .bind(show.artist_id)
        .bind(show.start_time)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_show_insert_error(e, show))?;
        info!(
            "show {} created: artist {} at venue {}",
            created.id, created.artist_id, created.venue_id
        );
        Ok(created)
    }
}
