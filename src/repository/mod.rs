//! Query layer behind the route handlers.
//!
//! Handlers only see [`DirectoryRepository`]; `PgDirectory` backs it with
//! PostgreSQL and `MemoryDirectory` keeps everything in process.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::error::Result;
use crate::models::{Artist, ArtistInput, NewShow, Show, ShowListing, Venue, VenueInput};
use crate::schedule::ShowEntry;

pub use memory::MemoryDirectory;
pub use postgres::PgDirectory;

#[async_trait]
pub trait DirectoryRepository: Send + Sync {
    /// All venues ordered by state, city, then id.
    async fn list_venues(&self) -> Result<Vec<Venue>>;
    /// Case-insensitive substring match on the venue name, ordered by id.
    async fn search_venues(&self, term: &str) -> Result<Vec<Venue>>;
    async fn find_venue(&self, venue_id: i32) -> Result<Option<Venue>>;
    async fn create_venue(&self, input: &VenueInput) -> Result<Venue>;
    async fn update_venue(&self, venue_id: i32, input: &VenueInput) -> Result<Option<Venue>>;
    /// Removes the venue together with its shows. `false` when it did not exist.
    async fn delete_venue(&self, venue_id: i32) -> Result<bool>;

    /// All artists ordered by id.
    async fn list_artists(&self) -> Result<Vec<Artist>>;
    async fn search_artists(&self, term: &str) -> Result<Vec<Artist>>;
    async fn find_artist(&self, artist_id: i32) -> Result<Option<Artist>>;
    async fn create_artist(&self, input: &ArtistInput) -> Result<Artist>;
    async fn update_artist(&self, artist_id: i32, input: &ArtistInput) -> Result<Option<Artist>>;

    async fn venue_show_times(&self, venue_id: i32) -> Result<Vec<NaiveDateTime>>;
    async fn artist_show_times(&self, artist_id: i32) -> Result<Vec<NaiveDateTime>>;
    /// Shows at a venue with the performing artist as counterpart, in id order.
    async fn venue_shows(&self, venue_id: i32) -> Result<Vec<ShowEntry>>;
    /// Shows of an artist with the hosting venue as counterpart, in id order.
    async fn artist_shows(&self, artist_id: i32) -> Result<Vec<ShowEntry>>;
    async fn list_shows(&self) -> Result<Vec<ShowListing>>;
    /// Fails with `InvalidInput` when the venue or the artist does not exist.
    async fn create_show(&self, show: &NewShow) -> Result<Show>;
}
