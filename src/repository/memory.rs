use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::DirectoryRepository;
use crate::error::{AppError, Result};
use crate::genres::encode_genres;
use crate::models::{Artist, ArtistInput, NewShow, Show, ShowListing, Venue, VenueInput};
use crate::schedule::ShowEntry;

/// In-process directory with the same semantics as the PostgreSQL one.
#[derive(Default)]
pub struct MemoryDirectory {
    inner: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    venues: BTreeMap<i32, Venue>,
    artists: BTreeMap<i32, Artist>,
    shows: BTreeMap<i32, Show>,
    last_venue_id: i32,
    last_artist_id: i32,
    last_show_id: i32,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>> {
        self.inner
            .read()
            .map_err(|_| AppError::Internal("memory directory lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>> {
        self.inner
            .write()
            .map_err(|_| AppError::Internal("memory directory lock poisoned".to_string()))
    }
}

fn name_matches(name: &str, term: &str) -> bool {
    name.to_lowercase().contains(&term.to_lowercase())
}

fn venue_from_input(id: i32, input: &VenueInput) -> Venue {
    Venue {
        id,
        name: input.name.clone(),
        city: input.city.clone(),
        state: input.state.clone(),
        address: input.address.clone(),
        phone: input.phone.clone(),
        genres: encode_genres(&input.genres),
        image_link: input.image_link.clone(),
        website_link: input.website_link.clone(),
        facebook_link: input.facebook_link.clone(),
        seeking_talent: input.seeking_talent,
        seeking_description: input.seeking_description.clone(),
    }
}

fn artist_from_input(id: i32, input: &ArtistInput) -> Artist {
    Artist {
        id,
        name: input.name.clone(),
        city: input.city.clone(),
        state: input.state.clone(),
        phone: input.phone.clone(),
        genres: encode_genres(&input.genres),
        image_link: input.image_link.clone(),
        website_link: input.website_link.clone(),
        facebook_link: input.facebook_link.clone(),
        seeking_venue: input.seeking_venue,
        seeking_description: input.seeking_description.clone(),
    }
}

#[async_trait]
impl DirectoryRepository for MemoryDirectory {
    async fn list_venues(&self) -> Result<Vec<Venue>> {
        let tables = self.read()?;
        let mut venues: Vec<Venue> = tables.venues.values().cloned().collect();
        // Same order as `lower(state), lower(city), id` in Postgres
        venues.sort_by_cached_key(|v| (v.state.to_lowercase(), v.city.to_lowercase(), v.id));
        Ok(venues)
    }

    async fn search_venues(&self, term: &str) -> Result<Vec<Venue>> {
        let tables = self.read()?;
        Ok(tables
            .venues
            .values()
            .filter(|venue| name_matches(&venue.name, term))
            .cloned()
            .collect())
    }

    async fn find_venue(&self, venue_id: i32) -> Result<Option<Venue>> {
        Ok(self.read()?.venues.get(&venue_id).cloned())
    }

    async fn create_venue(&self, input: &VenueInput) -> Result<Venue> {
        let mut tables = self.write()?;
        tables.last_venue_id += 1;
        let venue = venue_from_input(tables.last_venue_id, input);
        tables.venues.insert(venue.id, venue.clone());
        Ok(venue)
    }

    async fn update_venue(&self, venue_id: i32, input: &VenueInput) -> Result<Option<Venue>> {
        let mut tables = self.write()?;
        match tables.venues.get_mut(&venue_id) {
            Some(slot) => {
                *slot = venue_from_input(venue_id, input);
                Ok(Some(slot.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_venue(&self, venue_id: i32) -> Result<bool> {
        let mut tables = self.write()?;
        if tables.venues.remove(&venue_id).is_none() {
            return Ok(false);
        }
        tables.shows.retain(|_, show| show.venue_id != venue_id);
        Ok(true)
    }

    async fn list_artists(&self) -> Result<Vec<Artist>> {
        Ok(self.read()?.artists.values().cloned().collect())
    }

    async fn search_artists(&self, term: &str) -> Result<Vec<Artist>> {
        let tables = self.read()?;
        Ok(tables
            .artists
            .values()
            .filter(|artist| name_matches(&artist.name, term))
            .cloned()
            .collect())
    }

    async fn find_artist(&self, artist_id: i32) -> Result<Option<Artist>> {
        Ok(self.read()?.artists.get(&artist_id).cloned())
    }

    async fn create_artist(&self, input: &ArtistInput) -> Result<Artist> {
        let mut tables = self.write()?;
        tables.last_artist_id += 1;
        let artist = artist_from_input(tables.last_artist_id, input);
        tables.artists.insert(artist.id, artist.clone());
        Ok(artist)
    }

    async fn update_artist(&self, artist_id: i32, input: &ArtistInput) -> Result<Option<Artist>> {
        let mut tables = self.write()?;
        match tables.artists.get_mut(&artist_id) {
            Some(slot) => {
                *slot = artist_from_input(artist_id, input);
                Ok(Some(slot.clone()))
            }
            None => Ok(None),
        }
    }

    async fn venue_show_times(&self, venue_id: i32) -> Result<Vec<NaiveDateTime>> {
        let tables = self.read()?;
        Ok(tables
            .shows
            .values()
            .filter(|show| show.venue_id == venue_id)
            .map(|show| show.start_time)
            .collect())
    }

    async fn artist_show_times(&self, artist_id: i32) -> Result<Vec<NaiveDateTime>> {
        let tables = self.read()?;
        Ok(tables
            .shows
            .values()
            .filter(|show| show.artist_id == artist_id)
            .map(|show| show.start_time)
            .collect())
    }

    async fn venue_shows(&self, venue_id: i32) -> Result<Vec<ShowEntry>> {
        let tables = self.read()?;
        Ok(tables
            .shows
            .values()
            .filter(|show| show.venue_id == venue_id)
            .filter_map(|show| {
                let artist = tables.artists.get(&show.artist_id)?;
                Some(ShowEntry {
                    counterpart_id: Some(artist.id),
                    counterpart_name: artist.name.clone(),
                    counterpart_image_link: artist.image_link.clone(),
                    start_time: Some(show.start_time),
                })
            })
            .collect())
    }

    async fn artist_shows(&self, artist_id: i32) -> Result<Vec<ShowEntry>> {
        let tables = self.read()?;
        Ok(tables
            .shows
            .values()
            .filter(|show| show.artist_id == artist_id)
            .filter_map(|show| {
                let venue = tables.venues.get(&show.venue_id)?;
                Some(ShowEntry {
                    counterpart_id: Some(venue.id),
                    counterpart_name: venue.name.clone(),
                    counterpart_image_link: venue.image_link.clone(),
                    start_time: Some(show.start_time),
                })
            })
            .collect())
    }

    async fn list_shows(&self) -> Result<Vec<ShowListing>> {
        let tables = self.read()?;
        Ok(tables
            .shows
            .values()
            .filter_map(|show| {
                let venue = tables.venues.get(&show.venue_id)?;
                let artist = tables.artists.get(&show.artist_id)?;
                Some(ShowListing {
                    venue_id: venue.id,
                    venue_name: venue.name.clone(),
                    artist_id: artist.id,
                    artist_name: artist.name.clone(),
                    artist_image_link: artist.image_link.clone(),
                    start_time: show.start_time,
                })
            })
            .collect())
    }

    async fn create_show(&self, show: &NewShow) -> Result<Show> {
        let mut tables = self.write()?;
        if !tables.venues.contains_key(&show.venue_id) || !tables.artists.contains_key(&show.artist_id) {
            return Err(AppError::InvalidInput(format!(
                "venue {} or artist {} does not exist",
                show.venue_id, show.artist_id
            )));
        }
        tables.last_show_id += 1;
        let created = Show {
            id: tables.last_show_id,
            venue_id: show.venue_id,
            artist_id: show.artist_id,
            start_time: show.start_time,
        };
        tables.shows.insert(created.id, created.clone());
        Ok(created)
    }
}
