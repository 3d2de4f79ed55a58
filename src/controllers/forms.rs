//! Form objects for the create and edit endpoints.
//!
//! Forms arrive as `application/x-www-form-urlencoded` bodies. The genre
//! multi-select sends one `genres` pair per selected option.

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};
use validator::{Validate, ValidationError};

use crate::models::{Artist, ArtistInput, NewShow, Venue, VenueInput};

pub const GENRE_CHOICES: &[&str] = &[
    "Alternative",
    "Blues",
    "Classical",
    "Country",
    "Electronic",
    "Folk",
    "Funk",
    "Hip-Hop",
    "Heavy Metal",
    "Instrumental",
    "Jazz",
    "Musical Theatre",
    "Pop",
    "Punk",
    "R&B",
    "Reggae",
    "Rock n Roll",
    "Soul",
    "Other",
];

pub const STATE_CHOICES: &[&str] = &[
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "DC", "FL", "GA", "HI", "ID", "IL", "IN",
    "IA", "KS", "KY", "LA", "ME", "MT", "NE", "NV", "NH", "NJ", "NM", "NY", "NC", "ND", "OH",
    "OK", "OR", "MD", "MA", "MI", "MN", "MS", "MO", "PA", "RI", "SC", "SD", "TN", "TX", "UT",
    "VT", "VA", "WA", "WV", "WI", "WY",
];

const START_TIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

/* ---------- field helpers ---------- */

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty()))
}

// Unchecked boxes are simply absent from the body
fn checkbox<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(match value {
        Some(v) => !matches!(
            v.trim().to_lowercase().as_str(),
            "" | "false" | "off" | "n" | "no" | "0"
        ),
        None => false,
    })
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

fn known_state(value: &str) -> Result<(), ValidationError> {
    if STATE_CHOICES.contains(&value.trim()) {
        Ok(())
    } else {
        Err(ValidationError::new("state"))
    }
}

fn known_genres(values: &[String]) -> Result<(), ValidationError> {
    if values.is_empty() {
        return Err(ValidationError::new("required"));
    }
    if values.iter().all(|genre| GENRE_CHOICES.contains(&genre.trim())) {
        Ok(())
    } else {
        Err(ValidationError::new("genre"))
    }
}

fn valid_start_time(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() || parse_start_time(value).is_some() {
        Ok(())
    } else {
        Err(ValidationError::new("datetime"))
    }
}

pub fn parse_start_time(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    START_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}

fn trimmed(values: &[String]) -> Vec<String> {
    values.iter().map(|v| v.trim().to_string()).collect()
}

/* ---------- VENUE ---------- */

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct VenueForm {
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    #[serde(default)]
    #[validate(custom(function = "not_blank"), length(max = 120))]
    pub city: String,
    #[serde(default)]
    #[validate(custom(function = "known_state"))]
    pub state: String,
    #[serde(default)]
    #[validate(custom(function = "not_blank"), length(max = 120))]
    pub address: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(length(max = 120))]
    pub phone: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "known_genres"))]
    pub genres: Vec<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(url, length(max = 500))]
    pub image_link: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(url, length(max = 120))]
    pub website_link: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(url, length(max = 120))]
    pub facebook_link: Option<String>,
    #[serde(default, deserialize_with = "checkbox")]
    pub seeking_talent: bool,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(length(max = 500))]
    pub seeking_description: Option<String>,
}

impl VenueForm {
    pub fn into_input(self) -> VenueInput {
        VenueInput {
            name: self.name.trim().to_string(),
            city: self.city.trim().to_string(),
            state: self.state.trim().to_string(),
            address: self.address.trim().to_string(),
            phone: self.phone,
            genres: trimmed(&self.genres),
            image_link: self.image_link,
            website_link: self.website_link,
            facebook_link: self.facebook_link,
            seeking_talent: self.seeking_talent,
            seeking_description: self.seeking_description,
        }
    }
}

impl From<&Venue> for VenueForm {
    fn from(venue: &Venue) -> Self {
        VenueForm {
            name: venue.name.clone(),
            city: venue.city.clone(),
            state: venue.state.clone(),
            address: venue.address.clone(),
            phone: venue.phone.clone(),
            genres: venue.genre_list(),
            image_link: venue.image_link.clone(),
            website_link: venue.website_link.clone(),
            facebook_link: venue.facebook_link.clone(),
            seeking_talent: venue.seeking_talent,
            seeking_description: venue.seeking_description.clone(),
        }
    }
}

/* ---------- ARTIST ---------- */

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ArtistForm {
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    #[serde(default)]
    #[validate(custom(function = "not_blank"), length(max = 120))]
    pub city: String,
    #[serde(default)]
    #[validate(custom(function = "known_state"))]
    pub state: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(length(max = 120))]
    pub phone: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "known_genres"))]
    pub genres: Vec<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(url, length(max = 500))]
    pub image_link: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(url, length(max = 120))]
    pub website_link: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(url, length(max = 120))]
    pub facebook_link: Option<String>,
    #[serde(default, deserialize_with = "checkbox")]
    pub seeking_venue: bool,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(length(max = 500))]
    pub seeking_description: Option<String>,
}

impl ArtistForm {
    pub fn into_input(self) -> ArtistInput {
        ArtistInput {
            name: self.name.trim().to_string(),
            city: self.city.trim().to_string(),
            state: self.state.trim().to_string(),
            phone: self.phone,
            genres: trimmed(&self.genres),
            image_link: self.image_link,
            website_link: self.website_link,
            facebook_link: self.facebook_link,
            seeking_venue: self.seeking_venue,
            seeking_description: self.seeking_description,
        }
    }
}

impl From<&Artist> for ArtistForm {
    fn from(artist: &Artist) -> Self {
        ArtistForm {
            name: artist.name.clone(),
            city: artist.city.clone(),
            state: artist.state.clone(),
            phone: artist.phone.clone(),
            genres: artist.genre_list(),
            image_link: artist.image_link.clone(),
            website_link: artist.website_link.clone(),
            facebook_link: artist.facebook_link.clone(),
            seeking_venue: artist.seeking_venue,
            seeking_description: artist.seeking_description.clone(),
        }
    }
}

/* ---------- SHOW ---------- */

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ShowForm {
    #[serde(default)]
    #[validate(range(min = 1))]
    pub artist_id: i32,
    #[serde(default)]
    #[validate(range(min = 1))]
    pub venue_id: i32,
    /// Blank means "now"
    #[serde(default)]
    #[validate(custom(function = "valid_start_time"))]
    pub start_time: String,
}

impl ShowForm {
    pub fn with_default_start(now: NaiveDateTime) -> Self {
        ShowForm {
            start_time: now.format("%Y-%m-%d %H:%M:%S").to_string(),
            ..Default::default()
        }
    }

    /// Must be called on a validated form.
    pub fn into_new_show(self, now: NaiveDateTime) -> NewShow {
        NewShow {
            venue_id: self.venue_id,
            artist_id: self.artist_id,
            start_time: parse_start_time(&self.start_time).unwrap_or(now),
        }
    }
}
