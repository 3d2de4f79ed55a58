use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Show {
    pub id: i32,
    pub venue_id: i32,
    pub artist_id: i32,
    pub start_time: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewShow {
    pub venue_id: i32,
    pub artist_id: i32,
    pub start_time: NaiveDateTime,
}

// Show joined with both sides, for the global listing
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct ShowListing {
    pub venue_id: i32,
    pub venue_name: String,
    pub artist_id: i32,
    pub artist_name: String,
    pub artist_image_link: Option<String>,
    pub start_time: NaiveDateTime,
}
