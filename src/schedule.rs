//! Show classification.
//!
//! Splits a venue's or artist's shows into past and upcoming relative to a
//! reference time supplied by the caller. A show is upcoming only when it
//! starts strictly after the reference time.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::error::{AppError, Result};

/// One show as seen from the owning entity, with the counterpart resolved.
///
/// For a venue the counterpart is the performing artist, for an artist it
/// is the hosting venue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowEntry {
    pub counterpart_id: Option<i32>,
    pub counterpart_name: String,
    pub counterpart_image_link: Option<String>,
    pub start_time: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShowProjection {
    pub counterpart_id: i32,
    pub counterpart_name: String,
    pub counterpart_image_link: Option<String>,
    pub start_time: NaiveDateTime,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ShowSchedule {
    pub past_shows: Vec<ShowProjection>,
    pub upcoming_shows: Vec<ShowProjection>,
    pub past_shows_count: usize,
    pub upcoming_shows_count: usize,
}

pub fn is_upcoming(start_time: NaiveDateTime, reference_time: NaiveDateTime) -> bool {
    start_time > reference_time
}

/// Number of start times strictly after `reference_time`.
pub fn count_upcoming<I>(start_times: I, reference_time: NaiveDateTime) -> usize
where
    I: IntoIterator<Item = NaiveDateTime>,
{
    start_times
        .into_iter()
        .filter(|start| is_upcoming(*start, reference_time))
        .count()
}

/// Partitions `shows` into past and upcoming projections.
///
/// Input order is kept inside each group. Fails with `InvalidInput` when an
/// entry has no start time or no counterpart id; nothing is returned for a
/// partially valid input.
pub fn classify_shows(shows: &[ShowEntry], reference_time: NaiveDateTime) -> Result<ShowSchedule> {
    let mut schedule = ShowSchedule::default();

    for (position, show) in shows.iter().enumerate() {
        let start_time = show.start_time.ok_or_else(|| {
            AppError::InvalidInput(format!("show #{} has no start time", position))
        })?;
        let counterpart_id = show.counterpart_id.ok_or_else(|| {
            AppError::InvalidInput(format!("show #{} has no counterpart", position))
        })?;

        let projection = ShowProjection {
            counterpart_id,
            counterpart_name: show.counterpart_name.clone(),
            counterpart_image_link: show.counterpart_image_link.clone(),
            start_time,
        };

        if is_upcoming(start_time, reference_time) {
            schedule.upcoming_shows.push(projection);
        } else {
            schedule.past_shows.push(projection);
        }
    }

    schedule.past_shows_count = schedule.past_shows.len();
    schedule.upcoming_shows_count = schedule.upcoming_shows.len();

    Ok(schedule)
}
