pub mod venue;
pub mod artist;
pub mod show;

pub use venue::{Venue, VenueInput};
pub use artist::{Artist, ArtistInput};
pub use show::{NewShow, Show, ShowListing};
