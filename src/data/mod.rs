//! Data Module
//!
//! Loading of presence and user input files, and the weekday arithmetic
//! built on top of them.
//!
//! # Components
//! - Presence: CSV of daily check-in/check-out times per user
//! - Users: XML of user names and avatars
//! - Aggregate: per-weekday sums and means

pub mod aggregate;
pub mod download;
pub mod presence;
pub mod users;

pub use aggregate::{
    average_start_end, group_by_weekday, group_start_end_by_weekday, interval, mean,
    seconds_since_midnight, StartEnd, WEEKDAY_ABBR,
};
pub use download::download_users_xml;
pub use presence::{load_presence, parse_presence, PresenceData, PresenceEntry, PresenceLoader, UserPresence};
pub use users::{load_users, parse_users, PersonalData, UsersData, UsersLoader};

/// Numeric user identifier shared by both input files.
pub type UserId = u32;
