//! Model module - records and state types
//!
//! - `types`: display and playback state enums, education levels
//! - `animal`: encyclopedia entries and detail tabs
//! - `user`: profiles and sessions
//! - `favorites`: immutable favorite id sets
//! - `playback`: player snapshot for rendering

mod types;
mod animal;
mod user;
mod favorites;
mod playback;

pub use types::{DisplayState, EducationLevel, PlaybackState};

pub use animal::{Animal, DetailTab, Location, Population, Taxonomy};

pub use user::{DEFAULT_TITLE, Session, UserProfile};

pub use favorites::FavoriteSet;

pub use playback::{PlaybackInfo, format_duration};
