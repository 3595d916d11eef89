//! FaunaDex core: an encyclopedia of Indonesian wildlife
//!
//! - `store`: document store seam and the in-memory implementation
//! - `gateway`: typed access to animals and user profiles
//! - `auth`: identity provider seam and account service
//! - `operations`: validated use cases the screens call
//! - `playback`: single-narration audio player
//! - `controller`: per-screen state machines
//! - `config`, `logging`: ambient setup for the binary

pub mod error;
pub mod validation;
pub mod store;
pub mod model;
pub mod gateway;
pub mod auth;
pub mod operations;
pub mod playback;
pub mod controller;
pub mod config;
pub mod logging;

pub use config::Config;
pub use error::{Error, ErrorKind, Result, ValidationError};
pub use operations::Operations;
