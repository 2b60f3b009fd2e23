//! Floorsight Core - Domain models, region lookup, imaging, and configuration
//!
//! This crate contains the tile index, region resolver, floor selector, image
//! transcoder, and startup asset loading shared by the service and the CLI.

pub mod config;
pub mod error;
pub mod floor;
pub mod imaging;
pub mod loader;
pub mod models;
pub mod region;

pub use error::{FloorsightError, Result};
