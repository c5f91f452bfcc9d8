//! Game database integration
//!
//! Provides the IGDB metadata lookup and background cover art downloads.

pub mod cover;
pub mod igdb;

pub use cover::{fetch_artwork, fetch_image_bytes, spawn_artwork_fetch, ArtworkOutcome};
pub use igdb::{cover_url, GameMetadata, IgdbClient, MetadataError};
