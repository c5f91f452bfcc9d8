//! Cover art download
//!
//! The lookup and the download run on a worker thread; the UI polls the
//! returned channel once per frame.

use std::sync::mpsc::{self, Receiver};
use std::thread;

use super::igdb::{build_client, GameMetadata, IgdbClient};

/// Everything the worker found for one title
#[derive(Debug, Clone, Default)]
pub struct ArtworkOutcome {
    /// Title that was searched
    pub title: String,
    /// IGDB match, if any
    pub metadata: Option<GameMetadata>,
    /// Raw cover image bytes, if a cover was found and downloaded
    pub image: Option<Vec<u8>>,
}

/// Fetch image bytes from a URL
pub fn fetch_image_bytes(url: &str) -> Result<Vec<u8>, String> {
    let client = build_client().map_err(|e| format!("Failed to create client: {}", e))?;

    let response = client
        .get(url)
        .send()
        .map_err(|e| format!("Failed to fetch image: {}", e))?;

    if !response.status().is_success() {
        return Err(format!("HTTP error: {}", response.status()));
    }

    response
        .bytes()
        .map(|b| b.to_vec())
        .map_err(|e| format!("Failed to read image bytes: {}", e))
}

/// Look up `title` and download its cover
///
/// Failures are logged and reported as missing fields in the outcome.
pub fn fetch_artwork(client: &IgdbClient, title: &str) -> ArtworkOutcome {
    let metadata = client.search_game(title);

    let image = match metadata.as_ref().and_then(|m| m.cover_url.as_deref()) {
        Some(url) => match fetch_image_bytes(url) {
            Ok(bytes) => {
                log::info!("Downloaded cover ({} bytes)", bytes.len());
                Some(bytes)
            }
            Err(e) => {
                log::warn!("Cover download failed: {}", e);
                None
            }
        },
        None => None,
    };

    ArtworkOutcome {
        title: title.to_string(),
        metadata,
        image,
    }
}

/// Start a background artwork fetch and return the channel it reports on
///
/// The worker sends exactly one outcome. Dropping the receiver discards the
/// result, but the in-flight request still runs to completion or timeout.
pub fn spawn_artwork_fetch(client: IgdbClient, title: String) -> Receiver<ArtworkOutcome> {
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let outcome = fetch_artwork(&client, &title);
        if tx.send(outcome).is_err() {
            log::debug!("Discarding stale artwork result for {:?}", title);
        }
    });

    rx
}
