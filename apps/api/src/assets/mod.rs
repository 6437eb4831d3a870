//! Media retrieval — maps remote media references to local asset filenames
//! and fetches them best-effort before rendering.
//!
//! Failures here are never fatal: a ref that cannot be named stays out of the
//! resolution map (the generator emits a plain placeholder), and a download
//! failure leaves the file absent (the emitted script's render-time existence
//! check shows a visible warning instead).

use std::path::Path;

use tracing::{info, warn};

use crate::script::{ContentItem, MediaResolution};

/// Derives a local asset filename from a media URL.
///
/// Takes the last path segment, drops any query string, and replaces
/// characters unsafe for filenames. Returns None when no usable name can be
/// derived (the ref then stays unresolved).
pub fn asset_filename(url: &str) -> Option<String> {
    let without_query = url.split(['?', '#']).next().unwrap_or(url);
    let host_and_path = without_query
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(without_query);
    // a bare domain has no path to take a filename from
    let (_, path) = host_and_path.split_once('/')?;
    let segment = path.trim_end_matches('/').rsplit('/').next()?;

    let sanitized: String = segment
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    // directory-like segments without an extension are not asset files
    if sanitized.is_empty() || !sanitized.contains('.') || sanitized.starts_with('.') {
        return None;
    }
    Some(sanitized)
}

/// Builds the resolution map for every item carrying a media reference.
pub fn build_resolution(items: &[ContentItem]) -> MediaResolution {
    let mut media = MediaResolution::new();
    for item in items {
        if let Some(media_ref) = item.media_ref.as_deref() {
            match asset_filename(media_ref) {
                Some(name) => media.insert(media_ref, name),
                None => warn!(media_ref, "cannot derive an asset filename, leaving unresolved"),
            }
        }
    }
    media
}

/// Downloads every resolved asset into `assets_dir`, skipping files that
/// already exist. Returns the number of files fetched.
pub async fn fetch_assets(
    client: &reqwest::Client,
    media: &MediaResolution,
    assets_dir: &Path,
) -> usize {
    let mut fetched = 0usize;

    for (url, name) in media.iter() {
        let target = assets_dir.join(name);
        if target.exists() {
            continue;
        }

        match fetch_one(client, url).await {
            Ok(bytes) => match tokio::fs::write(&target, &bytes).await {
                Ok(()) => {
                    info!(url, file = name, size = bytes.len(), "Asset downloaded");
                    fetched += 1;
                }
                Err(e) => warn!(url, file = name, "Failed to write asset: {e}"),
            },
            // Render-time existence check degrades this to a visible warning.
            Err(e) => warn!(url, "Failed to download asset: {e}"),
        }
    }

    fetched
}

async fn fetch_one(client: &reqwest::Client, url: &str) -> Result<bytes::Bytes, reqwest::Error> {
    client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .bytes()
        .await
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
