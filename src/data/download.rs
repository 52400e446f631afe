//! Users XML download
//!
//! Fetches the intranet users file so the users loader has something to read.

use std::path::Path;

use anyhow::Context;
use reqwest::StatusCode;
use tracing::{info, warn};

/// Downloads `url` into `dest`.
///
/// The file is only written on a 200 response; any other status leaves the
/// previous file in place. Returns whether the file was written.
pub async fn download_users_xml(client: &reqwest::Client, url: &str, dest: &Path) -> anyhow::Result<bool> {
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("requesting {url}"))?;

    if response.status() != StatusCode::OK {
        warn!(url, status = %response.status(), "Users download skipped");
        return Ok(false);
    }

    let body = response
        .bytes()
        .await
        .with_context(|| format!("reading body of {url}"))?;

    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    tokio::fs::write(dest, &body)
        .await
        .with_context(|| format!("writing {}", dest.display()))?;

    info!(url, dest = %dest.display(), bytes = body.len(), "Users file downloaded");
    Ok(true)
}
