//! End-to-end orchestration of the acquisition pipeline.
//!
//! Pre-flight checks run before any filesystem or network side effect.
//! After that the staging area is established as a scoped resource, so its
//! teardown fires on every exit path regardless of which later stage fails.

use crate::auth::{Credentials, Session};
use crate::deliver::deliver;
use crate::error::{Error, Result};
use crate::extract::{ArchiveCodec, RarCodec};
use crate::fetch::{fetch_all, Fetcher, HttpFetcher};
use crate::sanitize::sanitize;
use crate::sequence::sequence;
use crate::staging::StagingArea;
use crate::types::{DeliveryResult, DownloadConfig, Part};
use std::sync::Arc;
use tracing::info;

/// Builds the part list for one run. Ordinals are assigned iff the asset has
/// more than one part; they are unique and contiguous starting at 1. Every
/// identifier must sanitize cleanly, which doubles as pre-flight validation.
pub fn build_parts(links: &[String]) -> Result<Vec<Part>> {
    let multi = links.len() > 1;
    links
        .iter()
        .enumerate()
        .map(|(index, link)| {
            Ok(Part {
                remote_identifier: link.clone(),
                ordinal: multi.then_some(index + 1),
                local_name: sanitize(link)?,
            })
        })
        .collect()
}

/// Validation that must pass before any network or filesystem side effect:
/// the destination directory exists and every identifier sanitizes cleanly.
fn preflight(config: &DownloadConfig, links: &[String]) -> Result<Vec<Part>> {
    if !config.destination.is_dir() {
        return Err(Error::DestinationNotFound(config.destination.clone()));
    }
    build_parts(links)
}

/// Runs the full pipeline with explicit collaborators: fetch all parts
/// concurrently, normalize their ordering, extract if the staged output is
/// an archive, and relocate the final artifacts into the destination.
///
/// The destination directory must exist before any work starts; failing that
/// check leaves no observable side effect. Once fetching starts, any worker
/// failure aborts the whole run after all workers settle, and the staging
/// directory is removed no matter where the run stopped.
pub async fn run(
    fetcher: Arc<dyn Fetcher>,
    codec: &dyn ArchiveCodec,
    config: &DownloadConfig,
    links: &[String],
) -> Result<DeliveryResult> {
    let parts = preflight(config, links)?;

    let staging = StagingArea::create(&config.staging_parent)?;
    match acquire(fetcher, codec, config, &parts, &staging).await {
        Ok(delivery) => {
            staging.destroy()?;
            info!(artifacts = delivery.final_paths.len(), "run completed");
            Ok(delivery)
        }
        // The drop guard removes staging; the original error wins.
        Err(e) => Err(e),
    }
}

/// The fallible middle of the run, bracketed by the staging guard in [`run`].
async fn acquire(
    fetcher: Arc<dyn Fetcher>,
    codec: &dyn ArchiveCodec,
    config: &DownloadConfig,
    parts: &[Part],
    staging: &StagingArea,
) -> Result<DeliveryResult> {
    fetch_all(fetcher, parts, staging.path()).await?;

    let staged = staging.list_sorted()?;
    let sequenced = if staged.len() > 1 {
        sequence(staging.path(), &staged)?
    } else {
        staged
    };

    deliver(codec, staging.path(), &sequenced, config)
}

/// Convenience entry point wiring the production collaborators: performs the
/// login handshake once, then runs the pipeline with the authenticated HTTP
/// fetcher and the rar codec.
pub async fn download_media(
    config: &DownloadConfig,
    credentials: &Credentials,
    links: &[String],
) -> Result<DeliveryResult> {
    // Pre-flight before the login handshake, so a bad destination or link
    // list fails without any network side effect.
    preflight(config, links)?;

    let session = Session::login(&config.login_url, credentials).await?;
    let fetcher = Arc::new(HttpFetcher::new(session));
    run(fetcher, &RarCodec, config, links).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_link_carries_no_ordinal() {
        let parts = build_parts(&["https://host/file/abc/movie.mp4".to_string()]).unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].ordinal, None);
        assert_eq!(parts[0].local_name, "movie.mp4");
    }

    #[test]
    fn multiple_links_get_contiguous_ordinals_from_one() {
        let links = vec![
            "https://host/file/a/x.part1.rar".to_string(),
            "https://host/file/b/x.part2.rar".to_string(),
            "https://host/file/c/x.part3.rar".to_string(),
        ];
        let parts = build_parts(&links).unwrap();
        let ordinals: Vec<_> = parts.iter().map(|p| p.ordinal).collect();
        assert_eq!(ordinals, [Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn malformed_link_fails_part_building() {
        let links = vec!["https://host/file/".to_string()];
        assert!(matches!(
            build_parts(&links),
            Err(Error::InvalidIdentifier(_))
        ));
    }
}
