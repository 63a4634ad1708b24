//! rapiddl - Authenticated file-host downloader for media libraries
//!
//! This library fetches one or more remote file parts belonging to a single
//! logical asset, reassembles them (directly or via archive extraction) and
//! delivers exactly one resulting media file set into a destination
//! directory.
//!
//! # Pipeline
//!
//! - **Fetch**: one concurrent streaming download per declared part, over a
//!   session authenticated once up front
//! - **Sequence**: staged parts are ordered and renamed so a multi-part
//!   archive codec concatenates them correctly
//! - **Extract**: archive members matching the media allow-list are
//!   unpacked inside staging
//! - **Deliver**: final artifacts are moved into the destination, and the
//!   per-run staging directory is removed on every exit path
//!
//! # Example
//!
//! ```no_run
//! use rapiddl::{download_media, Credentials, DownloadConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = DownloadConfig {
//!     destination: "/media/library".into(),
//!     ..DownloadConfig::default()
//! };
//! let credentials = Credentials {
//!     email: "user@example.com".to_string(),
//!     password: "secret".to_string(),
//! };
//! let links = vec!["https://rapidgator.net/file/abc/movie.mp4.html".to_string()];
//!
//! let delivered = download_media(&config, &credentials, &links).await?;
//! println!("delivered {} artifact(s)", delivered.final_paths.len());
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod deliver;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod pipeline;
pub mod sanitize;
pub mod sequence;
pub mod staging;
pub mod types;

pub use auth::{build_payload, Credentials, Session};
pub use error::{Error, Result};
pub use extract::{ArchiveCodec, RarCodec};
pub use fetch::{Fetcher, HttpFetcher};
pub use pipeline::{build_parts, download_media, run};
pub use sanitize::sanitize;
pub use staging::StagingArea;
pub use types::{DeliveryResult, DownloadConfig, Part, StagedKind};
