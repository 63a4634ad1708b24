//! Part retrieval: the fetcher capability and the concurrent coordinator.

use crate::auth::Session;
use crate::error::{Error, Result};
use crate::types::Part;
use async_trait::async_trait;
use futures_util::StreamExt;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, error, info};

/// Capability for retrieving one remote part into a staging directory.
///
/// A single concrete HTTP implementation exists today; the seam leaves room
/// for other file hosts without inheritance.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Retrieves `part` into `staging_dir/part.effective_name()`.
    async fn fetch(&self, part: &Part, staging_dir: &Path) -> Result<()>;
}

/// Streams remote parts over an authenticated HTTP session.
pub struct HttpFetcher {
    session: Session,
}

impl HttpFetcher {
    pub fn new(session: Session) -> Self {
        Self { session }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, part: &Part, staging_dir: &Path) -> Result<()> {
        let filename = staging_dir.join(part.effective_name());
        debug!(url = %part.remote_identifier, file = %filename.display(), "fetch started");

        let response = self
            .session
            .client()
            .get(&part.remote_identifier)
            .send()
            .await?
            .error_for_status()?;

        let file = tokio::fs::File::create(&filename)
            .await
            .map_err(|source| Error::Write {
                path: filename.clone(),
                source,
            })?;
        let mut writer = BufWriter::new(file);

        // Stream to disk chunk by chunk so large media files stay out of memory.
        let mut byte_stream = response.bytes_stream();
        while let Some(piece) = byte_stream.next().await {
            let chunk = piece?;
            writer.write_all(&chunk).await.map_err(|source| Error::Write {
                path: filename.clone(),
                source,
            })?;
        }
        writer.flush().await.map_err(|source| Error::Write {
            path: filename.clone(),
            source,
        })?;

        debug!(file = %filename.display(), "fetch completed");
        Ok(())
    }
}

/// Launches one fetch task per part and waits for all of them to settle.
///
/// Degree of concurrency equals the number of parts; the asset list is small
/// and operator-supplied, so no throttling is applied. First error wins: any
/// failure marks the run failed, but in-flight siblings are still awaited
/// (the transport has no cancellation primitive) before the first error in
/// part-declaration order is propagated. No partial delivery happens upstream.
pub async fn fetch_all(
    fetcher: Arc<dyn Fetcher>,
    parts: &[Part],
    staging_dir: &Path,
) -> Result<()> {
    let pb = indicatif::ProgressBar::new(parts.len() as u64);
    pb.set_style(
        indicatif::ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg} | {elapsed_precise} elapsed")
            .unwrap()
            .progress_chars("█▓▒░ "),
    );
    pb.set_message(format!("downloading {} part(s)", parts.len()));

    let mut tasks = Vec::with_capacity(parts.len());
    for part in parts {
        let fetcher = Arc::clone(&fetcher);
        let part = part.clone();
        let staging_dir = staging_dir.to_path_buf();
        let pb_clone = pb.clone();

        info!(url = %part.remote_identifier, "downloading part");
        tasks.push(tokio::spawn(async move {
            let result = fetcher.fetch(&part, &staging_dir).await;
            pb_clone.inc(1);
            result
        }));
    }

    // All workers settle before any error propagates, in declaration order.
    let mut first_error = None;
    for task in tasks {
        match task.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                error!(error = %e, "part fetch failed");
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
            Err(e) => {
                error!(error = %e, "fetch task panicked");
                if first_error.is_none() {
                    first_error = Some(Error::Io(std::io::Error::other(format!(
                        "fetch task failed: {}",
                        e
                    ))));
                }
            }
        }
    }

    match first_error {
        Some(e) => {
            pb.finish_with_message("download failed");
            Err(e)
        }
        None => {
            pb.finish_with_message("download complete");
            info!("all parts downloaded");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Mutex;

    struct StubFetcher {
        fail_on: Option<String>,
        fetched: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Fetcher for StubFetcher {
        async fn fetch(&self, part: &Part, staging_dir: &Path) -> Result<()> {
            if self.fail_on.as_deref() == Some(part.local_name.as_str()) {
                return Err(Error::Write {
                    path: PathBuf::from(&part.local_name),
                    source: std::io::Error::other("disk full"),
                });
            }
            std::fs::write(staging_dir.join(part.effective_name()), b"data").unwrap();
            self.fetched.lock().unwrap().push(part.local_name.clone());
            Ok(())
        }
    }

    fn parts(names: &[&str]) -> Vec<Part> {
        let multi = names.len() > 1;
        names
            .iter()
            .enumerate()
            .map(|(i, name)| Part {
                remote_identifier: format!("https://host/file/{}", name),
                ordinal: multi.then_some(i + 1),
                local_name: name.to_string(),
            })
            .collect()
    }

    #[tokio::test]
    async fn all_parts_land_in_staging() {
        let staging = tempfile::tempdir().unwrap();
        let fetcher = Arc::new(StubFetcher {
            fail_on: None,
            fetched: Mutex::new(Vec::new()),
        });

        fetch_all(fetcher, &parts(&["a.rar", "b.rar"]), staging.path())
            .await
            .unwrap();

        assert!(staging.path().join("1a.rar").is_file());
        assert!(staging.path().join("2b.rar").is_file());
    }

    #[tokio::test]
    async fn siblings_settle_before_first_error_propagates() {
        let staging = tempfile::tempdir().unwrap();
        let fetcher = Arc::new(StubFetcher {
            fail_on: Some("b.rar".to_string()),
            fetched: Mutex::new(Vec::new()),
        });

        let err = fetch_all(
            Arc::clone(&fetcher) as Arc<dyn Fetcher>,
            &parts(&["a.rar", "b.rar", "c.rar"]),
            staging.path(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Write { .. }));
        // The surviving workers ran to completion despite the failure.
        let fetched = fetcher.fetched.lock().unwrap();
        assert!(fetched.contains(&"a.rar".to_string()));
        assert!(fetched.contains(&"c.rar".to_string()));
    }
}
