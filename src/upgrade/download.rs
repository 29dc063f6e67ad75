use crate::core::FetchError;
use crate::upgrade::http::{Timeouts, UserAgent, build_client, parse_url};
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Downloads an artifact over HTTP onto a destination path.
///
/// The destination is only opened once the server has answered with a
/// success status, so a refused or failed request never truncates the file
/// that is already there. Once streaming has started, a failure leaves a
/// partial file behind and it is up to the caller to restore it.
#[derive(Debug, Clone)]
pub struct ArtifactFetcher {
    client: reqwest::Client,
}

impl ArtifactFetcher {
    pub fn new(user_agent: &UserAgent, timeouts: Timeouts) -> Result<Self, FetchError> {
        Ok(Self {
            client: build_client(user_agent, timeouts)?,
        })
    }

    /// Stream `url` into `dest`, returning the number of bytes written.
    pub async fn fetch(&self, url: &str, dest: &Path) -> Result<u64, FetchError> {
        let parsed = parse_url(url)?;
        let request_error = |source| FetchError::Request {
            url: url.to_string(),
            source,
        };

        debug!("GET {}", parsed);
        let mut response = self.client.get(parsed).send().await.map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let io_error = |source| FetchError::Io {
            path: dest.to_path_buf(),
            source,
        };

        let mut file = File::create(dest).await.map_err(io_error)?;
        let mut written = 0u64;
        let streamed = async {
            while let Some(chunk) = response.chunk().await.map_err(request_error)? {
                file.write_all(&chunk).await.map_err(io_error)?;
                written += chunk.len() as u64;
            }
            Ok::<(), FetchError>(())
        }
        .await;

        if let Err(e) = streamed {
            if let Err(flush_error) = file.flush().await {
                debug!("Ignoring flush failure on {:?}: {}", dest, flush_error);
            }
            return Err(e);
        }

        file.flush().await.map_err(io_error)?;
        file.sync_all().await.map_err(io_error)?;

        info!("Downloaded {} bytes from {} to {:?}", written, url, dest);
        Ok(written)
    }
}
