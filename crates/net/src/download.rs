//! Artifact download with progress reporting

use futures::StreamExt;
use rigup_errors::{Error, FetchError};
use rigup_events::{EventEmitter, EventSender};
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::NetClient;

/// Download operation handle
#[derive(Debug)]
pub struct Download {
    url: Url,
}

/// Result of a download operation
#[derive(Debug)]
pub struct DownloadResult {
    pub url: String,
    pub size: u64,
    /// blake3 hash of the downloaded bytes, hex encoded
    pub hash: String,
}

impl Download {
    /// Create a new download
    ///
    /// # Errors
    ///
    /// Returns an error if the provided URL is invalid or cannot be parsed.
    pub fn new(url: &str) -> Result<Self, Error> {
        let url = Url::parse(url).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;
        Ok(Self { url })
    }

    /// Execute the download
    ///
    /// Streams the body to a temporary file next to `dest` and renames it
    /// into place once complete, so interrupted transfers never leave a
    /// half-written file at the final path.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails, the server returns an
    /// error status, the file cannot be created or written to, or the
    /// transfer is interrupted.
    pub async fn execute(
        self,
        client: &NetClient,
        dest: &Path,
        tx: &EventSender,
    ) -> Result<DownloadResult, Error> {
        let url_str = self.url.to_string();

        // Start download
        let response = client.get(url_str.as_str()).await?;

        if !response.status().is_success() {
            return Err(FetchError::HttpStatus {
                status: response.status().as_u16(),
                url: url_str,
            }
            .into());
        }

        // Get content length if available
        let content_length = response.content_length();

        tx.emit_download_started(url_str.clone(), content_length);

        // Create parent directory if needed
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::io_with_path(&e, parent))?;
        }

        // Create temporary file
        let temp_path = dest.with_extension("download");
        let mut file = File::create(&temp_path)
            .await
            .map_err(|e| Error::io_with_path(&e, &temp_path))?;

        // Download with progress
        let mut stream = response.bytes_stream();
        let mut downloaded = 0u64;
        let mut hasher = blake3::Hasher::new();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| FetchError::Interrupted {
                url: url_str.clone(),
                message: e.to_string(),
            })?;

            // Update hash
            hasher.update(&chunk);

            // Write to file
            file.write_all(&chunk)
                .await
                .map_err(|e| Error::io_with_path(&e, &temp_path))?;

            // Update progress
            downloaded += chunk.len() as u64;
            tx.emit_download_progress(url_str.clone(), downloaded, content_length);
        }

        // Ensure all data is written
        file.flush()
            .await
            .map_err(|e| Error::io_with_path(&e, &temp_path))?;
        drop(file);

        let hash = hasher.finalize().to_hex().to_string();

        // Move to final destination
        tokio::fs::rename(&temp_path, dest)
            .await
            .map_err(|e| Error::io_with_path(&e, dest))?;

        tx.emit_download_completed(url_str.clone(), downloaded, hash.clone());

        Ok(DownloadResult {
            url: url_str,
            size: downloaded,
            hash,
        })
    }
}
