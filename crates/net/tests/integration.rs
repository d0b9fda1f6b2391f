//! Integration tests for net crate

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use rigup_events::{channel, AppEvent, DownloadEvent};
    use rigup_net::*;
    use std::time::Duration;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_download_file() {
        let server = MockServer::start();
        let (tx, mut rx) = channel();

        // Mock response
        let content = b"test file content";
        let mock = server.mock(|when, then| {
            when.method(GET).path("/test.txt");
            then.status(200)
                .header("content-length", content.len().to_string())
                .body(content);
        });

        // Setup
        let temp = tempdir().unwrap();
        let dest = temp.path().join("downloaded.txt");
        let client = NetClient::with_defaults().unwrap();
        let url = server.url("/test.txt");

        // Download
        let result = download_file(&client, &url, &dest, &tx).await.unwrap();

        // Verify
        mock.assert();
        assert_eq!(result.size, content.len() as u64);
        assert_eq!(result.hash, blake3::hash(content).to_hex().to_string());

        let downloaded = tokio::fs::read(&dest).await.unwrap();
        assert_eq!(downloaded, content);

        // Temp file must be gone after the rename
        assert!(!dest.with_extension("download").exists());

        // Check events
        let mut saw_start = false;
        let mut saw_complete = false;

        while let Ok(event) = rx.try_recv() {
            match event {
                AppEvent::Download(DownloadEvent::Started { .. }) => saw_start = true,
                AppEvent::Download(DownloadEvent::Completed { final_size, .. }) => {
                    assert_eq!(final_size, content.len() as u64);
                    saw_complete = true;
                }
                _ => {}
            }
        }

        assert!(saw_start);
        assert!(saw_complete);
    }

    #[tokio::test]
    async fn test_http_error_handling() {
        let server = MockServer::start();
        let (tx, _rx) = channel();

        server.mock(|when, then| {
            when.method(GET).path("/missing.tar.gz");
            then.status(404);
        });

        let temp = tempdir().unwrap();
        let dest = temp.path().join("missing.tar.gz");
        let client = NetClient::with_defaults().unwrap();
        let url = server.url("/missing.tar.gz");

        let error = download_file(&client, &url, &dest, &tx).await.unwrap_err();

        assert!(matches!(
            error,
            rigup_errors::Error::Fetch(rigup_errors::FetchError::HttpStatus { status: 404, .. })
        ));
        // Nothing must be left at the destination
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_invalid_url() {
        let error = Download::new("not a url").unwrap_err();
        assert!(matches!(
            error,
            rigup_errors::Error::Fetch(rigup_errors::FetchError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_server_error_retries_then_fails() {
        let server = MockServer::start();
        let (tx, _rx) = channel();

        let mock = server.mock(|when, then| {
            when.method(GET).path("/flaky.tar.gz");
            then.status(503);
        });

        let config = NetConfig {
            retry_count: 2,
            retry_delay: Duration::from_millis(1),
            ..NetConfig::default()
        };
        let client = NetClient::new(config).unwrap();

        let temp = tempdir().unwrap();
        let dest = temp.path().join("flaky.tar.gz");
        let url = server.url("/flaky.tar.gz");

        let error = download_file(&client, &url, &dest, &tx).await.unwrap_err();

        assert!(matches!(
            error,
            rigup_errors::Error::Fetch(rigup_errors::FetchError::HttpStatus { status: 503, .. })
        ));
        // Initial attempt plus two retries
        assert_eq!(mock.hits(), 3);
    }

    #[tokio::test]
    async fn test_rate_limit_reported() {
        let server = MockServer::start();
        let (tx, _rx) = channel();

        server.mock(|when, then| {
            when.method(GET).path("/limited");
            then.status(429).header("retry-after", "17");
        });

        let temp = tempdir().unwrap();
        let dest = temp.path().join("limited");
        let client = NetClient::with_defaults().unwrap();
        let url = server.url("/limited");

        let error = download_file(&client, &url, &dest, &tx).await.unwrap_err();

        assert!(matches!(
            error,
            rigup_errors::Error::Fetch(rigup_errors::FetchError::RateLimited { seconds: 17 })
        ));
    }
}
