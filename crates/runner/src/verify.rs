//! Artifact integrity checks
//!
//! Verification runs against the artifact at rest, after any download has
//! fully landed. On failure the file is left exactly where it is; deleting
//! a suspect artifact is the operator's call, not ours.

use rigup_errors::{Error, IntegrityError};
use std::path::Path;
use tokio::io::AsyncReadExt;

const CHUNK_SIZE: usize = 64 * 1024; // 64KB

/// Check an artifact against its declared size floor and checksum.
///
/// The size floor is checked first since it only needs metadata; the
/// checksum requires a full read. Either failure maps to a distinct
/// [`IntegrityError`] naming the artifact path.
pub async fn verify_artifact(
    path: &Path,
    min_size: Option<u64>,
    expected_blake3: Option<&str>,
) -> Result<(), Error> {
    if let Some(min) = min_size {
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| Error::io_with_path(&e, path))?;
        if metadata.len() < min {
            return Err(IntegrityError::SizeBelowMinimum {
                path: path.display().to_string(),
                actual: metadata.len(),
                expected_min: min,
            }
            .into());
        }
    }

    if let Some(expected) = expected_blake3 {
        let actual = hash_file(path).await?;
        if !actual.eq_ignore_ascii_case(expected) {
            return Err(IntegrityError::ChecksumMismatch {
                path: path.display().to_string(),
                expected: expected.to_ascii_lowercase(),
                actual,
            }
            .into());
        }
    }

    Ok(())
}

/// Compute the BLAKE3 hash of a file as a lowercase hex string.
pub async fn hash_file(path: &Path) -> Result<String, Error> {
    let mut file = tokio::fs::File::open(path)
        .await
        .map_err(|e| Error::io_with_path(&e, path))?;

    let mut hasher = blake3::Hasher::new();
    let mut buffer = vec![0; CHUNK_SIZE];

    loop {
        let n = file
            .read(&mut buffer)
            .await
            .map_err(|e| Error::io_with_path(&e, path))?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(hasher.finalize().to_hex().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn size_floor_rejects_short_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("artifact.tar.gz");
        std::fs::write(&path, vec![0u8; 100]).unwrap();

        let err = verify_artifact(&path, Some(1000), None).await.unwrap_err();
        match err {
            Error::Integrity(IntegrityError::SizeBelowMinimum {
                actual,
                expected_min,
                ..
            }) => {
                assert_eq!(actual, 100);
                assert_eq!(expected_min, 1000);
            }
            other => panic!("expected size error, got {other:?}"),
        }
        // the artifact must still be there
        assert!(path.exists());
    }

    #[tokio::test]
    async fn size_floor_accepts_exact_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("artifact.bin");
        std::fs::write(&path, vec![0u8; 256]).unwrap();

        verify_artifact(&path, Some(256), None).await.unwrap();
    }

    #[tokio::test]
    async fn checksum_mismatch_names_both_hashes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("artifact.bin");
        std::fs::write(&path, b"content").unwrap();

        let bogus = "0".repeat(64);
        let err = verify_artifact(&path, None, Some(&bogus)).await.unwrap_err();
        match err {
            Error::Integrity(IntegrityError::ChecksumMismatch {
                expected, actual, ..
            }) => {
                assert_eq!(expected, bogus);
                assert_eq!(actual, blake3::hash(b"content").to_hex().to_string());
            }
            other => panic!("expected checksum error, got {other:?}"),
        }
        assert!(path.exists());
    }

    #[tokio::test]
    async fn checksum_comparison_ignores_case() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("artifact.bin");
        std::fs::write(&path, b"content").unwrap();

        let expected = blake3::hash(b"content").to_hex().to_string().to_uppercase();
        verify_artifact(&path, None, Some(&expected)).await.unwrap();
    }

    #[tokio::test]
    async fn no_declared_checks_always_pass() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("artifact.bin");
        std::fs::write(&path, b"anything").unwrap();

        verify_artifact(&path, None, None).await.unwrap();
    }
}
