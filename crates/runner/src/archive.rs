//! Archive extraction for fetched artifacts

use flate2::read::GzDecoder;
use rigup_errors::{Error, ExtractError};
use std::path::Path;
use tar::Archive;

/// Extract an archive into `root`, dispatching on the file extension.
///
/// Entry paths from the archive are resolved relative to `root`, so a
/// tarball whose entries live under `tesseract-3.05.02/` lands at
/// `root/tesseract-3.05.02/`. Supported formats are `.tar.gz` / `.tgz`
/// and plain `.tar`.
pub async fn extract(archive: &Path, root: &Path) -> Result<(), Error> {
    let extension = archive
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "gz" | "tgz" => extract_tar_gz(archive, root).await,
        "tar" => extract_tar(archive, root).await,
        _ => Err(ExtractError::UnsupportedFormat {
            path: archive.display().to_string(),
        }
        .into()),
    }
}

async fn extract_tar_gz(archive: &Path, root: &Path) -> Result<(), Error> {
    let archive = archive.to_path_buf();
    let root = root.to_path_buf();

    tokio::task::spawn_blocking(move || -> Result<(), Error> {
        let file = std::fs::File::open(&archive).map_err(|e| archive_failed(&archive, &e))?;
        let tar = GzDecoder::new(file);
        let mut ar = Archive::new(tar);
        ar.unpack(&root).map_err(|e| archive_failed(&archive, &e))?;
        Ok(())
    })
    .await
    .map_err(|e| Error::internal(format!("archive extraction task failed: {e}")))?
}

async fn extract_tar(archive: &Path, root: &Path) -> Result<(), Error> {
    let archive = archive.to_path_buf();
    let root = root.to_path_buf();

    tokio::task::spawn_blocking(move || -> Result<(), Error> {
        let file = std::fs::File::open(&archive).map_err(|e| archive_failed(&archive, &e))?;
        let mut ar = Archive::new(file);
        ar.unpack(&root).map_err(|e| archive_failed(&archive, &e))?;
        Ok(())
    })
    .await
    .map_err(|e| Error::internal(format!("archive extraction task failed: {e}")))?
}

fn archive_failed(archive: &Path, err: &std::io::Error) -> Error {
    ExtractError::ArchiveFailed {
        path: archive.display().to_string(),
        message: err.to_string(),
    }
    .into()
}
