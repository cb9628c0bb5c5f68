//! Filesystem helpers for moving finished media into managed storage.
//!
//! Work directories and storage roots may live on different filesystems, so
//! a plain rename can fail with EXDEV. Both helpers land the file through a
//! temporary sibling and a rename, so readers never observe a partial file.

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, error, warn};

use crate::error::{MediaError, MediaResult};

/// Move `src` to `dst`, falling back to copy+delete across devices.
pub async fn move_file(src: impl AsRef<Path>, dst: impl AsRef<Path>) -> MediaResult<()> {
    let (src, dst) = (src.as_ref(), dst.as_ref());
    ensure_parent(dst).await?;

    let err = match fs::rename(src, dst).await {
        Ok(()) => return Ok(()),
        Err(e) => e,
    };
    if !is_cross_device_error(&err) {
        return Err(err.into());
    }

    debug!(src = %src.display(), dst = %dst.display(), "rename crosses devices, copying");
    copy_file_atomic(src, dst).await?;
    if let Err(e) = fs::remove_file(src).await {
        warn!(src = %src.display(), "source left behind after copy: {}", e);
    }
    Ok(())
}

/// Copy `src` to `dst` through a temporary sibling of `dst`, leaving `src`
/// in place. Returns the bytes copied.
pub async fn copy_file_atomic(src: impl AsRef<Path>, dst: impl AsRef<Path>) -> MediaResult<u64> {
    let (src, dst) = (src.as_ref(), dst.as_ref());
    if !fs::try_exists(src).await.unwrap_or(false) {
        return Err(MediaError::FileNotFound(src.to_path_buf()));
    }
    ensure_parent(dst).await?;

    let part = temp_sibling(dst);
    let copied = async {
        let bytes = fs::copy(src, &part).await?;
        fs::rename(&part, dst).await?;
        Ok::<u64, std::io::Error>(bytes)
    }
    .await;

    copied.map_err(|e| {
        error!(src = %src.display(), dst = %dst.display(), "copy failed: {}", e);
        // Best effort; the part file may not exist yet.
        let _ = std::fs::remove_file(&part);
        MediaError::from(e)
    })
}

async fn ensure_parent(path: &Path) -> MediaResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => Ok(fs::create_dir_all(parent).await?),
        _ => Ok(()),
    }
}

/// `.<name>.<uuid>.part` next to `dst`.
fn temp_sibling(dst: &Path) -> PathBuf {
    let name = dst
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    dst.with_file_name(format!(".{}.{}.part", name, uuid::Uuid::new_v4()))
}

/// EXDEV is 18 on Linux and macOS.
fn is_cross_device_error(e: &std::io::Error) -> bool {
    e.raw_os_error() == Some(18)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_move_file_into_new_directory() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("final.mp4");
        let dst = dir.path().join("exports").join("job.mp4");

        fs::write(&src, b"video").await.unwrap();
        move_file(&src, &dst).await.unwrap();

        assert!(!src.exists());
        assert_eq!(fs::read(&dst).await.unwrap(), b"video");
    }

    #[tokio::test]
    async fn test_move_file_overwrites_destination() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("new.mp4");
        let dst = dir.path().join("old.mp4");

        fs::write(&src, b"new").await.unwrap();
        fs::write(&dst, b"old").await.unwrap();
        move_file(&src, &dst).await.unwrap();

        assert_eq!(fs::read(&dst).await.unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_copy_file_atomic_keeps_source() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("remote_out.mp4");
        let dst = dir.path().join("uploads").join("asset.mp4");

        fs::write(&src, b"12345").await.unwrap();
        let bytes = copy_file_atomic(&src, &dst).await.unwrap();

        assert_eq!(bytes, 5);
        assert!(src.exists());
        assert_eq!(fs::read(&dst).await.unwrap(), b"12345");

        let leftovers: Vec<_> = std::fs::read_dir(dst.parent().unwrap())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().ends_with(".part"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn test_copy_missing_source() {
        let dir = TempDir::new().unwrap();
        let result = copy_file_atomic(dir.path().join("gone.mp4"), dir.path().join("x.mp4")).await;
        assert!(matches!(result, Err(MediaError::FileNotFound(_))));
    }

    #[test]
    fn test_is_cross_device_error() {
        assert!(is_cross_device_error(&std::io::Error::from_raw_os_error(18)));
        assert!(!is_cross_device_error(&std::io::Error::from_raw_os_error(2)));
    }
}
