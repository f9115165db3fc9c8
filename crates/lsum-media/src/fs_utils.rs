//! Filesystem helpers for atomic output replacement.
//!
//! Outputs are written to a hidden temporary sibling first and then moved
//! over the final path, so readers never observe a half-written file.

use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

use crate::error::{MediaError, MediaResult};

/// Hidden temporary path next to `path`, keeping its extension.
///
/// FFmpeg picks the container from the extension, so
/// `out/summary.mp4` becomes `out/.summary.<uuid>.tmp.mp4`.
pub fn temp_sibling(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let name = match path.extension() {
        Some(ext) => format!(".{}.{}.tmp.{}", stem, Uuid::new_v4(), ext.to_string_lossy()),
        None => format!(".{}.{}.tmp", stem, Uuid::new_v4()),
    };
    path.with_file_name(name)
}

/// Remove a file, treating absence as success. Returns whether a file was removed.
pub async fn remove_if_exists(path: &Path) -> MediaResult<bool> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(MediaError::from(e)),
    }
}

/// Fail with [`MediaError::MissingOutput`] unless `path` is a non-empty file.
pub async fn ensure_non_empty(path: &Path) -> MediaResult<u64> {
    match fs::metadata(path).await {
        Ok(meta) if meta.is_file() && meta.len() > 0 => Ok(meta.len()),
        Ok(_) => Err(MediaError::MissingOutput(path.to_path_buf())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(MediaError::MissingOutput(path.to_path_buf()))
        }
        Err(e) => Err(MediaError::from(e)),
    }
}

/// Move a file from `src` to `dst`, handling cross-device moves.
///
/// Tries a rename first. On EXDEV it copies to a temporary sibling of
/// `dst` and renames that into place, then deletes `src`.
pub async fn move_file(src: impl AsRef<Path>, dst: impl AsRef<Path>) -> MediaResult<()> {
    let src = src.as_ref();
    let dst = dst.as_ref();

    if let Some(parent) = dst.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }

    match fs::rename(src, dst).await {
        Ok(()) => Ok(()),
        Err(e) if is_cross_device_error(&e) => {
            tracing::debug!(
                src = %src.display(),
                dst = %dst.display(),
                "Cross-device rename, falling back to copy"
            );
            copy_and_delete(src, dst).await
        }
        Err(e) => Err(MediaError::from(e)),
    }
}

/// EXDEV is error code 18 on Linux and macOS.
fn is_cross_device_error(e: &std::io::Error) -> bool {
    e.raw_os_error() == Some(18)
}

async fn copy_and_delete(src: &Path, dst: &Path) -> MediaResult<()> {
    let tmp_dst = temp_sibling(dst);

    fs::copy(src, &tmp_dst).await?;

    if let Err(e) = fs::rename(&tmp_dst, dst).await {
        let _ = fs::remove_file(&tmp_dst).await;
        return Err(MediaError::from(e));
    }

    if let Err(e) = fs::remove_file(src).await {
        tracing::warn!(
            src = %src.display(),
            "Failed to remove source after cross-device move: {}",
            e
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_temp_sibling_keeps_directory_and_extension() {
        let tmp = temp_sibling(Path::new("/data/summary.mp4"));
        assert_eq!(tmp.parent(), Some(Path::new("/data")));
        assert_eq!(tmp.extension().and_then(|e| e.to_str()), Some("mp4"));

        let name = tmp.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with(".summary."));
        assert!(name.ends_with(".tmp.mp4"));
        assert_ne!(tmp, temp_sibling(Path::new("/data/summary.mp4")));
    }

    #[tokio::test]
    async fn test_move_file_overwrites_destination() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("source.mp4");
        let dst = dir.path().join("dest.mp4");

        fs::write(&src, b"new content").await.unwrap();
        fs::write(&dst, b"old content").await.unwrap();

        move_file(&src, &dst).await.unwrap();

        assert!(!src.exists());
        assert_eq!(fs::read_to_string(&dst).await.unwrap(), "new content");
    }

    #[tokio::test]
    async fn test_move_file_to_subdirectory() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("source.mp4");
        let dst = dir.path().join("lecture_1").join("part_0.mp4");

        fs::write(&src, b"content").await.unwrap();
        move_file(&src, &dst).await.unwrap();

        assert!(dst.exists());
    }

    #[tokio::test]
    async fn test_remove_if_exists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("summary.mp4");

        assert!(!remove_if_exists(&path).await.unwrap());
        fs::write(&path, b"x").await.unwrap();
        assert!(remove_if_exists(&path).await.unwrap());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_ensure_non_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("part_0.mp4");

        assert!(matches!(
            ensure_non_empty(&path).await,
            Err(MediaError::MissingOutput(_))
        ));
        fs::write(&path, b"").await.unwrap();
        assert!(matches!(
            ensure_non_empty(&path).await,
            Err(MediaError::MissingOutput(_))
        ));
        fs::write(&path, b"data").await.unwrap();
        assert_eq!(ensure_non_empty(&path).await.unwrap(), 4);
    }

    #[test]
    fn test_is_cross_device_error() {
        assert!(is_cross_device_error(&std::io::Error::from_raw_os_error(18)));
        assert!(!is_cross_device_error(&std::io::Error::from_raw_os_error(2)));
    }
}
