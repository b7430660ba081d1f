/// Uploaded media naming, saving, and removal
///
/// Media lives under static directories served by the HTTP layer
/// (`uploads/` for avatars and images, `dictionary_videos/<category>/` for
/// instructional videos). Stored rows keep the public URL path; the file
/// on disk is the URL with its leading slash stripped.
///
/// Removal tolerates a file that is already gone: deleting a record whose
/// media was cleaned up out-of-band must still succeed.
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

/// Generates a unique media file name: `<owner>-<timestamp>-<suffix>`
///
/// The owner segment ties the file to the record that owns it; timestamp
/// and a short random suffix keep repeated uploads from colliding.
pub fn generate_media_name(owner: &str) -> String {
    let timestamp = Utc::now().timestamp_millis();
    let suffix = Uuid::new_v4().simple().to_string();

    format!("{}-{}-{}", owner, timestamp, &suffix[..8])
}

/// Resolves a stored media URL to its on-disk path
pub fn media_path(url: &str) -> PathBuf {
    PathBuf::from(url.trim_start_matches('/'))
}

/// Writes media bytes to a path, creating parent directories as needed
///
/// # Errors
///
/// Returns an error if directory creation or the write fails.
pub async fn save_media(path: &Path, bytes: &[u8]) -> Result<(), std::io::Error> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    tokio::fs::write(path, bytes).await?;
    debug!(path = %path.display(), size = bytes.len(), "Media file saved");

    Ok(())
}

/// Removes the file backing a stored media URL
///
/// A file that is already absent is not an error.
///
/// # Errors
///
/// Returns an error for any failure other than the file not existing.
pub async fn remove_media(url: &str) -> Result<(), std::io::Error> {
    let path = media_path(url);

    match tokio::fs::remove_file(&path).await {
        Ok(()) => {
            debug!(path = %path.display(), "Media file removed");
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_media_name_is_unique() {
        let a = generate_media_name("owner-1");
        let b = generate_media_name("owner-1");

        assert!(a.starts_with("owner-1-"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_media_path_strips_leading_slash() {
        let path = media_path("/uploads/avatars/a.png");
        assert_eq!(path, PathBuf::from("uploads/avatars/a.png"));
    }

    #[tokio::test]
    async fn test_save_and_remove_media() {
        let dir = std::env::temp_dir().join(format!("folio-storage-{}", Uuid::new_v4()));
        let path = dir.join("nested").join("file.bin");

        save_media(&path, b"payload").await.expect("Save should succeed");
        let read = tokio::fs::read(&path).await.expect("Read should succeed");
        assert_eq!(read, b"payload");

        tokio::fs::remove_file(&path).await.expect("Cleanup");
        tokio::fs::remove_dir_all(&dir).await.expect("Cleanup");
    }

    #[tokio::test]
    async fn test_remove_media_tolerates_absence() {
        let url = format!("/tmp/folio-missing-{}.bin", Uuid::new_v4());
        assert!(remove_media(&url).await.is_ok());
    }
}
