//! Utility functions for file naming and atomic file writes

use std::path::{Path, PathBuf};

/// Extensions kept as-is; anything else is saved as `.jpg`
const ALLOWED_EXTENSIONS: &[&str] = &[".jpg", ".png"];

/// Extension used when the URL has none or an unsupported one
pub const FALLBACK_EXTENSION: &str = ".jpg";

/// Derive the file extension (including the dot) to save an image URL under
///
/// The extension starts at the last `.` of the URL and ends before the first `?`.
/// The comparison is case-sensitive, so `.PNG` and `.jpeg` fall back to `.jpg`.
///
/// # Examples
///
/// ```
/// use wallpaper_dl::utils::image_extension;
///
/// assert_eq!(image_extension("http://x/a.png?w=1"), ".png");
/// assert_eq!(image_extension("http://x/a.PNG"), ".jpg");
/// assert_eq!(image_extension("http://x/a"), ".jpg");
/// assert_eq!(image_extension("http://x/a.gif?x=2"), ".jpg");
/// ```
#[must_use]
pub fn image_extension(url: &str) -> &'static str {
    let candidate = match (url.rfind('.'), url.find('?')) {
        (None, _) => "",
        // A query before the last dot leaves the slice running to the end of the URL
        (Some(dot_pos), Some(query_pos)) if query_pos > dot_pos => &url[dot_pos..query_pos],
        (Some(dot_pos), _) => &url[dot_pos..],
    };

    ALLOWED_EXTENSIONS
        .iter()
        .find(|&&ext| ext == candidate)
        .copied()
        .unwrap_or(FALLBACK_EXTENSION)
}

/// Sequential file name for the `index`-th image (1-based)
#[must_use]
pub fn numbered_filename(index: usize, url: &str) -> String {
    format!("{}{}", index, image_extension(url))
}

/// Sibling path a download is staged in before being renamed into place
///
/// `downloads/1.jpg` becomes `downloads/.1.jpg.part`.
#[must_use]
pub fn staging_path(destination: &Path) -> PathBuf {
    let name = destination
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "download".to_string());
    destination.with_file_name(format!(".{}.part", name))
}

/// Write `contents` to `destination` via a staging file and rename
///
/// Existing content at `destination` is replaced. On failure the staging file is
/// removed and `destination` is left untouched.
pub async fn write_atomic(destination: &Path, contents: &[u8]) -> std::io::Result<()> {
    let staging = staging_path(destination);

    let result = async {
        tokio::fs::write(&staging, contents).await?;
        tokio::fs::rename(&staging, destination).await
    }
    .await;

    if let Err(e) = result {
        if let Err(cleanup_err) = tokio::fs::remove_file(&staging).await
            && cleanup_err.kind() != std::io::ErrorKind::NotFound
        {
            tracing::debug!(
                path = %staging.display(),
                error = %cleanup_err,
                "Failed to remove staging file"
            );
        }
        return Err(e);
    }

    Ok(())
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // image_extension
    // =========================================================================

    #[test]
    fn extension_strips_query_string() {
        assert_eq!(image_extension("http://x/a.png?w=1"), ".png");
        assert_eq!(image_extension("http://x/a.jpg?w=1&h=2"), ".jpg");
    }

    #[test]
    fn extension_is_case_sensitive() {
        assert_eq!(image_extension("http://x/a.PNG"), ".jpg");
        assert_eq!(image_extension("http://x/a.Jpg"), ".jpg");
    }

    #[test]
    fn extension_without_dot_falls_back() {
        assert_eq!(image_extension("a"), ".jpg");
        assert_eq!(image_extension(""), ".jpg");
    }

    #[test]
    fn extension_outside_allow_list_falls_back() {
        assert_eq!(image_extension("http://x/a.gif?x=2"), ".jpg");
        assert_eq!(image_extension("http://x/a.jpeg"), ".jpg");
        assert_eq!(image_extension("http://x/a.webp"), ".jpg");
    }

    #[test]
    fn extension_uses_last_dot() {
        // The last dot belongs to the host, not the path
        assert_eq!(image_extension("http://cdn.example.com/image"), ".jpg");
        assert_eq!(image_extension("http://x/archive.tar.png"), ".png");
    }

    #[test]
    fn extension_with_query_before_last_dot_runs_to_end() {
        assert_eq!(image_extension("http://x/a?f=b.png"), ".png");
        assert_eq!(image_extension("http://x/a?f=b.png&s=1"), ".jpg");
    }

    #[test]
    fn extension_with_empty_slice_falls_back() {
        assert_eq!(image_extension("http://x/a.?w=1"), ".jpg");
    }

    #[test]
    fn numbered_filename_combines_index_and_extension() {
        assert_eq!(numbered_filename(1, "http://h/x.jpg"), "1.jpg");
        assert_eq!(numbered_filename(2, "http://h/y.png?v=2"), "2.png");
        assert_eq!(numbered_filename(10, "http://h/z"), "10.jpg");
    }

    // =========================================================================
    // staging / atomic writes
    // =========================================================================

    #[test]
    fn staging_path_is_hidden_sibling() {
        let staging = staging_path(Path::new("downloads/1.jpg"));
        assert_eq!(staging, PathBuf::from("downloads/.1.jpg.part"));
    }

    #[tokio::test]
    async fn write_atomic_creates_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("1.jpg");

        write_atomic(&dest, b"first version").await.unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"first version");

        write_atomic(&dest, b"second").await.unwrap();
        assert_eq!(
            std::fs::read(&dest).unwrap(),
            b"second",
            "existing content should be fully replaced"
        );
        assert!(
            !staging_path(&dest).exists(),
            "staging file should not survive a successful write"
        );
    }

    #[tokio::test]
    async fn write_atomic_into_missing_directory_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("missing").join("1.jpg");

        let result = write_atomic(&dest, b"data").await;

        assert!(result.is_err(), "write into missing directory should fail");
        assert!(!dest.exists());
        assert!(!staging_path(&dest).exists());
    }
}
