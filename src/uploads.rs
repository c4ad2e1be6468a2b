// Local directory holding uploaded image files.

use std::io;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// URL prefix under which stored files are served.
pub const PUBLIC_PREFIX: &str = "/uploads";

#[derive(Debug, Clone)]
pub struct UploadsDir {
    root: PathBuf,
}

impl UploadsDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the directory (and any missing parents) if it does not exist yet.
    pub fn ensure_exists(&self) -> io::Result<()> {
        std::fs::create_dir_all(&self.root)
    }

    /// Generates a fresh file name that keeps the extension of `original_name`.
    /// Dotfiles (`.bashrc`) and trailing dots (`photo.`) have no extension.
    pub fn generate_filename(original_name: &str) -> String {
        let id = Uuid::new_v4();
        match Path::new(original_name).extension().and_then(|ext| ext.to_str()) {
            Some(ext) if !ext.is_empty() => format!("{}.{}", id, ext),
            _ => id.to_string(),
        }
    }

    pub fn public_path(filename: &str) -> String {
        format!("{}/{}", PUBLIC_PREFIX, filename)
    }

    pub fn file_path(&self, filename: &str) -> PathBuf {
        self.root.join(filename)
    }

    /// Writes `data` to `filename` and flushes it to disk.
    /// A partially written file is removed before the error is returned.
    pub async fn save(&self, filename: &str, data: &[u8]) -> io::Result<PathBuf> {
        let path = self.file_path(filename);

        let result = async {
            let mut file = tokio::fs::File::create(&path).await?;
            file.write_all(data).await?;
            file.sync_all().await
        }
        .await;

        if let Err(e) = result {
            if let Err(cleanup_err) = tokio::fs::remove_file(&path).await {
                if cleanup_err.kind() != io::ErrorKind::NotFound {
                    tracing::warn!(
                        path = %path.display(),
                        "Failed to remove partially written upload: {}",
                        cleanup_err
                    );
                }
            }
            return Err(e);
        }

        Ok(path)
    }

    pub async fn remove(&self, filename: &str) -> io::Result<()> {
        tokio::fs::remove_file(self.file_path(filename)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_filename_keeps_extension() {
        let name = UploadsDir::generate_filename("cat.png");
        assert!(name.ends_with(".png"));
        let stem = name.trim_end_matches(".png");
        assert!(Uuid::parse_str(stem).is_ok());
    }

    #[test]
    fn test_generate_filename_without_extension() {
        let name = UploadsDir::generate_filename("README");
        assert!(Uuid::parse_str(&name).is_ok());
    }

    #[test]
    fn test_generate_filename_dotfile_and_trailing_dot() {
        for original in [".bashrc", "photo."] {
            let name = UploadsDir::generate_filename(original);
            assert!(Uuid::parse_str(&name).is_ok(), "{} -> {}", original, name);
        }
    }

    #[test]
    fn test_generate_filename_is_unique() {
        assert_ne!(
            UploadsDir::generate_filename("a.jpg"),
            UploadsDir::generate_filename("a.jpg")
        );
    }

    #[test]
    fn test_generate_filename_ignores_directories() {
        let name = UploadsDir::generate_filename("../../etc/photo.jpeg");
        assert!(!name.contains('/'));
        assert!(name.ends_with(".jpeg"));
    }

    #[test]
    fn test_public_path() {
        assert_eq!(UploadsDir::public_path("x.png"), "/uploads/x.png");
    }

    #[test]
    fn test_ensure_exists_creates_nested_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let uploads = UploadsDir::new(tmp.path().join("a").join("b"));
        uploads.ensure_exists().unwrap();
        assert!(uploads.root().is_dir());
        // Idempotent
        uploads.ensure_exists().unwrap();
    }

    #[tokio::test]
    async fn test_save_and_remove() {
        let tmp = tempfile::tempdir().unwrap();
        let uploads = UploadsDir::new(tmp.path());

        let path = uploads.save("x.bin", b"hello").await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"hello");

        uploads.remove("x.bin").await.unwrap();
        assert!(!path.exists());
        assert!(uploads.remove("x.bin").await.is_err());
    }

    #[tokio::test]
    async fn test_save_into_missing_dir_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let uploads = UploadsDir::new(tmp.path().join("missing"));

        assert!(uploads.save("x.bin", b"hello").await.is_err());
        assert!(!uploads.file_path("x.bin").exists());
    }
}
