use base64::{engine::general_purpose::STANDARD, Engine};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::PathBuf;

use crate::constants::RECIPE_IMAGE_DIR;
use crate::error::{AppError, Result, ValidationErrors};

/// Storage for uploaded recipe images
///
/// Returns the reference that is persisted on the recipe.
pub trait ImageStore: Send + Sync {
    fn store(&self, payload: &[u8]) -> Result<String>;
}

/// Content-addressed image store on the local filesystem
///
/// Files are named after the SHA-256 of their bytes, so storing the same
/// payload twice yields the same reference and writes only once.
#[derive(Debug, Clone)]
pub struct FsImageStore {
    root: PathBuf,
}

impl FsImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Absolute location of a reference returned by [`ImageStore::store`]
    pub fn resolve(&self, reference: &str) -> PathBuf {
        self.root.join(reference)
    }
}

/// Bytes of a submitted image
///
/// `data:<mime>;base64,<data>` URLs are decoded; any other payload is taken
/// as the image bytes verbatim.
pub fn decode_image(payload: &str) -> Result<Vec<u8>> {
    let Some(encoded) = payload
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(";base64,"))
        .map(|(_, data)| data)
    else {
        return Ok(payload.as_bytes().to_vec());
    };

    STANDARD.decode(encoded.trim()).map_err(|e| {
        tracing::warn!("Rejected image payload: {}", e);
        AppError::Validation(ValidationErrors::single(
            "image",
            "Upload a valid base64-encoded image",
        ))
    })
}

/// Hex SHA-256 digest of an image payload
pub fn image_digest(payload: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload);
    hex::encode(hasher.finalize())
}

impl ImageStore for FsImageStore {
    fn store(&self, payload: &[u8]) -> Result<String> {
        let digest = image_digest(payload);
        let reference = format!("{}/{}", RECIPE_IMAGE_DIR, digest);
        let path = self.resolve(&reference);

        if !path.exists() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, payload)?;
            tracing::debug!("Stored image {} ({} bytes)", reference, payload.len());
        }

        Ok(reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_image_digest() {
        assert_eq!(
            image_digest(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_decode_image() {
        assert_eq!(
            decode_image("data:image/png;base64,iVBORw0KGgo=").unwrap(),
            vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]
        );
        assert_eq!(decode_image("raw-bytes").unwrap(), b"raw-bytes");

        let err = decode_image("data:image/png;base64,%%%").unwrap_err();
        assert!(err.validation_errors().unwrap().contains("image"));
    }

    #[test]
    fn test_store_is_content_addressed() {
        let temp_dir = TempDir::new().unwrap();
        let store = FsImageStore::new(temp_dir.path());

        let first = store.store(b"png-bytes").unwrap();
        let second = store.store(b"png-bytes").unwrap();
        let other = store.store(b"other-bytes").unwrap();

        assert_eq!(first, second);
        assert_ne!(first, other);
        assert!(first.starts_with("recipes/"));
        assert_eq!(fs::read(store.resolve(&first)).unwrap(), b"png-bytes");
    }
}
