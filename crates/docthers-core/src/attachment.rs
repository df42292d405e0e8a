//! Image attachments picked from the local filesystem.

use std::path::Path;
use std::sync::Arc;

use crate::error::AttachmentError;

/// Extensions accepted by the picker, with the MIME type sent for each.
const IMAGE_TYPES: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("bmp", "image/bmp"),
    ("svg", "image/svg+xml"),
    ("tif", "image/tiff"),
    ("tiff", "image/tiff"),
    ("ico", "image/x-icon"),
    ("heic", "image/heic"),
    ("avif", "image/avif"),
];

/// A single image ready to be sent. Cloning shares the bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    file_name: String,
    mime_type: &'static str,
    data: Arc<[u8]>,
}

impl Attachment {
    /// Read an image file. Anything that is not an image type is rejected.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, AttachmentError> {
        let path = path.as_ref();

        let mime_type = mime_for_path(path).ok_or_else(|| AttachmentError::NotAnImage {
            path: path.to_path_buf(),
        })?;

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| AttachmentError::NoFileName {
                path: path.to_path_buf(),
            })?
            .to_string();

        let data = std::fs::read(path).map_err(|source| AttachmentError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self {
            file_name,
            mime_type,
            data: data.into(),
        })
    }

    /// Build an attachment from bytes already in memory.
    pub fn from_bytes(
        file_name: impl Into<String>,
        data: impl Into<Vec<u8>>,
    ) -> Result<Self, AttachmentError> {
        let file_name = file_name.into();
        let mime_type =
            mime_for_path(Path::new(&file_name)).ok_or_else(|| AttachmentError::NotAnImage {
                path: file_name.clone().into(),
            })?;

        let data: Vec<u8> = data.into();
        Ok(Self {
            file_name,
            mime_type,
            data: data.into(),
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn mime_type(&self) -> &'static str {
        self.mime_type
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    IMAGE_TYPES
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, mime)| *mime)
}
