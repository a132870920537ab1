//! Attachment codec: format detection and data-URI encoding.
//!
//! Uploaded prescriptions and lab studies are kept inline in their JSON
//! record as `data:<mime>;base64,<payload>`. Only PDFs and images are
//! accepted.

use std::io::Read;
use std::path::Path;

use base64::Engine as _;
use thiserror::Error;

use crate::config::MAX_ATTACHMENT_BYTES;
use crate::models::StoredFile;

#[derive(Error, Debug)]
pub enum AttachmentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File too large: {size} bytes (max {max})")]
    TooLarge { size: u64, max: u64 },

    #[error("Unsupported file type: {0}")]
    Unsupported(String),

    #[error("Empty file")]
    Empty,

    #[error("Malformed data URI: {0}")]
    MalformedDataUri(String),

    #[error("Base64 decode failed: {0}")]
    Decode(#[from] base64::DecodeError),
}

/// Detect the mime type from magic bytes, falling back to the file name.
///
/// Only PDFs and images are accepted.
pub fn detect_mime(bytes: &[u8], file_name: &str) -> Result<String, AttachmentError> {
    let by_magic = match bytes {
        [0x25, 0x50, 0x44, 0x46, ..] => Some("application/pdf"),
        [0x89, 0x50, 0x4E, 0x47, ..] => Some("image/png"),
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        [0x47, 0x49, 0x46, 0x38, ..] => Some("image/gif"),
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => Some("image/webp"),
        _ => None,
    };
    if let Some(mime) = by_magic {
        return Ok(mime.to_string());
    }

    match mime_guess::from_path(file_name).first() {
        Some(mime)
            if mime.type_() == mime_guess::mime::IMAGE || mime.essence_str() == "application/pdf" =>
        {
            Ok(mime.essence_str().to_string())
        }
        Some(mime) => Err(AttachmentError::Unsupported(mime.essence_str().to_string())),
        None => Err(AttachmentError::Unsupported(file_name.to_string())),
    }
}

pub fn encode_data_uri(mime_type: &str, bytes: &[u8]) -> String {
    let payload = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{mime_type};base64,{payload}")
}

/// Split a base64 data URI into its mime type and decoded bytes.
pub fn decode_data_uri(uri: &str) -> Result<(String, Vec<u8>), AttachmentError> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| AttachmentError::MalformedDataUri("missing data: prefix".into()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| AttachmentError::MalformedDataUri("missing payload separator".into()))?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or_else(|| AttachmentError::MalformedDataUri("only base64 payloads are supported".into()))?;
    let bytes = base64::engine::general_purpose::STANDARD.decode(payload)?;
    let mime = if mime.is_empty() {
        "application/octet-stream".to_string()
    } else {
        mime.to_string()
    };
    Ok((mime, bytes))
}

/// Validate and encode raw upload bytes.
pub fn store_bytes(file_name: &str, bytes: &[u8]) -> Result<StoredFile, AttachmentError> {
    if bytes.is_empty() {
        return Err(AttachmentError::Empty);
    }
    let size = bytes.len() as u64;
    if size > MAX_ATTACHMENT_BYTES {
        return Err(AttachmentError::TooLarge {
            size,
            max: MAX_ATTACHMENT_BYTES,
        });
    }
    let mime_type = detect_mime(bytes, file_name)?;
    Ok(StoredFile {
        file_name: file_name.to_string(),
        mime_type: mime_type.clone(),
        size,
        data_uri: encode_data_uri(&mime_type, bytes),
    })
}

/// Read a file from disk, refusing oversize files before reading them.
pub fn read_upload(path: &Path) -> Result<(String, Vec<u8>), AttachmentError> {
    let metadata = std::fs::metadata(path)?;
    if metadata.len() > MAX_ATTACHMENT_BYTES {
        return Err(AttachmentError::TooLarge {
            size: metadata.len(),
            max: MAX_ATTACHMENT_BYTES,
        });
    }
    let mut bytes = Vec::with_capacity(metadata.len() as usize);
    std::fs::File::open(path)?.read_to_end(&mut bytes)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "archivo".to_string());
    Ok((name, bytes))
}
