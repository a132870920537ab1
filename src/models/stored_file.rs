use serde::{Deserialize, Serialize};

/// An uploaded file kept inline as a data URI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredFile {
    pub file_name: String,
    pub mime_type: String,
    /// Size of the decoded file in bytes.
    pub size: u64,
    pub data_uri: String,
}

impl StoredFile {
    /// Human-readable size in megabytes.
    pub fn size_label(&self) -> String {
        format!("{:.2} MB", self.size as f64 / 1024.0 / 1024.0)
    }
}
