use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::stored_file::StoredFile;

/// Study type recorded when the user leaves it blank.
pub const DEFAULT_STUDY_TYPE: &str = "Estudio";

/// An uploaded lab study (blood work, imaging report, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabStudy {
    pub id: Uuid,
    pub uploaded_at: DateTime<Utc>,
    pub study_type: String,
    #[serde(default)]
    pub lab_name: String,
    #[serde(default)]
    pub study_date: Option<NaiveDate>,
    #[serde(flatten)]
    pub file: StoredFile,
}
