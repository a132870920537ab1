//! Lab study records.

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::attachment;
use crate::db::{Collection, RecordStore};
use crate::error::{AppError, AppResult};
use crate::models::lab::DEFAULT_STUDY_TYPE;
use crate::models::LabStudy;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabStudyMeta {
    pub study_type: Option<String>,
    pub lab_name: Option<String>,
    pub study_date: Option<NaiveDate>,
}

pub fn upload_lab_study(
    store: &RecordStore,
    meta: &LabStudyMeta,
    file_name: &str,
    bytes: &[u8],
    now: DateTime<Utc>,
) -> AppResult<LabStudy> {
    let file = attachment::store_bytes(file_name, bytes)?;
    let study_type = meta
        .study_type
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_STUDY_TYPE)
        .to_string();
    let study = LabStudy {
        id: Uuid::new_v4(),
        uploaded_at: now,
        study_type,
        lab_name: meta.lab_name.as_deref().unwrap_or_default().trim().to_string(),
        study_date: meta.study_date,
        file,
    };
    let mut studies = list_lab_studies(store);
    studies.insert(0, study.clone());
    store.save(Collection::LabStudies, &studies)?;
    tracing::info!(id = %study.id, study_type = %study.study_type, "Lab study uploaded");
    Ok(study)
}

/// All lab studies, most recent first.
pub fn list_lab_studies(store: &RecordStore) -> Vec<LabStudy> {
    store.load(Collection::LabStudies)
}

pub fn delete_lab_study(store: &RecordStore, id: Uuid) -> AppResult<()> {
    let mut studies = list_lab_studies(store);
    let before = studies.len();
    studies.retain(|s| s.id != id);
    if studies.len() == before {
        return Err(AppError::not_found("LabStudy", id));
    }
    store.save(Collection::LabStudies, &studies)?;
    tracing::info!(id = %id, "Lab study deleted");
    Ok(())
}

/// Decode a study's attachment and write it under `dest_dir` with its
/// original file name. Returns the written path.
pub fn export_lab_study(store: &RecordStore, id: Uuid, dest_dir: &Path) -> AppResult<PathBuf> {
    let study = list_lab_studies(store)
        .into_iter()
        .find(|s| s.id == id)
        .ok_or_else(|| AppError::not_found("LabStudy", id))?;
    let (_, bytes) = attachment::decode_data_uri(&study.file.data_uri)?;

    // Only the final path component of the stored name is used.
    let name = Path::new(&study.file.file_name)
        .file_name()
        .map(|n| n.to_owned())
        .unwrap_or_else(|| format!("{id}.bin").into());
    let path = dest_dir.join(name);
    std::fs::write(&path, &bytes)?;
    tracing::info!(id = %id, path = %path.display(), bytes = bytes.len(), "Lab study exported");
    Ok(path)
}
