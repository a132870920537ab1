//! Prescription records.
//!
//! A manual prescription and the reminders derived from it are written in one
//! batch, so the reminder collection never holds derived reminders for a
//! prescription that failed to save (or the reverse).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::attachment;
use crate::config::MAX_PRESCRIPTION_MEDICATIONS;
use crate::db::{Collection, RecordStore};
use crate::derive::derive_reminders;
use crate::error::{AppError, AppResult};
use crate::expiry::{prescription_days_remaining, ExpiryStatus};
use crate::models::{DosingEntry, Prescription, PrescriptionContent, Reminder};

/// Header fields shared by both prescription kinds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionMeta {
    pub doctor: Option<String>,
    pub clinic: Option<String>,
    pub date: Option<NaiveDate>,
    pub validity_text: Option<String>,
}

/// Input for a manually entered prescription.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionDraft {
    #[serde(flatten)]
    pub meta: PrescriptionMeta,
    pub medications: Vec<DosingEntry>,
}

/// What a manual save produced.
#[derive(Debug, Clone)]
pub struct SaveOutcome {
    pub prescription: Prescription,
    pub derived: Vec<Reminder>,
    pub notices: Vec<String>,
    pub confirmation: Option<String>,
}

fn clean(field: &Option<String>) -> Option<String> {
    field
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl PrescriptionMeta {
    fn cleaned(&self) -> Self {
        Self {
            doctor: clean(&self.doctor),
            clinic: clean(&self.clinic),
            date: self.date,
            validity_text: clean(&self.validity_text),
        }
    }
}

/// Validate a manual prescription, derive its reminders and persist both.
pub fn save_manual_prescription(
    store: &RecordStore,
    draft: &PrescriptionDraft,
    now: DateTime<Utc>,
) -> AppResult<SaveOutcome> {
    if draft.meta.date.is_none() {
        return Err(AppError::validation("Prescription date is required"));
    }
    let medications: Vec<DosingEntry> = draft
        .medications
        .iter()
        .filter(|m| m.has_name())
        .cloned()
        .map(DosingEntry::normalized)
        .collect();
    if medications.is_empty() {
        return Err(AppError::validation(
            "At least one medication with a name is required",
        ));
    }
    if medications.len() > MAX_PRESCRIPTION_MEDICATIONS {
        return Err(AppError::validation(format!(
            "At most {MAX_PRESCRIPTION_MEDICATIONS} medications per prescription"
        )));
    }

    let meta = draft.meta.cleaned();
    let derivation = derive_reminders(&medications, now);
    let prescription = Prescription {
        id: Uuid::new_v4(),
        created_at: now,
        doctor: meta.doctor,
        clinic: meta.clinic,
        validity_text: meta.validity_text,
        date: meta.date,
        content: PrescriptionContent::Manual { medications },
    };

    let mut prescriptions = list_prescriptions(store);
    prescriptions.insert(0, prescription.clone());
    let mut batch = store.batch().put(Collection::Prescriptions, &prescriptions)?;
    if !derivation.reminders.is_empty() {
        let mut reminders = derivation.reminders.clone();
        reminders.extend(store.load::<Reminder>(Collection::Reminders));
        batch = batch.put(Collection::Reminders, &reminders)?;
    }
    batch.commit()?;

    tracing::info!(
        id = %prescription.id,
        medications = prescription.medications().len(),
        derived = derivation.reminders.len(),
        "Manual prescription saved"
    );

    let confirmation = derivation.confirmation();
    Ok(SaveOutcome {
        prescription,
        derived: derivation.reminders,
        notices: derivation.notices,
        confirmation,
    })
}

/// Store an uploaded prescription document (PDF or image).
pub fn upload_prescription_file(
    store: &RecordStore,
    meta: &PrescriptionMeta,
    file_name: &str,
    bytes: &[u8],
    now: DateTime<Utc>,
) -> AppResult<Prescription> {
    let file = attachment::store_bytes(file_name, bytes)?;
    let meta = meta.cleaned();
    let prescription = Prescription {
        id: Uuid::new_v4(),
        created_at: now,
        doctor: meta.doctor,
        clinic: meta.clinic,
        validity_text: meta.validity_text,
        date: meta.date,
        content: PrescriptionContent::File { file },
    };
    let mut prescriptions = list_prescriptions(store);
    prescriptions.insert(0, prescription.clone());
    store.save(Collection::Prescriptions, &prescriptions)?;
    tracing::info!(id = %prescription.id, file = %file_name, "Prescription file uploaded");
    Ok(prescription)
}

/// All prescriptions, most recent first.
pub fn list_prescriptions(store: &RecordStore) -> Vec<Prescription> {
    store.load(Collection::Prescriptions)
}

/// Removes a prescription. Reminders derived from it are kept.
pub fn delete_prescription(store: &RecordStore, id: Uuid) -> AppResult<()> {
    let mut prescriptions = list_prescriptions(store);
    let before = prescriptions.len();
    prescriptions.retain(|p| p.id != id);
    if prescriptions.len() == before {
        return Err(AppError::not_found("Prescription", id));
    }
    store.save(Collection::Prescriptions, &prescriptions)?;
    tracing::info!(id = %id, "Prescription deleted");
    Ok(())
}

pub fn prescription_expiry(prescription: &Prescription, now: DateTime<Utc>) -> ExpiryStatus {
    ExpiryStatus::from_days(prescription_days_remaining(
        prescription.date,
        prescription.created_at,
        prescription.validity_text.as_deref(),
        now,
    ))
}
