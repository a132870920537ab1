use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use super::enums::{Regimen, Weekday};
use super::schedule::WeekdaySet;
use super::stored_file::StoredFile;
use crate::config::MAX_TIMES_PER_DAY;

/// A saved prescription record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prescription {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub doctor: Option<String>,
    #[serde(default)]
    pub clinic: Option<String>,
    /// Free text, e.g. "30 días".
    #[serde(default)]
    pub validity_text: Option<String>,
    /// Issue date written on the prescription.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(flatten)]
    pub content: PrescriptionContent,
}

/// Either an opaque attachment or structured dosing entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PrescriptionContent {
    File {
        #[serde(flatten)]
        file: StoredFile,
    },
    Manual {
        medications: Vec<DosingEntry>,
    },
}

impl Prescription {
    pub fn kind(&self) -> &'static str {
        match self.content {
            PrescriptionContent::File { .. } => "file",
            PrescriptionContent::Manual { .. } => "manual",
        }
    }

    pub fn medications(&self) -> &[DosingEntry] {
        match &self.content {
            PrescriptionContent::Manual { medications } => medications,
            PrescriptionContent::File { .. } => &[],
        }
    }

    pub fn file(&self) -> Option<&StoredFile> {
        match &self.content {
            PrescriptionContent::File { file } => Some(file),
            PrescriptionContent::Manual { .. } => None,
        }
    }
}

fn times_per_day_from_any<'de, D: Deserializer<'de>>(d: D) -> Result<u8, D::Error> {
    i64::deserialize(d).map(DosingEntry::clamp_times_per_day)
}

fn day_of_month_from_any<'de, D: Deserializer<'de>>(d: D) -> Result<u8, D::Error> {
    i64::deserialize(d).map(DosingEntry::clamp_day_of_month)
}

/// One medication line on a manual prescription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DosingEntry {
    pub name: String,
    pub dose: String,
    pub regimen: Regimen,
    /// Daily regimen only, 1–6.
    #[serde(deserialize_with = "times_per_day_from_any")]
    pub times_per_day: u8,
    /// Daily regimen only.
    pub active_weekdays: WeekdaySet,
    /// Weekly regimen only.
    pub weekday: Weekday,
    /// Monthly regimen only, 1–31.
    #[serde(deserialize_with = "day_of_month_from_any")]
    pub day_of_month: u8,
    pub auto_reminder: bool,
}

impl Default for DosingEntry {
    fn default() -> Self {
        Self {
            name: String::new(),
            dose: String::new(),
            regimen: Regimen::Daily,
            times_per_day: 1,
            active_weekdays: WeekdaySet::all(),
            weekday: Weekday::Monday,
            day_of_month: 1,
            auto_reminder: false,
        }
    }
}

impl DosingEntry {
    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }

    /// Trims text fields and clamps counts into their allowed ranges.
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.dose = self.dose.trim().to_string();
        self.times_per_day = Self::clamp_times_per_day(i64::from(self.times_per_day));
        self.day_of_month = Self::clamp_day_of_month(i64::from(self.day_of_month));
        self
    }

    pub fn clamp_times_per_day(n: i64) -> u8 {
        n.clamp(1, MAX_TIMES_PER_DAY as i64) as u8
    }

    pub fn clamp_day_of_month(n: i64) -> u8 {
        n.clamp(1, 31) as u8
    }

    /// One-line summary: name, dose, regimen and frequency.
    pub fn summary(&self) -> String {
        let mut out = self.name.clone();
        if !self.dose.is_empty() {
            out.push_str(&format!(" \u{2014} {}", self.dose));
        }
        match self.regimen {
            Regimen::Daily => {
                out.push_str(&format!(" · Diario · {}×", self.times_per_day));
                if self.active_weekdays != WeekdaySet::all() {
                    out.push_str(&format!(" ({})", self.active_weekdays));
                }
            }
            Regimen::Weekly => out.push_str(&format!(" · Semanal ({})", self.weekday.label())),
            Regimen::Monthly => out.push_str(&format!(" · Mensual (día {})", self.day_of_month)),
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn manual(medications: Vec<DosingEntry>) -> Prescription {
        Prescription {
            id: Uuid::new_v4(),
            created_at: Utc.with_ymd_and_hms(2026, 2, 1, 9, 0, 0).unwrap(),
            doctor: Some("Dra. López".into()),
            clinic: None,
            validity_text: Some("30 días".into()),
            date: NaiveDate::from_ymd_opt(2026, 2, 1),
            content: PrescriptionContent::Manual { medications },
        }
    }

    #[test]
    fn normalization_clamps_ranges() {
        let entry = DosingEntry {
            name: "  Amoxicilina ".into(),
            times_per_day: 9,
            day_of_month: 0,
            ..Default::default()
        }
        .normalized();
        assert_eq!(entry.name, "Amoxicilina");
        assert_eq!(entry.times_per_day, 6);
        assert_eq!(entry.day_of_month, 1);

        let entry = DosingEntry {
            times_per_day: 0,
            day_of_month: 45,
            ..Default::default()
        }
        .normalized();
        assert_eq!(entry.times_per_day, 1);
        assert_eq!(entry.day_of_month, 31);
    }

    #[test]
    fn default_entry_is_daily_every_day() {
        let entry = DosingEntry::default();
        assert_eq!(entry.regimen, Regimen::Daily);
        assert_eq!(entry.active_weekdays, WeekdaySet::all());
        assert!(!entry.has_name());
    }

    #[test]
    fn summaries_per_regimen() {
        let daily = DosingEntry {
            name: "Paracetamol".into(),
            dose: "500 mg".into(),
            times_per_day: 3,
            ..Default::default()
        };
        assert_eq!(daily.summary(), "Paracetamol \u{2014} 500 mg · Diario · 3×");

        let weekly = DosingEntry {
            name: "Alendronato".into(),
            regimen: Regimen::Weekly,
            weekday: Weekday::Wednesday,
            ..Default::default()
        };
        assert_eq!(weekly.summary(), "Alendronato · Semanal (Mié)");

        let monthly = DosingEntry {
            name: "Vitamina D".into(),
            regimen: Regimen::Monthly,
            day_of_month: 15,
            ..Default::default()
        };
        assert_eq!(monthly.summary(), "Vitamina D · Mensual (día 15)");
    }

    #[test]
    fn manual_prescription_json_shape() {
        let p = manual(vec![DosingEntry {
            name: "Paracetamol".into(),
            ..Default::default()
        }]);
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["kind"], "manual");
        assert_eq!(json["medications"][0]["regimen"], "daily");
        assert_eq!(json["medications"][0]["timesPerDay"], 1);
        let back: Prescription = serde_json::from_value(json).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn file_prescription_json_shape() {
        let mut p = manual(vec![]);
        p.content = PrescriptionContent::File {
            file: StoredFile {
                file_name: "receta.pdf".into(),
                mime_type: "application/pdf".into(),
                size: 4,
                data_uri: "data:application/pdf;base64,JVBERg==".into(),
            },
        };
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["kind"], "file");
        assert_eq!(json["fileName"], "receta.pdf");
        assert_eq!(p.kind(), "file");
        assert!(p.medications().is_empty());
        let back: Prescription = serde_json::from_value(json).unwrap();
        assert_eq!(back.file().unwrap().file_name, "receta.pdf");
    }

    #[test]
    fn sparse_dosing_entry_uses_defaults() {
        let entry: DosingEntry = serde_json::from_str(r#"{"name":"Omeprazol"}"#).unwrap();
        assert_eq!(entry.times_per_day, 1);
        assert_eq!(entry.active_weekdays, WeekdaySet::all());
        assert!(!entry.auto_reminder);
    }

    #[test]
    fn out_of_range_counts_deserialize_clamped() {
        let entry: DosingEntry =
            serde_json::from_str(r#"{"name":"X","timesPerDay":300,"dayOfMonth":400}"#).unwrap();
        assert_eq!(entry.times_per_day, 6);
        assert_eq!(entry.day_of_month, 31);

        let entry: DosingEntry =
            serde_json::from_str(r#"{"name":"X","timesPerDay":-1,"dayOfMonth":0}"#).unwrap();
        assert_eq!(entry.times_per_day, 1);
        assert_eq!(entry.day_of_month, 1);
    }
}
