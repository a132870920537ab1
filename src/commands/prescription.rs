use chrono::Utc;

use super::{resolve_id, short_id, Output};
use crate::attachment;
use crate::cli::{PrescriptionCommand, PrescriptionMetaArgs};
use crate::db::RecordStore;
use crate::error::{AppError, AppResult};
use crate::models::{DosingEntry, Prescription, Regimen, Weekday, WeekdaySet};
use crate::prescriptions::{self, PrescriptionDraft, PrescriptionMeta};

pub fn execute(store: &RecordStore, command: PrescriptionCommand, out: Output) -> AppResult<()> {
    match command {
        PrescriptionCommand::Add {
            date,
            meta,
            medications,
        } => {
            let medications = medications
                .iter()
                .map(|spec| parse_med_spec(spec).map_err(AppError::validation))
                .collect::<AppResult<Vec<_>>>()?;
            let draft = PrescriptionDraft {
                meta: to_meta(meta, Some(date)),
                medications,
            };
            let outcome = prescriptions::save_manual_prescription(store, &draft, Utc::now())?;
            out.emit(&outcome.prescription, || {
                let mut lines = vec![format!("Receta guardada: {}", describe(&outcome.prescription))];
                lines.extend(outcome.confirmation.clone());
                lines.extend(outcome.notices.iter().cloned());
                lines.join("\n")
            })
        }
        PrescriptionCommand::Upload { file, date, meta } => {
            let (name, bytes) = attachment::read_upload(&file)?;
            let prescription = prescriptions::upload_prescription_file(
                store,
                &to_meta(meta, date),
                &name,
                &bytes,
                Utc::now(),
            )?;
            out.emit(&prescription, || format!("Receta guardada: {}", describe(&prescription)))
        }
        PrescriptionCommand::List => {
            let all = prescriptions::list_prescriptions(store);
            out.emit(&all, || {
                if all.is_empty() {
                    return "No hay recetas.".to_string();
                }
                all.iter().map(describe).collect::<Vec<_>>().join("\n")
            })
        }
        PrescriptionCommand::Delete { id } => {
            let id = resolve_id(&prescriptions::list_prescriptions(store), &id, |p| p.id, "Prescription")?;
            prescriptions::delete_prescription(store, id)?;
            out.emit(&id, || format!("Receta {} eliminada", short_id(&id)))
        }
    }
}

fn to_meta(args: PrescriptionMetaArgs, date: Option<chrono::NaiveDate>) -> PrescriptionMeta {
    PrescriptionMeta {
        doctor: args.doctor,
        clinic: args.clinic,
        date,
        validity_text: args.validity,
    }
}

fn describe(p: &Prescription) -> String {
    let mut head = format!("[{}]", short_id(&p.id));
    if let Some(date) = p.date {
        head.push_str(&format!(" {date}"));
    }
    if let Some(doctor) = &p.doctor {
        head.push_str(&format!(" {doctor}"));
    }
    if let Some(clinic) = &p.clinic {
        head.push_str(&format!(" ({clinic})"));
    }
    if let Some(badge) = prescriptions::prescription_expiry(p, Utc::now()).label() {
        head.push_str(&format!(" · {badge}"));
    }
    match p.file() {
        Some(file) => format!("{head} · {} {}", file.file_name, file.size_label()),
        None => {
            let meds: Vec<String> = p.medications().iter().map(|m| format!("  - {}", m.summary())).collect();
            format!("{head}\n{}", meds.join("\n"))
        }
    }
}

/// Parse a `--med` value such as
/// `name=Metformina,dose=850 mg,regimen=daily,times=2,days=lu+mi+vi,auto`.
///
/// Weekday lists inside `days=` are joined with `+` since `,` separates fields.
pub fn parse_med_spec(spec: &str) -> Result<DosingEntry, String> {
    let mut entry = DosingEntry::default();
    for part in spec.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let Some((key, value)) = part.split_once('=') else {
            match part {
                "auto" => entry.auto_reminder = true,
                _ => return Err(format!("Unknown medication flag '{part}'")),
            }
            continue;
        };
        let value = value.trim();
        match key.trim() {
            "name" => entry.name = value.to_string(),
            "dose" => entry.dose = value.to_string(),
            "regimen" => entry.regimen = value.parse::<Regimen>().map_err(|e| format!("{e}"))?,
            "times" => {
                let times: i64 = value
                    .parse()
                    .map_err(|_| format!("Invalid times per day '{value}'"))?;
                entry.times_per_day = DosingEntry::clamp_times_per_day(times);
            }
            "days" => entry.active_weekdays = value.parse::<WeekdaySet>().map_err(|e| format!("{e}"))?,
            "weekday" => entry.weekday = value.parse::<Weekday>().map_err(|e| format!("{e}"))?,
            "day" => {
                let day: i64 = value
                    .parse()
                    .map_err(|_| format!("Invalid day of month '{value}'"))?;
                entry.day_of_month = DosingEntry::clamp_day_of_month(day);
            }
            "auto" => {
                entry.auto_reminder = matches!(value, "1" | "true" | "yes" | "si" | "sí")
            }
            other => return Err(format!("Unknown medication field '{other}'")),
        }
    }
    if !entry.has_name() {
        return Err(format!("Medication '{spec}' has no name"));
    }
    Ok(entry)
}
