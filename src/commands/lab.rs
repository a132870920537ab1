use chrono::Utc;

use super::{resolve_id, short_id, Output};
use crate::attachment;
use crate::cli::LabCommand;
use crate::db::RecordStore;
use crate::error::AppResult;
use crate::labs::{self, LabStudyMeta};
use crate::models::LabStudy;

pub fn execute(store: &RecordStore, command: LabCommand, out: Output) -> AppResult<()> {
    match command {
        LabCommand::Upload {
            file,
            study_type,
            lab,
            date,
        } => {
            let (name, bytes) = attachment::read_upload(&file)?;
            let meta = LabStudyMeta {
                study_type,
                lab_name: lab,
                study_date: date,
            };
            let study = labs::upload_lab_study(store, &meta, &name, &bytes, Utc::now())?;
            out.emit(&study, || format!("Estudio guardado: {}", describe(&study)))
        }
        LabCommand::List => {
            let all = labs::list_lab_studies(store);
            out.emit(&all, || {
                if all.is_empty() {
                    return "No hay estudios.".to_string();
                }
                all.iter().map(describe).collect::<Vec<_>>().join("\n")
            })
        }
        LabCommand::Delete { id } => {
            let id = resolve_id(&labs::list_lab_studies(store), &id, |s| s.id, "LabStudy")?;
            labs::delete_lab_study(store, id)?;
            out.emit(&id, || format!("Estudio {} eliminado", short_id(&id)))
        }
        LabCommand::Export { id, dest } => {
            let id = resolve_id(&labs::list_lab_studies(store), &id, |s| s.id, "LabStudy")?;
            let path = labs::export_lab_study(store, id, &dest)?;
            out.emit(&path, || format!("Archivo escrito en {}", path.display()))
        }
    }
}

fn describe(study: &LabStudy) -> String {
    let mut line = format!("[{}] {}", short_id(&study.id), study.study_type);
    if !study.lab_name.is_empty() {
        line.push_str(&format!(" · {}", study.lab_name));
    }
    if let Some(date) = study.study_date {
        line.push_str(&format!(" · {date}"));
    }
    line.push_str(&format!(" · {} ({})", study.file.file_name, study.file.size_label()));
    line
}
