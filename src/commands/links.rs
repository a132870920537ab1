use serde::Serialize;

use super::Output;
use crate::error::{AppError, AppResult};
use crate::links::{literature_links, pharmacy_links, OutboundLink};

#[derive(Debug, Serialize)]
struct LinkReport {
    pharmacies: Vec<OutboundLink>,
    literature: Vec<OutboundLink>,
}

pub fn execute(query: &str, out: Output) -> AppResult<()> {
    if query.trim().is_empty() {
        return Err(AppError::validation("A search term is required"));
    }
    let report = LinkReport {
        pharmacies: pharmacy_links(query),
        literature: literature_links(query),
    };
    out.emit(&report, || {
        let mut lines = vec!["Farmacias:".to_string()];
        lines.extend(report.pharmacies.iter().map(|l| format!("  {}: {}", l.name, l.url)));
        lines.push("Literatura:".to_string());
        lines.extend(report.literature.iter().map(|l| format!("  {}: {}", l.name, l.url)));
        lines.join("\n")
    })
}
