//! Presentation of lookup records.
//!
//! Turns a [`DomainRecord`] into the six display strings of a report row.
//! Nothing in here can fail: unparseable dates pass through untouched and a
//! missing enrichment simply keeps the registry owner.

use crate::types::{DomainRecord, LookupOutcome, UNKNOWN_OWNER};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Day/month/year rendering used in the report.
const REPORT_DATE_FORMAT: &str = "%d/%m/%Y";

/// One CSV row. Field order is the column order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportRow {
    #[serde(rename = "Dominio")]
    pub domain: String,

    #[serde(rename = "Disponibilidade")]
    pub availability: String,

    /// Provenance label, or the failure reason for `Erro` rows
    #[serde(rename = "Origem")]
    pub source: String,

    #[serde(rename = "Expiração")]
    pub expiration: String,

    #[serde(rename = "Servidor DNS")]
    pub nameservers: String,

    #[serde(rename = "Dono/Entidade")]
    pub owner: String,
}

/// Column headers, in order.
pub const REPORT_HEADERS: [&str; 6] = [
    "Dominio",
    "Disponibilidade",
    "Origem",
    "Expiração",
    "Servidor DNS",
    "Dono/Entidade",
];

/// Render an RDAP timestamp as `dd/mm/yyyy`.
///
/// Accepts RFC 3339 (a trailing `Z` is read as `+00:00`), an offset-less
/// `YYYY-MM-DDTHH:MM:SS[.f]`, or a bare `YYYY-MM-DD`. The date is taken in
/// the timestamp's own offset. Anything else comes back unchanged.
pub fn format_expiration(raw: &str) -> String {
    let normalized = match raw.strip_suffix('Z') {
        Some(stripped) => format!("{}+00:00", stripped),
        None => raw.to_string(),
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalized) {
        return dt.format(REPORT_DATE_FORMAT).to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt.format(REPORT_DATE_FORMAT).to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.format(REPORT_DATE_FORMAT).to_string();
    }

    raw.to_string()
}

/// Combine the registry owner with an enrichment result.
///
/// A found enrichment value always wins, even over a multi-valued registry
/// owner.
pub fn merge_owner(primary: Option<String>, enrichment: Option<String>) -> Option<String> {
    enrichment.or(primary)
}

/// Project a record into its report row.
pub fn to_row(record: &DomainRecord) -> ReportRow {
    let mut row = ReportRow {
        domain: record.domain.clone(),
        availability: record.outcome.availability_label().to_string(),
        source: record.source.to_string(),
        expiration: String::new(),
        nameservers: String::new(),
        owner: String::new(),
    };

    match &record.outcome {
        LookupOutcome::Available => {}
        LookupOutcome::Registered(info) => {
            row.expiration = info
                .expiration
                .as_deref()
                .map(format_expiration)
                .unwrap_or_default();
            row.nameservers = info.nameservers.join(", ");
            row.owner = info
                .owner
                .clone()
                .unwrap_or_else(|| UNKNOWN_OWNER.to_string());
        }
        LookupOutcome::Failed { reason } => {
            row.source = reason.clone();
        }
    }

    row
}
