//! CSV report writer.
//!
//! The report opens directly in spreadsheet tools, so it starts with a UTF-8
//! byte-order marker; without it accented headers like `Expiração` render
//! as mojibake.

use crate::error::ReportError;
use crate::format::{to_row, REPORT_HEADERS};
use crate::types::DomainRecord;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// UTF-8 byte-order marker.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Write `records` as CSV to any writer, BOM and header included.
pub fn write_records<W: Write>(mut writer: W, records: &[DomainRecord]) -> Result<(), ReportError> {
    writer.write_all(UTF8_BOM)?;

    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::CRLF)
        .from_writer(writer);

    csv_writer.write_record(REPORT_HEADERS)?;
    for record in records {
        csv_writer.serialize(to_row(record))?;
    }
    csv_writer.flush()?;

    Ok(())
}

/// Write the report to `path`, replacing whatever is there.
pub fn write_report<P: AsRef<Path>>(path: P, records: &[DomainRecord]) -> Result<(), ReportError> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| {
        ReportError::file_error(
            path.to_string_lossy(),
            format!("Failed to create report: {}", e),
        )
    })?;

    write_records(file, records).map_err(|e| {
        ReportError::file_error(path.to_string_lossy(), format!("Failed to write report: {}", e))
    })?;

    info!(path = %path.display(), rows = records.len(), "Report written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LookupOutcome, LookupSource, RegistrationInfo};
    use tempfile::TempDir;

    fn sample_records() -> Vec<DomainRecord> {
        vec![
            DomainRecord {
                domain: "example.com".to_string(),
                source: LookupSource::RdapOrg,
                outcome: LookupOutcome::Available,
            },
            DomainRecord {
                domain: "registro.br".to_string(),
                source: LookupSource::RegistroBr,
                outcome: LookupOutcome::Registered(RegistrationInfo {
                    expiration: Some("2025-12-01T00:00:00Z".to_string()),
                    nameservers: vec!["a.ns.br".to_string(), "b.ns.br".to_string()],
                    owner: None,
                }),
            },
            DomainRecord {
                domain: "x.com".to_string(),
                source: LookupSource::RdapOrg,
                outcome: LookupOutcome::Failed {
                    reason: "Network error: Connection failed".to_string(),
                },
            },
        ]
    }

    #[test]
    fn test_write_records_layout() {
        let mut buffer = Vec::new();
        write_records(&mut buffer, &sample_records()).unwrap();

        assert!(buffer.starts_with(UTF8_BOM));
        let text = String::from_utf8(buffer[UTF8_BOM.len()..].to_vec()).unwrap();
        let lines: Vec<&str> = text.split("\r\n").collect();

        assert_eq!(
            lines[0],
            "Dominio,Disponibilidade,Origem,Expiração,Servidor DNS,Dono/Entidade"
        );
        assert_eq!(lines[1], "example.com,Domínio disponível,RDAP.org,,,");
        assert_eq!(
            lines[2],
            "registro.br,Registrado,Registro.br,01/12/2025,\"a.ns.br, b.ns.br\",Desconhecido"
        );
        assert_eq!(lines[3], "x.com,Erro,Network error: Connection failed,,,");
        assert_eq!(lines[4], "");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_empty_report_has_header_only() {
        let mut buffer = Vec::new();
        write_records(&mut buffer, &[]).unwrap();

        let text = String::from_utf8(buffer[UTF8_BOM.len()..].to_vec()).unwrap();
        assert_eq!(
            text,
            "Dominio,Disponibilidade,Origem,Expiração,Servidor DNS,Dono/Entidade\r\n"
        );
    }

    #[test]
    fn test_write_report_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("resultado.csv");
        std::fs::write(&path, "stale content that is longer than the new report ".repeat(50))
            .unwrap();

        write_report(&path, &sample_records()[..1]).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
        assert!(!text.contains("stale"));
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn test_write_report_to_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nope").join("resultado.csv");

        let err = write_report(&path, &sample_records()).unwrap_err();
        assert!(matches!(err, ReportError::FileError { .. }));
    }
}
