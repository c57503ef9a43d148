//! Terminal output for domain-report.
//!
//! Progress, completion and summary lines go to stdout; logs and errors go
//! to stderr. Colors come from the `console` crate and switch off by
//! themselves when stdout is not a terminal.

use console::style;
use domain_report_lib::{DomainRecord, LookupOutcome};
use std::path::Path;
use std::time::Duration;

/// Counts shown in the final summary.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct OutcomeCounts {
    pub registered: usize,
    pub available: usize,
    pub failed: usize,
}

impl OutcomeCounts {
    /// Tally the outcomes of a finished run.
    pub fn from_records(records: &[DomainRecord]) -> Self {
        records
            .iter()
            .fold(Self::default(), |mut counts, record| {
                match record.outcome {
                    LookupOutcome::Registered(_) => counts.registered += 1,
                    LookupOutcome::Available => counts.available += 1,
                    LookupOutcome::Failed { .. } => counts.failed += 1,
                }
                counts
            })
    }
}

/// Print the line announcing a lookup.
pub fn print_progress(position: usize, total: usize, domain: &str) {
    println!(
        "{} Consultando: {}",
        style(format!("[{}/{}]", position, total)).dim(),
        domain
    );
}

/// Print the completion message naming the report file.
pub fn print_completion(output: &Path) {
    println!();
    println!(
        "{} Resultados salvos em {}",
        style("Consulta finalizada!").green().bold(),
        output.display()
    );
}

/// Print the registered/available/error summary bar.
pub fn print_summary(counts: OutcomeCounts, duration: Duration) {
    let total = counts.registered + counts.available + counts.failed;
    println!(
        "  {} domínio{} em {:.1}s  {}  {}  {}  {}  {}  {}",
        style(total).bold(),
        if total == 1 { "" } else { "s" },
        duration.as_secs_f64(),
        style("|").dim(),
        style(format!("{} registrados", counts.registered)).red(),
        style("|").dim(),
        style(format!("{} disponíveis", counts.available)).green(),
        style("|").dim(),
        style(format!("{} erros", counts.failed)).yellow(),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_report_lib::{LookupSource, RegistrationInfo};

    fn record(domain: &str, outcome: LookupOutcome) -> DomainRecord {
        DomainRecord {
            domain: domain.to_string(),
            source: LookupSource::RdapOrg,
            outcome,
        }
    }

    #[test]
    fn test_outcome_counts() {
        let records = vec![
            record("a.com", LookupOutcome::Available),
            record("b.com", LookupOutcome::Registered(RegistrationInfo::default())),
            record(
                "c.com",
                LookupOutcome::Failed {
                    reason: "boom".to_string(),
                },
            ),
            record("d.com", LookupOutcome::Available),
        ];

        assert_eq!(
            OutcomeCounts::from_records(&records),
            OutcomeCounts {
                registered: 1,
                available: 2,
                failed: 1,
            }
        );
    }

    #[test]
    fn test_outcome_counts_empty() {
        assert_eq!(OutcomeCounts::from_records(&[]), OutcomeCounts::default());
    }
}
