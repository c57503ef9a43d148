//! # Domain Report Library
//!
//! Looks up a list of domain names over RDAP and turns the answers into a
//! spreadsheet-friendly CSV report.
//!
//! Country domains (`.br`) go to the national registry, everything else to
//! the public RDAP aggregator. Every domain produces exactly one record,
//! whatever happens during its lookup.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use domain_report_lib::{load_domains, write_report, DomainReporter, ReportConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ReportConfig::default();
//!     let domains = load_domains(&config.input_path)?;
//!
//!     let reporter = DomainReporter::new(config.clone())?;
//!     let records = reporter
//!         .check_domains(&domains, |i, n, d| println!("[{}/{}] Consultando: {}", i, n, d))
//!         .await;
//!
//!     write_report(&config.output_path, &records)?;
//!     Ok(())
//! }
//! ```

// Re-export main public API types and functions
pub use checker::DomainReporter;
pub use config::{
    apply_file_config, load_env_config, validate_report_config, ConfigManager, EndpointsConfig,
    EnrichmentSection, EnvConfig, FileConfig, FilesConfig,
};
pub use error::ReportError;
pub use format::{format_expiration, merge_owner, to_row, ReportRow, REPORT_HEADERS};
pub use protocols::{extract_owner, extract_registration, select_source};
pub use report::{write_records, write_report, UTF8_BOM};
pub use types::{
    DomainRecord, EnrichmentConfig, LookupOutcome, LookupSource, RegistrationInfo, ReportConfig,
    COUNTRY_SUFFIX, DEFAULT_INPUT_FILE, DEFAULT_OUTPUT_FILE, RDAP_ORG_URL, REGISTRO_BR_RDAP_URL,
    REQUEST_DELAY, REQUEST_TIMEOUT, UNKNOWN_OWNER,
};
pub use utils::{load_domains, parse_domain_list, SAMPLE_DOMAINS};

// Internal modules - these are not part of the public API
mod checker;
mod config;
mod error;
mod format;
mod protocols;
mod report;
mod types;
mod utils;

// Type alias for convenience
pub type Result<T> = std::result::Result<T, ReportError>;
