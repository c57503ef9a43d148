//! Core data types for domain report runs.
//!
//! This module defines the lookup record produced for every domain, the
//! tagged outcome of a lookup, and the immutable configuration record that
//! carries every endpoint, path and timing constant into the reporter.

use std::path::PathBuf;
use std::time::Duration;

/// Domain list read at startup.
pub const DEFAULT_INPUT_FILE: &str = "dominios.txt";

/// Report written at the end of a run.
pub const DEFAULT_OUTPUT_FILE: &str = "resultado.csv";

/// Base URL of the Registro.br RDAP service.
pub const REGISTRO_BR_RDAP_URL: &str = "https://rdap.registro.br/domain/";

/// Base URL of the rdap.org aggregator.
pub const RDAP_ORG_URL: &str = "https://rdap.org/domain/";

/// Suffix routed to the country-specific registry.
pub const COUNTRY_SUFFIX: &str = ".br";

/// Pause after every domain, regardless of outcome.
pub const REQUEST_DELAY: Duration = Duration::from_secs(2);

/// Per-request timeout for every remote call.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Owner marker used when a registration has no role-bearing entity,
/// or when an entity has no handle.
pub const UNKNOWN_OWNER: &str = "Desconhecido";

/// Which registry answered a lookup.
///
/// Provenance is tracked for every record, including failed ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupSource {
    /// Country-specific registry for `.br` domains
    RegistroBr,

    /// Generic aggregator for every other domain
    RdapOrg,
}

/// Registration details extracted from a successful RDAP answer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationInfo {
    /// Raw `eventDate` of the first matching expiration event
    pub expiration: Option<String>,

    /// `ldhName` of every listed nameserver, in response order
    pub nameservers: Vec<String>,

    /// Comma-joined handles of role-bearing entities, or the enrichment value.
    /// `None` when no entity carried a role.
    pub owner: Option<String>,
}

/// Result of looking one domain up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// Registry answered 404: nobody holds the name
    Available,

    /// Registry returned a registration record
    Registered(RegistrationInfo),

    /// Lookup could not be completed
    Failed { reason: String },
}

/// One row of work: the domain, who answered, and what they said.
///
/// Created once per input domain and never modified after it is appended
/// to the result list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainRecord {
    /// The domain exactly as it appeared in the input list
    pub domain: String,

    /// Registry the lookup was routed to
    pub source: LookupSource,

    /// What the lookup produced
    pub outcome: LookupOutcome,
}

/// Settings for the `.br` ownership search page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentConfig {
    /// Search page URL, without query string
    pub search_url: String,

    /// Query-string parameter carrying the domain
    pub query_param: String,

    /// Class token identifying the owner table cell
    pub cell_marker: String,

    /// Class token identifying the element nested inside that cell
    pub element_marker: String,

    /// Attribute read off the nested element
    pub attribute: String,
}

/// Immutable configuration for one report run.
///
/// Built once at startup and handed to the reporter; nothing reads
/// module-level constants after that.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Newline-delimited domain list
    pub input_path: PathBuf,

    /// CSV report destination (overwritten)
    pub output_path: PathBuf,

    /// RDAP base URL for domains under `country_suffix`
    pub country_endpoint: String,

    /// RDAP base URL for every other domain
    pub generic_endpoint: String,

    /// Suffix selecting the country registry
    pub country_suffix: String,

    /// Timeout applied to each HTTP request
    pub request_timeout: Duration,

    /// Pause after each domain
    pub request_delay: Duration,

    /// Ownership enrichment for country domains; `None` disables it
    pub enrichment: Option<EnrichmentConfig>,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            search_url: "https://registro.br/tecnologia/ferramentas/whois/".to_string(),
            query_param: "search".to_string(),
            cell_marker: "owner".to_string(),
            element_marker: "owner-name".to_string(),
            attribute: "title".to_string(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(DEFAULT_INPUT_FILE),
            output_path: PathBuf::from(DEFAULT_OUTPUT_FILE),
            country_endpoint: REGISTRO_BR_RDAP_URL.to_string(),
            generic_endpoint: RDAP_ORG_URL.to_string(),
            country_suffix: COUNTRY_SUFFIX.to_string(),
            request_timeout: REQUEST_TIMEOUT,
            request_delay: REQUEST_DELAY,
            enrichment: None,
        }
    }
}

impl ReportConfig {
    /// Read domains from a different list.
    pub fn with_input_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.input_path = path.into();
        self
    }

    /// Write the report somewhere else.
    pub fn with_output_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.output_path = path.into();
        self
    }

    /// Point both RDAP profiles at other base URLs.
    pub fn with_endpoints<C: Into<String>, G: Into<String>>(mut self, country: C, generic: G) -> Self {
        self.country_endpoint = country.into();
        self.generic_endpoint = generic.into();
        self
    }

    /// Enable or replace ownership enrichment.
    pub fn with_enrichment(mut self, enrichment: Option<EnrichmentConfig>) -> Self {
        self.enrichment = enrichment;
        self
    }

    /// Override the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Override the inter-domain delay.
    ///
    /// Only reachable through the library API; the CLI always runs with
    /// [`REQUEST_DELAY`].
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }
}

impl LookupOutcome {
    /// Availability column text.
    pub fn availability_label(&self) -> &'static str {
        match self {
            LookupOutcome::Available => "Domínio disponível",
            LookupOutcome::Registered(_) => "Registrado",
            LookupOutcome::Failed { .. } => "Erro",
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, LookupOutcome::Failed { .. })
    }
}

impl std::fmt::Display for LookupSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LookupSource::RegistroBr => write!(f, "Registro.br"),
            LookupSource::RdapOrg => write!(f, "RDAP.org"),
        }
    }
}
