//! Per-domain lookup dispatch and the sequential report loop.
//!
//! `DomainReporter` routes each domain to the right registry, applies the
//! optional ownership enrichment for country domains, and walks a domain
//! list one entry at a time with a fixed pause after every lookup.

use crate::error::ReportError;
use crate::format::merge_owner;
use crate::protocols::{select_source, OwnerEnricher, RdapClient, RegistryProfile};
use crate::types::{DomainRecord, LookupOutcome, LookupSource, ReportConfig};
use tracing::debug;

/// Looks domains up and produces one record per domain.
///
/// # Example
///
/// ```rust,no_run
/// use domain_report_lib::{DomainReporter, ReportConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let reporter = DomainReporter::new(ReportConfig::default())?;
///     let record = reporter.lookup_domain("registro.br").await;
///     println!("{}: {}", record.domain, record.outcome.availability_label());
///     Ok(())
/// }
/// ```
pub struct DomainReporter {
    /// Configuration this reporter was built from
    config: ReportConfig,
    /// Client for the country-specific registry
    country_client: RdapClient,
    /// Client for the generic aggregator
    generic_client: RdapClient,
    /// Ownership search page client, when enrichment is enabled
    enricher: Option<OwnerEnricher>,
}

impl DomainReporter {
    /// Build a reporter and its HTTP clients from `config`.
    pub fn new(config: ReportConfig) -> Result<Self, ReportError> {
        let country_client = RdapClient::new(
            RegistryProfile::from_config(LookupSource::RegistroBr, &config),
            config.request_timeout,
        )?;
        let generic_client = RdapClient::new(
            RegistryProfile::from_config(LookupSource::RdapOrg, &config),
            config.request_timeout,
        )?;
        let enricher = match &config.enrichment {
            Some(enrichment) => Some(OwnerEnricher::new(
                enrichment.clone(),
                config.request_timeout,
            )?),
            None => None,
        };

        Ok(Self {
            config,
            country_client,
            generic_client,
            enricher,
        })
    }

    /// Look up a single domain.
    ///
    /// Never fails: problems end up in [`LookupOutcome::Failed`]. For country
    /// domains that turn out registered, the enrichment result (when there
    /// is one) replaces the registry owner.
    pub async fn lookup_domain(&self, domain: &str) -> DomainRecord {
        let source = select_source(domain, &self.config.country_suffix);
        debug!(domain, source = %source, "Dispatching lookup");

        let mut outcome = match source {
            LookupSource::RegistroBr => self.country_client.lookup(domain).await,
            LookupSource::RdapOrg => self.generic_client.lookup(domain).await,
        };

        if source == LookupSource::RegistroBr {
            if let (Some(enricher), LookupOutcome::Registered(info)) = (&self.enricher, &mut outcome)
            {
                let enriched = enricher.enrich(domain).await;
                info.owner = merge_owner(info.owner.take(), enriched);
            }
        }

        DomainRecord {
            domain: domain.to_string(),
            source,
            outcome,
        }
    }

    /// Look up every domain in order, one at a time.
    ///
    /// `on_progress(position, total, domain)` is called before each lookup,
    /// with a 1-based position. After every domain, whatever its outcome,
    /// the configured delay elapses before anything else happens.
    pub async fn check_domains<F>(&self, domains: &[String], mut on_progress: F) -> Vec<DomainRecord>
    where
        F: FnMut(usize, usize, &str),
    {
        let total = domains.len();
        let mut records = Vec::with_capacity(total);

        for (index, domain) in domains.iter().enumerate() {
            on_progress(index + 1, total, domain);
            let record = self.lookup_domain(domain).await;
            records.push(record);
            tokio::time::sleep(self.config.request_delay).await;
        }

        records
    }

    /// Get the configuration for this reporter.
    pub fn config(&self) -> &ReportConfig {
        &self.config
    }
}
