//! Registry profiles and domain routing.
//!
//! Two RDAP backends are in play: Registro.br for `.br` names and the
//! rdap.org aggregator for everything else. They speak the same protocol but
//! label expiration events differently, so each one is described by a
//! [`RegistryProfile`].

use crate::types::{LookupSource, ReportConfig};

/// Expiration event labels honored by Registro.br.
const COUNTRY_EXPIRATION_ACTIONS: &[&str] = &["expiration"];

/// Expiration event labels honored by the generic aggregator.
const GENERIC_EXPIRATION_ACTIONS: &[&str] = &["expiration", "expires", "expiry"];

/// Everything an RDAP client needs to know about one backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryProfile {
    /// Provenance reported on every record this profile produces
    pub source: LookupSource,

    /// Base URL; the domain is appended verbatim
    pub base_url: String,

    /// Lowercased `eventAction` values that count as expiration
    pub expiration_actions: &'static [&'static str],
}

impl RegistryProfile {
    /// Profile for the country-specific registry.
    pub fn country<S: Into<String>>(base_url: S) -> Self {
        Self {
            source: LookupSource::RegistroBr,
            base_url: base_url.into(),
            expiration_actions: COUNTRY_EXPIRATION_ACTIONS,
        }
    }

    /// Profile for the generic aggregator.
    pub fn generic<S: Into<String>>(base_url: S) -> Self {
        Self {
            source: LookupSource::RdapOrg,
            base_url: base_url.into(),
            expiration_actions: GENERIC_EXPIRATION_ACTIONS,
        }
    }

    /// Build the profile for `source` from the run configuration.
    pub fn from_config(source: LookupSource, config: &ReportConfig) -> Self {
        match source {
            LookupSource::RegistroBr => Self::country(config.country_endpoint.clone()),
            LookupSource::RdapOrg => Self::generic(config.generic_endpoint.clone()),
        }
    }

    /// Full lookup URL for a domain.
    pub fn domain_url(&self, domain: &str) -> String {
        format!("{}{}", self.base_url, domain)
    }

    /// Whether an `eventAction` value marks the expiration date.
    pub fn is_expiration_action(&self, action: &str) -> bool {
        let action = action.to_lowercase();
        self.expiration_actions.iter().any(|a| *a == action)
    }
}

/// Pick the registry for a domain.
///
/// Plain, case-sensitive suffix test: `"registro.br"` goes to the country
/// registry, `"example.com"` and `"EXAMPLE.BR"` do not.
pub fn select_source(domain: &str, country_suffix: &str) -> LookupSource {
    if domain.ends_with(country_suffix) {
        LookupSource::RegistroBr
    } else {
        LookupSource::RdapOrg
    }
}
