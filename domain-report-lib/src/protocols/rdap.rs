//! RDAP (Registration Data Access Protocol) client.
//!
//! One client type serves both registries; what differs between them lives
//! in the [`RegistryProfile`] it is built with. A lookup never fails from the
//! caller's point of view: transport, status and decoding problems all come
//! back as [`LookupOutcome::Failed`].

use crate::error::ReportError;
use crate::protocols::registry::RegistryProfile;
use crate::types::{LookupOutcome, LookupSource, RegistrationInfo, UNKNOWN_OWNER};
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, warn};

/// RDAP client bound to a single registry.
#[derive(Clone)]
pub struct RdapClient {
    /// HTTP client for making RDAP requests
    http_client: reqwest::Client,
    /// Registry this client talks to
    profile: RegistryProfile,
    /// Timeout for one RDAP request
    timeout: Duration,
}

impl RdapClient {
    /// Create a client for `profile` with the given request timeout.
    pub fn new(profile: RegistryProfile, timeout: Duration) -> Result<Self, ReportError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout + Duration::from_secs(2)) // Add buffer for HTTP timeout
            .build()
            .map_err(|e| {
                ReportError::network_with_source("Failed to create RDAP HTTP client", e.to_string())
            })?;

        Ok(Self {
            http_client,
            profile,
            timeout,
        })
    }

    /// Registry this client reports as provenance.
    pub fn source(&self) -> LookupSource {
        self.profile.source
    }

    /// Look a domain up and fold every failure into the outcome.
    ///
    /// Issues exactly one GET; there are no retries.
    pub async fn lookup(&self, domain: &str) -> LookupOutcome {
        match tokio::time::timeout(self.timeout, self.fetch(domain)).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => {
                warn!(domain, source = %self.profile.source, error = %e, "RDAP lookup failed");
                LookupOutcome::Failed {
                    reason: e.to_string(),
                }
            }
            Err(_) => {
                let e = ReportError::timeout("RDAP request", self.timeout);
                warn!(domain, source = %self.profile.source, error = %e, "RDAP lookup timed out");
                LookupOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn fetch(&self, domain: &str) -> Result<LookupOutcome, ReportError> {
        let rdap_url = self.profile.domain_url(domain);
        debug!(url = %rdap_url, "Sending RDAP request");

        let response = self
            .http_client
            .get(&rdap_url)
            .send()
            .await
            .map_err(|e| ReportError::rdap(domain, format!("Request failed: {}", e)))?;

        let status = response.status();
        debug!(domain, status = %status, "RDAP response received");

        if status == StatusCode::NOT_FOUND {
            return Ok(LookupOutcome::Available);
        }
        if !status.is_success() {
            return Err(ReportError::rdap_with_status(
                domain,
                format!("RDAP server returned error: {}", status),
                status.as_u16(),
            ));
        }

        let json = response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| ReportError::rdap(domain, format!("Failed to parse JSON: {}", e)))?;

        if !json.is_object() {
            return Err(ReportError::rdap(
                domain,
                "RDAP response is not a JSON object",
            ));
        }

        let info = extract_registration(&json, self.profile.expiration_actions)
            .map_err(|e| ReportError::rdap(domain, e.to_string()))?;
        Ok(LookupOutcome::Registered(info))
    }
}

/// Extract the report fields from an RDAP domain object.
///
/// * expiration: `eventDate` of the first event whose lowercased
///   `eventAction` is one of `expiration_actions`
/// * nameservers: every `ldhName`, in order; entries without one are skipped
/// * owner: handles of entities with at least one role, joined with `", "`;
///   a missing handle counts as [`UNKNOWN_OWNER`]
///
/// Absent members are fine. A member that is present with the wrong JSON
/// type is a [`ReportError::ParseError`].
pub fn extract_registration(
    json: &serde_json::Value,
    expiration_actions: &[&str],
) -> Result<RegistrationInfo, ReportError> {
    let mut info = RegistrationInfo::default();

    for event in optional_array(json, "events")? {
        let action = optional_str(event, "events", "eventAction")?.unwrap_or_default();
        let date = optional_str(event, "events", "eventDate")?;
        let action = action.to_lowercase();
        if info.expiration.is_none() && expiration_actions.iter().any(|wanted| *wanted == action) {
            info.expiration = date.map(String::from);
        }
    }

    for nameserver in optional_array(json, "nameservers")? {
        if let Some(ldh_name) = optional_str(nameserver, "nameservers", "ldhName")? {
            if !ldh_name.is_empty() {
                info.nameservers.push(ldh_name.to_string());
            }
        }
    }

    let mut handles = Vec::new();
    for entity in optional_array(json, "entities")? {
        let has_role = match entity.get("roles") {
            None => false,
            Some(serde_json::Value::Array(roles)) => !roles.is_empty(),
            Some(_) => {
                return Err(ReportError::parse(
                    "RDAP field 'entities.roles' is not an array",
                ))
            }
        };
        let handle = optional_str(entity, "entities", "handle")?;
        if has_role {
            handles.push(handle.unwrap_or(UNKNOWN_OWNER));
        }
    }
    if !handles.is_empty() {
        info.owner = Some(handles.join(", "));
    }

    Ok(info)
}

/// Array member `key` of an object; absent means empty.
fn optional_array<'a>(
    json: &'a serde_json::Value,
    key: &str,
) -> Result<&'a [serde_json::Value], ReportError> {
    match json.get(key) {
        None => Ok(&[][..]),
        Some(serde_json::Value::Array(items)) => Ok(items.as_slice()),
        Some(_) => Err(ReportError::parse(format!(
            "RDAP field '{}' is not an array",
            key
        ))),
    }
}

/// String member `key` of an element of `parent`; absent means `None`.
fn optional_str<'a>(
    item: &'a serde_json::Value,
    parent: &str,
    key: &str,
) -> Result<Option<&'a str>, ReportError> {
    let object = item.as_object().ok_or_else(|| {
        ReportError::parse(format!("RDAP field '{}' holds a non-object entry", parent))
    })?;
    match object.get(key) {
        None => Ok(None),
        Some(serde_json::Value::String(value)) => Ok(Some(value.as_str())),
        Some(_) => Err(ReportError::parse(format!(
            "RDAP field '{}.{}' is not a string",
            parent, key
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GENERIC: &[&str] = &["expiration", "expires", "expiry"];
    const COUNTRY: &[&str] = &["expiration"];

    #[tokio::test]
    async fn test_rdap_client_creation() {
        let client = RdapClient::new(
            RegistryProfile::generic("https://rdap.org/domain/"),
            Duration::from_secs(10),
        );
        assert!(client.is_ok());
        assert_eq!(client.unwrap().source(), LookupSource::RdapOrg);
    }

    #[test]
    fn test_extract_registration_full() {
        let json = serde_json::json!({
            "events": [
                {"eventAction": "registration", "eventDate": "1995-08-14T04:00:00Z"},
                {"eventAction": "expiration", "eventDate": "2025-08-13T04:00:00Z"}
            ],
            "nameservers": [
                {"ldhName": "a.ns.br"},
                {"ldhName": "b.ns.br"}
            ],
            "entities": [
                {"handle": "REG-1", "roles": ["registrant"]},
                {"handle": "TECH-9", "roles": ["technical", "administrative"]}
            ]
        });

        let info = extract_registration(&json, COUNTRY).unwrap();
        assert_eq!(info.expiration.as_deref(), Some("2025-08-13T04:00:00Z"));
        assert_eq!(info.nameservers, vec!["a.ns.br", "b.ns.br"]);
        assert_eq!(info.owner.as_deref(), Some("REG-1, TECH-9"));
    }

    #[test]
    fn test_first_matching_expiration_wins() {
        let json = serde_json::json!({
            "events": [
                {"eventAction": "Expires", "eventDate": "2030-01-01T00:00:00Z"},
                {"eventAction": "expiration", "eventDate": "2031-01-01T00:00:00Z"}
            ]
        });

        let generic = extract_registration(&json, GENERIC).unwrap();
        assert_eq!(generic.expiration.as_deref(), Some("2030-01-01T00:00:00Z"));

        // The country registry only knows "expiration"
        let country = extract_registration(&json, COUNTRY).unwrap();
        assert_eq!(country.expiration.as_deref(), Some("2031-01-01T00:00:00Z"));
    }

    #[test]
    fn test_entities_without_roles_are_ignored() {
        let json = serde_json::json!({
            "entities": [
                {"handle": "NOROLE"},
                {"handle": "EMPTY", "roles": []},
                {"roles": ["registrar"]}
            ]
        });

        let info = extract_registration(&json, GENERIC).unwrap();
        assert_eq!(info.owner.as_deref(), Some("Desconhecido"));
    }

    #[test]
    fn test_no_role_entities_means_no_owner() {
        let json = serde_json::json!({
            "entities": [{"handle": "NOROLE"}],
            "nameservers": [{"objectClassName": "nameserver"}]
        });

        let info = extract_registration(&json, GENERIC).unwrap();
        assert_eq!(info.owner, None);
        assert!(info.nameservers.is_empty());
        assert_eq!(info.expiration, None);
    }

    #[test]
    fn test_wrongly_typed_members_are_parse_errors() {
        let payloads = [
            serde_json::json!({"events": "x"}),
            serde_json::json!({"events": null}),
            serde_json::json!({"events": [{"eventAction": 7, "eventDate": "2030-01-01"}]}),
            serde_json::json!({"events": ["expiration"]}),
            serde_json::json!({"nameservers": {"ldhName": "a.ns.br"}}),
            serde_json::json!({"nameservers": [{"ldhName": ["a.ns.br"]}]}),
            serde_json::json!({"entities": [{"handle": null, "roles": ["registrant"]}]}),
            serde_json::json!({"entities": [{"handle": "REG-1", "roles": "registrant"}]}),
        ];

        for payload in payloads {
            let result = extract_registration(&payload, GENERIC);
            assert!(
                matches!(result, Err(ReportError::ParseError { .. })),
                "accepted malformed payload {}",
                payload
            );
        }
    }

    #[test]
    fn test_empty_object_is_registered_without_details() {
        let info = extract_registration(&serde_json::json!({}), GENERIC).unwrap();
        assert_eq!(info, RegistrationInfo::default());
    }
}
