//! Ownership enrichment from the Registro.br search page.
//!
//! The search page renders the holder of a `.br` domain inside a table cell.
//! The markup is scanned locally: find the `<td>` carrying the cell marker in
//! its `class`, then the first element inside it carrying the element marker,
//! and read one attribute off that element.
//!
//! Every failure here is silent to the report: the caller gets `None` and
//! keeps the owner it already had.

use crate::error::ReportError;
use crate::types::EnrichmentConfig;
use regex::Regex;
use std::time::Duration;
use tracing::debug;

lazy_static::lazy_static! {
    // Attribute lists may hold `>` inside quoted values
    static ref TD_TAG: Regex =
        Regex::new(r#"(?is)<(/?)td\b((?:[^>"']|"[^"]*"|'[^']*')*)>"#).unwrap();
    static ref OPEN_TAG: Regex =
        Regex::new(r#"(?is)<([a-z][a-z0-9-]*)\b((?:[^>"']|"[^"]*"|'[^']*')*)>"#).unwrap();
    static ref ATTRIBUTE: Regex = Regex::new(
        r#"(?is)([a-z_:][-a-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+))"#
    )
    .unwrap();
    static ref NUMERIC_ENTITY: Regex = Regex::new(r"&#(x[0-9a-fA-F]+|[0-9]+);").unwrap();
}

/// Client for the ownership search page.
#[derive(Clone)]
pub struct OwnerEnricher {
    http_client: reqwest::Client,
    config: EnrichmentConfig,
    timeout: Duration,
}

impl OwnerEnricher {
    /// Create an enricher for the configured search page.
    pub fn new(config: EnrichmentConfig, timeout: Duration) -> Result<Self, ReportError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout + Duration::from_secs(2))
            .build()
            .map_err(|e| {
                ReportError::network_with_source(
                    "Failed to create enrichment HTTP client",
                    e.to_string(),
                )
            })?;

        Ok(Self {
            http_client,
            config,
            timeout,
        })
    }

    /// Search-page URL for a domain.
    pub fn search_url(&self, domain: &str) -> String {
        let separator = if self.config.search_url.contains('?') {
            '&'
        } else {
            '?'
        };
        format!(
            "{}{}{}={}",
            self.config.search_url,
            separator,
            self.config.query_param,
            urlencoding::encode(domain)
        )
    }

    /// Fetch the owner name for `domain`, or `None` if any step fails.
    pub async fn enrich(&self, domain: &str) -> Option<String> {
        match tokio::time::timeout(self.timeout, self.fetch_page(domain)).await {
            Ok(Ok(html)) => {
                let owner = self.extract_owner(&html);
                if owner.is_none() {
                    debug!(domain, "No owner found on search page");
                }
                owner
            }
            Ok(Err(e)) => {
                debug!(domain, error = %e, "Owner enrichment failed");
                None
            }
            Err(_) => {
                debug!(domain, timeout = ?self.timeout, "Owner enrichment timed out");
                None
            }
        }
    }

    async fn fetch_page(&self, domain: &str) -> Result<String, ReportError> {
        let url = self.search_url(domain);
        debug!(url = %url, "Fetching ownership search page");

        let response = self.http_client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ReportError::network(format!(
                "Search page returned {}",
                status
            )));
        }

        Ok(response.text().await?)
    }

    /// Apply this enricher's markers to a page.
    pub fn extract_owner(&self, html: &str) -> Option<String> {
        extract_owner(
            html,
            &self.config.cell_marker,
            &self.config.element_marker,
            &self.config.attribute,
        )
    }
}

/// Read `attribute` from the first element classed `element_marker` inside
/// the first `<td>` classed `cell_marker`.
///
/// Returns `None` when the cell, the element or the attribute is missing, or
/// when the attribute value is blank.
pub fn extract_owner(
    html: &str,
    cell_marker: &str,
    element_marker: &str,
    attribute: &str,
) -> Option<String> {
    let content = marked_cell_content(html, cell_marker)?;

    let element = OPEN_TAG
        .captures_iter(content)
        .find(|caps| has_class(&caps[2], element_marker))?;

    let value = attribute_value(&element[2], attribute)?;
    let value = decode_entities(value.trim());
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Content of the first `<td>` classed `marker`, up to its matching `</td>`.
///
/// Cells nested inside it are skipped over by depth. An unclosed cell runs to
/// the end of the page.
fn marked_cell_content<'a>(html: &'a str, marker: &str) -> Option<&'a str> {
    let open = TD_TAG
        .captures_iter(html)
        .find(|caps| caps[1].is_empty() && has_class(&caps[2], marker))?;
    let start = open.get(0)?.end();
    let rest = &html[start..];

    let mut depth = 1usize;
    for tag in TD_TAG.captures_iter(rest) {
        if tag[1].is_empty() {
            depth += 1;
        } else {
            depth -= 1;
            if depth == 0 {
                return Some(&rest[..tag.get(0)?.start()]);
            }
        }
    }
    Some(rest)
}

fn has_class(attrs: &str, marker: &str) -> bool {
    attribute_value(attrs, "class")
        .map(|classes| classes.split_whitespace().any(|c| c == marker))
        .unwrap_or(false)
}

fn attribute_value<'a>(attrs: &'a str, name: &str) -> Option<&'a str> {
    ATTRIBUTE.captures_iter(attrs).find_map(|caps| {
        if caps[1].eq_ignore_ascii_case(name) {
            caps.get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| m.as_str())
        } else {
            None
        }
    })
}

fn decode_entities(value: &str) -> String {
    let decoded = NUMERIC_ENTITY.replace_all(value, |caps: &regex::Captures| {
        let code = &caps[1];
        let parsed = match code.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => code.parse::<u32>().ok(),
        };
        parsed
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| caps[0].to_string())
    });

    decoded
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <table class="result">
          <tr><td class="label">Domínio</td><td class="value">registro.br</td></tr>
          <tr>
            <td class="label">Titular</td>
            <td class="cell owner">
              <span class="icon"></span>
              <span class="owner-name" title="N&#xED;cleo de Informa&#231;&#227;o &amp; Coordena&#231;&#227;o do Ponto BR">NIC.br</span>
            </td>
          </tr>
        </table>
    "#;

    fn extract(html: &str) -> Option<String> {
        extract_owner(html, "owner", "owner-name", "title")
    }

    #[test]
    fn test_extract_owner_from_marked_cell() {
        assert_eq!(
            extract(PAGE).as_deref(),
            Some("Núcleo de Informação & Coordenação do Ponto BR")
        );
    }

    #[test]
    fn test_extract_owner_plain_attribute() {
        let html = r#"<td class='owner'><a class="owner-name" title="Fulano da Silva">x</a></td>"#;
        assert_eq!(extract(html).as_deref(), Some("Fulano da Silva"));
    }

    #[test]
    fn test_owner_cell_nested_in_layout_cell() {
        let html = r#"
            <table><tr><td class="layout">
              <table><tr>
                <td class="label">Titular</td>
                <td class="owner"><span class="owner-name" title="Fulano">Fulano</span></td>
              </tr></table>
            </td></tr></table>
        "#;
        assert_eq!(extract(html).as_deref(), Some("Fulano"));
    }

    #[test]
    fn test_owner_cell_containing_nested_table() {
        let html = r#"
            <td class="owner">
              <table><tr><td class="icon"></td></tr></table>
              <span class="owner-name" title="Beltrano">B</span>
            </td>
            <td class="other"><span class="owner-name" title="Wrong"></span></td>
        "#;
        assert_eq!(extract(html).as_deref(), Some("Beltrano"));
    }

    #[test]
    fn test_gt_inside_quoted_attribute() {
        let html = r#"<td data-note="a > b" class="owner"><span class="owner-name" title="A &gt; B > C">x</span></td>"#;
        assert_eq!(extract(html).as_deref(), Some("A > B > C"));
    }

    #[test]
    fn test_element_outside_marked_cell_is_ignored() {
        let html = r#"<td class="owner"><span>none</span></td><span class="owner-name" title="Outside"></span>"#;
        assert_eq!(extract(html), None);
    }

    #[test]
    fn test_missing_cell_returns_none() {
        let html = r#"<td class="value"><span class="owner-name" title="X"></span></td>"#;
        assert_eq!(extract(html), None);
    }

    #[test]
    fn test_marker_must_be_whole_class_token() {
        let html = r#"<td class="owner-box"><span class="owner-name" title="X"></span></td>"#;
        assert_eq!(extract(html), None);
    }

    #[test]
    fn test_missing_element_or_attribute_returns_none() {
        let no_element = r#"<td class="owner"><span class="other" title="X"></span></td>"#;
        assert_eq!(extract(no_element), None);

        let no_attribute = r#"<td class="owner"><span class="owner-name">X</span></td>"#;
        assert_eq!(extract(no_attribute), None);

        let blank = r#"<td class="owner"><span class="owner-name" title="  "></span></td>"#;
        assert_eq!(extract(blank), None);
    }

    #[test]
    fn test_search_url_encodes_domain() {
        let enricher =
            OwnerEnricher::new(EnrichmentConfig::default(), Duration::from_secs(10)).unwrap();
        assert_eq!(
            enricher.search_url("ação.com.br"),
            "https://registro.br/tecnologia/ferramentas/whois/?search=a%C3%A7%C3%A3o.com.br"
        );

        let with_query = OwnerEnricher::new(
            EnrichmentConfig {
                search_url: "http://search.test/find?lang=pt".to_string(),
                ..EnrichmentConfig::default()
            },
            Duration::from_secs(10),
        )
        .unwrap();
        assert_eq!(
            with_query.search_url("nic.br"),
            "http://search.test/find?lang=pt&search=nic.br"
        );
    }
}
