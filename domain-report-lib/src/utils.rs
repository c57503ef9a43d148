//! Domain list loading.
//!
//! The input is a plain text file with one domain per line. When the file
//! does not exist yet it is created with a small sample list so a first run
//! has something to look up.

use crate::error::ReportError;
use std::fs;
use std::path::Path;
use tracing::info;

/// Written to a missing domain list before reading it back.
pub const SAMPLE_DOMAINS: [&str; 4] = [
    "google.com",
    "registro.br",
    "example.com",
    "dominiofalso1234567.com",
];

/// Create `path` with [`SAMPLE_DOMAINS`] unless it already exists.
///
/// Returns `true` when the file was created.
pub fn ensure_domain_list<P: AsRef<Path>>(path: P) -> Result<bool, ReportError> {
    let path = path.as_ref();
    if path.exists() {
        return Ok(false);
    }

    let mut content = SAMPLE_DOMAINS.join("\n");
    content.push('\n');
    fs::write(path, content).map_err(|e| {
        ReportError::file_error(
            path.to_string_lossy(),
            format!("Failed to create sample domain list: {}", e),
        )
    })?;

    info!(path = %path.display(), "Domain list not found, created sample list");
    Ok(true)
}

/// Split file content into domains: trimmed, non-blank lines in order.
///
/// No validation happens here; a malformed name fails later at lookup time.
pub fn parse_domain_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// Load the domain list, creating the sample file first if needed.
pub fn load_domains<P: AsRef<Path>>(path: P) -> Result<Vec<String>, ReportError> {
    let path = path.as_ref();
    ensure_domain_list(path)?;

    let content = fs::read_to_string(path).map_err(|e| {
        ReportError::file_error(
            path.to_string_lossy(),
            format!("Failed to read domain list: {}", e),
        )
    })?;

    Ok(parse_domain_list(&content))
}
