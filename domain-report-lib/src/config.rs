//! Configuration file parsing and management.
//!
//! A run is fully described by the built-in constants in [`crate::types`].
//! A TOML file and `DR_*` environment variables may move the input/output
//! files, point the registries elsewhere, and switch on ownership
//! enrichment. The request delay, the timeout and the country suffix are not
//! exposed here.

use crate::error::ReportError;
use crate::types::{EnrichmentConfig, ReportConfig};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Configuration loaded from TOML files.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct FileConfig {
    /// Input and output file locations
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<FilesConfig>,

    /// RDAP base URLs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoints: Option<EndpointsConfig>,

    /// Ownership enrichment settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrichment: Option<EnrichmentSection>,
}

/// `[files]` section.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct FilesConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

/// `[endpoints]` section.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct EndpointsConfig {
    /// Base URL for `.br` lookups
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_rdap: Option<String>,

    /// Base URL for every other lookup
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generic_rdap: Option<String>,
}

/// `[enrichment]` section. Unset fields fall back to [`EnrichmentConfig::default`].
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct EnrichmentSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_param: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cell_marker: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub element_marker: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

impl FileConfig {
    /// Enrichment settings from this file, defaults filled in.
    pub fn enrichment_settings(&self) -> EnrichmentConfig {
        let mut settings = EnrichmentConfig::default();
        if let Some(section) = &self.enrichment {
            if let Some(v) = &section.search_url {
                settings.search_url = v.clone();
            }
            if let Some(v) = &section.query_param {
                settings.query_param = v.clone();
            }
            if let Some(v) = &section.cell_marker {
                settings.cell_marker = v.clone();
            }
            if let Some(v) = &section.element_marker {
                settings.element_marker = v.clone();
            }
            if let Some(v) = &section.attribute {
                settings.attribute = v.clone();
            }
        }
        settings
    }

    /// Whether the file switches enrichment on.
    pub fn enrichment_enabled(&self) -> bool {
        self.enrichment
            .as_ref()
            .and_then(|e| e.enabled)
            .unwrap_or(false)
    }
}

/// Configuration discovery and loading functionality.
#[derive(Debug, Default)]
pub struct ConfigManager;

impl ConfigManager {
    /// Create a new configuration manager.
    pub fn new() -> Self {
        Self
    }

    /// Load configuration from a specific file.
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<FileConfig, ReportError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ReportError::file_error(
                path.to_string_lossy(),
                "Configuration file not found",
            ));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            ReportError::file_error(
                path.to_string_lossy(),
                format!("Failed to read configuration file: {}", e),
            )
        })?;

        let config: FileConfig = toml::from_str(&content).map_err(|e| {
            ReportError::config(format!("Failed to parse TOML configuration: {}", e))
        })?;

        self.validate_config(&config)?;

        debug!(path = %path.display(), "Loaded configuration file");

        Ok(config)
    }

    /// Discover and load configuration files in the current directory.
    ///
    /// When both candidates exist, the dotfile takes precedence.
    pub fn discover_and_load(&self) -> Result<FileConfig, ReportError> {
        let mut merged_config = FileConfig::default();
        let mut loaded_files = Vec::new();

        for candidate in self.get_local_config_paths() {
            let config = self.load_file(&candidate)?;
            merged_config = self.merge_configs(merged_config, config);
            loaded_files.push(candidate);
        }

        if loaded_files.len() > 1 {
            warn!(
                files = ?loaded_files,
                "Multiple config files found, later files take precedence"
            );
        }

        Ok(merged_config)
    }

    /// Existing local configuration files, lowest precedence first.
    fn get_local_config_paths(&self) -> Vec<PathBuf> {
        ["./domain-report.toml", "./.domain-report.toml"]
            .iter()
            .map(PathBuf::from)
            .filter(|path| path.exists())
            .collect()
    }

    /// Merge two configurations with proper precedence.
    ///
    /// Values from `higher` take precedence over values from `lower`.
    pub fn merge_configs(&self, lower: FileConfig, higher: FileConfig) -> FileConfig {
        FileConfig {
            files: match (lower.files, higher.files) {
                (Some(mut lower_files), Some(higher_files)) => {
                    if higher_files.input.is_some() {
                        lower_files.input = higher_files.input;
                    }
                    if higher_files.output.is_some() {
                        lower_files.output = higher_files.output;
                    }
                    Some(lower_files)
                }
                (lower_files, higher_files) => higher_files.or(lower_files),
            },
            endpoints: match (lower.endpoints, higher.endpoints) {
                (Some(mut lower_endpoints), Some(higher_endpoints)) => {
                    if higher_endpoints.country_rdap.is_some() {
                        lower_endpoints.country_rdap = higher_endpoints.country_rdap;
                    }
                    if higher_endpoints.generic_rdap.is_some() {
                        lower_endpoints.generic_rdap = higher_endpoints.generic_rdap;
                    }
                    Some(lower_endpoints)
                }
                (lower_endpoints, higher_endpoints) => higher_endpoints.or(lower_endpoints),
            },
            enrichment: match (lower.enrichment, higher.enrichment) {
                (Some(mut lower_enrichment), Some(higher_enrichment)) => {
                    if higher_enrichment.enabled.is_some() {
                        lower_enrichment.enabled = higher_enrichment.enabled;
                    }
                    if higher_enrichment.search_url.is_some() {
                        lower_enrichment.search_url = higher_enrichment.search_url;
                    }
                    if higher_enrichment.query_param.is_some() {
                        lower_enrichment.query_param = higher_enrichment.query_param;
                    }
                    if higher_enrichment.cell_marker.is_some() {
                        lower_enrichment.cell_marker = higher_enrichment.cell_marker;
                    }
                    if higher_enrichment.element_marker.is_some() {
                        lower_enrichment.element_marker = higher_enrichment.element_marker;
                    }
                    if higher_enrichment.attribute.is_some() {
                        lower_enrichment.attribute = higher_enrichment.attribute;
                    }
                    Some(lower_enrichment)
                }
                (lower_enrichment, higher_enrichment) => higher_enrichment.or(lower_enrichment),
            },
        }
    }

    /// Validate a configuration for common issues.
    fn validate_config(&self, config: &FileConfig) -> Result<(), ReportError> {
        if let Some(files) = &config.files {
            for (name, value) in [("input", &files.input), ("output", &files.output)] {
                if matches!(value, Some(v) if v.trim().is_empty()) {
                    return Err(ReportError::config(format!(
                        "files.{} cannot be empty",
                        name
                    )));
                }
            }
        }

        if let Some(endpoints) = &config.endpoints {
            for (name, value) in [
                ("country_rdap", &endpoints.country_rdap),
                ("generic_rdap", &endpoints.generic_rdap),
            ] {
                if let Some(url) = value {
                    validate_url(&format!("endpoints.{}", name), url)?;
                }
            }
        }

        if let Some(enrichment) = &config.enrichment {
            if let Some(url) = &enrichment.search_url {
                validate_url("enrichment.search_url", url)?;
            }
            for (name, value) in [
                ("query_param", &enrichment.query_param),
                ("cell_marker", &enrichment.cell_marker),
                ("element_marker", &enrichment.element_marker),
                ("attribute", &enrichment.attribute),
            ] {
                if let Some(v) = value {
                    if v.trim().is_empty() || v.contains(char::is_whitespace) {
                        return Err(ReportError::config(format!(
                            "enrichment.{} must be a single non-empty token",
                            name
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}

fn validate_url(field: &str, url: &str) -> Result<(), ReportError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(ReportError::config(format!(
            "{} must be an http:// or https:// URL, got '{}'",
            field, url
        )))
    }
}

/// Fold a loaded file configuration into a run configuration.
pub fn apply_file_config(mut config: ReportConfig, file_config: &FileConfig) -> ReportConfig {
    if let Some(files) = &file_config.files {
        if let Some(input) = &files.input {
            config.input_path = PathBuf::from(input);
        }
        if let Some(output) = &files.output {
            config.output_path = PathBuf::from(output);
        }
    }

    if let Some(endpoints) = &file_config.endpoints {
        if let Some(country) = &endpoints.country_rdap {
            config.country_endpoint = country.clone();
        }
        if let Some(generic) = &endpoints.generic_rdap {
            config.generic_endpoint = generic.clone();
        }
    }

    config.enrichment = if file_config.enrichment_enabled() {
        Some(file_config.enrichment_settings())
    } else {
        None
    };

    config
}

/// Check a fully assembled run configuration before any work starts.
pub fn validate_report_config(config: &ReportConfig) -> Result<(), ReportError> {
    if config.input_path.as_os_str().is_empty() {
        return Err(ReportError::config("Input path cannot be empty"));
    }
    if config.output_path.as_os_str().is_empty() {
        return Err(ReportError::config("Output path cannot be empty"));
    }
    validate_url("country endpoint", &config.country_endpoint)?;
    validate_url("generic endpoint", &config.generic_endpoint)?;
    if let Some(enrichment) = &config.enrichment {
        validate_url("enrichment search URL", &enrichment.search_url)?;
        if enrichment.cell_marker.is_empty()
            || enrichment.element_marker.is_empty()
            || enrichment.attribute.is_empty()
            || enrichment.query_param.is_empty()
        {
            return Err(ReportError::config(
                "Enrichment markers, attribute and query parameter must be set",
            ));
        }
    }
    Ok(())
}

/// Environment variable configuration that mirrors CLI options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvConfig {
    pub file: Option<String>,
    pub output: Option<String>,
    pub enrich: Option<bool>,
    pub config: Option<String>,
}

/// Load configuration from `DR_*` environment variables.
///
/// Invalid values are logged as warnings and ignored.
pub fn load_env_config() -> EnvConfig {
    let mut env_config = EnvConfig::default();

    // DR_FILE - domain list
    if let Ok(path) = env::var("DR_FILE") {
        if !path.trim().is_empty() {
            debug!("Using DR_FILE={}", path);
            env_config.file = Some(path);
        }
    }

    // DR_OUTPUT - report destination
    if let Ok(path) = env::var("DR_OUTPUT") {
        if !path.trim().is_empty() {
            debug!("Using DR_OUTPUT={}", path);
            env_config.output = Some(path);
        }
    }

    // DR_ENRICH - ownership enrichment for .br domains
    if let Ok(val) = env::var("DR_ENRICH") {
        match parse_bool(&val) {
            Some(enabled) => {
                debug!("Using DR_ENRICH={}", enabled);
                env_config.enrich = Some(enabled);
            }
            None => warn!("Invalid DR_ENRICH='{}', use true/false", val),
        }
    }

    // DR_CONFIG - explicit config file
    if let Ok(path) = env::var("DR_CONFIG") {
        if !path.trim().is_empty() {
            debug!("Using DR_CONFIG={}", path);
            env_config.config = Some(path);
        }
    }

    env_config
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
