//! Domain Report CLI Application
//!
//! Reads a domain list, looks every entry up over RDAP through
//! domain-report-lib, and writes the results as a CSV report.

mod ui;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::Parser;
use domain_report_lib::{
    apply_file_config, load_domains, load_env_config, validate_report_config, write_report,
    ConfigManager, DomainReporter, EnvConfig, FileConfig, ReportConfig,
};
use std::path::PathBuf;
use std::process;
use std::time::Instant;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

/// CLI arguments for domain-report
#[derive(Parser, Debug)]
#[command(name = "domain-report")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Look up a list of domains over RDAP and write a CSV report")]
#[command(
    long_about = "Look up a list of domains over RDAP and write a CSV report.\n\n.br domains are queried at Registro.br, everything else at RDAP.org.\nLookups run one at a time with a 2 second pause between them."
)]
#[command(styles = STYLES)]
pub struct Args {
    /// Domain list, one domain per line (default: dominios.txt)
    #[arg(short = 'f', long = "file", value_name = "FILE", help_heading = "Files")]
    pub file: Option<String>,

    /// CSV report destination (default: resultado.csv)
    #[arg(short = 'o', long = "output", value_name = "FILE", help_heading = "Files")]
    pub output: Option<String>,

    /// Look up the owner of registered .br domains on the Registro.br search page
    #[arg(long = "enrich", help_heading = "Lookup")]
    pub enrich: bool,

    /// Use a specific TOML configuration file
    #[arg(long = "config", value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<String>,

    /// Show debug logging on stderr
    #[arg(short = 'v', long = "verbose", help_heading = "Configuration")]
    pub verbose: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    init_logging(args.verbose);
    debug!("domain-report v{} starting", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run_report(args).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "domain_report=debug,domain_report_lib=debug"
    } else {
        "domain_report=warn,domain_report_lib=warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

/// Load, look up, write, report.
async fn run_report(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = build_config(&args)?;
    debug!(?config, "Resolved configuration");

    let domains = load_domains(&config.input_path)?;
    let reporter = DomainReporter::new(config)?;

    let start = Instant::now();
    let records = reporter
        .check_domains(&domains, ui::print_progress)
        .await;

    let output_path = &reporter.config().output_path;
    write_report(output_path, &records)?;

    ui::print_completion(output_path);
    ui::print_summary(ui::OutcomeCounts::from_records(&records), start.elapsed());

    Ok(())
}

/// Build the run configuration with proper precedence:
/// 1. CLI arguments (highest)
/// 2. Environment variables (DR_*)
/// 3. Config file (--config, DR_CONFIG, or ./domain-report.toml / ./.domain-report.toml)
/// 4. Built-in defaults
fn build_config(args: &Args) -> Result<ReportConfig, Box<dyn std::error::Error>> {
    let config_manager = ConfigManager::new();
    let env_config = load_env_config();

    // Step 1: Load the config file, explicit path first
    let file_config = match args.config.as_ref().or(env_config.config.as_ref()) {
        Some(path) => {
            debug!("Using explicit config file: {}", path);
            config_manager
                .load_file(path)
                .map_err(|e| format!("Failed to load config file '{}': {}", path, e))?
        }
        None => config_manager.discover_and_load()?,
    };

    let config = apply_file_config(ReportConfig::default(), &file_config);

    // Step 2: Apply environment variables (DR_*)
    let config = apply_environment_config(config, &env_config, &file_config);

    // Step 3: Apply CLI arguments (highest precedence)
    let config = apply_cli_args_to_config(config, args, &file_config);

    validate_report_config(&config)?;
    Ok(config)
}

/// Apply `DR_*` values on top of the file configuration.
fn apply_environment_config(
    mut config: ReportConfig,
    env_config: &EnvConfig,
    file_config: &FileConfig,
) -> ReportConfig {
    if let Some(file) = &env_config.file {
        config.input_path = PathBuf::from(file);
    }
    if let Some(output) = &env_config.output {
        config.output_path = PathBuf::from(output);
    }
    match env_config.enrich {
        Some(true) if config.enrichment.is_none() => {
            config.enrichment = Some(file_config.enrichment_settings());
        }
        Some(false) => config.enrichment = None,
        _ => {}
    }
    config
}

/// Apply CLI arguments to config (highest precedence).
///
/// `--enrich` only ever switches enrichment on; leaving it out keeps whatever
/// the environment or config file decided.
fn apply_cli_args_to_config(
    mut config: ReportConfig,
    args: &Args,
    file_config: &FileConfig,
) -> ReportConfig {
    if let Some(file) = &args.file {
        config.input_path = PathBuf::from(file);
    }
    if let Some(output) = &args.output {
        config.output_path = PathBuf::from(output);
    }
    if args.enrich && config.enrichment.is_none() {
        config.enrichment = Some(file_config.enrichment_settings());
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_report_lib::{
        EnrichmentConfig, EnrichmentSection, DEFAULT_INPUT_FILE, DEFAULT_OUTPUT_FILE,
    };

    fn create_test_args() -> Args {
        Args {
            file: None,
            output: None,
            enrich: false,
            config: None,
            verbose: false,
        }
    }

    fn file_config_with_attribute(attribute: &str) -> FileConfig {
        FileConfig {
            enrichment: Some(EnrichmentSection {
                attribute: Some(attribute.to_string()),
                ..EnrichmentSection::default()
            }),
            ..FileConfig::default()
        }
    }

    #[test]
    fn test_args_parse_all_flags() {
        let args = Args::try_parse_from([
            "domain-report",
            "-f",
            "lista.txt",
            "-o",
            "saida.csv",
            "--enrich",
            "--config",
            "cfg.toml",
            "-v",
        ])
        .unwrap();

        assert_eq!(args.file.as_deref(), Some("lista.txt"));
        assert_eq!(args.output.as_deref(), Some("saida.csv"));
        assert!(args.enrich);
        assert_eq!(args.config.as_deref(), Some("cfg.toml"));
        assert!(args.verbose);
    }

    #[test]
    fn test_args_reject_positional_domains() {
        assert!(Args::try_parse_from(["domain-report", "example.com"]).is_err());
    }

    #[test]
    fn test_defaults_untouched_without_overrides() {
        let file_config = FileConfig::default();
        let config = apply_file_config(ReportConfig::default(), &file_config);
        let config = apply_environment_config(config, &EnvConfig::default(), &file_config);
        let config = apply_cli_args_to_config(config, &create_test_args(), &file_config);

        assert_eq!(config.input_path, PathBuf::from(DEFAULT_INPUT_FILE));
        assert_eq!(config.output_path, PathBuf::from(DEFAULT_OUTPUT_FILE));
        assert!(config.enrichment.is_none());
    }

    #[test]
    fn test_cli_overrides_env() {
        let file_config = FileConfig::default();
        let env_config = EnvConfig {
            file: Some("env.txt".to_string()),
            output: Some("env.csv".to_string()),
            ..EnvConfig::default()
        };
        let mut args = create_test_args();
        args.output = Some("cli.csv".to_string());

        let config = apply_environment_config(ReportConfig::default(), &env_config, &file_config);
        let config = apply_cli_args_to_config(config, &args, &file_config);

        assert_eq!(config.input_path, PathBuf::from("env.txt"));
        assert_eq!(config.output_path, PathBuf::from("cli.csv"));
    }

    #[test]
    fn test_enrich_flag_uses_file_settings() {
        let file_config = file_config_with_attribute("data-owner");
        let mut args = create_test_args();
        args.enrich = true;

        let config = apply_cli_args_to_config(ReportConfig::default(), &args, &file_config);
        let enrichment = config.enrichment.unwrap();
        assert_eq!(enrichment.attribute, "data-owner");
        assert_eq!(enrichment.cell_marker, EnrichmentConfig::default().cell_marker);
    }

    #[test]
    fn test_env_can_disable_enrichment() {
        let file_config = FileConfig::default();
        let config = ReportConfig::default().with_enrichment(Some(EnrichmentConfig::default()));
        let env_config = EnvConfig {
            enrich: Some(false),
            ..EnvConfig::default()
        };

        let config = apply_environment_config(config, &env_config, &file_config);
        assert!(config.enrichment.is_none());
    }

    #[test]
    fn test_missing_enrich_flag_keeps_env_choice() {
        let file_config = FileConfig::default();
        let env_config = EnvConfig {
            enrich: Some(true),
            ..EnvConfig::default()
        };

        let config = apply_environment_config(ReportConfig::default(), &env_config, &file_config);
        let config = apply_cli_args_to_config(config, &create_test_args(), &file_config);
        assert!(config.enrichment.is_some());
    }
}
