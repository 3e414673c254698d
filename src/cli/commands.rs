//! Search command implementation
//!
//! Sets up logging, layers the configuration, loads the catalog, runs the
//! expanding search against the metadata directory with progress reporting,
//! and prints or persists the report.

use crate::catalog::Catalog;
use crate::cli::args::{Args, OutputFormat};
use crate::config::SearchConfig;
use crate::inventory::MetadataDirectory;
use crate::report::{ReportOutcome, SearchReport};
use crate::search::{InventoryStatus, SearchDriver};
use anyhow::{Context, Result};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

/// Run one calibration search and emit its report
pub async fn run(args: Args) -> Result<SearchReport> {
    setup_logging(&args);

    info!("Starting calibration search for {}", args.date);
    debug!("Command line arguments: {:?}", args);

    args.validate()?;

    let config = load_configuration(&args)?;
    debug!("Loaded configuration: {:?}", config);

    let catalog = load_catalog(&args)?;
    debug!(
        "Loaded {} standard stars from {}",
        catalog.len(),
        catalog.source().display()
    );

    let source = MetadataDirectory::new(&args.metadata_dir);
    let driver = SearchDriver::new(source, catalog, config)?;

    let progress_bar = create_progress_bar(&args, driver.config());
    let outcome = driver
        .run_with_observer(args.date, |visit, state| {
            if let Some(pb) = &progress_bar {
                pb.inc(1);
                let detail = match &visit.status {
                    InventoryStatus::Available { records } => format!("{} records", records),
                    InventoryStatus::Unavailable { .. } => "unavailable".to_string(),
                };
                pb.set_message(format!(
                    "{} ({}, {} kinds short)",
                    visit.date,
                    detail,
                    state.tracker().shortfalls().len()
                ));
            }
        })
        .await;
    if let Some(pb) = &progress_bar {
        pb.finish_and_clear();
    }

    let report = SearchReport::from_outcome(&outcome);
    emit_report(&args, driver.config(), &report)?;

    Ok(report)
}

/// Default filter directive for this crate's spans and events
fn log_directive(args: &Args) -> String {
    format!("{}={}", env!("CARGO_CRATE_NAME"), args.get_log_level())
}

/// Install the stderr subscriber; `RUST_LOG` takes precedence over `-v`/`-q`.
///
/// Quiet runs use a compact line without timestamps, others prefix each
/// line with the time since start.
fn setup_logging(args: &Args) {
    use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_directive(args)));

    let output = fmt::layer().with_target(false).with_writer(std::io::stderr);
    let output = if args.quiet {
        output.without_time().compact().boxed()
    } else {
        output.with_timer(fmt::time::uptime()).boxed()
    };

    tracing_subscriber::registry().with(filter).with(output).init();
    debug!("Log filter: {}", log_directive(args));
}

/// Load configuration using the layered approach (defaults -> file -> args)
fn load_configuration(args: &Args) -> Result<SearchConfig> {
    let config_file = match &args.config_file {
        Some(path) => Some(path.clone()),
        None => SearchConfig::default_config_path().filter(|path| path.exists()),
    };

    let mut config = match &config_file {
        Some(path) => {
            info!("Using config file: {}", path.display());
            SearchConfig::load(path)
                .with_context(|| format!("Failed to load config file {}", path.display()))?
        }
        None => {
            info!("No config file found, using defaults");
            SearchConfig::default()
        }
    };

    apply_cli_overrides(&mut config, args);
    config.validate()?;

    Ok(config)
}

/// Apply CLI argument overrides to configuration
fn apply_cli_overrides(config: &mut SearchConfig, args: &Args) {
    if let Some(days) = args.days {
        config.days_to_check = days;
    }
    if let Some(tolerance) = args.tolerance {
        config.tolerance_arcsec = tolerance;
    }
    if let Some(order) = args.order {
        config.search_order = order;
    }
    if let Some(prefetch) = args.prefetch {
        config.prefetch = prefetch;
    }
    if args.summary {
        config.emit_summary_artifact = true;
    }

    for (kind, min_frames) in args.requirement_overrides() {
        *config = std::mem::take(config).with_requirement(kind, min_frames);
    }
}

fn load_catalog(args: &Args) -> Result<Catalog> {
    let catalog = match &args.catalog {
        Some(path) => Catalog::load(path)?,
        None => Catalog::builtin().context("Built-in standard star catalog is malformed")?,
    };
    Ok(catalog)
}

fn create_progress_bar(args: &Args, config: &SearchConfig) -> Option<ProgressBar> {
    if !args.show_progress() {
        return None;
    }

    let nights = u64::try_from(config.days_to_check)
        .unwrap_or(0)
        .saturating_mul(2)
        .saturating_add(1);
    let pb = ProgressBar::new(nights);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb.set_message(format!("Checking {}", args.date));
    Some(pb)
}

/// Print the report and write any requested files
fn emit_report(args: &Args, config: &SearchConfig, report: &SearchReport) -> Result<()> {
    match args.format {
        OutputFormat::Json => println!("{}", report.to_json()?),
        OutputFormat::Text => {
            let heading = format!("KCWI calibrations for {}", report.anchor);
            let heading = match report.outcome {
                ReportOutcome::Satisfied => heading.as_str().bright_green().bold(),
                ReportOutcome::Partial { .. } => heading.as_str().bright_yellow().bold(),
                ReportOutcome::NoData => heading.as_str().bright_red().bold(),
            };
            println!("{}", heading);
            println!();
            print!("{}", report.render_text());
        }
    }

    if config.emit_summary_artifact {
        let path = report
            .write_artifact(&args.output_dir)
            .with_context(|| format!("Failed to write summary to {}", args.output_dir.display()))?;
        if args.format == OutputFormat::Text {
            println!();
            println!("{} {}", "Summary file saved to:".cyan(), path.display());
        }
    }

    if let Some(path) = &args.download_list {
        let count = report
            .write_download_list(path)
            .with_context(|| format!("Failed to write download list {}", path.display()))?;
        info!("Wrote {} identifiers to {}", count, path.display());
        if args.format == OutputFormat::Text {
            println!("{} {} ({} frames)", "Download list:".cyan(), path.display(), count);
        }
    }

    Ok(())
}
