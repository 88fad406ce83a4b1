use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use distscan::{
    cache::Cache,
    checker::{default_checker, DescriptorChecker, FieldChecker, LatestChecker},
    config::Config,
    metadata::parse_metadata,
    model::{Descriptor, Distribution, ScanReport, Severity, Source},
    output::{format_report_to_string, print_report, OutputFormat},
    platform::site_packages_dirs,
    scanner::{all_scanners, get_scanner, Scanner},
    version::Version,
};
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Exit codes for CI integration
mod exit_codes {
    pub const SUCCESS: u8 = 0;
    pub const ERROR: u8 = 1;
    pub const CHECK_ERROR: u8 = 2;
    pub const CHECK_WARNING: u8 = 3;
}

#[derive(Parser)]
#[command(name = "distscan")]
#[command(
    author,
    version,
    about = "Scan and validate installed package metadata"
)]
struct Cli {
    /// Log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan installed distributions and validate their descriptors
    Scan {
        /// Filter by source (dist-info, egg-info)
        #[arg(short, long)]
        source: Option<String>,

        /// Output format (table, json)
        #[arg(short, long)]
        format: Option<String>,

        /// Extra directories to search for descriptor records
        #[arg(short, long)]
        path: Vec<PathBuf>,

        /// Skip descriptor validation
        #[arg(long)]
        no_check: bool,

        /// Skip checking the index for newer releases
        #[arg(long)]
        no_outdated_check: bool,

        /// Runtime version descriptors should support (overrides config)
        #[arg(long)]
        runtime: Option<String>,

        /// Write output to file
        #[arg(short, long)]
        output: Option<String>,

        /// Clear cache before scanning
        #[arg(long)]
        clear_cache: bool,

        /// Exit with error if findings at or above this severity are present
        #[arg(long, value_enum)]
        fail_on: Option<FailLevel>,

        /// Disable concurrent scanning (scan sources sequentially)
        #[arg(long)]
        no_parallel: bool,
    },

    /// Parse one descriptor record and display its fields
    Show {
        /// Path to a METADATA or PKG-INFO file
        file: PathBuf,

        /// Output format (table, json)
        #[arg(short, long)]
        format: Option<String>,
    },

    /// Validate one descriptor record
    Check {
        /// Path to a METADATA or PKG-INFO file
        file: PathBuf,

        /// Runtime version the record should support
        #[arg(long)]
        runtime: Option<String>,
    },

    /// List available sources
    ListSources,

    /// Show or create config file
    Config {
        /// Generate default config file
        #[arg(long)]
        init: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },

    /// Clear the cache
    ClearCache,
}

#[derive(Clone, Copy, ValueEnum)]
enum FailLevel {
    Error,
    Warning,
}

struct ScanOptions {
    source: Option<String>,
    format: String,
    paths: Vec<PathBuf>,
    skip_checks: bool,
    check_outdated: bool,
    runtime: Option<String>,
    output_file: Option<String>,
    fail_on: Option<FailLevel>,
    parallel: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_codes::ERROR)
        }
    }
}

fn init_logging(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<u8> {
    let config = Config::load().unwrap_or_default();

    match cli.command {
        Commands::Scan {
            source,
            format,
            path,
            no_check,
            no_outdated_check,
            runtime,
            output,
            clear_cache,
            fail_on,
            no_parallel,
        } => {
            if clear_cache {
                let cache = Cache::new();
                cache.clear()?;
            }

            let options = ScanOptions {
                source,
                format: format.unwrap_or_else(|| config.default_format.clone()),
                paths: path,
                skip_checks: no_check || config.skip_checks,
                check_outdated: !no_outdated_check && config.check_outdated,
                runtime: runtime.or_else(|| config.target_runtime.clone()),
                output_file: output,
                fail_on,
                parallel: !no_parallel,
            };

            run_scan(options, &config).await
        }
        Commands::Show { file, format } => {
            let format_str = format.unwrap_or_else(|| config.default_format.clone());
            show_record(&file, &format_str)
        }
        Commands::Check { file, runtime } => {
            let runtime = runtime.or_else(|| config.target_runtime.clone());
            check_record(&file, runtime.as_deref())
        }
        Commands::ListSources => {
            list_sources();
            Ok(exit_codes::SUCCESS)
        }
        Commands::Config { init, path } => {
            handle_config(init, path)?;
            Ok(exit_codes::SUCCESS)
        }
        Commands::ClearCache => {
            let cache = Cache::new();
            cache.clear()?;
            println!("Cache cleared.");
            Ok(exit_codes::SUCCESS)
        }
    }
}

async fn run_scan(options: ScanOptions, config: &Config) -> Result<u8> {
    let format = OutputFormat::from_str(&options.format).map_err(|e| anyhow::anyhow!(e))?;
    let is_interactive = format == OutputFormat::Table;

    let mut extra_roots = config.search_paths.clone();
    extra_roots.extend(options.paths);

    let scanners: Vec<Box<dyn Scanner>> = if let Some(source_name) = options.source {
        let source = parse_source(&source_name)?;
        vec![get_scanner(source, extra_roots)]
    } else {
        all_scanners(extra_roots)
    };

    // Scan sources (concurrently or sequentially)
    let mut distributions = if options.parallel && scanners.len() > 1 {
        scan_concurrent(&scanners, is_interactive).await
    } else {
        scan_sequential(&scanners, is_interactive).await
    };

    distributions.retain(|d| !config.ignore.should_ignore_package(&d.descriptor.name));
    distributions.sort_by(|a, b| a.descriptor.name.cmp(&b.descriptor.name));

    let mut report = ScanReport::new(distributions);

    // Validate descriptors
    if !options.skip_checks && !report.distributions.is_empty() {
        let check_progress = spinner(is_interactive, "Validating descriptors...");

        let checker = match &options.runtime {
            Some(raw) => {
                let runtime: Version = raw
                    .parse()
                    .with_context(|| format!("invalid runtime version {:?}", raw))?;
                FieldChecker::with_target_runtime(runtime)
            }
            None => default_checker(),
        };

        if let Ok(mut findings) = checker.check(&report.distributions).await {
            findings.retain(|f| !config.ignore.should_ignore_finding(f.code.as_str()));
            report.findings = findings;
        }

        if let Some(pb) = check_progress {
            pb.finish_with_message(format!("Found {} findings", report.findings.len()));
        }
    }

    // Check for newer index releases
    if options.check_outdated && !report.distributions.is_empty() {
        let outdated_progress = spinner(is_interactive, "Checking for newer releases...");

        let checker = LatestChecker::with_cache(Cache::with_ttl_hours(config.cache_ttl_hours));
        let candidates: Vec<Distribution> = report
            .distributions
            .iter()
            .filter(|d| !config.ignore.should_ignore_outdated(&d.descriptor.name))
            .cloned()
            .collect();

        if let Ok(outdated) = checker.check_outdated(&candidates).await {
            report.outdated = outdated;
        }

        if let Some(pb) = outdated_progress {
            pb.finish_with_message(format!(
                "Found {} outdated distributions",
                report.outdated.len()
            ));
        }
    }

    // Handle output
    if let Some(path) = options.output_file {
        let content = format_report_to_string(&report, format)?;
        std::fs::write(&path, content)?;
        if is_interactive {
            println!("Report written to: {}", path);
        }
    } else {
        print_report(&report, format)?;
    }

    Ok(determine_exit_code(&report, options.fail_on))
}

fn spinner(is_interactive: bool, message: &'static str) -> Option<ProgressBar> {
    if !is_interactive {
        return None;
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(message);
    Some(pb)
}

/// Scan all sources concurrently using tokio tasks
async fn scan_concurrent(scanners: &[Box<dyn Scanner>], is_interactive: bool) -> Vec<Distribution> {
    let progress = if is_interactive {
        let pb = ProgressBar::new(scanners.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} Scanning sources...")
                .unwrap()
                .progress_chars("#>-"),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(Arc::new(pb))
    } else {
        None
    };

    let futures: Vec<_> = scanners
        .iter()
        .map(|scanner| {
            let pb = progress.clone();
            async move {
                let result = if scanner.is_supported() {
                    scanner.scan().await.unwrap_or_default()
                } else {
                    Vec::new()
                };
                if let Some(ref pb) = pb {
                    pb.inc(1);
                }
                result
            }
        })
        .collect();

    let results = join_all(futures).await;

    if let Some(pb) = progress {
        let total: usize = results.iter().map(|r| r.len()).sum();
        pb.finish_with_message(format!("Found {} distributions", total));
    }

    results.into_iter().flatten().collect()
}

/// Scan sources sequentially
async fn scan_sequential(scanners: &[Box<dyn Scanner>], is_interactive: bool) -> Vec<Distribution> {
    let mut all_distributions = Vec::new();

    let scan_progress = if is_interactive {
        let pb = ProgressBar::new(scanners.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("#>-"),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    for scanner in scanners {
        if let Some(ref pb) = scan_progress {
            pb.set_message(format!("Scanning {}...", scanner.name()));
        }

        if !scanner.is_supported() {
            if let Some(ref pb) = scan_progress {
                pb.inc(1);
            }
            continue;
        }

        match scanner.scan().await {
            Ok(distributions) => {
                all_distributions.extend(distributions);
            }
            Err(_) => {
                // Silently continue on errors during scanning
            }
        }

        if let Some(ref pb) = scan_progress {
            pb.inc(1);
        }
    }

    if let Some(pb) = scan_progress {
        pb.finish_with_message(format!("Found {} distributions", all_distributions.len()));
    }

    all_distributions
}

/// Determine the exit code based on findings and the --fail-on setting
fn determine_exit_code(report: &ScanReport, fail_on: Option<FailLevel>) -> u8 {
    let fail_on = match fail_on {
        Some(level) => level,
        None => return exit_codes::SUCCESS,
    };

    let has_errors = report.count_by_severity(Severity::Error) > 0;
    let has_warnings = report.count_by_severity(Severity::Warning) > 0;

    match fail_on {
        FailLevel::Error => {
            if has_errors {
                exit_codes::CHECK_ERROR
            } else {
                exit_codes::SUCCESS
            }
        }
        FailLevel::Warning => {
            if has_errors {
                exit_codes::CHECK_ERROR
            } else if has_warnings {
                exit_codes::CHECK_WARNING
            } else {
                exit_codes::SUCCESS
            }
        }
    }
}

fn show_record(file: &Path, format: &str) -> Result<u8> {
    let format = OutputFormat::from_str(format).map_err(|e| anyhow::anyhow!(e))?;
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let descriptor = parse_metadata(&content)?;

    match format {
        OutputFormat::Json => {
            let dist =
                Distribution::new(descriptor, Source::File).with_path(file.to_path_buf());
            println!("{}", serde_json::to_string_pretty(&dist)?);
        }
        OutputFormat::Table => print_descriptor(&descriptor),
    }

    Ok(exit_codes::SUCCESS)
}

fn print_descriptor(d: &Descriptor) {
    let field = |label: &str, value: &str| println!("  {:<26} {}", label, value);

    println!("{}", d.release_id());
    println!();
    if let Some(v) = &d.metadata_version {
        field("Metadata-Version:", v);
    }
    field("Name:", &d.name);
    field("Version:", d.version.as_str());
    if let Some(v) = &d.summary {
        field("Summary:", v);
    }
    if let Some(v) = &d.homepage {
        field("Home-page:", v);
    }
    if let Some(v) = &d.author {
        field("Author:", v);
    }
    if let Some(v) = &d.author_email {
        field("Author-email:", v);
    }
    if let Some(v) = &d.license {
        field("License:", v);
    }
    if !d.keywords.is_empty() {
        let joined = d
            .keywords
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        field("Keywords:", &joined);
    }
    for classifier in &d.classifiers {
        field("Classifier:", classifier);
    }
    if let Some(spec) = &d.requires_python {
        field("Requires-Python:", &spec.to_string());
    }
    if let Some(ct) = &d.description_content_type {
        field("Description-Content-Type:", ct.as_str());
    }
    for extra in &d.extras {
        field("Provides-Extra:", extra);
    }
    for license_file in &d.license_files {
        field("License-File:", license_file);
    }
    for (key, value) in &d.unknown {
        field(&format!("{}:", key), value);
    }
    if let Some(body) = &d.description {
        println!();
        println!("{}", body);
    }
}

fn check_record(file: &Path, runtime: Option<&str>) -> Result<u8> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;

    let descriptor = match parse_metadata(&content) {
        Ok(d) => d,
        Err(err) => {
            println!("{}: rejected ({})", file.display(), err);
            return Ok(exit_codes::CHECK_ERROR);
        }
    };

    let checker = match runtime {
        Some(raw) => {
            let runtime: Version = raw
                .parse()
                .with_context(|| format!("invalid runtime version {:?}", raw))?;
            FieldChecker::with_target_runtime(runtime)
        }
        None => FieldChecker::new(),
    };

    let findings = checker.check_descriptor(&descriptor);

    println!("{}", descriptor.release_id());
    for finding in &findings {
        println!(
            "  [{}] {}: {}",
            severity_label(finding.severity),
            finding.code.as_str(),
            finding.message
        );
    }

    let errors = findings
        .iter()
        .filter(|f| f.severity == Severity::Error)
        .count();
    let warnings = findings
        .iter()
        .filter(|f| f.severity == Severity::Warning)
        .count();

    if errors > 0 {
        Ok(exit_codes::CHECK_ERROR)
    } else if warnings > 0 {
        Ok(exit_codes::CHECK_WARNING)
    } else {
        println!("  descriptor is valid");
        Ok(exit_codes::SUCCESS)
    }
}

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Info => "info",
    }
}

fn list_sources() {
    println!("Available sources:");
    println!();

    let sources = [
        (
            "dist-info",
            "dist-info records",
            "<site-packages>/*.dist-info/METADATA",
        ),
        (
            "egg-info",
            "egg-info records",
            "<site-packages>/*.egg-info/PKG-INFO",
        ),
    ];

    for (id, name, location) in sources {
        let scanner = get_scanner(parse_source(id).unwrap(), Vec::new());
        let supported = if scanner.is_supported() { "yes" } else { "no" };

        println!("  {:<12} {:<22} [supported: {}]", id, name, supported);
        println!("  {:<12} Location: {}", "", location);
        println!();
    }

    let roots = site_packages_dirs();
    if roots.is_empty() {
        println!("No site-packages roots found on this machine.");
    } else {
        println!("Search roots on this machine:");
        for root in roots {
            println!("  {}", root.display());
        }
    }
}

fn handle_config(init: bool, show_path: bool) -> Result<()> {
    let config_path = Config::config_path();

    if show_path {
        println!("{}", config_path.display());
        return Ok(());
    }

    if init {
        if config_path.exists() {
            println!("Config file already exists at: {}", config_path.display());
            return Ok(());
        }

        let config = Config::default();
        config.save()?;
        println!("Created config file at: {}", config_path.display());
        println!();
        println!("Default configuration:");
        println!("{}", Config::generate_default_config());
        return Ok(());
    }

    // Show current config
    if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)?;
        println!("Config file: {}", config_path.display());
        println!();
        println!("{}", content);
    } else {
        println!("No config file found.");
        println!("Run 'distscan config --init' to create one.");
        println!();
        println!("Config path: {}", config_path.display());
    }

    Ok(())
}

fn parse_source(s: &str) -> Result<Source> {
    match s.to_lowercase().as_str() {
        "dist-info" | "distinfo" | "wheel" => Ok(Source::DistInfo),
        "egg-info" | "egginfo" | "egg" => Ok(Source::EggInfo),
        _ => Err(anyhow::anyhow!(
            "Unknown source: {}. Use: dist-info, egg-info",
            s
        )),
    }
}
