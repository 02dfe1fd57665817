use apkintersect::apk::{find_dump_files, ApkDump, ManifestProvider, TagCounter};
use apkintersect::report::PatternCheck;
use apkintersect::{
    ApkHandle, Config, FeatureSelection, Intersector, ManifestIntersection, ManifestPattern,
    ReportFormat, Reporter,
};
use clap::Parser;
use miette::{IntoDiagnostic, Result, WrapErr};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// apkintersect - What a family of APKs has in common
#[derive(Parser, Debug)]
#[command(name = "apkintersect")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Feature dumps (JSON/YAML) or directories of dumps, in fold order
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Class-name substring to leave out of the string reference
    /// intersection (can be specified multiple times)
    #[arg(long)]
    filter: Vec<String>,

    /// Drop the configured filters, keeping only --filter ones
    #[arg(long)]
    no_default_filters: bool,

    /// Features to compute (comma-separated): manifest, tag_numbers,
    /// permissions, actions, string_refs, apis, dex_strings, resources, trees
    #[arg(long, value_delimiter = ',')]
    only: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Output file (for json format)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Dumps to test against the manifest pattern of the family
    /// (can be specified multiple times)
    #[arg(long, value_name = "PATH")]
    check: Vec<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode - only output results
    #[arg(short, long)]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum OutputFormat {
    Terminal,
    Json,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Terminal => ReportFormat::Terminal,
            OutputFormat::Json => ReportFormat::Json,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    info!("apkintersect v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&cli)?;
    run(&config, &cli)
}

fn init_logging(verbose: bool, quiet: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else {
        Config::from_default_locations(Path::new("."))?
    };

    // Override with CLI arguments
    if cli.no_default_filters {
        config.filters.clear();
    }
    config.add_filters(cli.filter.iter().cloned());

    if !cli.only.is_empty() {
        config.features = FeatureSelection::only(cli.only.as_slice()).map_err(|name| {
            miette::miette!(
                "Unknown feature '{}' (expected one of: {})",
                name,
                FeatureSelection::NAMES.join(", ")
            )
        })?;
    }

    Ok(config)
}

fn load_dumps(paths: &[PathBuf]) -> Result<Vec<ApkDump>> {
    let files = find_dump_files(paths);
    if files.is_empty() {
        return Err(miette::miette!("No feature dumps found"));
    }

    // Parallel load, collected back in input order
    files
        .par_iter()
        .map(|path| {
            ApkDump::from_file(path)
                .into_diagnostic()
                .wrap_err_with(|| format!("Failed to load dump: {}", path.display()))
        })
        .collect()
}

fn run(config: &Config, cli: &Cli) -> Result<()> {
    let start_time = Instant::now();

    let format: ReportFormat = match &cli.format {
        Some(format) => format.clone().into(),
        None => ReportFormat::parse(&config.report.format)
            .ok_or_else(|| miette::miette!("Unknown report format '{}'", config.report.format))?,
    };

    let apks = load_dumps(&cli.paths)?;
    info!("Loaded {} APK dumps", apks.len());

    let intersector = Intersector::new(&apks);
    let fingerprint = intersector.fingerprint(&config.features, config.filters.as_slice());

    let checks = if cli.check.is_empty() {
        Vec::new()
    } else {
        let family = match &fingerprint.manifest {
            Some(manifest) => manifest.clone(),
            None => intersector.intersect_manifest(),
        };
        check_against(&family, &cli.check)?
    };

    debug!("Intersection done in {:.2?}", start_time.elapsed());

    let reporter =
        Reporter::new(format, cli.output.clone()).with_max_items(config.report.max_items);
    reporter.report(&fingerprint, &checks)
}

fn check_against(family: &ManifestIntersection, paths: &[PathBuf]) -> Result<Vec<PatternCheck>> {
    let candidates = load_dumps(paths)?;

    let matcher = if family.pattern.is_empty() {
        warn!("Family has no manifest pattern; nothing to check against");
        None
    } else {
        let matcher = ManifestPattern::compile(&family.pattern)
            .into_diagnostic()
            .wrap_err("Failed to compile manifest pattern")?;
        Some(matcher)
    };

    Ok(candidates
        .iter()
        .map(|apk| PatternCheck {
            label: apk.label().to_string(),
            matched: matcher.as_ref().and_then(|matcher| {
                apk.org_manifest().map(|manifest| matcher.is_match(&manifest))
            }),
            tags_out_of_range: apk
                .manifest_tag_numbers()
                .map(|report| family.tag_counts.out_of_range(&report))
                .unwrap_or_default(),
        })
        .collect())
}
