use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use eps2pdf::config::{
    ConversionOptions, DEFAULT_ARCHIVE_FOLDER, PdfCompatibility, parse_archive_folder,
};
use eps2pdf::ghostscript::{self, GhostscriptConverter};
use eps2pdf::{BatchReport, convert_batch};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "eps2pdf",
    version,
    about = "Convert EPS files to PDF and move the originals into an archive folder"
)]
struct Cli {
    /// Input paths; entries not ending in .eps or .epsf are ignored
    paths: Vec<String>,

    /// Skip files whose PDF already exists instead of overwriting it
    #[arg(long = "no-overwrite")]
    no_overwrite: bool,

    /// Name of the archive subfolder created next to each source
    #[arg(
        long = "archive-dir",
        default_value = DEFAULT_ARCHIVE_FOLDER,
        value_parser = parse_archive_folder
    )]
    archive_dir: String,

    /// Target PDF version (1.3-1.7 or acrobat4-acrobat8)
    #[arg(long, default_value = "1.7", value_parser = PdfCompatibility::parse)]
    compat: PdfCompatibility,

    /// Do not embed page thumbnails
    #[arg(long = "no-thumbnails")]
    no_thumbnails: bool,

    /// Do not try to keep spot colors
    #[arg(long = "no-spot-colors")]
    no_spot_colors: bool,

    /// Do not try to keep the document editable
    #[arg(long = "no-editability")]
    no_editability: bool,

    /// Re-open every produced PDF and require at least one page
    #[arg(long)]
    verify: bool,

    /// Ghostscript executable
    #[arg(long, env = "EPS2PDF_GHOSTSCRIPT", default_value = ghostscript::DEFAULT_BINARY)]
    ghostscript: PathBuf,

    /// Print the per-item report after the summary
    #[arg(long, value_enum)]
    report: Option<ReportFormat>,

    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
enum ReportFormat {
    Json,
}

impl Cli {
    fn options(&self) -> ConversionOptions {
        ConversionOptions {
            overwrite: !self.no_overwrite,
            archive_folder: self.archive_dir.clone(),
            preserve_editability: !self.no_editability,
            preserve_spot_colors: !self.no_spot_colors,
            generate_thumbnails: !self.no_thumbnails,
            view_after_saving: false,
            compatibility: self.compat,
            verify_output: self.verify,
        }
    }
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let converter = GhostscriptConverter::new(&cli.ghostscript);
    if !converter.is_available() {
        tracing::warn!(
            binary = %cli.ghostscript.display(),
            "ghostscript not found; every conversion will fail"
        );
    }

    let report = convert_batch(converter, cli.options(), &cli.paths);

    for warning in &report.warnings {
        eprintln!("Warning: {warning}");
    }
    println!("{}", report.summary);

    if let Some(ReportFormat::Json) = cli.report {
        println!("{}", render_json(&report)?);
    }
    Ok(())
}

fn render_json(report: &BatchReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("serializing report")
}

/// Log to stderr; `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) -> Result<()> {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))
}
