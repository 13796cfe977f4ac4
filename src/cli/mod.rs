//! # CLI Module
//!
//! Command-line front end for the image format converter.
//!
//! ## Usage
//! ```bash
//! # Convert the selected image (direction inferred from its extension)
//! img-convert convert ~/Photos/beach.jpg
//!
//! # Convert every PNG in a directory tree to JPEG at quality 85
//! img-convert batch ~/Screenshots --to jpeg --quality 85 --recursive
//!
//! # JSON report, no confirmation prompt
//! img-convert batch ~/Photos --yes --output json
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use console::{style, Term};
use image_format_converter::config::ConverterSettings;
use image_format_converter::core::reporter::{describe_outcome, format_duration, summary};
use image_format_converter::core::scanner::{ScanConfig, SourceScanner, WalkDirScanner};
use image_format_converter::error::{ConvertError, Result};
use image_format_converter::events::{BatchEvent, Event, EventChannel};
use image_format_converter::{
    init_tracing, start_batch_conversion, start_single_conversion, BatchReport,
    ConversionOutcome, TargetFormat,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::thread;

/// Image Format Converter - JPEG to PNG and back
#[derive(Parser, Debug)]
#[command(name = "img-convert")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert a single image
    Convert {
        /// Image to convert
        file: PathBuf,

        /// Target format (default: PNG for JPEG input, JPEG for PNG input)
        #[arg(long)]
        to: Option<Format>,

        #[command(flatten)]
        options: ConvertOptions,
    },
    /// Convert all matching images in a directory
    Batch {
        /// Directory to convert
        dir: PathBuf,

        /// Target format
        #[arg(long, default_value = "png")]
        to: Format,

        /// Include subdirectories
        #[arg(short, long)]
        recursive: bool,

        /// Include hidden files and directories
        #[arg(long)]
        include_hidden: bool,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,

        #[command(flatten)]
        options: ConvertOptions,
    },
}

/// Flags shared by both commands; unset flags fall back to the settings file
#[derive(Args, Debug)]
struct ConvertOptions {
    /// JPEG quality, 1-100
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: Option<u8>,

    /// Overwrite target files that already exist
    #[arg(long, overrides_with = "no_overwrite")]
    overwrite: bool,

    /// Skip target files that already exist
    #[arg(long, overrides_with = "overwrite")]
    no_overwrite: bool,

    /// Remove source files after a successful conversion
    #[arg(long, overrides_with = "keep_original")]
    delete_original: bool,

    /// Keep source files after conversion
    #[arg(long, overrides_with = "delete_original")]
    keep_original: bool,

    /// Copy the source file's date onto the converted file
    #[arg(long, overrides_with = "no_preserve_timestamp")]
    preserve_timestamp: bool,

    /// Do not copy the source file's date onto the converted file
    #[arg(long, overrides_with = "preserve_timestamp")]
    no_preserve_timestamp: bool,

    /// Log each conversion result
    #[arg(long, overrides_with = "no_log_each")]
    log_each: bool,

    /// Do not log each conversion result
    #[arg(long, overrides_with = "log_each")]
    no_log_each: bool,

    /// Output format
    #[arg(short, long, default_value = "pretty")]
    output: OutputFormat,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Settings file (default: <config dir>/image-format-converter/settings.json)
    #[arg(long)]
    config: Option<PathBuf>,
}

impl ConvertOptions {
    /// Settings file first, then flags on top
    fn settings(&self) -> Result<ConverterSettings> {
        let mut settings = match &self.config {
            Some(path) => ConverterSettings::load(path)?,
            None => ConverterSettings::load_or_default()?,
        };

        self.apply_to(&mut settings);
        Ok(settings)
    }

    fn apply_to(&self, settings: &mut ConverterSettings) {
        if let Some(quality) = self.quality {
            settings.jpeg_quality = quality;
        }
        if let Some(on) = switch(self.overwrite, self.no_overwrite) {
            settings.overwrite_if_exists = on;
        }
        if let Some(on) = switch(self.delete_original, self.keep_original) {
            settings.delete_original = on;
        }
        if let Some(on) = switch(self.preserve_timestamp, self.no_preserve_timestamp) {
            settings.preserve_timestamp = on;
        }
        if let Some(on) = switch(self.log_each, self.no_log_each) {
            settings.verbose_logging = on;
        }
    }
}

/// A `--flag` / `--no-flag` pair; `None` leaves the settings file value
fn switch(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    /// Lossless PNG
    Png,
    /// JPEG at the chosen quality
    Jpeg,
}

impl From<Format> for TargetFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Png => TargetFormat::Png,
            Format::Jpeg => TargetFormat::Jpeg,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
}

/// Run the CLI. Exits non-zero when a file failed or a batch was canceled.
pub fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert { file, to, options } => {
            init_tracing(options.verbose);
            run_convert(&file, to.map(Into::into), &options)
        }
        Commands::Batch {
            dir,
            to,
            recursive,
            include_hidden,
            yes,
            options,
        } => {
            init_tracing(options.verbose);
            run_batch(&dir, to.into(), recursive, include_hidden, yes, &options)
        }
    }
}

fn run_convert(file: &Path, to: Option<TargetFormat>, options: &ConvertOptions) -> Result<ExitCode> {
    let settings = options.settings()?;

    let format = match to.or_else(|| TargetFormat::for_source(file)) {
        Some(format) => format,
        None => {
            return Err(ConvertError::UnsupportedSource {
                path: file.to_path_buf(),
            }
            .into())
        }
    };

    let request = settings.request_for(file, format);
    let outcome = start_single_conversion(&request);

    match options.output {
        OutputFormat::Pretty => print_pretty_outcome(&outcome),
        OutputFormat::Json => print_json(&outcome),
    }

    Ok(exit_code(!matches!(outcome, ConversionOutcome::Failed { .. })))
}

fn run_batch(
    dir: &Path,
    format: TargetFormat,
    recursive: bool,
    include_hidden: bool,
    yes: bool,
    options: &ConvertOptions,
) -> Result<ExitCode> {
    let settings = options.settings()?;
    let term = Term::stderr();
    let pretty = matches!(options.output, OutputFormat::Pretty);

    let scanner = WalkDirScanner::new(ScanConfig {
        recursive,
        include_hidden: include_hidden || settings.include_hidden,
        ..Default::default()
    });
    let listing = scanner.list_sources(dir, format)?;

    for error in &listing.errors {
        tracing::warn!("{}", error);
    }

    let files = listing.files;
    if files.is_empty() {
        if pretty {
            term.write_line(&format!(
                "{} No images to convert in {}",
                style("!").yellow().bold(),
                dir.display()
            ))
            .ok();
        }
        return Ok(ExitCode::SUCCESS);
    }

    if !yes && !confirm(&term, files.len(), recursive, settings.delete_original) {
        term.write_line("Conversion not started.").ok();
        return Ok(ExitCode::SUCCESS);
    }

    let template = settings.request_for(PathBuf::new(), format);
    let total = files.len();
    let (sender, receiver) = EventChannel::new();

    let progress = if pretty {
        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░"),
        );
        Some(pb)
    } else {
        None
    };

    let progress_clone = progress.clone();

    // Handle events in a separate thread
    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            let Some(ref pb) = progress_clone else {
                continue;
            };
            match event {
                Event::Batch(BatchEvent::Progress(p)) => {
                    pb.set_position(p.processed as u64);
                    pb.set_message(
                        p.current_path
                            .file_name()
                            .unwrap_or_default()
                            .to_string_lossy()
                            .into_owned(),
                    );
                }
                Event::Batch(BatchEvent::FileLogged { path, elapsed_ms }) => {
                    pb.println(format!(
                        "  {} {} in {}",
                        style("✓").green(),
                        path.display(),
                        format_duration(std::time::Duration::from_millis(elapsed_ms))
                    ));
                }
                Event::Batch(BatchEvent::FileFailed { path, message }) => {
                    pb.println(format!(
                        "  {} {}: {}",
                        style("✗").red(),
                        path.display(),
                        message
                    ));
                }
                Event::Batch(BatchEvent::Completed { .. }) => pb.finish_and_clear(),
                _ => {}
            }
        }
    });

    // The sender moves into the job; the event thread ends when the job does
    let handle = start_batch_conversion(files, template, sender)?;

    // Ctrl-C stops the job after the current file; the summary still prints
    let token = handle.cancellation_token();
    if let Err(e) = ctrlc::set_handler(move || token.cancel()) {
        tracing::warn!("Could not install Ctrl-C handler: {}", e);
    }

    let report = handle.join()?;
    event_thread.join().ok();

    match options.output {
        OutputFormat::Pretty => print_pretty_report(&term, &report),
        OutputFormat::Json => print_json(&report),
    }

    Ok(exit_code(batch_succeeded(&report)))
}

/// A batch succeeds only when it ran to the end without failures
fn batch_succeeded(report: &BatchReport) -> bool {
    !report.canceled && report.failed_count == 0
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn confirm(term: &Term, count: usize, recursive: bool, delete_original: bool) -> bool {
    let scope = if recursive { " recursively" } else { "" };
    let warning = if delete_original {
        "Original images will be deleted upon completion."
    } else {
        "Original images will not be deleted."
    };

    term.write_line(&format!(
        "Perform bulk conversion on all {} images in this directory{}?\n{}",
        style(count).cyan(),
        scope,
        style(warning).dim()
    ))
    .ok();
    term.write_str("Continue? [y/N] ").ok();

    match term.read_line() {
        Ok(answer) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
        Err(_) => false,
    }
}

fn print_pretty_outcome(outcome: &ConversionOutcome) {
    let term = Term::stderr();
    let (title, message) = describe_outcome(outcome);
    let marker = match outcome {
        ConversionOutcome::Converted { .. } => style("✓").green().bold(),
        ConversionOutcome::SkippedExisting { .. } => style("-").yellow().bold(),
        ConversionOutcome::Failed { .. } => style("✗").red().bold(),
    };

    term.write_line(&format!("{} {}", marker, style(title).bold()))
        .ok();
    term.write_line(&format!("  {}", message)).ok();
}

fn print_pretty_report(term: &Term, report: &BatchReport) {
    term.write_line("").ok();
    let heading = if report.canceled {
        format!("{} Conversion canceled", style("!").yellow().bold())
    } else {
        format!("{} Conversion complete", style("✓").green().bold())
    };
    term.write_line(&heading).ok();
    term.write_line("").ok();

    for line in summary(report).lines() {
        term.write_line(&format!("  {}", line)).ok();
    }

    if !report.failures.is_empty() {
        term.write_line("").ok();
        term.write_line(&format!("{}", style("Problems:").bold().underlined()))
            .ok();
        for failure in &report.failures {
            term.write_line(&format!(
                "  {} {}: {}",
                style("✗").red(),
                failure.path.display(),
                style(&failure.reason).dim()
            ))
            .ok();
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => tracing::error!("Failed to serialize output: {}", e),
    }
}
