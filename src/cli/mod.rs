//! # CLI Module
//!
//! Command-line interface for the people sorter.
//!
//! ## Usage
//! ```bash
//! # Sort ./images into ./output, backing up to ./images_backup
//! people-sort run --detector-cmd "python3 ssd_detect.py"
//!
//! # Explicit folders, counts taken from an earlier pass
//! people-sort run ~/inbox -O ~/sorted -B ~/backup --manifest counts.json
//!
//! # Preview the names without touching anything
//! people-sort plan ~/inbox --manifest counts.json --format json
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use people_sorter::config::{FolderSet, SorterConfig};
use people_sorter::core::counter::{
    CommandDetector, DetectionConfig, DetectionCounter, ManifestCounter, PersonCounter,
};
use people_sorter::core::pipeline::{FolderPipeline, FolderProcessingSummary};
use people_sorter::error::{Result, SorterError};
use people_sorter::events::{Event, EventChannel, FileEvent, PipelineEvent};
use std::path::PathBuf;
use std::thread;

/// People Sorter - one copy of each photo per person in it
#[derive(Parser, Debug)]
#[command(name = "people-sort")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Back up, count, rename, duplicate and move every photo in a folder
    Run(SortArgs),
    /// Count people and show the resulting names without touching any file
    Plan(SortArgs),
}

#[derive(Args, Debug)]
struct SortArgs {
    /// Folder holding the photos [default: ./images]
    input: Option<PathBuf>,

    /// Folder receiving the renamed copies [default: output, beside the input]
    #[arg(short = 'O', long)]
    output_dir: Option<PathBuf>,

    /// Folder receiving untouched originals [default: images_backup, beside the input]
    #[arg(short = 'B', long)]
    backup_dir: Option<PathBuf>,

    /// External detector command; reads PNG on stdin, prints JSON detections.
    /// Split on whitespace unless --detector-arg is given
    #[arg(long, conflicts_with = "manifest")]
    detector_cmd: Option<String>,

    /// Argument for the detector, repeatable; --detector-cmd is then the
    /// program path as is, so paths with spaces work
    #[arg(long = "detector-arg", requires = "detector_cmd", allow_hyphen_values = true)]
    detector_args: Vec<String>,

    /// JSON file mapping file names to person counts
    #[arg(long)]
    manifest: Option<PathBuf>,

    /// Minimum detector confidence (exclusive)
    #[arg(long)]
    confidence: Option<f32>,

    /// Class id of "person" in the detector's labels
    #[arg(long)]
    person_class: Option<u32>,

    /// Square size images are resized to before detection
    #[arg(long)]
    input_size: Option<u32>,

    /// Output format
    #[arg(short, long, default_value = "pretty")]
    format: OutputFormat,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Config file [default: <config dir>/people-sorter/config.json]
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON summary for scripting
    Json,
    /// Minimal output (written paths only)
    Minimal,
}

enum CounterSource {
    Manifest(PathBuf),
    Command(String, Vec<String>),
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => run_sort(args, false),
        Commands::Plan(args) => run_sort(args, true),
    }
}

fn run_sort(args: SortArgs, dry_run: bool) -> Result<()> {
    let term = Term::stderr();
    let config = SorterConfig::load_or_default(args.config.as_deref())?;

    let folders = FolderSet::resolve(
        args.input.clone().or_else(|| config.input_dir.clone()),
        args.output_dir.clone().or_else(|| config.output_dir.clone()),
        args.backup_dir.clone().or_else(|| config.backup_dir.clone()),
    );
    let counter = build_counter(&args, &config)?;

    if matches!(args.format, OutputFormat::Pretty) {
        term.write_line(&format!(
            "{} {}",
            style("People Sorter").bold().cyan(),
            style(if dry_run { "(plan only)" } else { "" }).dim()
        ))
        .ok();
        term.write_line(&format!(
            "  {} {}\n  {} {}\n  {} {}",
            style("input: ").dim(),
            folders.input.display(),
            style("output:").dim(),
            folders.output.display(),
            style("backup:").dim(),
            folders.backup.display()
        ))
        .ok();
        term.write_line("").ok();
    }

    let pipeline = FolderPipeline::builder()
        .folders(&folders.input, &folders.output, &folders.backup)
        .dry_run(dry_run)
        .build();

    let (sender, receiver) = EventChannel::new();

    let progress = if matches!(args.format, OutputFormat::Pretty) {
        let pb = ProgressBar::new(0);
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
    let verbose = args.verbose;

    // Render events on a separate thread
    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            let Some(ref pb) = progress_clone else {
                continue;
            };
            match &event {
                Event::Pipeline(PipelineEvent::Started { images, .. }) => {
                    pb.set_length(*images as u64);
                }
                Event::Pipeline(PipelineEvent::Progress(p)) => {
                    pb.set_position(p.completed as u64);
                    if verbose {
                        pb.set_message(
                            p.current_path
                                .file_name()
                                .unwrap_or_default()
                                .to_string_lossy()
                                .into_owned(),
                        );
                    }
                }
                Event::File(FileEvent::Failed { .. }) => {
                    pb.println(format!("  {} {}", style("✗").red(), event));
                }
                Event::File(_) => {
                    pb.println(format!("  {} {}", style("·").dim(), event));
                }
                Event::Pipeline(PipelineEvent::Cancelled { .. }) => {
                    pb.println(format!("  {}", style(&event).yellow()));
                }
                Event::Pipeline(PipelineEvent::Completed { .. }) => {
                    pb.finish_and_clear();
                }
                Event::Pipeline(PipelineEvent::NoImagesFound) => {}
            }
        }
    });

    let result = pipeline.process_with_events(&*counter, &sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();

    let summary = match result {
        Ok(summary) => summary,
        Err(e) => {
            if let Some(pb) = progress {
                pb.finish_and_clear();
            }
            return Err(e);
        }
    };

    match args.format {
        OutputFormat::Pretty => print_pretty_results(&term, &summary, args.verbose),
        OutputFormat::Json => print_json_results(&summary),
        OutputFormat::Minimal => print_minimal_results(&summary),
    }

    Ok(())
}

fn counter_source(args: &SortArgs, config: &SorterConfig) -> Option<CounterSource> {
    if let Some(path) = &args.manifest {
        return Some(CounterSource::Manifest(path.clone()));
    }
    if let Some(command) = &args.detector_cmd {
        return Some(CounterSource::Command(command.clone(), args.detector_args.clone()));
    }
    config.manifest.clone().map(CounterSource::Manifest).or_else(|| {
        config
            .detector_command
            .clone()
            .map(|command| CounterSource::Command(command, config.detector_args.clone()))
    })
}

fn build_counter(args: &SortArgs, config: &SorterConfig) -> Result<Box<dyn PersonCounter>> {
    let detection = DetectionConfig {
        person_class_id: args.person_class.unwrap_or(config.detection.person_class_id),
        confidence_threshold: args
            .confidence
            .unwrap_or(config.detection.confidence_threshold),
        input_size: args.input_size.unwrap_or(config.detection.input_size),
    };

    match counter_source(args, config) {
        Some(CounterSource::Manifest(path)) => Ok(Box::new(ManifestCounter::load(&path)?)),
        Some(CounterSource::Command(command, extra_args)) => {
            let detector = CommandDetector::from_parts(&command, extra_args).ok_or_else(|| {
                SorterError::Config("detector command is empty".to_string())
            })?;
            Ok(Box::new(DetectionCounter::with_config(detector, detection)))
        }
        None => Err(SorterError::Config(
            "no person counter configured; pass --detector-cmd or --manifest".to_string(),
        )),
    }
}

fn print_pretty_results(term: &Term, summary: &FolderProcessingSummary, verbose: bool) {
    term.write_line("").ok();

    if !summary.images_found {
        term.write_line(&format!("{} No pictures found", style("!").yellow().bold()))
            .ok();
        return;
    }

    let title = if summary.dry_run { "Plan Complete" } else { "Sort Complete" };
    term.write_line(&format!("{} {}", style("✓").green().bold(), title))
        .ok();
    term.write_line("").ok();

    term.write_line(&format!(
        "  {} pictures {} in {:.1}s",
        style(summary.processed).cyan(),
        if summary.dry_run { "planned" } else { "sorted" },
        summary.duration_ms as f64 / 1000.0
    ))
    .ok();
    term.write_line(&format!(
        "  {} files {} to the output folder",
        style(summary.total_outputs()).cyan(),
        if summary.dry_run { "would be written" } else { "written" }
    ))
    .ok();
    if summary.skipped > 0 {
        term.write_line(&format!(
            "  {} other files left in place",
            style(summary.skipped).dim()
        ))
        .ok();
    }
    if summary.cancelled {
        term.write_line(&format!("  {}", style("Run was cancelled").yellow()))
            .ok();
    }

    if summary.failed > 0 {
        term.write_line("").ok();
        term.write_line(&format!(
            "{}",
            style(format!("{} pictures failed:", summary.failed)).red().bold()
        ))
        .ok();
        for outcome in summary.failures() {
            term.write_line(&format!(
                "    {} {}",
                style("✗").red(),
                outcome.source.display()
            ))
            .ok();
            if let Some(error) = &outcome.error {
                term.write_line(&format!("      {}", style(error).dim())).ok();
            }
        }
        term.write_line(&format!(
            "  {}",
            style("Failed pictures are still in the input folder.").dim()
        ))
        .ok();
    }

    if verbose {
        term.write_line("").ok();
        for outcome in summary.outcomes.iter().filter(|o| o.is_success()) {
            term.write_line(&format!(
                "  {} {} ({} person(s))",
                style("★").green(),
                outcome.source.display(),
                outcome.count.unwrap_or_default()
            ))
            .ok();
            for output in &outcome.outputs {
                term.write_line(&format!("    {} {}", style("○").dim(), output.display()))
                    .ok();
            }
        }
    }
}

fn print_json_results(summary: &FolderProcessingSummary) {
    match serde_json::to_string_pretty(summary) {
        Ok(json) => println!("{}", json),
        Err(e) => tracing::error!(error = %e, "failed to serialize summary"),
    }
}

fn print_minimal_results(summary: &FolderProcessingSummary) {
    for outcome in &summary.outcomes {
        for output in &outcome.outputs {
            println!("{}", output.display());
        }
    }
}
