//! Pipeline execution implementation.

use super::types::{FolderProcessingSummary, ImageFile, ProcessingOutcome, ProcessingStep};
use crate::core::classifier::FileClassifier;
use crate::core::counter::PersonCounter;
use crate::core::naming::NamingPolicy;
use crate::error::{FileOpError, PreconditionError, SorterError};
use crate::events::{
    null_sender, Event, EventSender, FileEvent, FileProgress, PipelineEvent, RunSummary,
};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Folders the pipeline works on
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    /// Folder the images are taken from
    pub input_dir: PathBuf,
    /// Folder receiving the renamed copies
    pub output_dir: PathBuf,
    /// Folder receiving untouched originals
    pub backup_dir: PathBuf,
    /// Count and name everything, but touch nothing
    pub dry_run: bool,
}

/// Builder for [`FolderPipeline`]
pub struct PipelineBuilder {
    config: PipelineConfig,
    cancel: Option<Arc<AtomicBool>>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
            cancel: None,
        }
    }

    pub fn input_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.input_dir = path.into();
        self
    }

    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output_dir = path.into();
        self
    }

    pub fn backup_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.backup_dir = path.into();
        self
    }

    /// Set all three folders at once
    pub fn folders(
        self,
        input: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        backup: impl Into<PathBuf>,
    ) -> Self {
        self.input_dir(input).output_dir(output).backup_dir(backup)
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.config.dry_run = dry_run;
        self
    }

    /// Flag checked between files; once set, the remaining files are left alone
    pub fn cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn build(self) -> FolderPipeline {
        FolderPipeline {
            config: self.config,
            cancel: self.cancel,
            classifier: FileClassifier::new(),
            naming: NamingPolicy::new(),
        }
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of the input folder taken before any file is touched
struct Listing {
    images: Vec<ImageFile>,
    scanned: usize,
    skipped: usize,
}

/// Why one file stopped, and at which step
struct StepFailure {
    step: ProcessingStep,
    error: SorterError,
}

impl StepFailure {
    fn at(step: ProcessingStep) -> impl FnOnce(SorterError) -> Self {
        move |error| Self { step, error }
    }
}

/// Sorts one folder of photos by person count.
///
/// Files are handled one at a time, start to finish. For each image:
/// backup, count, primary copy, duplicates of the primary, then removal of
/// the source. A failing step stops that file only; its source stays put.
pub struct FolderPipeline {
    config: PipelineConfig,
    cancel: Option<Arc<AtomicBool>>,
    classifier: FileClassifier,
    naming: NamingPolicy,
}

impl FolderPipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Run without progress reporting
    pub fn process<C>(&self, counter: &C) -> Result<FolderProcessingSummary, SorterError>
    where
        C: PersonCounter + ?Sized,
    {
        self.process_with_events(counter, &null_sender())
    }

    /// Run, reporting every completed step through `events`
    pub fn process_with_events<C>(
        &self,
        counter: &C,
        events: &EventSender,
    ) -> Result<FolderProcessingSummary, SorterError>
    where
        C: PersonCounter + ?Sized,
    {
        let start_time = Instant::now();
        let PipelineConfig {
            input_dir,
            output_dir,
            backup_dir,
            dry_run,
        } = &self.config;

        self.check_preconditions()?;
        let listing = self.list_input()?;

        if !*dry_run {
            ensure_dir(output_dir, "output")?;
            ensure_dir(backup_dir, "backup")?;
        }

        let mut summary = FolderProcessingSummary::new(input_dir, output_dir, backup_dir, *dry_run);
        summary.scanned = listing.scanned;
        summary.skipped = listing.skipped;
        summary.images_found = !listing.images.is_empty();

        let total = listing.images.len();
        info!(
            input = %input_dir.display(),
            images = total,
            skipped = listing.skipped,
            dry_run,
            "starting folder run"
        );
        events.send(Event::Pipeline(PipelineEvent::Started {
            input: input_dir.clone(),
            images: total,
        }));

        for (index, image) in listing.images.iter().enumerate() {
            if self.is_cancelled() {
                let remaining = total - index;
                info!(remaining, "run cancelled");
                events.send(Event::Pipeline(PipelineEvent::Cancelled { remaining }));
                summary.cancelled = true;
                break;
            }

            events.send(Event::Pipeline(PipelineEvent::Progress(FileProgress {
                completed: index,
                total,
                current_path: image.path.clone(),
            })));

            let outcome = self.process_file(image, counter, events);
            summary.record(outcome);
        }

        if !summary.images_found {
            info!(input = %input_dir.display(), "no pictures found");
            events.send(Event::Pipeline(PipelineEvent::NoImagesFound));
        }

        summary.duration_ms = start_time.elapsed().as_millis() as u64;

        info!(
            processed = summary.processed,
            failed = summary.failed,
            duration_ms = summary.duration_ms,
            "folder run finished"
        );
        events.send(Event::Pipeline(PipelineEvent::Completed {
            summary: RunSummary {
                scanned: summary.scanned,
                processed: summary.processed,
                skipped: summary.skipped,
                failed: summary.failed,
                duration_ms: summary.duration_ms,
            },
        }));

        Ok(summary)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map(|flag| flag.load(Ordering::SeqCst))
            .unwrap_or(false)
    }

    fn check_preconditions(&self) -> Result<(), PreconditionError> {
        let PipelineConfig {
            input_dir,
            output_dir,
            backup_dir,
            ..
        } = &self.config;

        for (role, path) in [
            ("input", input_dir),
            ("output", output_dir),
            ("backup", backup_dir),
        ] {
            if path.as_os_str().is_empty() {
                return Err(PreconditionError::MissingPath { role });
            }
        }

        let metadata = fs::metadata(input_dir).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => PreconditionError::InputNotFound {
                path: input_dir.clone(),
            },
            _ => PreconditionError::ReadInput {
                path: input_dir.clone(),
                source,
            },
        })?;
        if !metadata.is_dir() {
            return Err(PreconditionError::InputNotDirectory {
                path: input_dir.clone(),
            });
        }

        // Copying a file onto itself truncates it
        let input = fs::canonicalize(input_dir).map_err(|source| PreconditionError::ReadInput {
            path: input_dir.clone(),
            source,
        })?;
        for (role, path) in [("output", output_dir), ("backup", backup_dir)] {
            if fs::canonicalize(path).map(|p| p == input).unwrap_or(false) {
                return Err(PreconditionError::SameAsInput {
                    role,
                    path: path.clone(),
                });
            }
        }

        Ok(())
    }

    /// Take a fixed snapshot of the top level of the input folder
    fn list_input(&self) -> Result<Listing, PreconditionError> {
        let input_dir = &self.config.input_dir;
        let mut listing = Listing {
            images: Vec::new(),
            scanned: 0,
            skipped: 0,
        };

        let walker = WalkDir::new(input_dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true);

        for entry_result in walker {
            let entry = match entry_result {
                Ok(entry) => entry,
                Err(err) if err.depth() == 0 => {
                    let message = err.to_string();
                    let source = err
                        .into_io_error()
                        .unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, message));
                    return Err(PreconditionError::ReadInput {
                        path: input_dir.clone(),
                        source,
                    });
                }
                Err(err) => {
                    warn!(error = %err, "skipping unreadable entry");
                    continue;
                }
            };

            // Nested folders are not processed
            if !entry.file_type().is_file() {
                continue;
            }
            listing.scanned += 1;

            let Some(file_name) = entry.file_name().to_str() else {
                warn!(path = %entry.path().display(), "skipping file with non UTF-8 name");
                listing.skipped += 1;
                continue;
            };

            if self.classifier.is_processable(file_name) {
                listing.images.push(ImageFile::new(input_dir, file_name));
            } else {
                debug!(file = file_name, "not an image, skipped");
                listing.skipped += 1;
            }
        }

        Ok(listing)
    }

    fn process_file<C>(
        &self,
        image: &ImageFile,
        counter: &C,
        events: &EventSender,
    ) -> ProcessingOutcome
    where
        C: PersonCounter + ?Sized,
    {
        let mut outcome = ProcessingOutcome::new(image.path.clone());

        let result = if self.config.dry_run {
            self.plan_steps(image, counter, events, &mut outcome)
        } else {
            self.run_steps(image, counter, events, &mut outcome)
        };

        if let Err(StepFailure { step, error }) = result {
            warn!(
                file = %image.file_name,
                %step,
                error = %error,
                "file left in input folder"
            );
            events.send(Event::File(FileEvent::Failed {
                file_name: image.file_name.clone(),
                message: format!("{} failed: {}", step, error),
            }));
            outcome.fail(step, error.to_string());
        }

        outcome
    }

    /// Every step runs only after the previous one succeeded; the source is
    /// removed last, once the backup and all outputs exist.
    fn run_steps<C>(
        &self,
        image: &ImageFile,
        counter: &C,
        events: &EventSender,
        outcome: &mut ProcessingOutcome,
    ) -> Result<(), StepFailure>
    where
        C: PersonCounter + ?Sized,
    {
        let PipelineConfig {
            output_dir,
            backup_dir,
            ..
        } = &self.config;

        let backup = backup_dir.join(self.naming.backup_name(&image.base, &image.extension));
        copy_file(&image.path, &backup).map_err(StepFailure::at(ProcessingStep::Backup))?;
        debug!(file = %image.file_name, backup = %backup.display(), "backed up");
        outcome.backup = Some(backup.clone());
        events.send(Event::File(FileEvent::BackedUp {
            file_name: image.file_name.clone(),
            backup,
        }));

        let count = self.count(image, counter, events, outcome)?;
        let names = self.naming.compute_names(&image.base, &image.extension, count);

        let primary = output_dir.join(&names.primary_name);
        copy_file(&image.path, &primary).map_err(StepFailure::at(ProcessingStep::PrimaryCopy))?;
        outcome.outputs.push(primary.clone());

        // Duplicates come from the written primary so they match it byte for byte
        for duplicate_name in &names.duplicate_names {
            let duplicate = output_dir.join(duplicate_name);
            copy_file(&primary, &duplicate).map_err(StepFailure::at(ProcessingStep::DuplicateCopy))?;
            outcome.outputs.push(duplicate);
        }
        debug!(file = %image.file_name, copies = names.total_copies(), "output written");
        events.send(Event::File(FileEvent::CopiesCreated {
            file_name: image.file_name.clone(),
            primary: names.primary_name.clone(),
            copies: names.total_copies(),
        }));

        fs::remove_file(&image.path)
            .map_err(|source| {
                SorterError::from(FileOpError::Remove {
                    path: image.path.clone(),
                    source,
                })
            })
            .map_err(StepFailure::at(ProcessingStep::RemoveSource))?;
        outcome.source_removed = true;
        events.send(Event::File(FileEvent::SourceRemoved {
            file_name: image.file_name.clone(),
        }));

        Ok(())
    }

    /// Dry run: count and name, record the paths that would be written
    fn plan_steps<C>(
        &self,
        image: &ImageFile,
        counter: &C,
        events: &EventSender,
        outcome: &mut ProcessingOutcome,
    ) -> Result<(), StepFailure>
    where
        C: PersonCounter + ?Sized,
    {
        let count = self.count(image, counter, events, outcome)?;
        let names = self.naming.compute_names(&image.base, &image.extension, count);

        outcome.outputs = names
            .output_names()
            .map(|name| self.config.output_dir.join(name))
            .collect();

        events.send(Event::File(FileEvent::Planned {
            file_name: image.file_name.clone(),
            primary: names.primary_name.clone(),
            copies: names.total_copies(),
        }));

        Ok(())
    }

    fn count<C>(
        &self,
        image: &ImageFile,
        counter: &C,
        events: &EventSender,
        outcome: &mut ProcessingOutcome,
    ) -> Result<usize, StepFailure>
    where
        C: PersonCounter + ?Sized,
    {
        let count = counter
            .count(&image.path)
            .map_err(|e| StepFailure::at(ProcessingStep::Count)(e.into()))?;

        outcome.count = Some(count);
        events.send(Event::File(FileEvent::Counted {
            file_name: image.file_name.clone(),
            count,
        }));

        Ok(count)
    }
}

/// Sort `input_dir` into `output_dir`, keeping originals in `backup_dir`
pub fn process_folder<C>(
    input_dir: impl Into<PathBuf>,
    output_dir: impl Into<PathBuf>,
    backup_dir: impl Into<PathBuf>,
    counter: &C,
) -> Result<FolderProcessingSummary, SorterError>
where
    C: PersonCounter + ?Sized,
{
    FolderPipeline::builder()
        .folders(input_dir, output_dir, backup_dir)
        .build()
        .process(counter)
}

fn ensure_dir(path: &Path, role: &'static str) -> Result<(), PreconditionError> {
    fs::create_dir_all(path).map_err(|source| PreconditionError::CreateFolder {
        role,
        path: path.to_path_buf(),
        source,
    })
}

fn copy_file(from: &Path, to: &Path) -> Result<(), SorterError> {
    fs::copy(from, to).map(|_| ()).map_err(|source| {
        FileOpError::Copy {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source,
        }
        .into()
    })
}
