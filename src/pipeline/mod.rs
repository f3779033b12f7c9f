//! Batch orchestration: OCR, correction and document building per page.
//!
//! A [`Pipeline`] owns one OCR provider and an optional text corrector for
//! its whole lifetime and runs every input page through them in order:
//!
//! 1. create the page's [`PageOutputLocation`]
//! 2. OCR, persisting `<page>_res.json`
//! 3. correction, persisting `<page>_improved.json` (when a corrector is set)
//! 4. [`build_page`], writing `<page>_result.docx` and `<page>.md`
//!
//! A failing page is logged and recorded in the [`BatchReport`]; the batch
//! moves on to the next page.

mod command;
mod correct;
mod location;
mod provider;
mod range;

pub use command::{CommandCorrector, CommandOcrProvider, CommandSpec, JsonLineProcess};
pub use correct::{correct_page, CorrectionStats};
pub use location::{PageOutputLocation, IMAGES_DIR};
pub use provider::{OcrProvider, TextCorrector};
pub use range::PageRange;

use crate::assemble::assemble;
use crate::error::{Error, Result};
use crate::model::PageResult;
use crate::render::{save_docx, to_markdown, ExtractionStats, RenderOptions};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// File extensions accepted as page inputs (compared case-insensitively).
pub const INPUT_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tiff", "bmp", "pdf"];

/// Longest failure message kept in a [`BatchReport`], in characters.
pub const MAX_ERROR_MESSAGE: usize = 120;

/// Options for a batch run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Folder that receives one sub-folder per page
    pub output_root: PathBuf,

    /// Options for the DOCX and Markdown outputs
    pub render: RenderOptions,

    /// Set to stop the batch before the next page starts
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("output"),
            render: RenderOptions::default(),
            cancel: None,
        }
    }
}

impl PipelineOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output root folder.
    pub fn with_output_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.output_root = root.into();
        self
    }

    /// Set render options.
    pub fn with_render_options(mut self, render: RenderOptions) -> Self {
        self.render = render;
        self
    }

    /// Set a flag that cancels the batch between pages.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map_or(false, |flag| flag.load(Ordering::Relaxed))
    }

    fn location(&self, page: &str) -> PageOutputLocation {
        PageOutputLocation::new(&self.output_root, page)
    }
}

/// What happened to one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageStatus {
    /// All stages completed
    Succeeded,
    /// A stage failed; the message is truncated
    Failed(String),
    /// Nothing to do for this page
    Skipped(String),
}

/// Result of processing one page, passed to batch observers.
#[derive(Debug, Clone)]
pub struct PageOutcome {
    /// Page id
    pub page: String,
    /// Outcome
    pub status: PageStatus,
    /// Wall time spent on the page
    pub elapsed: Duration,
    /// What the built document contains; empty unless the page succeeded
    pub stats: ExtractionStats,
}

/// A page that failed, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageFailure {
    /// Page id
    pub page: String,
    /// Error message, at most [`MAX_ERROR_MESSAGE`] characters
    pub message: String,
}

/// Summary of a batch run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    /// Pages that completed
    pub succeeded: Vec<String>,
    /// Pages that failed
    pub failed: Vec<PageFailure>,
    /// Pages with nothing to do
    pub skipped: Vec<String>,
    /// Whether the batch stopped early
    pub cancelled: bool,
    /// Content written across all succeeded pages
    pub totals: ExtractionStats,
    /// When the batch started
    pub started_at: DateTime<Local>,
    /// When the batch finished
    pub finished_at: DateTime<Local>,
}

impl BatchReport {
    fn start() -> Self {
        let now = Local::now();
        Self {
            succeeded: Vec::new(),
            failed: Vec::new(),
            skipped: Vec::new(),
            cancelled: false,
            totals: ExtractionStats::new(),
            started_at: now,
            finished_at: now,
        }
    }

    fn record(&mut self, outcome: &PageOutcome) {
        match &outcome.status {
            PageStatus::Succeeded => {
                self.succeeded.push(outcome.page.clone());
                self.totals += &outcome.stats;
            }
            PageStatus::Failed(message) => self.failed.push(PageFailure {
                page: outcome.page.clone(),
                message: message.clone(),
            }),
            PageStatus::Skipped(_) => self.skipped.push(outcome.page.clone()),
        }
    }

    fn finish(mut self) -> Self {
        self.finished_at = Local::now();
        self
    }

    /// Number of pages visited.
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len() + self.skipped.len()
    }

    /// Whether no page failed.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Wall time of the batch.
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at.signed_duration_since(self.started_at)
    }

    /// Encode the report as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Runs pages through OCR, correction and document building.
pub struct Pipeline {
    ocr: Box<dyn OcrProvider>,
    corrector: Option<Box<dyn TextCorrector>>,
    options: PipelineOptions,
}

impl Pipeline {
    /// Create a pipeline around already constructed providers.
    pub fn new(
        ocr: Box<dyn OcrProvider>,
        corrector: Option<Box<dyn TextCorrector>>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            ocr,
            corrector,
            options,
        }
    }

    /// Options of this pipeline.
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Process every file in order.
    pub fn run(&mut self, files: &[PathBuf]) -> BatchReport {
        self.run_with(files, |_| {})
    }

    /// Process every file in order, reporting each page to `observer`.
    pub fn run_with<F>(&mut self, files: &[PathBuf], mut observer: F) -> BatchReport
    where
        F: FnMut(&PageOutcome),
    {
        let mut report = BatchReport::start();
        log::info!("Starting batch of {} files", files.len());

        for input in files {
            if self.options.is_cancelled() {
                log::warn!("Batch cancelled after {} pages", report.total());
                report.cancelled = true;
                break;
            }

            let page = page_id(input);
            let started = Instant::now();
            let result = self.process_page(input);
            let (status, stats) = match &result {
                Ok(stats) => (PageStatus::Succeeded, stats.clone()),
                Err(e) => {
                    log::error!("Page {} failed: {}", page, e);
                    let message = truncate_message(&e.to_string());
                    (PageStatus::Failed(message), ExtractionStats::new())
                }
            };
            let outcome = PageOutcome {
                page,
                status,
                elapsed: started.elapsed(),
                stats,
            };
            report.record(&outcome);
            observer(&outcome);

            if let Err(e) = result {
                if e.is_fatal() {
                    report.cancelled = true;
                    break;
                }
            }
        }

        let report = report.finish();
        log::info!(
            "Batch finished: {} succeeded, {} failed, {} words in {}s",
            report.succeeded.len(),
            report.failed.len(),
            report.totals.word_count,
            report.elapsed().num_seconds()
        );
        report
    }

    /// Run all stages for one input file.
    pub fn process_page(&mut self, input: &Path) -> Result<ExtractionStats> {
        let location = PageOutputLocation::create(&self.options.output_root, page_id(input))?;
        self.ocr_page(input, &location)?;
        if self.corrector.is_some() {
            self.correct_location(&location)?;
        }
        build_page(&location, &self.options.render)
    }

    /// OCR one input with this pipeline's provider.
    pub fn ocr_page(&mut self, input: &Path, location: &PageOutputLocation) -> Result<PageResult> {
        ocr_page(self.ocr.as_mut(), input, location)
    }

    /// Correct one page folder with this pipeline's corrector.
    ///
    /// Without a corrector this is a no-op.
    pub fn correct_location(&mut self, location: &PageOutputLocation) -> Result<CorrectionStats> {
        match self.corrector.as_mut() {
            Some(corrector) => correct_location(corrector.as_mut(), location),
            None => Ok(CorrectionStats::default()),
        }
    }

    /// Build-only pass over existing page folders.
    pub fn rebuild(&self, range: PageRange) -> Result<BatchReport> {
        rebuild(&self.options, range)
    }
}

/// OCR one input and persist the merged result as `<page>_res.json`.
///
/// A `<page>_improved.json` left by an earlier run no longer matches the new
/// OCR output and is removed.
pub fn ocr_page(
    ocr: &mut dyn OcrProvider,
    input: &Path,
    location: &PageOutputLocation,
) -> Result<PageResult> {
    fs::create_dir_all(location.images_dir())?;
    log::debug!("{}: OCR {}", ocr.name(), input.display());

    let results = ocr.predict(input, location.page_dir())?;
    if results.is_empty() {
        return Err(Error::Ocr(format!("no results for {}", input.display())));
    }
    if results.len() > 1 {
        log::info!(
            "Merging {} results for page {}",
            results.len(),
            location.page()
        );
    }
    let page = PageResult::merge(results);
    page.write_to(location.result_json())?;

    let stale = location.improved_json();
    if stale.is_file() {
        log::debug!("Removing stale {}", stale.display());
        fs::remove_file(&stale)?;
    }
    Ok(page)
}

/// Correct `<page>_res.json` into `<page>_improved.json`.
pub fn correct_location(
    corrector: &mut dyn TextCorrector,
    location: &PageOutputLocation,
) -> Result<CorrectionStats> {
    let mut page = PageResult::from_path(location.result_json())?;
    log::debug!("{}: correcting page {}", corrector.name(), location.page());
    let stats = correct_page(&mut page, corrector)?;
    page.write_to(location.improved_json())?;
    Ok(stats)
}

/// Build the DOCX and Markdown outputs of a page from its results JSON.
///
/// Uses `<page>_improved.json` when present, else `<page>_res.json`.
pub fn build_page(location: &PageOutputLocation, options: &RenderOptions) -> Result<ExtractionStats> {
    let json = location
        .preferred_json()
        .ok_or_else(|| Error::MissingArtifact(location.result_json()))?;
    let page = PageResult::from_path(&json)?;
    log::debug!("Building page {} from {}", location.page(), json.display());

    let document = assemble(&page.blocks, &location.images_dir());
    let stats = save_docx(&document, options, location.docx())?;
    fs::write(location.markdown(), to_markdown(&document, options)?)?;
    Ok(stats)
}

/// Build every page `min..=max` that already has a results JSON.
///
/// Both bounds of `range` must be set. Pages without JSON are skipped.
pub fn rebuild(options: &PipelineOptions, range: PageRange) -> Result<BatchReport> {
    rebuild_with(options, range, |_| {})
}

/// [`rebuild`], reporting each page to `observer`.
pub fn rebuild_with<F>(options: &PipelineOptions, range: PageRange, mut observer: F) -> Result<BatchReport>
where
    F: FnMut(&PageOutcome),
{
    let pages = range
        .pages()
        .ok_or_else(|| Error::InvalidPageRange("rebuild needs both min and max".into()))?;
    let mut report = BatchReport::start();

    for number in pages {
        if options.is_cancelled() {
            report.cancelled = true;
            break;
        }

        let location = options.location(&number.to_string());
        let started = Instant::now();
        let (status, stats) = if location.preferred_json().is_none() {
            log::debug!("Skipping page {}: no JSON", number);
            (PageStatus::Skipped("no JSON".into()), ExtractionStats::new())
        } else {
            match build_page(&location, &options.render) {
                Ok(stats) => (PageStatus::Succeeded, stats),
                Err(e) => {
                    log::error!("Page {} failed: {}", number, e);
                    let message = truncate_message(&e.to_string());
                    (PageStatus::Failed(message), ExtractionStats::new())
                }
            }
        };
        let outcome = PageOutcome {
            page: location.page().to_string(),
            status,
            elapsed: started.elapsed(),
            stats,
        };
        report.record(&outcome);
        observer(&outcome);
    }

    Ok(report.finish())
}

/// List the page inputs in `dir` that fall inside `range`, in listing order.
pub fn collect_inputs<P: AsRef<Path>>(dir: P, range: PageRange) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir.as_ref())? {
        let path = entry?.path();
        if !path.is_file() || !is_page_input(&path) {
            continue;
        }

        let page = page_id(&path);
        if !range.is_unbounded() && page.parse::<u32>().is_err() {
            log::warn!("Skipping {}: page id is not a number", path.display());
            continue;
        }
        if range.includes_stem(&page) {
            files.push(path);
        }
    }
    Ok(files)
}

/// Check if a path has one of [`INPUT_EXTENSIONS`].
pub fn is_page_input(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            INPUT_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// Page id of an input file: its stem.
pub fn page_id(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn truncate_message(message: &str) -> String {
    message.chars().take(MAX_ERROR_MESSAGE).collect()
}
