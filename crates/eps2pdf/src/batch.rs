//! The batch loop: filter, convert, archive, tally.
//!
//! Every input is handled exactly once and independently. Failures never
//! escape [`BatchConverter::run`]; they only show up in the tally and in the
//! per-item report.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::archive::{self, ArchiveOutcome};
use crate::config::{ConversionOptions, Format};
use crate::converter::{DocumentConverter, PdfSaveOptions};
use crate::error::{ConvertError, ConvertWarning, FailureKind};

/// Whether `path` ends in `.eps` or `.epsf`, ignoring case.
pub fn is_eps_path(path: &str) -> bool {
    Format::from_path_str(path).is_some()
}

/// Sibling PDF path: same directory, EPS suffix replaced by `.pdf`.
pub fn pdf_output_path(source: &Path) -> PathBuf {
    let name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let base = match Format::from_path_str(&name) {
        Some(format) => &name[..name.len() - format.suffix_len()],
        None => name.rsplit_once('.').map_or(name.as_str(), |(b, _)| b),
    };
    source.with_file_name(format!("{base}.pdf"))
}

/// Terminal state of one input entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "reason")]
pub enum ItemOutcome {
    /// Not an EPS path, or a repeat of an entry already handled. Not counted.
    Ignored,
    Succeeded,
    SkippedExisting,
    Failed(FailureKind),
}

/// Outcome of one input entry together with the paths involved.
#[derive(Debug, Clone, Serialize)]
pub struct ItemReport {
    pub input: String,
    pub outcome: ItemOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ItemReport {
    fn new(input: &str, outcome: ItemOutcome) -> Self {
        Self {
            input: input.to_string(),
            outcome,
            output: None,
            archived: None,
            error: None,
        }
    }
}

/// Tally of counted outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub ok: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn record(&mut self, outcome: ItemOutcome) {
        match outcome {
            ItemOutcome::Ignored => {}
            ItemOutcome::Succeeded => self.ok += 1,
            ItemOutcome::SkippedExisting => self.skipped += 1,
            ItemOutcome::Failed(_) => self.failed += 1,
        }
    }

    /// Number of counted items.
    pub fn total(&self) -> usize {
        self.ok + self.skipped + self.failed
    }

    /// The end-of-batch notification text.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "EPS→PDF done.\nOK: {}  Skipped: {}  Failed: {}",
            self.ok, self.skipped, self.failed
        )
    }
}

/// Everything a batch run produced.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub summary: BatchSummary,
    pub items: Vec<ItemReport>,
    /// Options that could not be honored and converter diagnostics.
    pub warnings: Vec<ConvertWarning>,
}

/// Drives a [`DocumentConverter`] over a list of input paths.
pub struct BatchConverter<C> {
    converter: C,
    options: ConversionOptions,
    save_options: PdfSaveOptions,
    warnings: Vec<ConvertWarning>,
}

impl<C: DocumentConverter> BatchConverter<C> {
    pub fn new(converter: C, options: ConversionOptions) -> Self {
        let (save_options, warnings) = PdfSaveOptions::negotiate(&options, &converter);
        for w in &warnings {
            warn!(option = %w.element, "{}", w.reason);
        }
        Self {
            converter,
            options,
            save_options,
            warnings,
        }
    }

    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    /// Save options after dropping features the converter lacks.
    pub fn save_options(&self) -> &PdfSaveOptions {
        &self.save_options
    }

    pub fn converter(&self) -> &C {
        &self.converter
    }

    pub fn into_converter(self) -> C {
        self.converter
    }

    /// Process every input in order and return the tally and per-item report.
    ///
    /// Each call is an independent batch; repeats are only detected within
    /// one call.
    pub fn run<I, S>(&mut self, inputs: I) -> BatchReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut report = BatchReport {
            warnings: self.warnings.clone(),
            ..BatchReport::default()
        };

        let mut seen = HashSet::new();
        for input in inputs {
            let item = self.process(input.as_ref(), &mut seen, &mut report.warnings);
            report.summary.record(item.outcome);
            report.items.push(item);
        }

        info!(
            ok = report.summary.ok,
            skipped = report.summary.skipped,
            failed = report.summary.failed,
            "batch finished"
        );
        report
    }

    /// Process a single input entry.
    ///
    /// Per-item warnings are logged but not kept; use [`run`](Self::run) to
    /// collect them.
    pub fn convert_one(&mut self, raw: &str) -> ItemOutcome {
        self.process(raw, &mut HashSet::new(), &mut Vec::new())
            .outcome
    }

    fn process(
        &mut self,
        raw: &str,
        seen: &mut HashSet<PathBuf>,
        warnings: &mut Vec<ConvertWarning>,
    ) -> ItemReport {
        let input = raw.trim_end();
        if !is_eps_path(input) {
            debug!(input, "not an EPS path, ignored");
            return ItemReport::new(input, ItemOutcome::Ignored);
        }

        let source = PathBuf::from(input);
        if !seen.insert(source.clone()) {
            debug!(input, "repeated entry, ignored");
            return ItemReport::new(input, ItemOutcome::Ignored);
        }

        if !source.exists() {
            let err = ConvertError::SourceNotFound(source);
            warn!(input, "{err}");
            let mut item = ItemReport::new(input, ItemOutcome::Failed(err.kind()));
            item.error = Some(err.to_string());
            return item;
        }

        let output = pdf_output_path(&source);
        if output.exists() && !self.options.overwrite {
            debug!(input, output = %output.display(), "PDF exists, skipped");
            let mut item = ItemReport::new(input, ItemOutcome::SkippedExisting);
            item.output = Some(output);
            return item;
        }

        let mut item = match self.convert_and_archive(&source, &output, warnings) {
            Ok(archived) => {
                debug!(input, output = %output.display(), "converted");
                let mut item = ItemReport::new(input, ItemOutcome::Succeeded);
                item.archived = Some(archived.destination().to_path_buf());
                if let ArchiveOutcome::CopiedOnly { remove_error, .. } = archived {
                    warnings.push(ConvertWarning::new(
                        input,
                        format!("original not removed: {remove_error}"),
                    ));
                }
                item
            }
            Err(err) => {
                warn!(input, "{err}");
                self.release_converter();
                let mut item = ItemReport::new(input, ItemOutcome::Failed(err.kind()));
                item.error = Some(err.to_string());
                item
            }
        };
        item.output = Some(output);
        item
    }

    fn convert_and_archive(
        &mut self,
        source: &Path,
        output: &Path,
        warnings: &mut Vec<ConvertWarning>,
    ) -> Result<ArchiveOutcome, ConvertError> {
        let handle = self.converter.open(source)?;
        let saved = self.converter.save(&handle, output, &self.save_options);
        // Closed regardless of the save result.
        let closed = self.converter.close(&handle, true);
        warnings.extend(saved?);
        closed?;

        self.verify(output)?;

        archive::archive_source(source, &self.options.archive_folder)
    }

    #[cfg(feature = "pdf-ops")]
    fn verify(&self, output: &Path) -> Result<(), ConvertError> {
        if self.options.verify_output {
            let pages = crate::pdf_ops::verify_pdf_file(output)?;
            debug!(output = %output.display(), pages, "verified");
        }
        Ok(())
    }

    #[cfg(not(feature = "pdf-ops"))]
    fn verify(&self, _output: &Path) -> Result<(), ConvertError> {
        Ok(())
    }

    /// Force-close whatever document the converter still holds.
    fn release_converter(&mut self) {
        if let Some(handle) = self.converter.active_document()
            && let Err(e) = self.converter.close(&handle, true)
        {
            warn!(document = handle.id(), error = %e, "could not close document");
        }
    }
}

/// Run a batch with a fresh [`BatchConverter`].
pub fn convert_batch<C, I, S>(converter: C, options: ConversionOptions, inputs: I) -> BatchReport
where
    C: DocumentConverter,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    BatchConverter::new(converter, options).run(inputs)
}
