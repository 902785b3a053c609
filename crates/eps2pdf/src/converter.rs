//! The converter capability consumed by the batch loop.
//!
//! A [`DocumentConverter`] owns the actual EPS to PDF conversion. The batch
//! only opens a document, asks for it to be saved as PDF, and closes it again.
//! Converters hold at most one open document at a time.

use std::path::{Path, PathBuf};

use crate::config::{ConversionOptions, PdfCompatibility};
use crate::error::{ConvertError, ConvertWarning};

/// Opaque reference to a document opened by a converter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentHandle {
    id: u64,
    source: PathBuf,
}

impl DocumentHandle {
    pub fn new(id: u64, source: impl Into<PathBuf>) -> Self {
        Self {
            id,
            source: source.into(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Path the document was opened from.
    pub fn source(&self) -> &Path {
        &self.source
    }
}

/// Fidelity features a converter may or may not implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionalFeature {
    PreserveEditability,
    PreserveSpotColors,
    GenerateThumbnails,
    ViewAfterSaving,
}

impl OptionalFeature {
    pub const ALL: [OptionalFeature; 4] = [
        Self::PreserveEditability,
        Self::PreserveSpotColors,
        Self::GenerateThumbnails,
        Self::ViewAfterSaving,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::PreserveEditability => "preserve_editability",
            Self::PreserveSpotColors => "preserve_spot_colors",
            Self::GenerateThumbnails => "generate_thumbnails",
            Self::ViewAfterSaving => "view_after_saving",
        }
    }
}

/// Effective options handed to [`DocumentConverter::save`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfSaveOptions {
    pub preserve_editability: bool,
    pub preserve_spot_colors: bool,
    pub generate_thumbnails: bool,
    pub view_after_saving: bool,
    pub compatibility: PdfCompatibility,
}

impl PdfSaveOptions {
    /// Save options as requested, without checking converter support.
    pub fn from_options(options: &ConversionOptions) -> Self {
        Self {
            preserve_editability: options.preserve_editability,
            preserve_spot_colors: options.preserve_spot_colors,
            generate_thumbnails: options.generate_thumbnails,
            view_after_saving: options.view_after_saving,
            compatibility: options.compatibility,
        }
    }

    /// Build save options the converter can honor.
    ///
    /// Each requested feature the converter does not support is switched off
    /// and reported as a warning; saving then proceeds without it.
    pub fn negotiate<C>(options: &ConversionOptions, converter: &C) -> (Self, Vec<ConvertWarning>)
    where
        C: DocumentConverter + ?Sized,
    {
        let mut effective = Self::from_options(options);
        let mut warnings = Vec::new();

        for feature in OptionalFeature::ALL {
            if effective.is_enabled(feature) && !converter.supports(feature) {
                effective.set(feature, false);
                warnings.push(ConvertWarning::new(
                    feature.name(),
                    "not supported by converter, ignored",
                ));
            }
        }

        (effective, warnings)
    }

    pub fn is_enabled(&self, feature: OptionalFeature) -> bool {
        match feature {
            OptionalFeature::PreserveEditability => self.preserve_editability,
            OptionalFeature::PreserveSpotColors => self.preserve_spot_colors,
            OptionalFeature::GenerateThumbnails => self.generate_thumbnails,
            OptionalFeature::ViewAfterSaving => self.view_after_saving,
        }
    }

    fn set(&mut self, feature: OptionalFeature, value: bool) {
        match feature {
            OptionalFeature::PreserveEditability => self.preserve_editability = value,
            OptionalFeature::PreserveSpotColors => self.preserve_spot_colors = value,
            OptionalFeature::GenerateThumbnails => self.generate_thumbnails = value,
            OptionalFeature::ViewAfterSaving => self.view_after_saving = value,
        }
    }
}

impl Default for PdfSaveOptions {
    fn default() -> Self {
        Self::from_options(&ConversionOptions::default())
    }
}

/// Trait for an external capability that turns EPS documents into PDFs.
pub trait DocumentConverter {
    /// Open the document at `path`.
    fn open(&mut self, path: &Path) -> Result<DocumentHandle, ConvertError>;

    /// Save an open document as PDF at `output`.
    ///
    /// Returns non-fatal warnings collected while saving.
    fn save(
        &mut self,
        handle: &DocumentHandle,
        output: &Path,
        options: &PdfSaveOptions,
    ) -> Result<Vec<ConvertWarning>, ConvertError>;

    /// Close an open document. With `discard_changes` no in-memory edits are
    /// written back to the source.
    fn close(
        &mut self,
        handle: &DocumentHandle,
        discard_changes: bool,
    ) -> Result<(), ConvertError>;

    /// The document currently open, if any.
    fn active_document(&self) -> Option<DocumentHandle>;

    /// Whether the converter implements an optional fidelity feature.
    fn supports(&self, _feature: OptionalFeature) -> bool {
        true
    }
}

impl<C: DocumentConverter + ?Sized> DocumentConverter for &mut C {
    fn open(&mut self, path: &Path) -> Result<DocumentHandle, ConvertError> {
        (**self).open(path)
    }

    fn save(
        &mut self,
        handle: &DocumentHandle,
        output: &Path,
        options: &PdfSaveOptions,
    ) -> Result<Vec<ConvertWarning>, ConvertError> {
        (**self).save(handle, output, options)
    }

    fn close(
        &mut self,
        handle: &DocumentHandle,
        discard_changes: bool,
    ) -> Result<(), ConvertError> {
        (**self).close(handle, discard_changes)
    }

    fn active_document(&self) -> Option<DocumentHandle> {
        (**self).active_document()
    }

    fn supports(&self, feature: OptionalFeature) -> bool {
        (**self).supports(feature)
    }
}
