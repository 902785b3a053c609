pub mod archive;
pub mod batch;
pub mod config;
pub mod converter;
pub mod error;
pub mod ghostscript;
#[cfg(feature = "pdf-ops")]
pub mod pdf_ops;

pub use batch::{BatchConverter, BatchReport, BatchSummary, ItemOutcome, convert_batch};
pub use config::ConversionOptions;
pub use converter::{DocumentConverter, DocumentHandle, PdfSaveOptions};
pub use error::{ConvertError, ConvertWarning};

use ghostscript::GhostscriptConverter;

/// Convert the given paths with Ghostscript and default options.
pub fn convert<I, S>(inputs: I) -> BatchReport
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    convert_with_options(inputs, &ConversionOptions::default())
}

/// Convert the given paths with Ghostscript and the given options.
pub fn convert_with_options<I, S>(inputs: I, options: &ConversionOptions) -> BatchReport
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    convert_batch(GhostscriptConverter::default(), options.clone(), inputs)
}
