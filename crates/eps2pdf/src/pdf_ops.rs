//! Checks on produced PDF files: page counting and version inspection.
//!
//! These operations only read PDFs the converter has already written and are
//! independent from the converter itself.

use std::path::Path;

use crate::error::ConvertError;
use lopdf::Document;

/// Count the number of pages in a PDF.
pub fn page_count(input: &[u8]) -> Result<u32, ConvertError> {
    let doc = load(input)?;
    Ok(doc.get_pages().len() as u32)
}

/// The version declared in the PDF header, e.g. `"1.7"`.
pub fn pdf_version(input: &[u8]) -> Result<String, ConvertError> {
    let doc = load(input)?;
    Ok(doc.version)
}

/// Load the PDF at `path` and require at least one page.
///
/// Returns the page count.
pub fn verify_pdf_file(path: &Path) -> Result<u32, ConvertError> {
    let data = std::fs::read(path)?;
    let pages = page_count(&data)?;
    if pages == 0 {
        return Err(ConvertError::Verification(format!(
            "{} has no pages",
            path.display()
        )));
    }
    Ok(pages)
}

fn load(input: &[u8]) -> Result<Document, ConvertError> {
    Document::load_mem(input).map_err(|e| ConvertError::Verification(format!("invalid PDF: {e}")))
}
