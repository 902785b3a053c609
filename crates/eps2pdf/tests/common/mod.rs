//! Shared test utilities for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use eps2pdf::{ConvertError, ConvertWarning, DocumentConverter, DocumentHandle, PdfSaveOptions};
use lopdf::{Document, dictionary};

/// A small but well-formed EPS document.
pub const SAMPLE_EPS: &[u8] = b"%!PS-Adobe-3.0 EPSF-3.0\n\
%%BoundingBox: 0 0 100 100\n\
%%EndComments\n\
newpath 10 10 moveto 90 90 lineto stroke\n\
showpage\n\
%%EOF\n";

/// Write `SAMPLE_EPS` to `dir/name` and return the path as a string input.
pub fn write_eps(dir: &Path, name: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, SAMPLE_EPS).expect("should write EPS fixture");
    path.to_string_lossy().into_owned()
}

/// Build a PDF with `pages` blank pages.
pub fn make_pdf(pages: u32, version: &str) -> Vec<u8> {
    let mut doc = Document::with_version(version);
    let pages_id = doc.new_object_id();

    let kids: Vec<lopdf::Object> = (0..pages)
        .map(|_| {
            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 100.into(), 100.into()],
            })
            .into()
        })
        .collect();

    doc.objects.insert(
        pages_id,
        lopdf::Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => pages as i64,
            "Kids" => kids,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out).expect("should serialize PDF");
    out
}

/// In-process converter that writes a small PDF for every saved document.
///
/// Sources whose file name contains `fail_marker` fail on save.
#[derive(Default)]
pub struct MockConverter {
    pub fail_marker: Option<String>,
    /// Number of pages written to each output.
    pub pages: u32,
    pub opened: Vec<PathBuf>,
    pub saved: Vec<PathBuf>,
    active: Option<DocumentHandle>,
    next_id: u64,
    max_open: usize,
}

impl MockConverter {
    pub fn new() -> Self {
        Self {
            pages: 1,
            ..Self::default()
        }
    }

    pub fn failing_on(marker: &str) -> Self {
        Self {
            fail_marker: Some(marker.to_string()),
            ..Self::new()
        }
    }

    pub fn with_pages(pages: u32) -> Self {
        Self {
            pages,
            ..Self::default()
        }
    }

    /// Most documents ever open at once.
    pub fn max_open(&self) -> usize {
        self.max_open
    }
}

impl DocumentConverter for MockConverter {
    fn open(&mut self, path: &Path) -> Result<DocumentHandle, ConvertError> {
        if !path.exists() {
            return Err(ConvertError::SourceNotFound(path.to_path_buf()));
        }
        self.next_id += 1;
        let handle = DocumentHandle::new(self.next_id, path);
        self.opened.push(path.to_path_buf());
        self.max_open = self.max_open.max(usize::from(self.active.is_some()) + 1);
        self.active = Some(handle.clone());
        Ok(handle)
    }

    fn save(
        &mut self,
        handle: &DocumentHandle,
        output: &Path,
        options: &PdfSaveOptions,
    ) -> Result<Vec<ConvertWarning>, ConvertError> {
        let name = handle.source().to_string_lossy();
        if let Some(marker) = &self.fail_marker
            && name.contains(marker.as_str())
        {
            return Err(ConvertError::Conversion(format!("cannot render {name}")));
        }
        fs::write(output, make_pdf(self.pages, options.compatibility.pdf_version()))?;
        self.saved.push(output.to_path_buf());
        Ok(Vec::new())
    }

    fn close(
        &mut self,
        handle: &DocumentHandle,
        _discard_changes: bool,
    ) -> Result<(), ConvertError> {
        if self.active.as_ref() == Some(handle) {
            self.active = None;
        }
        Ok(())
    }

    fn active_document(&self) -> Option<DocumentHandle> {
        self.active.clone()
    }
}
