//! [`DocumentConverter`] backed by an external Ghostscript process.
//!
//! Ghostscript's `pdfwrite` device performs the actual conversion. "Opening" a
//! document only validates the source; the process runs on [`save`].
//!
//! [`save`]: DocumentConverter::save

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, warn};

use crate::converter::{DocumentConverter, DocumentHandle, OptionalFeature, PdfSaveOptions};
use crate::error::{ConvertError, ConvertWarning};

/// Ghostscript executable name used when none is configured.
#[cfg(windows)]
pub const DEFAULT_BINARY: &str = "gswin64c";
#[cfg(not(windows))]
pub const DEFAULT_BINARY: &str = "gs";

/// DOS binary EPS header magic (`C5 D0 D3 C6`).
const DOS_EPS_MAGIC: [u8; 4] = [0xC5, 0xD0, 0xD3, 0xC6];
const PS_MAGIC: &[u8] = b"%!PS-Adobe";

/// Converts EPS documents by invoking Ghostscript's `pdfwrite` device.
#[derive(Debug)]
pub struct GhostscriptConverter {
    binary: PathBuf,
    next_id: u64,
    active: Option<DocumentHandle>,
}

impl GhostscriptConverter {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            next_id: 1,
            active: None,
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Whether the configured binary runs and reports a version.
    pub fn is_available(&self) -> bool {
        match Command::new(&self.binary).arg("--version").output() {
            Ok(output) => output.status.success(),
            Err(_) => false,
        }
    }

    /// Command-line arguments for converting `source` into `output`.
    pub fn build_args(source: &Path, output: &Path, options: &PdfSaveOptions) -> Vec<String> {
        let mut args = vec![
            "-dSAFER".to_string(),
            "-dBATCH".to_string(),
            "-dNOPAUSE".to_string(),
            "-dQUIET".to_string(),
            "-sDEVICE=pdfwrite".to_string(),
            "-dEPSCrop".to_string(),
            format!(
                "-dCompatibilityLevel={}",
                options.compatibility.pdf_version()
            ),
            format!("-dPreserveSeparation={}", options.preserve_spot_colors),
        ];
        // `%` in OutputFile is a page-number template; `%%` is a literal.
        let output = output.display().to_string().replace('%', "%%");
        args.push(format!("-sOutputFile={output}"));

        // A leading `-` would be read as a switch.
        let source = if source.to_string_lossy().starts_with('-') {
            Path::new(".").join(source)
        } else {
            source.to_path_buf()
        };
        args.push(source.display().to_string());
        args
    }
}

impl Default for GhostscriptConverter {
    fn default() -> Self {
        Self::new(DEFAULT_BINARY)
    }
}

/// Whether `header` starts with a text or DOS binary EPS signature.
pub fn has_eps_signature(header: &[u8]) -> bool {
    header.starts_with(PS_MAGIC) || header.starts_with(&DOS_EPS_MAGIC)
}

impl DocumentConverter for GhostscriptConverter {
    fn open(&mut self, path: &Path) -> Result<DocumentHandle, ConvertError> {
        if let Some(active) = &self.active {
            return Err(ConvertError::Conversion(format!(
                "{} is still open",
                active.source().display()
            )));
        }
        if !path.exists() {
            return Err(ConvertError::SourceNotFound(path.to_path_buf()));
        }

        let mut header = [0u8; 10];
        let read = File::open(path)?.read(&mut header)?;
        if !has_eps_signature(&header[..read]) {
            return Err(ConvertError::UnsupportedFormat(format!(
                "{} is not an EPS document",
                path.display()
            )));
        }

        let handle = DocumentHandle::new(self.next_id, path);
        self.next_id += 1;
        self.active = Some(handle.clone());
        Ok(handle)
    }

    fn save(
        &mut self,
        handle: &DocumentHandle,
        output: &Path,
        options: &PdfSaveOptions,
    ) -> Result<Vec<ConvertWarning>, ConvertError> {
        if self.active.as_ref() != Some(handle) {
            return Err(ConvertError::Conversion(format!(
                "document {} is not open",
                handle.id()
            )));
        }

        let args = Self::build_args(handle.source(), output, options);
        debug!(binary = %self.binary.display(), ?args, "running ghostscript");

        let result = Command::new(&self.binary).args(&args).output().map_err(|e| {
            ConvertError::Conversion(format!(
                "failed to run {}: {e}",
                self.binary.display()
            ))
        })?;

        if !result.status.success() {
            // Don't leave a truncated PDF behind.
            if output.exists() {
                let _ = std::fs::remove_file(output);
            }
            return Err(ConvertError::Conversion(format!(
                "ghostscript exited with {}: {}",
                result.status,
                String::from_utf8_lossy(&result.stderr).trim()
            )));
        }

        let mut warnings = Vec::new();
        let stderr = String::from_utf8_lossy(&result.stderr);
        for line in stderr.lines().map(str::trim).filter(|l| !l.is_empty()) {
            warn!(source = %handle.source().display(), "ghostscript: {line}");
            warnings.push(ConvertWarning::new("ghostscript", line));
        }

        if !output.exists() {
            return Err(ConvertError::Conversion(format!(
                "ghostscript produced no output at {}",
                output.display()
            )));
        }

        Ok(warnings)
    }

    fn close(
        &mut self,
        handle: &DocumentHandle,
        _discard_changes: bool,
    ) -> Result<(), ConvertError> {
        // Sources are never modified, so there is nothing to discard.
        match &self.active {
            Some(active) if active == handle => {
                self.active = None;
                Ok(())
            }
            _ => Err(ConvertError::Conversion(format!(
                "document {} is not open",
                handle.id()
            ))),
        }
    }

    fn active_document(&self) -> Option<DocumentHandle> {
        self.active.clone()
    }

    fn supports(&self, feature: OptionalFeature) -> bool {
        match feature {
            OptionalFeature::PreserveSpotColors => true,
            OptionalFeature::PreserveEditability
            | OptionalFeature::GenerateThumbnails
            | OptionalFeature::ViewAfterSaving => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PdfCompatibility;

    fn write_eps(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(
            &path,
            b"%!PS-Adobe-3.0 EPSF-3.0\n%%BoundingBox: 0 0 100 100\nnewpath 10 10 moveto 90 90 lineto stroke\nshowpage\n",
        )
        .unwrap();
        path
    }

    #[test]
    fn test_has_eps_signature() {
        assert!(has_eps_signature(b"%!PS-Adobe-3.0 EPSF-3.0"));
        assert!(has_eps_signature(&[0xC5, 0xD0, 0xD3, 0xC6, 0x1E, 0x00]));
        assert!(!has_eps_signature(b"%PDF-1.7"));
        assert!(!has_eps_signature(b""));
    }

    #[test]
    fn test_build_args() {
        let options = PdfSaveOptions {
            compatibility: PdfCompatibility::Acrobat5,
            preserve_spot_colors: false,
            ..PdfSaveOptions::default()
        };
        let args = GhostscriptConverter::build_args(
            Path::new("in/a.eps"),
            Path::new("in/a.pdf"),
            &options,
        );
        assert!(args.contains(&"-sDEVICE=pdfwrite".to_string()));
        assert!(args.contains(&"-dSAFER".to_string()));
        assert!(args.contains(&"-dCompatibilityLevel=1.4".to_string()));
        assert!(args.contains(&"-dPreserveSeparation=false".to_string()));
        assert_eq!(args[args.len() - 2], "-sOutputFile=in/a.pdf");
        assert_eq!(args[args.len() - 1], "in/a.eps");
    }

    #[test]
    fn test_build_args_escapes_percent_in_output() {
        let args = GhostscriptConverter::build_args(
            Path::new("in/50%off.eps"),
            Path::new("in/50%off.pdf"),
            &PdfSaveOptions::default(),
        );
        assert_eq!(args[args.len() - 2], "-sOutputFile=in/50%%off.pdf");
        assert_eq!(args[args.len() - 1], "in/50%off.eps");
    }

    #[test]
    fn test_build_args_dash_source_is_not_a_switch() {
        let args = GhostscriptConverter::build_args(
            Path::new("-logo.eps"),
            Path::new("-logo.pdf"),
            &PdfSaveOptions::default(),
        );
        assert_eq!(
            args[args.len() - 1],
            Path::new(".").join("-logo.eps").display().to_string()
        );
        assert!(args[args.len() - 2].starts_with("-sOutputFile="));
    }

    #[test]
    fn test_supported_features() {
        let gs = GhostscriptConverter::default();
        assert!(gs.supports(OptionalFeature::PreserveSpotColors));
        assert!(!gs.supports(OptionalFeature::PreserveEditability));
        assert!(!gs.supports(OptionalFeature::GenerateThumbnails));
    }

    #[test]
    fn test_open_missing_file() {
        let mut gs = GhostscriptConverter::default();
        let err = gs.open(Path::new("no_such_file.eps")).unwrap_err();
        assert!(matches!(err, ConvertError::SourceNotFound(_)));
        assert!(gs.active_document().is_none());
    }

    #[test]
    fn test_open_rejects_non_eps_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.eps");
        std::fs::write(&path, b"just text").unwrap();

        let mut gs = GhostscriptConverter::default();
        let err = gs.open(&path).unwrap_err();
        assert!(matches!(err, ConvertError::UnsupportedFormat(_)));
        assert!(gs.active_document().is_none());
    }

    #[test]
    fn test_open_close_tracks_active_document() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_eps(dir.path(), "a.eps");
        let b = write_eps(dir.path(), "b.eps");

        let mut gs = GhostscriptConverter::default();
        let handle = gs.open(&a).unwrap();
        assert_eq!(gs.active_document(), Some(handle.clone()));

        // Only one document at a time.
        assert!(gs.open(&b).is_err());

        gs.close(&handle, true).unwrap();
        assert!(gs.active_document().is_none());
        assert!(gs.close(&handle, true).is_err());

        let next = gs.open(&b).unwrap();
        assert_ne!(next.id(), handle.id());
    }

    #[test]
    fn test_save_with_missing_binary_fails() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_eps(dir.path(), "a.eps");

        let mut gs = GhostscriptConverter::new(dir.path().join("no-such-gs"));
        assert!(!gs.is_available());
        let handle = gs.open(&a).unwrap();
        let err = gs
            .save(&handle, &dir.path().join("a.pdf"), &PdfSaveOptions::default())
            .unwrap_err();
        assert!(matches!(err, ConvertError::Conversion(_)));
        assert!(!dir.path().join("a.pdf").exists());
    }

    #[test]
    fn test_save_requires_open_handle() {
        let mut gs = GhostscriptConverter::default();
        let stray = DocumentHandle::new(42, "a.eps");
        let err = gs
            .save(&stray, Path::new("a.pdf"), &PdfSaveOptions::default())
            .unwrap_err();
        assert!(matches!(err, ConvertError::Conversion(_)));
    }
}
