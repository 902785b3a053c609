/// Default name of the archive subfolder created next to converted sources.
pub const DEFAULT_ARCHIVE_FOLDER: &str = "_archive";

/// Validate an archive folder name.
///
/// The folder must differ from the source directory, so empty names and
/// `.` (with or without a trailing separator) are rejected.
pub fn parse_archive_folder(s: &str) -> Result<String, String> {
    let trimmed = s.trim().trim_end_matches(['/', '\\']);
    if trimmed.is_empty() || trimmed == "." {
        return Err(format!(
            "invalid archive folder {s:?}: must name a subfolder, not the source directory"
        ));
    }
    Ok(s.to_string())
}

/// Supported input document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Eps,
    Epsf,
}

impl Format {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "eps" => Some(Self::Eps),
            "epsf" => Some(Self::Epsf),
            _ => None,
        }
    }

    /// Detect format from the trailing suffix of a path string.
    ///
    /// Only the final `.`-separated component is inspected, so a bare `.eps`
    /// file name still qualifies.
    pub fn from_path_str(path: &str) -> Option<Self> {
        let (_, ext) = path.rsplit_once('.')?;
        if ext.contains(['/', '\\']) {
            return None;
        }
        Self::from_extension(ext)
    }

    /// Length of the extension including the leading dot.
    pub(crate) fn suffix_len(self) -> usize {
        match self {
            Self::Eps => ".eps".len(),
            Self::Epsf => ".epsf".len(),
        }
    }
}

/// Target PDF compatibility, named after the Acrobat release that introduced
/// each PDF version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PdfCompatibility {
    /// PDF 1.3
    Acrobat4,
    /// PDF 1.4
    Acrobat5,
    /// PDF 1.5
    Acrobat6,
    /// PDF 1.6
    Acrobat7,
    /// PDF 1.7
    #[default]
    Acrobat8,
}

impl PdfCompatibility {
    /// The PDF version string written into the file header, e.g. `"1.7"`.
    pub fn pdf_version(self) -> &'static str {
        match self {
            Self::Acrobat4 => "1.3",
            Self::Acrobat5 => "1.4",
            Self::Acrobat6 => "1.5",
            Self::Acrobat7 => "1.6",
            Self::Acrobat8 => "1.7",
        }
    }

    /// Parse either a PDF version (`"1.5"`) or an Acrobat name (`"acrobat6"`).
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1.3" | "acrobat4" => Ok(Self::Acrobat4),
            "1.4" | "acrobat5" => Ok(Self::Acrobat5),
            "1.5" | "acrobat6" => Ok(Self::Acrobat6),
            "1.6" | "acrobat7" => Ok(Self::Acrobat7),
            "1.7" | "acrobat8" => Ok(Self::Acrobat8),
            other => Err(format!(
                "unknown PDF compatibility: {other} (expected 1.3-1.7 or acrobat4-acrobat8)"
            )),
        }
    }
}

/// Options controlling a batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionOptions {
    /// Convert even if the target PDF already exists.
    pub overwrite: bool,
    /// Name of the archive subfolder created next to each source.
    pub archive_folder: String,
    /// Keep the document editable by the originating application.
    pub preserve_editability: bool,
    /// Keep spot (separation) colors. Best-effort.
    pub preserve_spot_colors: bool,
    /// Embed page thumbnails in the PDF.
    pub generate_thumbnails: bool,
    /// Ask the converter to display the PDF once saved.
    pub view_after_saving: bool,
    /// Target PDF version.
    pub compatibility: PdfCompatibility,
    /// Re-open each produced PDF and require at least one page.
    /// Only honored when the `pdf-ops` feature is enabled.
    pub verify_output: bool,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            overwrite: true,
            archive_folder: DEFAULT_ARCHIVE_FOLDER.to_string(),
            preserve_editability: true,
            preserve_spot_colors: true,
            generate_thumbnails: true,
            view_after_saving: false,
            compatibility: PdfCompatibility::default(),
            verify_output: false,
        }
    }
}
