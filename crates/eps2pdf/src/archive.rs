//! Moving converted sources into the archive folder.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::ConvertError;

/// How far the move into the archive got.
#[derive(Debug)]
pub enum ArchiveOutcome {
    /// The source now lives only in the archive.
    Moved { destination: PathBuf },
    /// The archive copy exists but the original could not be deleted.
    CopiedOnly {
        destination: PathBuf,
        remove_error: std::io::Error,
    },
}

impl ArchiveOutcome {
    pub fn destination(&self) -> &Path {
        match self {
            Self::Moved { destination } | Self::CopiedOnly { destination, .. } => destination,
        }
    }
}

/// Directory `folder_name` next to `source`.
pub fn archive_dir(source: &Path, folder_name: &str) -> PathBuf {
    source
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join(folder_name)
}

/// Move `source` into the `folder_name` subfolder of its directory.
///
/// The folder is created when missing and a previous archive copy with the
/// same name is replaced. Only a failed copy is an error; when the original
/// cannot be deleted afterwards the result is [`ArchiveOutcome::CopiedOnly`].
pub fn archive_source(source: &Path, folder_name: &str) -> Result<ArchiveOutcome, ConvertError> {
    let file_name = source.file_name().ok_or_else(|| {
        ConvertError::Archive(format!("source has no file name: {}", source.display()))
    })?;

    let dir = archive_dir(source, folder_name);
    fs::create_dir_all(&dir).map_err(|e| {
        ConvertError::Archive(format!("cannot create {}: {e}", dir.display()))
    })?;

    let destination = dir.join(file_name);
    if is_same_file(source, &destination)? {
        return Err(ConvertError::Archive(format!(
            "archive folder {folder_name:?} resolves to the source's own directory: {}",
            source.display()
        )));
    }
    if destination.exists()
        && let Err(e) = fs::remove_file(&destination)
    {
        // fs::copy truncates the target anyway; only log.
        debug!(path = %destination.display(), error = %e, "could not remove previous archive copy");
    }

    fs::copy(source, &destination).map_err(|e| {
        ConvertError::Archive(format!(
            "cannot copy {} to {}: {e}",
            source.display(),
            destination.display()
        ))
    })?;

    match fs::remove_file(source) {
        Ok(()) => Ok(ArchiveOutcome::Moved { destination }),
        Err(remove_error) => {
            warn!(
                source = %source.display(),
                error = %remove_error,
                "archived copy written but original could not be removed"
            );
            Ok(ArchiveOutcome::CopiedOnly {
                destination,
                remove_error,
            })
        }
    }
}

/// Whether `destination` names the same file as `source`.
fn is_same_file(source: &Path, destination: &Path) -> Result<bool, ConvertError> {
    if !destination.exists() {
        return Ok(false);
    }
    let canonical = |p: &Path| {
        fs::canonicalize(p)
            .map_err(|e| ConvertError::Archive(format!("cannot resolve {}: {e}", p.display())))
    };
    Ok(canonical(source)? == canonical(destination)?)
}
