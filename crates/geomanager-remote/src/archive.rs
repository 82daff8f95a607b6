use crate::RestError;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// Expands a source archive into a directory ready for a multipart upload.
pub trait ArchiveExpander {
    fn expand(&self, archive: &Path, target_dir: &Path) -> Result<(), RestError>;
}

/// Expands plain `.tar` archives.
#[derive(Debug, Clone, Copy, Default)]
pub struct TarExpander;

impl ArchiveExpander for TarExpander {
    fn expand(&self, archive: &Path, target_dir: &Path) -> Result<(), RestError> {
        fs::create_dir_all(target_dir)?;
        let mut ar = tar::Archive::new(File::open(archive)?);
        ar.set_preserve_permissions(false);
        ar.set_preserve_mtime(false);
        ar.set_unpack_xattrs(false);
        ar.unpack(target_dir)?;
        Ok(())
    }
}

/// Create a fresh `importer*data` directory under `parent`.
///
/// The directory is not removed automatically; the caller owns it.
pub fn create_work_dir(parent: &Path) -> Result<PathBuf, RestError> {
    fs::create_dir_all(parent)?;
    let dir = tempfile::Builder::new()
        .prefix("importer")
        .suffix("data")
        .tempdir_in(parent)?;
    Ok(dir.keep())
}

pub(crate) fn ensure_archive(archive: &Path) -> Result<(), RestError> {
    if archive.is_file() {
        return Ok(());
    }
    Err(RestError::Io(std::io::Error::new(
        std::io::ErrorKind::NotFound,
        format!("archive not found: {}", archive.display()),
    )))
}

/// Expand `archive` into `target_dir`, then delete the archive.
///
/// Returns `target_dir`. A missing archive or a failed deletion is an error.
pub fn unpack(
    archive: &Path,
    target_dir: &Path,
    expander: &dyn ArchiveExpander,
) -> Result<PathBuf, RestError> {
    ensure_archive(archive)?;
    expander.expand(archive, target_dir)?;
    fs::remove_file(archive).map_err(|e| {
        RestError::Io(std::io::Error::other(format!(
            "deletion failed during extraction of {}: {e}",
            archive.display()
        )))
    })?;
    tracing::debug!(
        "expanded {} into {}",
        archive.display(),
        target_dir.display()
    );
    Ok(target_dir.to_path_buf())
}
