use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{ArchiveError, SyncError};
use crate::pipeline::scan::sorted_entries;
use crate::types::activity::FileFormat;

const ARCHIVE_EXTENSION: &str = "zip";

/// Only entries with a supported extension are written, under their bare file name.
/// Files that already exist are left untouched. Returns the paths written.
pub fn expand_archives(root: &Path, recursive: bool) -> Result<Vec<PathBuf>, SyncError> {
    let mut written = Vec::new();
    expand_dir(root, recursive, &mut written)?;
    Ok(written)
}

fn expand_dir(dir: &Path, recursive: bool, written: &mut Vec<PathBuf>) -> Result<(), SyncError> {
    for path in sorted_entries(dir)? {
        if path.is_dir() {
            if recursive {
                expand_dir(&path, recursive, written)?;
            }
            continue;
        }

        if path.extension().and_then(|ext| ext.to_str()) == Some(ARCHIVE_EXTENSION) {
            written.extend(expand_archive(&path)?);
        }
    }
    Ok(())
}

fn expand_archive(path: &Path) -> Result<Vec<PathBuf>, ArchiveError> {
    let file = File::open(path).map_err(|source| ArchiveError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mut archive = zip::ZipArchive::new(file).map_err(|source| ArchiveError::Invalid {
        path: path.to_path_buf(),
        source,
    })?;

    let target_dir = path.parent().unwrap_or(Path::new("."));
    let mut written = Vec::new();

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(|source| ArchiveError::Invalid {
            path: path.to_path_buf(),
            source,
        })?;
        if entry.is_dir() {
            continue;
        }

        // Entry paths are untrusted; keep the file name only.
        let Some(file_name) = entry
            .enclosed_name()
            .and_then(|name| name.file_name().map(PathBuf::from))
        else {
            continue;
        };
        if FileFormat::from_path(&file_name).is_none() {
            continue;
        }

        let target = target_dir.join(&file_name);
        if target.exists() {
            tracing::debug!("Skipping {:?} from {:?}: already extracted", file_name, path);
            continue;
        }

        let extract_error = |source| ArchiveError::Extract {
            path: path.to_path_buf(),
            entry: file_name.display().to_string(),
            source,
        };
        let mut out = File::create(&target).map_err(extract_error)?;
        if let Err(err) = io::copy(&mut entry, &mut out) {
            drop(out);
            let _ = fs::remove_file(&target);
            return Err(extract_error(err));
        }

        tracing::info!("Extracted {:?} from {:?}", file_name, path);
        written.push(target);
    }

    Ok(written)
}
