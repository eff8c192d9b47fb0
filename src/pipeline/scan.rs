use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::error::ScanError;
use crate::pipeline::identity;
use crate::types::activity::{ActivityFile, FileFormat};

#[derive(Debug, Clone)]
pub struct ScanRequest<'a> {
    pub root: &'a Path,
    pub host_id: &'a str,
    pub cutoff: Option<DateTime<Utc>>,
    pub recursive: bool,
}

/// Entries of a directory are visited in file-name order; a subdirectory's files are
/// placed where the subdirectory sits among its siblings. Any directory that cannot be
/// listed, or file that cannot be stat'ed or read, aborts the scan.
pub fn scan(request: &ScanRequest<'_>) -> Result<Vec<ActivityFile>, ScanError> {
    let mut files = Vec::new();
    scan_dir(request, request.root, &mut files)?;
    tracing::debug!("Scanned {:?}: {} activity files", request.root, files.len());
    Ok(files)
}

fn scan_dir(
    request: &ScanRequest<'_>,
    dir: &Path,
    files: &mut Vec<ActivityFile>,
) -> Result<(), ScanError> {
    for path in sorted_entries(dir)? {
        let metadata = fs::metadata(&path).map_err(|source| ScanError::Stat {
            path: path.clone(),
            source,
        })?;

        if metadata.is_dir() {
            if request.recursive {
                scan_dir(request, &path, files)?;
            }
            continue;
        }

        let Some(format) = FileFormat::from_path(&path) else {
            continue;
        };

        let modified = metadata.modified().map_err(|source| ScanError::Stat {
            path: path.clone(),
            source,
        })?;
        let last_modified = DateTime::<Utc>::from(modified);

        if request.cutoff.is_some_and(|cutoff| last_modified < cutoff) {
            continue;
        }

        let bytes = fs::read(&path).map_err(|source| ScanError::ReadFile {
            path: path.clone(),
            source,
        })?;

        files.push(ActivityFile {
            format,
            host_id: request.host_id.to_string(),
            path,
            last_modified,
            hash: identity::hash(&bytes),
        });
    }

    Ok(())
}

pub(crate) fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let read_dir_error = |source| ScanError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = fs::read_dir(dir)
        .map_err(read_dir_error)?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(read_dir_error)?;
    entries.sort();
    Ok(entries)
}
