//! Staging-folder compression.
//!
//! The staging tree is zipped contents-only (entry names are relative to
//! the staging folder), lock-marker files are excluded, and per-file read
//! failures skip that file without aborting the archive. If the deflated
//! write fails at the archive level, the partial output is deleted and the
//! whole tree is re-written uncompressed with a logged warning.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use clipship_core::error::{ClipshipError, Result};

use crate::log::ProcessingLog;

/// Compress the contents of `folder` into the archive at `output`.
pub fn archive_staging(folder: &Path, output: &Path, log: &ProcessingLog) -> Result<PathBuf> {
    match write_archive(folder, output, CompressionMethod::Deflated, log) {
        Ok(()) => Ok(output.to_path_buf()),
        Err(err) => {
            tracing::warn!(%err, "deflated archive failed; retrying with stored entries");
            if output.exists() {
                let _ = fs::remove_file(output);
            }
            write_archive(folder, output, CompressionMethod::Stored, log).map_err(|e| {
                ClipshipError::ArchiveFailed {
                    path: output.to_path_buf(),
                    reason: e.to_string(),
                }
            })?;
            log.warning("Unable to compress zip file contents; the archive was written without compression.");
            Ok(output.to_path_buf())
        }
    }
}

fn write_archive(
    folder: &Path,
    output: &Path,
    method: CompressionMethod,
    log: &ProcessingLog,
) -> std::result::Result<(), zip::result::ZipError> {
    let file = File::create(output)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(method);

    for entry in WalkDir::new(folder).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        // lock markers never ship
        if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("lock")) {
            continue;
        }
        let relative = path.strip_prefix(folder).unwrap_or(path);
        let entry_name = relative.to_string_lossy().replace('\\', "/");

        // read first so a file disappearing mid-walk skips cleanly without
        // corrupting the archive
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) => {
                log.warning(format!("Error adding {entry_name}: {err}"));
                tracing::warn!(entry = %entry_name, %err, "skipping file during archiving");
                continue;
            }
        };
        zip.start_file(entry_name, options)?;
        zip.write_all(&bytes)?;
    }

    zip.finish()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::TempDir;

    fn read_entry_names(archive_path: &Path) -> Vec<String> {
        let file = File::open(archive_path).unwrap();
        let archive = zip::ZipArchive::new(file).unwrap();
        let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
        names.sort();
        names
    }

    #[test]
    fn test_archive_uses_contents_only_layout() {
        let tmp = TempDir::new().unwrap();
        let staging = tmp.path().join("zipfolder");
        fs::create_dir_all(staging.join("data.gdb")).unwrap();
        fs::write(staging.join("log.html"), "<html>").unwrap();
        fs::write(staging.join("data.gdb").join("roads"), "clipped").unwrap();

        let log = ProcessingLog::init(tmp.path().join("oplog.html"));
        let archive = archive_staging(&staging, &tmp.path().join("out.zip"), &log).unwrap();

        assert_eq!(read_entry_names(&archive), ["data.gdb/roads", "log.html"]);
    }

    #[test]
    fn test_lock_files_are_excluded() {
        let tmp = TempDir::new().unwrap();
        let staging = tmp.path().join("zipfolder");
        fs::create_dir_all(&staging).unwrap();
        fs::write(staging.join("roads.shp"), "data").unwrap();
        fs::write(staging.join("roads.shp.lock"), "lock").unwrap();

        let log = ProcessingLog::init(tmp.path().join("oplog.html"));
        let archive = archive_staging(&staging, &tmp.path().join("out.zip"), &log).unwrap();

        assert_eq!(read_entry_names(&archive), ["roads.shp"]);
    }

    #[test]
    fn test_archived_content_round_trips() {
        let tmp = TempDir::new().unwrap();
        let staging = tmp.path().join("zipfolder");
        fs::create_dir_all(&staging).unwrap();
        fs::write(staging.join("roads"), "clipped features").unwrap();

        let log = ProcessingLog::init(tmp.path().join("oplog.html"));
        let archive = archive_staging(&staging, &tmp.path().join("out.zip"), &log).unwrap();

        let file = File::open(archive).unwrap();
        let mut zip = zip::ZipArchive::new(file).unwrap();
        let mut entry = zip.by_name("roads").unwrap();
        let mut content = String::new();
        entry.read_to_string(&mut content).unwrap();
        assert_eq!(content, "clipped features");
    }

    #[test]
    fn test_empty_staging_still_produces_archive() {
        let tmp = TempDir::new().unwrap();
        let staging = tmp.path().join("zipfolder");
        fs::create_dir_all(&staging).unwrap();

        let log = ProcessingLog::init(tmp.path().join("oplog.html"));
        let archive = archive_staging(&staging, &tmp.path().join("out.zip"), &log).unwrap();
        assert!(archive.exists());
        assert!(read_entry_names(&archive).is_empty());
    }
}
