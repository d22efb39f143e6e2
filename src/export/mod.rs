//! Deck import/export in JSON and CSV.
//!
//! Exports hand the actual file write to a worker thread and wait for it, then
//! check that a non-empty file was produced.

pub mod csv;
pub mod json;

pub use self::csv::{export_csv_to_path, import_csv};
pub use self::json::{export_json_to_path, import_json};

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::thread;

use log::error;

use crate::error::{AppError, Result};

type FileWriter = BufWriter<File>;

/// Creates `path` (and its parent directory) and fills it from a worker thread.
pub(crate) fn write_off_thread<F>(path: &Path, format: &str, write: F) -> Result<()>
where
    F: FnOnce(&mut FileWriter) -> Result<()> + Send,
{
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| AppError::io("Cannot create export directory", parent, e))?;
        }
    }

    let outcome = thread::scope(|scope| {
        scope
            .spawn(|| -> Result<()> {
                let file = File::create(path)
                    .map_err(|e| AppError::io(format!("Cannot create {} file", format), path, e))?;
                let mut writer = BufWriter::new(file);
                write(&mut writer)?;
                writer
                    .flush()
                    .and_then(|_| writer.get_ref().sync_all())
                    .map_err(|e| AppError::io(format!("Failed to write {} file", format), path, e))
            })
            .join()
    });

    match outcome {
        Ok(result) => result?,
        Err(_) => {
            error!("{} export was interrupted: {}", format, path.display());
            return Err(AppError::io(
                "Export was interrupted",
                path,
                io::Error::from(io::ErrorKind::Interrupted),
            ));
        }
    }

    verify_file_created(path, format)
}

fn verify_file_created(path: &Path, format: &str) -> Result<()> {
    let non_empty = fs::metadata(path).map(|m| m.len() > 0).unwrap_or(false);
    if !non_empty {
        return Err(AppError::io(
            format!("{} file was not created successfully", format),
            path,
            io::Error::new(io::ErrorKind::UnexpectedEof, "file is missing or empty"),
        ));
    }
    Ok(())
}

pub(crate) fn ensure_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(AppError::io(
            "File not found",
            path,
            io::Error::from(io::ErrorKind::NotFound),
        ));
    }
    Ok(())
}
