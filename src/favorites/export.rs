//! CSV export of favorite characters
//!
//! Produces the download artifact: a `text/csv` byte buffer and a suggested
//! filename embedding the member count. Saving it is up to the host.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::catalog::Character;

/// MIME type of the export artifact
pub const CSV_MIME: &str = "text/csv";

/// Errors that can occur while producing or saving an export
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Writing the artifact failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialized output was not valid UTF-8
    #[error("Invalid UTF-8 in export: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// A generated export, ready to be handed to a save mechanism
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub filename: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    /// Build the artifact for `count` members with the given CSV body
    #[must_use]
    pub fn new(count: usize, csv: String) -> Self {
        Self {
            filename: export_filename(count),
            mime: CSV_MIME,
            bytes: csv.into_bytes(),
        }
    }

    /// Save the artifact into `dir` under its suggested filename
    ///
    /// # Errors
    ///
    /// Returns `ExportError::Io` if the directory cannot be created or the
    /// file cannot be written.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        fs::create_dir_all(dir)?;
        let path = dir.join(&self.filename);
        fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

/// `<count>_items.csv`
#[must_use]
pub fn export_filename(count: usize) -> String {
    format!("{count}_items.csv")
}

/// Serialize characters as `id,name,image,gender,species,status` lines
///
/// No header row and no trailing newline. Fields that contain a comma,
/// quote or line break are quoted.
///
/// # Errors
///
/// Returns `ExportError` if the CSV writer fails.
pub fn to_csv<'a, I>(items: I) -> Result<String, ExportError>
where
    I: IntoIterator<Item = &'a Character>,
{
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    for item in items {
        writer.write_record([
            &item.id,
            &item.name,
            &item.image,
            &item.gender,
            &item.species,
            &item.status,
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    let mut text = String::from_utf8(bytes)?;
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}
