use crate::error::{HarvestError, Result};
use crate::results::{COLUMNS, ResultSet};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

/// Appends result sets to a `;`-delimited file
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends every record in order. The header row is written only when the
    /// file does not exist yet, so repeated runs share a single header.
    pub fn append(&self, results: &ResultSet) -> Result<usize> {
        let write_header = !self.path.exists();

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.error(e.into()))?;
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b';')
            .has_headers(false)
            .from_writer(file);

        if write_header {
            writer.write_record(COLUMNS).map_err(|e| self.error(e))?;
        }
        for record in results.records() {
            writer.serialize(record).map_err(|e| self.error(e))?;
        }
        writer.flush().map_err(|e| self.error(e.into()))?;

        ::log::debug!(
            "Appended {} rows to {} (header: {})",
            results.len(),
            self.path.display(),
            write_header
        );
        Ok(results.len())
    }

    fn error(&self, source: csv::Error) -> HarvestError {
        HarvestError::Sink {
            path: self.path.clone(),
            source,
        }
    }
}
