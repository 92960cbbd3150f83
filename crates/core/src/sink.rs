//! Timestamped row sink for egress files.
//!
//! Every egress file in the pipeline shares the same shape: opened once,
//! truncated, given a header row, then appended to one comma-separated row
//! at a time with a local-time `MM/DD/YYYY HH:MM:SS` prefix. The GUI
//! connector and all historical persisters write through this type.

use std::cell::RefCell;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// An append-only output file with a timestamp column.
pub struct RowFileSink {
    path: PathBuf,
    writer: RefCell<BufWriter<File>>,
}

impl RowFileSink {
    /// Create (or truncate) the output file and write the header row.
    ///
    /// `header` names the columns after the leading `Time` column.
    pub fn create(path: impl AsRef<Path>, header: &str) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)
            .with_context(|| format!("cannot open output file {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "Time,{}", header)
            .with_context(|| format!("cannot write header to {}", path.display()))?;

        Ok(Self {
            path,
            writer: RefCell::new(writer),
        })
    }

    /// Append one row, prefixed with the current local time.
    pub fn write_row(&self, row: &str) -> Result<()> {
        let timestamp = chrono::Local::now().format("%m/%d/%Y %H:%M:%S");
        let mut writer = self.writer.borrow_mut();
        writeln!(writer, "{},{}", timestamp, row)
            .with_context(|| format!("cannot append to {}", self.path.display()))?;
        writer.flush()?;
        Ok(())
    }

    /// Path of the output file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
