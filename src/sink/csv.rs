//! CSV file sink
//!
//! Writes one row per record with a `title,url,info` header. Fields
//! containing commas, quotes, or newlines are quoted per RFC 4180.

use crate::extract::Record;
use crate::sink::{RecordSink, SinkError, SinkResult};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Buffered CSV writer over a file
pub struct CsvSink {
    writer: BufWriter<File>,
}

impl CsvSink {
    /// Creates (or truncates) the file at `path` and writes the header row
    pub fn create(path: &Path) -> SinkResult<Self> {
        let file = File::create(path)
            .map_err(|e| SinkError::Open(format!("{}: {}", path.display(), e)))?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "title,url,info")?;
        Ok(Self { writer })
    }
}

impl RecordSink for CsvSink {
    fn write(&mut self, record: &Record) -> SinkResult<()> {
        writeln!(
            self.writer,
            "{},{},{}",
            escape_field(&record.title),
            escape_field(&record.url),
            escape_field(&record.info)
        )?;
        Ok(())
    }

    fn flush(&mut self) -> SinkResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Quotes a field when it contains a delimiter, quote, or line break
fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
