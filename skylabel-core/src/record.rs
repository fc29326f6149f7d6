//! Label records read from a comma-separated file.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use tracing::debug;

use crate::error::{LabelError, Result};

/// One label's worth of fields, in file order.
///
/// Field 0 is the display text and field 1 the QR payload; seal layouts
/// carry extra fields after those.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    /// 1-based line the record started on (0 for built-in samples).
    pub line: u64,
    pub fields: Vec<String>,
}

impl Record {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Record {
            line: 0,
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn text(&self) -> &str {
        self.field(0)
    }

    pub fn payload(&self) -> &str {
        self.field(1)
    }

    pub fn field(&self, i: usize) -> &str {
        self.fields.get(i).map(String::as_str).unwrap_or("")
    }

    pub fn expect_arity(&self, expected: usize) -> Result<()> {
        if self.fields.len() != expected {
            return Err(LabelError::Arity {
                line: self.line,
                expected,
                found: self.fields.len(),
            });
        }
        Ok(())
    }
}

/// Parse records, skipping blank lines and lines that start with `#`.
///
/// Lines are tracked here rather than by the CSV reader so that a record's
/// line counts the comments before it. A quoted field may span lines; the
/// record keeps the line it started on.
pub fn read_records<R: Read>(mut rdr: R) -> Result<Vec<Record>> {
    let mut text = String::new();
    rdr.read_to_string(&mut text)?;
    let mut out = Vec::new();
    let mut pending = String::new();
    let mut start = 0;
    for (i, raw) in text.split_inclusive('\n').enumerate() {
        let line = i as u64 + 1;
        if pending.is_empty() {
            let bare = raw.trim_end_matches(['\r', '\n']);
            if bare.is_empty() || bare.starts_with('#') {
                continue;
            }
            start = line;
        }
        pending.push_str(raw);
        // odd quote count: a quoted field continues on the next line
        if pending.matches('"').count() % 2 == 0 {
            out.push(parse_record(&pending, start)?);
            pending.clear();
        }
    }
    if !pending.is_empty() {
        out.push(parse_record(&pending, start)?);
    }
    Ok(out)
}

fn parse_record(chunk: &str, line: u64) -> Result<Record> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(chunk.as_bytes());
    let mut row = StringRecord::new();
    reader.read_record(&mut row)?;
    let record = Record {
        line,
        fields: row.iter().map(str::to_string).collect(),
    };
    debug!(line, fields = ?record.fields, "record");
    Ok(record)
}

pub fn read_records_from_path(path: &Path) -> Result<Vec<Record>> {
    read_records(File::open(path)?)
}
