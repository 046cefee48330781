//! Converter: JSON lines in, TLV records out.
//!
//! Each input line holds one JSON object. Every field name is mapped to a
//! tag through [`FieldTags`], and the field's value is appended to the
//! record's [`TlvBox`]:
//!
//! | JSON value | TLV value                       |
//! |------------|---------------------------------|
//! | integer    | `i32`, saturating               |
//! | boolean    | `i16`, 1 or 0                   |
//! | string     | UTF-8 bytes plus a trailing NUL |
//!
//! Other values (null, floats, arrays, nested objects) are skipped. Records
//! are written back to back; with [`Options::framed`] each record is
//! instead nested under tag 0 so readers can find record boundaries.

use crate::intern::{FieldTags, InternError, Tag};
use crate::tlv::{TlvBox, TlvError};
use serde_json::{Map, Number, Value};
use std::io::{BufRead, Write};
use thiserror::Error;
use tracing::{debug, trace, warn};

/// Tag of the outer item wrapping each record in framed output.
pub const FRAME_TAG: u32 = 0;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected a JSON object")]
    NotAnObject,
    #[error(transparent)]
    Intern(#[from] InternError),
    #[error(transparent)]
    Tlv(#[from] TlvError),
}

impl RecordError {
    /// Whether the error is caused by the input line itself.
    pub fn is_malformed_input(&self) -> bool {
        matches!(self, RecordError::Json(_) | RecordError::NotAnObject)
    }
}

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: {source}")]
    Record {
        line: usize,
        #[source]
        source: RecordError,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Options {
    /// Skip lines that are not JSON objects instead of failing.
    pub skip_invalid: bool,
    /// Wrap each record in an item tagged [`FRAME_TAG`].
    pub framed: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Records written.
    pub records: usize,
    /// Input lines skipped as malformed.
    pub skipped_records: usize,
    /// Field values of unsupported JSON types.
    pub skipped_values: usize,
    /// Bytes written.
    pub bytes: usize,
}

#[derive(Debug, Default)]
pub struct Converter {
    tags: FieldTags,
    options: Options,
    summary: Summary,
}

fn saturating_i32(n: &Number) -> Option<i32> {
    if let Some(v) = n.as_i64() {
        Some(v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32)
    } else if n.is_u64() {
        Some(i32::MAX)
    } else {
        None
    }
}

impl Converter {
    pub fn new(options: Options) -> Self {
        Self {
            tags: FieldTags::new(),
            options,
            summary: Summary::default(),
        }
    }

    pub fn tags(&self) -> &FieldTags {
        &self.tags
    }

    pub fn options(&self) -> Options {
        self.options
    }

    /// Totals across every call so far.
    pub fn summary(&self) -> Summary {
        self.summary
    }

    /// Encode one JSON object.
    pub fn encode_record(&mut self, line: impl AsRef<[u8]>) -> Result<TlvBox, RecordError> {
        let value: Value = serde_json::from_slice(line.as_ref())?;
        match value {
            Value::Object(fields) => self.encode_fields(&fields),
            _ => Err(RecordError::NotAnObject),
        }
    }

    fn encode_fields(&mut self, fields: &Map<String, Value>) -> Result<TlvBox, RecordError> {
        let mut record = TlvBox::new();
        for (name, value) in fields {
            let tag: Tag = self.tags.tag(name)?;
            match value {
                Value::Number(n) => match saturating_i32(n) {
                    Some(v) => record.put_int(tag.get(), v)?,
                    None => self.skip_value(name, "float"),
                },
                Value::Bool(b) => record.put_short(tag.get(), i16::from(*b))?,
                Value::String(s) => record.put_string(tag.get(), s)?,
                Value::Null => self.skip_value(name, "null"),
                Value::Array(_) => self.skip_value(name, "array"),
                Value::Object(_) => self.skip_value(name, "object"),
            }
        }
        Ok(record)
    }

    fn skip_value(&mut self, field: &str, kind: &str) {
        warn!(field, kind, "unsupported value type, skipping");
        self.summary.skipped_values += 1;
    }

    /// Convert every line of `reader` and write the records to `writer`.
    ///
    /// Blank lines are ignored. Returns the totals for this call.
    pub fn run<R, W>(&mut self, mut reader: R, mut writer: W) -> Result<Summary, ConvertError>
    where
        R: BufRead,
        W: Write,
    {
        let before = self.summary;
        let mut buf = Vec::new();
        let mut line = 0;

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            line += 1;
            if buf.iter().all(u8::is_ascii_whitespace) {
                continue;
            }

            let record = match self.encode_record(&buf) {
                Ok(record) => record,
                Err(e) if self.options.skip_invalid && e.is_malformed_input() => {
                    warn!(line, error = %e, "skipping record");
                    self.summary.skipped_records += 1;
                    continue;
                }
                Err(source) => return Err(ConvertError::Record { line, source }),
            };

            let written = if self.options.framed {
                let mut frame = TlvBox::new();
                frame
                    .put_box(FRAME_TAG, &record)
                    .map_err(|e| ConvertError::Record {
                        line,
                        source: e.into(),
                    })?;
                writer.write_all(frame.as_bytes())?;
                frame.len()
            } else {
                writer.write_all(record.as_bytes())?;
                record.len()
            };
            trace!(line, items = record.count(), bytes = written, "wrote record");
            self.summary.records += 1;
            self.summary.bytes += written;
        }
        writer.flush()?;

        let summary = Summary {
            records: self.summary.records - before.records,
            skipped_records: self.summary.skipped_records - before.skipped_records,
            skipped_values: self.summary.skipped_values - before.skipped_values,
            bytes: self.summary.bytes - before.bytes,
        };
        debug!(
            records = summary.records,
            skipped = summary.skipped_records,
            fields = self.tags.len(),
            "conversion finished"
        );
        Ok(summary)
    }
}
