//! CSV import and export of daily step counts.
//!
//! The import side is deliberately forgiving: every row is parsed on its
//! own, and a bad row is reported as a [`RejectedRow`] without stopping
//! the rest of the file. Accepted layout:
//!
//! ```text
//! date,steps
//! 2024-01-01,8123
//! # comments and blank lines are ignored
//! 2024-01-02, 10450, extra columns are ignored
//! ```

use std::io::{Read, Write};

use serde::Serialize;
use stepquest_types::{DailySteps, ParseError, format_date, parse_date, parse_steps};

use crate::error::Result;

/// A row that could not be turned into a [`DailySteps`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedRow {
    /// 1-based line number in the input.
    pub line: u64,
    /// The row as it appeared, cells joined by commas.
    pub content: String,
    /// Why the row was rejected.
    #[serde(serialize_with = "serialize_display")]
    pub error: ParseError,
}

fn serialize_display<S: serde::Serializer>(
    err: &ParseError,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(err)
}

/// Lazily parse `date,steps` rows from a reader.
///
/// Header rows (first cell `date`, any case) are skipped silently.
pub struct CsvRows<R: Read> {
    records: csv::StringRecordsIntoIter<R>,
}

impl<R: Read> CsvRows<R> {
    /// Wrap `reader`.
    pub fn new(reader: R) -> Self {
        let records = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .comment(Some(b'#'))
            .from_reader(reader)
            .into_records();
        Self { records }
    }
}

impl<R: Read> Iterator for CsvRows<R> {
    type Item = std::result::Result<DailySteps, RejectedRow>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let record = match self.records.next()? {
                Ok(record) => record,
                Err(e) => {
                    let line = e.position().map(|p| p.line()).unwrap_or(0);
                    return Some(Err(RejectedRow {
                        line,
                        content: String::new(),
                        error: ParseError::Malformed(e.to_string()),
                    }));
                }
            };

            let line = record.position().map(|p| p.line()).unwrap_or(0);
            let first = record.get(0).unwrap_or("");

            if record.len() == 1 && first.is_empty() {
                continue;
            }
            // Indented comments get past the reader's column-0 check
            if first.starts_with('#') || first.eq_ignore_ascii_case("date") {
                continue;
            }

            return Some(parse_record(&record).map_err(|error| RejectedRow {
                line,
                content: record.iter().collect::<Vec<_>>().join(","),
                error,
            }));
        }
    }
}

fn parse_record(record: &csv::StringRecord) -> std::result::Result<DailySteps, ParseError> {
    let (Some(date), Some(steps)) = (record.get(0), record.get(1)) else {
        return Err(ParseError::MissingColumn {
            expected: 2,
            found: record.len(),
        });
    };
    Ok(DailySteps::new(parse_date(date)?, parse_steps(steps)?))
}

/// Write `records` as CSV with a `date,steps` header.
///
/// Returns the number of data rows written.
pub fn write_csv<W: Write>(records: &[DailySteps], writer: W) -> Result<usize> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["date", "steps"])?;
    for r in records {
        wtr.write_record([format_date(r.date), r.steps.to_string()])?;
    }
    wtr.flush()?;
    Ok(records.len())
}

/// Write `records` as a pretty-printed JSON array.
pub fn write_json<W: Write>(records: &[DailySteps], mut writer: W) -> Result<usize> {
    serde_json::to_writer_pretty(&mut writer, records)?;
    writeln!(writer)?;
    Ok(records.len())
}
