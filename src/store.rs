// 🗄️ Record Store - the billing spreadsheet on disk
//
// The sheet is a CSV file: header row = field names, one row per student.
// Rows are read into a raw SheetTable first and only then validated into
// StudentRecords, so malformed rows can be reported and left untouched
// instead of breaking every request.

use crate::error::{BillingError, RecordError, Result};
use crate::record::{StudentRecord, REG_NO};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

// ============================================================================
// STORE CONTRACT
// ============================================================================

pub trait RecordStore: Send + Sync {
    /// Every valid record, in sheet order
    fn load_all(&self) -> Result<Vec<StudentRecord>>;

    /// Replace the whole sheet with `records`
    fn save_all(&self, records: &[StudentRecord]) -> Result<()>;

    /// Admin write path: overwrite (or add) one field for every row with `reg_no`.
    ///
    /// Returns the record `find` will now return; `NotFound` when no row has `reg_no`.
    fn update_field(&self, reg_no: &str, field: &str, value: &str) -> Result<StudentRecord>;

    /// First record whose registration number matches
    fn find(&self, reg_no: &str) -> Result<Option<StudentRecord>> {
        let reg_no = reg_no.trim();
        Ok(self
            .load_all()?
            .into_iter()
            .find(|r| r.reg_no() == reg_no))
    }

    /// Login lookup: registration number and date of birth must both match
    fn find_by_credentials(&self, reg_no: &str, dob: &str) -> Result<Option<StudentRecord>> {
        let dob = dob.trim();
        Ok(self
            .find(reg_no)?
            .filter(|r| r.dob() == Some(dob)))
    }
}

// ============================================================================
// RAW SHEET
// ============================================================================

#[derive(Debug, Clone)]
pub struct RejectedRow {
    /// 1-based line in the source file
    pub line: u64,
    pub error: RecordError,
}

#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub records: Vec<StudentRecord>,
    pub rejected: Vec<RejectedRow>,
}

/// Unvalidated sheet contents
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetTable {
    pub headers: Vec<String>,
    pub rows: Vec<SheetRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SheetRow {
    pub line: u64,
    pub cells: Vec<String>,
}

impl SheetTable {
    pub fn from_reader<R: io::Read>(reader: R) -> std::result::Result<Self, csv::Error> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let headers: Vec<String> = rdr.headers()?.iter().map(String::from).collect();

        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            rows.push(SheetRow {
                line,
                cells: record.iter().map(String::from).collect(),
            });
        }

        Ok(SheetTable { headers, rows })
    }

    /// A missing file reads as an empty sheet
    pub fn read(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "data file missing, treating as empty");
            return Ok(SheetTable::default());
        }

        let file = std::fs::File::open(path).map_err(|source| BillingError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        SheetTable::from_reader(file).map_err(|source| BillingError::Csv {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let csv_error = |source| BillingError::Csv {
            path: path.to_path_buf(),
            source,
        };

        // Quarantined rows may be longer than the header; keep them as they are
        let mut wtr = csv::WriterBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(csv_error)?;
        wtr.write_record(&self.headers).map_err(csv_error)?;
        for row in &self.rows {
            let padding = self.headers.len().saturating_sub(row.cells.len());
            let cells = row
                .cells
                .iter()
                .map(String::as_str)
                .chain(std::iter::repeat("").take(padding));
            wtr.write_record(cells).map_err(csv_error)?;
        }
        wtr.flush().map_err(|source| BillingError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(())
    }

    /// Columns are the union of all records' fields in first-seen order;
    /// a record without some column gets an empty cell there.
    pub fn from_records(records: &[StudentRecord]) -> Self {
        let mut headers: Vec<String> = Vec::new();
        for record in records {
            for name in record.field_names() {
                if !headers.iter().any(|h| h == name) {
                    headers.push(name.to_string());
                }
            }
        }

        let rows = records
            .iter()
            .enumerate()
            .map(|(i, record)| SheetRow {
                line: i as u64 + 2,
                cells: headers
                    .iter()
                    .map(|h| record.get(h).unwrap_or_default().to_string())
                    .collect(),
            })
            .collect();

        SheetTable { headers, rows }
    }

    /// Validate every row; invalid rows are logged and reported, not returned.
    pub fn to_records(&self) -> LoadReport {
        let mut report = LoadReport::default();

        for row in &self.rows {
            match self.row_record(row) {
                Ok(record) => report.records.push(record),
                Err(error) => {
                    warn!(line = row.line, %error, "quarantined spreadsheet row");
                    report.rejected.push(RejectedRow {
                        line: row.line,
                        error,
                    });
                }
            }
        }

        report
    }

    fn row_record(&self, row: &SheetRow) -> std::result::Result<StudentRecord, RecordError> {
        if row.cells.len() > self.headers.len() {
            return Err(RecordError::RaggedRow {
                expected: self.headers.len(),
                found: row.cells.len(),
            });
        }

        // Short rows: trailing cells are empty
        let pairs = self.headers.iter().enumerate().map(|(i, h)| {
            (
                h.clone(),
                row.cells.get(i).cloned().unwrap_or_default(),
            )
        });
        StudentRecord::from_fields(pairs)
    }

    /// Set one cell in every row whose `Reg No` matches, adding the column
    /// when needed.
    ///
    /// A matching row that was valid before the edit must still be valid
    /// after it, otherwise nothing changes. Returns the first matching row
    /// that validates after the edit, i.e. the one `find` will return.
    pub fn set_cell(&mut self, reg_no: &str, field: &str, value: &str) -> Result<StudentRecord> {
        let reg_no = reg_no.trim();
        let reg_col = self
            .headers
            .iter()
            .position(|h| h == REG_NO)
            .ok_or_else(|| BillingError::NotFound(reg_no.to_string()))?;

        let matches: Vec<usize> = self
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.cells.get(reg_col).map(|c| c.trim()) == Some(reg_no))
            .map(|(i, _)| i)
            .collect();
        if matches.is_empty() {
            return Err(BillingError::NotFound(reg_no.to_string()));
        }

        let mut candidate = self.clone();
        let col = match candidate.headers.iter().position(|h| h == field) {
            Some(col) => col,
            None => {
                let col = candidate.headers.len();
                candidate.headers.push(field.to_string());
                // Over-long rows get a blank in the new column so their
                // stray cells stay stray and the row stays quarantined
                for row in candidate.rows.iter_mut().filter(|r| r.cells.len() > col) {
                    row.cells.insert(col, String::new());
                }
                col
            }
        };

        let mut first_valid = None;
        let mut first_error = None;
        for &index in &matches {
            let was_valid = self.row_record(&self.rows[index]).is_ok();

            let row = &mut candidate.rows[index];
            if row.cells.len() <= col {
                row.cells.resize(col + 1, String::new());
            }
            row.cells[col] = value.to_string();

            match candidate.row_record(&candidate.rows[index]) {
                Ok(record) => {
                    if first_valid.is_none() {
                        first_valid = Some(record);
                    }
                }
                Err(error) if was_valid => return Err(error.into()),
                Err(error) => {
                    if first_error.is_none() {
                        first_error = Some(error);
                    }
                }
            }
        }

        let record = match (first_valid, first_error) {
            (Some(record), _) => record,
            (None, Some(error)) => return Err(error.into()),
            (None, None) => return Err(BillingError::NotFound(reg_no.to_string())),
        };

        *self = candidate;
        Ok(record)
    }
}

// ============================================================================
// CSV STORE
// ============================================================================

#[derive(Debug, Clone)]
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CsvStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Valid records plus the rows that were quarantined
    pub fn load_report(&self) -> Result<LoadReport> {
        let table = SheetTable::read(&self.path)?;
        let report = table.to_records();
        debug!(
            path = %self.path.display(),
            records = report.records.len(),
            rejected = report.rejected.len(),
            "loaded billing sheet"
        );
        Ok(report)
    }
}

impl RecordStore for CsvStore {
    fn load_all(&self) -> Result<Vec<StudentRecord>> {
        Ok(self.load_report()?.records)
    }

    fn save_all(&self, records: &[StudentRecord]) -> Result<()> {
        SheetTable::from_records(records).write(&self.path)?;
        info!(path = %self.path.display(), records = records.len(), "billing sheet saved");
        Ok(())
    }

    /// Works on the raw sheet so quarantined rows survive the rewrite.
    fn update_field(&self, reg_no: &str, field: &str, value: &str) -> Result<StudentRecord> {
        let mut table = SheetTable::read(&self.path)?;
        let record = table.set_cell(reg_no, field, value)?;
        table.write(&self.path)?;

        info!(reg_no = record.reg_no(), field, "student field updated");
        Ok(record)
    }
}

// ============================================================================
// TESTS
// ============================================================================
