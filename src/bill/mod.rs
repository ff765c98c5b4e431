// 📄 Bill Renderer
//
// record + dues → BillTable (what goes on the page)
//              → BillLayout (where it goes, in points)
//              → PDF file named after the registration number

pub mod layout;
pub mod pdf;

use crate::dues::{calculate_dues, format_amount, DuesSummary};
use crate::error::Result;
use crate::record::StudentRecord;
use chrono::{Local, NaiveDate};
use std::path::{Path, PathBuf};
use tracing::info;

pub use layout::BillLayout;

pub const DEFAULT_INSTITUTION: &str = "Government Engineering College Sheohar";
pub const SUBTITLE: &str = "Hostel and Mess Bill";
/// `DD-Mon-YYYY`, e.g. 07-Mar-2025
pub const DATE_FORMAT: &str = "%d-%b-%Y";

// ============================================================================
// OPTIONS
// ============================================================================

#[derive(Debug, Clone)]
pub struct BillOptions {
    /// Printed as the title line
    pub institution: String,
    /// Directory the PDF is written into
    pub output_dir: PathBuf,
}

impl Default for BillOptions {
    fn default() -> Self {
        BillOptions {
            institution: DEFAULT_INSTITUTION.to_string(),
            output_dir: PathBuf::from("."),
        }
    }
}

// ============================================================================
// BILL CONTENT
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct BillHeader {
    pub title: String,
    pub subtitle: String,
    pub date_line: String,
}

impl BillHeader {
    pub fn new(institution: &str, date: NaiveDate) -> Self {
        BillHeader {
            title: institution.to_string(),
            subtitle: SUBTITLE.to_string(),
            date_line: date.format(DATE_FORMAT).to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub label: String,
    pub value: String,
}

impl TableRow {
    fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        TableRow {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Two-column bill table: header row, record fields, then the four totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillTable {
    pub header: TableRow,
    pub rows: Vec<TableRow>,
}

impl BillTable {
    /// The summary rows are appended even when the record already carries
    /// `Total Payable` / `Total Paid` columns, so those labels can repeat.
    pub fn from_record(record: &StudentRecord, dues: &DuesSummary) -> Self {
        let mut rows: Vec<TableRow> = record
            .fields()
            .map(|(label, value)| TableRow::new(label, value))
            .collect();

        rows.push(TableRow::new("Total Payable", format_amount(dues.total_payable)));
        rows.push(TableRow::new("Paid", format_amount(dues.total_paid)));
        rows.push(TableRow::new("Due", format_amount(dues.due)));
        rows.push(TableRow::new("Refund", format_amount(dues.refund)));

        BillTable {
            header: TableRow::new("Field", "Value"),
            rows,
        }
    }

    /// Header first, then body rows
    pub fn all_rows(&self) -> impl Iterator<Item = &TableRow> {
        std::iter::once(&self.header).chain(self.rows.iter())
    }
}

// ============================================================================
// FILE NAMING + EXPORT
// ============================================================================

/// `bill_<reg no>.pdf`; characters that are unsafe in a file name become `_`
pub fn bill_file_name(reg_no: &str) -> String {
    let safe: String = reg_no
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    // ".." alone would still escape the output directory
    let safe = if safe.chars().all(|c| c == '.') {
        safe.replace('.', "_")
    } else {
        safe
    };

    format!("bill_{}.pdf", safe)
}

/// Render today's bill for `record` and return where it was written.
pub fn generate_bill(record: &StudentRecord, options: &BillOptions) -> Result<PathBuf> {
    generate_bill_on(record, options, Local::now().date_naive())
}

/// Same as [`generate_bill`] with an explicit date stamp.
///
/// Any earlier bill with the same name is overwritten.
pub fn generate_bill_on(
    record: &StudentRecord,
    options: &BillOptions,
    date: NaiveDate,
) -> Result<PathBuf> {
    let dues = calculate_dues(record);
    let header = BillHeader::new(&options.institution, date);
    let table = BillTable::from_record(record, &dues);
    let layout = BillLayout::build(&header, &table);

    let path = bill_path(&options.output_dir, record.reg_no());
    pdf::write_pdf(&layout, &header.title, &path)?;

    info!(
        reg_no = record.reg_no(),
        pages = layout.pages.len(),
        path = %path.display(),
        "bill exported"
    );
    Ok(path)
}

pub fn bill_path(output_dir: &Path, reg_no: &str) -> PathBuf {
    output_dir.join(bill_file_name(reg_no))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{REG_NO, TOTAL_PAID, TOTAL_PAYABLE};

    fn record() -> StudentRecord {
        StudentRecord::from_fields(vec![
            (REG_NO, "101"),
            ("Name", "Ravi Ranjan"),
            ("Room", "B-12"),
            (TOTAL_PAYABLE, "5000"),
            (TOTAL_PAID, "3000"),
        ])
        .unwrap()
    }

    #[test]
    fn test_header_date_format() {
        let header = BillHeader::new(DEFAULT_INSTITUTION, NaiveDate::from_ymd_opt(2025, 3, 7).unwrap());
        assert_eq!(header.title, "Government Engineering College Sheohar");
        assert_eq!(header.subtitle, "Hostel and Mess Bill");
        assert_eq!(header.date_line, "07-Mar-2025");
    }

    #[test]
    fn test_table_fields_then_summary() {
        let record = record();
        let table = BillTable::from_record(&record, &calculate_dues(&record));

        assert_eq!(table.header, TableRow::new("Field", "Value"));

        let labels: Vec<&str> = table.rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "Reg No",
                "Name",
                "Room",
                "Total Payable",
                "Total Paid",
                "Total Payable",
                "Paid",
                "Due",
                "Refund"
            ]
        );

        let values: Vec<&str> = table.rows.iter().map(|r| r.value.as_str()).collect();
        assert_eq!(
            values,
            vec!["101", "Ravi Ranjan", "B-12", "5000", "3000", "5000", "3000", "2000", "0"]
        );
    }

    #[test]
    fn test_table_values_verbatim() {
        let record = StudentRecord::from_fields(vec![
            (REG_NO, " 102 "),
            ("Mess Days", "28"),
            (TOTAL_PAYABLE, "4000.50"),
        ])
        .unwrap();
        let table = BillTable::from_record(&record, &calculate_dues(&record));

        assert_eq!(table.rows[0].value, " 102 ");
        assert_eq!(table.rows[2].value, "4000.50");
        // Summary rows use the parsed number
        assert_eq!(table.rows[3], TableRow::new("Total Payable", "4000.5"));
        assert_eq!(table.rows[4], TableRow::new("Paid", "0"));
        assert_eq!(table.rows[5], TableRow::new("Due", "4000.5"));
    }

    #[test]
    fn test_all_rows_starts_with_header() {
        let record = record();
        let table = BillTable::from_record(&record, &calculate_dues(&record));
        assert_eq!(table.all_rows().count(), table.rows.len() + 1);
        assert_eq!(table.all_rows().next().unwrap().label, "Field");
    }

    #[test]
    fn test_bill_file_name_deterministic() {
        assert_eq!(bill_file_name("101"), "bill_101.pdf");
        assert_eq!(bill_file_name("101"), bill_file_name("101"));
        assert_eq!(bill_file_name("2021/CSE/07"), "bill_2021_CSE_07.pdf");
        assert_eq!(bill_file_name(".."), "bill___.pdf");
    }

    #[test]
    fn test_generate_bill_writes_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let options = BillOptions {
            institution: DEFAULT_INSTITUTION.to_string(),
            output_dir: dir.path().to_path_buf(),
        };

        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let path = generate_bill_on(&record(), &options, date).unwrap();

        assert_eq!(path, dir.path().join("bill_101.pdf"));
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_generate_bill_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let options = BillOptions {
            institution: DEFAULT_INSTITUTION.to_string(),
            output_dir: dir.path().to_path_buf(),
        };
        std::fs::write(dir.path().join("bill_101.pdf"), b"stale").unwrap();

        let path = generate_bill(&record(), &options).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_generate_bill_missing_dir_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let options = BillOptions {
            institution: DEFAULT_INSTITUTION.to_string(),
            output_dir: dir.path().join("does-not-exist"),
        };

        let err = generate_bill(&record(), &options).unwrap_err();
        assert!(matches!(err, crate::BillingError::Io { .. }), "{err:?}");
    }
}
