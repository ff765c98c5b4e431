// 🔄 Remote Sync - refresh the local sheet from a published spreadsheet
//
// Sync is an optional capability chosen at startup. With it disabled the
// rest of the system works unchanged off the local file.

use crate::error::{BillingError, Result};
use crate::record::StudentRecord;
use crate::store::{RecordStore, SheetTable};
use std::fmt;
use std::time::Duration;
use tracing::{info, warn};

pub trait RemoteSync: Send + Sync {
    /// Fetch the full remote roster
    fn pull(&self) -> Result<Vec<StudentRecord>>;

    /// Where the data comes from, for logs
    fn describe(&self) -> String;
}

// ============================================================================
// HTTP CSV EXPORT
// ============================================================================

/// Pulls a spreadsheet published as CSV (e.g. a sheet's `export?format=csv` link).
pub struct SheetExportSync {
    url: String,
    client: reqwest::blocking::Client,
}

impl SheetExportSync {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| BillingError::Sync(format!("HTTP client setup failed: {e}")))?;

        Ok(SheetExportSync {
            url: url.into(),
            client,
        })
    }
}

impl RemoteSync for SheetExportSync {
    fn pull(&self) -> Result<Vec<StudentRecord>> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| BillingError::Sync(format!("GET {} failed: {e}", self.url)))?;

        let body = response
            .text()
            .map_err(|e| BillingError::Sync(format!("reading {} failed: {e}", self.url)))?;

        parse_export(&body)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Parse a CSV export; rows that fail validation are dropped with a warning.
pub fn parse_export(body: &str) -> Result<Vec<StudentRecord>> {
    let table = SheetTable::from_reader(body.as_bytes())
        .map_err(|e| BillingError::Sync(format!("remote sheet is not valid CSV: {e}")))?;

    let report = table.to_records();
    if !report.rejected.is_empty() {
        warn!(rejected = report.rejected.len(), "remote sheet had invalid rows");
    }
    Ok(report.records)
}

// ============================================================================
// CAPABILITY FLAG
// ============================================================================

pub enum SyncCapability {
    Disabled,
    Enabled(Box<dyn RemoteSync>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Sync is disabled; the local sheet was left alone
    Skipped,
    Refreshed { records: usize },
}

impl SyncCapability {
    pub fn is_enabled(&self) -> bool {
        matches!(self, SyncCapability::Enabled(_))
    }

    /// Pull the remote roster and overwrite the store with it.
    ///
    /// An empty pull is refused so a broken export cannot wipe the sheet.
    pub fn refresh(&self, store: &dyn RecordStore) -> Result<SyncOutcome> {
        let remote = match self {
            SyncCapability::Disabled => {
                info!("remote sync disabled, using local sheet");
                return Ok(SyncOutcome::Skipped);
            }
            SyncCapability::Enabled(remote) => remote,
        };

        let records = remote.pull()?;
        if records.is_empty() {
            return Err(BillingError::Sync(format!(
                "{} returned no valid records; local sheet kept",
                remote.describe()
            )));
        }

        store.save_all(&records)?;
        info!(source = %remote.describe(), records = records.len(), "sheet refreshed from remote");

        Ok(SyncOutcome::Refreshed {
            records: records.len(),
        })
    }
}

impl fmt::Debug for SyncCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncCapability::Disabled => write!(f, "Disabled"),
            SyncCapability::Enabled(remote) => write!(f, "Enabled({})", remote.describe()),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::REG_NO;
    use crate::store::CsvStore;

    struct StaticSync(Vec<StudentRecord>);

    impl RemoteSync for StaticSync {
        fn pull(&self) -> Result<Vec<StudentRecord>> {
            Ok(self.0.clone())
        }

        fn describe(&self) -> String {
            "static".to_string()
        }
    }

    struct FailingSync;

    impl RemoteSync for FailingSync {
        fn pull(&self) -> Result<Vec<StudentRecord>> {
            Err(BillingError::Sync("connection refused".to_string()))
        }

        fn describe(&self) -> String {
            "failing".to_string()
        }
    }

    fn local_store() -> (tempfile::TempDir, CsvStore) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, "Reg No,Name\n1,Local\n").unwrap();
        (dir, CsvStore::new(path))
    }

    fn remote_record(reg: &str, name: &str) -> StudentRecord {
        StudentRecord::from_fields(vec![(REG_NO, reg), ("Name", name)]).unwrap()
    }

    #[test]
    fn test_disabled_is_skipped_and_harmless() {
        let (_dir, store) = local_store();
        let sync = SyncCapability::Disabled;

        assert!(!sync.is_enabled());
        assert_eq!(sync.refresh(&store).unwrap(), SyncOutcome::Skipped);
        assert_eq!(store.find("1").unwrap().unwrap().get("Name"), Some("Local"));
    }

    #[test]
    fn test_enabled_overwrites_store() {
        let (_dir, store) = local_store();
        let sync = SyncCapability::Enabled(Box::new(StaticSync(vec![
            remote_record("2", "Remote A"),
            remote_record("3", "Remote B"),
        ])));

        assert_eq!(
            sync.refresh(&store).unwrap(),
            SyncOutcome::Refreshed { records: 2 }
        );

        let ids: Vec<String> = store
            .load_all()
            .unwrap()
            .iter()
            .map(|r| r.reg_no().to_string())
            .collect();
        assert_eq!(ids, vec!["2", "3"]);
    }

    #[test]
    fn test_empty_pull_refused() {
        let (_dir, store) = local_store();
        let sync = SyncCapability::Enabled(Box::new(StaticSync(Vec::new())));

        assert!(matches!(sync.refresh(&store), Err(BillingError::Sync(_))));
        assert!(store.find("1").unwrap().is_some());
    }

    #[test]
    fn test_pull_failure_keeps_local_sheet() {
        let (_dir, store) = local_store();
        let sync = SyncCapability::Enabled(Box::new(FailingSync));

        assert!(sync.refresh(&store).is_err());
        assert!(store.find("1").unwrap().is_some());
    }

    #[test]
    fn test_parse_export_drops_invalid_rows() {
        let body = "Reg No,Total Payable\n1,100\n2,abc\n,50\n3,\n";
        let records = parse_export(body).unwrap();

        let ids: Vec<&str> = records.iter().map(|r| r.reg_no()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn test_debug_names_source() {
        let sync = SyncCapability::Enabled(Box::new(StaticSync(Vec::new())));
        assert_eq!(format!("{sync:?}"), "Enabled(static)");
    }
}
