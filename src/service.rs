// 🏨 Billing Service - the context object request handlers work through
//
// Holds the store, the sync capability and the bill settings. Nothing is
// cached: every call reads the sheet again.

use crate::bill::{generate_bill, generate_bill_on, BillOptions};
use crate::config::AppConfig;
use crate::dues::{calculate_dues, DuesSummary};
use crate::error::{BillingError, Result};
use crate::record::StudentRecord;
use crate::store::{CsvStore, RecordStore};
use crate::sync::{SyncCapability, SyncOutcome};
use chrono::NaiveDate;
use std::path::PathBuf;
use tracing::debug;

pub struct BillingService {
    store: Box<dyn RecordStore>,
    sync: SyncCapability,
    bill: BillOptions,
}

impl BillingService {
    pub fn new(store: Box<dyn RecordStore>, sync: SyncCapability, bill: BillOptions) -> Self {
        BillingService { store, sync, bill }
    }

    /// CSV store at `data_file`, sync as configured
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(BillingService::new(
            Box::new(CsvStore::new(config.data_file.clone())),
            config.sync_capability()?,
            config.bill_options(),
        ))
    }

    pub fn sync_enabled(&self) -> bool {
        self.sync.is_enabled()
    }

    pub fn student(&self, reg_no: &str) -> Result<StudentRecord> {
        self.store
            .find(reg_no)?
            .ok_or_else(|| BillingError::NotFound(reg_no.trim().to_string()))
    }

    pub fn dues(&self, reg_no: &str) -> Result<(StudentRecord, DuesSummary)> {
        let record = self.student(reg_no)?;
        let dues = calculate_dues(&record);
        debug!(reg_no = record.reg_no(), due = dues.due, refund = dues.refund, "dues computed");
        Ok((record, dues))
    }

    pub fn export_bill(&self, reg_no: &str) -> Result<PathBuf> {
        let record = self.student(reg_no)?;
        generate_bill(&record, &self.bill)
    }

    pub fn export_bill_on(&self, reg_no: &str, date: NaiveDate) -> Result<PathBuf> {
        let record = self.student(reg_no)?;
        generate_bill_on(&record, &self.bill, date)
    }

    /// `None` when the pair does not match; the caller picks the message
    pub fn login(&self, reg_no: &str, dob: &str) -> Result<Option<StudentRecord>> {
        self.store.find_by_credentials(reg_no, dob)
    }

    pub fn update_field(&self, reg_no: &str, field: &str, value: &str) -> Result<StudentRecord> {
        self.store.update_field(reg_no, field, value)
    }

    /// Every valid student with their dues, in sheet order
    pub fn roster(&self) -> Result<Vec<(StudentRecord, DuesSummary)>> {
        Ok(self
            .store
            .load_all()?
            .into_iter()
            .map(|record| {
                let dues = calculate_dues(&record);
                (record, dues)
            })
            .collect())
    }

    pub fn sync(&self) -> Result<SyncOutcome> {
        self.sync.refresh(self.store.as_ref())
    }
}

// ============================================================================
// TESTS
// ============================================================================
