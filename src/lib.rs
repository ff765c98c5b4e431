// Hostel Billing - Core Library
// Exposes all modules for use in the CLI and tests

pub mod bill;
pub mod config;
pub mod dues;
pub mod error;
pub mod record;
pub mod service;
pub mod store;
pub mod sync;

// Re-export commonly used types
pub use bill::{
    bill_file_name, generate_bill, generate_bill_on, BillHeader, BillLayout, BillOptions,
    BillTable, TableRow,
};
pub use config::AppConfig;
pub use dues::{calculate_dues, format_amount, DuesSummary};
pub use error::{BillingError, RecordError, Result};
pub use record::StudentRecord;
pub use service::BillingService;
pub use store::{CsvStore, LoadReport, RecordStore, RejectedRow, SheetTable};
pub use sync::{RemoteSync, SheetExportSync, SyncCapability, SyncOutcome};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
