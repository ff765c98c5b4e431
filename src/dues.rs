// 💰 Dues Calculator
// Derives what a student still owes (or is owed back) from the two money columns

use crate::record::StudentRecord;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DuesSummary {
    pub total_payable: f64,
    pub total_paid: f64,
    /// Outstanding amount; zero whenever `refund` is positive
    pub due: f64,
    /// Overpaid amount; zero whenever `due` is positive
    pub refund: f64,
}

impl DuesSummary {
    /// `(total, paid, due, refund)`
    pub fn as_tuple(&self) -> (f64, f64, f64, f64) {
        (self.total_payable, self.total_paid, self.due, self.refund)
    }

    pub fn is_settled(&self) -> bool {
        self.due == 0.0 && self.refund == 0.0
    }
}

/// Missing `Total Payable` / `Total Paid` count as 0.
pub fn calculate_dues(record: &StudentRecord) -> DuesSummary {
    let total_payable = record.total_payable().unwrap_or(0.0);
    let total_paid = record.total_paid().unwrap_or(0.0);
    let raw = total_payable - total_paid;

    // Explicit branches so a settled account never yields -0
    let (due, refund) = if raw > 0.0 {
        (raw, 0.0)
    } else if raw < 0.0 {
        (0.0, -raw)
    } else {
        (0.0, 0.0)
    };

    DuesSummary {
        total_payable,
        total_paid,
        due,
        refund,
    }
}

/// Amounts print as-is: shortest decimal form, no currency, no rounding.
pub fn format_amount(amount: f64) -> String {
    if amount == 0.0 {
        "0".to_string()
    } else {
        amount.to_string()
    }
}

// ============================================================================
// TESTS
// ============================================================================
