// 🧾 Student Record - one spreadsheet row, validated at the store boundary
//
// Values stay verbatim as text so a bill shows exactly what the sheet holds.
// The two money columns are parsed once here; a row whose amounts are not
// numbers never becomes a StudentRecord.

use crate::error::RecordError;
use serde::ser::{Serialize, SerializeMap, Serializer};

// ============================================================================
// WELL-KNOWN FIELDS
// ============================================================================

pub const REG_NO: &str = "Reg No";
pub const DOB: &str = "DOB";
pub const TOTAL_PAYABLE: &str = "Total Payable";
pub const TOTAL_PAID: &str = "Total Paid";

// ============================================================================
// STUDENT RECORD
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct StudentRecord {
    /// (field, value) in the sheet's column order
    fields: Vec<(String, String)>,
    total_payable: Option<f64>,
    total_paid: Option<f64>,
}

impl StudentRecord {
    /// Build a record from ordered (field, value) pairs.
    ///
    /// Fails when the registration number is missing or blank, or when
    /// `Total Payable` / `Total Paid` hold something other than a finite
    /// number. Empty amount cells count as absent.
    pub fn from_fields<K, V, I>(pairs: I) -> Result<Self, RecordError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let fields: Vec<(String, String)> = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::validated(fields)
    }

    fn validated(fields: Vec<(String, String)>) -> Result<Self, RecordError> {
        let reg_no = lookup(&fields, REG_NO)
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .ok_or(RecordError::MissingRegNo)?
            .to_string();

        let total_payable = parse_amount(&fields, &reg_no, TOTAL_PAYABLE)?;
        let total_paid = parse_amount(&fields, &reg_no, TOTAL_PAID)?;

        // Dues are payable - paid; that difference has to be finite too
        let difference = total_payable.unwrap_or(0.0) - total_paid.unwrap_or(0.0);
        if !difference.is_finite() {
            return Err(RecordError::AmountOutOfRange { reg_no });
        }

        Ok(StudentRecord {
            fields,
            total_payable,
            total_paid,
        })
    }

    /// Registration number, trimmed
    pub fn reg_no(&self) -> &str {
        lookup(&self.fields, REG_NO).map(str::trim).unwrap_or_default()
    }

    pub fn dob(&self) -> Option<&str> {
        self.get(DOB).map(str::trim)
    }

    /// Raw value of the first field with this name
    pub fn get(&self, field: &str) -> Option<&str> {
        lookup(&self.fields, field)
    }

    /// Fields in native order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn total_payable(&self) -> Option<f64> {
        self.total_payable
    }

    pub fn total_paid(&self) -> Option<f64> {
        self.total_paid
    }

    /// Overwrite a field in place, or append it when the record lacks it.
    ///
    /// The record is re-validated; on error it is left exactly as it was.
    pub fn set_field(&mut self, field: &str, value: &str) -> Result<(), RecordError> {
        let mut fields = self.fields.clone();
        match fields.iter_mut().find(|(k, _)| k == field) {
            Some((_, v)) => *v = value.to_string(),
            None => fields.push((field.to_string(), value.to_string())),
        }
        *self = Self::validated(fields)?;
        Ok(())
    }
}

/// Serializes as a JSON object that keeps the sheet's column order
impl Serialize for StudentRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

fn lookup<'a>(fields: &'a [(String, String)], field: &str) -> Option<&'a str> {
    fields
        .iter()
        .find(|(k, _)| k == field)
        .map(|(_, v)| v.as_str())
}

fn parse_amount(
    fields: &[(String, String)],
    reg_no: &str,
    field: &str,
) -> Result<Option<f64>, RecordError> {
    let raw = match lookup(fields, field).map(str::trim) {
        None | Some("") => return Ok(None),
        Some(raw) => raw,
    };

    match raw.parse::<f64>() {
        Ok(amount) if amount.is_finite() => Ok(Some(amount)),
        _ => Err(RecordError::InvalidAmount {
            reg_no: reg_no.to_string(),
            field: field.to_string(),
            value: raw.to_string(),
        }),
    }
}

// ============================================================================
// TESTS
// ============================================================================
