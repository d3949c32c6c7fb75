//! Ingestion of filing records from both upstream schema generations
//!
//! The legacy schema uses camelCase keys, string fees and "Y"/"N" payment
//! flags. The current schema uses snake_case keys, a nested fee object and
//! spelled-out payment states. Legacy slash dates are month first, current
//! ones day first. Both are read into one `FilingRecord` tagged with its
//! generation, with the form identity classified once here.

use crate::error::{ComplianceError, Result};
use crate::extractors::numeric::rupees_from_value;
use crate::patterns::classify;
use serde::Deserialize;
use serde_json::Value;
use shared_types::{FilingRecord, PaymentStatus, SchemaGeneration};
use tracing::{debug, warn};

/// Placeholders upstream writes instead of leaving a date empty
const BLANK_MARKERS: &[&str] = &["", "-", "--", "na", "n/a", "null", "nil"];

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawFilingRecord {
    Current(CurrentRecord),
    Legacy(LegacyRecord),
}

#[derive(Debug, Clone, Deserialize)]
pub struct CurrentRecord {
    pub form_description: String,
    #[serde(default)]
    pub event_date: Option<String>,
    #[serde(default)]
    pub filing_date: Option<String>,
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default)]
    pub fees: Option<CurrentFees>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CurrentFees {
    #[serde(default)]
    pub normal_fee: Option<Value>,
    #[serde(default)]
    pub additional_fee: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyRecord {
    #[serde(alias = "formType")]
    pub form_name: String,
    #[serde(default)]
    pub event_date: Option<String>,
    #[serde(default, alias = "filingDate")]
    pub date_of_filing: Option<String>,
    #[serde(default)]
    pub fee_paid: Option<String>,
    #[serde(default)]
    pub normal_fee: Option<Value>,
    #[serde(default)]
    pub additional_fee: Option<Value>,
}

fn present(date: Option<String>) -> Option<String> {
    date.map(|d| d.trim().to_string())
        .filter(|d| !BLANK_MARKERS.contains(&d.to_lowercase().as_str()))
}

fn payment_status(raw: Option<&str>) -> PaymentStatus {
    let Some(raw) = raw else {
        return PaymentStatus::None;
    };
    match raw.trim().to_lowercase().as_str() {
        "paid" | "y" | "yes" | "success" | "completed" => PaymentStatus::Paid,
        "pending" | "n" | "no" | "unpaid" | "under processing" => PaymentStatus::Pending,
        _ => PaymentStatus::None,
    }
}

/// Convert one raw upstream record into the uniform shape
pub fn ingest(raw: RawFilingRecord) -> FilingRecord {
    match raw {
        RawFilingRecord::Current(r) => {
            let fees = r.fees.unwrap_or_default();
            FilingRecord {
                kind: classify(&r.form_description),
                generation: SchemaGeneration::Current,
                form_identifier: r.form_description,
                event_date: present(r.event_date),
                filing_date: present(r.filing_date),
                payment_status: payment_status(r.payment_status.as_deref()),
                recorded_normal_fee: fees.normal_fee.as_ref().and_then(rupees_from_value),
                recorded_additional_fee: fees.additional_fee.as_ref().and_then(rupees_from_value),
            }
        }
        RawFilingRecord::Legacy(r) => FilingRecord {
            kind: classify(&r.form_name),
            generation: SchemaGeneration::Legacy,
            form_identifier: r.form_name,
            event_date: present(r.event_date),
            filing_date: present(r.date_of_filing),
            payment_status: payment_status(r.fee_paid.as_deref()),
            recorded_normal_fee: r.normal_fee.as_ref().and_then(rupees_from_value),
            recorded_additional_fee: r.additional_fee.as_ref().and_then(rupees_from_value),
        },
    }
}

/// Ingest a snapshot of JSON values, skipping entries that match neither schema
pub fn ingest_values(values: Vec<Value>) -> Vec<FilingRecord> {
    let mut records = Vec::with_capacity(values.len());

    for (index, value) in values.into_iter().enumerate() {
        match serde_json::from_value::<RawFilingRecord>(value) {
            Ok(raw) => records.push(ingest(raw)),
            Err(e) => warn!(index, error = %e, "skipping filing record in unknown schema"),
        }
    }

    debug!(count = records.len(), "ingested filing records");
    records
}

/// Ingest a JSON array of filing records
pub fn ingest_json(json: &str) -> Result<Vec<FilingRecord>> {
    let values: Vec<Value> =
        serde_json::from_str(json).map_err(|e| ComplianceError::RecordFormat(e.to_string()))?;
    Ok(ingest_values(values))
}
