//! Per-form compliance results handed back to collaborators

use crate::period::{FinancialYear, TaxPeriod};
use crate::types::{FormCode, PaymentStatus, Rupees};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Serialized in place of a filing date when nothing has been filed
pub const NOT_FILED: &str = "Not filed";

/// Where an obligation stands as of the evaluation date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum FilingStatus {
    /// Incorporated before the form existed, or the wrong kind of entity
    NotApplicable,
    DaysOverdue(i64),
    DaysLeftToFile(i64),
    OnTime,
    DaysDelayed(i64),
    /// The filing window has not opened yet
    OpenForFilingFrom(NaiveDate),
    /// Upstream data for this period is still being migrated
    UpdateInProgress,
}

impl FilingStatus {
    pub fn is_filed(&self) -> bool {
        matches!(self, FilingStatus::OnTime | FilingStatus::DaysDelayed(_))
    }

    /// Delay in days that attracts an additional fee, if any
    pub fn delay_days(&self) -> i64 {
        match self {
            FilingStatus::DaysOverdue(days) | FilingStatus::DaysDelayed(days) => *days,
            _ => 0,
        }
    }
}

fn plural_days(n: i64) -> &'static str {
    if n == 1 {
        "day"
    } else {
        "days"
    }
}

impl std::fmt::Display for FilingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilingStatus::NotApplicable => f.write_str("Not applicable"),
            FilingStatus::DaysOverdue(n) => write!(f, "{} {} overdue", n, plural_days(*n)),
            FilingStatus::DaysLeftToFile(n) => write!(f, "{} {} left to file", n, plural_days(*n)),
            FilingStatus::OnTime => f.write_str("Filed on time"),
            FilingStatus::DaysDelayed(n) => write!(f, "Filed {} {} late", n, plural_days(*n)),
            FilingStatus::OpenForFilingFrom(date) => {
                write!(f, "Open for filing from {}", date.format("%d/%m/%Y"))
            }
            FilingStatus::UpdateInProgress => {
                f.write_str("Data temporarily unavailable, update in progress")
            }
        }
    }
}

/// A trigger event (such as an AGM) held after its default date, which moves the due date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LateTriggerEvent {
    pub held_on: NaiveDate,
    pub default_date: NaiveDate,
    pub period_of_delay_days: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceResult {
    pub form_code: FormCode,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub financial_year: Option<FinancialYear>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub tax_period: Option<TaxPeriod>,
    pub due_date: NaiveDate,
    pub filing_status: FilingStatus,
    #[serde(with = "filing_date_or_not_filed")]
    pub filing_date: Option<NaiveDate>,
    pub normal_fee: Rupees,
    pub additional_fee: Rupees,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub late_trigger_event: Option<LateTriggerEvent>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub payment_status: Option<PaymentStatus>,
}

impl ComplianceResult {
    pub fn is_late_trigger_event_held(&self) -> bool {
        self.late_trigger_event.is_some()
    }

    pub fn period_of_delay_days(&self) -> Option<i64> {
        self.late_trigger_event.map(|e| e.period_of_delay_days)
    }

    pub fn total_fee(&self) -> Rupees {
        self.normal_fee + self.additional_fee
    }
}

/// Results from several form rules merged into one response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub results: Vec<ComplianceResult>,
    pub evaluated_on: NaiveDate,
}

mod filing_date_or_not_filed {
    use super::NOT_FILED;
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => s.serialize_str(&d.format("%Y-%m-%d").to_string()),
            None => s.serialize_str(NOT_FILED),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw = String::deserialize(d)?;
        if raw == NOT_FILED {
            return Ok(None);
        }
        NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
            .map(Some)
            .map_err(serde::de::Error::custom)
    }
}
