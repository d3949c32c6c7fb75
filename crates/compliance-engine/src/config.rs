//! Rule configuration
//!
//! Every form rule is driven by an immutable `ComplianceRule`: its cutoffs,
//! due-date strategy, fee tables and date-format ordering. The statutory
//! definitions live in `schedules`; a TOML file can replace any of them,
//! which is how tests and deployments run rules against other tables.

use crate::calendar::{day_of_month, StubYearPolicy, REGIME_CHANGE_YEAR};
use crate::error::{ComplianceError, Result};
use crate::extractors::date::{DateFormat, LEGACY_DATE_FORMATS};
use crate::fees::{AdditionalFeeSchedule, NormalFeeTable};
use anyhow::Context;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared_types::{CompanyType, FinancialYear, FormCode, Rupees, SchemaGeneration};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recurrence {
    OneTime,
    Annual,
    PerTaxPeriod,
}

/// A calendar day resolved against a year, clamped to the month's length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthDay {
    pub month: u32,
    pub day: u32,
}

impl MonthDay {
    pub const fn new(month: u32, day: u32) -> Self {
        Self { month, day }
    }

    pub fn in_year(&self, year: i32) -> NaiveDate {
        day_of_month(year, self.month, self.day).expect("validated month/day")
    }

    fn is_valid(&self) -> bool {
        (1..=12).contains(&self.month) && (1..=31).contains(&self.day)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedOffsetParams {
    pub days_after_incorporation: i64,
    /// Shorter offset from a recorded trigger event, when the form has one
    #[serde(default)]
    pub days_after_event: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgmParams {
    pub days_after_agm: i64,
    /// Default AGM date after the end of a regular financial year
    pub default_agm: MonthDay,
    /// Default AGM date after the entity's first financial year
    pub first_agm: MonthDay,
    /// How far past year end a recorded AGM may fall and still belong to that year
    pub agm_window_months: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "anchor", rename_all = "snake_case")]
pub enum EventAnchor {
    /// Fixed date in the calendar year the financial year ends in
    CalendarDate { month: u32, day: u32 },
    /// Offset from 31 March
    AfterYearEnd { months: u32, days: i64 },
}

/// Regulatory extension that replaces the computed due date for one year
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReliefOverride {
    pub financial_year: FinancialYear,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub circular: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventOffsetParams {
    pub anchor: EventAnchor,
    #[serde(default)]
    pub relief: Vec<ReliefOverride>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxDueDayParams {
    pub monthly_day: u32,
    pub quarterly_day: u32,
    /// Added for monthly filers at or below the turnover threshold
    #[serde(default)]
    pub small_turnover_shift: u32,
    /// Added to staggered deadlines in category Y states
    #[serde(default)]
    pub category_y_shift: u32,
    /// Above this turnover a taxpayer must file monthly
    pub monthly_turnover_threshold: Rupees,
    /// Late fee ceilings keyed on aggregate turnover
    pub late_fee_caps: NormalFeeTable,
    /// First day returns were due under the regime
    pub regime_start: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum DueDateStrategy {
    FixedOffset(FixedOffsetParams),
    AgmAnchored(AgmParams),
    EventOffset(EventOffsetParams),
    FrequencyDependent(TaxDueDayParams),
}

impl DueDateStrategy {
    fn expected_recurrence(&self) -> Recurrence {
        match self {
            DueDateStrategy::FixedOffset(_) => Recurrence::OneTime,
            DueDateStrategy::AgmAnchored(_) | DueDateStrategy::EventOffset(_) => Recurrence::Annual,
            DueDateStrategy::FrequencyDependent(_) => Recurrence::PerTaxPeriod,
        }
    }
}

fn default_regime_year() -> i32 {
    REGIME_CHANGE_YEAR
}

fn default_stub_year() -> StubYearPolicy {
    StubYearPolicy::StandAlone
}

fn default_legacy_formats() -> Vec<DateFormat> {
    LEGACY_DATE_FORMATS.to_vec()
}

/// Constant definition of one regulated form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceRule {
    pub form_code: FormCode,
    #[serde(default)]
    pub statute: String,
    /// Entity type the form applies to; `None` means every entity
    #[serde(default)]
    pub applies_to: Option<CompanyType>,
    /// Entities incorporated before this date are not subject to the form
    #[serde(default)]
    pub applicability_cutoff: Option<NaiveDate>,
    pub recurrence: Recurrence,
    pub due_date_strategy: DueDateStrategy,
    pub fee_tiers: NormalFeeTable,
    pub additional_fee_schedule: AdditionalFeeSchedule,
    /// Capital at or below which the entity gets the small-entity column
    #[serde(default)]
    pub small_entity_threshold: Option<Rupees>,
    /// A fee recorded on a matched filing overrides the recomputed one
    #[serde(default)]
    pub prefer_recorded_fees: bool,
    /// Candidate formats for current-schema records
    pub date_formats: Vec<DateFormat>,
    /// Candidate formats for legacy-schema records
    #[serde(default = "default_legacy_formats")]
    pub legacy_date_formats: Vec<DateFormat>,
    #[serde(default = "default_regime_year")]
    pub regime_start_year: i32,
    #[serde(default = "default_stub_year")]
    pub stub_year: StubYearPolicy,
    /// Year whose upstream data is still being migrated
    #[serde(default)]
    pub migration_gap_year: Option<FinancialYear>,
}

impl ComplianceRule {
    fn invalid(&self, reason: impl Into<String>) -> ComplianceError {
        ComplianceError::InvalidConfig {
            form: self.form_code,
            reason: reason.into(),
        }
    }

    /// Format ordering for a record's schema generation
    pub fn date_formats_for(&self, generation: SchemaGeneration) -> &[DateFormat] {
        match generation {
            SchemaGeneration::Legacy => &self.legacy_date_formats,
            SchemaGeneration::Current => &self.date_formats,
        }
    }

    /// Reject tables that would silently produce wrong results
    pub fn validate(&self) -> Result<()> {
        if self.recurrence != self.due_date_strategy.expected_recurrence() {
            return Err(self.invalid(format!(
                "{:?} recurrence does not fit the configured due-date strategy",
                self.recurrence
            )));
        }

        if self.date_formats.is_empty() || self.legacy_date_formats.is_empty() {
            return Err(self.invalid("no candidate date formats"));
        }

        if self
            .additional_fee_schedule
            .multiplier_tables()
            .any(|table| !table.is_monotonic())
        {
            return Err(self.invalid("delay multipliers must not decrease as delay grows"));
        }

        match &self.due_date_strategy {
            DueDateStrategy::FixedOffset(p) => {
                if p.days_after_incorporation < 0 || p.days_after_event.is_some_and(|d| d < 0) {
                    return Err(self.invalid("negative offset"));
                }
            }
            DueDateStrategy::AgmAnchored(p) => {
                if !p.default_agm.is_valid() || !p.first_agm.is_valid() {
                    return Err(self.invalid("invalid default AGM date"));
                }
            }
            DueDateStrategy::EventOffset(p) => {
                if let EventAnchor::CalendarDate { month, day } = p.anchor {
                    if !MonthDay::new(month, day).is_valid() {
                        return Err(self.invalid("invalid calendar anchor"));
                    }
                }
            }
            DueDateStrategy::FrequencyDependent(p) => {
                let latest = p.monthly_day.max(p.quarterly_day)
                    + p.small_turnover_shift
                    + p.category_y_shift;
                if p.monthly_day == 0 || p.quarterly_day == 0 || latest > 31 {
                    return Err(self.invalid("due day of month out of range"));
                }
            }
        }

        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
struct RuleFile {
    #[serde(default)]
    rules: Vec<ComplianceRule>,
}

/// The set of configured rules, one per form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleBook {
    rules: BTreeMap<FormCode, ComplianceRule>,
}

impl RuleBook {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Built-in statutory definitions for every supported form
    pub fn statutory() -> Self {
        let rules = crate::schedules::statutory_rules()
            .into_iter()
            .map(|rule| (rule.form_code, rule))
            .collect();
        Self { rules }
    }

    /// Add or replace a rule after validating it
    pub fn insert(&mut self, rule: ComplianceRule) -> Result<()> {
        rule.validate()?;
        self.rules.insert(rule.form_code, rule);
        Ok(())
    }

    pub fn get(&self, form: FormCode) -> Result<&ComplianceRule> {
        self.rules
            .get(&form)
            .ok_or(ComplianceError::RuleNotConfigured(form))
    }

    pub fn forms(&self) -> impl Iterator<Item = FormCode> + '_ {
        self.rules.keys().copied()
    }

    pub fn rules(&self) -> impl Iterator<Item = &ComplianceRule> {
        self.rules.values()
    }

    /// Replace rules with the `[[rules]]` entries of a TOML document
    pub fn merge_toml(mut self, content: &str) -> Result<Self> {
        let file: RuleFile = toml::from_str(content)?;
        for rule in file.rules {
            self.insert(rule)?;
        }
        Ok(self)
    }

    /// Statutory rules with the overrides of a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Self::statutory().merge_toml(content)
    }

    /// Statutory rules with overrides from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read rule file: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid rule file: {}", path.display()))
    }
}
