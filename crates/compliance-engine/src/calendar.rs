use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use shared_types::FinancialYear;

/// Companies Act 2013 forms start with the financial year beginning 1 April 2014
pub const REGIME_CHANGE_YEAR: i32 = 2014;

/// How a rule treats the short first year of an entity incorporated January-March
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StubYearPolicy {
    /// The stub folds into the following financial year
    MergeForward,
    /// The stub is an obligation year of its own
    StandAlone,
}

/// Add calendar months, clamping to the last day of a shorter month
pub fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months))
        .expect("Date overflow")
}

/// Signed day count from `from` to `to`
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    first_of_next.pred_opt()
}

/// Day `day` of the month, clamped to that month's length
pub fn day_of_month(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    let last = last_day_of_month(year, month)?;
    NaiveDate::from_ymd_opt(year, month, day.min(last.day()))
}

/// Derives the financial years an entity has been subject to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinancialYearSequencer {
    regime_start_year: i32,
}

impl FinancialYearSequencer {
    pub fn new(regime_start_year: i32) -> Self {
        Self { regime_start_year }
    }

    /// First financial year, clamped to the regime change year
    pub fn effective_start(&self, incorporation: NaiveDate) -> FinancialYear {
        FinancialYear::containing(incorporation).max(FinancialYear::new(self.regime_start_year))
    }

    /// Whether the entity predates the regime and had its history clamped
    pub fn is_clamped(&self, incorporation: NaiveDate) -> bool {
        FinancialYear::containing(incorporation).start_year < self.regime_start_year
    }

    /// Contiguous years from incorporation through the year after `today`
    ///
    /// The trailing year surfaces the upcoming obligation. A January-March
    /// incorporation gets the full year containing it, not a truncated stub.
    pub fn sequence(&self, incorporation: NaiveDate, today: NaiveDate) -> Vec<FinancialYear> {
        let last = FinancialYear::containing(today).next();
        let mut years = Vec::new();
        let mut current = self.effective_start(incorporation);

        while current <= last {
            years.push(current);
            current = current.next();
        }

        years
    }

    /// Sequence with the rule's stub-year policy applied
    pub fn sequence_for(
        &self,
        incorporation: NaiveDate,
        today: NaiveDate,
        policy: StubYearPolicy,
    ) -> Vec<FinancialYear> {
        let mut years = self.sequence(incorporation, today);

        let is_stub = incorporation.month() <= 3 && !self.is_clamped(incorporation);
        if policy == StubYearPolicy::MergeForward && is_stub && years.len() > 1 {
            years.remove(0);
        }

        years
    }
}

impl Default for FinancialYearSequencer {
    fn default() -> Self {
        Self::new(REGIME_CHANGE_YEAR)
    }
}
