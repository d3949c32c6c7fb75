//! Obligation periods: financial years (1 April to 31 March) and tax periods within them

use crate::types::Rupees;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FinancialYear {
    pub start_year: i32,
    pub end_year: i32,
}

impl FinancialYear {
    pub fn new(start_year: i32) -> Self {
        Self {
            start_year,
            end_year: start_year + 1,
        }
    }

    /// The financial year a calendar date falls in
    pub fn containing(date: NaiveDate) -> Self {
        if date.month() >= 4 {
            Self::new(date.year())
        } else {
            Self::new(date.year() - 1)
        }
    }

    /// 1 April of the start year
    pub fn start(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.start_year, 4, 1).expect("1 April is always valid")
    }

    /// 31 March of the end year
    pub fn end(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.end_year, 3, 31).expect("31 March is always valid")
    }

    pub fn next(&self) -> Self {
        Self::new(self.end_year)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start() && date <= self.end()
    }

    /// Label in the "2021-22" style used on statutory forms
    pub fn label(&self) -> String {
        format!("{}-{:02}", self.start_year, self.end_year.rem_euclid(100))
    }
}

impl std::fmt::Display for FinancialYear {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilingFrequency {
    Monthly,
    Quarterly,
}

impl FilingFrequency {
    pub fn months_per_period(&self) -> u32 {
        match self {
            FilingFrequency::Monthly => 1,
            FilingFrequency::Quarterly => 3,
        }
    }
}

/// One return period of a financial year
///
/// `index` is 1-based: April is month 1, April-June is quarter 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaxPeriod {
    pub financial_year: FinancialYear,
    pub frequency: FilingFrequency,
    pub index: u32,
}

impl TaxPeriod {
    pub fn new(financial_year: FinancialYear, frequency: FilingFrequency, index: u32) -> Self {
        Self {
            financial_year,
            frequency,
            index,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.first_day_of(self.index)
    }

    pub fn end(&self) -> NaiveDate {
        self.first_day_of(self.index + 1)
            .pred_opt()
            .expect("period end precedes the next period start")
    }

    /// Quarter (1-4) this period belongs to
    pub fn quarter(&self) -> u32 {
        match self.frequency {
            FilingFrequency::Monthly => (self.index - 1) / 3 + 1,
            FilingFrequency::Quarterly => self.index,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start() && date <= self.end()
    }

    pub fn label(&self) -> String {
        match self.frequency {
            FilingFrequency::Monthly => self.start().format("%b %Y").to_string(),
            FilingFrequency::Quarterly => format!("Q{} {}", self.index, self.financial_year),
        }
    }

    fn first_day_of(&self, index: u32) -> NaiveDate {
        // Months counted from January of the start year; April is month 4
        let month_offset = 3 + (index - 1) * self.frequency.months_per_period();
        let year = self.financial_year.start_year + (month_offset / 12) as i32;
        let month = month_offset % 12 + 1;
        NaiveDate::from_ymd_opt(year, month, 1).expect("first of month is always valid")
    }
}

/// Monthly/quarterly election for one quarter of a financial year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyDeclaration {
    pub financial_year: FinancialYear,
    pub quarter: u32,
    pub frequency: FilingFrequency,
}

/// Tax registration details looked up separately from the entity record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxProfile {
    pub aggregate_turnover: Option<Rupees>,
    #[serde(default)]
    pub frequencies: Vec<FrequencyDeclaration>,
}

impl TaxProfile {
    pub fn declared_frequency(&self, year: FinancialYear, quarter: u32) -> Option<FilingFrequency> {
        self.frequencies
            .iter()
            .find(|d| d.financial_year == year && d.quarter == quarter)
            .map(|d| d.frequency)
    }
}
