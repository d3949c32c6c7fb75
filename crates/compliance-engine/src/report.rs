//! Merging per-form results into one response

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared_types::{ComplianceReport, ComplianceResult, FormCode};

/// Forms collaborators request together
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormFamily {
    /// Post-incorporation company forms
    CompanyOneTime,
    /// Annual company forms anchored on the AGM
    CompanyAnnual,
    LlpAnnual,
    GstReturns,
}

impl FormFamily {
    pub const ALL: [FormFamily; 4] = [
        FormFamily::CompanyOneTime,
        FormFamily::CompanyAnnual,
        FormFamily::LlpAnnual,
        FormFamily::GstReturns,
    ];

    pub fn forms(&self) -> &'static [FormCode] {
        match self {
            FormFamily::CompanyOneTime => &[FormCode::Inc20a, FormCode::Adt1],
            FormFamily::CompanyAnnual => &[FormCode::Aoc4, FormCode::Mgt7],
            FormFamily::LlpAnnual => &[FormCode::LlpForm11, FormCode::LlpForm8],
            FormFamily::GstReturns => &[FormCode::Gstr1, FormCode::Gstr3b],
        }
    }
}

/// Collects results in the order forms were evaluated
#[derive(Debug, Default)]
pub struct ComplianceReportAggregator {
    results: Vec<ComplianceResult>,
}

impl ComplianceReportAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, results: Vec<ComplianceResult>) -> &mut Self {
        self.results.extend(results);
        self
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn finish(self, evaluated_on: NaiveDate) -> ComplianceReport {
        ComplianceReport {
            results: self.results,
            evaluated_on,
        }
    }
}
