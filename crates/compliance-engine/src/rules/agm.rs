// Annual company forms anchored on the AGM (AOC-4, MGT-7)
use super::{assess_against, bare_result, candidate_records, select_record, FormRule, Obligation};
use crate::calendar::{add_months, days_between};
use crate::config::{AgmParams, ComplianceRule, DueDateStrategy};
use crate::error::{ComplianceError, Result};
use crate::evaluator::EvaluationContext;
use chrono::{Duration, NaiveDate};
use shared_types::{ComplianceResult, FilingStatus, FinancialYear, LateTriggerEvent};
use tracing::warn;

/// Due a fixed number of days after the AGM for the year. The AGM defaults
/// to a statutory date; a recorded AGM held later moves the deadline and is
/// reported as a late trigger event.
#[derive(Debug, Clone)]
pub struct AgmAnchoredRule {
    rule: ComplianceRule,
    params: AgmParams,
}

impl AgmAnchoredRule {
    pub fn new(rule: ComplianceRule) -> Result<Self> {
        let DueDateStrategy::AgmAnchored(params) = rule.due_date_strategy.clone() else {
            return Err(ComplianceError::InvalidConfig {
                form: rule.form_code,
                reason: "annual company rule needs an AGM-anchored due date".to_string(),
            });
        };
        Ok(Self { rule, params })
    }

    fn default_agm(&self, year: FinancialYear, is_first: bool) -> NaiveDate {
        let day = if is_first {
            self.params.first_agm
        } else {
            self.params.default_agm
        };
        day.in_year(year.end_year)
    }

    /// AGMs for a year are held after it closes, within the window
    fn agm_belongs_to(&self, year: FinancialYear, held_on: NaiveDate) -> bool {
        held_on > year.end() && held_on <= add_months(year.end(), self.params.agm_window_months)
    }

    fn year_of(obligation: &Obligation) -> (FinancialYear, bool) {
        match obligation {
            Obligation::Annual { year, is_first } => (*year, *is_first),
            // Annual rules only produce annual obligations
            other => (
                other.financial_year().unwrap_or_else(|| FinancialYear::new(0)),
                false,
            ),
        }
    }
}

impl FormRule for AgmAnchoredRule {
    fn rule(&self) -> &ComplianceRule {
        &self.rule
    }

    fn naive_due_date(&self, _ctx: &EvaluationContext<'_>, obligation: &Obligation) -> NaiveDate {
        let (year, is_first) = Self::year_of(obligation);
        self.default_agm(year, is_first) + Duration::days(self.params.days_after_agm)
    }

    fn assess(&self, ctx: &EvaluationContext<'_>, obligation: &Obligation) -> ComplianceResult {
        let (year, is_first) = Self::year_of(obligation);
        let default_agm = self.default_agm(year, is_first);

        let candidates = candidate_records(&self.rule, ctx.records);
        let record = select_record(&candidates, |held_on| self.agm_belongs_to(year, held_on));

        let late_trigger_event = record
            .and_then(|(_, dates)| dates.event)
            .filter(|held_on| *held_on > default_agm)
            .map(|held_on| LateTriggerEvent {
                held_on,
                default_date: default_agm,
                period_of_delay_days: days_between(default_agm, held_on),
            });
        let agm = late_trigger_event.map_or(default_agm, |event| event.held_on);
        let due_date = agm + Duration::days(self.params.days_after_agm);

        let filed = record.and_then(|(_, dates)| dates.filed);
        if self.rule.migration_gap_year == Some(year) && filed.is_none() {
            warn!(
                form = %self.rule.form_code,
                year = %year,
                "no filing found for a year awaiting data migration"
            );
            return bare_result(
                self.rule.form_code,
                obligation,
                due_date,
                FilingStatus::UpdateInProgress,
            );
        }

        let mut assessment =
            assess_against(&self.rule, ctx, due_date, record, None, year.start());
        assessment.late_trigger_event = late_trigger_event;
        assessment.into_result(self.rule.form_code, obligation)
    }
}
