// One-time post-incorporation forms (INC-20A, ADT-1)
use super::{assess_against, candidate_records, FormRule, Obligation};
use crate::config::{ComplianceRule, DueDateStrategy, FixedOffsetParams};
use crate::error::{ComplianceError, Result};
use crate::evaluator::EvaluationContext;
use chrono::{Duration, NaiveDate};
use shared_types::{ComplianceResult, FinancialYear};

/// Due a fixed number of days after incorporation. When the rule has an
/// event offset and the recorded event happened early enough, the deadline
/// runs from the event instead.
#[derive(Debug, Clone)]
pub struct OneTimeFormRule {
    rule: ComplianceRule,
    params: FixedOffsetParams,
}

impl OneTimeFormRule {
    pub fn new(rule: ComplianceRule) -> Result<Self> {
        let DueDateStrategy::FixedOffset(params) = rule.due_date_strategy.clone() else {
            return Err(ComplianceError::InvalidConfig {
                form: rule.form_code,
                reason: "one-time rule needs a fixed-offset due date".to_string(),
            });
        };
        Ok(Self { rule, params })
    }

    fn due_from_event(&self, naive: NaiveDate, event: Option<NaiveDate>) -> NaiveDate {
        match (event, self.params.days_after_event) {
            (Some(event), Some(offset)) => {
                let from_event = event + Duration::days(offset);
                from_event.min(naive)
            }
            _ => naive,
        }
    }
}

impl FormRule for OneTimeFormRule {
    fn rule(&self) -> &ComplianceRule {
        &self.rule
    }

    fn naive_due_date(&self, ctx: &EvaluationContext<'_>, _obligation: &Obligation) -> NaiveDate {
        ctx.entity.incorporation_date + Duration::days(self.params.days_after_incorporation)
    }

    fn assess(&self, ctx: &EvaluationContext<'_>, obligation: &Obligation) -> ComplianceResult {
        let incorporated = ctx.entity.incorporation_date;
        let naive = self.naive_due_date(ctx, obligation);

        let candidates = candidate_records(&self.rule, ctx.records);
        // Records without an event date still count; a one-time form has nothing to place them in
        let record = candidates
            .iter()
            .filter(|(_, dates)| dates.event.map_or(true, |event| event >= incorporated))
            .min_by_key(|(_, dates)| dates.filed.unwrap_or(NaiveDate::MAX))
            .copied();

        let due_date = self.due_from_event(naive, record.and_then(|(_, dates)| dates.event));
        let obligation_start = FinancialYear::containing(incorporated).start();

        assess_against(&self.rule, ctx, due_date, record, None, obligation_start)
            .into_result(self.rule.form_code, obligation)
    }
}
