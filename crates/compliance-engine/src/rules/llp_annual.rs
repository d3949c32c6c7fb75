// Annual LLP forms (Form 11, Form 8)
use super::{assess_against, candidate_records, select_record, FormRule, Obligation};
use crate::calendar::add_months;
use crate::config::{ComplianceRule, DueDateStrategy, EventAnchor, EventOffsetParams, MonthDay};
use crate::error::{ComplianceError, Result};
use crate::evaluator::EvaluationContext;
use chrono::{Duration, NaiveDate};
use shared_types::{ComplianceResult, FinancialYear};
use tracing::debug;

/// Due on a date fixed relative to the close of the financial year, unless
/// a relief circular extended that year. Filing opens once the year closes.
#[derive(Debug, Clone)]
pub struct LlpAnnualRule {
    rule: ComplianceRule,
    params: EventOffsetParams,
}

impl LlpAnnualRule {
    pub fn new(rule: ComplianceRule) -> Result<Self> {
        let DueDateStrategy::EventOffset(params) = rule.due_date_strategy.clone() else {
            return Err(ComplianceError::InvalidConfig {
                form: rule.form_code,
                reason: "LLP annual rule needs an event-offset due date".to_string(),
            });
        };
        Ok(Self { rule, params })
    }

    pub fn due_date_for(&self, year: FinancialYear) -> NaiveDate {
        if let Some(relief) = self
            .params
            .relief
            .iter()
            .find(|relief| relief.financial_year == year)
        {
            debug!(
                form = %self.rule.form_code,
                year = %year,
                due = %relief.due_date,
                "relief override"
            );
            return relief.due_date;
        }

        match self.params.anchor {
            EventAnchor::CalendarDate { month, day } => {
                MonthDay::new(month, day).in_year(year.end_year)
            }
            EventAnchor::AfterYearEnd { months, days } => {
                add_months(year.end(), months) + Duration::days(days)
            }
        }
    }

    fn year_of(obligation: &Obligation) -> FinancialYear {
        obligation
            .financial_year()
            .unwrap_or_else(|| FinancialYear::new(0))
    }
}

impl FormRule for LlpAnnualRule {
    fn rule(&self) -> &ComplianceRule {
        &self.rule
    }

    fn naive_due_date(&self, _ctx: &EvaluationContext<'_>, obligation: &Obligation) -> NaiveDate {
        self.due_date_for(Self::year_of(obligation))
    }

    fn assess(&self, ctx: &EvaluationContext<'_>, obligation: &Obligation) -> ComplianceResult {
        let year = Self::year_of(obligation);
        let due_date = self.due_date_for(year);
        let opens_on = year.next().start();

        let candidates = candidate_records(&self.rule, ctx.records);
        let record = select_record(&candidates, |event| year.contains(event));

        assess_against(&self.rule, ctx, due_date, record, Some(opens_on), year.start())
            .into_result(self.rule.form_code, obligation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuleBook;
    use pretty_assertions::assert_eq;
    use shared_types::{Entity, FilingRecord, FilingRecordKind, FilingStatus, FormCode};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rule_for(form: FormCode) -> LlpAnnualRule {
        LlpAnnualRule::new(RuleBook::statutory().get(form).unwrap().clone()).unwrap()
    }

    fn annual(start_year: i32) -> Obligation {
        Obligation::Annual {
            year: FinancialYear::new(start_year),
            is_first: false,
        }
    }

    #[test]
    fn test_due_dates_and_relief() {
        let form11 = rule_for(FormCode::LlpForm11);
        let form8 = rule_for(FormCode::LlpForm8);

        assert_eq!(form11.due_date_for(FinancialYear::new(2022)), date(2023, 5, 30));
        assert_eq!(form8.due_date_for(FinancialYear::new(2022)), date(2023, 10, 30));

        assert_eq!(form11.due_date_for(FinancialYear::new(2020)), date(2021, 7, 31));
        assert_eq!(form8.due_date_for(FinancialYear::new(2020)), date(2021, 12, 30));
    }

    #[test]
    fn test_regular_llp_pays_steeper_multiple_after_cutover() {
        let rule = rule_for(FormCode::LlpForm11);
        let entity = Entity::llp(date(2019, 8, 1), Some(30 * 1_00_000), "DL");
        // Weekday strings come from a date-to-string conversion upstream
        let records = vec![FilingRecord::new(FilingRecordKind::Form(FormCode::LlpForm11), "Form 11")
            .with_event_date("Sun Mar 31 2024 00:00:00 GMT+0530 (India Standard Time)")
            .with_filing_date("Tue Jul 09 2024 00:00:00 GMT+0530 (India Standard Time)")];
        let ctx = EvaluationContext::new(&entity, &records).as_of(date(2024, 8, 1));

        let result = rule.assess(&ctx, &annual(2023));
        assert_eq!(result.due_date, date(2024, 5, 30));
        assert_eq!(result.filing_status, FilingStatus::DaysDelayed(40));
        assert_eq!(result.normal_fee, 400);
        assert_eq!(result.additional_fee, 3_200);
    }

    #[test]
    fn test_small_llp_pays_lower_multiple() {
        let rule = rule_for(FormCode::LlpForm11);
        let entity = Entity::llp(date(2019, 8, 1), Some(20 * 1_00_000), "DL");
        let records = vec![FilingRecord::new(FilingRecordKind::Form(FormCode::LlpForm11), "Form 11")
            .with_event_date("31/03/2024")
            .with_filing_date("09/07/2024")];
        let ctx = EvaluationContext::new(&entity, &records).as_of(date(2024, 8, 1));

        let result = rule.assess(&ctx, &annual(2023));
        assert_eq!(result.normal_fee, 200);
        assert_eq!(result.additional_fee, 800);
    }

    #[test]
    fn test_year_not_closed_is_open_for_filing_later() {
        let rule = rule_for(FormCode::LlpForm8);
        let entity = Entity::llp(date(2019, 8, 1), None, "DL");
        let ctx = EvaluationContext::new(&entity, &[]).as_of(date(2024, 1, 15));

        let result = rule.assess(&ctx, &annual(2023));
        assert_eq!(result.filing_status, FilingStatus::OpenForFilingFrom(date(2024, 4, 1)));
        assert_eq!(result.total_fee(), 50);
    }
}
