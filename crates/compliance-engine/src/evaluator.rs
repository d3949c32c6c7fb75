//! Evaluation of one form rule for one entity

use crate::rules::{bare_result, FormRule, Obligation};
use chrono::{Local, NaiveDate};
use shared_types::{ComplianceResult, Entity, FilingRecord, FilingStatus, TaxProfile};
use tracing::{debug, instrument};

/// Everything a rule reads: the entity, its filing history and the evaluation date
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<'a> {
    pub entity: &'a Entity,
    pub records: &'a [FilingRecord],
    pub as_of: NaiveDate,
    pub tax_profile: Option<&'a TaxProfile>,
}

impl<'a> EvaluationContext<'a> {
    /// Context evaluated as of today's local date
    pub fn new(entity: &'a Entity, records: &'a [FilingRecord]) -> Self {
        Self {
            entity,
            records,
            as_of: Local::now().date_naive(),
            tax_profile: None,
        }
    }

    /// Evaluate as of a fixed date instead of today
    pub fn as_of(mut self, date: NaiveDate) -> Self {
        self.as_of = date;
        self
    }

    pub fn with_tax_profile(mut self, profile: &'a TaxProfile) -> Self {
        self.tax_profile = Some(profile);
        self
    }
}

pub struct ComplianceEvaluator;

impl ComplianceEvaluator {
    /// Results for every obligation the rule imposes, oldest first. An entity
    /// outside the rule's scope gets a single "not applicable" result.
    #[instrument(
        skip_all,
        fields(form = %rule.form_code(), statute = rule.statute_reference(), as_of = %ctx.as_of)
    )]
    pub fn evaluate(rule: &dyn FormRule, ctx: &EvaluationContext<'_>) -> Vec<ComplianceResult> {
        let obligations = rule.obligations(ctx);

        if !rule.is_applicable(ctx.entity) {
            debug!(
                company_type = ?ctx.entity.company_type,
                incorporated = %ctx.entity.incorporation_date,
                "form not applicable"
            );
            let obligation = obligations.first().copied().unwrap_or(Obligation::OneTime);
            let due_date = rule.naive_due_date(ctx, &obligation);
            return vec![bare_result(
                rule.form_code(),
                &obligation,
                due_date,
                FilingStatus::NotApplicable,
            )];
        }

        let results: Vec<ComplianceResult> = obligations
            .iter()
            .map(|obligation| {
                let result = rule.assess(ctx, obligation);
                debug!(?obligation, status = %result.filing_status, "assessed obligation");
                result
            })
            .collect();

        debug!(count = results.len(), "evaluated obligations");
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuleBook;
    use crate::rules::build_rule;
    use shared_types::{FinancialYear, FormCode};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rule_for(form: FormCode) -> Box<dyn FormRule> {
        build_rule(RuleBook::statutory().get(form).unwrap().clone()).unwrap()
    }

    #[test]
    fn test_incorporated_before_cutoff_is_not_applicable() {
        let rule = rule_for(FormCode::Inc20a);
        let entity = Entity::company(date(2018, 11, 1), Some(50_000), "MH");
        let ctx = EvaluationContext::new(&entity, &[]).as_of(date(2019, 6, 1));

        let results = ComplianceEvaluator::evaluate(rule.as_ref(), &ctx);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].filing_status, FilingStatus::NotApplicable);
        assert_eq!(results[0].due_date, date(2019, 4, 30));
        assert_eq!(results[0].total_fee(), 0);
    }

    #[test]
    fn test_rules_carry_their_statute() {
        assert_eq!(
            rule_for(FormCode::Aoc4).statute_reference(),
            "Companies Act 2013, s.137"
        );
        assert_eq!(
            rule_for(FormCode::Mgt7).statute_reference(),
            "Companies Act 2013, s.92(4)"
        );
    }

    #[test]
    fn test_cutoff_day_itself_is_applicable() {
        let rule = rule_for(FormCode::Inc20a);
        let entity = Entity::company(date(2018, 11, 2), Some(50_000), "MH");
        let ctx = EvaluationContext::new(&entity, &[]).as_of(date(2019, 6, 1));

        let results = ComplianceEvaluator::evaluate(rule.as_ref(), &ctx);
        assert_ne!(results[0].filing_status, FilingStatus::NotApplicable);
    }

    #[test]
    fn test_wrong_entity_type_is_not_applicable() {
        let rule = rule_for(FormCode::LlpForm11);
        let entity = Entity::company(date(2019, 6, 1), None, "MH");
        let ctx = EvaluationContext::new(&entity, &[]).as_of(date(2022, 6, 1));

        let results = ComplianceEvaluator::evaluate(rule.as_ref(), &ctx);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].filing_status, FilingStatus::NotApplicable);
        assert_eq!(results[0].financial_year, Some(FinancialYear::new(2019)));
    }

    #[test]
    fn test_annual_results_are_ordered_by_year() {
        let rule = rule_for(FormCode::Aoc4);
        let entity = Entity::company(date(2019, 6, 1), None, "MH");
        let ctx = EvaluationContext::new(&entity, &[]).as_of(date(2022, 6, 1));

        let years: Vec<_> = ComplianceEvaluator::evaluate(rule.as_ref(), &ctx)
            .iter()
            .filter_map(|r| r.financial_year)
            .map(|y| y.start_year)
            .collect();
        assert_eq!(years, vec![2019, 2020, 2021, 2022, 2023]);
    }
}
