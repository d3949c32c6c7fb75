// Periodic GST returns (GSTR-1, GSTR-3B)
use super::{assess_against, candidate_records, select_record, FormRule, Obligation};
use crate::calendar::{day_of_month, FinancialYearSequencer};
use crate::config::{ComplianceRule, DueDateStrategy, TaxDueDayParams};
use crate::error::{ComplianceError, Result};
use crate::evaluator::EvaluationContext;
use crate::fees::normal_fee;
use crate::jurisdiction::{GstStateGroup, State};
use chrono::{Datelike, Duration, NaiveDate};
use shared_types::{ComplianceResult, Entity, FilingFrequency, FinancialYear, Rupees, TaxPeriod};
use tracing::warn;

/// Due on a day of the month after the period closes. The day depends on
/// filing frequency, aggregate turnover and the state the entity is
/// registered in. Late fees accrue per day up to a turnover-based ceiling.
#[derive(Debug, Clone)]
pub struct TaxReturnRule {
    rule: ComplianceRule,
    params: TaxDueDayParams,
}

impl TaxReturnRule {
    pub fn new(rule: ComplianceRule) -> Result<Self> {
        let DueDateStrategy::FrequencyDependent(params) = rule.due_date_strategy.clone() else {
            return Err(ComplianceError::InvalidConfig {
                form: rule.form_code,
                reason: "tax return rule needs a frequency-dependent due date".to_string(),
            });
        };
        Ok(Self { rule, params })
    }

    fn turnover(ctx: &EvaluationContext<'_>) -> Option<Rupees> {
        ctx.tax_profile.and_then(|profile| profile.aggregate_turnover)
    }

    /// Unknown turnover is treated as below the threshold
    fn is_small_turnover(&self, turnover: Option<Rupees>) -> bool {
        turnover.map_or(true, |t| t <= self.params.monthly_turnover_threshold)
    }

    /// Large taxpayers file monthly; others follow their declaration, monthly by default
    pub fn frequency_for(
        &self,
        ctx: &EvaluationContext<'_>,
        year: FinancialYear,
        quarter: u32,
    ) -> FilingFrequency {
        if !self.is_small_turnover(Self::turnover(ctx)) {
            return FilingFrequency::Monthly;
        }
        ctx.tax_profile
            .and_then(|profile| profile.declared_frequency(year, quarter))
            .unwrap_or(FilingFrequency::Monthly)
    }

    fn state_group(&self, entity: &Entity) -> GstStateGroup {
        match State::parse_code(&entity.jurisdiction_state) {
            Some(state) => state.gst_state_group(),
            None => {
                warn!(
                    form = %self.rule.form_code,
                    state = %entity.jurisdiction_state,
                    "unknown jurisdiction, no state-group extension applied"
                );
                GstStateGroup::CategoryX
            }
        }
    }

    pub fn due_date_for(&self, ctx: &EvaluationContext<'_>, period: &TaxPeriod) -> NaiveDate {
        let small_turnover = self.is_small_turnover(Self::turnover(ctx));

        let mut day = match period.frequency {
            FilingFrequency::Monthly => self.params.monthly_day,
            FilingFrequency::Quarterly => self.params.quarterly_day,
        };
        if period.frequency == FilingFrequency::Monthly && small_turnover {
            day += self.params.small_turnover_shift;
        }

        // Staggered deadlines: quarterly filers and smaller monthly filers
        let staggered = period.frequency == FilingFrequency::Quarterly || small_turnover;
        if staggered && self.state_group(ctx.entity) == GstStateGroup::CategoryY {
            day += self.params.category_y_shift;
        }

        let following = period.end() + Duration::days(1);
        day_of_month(following.year(), following.month(), day).expect("Date overflow")
    }

    fn periods_in(&self, ctx: &EvaluationContext<'_>, year: FinancialYear) -> Vec<TaxPeriod> {
        (1..=4)
            .flat_map(|quarter| match self.frequency_for(ctx, year, quarter) {
                FilingFrequency::Monthly => ((quarter - 1) * 3 + 1..=quarter * 3)
                    .map(|month| TaxPeriod::new(year, FilingFrequency::Monthly, month))
                    .collect::<Vec<_>>(),
                FilingFrequency::Quarterly => {
                    vec![TaxPeriod::new(year, FilingFrequency::Quarterly, quarter)]
                }
            })
            .collect()
    }

    fn period_of(obligation: &Obligation) -> Option<TaxPeriod> {
        obligation.tax_period()
    }
}

impl FormRule for TaxReturnRule {
    fn rule(&self) -> &ComplianceRule {
        &self.rule
    }

    /// Every period from registration (or the regime start) that has begun by `as_of`
    fn obligations(&self, ctx: &EvaluationContext<'_>) -> Vec<Obligation> {
        let first_day = ctx.entity.incorporation_date.max(self.params.regime_start);
        if first_day > ctx.as_of {
            return Vec::new();
        }

        FinancialYearSequencer::new(self.rule.regime_start_year)
            .sequence(first_day, ctx.as_of)
            .into_iter()
            .flat_map(|year| self.periods_in(ctx, year))
            .filter(|period| period.end() >= first_day && period.start() <= ctx.as_of)
            .map(Obligation::TaxPeriod)
            .collect()
    }

    fn naive_due_date(&self, ctx: &EvaluationContext<'_>, obligation: &Obligation) -> NaiveDate {
        match Self::period_of(obligation) {
            Some(period) => self.due_date_for(ctx, &period),
            None => ctx.entity.incorporation_date.max(self.params.regime_start),
        }
    }

    fn assess(&self, ctx: &EvaluationContext<'_>, obligation: &Obligation) -> ComplianceResult {
        let period = Self::period_of(obligation).unwrap_or_else(|| {
            let first_day = ctx.entity.incorporation_date.max(self.params.regime_start);
            let year = FinancialYear::containing(first_day);
            TaxPeriod::new(year, FilingFrequency::Monthly, 1)
        });
        let due_date = self.due_date_for(ctx, &period);
        let opens_on = period.end() + Duration::days(1);

        let candidates = candidate_records(&self.rule, ctx.records);
        let record = select_record(&candidates, |event| period.contains(event));

        let mut assessment = assess_against(
            &self.rule,
            ctx,
            due_date,
            record,
            Some(opens_on),
            period.financial_year.start(),
        );
        if !self.params.late_fee_caps.bands.is_empty() {
            let cap = normal_fee(Self::turnover(ctx), &self.params.late_fee_caps);
            assessment.fees.1 = assessment.fees.1.min(cap);
        }
        assessment.into_result(self.rule.form_code, obligation)
    }
}
