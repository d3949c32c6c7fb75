//! Form rules
//!
//! Each rule family turns one `ComplianceRule` into per-obligation results.
//! A family owns its due-date arithmetic and record matching; status and fee
//! derivation are shared so every form reports delays the same way.

pub mod agm;
pub mod llp_annual;
pub mod one_time;
pub mod tax_return;

use crate::calendar::{days_between, FinancialYearSequencer};
use crate::config::{ComplianceRule, DueDateStrategy, Recurrence};
use crate::error::Result;
use crate::evaluator::EvaluationContext;
use crate::extractors::date::normalize;
use crate::fees::{additional_fee, is_small_entity, normal_fee};
use chrono::NaiveDate;
use shared_types::{
    ComplianceResult, Entity, FilingRecord, FilingStatus, FinancialYear, FormCode,
    LateTriggerEvent, Rupees, TaxPeriod,
};
use tracing::warn;

pub use agm::AgmAnchoredRule;
pub use llp_annual::LlpAnnualRule;
pub use one_time::OneTimeFormRule;
pub use tax_return::TaxReturnRule;

/// One filing an entity owes under a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Obligation {
    OneTime,
    Annual { year: FinancialYear, is_first: bool },
    TaxPeriod(TaxPeriod),
}

impl Obligation {
    pub fn financial_year(&self) -> Option<FinancialYear> {
        match self {
            Obligation::OneTime => None,
            Obligation::Annual { year, .. } => Some(*year),
            Obligation::TaxPeriod(period) => Some(period.financial_year),
        }
    }

    pub fn tax_period(&self) -> Option<TaxPeriod> {
        match self {
            Obligation::TaxPeriod(period) => Some(*period),
            _ => None,
        }
    }
}

/// Trait for form rules
pub trait FormRule: Send + Sync {
    /// The configuration this rule evaluates
    fn rule(&self) -> &ComplianceRule;

    fn form_code(&self) -> FormCode {
        self.rule().form_code
    }

    /// Statute or regulation reference (e.g., "Companies Act 2013, s.137")
    fn statute_reference(&self) -> &str {
        &self.rule().statute
    }

    /// Entity type and incorporation cutoff both admit the entity
    fn is_applicable(&self, entity: &Entity) -> bool {
        let rule = self.rule();
        let type_matches = rule
            .applies_to
            .map_or(true, |company_type| company_type == entity.company_type);
        let after_cutoff = rule
            .applicability_cutoff
            .map_or(true, |cutoff| entity.incorporation_date >= cutoff);
        type_matches && after_cutoff
    }

    /// Obligations in chronological order
    fn obligations(&self, ctx: &EvaluationContext<'_>) -> Vec<Obligation> {
        let rule = self.rule();
        match rule.recurrence {
            Recurrence::OneTime => vec![Obligation::OneTime],
            Recurrence::Annual => annual_obligations(rule, ctx),
            Recurrence::PerTaxPeriod => Vec::new(),
        }
    }

    /// Due date derived from the entity and rule alone, ignoring records
    fn naive_due_date(&self, ctx: &EvaluationContext<'_>, obligation: &Obligation) -> NaiveDate;

    /// Evaluate one obligation against the records
    fn assess(&self, ctx: &EvaluationContext<'_>, obligation: &Obligation) -> ComplianceResult;
}

/// Build the rule family that matches a configuration's due-date strategy
pub fn build_rule(rule: ComplianceRule) -> Result<Box<dyn FormRule>> {
    rule.validate()?;
    Ok(match &rule.due_date_strategy {
        DueDateStrategy::FixedOffset(_) => Box::new(OneTimeFormRule::new(rule)?),
        DueDateStrategy::AgmAnchored(_) => Box::new(AgmAnchoredRule::new(rule)?),
        DueDateStrategy::EventOffset(_) => Box::new(LlpAnnualRule::new(rule)?),
        DueDateStrategy::FrequencyDependent(_) => Box::new(TaxReturnRule::new(rule)?),
    })
}

fn annual_obligations(rule: &ComplianceRule, ctx: &EvaluationContext<'_>) -> Vec<Obligation> {
    let sequencer = FinancialYearSequencer::new(rule.regime_start_year);
    let incorporated = ctx.entity.incorporation_date;
    let clamped = sequencer.is_clamped(incorporated);

    sequencer
        .sequence_for(incorporated, ctx.as_of, rule.stub_year)
        .into_iter()
        .enumerate()
        .map(|(index, year)| Obligation::Annual {
            year,
            is_first: index == 0 && !clamped,
        })
        .collect()
}

/// Dates of a record, normalized with the rule's format ordering for its generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordDates {
    pub event: Option<NaiveDate>,
    pub filed: Option<NaiveDate>,
}

impl RecordDates {
    /// Earliest-filed first; records that were never filed sort last
    fn filing_order(&self) -> NaiveDate {
        self.filed.unwrap_or(NaiveDate::MAX)
    }
}

/// `None` when the value is present but unreadable
fn parse_field(
    record: &FilingRecord,
    rule: &ComplianceRule,
    field: &str,
    raw: Option<&str>,
) -> Option<Option<NaiveDate>> {
    let Some(raw) = raw else {
        return Some(None);
    };
    let parsed = normalize(raw, rule.date_formats_for(record.generation));
    if parsed.is_none() {
        warn!(
            form = %rule.form_code,
            record = %record.form_identifier,
            generation = ?record.generation,
            field,
            value = raw,
            "unparseable date, record left unmatched"
        );
    }
    parsed.map(Some)
}

/// Normalize a record's dates with the ordering for its schema generation.
/// A present but unparseable date disqualifies the record from matching.
pub fn read_dates(record: &FilingRecord, rule: &ComplianceRule) -> Option<RecordDates> {
    let event = parse_field(record, rule, "event_date", record.event_date.as_deref())?;
    let filed = parse_field(record, rule, "filing_date", record.filing_date.as_deref())?;
    Some(RecordDates { event, filed })
}

/// Records classified as this rule's form, with readable dates
pub fn candidate_records<'r>(
    rule: &ComplianceRule,
    records: &'r [FilingRecord],
) -> Vec<(&'r FilingRecord, RecordDates)> {
    records
        .iter()
        .filter(|record| record.kind.is(rule.form_code))
        .filter_map(|record| read_dates(record, rule).map(|dates| (record, dates)))
        .collect()
}

/// Pick the record for one obligation: among those whose event date passes
/// `belongs`, the earliest filing wins
pub fn select_record<'r, F>(
    candidates: &[(&'r FilingRecord, RecordDates)],
    belongs: F,
) -> Option<(&'r FilingRecord, RecordDates)>
where
    F: Fn(NaiveDate) -> bool,
{
    candidates
        .iter()
        .filter(|(_, dates)| dates.event.is_some_and(&belongs))
        .min_by_key(|(_, dates)| dates.filing_order())
        .copied()
}

/// Status as of `as_of` for a due date and an optional filing date
pub fn derive_status(
    due_date: NaiveDate,
    filed_on: Option<NaiveDate>,
    as_of: NaiveDate,
    opens_on: Option<NaiveDate>,
) -> FilingStatus {
    if let Some(filed_on) = filed_on {
        return if filed_on <= due_date {
            FilingStatus::OnTime
        } else {
            FilingStatus::DaysDelayed(days_between(due_date, filed_on))
        };
    }

    if let Some(opens_on) = opens_on {
        if as_of < opens_on {
            return FilingStatus::OpenForFilingFrom(opens_on);
        }
    }

    if as_of < due_date {
        FilingStatus::DaysLeftToFile(days_between(as_of, due_date))
    } else {
        FilingStatus::DaysOverdue(days_between(due_date, as_of))
    }
}

/// Normal and additional fee for an obligation
///
/// Recorded fees on a filed record win when the rule prefers them; the
/// additional fee is always zero without a positive delay.
pub fn settle_fees(
    rule: &ComplianceRule,
    entity: &Entity,
    status: &FilingStatus,
    filed_record: Option<&FilingRecord>,
    obligation_start: NaiveDate,
) -> (Rupees, Rupees) {
    let recorded = filed_record.filter(|_| rule.prefer_recorded_fees);

    let computed_normal = normal_fee(entity.capital_base, &rule.fee_tiers);
    let normal = recorded
        .and_then(|r| r.recorded_normal_fee)
        .unwrap_or(computed_normal);

    let delay = status.delay_days();
    if delay <= 0 {
        return (normal, 0);
    }

    let is_small = is_small_entity(entity.capital_base, rule.small_entity_threshold);
    let computed_additional = additional_fee(
        delay,
        normal,
        &rule.additional_fee_schedule,
        is_small,
        obligation_start,
    );
    let additional = recorded
        .and_then(|r| r.recorded_additional_fee)
        .unwrap_or(computed_additional);

    (normal, additional)
}

/// Everything an assessment decided about one obligation
#[derive(Debug, Clone)]
pub struct Assessment<'r> {
    pub due_date: NaiveDate,
    pub status: FilingStatus,
    pub record: Option<(&'r FilingRecord, RecordDates)>,
    pub fees: (Rupees, Rupees),
    pub late_trigger_event: Option<LateTriggerEvent>,
}

impl Assessment<'_> {
    pub fn into_result(self, form_code: FormCode, obligation: &Obligation) -> ComplianceResult {
        let filed = self.record.and_then(|(_, dates)| dates.filed);
        ComplianceResult {
            form_code,
            financial_year: obligation.financial_year(),
            tax_period: obligation.tax_period(),
            due_date: self.due_date,
            filing_status: self.status,
            filing_date: filed,
            normal_fee: self.fees.0,
            additional_fee: self.fees.1,
            late_trigger_event: self.late_trigger_event,
            payment_status: self.record.map(|(record, _)| record.payment_status),
        }
    }
}

/// A result carrying no filing and no fees
pub fn bare_result(
    form_code: FormCode,
    obligation: &Obligation,
    due_date: NaiveDate,
    status: FilingStatus,
) -> ComplianceResult {
    Assessment {
        due_date,
        status,
        record: None,
        fees: (0, 0),
        late_trigger_event: None,
    }
    .into_result(form_code, obligation)
}

/// Shared assessment for the common case: the record's filing date, if any,
/// against a due date, fees settled by the rule's tables
pub fn assess_against<'r>(
    rule: &ComplianceRule,
    ctx: &EvaluationContext<'_>,
    due_date: NaiveDate,
    record: Option<(&'r FilingRecord, RecordDates)>,
    opens_on: Option<NaiveDate>,
    obligation_start: NaiveDate,
) -> Assessment<'r> {
    let filed_record = record.filter(|(_, dates)| dates.filed.is_some());
    let status = derive_status(
        due_date,
        filed_record.and_then(|(_, dates)| dates.filed),
        ctx.as_of,
        opens_on,
    );
    let fees = settle_fees(
        rule,
        ctx.entity,
        &status,
        filed_record.map(|(r, _)| r),
        obligation_start,
    );

    Assessment {
        due_date,
        status,
        record,
        fees,
        late_trigger_event: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuleBook;
    use shared_types::{FilingRecordKind, PaymentStatus, SchemaGeneration};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_status_for_unfiled_obligations() {
        let due = date(2022, 4, 24);
        assert_eq!(
            derive_status(due, None, date(2022, 7, 1), None),
            FilingStatus::DaysOverdue(68)
        );
        assert_eq!(
            derive_status(due, None, date(2022, 4, 23), None),
            FilingStatus::DaysLeftToFile(1)
        );
        assert_eq!(derive_status(due, None, due, None), FilingStatus::DaysOverdue(0));
        assert_eq!(
            derive_status(due, None, date(2022, 3, 1), Some(date(2022, 4, 1))),
            FilingStatus::OpenForFilingFrom(date(2022, 4, 1))
        );
    }

    #[test]
    fn test_status_for_filed_obligations() {
        let due = date(2022, 4, 24);
        let as_of = date(2030, 1, 1);
        assert_eq!(derive_status(due, Some(due), as_of, None), FilingStatus::OnTime);
        assert_eq!(
            derive_status(due, Some(date(2022, 5, 4)), as_of, None),
            FilingStatus::DaysDelayed(10)
        );
    }

    #[test]
    fn test_unparseable_date_disqualifies_record() {
        let book = RuleBook::statutory();
        let rule = book.get(FormCode::Adt1).unwrap();
        let records = vec![
            FilingRecord::new(FilingRecordKind::Form(FormCode::Adt1), "ADT-1")
                .with_filing_date("not a date"),
            FilingRecord::new(FilingRecordKind::Form(FormCode::Adt1), "ADT-1")
                .with_filing_date("2022-05-01"),
            FilingRecord::new(FilingRecordKind::Form(FormCode::Aoc4), "AOC-4")
                .with_filing_date("2022-05-01"),
        ];

        let candidates = candidate_records(rule, &records);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].1.filed, Some(date(2022, 5, 1)));
    }

    #[test]
    fn test_dates_read_with_the_record_generation() {
        let book = RuleBook::statutory();
        let rule = book.get(FormCode::Aoc4).unwrap();
        let record = |generation| {
            FilingRecord::new(FilingRecordKind::Form(FormCode::Aoc4), "AOC-4")
                .with_generation(generation)
                .with_event_date("10/05/2023")
                .with_filing_date("11/01/2023")
        };

        let legacy = read_dates(&record(SchemaGeneration::Legacy), rule).unwrap();
        assert_eq!(legacy.event, Some(date(2023, 10, 5)));
        assert_eq!(legacy.filed, Some(date(2023, 11, 1)));

        let current = read_dates(&record(SchemaGeneration::Current), rule).unwrap();
        assert_eq!(current.event, Some(date(2023, 5, 10)));
        assert_eq!(current.filed, Some(date(2023, 1, 11)));
    }

    #[test]
    fn test_select_record_prefers_earliest_filing() {
        let book = RuleBook::statutory();
        let rule = book.get(FormCode::Aoc4).unwrap();
        let records = vec![
            FilingRecord::new(FilingRecordKind::Form(FormCode::Aoc4), "AOC-4")
                .with_event_date("30/09/2021")
                .with_filing_date("15/11/2021"),
            FilingRecord::new(FilingRecordKind::Form(FormCode::Aoc4), "AOC-4")
                .with_event_date("30/09/2021")
                .with_filing_date("20/10/2021")
                .with_payment_status(PaymentStatus::Paid),
            FilingRecord::new(FilingRecordKind::Form(FormCode::Aoc4), "AOC-4")
                .with_event_date("30/09/2021"),
        ];

        let candidates = candidate_records(rule, &records);
        let (record, dates) = select_record(&candidates, |_| true).unwrap();
        assert_eq!(dates.filed, Some(date(2021, 10, 20)));
        assert_eq!(record.payment_status, PaymentStatus::Paid);
    }

    #[test]
    fn test_recorded_fees_override_computed() {
        let book = RuleBook::statutory();
        let rule = book.get(FormCode::Adt1).unwrap();
        let entity = Entity::company(date(2022, 3, 10), Some(50_000), "MH");
        let record = FilingRecord::new(FilingRecordKind::Form(FormCode::Adt1), "ADT-1")
            .with_recorded_fees(Some(250), Some(900));

        let late = FilingStatus::DaysDelayed(40);
        let start = date(2021, 4, 1);
        assert_eq!(settle_fees(rule, &entity, &late, Some(&record), start), (250, 900));
        assert_eq!(settle_fees(rule, &entity, &late, None, start), (200, 800));

        // A recorded additional fee never survives an on-time filing
        assert_eq!(
            settle_fees(rule, &entity, &FilingStatus::OnTime, Some(&record), start),
            (250, 0)
        );
    }
}
