//! Statutory rule definitions
//!
//! Amounts are in rupees. Sources:
//! - Companies (Registration Offices and Fees) Rules 2014, Table of Fees
//! - LLP Rules 2009, Annexure A, as amended by the LLP (Amendment) Rules 2022
//! - CGST Act 2017, s.47, with the late-fee notifications of 2021

use crate::calendar::{StubYearPolicy, REGIME_CHANGE_YEAR};
use crate::config::{
    AgmParams, ComplianceRule, DueDateStrategy, EventAnchor, EventOffsetParams, FixedOffsetParams,
    MonthDay, Recurrence, ReliefOverride, TaxDueDayParams,
};
use crate::extractors::date::{
    COMPANY_DATE_FORMATS, GST_DATE_FORMATS, LEGACY_DATE_FORMATS, LLP_DATE_FORMATS,
};
use crate::fees::{
    AdditionalFeeSchedule, BandLimit, CapitalBand, MultiplierTable, NormalFeeTable, PenaltyTable,
    PerDayRate, PolicyCutover,
};
use chrono::NaiveDate;
use shared_types::{CompanyType, FinancialYear, FormCode, Rupees};

pub const LAKH: Rupees = 1_00_000;
pub const CRORE: Rupees = 1_00_00_000;

/// Small company: paid-up capital up to 4 crore (s.2(85), as amended 2022)
pub const SMALL_COMPANY_CAPITAL: Rupees = 4 * CRORE;
/// Small LLP: contribution up to 25 lakh
pub const SMALL_LLP_CONTRIBUTION: Rupees = 25 * LAKH;
/// Above this aggregate turnover GST returns must be filed monthly
pub const MONTHLY_FILING_TURNOVER: Rupees = 5 * CRORE;

/// Financial year whose company filings upstream is still migrating
pub const COMPANY_MIGRATION_GAP_YEAR: i32 = 2021;
/// First GST return period
pub const GST_REGIME_START_YEAR: i32 = 2017;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("statutory date")
}

fn band(limit: BandLimit, fee: Rupees) -> CapitalBand {
    CapitalBand { limit, fee }
}

/// Normal filing fee by nominal share capital
pub fn company_fee_tiers() -> NormalFeeTable {
    NormalFeeTable {
        bands: vec![
            band(BandLimit::Below(LAKH), 200),
            band(BandLimit::Below(5 * LAKH), 300),
            band(BandLimit::Below(25 * LAKH), 400),
            band(BandLimit::Below(CRORE), 500),
            band(BandLimit::Unbounded, 600),
        ],
    }
}

/// Normal filing fee by partner contribution
pub fn llp_fee_tiers() -> NormalFeeTable {
    NormalFeeTable {
        bands: vec![
            band(BandLimit::AtMost(LAKH), 50),
            band(BandLimit::AtMost(5 * LAKH), 100),
            band(BandLimit::AtMost(10 * LAKH), 150),
            band(BandLimit::AtMost(25 * LAKH), 200),
            band(BandLimit::AtMost(CRORE), 400),
            band(BandLimit::Unbounded, 600),
        ],
    }
}

fn company_multipliers() -> PenaltyTable {
    PenaltyTable::Multiplier(MultiplierTable::bucketed([2, 4, 6, 10, 12], [2, 4, 6, 10, 12]))
}

/// Event-based company forms: bucketed multiples of the normal fee
pub fn company_event_additional_fees() -> AdditionalFeeSchedule {
    AdditionalFeeSchedule {
        before: company_multipliers(),
        cutover: None,
    }
}

/// Annual company forms: ₹100 per day for years starting 1 April 2018 or later
pub fn company_annual_additional_fees() -> AdditionalFeeSchedule {
    AdditionalFeeSchedule {
        before: company_multipliers(),
        cutover: Some(PolicyCutover {
            effective_from: date(2018, 4, 1),
            table: PenaltyTable::PerDay(PerDayRate {
                regular: 100,
                small: 100,
                cap: None,
            }),
        }),
    }
}

/// LLP forms: steeper regular-LLP multiples plus a daily charge from FY 2022-23
pub fn llp_additional_fees() -> AdditionalFeeSchedule {
    AdditionalFeeSchedule {
        before: PenaltyTable::Multiplier(MultiplierTable::bucketed(
            [2, 4, 6, 10, 12],
            [2, 4, 6, 10, 12],
        )),
        cutover: Some(PolicyCutover {
            effective_from: date(2022, 4, 1),
            table: PenaltyTable::Multiplier(
                MultiplierTable::bucketed([4, 8, 12, 20, 24], [2, 4, 6, 10, 12])
                    .with_surcharge(100, 50),
            ),
        }),
    }
}

/// ₹50 per day (CGST plus SGST); ceilings come from the turnover caps
pub fn gst_late_fees() -> AdditionalFeeSchedule {
    AdditionalFeeSchedule {
        before: PenaltyTable::PerDay(PerDayRate {
            regular: 50,
            small: 50,
            cap: None,
        }),
        cutover: None,
    }
}

/// Late fee ceilings by aggregate turnover
pub fn gst_late_fee_caps() -> NormalFeeTable {
    NormalFeeTable {
        bands: vec![
            band(BandLimit::AtMost(150 * LAKH), 2_000),
            band(BandLimit::AtMost(5 * CRORE), 5_000),
            band(BandLimit::Unbounded, 10_000),
        ],
    }
}

fn company_rule(
    form_code: FormCode,
    statute: &str,
    recurrence: Recurrence,
    due_date_strategy: DueDateStrategy,
) -> ComplianceRule {
    ComplianceRule {
        form_code,
        statute: statute.to_string(),
        applies_to: Some(CompanyType::Company),
        applicability_cutoff: None,
        recurrence,
        due_date_strategy,
        fee_tiers: company_fee_tiers(),
        additional_fee_schedule: company_event_additional_fees(),
        small_entity_threshold: Some(SMALL_COMPANY_CAPITAL),
        prefer_recorded_fees: true,
        date_formats: COMPANY_DATE_FORMATS.to_vec(),
        legacy_date_formats: LEGACY_DATE_FORMATS.to_vec(),
        regime_start_year: REGIME_CHANGE_YEAR,
        stub_year: StubYearPolicy::StandAlone,
        migration_gap_year: None,
    }
}

fn inc20a() -> ComplianceRule {
    ComplianceRule {
        applicability_cutoff: Some(date(2018, 11, 2)),
        ..company_rule(
            FormCode::Inc20a,
            "Companies Act 2013, s.10A",
            Recurrence::OneTime,
            DueDateStrategy::FixedOffset(FixedOffsetParams {
                days_after_incorporation: 180,
                days_after_event: None,
            }),
        )
    }
}

fn adt1() -> ComplianceRule {
    ComplianceRule {
        applicability_cutoff: Some(date(2014, 4, 1)),
        ..company_rule(
            FormCode::Adt1,
            "Companies Act 2013, s.139(6); Companies (Audit and Auditors) Rules 2014, r.4(2)",
            Recurrence::OneTime,
            DueDateStrategy::FixedOffset(FixedOffsetParams {
                days_after_incorporation: 45,
                days_after_event: Some(15),
            }),
        )
    }
}

fn agm_anchored(form_code: FormCode, statute: &str, days_after_agm: i64) -> ComplianceRule {
    ComplianceRule {
        additional_fee_schedule: company_annual_additional_fees(),
        stub_year: StubYearPolicy::MergeForward,
        migration_gap_year: Some(FinancialYear::new(COMPANY_MIGRATION_GAP_YEAR)),
        ..company_rule(
            form_code,
            statute,
            Recurrence::Annual,
            DueDateStrategy::AgmAnchored(AgmParams {
                days_after_agm,
                default_agm: MonthDay::new(9, 30),
                first_agm: MonthDay::new(12, 31),
                agm_window_months: 12,
            }),
        )
    }
}

fn llp_rule(
    form_code: FormCode,
    statute: &str,
    anchor: EventAnchor,
    relief: Vec<ReliefOverride>,
) -> ComplianceRule {
    ComplianceRule {
        form_code,
        statute: statute.to_string(),
        applies_to: Some(CompanyType::Llp),
        applicability_cutoff: None,
        recurrence: Recurrence::Annual,
        due_date_strategy: DueDateStrategy::EventOffset(EventOffsetParams { anchor, relief }),
        fee_tiers: llp_fee_tiers(),
        additional_fee_schedule: llp_additional_fees(),
        small_entity_threshold: Some(SMALL_LLP_CONTRIBUTION),
        prefer_recorded_fees: true,
        date_formats: LLP_DATE_FORMATS.to_vec(),
        legacy_date_formats: LEGACY_DATE_FORMATS.to_vec(),
        regime_start_year: REGIME_CHANGE_YEAR,
        stub_year: StubYearPolicy::StandAlone,
        migration_gap_year: None,
    }
}

fn gst_rule(
    form_code: FormCode,
    statute: &str,
    monthly_day: u32,
    quarterly_day: u32,
    shift: u32,
) -> ComplianceRule {
    ComplianceRule {
        form_code,
        statute: statute.to_string(),
        applies_to: None,
        applicability_cutoff: None,
        recurrence: Recurrence::PerTaxPeriod,
        due_date_strategy: DueDateStrategy::FrequencyDependent(TaxDueDayParams {
            monthly_day,
            quarterly_day,
            small_turnover_shift: shift,
            category_y_shift: shift,
            monthly_turnover_threshold: MONTHLY_FILING_TURNOVER,
            late_fee_caps: gst_late_fee_caps(),
            regime_start: date(GST_REGIME_START_YEAR, 7, 1),
        }),
        fee_tiers: NormalFeeTable::free(),
        additional_fee_schedule: gst_late_fees(),
        small_entity_threshold: None,
        prefer_recorded_fees: false,
        date_formats: GST_DATE_FORMATS.to_vec(),
        legacy_date_formats: LEGACY_DATE_FORMATS.to_vec(),
        regime_start_year: GST_REGIME_START_YEAR,
        stub_year: StubYearPolicy::StandAlone,
        migration_gap_year: None,
    }
}

/// Every supported form, in `FormCode::ALL` order
pub fn statutory_rules() -> Vec<ComplianceRule> {
    vec![
        inc20a(),
        adt1(),
        agm_anchored(FormCode::Aoc4, "Companies Act 2013, s.137", 29),
        agm_anchored(FormCode::Mgt7, "Companies Act 2013, s.92(4)", 59),
        llp_rule(
            FormCode::LlpForm11,
            "LLP Act 2008, s.35; LLP Rules 2009, r.25",
            EventAnchor::CalendarDate { month: 5, day: 30 },
            vec![ReliefOverride {
                financial_year: FinancialYear::new(2020),
                due_date: date(2021, 7, 31),
                circular: Some("General Circular 13/2021".to_string()),
            }],
        ),
        llp_rule(
            FormCode::LlpForm8,
            "LLP Act 2008, s.34; LLP Rules 2009, r.24",
            EventAnchor::AfterYearEnd { months: 6, days: 30 },
            vec![ReliefOverride {
                financial_year: FinancialYear::new(2020),
                due_date: date(2021, 12, 30),
                circular: Some("General Circular 17/2021".to_string()),
            }],
        ),
        gst_rule(FormCode::Gstr1, "CGST Act 2017, s.37", 11, 13, 0),
        gst_rule(FormCode::Gstr3b, "CGST Act 2017, s.39", 20, 22, 2),
    ]
}
