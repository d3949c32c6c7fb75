//! End-to-end evaluations: upstream JSON in, compliance results out

use chrono::NaiveDate;
use compliance_engine::records::ingest_json;
use compliance_engine::{ComplianceEngine, EvaluationContext, FormFamily, RuleBook};
use pretty_assertions::assert_eq;
use shared_types::{
    Entity, FilingFrequency, FilingRecord, FilingStatus, FinancialYear, FormCode, PaymentStatus,
    SchemaGeneration, TaxPeriod, TaxProfile, NOT_FILED,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("compliance_engine=debug")
        .with_test_writer()
        .try_init();
}

#[test]
fn adt1_never_filed_is_overdue_from_incorporation() {
    let engine = ComplianceEngine::new();
    let entity = Entity::company(date(2022, 3, 10), Some(50_000), "Maharashtra");
    let ctx = EvaluationContext::new(&entity, &[]).as_of(date(2022, 7, 1));

    let results = engine.evaluate(FormCode::Adt1, &ctx).unwrap();
    assert_eq!(results.len(), 1);

    let adt1 = &results[0];
    assert_eq!(adt1.due_date, date(2022, 4, 24));
    assert_eq!(adt1.filing_status.to_string(), "68 days overdue");
    assert_eq!(adt1.filing_date, None);
    assert_eq!(adt1.normal_fee, 200);
    // 68 days falls in the 61-90 day bucket: six times the normal fee
    assert_eq!(adt1.additional_fee, 1_200);

    let json = serde_json::to_value(adt1).unwrap();
    assert_eq!(json["filing_date"], NOT_FILED);
}

#[test]
fn late_agm_from_current_schema_record() {
    init_tracing();
    let json = r#"[
        {
            "form_description": "Form AOC-4 XBRL",
            "event_date": "15/10/2021",
            "filing_date": "10/11/2021",
            "payment_status": "Paid",
            "fees": { "normal_fee": "300", "additional_fee": "0" }
        },
        {
            "form_description": "Form MGT-7",
            "event_date": "15/10/2021",
            "filing_date": "20/12/2021",
            "payment_status": "Paid"
        }
    ]"#;
    let records = ingest_json(json).unwrap();

    let engine = ComplianceEngine::new();
    let entity = Entity::company(date(2016, 8, 20), Some(3_00_000), "KA");
    let ctx = EvaluationContext::new(&entity, &records).as_of(date(2022, 1, 15));

    let report = engine
        .evaluate_family(FormFamily::CompanyAnnual, &ctx)
        .unwrap();
    let for_year = |form: FormCode| {
        report
            .results
            .iter()
            .find(|r| r.form_code == form && r.financial_year == Some(FinancialYear::new(2020)))
            .unwrap()
    };

    let aoc4 = for_year(FormCode::Aoc4);
    assert!(aoc4.is_late_trigger_event_held());
    assert_eq!(aoc4.period_of_delay_days(), Some(15));
    assert_eq!(aoc4.due_date, date(2021, 11, 13));
    assert_eq!(aoc4.filing_status, FilingStatus::OnTime);
    assert_eq!(aoc4.payment_status, Some(PaymentStatus::Paid));
    assert_eq!(aoc4.total_fee(), 300);

    let mgt7 = for_year(FormCode::Mgt7);
    assert_eq!(mgt7.due_date, date(2021, 12, 13));
    assert_eq!(mgt7.filing_status, FilingStatus::DaysDelayed(7));
    assert_eq!(mgt7.normal_fee, 300);
    assert_eq!(mgt7.additional_fee, 700);
}

#[test]
fn llp_size_decides_the_multiplier() {
    let json = r#"[
        {
            "formName": "Annual Return of LLP",
            "eventDate": "Sun Mar 31 2024 00:00:00 GMT+0530 (India Standard Time)",
            "dateOfFiling": "Tue Jul 09 2024 00:00:00 GMT+0530 (India Standard Time)",
            "feePaid": "Y"
        }
    ]"#;
    let records = ingest_json(json).unwrap();
    let engine = ComplianceEngine::new();

    let additional_for = |contribution| {
        let entity = Entity::llp(date(2020, 6, 1), Some(contribution), "DL");
        let ctx = EvaluationContext::new(&entity, &records).as_of(date(2024, 8, 1));
        let results = engine.evaluate(FormCode::LlpForm11, &ctx).unwrap();
        let year = results
            .into_iter()
            .find(|r| r.financial_year == Some(FinancialYear::new(2023)))
            .unwrap();
        assert_eq!(year.filing_status, FilingStatus::DaysDelayed(40));
        (year.normal_fee, year.additional_fee)
    };

    assert_eq!(additional_for(30_00_000), (400, 3_200));
    assert_eq!(additional_for(20_00_000), (200, 800));
}

#[test]
fn large_taxpayer_gstr1_late_fee_is_capped() {
    init_tracing();
    let engine = ComplianceEngine::new();
    let entity = Entity::company(date(2019, 4, 1), None, "27");
    let profile = TaxProfile {
        aggregate_turnover: Some(6_00_00_000),
        frequencies: Vec::new(),
    };
    let ctx = EvaluationContext::new(&entity, &[])
        .as_of(date(2024, 4, 1))
        .with_tax_profile(&profile);

    let results = engine.evaluate_code("GSTR-1", &ctx).unwrap();
    let april = TaxPeriod::new(FinancialYear::new(2023), FilingFrequency::Monthly, 1);
    let result = results
        .iter()
        .find(|r| r.tax_period == Some(april))
        .unwrap();

    assert_eq!(result.due_date, date(2023, 5, 11));
    assert_eq!(result.additional_fee, 10_000);
    // The current month is still open
    assert_eq!(
        results.last().unwrap().filing_status,
        FilingStatus::OpenForFilingFrom(date(2024, 5, 1))
    );
}

#[test]
fn january_incorporation_folds_into_next_year_for_company_annual_forms() {
    let engine = ComplianceEngine::new();
    let entity = Entity::company(date(2022, 2, 10), Some(50_000), "MH");
    let ctx = EvaluationContext::new(&entity, &[]).as_of(date(2023, 6, 1));

    let aoc4 = engine.evaluate(FormCode::Aoc4, &ctx).unwrap();
    assert_eq!(aoc4[0].financial_year, Some(FinancialYear::new(2022)));
    assert_eq!(aoc4[0].due_date, date(2024, 1, 29));

    // LLP forms keep the stub year, so a Form 11 for 2021-22 is owed
    let llp = Entity::llp(date(2022, 2, 10), None, "MH");
    let ctx = EvaluationContext::new(&llp, &[]).as_of(date(2023, 6, 1));
    let form11 = engine.evaluate(FormCode::LlpForm11, &ctx).unwrap();
    assert_eq!(form11[0].financial_year, Some(FinancialYear::new(2021)));
    assert_eq!(form11[0].due_date, date(2022, 5, 30));
}

#[test]
fn rule_file_overrides_statutory_tables() {
    let path = std::env::temp_dir().join(format!("rule-book-{}.toml", std::process::id()));
    std::fs::write(
        &path,
        r#"
        [[rules]]
        form_code = "INC-20A"
        statute = "Synthetic 90-day window"
        applies_to = "COMPANY"
        recurrence = "one_time"
        date_formats = ["iso_date"]

        [rules.due_date_strategy]
        strategy = "fixed_offset"
        days_after_incorporation = 90

        [rules.fee_tiers]
        bands = [{ limit = { kind = "unbounded" }, fee = 1000 }]

        [rules.additional_fee_schedule.before]
        type = "per_day"
        regular = 10
        small = 10
        cap = 500
        "#,
    )
    .unwrap();

    let book = RuleBook::from_file(&path).unwrap();
    std::fs::remove_file(&path).ok();

    let engine = ComplianceEngine::with_rule_book(book).unwrap();
    let entity = Entity::company(date(2023, 1, 1), None, "MH");
    let ctx = EvaluationContext::new(&entity, &[]).as_of(date(2023, 6, 1));

    let results = engine.evaluate(FormCode::Inc20a, &ctx).unwrap();
    assert_eq!(results[0].due_date, date(2023, 4, 1));
    assert_eq!(results[0].filing_status, FilingStatus::DaysOverdue(61));
    assert_eq!(results[0].normal_fee, 1_000);
    assert_eq!(results[0].additional_fee, 500);
}

#[test]
fn missing_rule_file_reports_path() {
    let err = RuleBook::from_file("/nonexistent/rules.toml").unwrap_err();
    assert!(err.to_string().contains("/nonexistent/rules.toml"));
}

/// The same filing described once per upstream schema generation
fn both_generations(current: &str, legacy: &str) -> [Vec<FilingRecord>; 2] {
    let records = [ingest_json(current).unwrap(), ingest_json(legacy).unwrap()];
    assert_eq!(records[0][0].generation, SchemaGeneration::Current);
    assert_eq!(records[1][0].generation, SchemaGeneration::Legacy);
    records
}

#[test]
fn ambiguous_adt1_dates_follow_the_record_schema() {
    // Appointed 5 April, filed 12 April
    let generations = both_generations(
        r#"[{ "form_description": "Form ADT-1", "event_date": "05/04/2022", "filing_date": "12/04/2022" }]"#,
        r#"[{ "formName": "Form ADT-1", "eventDate": "04/05/2022", "dateOfFiling": "04/12/2022" }]"#,
    );
    let engine = ComplianceEngine::new();
    let entity = Entity::company(date(2022, 3, 10), Some(50_000), "MH");

    for records in &generations {
        let ctx = EvaluationContext::new(&entity, records).as_of(date(2022, 7, 1));
        let adt1 = &engine.evaluate(FormCode::Adt1, &ctx).unwrap()[0];
        assert_eq!(adt1.due_date, date(2022, 4, 20));
        assert_eq!(adt1.filing_date, Some(date(2022, 4, 12)));
        assert_eq!(adt1.filing_status, FilingStatus::OnTime);
        assert_eq!(adt1.additional_fee, 0);
    }
}

#[test]
fn ambiguous_aoc4_dates_follow_the_record_schema() {
    // AGM held 5 October 2023, filed 1 November 2023
    let generations = both_generations(
        r#"[{ "form_description": "Form AOC-4", "event_date": "05/10/2023", "filing_date": "01/11/2023" }]"#,
        r#"[{ "formName": "Form AOC-4", "eventDate": "10/05/2023", "dateOfFiling": "11/01/2023" }]"#,
    );
    let engine = ComplianceEngine::new();
    let entity = Entity::company(date(2016, 8, 20), Some(3_00_000), "KA");

    for records in &generations {
        let ctx = EvaluationContext::new(&entity, records).as_of(date(2024, 6, 1));
        let results = engine.evaluate(FormCode::Aoc4, &ctx).unwrap();
        let aoc4 = results
            .iter()
            .find(|r| r.financial_year == Some(FinancialYear::new(2022)))
            .unwrap();
        assert!(aoc4.is_late_trigger_event_held());
        assert_eq!(aoc4.period_of_delay_days(), Some(5));
        assert_eq!(aoc4.due_date, date(2023, 11, 3));
        assert_eq!(aoc4.filing_date, Some(date(2023, 11, 1)));
        assert_eq!(aoc4.filing_status, FilingStatus::OnTime);
    }
}

#[test]
fn ambiguous_llp_dates_follow_the_record_schema() {
    // Event dated 5 March 2024, filed 4 June 2024
    let generations = both_generations(
        r#"[{ "form_description": "LLP Form 11", "event_date": "05/03/2024", "filing_date": "04/06/2024" }]"#,
        r#"[{ "formName": "LLP Form 11", "eventDate": "03/05/2024", "dateOfFiling": "06/04/2024" }]"#,
    );
    let engine = ComplianceEngine::new();
    let entity = Entity::llp(date(2020, 6, 1), Some(30_00_000), "DL");

    for records in &generations {
        let ctx = EvaluationContext::new(&entity, records).as_of(date(2024, 8, 1));
        let results = engine.evaluate(FormCode::LlpForm11, &ctx).unwrap();
        let form11 = results
            .iter()
            .find(|r| r.financial_year == Some(FinancialYear::new(2023)))
            .unwrap();
        assert_eq!(form11.due_date, date(2024, 5, 30));
        assert_eq!(form11.filing_date, Some(date(2024, 6, 4)));
        assert_eq!(form11.filing_status, FilingStatus::DaysDelayed(5));
        assert_eq!((form11.normal_fee, form11.additional_fee), (400, 1_600));
    }
}

#[test]
fn ambiguous_gst_dates_follow_the_record_schema() {
    // May 2023 return filed 13 June 2023
    let generations = both_generations(
        r#"[{ "form_description": "GSTR-1", "event_date": "01/05/2023", "filing_date": "13/06/2023" }]"#,
        r#"[{ "formName": "GSTR-1", "eventDate": "05/01/2023", "dateOfFiling": "06/13/2023" }]"#,
    );
    let engine = ComplianceEngine::new();
    let entity = Entity::company(date(2019, 4, 1), None, "27");
    let profile = TaxProfile {
        aggregate_turnover: Some(6_00_00_000),
        frequencies: Vec::new(),
    };
    let may = TaxPeriod::new(FinancialYear::new(2023), FilingFrequency::Monthly, 2);

    for records in &generations {
        let ctx = EvaluationContext::new(&entity, records)
            .as_of(date(2024, 1, 1))
            .with_tax_profile(&profile);
        let results = engine.evaluate(FormCode::Gstr1, &ctx).unwrap();
        let result = results.iter().find(|r| r.tax_period == Some(may)).unwrap();
        assert_eq!(result.due_date, date(2023, 6, 11));
        assert_eq!(result.filing_date, Some(date(2023, 6, 13)));
        assert_eq!(result.filing_status, FilingStatus::DaysDelayed(2));
        assert_eq!(result.additional_fee, 100);
    }
}
