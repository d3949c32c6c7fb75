pub mod calendar;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod extractors;
pub mod fees;
pub mod jurisdiction;
pub mod patterns;
pub mod records;
pub mod report;
pub mod rules;
pub mod schedules;

pub use config::{ComplianceRule, RuleBook};
pub use error::{ComplianceError, Result};
pub use evaluator::{ComplianceEvaluator, EvaluationContext};
pub use report::{ComplianceReportAggregator, FormFamily};
pub use rules::{build_rule, FormRule};

use shared_types::{ComplianceReport, ComplianceResult, FormCode};
use std::collections::BTreeMap;
use tracing::info;

/// ComplianceEngine entry point
pub struct ComplianceEngine {
    rules: BTreeMap<FormCode, Box<dyn FormRule>>,
}

impl ComplianceEngine {
    /// Engine over the built-in statutory rules
    pub fn new() -> Self {
        Self::with_rule_book(RuleBook::statutory()).expect("statutory rules are valid")
    }

    pub fn with_rule_book(book: RuleBook) -> Result<Self> {
        let mut rules = BTreeMap::new();
        for rule in book.rules() {
            rules.insert(rule.form_code, build_rule(rule.clone())?);
        }
        Ok(Self { rules })
    }

    pub fn rule(&self, form: FormCode) -> Result<&dyn FormRule> {
        self.rules
            .get(&form)
            .map(|rule| rule.as_ref())
            .ok_or(ComplianceError::RuleNotConfigured(form))
    }

    /// Results for one form, oldest obligation first
    pub fn evaluate(
        &self,
        form: FormCode,
        ctx: &EvaluationContext<'_>,
    ) -> Result<Vec<ComplianceResult>> {
        Ok(ComplianceEvaluator::evaluate(self.rule(form)?, ctx))
    }

    /// Evaluate a form named by its code string (e.g. "AOC-4")
    pub fn evaluate_code(
        &self,
        code: &str,
        ctx: &EvaluationContext<'_>,
    ) -> Result<Vec<ComplianceResult>> {
        let form = FormCode::parse_code(code)
            .ok_or_else(|| ComplianceError::UnknownForm(code.to_string()))?;
        self.evaluate(form, ctx)
    }

    /// Merged results for several forms, in the order requested
    pub fn report(
        &self,
        forms: &[FormCode],
        ctx: &EvaluationContext<'_>,
    ) -> Result<ComplianceReport> {
        let mut aggregator = ComplianceReportAggregator::new();
        for form in forms {
            aggregator.extend(self.evaluate(*form, ctx)?);
        }

        info!(
            forms = forms.len(),
            results = aggregator.len(),
            as_of = %ctx.as_of,
            "compliance report assembled"
        );
        Ok(aggregator.finish(ctx.as_of))
    }

    pub fn evaluate_family(
        &self,
        family: FormFamily,
        ctx: &EvaluationContext<'_>,
    ) -> Result<ComplianceReport> {
        self.report(family.forms(), ctx)
    }
}

impl Default for ComplianceEngine {
    fn default() -> Self {
        Self::new()
    }
}
