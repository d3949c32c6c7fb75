//! Form-name patterns for classifying upstream filing records
//!
//! Upstream has no stable form-code column, only free-text descriptions such
//! as "Form AOC-4 XBRL" or "Annual Return of LLP". Records are classified once
//! at ingestion; rules only ever see the resulting `FilingRecordKind`.

use lazy_static::lazy_static;
use regex::Regex;
use shared_types::{FilingRecordKind, FormCode};

lazy_static! {
    /// Checked in order: LLP descriptions also say "annual return", so they precede MGT-7
    static ref FORM_PATTERNS: Vec<(Regex, FormCode)> = vec![
        (
            Regex::new(r"(?i)\binc[\s_\-]*20[\s_\-]*a\b|declaration\s+(?:for|of)\s+commencement\s+of\s+business").unwrap(),
            FormCode::Inc20a,
        ),
        (
            Regex::new(r"(?i)\badt[\s_\-]*0?1\b|(?:appointment|intimation)\s+of\s+(?:first\s+)?auditor").unwrap(),
            FormCode::Adt1,
        ),
        (
            Regex::new(r"(?i)\b(?:llp\s+)?form[\s_\-]*(?:no\.?\s*)?11\b|annual\s+return\s+of\s+(?:an?\s+)?(?:llp|limited\s+liability\s+partnership)").unwrap(),
            FormCode::LlpForm11,
        ),
        (
            Regex::new(r"(?i)\b(?:llp\s+)?form[\s_\-]*(?:no\.?\s*)?8\b|statement\s+of\s+accounts?\s+(?:and|&)\s+solvency").unwrap(),
            FormCode::LlpForm8,
        ),
        (
            Regex::new(r"(?i)\baoc[\s_\-]*4\b|filing\s+of\s+financial\s+statements?").unwrap(),
            FormCode::Aoc4,
        ),
        (
            Regex::new(r"(?i)\bmgt[\s_\-]*7a?\b|\bannual\s+return\b").unwrap(),
            FormCode::Mgt7,
        ),
        (
            Regex::new(r"(?i)\bgstr[\s_\-]*3[\s_\-]*b\b").unwrap(),
            FormCode::Gstr3b,
        ),
        (
            Regex::new(r"(?i)\bgstr[\s_\-]*1\b").unwrap(),
            FormCode::Gstr1,
        ),
    ];
}

/// Classify a free-text form description into a record kind
pub fn classify(form_identifier: &str) -> FilingRecordKind {
    FORM_PATTERNS
        .iter()
        .find(|(pattern, _)| pattern.is_match(form_identifier))
        .map(|(_, code)| FilingRecordKind::Form(*code))
        .unwrap_or(FilingRecordKind::Unrecognized)
}
