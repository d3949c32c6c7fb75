use shared_types::FormCode;
use thiserror::Error;

/// Configuration-level failures. Bad record data never surfaces here: it
/// degrades to "not filed" semantics instead.
#[derive(Error, Debug)]
pub enum ComplianceError {
    #[error("Unknown form code: {0}")]
    UnknownForm(String),

    #[error("No rule configured for form {0}")]
    RuleNotConfigured(FormCode),

    #[error("Invalid rule configuration for {form}: {reason}")]
    InvalidConfig { form: FormCode, reason: String },

    #[error("Malformed filing records: {0}")]
    RecordFormat(String),

    #[error("Failed to parse rule tables: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, ComplianceError>;
