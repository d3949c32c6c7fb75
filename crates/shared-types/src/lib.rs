pub mod period;
pub mod result;
pub mod types;

pub use period::{FilingFrequency, FinancialYear, FrequencyDeclaration, TaxPeriod, TaxProfile};
pub use result::{ComplianceReport, ComplianceResult, FilingStatus, LateTriggerEvent, NOT_FILED};
pub use types::{
    CompanyType, Entity, FilingRecord, FilingRecordKind, FormCode, PaymentStatus, Rupees,
    SchemaGeneration,
};
