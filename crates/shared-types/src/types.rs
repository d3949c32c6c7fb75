use chrono::NaiveDate;

/// Whole-rupee amount. Statutory fees never carry paise.
pub type Rupees = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CompanyType {
    Company,
    Llp,
}

/// A registered business entity as supplied by the persistence layer
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Entity {
    pub incorporation_date: NaiveDate,
    pub company_type: CompanyType,
    /// Authorized capital for companies, contribution obligation for LLPs
    pub capital_base: Option<Rupees>,
    pub jurisdiction_state: String, // e.g., "Maharashtra" or "MH"
}

impl Entity {
    pub fn company(incorporation_date: NaiveDate, capital_base: Option<Rupees>, state: &str) -> Self {
        Self {
            incorporation_date,
            company_type: CompanyType::Company,
            capital_base,
            jurisdiction_state: state.to_string(),
        }
    }

    pub fn llp(incorporation_date: NaiveDate, contribution: Option<Rupees>, state: &str) -> Self {
        Self {
            incorporation_date,
            company_type: CompanyType::Llp,
            capital_base: contribution,
            jurisdiction_state: state.to_string(),
        }
    }
}

/// Regulated forms the engine knows how to evaluate
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum FormCode {
    #[serde(rename = "INC-20A")]
    Inc20a,
    #[serde(rename = "ADT-1")]
    Adt1,
    #[serde(rename = "AOC-4")]
    Aoc4,
    #[serde(rename = "MGT-7")]
    Mgt7,
    #[serde(rename = "FORM-11")]
    LlpForm11,
    #[serde(rename = "FORM-8")]
    LlpForm8,
    #[serde(rename = "GSTR-1")]
    Gstr1,
    #[serde(rename = "GSTR-3B")]
    Gstr3b,
}

impl FormCode {
    pub const ALL: [FormCode; 8] = [
        FormCode::Inc20a,
        FormCode::Adt1,
        FormCode::Aoc4,
        FormCode::Mgt7,
        FormCode::LlpForm11,
        FormCode::LlpForm8,
        FormCode::Gstr1,
        FormCode::Gstr3b,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            FormCode::Inc20a => "INC-20A",
            FormCode::Adt1 => "ADT-1",
            FormCode::Aoc4 => "AOC-4",
            FormCode::Mgt7 => "MGT-7",
            FormCode::LlpForm11 => "FORM-11",
            FormCode::LlpForm8 => "FORM-8",
            FormCode::Gstr1 => "GSTR-1",
            FormCode::Gstr3b => "GSTR-3B",
        }
    }

    /// Parse a form code, ignoring case and separator style ("aoc4", "AOC-4", "form 11")
    pub fn parse_code(s: &str) -> Option<Self> {
        let compact: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_uppercase();
        match compact.as_str() {
            "INC20A" => Some(FormCode::Inc20a),
            "ADT1" => Some(FormCode::Adt1),
            "AOC4" => Some(FormCode::Aoc4),
            "MGT7" => Some(FormCode::Mgt7),
            "FORM11" | "LLPFORM11" => Some(FormCode::LlpForm11),
            "FORM8" | "LLPFORM8" => Some(FormCode::LlpForm8),
            "GSTR1" => Some(FormCode::Gstr1),
            "GSTR3B" => Some(FormCode::Gstr3b),
            _ => None,
        }
    }
}

impl std::fmt::Display for FormCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Form identity of a filing record, resolved once when the record is ingested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilingRecordKind {
    Form(FormCode),
    Unrecognized,
}

impl FilingRecordKind {
    pub fn is(&self, code: FormCode) -> bool {
        matches!(self, FilingRecordKind::Form(c) if *c == code)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum PaymentStatus {
    Paid,
    Pending,
    #[default]
    None,
}

/// Upstream schema a record was read from. Legacy records wrote slash
/// dates month first, current records day first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaGeneration {
    Legacy,
    #[default]
    Current,
}

/// A historical filing as read from either upstream schema generation
///
/// Dates are kept as the upstream strings: each form rule normalizes them
/// with the format ordering it configures for the record's generation.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FilingRecord {
    pub form_identifier: String,
    pub kind: FilingRecordKind,
    #[serde(default)]
    pub generation: SchemaGeneration,
    pub event_date: Option<String>,
    pub filing_date: Option<String>,
    pub payment_status: PaymentStatus,
    pub recorded_normal_fee: Option<Rupees>,
    pub recorded_additional_fee: Option<Rupees>,
}

impl FilingRecord {
    pub fn new(kind: FilingRecordKind, form_identifier: &str) -> Self {
        Self {
            form_identifier: form_identifier.to_string(),
            kind,
            generation: SchemaGeneration::Current,
            event_date: None,
            filing_date: None,
            payment_status: PaymentStatus::None,
            recorded_normal_fee: None,
            recorded_additional_fee: None,
        }
    }

    pub fn with_generation(mut self, generation: SchemaGeneration) -> Self {
        self.generation = generation;
        self
    }

    pub fn with_event_date(mut self, date: &str) -> Self {
        self.event_date = Some(date.to_string());
        self
    }

    pub fn with_filing_date(mut self, date: &str) -> Self {
        self.filing_date = Some(date.to_string());
        self
    }

    pub fn with_payment_status(mut self, status: PaymentStatus) -> Self {
        self.payment_status = status;
        self
    }

    pub fn with_recorded_fees(mut self, normal: Option<Rupees>, additional: Option<Rupees>) -> Self {
        self.recorded_normal_fee = normal;
        self.recorded_additional_fee = additional;
        self
    }
}
