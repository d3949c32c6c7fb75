//! Jurisdiction types for state-dependent filing deadlines
//!
//! Indian states and union territories, with the GST state grouping that
//! staggers quarterly return deadlines:
//! - Category X: returns due on the 22nd
//! - Category Y: returns due on the 24th

use serde::{Deserialize, Serialize};

/// States and union territories, by vehicle-registration style code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum State {
    // States
    AP,
    AR,
    AS,
    BR,
    CG,
    GA,
    GJ,
    HR,
    HP,
    JH,
    KA,
    KL,
    MP,
    MH,
    MN,
    ML,
    MZ,
    NL,
    OD,
    PB,
    RJ,
    SK,
    TN,
    TS,
    TR,
    UP,
    UK,
    WB,
    // Union territories
    AN,
    CH,
    DH,
    DL,
    JK,
    LA,
    LD,
    PY,
}

/// GST state grouping used to stagger return deadlines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GstStateGroup {
    CategoryX,
    CategoryY,
}

impl State {
    pub const ALL: [State; 36] = [
        State::AP,
        State::AR,
        State::AS,
        State::BR,
        State::CG,
        State::GA,
        State::GJ,
        State::HR,
        State::HP,
        State::JH,
        State::KA,
        State::KL,
        State::MP,
        State::MH,
        State::MN,
        State::ML,
        State::MZ,
        State::NL,
        State::OD,
        State::PB,
        State::RJ,
        State::SK,
        State::TN,
        State::TS,
        State::TR,
        State::UP,
        State::UK,
        State::WB,
        State::AN,
        State::CH,
        State::DH,
        State::DL,
        State::JK,
        State::LA,
        State::LD,
        State::PY,
    ];

    /// Get the full state name
    pub fn name(&self) -> &'static str {
        match self {
            State::AP => "Andhra Pradesh",
            State::AR => "Arunachal Pradesh",
            State::AS => "Assam",
            State::BR => "Bihar",
            State::CG => "Chhattisgarh",
            State::GA => "Goa",
            State::GJ => "Gujarat",
            State::HR => "Haryana",
            State::HP => "Himachal Pradesh",
            State::JH => "Jharkhand",
            State::KA => "Karnataka",
            State::KL => "Kerala",
            State::MP => "Madhya Pradesh",
            State::MH => "Maharashtra",
            State::MN => "Manipur",
            State::ML => "Meghalaya",
            State::MZ => "Mizoram",
            State::NL => "Nagaland",
            State::OD => "Odisha",
            State::PB => "Punjab",
            State::RJ => "Rajasthan",
            State::SK => "Sikkim",
            State::TN => "Tamil Nadu",
            State::TS => "Telangana",
            State::TR => "Tripura",
            State::UP => "Uttar Pradesh",
            State::UK => "Uttarakhand",
            State::WB => "West Bengal",
            State::AN => "Andaman and Nicobar Islands",
            State::CH => "Chandigarh",
            State::DH => "Dadra and Nagar Haveli and Daman and Diu",
            State::DL => "Delhi",
            State::JK => "Jammu and Kashmir",
            State::LA => "Ladakh",
            State::LD => "Lakshadweep",
            State::PY => "Puducherry",
        }
    }

    /// Two-digit state code that prefixes a GSTIN
    pub fn gst_code(&self) -> u8 {
        match self {
            State::JK => 1,
            State::HP => 2,
            State::PB => 3,
            State::CH => 4,
            State::UK => 5,
            State::HR => 6,
            State::DL => 7,
            State::RJ => 8,
            State::UP => 9,
            State::BR => 10,
            State::SK => 11,
            State::AR => 12,
            State::NL => 13,
            State::MN => 14,
            State::MZ => 15,
            State::TR => 16,
            State::ML => 17,
            State::AS => 18,
            State::WB => 19,
            State::JH => 20,
            State::OD => 21,
            State::CG => 22,
            State::MP => 23,
            State::GJ => 24,
            State::DH => 26,
            State::MH => 27,
            State::KA => 29,
            State::GA => 30,
            State::LD => 31,
            State::KL => 32,
            State::TN => 33,
            State::PY => 34,
            State::AN => 35,
            State::TS => 36,
            State::AP => 37,
            State::LA => 38,
        }
    }

    /// GST deadline group for quarterly returns
    pub fn gst_state_group(&self) -> GstStateGroup {
        match self {
            State::CG
            | State::MP
            | State::GJ
            | State::MH
            | State::KA
            | State::GA
            | State::KL
            | State::TN
            | State::TS
            | State::AP
            | State::DH
            | State::PY
            | State::AN
            | State::LD => GstStateGroup::CategoryX,
            _ => GstStateGroup::CategoryY,
        }
    }

    /// Parse from code, full name, or two-digit GST state code (case-insensitive)
    pub fn parse_code(s: &str) -> Option<Self> {
        let trimmed = s.trim();
        if let Ok(gst_code) = trimmed.parse::<u8>() {
            // 25 (Daman and Diu) merged into 26 in 2020
            let gst_code = if gst_code == 25 { 26 } else { gst_code };
            return State::ALL.iter().copied().find(|st| st.gst_code() == gst_code);
        }

        let upper = trimmed.to_uppercase().replace('&', "AND");
        let normalized: String = upper.split_whitespace().collect::<Vec<_>>().join(" ");
        match normalized.as_str() {
            "CT" => return Some(State::CG),
            "OR" | "ORISSA" => return Some(State::OD),
            "TG" => return Some(State::TS),
            "UA" | "UTTARANCHAL" => return Some(State::UK),
            "NEW DELHI" | "NCT OF DELHI" => return Some(State::DL),
            "PONDICHERRY" => return Some(State::PY),
            "DN" | "DD" | "DAMAN AND DIU" | "DADRA AND NAGAR HAVELI" => return Some(State::DH),
            _ => {}
        }

        State::ALL.iter().copied().find(|st| {
            format!("{:?}", st) == normalized || st.name().to_uppercase() == normalized
        })
    }
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}
