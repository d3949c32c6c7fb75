// Fee amount extraction for recorded filing fees
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use shared_types::Rupees;

lazy_static! {
    /// Amounts like "200", "1,200.00", "Rs. 1,00,000", "₹ 600/-"
    static ref AMOUNT_PATTERN: Regex =
        Regex::new(r"(\d[\d,]*)(?:\.(\d{1,2}))?").unwrap();
}

/// Parses a recorded fee string into whole rupees, rounding paise to the nearest rupee
pub fn parse_rupees(text: &str) -> Option<Rupees> {
    let caps = AMOUNT_PATTERN.captures(text.trim())?;
    let whole: String = caps.get(1)?.as_str().chars().filter(|c| *c != ',').collect();
    let mut amount: Rupees = whole.parse().ok()?;

    if let Some(paise) = caps.get(2) {
        let digits = paise.as_str();
        let paise: u64 = digits.parse().ok()?;
        let paise = if digits.len() == 1 { paise * 10 } else { paise };
        if paise >= 50 {
            amount += 1;
        }
    }

    Some(amount)
}

/// Reads a fee that upstream may have stored as a number or as text
pub fn rupees_from_value(value: &Value) -> Option<Rupees> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64)),
        Value::String(s) => parse_rupees(s),
        _ => None,
    }
}
