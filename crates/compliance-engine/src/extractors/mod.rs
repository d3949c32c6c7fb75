//! Value extraction from loosely formatted upstream fields

pub mod date;
pub mod numeric;
