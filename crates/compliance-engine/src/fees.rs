//! Fee schedule evaluation
//!
//! Two lookups drive every fee the engine reports:
//! - the normal fee, a fixed amount per capital (or contribution) band
//! - the additional fee, a delay-bucketed multiple of the normal fee, or a
//!   per-day charge, selected by entity size and by which side of a policy
//!   cutover the obligation's financial year starts on

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared_types::Rupees;

/// Upper bound of a capital band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "amount", rename_all = "snake_case")]
pub enum BandLimit {
    Below(Rupees),
    AtMost(Rupees),
    Unbounded,
}

impl BandLimit {
    fn admits(&self, capital: Rupees) -> bool {
        match self {
            BandLimit::Below(limit) => capital < *limit,
            BandLimit::AtMost(limit) => capital <= *limit,
            BandLimit::Unbounded => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapitalBand {
    pub limit: BandLimit,
    pub fee: Rupees,
}

/// Ascending capital bands, each with a fixed filing fee
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalFeeTable {
    pub bands: Vec<CapitalBand>,
}

impl NormalFeeTable {
    /// A table with no bands charges nothing (tax returns)
    pub fn free() -> Self {
        Self { bands: Vec::new() }
    }
}

/// Normal fee for a capital base; unknown capital falls back to the lowest band
pub fn normal_fee(capital: Option<Rupees>, table: &NormalFeeTable) -> Rupees {
    let lowest = table.bands.first().map(|b| b.fee).unwrap_or(0);
    let Some(capital) = capital else {
        return lowest;
    };

    table
        .bands
        .iter()
        .find(|band| band.limit.admits(capital))
        .or_else(|| table.bands.last())
        .map(|band| band.fee)
        .unwrap_or(lowest)
}

/// Delay bucket: applies up to `max_days` inclusive, or without bound when `None`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayBand {
    pub max_days: Option<i64>,
    pub regular: u32,
    pub small: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurchargeRate {
    pub regular: Rupees,
    pub small: Rupees,
}

/// Multiples of the normal fee by delay bucket, with an optional per-day
/// surcharge for every day past the last bounded bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiplierTable {
    pub bands: Vec<DelayBand>,
    #[serde(default)]
    pub surcharge_per_day: Option<SurchargeRate>,
}

/// Bucket edges shared by every statutory table: 30/60/90/180 days and beyond
pub const DELAY_BUCKETS: [Option<i64>; 5] = [Some(30), Some(60), Some(90), Some(180), None];

impl MultiplierTable {
    /// Standard five-bucket table from regular and small-entity multipliers
    pub fn bucketed(regular: [u32; 5], small: [u32; 5]) -> Self {
        let bands = DELAY_BUCKETS
            .iter()
            .zip(regular.iter().zip(small.iter()))
            .map(|(max_days, (regular, small))| DelayBand {
                max_days: *max_days,
                regular: *regular,
                small: *small,
            })
            .collect();
        Self {
            bands,
            surcharge_per_day: None,
        }
    }

    pub fn with_surcharge(mut self, regular: Rupees, small: Rupees) -> Self {
        self.surcharge_per_day = Some(SurchargeRate { regular, small });
        self
    }

    /// Multiplier for a positive delay. Callers gate on `delay_days > 0`.
    pub fn multiplier(&self, delay_days: i64, is_small: bool) -> u32 {
        debug_assert!(delay_days > 0, "non-positive delay reached the bucket table");
        self.bands
            .iter()
            .find(|band| band.max_days.map_or(true, |max| delay_days <= max))
            .or_else(|| self.bands.last())
            .map(|band| if is_small { band.small } else { band.regular })
            .unwrap_or(0)
    }

    fn last_bounded_days(&self) -> Option<i64> {
        self.bands.iter().filter_map(|band| band.max_days).max()
    }

    fn fee(&self, delay_days: i64, normal_fee: Rupees, is_small: bool) -> Rupees {
        let mut fee = normal_fee.saturating_mul(self.multiplier(delay_days, is_small) as u64);

        if let (Some(rate), Some(last)) = (self.surcharge_per_day, self.last_bounded_days()) {
            let excess = delay_days - last;
            if excess > 0 {
                let per_day = if is_small { rate.small } else { rate.regular };
                fee = fee.saturating_add(per_day.saturating_mul(excess as u64));
            }
        }

        fee
    }

    /// Bands ascend by delay and multipliers never decrease
    pub fn is_monotonic(&self) -> bool {
        let bounds_ascend = self.bands.windows(2).all(|pair| match (pair[0].max_days, pair[1].max_days) {
            (Some(a), Some(b)) => a < b,
            (Some(_), None) => true,
            (None, _) => false,
        });
        let multipliers_ascend = self
            .bands
            .windows(2)
            .all(|pair| pair[0].regular <= pair[1].regular && pair[0].small <= pair[1].small);
        bounds_ascend && multipliers_ascend
    }
}

/// Flat charge per day of delay, optionally capped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerDayRate {
    pub regular: Rupees,
    pub small: Rupees,
    #[serde(default)]
    pub cap: Option<Rupees>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PenaltyTable {
    Multiplier(MultiplierTable),
    PerDay(PerDayRate),
}

/// A replacement table for obligations whose year starts on or after `effective_from`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyCutover {
    pub effective_from: NaiveDate,
    pub table: PenaltyTable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdditionalFeeSchedule {
    pub before: PenaltyTable,
    #[serde(default)]
    pub cutover: Option<PolicyCutover>,
}

impl AdditionalFeeSchedule {
    pub fn none() -> Self {
        Self {
            before: PenaltyTable::PerDay(PerDayRate {
                regular: 0,
                small: 0,
                cap: None,
            }),
            cutover: None,
        }
    }

    pub fn table_for(&self, obligation_start: NaiveDate) -> &PenaltyTable {
        match &self.cutover {
            Some(cutover) if obligation_start >= cutover.effective_from => &cutover.table,
            _ => &self.before,
        }
    }

    /// All multiplier tables in the schedule
    pub fn multiplier_tables(&self) -> impl Iterator<Item = &MultiplierTable> {
        std::iter::once(&self.before)
            .chain(self.cutover.as_ref().map(|c| &c.table))
            .filter_map(|table| match table {
                PenaltyTable::Multiplier(t) => Some(t),
                PenaltyTable::PerDay(_) => None,
            })
    }
}

/// Additional fee for a delay; zero whenever the delay is not positive
pub fn additional_fee(
    delay_days: i64,
    normal_fee: Rupees,
    schedule: &AdditionalFeeSchedule,
    is_small: bool,
    obligation_start: NaiveDate,
) -> Rupees {
    if delay_days <= 0 {
        return 0;
    }

    match schedule.table_for(obligation_start) {
        PenaltyTable::Multiplier(table) => table.fee(delay_days, normal_fee, is_small),
        PenaltyTable::PerDay(rate) => {
            let per_day = if is_small { rate.small } else { rate.regular };
            capped_daily_fee(delay_days, per_day, rate.cap)
        }
    }
}

/// `rate` per day of delay, never above `cap`
pub fn capped_daily_fee(delay_days: i64, rate: Rupees, cap: Option<Rupees>) -> Rupees {
    if delay_days <= 0 {
        return 0;
    }
    let fee = rate.saturating_mul(delay_days as u64);
    cap.map_or(fee, |cap| fee.min(cap))
}

/// Size classification against a rule's threshold; unknown capital counts as small
pub fn is_small_entity(capital: Option<Rupees>, threshold: Option<Rupees>) -> bool {
    match (capital, threshold) {
        (_, None) => false,
        (None, Some(_)) => true,
        (Some(capital), Some(threshold)) => capital <= threshold,
    }
}
