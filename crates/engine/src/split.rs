//! Split calculator.
//!
//! Turns an expense total plus a split policy into exact per-participant owed
//! amounts. The owed amounts always sum to the total: remainder minor units
//! are handed out deterministically instead of being rounded away.
//!
//! - `Evenly`: quotient for everyone, remainder one unit at a time to the
//!   first participants in input order.
//! - `ByShares` / `ByPercentage`: largest-remainder method, ties broken by
//!   input order.
//! - `ByAmount`: the supplied amounts, which must already sum to the total.

use std::{collections::HashSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine};

/// Split policy tag, mirrors the `split_mode` column of stored expenses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SplitMode {
    Evenly,
    ByShares,
    ByPercentage,
    ByAmount,
}

impl SplitMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Evenly => "EVENLY",
            Self::ByShares => "BY_SHARES",
            Self::ByPercentage => "BY_PERCENTAGE",
            Self::ByAmount => "BY_AMOUNT",
        }
    }
}

impl TryFrom<&str> for SplitMode {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "EVENLY" => Ok(Self::Evenly),
            "BY_SHARES" => Ok(Self::ByShares),
            "BY_PERCENTAGE" => Ok(Self::ByPercentage),
            "BY_AMOUNT" => Ok(Self::ByAmount),
            other => Err(EngineError::InvalidSplit(format!(
                "invalid split mode: {other}"
            ))),
        }
    }
}

/// A percentage with two fraction digits, stored as basis points
/// (`0..=10_000`, where `10_000` is 100%).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Percentage(u32);

impl Percentage {
    /// 100% in basis points.
    pub const FULL_BPS: u32 = 10_000;

    pub fn from_basis_points(bps: u32) -> ResultEngine<Self> {
        if bps > Self::FULL_BPS {
            return Err(EngineError::InvalidSplit(format!(
                "percentage must be between 0 and 100, got {}",
                Percentage(bps)
            )));
        }
        Ok(Self(bps))
    }

    /// Whole percent, e.g. `from_whole(50)` is 50%.
    pub fn from_whole(percent: u32) -> ResultEngine<Self> {
        let bps = percent.checked_mul(100).ok_or_else(|| {
            EngineError::InvalidSplit(format!("percentage out of range: {percent}"))
        })?;
        Self::from_basis_points(bps)
    }

    #[must_use]
    pub const fn basis_points(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}%", self.0 / 100, self.0 % 100)
    }
}

impl TryFrom<u32> for Percentage {
    type Error = EngineError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::from_basis_points(value)
    }
}

impl From<Percentage> for u32 {
    fn from(value: Percentage) -> Self {
        value.0
    }
}

impl FromStr for Percentage {
    type Err = EngineError;

    /// Parses `"50"`, `"33.3"` or `"33,33"` (at most two fraction digits).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::InvalidSplit(format!("invalid percentage: {}", s.trim()));
        let normalized = s.trim().trim_end_matches('%').replace(',', ".");
        let (whole, fraction) = normalized
            .split_once('.')
            .unwrap_or((normalized.as_str(), ""));
        if whole.is_empty()
            || fraction.len() > 2
            || !whole.chars().all(|c| c.is_ascii_digit())
            || !fraction.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }
        let whole: u32 = whole.parse().map_err(|_| invalid())?;
        let fraction: u32 = if fraction.is_empty() {
            0
        } else {
            format!("{fraction:0<2}").parse().map_err(|_| invalid())?
        };
        let bps = whole
            .checked_mul(100)
            .and_then(|v| v.checked_add(fraction))
            .ok_or_else(invalid)?;
        Self::from_basis_points(bps)
    }
}

/// Per-participant weight, tagged by split policy.
///
/// The variant decides which weight exists at all, so a `ByShares` split
/// cannot carry a stray percentage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "weights", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SplitWeights {
    Evenly(Vec<Uuid>),
    ByShares(Vec<(Uuid, u32)>),
    ByPercentage(Vec<(Uuid, Percentage)>),
    ByAmount(Vec<(Uuid, Money)>),
}

impl SplitWeights {
    #[must_use]
    pub fn mode(&self) -> SplitMode {
        match self {
            Self::Evenly(_) => SplitMode::Evenly,
            Self::ByShares(_) => SplitMode::ByShares,
            Self::ByPercentage(_) => SplitMode::ByPercentage,
            Self::ByAmount(_) => SplitMode::ByAmount,
        }
    }

    /// Participants in the caller-supplied order.
    #[must_use]
    pub fn participants(&self) -> Vec<Uuid> {
        match self {
            Self::Evenly(ids) => ids.clone(),
            Self::ByShares(w) => w.iter().map(|(id, _)| *id).collect(),
            Self::ByPercentage(w) => w.iter().map(|(id, _)| *id).collect(),
            Self::ByAmount(w) => w.iter().map(|(id, _)| *id).collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Evenly(ids) => ids.len(),
            Self::ByShares(w) => w.len(),
            Self::ByPercentage(w) => w.len(),
            Self::ByAmount(w) => w.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One computed obligation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owed {
    pub participant_id: Uuid,
    pub amount: Money,
}

/// Computes what each participant owes for an expense of `total`.
///
/// Output order matches the input order of `weights`.
pub fn compute_split(total: Money, weights: &SplitWeights) -> ResultEngine<Vec<Owed>> {
    if !total.is_positive() {
        return Err(EngineError::InvalidAmount(
            "expense total must be > 0".to_string(),
        ));
    }
    if weights.is_empty() {
        return Err(EngineError::InvalidSplit(
            "at least one participant is required".to_string(),
        ));
    }
    let participants = weights.participants();
    ensure_unique(&participants)?;

    let amounts = match weights {
        SplitWeights::Evenly(ids) => split_evenly(total, ids.len())?,
        SplitWeights::ByShares(w) => {
            if let Some((id, _)) = w.iter().find(|(_, shares)| *shares == 0) {
                return Err(EngineError::InvalidSplit(format!(
                    "shares must be > 0 (participant {id})"
                )));
            }
            let shares: Vec<u64> = w.iter().map(|(_, s)| u64::from(*s)).collect();
            largest_remainder(total, &shares)?
        }
        SplitWeights::ByPercentage(w) => {
            let bps: Vec<u64> = w.iter().map(|(_, p)| u64::from(p.basis_points())).collect();
            let sum: u64 = bps.iter().sum();
            if sum != u64::from(Percentage::FULL_BPS) {
                return Err(EngineError::InvalidSplit(format!(
                    "percentages must total 100, got {}.{:02}",
                    sum / 100,
                    sum % 100
                )));
            }
            largest_remainder(total, &bps)?
        }
        SplitWeights::ByAmount(w) => {
            if let Some((id, _)) = w.iter().find(|(_, amount)| amount.is_negative()) {
                return Err(EngineError::InvalidSplit(format!(
                    "amounts must not be negative (participant {id})"
                )));
            }
            let amounts: Vec<Money> = w.iter().map(|(_, amount)| *amount).collect();
            let sum = Money::try_sum(amounts.iter().copied())?;
            if sum != total {
                return Err(EngineError::InvalidSplit(format!(
                    "amounts must total {}, got {}",
                    total.minor(),
                    sum.minor()
                )));
            }
            amounts
        }
    };

    let owed: Vec<Owed> = participants
        .into_iter()
        .zip(amounts)
        .map(|(participant_id, amount)| Owed {
            participant_id,
            amount,
        })
        .collect();

    debug_assert_eq!(
        owed.iter().map(|o| o.amount.minor()).sum::<i64>(),
        total.minor()
    );
    tracing::debug!(
        mode = weights.mode().as_str(),
        total = total.minor(),
        participants = owed.len(),
        "split computed"
    );
    Ok(owed)
}

fn ensure_unique(participants: &[Uuid]) -> ResultEngine<()> {
    let mut seen = HashSet::with_capacity(participants.len());
    for id in participants {
        if !seen.insert(*id) {
            return Err(EngineError::InvalidSplit(format!(
                "participant {id} appears more than once"
            )));
        }
    }
    Ok(())
}

fn split_evenly(total: Money, count: usize) -> ResultEngine<Vec<Money>> {
    let count_i64 = i64::try_from(count)
        .map_err(|_| EngineError::InvalidSplit("too many participants".to_string()))?;
    let (quotient, remainder) = total.div_rem(count_i64)?;
    (0..count_i64)
        .map(|idx| {
            if idx < remainder {
                quotient.checked_add(Money::new(1))
            } else {
                Ok(quotient)
            }
        })
        .collect()
}

/// Largest-remainder apportionment of `total` over integer `weights`.
///
/// Products are taken in `i128`, so `total * weight` never overflows.
fn largest_remainder(total: Money, weights: &[u64]) -> ResultEngine<Vec<Money>> {
    let weight_total: i128 = weights.iter().map(|w| i128::from(*w)).sum();
    if weight_total == 0 {
        return Err(EngineError::InvalidSplit(
            "weights must not all be zero".to_string(),
        ));
    }
    let total_minor = i128::from(total.minor());

    let mut floors = Vec::with_capacity(weights.len());
    let mut fractions = Vec::with_capacity(weights.len());
    for weight in weights {
        let ideal = total_minor * i128::from(*weight);
        floors.push(ideal / weight_total);
        fractions.push(ideal % weight_total);
    }

    // Fewer than `weights.len()` units are left over after flooring.
    let leftover = total_minor - floors.iter().sum::<i128>();
    let mut order: Vec<usize> = (0..weights.len()).collect();
    order.sort_by(|a, b| fractions[*b].cmp(&fractions[*a]).then(a.cmp(b)));
    for idx in order.into_iter().take(usize::try_from(leftover).unwrap_or(0)) {
        floors[idx] += 1;
    }

    floors
        .into_iter()
        .map(|minor| {
            i64::try_from(minor).map(Money::new).map_err(|_| {
                EngineError::ArithmeticOverflow(format!("share {minor} is out of range"))
            })
        })
        .collect()
}
