//! Settlement planner.
//!
//! Greedy debtor/creditor matching: the largest debt pays the largest
//! credit, `min(debt, credit)` moves, whoever reaches zero drops out. Every
//! round settles at least one participant, so a plan never has more than
//! `participants - 1` transfers. Equal magnitudes are ordered by participant
//! id, which keeps plans identical across runs.

use std::{
    cmp::{Ordering, Reverse},
    collections::BinaryHeap,
};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{BalanceSnapshot, EngineError, Money, ResultEngine};

/// A single payment from a debtor to a creditor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub from: Uuid,
    pub to: Uuid,
    pub amount: Money,
}

/// Outstanding magnitude of one side. Max-heap on `amount`, lowest id first
/// among equals.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Outstanding {
    amount: u64,
    participant_id: Reverse<Uuid>,
}

impl Ord for Outstanding {
    fn cmp(&self, other: &Self) -> Ordering {
        self.amount
            .cmp(&other.amount)
            .then_with(|| self.participant_id.cmp(&other.participant_id))
    }
}

impl PartialOrd for Outstanding {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Produces the transfers that bring every balance to zero.
///
/// Fails with [`EngineError::UnbalancedLedger`] when the balances do not sum
/// to zero; a partial plan is never returned.
pub fn plan_settlement(balances: &BalanceSnapshot) -> ResultEngine<Vec<Transfer>> {
    let total = balances.total()?;
    if !total.is_zero() {
        return Err(EngineError::UnbalancedLedger(format!(
            "balances sum to {}, expected 0",
            total.minor()
        )));
    }

    let mut debtors = BinaryHeap::new();
    let mut creditors = BinaryHeap::new();
    for (participant_id, balance) in balances.iter() {
        let entry = Outstanding {
            amount: balance.minor().unsigned_abs(),
            participant_id: Reverse(participant_id),
        };
        match balance.minor().cmp(&0) {
            Ordering::Less => debtors.push(entry),
            Ordering::Greater => creditors.push(entry),
            Ordering::Equal => {}
        }
    }

    let mut transfers = Vec::with_capacity(balances.len().saturating_sub(1));
    while let (Some(mut debtor), Some(mut creditor)) = (debtors.pop(), creditors.pop()) {
        let amount = debtor.amount.min(creditor.amount);
        // Bounded by a positive credit, so it fits in `i64`.
        let minor = i64::try_from(amount).map_err(|_| {
            EngineError::ArithmeticOverflow(format!("transfer of {amount} is out of range"))
        })?;
        transfers.push(Transfer {
            from: debtor.participant_id.0,
            to: creditor.participant_id.0,
            amount: Money::new(minor),
        });
        debtor.amount -= amount;
        creditor.amount -= amount;
        if debtor.amount > 0 {
            debtors.push(debtor);
        }
        if creditor.amount > 0 {
            creditors.push(creditor);
        }
    }

    // Zero-sum input means both sides run out together.
    debug_assert!(debtors.is_empty() && creditors.is_empty());
    Ok(transfers)
}
