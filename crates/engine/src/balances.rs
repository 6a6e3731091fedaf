//! Ledger aggregator.
//!
//! Folds a group's expenses into one signed net balance per participant:
//! the payer gains the expense total, every split participant loses their
//! owed amount. Positive means "is owed", negative means "owes".
//!
//! Reimbursements need no special case: a reimbursement is an expense paid
//! by the settling party and owed entirely by the receiving party.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Expense, Group, Money, ResultEngine, util::ensure_group_currency};

/// Net balance per participant of one group, ordered by participant id.
///
/// Derived data: rebuilt from the expense set on every query and never
/// stored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BalanceSnapshot(BTreeMap<Uuid, Money>);

impl BalanceSnapshot {
    pub fn get(&self, participant_id: Uuid) -> Option<Money> {
        self.0.get(&participant_id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Uuid, Money)> + '_ {
        self.0.iter().map(|(id, balance)| (*id, *balance))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all balances. Zero for any snapshot built by
    /// [`compute_balances`].
    ///
    /// Accumulates in `i128`: only a total outside the `i64` range fails,
    /// never an intermediate sum.
    pub fn total(&self) -> ResultEngine<Money> {
        let sum: i128 = self.0.values().map(|b| i128::from(b.minor())).sum();
        i64::try_from(sum).map(Money::new).map_err(|_| {
            EngineError::ArithmeticOverflow(format!("balance total {sum} is out of range"))
        })
    }

    /// Participants with a negative balance.
    pub fn debtors(&self) -> impl Iterator<Item = (Uuid, Money)> + '_ {
        self.iter().filter(|(_, balance)| balance.is_negative())
    }

    /// Participants with a positive balance.
    pub fn creditors(&self) -> impl Iterator<Item = (Uuid, Money)> + '_ {
        self.iter().filter(|(_, balance)| balance.is_positive())
    }
}

impl FromIterator<(Uuid, Money)> for BalanceSnapshot {
    fn from_iter<T: IntoIterator<Item = (Uuid, Money)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Computes the net balance of every group participant.
///
/// Participants without expenses appear with a zero balance. Fails when an
/// expense is in another currency, references someone outside the group, or
/// its owed amounts do not add up to its total.
pub fn compute_balances(group: &Group, expenses: &[Expense]) -> ResultEngine<BalanceSnapshot> {
    let mut balances: BTreeMap<Uuid, Money> = group
        .participants
        .iter()
        .map(|p| (p.id, Money::ZERO))
        .collect();

    for expense in expenses {
        ensure_group_currency(group.currency, expense.currency)?;
        expense.ensure_balanced()?;

        let payer = balance_mut(&mut balances, expense.paid_by, expense)?;
        *payer = payer.checked_add(expense.amount)?;

        for share in &expense.participants {
            let balance = balance_mut(&mut balances, share.participant_id, expense)?;
            *balance = balance.checked_sub(share.owed_amount)?;
        }
    }

    let snapshot = BalanceSnapshot(balances);
    let total = snapshot.total()?;
    if !total.is_zero() {
        return Err(EngineError::UnbalancedLedger(format!(
            "balances of group {} sum to {}",
            group.id,
            total.minor()
        )));
    }

    tracing::debug!(
        group_id = %group.id,
        expenses = expenses.len(),
        participants = snapshot.len(),
        "balances computed"
    );
    Ok(snapshot)
}

fn balance_mut<'a>(
    balances: &'a mut BTreeMap<Uuid, Money>,
    participant_id: Uuid,
    expense: &Expense,
) -> ResultEngine<&'a mut Money> {
    balances.get_mut(&participant_id).ok_or_else(|| {
        EngineError::KeyNotFound(format!(
            "participant {participant_id} of expense {}",
            expense.id
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Currency, ExpenseParticipant,
        expense::ExpenseDraft,
        split::{Percentage, SplitWeights},
    };

    fn group(n: usize) -> Group {
        let names: Vec<String> = (0..n).map(|i| format!("p{i}")).collect();
        Group::new("Flat", Currency::EUR, None, &names, None).unwrap()
    }

    fn expense(group: &Group, payer: usize, amount: i64, split: SplitWeights) -> Expense {
        Expense::new(
            group,
            ExpenseDraft {
                title: "x".to_string(),
                amount: Money::new(amount),
                paid_by: group.participants[payer].id,
                split,
                category: None,
                notes: None,
                expense_date: None,
                is_reimbursement: false,
            },
            None,
        )
        .unwrap()
    }

    #[test]
    fn payer_gains_total_and_participants_lose_share() {
        let group = group(3);
        let ids: Vec<Uuid> = group.participants.iter().map(|p| p.id).collect();
        let expenses = vec![expense(&group, 0, 90, SplitWeights::Evenly(ids.clone()))];

        let balances = compute_balances(&group, &expenses).unwrap();
        assert_eq!(balances.get(ids[0]), Some(Money::new(60)));
        assert_eq!(balances.get(ids[1]), Some(Money::new(-30)));
        assert_eq!(balances.get(ids[2]), Some(Money::new(-30)));
        assert_eq!(balances.total().unwrap(), Money::ZERO);
    }

    #[test]
    fn idle_participants_have_zero_balance() {
        let group = group(4);
        let ids: Vec<Uuid> = group.participants.iter().map(|p| p.id).collect();
        let expenses = vec![expense(
            &group,
            1,
            50,
            SplitWeights::Evenly(vec![ids[0], ids[1]]),
        )];

        let balances = compute_balances(&group, &expenses).unwrap();
        assert_eq!(balances.len(), 4);
        assert_eq!(balances.get(ids[3]), Some(Money::ZERO));
        assert_eq!(balances.debtors().count(), 1);
        assert_eq!(balances.creditors().count(), 1);
    }

    #[test]
    fn reimbursement_cancels_debt() {
        let group = group(2);
        let ids: Vec<Uuid> = group.participants.iter().map(|p| p.id).collect();
        let dinner = expense(
            &group,
            0,
            100,
            SplitWeights::ByPercentage(vec![
                (ids[0], Percentage::from_whole(50).unwrap()),
                (ids[1], Percentage::from_whole(50).unwrap()),
            ]),
        );
        let mut payback = expense(&group, 1, 50, SplitWeights::Evenly(vec![ids[0]]));
        payback.is_reimbursement = true;

        let balances = compute_balances(&group, &[dinner, payback]).unwrap();
        assert!(balances.iter().all(|(_, b)| b.is_zero()));
    }

    #[test]
    fn order_of_expenses_does_not_matter() {
        let group = group(3);
        let ids: Vec<Uuid> = group.participants.iter().map(|p| p.id).collect();
        let mut expenses = vec![
            expense(&group, 0, 100, SplitWeights::Evenly(ids.clone())),
            expense(&group, 1, 77, SplitWeights::ByShares(vec![(ids[0], 1), (ids[2], 3)])),
            expense(&group, 2, 5, SplitWeights::Evenly(vec![ids[1]])),
        ];
        let forward = compute_balances(&group, &expenses).unwrap();
        expenses.reverse();
        assert_eq!(compute_balances(&group, &expenses).unwrap(), forward);
    }

    #[test]
    fn corrupt_expenses_are_rejected() {
        let group = group(2);
        let ids: Vec<Uuid> = group.participants.iter().map(|p| p.id).collect();

        let mut stranger = expense(&group, 0, 10, SplitWeights::Evenly(ids.clone()));
        stranger.participants.push(ExpenseParticipant {
            participant_id: Uuid::nil(),
            owed_amount: Money::ZERO,
        });
        assert!(matches!(
            compute_balances(&group, &[stranger]),
            Err(EngineError::KeyNotFound(_))
        ));

        let mut lopsided = expense(&group, 0, 10, SplitWeights::Evenly(ids.clone()));
        lopsided.amount = Money::new(11);
        assert!(matches!(
            compute_balances(&group, &[lopsided]),
            Err(EngineError::UnbalancedLedger(_))
        ));

        let mut foreign = expense(&group, 0, 10, SplitWeights::Evenly(ids));
        foreign.currency = Currency::try_from("USD").unwrap();
        assert!(matches!(
            compute_balances(&group, &[foreign]),
            Err(EngineError::CurrencyMismatch(_))
        ));
    }

    #[test]
    fn total_tolerates_large_intermediate_sums() {
        let snapshot: BalanceSnapshot = [
            (Uuid::from_u128(1), Money::new(i64::MAX)),
            (Uuid::from_u128(2), Money::new(1)),
            (Uuid::from_u128(3), Money::new(-i64::MAX)),
            (Uuid::from_u128(4), Money::new(-1)),
        ]
        .into_iter()
        .collect();
        assert_eq!(snapshot.total().unwrap(), Money::ZERO);

        let overflowing: BalanceSnapshot = [
            (Uuid::from_u128(1), Money::new(i64::MAX)),
            (Uuid::from_u128(2), Money::new(1)),
        ]
        .into_iter()
        .collect();
        assert!(matches!(
            overflowing.total(),
            Err(EngineError::ArithmeticOverflow(_))
        ));
    }
}
