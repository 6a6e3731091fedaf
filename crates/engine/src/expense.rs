//! Expense primitives.
//!
//! An `Expense` is paid by one participant and owed by the participants of
//! its split. The split is stored twice: the caller's weights (`split`) and
//! the owed amounts derived from them (`participants`). Both are always
//! replaced together.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Currency, EngineError, Group, Money, ResultEngine,
    split::{SplitMode, SplitWeights, compute_split},
};

/// One row of an expense split with its computed obligation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseParticipant {
    pub participant_id: Uuid,
    pub owed_amount: Money,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub group_id: Uuid,
    pub title: String,
    pub amount: Money,
    pub currency: Currency,
    pub paid_by: Uuid,
    pub split: SplitWeights,
    pub participants: Vec<ExpenseParticipant>,
    pub category: Option<String>,
    pub notes: Option<String>,
    pub expense_date: Option<NaiveDate>,
    pub is_reimbursement: bool,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated inputs shared by expense creation and update.
#[derive(Clone, Debug)]
pub(crate) struct ExpenseDraft {
    pub title: String,
    pub amount: Money,
    pub paid_by: Uuid,
    pub split: SplitWeights,
    pub category: Option<String>,
    pub notes: Option<String>,
    pub expense_date: Option<NaiveDate>,
    pub is_reimbursement: bool,
}

impl Expense {
    /// Materializes a new expense: checks membership and computes owed
    /// amounts.
    pub(crate) fn new(
        group: &Group,
        draft: ExpenseDraft,
        created_by: Option<String>,
    ) -> ResultEngine<Self> {
        let participants = materialize_split(group, &draft)?;
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            group_id: group.id,
            title: draft.title,
            amount: draft.amount,
            currency: group.currency,
            paid_by: draft.paid_by,
            split: draft.split,
            participants,
            category: draft.category,
            notes: draft.notes,
            expense_date: draft.expense_date,
            is_reimbursement: draft.is_reimbursement,
            created_by,
            created_at: now,
            updated_at: now,
        })
    }

    /// Returns the edited expense. The whole split is replaced; identity and
    /// creation metadata are kept.
    pub(crate) fn replaced(&self, group: &Group, draft: ExpenseDraft) -> ResultEngine<Self> {
        let participants = materialize_split(group, &draft)?;
        Ok(Self {
            id: self.id,
            group_id: self.group_id,
            title: draft.title,
            amount: draft.amount,
            currency: group.currency,
            paid_by: draft.paid_by,
            split: draft.split,
            participants,
            category: draft.category,
            notes: draft.notes,
            expense_date: draft.expense_date,
            is_reimbursement: draft.is_reimbursement,
            created_by: self.created_by.clone(),
            created_at: self.created_at,
            updated_at: Utc::now(),
        })
    }

    #[must_use]
    pub fn split_mode(&self) -> SplitMode {
        self.split.mode()
    }

    /// Owed amount of a participant, `None` if not part of the split.
    pub fn owed_by(&self, participant_id: Uuid) -> Option<Money> {
        self.participants
            .iter()
            .find(|p| p.participant_id == participant_id)
            .map(|p| p.owed_amount)
    }

    /// Checks that the owed amounts add up to the expense total.
    pub fn ensure_balanced(&self) -> ResultEngine<()> {
        let owed = Money::try_sum(self.participants.iter().map(|p| p.owed_amount))?;
        if owed != self.amount {
            return Err(EngineError::UnbalancedLedger(format!(
                "expense {} owes {} out of {}",
                self.id,
                owed.minor(),
                self.amount.minor()
            )));
        }
        Ok(())
    }
}

fn materialize_split(group: &Group, draft: &ExpenseDraft) -> ResultEngine<Vec<ExpenseParticipant>> {
    if !draft.amount.is_positive() {
        return Err(EngineError::InvalidAmount(
            "expense amount must be > 0".to_string(),
        ));
    }
    if !group.contains(draft.paid_by) {
        return Err(EngineError::InvalidSplit(format!(
            "payer {} is not a member of the group",
            draft.paid_by
        )));
    }
    if let Some(outsider) = draft
        .split
        .participants()
        .into_iter()
        .find(|id| !group.contains(*id))
    {
        return Err(EngineError::InvalidSplit(format!(
            "participant {outsider} is not a member of the group"
        )));
    }

    Ok(compute_split(draft.amount, &draft.split)?
        .into_iter()
        .map(|owed| ExpenseParticipant {
            participant_id: owed.participant_id,
            owed_amount: owed.amount,
        })
        .collect())
}
