//! Command structs for engine operations.
//!
//! These types group parameters for write operations (group creation and
//! update, expense create/update), keeping call sites readable and avoiding
//! long argument lists.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{Currency, Money, SplitWeights};

/// Create a group with its initial participants.
#[derive(Clone, Debug)]
pub struct NewGroupCmd {
    pub name: String,
    pub currency: Currency,
    pub information: Option<String>,
    pub participants: Vec<String>,
    pub created_by: Option<String>,
}

impl NewGroupCmd {
    #[must_use]
    pub fn new(name: impl Into<String>, currency: Currency) -> Self {
        Self {
            name: name.into(),
            currency,
            information: None,
            participants: Vec::new(),
            created_by: None,
        }
    }

    #[must_use]
    pub fn participant(mut self, name: impl Into<String>) -> Self {
        self.participants.push(name.into());
        self
    }

    #[must_use]
    pub fn participants<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.participants.extend(names.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn information(mut self, information: impl Into<String>) -> Self {
        self.information = Some(information.into());
        self
    }

    #[must_use]
    pub fn created_by(mut self, user_id: impl Into<String>) -> Self {
        self.created_by = Some(user_id.into());
        self
    }
}

/// Update group settings. `None` fields are left untouched; an empty
/// `information` clears it.
#[derive(Clone, Debug)]
pub struct UpdateGroupCmd {
    pub group_id: Uuid,
    pub actor_id: Uuid,
    pub name: Option<String>,
    pub currency: Option<Currency>,
    pub information: Option<String>,
}

impl UpdateGroupCmd {
    #[must_use]
    pub fn new(group_id: Uuid, actor_id: Uuid) -> Self {
        Self {
            group_id,
            actor_id,
            name: None,
            currency: None,
            information: None,
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn currency(mut self, currency: Currency) -> Self {
        self.currency = Some(currency);
        self
    }

    #[must_use]
    pub fn information(mut self, information: impl Into<String>) -> Self {
        self.information = Some(information.into());
        self
    }
}

/// Optional expense metadata.
#[derive(Clone, Debug, Default)]
pub struct ExpenseMeta {
    pub category: Option<String>,
    pub notes: Option<String>,
    pub expense_date: Option<NaiveDate>,
    pub is_reimbursement: bool,
}

/// Create or replace an expense.
///
/// `paid_by` stays optional here because stored data may lack a payer; the
/// engine rejects a missing payer instead of guessing one.
#[derive(Clone, Debug)]
pub struct ExpenseCmd {
    pub group_id: Uuid,
    pub actor_id: Uuid,
    pub title: String,
    pub amount: Money,
    pub paid_by: Option<Uuid>,
    pub split: SplitWeights,
    pub meta: ExpenseMeta,
}

impl ExpenseCmd {
    #[must_use]
    pub fn new(
        group_id: Uuid,
        actor_id: Uuid,
        title: impl Into<String>,
        amount: Money,
        split: SplitWeights,
    ) -> Self {
        Self {
            group_id,
            actor_id,
            title: title.into(),
            amount,
            paid_by: None,
            split,
            meta: ExpenseMeta::default(),
        }
    }

    #[must_use]
    pub fn paid_by(mut self, participant_id: Uuid) -> Self {
        self.paid_by = Some(participant_id);
        self
    }

    #[must_use]
    pub fn meta(mut self, meta: ExpenseMeta) -> Self {
        self.meta = meta;
        self
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.meta.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.meta.notes = Some(notes.into());
        self
    }

    #[must_use]
    pub fn expense_date(mut self, date: NaiveDate) -> Self {
        self.meta.expense_date = Some(date);
        self
    }

    #[must_use]
    pub fn reimbursement(mut self, is_reimbursement: bool) -> Self {
        self.meta.is_reimbursement = is_reimbursement;
        self
    }
}
