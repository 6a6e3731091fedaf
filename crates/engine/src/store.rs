//! Storage port.
//!
//! The engine owns no state. Groups, expenses and activities live behind
//! [`GroupStore`]; every write method is one atomic commit (the mutation and
//! its activity land together or not at all) and [`GroupStore::load`]
//! returns a consistent snapshot, never a half-written expense.
//!
//! The engine validates against a snapshot and then writes. Each write
//! carries the [`GroupState::version`] it was validated against; a store must
//! reject the write with [`EngineError::Conflict`] when the group changed in
//! between, so checks such as "no currency change once expenses exist" hold
//! under concurrent writers.

use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
};

use uuid::Uuid;

use crate::{Activity, EngineError, Expense, Group, ResultEngine};

/// A group together with all of its expenses, read in one go.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupState {
    pub group: Group,
    pub expenses: Vec<Expense>,
    /// Bumped by every committed write to the group.
    pub version: u64,
}

pub trait GroupStore: Send + Sync + std::fmt::Debug {
    fn load(&self, group_id: Uuid) -> ResultEngine<GroupState>;

    /// Inserts a new group. Fails with `ExistingKey` if the id is taken.
    fn insert_group(&self, group: Group) -> ResultEngine<()>;

    /// Replaces the group row (settings and participants) and appends
    /// `activity`.
    fn save_group(&self, group: Group, activity: Activity, version: u64) -> ResultEngine<()>;

    /// Upserts the expense with its full split and appends `activity`.
    fn save_expense(&self, expense: Expense, activity: Activity, version: u64)
    -> ResultEngine<()>;

    /// Removes the expense with its split and appends `activity`.
    fn delete_expense(
        &self,
        group_id: Uuid,
        expense_id: Uuid,
        activity: Activity,
        version: u64,
    ) -> ResultEngine<()>;

    /// Audit trail of a group, oldest first.
    fn activities(&self, group_id: Uuid) -> ResultEngine<Vec<Activity>>;
}

#[derive(Debug)]
struct GroupRecord {
    state: GroupState,
    activities: Vec<Activity>,
}

/// In-process store. One lock guards all groups, so each write is atomic and
/// readers never observe a partial one.
#[derive(Debug, Default)]
pub struct MemoryStore {
    groups: RwLock<HashMap<Uuid, GroupRecord>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` under the write lock if the group is still at `version`,
    /// then bumps the version.
    fn with_record<T>(
        &self,
        group_id: Uuid,
        version: u64,
        f: impl FnOnce(&mut GroupRecord) -> ResultEngine<T>,
    ) -> ResultEngine<T> {
        let mut groups = self.groups.write().map_err(poisoned)?;
        let record = groups
            .get_mut(&group_id)
            .ok_or_else(|| EngineError::KeyNotFound(format!("group {group_id}")))?;
        if record.state.version != version {
            return Err(EngineError::Conflict(format!(
                "group {group_id} is at version {}, write was based on {version}",
                record.state.version
            )));
        }
        let out = f(record)?;
        record.state.version += 1;
        Ok(out)
    }
}

fn poisoned<T>(_: PoisonError<T>) -> EngineError {
    EngineError::Storage("memory store lock poisoned".to_string())
}

impl GroupStore for MemoryStore {
    fn load(&self, group_id: Uuid) -> ResultEngine<GroupState> {
        let groups = self.groups.read().map_err(poisoned)?;
        groups
            .get(&group_id)
            .map(|record| record.state.clone())
            .ok_or_else(|| EngineError::KeyNotFound(format!("group {group_id}")))
    }

    fn insert_group(&self, group: Group) -> ResultEngine<()> {
        let mut groups = self.groups.write().map_err(poisoned)?;
        if groups.contains_key(&group.id) {
            return Err(EngineError::ExistingKey(format!("group {}", group.id)));
        }
        groups.insert(
            group.id,
            GroupRecord {
                state: GroupState {
                    group,
                    expenses: Vec::new(),
                    version: 0,
                },
                activities: Vec::new(),
            },
        );
        Ok(())
    }

    fn save_group(&self, group: Group, activity: Activity, version: u64) -> ResultEngine<()> {
        self.with_record(group.id, version, |record| {
            record.state.group = group;
            record.activities.push(activity);
            Ok(())
        })
    }

    fn save_expense(&self, expense: Expense, activity: Activity, version: u64) -> ResultEngine<()> {
        self.with_record(expense.group_id, version, |record| {
            let expenses = &mut record.state.expenses;
            match expenses.iter().position(|e| e.id == expense.id) {
                Some(idx) => expenses[idx] = expense,
                None => expenses.push(expense),
            }
            record.activities.push(activity);
            Ok(())
        })
    }

    fn delete_expense(
        &self,
        group_id: Uuid,
        expense_id: Uuid,
        activity: Activity,
        version: u64,
    ) -> ResultEngine<()> {
        self.with_record(group_id, version, |record| {
            let expenses = &mut record.state.expenses;
            let before = expenses.len();
            expenses.retain(|e| e.id != expense_id);
            if expenses.len() == before {
                return Err(EngineError::KeyNotFound(format!("expense {expense_id}")));
            }
            record.activities.push(activity);
            Ok(())
        })
    }

    fn activities(&self, group_id: Uuid) -> ResultEngine<Vec<Activity>> {
        let groups = self.groups.read().map_err(poisoned)?;
        groups
            .get(&group_id)
            .map(|record| record.activities.clone())
            .ok_or_else(|| EngineError::KeyNotFound(format!("group {group_id}")))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{ActivityKind, ActivityTarget, Currency, Money, SplitWeights, expense::ExpenseDraft};

    fn group() -> Group {
        Group::new(
            "Flat",
            Currency::EUR,
            None,
            &["Ann".to_string(), "Bob".to_string()],
            None,
        )
        .unwrap()
    }

    fn expense(group: &Group, minor: i64) -> Expense {
        let ids: Vec<Uuid> = group.participants.iter().map(|p| p.id).collect();
        Expense::new(
            group,
            ExpenseDraft {
                title: "Rent".to_string(),
                amount: Money::new(minor),
                paid_by: ids[0],
                split: SplitWeights::Evenly(ids),
                category: None,
                notes: None,
                expense_date: None,
                is_reimbursement: false,
            },
            None,
        )
        .unwrap()
    }

    fn activity(group: &Group, kind: ActivityKind) -> Activity {
        Activity::record(
            kind,
            &group.participants[0],
            ActivityTarget::Group { group_id: group.id },
            json!({}),
        )
    }

    #[test]
    fn insert_twice_is_rejected() {
        let store = MemoryStore::new();
        let group = group();
        store.insert_group(group.clone()).unwrap();
        assert!(matches!(
            store.insert_group(group),
            Err(EngineError::ExistingKey(_))
        ));
    }

    #[test]
    fn save_expense_upserts_and_logs() {
        let store = MemoryStore::new();
        let group = group();
        store.insert_group(group.clone()).unwrap();

        let mut rent = expense(&group, 1000);
        store
            .save_expense(rent.clone(), activity(&group, ActivityKind::CreateExpense), 0)
            .unwrap();
        rent.title = "Rent (March)".to_string();
        store
            .save_expense(rent.clone(), activity(&group, ActivityKind::UpdateExpense), 1)
            .unwrap();

        let state = store.load(group.id).unwrap();
        assert_eq!(state.expenses, vec![rent]);
        assert_eq!(state.version, 2);
        let kinds: Vec<ActivityKind> = store
            .activities(group.id)
            .unwrap()
            .iter()
            .map(Activity::kind)
            .collect();
        assert_eq!(kinds, vec![ActivityKind::CreateExpense, ActivityKind::UpdateExpense]);
    }

    #[test]
    fn failed_delete_leaves_no_activity() {
        let store = MemoryStore::new();
        let group = group();
        store.insert_group(group.clone()).unwrap();

        let missing = Uuid::new_v4();
        assert!(matches!(
            store.delete_expense(group.id, missing, activity(&group, ActivityKind::DeleteExpense), 0),
            Err(EngineError::KeyNotFound(_))
        ));
        assert!(store.activities(group.id).unwrap().is_empty());
        assert_eq!(store.load(group.id).unwrap().version, 0);
    }

    #[test]
    fn unknown_group_is_not_found() {
        let store = MemoryStore::new();
        let group = group();
        assert!(matches!(store.load(group.id), Err(EngineError::KeyNotFound(_))));
        assert!(matches!(
            store.save_group(group.clone(), activity(&group, ActivityKind::UpdateGroup), 0),
            Err(EngineError::KeyNotFound(_))
        ));
    }

    #[test]
    fn stale_writes_are_rejected() {
        let store = MemoryStore::new();
        let group = group();
        store.insert_group(group.clone()).unwrap();
        let base = store.load(group.id).unwrap().version;

        let rent = expense(&group, 1000);
        store
            .save_expense(rent.clone(), activity(&group, ActivityKind::CreateExpense), base)
            .unwrap();

        // A group update validated before the expense landed.
        let mut rebased = group.clone();
        rebased.currency = Currency::try_from("JPY").unwrap();
        assert!(matches!(
            store.save_group(rebased, activity(&group, ActivityKind::UpdateGroup), base),
            Err(EngineError::Conflict(_))
        ));
        assert!(matches!(
            store.delete_expense(group.id, rent.id, activity(&group, ActivityKind::DeleteExpense), base),
            Err(EngineError::Conflict(_))
        ));

        let state = store.load(group.id).unwrap();
        assert_eq!(state.group.currency, Currency::EUR);
        assert_eq!(state.expenses, vec![rent]);
        assert_eq!(store.activities(group.id).unwrap().len(), 1);
    }
}
