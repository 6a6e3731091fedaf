//! Activity recorder.
//!
//! Builds immutable audit records for group and expense mutations. Nothing
//! here persists anything: the storage port commits the record in the same
//! atomic write as the mutation it describes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use uuid::Uuid;

use crate::{EngineError, Expense, Group, Participant};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityKind {
    UpdateGroup,
    CreateExpense,
    UpdateExpense,
    DeleteExpense,
}

impl ActivityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UpdateGroup => "UPDATE_GROUP",
            Self::CreateExpense => "CREATE_EXPENSE",
            Self::UpdateExpense => "UPDATE_EXPENSE",
            Self::DeleteExpense => "DELETE_EXPENSE",
        }
    }
}

impl TryFrom<&str> for ActivityKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "UPDATE_GROUP" => Ok(Self::UpdateGroup),
            "CREATE_EXPENSE" => Ok(Self::CreateExpense),
            "UPDATE_EXPENSE" => Ok(Self::UpdateExpense),
            "DELETE_EXPENSE" => Ok(Self::DeleteExpense),
            other => Err(EngineError::InvalidInput(format!(
                "invalid activity type: {other}"
            ))),
        }
    }
}

/// What a mutation touched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "target", rename_all = "snake_case")]
pub enum ActivityTarget {
    Group { group_id: Uuid },
    Expense { group_id: Uuid, expense_id: Uuid },
}

impl ActivityTarget {
    #[must_use]
    pub fn group_id(self) -> Uuid {
        match self {
            Self::Group { group_id } | Self::Expense { group_id, .. } => group_id,
        }
    }

    #[must_use]
    pub fn expense_id(self) -> Option<Uuid> {
        match self {
            Self::Group { .. } => None,
            Self::Expense { expense_id, .. } => Some(expense_id),
        }
    }
}

/// Audit trail entry. Fields are private: an activity cannot be edited
/// after construction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    id: Uuid,
    kind: ActivityKind,
    participant_id: Uuid,
    created_by: Option<String>,
    target: ActivityTarget,
    time: DateTime<Utc>,
    data: Value,
}

impl Activity {
    /// Records `kind` performed by `actor` on `target`, stamped now.
    #[must_use]
    pub fn record(
        kind: ActivityKind,
        actor: &Participant,
        target: ActivityTarget,
        data: Value,
    ) -> Self {
        Self::record_at(kind, actor, target, data, Utc::now())
    }

    /// Same as [`Activity::record`] with an explicit timestamp.
    #[must_use]
    pub fn record_at(
        kind: ActivityKind,
        actor: &Participant,
        target: ActivityTarget,
        data: Value,
        time: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            participant_id: actor.id,
            created_by: actor.user_id.clone(),
            target,
            time,
            data,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn kind(&self) -> ActivityKind {
        self.kind
    }

    pub fn participant_id(&self) -> Uuid {
        self.participant_id
    }

    pub fn created_by(&self) -> Option<&str> {
        self.created_by.as_deref()
    }

    pub fn target(&self) -> ActivityTarget {
        self.target
    }

    pub fn group_id(&self) -> Uuid {
        self.target.group_id()
    }

    pub fn expense_id(&self) -> Option<Uuid> {
        self.target.expense_id()
    }

    pub fn time(&self) -> DateTime<Utc> {
        self.time
    }

    pub fn data(&self) -> &Value {
        &self.data
    }
}

/// Payload builders.
pub mod payload {
    use super::*;

    /// Fields of an expense worth showing in the audit trail.
    pub fn expense_summary(expense: &Expense) -> Value {
        json!({
            "title": expense.title,
            "amount": expense.amount,
            "paid_by": expense.paid_by,
            "split_mode": expense.split_mode(),
            "participants": expense.participants.len(),
            "category": expense.category,
            "is_reimbursement": expense.is_reimbursement,
        })
    }

    /// `{field: {from, to}}` for every summary field that changed.
    pub fn expense_changes(before: &Expense, after: &Expense) -> Value {
        let mut changes = diff(&expense_summary(before), &expense_summary(after));
        if before.participants != after.participants {
            changes.insert(
                "split".to_string(),
                json!({ "from": before.participants, "to": after.participants }),
            );
        }
        Value::Object(changes)
    }

    fn group_summary(group: &Group) -> Value {
        json!({
            "name": group.name,
            "currency": group.currency,
            "information": group.information,
        })
    }

    pub fn group_changes(before: &Group, after: &Group) -> Value {
        Value::Object(diff(&group_summary(before), &group_summary(after)))
    }

    pub fn participant_added(participant: &Participant) -> Value {
        json!({ "participant_added": { "id": participant.id, "name": participant.name } })
    }

    pub fn participant_claimed(participant: &Participant) -> Value {
        json!({ "participant_claimed": { "id": participant.id, "user_id": participant.user_id } })
    }

    fn diff(before: &Value, after: &Value) -> Map<String, Value> {
        let (Value::Object(before), Value::Object(after)) = (before, after) else {
            return Map::new();
        };
        after
            .iter()
            .filter(|(key, value)| before.get(*key) != Some(*value))
            .map(|(key, value)| {
                let from = before.get(key).cloned().unwrap_or(Value::Null);
                (key.clone(), json!({ "from": from, "to": value }))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Currency, Money,
        expense::ExpenseDraft,
        split::SplitWeights,
    };

    fn group() -> Group {
        Group::new(
            "Trip",
            Currency::EUR,
            None,
            &["Ann".to_string(), "Bob".to_string()],
            None,
        )
        .unwrap()
    }

    #[test]
    fn record_echoes_inputs() {
        let mut group = group();
        let ann = group.participants[0].id;
        group.claim_participant(ann, "user-ann").unwrap();
        let actor = group.participant(ann).unwrap();
        let at = Utc::now();

        let activity = Activity::record_at(
            ActivityKind::UpdateGroup,
            actor,
            ActivityTarget::Group { group_id: group.id },
            json!({ "name": "x" }),
            at,
        );
        assert_eq!(activity.kind(), ActivityKind::UpdateGroup);
        assert_eq!(activity.participant_id(), ann);
        assert_eq!(activity.created_by(), Some("user-ann"));
        assert_eq!(activity.group_id(), group.id);
        assert_eq!(activity.expense_id(), None);
        assert_eq!(activity.time(), at);
        assert_eq!(activity.data()["name"], "x");
    }

    #[test]
    fn expense_changes_lists_only_changed_fields() {
        let group = group();
        let ids: Vec<Uuid> = group.participants.iter().map(|p| p.id).collect();
        let draft = ExpenseDraft {
            title: "Taxi".to_string(),
            amount: Money::new(40),
            paid_by: ids[0],
            split: SplitWeights::Evenly(ids.clone()),
            category: None,
            notes: None,
            expense_date: None,
            is_reimbursement: false,
        };
        let before = Expense::new(&group, draft.clone(), None).unwrap();
        let after = before
            .replaced(
                &group,
                ExpenseDraft {
                    amount: Money::new(50),
                    ..draft
                },
            )
            .unwrap();

        let changes = payload::expense_changes(&before, &after);
        let fields: Vec<&String> = changes.as_object().unwrap().keys().collect();
        assert_eq!(fields, vec!["amount", "split"]);
        assert_eq!(changes["amount"]["from"], 40);
        assert_eq!(changes["amount"]["to"], 50);
    }

    #[test]
    fn group_changes_track_renames() {
        let before = group();
        let mut after = before.clone();
        after.name = "Holiday".to_string();
        let changes = payload::group_changes(&before, &after);
        assert_eq!(changes, json!({ "name": { "from": "Trip", "to": "Holiday" } }));
    }

    #[test]
    fn kinds_use_screaming_case() {
        let json = serde_json::to_string(&ActivityKind::DeleteExpense).unwrap();
        assert_eq!(json, "\"DELETE_EXPENSE\"");
        assert_eq!(
            ActivityKind::try_from("CREATE_EXPENSE").unwrap(),
            ActivityKind::CreateExpense
        );
    }
}
