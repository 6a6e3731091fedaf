//! A `Group` is a set of participants sharing expenses in a single currency.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Currency, EngineError, Money, ResultEngine,
    util::{name_key, normalize_optional_text, normalize_required_name},
};

/// Member of a group.
///
/// `user_id` is `None` for placeholder participants that no real account has
/// claimed yet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: Uuid,
    pub group_id: Uuid,
    pub name: String,
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Participant {
    pub(crate) fn new(group_id: Uuid, name: &str, user_id: Option<String>) -> ResultEngine<Self> {
        Ok(Self {
            id: Uuid::new_v4(),
            group_id,
            name: normalize_required_name(name, "participant")?,
            user_id,
            created_at: Utc::now(),
        })
    }

    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.user_id.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub currency: Currency,
    pub information: Option<String>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub participants: Vec<Participant>,
}

impl Group {
    /// Builds a group with its initial participants.
    ///
    /// Requires a non-empty name and at least one participant; participant
    /// names must be unique (see [`Group::add_participant`]).
    pub fn new(
        name: &str,
        currency: Currency,
        information: Option<&str>,
        participant_names: &[String],
        created_by: Option<String>,
    ) -> ResultEngine<Self> {
        if participant_names.is_empty() {
            return Err(EngineError::InvalidInput(
                "at least one participant is required".to_string(),
            ));
        }
        let mut group = Self {
            id: Uuid::new_v4(),
            name: normalize_required_name(name, "group")?,
            currency,
            information: normalize_optional_text(information),
            created_by,
            created_at: Utc::now(),
            participants: Vec::with_capacity(participant_names.len()),
        };
        for name in participant_names {
            group.add_participant(name, None)?;
        }
        Ok(group)
    }

    pub fn participant(&self, participant_id: Uuid) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == participant_id)
    }

    /// Like [`Group::participant`], but a missing member is an error.
    pub fn require_participant(&self, participant_id: Uuid) -> ResultEngine<&Participant> {
        self.participant(participant_id).ok_or_else(|| {
            EngineError::KeyNotFound(format!("participant {participant_id} in group {}", self.id))
        })
    }

    #[must_use]
    pub fn contains(&self, participant_id: Uuid) -> bool {
        self.participant(participant_id).is_some()
    }

    /// Finds a participant by name, ignoring case, accents and spacing.
    pub fn participant_by_name(&self, name: &str) -> Option<&Participant> {
        let key = name_key(name);
        self.participants.iter().find(|p| name_key(&p.name) == key)
    }

    /// Adds a participant. Names are compared by normalized key, so "José"
    /// and "jose" are the same participant.
    pub fn add_participant(&mut self, name: &str, user_id: Option<String>) -> ResultEngine<Uuid> {
        let participant = Participant::new(self.id, name, user_id)?;
        if self.participant_by_name(&participant.name).is_some() {
            return Err(EngineError::ExistingKey(participant.name));
        }
        let id = participant.id;
        self.participants.push(participant);
        Ok(id)
    }

    /// Links a placeholder participant to a real account.
    pub fn claim_participant(&mut self, participant_id: Uuid, user_id: &str) -> ResultEngine<()> {
        let user_id = normalize_optional_text(Some(user_id))
            .ok_or_else(|| EngineError::InvalidInput("user id must not be empty".to_string()))?;
        if self
            .participants
            .iter()
            .any(|p| p.user_id.as_deref() == Some(user_id.as_str()))
        {
            return Err(EngineError::ExistingKey(user_id));
        }
        let group_id = self.id;
        let participant = self
            .participants
            .iter_mut()
            .find(|p| p.id == participant_id)
            .ok_or_else(|| {
                EngineError::KeyNotFound(format!("participant {participant_id} in group {group_id}"))
            })?;
        if let Some(existing) = &participant.user_id {
            return Err(EngineError::ExistingKey(existing.clone()));
        }
        participant.user_id = Some(user_id);
        Ok(())
    }
}

/// Read model mirroring the group list view: membership count and total
/// spending.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub id: Uuid,
    pub name: String,
    pub currency: Currency,
    pub member_count: usize,
    /// Sum of all non-reimbursement expense totals.
    pub total_spent: Money,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn new_group_requires_participants() {
        let err = Group::new("Trip", Currency::EUR, None, &[], None).unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidInput("at least one participant is required".to_string())
        );
    }

    #[test]
    fn new_group_rejects_blank_names() {
        assert!(Group::new("  ", Currency::EUR, None, &names(&["a"]), None).is_err());
        assert!(Group::new("Trip", Currency::EUR, None, &names(&["a", " "]), None).is_err());
    }

    #[test]
    fn participant_names_are_unique_by_key() {
        let err = Group::new("Trip", Currency::EUR, None, &names(&["José", "jose"]), None)
            .unwrap_err();
        assert_eq!(err, EngineError::ExistingKey("jose".to_string()));
    }

    #[test]
    fn lookup_by_name_is_normalized() {
        let group =
            Group::new("Trip", Currency::EUR, Some("  "), &names(&["Anne Marie"]), None).unwrap();
        assert!(group.participant_by_name("anne-marie").is_some());
        assert_eq!(group.information, None);
        assert!(group.participants[0].is_placeholder());
    }

    #[test]
    fn claim_links_placeholder_once() {
        let mut group =
            Group::new("Trip", Currency::EUR, None, &names(&["Ann", "Bob"]), None).unwrap();
        let ann = group.participants[0].id;
        let bob = group.participants[1].id;
        group.claim_participant(ann, "user-1").unwrap();
        assert_eq!(
            group.claim_participant(ann, "user-2").unwrap_err(),
            EngineError::ExistingKey("user-1".to_string())
        );
        assert_eq!(
            group.claim_participant(bob, "user-1").unwrap_err(),
            EngineError::ExistingKey("user-1".to_string())
        );
        assert!(matches!(
            group.claim_participant(Uuid::nil(), "user-3"),
            Err(EngineError::KeyNotFound(_))
        ));
    }
}
