use uuid::Uuid;

use crate::{
    Activity, ActivityKind, ActivityTarget, EngineError, Group, GroupState, GroupSummary, Money,
    NewGroupCmd, ResultEngine, UpdateGroupCmd,
    activity::payload,
    util::{normalize_optional_text, normalize_required_name},
};

use super::{Engine, log_fault, require_actor};

impl Engine {
    /// Creates a group with its initial participants. Returns the group id.
    pub fn create_group(&self, cmd: NewGroupCmd) -> ResultEngine<Uuid> {
        let group = Group::new(
            &cmd.name,
            cmd.currency,
            cmd.information.as_deref(),
            &cmd.participants,
            cmd.created_by,
        )?;
        let group_id = group.id;
        let members = group.participants.len();
        self.store.insert_group(group)?;
        tracing::info!(%group_id, members, "group created");
        Ok(group_id)
    }

    pub fn group(&self, group_id: Uuid) -> ResultEngine<Group> {
        Ok(self.load(group_id)?.group)
    }

    /// Changes name, notes or currency.
    ///
    /// The currency is locked once the group has an expense: stored amounts
    /// were parsed with its precision.
    pub fn update_group(&self, cmd: UpdateGroupCmd) -> ResultEngine<()> {
        let state = self.load(cmd.group_id)?;
        let version = state.version;
        let before = state.group;
        let actor = require_actor(&before, cmd.actor_id)?;

        let mut after = before.clone();
        if let Some(name) = cmd.name.as_deref() {
            after.name = normalize_required_name(name, "group")?;
        }
        if let Some(information) = cmd.information.as_deref() {
            after.information = normalize_optional_text(Some(information));
        }
        if let Some(currency) = cmd.currency
            && currency != before.currency
        {
            if !state.expenses.is_empty() {
                return Err(EngineError::CurrencyMismatch(format!(
                    "group currency is {} and cannot change once expenses exist",
                    before.currency
                )));
            }
            after.currency = currency;
        }

        let changes = payload::group_changes(&before, &after);
        if changes.as_object().is_some_and(|c| c.is_empty()) {
            return Ok(());
        }
        let activity = Activity::record(
            ActivityKind::UpdateGroup,
            actor,
            ActivityTarget::Group {
                group_id: before.id,
            },
            changes,
        );
        self.store.save_group(after, activity, version)?;
        tracing::info!(group_id = %cmd.group_id, "group updated");
        Ok(())
    }

    /// Adds a placeholder participant to an existing group.
    pub fn add_participant(&self, group_id: Uuid, actor_id: Uuid, name: &str) -> ResultEngine<Uuid> {
        let GroupState {
            mut group, version, ..
        } = self.load(group_id)?;
        let actor = require_actor(&group, actor_id)?.clone();
        let participant_id = group.add_participant(name, None)?;
        let participant = group.require_participant(participant_id)?;

        let activity = Activity::record(
            ActivityKind::UpdateGroup,
            &actor,
            ActivityTarget::Group { group_id },
            payload::participant_added(participant),
        );
        self.store.save_group(group, activity, version)?;
        tracing::info!(%group_id, %participant_id, "participant added");
        Ok(participant_id)
    }

    /// Links a placeholder participant to the account `user_id`. The claimed
    /// participant is the actor of the recorded activity.
    pub fn claim_participant(
        &self,
        group_id: Uuid,
        participant_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<()> {
        let GroupState {
            mut group, version, ..
        } = self.load(group_id)?;
        group.claim_participant(participant_id, user_id)?;
        let participant = group.require_participant(participant_id)?;

        let activity = Activity::record(
            ActivityKind::UpdateGroup,
            participant,
            ActivityTarget::Group { group_id },
            payload::participant_claimed(participant),
        );
        self.store.save_group(group, activity, version)?;
        tracing::info!(%group_id, %participant_id, "participant claimed");
        Ok(())
    }

    /// Member count and total spending (reimbursements excluded).
    pub fn group_summary(&self, group_id: Uuid) -> ResultEngine<GroupSummary> {
        let state = self.load(group_id)?;
        let total_spent = Money::try_sum(
            state
                .expenses
                .iter()
                .filter(|e| !e.is_reimbursement)
                .map(|e| e.amount),
        )
        .map_err(|err| log_fault(group_id, err))?;
        Ok(GroupSummary {
            id: state.group.id,
            name: state.group.name,
            currency: state.group.currency,
            member_count: state.group.participants.len(),
            total_spent,
        })
    }

    /// Audit trail of the group, oldest first.
    pub fn activities(&self, group_id: Uuid) -> ResultEngine<Vec<Activity>> {
        self.store.activities(group_id)
    }
}
