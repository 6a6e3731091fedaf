use uuid::Uuid;

use crate::{BalanceSnapshot, ResultEngine, Transfer, compute_balances, plan_settlement};

use super::{Engine, log_fault};

impl Engine {
    /// Recomputes the net balance of every participant from the group's
    /// current expenses.
    pub fn balances(&self, group_id: Uuid) -> ResultEngine<BalanceSnapshot> {
        let state = self.load(group_id)?;
        compute_balances(&state.group, &state.expenses).map_err(|err| log_fault(group_id, err))
    }

    /// Minimal list of transfers that settles the group.
    pub fn settlement(&self, group_id: Uuid) -> ResultEngine<Vec<Transfer>> {
        let balances = self.balances(group_id)?;
        let transfers = plan_settlement(&balances).map_err(|err| log_fault(group_id, err))?;
        tracing::debug!(%group_id, transfers = transfers.len(), "settlement planned");
        Ok(transfers)
    }
}
