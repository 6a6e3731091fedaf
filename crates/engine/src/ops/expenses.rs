use uuid::Uuid;

use crate::{
    Activity, ActivityKind, ActivityTarget, EngineError, Expense, ExpenseCmd, ResultEngine,
    activity::payload,
    expense::ExpenseDraft,
    util::{normalize_optional_text, normalize_required_name},
};

use super::{Engine, require_actor};

impl Engine {
    /// Creates an expense, materializing its split. Returns the expense id.
    pub fn create_expense(&self, cmd: ExpenseCmd) -> ResultEngine<Uuid> {
        let state = self.load(cmd.group_id)?;
        let group = &state.group;
        let actor = require_actor(group, cmd.actor_id)?;

        let expense = Expense::new(group, draft_from_cmd(&cmd)?, actor.user_id.clone())?;
        let expense_id = expense.id;
        let activity = Activity::record(
            ActivityKind::CreateExpense,
            actor,
            ActivityTarget::Expense {
                group_id: group.id,
                expense_id,
            },
            payload::expense_summary(&expense),
        );

        tracing::debug!(%expense_id, mode = expense.split_mode().as_str(), "saving expense");
        self.store.save_expense(expense, activity, state.version)?;
        tracing::info!(group_id = %group.id, %expense_id, "expense created");
        Ok(expense_id)
    }

    /// Replaces an expense and its whole split.
    pub fn update_expense(&self, expense_id: Uuid, cmd: ExpenseCmd) -> ResultEngine<()> {
        let state = self.load(cmd.group_id)?;
        let group = &state.group;
        let actor = require_actor(group, cmd.actor_id)?;
        let before = find_expense(&state.expenses, expense_id)?;

        let after = before.replaced(group, draft_from_cmd(&cmd)?)?;
        let activity = Activity::record(
            ActivityKind::UpdateExpense,
            actor,
            ActivityTarget::Expense {
                group_id: group.id,
                expense_id,
            },
            payload::expense_changes(before, &after),
        );

        self.store.save_expense(after, activity, state.version)?;
        tracing::info!(group_id = %group.id, %expense_id, "expense updated");
        Ok(())
    }

    /// Removes an expense and its split.
    pub fn delete_expense(&self, group_id: Uuid, expense_id: Uuid, actor_id: Uuid) -> ResultEngine<()> {
        let state = self.load(group_id)?;
        let actor = require_actor(&state.group, actor_id)?;
        let expense = find_expense(&state.expenses, expense_id)?;

        let activity = Activity::record(
            ActivityKind::DeleteExpense,
            actor,
            ActivityTarget::Expense {
                group_id,
                expense_id,
            },
            payload::expense_summary(expense),
        );

        self.store
            .delete_expense(group_id, expense_id, activity, state.version)?;
        tracing::info!(%group_id, %expense_id, "expense deleted");
        Ok(())
    }

    pub fn expense(&self, group_id: Uuid, expense_id: Uuid) -> ResultEngine<Expense> {
        let state = self.load(group_id)?;
        find_expense(&state.expenses, expense_id).cloned()
    }

    pub fn expenses(&self, group_id: Uuid) -> ResultEngine<Vec<Expense>> {
        Ok(self.load(group_id)?.expenses)
    }
}

fn find_expense(expenses: &[Expense], expense_id: Uuid) -> ResultEngine<&Expense> {
    expenses
        .iter()
        .find(|e| e.id == expense_id)
        .ok_or_else(|| EngineError::KeyNotFound(format!("expense {expense_id}")))
}

fn draft_from_cmd(cmd: &ExpenseCmd) -> ResultEngine<ExpenseDraft> {
    // A stored expense may lack a payer; balances would be meaningless
    // without one.
    let paid_by = cmd.paid_by.ok_or_else(|| {
        EngineError::InvalidSplit("expense requires a payer".to_string())
    })?;
    Ok(ExpenseDraft {
        title: normalize_required_name(&cmd.title, "expense")?,
        amount: cmd.amount,
        paid_by,
        split: cmd.split.clone(),
        category: normalize_optional_text(cmd.meta.category.as_deref()),
        notes: normalize_optional_text(cmd.meta.notes.as_deref()),
        expense_date: cmd.meta.expense_date,
        is_reimbursement: cmd.meta.is_reimbursement,
    })
}
