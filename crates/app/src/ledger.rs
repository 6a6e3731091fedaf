//! Replays a [`LedgerFile`] through the engine and builds the [`Report`].

use api_types::{
    ledger::{ExpenseNew, LedgerFile, SplitNew},
    report::{BalanceView, GroupView, Report, TransferView},
};
use engine::{
    Currency, Engine, EngineError, ExpenseCmd, Group, Money, NewGroupCmd, Percentage,
    SplitWeights,
};
use uuid::Uuid;

use crate::error::{AppError, Result};

/// Creates the group, records every expense in document order and returns
/// the resulting balances and settlement plan.
pub fn replay(engine: &Engine, ledger: LedgerFile) -> Result<Report> {
    let currency = Currency::try_from(ledger.group.currency.as_str())?;
    let mut cmd = NewGroupCmd::new(ledger.group.name, currency)
        .participants(ledger.group.participants);
    if let Some(information) = ledger.group.information {
        cmd = cmd.information(information);
    }
    let group_id = engine.create_group(cmd)?;
    let group = engine.group(group_id)?;

    for expense in ledger.expenses {
        let title = expense.title.clone();
        let cmd = expense_cmd(&group, expense)?;
        engine
            .create_expense(cmd)
            .map_err(|source| AppError::Expense { title, source })?;
    }

    report(engine, &group)
}

fn expense_cmd(group: &Group, expense: ExpenseNew) -> Result<ExpenseCmd> {
    let currency = group.currency;
    let with_title = |source: EngineError| AppError::Expense {
        title: expense.title.clone(),
        source,
    };

    let amount = Money::parse_non_negative(&expense.amount, currency).map_err(with_title)?;
    let paid_by = expense
        .paid_by
        .as_deref()
        .map(|name| resolve(group, name))
        .transpose()?;
    let actor = match expense.recorded_by.as_deref() {
        Some(name) => resolve(group, name)?,
        None => match paid_by {
            Some(id) => id,
            None => group
                .participants
                .first()
                .map(|p| p.id)
                .ok_or_else(|| AppError::UnknownParticipant(String::new()))?,
        },
    };
    let split = split_weights(group, &expense.split).map_err(|err| match err {
        AppError::Engine(source) => with_title(source),
        other => other,
    })?;

    let mut cmd = ExpenseCmd::new(group.id, actor, expense.title.clone(), amount, split)
        .reimbursement(expense.is_reimbursement);
    if let Some(id) = paid_by {
        cmd = cmd.paid_by(id);
    }
    if let Some(category) = expense.category {
        cmd = cmd.category(category);
    }
    if let Some(notes) = expense.notes {
        cmd = cmd.notes(notes);
    }
    if let Some(date) = expense.expense_date {
        cmd = cmd.expense_date(date);
    }
    Ok(cmd)
}

fn split_weights(group: &Group, split: &SplitNew) -> Result<SplitWeights> {
    let weights = match split {
        SplitNew::Evenly { participants } => SplitWeights::Evenly(
            participants
                .iter()
                .map(|name| resolve(group, name))
                .collect::<Result<_>>()?,
        ),
        SplitNew::ByShares { shares } => SplitWeights::ByShares(
            shares
                .iter()
                .map(|s| Ok((resolve(group, &s.participant)?, s.shares)))
                .collect::<Result<_>>()?,
        ),
        SplitNew::ByPercentage { percentages } => SplitWeights::ByPercentage(
            percentages
                .iter()
                .map(|p| Ok((resolve(group, &p.participant)?, p.percentage.parse::<Percentage>()?)))
                .collect::<Result<_>>()?,
        ),
        SplitNew::ByAmount { amounts } => SplitWeights::ByAmount(
            amounts
                .iter()
                .map(|a| {
                    Ok((
                        resolve(group, &a.participant)?,
                        Money::parse_non_negative(&a.amount, group.currency)?,
                    ))
                })
                .collect::<Result<_>>()?,
        ),
    };
    Ok(weights)
}

fn resolve(group: &Group, name: &str) -> Result<Uuid> {
    group
        .participant_by_name(name)
        .map(|p| p.id)
        .ok_or_else(|| AppError::UnknownParticipant(name.trim().to_string()))
}

fn report(engine: &Engine, group: &Group) -> Result<Report> {
    let summary = engine.group_summary(group.id)?;
    let balances = engine.balances(group.id)?;
    let transfers = engine.settlement(group.id)?;
    let currency = group.currency;
    let name_of = |id: Uuid| {
        group
            .participant(id)
            .map_or_else(|| id.to_string(), |p| p.name.clone())
    };

    tracing::info!(
        group_id = %group.id,
        transfers = transfers.len(),
        "settlement planned"
    );

    Ok(Report {
        group: GroupView {
            id: summary.id,
            name: summary.name,
            currency: currency.to_string(),
            member_count: summary.member_count,
            total_spent_minor: summary.total_spent.minor(),
            total_spent: display(summary.total_spent, currency),
        },
        balances: group
            .participants
            .iter()
            .map(|p| {
                let balance = balances.get(p.id).unwrap_or(Money::ZERO);
                BalanceView {
                    participant_id: p.id,
                    name: p.name.clone(),
                    balance_minor: balance.minor(),
                    balance: display(balance, currency),
                }
            })
            .collect(),
        transfers: transfers
            .iter()
            .map(|t| TransferView {
                from: name_of(t.from),
                to: name_of(t.to),
                amount_minor: t.amount.minor(),
                amount: display(t.amount, currency),
            })
            .collect(),
    })
}

/// Renders an amount with the precision of `currency`, e.g. `-12.50 EUR`.
fn display(amount: Money, currency: Currency) -> String {
    let sign = if amount.is_negative() { "-" } else { "" };
    let abs = amount.minor().unsigned_abs();
    let digits = usize::from(currency.minor_units());
    if digits == 0 {
        return format!("{sign}{abs} {currency}");
    }
    let scale = currency.scale().unsigned_abs();
    format!("{sign}{}.{:0digits$} {currency}", abs / scale, abs % scale)
}
