use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Input document: a group and its expenses, participants referenced by name.
pub mod ledger {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LedgerFile {
        pub group: GroupNew,
        #[serde(default)]
        pub expenses: Vec<ExpenseNew>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupNew {
        pub name: String,
        /// ISO 4217 code, e.g. `EUR`.
        pub currency: String,
        pub information: Option<String>,
        pub participants: Vec<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub title: String,
        /// Decimal string in the group currency, e.g. `"12.50"`.
        pub amount: String,
        /// Name of the participant who paid.
        pub paid_by: Option<String>,
        /// Name of the participant recording the expense. Defaults to the payer.
        pub recorded_by: Option<String>,
        pub split: SplitNew,
        pub category: Option<String>,
        pub notes: Option<String>,
        pub expense_date: Option<NaiveDate>,
        #[serde(default)]
        pub is_reimbursement: bool,
    }

    /// How the expense is divided.
    ///
    /// ```json
    /// { "mode": "BY_SHARES", "shares": [{ "participant": "Ann", "shares": 2 }] }
    /// ```
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(tag = "mode", rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum SplitNew {
        Evenly { participants: Vec<String> },
        ByShares { shares: Vec<ShareNew> },
        ByPercentage { percentages: Vec<PercentageNew> },
        ByAmount { amounts: Vec<AmountNew> },
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ShareNew {
        pub participant: String,
        pub shares: u32,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PercentageNew {
        pub participant: String,
        /// At most two fraction digits, e.g. `"33.33"`.
        pub percentage: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AmountNew {
        pub participant: String,
        pub amount: String,
    }
}

/// Output document: balances and the plan that settles them.
pub mod report {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Report {
        pub group: GroupView,
        pub balances: Vec<BalanceView>,
        pub transfers: Vec<TransferView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupView {
        pub id: Uuid,
        pub name: String,
        pub currency: String,
        pub member_count: usize,
        /// Total of non-reimbursement expenses.
        pub total_spent_minor: i64,
        pub total_spent: String,
    }

    /// Positive: the group owes the participant. Negative: the participant
    /// owes the group.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceView {
        pub participant_id: Uuid,
        pub name: String,
        pub balance_minor: i64,
        pub balance: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransferView {
        pub from: String,
        pub to: String,
        pub amount_minor: i64,
        pub amount: String,
    }
}

#[cfg(test)]
mod tests {
    use super::ledger::*;

    #[test]
    fn ledger_split_is_tagged_by_mode() {
        let json = r#"{
            "group": { "name": "Trip", "currency": "EUR", "participants": ["Ann", "Bob"] },
            "expenses": [{
                "title": "Hotel",
                "amount": "120.00",
                "paid_by": "Ann",
                "split": { "mode": "BY_PERCENTAGE", "percentages": [
                    { "participant": "Ann", "percentage": "60" },
                    { "participant": "Bob", "percentage": "40" }
                ] },
                "expense_date": "2026-04-02"
            }]
        }"#;
        let ledger: LedgerFile = serde_json::from_str(json).unwrap();
        assert_eq!(ledger.group.information, None);
        let expense = &ledger.expenses[0];
        assert!(!expense.is_reimbursement);
        assert!(expense.recorded_by.is_none());
        let SplitNew::ByPercentage { percentages } = &expense.split else {
            panic!("expected a percentage split");
        };
        assert_eq!(percentages[1].percentage, "40");
    }

    #[test]
    fn expenses_default_to_empty() {
        let ledger: LedgerFile = serde_json::from_str(
            r#"{ "group": { "name": "Flat", "currency": "JPY", "participants": ["A"] } }"#,
        )
        .unwrap();
        assert!(ledger.expenses.is_empty());
    }
}
