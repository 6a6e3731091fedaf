//! Expense-splitting and settlement engine.
//!
//! The engine turns a group's expenses into who-owes-whom:
//!
//! - [`compute_split`] divides one expense total into exact owed amounts.
//! - [`compute_balances`] folds a group's expenses into net balances.
//! - [`plan_settlement`] reduces balances to a short list of [`Transfer`]s.
//! - [`Activity::record`] builds the audit record for each mutation.
//!
//! All of them are pure functions over integer [`Money`]. [`Engine`] wires
//! them into a write path over a [`GroupStore`].
//!
//! ```rust
//! use engine::{Engine, ExpenseCmd, Money, NewGroupCmd, SplitWeights, Currency};
//!
//! let engine = Engine::builder().build();
//! let group_id = engine
//!     .create_group(NewGroupCmd::new("Trip", Currency::EUR).participants(["Ann", "Bob"]))
//!     .unwrap();
//! let group = engine.group(group_id).unwrap();
//! let (ann, bob) = (group.participants[0].id, group.participants[1].id);
//!
//! engine
//!     .create_expense(
//!         ExpenseCmd::new(group_id, ann, "Dinner", Money::new(30_00), SplitWeights::Evenly(vec![ann, bob]))
//!             .paid_by(ann),
//!     )
//!     .unwrap();
//!
//! let plan = engine.settlement(group_id).unwrap();
//! assert_eq!(plan.len(), 1);
//! assert_eq!(plan[0].from, bob);
//! assert_eq!(plan[0].amount, Money::new(15_00));
//! ```

pub use activity::{Activity, ActivityKind, ActivityTarget, payload};
pub use balances::{BalanceSnapshot, compute_balances};
pub use commands::{ExpenseCmd, ExpenseMeta, NewGroupCmd, UpdateGroupCmd};
pub use currency::Currency;
pub use error::EngineError;
pub use expense::{Expense, ExpenseParticipant};
pub use group::{Group, GroupSummary, Participant};
pub use money::Money;
pub use ops::{Engine, EngineBuilder};
pub use settlement::{Transfer, plan_settlement};
pub use split::{Owed, Percentage, SplitMode, SplitWeights, compute_split};
pub use store::{GroupState, GroupStore, MemoryStore};

mod activity;
mod balances;
mod commands;
mod currency;
mod error;
mod expense;
mod group;
mod money;
mod ops;
mod settlement;
mod split;
mod store;
mod util;

pub type ResultEngine<T> = Result<T, EngineError>;
