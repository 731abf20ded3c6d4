//! Core library for tracking Vodafone Cash mobile-money activity.
//!
//! Raw notification text goes in through [`CashTracker::submit`];
//! structured [`Transaction`] records come out the other side: parsed,
//! appended to a durable newest-first ledger, and measured against
//! configurable daily and monthly caps. The notification source, the UI,
//! the dashboard HTTP client, and the durable key-value substrate are the
//! host's concern, represented here by the [`KeyValueStore`] and
//! [`SyncNotifier`] traits.

pub mod error;
pub mod ledger;
pub mod limits;
pub mod models;
pub mod parser;
pub mod storage;
pub mod sync;
pub mod tracker;

pub use error::{ParseFailure, Result, StorageError};
pub use ledger::TransactionLedger;
pub use limits::LimitsEngine;
pub use models::{LimitPolicy, LimitWindow, Transaction, TransactionId, TransactionKind};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use sync::{NoopNotifier, SyncNotifier};
pub use tracker::{CashTracker, SubmitOutcome};
