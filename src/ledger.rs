//! The ordered, durable collection of recorded transactions.

use chrono::{Datelike, Local, NaiveDate};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::error::Result;
use crate::models::{Transaction, TransactionKind};
use crate::storage::KeyValueStore;

const TRANSACTIONS_KEY: &str = "transactions";
const EMPTY_LEDGER_JSON: &str = "[]";

/// Newest-first sequence of transactions backed by a key-value store.
///
/// Ordering is by insertion, not by timestamp: a backdated received record
/// still lands at the front, which is what "latest transaction" queries
/// want. Aggregation ignores position entirely and filters on calendar
/// fields, recomputed from a full scan on every call so no counter can
/// drift from the underlying data.
pub struct TransactionLedger<S: KeyValueStore> {
    store: S,
    transactions: Vec<Transaction>,
}

impl<S: KeyValueStore> TransactionLedger<S> {
    /// Hydrate from the store.
    ///
    /// A missing, unreadable, or corrupt value degrades to an empty ledger
    /// with a warning; startup is never blocked on ledger state.
    pub fn load(store: S) -> Self {
        let transactions = match store.get_string(TRANSACTIONS_KEY, EMPTY_LEDGER_JSON) {
            Ok(json) => match serde_json::from_str::<Vec<Transaction>>(&json) {
                Ok(transactions) => transactions,
                Err(e) => {
                    warn!(error = %e, "stored ledger is corrupt, starting empty");
                    Vec::new()
                }
            },
            Err(e) => {
                warn!(error = %e, "stored ledger could not be read, starting empty");
                Vec::new()
            }
        };
        debug!(count = transactions.len(), "ledger hydrated");
        Self {
            store,
            transactions,
        }
    }

    /// Insert at the front and persist the full sequence before returning.
    ///
    /// On a failed persist the insertion is rolled back and the error
    /// returned, so the in-memory sequence and the durable copy never
    /// diverge.
    pub fn append(&mut self, transaction: Transaction) -> Result<()> {
        self.transactions.insert(0, transaction);
        if let Err(e) = self.persist() {
            self.transactions.remove(0);
            return Err(e);
        }
        debug!(count = self.transactions.len(), "transaction appended");
        Ok(())
    }

    /// Empty the sequence and persist the empty state.
    pub fn clear(&mut self) -> Result<()> {
        let drained = std::mem::take(&mut self.transactions);
        if let Err(e) = self.persist() {
            self.transactions = drained;
            return Err(e);
        }
        debug!("ledger cleared");
        Ok(())
    }

    fn persist(&self) -> Result<()> {
        let json = serde_json::to_string(&self.transactions)?;
        self.store.put_string(TRANSACTIONS_KEY, &json)
    }

    /// Defensive copy of the whole sequence, newest first.
    pub fn all(&self) -> Vec<Transaction> {
        self.transactions.clone()
    }

    /// The most recently inserted transaction.
    pub fn latest(&self) -> Option<Transaction> {
        self.transactions.first().cloned()
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Transactions whose timestamp falls on `date` in local time.
    pub fn for_calendar_day(&self, date: NaiveDate) -> Vec<Transaction> {
        self.transactions
            .iter()
            .filter(|t| t.timestamp.date_naive() == date)
            .cloned()
            .collect()
    }

    /// Transactions whose timestamp falls in the given year and month,
    /// local time.
    pub fn for_calendar_month(&self, year: i32, month: u32) -> Vec<Transaction> {
        self.transactions
            .iter()
            .filter(|t| t.timestamp.year() == year && t.timestamp.month() == month)
            .cloned()
            .collect()
    }

    pub fn sum_by_kind_for_day(&self, kind: TransactionKind, date: NaiveDate) -> Decimal {
        self.transactions
            .iter()
            .filter(|t| t.kind == kind && t.timestamp.date_naive() == date)
            .map(|t| t.amount)
            .sum()
    }

    pub fn sum_by_kind_for_month(
        &self,
        kind: TransactionKind,
        year: i32,
        month: u32,
    ) -> Decimal {
        self.transactions
            .iter()
            .filter(|t| t.kind == kind && t.timestamp.year() == year && t.timestamp.month() == month)
            .map(|t| t.amount)
            .sum()
    }

    pub fn sum_transferred_today(&self) -> Decimal {
        self.sum_by_kind_for_day(TransactionKind::Transfer, Local::now().date_naive())
    }

    pub fn sum_received_today(&self) -> Decimal {
        self.sum_by_kind_for_day(TransactionKind::Received, Local::now().date_naive())
    }

    pub fn sum_transferred_this_month(&self) -> Decimal {
        let now = Local::now();
        self.sum_by_kind_for_month(TransactionKind::Transfer, now.year(), now.month())
    }

    pub fn sum_received_this_month(&self) -> Decimal {
        let now = Local::now();
        self.sum_by_kind_for_month(TransactionKind::Received, now.year(), now.month())
    }
}
