use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Local, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Direction of a mobile-money movement.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Transfer,
    Received,
}

/// Identifier assigned when a record is created.
///
/// Derived from the creation time in epoch milliseconds, bumped past the
/// previously issued value so that two records created in the same
/// millisecond still get distinct, increasing ids.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub struct TransactionId(u64);

static LAST_ID: AtomicU64 = AtomicU64::new(0);

impl TransactionId {
    /// Issue the next id for this process.
    pub fn next() -> Self {
        let now = Utc::now().timestamp_millis().max(0) as u64;
        let mut last = LAST_ID.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(last + 1);
            match LAST_ID.compare_exchange_weak(
                last,
                candidate,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return Self(candidate),
                Err(observed) => last = observed,
            }
        }
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One structured record extracted from a single notification.
///
/// Immutable once appended to the ledger. Serde names follow the dashboard
/// server's JSON schema (`phoneNumber`, `balanceBefore`, ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: TransactionId,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: Decimal,
    #[serde(rename = "phoneNumber")]
    pub counterparty_phone: String,
    /// Creation time, except for received records, where the date embedded
    /// in the message wins.
    #[serde(rename = "date")]
    pub timestamp: DateTime<Local>,
    pub balance_before: Decimal,
    pub balance_after: Decimal,
    /// Only meaningful for transfers.
    #[serde(rename = "serviceFees", default)]
    pub service_fee: Decimal,
    /// Only present on received records that carry a "registered to" clause.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,
    /// The operator's "Transaction number", received records only.
    #[serde(rename = "transactionNumber", default, skip_serializing_if = "Option::is_none")]
    pub transaction_reference: Option<String>,
}

impl Transaction {
    /// Outgoing transfer. The pre-transaction balance is derived here so the
    /// invariant `balance_before = balance_after + amount + service_fee`
    /// holds by construction.
    pub fn transfer(
        amount: Decimal,
        counterparty_phone: String,
        service_fee: Decimal,
        balance_after: Decimal,
    ) -> Self {
        Self {
            id: TransactionId::next(),
            kind: TransactionKind::Transfer,
            amount,
            counterparty_phone,
            timestamp: Local::now(),
            balance_before: balance_after + amount + service_fee,
            balance_after,
            service_fee,
            sender_name: None,
            transaction_reference: None,
        }
    }

    /// Incoming transfer. `balance_before = balance_after - amount` by
    /// construction; the timestamp comes from the message, not the clock.
    pub fn received(
        amount: Decimal,
        counterparty_phone: String,
        sender_name: Option<String>,
        balance_after: Decimal,
        timestamp: DateTime<Local>,
        transaction_reference: String,
    ) -> Self {
        Self {
            id: TransactionId::next(),
            kind: TransactionKind::Received,
            amount,
            counterparty_phone,
            timestamp,
            balance_before: balance_after - amount,
            balance_after,
            service_fee: Decimal::ZERO,
            sender_name,
            transaction_reference: Some(transaction_reference),
        }
    }
}
