#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use chrono::{DateTime, Local};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::sync::mpsc;

use vfcash_tracker::{
    KeyValueStore, LimitPolicy, MemoryStore, StorageError, SyncNotifier, Transaction,
};

/// The operator's transfer notification, verbatim.
pub const TRANSFER_SMS: &str = "EGP 150.00 has been transferred to number 01012345678. \
     Service fees are 1.50 EGP. Your current Vodafone Cash account balance is 848.50";

/// A received notification with the optional "registered to" clause.
pub const RECEIVED_SMS: &str = "EGP 500.00 has been received from number 01098765432; \
     registered to Ahmed Hassan. Your current balance is 1348.50 EGP. \
     Transaction date 03/15/24 14:30. Transaction number: 784512963";

/// A received notification without a sender name.
pub const RECEIVED_NO_NAME_SMS: &str = "EGP 75.25 has been received from number 01155512345. \
     Your current balance is 920.75 EGP. Transaction date 01/05/25 09:12. \
     Transaction number: 112233445";

/// Structurally a received message, but February 30th does not exist.
pub const RECEIVED_BAD_DATE_SMS: &str = "EGP 75.25 has been received from number 01155512345. \
     Your current balance is 920.75 EGP. Transaction date 02/30/24 09:12. \
     Transaction number: 112233445";

/// Helper to build an outgoing transfer stamped with the current time.
pub fn transfer_of(amount: Decimal) -> Transaction {
    Transaction::transfer(amount, "01012345678".to_string(), dec!(1.00), dec!(500.00))
}

/// Helper to build a transfer with an explicit timestamp.
pub fn transfer_at(amount: Decimal, timestamp: DateTime<Local>) -> Transaction {
    Transaction {
        timestamp,
        ..transfer_of(amount)
    }
}

/// Helper to build an incoming transfer with an explicit timestamp.
pub fn received_at(amount: Decimal, timestamp: DateTime<Local>) -> Transaction {
    Transaction::received(
        amount,
        "01098765432".to_string(),
        Some("Test Sender".to_string()),
        dec!(900.00),
        timestamp,
        "123456".to_string(),
    )
}

/// Helper to build an incoming transfer stamped with the current time.
pub fn received_of(amount: Decimal) -> Transaction {
    received_at(amount, Local::now())
}

/// Store wrapper that counts writes and can be told to start failing them.
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryStore,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
}

impl CountingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl KeyValueStore for CountingStore {
    fn get_string(&self, key: &str, default: &str) -> vfcash_tracker::Result<String> {
        self.inner.get_string(key, default)
    }

    fn put_string(&self, key: &str, value: &str) -> vfcash_tracker::Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("writes disabled".into()));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.put_string(key, value)
    }
}

/// Everything the tracker offers to the dashboard.
#[derive(Debug)]
pub enum SyncEvent {
    Recorded(Transaction),
    Snapshot(Vec<Transaction>),
    Policy(LimitPolicy),
}

/// Notifier that forwards every push onto a channel for assertions.
pub struct ChannelNotifier {
    sender: mpsc::UnboundedSender<SyncEvent>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SyncEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl SyncNotifier for ChannelNotifier {
    fn transaction_recorded(&self, transaction: Transaction) -> anyhow::Result<()> {
        self.sender
            .send(SyncEvent::Recorded(transaction))
            .map_err(|e| anyhow::anyhow!("channel closed: {e}"))
    }

    fn ledger_snapshot(&self, transactions: Vec<Transaction>) -> anyhow::Result<()> {
        self.sender
            .send(SyncEvent::Snapshot(transactions))
            .map_err(|e| anyhow::anyhow!("channel closed: {e}"))
    }

    fn policy_updated(&self, policy: LimitPolicy) -> anyhow::Result<()> {
        self.sender
            .send(SyncEvent::Policy(policy))
            .map_err(|e| anyhow::anyhow!("channel closed: {e}"))
    }
}

/// Notifier whose dashboard is permanently unreachable.
pub struct FailingNotifier;

impl SyncNotifier for FailingNotifier {
    fn transaction_recorded(&self, _transaction: Transaction) -> anyhow::Result<()> {
        anyhow::bail!("dashboard offline")
    }

    fn ledger_snapshot(&self, _transactions: Vec<Transaction>) -> anyhow::Result<()> {
        anyhow::bail!("dashboard offline")
    }

    fn policy_updated(&self, _policy: LimitPolicy) -> anyhow::Result<()> {
        anyhow::bail!("dashboard offline")
    }
}
