//! Fire-and-forget boundary to the remote dashboard.

use crate::models::{LimitPolicy, Transaction};

/// Collaborator that pushes records to a remote dashboard.
///
/// The outcome never gates ledger or limits state: the tracker logs a
/// failed push and moves on; there is no retry queue. Implementations
/// typically serialize with serde and POST; every transaction field and
/// all four caps derive `Serialize`, so the whole surface is
/// representable on the wire.
pub trait SyncNotifier: Send + Sync + 'static {
    /// One newly recorded transaction.
    fn transaction_recorded(&self, transaction: Transaction) -> anyhow::Result<()>;

    /// The full ledger, newest first.
    fn ledger_snapshot(&self, transactions: Vec<Transaction>) -> anyhow::Result<()>;

    /// The current caps.
    fn policy_updated(&self, policy: LimitPolicy) -> anyhow::Result<()>;
}

/// Notifier for hosts without a dashboard.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl SyncNotifier for NoopNotifier {
    fn transaction_recorded(&self, _transaction: Transaction) -> anyhow::Result<()> {
        Ok(())
    }

    fn ledger_snapshot(&self, _transactions: Vec<Transaction>) -> anyhow::Result<()> {
        Ok(())
    }

    fn policy_updated(&self, _policy: LimitPolicy) -> anyhow::Result<()> {
        Ok(())
    }
}
