//! Composition root wiring the parser, ledger, limits engine, and sync
//! collaborator together.

use std::sync::Arc;

use rust_decimal::Decimal;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::{ParseFailure, Result};
use crate::ledger::TransactionLedger;
use crate::limits::LimitsEngine;
use crate::models::{LimitPolicy, LimitWindow, Transaction, TransactionKind};
use crate::parser;
use crate::storage::KeyValueStore;
use crate::sync::SyncNotifier;

/// What [`CashTracker::submit`] did with one piece of incoming text.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The text parsed and the record is in the ledger.
    Recorded(Transaction),
    /// The text is not a Vodafone Cash notification; nothing happened.
    Ignored,
    /// The text looked relevant but could not be parsed; nothing was
    /// stored, and the failure says why.
    Rejected(ParseFailure),
}

/// Process-wide tracker state, explicitly constructed and owned by the
/// host rather than reached through globals.
///
/// A single writer lock serializes the ledger's load-modify-persist append
/// path so two near-simultaneous notifications cannot lose an update;
/// reads take the shared side and observe either the pre- or post-append
/// sequence, never a partial one. Methods that push to the dashboard spawn
/// onto the ambient tokio runtime, so the tracker must live inside one.
pub struct CashTracker<S: KeyValueStore, N: SyncNotifier> {
    ledger: Arc<RwLock<TransactionLedger<S>>>,
    limits: Arc<RwLock<LimitsEngine<S>>>,
    notifier: Arc<N>,
}

impl<S: KeyValueStore, N: SyncNotifier> CashTracker<S, N> {
    /// Hydrate the ledger and the cap policy from their stores and wire in
    /// the dashboard collaborator.
    ///
    /// The two stores are separate namespaces; they may share a physical
    /// substrate as long as keys do not collide.
    pub fn new(ledger_store: S, limits_store: S, notifier: N) -> Self {
        Self {
            ledger: Arc::new(RwLock::new(TransactionLedger::load(ledger_store))),
            limits: Arc::new(RwLock::new(LimitsEngine::load(limits_store))),
            notifier: Arc::new(notifier),
        }
    }

    /// Cheap handle to the same tracker for sharing across tasks.
    pub fn clone_handle(&self) -> Self {
        Self {
            ledger: Arc::clone(&self.ledger),
            limits: Arc::clone(&self.limits),
            notifier: Arc::clone(&self.notifier),
        }
    }

    /// Ingestion boundary: safe to call with arbitrary, mostly irrelevant
    /// text.
    ///
    /// Unrelated text is skipped silently. Relevant-but-unparseable text is
    /// reported in the outcome and logged with the raw text kept for
    /// replay, but is never an error. Only a failed persist is: the append
    /// did not happen and the caller may retry.
    pub async fn submit(&self, raw_text: &str) -> Result<SubmitOutcome> {
        let transaction = match parser::parse(raw_text) {
            Ok(transaction) => transaction,
            Err(ParseFailure::NotApplicable) => {
                debug!("ignoring unrelated notification text");
                return Ok(SubmitOutcome::Ignored);
            }
            Err(failure) => {
                warn!(%failure, text = raw_text, "relevant notification could not be parsed");
                return Ok(SubmitOutcome::Rejected(failure));
            }
        };

        if !parser::is_valid_egyptian_mobile(&transaction.counterparty_phone) {
            warn!(
                phone = %transaction.counterparty_phone,
                "counterparty is not an Egyptian mobile number"
            );
        }

        {
            let mut ledger = self.ledger.write().await;
            ledger.append(transaction.clone())?;
        }

        {
            let ledger = self.ledger.read().await;
            let limits = self.limits.read().await;
            limits.record_for_tracking(&transaction, &ledger);
        }

        let notifier = Arc::clone(&self.notifier);
        let pushed = transaction.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier.transaction_recorded(pushed) {
                warn!(error = %e, "dashboard push failed");
            }
        });

        Ok(SubmitOutcome::Recorded(transaction))
    }

    pub async fn all_transactions(&self) -> Vec<Transaction> {
        self.ledger.read().await.all()
    }

    pub async fn latest(&self) -> Option<Transaction> {
        self.ledger.read().await.latest()
    }

    pub async fn transaction_count(&self) -> usize {
        self.ledger.read().await.len()
    }

    /// Empty the ledger wholesale and persist the empty state.
    pub async fn clear_transactions(&self) -> Result<()> {
        self.ledger.write().await.clear()
    }

    pub async fn policy(&self) -> LimitPolicy {
        self.limits.read().await.policy().clone()
    }

    /// Change one cap, persist it, and offer the new policy to the
    /// dashboard.
    pub async fn set_cap(
        &self,
        kind: TransactionKind,
        window: LimitWindow,
        value: Decimal,
    ) -> Result<()> {
        let policy = {
            let mut limits = self.limits.write().await;
            limits.set_cap(kind, window, value)?;
            limits.policy().clone()
        };

        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            if let Err(e) = notifier.policy_updated(policy) {
                warn!(error = %e, "dashboard cap push failed");
            }
        });

        Ok(())
    }

    pub async fn remaining(&self, kind: TransactionKind, window: LimitWindow) -> Decimal {
        let ledger = self.ledger.read().await;
        self.limits.read().await.remaining(kind, window, &ledger)
    }

    pub async fn usage_percentage(&self, kind: TransactionKind, window: LimitWindow) -> Decimal {
        let ledger = self.ledger.read().await;
        self.limits
            .read()
            .await
            .usage_percentage(kind, window, &ledger)
    }

    /// Advisory: would `amount` still fit in both of its kind's windows?
    pub async fn is_within_limits(&self, kind: TransactionKind, amount: Decimal) -> bool {
        let ledger = self.ledger.read().await;
        self.limits
            .read()
            .await
            .is_within_limits(kind, amount, &ledger)
    }

    pub async fn limits_summary(&self) -> String {
        let ledger = self.ledger.read().await;
        self.limits.read().await.summary(&ledger)
    }

    /// Offer the full ledger and the current caps to the dashboard,
    /// fire-and-forget.
    pub async fn sync_all(&self) {
        let transactions = self.ledger.read().await.all();
        let policy = self.limits.read().await.policy().clone();

        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            if let Err(e) = notifier.ledger_snapshot(transactions) {
                warn!(error = %e, "dashboard ledger push failed");
            }
            if let Err(e) = notifier.policy_updated(policy) {
                warn!(error = %e, "dashboard cap push failed");
            }
        });
    }
}
