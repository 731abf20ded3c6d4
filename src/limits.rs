//! Cap accounting over the ledger's daily and monthly windows.
//!
//! Advisory only. A notification reports a movement that already happened
//! on the operator's network, so nothing here has the authority to reject
//! a record; breaches surface as warnings and as numbers the host can show.

use chrono::{Datelike, Local};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::error::Result;
use crate::ledger::TransactionLedger;
use crate::models::{LimitPolicy, LimitWindow, Transaction, TransactionKind};
use crate::storage::KeyValueStore;

const DAILY_TRANSFER_KEY: &str = "daily_transfer_limit";
const MONTHLY_TRANSFER_KEY: &str = "monthly_transfer_limit";
const DAILY_RECEIVE_KEY: &str = "daily_receive_limit";
const MONTHLY_RECEIVE_KEY: &str = "monthly_receive_limit";

fn cap_key(kind: TransactionKind, window: LimitWindow) -> &'static str {
    match (kind, window) {
        (TransactionKind::Transfer, LimitWindow::Daily) => DAILY_TRANSFER_KEY,
        (TransactionKind::Transfer, LimitWindow::Monthly) => MONTHLY_TRANSFER_KEY,
        (TransactionKind::Received, LimitWindow::Daily) => DAILY_RECEIVE_KEY,
        (TransactionKind::Received, LimitWindow::Monthly) => MONTHLY_RECEIVE_KEY,
    }
}

/// Holds the configured caps and answers allowance queries against a
/// ledger. Stateless beyond the policy itself: every figure is recomputed
/// from the ledger's current contents on demand.
pub struct LimitsEngine<S: KeyValueStore> {
    store: S,
    policy: LimitPolicy,
}

impl<S: KeyValueStore> LimitsEngine<S> {
    /// Hydrate the policy from its own namespace, writing the documented
    /// defaults back on first use so the stored form is always complete.
    pub fn load(store: S) -> Self {
        let defaults = LimitPolicy::default();
        let policy = LimitPolicy {
            daily_transfer_cap: read_cap(&store, DAILY_TRANSFER_KEY, defaults.daily_transfer_cap),
            monthly_transfer_cap: read_cap(
                &store,
                MONTHLY_TRANSFER_KEY,
                defaults.monthly_transfer_cap,
            ),
            daily_receive_cap: read_cap(&store, DAILY_RECEIVE_KEY, defaults.daily_receive_cap),
            monthly_receive_cap: read_cap(
                &store,
                MONTHLY_RECEIVE_KEY,
                defaults.monthly_receive_cap,
            ),
        };
        Self { store, policy }
    }

    pub fn policy(&self) -> &LimitPolicy {
        &self.policy
    }

    /// Change one cap and persist it before the in-memory policy moves.
    pub fn set_cap(
        &mut self,
        kind: TransactionKind,
        window: LimitWindow,
        value: Decimal,
    ) -> Result<()> {
        self.store.put_string(cap_key(kind, window), &value.to_string())?;
        self.policy.set_cap(kind, window, value);
        debug!(?kind, ?window, %value, "cap updated");
        Ok(())
    }

    /// Amount accumulated in the current window for `kind`.
    pub fn used<L: KeyValueStore>(
        &self,
        kind: TransactionKind,
        window: LimitWindow,
        ledger: &TransactionLedger<L>,
    ) -> Decimal {
        let now = Local::now();
        match window {
            LimitWindow::Daily => ledger.sum_by_kind_for_day(kind, now.date_naive()),
            LimitWindow::Monthly => ledger.sum_by_kind_for_month(kind, now.year(), now.month()),
        }
    }

    /// Allowance left in the current window, floored at zero.
    pub fn remaining<L: KeyValueStore>(
        &self,
        kind: TransactionKind,
        window: LimitWindow,
        ledger: &TransactionLedger<L>,
    ) -> Decimal {
        (self.policy.cap_for(kind, window) - self.used(kind, window, ledger)).max(Decimal::ZERO)
    }

    /// Used share of the cap, in percent. A zero cap reads as "no
    /// allowance configured" and yields 0 rather than a division fault.
    pub fn usage_percentage<L: KeyValueStore>(
        &self,
        kind: TransactionKind,
        window: LimitWindow,
        ledger: &TransactionLedger<L>,
    ) -> Decimal {
        let cap = self.policy.cap_for(kind, window);
        if cap.is_zero() {
            return Decimal::ZERO;
        }
        self.used(kind, window, ledger) / cap * Decimal::ONE_HUNDRED
    }

    /// Advisory pre-check: would `amount` still fit in both windows, as
    /// they stand right now? The answer never gates an append.
    pub fn is_within_limits<L: KeyValueStore>(
        &self,
        kind: TransactionKind,
        amount: Decimal,
        ledger: &TransactionLedger<L>,
    ) -> bool {
        amount <= self.remaining(kind, LimitWindow::Daily, ledger)
            && amount <= self.remaining(kind, LimitWindow::Monthly, ledger)
    }

    /// Post-append observability hook.
    ///
    /// The record is already in the ledger; this only raises a signal when
    /// the accumulated usage now exceeds a cap. Nothing is undone or
    /// flagged on the stored record.
    pub fn record_for_tracking<L: KeyValueStore>(
        &self,
        transaction: &Transaction,
        ledger: &TransactionLedger<L>,
    ) {
        let kind = transaction.kind;
        let daily_used = self.used(kind, LimitWindow::Daily, ledger);
        let monthly_used = self.used(kind, LimitWindow::Monthly, ledger);
        let daily_cap = self.policy.cap_for(kind, LimitWindow::Daily);
        let monthly_cap = self.policy.cap_for(kind, LimitWindow::Monthly);

        if daily_used > daily_cap || monthly_used > monthly_cap {
            warn!(
                ?kind,
                amount = %transaction.amount,
                %daily_used,
                %daily_cap,
                %monthly_used,
                %monthly_cap,
                "recorded transaction exceeds a configured cap"
            );
        } else {
            debug!(
                ?kind,
                amount = %transaction.amount,
                remaining_daily = %(daily_cap - daily_used),
                "cap usage updated"
            );
        }
    }

    /// Four-line usage report, one line per kind and window.
    pub fn summary<L: KeyValueStore>(&self, ledger: &TransactionLedger<L>) -> String {
        format!(
            "Daily Transfer: {}/{} EGP ({:.1}%)\n\
             Monthly Transfer: {}/{} EGP ({:.1}%)\n\
             Daily Receive: {}/{} EGP ({:.1}%)\n\
             Monthly Receive: {}/{} EGP ({:.1}%)",
            self.used(TransactionKind::Transfer, LimitWindow::Daily, ledger),
            self.policy.daily_transfer_cap,
            self.usage_percentage(TransactionKind::Transfer, LimitWindow::Daily, ledger),
            self.used(TransactionKind::Transfer, LimitWindow::Monthly, ledger),
            self.policy.monthly_transfer_cap,
            self.usage_percentage(TransactionKind::Transfer, LimitWindow::Monthly, ledger),
            self.used(TransactionKind::Received, LimitWindow::Daily, ledger),
            self.policy.daily_receive_cap,
            self.usage_percentage(TransactionKind::Received, LimitWindow::Daily, ledger),
            self.used(TransactionKind::Received, LimitWindow::Monthly, ledger),
            self.policy.monthly_receive_cap,
            self.usage_percentage(TransactionKind::Received, LimitWindow::Monthly, ledger),
        )
    }
}

fn read_cap<S: KeyValueStore>(store: &S, key: &str, default: Decimal) -> Decimal {
    match store.get_string(key, "") {
        Ok(raw) if raw.is_empty() => {
            if let Err(e) = store.put_string(key, &default.to_string()) {
                warn!(key, error = %e, "could not persist default cap");
            }
            default
        }
        Ok(raw) => match raw.parse::<Decimal>() {
            Ok(value) => value,
            Err(_) => {
                warn!(key, %raw, "stored cap is not a number, using default");
                default
            }
        },
        Err(e) => {
            warn!(key, error = %e, "stored cap could not be read, using default");
            default
        }
    }
}
