mod common;

use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use common::{received_of, transfer_of};
use vfcash_tracker::{
    KeyValueStore, LimitPolicy, LimitWindow, LimitsEngine, MemoryStore, TransactionKind,
    TransactionLedger,
};

fn empty_ledger() -> TransactionLedger<MemoryStore> {
    TransactionLedger::load(MemoryStore::new())
}

#[test]
fn first_use_defaults_and_writes_them_back() {
    let store = Arc::new(MemoryStore::new());
    let engine = LimitsEngine::load(Arc::clone(&store));

    assert_eq!(engine.policy(), &LimitPolicy::default());
    assert_eq!(engine.policy().daily_transfer_cap, dec!(5000));
    assert_eq!(engine.policy().monthly_transfer_cap, dec!(50000));
    assert_eq!(engine.policy().daily_receive_cap, dec!(10000));
    assert_eq!(engine.policy().monthly_receive_cap, dec!(100000));

    // defaults are persisted on first use
    assert_eq!(store.get_string("daily_transfer_limit", "").unwrap(), "5000");
    assert_eq!(store.get_string("monthly_receive_limit", "").unwrap(), "100000");
}

#[test]
fn preconfigured_caps_are_respected() {
    let store = Arc::new(MemoryStore::new());
    store.put_string("daily_transfer_limit", "3000").unwrap();

    let engine = LimitsEngine::load(store);
    assert_eq!(engine.policy().daily_transfer_cap, dec!(3000));
    // the untouched caps still default
    assert_eq!(engine.policy().daily_receive_cap, dec!(10000));
}

#[test]
fn unparseable_stored_cap_falls_back_to_default() {
    let store = Arc::new(MemoryStore::new());
    store.put_string("monthly_transfer_limit", "a lot").unwrap();

    let engine = LimitsEngine::load(store);
    assert_eq!(engine.policy().monthly_transfer_cap, dec!(50000));
}

#[test]
fn set_cap_persists_across_reload() {
    let store = Arc::new(MemoryStore::new());

    let mut engine = LimitsEngine::load(Arc::clone(&store));
    engine
        .set_cap(TransactionKind::Transfer, LimitWindow::Daily, dec!(2500))
        .unwrap();
    drop(engine);

    let reloaded = LimitsEngine::load(store);
    assert_eq!(reloaded.policy().daily_transfer_cap, dec!(2500));
}

#[test]
fn remaining_subtracts_current_usage() {
    let engine = LimitsEngine::load(MemoryStore::new());
    let mut ledger = empty_ledger();

    ledger.append(transfer_of(dec!(1200))).unwrap();
    ledger.append(transfer_of(dec!(800))).unwrap();

    assert_eq!(
        engine.remaining(TransactionKind::Transfer, LimitWindow::Daily, &ledger),
        dec!(3000)
    );
    assert_eq!(
        engine.remaining(TransactionKind::Transfer, LimitWindow::Monthly, &ledger),
        dec!(48000)
    );
}

#[test]
fn remaining_never_goes_negative() {
    let engine = LimitsEngine::load(MemoryStore::new());
    let mut ledger = empty_ledger();

    ledger.append(transfer_of(dec!(6000))).unwrap();

    assert_eq!(
        engine.remaining(TransactionKind::Transfer, LimitWindow::Daily, &ledger),
        Decimal::ZERO
    );
    assert_eq!(
        engine.remaining(TransactionKind::Transfer, LimitWindow::Monthly, &ledger),
        dec!(44000)
    );
}

#[test]
fn usage_percentage_reflects_used_share() {
    let engine = LimitsEngine::load(MemoryStore::new());
    let mut ledger = empty_ledger();

    ledger.append(transfer_of(dec!(2500))).unwrap();

    assert_eq!(
        engine.usage_percentage(TransactionKind::Transfer, LimitWindow::Daily, &ledger),
        dec!(50)
    );
    assert_eq!(
        engine.usage_percentage(TransactionKind::Transfer, LimitWindow::Monthly, &ledger),
        dec!(5)
    );
    assert_eq!(
        engine.usage_percentage(TransactionKind::Received, LimitWindow::Daily, &ledger),
        Decimal::ZERO
    );
}

#[test]
fn zero_cap_yields_zero_percent_not_a_fault() {
    let mut engine = LimitsEngine::load(MemoryStore::new());
    let mut ledger = empty_ledger();

    engine
        .set_cap(TransactionKind::Transfer, LimitWindow::Daily, Decimal::ZERO)
        .unwrap();
    ledger.append(transfer_of(dec!(100))).unwrap();

    assert_eq!(
        engine.usage_percentage(TransactionKind::Transfer, LimitWindow::Daily, &ledger),
        Decimal::ZERO
    );
    assert_eq!(
        engine.remaining(TransactionKind::Transfer, LimitWindow::Daily, &ledger),
        Decimal::ZERO
    );
}

#[test]
fn within_limits_checks_both_windows() {
    let mut engine = LimitsEngine::load(MemoryStore::new());
    let ledger = empty_ledger();

    assert!(engine.is_within_limits(TransactionKind::Transfer, dec!(5000), &ledger));
    assert!(!engine.is_within_limits(TransactionKind::Transfer, dec!(5000.01), &ledger));

    // a tight monthly cap binds even when the daily one would allow it
    engine
        .set_cap(TransactionKind::Transfer, LimitWindow::Monthly, dec!(100))
        .unwrap();
    assert!(!engine.is_within_limits(TransactionKind::Transfer, dec!(200), &ledger));
    assert!(engine.is_within_limits(TransactionKind::Transfer, dec!(100), &ledger));
}

#[test]
fn kinds_are_accounted_independently() {
    let engine = LimitsEngine::load(MemoryStore::new());
    let mut ledger = empty_ledger();

    ledger.append(received_of(dec!(9999))).unwrap();

    assert_eq!(
        engine.remaining(TransactionKind::Transfer, LimitWindow::Daily, &ledger),
        dec!(5000)
    );
    assert_eq!(
        engine.remaining(TransactionKind::Received, LimitWindow::Daily, &ledger),
        dec!(1)
    );
}

#[test]
fn record_for_tracking_tolerates_over_cap_ledgers() {
    let engine = LimitsEngine::load(MemoryStore::new());
    let mut ledger = empty_ledger();

    let big = transfer_of(dec!(99999));
    ledger.append(big.clone()).unwrap();

    // only emits a warning; nothing to unwind, nothing returned
    engine.record_for_tracking(&big, &ledger);
}

#[test]
fn summary_reports_all_four_lines() {
    let engine = LimitsEngine::load(MemoryStore::new());
    let mut ledger = empty_ledger();
    ledger.append(transfer_of(dec!(150.00))).unwrap();

    let summary = engine.summary(&ledger);
    let lines: Vec<&str> = summary.lines().collect();

    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("Daily Transfer: 150.00/5000 EGP"));
    assert!(lines[0].contains("(3.0%)"));
    assert!(lines[1].starts_with("Monthly Transfer:"));
    assert!(lines[2].starts_with("Daily Receive: 0/10000 EGP (0.0%)"));
    assert!(lines[3].starts_with("Monthly Receive:"));
}
