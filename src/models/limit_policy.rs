use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::transaction::TransactionKind;

/// Aggregation period for cap accounting, in local time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LimitWindow {
    Daily,
    Monthly,
}

/// The four user-configurable caps, in EGP.
///
/// The fields are independent: a monthly cap below its daily counterpart is
/// odd but accepted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LimitPolicy {
    pub daily_transfer_cap: Decimal,
    pub monthly_transfer_cap: Decimal,
    pub daily_receive_cap: Decimal,
    pub monthly_receive_cap: Decimal,
}

impl LimitPolicy {
    /// 5,000 EGP
    pub const DEFAULT_DAILY_TRANSFER_CAP: Decimal = Decimal::from_parts(5_000, 0, 0, false, 0);
    /// 50,000 EGP
    pub const DEFAULT_MONTHLY_TRANSFER_CAP: Decimal = Decimal::from_parts(50_000, 0, 0, false, 0);
    /// 10,000 EGP
    pub const DEFAULT_DAILY_RECEIVE_CAP: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);
    /// 100,000 EGP
    pub const DEFAULT_MONTHLY_RECEIVE_CAP: Decimal = Decimal::from_parts(100_000, 0, 0, false, 0);

    pub fn cap_for(&self, kind: TransactionKind, window: LimitWindow) -> Decimal {
        match (kind, window) {
            (TransactionKind::Transfer, LimitWindow::Daily) => self.daily_transfer_cap,
            (TransactionKind::Transfer, LimitWindow::Monthly) => self.monthly_transfer_cap,
            (TransactionKind::Received, LimitWindow::Daily) => self.daily_receive_cap,
            (TransactionKind::Received, LimitWindow::Monthly) => self.monthly_receive_cap,
        }
    }

    pub fn set_cap(&mut self, kind: TransactionKind, window: LimitWindow, value: Decimal) {
        match (kind, window) {
            (TransactionKind::Transfer, LimitWindow::Daily) => self.daily_transfer_cap = value,
            (TransactionKind::Transfer, LimitWindow::Monthly) => self.monthly_transfer_cap = value,
            (TransactionKind::Received, LimitWindow::Daily) => self.daily_receive_cap = value,
            (TransactionKind::Received, LimitWindow::Monthly) => self.monthly_receive_cap = value,
        }
    }
}

impl Default for LimitPolicy {
    fn default() -> Self {
        Self {
            daily_transfer_cap: Self::DEFAULT_DAILY_TRANSFER_CAP,
            monthly_transfer_cap: Self::DEFAULT_MONTHLY_TRANSFER_CAP,
            daily_receive_cap: Self::DEFAULT_DAILY_RECEIVE_CAP,
            monthly_receive_cap: Self::DEFAULT_MONTHLY_RECEIVE_CAP,
        }
    }
}
