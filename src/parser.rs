//! Classification and extraction of Vodafone Cash notification text.
//!
//! Classification runs first: the parser is invoked on every incoming
//! notification, and the overwhelming majority are unrelated, so the cheap
//! substring test short-circuits before any grammar work. For relevant text
//! the grammars are tried in a fixed order, transfer first, then received,
//! and the first structural match wins. Keeping two independent grammars
//! costs up to two match attempts per message but keeps each one simple and
//! testable on its own.

use std::str::FromStr;

use chrono::{DateTime, Local, LocalResult, NaiveDateTime, TimeZone};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use rust_decimal::Decimal;

use crate::error::ParseFailure;
use crate::models::Transaction;

static TRANSFER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?is)EGP\s+(\d+(?:\.\d+)?)\s+has been transferred to number\s+(\d+).*?Service fees are\s+(\d+(?:\.\d+)?)\s+EGP.*?Your current Vodafone Cash account balance is\s+(\d+(?:\.\d+)?)",
    )
    .expect("transfer pattern is valid")
});

static RECEIVED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?is)EGP\s+(\d+(?:\.\d+)?)\s+has been received from number\s+(\d+)(?:;\s*registered to\s+([^.]+))?.*?Your current balance is\s+(\d+(?:\.\d+)?)\s+EGP.*?Transaction date\s+(\d{2}/\d{2}/\d{2})\s+(\d{2}:\d{2}).*?Transaction number:\s*(\d+)",
    )
    .expect("received pattern is valid")
});

static EGYPTIAN_MOBILE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^01[0-9]{9}$").expect("phone pattern is valid"));

/// Turn one notification body into a transaction record.
///
/// Pure function of the input text; the only side effect downstream callers
/// should expect is on their side of the result.
pub fn parse(text: &str) -> Result<Transaction, ParseFailure> {
    if !is_candidate(text) {
        return Err(ParseFailure::NotApplicable);
    }

    if let Some(caps) = TRANSFER_RE.captures(text) {
        return parse_transfer(&caps);
    }
    if let Some(caps) = RECEIVED_RE.captures(text) {
        return parse_received(&caps);
    }

    Err(ParseFailure::UnrecognizedFormat)
}

/// Whether the operator would have sent this text.
///
/// Either branded ("vodafone cash" / "vf-cash") or currency-marked together
/// with a movement verb.
fn is_candidate(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.contains("vodafone cash")
        || lower.contains("vf-cash")
        || (lower.contains("egp")
            && (lower.contains("transferred") || lower.contains("received")))
}

/// Egyptian mobile number format: leading "01" plus nine further digits.
pub fn is_valid_egyptian_mobile(phone: &str) -> bool {
    EGYPTIAN_MOBILE_RE.is_match(phone)
}

fn parse_transfer(caps: &Captures<'_>) -> Result<Transaction, ParseFailure> {
    let amount = transfer_decimal(caps, 1, "amount")?;
    let counterparty_phone = caps[2].to_string();
    let service_fee = transfer_decimal(caps, 3, "service fee")?;
    let balance_after = transfer_decimal(caps, 4, "balance")?;

    Ok(Transaction::transfer(
        amount,
        counterparty_phone,
        service_fee,
        balance_after,
    ))
}

fn parse_received(caps: &Captures<'_>) -> Result<Transaction, ParseFailure> {
    let amount = received_decimal(caps, 1, "amount")?;
    let counterparty_phone = caps[2].to_string();
    let sender_name = caps
        .get(3)
        .map(|m| m.as_str().trim().to_string())
        .filter(|name| !name.is_empty());
    let balance_after = received_decimal(caps, 4, "balance")?;
    let timestamp = received_timestamp(&caps[5], &caps[6])?;
    let transaction_reference = caps[7].to_string();

    Ok(Transaction::received(
        amount,
        counterparty_phone,
        sender_name,
        balance_after,
        timestamp,
        transaction_reference,
    ))
}

fn transfer_decimal(
    caps: &Captures<'_>,
    index: usize,
    field: &str,
) -> Result<Decimal, ParseFailure> {
    let raw = &caps[index];
    Decimal::from_str(raw)
        .map_err(|_| ParseFailure::MalformedTransfer(format!("{field} {raw:?} is not a number")))
}

fn received_decimal(
    caps: &Captures<'_>,
    index: usize,
    field: &str,
) -> Result<Decimal, ParseFailure> {
    let raw = &caps[index];
    Decimal::from_str(raw)
        .map_err(|_| ParseFailure::MalformedReceived(format!("{field} {raw:?} is not a number")))
}

/// Combine the message's "Transaction date MM/DD/YY HH:MM" fields into a
/// local timestamp.
///
/// Month-first ordering is assumed, as the operator formats it. Messages
/// with a day/month-ambiguous date (both fields <= 12) parse without
/// complaint, so a locale change on the operator's side would go unnoticed
/// here.
fn received_timestamp(date: &str, time: &str) -> Result<DateTime<Local>, ParseFailure> {
    let naive = NaiveDateTime::parse_from_str(&format!("{date} {time}"), "%m/%d/%y %H:%M")
        .map_err(|e| {
            ParseFailure::MalformedReceived(format!("transaction date {date:?} {time:?}: {e}"))
        })?;

    match Local.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt),
        // DST fold: take the earlier instant
        LocalResult::Ambiguous(earlier, _) => Ok(earlier),
        LocalResult::None => Err(ParseFailure::MalformedReceived(format!(
            "transaction date {date:?} {time:?} does not exist in local time"
        ))),
    }
}
