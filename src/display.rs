//! Presentation rules shared by the list and detail views.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;

use crate::shipment::present;
use crate::workflow::StatusBucket;

pub const PLACEHOLDER: &str = "-";

/// Customer mailbox fragments that map to a fixed debtor label.
const KNOWN_DEBTORS: &[(&str, &str)] = &[
    ("hittra", "Hittra"),
    ("gmail", "Gmail"),
    ("pgm", "Pgm"),
    ("pure-and-noble", "Pure-And-Noble"),
];

pub fn text(value: Option<&str>) -> String {
    present(value).unwrap_or(PLACEHOLDER).to_string()
}

pub fn number(value: Option<f64>) -> String {
    value.map(format_number).unwrap_or_else(|| PLACEHOLDER.to_string())
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

pub fn debtor_from_email(email: Option<&str>) -> String {
    let Some(email) = present(email).filter(|email| !email.is_empty()) else {
        return PLACEHOLDER.to_string();
    };
    KNOWN_DEBTORS
        .iter()
        .find(|(fragment, _)| email.contains(fragment))
        .map(|(_, label)| (*label).to_string())
        .unwrap_or_else(|| email.split('@').next().unwrap_or(email).to_string())
}

/// `YYYY-MM-DD` (or a full timestamp) as `dd-mm-yyyy`. Text that is not a date
/// is shown as-is.
pub fn date(value: Option<&str>) -> String {
    let Some(raw) = present(value).filter(|raw| !raw.trim().is_empty()) else {
        return PLACEHOLDER.to_string();
    };
    let trimmed = raw.trim();
    let parsed = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(trimmed).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        });
    match parsed {
        Some(day) => day.format("%d-%m-%Y").to_string(),
        None => raw.to_string(),
    }
}

/// `00:00` is what upstream writes when no time was given.
pub fn time(value: Option<&str>) -> String {
    match present(value).map(str::trim) {
        None | Some("") | Some("00:00") => PLACEHOLDER.to_string(),
        Some(time) => time.to_string(),
    }
}

pub fn date_time(day: Option<&str>, at: Option<&str>) -> String {
    let day = date(day);
    let at = time(at);
    match (day.as_str(), at.as_str()) {
        (PLACEHOLDER, PLACEHOLDER) => PLACEHOLDER.to_string(),
        (_, PLACEHOLDER) => day,
        _ => format!("{day} - {at}"),
    }
}

/// Ingestion time as `dd-mm-yyyy, HH:MM` (UTC).
pub fn timestamp(value: NaiveDateTime) -> String {
    value.format("%d-%m-%Y, %H:%M").to_string()
}

pub fn rfc3339(value: NaiveDateTime) -> String {
    DateTime::<Utc>::from_naive_utc_and_offset(value, Utc).to_rfc3339()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeVariant {
    Default,
    Secondary,
    Outline,
}

pub fn badge(status: &str) -> BadgeVariant {
    match StatusBucket::of(status) {
        Some(StatusBucket::InProgress) => BadgeVariant::Secondary,
        Some(StatusBucket::Processed) => BadgeVariant::Outline,
        Some(StatusBucket::New) | None => BadgeVariant::Default,
    }
}
