use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use eyre::WrapErr;
use serde::{Deserialize, Serialize};

use super::constants::{COOLDOWN_WINDOW_SECS, SECS_PER_HOUR, SECS_PER_MINUTE};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CooldownDecision {
    pub eligible: bool,
    pub remaining: Duration,
    pub formatted: String,
}

impl CooldownDecision {
    fn ready() -> Self {
        Self::with_remaining(0, true)
    }

    fn with_remaining(remaining_seconds: u64, eligible: bool) -> Self {
        Self {
            eligible,
            remaining: Duration::from_secs(remaining_seconds),
            formatted: format_remaining(remaining_seconds),
        }
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.remaining.as_secs()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CooldownReport {
    pub eligible: bool,
    pub remaining_seconds: u64,
    pub formatted: String,
}

impl From<CooldownDecision> for CooldownReport {
    fn from(decision: CooldownDecision) -> Self {
        Self {
            eligible: decision.eligible,
            remaining_seconds: decision.remaining_seconds(),
            formatted: decision.formatted,
        }
    }
}

/// A `last_claimed_at` later than `now` refuses the claim with the full window remaining.
pub fn evaluate(last_claimed_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> CooldownDecision {
    let Some(last_claimed_at) = last_claimed_at else {
        return CooldownDecision::ready();
    };

    let elapsed = now.signed_duration_since(last_claimed_at);

    if elapsed < TimeDelta::zero() {
        return CooldownDecision::with_remaining(COOLDOWN_WINDOW_SECS, false);
    }

    let window = TimeDelta::seconds(COOLDOWN_WINDOW_SECS as i64);

    if elapsed >= window {
        return CooldownDecision::ready();
    }

    // num_seconds truncates toward zero, remaining is positive here
    let remaining_seconds = (window - elapsed).num_seconds() as u64;

    CooldownDecision::with_remaining(remaining_seconds, false)
}

// hours are not wrapped
pub fn format_remaining(seconds: u64) -> String {
    let hours = seconds / SECS_PER_HOUR;
    let minutes = (seconds % SECS_PER_HOUR) / SECS_PER_MINUTE;
    let seconds = seconds % SECS_PER_MINUTE;

    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

pub fn evaluate_iso(last_claimed_at: Option<&str>, now: Option<&str>) -> eyre::Result<CooldownReport> {
    let last_claimed_at = last_claimed_at.map(parse_timestamp).transpose()?;
    let now = match now {
        Some(now) => parse_timestamp(now)?,
        None => Utc::now(),
    };

    Ok(evaluate(last_claimed_at, now).into())
}

// offset-less timestamps are read as UTC
pub fn parse_timestamp(value: &str) -> eyre::Result<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .wrap_err_with(|| format!("Invalid timestamp `{value}`"))
}
