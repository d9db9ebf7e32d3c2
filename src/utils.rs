use std::{collections::HashSet, time::Duration};

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, TimeDelta, Utc};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};

pub fn generate_code_verifier() -> String {
    random_alphanumeric(128)
}

pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Opaque value echoed back by the authorization server on the callback.
pub fn generate_state() -> String {
    random_alphanumeric(16)
}

fn random_alphanumeric(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Parses `<n><unit>` durations as accepted on the command line.
///
/// Units: `ms`, `s`, `m`, `h`, `d`. A bare number is read as seconds.
pub fn parse_duration(value: &str) -> Result<Duration, String> {
    let value = value.trim();
    let split = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    let (number, unit) = value.split_at(split);

    let n: u64 = number
        .parse()
        .map_err(|_| format!("invalid duration '{value}': expected e.g. 31d, 12h, 30s"))?;

    let factor = match unit {
        "ms" => return Ok(Duration::from_millis(n)),
        "" | "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        "d" => 60 * 60 * 24,
        other => return Err(format!("invalid duration unit '{other}' in '{value}'")),
    };

    n.checked_mul(factor)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration '{value}' is too large"))
}

/// One artist name per line, matched exactly later on. Empty lines are ignored.
pub fn parse_blacklist(content: &str) -> HashSet<String> {
    content
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

/// e.g. `September 14, 2026`
pub fn human_date(time: DateTime<Utc>) -> String {
    time.format("%B %-d, %Y").to_string()
}

/// Shortest exact `<n><unit>` form, e.g. `31d`, `12h`, `90m`.
pub fn human_duration(delta: TimeDelta) -> String {
    let secs = delta.num_seconds();
    let units = [(86_400, "d"), (3600, "h"), (60, "m")];
    match units.iter().find(|(size, _)| secs != 0 && secs % size == 0) {
        Some((size, unit)) => format!("{}{}", secs / size, unit),
        None => format!("{secs}s"),
    }
}
