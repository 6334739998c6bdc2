//! xs:duration / xs:dateTime parsing and large-timestamp scaling.

use chrono::DateTime;
use regex::Regex;
use std::sync::OnceLock;

/// `xs:duration` component multipliers, in seconds. Matches the reference
/// implementation's sscanf-driven parser: years and months use average
/// (non-calendar-exact) lengths, since a duration has no anchor date to
/// resolve calendar months/years against.
const YEAR_SECONDS: f64 = 31_556_926.0;
const MONTH_SECONDS: f64 = 2_629_743.83;
const DAY_SECONDS: f64 = 86_400.0;
const HOUR_SECONDS: f64 = 3_600.0;
const MINUTE_SECONDS: f64 = 60.0;

fn duration_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^P(?:(?P<y>\d+(?:\.\d+)?)Y)?(?:(?P<mo>\d+(?:\.\d+)?)M)?(?:(?P<d>\d+(?:\.\d+)?)D)?(?:T(?:(?P<h>\d+(?:\.\d+)?)H)?(?:(?P<mi>\d+(?:\.\d+)?)M)?(?:(?P<s>\d+(?:\.\d+)?)S)?)?$",
        )
        .expect("static regex is valid")
    })
}

/// Parses `P[nY][nM][nD][T[nH][nM][nS]]` (weeks and combined date/time forms
/// are not supported, per spec) into milliseconds. Returns `-1` on failure
/// rather than an `Err` — this mirrors the sentinel the MPD parser relies on
/// to decide whether a duration attribute was even present, and keeps parse
/// failures non-fatal for attributes the caller treats as optional.
pub fn parse_xs_duration(value: &str) -> i64 {
    if !value.starts_with('P') {
        return -1;
    }
    let caps = match duration_re().captures(value) {
        Some(c) => c,
        None => return -1,
    };
    let mut matched_any = false;
    let mut seconds = 0.0_f64;
    let components: [(Option<&str>, f64); 6] = [
        (caps.name("y").map(|m| m.as_str()), YEAR_SECONDS),
        (caps.name("mo").map(|m| m.as_str()), MONTH_SECONDS),
        (caps.name("d").map(|m| m.as_str()), DAY_SECONDS),
        (caps.name("h").map(|m| m.as_str()), HOUR_SECONDS),
        (caps.name("mi").map(|m| m.as_str()), MINUTE_SECONDS),
        (caps.name("s").map(|m| m.as_str()), 1.0),
    ];
    for (value, multiplier) in components {
        if let Some(v) = value {
            let v: f64 = match v.parse() {
                Ok(v) => v,
                Err(_) => return -1,
            };
            seconds += v * multiplier;
            matched_any = true;
        }
    }
    if !matched_any {
        return -1;
    }
    (seconds * 1000.0) as i64
}

/// Parses a UTC `xs:dateTime` into milliseconds since the Unix epoch.
pub fn parse_xs_date_time(value: &str) -> i64 {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return dt.timestamp_millis();
    }
    // Accept a bare UTC form without an explicit offset / "Z" suffix.
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return naive.and_utc().timestamp_millis();
    }
    -1
}

/// Rescales `timestamp` from a clock of rate `divisor` to one of rate
/// `multiplier`, avoiding overflow when one rate is a multiple of the other.
pub fn scale_large_timestamp(timestamp: i64, multiplier: i64, divisor: i64) -> i64 {
    if divisor >= multiplier && divisor % multiplier == 0 {
        let division_factor = divisor / multiplier;
        timestamp / division_factor
    } else if divisor < multiplier && multiplier % divisor == 0 {
        let multiplication_factor = multiplier / divisor;
        timestamp * multiplication_factor
    } else {
        let factor = multiplier as f64 / divisor as f64;
        (timestamp as f64 * factor) as i64
    }
}

pub fn ceil_divide(numerator: i64, denominator: i64) -> i64 {
    (numerator + denominator - 1) / denominator
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_literals() {
        assert_eq!(parse_xs_duration("PT1H"), 3_600_000);
        assert_eq!(parse_xs_duration("P2Y"), 63_113_852_000);
        assert_eq!(parse_xs_duration("PT36.5S"), 36_500);
        assert_eq!(parse_xs_duration(""), -1);
        assert_eq!(parse_xs_duration("P"), -1);
    }

    #[test]
    fn scale_timestamp() {
        assert_eq!(scale_large_timestamp(12_345_678, 1_000_000, 1_000), 12_345_678_000);
        assert_eq!(scale_large_timestamp(12_345_678, 1_000, 1_000_000), 12_345);
    }

    #[test]
    fn rawcc_pts_scale() {
        // 1 tick at 45kHz -> microseconds, as used by the RAWCC parser.
        assert_eq!(scale_large_timestamp(1, 1000, 45), 22);
    }
}
