//! Human-readable run durations.
//!
//! Accepted form: one or more `<number><unit>` tokens, case and whitespace
//! ignored (`"1y"`, `"3 months"`, `"2d 1h 15m 45s"`). A year is 365 days and
//! a month 30 days. A bare `m` is a month until a week, day or hour token
//! has been seen, after which it is a minute. A bare number is seconds.

use crate::error::{SolverError, SolverResult};

const MINUTE: f64 = 60.0;
const HOUR: f64 = 60.0 * MINUTE;
const DAY: f64 = 24.0 * HOUR;
const WEEK: f64 = 7.0 * DAY;
const MONTH: f64 = 30.0 * DAY;
const YEAR: f64 = 365.0 * DAY;

/// Seconds in `text`.
///
/// # Errors
///
/// `InvalidConfiguration` for empty input, an unknown unit, a unit with no
/// magnitude, a malformed number or a negative/non-finite total.
///
/// ```
/// use polar_swe::time::resolve_duration;
///
/// assert_eq!(resolve_duration("10 days").unwrap(), 864_000.0);
/// assert_eq!(resolve_duration("1h 30m").unwrap(), 5_400.0);
/// assert_eq!(resolve_duration("90").unwrap(), 90.0);
/// assert!(resolve_duration("3 fortnights").is_err());
/// ```
pub fn resolve_duration(text: &str) -> SolverResult<f64> {
    let compact: String = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();
    if compact.is_empty() {
        return Err(invalid(text, "empty duration"));
    }

    let mut total = 0.0;
    let mut small_units_seen = false;
    let mut rest = compact.as_str();

    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if number_len == 0 {
            return Err(invalid(text, "unit without a magnitude"));
        }
        let (number, tail) = rest.split_at(number_len);
        let value: f64 = number
            .parse()
            .map_err(|_| invalid(text, &format!("malformed number '{number}'")))?;

        let unit_len = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_len);

        let seconds = match unit {
            "" | "s" | "sec" | "secs" | "second" | "seconds" => 1.0,
            "min" | "mins" | "minute" | "minutes" => MINUTE,
            "m" if small_units_seen => MINUTE,
            "m" | "mo" | "month" | "months" => MONTH,
            "h" | "hr" | "hrs" | "hour" | "hours" => {
                small_units_seen = true;
                HOUR
            }
            "d" | "day" | "days" => {
                small_units_seen = true;
                DAY
            }
            "w" | "week" | "weeks" => {
                small_units_seen = true;
                WEEK
            }
            "y" | "yr" | "yrs" | "year" | "years" => YEAR,
            other => return Err(invalid(text, &format!("unknown unit '{other}'"))),
        };

        total += value * seconds;
        rest = tail;
    }

    if !total.is_finite() {
        return Err(invalid(text, "duration is not finite"));
    }
    Ok(total)
}

fn invalid(text: &str, reason: &str) -> SolverError {
    SolverError::invalid_config(format!("cannot parse duration '{text}': {reason}"))
}

/// Render seconds as `"Nd HH:MM:SS"`.
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let secs = total % 60;
    format!("{days}d {hours:02}:{minutes:02}:{secs:02}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_units() {
        assert_eq!(resolve_duration("1y").unwrap(), 365.0 * 86_400.0);
        assert_eq!(resolve_duration("3 months").unwrap(), 90.0 * 86_400.0);
        assert_eq!(resolve_duration("10 days").unwrap(), 10.0 * 86_400.0);
        assert_eq!(resolve_duration("2 Weeks").unwrap(), 14.0 * 86_400.0);
        assert_eq!(resolve_duration("5 HOURS").unwrap(), 18_000.0);
        assert_eq!(resolve_duration("30min").unwrap(), 1_800.0);
        assert_eq!(resolve_duration("0.5d").unwrap(), 43_200.0);
        assert_eq!(resolve_duration("45").unwrap(), 45.0);
    }

    #[test]
    fn test_year_to_month_ratio() {
        let year = resolve_duration("1y").unwrap();
        let month = resolve_duration("1 month").unwrap();
        assert_relative_eq!(year, 12.0 * month * 365.0 / 360.0, max_relative = 1e-14);
    }

    #[test]
    fn test_compound() {
        let expected = 2.0 * 86_400.0 + 3_600.0 + 15.0 * 60.0 + 45.0;
        assert_eq!(resolve_duration("2d 1h 15m 45s").unwrap(), expected);
        assert_eq!(
            resolve_duration("1y2m3d6h3m5s").unwrap(),
            ((365.0 + 60.0 + 3.0) * 24.0 + 6.0) * 3_600.0 + 3.0 * 60.0 + 5.0
        );
    }

    #[test]
    fn test_bare_m_is_month_first() {
        assert_eq!(resolve_duration("2m").unwrap(), 60.0 * 86_400.0);
        assert_eq!(resolve_duration("1h2m").unwrap(), 3_600.0 + 120.0);
    }

    #[test]
    fn test_failures() {
        for bad in ["", "   ", "abc", "days", "5 parsecs", "1..2d", "d5"] {
            let err = resolve_duration(bad).unwrap_err();
            assert!(err.is_configuration(), "{bad:?} should fail");
        }
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0.0), "0d 00:00:00");
        assert_eq!(format_duration(90_061.0), "1d 01:01:01");
        assert_eq!(format_duration(30.0 * 86_400.0), "30d 00:00:00");
    }
}
