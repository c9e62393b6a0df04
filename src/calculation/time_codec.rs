//! Conversion between `HH:MM` wall-clock strings and minutes.
//!
//! Parsing fails softly: anything that is not a valid time of day decodes to
//! `0`, the same value as an unset field. A genuine `00:00` therefore cannot
//! be told apart from an empty field.

/// Decodes a `HH:MM` time of day into minutes after midnight.
///
/// Accepts one or two hour digits, exactly two minute digits and an optional
/// `:SS` suffix, which is ignored. Empty or malformed input yields `0`.
///
/// # Examples
///
/// ```
/// use timesheet_engine::calculation::parse_time;
///
/// assert_eq!(parse_time("08:30"), 510);
/// assert_eq!(parse_time("8:30"), 510);
/// assert_eq!(parse_time("17:45:10"), 1065);
/// assert_eq!(parse_time(""), 0);
/// assert_eq!(parse_time("lunch"), 0);
/// assert_eq!(parse_time("24:00"), 0);
/// ```
pub fn parse_time(value: &str) -> i64 {
    let mut parts = value.trim().split(':');

    let (Some(hours), Some(minutes)) = (parts.next(), parts.next()) else {
        return 0;
    };

    if let Some(seconds) = parts.next() {
        if seconds.len() != 2 || !all_digits(seconds) || parts.next().is_some() {
            return 0;
        }
    }

    if hours.is_empty() || hours.len() > 2 || !all_digits(hours) {
        return 0;
    }
    if minutes.len() != 2 || !all_digits(minutes) {
        return 0;
    }

    let (Ok(hours), Ok(minutes)) = (hours.parse::<i64>(), minutes.parse::<i64>()) else {
        return 0;
    };

    if hours > 23 || minutes > 59 {
        return 0;
    }

    hours * 60 + minutes
}

/// Formats a signed duration in minutes as `H:MM`.
///
/// Zero is `0:00`; negative values get a leading `-`. Hours are not wrapped
/// at 24, so long periods read naturally (`150:30`).
///
/// # Examples
///
/// ```
/// use timesheet_engine::calculation::format_minutes;
///
/// assert_eq!(format_minutes(0), "0:00");
/// assert_eq!(format_minutes(528), "8:48");
/// assert_eq!(format_minutes(-65), "-1:05");
/// assert_eq!(format_minutes(9030), "150:30");
/// ```
pub fn format_minutes(minutes: i64) -> String {
    if minutes == 0 {
        return "0:00".to_string();
    }

    let sign = if minutes < 0 { "-" } else { "" };
    let magnitude = minutes.unsigned_abs();

    format!("{}{}:{:02}", sign, magnitude / 60, magnitude % 60)
}

fn all_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}
