use time::{OffsetDateTime, UtcOffset};

const MINUTES_IN_DAY: f64 = 1440.0;
const MINUTES_IN_MONTH: f64 = 43200.0;
const MINUTES_IN_TWO_MONTHS: f64 = 86400.0;

/// Distance between `then` and `now` in words, suffixed with "ago" (or
/// prefixed with "in" for future instants), e.g. "about 2 hours ago".
pub fn relative_time(then: OffsetDateTime, now: OffsetDateTime) -> String {
    if then > now {
        format!("in {}", distance_in_words(now, then))
    } else {
        format!("{} ago", distance_in_words(then, now))
    }
}

fn plural(n: u64, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit}")
    } else {
        format!("{n} {unit}s")
    }
}

/// Whole calendar months from `earlier` to `later`.
fn calendar_months(earlier: OffsetDateTime, later: OffsetDateTime) -> i64 {
    let earlier = earlier.to_offset(UtcOffset::UTC);
    let later = later.to_offset(UtcOffset::UTC);

    let mut months = i64::from(later.year() - earlier.year()) * 12
        + i64::from(u8::from(later.month())) - i64::from(u8::from(earlier.month()));
    if (later.day(), later.time()) < (earlier.day(), earlier.time()) {
        months -= 1;
    }
    months
}

fn distance_in_words(earlier: OffsetDateTime, later: OffsetDateTime) -> String {
    let seconds = (later - earlier).whole_seconds();
    let minutes = (seconds as f64 / 60.0).round();

    if minutes < 1.0 {
        return "less than a minute".to_owned();
    }
    if minutes < 45.0 {
        return plural(minutes as u64, "minute");
    }
    if minutes < 90.0 {
        return "about 1 hour".to_owned();
    }
    if minutes < MINUTES_IN_DAY {
        let hours = (minutes / 60.0).round() as u64;
        return format!("about {}", plural(hours, "hour"));
    }
    if minutes < 2520.0 {
        return "1 day".to_owned();
    }
    if minutes < MINUTES_IN_MONTH {
        let days = (minutes / MINUTES_IN_DAY).round() as u64;
        return plural(days, "day");
    }
    if minutes < MINUTES_IN_TWO_MONTHS {
        let months = (minutes / MINUTES_IN_MONTH).round() as u64;
        return format!("about {}", plural(months, "month"));
    }

    // the year cut-off follows the calendar, the month count is rounded
    let months = calendar_months(earlier, later).max(0) as u64;
    if months < 12 {
        return plural((minutes / MINUTES_IN_MONTH).round() as u64, "month");
    }

    let years = months / 12;
    match months % 12 {
        0..3 => format!("about {}", plural(years, "year")),
        3..9 => format!("over {}", plural(years, "year")),
        _ => format!("almost {}", plural(years + 1, "year")),
    }
}
