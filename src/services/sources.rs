//! Availability source adapters.
//!
//! Translates each raw availability input — weekly rules, date overrides,
//! buffer settings — into normalized UTC intervals for one organizer-local
//! calendar day. External busy blocks are fetched separately by the
//! resolver.
//!
//! Wall-clock rule times are re-expanded against the organizer's timezone
//! for every concrete date, so DST offset changes are always picked up.
//! Precedence within a day: overrides rewrite the weekly-derived set, then
//! the lunch block and busy sources subtract from it.

use chrono::{DateTime, Days, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::models::{
    interval, weekday_index, BufferSettings, DateOverride, Interval, WeeklyRule,
};

/// Free/busy intervals contributed by one organizer-local calendar day.
#[derive(Debug, Clone)]
pub struct DayAvailability {
    pub date: NaiveDate,
    /// Bookable intervals after weekly rules and overrides, in UTC.
    pub available: Vec<Interval>,
    /// Synthetic busy intervals (lunch block), in UTC.
    pub busy: Vec<Interval>,
}

/// Resolve a local wall-clock time on a date to a UTC instant.
///
/// Times inside a spring-forward gap shift to the first valid instant;
/// ambiguous fall-back times take the earlier offset.
pub fn local_to_utc(tz: Tz, date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
    let naive = date.and_time(time);
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earlier, _) => earlier.with_timezone(&Utc),
        LocalResult::None => {
            // Wall-clock time inside a DST gap. Gaps end on a coarse
            // boundary, so probing forward in quarter hours finds the
            // first valid instant quickly.
            let mut probe = naive;
            for _ in 0..16 {
                probe += Duration::minutes(15);
                match tz.from_local_datetime(&probe) {
                    LocalResult::Single(dt) => return dt.with_timezone(&Utc),
                    LocalResult::Ambiguous(earlier, _) => return earlier.with_timezone(&Utc),
                    LocalResult::None => continue,
                }
            }
            // No real timezone has a gap this long.
            Utc.from_utc_datetime(&naive)
        }
    }
}

/// The UTC window covered by one organizer-local calendar day.
pub fn day_window(tz: Tz, date: NaiveDate) -> Interval {
    let start = local_to_utc(tz, date, NaiveTime::MIN);
    let end = local_to_utc(tz, next_day(date), NaiveTime::MIN);
    // A local day always spans a positive UTC range (offsets never exceed
    // a day), so construction cannot fail.
    Interval { start, end }
}

/// The UTC window covered by an inclusive organizer-local date range.
pub fn range_window(tz: Tz, from: NaiveDate, to: NaiveDate) -> Interval {
    let start = local_to_utc(tz, from, NaiveTime::MIN);
    let end = local_to_utc(tz, next_day(to), NaiveTime::MIN);
    Interval { start, end }
}

fn next_day(date: NaiveDate) -> NaiveDate {
    date.checked_add_days(Days::new(1))
        .unwrap_or(NaiveDate::MAX)
}

/// Expand a local `[start_time, end_time)` window on a date into UTC
/// intervals.
///
/// A window with `end_time <= start_time` wraps around local midnight and
/// contributes two pieces to the SAME local day: `[00:00, end)` and
/// `[start, 24:00)`. Under a nonzero UTC offset those land on consecutive
/// UTC dates; neither piece is ever dropped.
pub fn expand_window_on_date(
    tz: Tz,
    date: NaiveDate,
    start_time: NaiveTime,
    end_time: NaiveTime,
) -> Vec<Interval> {
    let mut pieces = Vec::with_capacity(2);

    // A degenerate window covers nothing, not a full wrapped day.
    if start_time == end_time && end_time != NaiveTime::MIN {
        return pieces;
    }

    if start_time < end_time {
        let start = local_to_utc(tz, date, start_time);
        let end = local_to_utc(tz, date, end_time);
        pieces.extend(Interval::new(start, end));
    } else {
        // Early piece: [00:00, end). Empty when end_time is midnight.
        if end_time != NaiveTime::MIN {
            let start = local_to_utc(tz, date, NaiveTime::MIN);
            let end = local_to_utc(tz, date, end_time);
            pieces.extend(Interval::new(start, end));
        }
        // Late piece: [start, 24:00).
        let start = local_to_utc(tz, date, start_time);
        let end = local_to_utc(tz, next_day(date), NaiveTime::MIN);
        pieces.extend(Interval::new(start, end));
    }

    pieces
}

/// Validate weekly rules before expansion.
///
/// Returns the first problem found, described for the caller.
pub fn validate_weekly_rules(rules: &[WeeklyRule]) -> Result<(), String> {
    for rule in rules {
        if rule.weekday > 6 {
            return Err(format!(
                "Weekly rule has weekday {} (expected 0-6, 0 = Monday)",
                rule.weekday
            ));
        }
    }
    Ok(())
}

/// Compute one organizer-local day's availability from weekly rules,
/// date overrides and buffer settings.
pub fn build_day(
    tz: Tz,
    date: NaiveDate,
    weekly_rules: &[WeeklyRule],
    overrides: &[DateOverride],
    buffers: &BufferSettings,
) -> DayAvailability {
    let weekday = weekday_index(date);

    // 1. Weekly stage: available windows minus blocked windows for this
    //    weekday.
    let mut open: Vec<Interval> = Vec::new();
    let mut blocked: Vec<Interval> = Vec::new();
    for rule in weekly_rules.iter().filter(|r| r.weekday == weekday) {
        let pieces = expand_window_on_date(tz, date, rule.start_time, rule.end_time);
        if rule.available {
            open.extend(pieces);
        } else {
            blocked.extend(pieces);
        }
    }
    let mut available = interval::subtract_all(open, &blocked);

    // 2. Override stage. A whole-day override replaces the weekly-derived
    //    set entirely; timed overrides add or remove their sub-interval.
    let todays: Vec<&DateOverride> = overrides.iter().filter(|o| o.date == date).collect();

    if todays.iter().any(|o| o.is_full_day() && !o.available) {
        available = Vec::new();
    } else if todays.iter().any(|o| o.is_full_day() && o.available) {
        available = vec![day_window(tz, date)];
    }

    let mut added: Vec<Interval> = Vec::new();
    let mut removed: Vec<Interval> = Vec::new();
    for o in &todays {
        let (Some(start_time), Some(end_time)) = (o.start_time, o.end_time) else {
            continue;
        };
        let pieces = expand_window_on_date(tz, date, start_time, end_time);
        if o.available {
            added.extend(pieces);
        } else {
            removed.extend(pieces);
        }
    }
    available.extend(added);
    available = interval::subtract_all(available, &removed);

    // 3. Lunch block becomes a synthetic busy interval for the day.
    let mut busy = Vec::new();
    if let Some(lunch) = buffers.lunch_block {
        busy.extend(expand_window_on_date(tz, date, lunch.start_time, lunch.end_time));
    }

    DayAvailability {
        date,
        available,
        busy,
    }
}

#[cfg(test)]
#[path = "sources_tests.rs"]
mod sources_tests;
