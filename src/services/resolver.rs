//! Availability resolver.
//!
//! Merges the per-day adapter output across the requested date range into a
//! single authoritative free timeline: weekly rules and overrides produce
//! the available set, then buffer-padded busy intervals (lunch block,
//! meetings, synced calendars) are subtracted. Busy blocks are padded
//! BEFORE subtraction so buffer time is never itself bookable.

use chrono::Duration;
use chrono_tz::Tz;
use log::debug;

use super::sources;
use crate::api::OrganizerId;
use crate::db::repository::{AvailabilityRepository, FullRepository, MeetingRepository};
use crate::error::{EngineError, EngineResult};
use crate::models::{interval, DateRange, Interval, WeeklyRule};

/// Options for one resolution pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveOptions<'a> {
    /// Event-type buffer minutes added on top of the organizer-level
    /// buffer settings when padding busy intervals.
    pub event_buffer_before: i64,
    pub event_buffer_after: i64,
    /// Per-event-type weekly windows replacing the organizer-wide rules
    /// when present.
    pub custom_weekly: Option<&'a [WeeklyRule]>,
}

/// The resolved free timeline for a date range.
#[derive(Debug, Clone)]
pub struct ResolvedAvailability {
    pub timezone: Tz,
    /// UTC window spanned by the organizer-local date range.
    pub window: Interval,
    /// Ordered, disjoint free intervals in UTC, clipped to `window`.
    pub free: Vec<Interval>,
}

/// Resolve the free timeline for an organizer over an inclusive local date
/// range.
///
/// Reads every availability source fresh; nothing is cached between calls,
/// so a booking re-check always sees live state.
pub async fn resolve_availability(
    repo: &dyn FullRepository,
    organizer: OrganizerId,
    range: DateRange,
    opts: ResolveOptions<'_>,
) -> EngineResult<ResolvedAvailability> {
    let timezone = repo
        .read_organizer_timezone(organizer)
        .await
        .map_err(EngineError::from_config_read)?;

    let organizer_rules;
    let weekly_rules: &[WeeklyRule] = match opts.custom_weekly {
        Some(rules) if !rules.is_empty() => rules,
        _ => {
            organizer_rules = repo
                .read_weekly_rules(organizer)
                .await
                .map_err(EngineError::from_config_read)?;
            &organizer_rules
        }
    };
    sources::validate_weekly_rules(weekly_rules).map_err(EngineError::Configuration)?;

    let overrides = repo
        .read_date_overrides(organizer, range)
        .await
        .map_err(EngineError::from_config_read)?;

    let buffers = repo
        .read_buffer_settings(organizer)
        .await
        .map_err(EngineError::from_config_read)?
        .unwrap_or_default();

    let window = sources::range_window(timezone, range.from, range.to);

    // The only I/O-bound read on the hot path; a failure here aborts the
    // request rather than reporting phantom availability.
    let busy_blocks = repo.read_busy_blocks(organizer, window).await?;

    let mut available: Vec<Interval> = Vec::new();
    let mut busy: Vec<Interval> = busy_blocks;
    for date in range.days() {
        let day = sources::build_day(timezone, date, weekly_rules, &overrides, &buffers);
        available.extend(day.available);
        busy.extend(day.busy);
    }

    let pad_before = Duration::minutes(buffers.before_minutes + opts.event_buffer_before);
    let pad_after = Duration::minutes(buffers.after_minutes + opts.event_buffer_after);
    let padded: Vec<Interval> = busy
        .into_iter()
        .map(|b| b.pad(pad_before, pad_after))
        .collect();

    let free = interval::clip(&interval::subtract_all(available, &padded), window);

    debug!(
        "resolved availability for organizer {} over {}..={}: {} free interval(s)",
        organizer.value(),
        range.from,
        range.to,
        free.len()
    );

    Ok(ResolvedAvailability {
        timezone,
        window,
        free,
    })
}
