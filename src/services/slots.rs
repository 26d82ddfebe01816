//! Slot generator.
//!
//! Walks the resolved free timeline and emits discrete bookable slots of
//! the event type's duration, honoring minimum notice, maximum advance and
//! the per-day booking cap. Pure computation; never suspends.

use std::collections::HashMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::models::Interval;

/// Parameters for one slot-generation pass.
#[derive(Debug, Clone, Copy)]
pub struct SlotParams {
    pub duration: Duration,
    /// Step between offered slot starts. Defaults to `duration`, i.e. no
    /// overlapping offers unless the caller requests finer granularity.
    pub step: Duration,
    pub min_notice: Duration,
    pub max_advance: Duration,
    /// Maximum slots offered per organizer-local date; earliest win.
    pub max_per_day: u32,
    pub now: DateTime<Utc>,
}

impl SlotParams {
    /// Validate the parameters, naming the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        if self.duration <= Duration::zero() {
            return Err("Slot duration must be positive".to_string());
        }
        if self.step <= Duration::zero() {
            return Err("Slot step must be positive".to_string());
        }
        Ok(())
    }
}

/// Generate candidate slots from the resolved free intervals.
///
/// Every emitted slot is fully contained in a free interval, starts at or
/// after `now + min_notice`, ends at or before `now + max_advance`, and
/// slots never overlap (for `step >= duration`). Output is ordered by
/// start; the per-day cap keeps the earliest slots of each
/// organizer-local date.
pub fn generate_slots(free: &[Interval], params: &SlotParams, tz: Tz) -> Vec<Interval> {
    let earliest_start = params.now + params.min_notice;
    let latest_end = params.now + params.max_advance;

    let mut slots = Vec::new();
    let mut per_day: HashMap<NaiveDate, u32> = HashMap::new();

    for window in free {
        let mut t = window.start.max(earliest_start);
        while t + params.duration <= window.end && t + params.duration <= latest_end {
            let slot = Interval {
                start: t,
                end: t + params.duration,
            };
            let local_date = slot.start.with_timezone(&tz).date_naive();
            let taken = per_day.entry(local_date).or_insert(0);
            if *taken < params.max_per_day {
                *taken += 1;
                slots.push(slot);
            }
            t += params.step;
        }
    }

    slots
}

#[cfg(test)]
#[path = "slots_tests.rs"]
mod slots_tests;
