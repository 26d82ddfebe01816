//! Public API surface for the availability engine.
//!
//! This file consolidates the identifier newtypes and the DTO types handed
//! to the booking API layer. All types derive Serialize/Deserialize for
//! JSON serialization.

pub use crate::models::{
    AvailabilityRule, BufferSettings, DateOverride, DateRange, EventTypeConfig, Interval, Invitee,
    LunchBlock, Meeting, MeetingRef, MeetingStatus, RulePolicy, WeeklyRule,
};
pub use crate::services::booking::{BookingOutcome, RejectionReason};

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Organizer identifier (owning user's primary key).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrganizerId(pub i64);

/// Event type identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventTypeId(pub i64);

impl OrganizerId {
    pub fn new(value: i64) -> Self {
        OrganizerId(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl EventTypeId {
    pub fn new(value: i64) -> Self {
        EventTypeId(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// A bookable slot, in UTC and re-expressed in the viewer's timezone.
///
/// Slots are ephemeral: never persisted, recomputed per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub local_start: DateTime<FixedOffset>,
    pub local_end: DateTime<FixedOffset>,
    pub timezone: Tz,
}

impl Slot {
    /// Express a UTC interval in the viewer's timezone.
    pub fn in_timezone(interval: Interval, tz: Tz) -> Self {
        Self {
            start: interval.start,
            end: interval.end,
            local_start: interval.start.with_timezone(&tz).fixed_offset(),
            local_end: interval.end.with_timezone(&tz).fixed_offset(),
            timezone: tz,
        }
    }

    /// The UTC interval this slot was generated from.
    pub fn interval(&self) -> Interval {
        Interval {
            start: self.start,
            end: self.end,
        }
    }
}

/// Result of a single-interval availability check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityCheck {
    pub is_available: bool,
    /// Busy or out-of-schedule intervals overlapping the requested window,
    /// in UTC. Empty when available.
    pub conflicts: Vec<Interval>,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}
