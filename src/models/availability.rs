//! Availability configuration records and meeting records.
//!
//! These mirror the organizer-owned scheduling configuration: recurring
//! weekly windows, date-specific overrides, buffer settings, advanced
//! booking rules and event types, plus the meeting records that occupy
//! time. All of them are created and edited elsewhere (CRUD layer); this
//! engine only reads them. Wall-clock rule times stay naive and are
//! re-expanded per concrete date, so DST offset changes are always
//! honored.

use chrono::{NaiveDate, NaiveTime};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::interval::Interval;
use crate::api::{EventTypeId, OrganizerId};

/// Weekday index, 0 = Monday .. 6 = Sunday.
pub fn weekday_index(date: NaiveDate) -> u8 {
    chrono::Datelike::weekday(&date).num_days_from_monday() as u8
}

/// Inclusive range of organizer-local calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    /// Create a new range. Returns `None` unless `from <= to`.
    pub fn new(from: NaiveDate, to: NaiveDate) -> Option<Self> {
        if from <= to {
            Some(Self { from, to })
        } else {
            None
        }
    }

    /// Single-day range.
    pub fn single(date: NaiveDate) -> Self {
        Self {
            from: date,
            to: date,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }

    /// Iterate the days of the range in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.from.iter_days().take_while(move |d| *d <= self.to)
    }
}

/// A recurring weekly availability window.
///
/// `end_time <= start_time` denotes a window that crosses local midnight
/// into the following day (e.g. 22:00-02:00); `end_time == 00:00` means
/// end of day. `available = false` carves the window out instead of
/// adding it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyRule {
    /// Weekday index, 0 = Monday.
    pub weekday: u8,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub available: bool,
}

impl WeeklyRule {
    pub fn crosses_midnight(&self) -> bool {
        self.end_time <= self.start_time
    }
}

/// A date-specific availability override.
///
/// When present, overrides take precedence over every weekly rule for that
/// date. Without times the whole day is replaced by the `available` flag;
/// with times only the sub-interval is added or removed, and weekly rules
/// still apply outside it. Several disjoint overrides may exist per date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateOverride {
    pub date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub available: bool,
    #[serde(default)]
    pub reason: String,
}

impl DateOverride {
    /// Whole-day overrides carry no time bounds.
    pub fn is_full_day(&self) -> bool {
        self.start_time.is_none() || self.end_time.is_none()
    }
}

/// A daily lunch window treated as a synthetic busy interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LunchBlock {
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

/// Organizer-level buffer settings.
///
/// Buffer time is injected around every committed meeting and around the
/// lunch block; buffered time is never bookable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BufferSettings {
    #[serde(default)]
    pub before_minutes: i64,
    #[serde(default)]
    pub after_minutes: i64,
    #[serde(default)]
    pub lunch_block: Option<LunchBlock>,
}

/// Event type configuration, immutable for the duration of one resolution
/// call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventTypeConfig {
    pub id: EventTypeId,
    pub name: String,
    pub duration_minutes: i64,
    #[serde(default)]
    pub buffer_before: i64,
    #[serde(default)]
    pub buffer_after: i64,
    pub min_notice_minutes: i64,
    pub max_advance_minutes: i64,
    pub max_bookings_per_day: u32,
    /// Per-event-type weekly windows. When non-empty they replace the
    /// organizer-wide weekly rules for this event type.
    #[serde(default)]
    pub custom_availability: Vec<WeeklyRule>,
}

/// Advanced booking rule policy, one variant per rule kind.
///
/// Persisted as `{"rule_type": ..., "parameters": {...}}`, matching the
/// JSON the configuration store keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule_type", content = "parameters", rename_all = "snake_case")]
pub enum RulePolicy {
    MinimumNotice { minutes: i64 },
    MaximumAdvance { minutes: i64 },
    DailyLimit { max_meetings: u32 },
    WeeklyLimit { max_meetings: u32 },
    TimeBetweenMeetings { minutes: i64 },
}

/// An advanced availability rule with optional weekday/event-type scoping.
///
/// Empty scope lists mean "applies to all". Multiple rules combine with
/// AND: a slot must pass every applicable rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityRule {
    #[serde(flatten)]
    pub policy: RulePolicy,
    #[serde(default)]
    pub applies_to_weekdays: Vec<u8>,
    #[serde(default)]
    pub applies_to_event_types: Vec<EventTypeId>,
    pub active: bool,
}

impl AvailabilityRule {
    /// Whether this rule constrains the given event type on the given
    /// weekday. Inactive rules never apply.
    pub fn applies_to(&self, event_type: EventTypeId, weekday: u8) -> bool {
        if !self.active {
            return false;
        }
        let weekday_ok =
            self.applies_to_weekdays.is_empty() || self.applies_to_weekdays.contains(&weekday);
        let event_ok = self.applies_to_event_types.is_empty()
            || self.applies_to_event_types.contains(&event_type);
        weekday_ok && event_ok
    }
}

/// Opaque reference to a committed meeting record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MeetingRef(pub Uuid);

impl MeetingRef {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Meeting lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
    NoShow,
}

impl MeetingStatus {
    /// Pending and confirmed meetings occupy the organizer's time.
    pub fn blocks_time(&self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }
}

/// The person booking the meeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invitee {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub timezone: Option<Tz>,
}

/// A booked meeting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meeting {
    pub reference: MeetingRef,
    pub organizer: OrganizerId,
    pub event_type: EventTypeId,
    pub interval: Interval,
    pub invitee: Invitee,
    pub status: MeetingStatus,
}
