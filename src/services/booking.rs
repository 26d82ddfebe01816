//! Booking conflict guard.
//!
//! The single write path of the engine: accepts exactly one winner when
//! multiple callers race to book the same or overlapping slot. Exclusivity
//! is per organizer — a logical serialization point, not a global lock —
//! so unrelated organizers never contend.
//!
//! Protocol: acquire the organizer's async lock under a bounded wait,
//! re-run the availability pipeline restricted to the requested day(s)
//! against freshly read busy blocks and meetings, then create the meeting
//! record. Slot listing never writes; this module is the only mutation
//! path.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::resolver::{self, ResolveOptions};
use super::rules::{self, RuleContext};
use crate::api::OrganizerId;
use crate::db::repository::{AvailabilityRepository, FullRepository, MeetingRepository};
use crate::error::EngineResult;
use crate::models::{DateRange, EventTypeConfig, Interval, Invitee, MeetingRef};

/// Why a booking attempt was rejected.
///
/// Reasons are surfaced verbatim to the caller and never retried
/// automatically; only `Busy` is transient and worth a caller-side retry
/// with backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    /// The interval is no longer fully free (taken, buffered or outside
    /// the current schedule).
    SlotNoLongerAvailable,
    NoticeViolation,
    AdvanceViolation,
    DailyLimitExceeded,
    WeeklyLimitExceeded,
    SpacingViolation,
    /// The per-organizer lock could not be acquired within the bounded
    /// wait.
    Busy,
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::SlotNoLongerAvailable => "slot_no_longer_available",
            Self::NoticeViolation => "notice_violation",
            Self::AdvanceViolation => "advance_violation",
            Self::DailyLimitExceeded => "daily_limit_exceeded",
            Self::WeeklyLimitExceeded => "weekly_limit_exceeded",
            Self::SpacingViolation => "spacing_violation",
            Self::Busy => "busy",
        };
        f.write_str(text)
    }
}

/// Outcome of a booking attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum BookingOutcome {
    Committed { meeting: MeetingRef },
    Rejected { reason: RejectionReason },
}

impl BookingOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed { .. })
    }
}

/// Per-organizer booking serialization point.
///
/// Clones share the same lock registry. Each organizer gets an async mutex
/// held across the re-validation reads and the meeting write; acquisition
/// waits at most `lock_wait` before failing fast with `Busy`.
#[derive(Clone)]
pub struct BookingGuard {
    locks: Arc<parking_lot::Mutex<HashMap<OrganizerId, Arc<Mutex<()>>>>>,
    lock_wait: StdDuration,
}

impl BookingGuard {
    pub fn new(lock_wait: StdDuration) -> Self {
        Self {
            locks: Arc::new(parking_lot::Mutex::new(HashMap::new())),
            lock_wait,
        }
    }

    /// Acquire the organizer's exclusive lock, waiting at most the
    /// configured bound. `None` means the wait timed out.
    async fn acquire(&self, organizer: OrganizerId) -> Option<OwnedMutexGuard<()>> {
        let lock = {
            let mut locks = self.locks.lock();
            locks
                .entry(organizer)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        tokio::time::timeout(self.lock_wait, lock.lock_owned())
            .await
            .ok()
    }

    /// Attempt to reserve and commit `requested` for the organizer.
    ///
    /// Re-validates against live state under the organizer's lock; the
    /// meeting write and the `Committed` response are all-or-nothing.
    pub async fn reserve(
        &self,
        repo: &dyn FullRepository,
        organizer: OrganizerId,
        event_type: &EventTypeConfig,
        requested: Interval,
        invitee: Invitee,
        now: DateTime<Utc>,
    ) -> EngineResult<BookingOutcome> {
        let Some(_guard) = self.acquire(organizer).await else {
            warn!(
                "booking lock for organizer {} not acquired within {:?}",
                organizer.value(),
                self.lock_wait
            );
            return Ok(BookingOutcome::Rejected {
                reason: RejectionReason::Busy,
            });
        };

        match self
            .validate(repo, organizer, event_type, requested, now)
            .await?
        {
            Ok(()) => {}
            Err(reason) => {
                debug!(
                    "booking for organizer {} rejected: {}",
                    organizer.value(),
                    reason
                );
                return Ok(BookingOutcome::Rejected { reason });
            }
        }

        let meeting = repo
            .create_meeting(organizer, event_type.id, requested, invitee)
            .await?;
        info!(
            "booked meeting {} for organizer {} at {}..{}",
            meeting.0,
            organizer.value(),
            requested.start,
            requested.end
        );
        Ok(BookingOutcome::Committed { meeting })
    }

    /// Re-run the availability pipeline for the requested interval using
    /// the freshest repository state.
    async fn validate(
        &self,
        repo: &dyn FullRepository,
        organizer: OrganizerId,
        event_type: &EventTypeConfig,
        requested: Interval,
        now: DateTime<Utc>,
    ) -> EngineResult<Result<(), RejectionReason>> {
        let resolved = resolver::resolve_availability(
            repo,
            organizer,
            booking_range(requested),
            ResolveOptions {
                event_buffer_before: event_type.buffer_before,
                event_buffer_after: event_type.buffer_after,
                custom_weekly: Some(&event_type.custom_availability),
            },
        )
        .await?;

        if !resolved.free.iter().any(|f| f.contains(&requested)) {
            return Ok(Err(RejectionReason::SlotNoLongerAvailable));
        }

        // Limit rules look at whole local weeks; read meetings with margin.
        let meetings_window = requested.pad(Duration::days(8), Duration::days(8));
        let meetings = repo.read_meetings(organizer, meetings_window).await?;

        let rule_set = repo
            .read_availability_rules(organizer)
            .await
            .map_err(crate::error::EngineError::from_config_read)?;

        let ctx = RuleContext {
            now,
            timezone: resolved.timezone,
            event_type,
            rules: &rule_set,
            meetings: &meetings,
        };
        Ok(rules::evaluate_slot(requested, &ctx))
    }
}

/// The organizer-local date(s) a requested interval touches, as a range.
fn booking_range(requested: Interval) -> DateRange {
    // The UTC dates bounding the interval cover every local date it can
    // touch once the resolver widens each date to its local day window.
    let from = requested.start.date_naive().pred_opt().unwrap_or(requested.start.date_naive());
    let to = requested.end.date_naive().succ_opt().unwrap_or(requested.end.date_naive());
    DateRange { from, to }
}
