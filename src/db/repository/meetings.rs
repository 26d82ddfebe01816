//! Meeting and busy-block repository trait.
//!
//! Busy blocks are the union of the organizer's own pending/confirmed
//! meetings and synced external calendars, pre-merged by the collaborator
//! that owns calendar sync. They are re-read at slot-generation time and
//! again at commit time; nothing here is cached between the two reads.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::api::{EventTypeId, OrganizerId};
use crate::models::{Interval, Invitee, Meeting, MeetingRef};

/// Repository trait for meeting reads and the single commit write.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait MeetingRepository: Send + Sync {
    /// Fetch the merged busy blocks overlapping a UTC window.
    ///
    /// Includes pending/confirmed meetings and synced calendar events,
    /// merged into sorted, non-overlapping intervals.
    async fn read_busy_blocks(
        &self,
        organizer: OrganizerId,
        window: Interval,
    ) -> RepositoryResult<Vec<Interval>>;

    /// Fetch the organizer's meetings overlapping a UTC window, all
    /// statuses included.
    ///
    /// The rule evaluator needs per-meeting boundaries and counts, which
    /// the merged busy view erases.
    async fn read_meetings(
        &self,
        organizer: OrganizerId,
        window: Interval,
    ) -> RepositoryResult<Vec<Meeting>>;

    /// Create a meeting record for a validated booking.
    ///
    /// Only the booking conflict guard calls this, and it fully serializes
    /// calls per organizer; the write must be atomic (the record either
    /// exists afterwards or the call errored).
    ///
    /// # Returns
    /// * `Ok(MeetingRef)` - Reference to the created record
    /// * `Err(RepositoryError)` - If validation or the write fails
    async fn create_meeting(
        &self,
        organizer: OrganizerId,
        event_type: EventTypeId,
        interval: Interval,
        invitee: Invitee,
    ) -> RepositoryResult<MeetingRef>;
}
