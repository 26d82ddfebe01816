//! Availability-configuration repository trait.
//!
//! Read-only access to the organizer-owned scheduling configuration:
//! weekly rules, date overrides, buffer settings, advanced rules, event
//! types and the organizer's stored timezone. All of these are created and
//! edited by the CRUD layer; the engine never writes them.

use async_trait::async_trait;
use chrono_tz::Tz;

use super::error::RepositoryResult;
use crate::api::{EventTypeId, OrganizerId};
use crate::models::{AvailabilityRule, BufferSettings, DateOverride, DateRange, EventTypeConfig, WeeklyRule};

/// Repository trait for availability configuration reads.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait AvailabilityRepository: Send + Sync {
    /// Fetch all weekly availability rules for an organizer.
    ///
    /// # Returns
    /// * `Ok(Vec<WeeklyRule>)` - May be empty for an organizer with no schedule
    /// * `Err(RepositoryError)` - If the organizer is unknown or the read fails
    async fn read_weekly_rules(&self, organizer: OrganizerId)
        -> RepositoryResult<Vec<WeeklyRule>>;

    /// Fetch date overrides for an organizer within an inclusive date range.
    async fn read_date_overrides(
        &self,
        organizer: OrganizerId,
        range: DateRange,
    ) -> RepositoryResult<Vec<DateOverride>>;

    /// Fetch the organizer's buffer settings, if configured.
    async fn read_buffer_settings(
        &self,
        organizer: OrganizerId,
    ) -> RepositoryResult<Option<BufferSettings>>;

    /// Fetch all advanced availability rules for an organizer, including
    /// inactive ones (the evaluator skips those).
    async fn read_availability_rules(
        &self,
        organizer: OrganizerId,
    ) -> RepositoryResult<Vec<AvailabilityRule>>;

    /// Fetch the organizer's stored IANA timezone.
    ///
    /// Organizers without explicit timezone settings default to UTC.
    async fn read_organizer_timezone(&self, organizer: OrganizerId) -> RepositoryResult<Tz>;

    /// Fetch one event type configuration owned by the organizer.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If the event type does not exist
    ///   or belongs to a different organizer
    async fn read_event_type(
        &self,
        organizer: OrganizerId,
        event_type: EventTypeId,
    ) -> RepositoryResult<EventTypeConfig>;

    /// Liveness probe for the backing store.
    async fn health_check(&self) -> RepositoryResult<bool>;
}
