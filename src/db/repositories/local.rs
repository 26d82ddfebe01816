//! In-memory repository implementation.
//!
//! Backs unit tests and local development. State is a per-organizer table
//! behind a `parking_lot::RwLock`; clones share the same underlying store,
//! so a test can keep a handle for seeding while the engine owns another.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono_tz::Tz;
use parking_lot::RwLock;

use crate::api::{EventTypeId, OrganizerId};
use crate::db::repository::error::{ErrorContext, RepositoryError, RepositoryResult};
use crate::db::repository::{AvailabilityRepository, MeetingRepository};
use crate::models::{
    interval, AvailabilityRule, BufferSettings, DateOverride, DateRange, EventTypeConfig, Interval,
    Invitee, Meeting, MeetingRef, MeetingStatus, WeeklyRule,
};

#[derive(Debug, Default)]
struct OrganizerState {
    timezone: Option<Tz>,
    weekly_rules: Vec<WeeklyRule>,
    date_overrides: Vec<DateOverride>,
    buffer_settings: Option<BufferSettings>,
    availability_rules: Vec<AvailabilityRule>,
    event_types: HashMap<EventTypeId, EventTypeConfig>,
    meetings: Vec<Meeting>,
    calendar_busy: Vec<Interval>,
}

/// In-memory repository for unit testing and local development.
#[derive(Clone, Default)]
pub struct LocalRepository {
    organizers: Arc<RwLock<HashMap<OrganizerId, OrganizerState>>>,
}

impl LocalRepository {
    /// Create a new empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an organizer with a stored timezone.
    pub fn add_organizer(&self, organizer: OrganizerId, timezone: Tz) {
        let mut organizers = self.organizers.write();
        organizers.entry(organizer).or_default().timezone = Some(timezone);
    }

    pub fn add_weekly_rule(&self, organizer: OrganizerId, rule: WeeklyRule) {
        let mut organizers = self.organizers.write();
        organizers.entry(organizer).or_default().weekly_rules.push(rule);
    }

    pub fn add_date_override(&self, organizer: OrganizerId, date_override: DateOverride) {
        let mut organizers = self.organizers.write();
        organizers
            .entry(organizer)
            .or_default()
            .date_overrides
            .push(date_override);
    }

    pub fn set_buffer_settings(&self, organizer: OrganizerId, settings: BufferSettings) {
        let mut organizers = self.organizers.write();
        organizers.entry(organizer).or_default().buffer_settings = Some(settings);
    }

    pub fn add_availability_rule(&self, organizer: OrganizerId, rule: AvailabilityRule) {
        let mut organizers = self.organizers.write();
        organizers
            .entry(organizer)
            .or_default()
            .availability_rules
            .push(rule);
    }

    pub fn add_event_type(&self, organizer: OrganizerId, config: EventTypeConfig) {
        let mut organizers = self.organizers.write();
        organizers
            .entry(organizer)
            .or_default()
            .event_types
            .insert(config.id, config);
    }

    /// Add a synced external-calendar busy interval.
    pub fn add_calendar_busy(&self, organizer: OrganizerId, busy: Interval) {
        let mut organizers = self.organizers.write();
        organizers.entry(organizer).or_default().calendar_busy.push(busy);
    }

    /// Insert a pre-existing meeting record (test fixtures).
    pub fn insert_meeting(&self, meeting: Meeting) {
        let mut organizers = self.organizers.write();
        organizers
            .entry(meeting.organizer)
            .or_default()
            .meetings
            .push(meeting);
    }

    /// Update a meeting's status. Returns `false` if the reference is
    /// unknown. Cancelling a meeting frees its time on the next read.
    pub fn set_meeting_status(&self, reference: MeetingRef, status: MeetingStatus) -> bool {
        let mut organizers = self.organizers.write();
        for state in organizers.values_mut() {
            if let Some(meeting) = state.meetings.iter_mut().find(|m| m.reference == reference) {
                meeting.status = status;
                return true;
            }
        }
        false
    }

    /// Snapshot of an organizer's meeting records.
    pub fn meetings(&self, organizer: OrganizerId) -> Vec<Meeting> {
        let organizers = self.organizers.read();
        organizers
            .get(&organizer)
            .map(|state| state.meetings.clone())
            .unwrap_or_default()
    }

    fn with_organizer<T>(
        &self,
        organizer: OrganizerId,
        operation: &str,
        f: impl FnOnce(&OrganizerState) -> T,
    ) -> RepositoryResult<T> {
        let organizers = self.organizers.read();
        let state = organizers.get(&organizer).ok_or_else(|| {
            RepositoryError::not_found_with_context(
                "Unknown organizer",
                ErrorContext::new(operation)
                    .with_entity("organizer")
                    .with_entity_id(organizer.value()),
            )
        })?;
        Ok(f(state))
    }
}

#[async_trait]
impl AvailabilityRepository for LocalRepository {
    async fn read_weekly_rules(
        &self,
        organizer: OrganizerId,
    ) -> RepositoryResult<Vec<WeeklyRule>> {
        self.with_organizer(organizer, "read_weekly_rules", |state| {
            state.weekly_rules.clone()
        })
    }

    async fn read_date_overrides(
        &self,
        organizer: OrganizerId,
        range: DateRange,
    ) -> RepositoryResult<Vec<DateOverride>> {
        self.with_organizer(organizer, "read_date_overrides", |state| {
            state
                .date_overrides
                .iter()
                .filter(|o| range.contains(o.date))
                .cloned()
                .collect()
        })
    }

    async fn read_buffer_settings(
        &self,
        organizer: OrganizerId,
    ) -> RepositoryResult<Option<BufferSettings>> {
        self.with_organizer(organizer, "read_buffer_settings", |state| {
            state.buffer_settings
        })
    }

    async fn read_availability_rules(
        &self,
        organizer: OrganizerId,
    ) -> RepositoryResult<Vec<AvailabilityRule>> {
        self.with_organizer(organizer, "read_availability_rules", |state| {
            state.availability_rules.clone()
        })
    }

    async fn read_organizer_timezone(&self, organizer: OrganizerId) -> RepositoryResult<Tz> {
        self.with_organizer(organizer, "read_organizer_timezone", |state| {
            state.timezone.unwrap_or(chrono_tz::UTC)
        })
    }

    async fn read_event_type(
        &self,
        organizer: OrganizerId,
        event_type: EventTypeId,
    ) -> RepositoryResult<EventTypeConfig> {
        self.with_organizer(organizer, "read_event_type", |state| {
            state.event_types.get(&event_type).cloned()
        })?
        .ok_or_else(|| {
            RepositoryError::not_found_with_context(
                "Unknown event type",
                ErrorContext::new("read_event_type")
                    .with_entity("event_type")
                    .with_entity_id(event_type.value()),
            )
        })
    }

    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(true)
    }
}

#[async_trait]
impl MeetingRepository for LocalRepository {
    async fn read_busy_blocks(
        &self,
        organizer: OrganizerId,
        window: Interval,
    ) -> RepositoryResult<Vec<Interval>> {
        self.with_organizer(organizer, "read_busy_blocks", |state| {
            let mut blocks: Vec<Interval> = state
                .meetings
                .iter()
                .filter(|m| m.status.blocks_time() && m.interval.overlaps(&window))
                .map(|m| m.interval)
                .collect();
            blocks.extend(
                state
                    .calendar_busy
                    .iter()
                    .filter(|b| b.overlaps(&window))
                    .copied(),
            );
            interval::union(blocks)
        })
    }

    async fn read_meetings(
        &self,
        organizer: OrganizerId,
        window: Interval,
    ) -> RepositoryResult<Vec<Meeting>> {
        self.with_organizer(organizer, "read_meetings", |state| {
            state
                .meetings
                .iter()
                .filter(|m| m.interval.overlaps(&window))
                .cloned()
                .collect()
        })
    }

    async fn create_meeting(
        &self,
        organizer: OrganizerId,
        event_type: EventTypeId,
        interval: Interval,
        invitee: Invitee,
    ) -> RepositoryResult<MeetingRef> {
        let mut organizers = self.organizers.write();
        let state = organizers.get_mut(&organizer).ok_or_else(|| {
            RepositoryError::not_found_with_context(
                "Unknown organizer",
                ErrorContext::new("create_meeting")
                    .with_entity("organizer")
                    .with_entity_id(organizer.value()),
            )
        })?;

        if !state.event_types.contains_key(&event_type) {
            return Err(RepositoryError::validation_with_context(
                "Meeting references an unknown event type",
                ErrorContext::new("create_meeting")
                    .with_entity("event_type")
                    .with_entity_id(event_type.value()),
            ));
        }

        let reference = MeetingRef::generate();
        state.meetings.push(Meeting {
            reference,
            organizer,
            event_type,
            interval,
            invitee,
            status: MeetingStatus::Pending,
        });
        Ok(reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn iv(day: u32, start_h: u32, end_h: u32) -> Interval {
        Interval::new(
            Utc.with_ymd_and_hms(2026, 3, day, start_h, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 3, day, end_h, 0, 0).unwrap(),
        )
        .unwrap()
    }

    fn invitee() -> Invitee {
        Invitee {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            timezone: None,
        }
    }

    #[tokio::test]
    async fn test_unknown_organizer_is_not_found() {
        let repo = LocalRepository::new();
        let err = repo.read_weekly_rules(OrganizerId(404)).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_timezone_defaults_to_utc() {
        let repo = LocalRepository::new();
        let organizer = OrganizerId(1);
        // Seed the organizer without explicit timezone settings.
        repo.add_weekly_rule(
            organizer,
            WeeklyRule {
                weekday: 0,
                start_time: chrono::NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                end_time: chrono::NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
                available: true,
            },
        );
        let tz = repo.read_organizer_timezone(organizer).await.unwrap();
        assert_eq!(tz, chrono_tz::UTC);
    }

    #[tokio::test]
    async fn test_busy_blocks_merge_meetings_and_calendar() {
        let repo = LocalRepository::new();
        let organizer = OrganizerId(1);
        repo.add_organizer(organizer, chrono_tz::UTC);
        repo.add_event_type(
            organizer,
            EventTypeConfig {
                id: EventTypeId(1),
                name: "Intro".to_string(),
                duration_minutes: 30,
                buffer_before: 0,
                buffer_after: 0,
                min_notice_minutes: 0,
                max_advance_minutes: 10080,
                max_bookings_per_day: 10,
                custom_availability: vec![],
            },
        );

        repo.create_meeting(organizer, EventTypeId(1), iv(2, 10, 11), invitee())
            .await
            .unwrap();
        repo.add_calendar_busy(organizer, iv(2, 10, 12));

        let blocks = repo
            .read_busy_blocks(organizer, iv(2, 0, 23))
            .await
            .unwrap();
        // Overlapping meeting + calendar block merge into one.
        assert_eq!(blocks, vec![iv(2, 10, 12)]);
    }

    #[tokio::test]
    async fn test_cancelled_meetings_free_their_time() {
        let repo = LocalRepository::new();
        let organizer = OrganizerId(1);
        repo.add_organizer(organizer, chrono_tz::UTC);
        repo.add_event_type(
            organizer,
            EventTypeConfig {
                id: EventTypeId(1),
                name: "Intro".to_string(),
                duration_minutes: 60,
                buffer_before: 0,
                buffer_after: 0,
                min_notice_minutes: 0,
                max_advance_minutes: 10080,
                max_bookings_per_day: 10,
                custom_availability: vec![],
            },
        );

        let reference = repo
            .create_meeting(organizer, EventTypeId(1), iv(2, 10, 11), invitee())
            .await
            .unwrap();
        assert_eq!(
            repo.read_busy_blocks(organizer, iv(2, 0, 23)).await.unwrap(),
            vec![iv(2, 10, 11)]
        );

        assert!(repo.set_meeting_status(reference, MeetingStatus::Cancelled));
        assert!(repo
            .read_busy_blocks(organizer, iv(2, 0, 23))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_create_meeting_requires_known_event_type() {
        let repo = LocalRepository::new();
        let organizer = OrganizerId(1);
        repo.add_organizer(organizer, chrono_tz::UTC);

        let err = repo
            .create_meeting(organizer, EventTypeId(9), iv(2, 10, 11), invitee())
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::ValidationError { .. }));
    }

    #[tokio::test]
    async fn test_date_override_range_filter() {
        let repo = LocalRepository::new();
        let organizer = OrganizerId(1);
        repo.add_organizer(organizer, chrono_tz::UTC);
        for day in [1, 5, 20] {
            repo.add_date_override(
                organizer,
                DateOverride {
                    date: NaiveDate::from_ymd_opt(2026, 3, day).unwrap(),
                    start_time: None,
                    end_time: None,
                    available: false,
                    reason: String::new(),
                },
            );
        }

        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
        )
        .unwrap();
        let overrides = repo.read_date_overrides(organizer, range).await.unwrap();
        assert_eq!(overrides.len(), 2);
    }
}
