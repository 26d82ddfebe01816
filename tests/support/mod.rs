//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveTime;
use chrono_tz::Tz;
use meetx_rust::api::{EventTypeId, OrganizerId};
use meetx_rust::config::EngineConfig;
use meetx_rust::db::repository::{
    AvailabilityRepository, MeetingRepository, RepositoryResult,
};
use meetx_rust::db::LocalRepository;
use meetx_rust::models::{
    AvailabilityRule, BufferSettings, DateOverride, DateRange, EventTypeConfig, Interval, Invitee,
    Meeting, MeetingRef, WeeklyRule,
};
use meetx_rust::AvailabilityEngine;

pub const ORGANIZER: OrganizerId = OrganizerId(1);
pub const EVENT_TYPE: EventTypeId = EventTypeId(10);

pub fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

/// An organizer available Monday-Friday 09:00-17:00 in `tz`, with a
/// 30-minute event type and no other constraints.
pub fn business_hours_repo(tz: Tz) -> LocalRepository {
    let repo = LocalRepository::new();
    repo.add_organizer(ORGANIZER, tz);
    for weekday in 0..5 {
        repo.add_weekly_rule(
            ORGANIZER,
            WeeklyRule {
                weekday,
                start_time: t(9, 0),
                end_time: t(17, 0),
                available: true,
            },
        );
    }
    repo.add_event_type(ORGANIZER, thirty_minute_event());
    repo
}

pub fn thirty_minute_event() -> EventTypeConfig {
    EventTypeConfig {
        id: EVENT_TYPE,
        name: "Intro call".to_string(),
        duration_minutes: 30,
        buffer_before: 0,
        buffer_after: 0,
        min_notice_minutes: 0,
        max_advance_minutes: 60 * 24 * 30,
        max_bookings_per_day: 50,
        custom_availability: vec![],
    }
}

pub fn engine_over(repo: &LocalRepository) -> AvailabilityEngine {
    AvailabilityEngine::new(Arc::new(repo.clone()))
}

pub fn invitee(name: &str) -> Invitee {
    Invitee {
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        timezone: None,
    }
}

/// Repository wrapper that delays busy-block reads, for exercising the
/// booking guard's bounded lock wait.
#[derive(Clone)]
pub struct SlowBusyRepository {
    pub inner: LocalRepository,
    pub delay: std::time::Duration,
}

#[async_trait]
impl AvailabilityRepository for SlowBusyRepository {
    async fn read_weekly_rules(
        &self,
        organizer: OrganizerId,
    ) -> RepositoryResult<Vec<WeeklyRule>> {
        self.inner.read_weekly_rules(organizer).await
    }

    async fn read_date_overrides(
        &self,
        organizer: OrganizerId,
        range: DateRange,
    ) -> RepositoryResult<Vec<DateOverride>> {
        self.inner.read_date_overrides(organizer, range).await
    }

    async fn read_buffer_settings(
        &self,
        organizer: OrganizerId,
    ) -> RepositoryResult<Option<BufferSettings>> {
        self.inner.read_buffer_settings(organizer).await
    }

    async fn read_availability_rules(
        &self,
        organizer: OrganizerId,
    ) -> RepositoryResult<Vec<AvailabilityRule>> {
        self.inner.read_availability_rules(organizer).await
    }

    async fn read_organizer_timezone(&self, organizer: OrganizerId) -> RepositoryResult<Tz> {
        self.inner.read_organizer_timezone(organizer).await
    }

    async fn read_event_type(
        &self,
        organizer: OrganizerId,
        event_type: EventTypeId,
    ) -> RepositoryResult<EventTypeConfig> {
        self.inner.read_event_type(organizer, event_type).await
    }

    async fn health_check(&self) -> RepositoryResult<bool> {
        self.inner.health_check().await
    }
}

#[async_trait]
impl MeetingRepository for SlowBusyRepository {
    async fn read_busy_blocks(
        &self,
        organizer: OrganizerId,
        window: Interval,
    ) -> RepositoryResult<Vec<Interval>> {
        tokio::time::sleep(self.delay).await;
        self.inner.read_busy_blocks(organizer, window).await
    }

    async fn read_meetings(
        &self,
        organizer: OrganizerId,
        window: Interval,
    ) -> RepositoryResult<Vec<Meeting>> {
        self.inner.read_meetings(organizer, window).await
    }

    async fn create_meeting(
        &self,
        organizer: OrganizerId,
        event_type: EventTypeId,
        interval: Interval,
        invitee: Invitee,
    ) -> RepositoryResult<MeetingRef> {
        self.inner
            .create_meeting(organizer, event_type, interval, invitee)
            .await
    }
}

/// Engine with a short booking-lock wait over a slow-busy repository.
pub fn contended_engine(repo: SlowBusyRepository, lock_wait_ms: u64) -> AvailabilityEngine {
    let mut config = EngineConfig::default();
    config.booking.lock_wait_ms = lock_wait_ms;
    AvailabilityEngine::with_config(Arc::new(repo), config)
}

/// Repository wrapper whose busy-block reads always fail, for asserting
/// that an unreachable busy source aborts the request instead of being
/// treated as free time.
#[derive(Clone)]
pub struct FailingBusyRepository {
    pub inner: LocalRepository,
}

#[async_trait]
impl AvailabilityRepository for FailingBusyRepository {
    async fn read_weekly_rules(
        &self,
        organizer: OrganizerId,
    ) -> RepositoryResult<Vec<WeeklyRule>> {
        self.inner.read_weekly_rules(organizer).await
    }

    async fn read_date_overrides(
        &self,
        organizer: OrganizerId,
        range: DateRange,
    ) -> RepositoryResult<Vec<DateOverride>> {
        self.inner.read_date_overrides(organizer, range).await
    }

    async fn read_buffer_settings(
        &self,
        organizer: OrganizerId,
    ) -> RepositoryResult<Option<BufferSettings>> {
        self.inner.read_buffer_settings(organizer).await
    }

    async fn read_availability_rules(
        &self,
        organizer: OrganizerId,
    ) -> RepositoryResult<Vec<AvailabilityRule>> {
        self.inner.read_availability_rules(organizer).await
    }

    async fn read_organizer_timezone(&self, organizer: OrganizerId) -> RepositoryResult<Tz> {
        self.inner.read_organizer_timezone(organizer).await
    }

    async fn read_event_type(
        &self,
        organizer: OrganizerId,
        event_type: EventTypeId,
    ) -> RepositoryResult<EventTypeConfig> {
        self.inner.read_event_type(organizer, event_type).await
    }

    async fn health_check(&self) -> RepositoryResult<bool> {
        self.inner.health_check().await
    }
}

#[async_trait]
impl MeetingRepository for FailingBusyRepository {
    async fn read_busy_blocks(
        &self,
        _organizer: OrganizerId,
        _window: Interval,
    ) -> RepositoryResult<Vec<Interval>> {
        Err(meetx_rust::db::RepositoryError::connection(
            "calendar sync store unreachable",
        ))
    }

    async fn read_meetings(
        &self,
        organizer: OrganizerId,
        window: Interval,
    ) -> RepositoryResult<Vec<Meeting>> {
        self.inner.read_meetings(organizer, window).await
    }

    async fn create_meeting(
        &self,
        organizer: OrganizerId,
        event_type: EventTypeId,
        interval: Interval,
        invitee: Invitee,
    ) -> RepositoryResult<MeetingRef> {
        self.inner
            .create_meeting(organizer, event_type, interval, invitee)
            .await
    }
}
