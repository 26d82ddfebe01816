//! Engine facade exposed to the booking API layer.
//!
//! Wires a repository handle to the availability pipeline and the booking
//! conflict guard. Listing is read-only and idempotent; booking is the
//! single mutation path and is serialized per organizer by the guard.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use log::debug;

use crate::api::{AvailabilityCheck, EventTypeId, OrganizerId, Slot};
use crate::config::EngineConfig;
use crate::db::repository::{AvailabilityRepository, FullRepository, MeetingRepository};
use crate::error::{EngineError, EngineResult};
use crate::models::{interval, DateRange, EventTypeConfig, Interval, Invitee};
use crate::services::booking::{BookingGuard, BookingOutcome};
use crate::services::resolver::{self, ResolveOptions};
use crate::services::rules::{self, RuleContext};
use crate::services::slots::{self, SlotParams};
use crate::services::sources;

/// The availability resolution and booking engine.
///
/// Cheap to clone; clones share the repository handle and the booking
/// lock registry, which is what keeps concurrent bookings for one
/// organizer mutually exclusive.
#[derive(Clone)]
pub struct AvailabilityEngine {
    repo: Arc<dyn FullRepository>,
    guard: BookingGuard,
    config: EngineConfig,
}

impl AvailabilityEngine {
    /// Create an engine with default configuration.
    pub fn new(repo: Arc<dyn FullRepository>) -> Self {
        Self::with_config(repo, EngineConfig::default())
    }

    /// Create an engine with explicit configuration.
    pub fn with_config(repo: Arc<dyn FullRepository>, config: EngineConfig) -> Self {
        let guard = BookingGuard::new(StdDuration::from_millis(config.booking.lock_wait_ms));
        Self {
            repo,
            guard,
            config,
        }
    }

    /// Handle to the underlying repository.
    pub fn repository(&self) -> Arc<dyn FullRepository> {
        self.repo.clone()
    }

    /// Probe the backing store.
    pub async fn health_check(&self) -> EngineResult<bool> {
        Ok(self.repo.health_check().await?)
    }

    /// List bookable slots for an event type over an inclusive
    /// organizer-local date range, expressed in the viewer's timezone.
    pub async fn list_available_slots(
        &self,
        organizer: OrganizerId,
        event_type: EventTypeId,
        range: DateRange,
        viewer_timezone: Tz,
    ) -> EngineResult<Vec<Slot>> {
        self.list_available_slots_at(organizer, event_type, range, viewer_timezone, Utc::now())
            .await
    }

    /// As [`Self::list_available_slots`], with an injected current instant
    /// for deterministic callers.
    pub async fn list_available_slots_at(
        &self,
        organizer: OrganizerId,
        event_type: EventTypeId,
        range: DateRange,
        viewer_timezone: Tz,
        now: DateTime<Utc>,
    ) -> EngineResult<Vec<Slot>> {
        let cfg = self.load_event_type(organizer, event_type).await?;
        let rule_set = self
            .repo
            .read_availability_rules(organizer)
            .await
            .map_err(EngineError::from_config_read)?;

        let resolved = resolver::resolve_availability(
            self.repo.as_ref(),
            organizer,
            range,
            ResolveOptions {
                event_buffer_before: cfg.buffer_before,
                event_buffer_after: cfg.buffer_after,
                custom_weekly: Some(&cfg.custom_availability),
            },
        )
        .await?;

        let (min_notice, max_advance) = rules::generation_bounds(&cfg, &rule_set);
        let params = self.slot_params(&cfg, min_notice, max_advance, now)?;
        let candidates = slots::generate_slots(&resolved.free, &params, resolved.timezone);

        // Limit rules count meetings across whole local weeks.
        let meetings_window = resolved.window.pad(Duration::days(8), Duration::days(8));
        let meetings = self.repo.read_meetings(organizer, meetings_window).await?;

        let ctx = RuleContext {
            now,
            timezone: resolved.timezone,
            event_type: &cfg,
            rules: &rule_set,
            meetings: &meetings,
        };
        let kept = rules::filter_slots(candidates, &ctx);

        debug!(
            "listing for organizer {} event type {}: {} slot(s)",
            organizer.value(),
            event_type.value(),
            kept.len()
        );

        Ok(kept
            .into_iter()
            .map(|iv| Slot::in_timezone(iv, viewer_timezone))
            .collect())
    }

    /// Attempt to book `requested` for an invitee.
    ///
    /// Returns `Committed` for exactly one caller among racers for
    /// overlapping intervals; everyone else observes a specific rejection.
    pub async fn attempt_booking(
        &self,
        organizer: OrganizerId,
        event_type: EventTypeId,
        requested: Interval,
        invitee: Invitee,
    ) -> EngineResult<BookingOutcome> {
        self.attempt_booking_at(organizer, event_type, requested, invitee, Utc::now())
            .await
    }

    /// As [`Self::attempt_booking`], with an injected current instant.
    pub async fn attempt_booking_at(
        &self,
        organizer: OrganizerId,
        event_type: EventTypeId,
        requested: Interval,
        invitee: Invitee,
        now: DateTime<Utc>,
    ) -> EngineResult<BookingOutcome> {
        let cfg = self.load_event_type(organizer, event_type).await?;

        if requested.duration_minutes() != cfg.duration_minutes {
            return Err(EngineError::Configuration(format!(
                "Requested interval is {} minutes; event type '{}' takes {}",
                requested.duration_minutes(),
                cfg.name,
                cfg.duration_minutes
            )));
        }

        self.guard
            .reserve(self.repo.as_ref(), organizer, &cfg, requested, invitee, now)
            .await
    }

    /// Check whether one organizer-local time window is free, returning
    /// the conflicting sub-intervals when it is not.
    ///
    /// Event-type buffers do not apply here; only the organizer's own
    /// schedule, buffer settings and busy blocks are consulted.
    pub async fn check_availability(
        &self,
        organizer: OrganizerId,
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> EngineResult<AvailabilityCheck> {
        if start_time >= end_time {
            return Err(EngineError::Configuration(
                "start_time must be before end_time".to_string(),
            ));
        }

        let resolved = resolver::resolve_availability(
            self.repo.as_ref(),
            organizer,
            DateRange::single(date),
            ResolveOptions::default(),
        )
        .await?;

        let start = sources::local_to_utc(resolved.timezone, date, start_time);
        let end = sources::local_to_utc(resolved.timezone, date, end_time);
        let requested = Interval::new(start, end).ok_or_else(|| {
            EngineError::Configuration("Requested window collapses to nothing in UTC".to_string())
        })?;

        let conflicts = interval::subtract(requested, &resolved.free);
        Ok(AvailabilityCheck {
            is_available: conflicts.is_empty(),
            conflicts,
            date,
            start_time,
            end_time,
        })
    }

    async fn load_event_type(
        &self,
        organizer: OrganizerId,
        event_type: EventTypeId,
    ) -> EngineResult<EventTypeConfig> {
        let cfg = self
            .repo
            .read_event_type(organizer, event_type)
            .await
            .map_err(EngineError::from_config_read)?;
        if cfg.duration_minutes <= 0 {
            return Err(EngineError::Configuration(format!(
                "Event type '{}' has nonpositive duration",
                cfg.name
            )));
        }
        Ok(cfg)
    }

    fn slot_params(
        &self,
        cfg: &EventTypeConfig,
        min_notice: Duration,
        max_advance: Duration,
        now: DateTime<Utc>,
    ) -> EngineResult<SlotParams> {
        let step_minutes = self
            .config
            .slots
            .step_minutes
            .unwrap_or(cfg.duration_minutes);
        let params = SlotParams {
            duration: Duration::minutes(cfg.duration_minutes),
            step: Duration::minutes(step_minutes),
            min_notice,
            max_advance,
            max_per_day: cfg.max_bookings_per_day,
            now,
        };
        params.validate().map_err(EngineError::Configuration)?;
        Ok(params)
    }
}
