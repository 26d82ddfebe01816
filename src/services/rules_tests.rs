use super::*;
use crate::api::{EventTypeId, OrganizerId};
use crate::models::{Invitee, Meeting, MeetingRef, MeetingStatus};
use chrono::TimeZone;
use chrono_tz::UTC;

fn utc(day: u32, h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, day, h, m, 0).unwrap()
}

fn iv(day: u32, start_h: u32, start_m: u32, end_h: u32, end_m: u32) -> Interval {
    Interval::new(utc(day, start_h, start_m), utc(day, end_h, end_m)).unwrap()
}

fn event_type() -> EventTypeConfig {
    EventTypeConfig {
        id: EventTypeId(1),
        name: "Intro call".to_string(),
        duration_minutes: 30,
        buffer_before: 0,
        buffer_after: 0,
        min_notice_minutes: 0,
        max_advance_minutes: 60 * 24 * 30,
        max_bookings_per_day: 10,
        custom_availability: vec![],
    }
}

fn meeting(interval: Interval, status: MeetingStatus) -> Meeting {
    Meeting {
        reference: MeetingRef::generate(),
        organizer: OrganizerId(1),
        event_type: EventTypeId(1),
        interval,
        invitee: Invitee {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            timezone: None,
        },
        status,
    }
}

fn rule(policy: RulePolicy) -> AvailabilityRule {
    AvailabilityRule {
        policy,
        applies_to_weekdays: vec![],
        applies_to_event_types: vec![],
        active: true,
    }
}

#[test]
fn test_no_rules_passes() {
    let cfg = event_type();
    let ctx = RuleContext {
        now: utc(1, 0, 0),
        timezone: UTC,
        event_type: &cfg,
        rules: &[],
        meetings: &[],
    };
    assert!(evaluate_slot(iv(2, 9, 0, 9, 30), &ctx).is_ok());
}

#[test]
fn test_rule_notice_overrides_event_type_default() {
    // Event type requires 8 hours notice, but a rule relaxes it to 1 hour.
    let mut cfg = event_type();
    cfg.min_notice_minutes = 480;
    let rules = [rule(RulePolicy::MinimumNotice { minutes: 60 })];
    let ctx = RuleContext {
        now: utc(2, 7, 0),
        timezone: UTC,
        event_type: &cfg,
        rules: &rules,
        meetings: &[],
    };
    // 09:00 is 2h out: fails the event-type default but passes the rule,
    // and the rule takes precedence.
    assert!(evaluate_slot(iv(2, 9, 0, 9, 30), &ctx).is_ok());

    let ctx_late = RuleContext {
        now: utc(2, 8, 30),
        ..ctx
    };
    assert_eq!(
        evaluate_slot(iv(2, 9, 0, 9, 30), &ctx_late),
        Err(RejectionReason::NoticeViolation)
    );
}

#[test]
fn test_advance_rule_rejects_far_future() {
    let cfg = event_type();
    let rules = [rule(RulePolicy::MaximumAdvance { minutes: 60 * 24 })];
    let ctx = RuleContext {
        now: utc(1, 9, 0),
        timezone: UTC,
        event_type: &cfg,
        rules: &rules,
        meetings: &[],
    };
    assert!(evaluate_slot(iv(2, 8, 0, 8, 30), &ctx).is_ok());
    assert_eq!(
        evaluate_slot(iv(3, 9, 0, 9, 30), &ctx),
        Err(RejectionReason::AdvanceViolation)
    );
}

#[test]
fn test_daily_limit_counts_blocking_meetings_only() {
    let cfg = event_type();
    let rules = [rule(RulePolicy::DailyLimit { max_meetings: 2 })];
    let meetings = vec![
        meeting(iv(2, 9, 0, 9, 30), MeetingStatus::Confirmed),
        meeting(iv(2, 10, 0, 10, 30), MeetingStatus::Pending),
        meeting(iv(2, 11, 0, 11, 30), MeetingStatus::Cancelled),
    ];
    let ctx = RuleContext {
        now: utc(1, 0, 0),
        timezone: UTC,
        event_type: &cfg,
        rules: &rules,
        meetings: &meetings,
    };
    // Two blocking meetings already booked; a third would exceed the cap.
    assert_eq!(
        evaluate_slot(iv(2, 14, 0, 14, 30), &ctx),
        Err(RejectionReason::DailyLimitExceeded)
    );
    // Another date is unaffected.
    assert!(evaluate_slot(iv(3, 14, 0, 14, 30), &ctx).is_ok());
}

#[test]
fn test_weekly_limit_uses_iso_week() {
    let cfg = event_type();
    let rules = [rule(RulePolicy::WeeklyLimit { max_meetings: 1 })];
    // 2026-03-02 (Mon) and 2026-03-06 (Fri) share an ISO week;
    // 2026-03-09 starts the next one.
    let meetings = vec![meeting(iv(2, 9, 0, 9, 30), MeetingStatus::Confirmed)];
    let ctx = RuleContext {
        now: utc(1, 0, 0),
        timezone: UTC,
        event_type: &cfg,
        rules: &rules,
        meetings: &meetings,
    };
    assert_eq!(
        evaluate_slot(iv(6, 9, 0, 9, 30), &ctx),
        Err(RejectionReason::WeeklyLimitExceeded)
    );
    assert!(evaluate_slot(iv(9, 9, 0, 9, 30), &ctx).is_ok());
}

#[test]
fn test_spacing_rejects_slots_near_meetings() {
    let cfg = event_type();
    let rules = [rule(RulePolicy::TimeBetweenMeetings { minutes: 30 })];
    let meetings = vec![meeting(iv(2, 10, 0, 11, 0), MeetingStatus::Confirmed)];
    let ctx = RuleContext {
        now: utc(1, 0, 0),
        timezone: UTC,
        event_type: &cfg,
        rules: &rules,
        meetings: &meetings,
    };
    // Starts 15 minutes after the meeting ends.
    assert_eq!(
        evaluate_slot(iv(2, 11, 15, 11, 45), &ctx),
        Err(RejectionReason::SpacingViolation)
    );
    // Ends 15 minutes before the meeting starts.
    assert_eq!(
        evaluate_slot(iv(2, 9, 15, 9, 45), &ctx),
        Err(RejectionReason::SpacingViolation)
    );
    // Exactly the required gap on both sides passes.
    assert!(evaluate_slot(iv(2, 11, 30, 12, 0), &ctx).is_ok());
    assert!(evaluate_slot(iv(2, 9, 0, 9, 30), &ctx).is_ok());
}

#[test]
fn test_weekday_scoped_rule_skips_other_days() {
    let cfg = event_type();
    // Limit applies to Mondays only (weekday 0).
    let mut limited = rule(RulePolicy::DailyLimit { max_meetings: 1 });
    limited.applies_to_weekdays = vec![0];
    let rules = [limited];
    let meetings = vec![
        meeting(iv(2, 9, 0, 9, 30), MeetingStatus::Confirmed),
        meeting(iv(3, 9, 0, 9, 30), MeetingStatus::Confirmed),
    ];
    let ctx = RuleContext {
        now: utc(1, 0, 0),
        timezone: UTC,
        event_type: &cfg,
        rules: &rules,
        meetings: &meetings,
    };
    // 2026-03-02 is a Monday: limit applies.
    assert_eq!(
        evaluate_slot(iv(2, 14, 0, 14, 30), &ctx),
        Err(RejectionReason::DailyLimitExceeded)
    );
    // 2026-03-03 is a Tuesday: same booked count, but the rule is scoped
    // away.
    assert!(evaluate_slot(iv(3, 14, 0, 14, 30), &ctx).is_ok());
}

#[test]
fn test_event_type_scoped_rule() {
    let cfg = event_type();
    let mut scoped = rule(RulePolicy::DailyLimit { max_meetings: 1 });
    scoped.applies_to_event_types = vec![EventTypeId(99)];
    let rules = [scoped];
    let meetings = vec![meeting(iv(2, 9, 0, 9, 30), MeetingStatus::Confirmed)];
    let ctx = RuleContext {
        now: utc(1, 0, 0),
        timezone: UTC,
        event_type: &cfg,
        rules: &rules,
        meetings: &meetings,
    };
    // The rule targets a different event type.
    assert!(evaluate_slot(iv(2, 14, 0, 14, 30), &ctx).is_ok());
}

#[test]
fn test_inactive_rules_are_ignored() {
    let cfg = event_type();
    let mut inactive = rule(RulePolicy::DailyLimit { max_meetings: 0 });
    inactive.active = false;
    let rules = [inactive];
    let ctx = RuleContext {
        now: utc(1, 0, 0),
        timezone: UTC,
        event_type: &cfg,
        rules: &rules,
        meetings: &[],
    };
    assert!(evaluate_slot(iv(2, 9, 0, 9, 30), &ctx).is_ok());
}

#[test]
fn test_generation_bounds_take_loosest_values() {
    let mut cfg = event_type();
    cfg.min_notice_minutes = 480;
    cfg.max_advance_minutes = 60 * 24;
    let rules = [
        rule(RulePolicy::MinimumNotice { minutes: 60 }),
        rule(RulePolicy::MaximumAdvance { minutes: 60 * 48 }),
    ];
    let (notice, advance) = generation_bounds(&cfg, &rules);
    assert_eq!(notice, Duration::minutes(60));
    assert_eq!(advance, Duration::minutes(60 * 48));
}

#[test]
fn test_filter_slots_drops_violations() {
    let cfg = event_type();
    let rules = [rule(RulePolicy::DailyLimit { max_meetings: 1 })];
    let meetings = vec![meeting(iv(2, 9, 0, 9, 30), MeetingStatus::Confirmed)];
    let ctx = RuleContext {
        now: utc(1, 0, 0),
        timezone: UTC,
        event_type: &cfg,
        rules: &rules,
        meetings: &meetings,
    };
    let kept = filter_slots(vec![iv(2, 14, 0, 14, 30), iv(3, 14, 0, 14, 30)], &ctx);
    assert_eq!(kept, vec![iv(3, 14, 0, 14, 30)]);
}
