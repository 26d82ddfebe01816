//! Advanced availability rule evaluator.
//!
//! Applies the organizer's `AvailabilityRule` policies as per-slot
//! predicates after slot generation, and again narrowed to one slot inside
//! the booking conflict guard. Rules combine conjunctively: a slot failing
//! any applicable rule is removed.
//!
//! Notice/advance rule values take precedence over the event-type
//! defaults. Slot generation therefore runs with the loosest applicable
//! bounds (so rule-relaxed slots exist at all) and this evaluator enforces
//! the exact per-slot bound afterwards.

use chrono::{DateTime, Datelike, Duration, Utc};
use chrono_tz::Tz;

use super::booking::RejectionReason;
use crate::models::{weekday_index, AvailabilityRule, EventTypeConfig, Interval, Meeting, RulePolicy};

/// Shared inputs for rule evaluation.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub now: DateTime<Utc>,
    pub timezone: Tz,
    pub event_type: &'a EventTypeConfig,
    pub rules: &'a [AvailabilityRule],
    /// Existing meetings around the evaluated range, all statuses; only
    /// pending/confirmed ones count.
    pub meetings: &'a [Meeting],
}

/// Loosest notice/advance bounds across the event-type defaults and every
/// rule that could apply to this event type.
///
/// Weekday scoping is ignored here on purpose: a rule relaxing the bound
/// on one weekday must not stop slots on that weekday from being
/// generated. The evaluator re-checks each slot with its exact bounds.
pub fn generation_bounds(cfg: &EventTypeConfig, rules: &[AvailabilityRule]) -> (Duration, Duration) {
    let mut min_notice = cfg.min_notice_minutes;
    let mut max_advance = cfg.max_advance_minutes;

    for rule in rules.iter().filter(|r| r.active) {
        if !rule.applies_to_event_types.is_empty()
            && !rule.applies_to_event_types.contains(&cfg.id)
        {
            continue;
        }
        match rule.policy {
            RulePolicy::MinimumNotice { minutes } => min_notice = min_notice.min(minutes),
            RulePolicy::MaximumAdvance { minutes } => max_advance = max_advance.max(minutes),
            _ => {}
        }
    }

    (
        Duration::minutes(min_notice),
        Duration::minutes(max_advance),
    )
}

/// Evaluate every applicable rule against one candidate slot.
///
/// Returns the first violation; check order mirrors the rejection-reason
/// granularity the booking path reports.
pub fn evaluate_slot(slot: Interval, ctx: &RuleContext<'_>) -> Result<(), RejectionReason> {
    let local_start = slot.start.with_timezone(&ctx.timezone);
    let local_date = local_start.date_naive();
    let weekday = weekday_index(local_date);

    let applicable: Vec<&AvailabilityRule> = ctx
        .rules
        .iter()
        .filter(|r| r.applies_to(ctx.event_type.id, weekday))
        .collect();

    // Notice/advance: rule values replace the event-type defaults; among
    // several applicable rules the strictest wins (AND semantics).
    let rule_notice = applicable
        .iter()
        .filter_map(|r| match r.policy {
            RulePolicy::MinimumNotice { minutes } => Some(minutes),
            _ => None,
        })
        .max();
    let min_notice = rule_notice.unwrap_or(ctx.event_type.min_notice_minutes);
    if slot.start < ctx.now + Duration::minutes(min_notice) {
        return Err(RejectionReason::NoticeViolation);
    }

    let rule_advance = applicable
        .iter()
        .filter_map(|r| match r.policy {
            RulePolicy::MaximumAdvance { minutes } => Some(minutes),
            _ => None,
        })
        .min();
    let max_advance = rule_advance.unwrap_or(ctx.event_type.max_advance_minutes);
    if slot.end > ctx.now + Duration::minutes(max_advance) {
        return Err(RejectionReason::AdvanceViolation);
    }

    let blocking: Vec<&Meeting> = ctx
        .meetings
        .iter()
        .filter(|m| m.status.blocks_time())
        .collect();

    for rule in &applicable {
        match rule.policy {
            RulePolicy::DailyLimit { max_meetings } => {
                let booked = blocking
                    .iter()
                    .filter(|m| {
                        m.interval.start.with_timezone(&ctx.timezone).date_naive() == local_date
                    })
                    .count() as u32;
                if booked + 1 > max_meetings {
                    return Err(RejectionReason::DailyLimitExceeded);
                }
            }
            RulePolicy::WeeklyLimit { max_meetings } => {
                let week = local_date.iso_week();
                let booked = blocking
                    .iter()
                    .filter(|m| {
                        m.interval
                            .start
                            .with_timezone(&ctx.timezone)
                            .date_naive()
                            .iso_week()
                            == week
                    })
                    .count() as u32;
                if booked + 1 > max_meetings {
                    return Err(RejectionReason::WeeklyLimitExceeded);
                }
            }
            RulePolicy::TimeBetweenMeetings { minutes } => {
                let gap = Duration::minutes(minutes);
                let too_close = blocking.iter().any(|m| {
                    let after_existing =
                        slot.start >= m.interval.end && slot.start - m.interval.end < gap;
                    let before_existing =
                        m.interval.start >= slot.end && m.interval.start - slot.end < gap;
                    after_existing || before_existing
                });
                if too_close {
                    return Err(RejectionReason::SpacingViolation);
                }
            }
            RulePolicy::MinimumNotice { .. } | RulePolicy::MaximumAdvance { .. } => {}
        }
    }

    Ok(())
}

/// Remove every slot failing an applicable rule.
pub fn filter_slots(slots: Vec<Interval>, ctx: &RuleContext<'_>) -> Vec<Interval> {
    slots
        .into_iter()
        .filter(|slot| evaluate_slot(*slot, ctx).is_ok())
        .collect()
}

#[cfg(test)]
#[path = "rules_tests.rs"]
mod rules_tests;
