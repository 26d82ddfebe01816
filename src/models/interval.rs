//! Half-open UTC time intervals and set operations over them.
//!
//! Every availability source (weekly rules, overrides, meetings, calendar
//! blocks) is reduced to intervals `[start, end)` in UTC before any set
//! operation. All operations here return lists that are sorted ascending by
//! start, non-overlapping and non-empty; zero-length intervals are dropped.
//!
//! Half-open semantics: `a.end == b.start` is NOT an overlap, so
//! back-to-back meetings never conflict.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Half-open UTC time interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Interval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Interval {
    /// Create a new interval. Returns `None` unless `start < end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
        if start < end {
            Some(Self { start, end })
        } else {
            None
        }
    }

    /// Length of the interval.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Length of the interval in whole minutes.
    pub fn duration_minutes(&self) -> i64 {
        self.duration().num_minutes()
    }

    /// Check if a given instant lies inside this interval (inclusive start,
    /// exclusive end).
    pub fn contains_instant(&self, t: DateTime<Utc>) -> bool {
        self.start <= t && t < self.end
    }

    /// Check if `other` is fully contained in this interval.
    pub fn contains(&self, other: &Self) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Check if this interval overlaps with another (half-open).
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Intersection of two intervals, or `None` if they do not overlap.
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        Self::new(start, end)
    }

    /// Expand the interval by `before` on the left and `after` on the right.
    ///
    /// Used to inflate busy blocks with buffer time before subtraction.
    pub fn pad(&self, before: Duration, after: Duration) -> Self {
        Self {
            start: self.start - before,
            end: self.end + after,
        }
    }
}

/// Merge intervals into a sorted, non-overlapping list.
///
/// Overlapping and adjacent intervals coalesce (`[a, b) + [b, c) = [a, c)`).
/// Input order is irrelevant; zero-length inputs are dropped.
pub fn union(mut intervals: Vec<Interval>) -> Vec<Interval> {
    intervals.retain(|iv| iv.start < iv.end);
    if intervals.is_empty() {
        return intervals;
    }

    intervals.sort_by_key(|iv| (iv.start, iv.end));

    let mut merged: Vec<Interval> = Vec::with_capacity(intervals.len());
    for iv in intervals {
        if let Some(last) = merged.last_mut() {
            if iv.start <= last.end {
                last.end = last.end.max(iv.end);
                continue;
            }
        }
        merged.push(iv);
    }

    merged
}

/// Subtract the union of `busy` from `a`.
///
/// Returns the ordered remainder of `a`; empty when `busy` covers it.
pub fn subtract(a: Interval, busy: &[Interval]) -> Vec<Interval> {
    let holes = union(busy.to_vec());

    let mut remainder = Vec::new();
    let mut cursor = a.start;

    for hole in holes {
        if hole.end <= cursor {
            continue;
        }
        if hole.start >= a.end {
            break;
        }
        if cursor < hole.start {
            // Safe: cursor < hole.start <= a.end after the guards above.
            remainder.push(Interval {
                start: cursor,
                end: hole.start.min(a.end),
            });
        }
        cursor = cursor.max(hole.end);
    }

    if cursor < a.end {
        remainder.push(Interval {
            start: cursor,
            end: a.end,
        });
    }

    remainder
}

/// Subtract the union of `busy` from every interval in `free`.
///
/// `free` is unioned first, so the result is sorted and disjoint regardless
/// of input order.
pub fn subtract_all(free: Vec<Interval>, busy: &[Interval]) -> Vec<Interval> {
    let holes = union(busy.to_vec());
    union(free)
        .into_iter()
        .flat_map(|iv| subtract(iv, &holes))
        .collect()
}

/// Clip intervals to a window, dropping parts outside it.
pub fn clip(intervals: &[Interval], window: Interval) -> Vec<Interval> {
    intervals
        .iter()
        .filter_map(|iv| iv.intersect(&window))
        .collect()
}

#[cfg(test)]
#[path = "interval_tests.rs"]
mod interval_tests;
