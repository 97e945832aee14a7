//! Speed-change resolution over a run's interval list.
//!
//! Changes are applied strictly in the order they were declared, each one
//! over the list already fragmented by the ones before it. They are not
//! sorted by time: if a timing file declares changes out of chronological
//! order the resulting fragments follow that declaration order.

use tracing::debug;

use super::interval::{Interval, SpeedChange};

/// Apply every change, in declaration order, to the interval list
pub fn resolve(intervals: Vec<Interval>, changes: &[SpeedChange]) -> Vec<Interval> {
    changes.iter().fold(intervals, |current, change| apply(current, change))
}

/// Apply one change, splitting every interval that contains it
pub fn apply(intervals: Vec<Interval>, change: &SpeedChange) -> Vec<Interval> {
    let mut resolved = Vec::with_capacity(intervals.len() + 1);

    for interval in intervals {
        if interval.contains(change) {
            debug!("Splitting {} at {} -> x{}", interval, change.time, change.speed);
            resolved.extend(interval.split(change));
        } else {
            resolved.push(interval);
        }
    }

    resolved
}
