//! Tie-break rules for the scheduling policies
//!
//! Each rule is a small named strategy. Sorting goes through [`stable_sort`]
//! and ready-set selection through [`select_first`], so equal keys always
//! keep input/arrival order.

use std::cmp::Ordering;

use ossim_core::{Job, Time};

/// A comparison rule between two jobs
pub trait JobOrdering {
    /// `Less` means `a` should run before `b`
    fn compare(&self, a: &Job, b: &Job) -> Ordering;
}

/// Earliest arrival first
#[derive(Debug, Clone, Copy, Default)]
pub struct ByArrival;

impl JobOrdering for ByArrival {
    fn compare(&self, a: &Job, b: &Job) -> Ordering {
        a.arrival_time.cmp(&b.arrival_time)
    }
}

/// Shortest service time first
#[derive(Debug, Clone, Copy, Default)]
pub struct ByServiceTime;

impl JobOrdering for ByServiceTime {
    fn compare(&self, a: &Job, b: &Job) -> Ordering {
        a.service_time.cmp(&b.service_time)
    }
}

/// Highest priority value first
#[derive(Debug, Clone, Copy, Default)]
pub struct ByDescendingPriority;

impl JobOrdering for ByDescendingPriority {
    fn compare(&self, a: &Job, b: &Job) -> Ordering {
        b.priority.cmp(&a.priority)
    }
}

/// Highest response ratio at time `now` first
///
/// `1 + (now - arrival - service) / service` reduces to
/// `(now - arrival) / service`, which is compared by cross-multiplication so
/// equal ratios compare equal exactly.
#[derive(Debug, Clone, Copy)]
pub struct ByResponseRatio {
    pub now: Time,
}

impl JobOrdering for ByResponseRatio {
    fn compare(&self, a: &Job, b: &Job) -> Ordering {
        // Only admitted jobs are compared, so arrival <= now
        let waited_a = self.now.saturating_sub(a.arrival_time) as u128;
        let waited_b = self.now.saturating_sub(b.arrival_time) as u128;

        let ratio_a = waited_a * b.service_time as u128;
        let ratio_b = waited_b * a.service_time as u128;
        ratio_b.cmp(&ratio_a)
    }
}

/// Stable sort of `jobs` under `ordering`
pub fn stable_sort<O: JobOrdering + ?Sized>(jobs: &mut [Job], ordering: &O) {
    jobs.sort_by(|a, b| ordering.compare(a, b));
}

/// Position in `candidates` of the job that should run next.
///
/// `candidates` holds indices into `jobs`; among equally ranked jobs the one
/// that appears first in `candidates` wins.
pub fn select_first<O: JobOrdering + ?Sized>(
    jobs: &[Job],
    candidates: &[usize],
    ordering: &O,
) -> Option<usize> {
    candidates
        .iter()
        .enumerate()
        .min_by(|&(_, &a), &(_, &b)| ordering.compare(&jobs[a], &jobs[b]))
        .map(|(position, _)| position)
}
