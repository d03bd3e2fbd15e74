//! Non-preemptive scheduling policies
//!
//! - FIFO: run in arrival order
//! - SJF: among arrived jobs, run the shortest to completion
//! - HRRN: among arrived jobs, run the one with the highest response ratio
//! - Priority: run a batch in descending static priority

use tracing::debug;

use ossim_core::{Job, Time};

use super::ordering::{
    select_first, stable_sort, ByArrival, ByDescendingPriority, ByResponseRatio, ByServiceTime,
};
use super::{SchedulingPolicy, Slice};

/// First-in first-out: jobs run in arrival order, each to completion
pub struct FifoPolicy;

impl FifoPolicy {
    pub fn new() -> Self {
        FifoPolicy
    }
}

impl SchedulingPolicy for FifoPolicy {
    fn schedule(&self, jobs: &mut Vec<Job>) -> Vec<Slice> {
        stable_sort(jobs, &ByArrival);
        run_in_order(jobs)
    }

    fn name(&self) -> &str {
        "FIFO"
    }
}

/// Shortest job first (non-preemptive)
pub struct SjfPolicy;

impl SjfPolicy {
    pub fn new() -> Self {
        SjfPolicy
    }
}

impl SchedulingPolicy for SjfPolicy {
    fn schedule(&self, jobs: &mut Vec<Job>) -> Vec<Slice> {
        run_admission_loop(jobs, |jobs, ready, _now| {
            select_first(jobs, ready, &ByServiceTime)
        })
    }

    fn name(&self) -> &str {
        "SJF"
    }
}

/// Highest response ratio next
pub struct HrrnPolicy;

impl HrrnPolicy {
    pub fn new() -> Self {
        HrrnPolicy
    }
}

impl SchedulingPolicy for HrrnPolicy {
    fn schedule(&self, jobs: &mut Vec<Job>) -> Vec<Slice> {
        let timeline = run_admission_loop(jobs, |jobs, ready, now| {
            select_first(jobs, ready, &ByResponseRatio { now })
        });

        // Each job was picked at the instant it started
        for job in jobs.iter_mut() {
            job.response_ratio = job.start_time.map(|start| job.response_ratio_at(start));
        }
        timeline
    }

    fn name(&self) -> &str {
        "HRRN"
    }
}

/// Static priority over an already-arrived batch
pub struct PriorityPolicy;

impl PriorityPolicy {
    pub fn new() -> Self {
        PriorityPolicy
    }
}

impl SchedulingPolicy for PriorityPolicy {
    fn schedule(&self, jobs: &mut Vec<Job>) -> Vec<Slice> {
        stable_sort(jobs, &ByDescendingPriority);
        run_in_order(jobs)
    }

    fn name(&self) -> &str {
        "Priority"
    }
}

/// Run every job to completion in slice order, never before its arrival
fn run_in_order(jobs: &mut [Job]) -> Vec<Slice> {
    let mut now: Time = 0;

    jobs.iter_mut()
        .map(|job| {
            let start = now.max(job.arrival_time);
            let finish = start + job.service_time;
            job.complete(start, finish);
            now = finish;

            debug!(job = job.id, start, finish, "dispatched");
            Slice::new(job.id, start, finish)
        })
        .collect()
}

/// Shared SJF/HRRN loop.
///
/// Jobs are admitted to the ready set in arrival order once `arrival <= now`;
/// `pick` returns the position in the ready set of the job to run to
/// completion. With nothing ready the clock jumps to the next arrival.
fn run_admission_loop<F>(jobs: &mut Vec<Job>, pick: F) -> Vec<Slice>
where
    F: Fn(&[Job], &[usize], Time) -> Option<usize>,
{
    stable_sort(jobs, &ByArrival);

    let mut timeline = Vec::with_capacity(jobs.len());
    let mut ready: Vec<usize> = Vec::new();
    let mut next_arrival = 0;
    let mut now: Time = 0;

    while next_arrival < jobs.len() || !ready.is_empty() {
        while next_arrival < jobs.len() && jobs[next_arrival].arrival_time <= now {
            ready.push(next_arrival);
            next_arrival += 1;
        }

        let Some(position) = pick(jobs.as_slice(), &ready, now) else {
            // Ready set empty, so some job is still to arrive
            now = jobs[next_arrival].arrival_time;
            debug!(now, "cpu idle until next arrival");
            continue;
        };

        let job = &mut jobs[ready.remove(position)];
        let finish = now + job.service_time;
        job.complete(now, finish);

        debug!(job = job.id, start = now, finish, waiting = ready.len(), "dispatched");
        timeline.push(Slice::new(job.id, now, finish));
        now = finish;
    }

    timeline
}
