//! Preemptive Round-Robin with a fixed quantum
//!
//! The job vector is the arena; the ready queue holds indices into it, so
//! re-enqueueing never aliases or moves a job record.

use std::collections::VecDeque;

use tracing::debug;

use ossim_core::{ConfigError, Job, Time};

use super::{SchedulingPolicy, Slice};

/// Round-Robin scheduler
pub struct RoundRobinPolicy {
    quantum: Time,
}

impl RoundRobinPolicy {
    pub fn new(quantum: Time) -> Self {
        RoundRobinPolicy { quantum }
    }

}

impl SchedulingPolicy for RoundRobinPolicy {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.quantum == 0 {
            return Err(ConfigError::ZeroQuantum);
        }
        Ok(())
    }

    fn schedule(&self, jobs: &mut Vec<Job>) -> Vec<Slice> {
        // Every job is queued up front, in input order
        let mut ready: VecDeque<usize> = (0..jobs.len()).collect();
        let mut timeline = Vec::new();
        let mut now: Time = 0;

        while let Some(index) = ready.pop_front() {
            let job = &mut jobs[index];

            // Queue order is input order: an unarrived head job stalls the
            // CPU even when a later job is ready
            if now < job.arrival_time {
                debug!(job = job.id, now, arrival = job.arrival_time, "cpu idle until head job arrives");
                now = job.arrival_time;
            }

            let start = now;
            if job.remaining_time > self.quantum {
                job.start_time.get_or_insert(start);
                job.remaining_time -= self.quantum;
                now += self.quantum;

                debug!(job = job.id, start, end = now, remaining = job.remaining_time, "quantum expired");
                timeline.push(Slice::new(job.id, start, now));
                ready.push_back(index);
            } else {
                now += job.remaining_time;
                job.complete(start, now);

                debug!(job = job.id, start, finish = now, "completed");
                timeline.push(Slice::new(job.id, start, now));
            }
        }

        timeline
    }

    fn name(&self) -> &str {
        "RoundRobin"
    }
}
