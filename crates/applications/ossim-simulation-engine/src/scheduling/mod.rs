//! CPU scheduling engine
//!
//! Implements the policies to compare:
//! - FIFO: arrival order, non-preemptive
//! - SJF: shortest arrived job first, non-preemptive
//! - HRRN: highest response ratio next, non-preemptive
//! - Round-Robin: fixed quantum, preemptive
//! - Priority: static priority over an already-arrived batch
//!
//! [`simulate`] is the entry point: it validates the workload, hands the
//! policy a fresh copy of every job, and collects the finished jobs (in id
//! order), the dispatch timeline and summary statistics.

pub mod ordering;
pub mod policies;
pub mod round_robin;

use serde::{Deserialize, Serialize};
use tracing::info;

use ossim_core::{validate_jobs, ConfigError, Job, JobId, Time};

pub use policies::{FifoPolicy, HrrnPolicy, PriorityPolicy, SjfPolicy};
pub use round_robin::RoundRobinPolicy;

/// Names accepted by [`policy_by_name`], in reporting order
pub const ALGORITHM_NAMES: [&str; 5] = ["fifo", "sjf", "hrrn", "rr", "priority"];

/// Scheduling policy trait
pub trait SchedulingPolicy {
    /// Check policy parameters before any job runs
    fn validate(&self) -> Result<(), ConfigError> {
        Ok(())
    }

    /// Run every job to completion, filling in its timing fields.
    ///
    /// Receives fresh copies and may reorder them. Returns the dispatch
    /// timeline in execution order.
    fn schedule(&self, jobs: &mut Vec<Job>) -> Vec<Slice>;

    /// Get policy name
    fn name(&self) -> &str;
}

/// Look up a policy by its short CLI name
pub fn policy_by_name(name: &str, quantum: Time) -> Option<Box<dyn SchedulingPolicy>> {
    let policy: Box<dyn SchedulingPolicy> = match name {
        "fifo" | "fcfs" => Box::new(FifoPolicy::new()),
        "sjf" => Box::new(SjfPolicy::new()),
        "hrrn" => Box::new(HrrnPolicy::new()),
        "rr" | "round-robin" => Box::new(RoundRobinPolicy::new(quantum)),
        "priority" => Box::new(PriorityPolicy::new()),
        _ => return None,
    };
    Some(policy)
}

/// One uninterrupted stretch of CPU time given to a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slice {
    pub job_id: JobId,
    pub start: Time,
    pub end: Time,
}

impl Slice {
    pub fn new(job_id: JobId, start: Time, end: Time) -> Self {
        Slice { job_id, start, end }
    }

    pub fn duration(&self) -> Time {
        self.end - self.start
    }
}

/// Aggregate timings of a finished schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleStats {
    pub total_wait: Time,
    pub total_turnaround: Time,
    pub average_wait: f64,
    pub average_turnaround: f64,
    pub makespan: Time, // Finish time of the last job
}

impl ScheduleStats {
    fn from_jobs(jobs: &[Job]) -> Self {
        let total_wait: Time = jobs.iter().map(|j| j.wait_time).sum();
        let total_turnaround: Time = jobs.iter().map(|j| j.turnaround_time).sum();
        let makespan = jobs.iter().filter_map(|j| j.finish_time).max().unwrap_or(0);

        let (average_wait, average_turnaround) = if jobs.is_empty() {
            (0.0, 0.0)
        } else {
            let n = jobs.len() as f64;
            (total_wait as f64 / n, total_turnaround as f64 / n)
        };

        ScheduleStats {
            total_wait,
            total_turnaround,
            average_wait,
            average_turnaround,
            makespan,
        }
    }
}

/// Result of one scheduling run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
    pub policy_name: String,
    pub jobs: Vec<Job>, // Ascending id order
    pub timeline: Vec<Slice>,
    pub stats: ScheduleStats,
}

impl Schedule {
    /// Job ids in the order they were first dispatched
    pub fn dispatch_order(&self) -> Vec<JobId> {
        let mut order = Vec::with_capacity(self.jobs.len());
        for slice in &self.timeline {
            if !order.contains(&slice.job_id) {
                order.push(slice.job_id);
            }
        }
        order
    }

    pub fn job(&self, id: JobId) -> Option<&Job> {
        self.jobs.iter().find(|j| j.id == id)
    }
}

/// Run `policy` over a private copy of `workload`
pub fn simulate(policy: &dyn SchedulingPolicy, workload: &[Job]) -> Result<Schedule, ConfigError> {
    policy.validate()?;
    validate_jobs(workload)?;

    let mut jobs: Vec<Job> = workload.iter().map(Job::fresh).collect();
    let timeline = policy.schedule(&mut jobs);
    jobs.sort_by_key(|j| j.id);

    let stats = ScheduleStats::from_jobs(&jobs);
    info!(
        policy = policy.name(),
        jobs = jobs.len(),
        slices = timeline.len(),
        average_wait = stats.average_wait,
        average_turnaround = stats.average_turnaround,
        "schedule complete"
    );

    Ok(Schedule {
        policy_name: policy.name().to_string(),
        jobs,
        timeline,
        stats,
    })
}
