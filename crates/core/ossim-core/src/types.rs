//! Core types shared by the simulation engines

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{ConfigError, Result};

/// Simulated clock value (integer time units)
pub type Time = u64;

/// Job identifier, unique and positive within a workload
pub type JobId = u64;

/// Virtual page number
pub type Page = u64;

/// A job (process) submitted to the CPU scheduler
///
/// Identity fields are fixed at construction. The timing fields are outputs
/// of a single scheduling run and are reset whenever a workload is cloned
/// into a new run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub arrival_time: Time,
    pub service_time: Time, // CPU burst required to complete
    pub priority: i64,      // Higher = more urgent

    pub remaining_time: Time, // Burst left; only Round-Robin drains it in slices
    pub start_time: Option<Time>,
    pub finish_time: Option<Time>,
    pub wait_time: Time,
    pub turnaround_time: Time,

    /// Response ratio observed when HRRN picked this job
    pub response_ratio: Option<f64>,
}

impl Job {
    pub fn new(id: JobId, arrival_time: Time, service_time: Time) -> Self {
        Job {
            id,
            arrival_time,
            service_time,
            priority: 0,
            remaining_time: service_time,
            start_time: None,
            finish_time: None,
            wait_time: 0,
            turnaround_time: 0,
            response_ratio: None,
        }
    }

    /// Set the static priority (higher runs first under Priority scheduling)
    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    /// Copy of this job with every per-run field cleared
    pub fn fresh(&self) -> Self {
        Job::new(self.id, self.arrival_time, self.service_time).with_priority(self.priority)
    }

    pub fn is_finished(&self) -> bool {
        self.finish_time.is_some()
    }

    /// Record that the job ran to completion at `finish`.
    ///
    /// `start` only takes effect on the first dispatch, so preemptive
    /// schedulers may call this with the start of the final slice.
    pub fn complete(&mut self, start: Time, finish: Time) {
        let start = *self.start_time.get_or_insert(start);
        debug_assert!(start >= self.arrival_time, "job {} started before arrival", self.id);
        debug_assert!(
            finish >= self.arrival_time + self.service_time,
            "job {} finished faster than its service time",
            self.id
        );

        self.remaining_time = 0;
        self.finish_time = Some(finish);
        self.turnaround_time = finish - self.arrival_time;
        self.wait_time = self.turnaround_time - self.service_time;
    }

    /// Response ratio at time `now`: `1 + (now - arrival - service) / service`
    pub fn response_ratio_at(&self, now: Time) -> f64 {
        let waited = now as f64 - self.arrival_time as f64 - self.service_time as f64;
        1.0 + waited / self.service_time as f64
    }
}

/// Reject workloads the scheduler must not silently accept
pub fn validate_jobs(jobs: &[Job]) -> Result<()> {
    let mut seen = HashSet::with_capacity(jobs.len());
    for job in jobs {
        if job.id == 0 {
            return Err(ConfigError::ZeroJobId);
        }
        if !seen.insert(job.id) {
            return Err(ConfigError::DuplicateJobId(job.id));
        }
        if job.service_time == 0 {
            return Err(ConfigError::ZeroServiceTime(job.id));
        }
    }

    // No policy's clock passes the last arrival plus all work, and every
    // turnaround stays under that horizon, so the totals fit too
    let overflow = ConfigError::TimeOverflow { jobs: jobs.len() };
    let last_arrival = jobs.iter().map(|j| j.arrival_time).max().unwrap_or(0);
    let total_service = jobs
        .iter()
        .try_fold(0, |sum: Time, j| sum.checked_add(j.service_time))
        .ok_or_else(|| overflow.clone())?;
    let horizon = last_arrival
        .checked_add(total_service)
        .ok_or_else(|| overflow.clone())?;
    horizon.checked_mul(jobs.len() as Time).ok_or(overflow)?;

    Ok(())
}

/// A contiguous block of free memory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Partition {
    pub start: u64,
    pub size: u64,
}

impl Partition {
    pub fn new(start: u64, size: u64) -> Self {
        Partition { start, size }
    }

    /// One past the last address of the block
    pub fn end(&self) -> u64 {
        self.start + self.size
    }

    /// Check whether an address range lies inside this block
    pub fn contains_range(&self, start: u64, size: u64) -> bool {
        start >= self.start && start + size <= self.end()
    }

    pub fn can_fit(&self, size: u64) -> bool {
        self.size >= size
    }
}

impl std::fmt::Display for Partition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[Start: {}, Size: {}]", self.start, self.size)
    }
}

/// Ordered list of unallocated partitions
///
/// Construction guarantees that no partition is zero-sized and that no two
/// partitions overlap. List order is the order the placement policies scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Partition>", into = "Vec<Partition>")]
pub struct FreeList {
    partitions: Vec<Partition>,
}

impl FreeList {
    pub fn new(partitions: Vec<Partition>) -> Result<Self> {
        for p in &partitions {
            if p.size == 0 {
                return Err(ConfigError::ZeroSizedPartition { start: p.start });
            }
            if p.start.checked_add(p.size).is_none() {
                return Err(ConfigError::AddressOverflow {
                    start: p.start,
                    size: p.size,
                });
            }
        }

        let mut by_address = partitions.clone();
        by_address.sort_by_key(|p| p.start);
        for pair in by_address.windows(2) {
            if pair[0].end() > pair[1].start {
                return Err(ConfigError::OverlappingPartitions {
                    first: pair[0],
                    second: pair[1],
                });
            }
        }

        Ok(FreeList { partitions })
    }

    pub fn partitions(&self) -> &[Partition] {
        &self.partitions
    }

    pub fn len(&self) -> usize {
        self.partitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }

    /// Total free units across all partitions
    pub fn total_free(&self) -> u64 {
        self.partitions.iter().map(|p| p.size).sum()
    }

    /// Size of the largest single block, 0 when the list is empty
    pub fn largest_block(&self) -> u64 {
        self.partitions.iter().map(|p| p.size).max().unwrap_or(0)
    }

    /// Carve `size` units from the front of the partition at `index`.
    ///
    /// Returns the granted start address. A partition shrunk to zero is
    /// removed; the relative order of the others is kept.
    ///
    /// # Panics
    /// If `index` is out of range or the partition is smaller than `size`.
    pub fn carve(&mut self, index: usize, size: u64) -> u64 {
        let partition = &mut self.partitions[index];
        assert!(partition.can_fit(size), "carving {size} from {partition}");

        let granted_start = partition.start;
        partition.start += size;
        partition.size -= size;

        if partition.size == 0 {
            self.partitions.remove(index);
        }
        granted_start
    }
}

impl TryFrom<Vec<Partition>> for FreeList {
    type Error = ConfigError;

    fn try_from(partitions: Vec<Partition>) -> Result<Self> {
        FreeList::new(partitions)
    }
}

impl From<FreeList> for Vec<Partition> {
    fn from(list: FreeList) -> Self {
        list.partitions
    }
}

/// A successful memory grant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationRecord {
    pub request_id: usize, // 1-based position in the request sequence
    pub granted_start: u64,
    pub granted_size: u64,
}

/// What happened to one request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AllocationOutcome {
    Granted {
        record: AllocationRecord,
        partition_index: usize, // Position of the chosen block before carving
        probed: usize,          // Partitions examined by the policy
    },
    Failed {
        request_id: usize,
        requested_size: u64,
        probed: usize,
    },
}

impl AllocationOutcome {
    pub fn request_id(&self) -> usize {
        match self {
            AllocationOutcome::Granted { record, .. } => record.request_id,
            AllocationOutcome::Failed { request_id, .. } => *request_id,
        }
    }

    pub fn record(&self) -> Option<&AllocationRecord> {
        match self {
            AllocationOutcome::Granted { record, .. } => Some(record),
            AllocationOutcome::Failed { .. } => None,
        }
    }

    pub fn is_granted(&self) -> bool {
        self.record().is_some()
    }
}
