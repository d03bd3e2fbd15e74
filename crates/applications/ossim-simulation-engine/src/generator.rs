//! Synthetic workload generation
//!
//! Produces reproducible workloads for quick experiments:
//! - Jobs with exponentially distributed inter-arrival gaps
//! - Free lists of gapped partitions and uniform request sizes
//! - Reference strings with a drifting working set (temporal locality)
//!
//! Every generator is seeded, so the same seed always yields the same
//! workload.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp};

use ossim_core::{ConfigError, FreeList, Job, Page, Partition, Time};

/// Shape of a synthetic job mix
#[derive(Debug, Clone)]
pub struct JobProfile {
    pub mean_interarrival: f64, // Mean gap between arrivals
    pub min_service: Time,
    pub max_service: Time,
    pub max_priority: i64, // Priorities drawn from 0..=max_priority
}

impl Default for JobProfile {
    fn default() -> Self {
        JobProfile {
            mean_interarrival: 2.0,
            min_service: 1,
            max_service: 10,
            max_priority: 5,
        }
    }
}

/// Shape of a synthetic memory layout
#[derive(Debug, Clone)]
pub struct MemoryProfile {
    pub partitions: usize,
    pub min_partition: u64,
    pub max_partition: u64,
    pub max_gap: u64, // Allocated space between free blocks
    pub min_request: u64,
    pub max_request: u64,
}

impl Default for MemoryProfile {
    fn default() -> Self {
        MemoryProfile {
            partitions: 5,
            min_partition: 50,
            max_partition: 400,
            max_gap: 100,
            min_request: 10,
            max_request: 250,
        }
    }
}

/// Shape of a synthetic reference string
#[derive(Debug, Clone)]
pub struct ReferenceProfile {
    pub pages: Page,          // Address space size in pages
    pub working_set: Page,    // Pages in the hot window
    pub locality: f64,        // Probability a reference hits the hot window
    pub drift_every: usize,   // References between window shifts
}

impl Default for ReferenceProfile {
    fn default() -> Self {
        ReferenceProfile {
            pages: 10,
            working_set: 4,
            locality: 0.85,
            drift_every: 8,
        }
    }
}

/// Seeded workload generator
pub struct WorkloadGenerator {
    rng: StdRng,
}

impl WorkloadGenerator {
    pub fn new(seed: u64) -> Self {
        WorkloadGenerator {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generate `count` jobs with ids `1..=count` in arrival order
    pub fn jobs(&mut self, count: usize, profile: &JobProfile) -> Result<Vec<Job>, ConfigError> {
        if profile.min_service == 0 || profile.min_service > profile.max_service {
            return Err(ConfigError::invalid(format!(
                "service time range {}..={} must be positive and non-empty",
                profile.min_service, profile.max_service
            )));
        }
        if profile.max_priority < 0 {
            return Err(ConfigError::invalid("max priority must be non-negative"));
        }
        let gaps = Exp::new(1.0 / profile.mean_interarrival)
            .map_err(|_| ConfigError::invalid("mean inter-arrival gap must be positive"))?;

        let mut arrival = 0.0_f64;
        let jobs = (1..=count as u64)
            .map(|id| {
                let job = Job::new(
                    id,
                    arrival.round() as Time,
                    self.rng.gen_range(profile.min_service..=profile.max_service),
                )
                .with_priority(self.rng.gen_range(0..=profile.max_priority));

                arrival += gaps.sample(&mut self.rng);
                job
            })
            .collect();

        Ok(jobs)
    }

    /// Generate a non-overlapping free list in ascending address order
    pub fn free_list(&mut self, profile: &MemoryProfile) -> Result<FreeList, ConfigError> {
        if profile.min_partition == 0 || profile.min_partition > profile.max_partition {
            return Err(ConfigError::invalid(format!(
                "partition size range {}..={} must be positive and non-empty",
                profile.min_partition, profile.max_partition
            )));
        }

        let mut address = 0;
        let mut partitions = Vec::with_capacity(profile.partitions);
        for _ in 0..profile.partitions {
            address += self.rng.gen_range(0..=profile.max_gap);
            let size = self.rng.gen_range(profile.min_partition..=profile.max_partition);
            partitions.push(Partition::new(address, size));
            address += size;
        }

        FreeList::new(partitions)
    }

    /// Generate `count` request sizes
    pub fn requests(&mut self, count: usize, profile: &MemoryProfile) -> Result<Vec<u64>, ConfigError> {
        if profile.min_request == 0 || profile.min_request > profile.max_request {
            return Err(ConfigError::invalid(format!(
                "request size range {}..={} must be positive and non-empty",
                profile.min_request, profile.max_request
            )));
        }

        Ok((0..count)
            .map(|_| self.rng.gen_range(profile.min_request..=profile.max_request))
            .collect())
    }

    /// Generate a reference string with a drifting hot window
    pub fn references(&mut self, count: usize, profile: &ReferenceProfile) -> Result<Vec<Page>, ConfigError> {
        if profile.pages == 0 || profile.working_set == 0 || profile.working_set > profile.pages {
            return Err(ConfigError::invalid(format!(
                "working set {} must be within 1..={} pages",
                profile.working_set, profile.pages
            )));
        }
        if !(0.0..=1.0).contains(&profile.locality) {
            return Err(ConfigError::invalid("locality must be a probability"));
        }

        let mut base: Page = 0;
        let mut references = Vec::with_capacity(count);
        for i in 0..count {
            if profile.drift_every > 0 && i > 0 && i % profile.drift_every == 0 {
                base = (base + 1) % profile.pages;
            }

            let page = if self.rng.gen_bool(profile.locality) {
                (base + self.rng.gen_range(0..profile.working_set)) % profile.pages
            } else {
                self.rng.gen_range(0..profile.pages)
            };
            references.push(page);
        }

        Ok(references)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ossim_core::validate_jobs;

    #[test]
    fn test_same_seed_same_workload() {
        let profile = JobProfile::default();
        let a = WorkloadGenerator::new(7).jobs(20, &profile).unwrap();
        let b = WorkloadGenerator::new(7).jobs(20, &profile).unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn test_generated_jobs_are_valid() {
        let profile = JobProfile::default();
        let jobs = WorkloadGenerator::new(1).jobs(50, &profile).unwrap();

        assert!(validate_jobs(&jobs).is_ok());
        assert_eq!(jobs[0].arrival_time, 0);
        assert!(jobs.windows(2).all(|w| w[0].arrival_time <= w[1].arrival_time));
        for job in &jobs {
            assert!((1..=10).contains(&job.service_time));
            assert!((0..=5).contains(&job.priority));
        }
    }

    #[test]
    fn test_invalid_profiles_rejected() {
        let mut generator = WorkloadGenerator::new(0);

        let bad_service = JobProfile {
            min_service: 0,
            ..JobProfile::default()
        };
        assert!(generator.jobs(3, &bad_service).is_err());

        let bad_gap = JobProfile {
            mean_interarrival: -1.0,
            ..JobProfile::default()
        };
        assert!(generator.jobs(3, &bad_gap).is_err());

        let bad_window = ReferenceProfile {
            working_set: 20,
            ..ReferenceProfile::default()
        };
        assert!(generator.references(3, &bad_window).is_err());
    }

    #[test]
    fn test_free_list_and_requests() {
        let profile = MemoryProfile::default();
        let mut generator = WorkloadGenerator::new(3);

        let list = generator.free_list(&profile).unwrap();
        assert_eq!(list.len(), 5);
        assert!(list.partitions().windows(2).all(|w| w[0].end() <= w[1].start));

        let requests = generator.requests(8, &profile).unwrap();
        assert_eq!(requests.len(), 8);
        assert!(requests.iter().all(|r| (10..=250).contains(r)));
    }

    #[test]
    fn test_references_stay_in_address_space() {
        let profile = ReferenceProfile::default();
        let pages = WorkloadGenerator::new(11).references(100, &profile).unwrap();

        assert_eq!(pages.len(), 100);
        assert!(pages.iter().all(|&p| p < profile.pages));
    }
}
