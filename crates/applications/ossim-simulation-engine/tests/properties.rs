//! Property tests for the engine invariants

use std::collections::HashMap;

use proptest::prelude::*;

use ossim_core::{AllocationOutcome, FreeList, Job, JobId, Page, Partition, Time};
use ossim_simulation_engine::allocation::{allocate, PlacementPolicy};
use ossim_simulation_engine::paging::{replay, ReplacementPolicy};
use ossim_simulation_engine::scheduling::{
    simulate, FifoPolicy, HrrnPolicy, RoundRobinPolicy, Schedule, SjfPolicy,
};

const PROPTEST_CASES: u32 = 64;

fn workload() -> impl Strategy<Value = Vec<Job>> {
    prop::collection::vec((0u64..40, 1u64..15, -3i64..6), 0..12).prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (arrival, service, priority))| {
                Job::new(i as JobId + 1, arrival, service).with_priority(priority)
            })
            .collect()
    })
}

/// Partitions laid out left to right with random gaps
fn free_list() -> impl Strategy<Value = FreeList> {
    prop::collection::vec((0u64..50, 1u64..200), 0..8).prop_map(|blocks| {
        let mut address = 0;
        let partitions = blocks
            .into_iter()
            .map(|(gap, size)| {
                address += gap;
                let partition = Partition::new(address, size);
                address += size;
                partition
            })
            .collect();
        FreeList::new(partitions).unwrap()
    })
}

fn requests() -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(1u64..250, 0..12)
}

fn references() -> impl Strategy<Value = Vec<Page>> {
    prop::collection::vec(0u64..8, 0..40)
}

fn placement_policy() -> impl Strategy<Value = PlacementPolicy> {
    prop::sample::select(PlacementPolicy::ALL.to_vec())
}

fn replacement_policy() -> impl Strategy<Value = ReplacementPolicy> {
    prop::sample::select(ReplacementPolicy::ALL.to_vec())
}

fn assert_timing_formulas(schedule: &Schedule) -> Result<(), TestCaseError> {
    for job in &schedule.jobs {
        let finish = job.finish_time.unwrap();
        prop_assert_eq!(job.turnaround_time, finish - job.arrival_time);
        prop_assert_eq!(job.wait_time, job.turnaround_time - job.service_time);
        prop_assert!(job.start_time.unwrap() >= job.arrival_time);
    }
    Ok(())
}

fn assert_no_overlap(schedule: &Schedule) -> Result<(), TestCaseError> {
    for pair in schedule.timeline.windows(2) {
        prop_assert!(pair[0].end <= pair[1].start);
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(PROPTEST_CASES))]

    #[test]
    fn fifo_runs_in_arrival_order_without_overlap(jobs in workload()) {
        let schedule = simulate(&FifoPolicy::new(), &jobs).unwrap();

        for job in &schedule.jobs {
            prop_assert_eq!(job.finish_time.unwrap(), job.start_time.unwrap() + job.service_time);
        }
        let arrivals: Vec<Time> = schedule
            .dispatch_order()
            .into_iter()
            .map(|id| schedule.job(id).unwrap().arrival_time)
            .collect();
        prop_assert!(arrivals.windows(2).all(|w| w[0] <= w[1]));
        assert_no_overlap(&schedule)?;
        assert_timing_formulas(&schedule)?;
    }

    #[test]
    fn sjf_and_hrrn_never_start_unarrived_jobs(jobs in workload()) {
        for schedule in [
            simulate(&SjfPolicy::new(), &jobs).unwrap(),
            simulate(&HrrnPolicy::new(), &jobs).unwrap(),
        ] {
            prop_assert_eq!(schedule.jobs.len(), jobs.len());
            assert_no_overlap(&schedule)?;
            assert_timing_formulas(&schedule)?;
        }
    }

    #[test]
    fn round_robin_slices_sum_to_service(jobs in workload(), quantum in 1u64..6) {
        let schedule = simulate(&RoundRobinPolicy::new(quantum), &jobs).unwrap();

        let mut executed: HashMap<JobId, Time> = HashMap::new();
        for slice in &schedule.timeline {
            prop_assert!(slice.duration() >= 1 && slice.duration() <= quantum);
            *executed.entry(slice.job_id).or_default() += slice.duration();
        }
        for job in &schedule.jobs {
            prop_assert_eq!(executed.get(&job.id).copied().unwrap_or(0), job.service_time);
            prop_assert_eq!(job.remaining_time, 0);
        }
        assert_no_overlap(&schedule)?;
        assert_timing_formulas(&schedule)?;
    }

    #[test]
    fn allocation_conserves_free_space(
        list in free_list(),
        sizes in requests(),
        policy in placement_policy(),
    ) {
        let run = allocate(&list, &sizes, policy).unwrap();

        let granted: u64 = run.records().map(|r| r.granted_size).sum();
        prop_assert_eq!(run.free_list.total_free(), list.total_free() - granted);
        for record in run.records() {
            prop_assert_eq!(record.granted_size, sizes[record.request_id - 1]);
        }
    }

    #[test]
    fn allocation_choices_are_in_bounds_and_optimal(
        list in free_list(),
        sizes in requests(),
        policy in placement_policy(),
    ) {
        let run = allocate(&list, &sizes, policy).unwrap();

        for (k, outcome) in run.outcomes.iter().enumerate() {
            // Free list as it stood when request k was serviced
            let before = allocate(&list, &sizes[..k], policy).unwrap().free_list;
            let fitting: Vec<&Partition> =
                before.partitions().iter().filter(|p| p.can_fit(sizes[k])).collect();

            match outcome {
                AllocationOutcome::Granted { record, partition_index, .. } => {
                    let chosen = before.partitions()[*partition_index];
                    prop_assert!(chosen.contains_range(record.granted_start, record.granted_size));
                    match policy {
                        PlacementPolicy::BestFit => {
                            prop_assert!(fitting.iter().all(|p| p.size >= chosen.size));
                        }
                        PlacementPolicy::WorstFit => {
                            prop_assert!(fitting.iter().all(|p| p.size <= chosen.size));
                        }
                        PlacementPolicy::FirstFit => {
                            prop_assert_eq!(fitting[0].start, chosen.start);
                        }
                    }
                }
                AllocationOutcome::Failed { .. } => prop_assert!(fitting.is_empty()),
            }
        }
    }

    #[test]
    fn fault_count_is_bounded(
        refs in references(),
        frames in 0usize..6,
        policy in replacement_policy(),
    ) {
        let run = replay(&refs, frames, policy);

        prop_assert!(run.stats.faults <= refs.len());
        prop_assert_eq!(run.stats.faults + run.stats.hits, refs.len());
        prop_assert!(run.steps.iter().all(|s| s.frames.len() <= frames));
        if frames == 0 {
            prop_assert_eq!(run.stats.faults, refs.len());
        }
    }

    #[test]
    fn lru_rereference_never_evicts(refs in references(), frames in 1usize..6) {
        // Every page is referenced twice in a row
        let doubled: Vec<Page> = refs.iter().flat_map(|&p| [p, p]).collect();
        let run = replay(&doubled, frames, ReplacementPolicy::Lru);

        for step in run.steps.iter().skip(1).step_by(2) {
            prop_assert!(!step.fault);
            prop_assert_eq!(step.evicted, None);
        }
        for step in run.steps.iter().filter(|s| !s.fault) {
            prop_assert_eq!(step.evicted, None);
        }
    }
}
