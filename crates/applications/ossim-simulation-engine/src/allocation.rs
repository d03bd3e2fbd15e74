//! Contiguous memory allocation engine
//!
//! Services a sequence of size requests against a free list under one of
//! three placement policies:
//! - **FirstFit**: the first partition large enough
//! - **BestFit**: the smallest partition large enough
//! - **WorstFit**: the largest partition large enough
//!
//! Ties go to the partition that comes first in list order. Requests are
//! handled strictly in input order; a request nothing can satisfy fails and
//! leaves the free list untouched.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use ossim_core::{AllocationOutcome, AllocationRecord, ConfigError, FreeList, Partition};

/// Placement policy types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlacementPolicy {
    FirstFit,
    BestFit,
    WorstFit,
}

impl PlacementPolicy {
    /// All policies, in reporting order
    pub const ALL: [PlacementPolicy; 3] = [
        PlacementPolicy::FirstFit,
        PlacementPolicy::BestFit,
        PlacementPolicy::WorstFit,
    ];

    /// Look up a policy by its short CLI name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "first" | "first-fit" => Some(PlacementPolicy::FirstFit),
            "best" | "best-fit" => Some(PlacementPolicy::BestFit),
            "worst" | "worst-fit" => Some(PlacementPolicy::WorstFit),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PlacementPolicy::FirstFit => "First-Fit",
            PlacementPolicy::BestFit => "Best-Fit",
            PlacementPolicy::WorstFit => "Worst-Fit",
        }
    }

    /// Choose a partition for a request of `size` units.
    ///
    /// Returns the index of the chosen partition (if any) and how many
    /// partitions were examined.
    pub fn select(&self, partitions: &[Partition], size: u64) -> (Option<usize>, usize) {
        match self {
            PlacementPolicy::FirstFit => self.select_first(partitions, size),
            PlacementPolicy::BestFit => {
                let chosen = self.select_extreme(partitions, size, |candidate, best| candidate < best);
                (chosen, partitions.len())
            }
            PlacementPolicy::WorstFit => {
                let chosen = self.select_extreme(partitions, size, |candidate, best| candidate > best);
                (chosen, partitions.len())
            }
        }
    }

    /// First partition that fits; stops probing at the match
    fn select_first(&self, partitions: &[Partition], size: u64) -> (Option<usize>, usize) {
        for (index, partition) in partitions.iter().enumerate() {
            debug!(policy = self.name(), index, size = partition.size, "checking partition");
            if partition.can_fit(size) {
                return (Some(index), index + 1);
            }
        }
        (None, partitions.len())
    }

    /// Full scan keeping the fitting partition that `better` prefers.
    ///
    /// `better(candidate, current)` must be strict so the earliest partition
    /// wins among equal sizes.
    fn select_extreme(
        &self,
        partitions: &[Partition],
        size: u64,
        better: impl Fn(u64, u64) -> bool,
    ) -> Option<usize> {
        let mut chosen: Option<usize> = None;
        for (index, partition) in partitions.iter().enumerate() {
            debug!(policy = self.name(), index, size = partition.size, "checking partition");
            if !partition.can_fit(size) {
                continue;
            }
            match chosen {
                Some(current) if !better(partition.size, partitions[current].size) => {}
                _ => chosen = Some(index),
            }
        }
        chosen
    }
}

impl std::fmt::Display for PlacementPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Aggregate figures for one allocation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationStats {
    pub granted: usize,
    pub failed: usize,
    pub total_granted: u64,
    pub free_before: u64,
    pub free_after: u64,
    pub largest_free_block: u64,
}

/// Result of servicing every request under one policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationRun {
    pub policy: PlacementPolicy,
    pub outcomes: Vec<AllocationOutcome>,
    pub free_list: FreeList,
    pub stats: AllocationStats,
}

impl AllocationRun {
    /// Successful grants, in request order
    pub fn records(&self) -> impl Iterator<Item = &AllocationRecord> {
        self.outcomes.iter().filter_map(AllocationOutcome::record)
    }
}

/// Reject request lists the engine must not silently accept
pub fn validate_requests(requests: &[u64]) -> Result<(), ConfigError> {
    match requests.iter().position(|&size| size == 0) {
        Some(index) => Err(ConfigError::ZeroSizedRequest {
            request_id: index + 1,
        }),
        None => Ok(()),
    }
}

/// Service `requests` in order against a private copy of `initial`
pub fn allocate(
    initial: &FreeList,
    requests: &[u64],
    policy: PlacementPolicy,
) -> Result<AllocationRun, ConfigError> {
    validate_requests(requests)?;

    let mut free_list = initial.clone();
    let mut outcomes = Vec::with_capacity(requests.len());

    for (position, &size) in requests.iter().enumerate() {
        let request_id = position + 1;
        let (chosen, probed) = policy.select(free_list.partitions(), size);

        let outcome = match chosen {
            Some(partition_index) => {
                let granted_start = free_list.carve(partition_index, size);
                debug!(%policy, request_id, size, granted_start, partition_index, "request granted");
                AllocationOutcome::Granted {
                    record: AllocationRecord {
                        request_id,
                        granted_start,
                        granted_size: size,
                    },
                    partition_index,
                    probed,
                }
            }
            None => {
                warn!(%policy, request_id, size, largest = free_list.largest_block(), "no partition large enough");
                AllocationOutcome::Failed {
                    request_id,
                    requested_size: size,
                    probed,
                }
            }
        };
        outcomes.push(outcome);
    }

    let granted = outcomes.iter().filter(|o| o.is_granted()).count();
    let stats = AllocationStats {
        granted,
        failed: outcomes.len() - granted,
        total_granted: outcomes.iter().filter_map(|o| o.record()).map(|r| r.granted_size).sum(),
        free_before: initial.total_free(),
        free_after: free_list.total_free(),
        largest_free_block: free_list.largest_block(),
    };
    info!(
        %policy,
        granted = stats.granted,
        failed = stats.failed,
        free_after = stats.free_after,
        "allocation complete"
    );

    Ok(AllocationRun {
        policy,
        outcomes,
        free_list,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn textbook_free_list() -> FreeList {
        FreeList::new(vec![
            Partition::new(0, 100),
            Partition::new(150, 200),
            Partition::new(400, 300),
        ])
        .unwrap()
    }

    const TEXTBOOK_REQUESTS: [u64; 5] = [50, 70, 120, 30, 90];

    fn grants(run: &AllocationRun) -> Vec<(usize, u64, u64)> {
        run.records()
            .map(|r| (r.request_id, r.granted_start, r.granted_size))
            .collect()
    }

    #[test]
    fn test_first_fit_textbook() {
        let run = allocate(&textbook_free_list(), &TEXTBOOK_REQUESTS, PlacementPolicy::FirstFit).unwrap();

        assert_eq!(
            grants(&run),
            vec![(1, 0, 50), (2, 150, 70), (3, 220, 120), (4, 50, 30), (5, 400, 90)]
        );
        assert_eq!(
            run.free_list.partitions(),
            &[Partition::new(80, 20), Partition::new(340, 10), Partition::new(490, 210)]
        );
        assert_eq!(run.stats.failed, 0);
    }

    #[test]
    fn test_first_fit_shrinks_in_place() {
        let run = allocate(&textbook_free_list(), &[50, 70], PlacementPolicy::FirstFit).unwrap();

        assert_eq!(
            run.free_list.partitions(),
            &[Partition::new(50, 50), Partition::new(220, 130), Partition::new(400, 300)]
        );
    }

    #[test]
    fn test_best_fit_textbook() {
        let run = allocate(&textbook_free_list(), &TEXTBOOK_REQUESTS, PlacementPolicy::BestFit).unwrap();

        assert_eq!(
            grants(&run),
            vec![(1, 0, 50), (2, 150, 70), (3, 220, 120), (4, 50, 30), (5, 400, 90)]
        );
        assert_eq!(
            run.free_list.partitions(),
            &[Partition::new(80, 20), Partition::new(340, 10), Partition::new(490, 210)]
        );
    }

    #[test]
    fn test_worst_fit_textbook() {
        let run = allocate(&textbook_free_list(), &TEXTBOOK_REQUESTS, PlacementPolicy::WorstFit).unwrap();

        assert_eq!(
            grants(&run),
            vec![(1, 400, 50), (2, 450, 70), (3, 150, 120), (4, 520, 30), (5, 550, 90)]
        );
        assert_eq!(
            run.free_list.partitions(),
            &[Partition::new(0, 100), Partition::new(270, 80), Partition::new(640, 60)]
        );
    }

    #[test]
    fn test_best_fit_picks_smallest_fitting() {
        let list = FreeList::new(vec![
            Partition::new(0, 40),
            Partition::new(100, 25),
            Partition::new(200, 30),
            Partition::new(300, 25),
        ])
        .unwrap();

        let run = allocate(&list, &[25], PlacementPolicy::BestFit).unwrap();
        // Exact fit at index 1 wins over the later equal block and is removed
        assert_eq!(grants(&run), vec![(1, 100, 25)]);
        assert_eq!(run.free_list.len(), 3);
        assert_eq!(run.free_list.partitions()[1], Partition::new(200, 30));
    }

    #[test]
    fn test_worst_fit_tie_goes_to_first() {
        let list = FreeList::new(vec![
            Partition::new(0, 10),
            Partition::new(100, 60),
            Partition::new(200, 60),
        ])
        .unwrap();

        let run = allocate(&list, &[5], PlacementPolicy::WorstFit).unwrap();
        assert_eq!(grants(&run), vec![(1, 100, 5)]);
    }

    #[test]
    fn test_failed_request_leaves_list_unchanged() {
        let list = FreeList::new(vec![Partition::new(0, 30), Partition::new(50, 20)]).unwrap();

        for policy in PlacementPolicy::ALL {
            let run = allocate(&list, &[40, 20], policy).unwrap();

            assert!(matches!(
                run.outcomes[0],
                AllocationOutcome::Failed {
                    request_id: 1,
                    requested_size: 40,
                    probed: 2
                }
            ));
            assert!(run.outcomes[1].is_granted());
            assert_eq!(run.stats.granted, 1);
            assert_eq!(run.stats.failed, 1);
            assert_eq!(run.stats.free_after, 30);
        }
    }

    #[test]
    fn test_first_fit_probe_count() {
        let run = allocate(&textbook_free_list(), &[150], PlacementPolicy::FirstFit).unwrap();

        assert!(matches!(
            run.outcomes[0],
            AllocationOutcome::Granted {
                partition_index: 1,
                probed: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_policies_use_independent_copies() {
        let initial = textbook_free_list();

        let first = allocate(&initial, &TEXTBOOK_REQUESTS, PlacementPolicy::FirstFit).unwrap();
        let worst = allocate(&initial, &TEXTBOOK_REQUESTS, PlacementPolicy::WorstFit).unwrap();

        assert_eq!(initial, textbook_free_list());
        assert_ne!(first.free_list, worst.free_list);
    }

    #[test]
    fn test_free_space_accounting() {
        let run = allocate(&textbook_free_list(), &[50, 70, 500, 120], PlacementPolicy::BestFit).unwrap();

        assert_eq!(run.stats.free_before, 600);
        assert_eq!(run.stats.total_granted, 240);
        assert_eq!(run.stats.free_after, run.stats.free_before - run.stats.total_granted);
    }

    #[test]
    fn test_empty_inputs() {
        let run = allocate(&FreeList::default(), &[10], PlacementPolicy::FirstFit).unwrap();
        assert_eq!(run.stats.failed, 1);
        assert_eq!(run.stats.largest_free_block, 0);

        let run = allocate(&textbook_free_list(), &[], PlacementPolicy::WorstFit).unwrap();
        assert!(run.outcomes.is_empty());
        assert_eq!(run.free_list, textbook_free_list());
    }

    #[test]
    fn test_zero_sized_request_rejected() {
        let err = allocate(&textbook_free_list(), &[10, 0], PlacementPolicy::FirstFit).unwrap_err();
        assert_eq!(err, ConfigError::ZeroSizedRequest { request_id: 2 });
    }

    #[test]
    fn test_policy_names() {
        assert_eq!(PlacementPolicy::from_name("best"), Some(PlacementPolicy::BestFit));
        assert_eq!(PlacementPolicy::from_name("worst-fit"), Some(PlacementPolicy::WorstFit));
        assert_eq!(PlacementPolicy::from_name("next"), None);
        assert_eq!(PlacementPolicy::FirstFit.to_string(), "First-Fit");
    }
}
