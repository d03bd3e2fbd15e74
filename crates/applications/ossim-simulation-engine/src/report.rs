//! Text rendering of simulation results
//!
//! Each view wraps a borrowed result and implements [`Display`], so callers
//! can `println!("{}", ScheduleTable(&schedule))` or call `to_string()`.

use std::fmt::{self, Display, Formatter};

use ossim_core::AllocationOutcome;

use crate::allocation::AllocationRun;
use crate::paging::PagingRun;
use crate::scheduling::Schedule;

/// Per-job timing table, dispatch sequence and averages
pub struct ScheduleTable<'a>(pub &'a Schedule);

impl Display for ScheduleTable<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let schedule = self.0;
        writeln!(f, "{} Schedule:", schedule.policy_name)?;
        writeln!(
            f,
            "{:>6} {:>8} {:>8} {:>8} {:>8} {:>8} {:>11} {:>8}",
            "Job", "Arrival", "Service", "Priority", "Start", "Finish", "Turnaround", "Wait"
        )?;
        writeln!(f, "{}", "-".repeat(72))?;

        for job in &schedule.jobs {
            writeln!(
                f,
                "{:>6} {:>8} {:>8} {:>8} {:>8} {:>8} {:>11} {:>8}",
                job.id,
                job.arrival_time,
                job.service_time,
                job.priority,
                OptionalTime(job.start_time),
                OptionalTime(job.finish_time),
                job.turnaround_time,
                job.wait_time,
            )?;
            if let Some(ratio) = job.response_ratio {
                writeln!(f, "{:>6} response ratio at start: {:.2}", "", ratio)?;
            }
        }

        // Dispatch sequence, each slice tagged with its end time
        for slice in &schedule.timeline {
            write!(f, " | {}({})", slice.job_id, slice.end)?;
        }
        if !schedule.timeline.is_empty() {
            writeln!(f, " |")?;
        }

        writeln!(f, "Average Waiting Time: {:.2}", schedule.stats.average_wait)?;
        writeln!(f, "Average Turnaround Time: {:.2}", schedule.stats.average_turnaround)
    }
}

/// One line per policy, for side-by-side comparison
pub struct ScheduleComparison<'a>(pub &'a [Schedule]);

impl Display for ScheduleComparison<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<12} {:>10} {:>12} {:>10} {:>8}",
            "Policy", "Avg Wait", "Avg Turnar.", "Makespan", "Slices"
        )?;
        writeln!(f, "{}", "-".repeat(56))?;
        for schedule in self.0 {
            writeln!(
                f,
                "{:<12} {:>10.2} {:>12.2} {:>10} {:>8}",
                schedule.policy_name,
                schedule.stats.average_wait,
                schedule.stats.average_turnaround,
                schedule.stats.makespan,
                schedule.timeline.len(),
            )?;
        }
        Ok(())
    }
}

/// Per-request allocation lines and the remaining free list
pub struct AllocationReport<'a>(pub &'a AllocationRun);

impl Display for AllocationReport<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let run = self.0;
        writeln!(f, "{} Result:", run.policy)?;
        for outcome in &run.outcomes {
            match outcome {
                AllocationOutcome::Granted { record, .. } => writeln!(
                    f,
                    "Process {}: Start {}, Size {}",
                    record.request_id, record.granted_start, record.granted_size
                )?,
                AllocationOutcome::Failed {
                    request_id,
                    requested_size,
                    ..
                } => writeln!(
                    f,
                    "Process {}: Failed to allocate {} units",
                    request_id, requested_size
                )?,
            }
        }

        write!(f, "Remaining Partitions:")?;
        for partition in run.free_list.partitions() {
            write!(f, " {}", partition)?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "Granted {}/{} requests, {} units free (largest block {})",
            run.stats.granted,
            run.outcomes.len(),
            run.stats.free_after,
            run.stats.largest_free_block
        )
    }
}

/// Hit/fault row, eviction row and fault totals
pub struct PagingReport<'a>(pub &'a PagingRun);

impl Display for PagingReport<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let run = self.0;
        writeln!(f, "{} ({} frames):", run.policy, run.frame_count)?;

        write!(f, "Pages:         ")?;
        for step in &run.steps {
            write!(f, "{:>3}", step.page)?;
        }
        writeln!(f)?;

        write!(f, "Faults:        ")?;
        for step in &run.steps {
            write!(f, "{:>3}", if step.fault { "F" } else { "." })?;
        }
        writeln!(f)?;

        write!(f, "Evicted pages: ")?;
        for step in &run.steps {
            match step.evicted {
                Some(page) => write!(f, "{:>3}", page)?,
                None => write!(f, "{:>3}", "-")?,
            }
        }
        writeln!(f)?;

        writeln!(
            f,
            "Total page faults: {}, Page fault rate: {:.2}%",
            run.stats.faults,
            run.stats.fault_rate * 100.0
        )
    }
}

/// Renders `None` as a dash
struct OptionalTime(Option<u64>);

impl Display for OptionalTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(t) => t.fmt(f),
            None => "-".fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::{allocate, PlacementPolicy};
    use crate::paging::{replay, ReplacementPolicy};
    use crate::scheduling::{simulate, FifoPolicy, HrrnPolicy};
    use ossim_core::{FreeList, Job, Partition};

    #[test]
    fn test_schedule_table() {
        let jobs = vec![Job::new(1, 0, 5), Job::new(2, 1, 3)];
        let schedule = simulate(&FifoPolicy::new(), &jobs).unwrap();
        let text = ScheduleTable(&schedule).to_string();

        assert!(text.starts_with("FIFO Schedule:"));
        assert!(text.contains(" | 1(5) | 2(8) |"));
        assert!(text.contains("Average Waiting Time: 2.00"));
        assert!(text.contains("Average Turnaround Time: 6.00"));
    }

    #[test]
    fn test_schedule_table_shows_ratio() {
        let jobs = vec![Job::new(1, 0, 4), Job::new(2, 1, 1)];
        let schedule = simulate(&HrrnPolicy::new(), &jobs).unwrap();
        let text = ScheduleTable(&schedule).to_string();

        // Job 2 arrives at 1 and starts at 4: ratio (4 - 1) / 1
        assert!(text.contains("response ratio at start: 3.00"));
    }

    #[test]
    fn test_comparison_lists_each_policy() {
        let jobs = vec![Job::new(1, 0, 2)];
        let schedules = vec![
            simulate(&FifoPolicy::new(), &jobs).unwrap(),
            simulate(&HrrnPolicy::new(), &jobs).unwrap(),
        ];
        let text = ScheduleComparison(&schedules).to_string();

        assert!(text.contains("FIFO"));
        assert!(text.contains("HRRN"));
    }

    #[test]
    fn test_allocation_report() {
        let list = FreeList::new(vec![Partition::new(0, 100), Partition::new(200, 50)]).unwrap();
        let run = allocate(&list, &[60, 80], PlacementPolicy::FirstFit).unwrap();
        let text = AllocationReport(&run).to_string();

        assert!(text.contains("Process 1: Start 0, Size 60"));
        assert!(text.contains("Process 2: Failed to allocate 80 units"));
        assert!(text.contains("Remaining Partitions: [Start: 60, Size: 40] [Start: 200, Size: 50]"));
    }

    #[test]
    fn test_paging_report() {
        let run = replay(&[1, 2, 1, 3], 2, ReplacementPolicy::Fifo);
        let text = PagingReport(&run).to_string();

        assert!(text.contains("Faults:          F  F  .  F"));
        assert!(text.contains("Evicted pages:   -  -  -  1"));
        assert!(text.contains("Total page faults: 3, Page fault rate: 75.00%"));
    }
}
