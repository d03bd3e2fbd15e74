//! ossim Simulation Engine CLI
//!
//! Runs CPU scheduling, memory placement and page replacement simulations
//! over workload files or seeded synthetic workloads.
//!
//! ## Usage
//!
//! ```bash
//! # Compare every scheduler on a job file
//! ossim-sim cpu --input jobs.txt --quantum 3
//!
//! # Placement policies on 20 random requests
//! ossim-sim memory --random 20 --seed 7
//!
//! # LRU only, 4 frames, results as JSON
//! ossim-sim --output paging.json paging --input refs.txt --frames 4 --policies lru
//!
//! # Classroom workloads for all three engines
//! ossim-sim demo
//! ```

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ossim_core::{FreeList, Job, Page, Partition, Time};
use ossim_simulation_engine::{
    allocation::{allocate, AllocationRun, PlacementPolicy},
    generator::{JobProfile, MemoryProfile, ReferenceProfile, WorkloadGenerator},
    paging::{replay, PagingRun, ReplacementPolicy},
    report::{AllocationReport, PagingReport, ScheduleComparison, ScheduleTable},
    scheduling::{policy_by_name, simulate, Schedule},
    workload,
};

const DEFAULT_QUANTUM: Time = 2;
const DEFAULT_FRAMES: usize = 3;

/// ossim: OS resource-management simulator
#[derive(Parser)]
#[command(name = "ossim-sim")]
#[command(about = "Simulate CPU scheduling, memory placement and page replacement", long_about = None)]
struct Cli {
    /// Output JSON file path (optional)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// CPU scheduling (FIFO, SJF, HRRN, Round-Robin, Priority)
    Cpu {
        /// Job file (.json, or text `id arrival service [priority]`)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Algorithms to compare (comma-separated: fifo,sjf,hrrn,rr,priority)
        #[arg(short, long, default_value = "fifo,sjf,hrrn,rr,priority")]
        algorithms: String,

        /// Round-Robin time quantum (default: from the workload file, else 2)
        #[arg(short, long)]
        quantum: Option<Time>,

        /// Generate this many random jobs instead of reading a file
        #[arg(long)]
        random: Option<usize>,

        /// Seed for --random
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },

    /// Contiguous memory allocation (First-Fit, Best-Fit, Worst-Fit)
    Memory {
        /// Memory file (.json, or text: `start:size` line then request line)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Policies to compare (comma-separated: first,best,worst)
        #[arg(short, long, default_value = "first,best,worst")]
        policies: String,

        /// Generate this many random requests instead of reading a file
        #[arg(long)]
        random: Option<usize>,

        /// Seed for --random
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },

    /// Page replacement (FIFO, LRU)
    Paging {
        /// Reference file (.json, or text: page line then optional frame count)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Number of physical frames (default: from the workload file, else 3)
        #[arg(short, long)]
        frames: Option<usize>,

        /// Policies to compare (comma-separated: fifo,lru)
        #[arg(short, long, default_value = "fifo,lru")]
        policies: String,

        /// Generate a random reference string of this length
        #[arg(long)]
        random: Option<usize>,

        /// Seed for --random
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },

    /// Run the built-in example for every engine
    Demo,
}

/// Everything one invocation produced, for --output
#[derive(Default, Serialize)]
struct SimulationOutput {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    schedules: Vec<Schedule>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    allocations: Vec<AllocationRun>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    paging: Vec<PagingRun>,
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ossim=info,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let mut output = SimulationOutput::default();

    match cli.command {
        Commands::Cpu {
            input,
            algorithms,
            quantum,
            random,
            seed,
        } => {
            let (jobs, file_quantum) = load_jobs(input, random, seed)?;
            let quantum = quantum.or(file_quantum).unwrap_or(DEFAULT_QUANTUM);
            output.schedules = run_cpu(&jobs, &algorithms, quantum)?;
        }

        Commands::Memory {
            input,
            policies,
            random,
            seed,
        } => {
            let (free_list, requests) = load_memory(input, random, seed)?;
            output.allocations = run_memory(&free_list, &requests, &policies)?;
        }

        Commands::Paging {
            input,
            frames,
            policies,
            random,
            seed,
        } => {
            let (references, file_frames) = load_references(input, random, seed)?;
            let frames = frames.or(file_frames).unwrap_or(DEFAULT_FRAMES);
            output.paging = run_paging(&references, frames, &policies);
        }

        Commands::Demo => {
            output = run_demo()?;
        }
    }

    // Output to JSON if requested
    if let Some(path) = cli.output {
        println!("\nWriting results to {}...", path.display());
        let json = serde_json::to_string_pretty(&output)?;
        fs::write(&path, json)
            .with_context(|| format!("failed to write results to {}", path.display()))?;
        println!("  Results saved");
    }

    Ok(())
}

fn banner(title: &str) {
    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║  {:<56}║", title);
    println!("╚══════════════════════════════════════════════════════════╝\n");
}

/// Split a comma-separated name list, dropping empty entries
fn names(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn load_jobs(
    input: Option<PathBuf>,
    random: Option<usize>,
    seed: u64,
) -> anyhow::Result<(Vec<Job>, Option<Time>)> {
    match (input, random) {
        (Some(path), _) => {
            let loaded = workload::load_cpu(&path)
                .with_context(|| format!("failed to load jobs from {}", path.display()))?;
            Ok((loaded.jobs(), loaded.quantum))
        }
        (None, Some(count)) => {
            let jobs = WorkloadGenerator::new(seed).jobs(count, &JobProfile::default())?;
            Ok((jobs, None))
        }
        (None, None) => anyhow::bail!("either --input or --random is required"),
    }
}

fn load_memory(
    input: Option<PathBuf>,
    random: Option<usize>,
    seed: u64,
) -> anyhow::Result<(FreeList, Vec<u64>)> {
    match (input, random) {
        (Some(path), _) => {
            let loaded = workload::load_memory(&path)
                .with_context(|| format!("failed to load memory layout from {}", path.display()))?;
            Ok((loaded.partitions, loaded.requests))
        }
        (None, Some(count)) => {
            let profile = MemoryProfile::default();
            let mut generator = WorkloadGenerator::new(seed);
            let free_list = generator.free_list(&profile)?;
            let requests = generator.requests(count, &profile)?;
            Ok((free_list, requests))
        }
        (None, None) => anyhow::bail!("either --input or --random is required"),
    }
}

fn load_references(
    input: Option<PathBuf>,
    random: Option<usize>,
    seed: u64,
) -> anyhow::Result<(Vec<Page>, Option<usize>)> {
    match (input, random) {
        (Some(path), _) => {
            let loaded = workload::load_paging(&path)
                .with_context(|| format!("failed to load references from {}", path.display()))?;
            Ok((loaded.references, loaded.frames))
        }
        (None, Some(count)) => {
            let references =
                WorkloadGenerator::new(seed).references(count, &ReferenceProfile::default())?;
            Ok((references, None))
        }
        (None, None) => anyhow::bail!("either --input or --random is required"),
    }
}

fn run_cpu(jobs: &[Job], algorithms: &str, quantum: Time) -> anyhow::Result<Vec<Schedule>> {
    banner("CPU Scheduling");
    println!("Configuration:");
    println!("  Jobs: {}", jobs.len());
    println!("  Quantum: {}\n", quantum);

    let mut schedules = Vec::new();
    for name in names(algorithms) {
        let Some(policy) = policy_by_name(name, quantum) else {
            eprintln!("Unknown algorithm: {}", name);
            continue;
        };

        let schedule = simulate(policy.as_ref(), jobs)?;
        println!("{}", ScheduleTable(&schedule));
        schedules.push(schedule);
    }

    if schedules.len() > 1 {
        println!("{}", ScheduleComparison(&schedules));
    }
    Ok(schedules)
}

fn run_memory(
    free_list: &FreeList,
    requests: &[u64],
    policies: &str,
) -> anyhow::Result<Vec<AllocationRun>> {
    banner("Memory Allocation");
    print!("Initial Partitions:");
    for partition in free_list.partitions() {
        print!(" {}", partition);
    }
    println!("\nRequests: {:?}\n", requests);

    let mut runs = Vec::new();
    for name in names(policies) {
        let Some(policy) = PlacementPolicy::from_name(name) else {
            eprintln!("Unknown policy: {}", name);
            continue;
        };

        let run = allocate(free_list, requests, policy)?;
        println!("{}", AllocationReport(&run));
        runs.push(run);
    }
    Ok(runs)
}

fn run_paging(references: &[Page], frames: usize, policies: &str) -> Vec<PagingRun> {
    banner("Page Replacement");
    println!("References: {:?}", references);
    println!("Frames: {}\n", frames);

    let mut runs = Vec::new();
    for name in names(policies) {
        let Some(policy) = ReplacementPolicy::from_name(name) else {
            eprintln!("Unknown policy: {}", name);
            continue;
        };

        let run = replay(references, frames, policy);
        println!("{}", PagingReport(&run));
        runs.push(run);
    }
    runs
}

/// Classic classroom workloads for each engine
fn run_demo() -> anyhow::Result<SimulationOutput> {
    info!("running built-in demo workloads");

    let jobs = vec![
        Job::new(1, 0, 5).with_priority(2),
        Job::new(2, 1, 3).with_priority(4),
        Job::new(3, 2, 8).with_priority(1),
        Job::new(4, 3, 6).with_priority(3),
    ];
    let free_list = FreeList::new(vec![
        Partition::new(0, 100),
        Partition::new(150, 200),
        Partition::new(400, 300),
    ])?;
    let requests = [50, 70, 120, 30, 90];
    let references: [Page; 12] = [1, 2, 3, 4, 1, 2, 5, 1, 2, 3, 4, 5];

    let algorithms = ossim_simulation_engine::scheduling::ALGORITHM_NAMES.join(",");
    Ok(SimulationOutput {
        schedules: run_cpu(&jobs, &algorithms, DEFAULT_QUANTUM)?,
        allocations: run_memory(&free_list, &requests, "first,best,worst")?,
        paging: run_paging(&references, DEFAULT_FRAMES, "fifo,lru"),
    })
}
