//! Workload loading
//!
//! Each engine has a JSON form and a plain-text form. Files ending in
//! `.json` are read as JSON, anything else as text.
//!
//! Text formats:
//! - jobs: one job per line, `id arrival service [priority]`, or the
//!   five-column process table `id state arrival burst priority` (state is
//!   ignored). A line starting with `-1` ends the input.
//! - memory: first line `start:size` pairs, second line request sizes.
//! - paging: first line the reference string, optional second line the
//!   frame count.
//!
//! Blank lines and lines starting with `#` are skipped everywhere.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use ossim_core::{FreeList, Job, JobId, Page, Partition, Time};

use crate::error::{Result, WorkloadError};

/// A job as written in a workload file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSpec {
    pub id: JobId,
    pub arrival_time: Time,
    pub service_time: Time,
    #[serde(default)]
    pub priority: i64,
}

impl From<JobSpec> for Job {
    fn from(spec: JobSpec) -> Self {
        Job::new(spec.id, spec.arrival_time, spec.service_time).with_priority(spec.priority)
    }
}

impl From<&Job> for JobSpec {
    fn from(job: &Job) -> Self {
        JobSpec {
            id: job.id,
            arrival_time: job.arrival_time,
            service_time: job.service_time,
            priority: job.priority,
        }
    }
}

/// Input to the CPU scheduling engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpuWorkload {
    pub jobs: Vec<JobSpec>,
    #[serde(default)]
    pub quantum: Option<Time>,
}

impl CpuWorkload {
    pub fn jobs(&self) -> Vec<Job> {
        self.jobs.iter().cloned().map(Job::from).collect()
    }
}

/// Input to the memory allocation engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryWorkload {
    pub partitions: FreeList,
    pub requests: Vec<u64>,
}

/// Input to the page replacement engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagingWorkload {
    pub references: Vec<Page>,
    #[serde(default)]
    pub frames: Option<usize>,
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Load a CPU workload from a JSON or text file
pub fn load_cpu(path: impl AsRef<Path>) -> Result<CpuWorkload> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    if is_json(path) {
        return Ok(serde_json::from_str(&content)?);
    }

    let jobs = parse_jobs_text(&content)?;
    Ok(CpuWorkload {
        jobs: jobs.iter().map(JobSpec::from).collect(),
        quantum: None,
    })
}

/// Load a memory workload from a JSON or text file
pub fn load_memory(path: impl AsRef<Path>) -> Result<MemoryWorkload> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    if is_json(path) {
        return Ok(serde_json::from_str(&content)?);
    }
    parse_memory_text(&content)
}

/// Load a paging workload from a JSON or text file
pub fn load_paging(path: impl AsRef<Path>) -> Result<PagingWorkload> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    if is_json(path) {
        return Ok(serde_json::from_str(&content)?);
    }
    parse_paging_text(&content)
}

/// Non-comment lines with their 1-based line numbers
fn content_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
}

fn parse_field<T: FromStr>(line: usize, token: &str, what: &str) -> Result<T> {
    token
        .parse()
        .map_err(|_| WorkloadError::parse(line, format!("invalid {what} `{token}`")))
}

/// Parse job lines (`id arrival service [priority]` or the five-column table)
pub fn parse_jobs_text(text: &str) -> Result<Vec<Job>> {
    let mut jobs = Vec::new();

    for (line, content) in content_lines(text) {
        let tokens: Vec<&str> = content.split_whitespace().collect();
        if tokens[0] == "-1" {
            break;
        }

        let (id, arrival, service, priority) = match tokens.as_slice() {
            [id, arrival, service] => (id, arrival, service, None),
            [id, arrival, service, priority] => (id, arrival, service, Some(priority)),
            [id, _state, arrival, service, priority] => (id, arrival, service, Some(priority)),
            _ => {
                return Err(WorkloadError::parse(
                    line,
                    format!("expected 3 to 5 columns, found {}", tokens.len()),
                ));
            }
        };

        let mut job = Job::new(
            parse_field(line, id, "job id")?,
            parse_field(line, arrival, "arrival time")?,
            parse_field(line, service, "service time")?,
        );
        if let Some(priority) = priority {
            job = job.with_priority(parse_field(line, priority, "priority")?);
        }
        jobs.push(job);
    }

    Ok(jobs)
}

fn parse_pages(line: usize, content: &str) -> Result<Vec<Page>> {
    content
        .split_whitespace()
        .map(|token| parse_field(line, token, "page number"))
        .collect()
}

fn parse_partition(line: usize, token: &str) -> Result<Partition> {
    let (start, size) = token
        .split_once(':')
        .ok_or_else(|| WorkloadError::parse(line, format!("expected start:size, found `{token}`")))?;
    Ok(Partition::new(
        parse_field(line, start, "partition start")?,
        parse_field(line, size, "partition size")?,
    ))
}

/// Parse the memory text format: partitions line, then requests line
pub fn parse_memory_text(text: &str) -> Result<MemoryWorkload> {
    let mut lines = content_lines(text);

    let (line, partitions_line) = lines
        .next()
        .ok_or_else(|| WorkloadError::parse(1, "missing partition line"))?;
    let partitions = partitions_line
        .split_whitespace()
        .map(|token| parse_partition(line, token))
        .collect::<Result<Vec<_>>>()?;

    let requests = match lines.next() {
        Some((line, requests_line)) => requests_line
            .split_whitespace()
            .map(|token| parse_field(line, token, "request size"))
            .collect::<Result<Vec<u64>>>()?,
        None => Vec::new(),
    };

    if let Some((line, _)) = lines.next() {
        return Err(WorkloadError::parse(line, "unexpected trailing line"));
    }

    Ok(MemoryWorkload {
        partitions: FreeList::new(partitions)?,
        requests,
    })
}

/// Parse the paging text format: reference line, optional frame count line
pub fn parse_paging_text(text: &str) -> Result<PagingWorkload> {
    let mut lines = content_lines(text);

    let references = match lines.next() {
        Some((line, content)) => parse_pages(line, content)?,
        None => Vec::new(),
    };

    let frames = match lines.next() {
        Some((line, content)) => Some(parse_field(line, content, "frame count")?),
        None => None,
    };

    if let Some((line, _)) = lines.next() {
        return Err(WorkloadError::parse(line, "unexpected trailing line"));
    }

    Ok(PagingWorkload { references, frames })
}
