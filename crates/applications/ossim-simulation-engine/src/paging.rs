//! Page replacement engine
//!
//! Replays a reference string against a fixed number of frames:
//! - **Fifo**: evict the page that has been resident longest
//! - **Lru**: evict the page that has gone unused longest
//!
//! The frame window keeps resident pages in eviction order, so both policies
//! evict the head and insert at the tail; they differ only in what a hit
//! does.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use ossim_core::Page;

/// Replacement policy types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplacementPolicy {
    Fifo,
    Lru,
}

impl ReplacementPolicy {
    /// All policies, in reporting order
    pub const ALL: [ReplacementPolicy; 2] = [ReplacementPolicy::Fifo, ReplacementPolicy::Lru];

    /// Look up a policy by its short CLI name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "fifo" => Some(ReplacementPolicy::Fifo),
            "lru" => Some(ReplacementPolicy::Lru),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ReplacementPolicy::Fifo => "FIFO",
            ReplacementPolicy::Lru => "LRU",
        }
    }
}

impl std::fmt::Display for ReplacementPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Resident pages, head = next victim
#[derive(Debug, Clone)]
pub struct FrameWindow {
    frames: VecDeque<Page>,
    capacity: usize,
}

impl FrameWindow {
    pub fn new(capacity: usize) -> Self {
        FrameWindow {
            frames: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn position(&self, page: Page) -> Option<usize> {
        self.frames.iter().position(|&p| p == page)
    }

    pub fn is_full(&self) -> bool {
        self.frames.len() >= self.capacity
    }

    /// Move the page at `index` to the tail (most recently used)
    pub fn promote(&mut self, index: usize) {
        if let Some(page) = self.frames.remove(index) {
            self.frames.push_back(page);
        }
    }

    /// Load `page` at the tail, evicting the head when the window is full.
    ///
    /// With zero capacity nothing is ever resident and nothing is evicted.
    pub fn load(&mut self, page: Page) -> Option<Page> {
        if self.capacity == 0 {
            return None;
        }
        let evicted = if self.is_full() { self.frames.pop_front() } else { None };
        self.frames.push_back(page);
        evicted
    }

    pub fn pages(&self) -> Vec<Page> {
        self.frames.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// What happened on one reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceStep {
    pub page: Page,
    pub fault: bool,
    pub evicted: Option<Page>,
    pub frames: Vec<Page>, // Window after the reference, head first
}

/// Aggregate figures for one replay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagingStats {
    pub references: usize,
    pub faults: usize,
    pub hits: usize,
    pub fault_rate: f64, // 0.0 for an empty reference string
}

/// Result of replaying a reference string under one policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagingRun {
    pub policy: ReplacementPolicy,
    pub frame_count: usize,
    pub steps: Vec<ReferenceStep>,
    pub stats: PagingStats,
}

impl PagingRun {
    /// Evicted page per reference (`None` on hits and on non-evicting faults)
    pub fn evictions(&self) -> Vec<Option<Page>> {
        self.steps.iter().map(|s| s.evicted).collect()
    }
}

/// Replay `references` against `frame_count` empty frames
pub fn replay(references: &[Page], frame_count: usize, policy: ReplacementPolicy) -> PagingRun {
    let mut window = FrameWindow::new(frame_count);
    let mut steps = Vec::with_capacity(references.len());

    for &page in references {
        let (fault, evicted) = match window.position(page) {
            Some(index) => {
                if policy == ReplacementPolicy::Lru {
                    window.promote(index);
                }
                (false, None)
            }
            None => (true, window.load(page)),
        };

        debug!(%policy, page, fault, ?evicted, "reference");
        steps.push(ReferenceStep {
            page,
            fault,
            evicted,
            frames: window.pages(),
        });
    }

    let faults = steps.iter().filter(|s| s.fault).count();
    let fault_rate = if references.is_empty() {
        0.0
    } else {
        faults as f64 / references.len() as f64
    };
    let stats = PagingStats {
        references: references.len(),
        faults,
        hits: references.len() - faults,
        fault_rate,
    };
    info!(%policy, frame_count, faults, fault_rate, "replay complete");

    PagingRun {
        policy,
        frame_count,
        steps,
        stats,
    }
}
