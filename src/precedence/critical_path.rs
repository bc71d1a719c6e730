//! Critical path analysis over Finish-Start relations.
//!
//! Computes earliest/latest start and finish slots of every activity so
//! the encoder can force variables outside those windows to false. The
//! analysis only tightens bounds; it never rejects a feasible instance.
//!
//! # Algorithm
//! The Finish-Start network is viewed with two extra zero-duration nodes:
//! a virtual start before every activity without a predecessor and a
//! virtual end after every activity without a successor. A forward pass
//! in topological order yields earliest times, a backward pass from the
//! horizon yields latest times. The view never touches the project.
//!
//! # Reference
//! Kelley & Walker (1959), "Critical-path planning and scheduling"

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::models::{Project, SequenceKind, TimeBounds};

/// Finish-Start network extended with a virtual start (node 0) and a
/// virtual end (node `n + 1`); activity `i` is node `i + 1`.
struct ExtendedNetwork {
    durations: Vec<i64>,
    successors: Vec<Vec<usize>>,
    predecessors: Vec<Vec<usize>>,
}

impl ExtendedNetwork {
    fn new(project: &Project) -> Self {
        let n = project.activity_count();
        let end = n + 1;
        let mut successors = vec![Vec::new(); n + 2];
        let mut predecessors = vec![Vec::new(); n + 2];

        let mut durations = Vec::with_capacity(n + 2);
        durations.push(0);
        durations.extend(project.activities.iter().map(|a| a.length() as i64));
        durations.push(0);

        // edges come from the relation list; the per-activity link lists
        // are recorded output and may be stale after deserialization
        let finish_start = project
            .sequences
            .iter()
            .filter(|s| s.kind == SequenceKind::FinishStart && s.first < n && s.second < n);
        for s in finish_start {
            let (from, to) = (s.first + 1, s.second + 1);
            if !successors[from].contains(&to) {
                successors[from].push(to);
                predecessors[to].push(from);
            }
        }
        for node in 1..=n {
            if predecessors[node].is_empty() {
                successors[0].push(node);
                predecessors[node].push(0);
            }
        }
        for node in 1..=n {
            if successors[node].is_empty() {
                successors[node].push(end);
                predecessors[end].push(node);
            }
        }
        if n == 0 {
            successors[0].push(end);
            predecessors[end].push(0);
        }

        Self {
            durations,
            successors,
            predecessors,
        }
    }

    fn len(&self) -> usize {
        self.durations.len()
    }

    /// Topological order, smallest index first among ready nodes.
    fn topological_order(&self) -> Vec<usize> {
        let mut indegree: Vec<usize> = self.predecessors.iter().map(Vec::len).collect();
        let mut ready: BinaryHeap<Reverse<usize>> = indegree
            .iter()
            .enumerate()
            .filter(|(_, &d)| d == 0)
            .map(|(i, _)| Reverse(i))
            .collect();
        let mut order = Vec::with_capacity(self.len());
        while let Some(Reverse(node)) = ready.pop() {
            order.push(node);
            for &s in &self.successors[node] {
                indegree[s] -= 1;
                if indegree[s] == 0 {
                    ready.push(Reverse(s));
                }
            }
        }
        order
    }
}

/// Result of the critical path analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CriticalPath {
    bounds: Vec<TimeBounds>,
    minimum_makespan: i64,
}

impl CriticalPath {
    /// Runs the forward and backward passes.
    ///
    /// Activities left out of the topological order (only possible when
    /// the Finish-Start links are cyclic) keep the loosest bounds.
    pub fn analyze(project: &Project) -> Self {
        let net = ExtendedNetwork::new(project);
        let horizon = project.horizon as i64;
        let order = net.topological_order();

        // exclusive finishes: earliest_finish = earliest_start + duration
        let mut earliest_start = vec![0i64; net.len()];
        let mut earliest_finish = net.durations.clone();
        for &node in &order {
            let es = net.predecessors[node]
                .iter()
                .map(|&p| earliest_finish[p])
                .max()
                .unwrap_or(0)
                .max(0);
            earliest_start[node] = es;
            earliest_finish[node] = es + net.durations[node];
        }

        let mut latest_finish = vec![horizon; net.len()];
        let mut latest_start: Vec<i64> = net.durations.iter().map(|d| horizon - d).collect();
        for &node in order.iter().rev() {
            let lf = net.successors[node]
                .iter()
                .map(|&s| latest_start[s])
                .min()
                .unwrap_or(horizon);
            latest_finish[node] = lf;
            latest_start[node] = lf - net.durations[node];
        }

        let bounds = (1..net.len() - 1)
            .map(|node| {
                let d = net.durations[node];
                TimeBounds {
                    earliest_start: earliest_start[node],
                    earliest_finish: earliest_start[node] + d - 1,
                    latest_finish: latest_finish[node] - 1,
                    latest_start: latest_finish[node] - d,
                }
            })
            .collect();

        Self {
            bounds,
            minimum_makespan: earliest_start[net.len() - 1],
        }
    }

    /// Bounds per activity, 0-based inclusive slots.
    pub fn bounds(&self) -> &[TimeBounds] {
        &self.bounds
    }

    pub fn into_bounds(self) -> Vec<TimeBounds> {
        self.bounds
    }

    /// Length of the longest Finish-Start chain, in slots.
    pub fn minimum_makespan(&self) -> i64 {
        self.minimum_makespan
    }

    /// Activities with zero slack.
    pub fn critical_activities(&self) -> Vec<usize> {
        self.bounds
            .iter()
            .enumerate()
            .filter(|(_, b)| b.is_critical())
            .map(|(i, _)| i)
            .collect()
    }
}
