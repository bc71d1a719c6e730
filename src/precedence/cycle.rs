//! Event graph and precedence cycle detection.
//!
//! Every activity contributes two nodes, its start (`2a`) and its finish
//! (`2a + 1`), joined by an intrinsic start→finish edge. Every relation
//! adds one edge between the events it names. A cycle in this graph
//! makes the project infeasible whatever the horizon.
//!
//! # Algorithm
//! Three-colour depth-first search with an explicit frame stack, so deep
//! chains do not grow the native call stack.
//!
//! # Reference
//! Cormen et al. (2009), "Introduction to Algorithms", Ch. 22.3

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{ActivitySequence, Event, Project, SequenceKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    Unvisited,
    InProgress,
    Done,
}

/// Directed graph over activity start/finish events.
#[derive(Debug, Clone)]
pub struct EventGraph {
    adjacency: Vec<Vec<usize>>,
}

impl EventGraph {
    /// Creates the graph for `activities` activities with only the
    /// intrinsic start→finish edges.
    pub fn new(activities: usize) -> Self {
        let mut adjacency = vec![Vec::new(); activities * 2];
        for a in 0..activities {
            adjacency[Self::node(a, Event::Start)].push(Self::node(a, Event::Finish));
        }
        Self { adjacency }
    }

    /// Builds the event graph of a project.
    ///
    /// Relations referencing unknown activities are ignored; validation
    /// reports them.
    pub fn from_project(project: &Project) -> Self {
        let n = project.activity_count();
        let mut graph = Self::new(n);
        for s in &project.sequences {
            if s.first < n && s.second < n {
                graph.add_relation(s);
            }
        }
        graph
    }

    /// Node id of an activity event.
    #[inline]
    pub fn node(activity: usize, event: Event) -> usize {
        (activity << 1) + event.bit()
    }

    /// Number of nodes (twice the activity count).
    #[inline]
    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Adds the edge induced by a relation.
    pub fn add_relation(&mut self, sequence: &ActivitySequence) {
        self.add_edge(
            Self::node(sequence.first, sequence.kind.from_event()),
            Self::node(sequence.second, sequence.kind.to_event()),
        );
    }

    /// Adds an edge; parallel edges collapse into one.
    ///
    /// # Panics
    /// If either node is out of range.
    pub fn add_edge(&mut self, from: usize, to: usize) {
        assert!(to < self.adjacency.len(), "event node {to} out of range");
        let targets = &mut self.adjacency[from];
        if let Err(pos) = targets.binary_search(&to) {
            targets.insert(pos, to);
        }
    }

    #[inline]
    pub fn has_edge(&self, from: usize, to: usize) -> bool {
        self.adjacency
            .get(from)
            .is_some_and(|t| t.binary_search(&to).is_ok())
    }

    /// Finds a cycle, returned as a closed node path (`first == last`)
    /// holding only the cyclic segment.
    pub fn find_cycle(&self) -> Option<Vec<usize>> {
        let mut color = vec![Color::Unvisited; self.adjacency.len()];
        // (node, index of the next neighbour to visit)
        let mut frames: Vec<(usize, usize)> = Vec::new();

        for root in 0..self.adjacency.len() {
            if color[root] != Color::Unvisited {
                continue;
            }
            color[root] = Color::InProgress;
            frames.push((root, 0));

            while let Some(&(node, next)) = frames.last() {
                let Some(&succ) = self.adjacency[node].get(next) else {
                    color[node] = Color::Done;
                    frames.pop();
                    continue;
                };
                if let Some(top) = frames.last_mut() {
                    top.1 += 1;
                }
                match color[succ] {
                    Color::InProgress => {
                        // drop the acyclic prefix before the repeated node
                        let from = frames
                            .iter()
                            .position(|&(n, _)| n == succ)
                            .unwrap_or_default();
                        let mut cycle: Vec<usize> = frames[from..].iter().map(|&(n, _)| n).collect();
                        cycle.push(succ);
                        return Some(cycle);
                    }
                    Color::Unvisited => {
                        color[succ] = Color::InProgress;
                        frames.push((succ, 0));
                    }
                    Color::Done => {}
                }
            }
        }
        None
    }
}

/// A chain of relations that closes on itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrecedenceCycle {
    pub relations: Vec<ActivitySequence>,
}

impl PrecedenceCycle {
    /// Translates a closed event path into the relations it traverses,
    /// skipping the intrinsic start→finish edges.
    pub fn from_path(path: &[usize]) -> Self {
        let relations = path
            .windows(2)
            .filter_map(|w| {
                let (from, to) = (w[0], w[1]);
                let intrinsic = from & 1 == 0 && to == from + 1;
                if intrinsic {
                    return None;
                }
                Some(ActivitySequence::new(
                    from >> 1,
                    to >> 1,
                    SequenceKind::between(Event::from_bit(from), Event::from_bit(to)),
                ))
            })
            .collect();
        Self { relations }
    }
}

impl fmt::Display for PrecedenceCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.relations.iter().map(|r| r.to_string()).collect();
        f.write_str(&parts.join(" -> "))
    }
}

/// Checks a project's relations for a cycle.
pub fn check_sequences(project: &Project) -> Option<PrecedenceCycle> {
    EventGraph::from_project(project)
        .find_cycle()
        .map(|path| PrecedenceCycle::from_path(&path))
}
