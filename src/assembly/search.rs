//! Depth-first enumeration of candidate assemblies.
//!
//! Every contig seeds a one-fragment partial assembly. Popping a partial
//! assembly records it with its total cost (junction cost plus the cost of
//! closing the remaining span) and pushes one extension per graph successor,
//! as long as the extended span stays within the target length plus a
//! tolerance. An extension must strictly grow the span, so every path is
//! bounded by the target length and the stack always empties.
//!
//! A bounded max-heap keeps the best `N` totals seen so far. A partial
//! assembly whose junction cost alone is strictly worse than the worst of
//! those totals is dropped together with its subtree. Costs are never
//! negative, so nothing dropped could have entered the best `N`.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::assembly::cost::GapCostTable;
use crate::assembly::graph::AssemblyGraph;
use crate::core::{Contig, ContigContainer, ContigId};

/// Default number of best totals used for pruning
pub const DEFAULT_BEST_OF: usize = 5;

/// Default allowed overshoot of the target length
pub const DEFAULT_SPAN_TOLERANCE: i64 = 100;

/// Accumulated junction cost above which a partial assembly is abandoned
pub const MAX_PATH_JUNCTION_COST: f64 = 10_000.0;

/// Configuration for the path search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Size of the best-cost window used for pruning
    pub best_of: usize,
    /// How far the covered span may exceed the target length
    pub span_tolerance: i64,
    /// Stop after this many pops
    pub max_steps: Option<usize>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            best_of: DEFAULT_BEST_OF,
            span_tolerance: DEFAULT_SPAN_TOLERANCE,
            max_steps: None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Cost(f64);

impl PartialEq for Cost {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Cost {}

impl PartialOrd for Cost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cost {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// The `capacity` lowest costs offered so far
#[derive(Debug, Clone)]
pub struct BestCosts {
    capacity: usize,
    heap: BinaryHeap<Cost>,
}

impl BestCosts {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            heap: BinaryHeap::with_capacity(capacity + 1),
        }
    }

    /// Highest retained cost, or infinity until the window is full
    pub fn worst(&self) -> f64 {
        if self.heap.len() < self.capacity {
            return f64::INFINITY;
        }
        self.heap.peek().map_or(f64::INFINITY, |cost| cost.0)
    }

    /// Offer a cost; returns true if it was retained
    pub fn offer(&mut self, cost: f64) -> bool {
        if self.capacity == 0 {
            return false;
        }
        if self.heap.len() < self.capacity {
            self.heap.push(Cost(cost));
            return true;
        }
        if cost < self.worst() {
            self.heap.pop();
            self.heap.push(Cost(cost));
            return true;
        }
        false
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Retained costs in ascending order
    pub fn costs(&self) -> Vec<f64> {
        let mut costs: Vec<f64> = self.heap.iter().map(|cost| cost.0).collect();
        costs.sort_by(f64::total_cmp);
        costs
    }
}

/// One candidate ordering of fragments.
///
/// An assembly refers to contigs by id and never owns them; resolve them
/// against the container it was planned from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assembly {
    /// Contig ids in assembly order
    pub path: Vec<ContigId>,
    /// Sum of junction costs between consecutive fragments
    pub junction_cost: f64,
    /// Target positions left uncovered; zero or negative once the path
    /// covers the whole target
    pub closing_gap: i64,
    /// Cost of closing the uncovered span
    pub closing_cost: f64,
    /// Total cost
    pub cost: f64,
    /// Lowest total recorded up to and including this assembly
    pub best_cost: f64,
    /// Target positions walked from the first fragment's start to the last
    /// fragment's end
    pub span: i64,
}

impl Assembly {
    pub fn len(&self) -> usize {
        self.path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    pub fn first(&self) -> Option<ContigId> {
        self.path.first().copied()
    }

    pub fn last(&self) -> Option<ContigId> {
        self.path.last().copied()
    }

    /// Consecutive id pairs
    pub fn pairs(&self) -> impl Iterator<Item = (ContigId, ContigId)> + '_ {
        self.path.windows(2).map(|pair| (pair[0], pair[1]))
    }

    pub fn covers_target(&self) -> bool {
        self.closing_gap <= 0
    }

    pub fn is_feasible(&self) -> bool {
        self.cost.is_finite()
    }

    /// Resolve the path against a container; missing ids are skipped
    pub fn contigs<'a>(&self, container: &'a ContigContainer) -> Vec<&'a Contig> {
        self.path.iter().filter_map(|id| container.get(*id)).collect()
    }
}

/// Result of a search run
#[derive(Debug, Clone, Default)]
pub struct SearchOutcome {
    /// Every recorded assembly, ascending by cost
    pub assemblies: Vec<Assembly>,
    /// Number of pops
    pub steps: usize,
    /// Partial assemblies dropped by pruning
    pub pruned: usize,
    /// True if the step budget ran out before the stack emptied
    pub truncated: bool,
}

struct Partial {
    path: Vec<ContigId>,
    junction_cost: f64,
    span: i64,
}

/// Enumerate assemblies of a target of `target_length` positions.
///
/// An empty container yields an empty outcome.
pub fn search(
    container: &ContigContainer,
    graph: &AssemblyGraph,
    costs: &GapCostTable,
    target_length: i64,
    config: &SearchConfig,
) -> SearchOutcome {
    let mut seeds: Vec<&Contig> = container.iter().collect();
    seeds.sort_by(|a, b| b.length().cmp(&a.length()).then(a.id().cmp(&b.id())));
    let mut stack: Vec<Partial> = seeds
        .iter()
        .map(|contig| Partial {
            path: vec![contig.id()],
            junction_cost: 0.0,
            span: contig.length(),
        })
        .collect();

    let mut best = BestCosts::new(config.best_of);
    let mut best_cost = f64::INFINITY;
    let mut outcome = SearchOutcome::default();
    let max_span = target_length.saturating_add(config.span_tolerance);

    while let Some(partial) = stack.pop() {
        if config.max_steps.is_some_and(|max| outcome.steps >= max) {
            outcome.truncated = true;
            break;
        }
        outcome.steps += 1;

        if partial.junction_cost > best.worst()
            || partial.junction_cost > MAX_PATH_JUNCTION_COST
        {
            outcome.pruned += 1;
            continue;
        }

        let closing_gap = target_length - partial.span;
        let closing_cost = costs.get(closing_gap);
        let total = partial.junction_cost + closing_cost;

        if let Some(&last) = partial.path.last() {
            for &next in graph.successors(last) {
                let (Some(contig), Some(junction)) = (container.get(next), graph.junction(last, next))
                else {
                    continue;
                };
                let span = partial.span + junction.gap + contig.length();
                if span <= partial.span || span > max_span {
                    continue;
                }
                let mut path = partial.path.clone();
                path.push(next);
                stack.push(Partial {
                    path,
                    junction_cost: partial.junction_cost + graph.junction_cost(last, next),
                    span,
                });
            }
        }

        best.offer(total);
        best_cost = best_cost.min(total);
        outcome.assemblies.push(Assembly {
            path: partial.path,
            junction_cost: partial.junction_cost,
            closing_gap,
            closing_cost,
            cost: total,
            best_cost,
            span: partial.span,
        });
    }

    outcome
        .assemblies
        .sort_by(|a, b| a.cost.total_cmp(&b.cost));

    if outcome.truncated {
        info!(steps = outcome.steps, "Search stopped at step budget");
    }
    debug!(
        steps = outcome.steps,
        pruned = outcome.pruned,
        recorded = outcome.assemblies.len(),
        best = best_cost,
        "Search finished"
    );
    outcome
}
