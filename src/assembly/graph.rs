//! Junction feasibility graph over the contigs of a container.
//!
//! Each contig contributes a start node and an end node joined by a
//! `Fragment` edge of nominal weight. A feasible junction from `left` to
//! `right` adds an edge from `left`'s end node to `right`'s start node
//! weighted by its cost. Walking the graph therefore alternates fragment and
//! junction edges, and the weight of a walk is its traversal plus junction
//! cost.

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::assembly::cost::GapCostTable;
use crate::core::{Contig, ContigContainer, ContigId};

/// Configuration for graph construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Junctions need a gap strictly greater than this
    pub min_gap: i64,
    /// Junctions need a gap strictly less than this
    pub max_gap: i64,
    /// Junctions need a cost strictly less than this
    pub max_junction_cost: f64,
    /// Weight of traversing a fragment
    pub fragment_weight: f64,
    /// Evaluate contig pairs on the rayon thread pool
    pub parallel: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            min_gap: -100,
            max_gap: 2000,
            max_junction_cost: 10_000.0,
            fragment_weight: 25.0,
            parallel: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeEnd {
    Start,
    End,
}

/// One end of a fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FragmentNode {
    pub contig: ContigId,
    pub end: NodeEnd,
    /// Query position of this end
    pub position: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Traversal of a single fragment
    Fragment,
    /// Junction that stays on one side of the target origin
    Gap,
    /// Junction that crosses the target origin and closes a circle
    ClosingGap,
}

impl std::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fragment => write!(f, "fragment"),
            Self::Gap => write!(f, "gap"),
            Self::ClosingGap => write!(f, "closing_gap"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub kind: EdgeKind,
    pub weight: f64,
}

/// A feasible join from the end of `left` to the start of `right`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Junction {
    pub left: ContigId,
    pub right: ContigId,
    /// Positions missing between the fragments; negative for overlaps
    pub gap: i64,
    pub cost: f64,
    pub kind: EdgeKind,
}

/// Evaluate the junction from `left` to `right`.
///
/// Returns `None` when the gap is undefined, outside the configured window,
/// or too expensive. Infeasibility is data here, never an error.
pub fn evaluate_pair(
    left: &Contig,
    right: &Contig,
    costs: &GapCostTable,
    config: &GraphConfig,
) -> Option<Junction> {
    if left.id() == right.id() {
        return None;
    }
    let gap = left.query().get_gap_span(right.query())?;
    if gap <= config.min_gap || gap >= config.max_gap {
        return None;
    }
    let cost = costs.get(gap);
    if !cost.is_finite() || cost >= config.max_junction_cost {
        return None;
    }

    let query = left.query();
    let crosses_origin =
        query.is_circular() && !query.context().within_bounds(query.right_end() + gap + 1, true);
    let kind = if crosses_origin {
        EdgeKind::ClosingGap
    } else {
        EdgeKind::Gap
    };

    Some(Junction {
        left: left.id(),
        right: right.id(),
        gap,
        cost,
        kind,
    })
}

/// Directed graph of feasible junctions between contigs
#[derive(Debug, Clone, Default)]
pub struct AssemblyGraph {
    graph: DiGraph<FragmentNode, GraphEdge>,
    nodes: HashMap<ContigId, (NodeIndex, NodeIndex)>,
    junctions: HashMap<(ContigId, ContigId), Junction>,
    successors: HashMap<ContigId, Vec<ContigId>>,
}

impl AssemblyGraph {
    /// Evaluate every ordered pair of contigs and keep the feasible junctions
    #[must_use]
    pub fn build(container: &ContigContainer, costs: &GapCostTable, config: &GraphConfig) -> Self {
        let contigs: Vec<&Contig> = container.iter().collect();
        debug!(
            contigs = contigs.len(),
            pairs = contigs.len() * contigs.len().saturating_sub(1),
            parallel = config.parallel,
            "Evaluating junctions"
        );

        let mut junctions: Vec<Junction> = if config.parallel {
            contigs
                .par_iter()
                .flat_map_iter(|left| {
                    contigs
                        .iter()
                        .filter_map(move |right| evaluate_pair(left, right, costs, config))
                })
                .collect()
        } else {
            contigs
                .iter()
                .flat_map(|left| {
                    contigs
                        .iter()
                        .filter_map(move |right| evaluate_pair(left, right, costs, config))
                })
                .collect()
        };
        junctions.sort_by_key(|j| (j.left, j.right));

        let mut graph = Self::default();
        for junction in junctions {
            let (Some(left), Some(right)) =
                (container.get(junction.left), container.get(junction.right))
            else {
                continue;
            };
            graph.add_junction(left, right, junction, config.fragment_weight);
        }

        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            junctions = graph.junction_count(),
            "Built assembly graph"
        );
        graph
    }

    fn add_fragment(&mut self, contig: &Contig, weight: f64) -> (NodeIndex, NodeIndex) {
        if let Some(&nodes) = self.nodes.get(&contig.id()) {
            return nodes;
        }
        let start = self.graph.add_node(FragmentNode {
            contig: contig.id(),
            end: NodeEnd::Start,
            position: contig.query().start(),
        });
        let end = self.graph.add_node(FragmentNode {
            contig: contig.id(),
            end: NodeEnd::End,
            position: contig.query().end(),
        });
        self.graph.add_edge(
            start,
            end,
            GraphEdge {
                kind: EdgeKind::Fragment,
                weight,
            },
        );
        self.nodes.insert(contig.id(), (start, end));
        (start, end)
    }

    fn add_junction(&mut self, left: &Contig, right: &Contig, junction: Junction, weight: f64) {
        let (_, left_end) = self.add_fragment(left, weight);
        let (right_start, _) = self.add_fragment(right, weight);
        self.graph.add_edge(
            left_end,
            right_start,
            GraphEdge {
                kind: junction.kind,
                weight: junction.cost,
            },
        );
        self.successors
            .entry(junction.left)
            .or_default()
            .push(junction.right);
        self.junctions
            .insert((junction.left, junction.right), junction);
    }

    pub fn junction(&self, left: ContigId, right: ContigId) -> Option<&Junction> {
        self.junctions.get(&(left, right))
    }

    /// Cost of the junction, `f64::INFINITY` when there is none
    pub fn junction_cost(&self, left: ContigId, right: ContigId) -> f64 {
        self.junction(left, right)
            .map_or(f64::INFINITY, |junction| junction.cost)
    }

    /// Contigs that may directly follow `id`, in ascending id order
    pub fn successors(&self, id: ContigId) -> &[ContigId] {
        self.successors
            .get(&id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// All junctions ordered by left then right id
    pub fn junctions(&self) -> Vec<&Junction> {
        let mut junctions: Vec<&Junction> = self.junctions.values().collect();
        junctions.sort_by_key(|j| (j.left, j.right));
        junctions
    }

    /// Fragment traversal plus junction weight of a path, `f64::INFINITY` if
    /// any step is missing
    pub fn path_weight(&self, path: &[ContigId]) -> f64 {
        let mut total = 0.0;
        for (i, id) in path.iter().enumerate() {
            let Some(&(start, end)) = self.nodes.get(id) else {
                return f64::INFINITY;
            };
            total += self.edge_weight(start, end);
            if let Some(next) = path.get(i + 1) {
                let Some(&(next_start, _)) = self.nodes.get(next) else {
                    return f64::INFINITY;
                };
                total += self.edge_weight(end, next_start);
            }
        }
        total
    }

    fn edge_weight(&self, from: NodeIndex, to: NodeIndex) -> f64 {
        self.graph
            .find_edge(from, to)
            .and_then(|edge| self.graph.edge_weight(edge))
            .map_or(f64::INFINITY, |edge| edge.weight)
    }

    pub fn contains(&self, id: ContigId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn junction_count(&self) -> usize {
        self.junctions.len()
    }

    /// The underlying petgraph graph
    pub fn graph(&self) -> &DiGraph<FragmentNode, GraphEdge> {
        &self.graph
    }
}
