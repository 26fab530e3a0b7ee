//! Planner entry point: configuration, cleanup and the full planning run.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::assembly::cost::{CostConfig, GapCostTable};
use crate::assembly::graph::{AssemblyGraph, GraphConfig};
use crate::assembly::search::{search, Assembly, SearchConfig};
use crate::core::{ContigContainer, ContigError, ContigId, Context};

#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("Failed to read config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Contig {id} is not aligned to the target {target}")]
    TargetMismatch { id: ContigId, target: String },

    #[error(transparent)]
    Contig(#[from] ContigError),
}

/// Full configuration of a planning run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub cost: CostConfig,
    pub graph: GraphConfig,
    pub search: SearchConfig,
    /// Drop contigs that repeat another contig's query span
    pub remove_redundant: bool,
    /// Re-join alignments split at the origin of a circular sequence
    pub fuse_circular_fragments: bool,
    /// Split contigs this far from every contig end
    pub circular_partition: Option<i64>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            cost: CostConfig::default(),
            graph: GraphConfig::default(),
            search: SearchConfig::default(),
            remove_redundant: true,
            fuse_circular_fragments: true,
            circular_partition: None,
        }
    }
}

impl PlannerConfig {
    /// Load a configuration from a JSON file; missing fields take defaults
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::ConfigIo` if the file cannot be read,
    /// `PlannerError::ConfigParse` if it is not valid JSON, or
    /// `PlannerError::InvalidConfig` if the values are inconsistent.
    pub fn from_json_file(path: &Path) -> Result<Self, PlannerError> {
        let text = std::fs::read_to_string(path).map_err(|source| PlannerError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| PlannerError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns `PlannerError::InvalidConfig` describing the first problem found.
    pub fn validate(&self) -> Result<(), PlannerError> {
        if self.cost.min_gap > self.cost.max_gap {
            return Err(PlannerError::InvalidConfig(format!(
                "cost range {}..={} is empty",
                self.cost.min_gap, self.cost.max_gap
            )));
        }
        if self.graph.min_gap >= self.graph.max_gap {
            return Err(PlannerError::InvalidConfig(format!(
                "junction window ({}, {}) is empty",
                self.graph.min_gap, self.graph.max_gap
            )));
        }
        if self.graph.fragment_weight < 0.0 || self.cost.primer_cost < 0.0 || self.cost.cost_per_bp < 0.0 {
            return Err(PlannerError::InvalidConfig(
                "weights and prices must not be negative".to_string(),
            ));
        }
        if self.search.span_tolerance < 0 {
            return Err(PlannerError::InvalidConfig(format!(
                "span tolerance must not be negative, got {}",
                self.search.span_tolerance
            )));
        }
        if let Some(length) = self.circular_partition {
            if length < 1 {
                return Err(PlannerError::InvalidConfig(format!(
                    "circular partition length must be positive, got {length}"
                )));
            }
        }
        Ok(())
    }
}

/// What the cleanup pass changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    pub redundant_removed: usize,
    pub fused: usize,
    pub partitioned: usize,
}

/// Outcome of [`Assembler::plan`]
#[derive(Debug, Clone)]
pub struct Plan {
    /// Every recorded assembly, ascending by cost
    pub assemblies: Vec<Assembly>,
    pub cleanup: CleanupReport,
    pub graph: AssemblyGraph,
    pub steps: usize,
    pub pruned: usize,
    pub truncated: bool,
}

impl Plan {
    /// The cheapest assembly that covers the whole target
    pub fn best_full_cover(&self) -> Option<&Assembly> {
        self.assemblies
            .iter()
            .find(|a| a.covers_target() && a.is_feasible())
    }
}

/// Runs cleanup, graph construction and search for one target
pub struct Assembler {
    target: Arc<Context>,
    container: ContigContainer,
    config: PlannerConfig,
    costs: GapCostTable,
}

impl Assembler {
    /// # Errors
    ///
    /// Returns `PlannerError::InvalidConfig` for inconsistent settings or
    /// `PlannerError::TargetMismatch` if a contig's query is measured
    /// against a different coordinate space than the target.
    pub fn new(
        target: Arc<Context>,
        container: ContigContainer,
        config: PlannerConfig,
    ) -> Result<Self, PlannerError> {
        config.validate()?;
        if let Some(stray) = container
            .iter()
            .find(|c| !c.query().context().is_compatible(&target))
        {
            return Err(PlannerError::TargetMismatch {
                id: stray.id(),
                target: target.to_string(),
            });
        }
        let costs = GapCostTable::new(&config.cost);
        Ok(Self {
            target,
            container,
            config,
            costs,
        })
    }

    pub fn target(&self) -> &Arc<Context> {
        &self.target
    }

    pub fn container(&self) -> &ContigContainer {
        &self.container
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn costs(&self) -> &GapCostTable {
        &self.costs
    }

    /// Apply the configured container cleanup steps
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::Contig` if fusing or partitioning fails.
    pub fn cleanup(&mut self) -> Result<CleanupReport, PlannerError> {
        let mut report = CleanupReport::default();
        if self.config.fuse_circular_fragments {
            report.fused = self.container.fuse_circular_fragments()?;
        }
        if let Some(length) = self.config.circular_partition {
            report.partitioned = self.container.circular_partition(length)?.len();
        }
        if self.config.remove_redundant {
            report.redundant_removed = self.container.remove_redundant_contigs();
        }
        debug!(?report, contigs = self.container.len(), "Cleaned up contigs");
        Ok(report)
    }

    #[must_use]
    pub fn build_graph(&self) -> AssemblyGraph {
        AssemblyGraph::build(&self.container, &self.costs, &self.config.graph)
    }

    /// Clean up the container, build the graph and rank assemblies
    ///
    /// # Errors
    ///
    /// See [`Assembler::cleanup`].
    pub fn plan(&mut self) -> Result<Plan, PlannerError> {
        let cleanup = self.cleanup()?;
        let graph = self.build_graph();
        let outcome = search(
            &self.container,
            &graph,
            &self.costs,
            self.target.length(),
            &self.config.search,
        );

        info!(
            contigs = self.container.len(),
            junctions = graph.junction_count(),
            assemblies = outcome.assemblies.len(),
            best = outcome.assemblies.first().map_or(f64::INFINITY, |a| a.cost),
            "Planned assemblies"
        );

        Ok(Plan {
            assemblies: outcome.assemblies,
            cleanup,
            graph,
            steps: outcome.steps,
            pruned: outcome.pruned,
            truncated: outcome.truncated,
        })
    }
}
