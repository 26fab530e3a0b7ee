//! Command-line interface for assembly-planner.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **plan**: Rank the cheapest ways to assemble a target from aligned fragments
//! - **graph**: List every feasible junction between fragments
//!
//! ## Usage
//!
//! ```text
//! # Plan a circular 5 kb target from BLAST-style hits
//! assembly-planner plan hits.tsv --target-length 5000
//!
//! # JSON input already describes the target
//! assembly-planner plan alignments.json --top 3 --format json
//!
//! # Pipe from an aligner
//! blastn ... | assembly-planner plan - --target-length 5000 --linear
//!
//! # Inspect the junctions the search will use
//! assembly-planner graph alignments.json --format tsv
//! ```

use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{bail, Context as _};
use clap::{Args, Parser, Subcommand};

use crate::assembly::PlannerConfig;
use crate::parsing::alignments::{self, AlignmentSet, BuiltContainer, TargetInfo};

pub mod graph;
pub mod plan;

#[derive(Parser)]
#[command(name = "assembly-planner")]
#[command(version)]
#[command(about = "Plan DNA assemblies from fragments aligned to a target")]
#[command(
    long_about = "assembly-planner reads alignments between a target sequence and candidate source fragments and ranks the cheapest ways to tile the target.\n\nFor every pair of fragments it prices the junction (overlap, primer extension or synthesized bridge), builds a junction graph and searches it for the lowest-cost chains, or cycles for circular targets."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rank candidate assemblies of the target
    Plan(plan::PlanArgs),

    /// List the junctions between fragments
    Graph(graph::GraphArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}

/// Alignment input and target description shared by all commands
#[derive(Args, Debug)]
pub struct InputArgs {
    /// Alignment file (JSON, TSV or CSV, optionally gzipped)
    /// Use '-' for stdin
    #[arg(required = true)]
    pub input: PathBuf,

    /// Target name (overrides the input's target)
    #[arg(long)]
    pub target_name: Option<String>,

    /// Target length in bp; required unless the input is JSON with a target
    #[arg(long)]
    pub target_length: Option<i64>,

    /// Treat the target as linear (targets are circular by default)
    #[arg(long)]
    pub linear: bool,

    /// First coordinate of the target and subject sequences
    #[arg(long)]
    pub start_index: Option<i64>,
}

impl InputArgs {
    /// Merge the input's own target description with command line overrides
    ///
    /// # Errors
    ///
    /// Returns an error if no target length is available.
    pub fn resolve_target(&self, from_input: Option<TargetInfo>) -> anyhow::Result<TargetInfo> {
        let mut target = match (from_input, self.target_length) {
            (Some(mut target), length) => {
                if let Some(length) = length {
                    target.length = length;
                }
                target
            }
            (None, Some(length)) => TargetInfo::new("target", length, true),
            (None, None) => bail!(
                "The input does not describe a target; pass --target-length (and --linear for a linear target)"
            ),
        };
        if let Some(name) = &self.target_name {
            target.name.clone_from(name);
        }
        if self.linear {
            target.circular = false;
        }
        if let Some(start_index) = self.start_index {
            target.start_index = start_index;
        }
        Ok(target)
    }

    /// Read the alignment input and build its contig container
    ///
    /// # Errors
    ///
    /// Returns an error if the input cannot be read or parsed, or if no
    /// target is available.
    pub fn load(&self) -> anyhow::Result<(TargetInfo, BuiltContainer)> {
        let set = if self.input.to_string_lossy() == "-" {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            alignments::parse_text(&buffer)?
        } else {
            alignments::parse_file(&self.input)
                .with_context(|| format!("Failed to read {}", self.input.display()))?
        };
        let AlignmentSet { target, alignments } = set;
        let target = self.resolve_target(target)?;
        let built = alignments::build_container(&target, &alignments)?;
        Ok((target, built))
    }
}

/// Planner settings shared by all commands
#[derive(Args, Debug, Default)]
pub struct ConfigArgs {
    /// JSON planner configuration; flags below override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Most negative junction gap (largest overlap) considered
    #[arg(long, allow_hyphen_values = true)]
    pub min_gap: Option<i64>,

    /// Largest junction gap considered
    #[arg(long)]
    pub max_gap: Option<i64>,

    /// Split fragments this many bp from every fragment end before planning
    #[arg(long)]
    pub partition: Option<i64>,

    /// Keep fragments that repeat another fragment's target span
    #[arg(long)]
    pub keep_redundant: bool,

    /// Do not re-join alignments split at the origin of a circular target
    #[arg(long)]
    pub no_fuse: bool,

    /// Evaluate fragment pairs on a single thread
    #[arg(long)]
    pub serial: bool,
}

impl ConfigArgs {
    /// Load the configuration file, if any, and apply flag overrides
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file is unreadable or the
    /// resulting settings are inconsistent.
    pub fn planner_config(&self) -> anyhow::Result<PlannerConfig> {
        let mut config = match &self.config {
            Some(path) => PlannerConfig::from_json_file(path)?,
            None => PlannerConfig::default(),
        };
        if let Some(min_gap) = self.min_gap {
            config.graph.min_gap = min_gap;
        }
        if let Some(max_gap) = self.max_gap {
            config.graph.max_gap = max_gap;
        }
        if self.partition.is_some() {
            config.circular_partition = self.partition;
        }
        if self.keep_redundant {
            config.remove_redundant = false;
        }
        if self.no_fuse {
            config.fuse_circular_fragments = false;
        }
        if self.serial {
            config.graph.parallel = false;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Render a cost, spelling out infeasible ones
pub(crate) fn format_cost(cost: f64) -> String {
    if cost.is_finite() {
        format!("{cost:.2}")
    } else {
        "inf".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input_args() -> InputArgs {
        InputArgs {
            input: PathBuf::from("hits.tsv"),
            target_name: None,
            target_length: None,
            linear: false,
            start_index: None,
        }
    }

    #[test]
    fn test_resolve_target() {
        let args = input_args();
        assert!(args.resolve_target(None).is_err());

        let from_input = TargetInfo::new("pTarget", 1000, true);
        let target = args.resolve_target(Some(from_input.clone())).unwrap();
        assert_eq!(target, from_input);

        let args = InputArgs {
            target_name: Some("renamed".to_string()),
            target_length: Some(1200),
            linear: true,
            ..input_args()
        };
        let target = args.resolve_target(Some(from_input)).unwrap();
        assert_eq!(target.name, "renamed");
        assert_eq!(target.length, 1200);
        assert!(!target.circular);

        let target = args.resolve_target(None).unwrap();
        assert_eq!(target.length, 1200);
        assert_eq!(target.start_index, 1);
    }

    #[test]
    fn test_planner_config_overrides() {
        let args = ConfigArgs {
            min_gap: Some(-50),
            partition: Some(200),
            keep_redundant: true,
            serial: true,
            ..ConfigArgs::default()
        };
        let config = args.planner_config().unwrap();
        assert_eq!(config.graph.min_gap, -50);
        assert_eq!(config.graph.max_gap, 2000);
        assert_eq!(config.circular_partition, Some(200));
        assert!(!config.remove_redundant);
        assert!(config.fuse_circular_fragments);
        assert!(!config.graph.parallel);

        let bad = ConfigArgs {
            min_gap: Some(10),
            max_gap: Some(10),
            ..ConfigArgs::default()
        };
        assert!(bad.planner_config().is_err());
    }

    #[test]
    fn test_format_cost() {
        assert_eq!(format_cost(28.5), "28.50");
        assert_eq!(format_cost(f64::INFINITY), "inf");
    }
}
