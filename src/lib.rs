//! # assembly-planner
//!
//! A library for planning how to build a target DNA molecule from fragments
//! that already exist in a sequence collection.
//!
//! An aligner reports where each candidate fragment ("contig") matches the
//! target. Joining two fragments costs money: overlapping ends are nearly
//! free, short gaps need primers that carry the missing bases, and long gaps
//! need synthesized bridges. `assembly-planner` prices every junction, builds
//! a graph of the feasible ones and searches it for the cheapest chains that
//! tile the target, or cycles when the target is circular.
//!
//! ## Features
//!
//! - **Topology-aware coordinates**: regions wrap through the origin of circular sequences
//! - **Length-consistent contigs**: query and subject spans stay equal under every edit
//! - **Container cleanup**: duplicate removal, origin fusion, circular partitioning
//! - **Configurable cost model**: overlap bands, primer extension, synthesis tiers
//! - **Pruned search**: best-of-N bound that never drops a top-N result
//!
//! ## Example
//!
//! ```rust,no_run
//! use assembly_planner::{Assembler, PlannerConfig};
//! use assembly_planner::parsing::alignments::{build_container, parse_file, TargetInfo};
//! use std::path::Path;
//!
//! let set = parse_file(Path::new("alignments.tsv")).unwrap();
//! let target = TargetInfo::new("pTarget", 5000, true);
//! let built = build_container(&target, &set.alignments).unwrap();
//!
//! let mut assembler =
//!     Assembler::new(built.target, built.container, PlannerConfig::default()).unwrap();
//! let plan = assembler.plan().unwrap();
//!
//! for assembly in plan.assemblies.iter().take(3) {
//!     println!("{:?}: {:.2}", assembly.path, assembly.cost);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Coordinates, regions, contigs and the contig container
//! - [`assembly`]: Junction costs, graph construction and path search
//! - [`parsing`]: Alignment input readers
//! - [`cli`]: Command-line interface implementation

pub mod assembly;
pub mod cli;
pub mod core;
pub mod parsing;
pub mod utils;

// Re-export commonly used types for convenience
pub use assembly::{Assembler, Assembly, AssemblyGraph, GapCostTable, Plan, PlannerConfig};
pub use core::{Context, Contig, ContigContainer, ContigId, ContigRegion, Direction, Region};
