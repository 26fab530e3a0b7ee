//! Junction costs, the assembly graph, and path search.
//!
//! ```text
//! ContigContainer --cleanup--> ContigContainer
//!        |                           |
//!   GapCostTable ----------> AssemblyGraph ----> search ----> ranked Assembly list
//! ```
//!
//! [`Assembler`] drives the whole pipeline from a [`PlannerConfig`].

pub mod cost;
pub mod engine;
pub mod graph;
pub mod search;

pub use cost::{CostConfig, GapCostTable};
pub use engine::{Assembler, CleanupReport, Plan, PlannerConfig, PlannerError};
pub use graph::{AssemblyGraph, EdgeKind, GraphConfig, Junction};
pub use search::{Assembly, BestCosts, SearchConfig};
