//! Coordinate and fragment model for assembly planning.
//!
//! Leaf-first:
//!
//! - [`Context`]: length, topology and origin of a sequence
//! - [`Region`]: a directed span within a context
//! - [`ContigRegion`]: a region that may carry its own bases
//! - [`Contig`]: a query span of the target paired with a subject span
//! - [`ContigContainer`]: every contig of one planning run
//!
//! ## Topology
//!
//! Positions on a circular context wrap, so a region may cross the origin:
//!
//! | Context | Region | Covers |
//! |---------|--------|--------|
//! | linear 1..=10 | 3 -> 5 | 3, 4, 5 |
//! | circular 1..=10 | 9 -> 2 | 9, 10, 1, 2 |
//! | circular 1..=10 | 3 -> 2 | all 10 positions |

pub mod container;
pub mod context;
pub mod contig;
pub mod fragment;
pub mod region;

pub use container::ContigContainer;
pub use context::{Context, ContextError};
pub use contig::{Contig, ContigError, ContigId, ContigIdGenerator, ContigType};
pub use fragment::ContigRegion;
pub use region::{Direction, Region, RegionError};
