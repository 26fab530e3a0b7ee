//! Readers that turn aligner output into a [`ContigContainer`](crate::core::ContigContainer).
//!
//! Supported inputs:
//!
//! - **JSON**: `{"target": {...}, "alignments": [...]}`, the only format
//!   that can describe the target itself
//! - **TSV/CSV**: one alignment per line, with an optional header that may
//!   use BLAST tabular column names (`qstart`, `sseqid`, `slen`, ...)
//!
//! Any of these may be gzip-compressed.
//!
//! ## Example
//!
//! ```rust,no_run
//! use assembly_planner::parsing::alignments::{build_container, parse_file, TargetInfo};
//! use std::path::Path;
//!
//! let set = parse_file(Path::new("hits.tsv")).unwrap();
//! let target = TargetInfo::new("pTarget", 5000, true);
//! let built = build_container(&target, &set.alignments).unwrap();
//! println!("{} contigs", built.container.len());
//! ```
//!
//! ## Columns
//!
//! | Column | Description | Required |
//! |--------|-------------|----------|
//! | query_start, query_end | Span on the target | Yes |
//! | subject_id | Source sequence identifier | Yes |
//! | subject_start, subject_end | Span on the source sequence | Yes |
//! | subject_length | Source sequence length | Yes |
//! | subject_circular | Source topology | No |
//! | strand | `+` or `-` | No |
//! | query_sequence, subject_sequence | Aligned bases | No |

pub mod alignments;
