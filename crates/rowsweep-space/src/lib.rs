//! Column-space topology for rowsweep.
//!
//! Two concerns live here, both purely functions of the grid width:
//!
//! - [`EdgePolicy`]: how a neighbour read `j + offset` that falls outside
//!   `[0, cols)` is resolved (skip, clamp, or explicit wrap).
//! - [`PartitionScheme`]: the deterministic split of `[0, cols)` into one
//!   contiguous range per worker, plus the [`Role`] table that hands the
//!   [`CanMerge`] capability to exactly one worker.
//!
//! Both are deterministic so that every worker can derive the same table
//! independently, without an agreement round.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod edge;
pub mod partition;

pub use edge::EdgePolicy;
pub use partition::{CanMerge, Partition, PartitionScheme, Role};
