//! Row synchronization protocol for partitioned sweeps.
//!
//! Each worker computes its own column segment of a row, then the
//! segments are merged into one full row before any worker moves on:
//!
//! ```text
//!  participant 1 ──Segment──┐
//!  participant 2 ──Segment──┼──► coordinator: RowAssembler ──Row(Arc<[f64]>)──► all
//!  coordinator  (own seg) ──┘
//! ```
//!
//! Segments are placed by sender identity, never by arrival order.
//! Every receive is bounded by a timeout; any failure is turned into an
//! `Abort` that reaches every worker, so no partition finishes alone.
//!
//! Stencils without a carried row dependency use
//! [`RowExchange::gather`] instead of [`RowExchange::exchange`]: the
//! coordinator assembles rows but nothing is broadcast back.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod assembler;
pub mod endpoint;
pub mod message;
pub mod mesh;

pub use assembler::{assemble, RowAssembler};
pub use endpoint::{Coordinator, Endpoint, Participant, RowExchange};
pub use mesh::{mesh, DEFAULT_RECEIVE_TIMEOUT, PARTICIPANT_GRACE, ROW_CHANNEL_CAPACITY};
pub use message::{Downstream, Segment, Upstream};
