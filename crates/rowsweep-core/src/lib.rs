//! Core types and traits for the rowsweep grid transform engine.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the identifiers shared by every other crate (worker and row ids),
//! the error taxonomy for a sweep, and the traits through which the
//! external collaborators (grid initializer, pointwise transform) are
//! injected into the engine.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod traits;

pub use error::{
    AllocationError, CommunicationError, ConfigError, ErrorKind, GridError, SweepError,
};
pub use id::{RowIndex, WorkerId};
pub use traits::{Initializer, Transform};
