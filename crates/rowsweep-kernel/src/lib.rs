//! Row computation for the rowsweep engine.
//!
//! A sweep writes `a[i][j] = f(a[src(i)][j + offset])` row by row. This
//! crate describes *what* a row reads ([`Stencil`]) and computes one
//! partition's share of a row ([`Worker`]). It also ships the reference
//! collaborators used by the demos and tests:
//!
//! - [`LinearRamp`]: `a[i][j] = 10*i + j`
//! - [`ScaledSine`]: `sin(k * x)`
//! - [`Identity`]: `x`

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod init;
pub mod stencil;
pub mod transforms;
pub mod worker;

pub use init::LinearRamp;
pub use stencil::{RowSource, Stencil};
pub use transforms::{transform_fn, FnTransform, Identity, ScaledSine};
pub use worker::Worker;
