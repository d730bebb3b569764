//! Grid storage for the rowsweep engine.
//!
//! A sweep mutates one dense `rows × cols` buffer of `f64` row by row.
//! [`GridStore`] owns that buffer during the run and tracks a version
//! state per row so that no reader ever observes a partially written
//! row:
//!
//! ```text
//! GridStore
//! ├── data:   Vec<f64>        row-major, rows * cols
//! ├── states: Vec<RowState>   Initial → InProgress → Finalized
//! └── open:   Option<RowIndex> at most one row mid-write
//! ```
//!
//! Writes go exclusively through a [`RowGuard`], which must be
//! [`commit`](RowGuard::commit)ted to finalize its row. When the sweep
//! is over, [`GridStore::finish`] yields the read-only [`Grid`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod alloc;
pub mod grid;
pub mod store;

pub use grid::Grid;
pub use store::{GridStore, RowGuard, RowState};
