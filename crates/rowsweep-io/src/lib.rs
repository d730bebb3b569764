//! Text persistence for rowsweep grids.
//!
//! The format is one line per row, each value printed with six decimals
//! and followed by a single space:
//!
//! ```text
//! 0.000000 1.000000 2.000000 \n
//! 10.000000 -0.912945 0.836656 \n
//! ```
//!
//! - [`GridWriter`] streams rows to any `Write` sink
//! - [`GridReader`] parses the same format from any `BufRead` source
//! - [`write_grid_file`] and [`read_grid_file`] are the file shortcuts
//!
//! Values round-trip at six-decimal precision only.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod reader;
pub mod writer;

pub use error::PersistError;
pub use reader::{read_grid_file, GridReader};
pub use writer::{write_grid_file, GridWriter};
