//! Text grid writer.
//!
//! Each value is printed with six decimals and a trailing space; each
//! row ends with a newline.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::debug;
use rowsweep_grid::Grid;

use crate::error::PersistError;

/// Streams rows of a fixed width to any `Write` sink.
///
/// Generic over `W: Write` so tests can use `Vec<u8>` and production
/// code can use `BufWriter<File>`.
///
/// # Examples
///
/// ```
/// use rowsweep_io::GridWriter;
///
/// let mut buf = Vec::new();
/// let mut writer = GridWriter::new(&mut buf, 2);
/// writer.write_row(&[0.5, -1.0]).unwrap();
/// writer.finish().unwrap();
/// assert_eq!(String::from_utf8(buf).unwrap(), "0.500000 -1.000000 \n");
/// ```
pub struct GridWriter<W: Write> {
    writer: W,
    cols: usize,
    rows_written: usize,
}

impl<W: Write> GridWriter<W> {
    /// Create a writer for rows of `cols` values.
    pub fn new(writer: W, cols: usize) -> Self {
        Self {
            writer,
            cols,
            rows_written: 0,
        }
    }

    /// Write one row.
    pub fn write_row(&mut self, row: &[f64]) -> Result<(), PersistError> {
        if row.len() != self.cols {
            return Err(PersistError::RowWidth {
                expected: self.cols,
                actual: row.len(),
            });
        }
        for v in row {
            write!(self.writer, "{v:.6} ")?;
        }
        self.writer.write_all(b"\n")?;
        self.rows_written += 1;
        Ok(())
    }

    /// Write every row of `grid`.
    pub fn write_grid(&mut self, grid: &Grid) -> Result<(), PersistError> {
        for row in grid.iter_rows() {
            self.write_row(row)?;
        }
        Ok(())
    }

    /// Number of rows written so far.
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Flush and return the inner sink.
    pub fn finish(mut self) -> Result<W, PersistError> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// Create (or truncate) `path` and write `grid` to it.
pub fn write_grid_file(path: impl AsRef<Path>, grid: &Grid) -> Result<(), PersistError> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = GridWriter::new(BufWriter::new(file), grid.cols());
    writer.write_grid(grid)?;
    writer.finish()?;
    debug!(
        "wrote {}x{} grid to {}",
        grid.rows(),
        grid.cols(),
        path.display()
    );
    Ok(())
}
