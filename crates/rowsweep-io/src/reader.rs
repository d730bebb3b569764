//! Text grid reader.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use rowsweep_grid::Grid;

use crate::error::PersistError;

/// Parses the writer's format back into a [`Grid`].
///
/// Values are separated by any whitespace, so trailing spaces are
/// ignored. Blank lines are skipped. Every row must have the width of
/// the first.
pub struct GridReader<R: BufRead> {
    reader: R,
}

impl<R: BufRead> GridReader<R> {
    /// Wrap a buffered source.
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Read the whole input as one grid.
    pub fn read_grid(self) -> Result<Grid, PersistError> {
        let mut cols = None;
        let mut rows = 0;
        let mut data = Vec::new();

        for (n, line) in self.reader.lines().enumerate() {
            let line = line?;
            let before = data.len();
            for (column, token) in line.split_whitespace().enumerate() {
                let value = token.parse::<f64>().map_err(|source| PersistError::Parse {
                    line: n + 1,
                    column,
                    token: token.to_owned(),
                    source,
                })?;
                data.push(value);
            }
            let width = data.len() - before;
            if width == 0 {
                continue;
            }
            match cols {
                None => cols = Some(width),
                Some(expected) if expected != width => {
                    return Err(PersistError::Ragged {
                        line: n + 1,
                        expected,
                        actual: width,
                    })
                }
                Some(_) => {}
            }
            rows += 1;
        }

        let cols = cols.ok_or(PersistError::Empty)?;
        Ok(Grid::from_vec(rows, cols, data)?)
    }
}

/// Read a grid previously written with
/// [`write_grid_file`](crate::write_grid_file).
pub fn read_grid_file(path: impl AsRef<Path>) -> Result<Grid, PersistError> {
    let file = File::open(path)?;
    GridReader::new(BufReader::new(file)).read_grid()
}
