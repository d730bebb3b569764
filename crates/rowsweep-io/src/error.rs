//! Error types for grid persistence.

use std::fmt;
use std::io;
use std::num::ParseFloatError;

use rowsweep_core::GridError;

/// Errors raised while writing or reading a persisted grid.
///
/// Persistence never touches the in-memory grid: a failed write leaves
/// the [`Grid`](rowsweep_grid::Grid) intact and a failed read produces
/// nothing.
#[derive(Debug)]
pub enum PersistError {
    /// The underlying reader or writer failed.
    Io(io::Error),
    /// A token could not be parsed as a number.
    Parse {
        /// 1-based line number.
        line: usize,
        /// 0-based column (value position) within the line.
        column: usize,
        /// The offending token.
        token: String,
        /// The parser's error.
        source: ParseFloatError,
    },
    /// A row had a different number of values than the first row.
    Ragged {
        /// 1-based line number.
        line: usize,
        /// Width established by the first row.
        expected: usize,
        /// Width of this row.
        actual: usize,
    },
    /// A row had a different width than the writer was given.
    RowWidth {
        /// Width the writer expects.
        expected: usize,
        /// Width of the rejected row.
        actual: usize,
    },
    /// The input held no rows.
    Empty,
    /// The parsed values did not form a valid grid.
    Grid(GridError),
}

impl fmt::Display for PersistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Parse {
                line,
                column,
                token,
                source,
            } => write!(
                f,
                "line {line}, value {column}: cannot parse {token:?}: {source}"
            ),
            Self::Ragged {
                line,
                expected,
                actual,
            } => write!(
                f,
                "line {line} has {actual} values, expected {expected}"
            ),
            Self::RowWidth { expected, actual } => {
                write!(f, "row has {actual} values, writer expects {expected}")
            }
            Self::Empty => write!(f, "no rows in input"),
            Self::Grid(e) => write!(f, "invalid grid: {e}"),
        }
    }
}

impl std::error::Error for PersistError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse { source, .. } => Some(source),
            Self::Grid(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for PersistError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<GridError> for PersistError {
    fn from(e: GridError) -> Self {
        Self::Grid(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn io_error_is_chained() {
        let e = PersistError::from(io::Error::new(io::ErrorKind::Other, "disk full"));
        assert!(e.to_string().contains("disk full"));
        assert!(e.source().is_some());
    }

    #[test]
    fn parse_error_names_the_token() {
        let source = "x".parse::<f64>().unwrap_err();
        let e = PersistError::Parse {
            line: 3,
            column: 1,
            token: "x".into(),
            source,
        };
        let msg = e.to_string();
        assert!(msg.contains("line 3"));
        assert!(msg.contains("\"x\""));
        assert!(e.source().is_some());
    }

    #[test]
    fn ragged_has_no_source() {
        let e = PersistError::Ragged {
            line: 2,
            expected: 4,
            actual: 3,
        };
        assert!(e.source().is_none());
        assert_eq!(e.to_string(), "line 2 has 3 values, expected 4");
    }
}
