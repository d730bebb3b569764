//! Reference grid initializers.

use rowsweep_core::Initializer;

/// `a[i][j] = row_step * i + col_step * j`.
///
/// [`LinearRamp::default`] is the classic `10*i + j` ramp.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearRamp {
    /// Increment per row.
    pub row_step: f64,
    /// Increment per column.
    pub col_step: f64,
}

impl Default for LinearRamp {
    fn default() -> Self {
        Self {
            row_step: 10.0,
            col_step: 1.0,
        }
    }
}

impl Initializer for LinearRamp {
    fn value(&self, row: usize, col: usize) -> f64 {
        self.row_step * row as f64 + self.col_step * col as f64
    }
}
