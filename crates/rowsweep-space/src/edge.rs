//! Edge (boundary) policy for neighbour reads.

/// How a neighbour read outside `[0, cols)` is resolved.
///
/// The policy is a property of the sweep, not of a partition: every
/// worker resolves edge columns through the same function, so a
/// partitioned run handles the grid edges exactly like the
/// single-worker run.
///
/// # Examples
///
/// ```
/// use rowsweep_space::EdgePolicy;
///
/// // 4 columns, offset +1: column 3 reads column 4, which is out of range.
/// assert_eq!(EdgePolicy::Skip.resolve(3, 1, 4), None);
/// assert_eq!(EdgePolicy::Clamp.resolve(3, 1, 4), Some(3));
/// assert_eq!(EdgePolicy::Wrap.resolve(3, 1, 4), Some(0));
///
/// // In-range reads are the same under every policy.
/// assert_eq!(EdgePolicy::Skip.resolve(1, 1, 4), Some(2));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum EdgePolicy {
    /// The cell is not computed and keeps its current value.
    #[default]
    Skip,
    /// The neighbour index is clamped to the nearest edge column.
    Clamp,
    /// The neighbour index wraps around (periodic columns).
    Wrap,
}

impl EdgePolicy {
    /// Resolve the source column for destination column `col`.
    ///
    /// Returns `None` when the cell must be skipped. `cols` must be
    /// non-zero; callers validate the grid shape first.
    pub fn resolve(self, col: usize, offset: isize, cols: usize) -> Option<usize> {
        let n = cols as i128;
        let target = col as i128 + offset as i128;
        if (0..n).contains(&target) {
            return Some(target as usize);
        }
        match self {
            Self::Skip => None,
            Self::Clamp => Some(target.clamp(0, n - 1) as usize),
            Self::Wrap => Some(target.rem_euclid(n) as usize),
        }
    }

    /// Number of destination columns in `[0, cols)` this policy leaves
    /// untouched for the given offset.
    pub fn skipped_columns(self, offset: isize, cols: usize) -> usize {
        match self {
            Self::Skip => offset.unsigned_abs().min(cols),
            Self::Clamp | Self::Wrap => 0,
        }
    }
}
