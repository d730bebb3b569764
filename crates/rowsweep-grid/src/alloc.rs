//! Fallible buffer acquisition.

use rowsweep_core::AllocationError;

/// Reserve a `rows * cols` buffer without aborting on allocator failure.
///
/// The returned vector has the full capacity reserved but length 0.
pub(crate) fn reserve_cells(rows: usize, cols: usize) -> Result<Vec<f64>, AllocationError> {
    let cells = rows
        .checked_mul(cols)
        .ok_or(AllocationError::SizeOverflow { rows, cols })?;
    // Vec<f64> cannot exceed isize::MAX bytes.
    if cells > isize::MAX as usize / std::mem::size_of::<f64>() {
        return Err(AllocationError::SizeOverflow { rows, cols });
    }
    let mut data = Vec::new();
    data.try_reserve_exact(cells)
        .map_err(|_| AllocationError::ReservationFailed { cells })?;
    Ok(data)
}
