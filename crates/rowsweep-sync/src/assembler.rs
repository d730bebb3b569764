//! Merging column segments into a full row.

use rowsweep_core::{CommunicationError, RowIndex, WorkerId};
use rowsweep_space::PartitionScheme;

use crate::message::Segment;

/// Reusable full-row buffer owned by the coordinator.
///
/// [`reset`](Self::reset) once per row, then [`accept`](Self::accept)
/// one segment per worker. Segments are placed at their owner's
/// partition offset, so the result does not depend on arrival order.
#[derive(Debug)]
pub struct RowAssembler {
    scheme: PartitionScheme,
    row: RowIndex,
    buf: Vec<f64>,
    received: Vec<bool>,
    remaining: usize,
}

impl RowAssembler {
    /// Create an assembler for rows laid out by `scheme`.
    pub fn new(scheme: PartitionScheme) -> Self {
        let workers = scheme.len();
        Self {
            buf: vec![0.0; scheme.cols()],
            received: vec![false; workers],
            remaining: workers,
            row: RowIndex(0),
            scheme,
        }
    }

    /// Start assembling `row`, discarding any partial state.
    pub fn reset(&mut self, row: RowIndex) {
        self.row = row;
        self.received.fill(false);
        self.remaining = self.scheme.len();
    }

    /// Row currently being assembled.
    pub fn row(&self) -> RowIndex {
        self.row
    }

    /// Place one segment.
    ///
    /// Rejects a segment for another row, from an unknown or duplicate
    /// sender, or whose offset or length does not match the sender's
    /// partition. A rejected segment leaves the buffer unchanged.
    pub fn accept(&mut self, segment: &Segment) -> Result<(), CommunicationError> {
        let malformed = |reason: String| CommunicationError::Malformed {
            row: self.row,
            sender: segment.sender,
            reason,
        };

        if segment.row != self.row {
            return Err(malformed(format!(
                "segment for row {} while assembling row {}",
                segment.row, self.row
            )));
        }
        let Some(part) = self.scheme.partition(segment.sender).copied() else {
            return Err(malformed(format!(
                "unknown sender, {} workers configured",
                self.scheme.len()
            )));
        };
        if self.received[segment.sender.index()] {
            return Err(malformed("duplicate segment".to_string()));
        }
        if segment.start != part.start {
            return Err(malformed(format!(
                "segment starts at column {}, partition starts at {}",
                segment.start, part.start
            )));
        }
        if segment.values.len() != part.len() {
            return Err(malformed(format!(
                "segment has {} values, partition has {}",
                segment.values.len(),
                part.len()
            )));
        }

        self.buf[part.range()].copy_from_slice(&segment.values);
        self.received[segment.sender.index()] = true;
        self.remaining -= 1;
        Ok(())
    }

    /// Whether every worker's segment has been placed.
    pub fn is_complete(&self) -> bool {
        self.remaining == 0
    }

    /// Workers whose segment has not arrived yet, in worker order.
    pub fn missing(&self) -> Vec<WorkerId> {
        self.received
            .iter()
            .enumerate()
            .filter(|(_, got)| !**got)
            .map(|(w, _)| WorkerId(w as u32))
            .collect()
    }

    /// The merged row, once complete.
    pub fn assembled(&self) -> Option<&[f64]> {
        self.is_complete().then_some(self.buf.as_slice())
    }
}

/// Merge a full set of segments for `row` into one row.
///
/// Pure and order-independent: any permutation of the same segments
/// gives the same row. A missing segment is reported as malformed input
/// naming the first absent worker.
///
/// ```
/// use rowsweep_core::{RowIndex, WorkerId};
/// use rowsweep_space::PartitionScheme;
/// use rowsweep_sync::{assemble, Segment};
///
/// let scheme = PartitionScheme::new(4, 2).unwrap();
/// let seg = |w: u32, start: usize, values: Vec<f64>| Segment {
///     sender: WorkerId(w),
///     row: RowIndex(1),
///     start,
///     values,
/// };
/// let row = assemble(
///     &scheme,
///     RowIndex(1),
///     &[seg(1, 2, vec![3.0, 4.0]), seg(0, 0, vec![1.0, 2.0])],
/// )
/// .unwrap();
/// assert_eq!(row, vec![1.0, 2.0, 3.0, 4.0]);
/// ```
pub fn assemble(
    scheme: &PartitionScheme,
    row: RowIndex,
    segments: &[Segment],
) -> Result<Vec<f64>, CommunicationError> {
    let mut asm = RowAssembler::new(scheme.clone());
    asm.reset(row);
    for seg in segments {
        asm.accept(seg)?;
    }
    if let Some(&first) = asm.missing().first() {
        return Err(CommunicationError::Malformed {
            row,
            sender: first,
            reason: "no segment received".to_string(),
        });
    }
    Ok(asm.buf)
}
