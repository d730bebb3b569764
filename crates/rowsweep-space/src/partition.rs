//! Deterministic column partitioning and the coordinator role table.

use std::ops::Range;

use rowsweep_core::{ConfigError, WorkerId};
use smallvec::SmallVec;

/// One worker's contiguous column range `[start, end)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Partition {
    /// Owning worker.
    pub worker: WorkerId,
    /// First owned column.
    pub start: usize,
    /// One past the last owned column.
    pub end: usize,
}

impl Partition {
    /// Number of owned columns (always at least 1).
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Always `false`: construction never produces an empty partition.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The owned columns as a range.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Whether column `col` belongs to this partition.
    pub fn contains(&self, col: usize) -> bool {
        self.range().contains(&col)
    }
}

/// Capability to merge row segments and republish full rows.
///
/// Only [`PartitionScheme::roles`] can mint one, and each role table
/// contains exactly one. The synchronization protocol requires a
/// `CanMerge` to construct a coordinator endpoint, so "who merges" is
/// decided by the partition table rather than by comparing ids.
#[derive(Debug)]
pub struct CanMerge {
    _private: (),
}

/// A worker's role in the row synchronization protocol.
#[derive(Debug)]
pub enum Role {
    /// Collects segments, assembles the row, and republishes it.
    Coordinator(CanMerge),
    /// Sends its segment and waits for the merged row.
    Participant,
}

impl Role {
    /// Whether this role holds the merge capability.
    pub fn is_coordinator(&self) -> bool {
        matches!(self, Self::Coordinator(_))
    }
}

/// Ordered partition table covering `[0, cols)` exactly once.
///
/// Workers `0..n-1` each own `cols / n` columns in order; the last
/// worker also absorbs the remainder `cols % n`.
///
/// # Examples
///
/// ```
/// use rowsweep_space::PartitionScheme;
/// use rowsweep_core::WorkerId;
///
/// let scheme = PartitionScheme::new(10, 3).unwrap();
/// let ranges: Vec<_> = scheme.iter().map(|p| p.range()).collect();
/// assert_eq!(ranges, vec![0..3, 3..6, 6..10]);
/// assert_eq!(scheme.owner_of(7), Some(WorkerId(2)));
/// assert_eq!(scheme.coordinator(), WorkerId(0));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartitionScheme {
    cols: usize,
    base: usize,
    parts: SmallVec<[Partition; 8]>,
    coordinator: WorkerId,
}

impl PartitionScheme {
    /// Split `cols` columns across `workers` workers.
    ///
    /// Fails with [`ConfigError::ZeroDimension`] when `cols == 0`,
    /// [`ConfigError::NoWorkers`] when `workers == 0`, and
    /// [`ConfigError::TooManyWorkers`] when `workers > cols`.
    pub fn new(cols: usize, workers: usize) -> Result<Self, ConfigError> {
        if cols == 0 {
            return Err(ConfigError::ZeroDimension { name: "cols" });
        }
        if workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        if workers > cols || u32::try_from(workers).is_err() {
            return Err(ConfigError::TooManyWorkers { workers, cols });
        }

        let base = cols / workers;
        let parts = (0..workers)
            .map(|w| {
                let start = w * base;
                let end = if w + 1 == workers { cols } else { start + base };
                Partition {
                    worker: WorkerId(w as u32),
                    start,
                    end,
                }
            })
            .collect();

        Ok(Self {
            cols,
            base,
            parts,
            coordinator: WorkerId(0),
        })
    }

    /// Designate a different worker as the coordinator.
    pub fn with_coordinator(mut self, worker: WorkerId) -> Result<Self, ConfigError> {
        if worker.index() >= self.parts.len() {
            return Err(ConfigError::UnknownWorker {
                worker,
                workers: self.parts.len(),
            });
        }
        self.coordinator = worker;
        Ok(self)
    }

    /// Grid width covered by this table.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of partitions (= number of workers).
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Always `false`: construction rejects zero workers.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Partitions in column order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Partition> + '_ {
        self.parts.iter()
    }

    /// Partitions as a slice, in column order.
    pub fn as_slice(&self) -> &[Partition] {
        &self.parts
    }

    /// The partition owned by `worker`.
    pub fn partition(&self, worker: WorkerId) -> Option<&Partition> {
        self.parts.get(worker.index())
    }

    /// Worker owning column `col`, or `None` if `col >= cols`.
    pub fn owner_of(&self, col: usize) -> Option<WorkerId> {
        if col >= self.cols {
            return None;
        }
        let w = (col / self.base).min(self.parts.len() - 1);
        Some(self.parts[w].worker)
    }

    /// The worker that holds the merge capability.
    pub fn coordinator(&self) -> WorkerId {
        self.coordinator
    }

    /// Whether every column is owned by a single worker.
    pub fn is_single(&self) -> bool {
        self.parts.len() == 1
    }

    /// Mint the role table: one entry per worker, in worker order, with
    /// exactly one [`Role::Coordinator`].
    pub fn roles(&self) -> Vec<(WorkerId, Role)> {
        self.parts
            .iter()
            .map(|p| {
                let role = if p.worker == self.coordinator {
                    Role::Coordinator(CanMerge { _private: () })
                } else {
                    Role::Participant
                };
                (p.worker, role)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn even_split() {
        let s = PartitionScheme::new(4, 2).unwrap();
        assert_eq!(
            s.as_slice(),
            &[
                Partition {
                    worker: WorkerId(0),
                    start: 0,
                    end: 2
                },
                Partition {
                    worker: WorkerId(1),
                    start: 2,
                    end: 4
                },
            ]
        );
    }

    #[test]
    fn last_partition_absorbs_remainder() {
        let s = PartitionScheme::new(11, 4).unwrap();
        let lens: Vec<usize> = s.iter().map(Partition::len).collect();
        assert_eq!(lens, vec![2, 2, 2, 5]);
    }

    #[test]
    fn single_worker_spans_grid() {
        let s = PartitionScheme::new(7, 1).unwrap();
        assert!(s.is_single());
        assert_eq!(s.as_slice()[0].range(), 0..7);
    }

    #[test]
    fn one_column_per_worker() {
        let s = PartitionScheme::new(5, 5).unwrap();
        assert!(s.iter().all(|p| p.len() == 1));
        assert_eq!(s.owner_of(4), Some(WorkerId(4)));
    }

    #[test]
    fn too_many_workers_rejected() {
        assert_eq!(
            PartitionScheme::new(4, 5),
            Err(ConfigError::TooManyWorkers { workers: 5, cols: 4 })
        );
    }

    #[test]
    fn zero_inputs_rejected() {
        assert_eq!(
            PartitionScheme::new(0, 1),
            Err(ConfigError::ZeroDimension { name: "cols" })
        );
        assert_eq!(PartitionScheme::new(3, 0), Err(ConfigError::NoWorkers));
    }

    #[test]
    fn owner_of_out_of_range() {
        let s = PartitionScheme::new(6, 2).unwrap();
        assert_eq!(s.owner_of(6), None);
    }

    #[test]
    fn exactly_one_coordinator_role() {
        let s = PartitionScheme::new(9, 3).unwrap();
        let roles = s.roles();
        assert_eq!(roles.len(), 3);
        assert_eq!(roles.iter().filter(|(_, r)| r.is_coordinator()).count(), 1);
        assert!(roles[0].1.is_coordinator());
    }

    #[test]
    fn coordinator_can_be_moved() {
        let s = PartitionScheme::new(9, 3)
            .unwrap()
            .with_coordinator(WorkerId(2))
            .unwrap();
        let roles = s.roles();
        assert!(!roles[0].1.is_coordinator());
        assert!(roles[2].1.is_coordinator());
        assert_eq!(s.coordinator(), WorkerId(2));
    }

    #[test]
    fn unknown_coordinator_rejected() {
        let err = PartitionScheme::new(9, 3)
            .unwrap()
            .with_coordinator(WorkerId(3))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnknownWorker {
                worker: WorkerId(3),
                workers: 3
            }
        );
    }

    proptest! {
        #[test]
        fn every_column_owned_exactly_once(cols in 1usize..200, workers in 1usize..40) {
            prop_assume!(workers <= cols);
            let s = PartitionScheme::new(cols, workers).unwrap();
            prop_assert_eq!(s.len(), workers);
            prop_assert_eq!(s.iter().map(Partition::len).sum::<usize>(), cols);
            for j in 0..cols {
                let owners: Vec<_> = s.iter().filter(|p| p.contains(j)).collect();
                prop_assert_eq!(owners.len(), 1);
                prop_assert_eq!(s.owner_of(j), Some(owners[0].worker));
            }
        }

        #[test]
        fn partitions_are_contiguous_and_ordered(cols in 1usize..200, workers in 1usize..40) {
            prop_assume!(workers <= cols);
            let s = PartitionScheme::new(cols, workers).unwrap();
            let mut cursor = 0;
            for (n, p) in s.iter().enumerate() {
                prop_assert_eq!(p.worker, WorkerId(n as u32));
                prop_assert_eq!(p.start, cursor);
                prop_assert!(p.end > p.start);
                cursor = p.end;
            }
            prop_assert_eq!(cursor, cols);
        }

        #[test]
        fn construction_is_deterministic(cols in 1usize..200, workers in 1usize..40) {
            prop_assume!(workers <= cols);
            let a = PartitionScheme::new(cols, workers).unwrap();
            let b = PartitionScheme::new(cols, workers).unwrap();
            prop_assert_eq!(a, b);
        }
    }
}
