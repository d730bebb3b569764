//! Collaborator traits injected into the engine.
//!
//! The engine never owns the math: the pointwise [`Transform`] and the
//! grid [`Initializer`] are supplied by the caller and only borrowed
//! (or shared through an `Arc`) for the duration of a run.

/// A pure pointwise operation applied to a neighbour value.
///
/// # Contract
///
/// - `apply()` MUST be deterministic: the same input always produces
///   the bit-identical output. Partitioned runs are compared cell by
///   cell against the single-worker run, so any hidden state breaks
///   the sweep's core guarantee.
/// - `&self`: implementations are shared by every worker and invoked
///   concurrently on disjoint inputs, hence `Send + Sync`.
///
/// # Examples
///
/// ```
/// use rowsweep_core::Transform;
///
/// struct Double;
///
/// impl Transform for Double {
///     fn name(&self) -> &str { "double" }
///     fn apply(&self, x: f64) -> f64 { 2.0 * x }
/// }
///
/// assert_eq!(Double.apply(1.5), 3.0);
/// ```
pub trait Transform: Send + Sync {
    /// Human-readable name for logging and error reporting.
    fn name(&self) -> &str {
        "transform"
    }

    /// Produce the new cell value from the neighbour value `x`.
    fn apply(&self, x: f64) -> f64;
}

/// Supplies the initial value of every grid cell.
///
/// Must be a total function from `(row, col)` to a finite `f64`.
/// The grid store checks finiteness while populating and rejects the
/// run before any transform executes.
pub trait Initializer {
    /// Initial value of cell `(row, col)`.
    fn value(&self, row: usize, col: usize) -> f64;
}

impl<F> Initializer for F
where
    F: Fn(usize, usize) -> f64,
{
    fn value(&self, row: usize, col: usize) -> f64 {
        self(row, col)
    }
}
