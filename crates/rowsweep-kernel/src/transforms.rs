//! Reference pointwise transforms.

use std::fmt;

use rowsweep_core::Transform;

/// Returns its input unchanged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Identity;

impl Transform for Identity {
    fn name(&self) -> &str {
        "identity"
    }

    fn apply(&self, x: f64) -> f64 {
        x
    }
}

/// `sin(k * x)`.
///
/// # Examples
///
/// ```
/// use rowsweep_core::Transform;
/// use rowsweep_kernel::ScaledSine;
///
/// let t = ScaledSine::new(2.0);
/// assert_eq!(t.apply(0.5), (1.0f64).sin());
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaledSine {
    k: f64,
}

impl ScaledSine {
    /// Create the transform `sin(k * x)`.
    pub fn new(k: f64) -> Self {
        Self { k }
    }

    /// The scale factor.
    pub fn k(&self) -> f64 {
        self.k
    }
}

impl Transform for ScaledSine {
    fn name(&self) -> &str {
        "scaled_sine"
    }

    fn apply(&self, x: f64) -> f64 {
        (self.k * x).sin()
    }
}

/// A [`Transform`] backed by a closure. Built with [`transform_fn`].
pub struct FnTransform<F> {
    name: String,
    f: F,
}

impl<F> fmt::Debug for FnTransform<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnTransform")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<F> Transform for FnTransform<F>
where
    F: Fn(f64) -> f64 + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, x: f64) -> f64 {
        (self.f)(x)
    }
}

/// Adapt a named closure into a [`Transform`].
///
/// ```
/// use rowsweep_core::Transform;
/// use rowsweep_kernel::transform_fn;
///
/// let half = transform_fn("half", |x| x / 2.0);
/// assert_eq!(half.name(), "half");
/// assert_eq!(half.apply(3.0), 1.5);
/// ```
pub fn transform_fn<F>(name: impl Into<String>, f: F) -> FnTransform<F>
where
    F: Fn(f64) -> f64 + Send + Sync,
{
    FnTransform {
        name: name.into(),
        f,
    }
}
