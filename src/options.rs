/// Default tolerance below which the pre-correction sum counts as zero.
pub const DEFAULT_CORRECTION_EPSILON: f64 = 1e-10;

/// Configuration for [`crate::ExtentCoordinator`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoordinatorOptions {
    /// Number of items created (as estimated slots) when the coordinator is built.
    pub initial_count: usize,

    /// When `|before_correction|` is below this value, `correction_percentage` reports `1.0`
    /// instead of dividing.
    pub correction_epsilon: f64,
}

impl Default for CoordinatorOptions {
    fn default() -> Self {
        Self {
            initial_count: 0,
            correction_epsilon: DEFAULT_CORRECTION_EPSILON,
        }
    }
}

impl CoordinatorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_initial_count(mut self, initial_count: usize) -> Self {
        self.initial_count = initial_count;
        self
    }

    /// # Panics
    ///
    /// Panics if `epsilon` is negative or not finite.
    #[track_caller]
    pub fn with_correction_epsilon(mut self, epsilon: f64) -> Self {
        assert!(
            epsilon.is_finite() && epsilon >= 0.0,
            "correction epsilon must be finite and >= 0 (got {epsilon})"
        );
        self.correction_epsilon = epsilon;
        self
    }
}
