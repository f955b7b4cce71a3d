/// Limits and options of a [`ConstrainedTriangulation`](crate::ConstrainedTriangulation).
///
/// The limits bound the flip and fill loops. Tripping one never panics, it is reported as
/// [`Convergence::Stalled`](crate::Convergence::Stalled) or as a truncated region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CdtConfig {
    /// Maximum number of queue pops while inserting one constraint segment.
    pub max_flip_iterations: usize,
    /// Maximum number of flips while restoring the Delaunay property after one constraint segment.
    pub max_restore_flips: usize,
    /// Maximum number of triangles visited by the flood fill of the interior region.
    pub max_fill_iterations: usize,
    /// Insert the vertices along a Hilbert curve.
    pub spatial_sorting: bool,
}

impl Default for CdtConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl CdtConfig {
    pub const DEFAULT_LIMIT: usize = 100_000;

    pub const fn new() -> Self {
        Self {
            max_flip_iterations: Self::DEFAULT_LIMIT,
            max_restore_flips: Self::DEFAULT_LIMIT,
            max_fill_iterations: Self::DEFAULT_LIMIT,
            spatial_sorting: true,
        }
    }

    /// Use the same limit for all loops.
    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.max_flip_iterations = limit;
        self.max_restore_flips = limit;
        self.max_fill_iterations = limit;
        self
    }

    #[must_use]
    pub const fn with_spatial_sorting(mut self, spatial_sorting: bool) -> Self {
        self.spatial_sorting = spatial_sorting;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CdtConfig::default();

        assert_eq!(config.max_flip_iterations, 100_000);
        assert_eq!(config.max_restore_flips, 100_000);
        assert_eq!(config.max_fill_iterations, 100_000);
        assert!(config.spatial_sorting);
    }

    #[test]
    fn test_builders() {
        let config = CdtConfig::new().with_limit(7).with_spatial_sorting(false);

        assert_eq!(config.max_flip_iterations, 7);
        assert_eq!(config.max_fill_iterations, 7);
        assert!(!config.spatial_sorting);
    }
}
