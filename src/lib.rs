//! # Rita CDT
//!
//! Constrained Delaunay triangulations in 2D. The Delaunay triangulation is computed by
//! incremental insertion, constraints are inserted afterwards by flipping the edges that cross
//! them (Sloan's algorithm). Regions enclosed by clockwise constraints can be erased.

pub use config::CdtConfig;
pub use constrained_triangulation::ConstrainedTriangulation;
pub use constraints::{
    intersection::{BruteForceFinder, CrossingEdgeFinder},
    CdtReport, Convergence, RegionOutcome, SegmentReport,
};
pub use node::VertexNode;
pub use triangulation::Triangulation;

pub mod config;
pub mod constrained_triangulation;
pub mod constraints;
mod node;
pub mod predicates;
pub mod triangulation;
pub mod trids;
pub mod utils;

#[cfg(test)]
mod test_utils {
    use std::ops::RangeInclusive;

    use rand::{distributions::Uniform, prelude::Distribution};
    use rand_distr::Normal;

    pub fn sample_vertices_2d(n: usize, range: Option<RangeInclusive<f64>>) -> Vec<[f64; 2]> {
        let mut rng = rand::thread_rng();
        let range = range.unwrap_or(-0.5..=0.5);
        let uniform = Uniform::from(range);

        let mut vertices: Vec<[f64; 2]> = Vec::with_capacity(n);
        for _ in 0..n {
            let x = uniform.sample(&mut rng);
            let y = uniform.sample(&mut rng);
            vertices.push([x, y]);
        }

        vertices
    }

    /// A regular `n x n` grid over the unit square, every point moved by normal distributed noise.
    pub fn sample_jittered_grid_2d(n: usize, std_dev: f64) -> Vec<[f64; 2]> {
        let mut rng = rand::thread_rng();
        let normal = Normal::new(0.0, std_dev).unwrap();
        let spacing = 1.0 / (n - 1) as f64;

        let mut vertices: Vec<[f64; 2]> = Vec::with_capacity(n * n);
        for i in 0..n {
            for j in 0..n {
                let x = i as f64 * spacing + normal.sample(&mut rng);
                let y = j as f64 * spacing + normal.sample(&mut rng);
                vertices.push([x, y]);
            }
        }

        vertices
    }
}
