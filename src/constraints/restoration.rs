use anyhow::Result as HowResult;

use super::{Convergence, EdgeQuad};
use crate::{
    triangulation::{hedge_vertex_edge, Triangulation},
    utils::{helper::is_same_vertex_edge, types::VertexEdge},
};

/// Lawson flips restricted to the edges created while inserting a segment.
///
/// The list is scanned until a full pass flips nothing. A flipped entry is replaced by the new
/// diagonal, so the list keeps tracking the same region. Edges in `protected` are never flipped,
/// these are the constraint segments.
pub fn restore_delaunay(
    triangulation: &mut Triangulation,
    new_edges: &mut [VertexEdge],
    protected: &[VertexEdge],
    max_flips: usize,
) -> HowResult<Convergence> {
    let is_protected =
        |edge: &VertexEdge| protected.iter().any(|segment| is_same_vertex_edge(segment, edge));

    let mut flips = 0;

    loop {
        let mut flips_in_pass = 0;

        for i in 0..new_edges.len() {
            if is_protected(&new_edges[i]) {
                continue;
            }

            let Some(quad) = EdgeQuad::of(triangulation, new_edges[i]) else {
                continue;
            };

            if !quad.should_flip(triangulation) {
                continue;
            }

            if flips >= max_flips {
                let remaining = new_edges
                    .iter()
                    .filter(|edge| !is_protected(edge))
                    .filter_map(|&edge| EdgeQuad::of(triangulation, edge))
                    .filter(|quad| quad.should_flip(triangulation))
                    .count();

                log::warn!(
                    "Delaunay restoration stalled after {flips} flips, {remaining} edges still violate the criterion"
                );

                return Ok(Convergence::Stalled { flips, remaining });
            }

            let diagonal_idx = triangulation.flip_2_to_2(quad.hedge)?;
            new_edges[i] = hedge_vertex_edge(&triangulation.tds().get_hedge(diagonal_idx)?)
                .ok_or_else(|| anyhow::Error::msg("Flipped diagonal is not casual!"))?;

            flips += 1;
            flips_in_pass += 1;
        }

        if flips_in_pass == 0 {
            return Ok(Convergence::Converged { flips });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::sample_vertices_2d;

    fn random_triangulation(n: usize) -> Triangulation {
        let mut triangulation = Triangulation::new();
        triangulation
            .insert_vertices(&sample_vertices_2d(n, None), true)
            .unwrap();
        triangulation
    }

    fn quad_vertices(quad: &EdgeQuad) -> [usize; 4] {
        [quad.from, quad.to, quad.apex, quad.opposite_apex]
    }

    /// Flip some interior edges, so the triangulation is no longer Delaunay.
    fn disturb(triangulation: &mut Triangulation, num_flips: usize) -> Vec<VertexEdge> {
        let mut flipped = Vec::new();

        for edge in triangulation.unique_edges() {
            if flipped.len() == num_flips {
                break;
            }
            let Some(quad) = EdgeQuad::of(triangulation, edge) else {
                continue;
            };
            // skip edges next to an already flipped one
            if flipped
                .iter()
                .any(|e: &VertexEdge| e.iter().any(|v| quad_vertices(&quad).contains(v)))
            {
                continue;
            }
            if quad.is_convex(triangulation) {
                let diagonal_idx = triangulation.flip_2_to_2(quad.hedge).unwrap();
                let diagonal = hedge_vertex_edge(&triangulation.tds().get_hedge(diagonal_idx).unwrap());
                flipped.push(diagonal.unwrap());
            }
        }

        flipped
    }

    #[test]
    fn test_restores_flipped_edges() {
        let mut triangulation = random_triangulation(200);
        let mut new_edges = disturb(&mut triangulation, 5);
        assert!(!new_edges.is_empty());
        assert!(triangulation.is_delaunay_p() < 1.0);

        let convergence = restore_delaunay(&mut triangulation, &mut new_edges, &[], 100).unwrap();

        assert_eq!(convergence, Convergence::Converged { flips: new_edges.len() });
        assert_eq!(triangulation.is_delaunay_p(), 1.0);
        assert!(triangulation.is_sound());
    }

    #[test]
    fn test_protected_edges_stay() {
        let mut triangulation = random_triangulation(200);
        let mut new_edges = disturb(&mut triangulation, 3);
        let protected = new_edges.clone();

        let convergence =
            restore_delaunay(&mut triangulation, &mut new_edges, &protected, 100).unwrap();

        assert_eq!(convergence, Convergence::Converged { flips: 0 });
        for edge in protected {
            assert!(triangulation.find_edge(edge).is_some());
        }
        assert!(triangulation.is_delaunay_p() < 1.0);
    }

    #[test]
    fn test_flip_limit() {
        let mut triangulation = random_triangulation(200);
        let mut new_edges = disturb(&mut triangulation, 4);
        let num_disturbed = new_edges.len();

        let convergence = restore_delaunay(&mut triangulation, &mut new_edges, &[], 1).unwrap();

        assert_eq!(
            convergence,
            Convergence::Stalled {
                flips: 1,
                remaining: num_disturbed - 1
            }
        );
        assert!(triangulation.is_sound());
    }
}
