use std::collections::VecDeque;

use anyhow::Result as HowResult;

use super::{intersection::is_edge_crossing_edge, Convergence, EdgeQuad};
use crate::{
    triangulation::{hedge_vertex_edge, Triangulation},
    utils::{
        helper::{is_same_vertex_edge, EdgeDisplay},
        types::VertexEdge,
    },
};

/// Result of flipping a segment into the triangulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertionOutcome {
    pub convergence: Convergence,
    /// Diagonals created by the flips that do not cross the segment.
    pub new_edges: Vec<VertexEdge>,
}

/// Flip the crossing edges away until the segment is an edge of the triangulation.
///
/// The crossing edges are processed first in, first out. An edge whose quad is not strictly convex
/// is moved to the back of the queue, a flip later on makes it flippable. After `max_iterations`
/// pops the loop gives up and reports the edges still queued.
///
/// A crossing edge in `protected` (an earlier constraint segment) or on the boundary can not be
/// flipped away, the segment is then given up right away and reported as stalled.
pub fn insert_segment(
    triangulation: &mut Triangulation,
    segment: VertexEdge,
    crossing_edges: Vec<VertexEdge>,
    protected: &[VertexEdge],
    max_iterations: usize,
) -> HowResult<InsertionOutcome> {
    let mut queue = VecDeque::from(crossing_edges);
    let mut new_edges = Vec::new();

    let mut iterations = 0;
    let mut flips = 0;

    let stalled = |queue: &VecDeque<VertexEdge>, flips: usize, new_edges: Vec<VertexEdge>| {
        InsertionOutcome {
            convergence: Convergence::Stalled {
                flips,
                remaining: queue.len(),
            },
            new_edges,
        }
    };

    while let Some(edge) = queue.pop_front() {
        if iterations >= max_iterations {
            queue.push_front(edge);

            log::warn!(
                "Inserting segment {} stalled after {iterations} iterations, {} crossing edges left",
                segment_display(triangulation, segment),
                queue.len()
            );

            return Ok(stalled(&queue, flips, new_edges));
        }
        iterations += 1;

        if protected.iter().any(|s| is_same_vertex_edge(s, &edge)) {
            queue.push_front(edge);

            log::warn!(
                "Segment {} crosses the constraint segment {}, it is not inserted",
                segment_display(triangulation, segment),
                segment_display(triangulation, edge)
            );

            return Ok(stalled(&queue, flips, new_edges));
        }

        let Some(quad) = EdgeQuad::of(triangulation, edge) else {
            if triangulation.find_edge(edge).is_none() {
                return Err(anyhow::Error::msg(format!(
                    "Crossing edge {edge:?} is no longer part of the triangulation!"
                )));
            }
            queue.push_front(edge);

            log::warn!(
                "Segment {} crosses the boundary edge {}, it is not inserted",
                segment_display(triangulation, segment),
                segment_display(triangulation, edge)
            );

            return Ok(stalled(&queue, flips, new_edges));
        };

        if !quad.is_convex(triangulation) {
            queue.push_back(edge);
            continue;
        }

        let diagonal_idx = triangulation.flip_2_to_2(quad.hedge)?;
        flips += 1;

        let diagonal = hedge_vertex_edge(&triangulation.tds().get_hedge(diagonal_idx)?)
            .ok_or_else(|| anyhow::Error::msg("Flipped diagonal is not casual!"))?;

        if is_edge_crossing_edge(triangulation.vertices(), diagonal, segment) {
            queue.push_back(diagonal);
        } else {
            new_edges.push(diagonal);
        }
    }

    log::trace!(
        "Segment {} inserted with {flips} flips",
        segment_display(triangulation, segment)
    );

    Ok(InsertionOutcome {
        convergence: Convergence::Converged { flips },
        new_edges,
    })
}

pub(crate) fn segment_display(triangulation: &Triangulation, [i, j]: VertexEdge) -> EdgeDisplay {
    EdgeDisplay([triangulation.vertices()[i], triangulation.vertices()[j]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::intersection::{BruteForceFinder, CrossingEdgeFinder};

    fn fan() -> Triangulation {
        // a convex fan, the segment from the left to the right corner crosses all spokes of the top vertex
        let vertices = [
            [0.0, 0.0],
            [1.0, -0.3],
            [2.0, -0.35],
            [3.0, -0.3],
            [4.0, 0.0],
            [2.0, 3.0],
        ];
        let mut triangulation = Triangulation::new();
        triangulation.insert_vertices(&vertices, true).unwrap();
        triangulation
    }

    #[test]
    fn test_insert_segment() {
        let mut triangulation = fan();
        let segment = [[0.0, 0.0], [4.0, 0.0]].map(|v| triangulation.vertex_idx(&v).unwrap());
        let num_tris = triangulation.num_tris();

        let crossing = BruteForceFinder.crossing_edges(&triangulation, segment);
        assert!(!crossing.is_empty());

        let outcome = insert_segment(&mut triangulation, segment, crossing, &[], 100).unwrap();

        assert!(!outcome.convergence.is_stalled());
        assert!(triangulation.find_edge(segment).is_some());
        assert!(outcome.new_edges.iter().any(|e| e.contains(&segment[0]) && e.contains(&segment[1])));
        assert_eq!(triangulation.num_tris(), num_tris);
        assert!(triangulation.is_sound());
    }

    #[test]
    fn test_insert_segment_stalls() {
        let mut triangulation = fan();
        let segment = [[0.0, 0.0], [4.0, 0.0]].map(|v| triangulation.vertex_idx(&v).unwrap());

        let crossing = BruteForceFinder.crossing_edges(&triangulation, segment);
        let num_crossing = crossing.len();

        let outcome = insert_segment(&mut triangulation, segment, crossing, &[], 0).unwrap();

        assert_eq!(
            outcome.convergence,
            Convergence::Stalled {
                flips: 0,
                remaining: num_crossing
            }
        );
        assert!(triangulation.is_sound());
    }

    #[test]
    fn test_nothing_to_insert() {
        let mut triangulation = fan();
        let num_edges = triangulation.unique_edges().len();

        let outcome = insert_segment(&mut triangulation, [0, 1], Vec::new(), &[], 100).unwrap();

        assert_eq!(outcome.convergence, Convergence::Converged { flips: 0 });
        assert!(outcome.new_edges.is_empty());
        assert_eq!(triangulation.unique_edges().len(), num_edges);
    }

    #[test]
    fn test_protected_crossing_edge_is_kept() {
        let mut triangulation = fan();
        let segment = [[0.0, 0.0], [4.0, 0.0]].map(|v| triangulation.vertex_idx(&v).unwrap());

        let crossing = BruteForceFinder.crossing_edges(&triangulation, segment);
        let num_crossing = crossing.len();
        let protected = [crossing[0]];

        let outcome =
            insert_segment(&mut triangulation, segment, crossing, &protected, 100).unwrap();

        assert_eq!(
            outcome.convergence,
            Convergence::Stalled {
                flips: 0,
                remaining: num_crossing
            }
        );
        assert!(triangulation.find_edge(protected[0]).is_some());
        assert!(triangulation.find_edge(segment).is_none());
        assert!(triangulation.is_sound());
    }

    #[test]
    fn test_boundary_crossing_edge_stops() {
        let mut triangulation = fan();
        let segment = [[0.0, 0.0], [4.0, 0.0]].map(|v| triangulation.vertex_idx(&v).unwrap());

        let crossing = BruteForceFinder.crossing_edges(&triangulation, segment);
        let num_crossing = crossing.len();

        // open a hole next to the first crossing edge
        let tri_idx = triangulation.find_edge(crossing[0]).unwrap().tri().idx;
        triangulation.delete_tri(tri_idx).unwrap();
        let num_tris = triangulation.num_tris();

        let outcome = insert_segment(&mut triangulation, segment, crossing, &[], 100).unwrap();

        assert_eq!(
            outcome.convergence,
            Convergence::Stalled {
                flips: 0,
                remaining: num_crossing
            }
        );
        assert_eq!(triangulation.num_tris(), num_tris);
    }
}
