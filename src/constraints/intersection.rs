use crate::{
    predicates::segments_intersect,
    triangulation::{hedge_vertex_edge, Triangulation},
    utils::types::{Vertex2, VertexEdge},
};

/// Finds the edges of a triangulation that cross a segment.
pub trait CrossingEdgeFinder {
    /// All edges crossing the segment in their interiors, as vertex index pairs.
    fn crossing_edges(&self, triangulation: &Triangulation, segment: VertexEdge)
        -> Vec<VertexEdge>;
}

/// Tests every edge of the triangulation, `O(E)` per segment.
#[derive(Debug, Default, Clone, Copy)]
pub struct BruteForceFinder;

impl CrossingEdgeFinder for BruteForceFinder {
    fn crossing_edges(
        &self,
        triangulation: &Triangulation,
        segment: VertexEdge,
    ) -> Vec<VertexEdge> {
        let vertices = triangulation.vertices();

        triangulation
            .tds()
            .unique_hedges()
            .filter_map(|hedge| hedge_vertex_edge(&hedge))
            .filter(|&edge| is_edge_crossing_edge(vertices, edge, segment))
            .collect()
    }
}

/// Check if two edges cross in their interiors.
///
/// Edges sharing a vertex never cross, neither do touching or overlapping collinear edges.
pub fn is_edge_crossing_edge(vertices: &[Vertex2], edge: VertexEdge, other: VertexEdge) -> bool {
    if edge.iter().any(|v_idx| other.contains(v_idx)) {
        return false;
    }

    segments_intersect(
        &vertices[edge[0]],
        &vertices[edge[1]],
        &vertices[other[0]],
        &vertices[other[1]],
        false,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Triangulation {
        let mut triangulation = Triangulation::new();
        triangulation
            .insert_vertices(
                &[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.2, 0.6]],
                false,
            )
            .unwrap();
        triangulation
    }

    #[test]
    fn test_shared_vertex_never_crosses() {
        let vertices = [[0.0, 0.0], [1.0, 0.0], [2.0, 0.0], [1.0, 1.0]];

        assert!(!is_edge_crossing_edge(&vertices, [0, 1], [1, 2]));
        assert!(!is_edge_crossing_edge(&vertices, [0, 2], [0, 1]));
        assert!(!is_edge_crossing_edge(&vertices, [0, 2], [1, 3]));
        assert!(is_edge_crossing_edge(
            &[[0.0, 0.0], [1.0, 1.0], [0.0, 1.0], [1.0, 0.0]],
            [0, 1],
            [2, 3]
        ));
    }

    #[test]
    fn test_brute_force_diagonal() {
        let triangulation = unit_square();
        let [a, c, p, b] = [[0.0, 0.0], [1.0, 1.0], [0.2, 0.6], [1.0, 0.0]]
            .map(|v| triangulation.vertex_idx(&v).unwrap());

        // the interior point lies above the diagonal, only its spoke to the lower right corner crosses
        let crossing = BruteForceFinder.crossing_edges(&triangulation, [a, c]);
        assert_eq!(crossing.len(), 1);
        assert!(crossing[0].contains(&p) && crossing[0].contains(&b));

        // existing edges are crossed by nothing
        for edge in triangulation.unique_edges() {
            assert!(BruteForceFinder
                .crossing_edges(&triangulation, edge)
                .is_empty());
        }
    }
}
