use std::collections::VecDeque;

use super::{constraint_segments, RegionOutcome};
use crate::{
    triangulation::{hedge_vertex_edge, Triangulation},
    trids::tri_iterator::TriIterator,
    utils::{
        helper::{is_same_vertex_edge, signed_area_doubled},
        types::{TriIteratorIdx, VertexIdx},
    },
    VertexNode,
};

/// Collect the triangles enclosed by a clockwise constraint polygon.
///
/// The fill starts at the triangle on the inner side of the first segment. Triangles are stored
/// counter-clockwise, so for a clockwise polygon that is the triangle holding the hedge
/// `c[1] -> c[0]`. From there it spreads over all neighbors that are not separated by a
/// constraint segment. The triangles are only collected, not deleted.
pub fn fill_interior_region(
    triangulation: &Triangulation,
    constraint: &[VertexIdx],
    max_iterations: usize,
) -> RegionOutcome {
    if constraint.len() < 3 {
        return RegionOutcome::Degenerate;
    }

    let polygon: Vec<_> = constraint
        .iter()
        .map(|&v_idx| triangulation.vertices()[v_idx])
        .collect();
    if signed_area_doubled(&polygon) > 0.0 {
        log::warn!("Constraint is counter-clockwise, the erased region lies outside of it");
    }

    let Some(seed) = triangulation
        .tds()
        .find_hedge(
            VertexNode::Casual(constraint[1]),
            VertexNode::Casual(constraint[0]),
        )
        .map(|hedge| hedge.tri().idx)
    else {
        log::debug!("No triangle on the inner side of the constraint");
        return RegionOutcome::NoRegion;
    };

    let segments = constraint_segments(constraint);

    let mut visited = vec![false; triangulation.num_all_tris()];
    let mut queue: VecDeque<TriIteratorIdx> = VecDeque::from([seed]);
    visited[seed] = true;

    let mut triangles = Vec::new();
    let mut truncated = false;

    while let Some(tri_idx) = queue.pop_front() {
        if triangles.len() >= max_iterations {
            log::warn!(
                "Region fill truncated after {} triangles, {} triangles not visited",
                triangles.len(),
                queue.len() + 1
            );
            truncated = true;
            break;
        }
        triangles.push(tri_idx);

        for hedge in TriIterator::new(triangulation.tds(), tri_idx).hedges() {
            let Some(twin) = hedge.twin() else {
                continue;
            };

            let neighbor = twin.tri().idx;
            if visited[neighbor] {
                continue;
            }

            let is_constraint = hedge_vertex_edge(&hedge)
                .is_some_and(|edge| segments.iter().any(|s| is_same_vertex_edge(s, &edge)));
            if is_constraint {
                continue;
            }

            visited[neighbor] = true;
            queue.push_back(neighbor);
        }
    }

    RegionOutcome::Erased {
        triangles,
        truncated,
    }
}
