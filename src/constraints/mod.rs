//! Constraint insertion after Sloan: find the edges crossing a constraint segment, flip them away,
//! restore the Delaunay property around the new edges and optionally erase the enclosed region.

pub mod insertion;
pub mod intersection;
pub mod region;
pub mod restoration;

use core::fmt;

use crate::{
    triangulation::Triangulation,
    utils::types::{HedgeIteratorIdx, TriIteratorIdx, VertexEdge, VertexIdx},
};

/// Outcome of a bounded flip loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Convergence {
    /// The loop finished on its own.
    Converged { flips: usize },
    /// The loop hit its limit, `remaining` edges were still to be processed.
    Stalled { flips: usize, remaining: usize },
}

impl Convergence {
    pub const fn flips(&self) -> usize {
        match self {
            Convergence::Converged { flips } | Convergence::Stalled { flips, .. } => *flips,
        }
    }

    pub const fn is_stalled(&self) -> bool {
        matches!(self, Convergence::Stalled { .. })
    }
}

impl fmt::Display for Convergence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Convergence::Converged { flips } => write!(f, "converged after {flips} flips"),
            Convergence::Stalled { flips, remaining } => {
                write!(f, "stalled after {flips} flips, {remaining} edges left")
            }
        }
    }
}

/// What happened while inserting one constraint segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentReport {
    pub segment: VertexEdge,
    /// The segment was already an edge, nothing was flipped.
    pub already_present: bool,
    /// Number of edges crossing the segment before insertion.
    pub crossings: usize,
    pub insertion: Convergence,
    pub restoration: Convergence,
    /// The segment is an edge of the triangulation afterwards.
    pub present: bool,
}

impl SegmentReport {
    pub(crate) const fn already_present(segment: VertexEdge) -> Self {
        Self {
            segment,
            already_present: true,
            crossings: 0,
            insertion: Convergence::Converged { flips: 0 },
            restoration: Convergence::Converged { flips: 0 },
            present: true,
        }
    }

    pub const fn flips(&self) -> usize {
        self.insertion.flips() + self.restoration.flips()
    }
}

/// Outcome of the interior region eraser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionOutcome {
    /// Erasing was not requested.
    Skipped,
    /// The constraint has less than three vertices and encloses nothing.
    Degenerate,
    /// No triangle lies on the inner side of the first constraint segment.
    NoRegion,
    /// The triangles of the region, in the order they were reached.
    Erased {
        triangles: Vec<TriIteratorIdx>,
        truncated: bool,
    },
}

impl RegionOutcome {
    /// Number of erased triangles.
    pub fn num_erased(&self) -> usize {
        match self {
            RegionOutcome::Erased { triangles, .. } => triangles.len(),
            _ => 0,
        }
    }
}

/// Summary of inserting one constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CdtReport {
    pub segments: Vec<SegmentReport>,
    pub region: RegionOutcome,
}

impl CdtReport {
    pub const fn empty() -> Self {
        Self {
            segments: Vec::new(),
            region: RegionOutcome::Skipped,
        }
    }

    /// Flips of all segments, insertion and restoration.
    pub fn total_flips(&self) -> usize {
        self.segments.iter().map(SegmentReport::flips).sum()
    }

    /// Check if any loop hit its limit.
    pub fn is_stalled(&self) -> bool {
        self.segments
            .iter()
            .any(|s| s.insertion.is_stalled() || s.restoration.is_stalled())
            || matches!(
                self.region,
                RegionOutcome::Erased {
                    truncated: true,
                    ..
                }
            )
    }

    /// Check if every segment is an edge of the triangulation.
    pub fn all_present(&self) -> bool {
        self.segments.iter().all(|s| s.present)
    }
}

/// The segments of a closed constraint polyline, `(c[i], c[i + 1 mod n])`.
///
/// Two vertices give a single segment, less give none.
pub fn constraint_segments(constraint: &[VertexIdx]) -> Vec<VertexEdge> {
    match constraint.len() {
        0 | 1 => Vec::new(),
        2 => vec![[constraint[0], constraint[1]]],
        n => (0..n)
            .map(|i| [constraint[i], constraint[(i + 1) % n]])
            .collect(),
    }
}

/// The two triangles adjacent to an interior edge.
///
/// The hedge runs `from -> to`, `apex` completes its triangle and `opposite_apex` the twin's.
/// The quad `from, opposite_apex, to, apex` is in counter-clockwise order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct EdgeQuad {
    pub hedge: HedgeIteratorIdx,
    pub from: VertexIdx,
    pub to: VertexIdx,
    pub apex: VertexIdx,
    pub opposite_apex: VertexIdx,
}

impl EdgeQuad {
    /// Look up the quad of an edge, `None` if the edge is missing or on the boundary.
    pub fn of(triangulation: &Triangulation, edge: VertexEdge) -> Option<Self> {
        let hedge = triangulation.find_edge(edge)?;
        let twin = hedge.twin()?;

        Some(Self {
            hedge: hedge.idx,
            from: hedge.starting_node().idx()?,
            to: hedge.end_node().idx()?,
            apex: hedge.prev().starting_node().idx()?,
            opposite_apex: twin.prev().starting_node().idx()?,
        })
    }

    pub fn is_convex(&self, triangulation: &Triangulation) -> bool {
        let v = triangulation.vertices();
        crate::predicates::is_quad_convex(
            &v[self.from],
            &v[self.opposite_apex],
            &v[self.to],
            &v[self.apex],
        )
    }

    /// The edge violates the Delaunay criterion and flipping it keeps the triangles valid.
    pub fn should_flip(&self, triangulation: &Triangulation) -> bool {
        let v = triangulation.vertices();
        crate::predicates::should_flip_edge(
            &v[self.from],
            &v[self.to],
            &v[self.apex],
            &v[self.opposite_apex],
        ) && self.is_convex(triangulation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_segments() {
        assert!(constraint_segments(&[]).is_empty());
        assert!(constraint_segments(&[3]).is_empty());
        assert_eq!(constraint_segments(&[3, 5]), vec![[3, 5]]);
        assert_eq!(
            constraint_segments(&[0, 1, 2]),
            vec![[0, 1], [1, 2], [2, 0]]
        );
    }

    #[test]
    fn test_report_aggregation() {
        let report = CdtReport {
            segments: vec![
                SegmentReport::already_present([0, 1]),
                SegmentReport {
                    segment: [1, 2],
                    already_present: false,
                    crossings: 2,
                    insertion: Convergence::Converged { flips: 2 },
                    restoration: Convergence::Stalled {
                        flips: 3,
                        remaining: 1,
                    },
                    present: true,
                },
            ],
            region: RegionOutcome::Skipped,
        };

        assert_eq!(report.total_flips(), 5);
        assert!(report.is_stalled());
        assert!(report.all_present());
        assert_eq!(report.region.num_erased(), 0);
        assert!(!CdtReport::empty().is_stalled());
    }
}
