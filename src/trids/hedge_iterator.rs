use core::fmt;

use super::{
    tri_data_structure::{next_idx, prev_idx, TriDataStructure},
    tri_iterator::TriIterator,
};
use crate::{utils::types::HedgeIteratorIdx, VertexNode};

/// An iterator over the half-edges of a triangulation data structure.
#[derive(Clone, Copy)]
pub struct HedgeIterator<'a> {
    pub tds: &'a TriDataStructure,
    /// The hedge idx of this iterator
    pub idx: HedgeIteratorIdx,
}

impl<'a> HedgeIterator<'a> {
    pub const fn new(tds: &'a TriDataStructure, idx: HedgeIteratorIdx) -> Self {
        Self { tds, idx }
    }

    /// Retrieve the node this hedge originates from.
    pub fn starting_node(&self) -> VertexNode {
        self.tds.hedge_starting_nodes[self.idx]
    }

    /// Retrieve the node this hedge ends at.
    pub fn end_node(&self) -> VertexNode {
        self.tds.hedge_starting_nodes[next_idx(self.idx)]
    }

    /// Retrieve both nodes as `[start, end]`.
    pub fn nodes(&self) -> [VertexNode; 2] {
        [self.starting_node(), self.end_node()]
    }

    /// Check if the hedge is conceptual, i.e. one of the nodes is the infinite node
    pub fn is_conceptual(&self) -> bool {
        self.starting_node().is_conceptual() || self.end_node().is_conceptual()
    }

    /// Check if the hedge belongs to a deleted triangle.
    pub fn is_deleted(&self) -> bool {
        self.starting_node().is_deleted()
    }

    /// Check if the hedge lies on the boundary of the triangulation, i.e. has no twin.
    pub fn is_boundary(&self) -> bool {
        self.tds.hedge_twins[self.idx].is_none()
    }

    /// Check if the hedge is sound, i.e. `next`, `prev` and `twin` are pointing to correct nodes.
    pub fn is_sound(&self) -> bool {
        let mut sound = true;

        let starting_node = self.starting_node();
        let end_node = self.end_node();

        let mut check = |condition: bool, error_msg: &str| {
            if !condition {
                log::error!("{self}: {error_msg}");
                sound = false;
            }
        };

        check(self.next().starting_node() == end_node, "Wrong next hedge");
        check(self.prev().end_node() == starting_node, "Wrong prev hedge");

        if let Some(twin) = self.twin() {
            check(
                twin.starting_node() == end_node && twin.end_node() == starting_node,
                "Wrong twin hedge",
            );
            check(
                twin.twin().map(|h| h.idx) == Some(self.idx),
                "Twin of twin is not this hedge",
            );
        }

        check(
            self.tds
                .find_hedge(starting_node, end_node)
                .map(|h| h.idx)
                == Some(self.idx),
            "Hedge is not registered under its nodes",
        );

        sound
    }

    /// Retrieve the `next` half-edge belonging to the same triangle.
    pub const fn next(&self) -> HedgeIterator<'a> {
        Self::new(self.tds, next_idx(self.idx))
    }

    /// Retrieve the `twin` (aka opposite) half-edge belonging to the neighboring triangle.
    ///
    /// This is the hedge that goes in the opposite direction,
    ///
    /// i.e. `self.starting_node() == self.twin().end_node()` and the other way around.
    ///
    /// Hedges on the boundary of the triangulation have no twin.
    pub fn twin(&self) -> Option<HedgeIterator<'a>> {
        self.tds.hedge_twins[self.idx].map(|idx| Self::new(self.tds, idx))
    }

    /// Retrieve the `previous` half-edge belonging to the same triangle.
    pub const fn prev(&self) -> HedgeIterator<'a> {
        Self::new(self.tds, prev_idx(self.idx))
    }

    /// Retrieve the triangle this half-edge belongs to.
    pub const fn tri(&self) -> TriIterator<'a> {
        TriIterator::new(self.tds, self.idx / 3)
    }
}

impl fmt::Display for HedgeIterator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Edge {}: {} -> {}",
            self.idx,
            self.starting_node(),
            self.end_node()
        )
    }
}
