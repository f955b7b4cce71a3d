use std::collections::HashMap;

use super::{hedge_iterator::HedgeIterator, tri_iterator::TriIterator};
use crate::{
    utils::types::{HedgeIteratorIdx, TriIteratorIdx, VertexIdx},
    VertexNode,
};

use anyhow::{Ok as HowOk, Result as HowResult};

/// Index of the hedge following `idx` in its triangle.
pub(crate) const fn next_idx(idx: HedgeIteratorIdx) -> HedgeIteratorIdx {
    idx - idx % 3 + (idx + 1) % 3
}

/// Index of the hedge preceding `idx` in its triangle.
pub(crate) const fn prev_idx(idx: HedgeIteratorIdx) -> HedgeIteratorIdx {
    idx - idx % 3 + (idx + 2) % 3
}

/// A 2D triangulation data structure.
///
/// The edges are stored in a doubly-connected edge list (DCEL) manner.
///
/// ```ignore
/// i   --> hedge0 \
/// |        |       \
/// v        v        |
/// i+1 --> hedge1 ---|-->  triangle
/// |        |        |
/// v        v       /
/// i+2 --> hedge2 /
/// ```
//
// where:
// `hedge2 = next(he1)`,
// `hedge3 = next(he2)`,
// `hedge1 = next(he3)`
//
// Triangles are never compacted: a deleted triangle keeps its slots, marked with
// `VertexNode::Deleted`, so all hedge and triangle indices stay stable.
#[derive(Debug)]
pub struct TriDataStructure {
    /// The first node is stored, the last can be obtained via `% 3`
    pub(crate) hedge_starting_nodes: Vec<VertexNode>,
    /// `None` for hedges on the boundary, i.e. without a neighboring triangle.
    pub(crate) hedge_twins: Vec<Option<HedgeIteratorIdx>>,
    /// Directed `(start, end)` node pairs of all live hedges.
    hedge_lookup: HashMap<(VertexNode, VertexNode), HedgeIteratorIdx>,
    pub num_tris: usize,
    /// The number of deleted triangles.
    pub num_deleted_tris: usize, // we also need to track the number of deleted to index into the existing one correctly (otherwise we would have to shift all indices, which is tedious)
}

impl Default for TriDataStructure {
    fn default() -> Self {
        Self::new()
    }
}

impl TriDataStructure {
    pub fn new() -> Self {
        Self {
            hedge_starting_nodes: Vec::new(),
            hedge_twins: Vec::new(),
            hedge_lookup: HashMap::new(),
            num_tris: 0,
            num_deleted_tris: 0,
        }
    }

    /// Add a triangle to the triangulation and retrieve the hedge indices.
    ///
    /// The new hedges have no twins yet.
    pub fn add_tri(
        &mut self,
        vertex_nodes: [VertexNode; 3],
    ) -> (HedgeIteratorIdx, HedgeIteratorIdx, HedgeIteratorIdx) {
        let hedge_idx0 = self.hedge_starting_nodes.len();

        self.hedge_starting_nodes.extend_from_slice(&vertex_nodes); // Add the three nodes to the node list
        self.hedge_twins.extend_from_slice(&[None; 3]);

        self.register_tri(hedge_idx0 / 3);
        self.num_tris += 1;

        (hedge_idx0, hedge_idx0 + 1, hedge_idx0 + 2)
    }

    /// Insert an initial triangle into the triangulation.
    ///
    /// The vertices must be given in counter-clockwise order. Every edge of the triangle is
    /// closed by a conceptual triangle connecting it to the vertex at infinity.
    pub fn add_init_tri(&mut self, v_idxs: [VertexIdx; 3]) -> HowResult<[TriIterator; 4]> {
        if self.num_tris() > 0 {
            return Err(anyhow::Error::msg(
                "Triangulation already contains triangles!",
            ));
        }

        let [a, b, c] = v_idxs.map(VertexNode::Casual);
        let n_inf = VertexNode::Conceptual;

        let (hedge01, hedge12, hedge20) = self.add_tri([a, b, c]);
        let (hedgei2, hedge21, hedge1i) = self.add_tri([n_inf, c, b]);
        let (hedge2i, hedgei0, hedge02) = self.add_tri([c, n_inf, a]);
        let (hedge10, hedge0i, hedgei1) = self.add_tri([b, a, n_inf]);

        // E.g. the twin of hedge01 is hedge10, i.e the reverse direction of creation above
        self.link(hedge01, hedge10);
        self.link(hedge12, hedge21);
        self.link(hedge20, hedge02);
        self.link(hedgei2, hedge2i);
        self.link(hedge1i, hedgei1);
        self.link(hedgei0, hedge0i);

        HowOk([
            TriIterator::new(self, 0),
            TriIterator::new(self, 1),
            TriIterator::new(self, 2),
            TriIterator::new(self, 3),
        ])
    }

    /// Insert a vertex `d` into an existing triangle `abc`; called the `1 -> 3 flip`, as it deletes the triangle and creates three new ones.
    pub fn flip_1_to_3(
        &mut self,
        idx_to_remove: TriIteratorIdx,
        v_idx: VertexIdx,
    ) -> HowResult<[TriIterator; 3]> {
        if self.get_tri(idx_to_remove)?.is_deleted() {
            return Err(anyhow::Error::msg("Cannot insert into a deleted triangle!"));
        }

        let hedge_ab = idx_to_remove * 3;
        let hedge_bc = hedge_ab + 1;
        let hedge_ca = hedge_ab + 2;

        let a = self.hedge_starting_nodes[hedge_ab];
        let b = self.hedge_starting_nodes[hedge_bc];
        let c = self.hedge_starting_nodes[hedge_ca];

        let d = VertexNode::Casual(v_idx);

        let hedge_ba = self.hedge_twins[hedge_ab];
        let hedge_cb = self.hedge_twins[hedge_bc];
        let hedge_ac = self.hedge_twins[hedge_ca];

        let (hedge_ab, hedge_bd, hedge_da) = self.replace_tri(idx_to_remove, a, b, d);
        let (hedge_bc, hedge_cd, hedge_db) = self.add_tri([b, c, d]);
        let (hedge_ca, hedge_ad, hedge_dc) = self.add_tri([c, a, d]);

        self.relink(hedge_ab, hedge_ba);
        self.relink(hedge_bc, hedge_cb);
        self.relink(hedge_ca, hedge_ac);
        self.link(hedge_bd, hedge_db);
        self.link(hedge_da, hedge_ad);
        self.link(hedge_cd, hedge_dc);

        let num_all_tris = self.num_all_tris();

        HowOk([
            TriIterator::new(self, idx_to_remove),
            TriIterator::new(self, num_all_tris - 2),
            TriIterator::new(self, num_all_tris - 1),
        ])
    }

    /// Flips an edge that internally connects two triangles to an edge that connects the other two vertices.
    ///
    /// The two triangles `cab` and `acd` sharing the hedge `c -> a` become `bcd` and `dab`.
    /// Returns the index of the new diagonal hedge `d -> b`.
    ///
    /// The caller is responsible for the quadrilateral `abcd` being convex.
    pub fn flip_2_to_2(&mut self, idx: HedgeIteratorIdx) -> HowResult<HedgeIteratorIdx> {
        let hedge = self.get_hedge(idx)?;

        if hedge.is_deleted() {
            return Err(anyhow::Error::msg("Cannot flip a deleted hedge!"));
        }
        let Some(hedge_twin) = hedge.twin() else {
            return Err(anyhow::Error::msg("Cannot flip a boundary hedge!"));
        };
        let hedge_twin_idx = hedge_twin.idx;

        let tri1_idx = idx / 3;
        let tri2_idx = hedge_twin_idx / 3;

        let hedge_ab = next_idx(idx);
        let hedge_bc = prev_idx(idx);
        let hedge_cd = next_idx(hedge_twin_idx);
        let hedge_da = prev_idx(hedge_twin_idx);

        let na = self.hedge_starting_nodes[hedge_ab];
        let nb = self.hedge_starting_nodes[hedge_bc];
        let nc = self.hedge_starting_nodes[hedge_cd];
        let nd = self.hedge_starting_nodes[hedge_da];

        let hedge_ba = self.hedge_twins[hedge_ab];
        let hedge_cb = self.hedge_twins[hedge_bc];
        let hedge_dc = self.hedge_twins[hedge_cd];
        let hedge_ad = self.hedge_twins[hedge_da];

        let (hedge_bc, hedge_cd, hedge_db) = self.replace_tri(tri1_idx, nb, nc, nd);
        let (hedge_da, hedge_ab, hedge_bd) = self.replace_tri(tri2_idx, nd, na, nb);

        self.relink(hedge_ab, hedge_ba);
        self.relink(hedge_bc, hedge_cb);
        self.relink(hedge_cd, hedge_dc);
        self.relink(hedge_da, hedge_ad);
        self.link(hedge_bd, hedge_db);

        HowOk(hedge_db)
    }

    /// Removes a triangle from the triangulation.
    ///
    /// The hedges of the neighboring triangles that pointed into the removed triangle become boundary hedges.
    pub fn delete_tri(&mut self, tri_idx: TriIteratorIdx) -> HowResult<()> {
        if self.get_tri(tri_idx)?.is_deleted() {
            return Err(anyhow::Error::msg("Triangle is already deleted!"));
        }

        self.unregister_tri(tri_idx);

        for idx in tri_idx * 3..tri_idx * 3 + 3 {
            if let Some(twin_idx) = self.hedge_twins[idx].take() {
                self.hedge_twins[twin_idx] = None;
            }
            self.hedge_starting_nodes[idx] = VertexNode::Deleted;
        }

        self.num_tris -= 1;
        self.num_deleted_tris += 1;

        HowOk(())
    }

    /// Retrieve a half-edge iterator by index.
    pub fn get_hedge(&self, idx: HedgeIteratorIdx) -> HowResult<HedgeIterator> {
        if idx >= self.hedge_starting_nodes.len() {
            return Err(anyhow::Error::msg("Hedge index out of bounds"));
        }

        HowOk(HedgeIterator::new(self, idx))
    }

    /// Retrieve a tri iterator by index.
    pub fn get_tri(&self, idx: TriIteratorIdx) -> HowResult<TriIterator> {
        if idx >= self.num_all_tris() {
            // - num_deleted_tris because we have to account for the deleted, that basically clog up array indices
            return Err(anyhow::Error::msg("Tri index out of bounds!"));
        }

        HowOk(TriIterator::new(self, idx))
    }

    /// Retrieve the hedge running from `from` to `to`, if the triangulation contains it.
    pub fn find_hedge(&self, from: VertexNode, to: VertexNode) -> Option<HedgeIterator> {
        self.hedge_lookup
            .get(&(from, to))
            .map(|&idx| HedgeIterator::new(self, idx))
    }

    /// Iterate over all triangles that are not deleted.
    pub fn tris(&self) -> impl Iterator<Item = TriIterator<'_>> + '_ {
        (0..self.num_all_tris())
            .map(move |idx| TriIterator::new(self, idx))
            .filter(|tri| !tri.is_deleted())
    }

    /// Iterate over one hedge per undirected edge.
    ///
    /// Interior edges are represented by the hedge with the smaller index, boundary edges by their only hedge.
    pub fn unique_hedges(&self) -> impl Iterator<Item = HedgeIterator<'_>> + '_ {
        self.tris().flat_map(|tri| tri.hedges()).filter(|hedge| {
            hedge
                .twin()
                .map_or(true, |twin| hedge.idx < twin.idx)
        })
    }

    /// Get the number of triangles in the triangulation.
    pub const fn num_tris(&self) -> usize {
        self.num_tris
    }

    /// Get the number of triangle slots, i.e. including the deleted ones.
    pub const fn num_all_tris(&self) -> usize {
        self.num_tris + self.num_deleted_tris
    }

    /// Get the number of triangles in the triangulation, without the ones connected to the dummy point.
    pub fn num_casual_tris(&self) -> usize {
        self.tris().filter(TriIterator::is_casual).count()
    }

    /// Check if the data structure is sound, i.e. hedges point to correct next and previous nodes.
    pub fn is_sound(&self) -> bool {
        let mut sound = true;

        for hedge_idx in 0..self.hedge_starting_nodes.len() {
            if self.hedge_starting_nodes[hedge_idx] == VertexNode::Deleted {
                continue;
            }
            let hedge = HedgeIterator::new(self, hedge_idx);
            sound = hedge.is_sound() && sound;
        }

        sound
    }

    /// Replace a triangle in the triangulation and retrieve the hedge indices.
    ///
    /// The twins of the replaced hedges are left untouched.
    pub fn replace_tri(
        &mut self,
        idx_to_remove: TriIteratorIdx,
        v0: VertexNode,
        v1: VertexNode,
        v2: VertexNode,
    ) -> (HedgeIteratorIdx, HedgeIteratorIdx, HedgeIteratorIdx) {
        let idx0 = idx_to_remove * 3;

        self.unregister_tri(idx_to_remove);

        self.hedge_starting_nodes[idx0] = v0;
        self.hedge_starting_nodes[idx0 + 1] = v1;
        self.hedge_starting_nodes[idx0 + 2] = v2;

        self.register_tri(idx_to_remove);

        (idx0, idx0 + 1, idx0 + 2)
    }

    /// Make two hedges twins of each other.
    fn link(&mut self, hedge0: HedgeIteratorIdx, hedge1: HedgeIteratorIdx) {
        self.hedge_twins[hedge0] = Some(hedge1);
        self.hedge_twins[hedge1] = Some(hedge0);
    }

    /// Set the twin of a hedge that was rewritten, keeping the boundary if it had no twin.
    fn relink(&mut self, hedge: HedgeIteratorIdx, twin: Option<HedgeIteratorIdx>) {
        match twin {
            Some(twin) => self.link(hedge, twin),
            None => self.hedge_twins[hedge] = None,
        }
    }

    fn hedge_key(&self, idx: HedgeIteratorIdx) -> Option<(VertexNode, VertexNode)> {
        let start = self.hedge_starting_nodes[idx];
        let end = self.hedge_starting_nodes[next_idx(idx)];

        if start.is_deleted() || end.is_deleted() {
            return None;
        }
        Some((start, end))
    }

    fn register_tri(&mut self, tri_idx: TriIteratorIdx) {
        for idx in tri_idx * 3..tri_idx * 3 + 3 {
            if let Some(key) = self.hedge_key(idx) {
                self.hedge_lookup.insert(key, idx);
            }
        }
    }

    // A key can already point to another slot when a flip moved the edge there, it stays then.
    fn unregister_tri(&mut self, tri_idx: TriIteratorIdx) {
        for idx in tri_idx * 3..tri_idx * 3 + 3 {
            if let Some(key) = self.hedge_key(idx) {
                if self.hedge_lookup.get(&key) == Some(&idx) {
                    self.hedge_lookup.remove(&key);
                }
            }
        }
    }
}
