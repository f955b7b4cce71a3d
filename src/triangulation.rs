use std::{cmp, collections::HashMap};

use crate::{
    predicates::{in_circle, orient_2d, should_flip_edge},
    trids::{
        hedge_iterator::HedgeIterator, tri_data_structure::TriDataStructure,
        tri_iterator::TriIterator,
    },
    utils::{
        convexity::is_convex,
        helper::{is_same_vertex_edge, DisplayWrapper},
        point_order::sort_along_hilbert_curve_2d,
        types::{Edge2, HedgeIteratorIdx, Triangle2, TriIteratorIdx, Vertex2, VertexEdge, VertexIdx},
    },
    VertexNode,
};
use anyhow::{Ok, Result};
use log::error;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

/// Triangle, including point at infinity
pub enum TriangleExtended {
    /// Normal Triangle
    Triangle(Triangle2),
    /// Triangle with one point at infinity, i.e. a line segment
    ConceptualTriangle(Edge2),
}

/// A 2D Delaunay triangulation, built by incremental insertion and flipping.
///
/// During construction the convex hull is closed by conceptual triangles connected to a vertex at
/// infinity. They are removed once all vertices are inserted, so the finished triangulation only
/// contains casual triangles and its hull hedges have no twin.
///
/// ```
/// use rita_cdt::Triangulation;
///
/// let vertices = vec![
///     [0.0, 0.0],
///     [-0.5, 1.0],
///     [0.0, 2.5],
///     [2.0, 3.0],
///     [4.0, 2.5],
///     [5.0, 1.5],
///     [4.5, 0.5],
///     [2.5, -0.5],
///     [1.5, 1.5],
///     [3.0, 1.0],
/// ];
///
/// let mut triangulation = Triangulation::new();
/// triangulation.insert_vertices(&vertices, true).unwrap(); // the last parameter toggles spatial sorting
///
/// assert_eq!(triangulation.is_delaunay_p(), 1.0);
/// ```
pub struct Triangulation {
    pub tds: TriDataStructure,
    pub vertices: Vec<Vertex2>,
    /// Maps the bit pattern of a vertex to its index.
    vertex_lookup: HashMap<[u64; 2], VertexIdx>,
    time_flipping: u128,
    time_inserting: u128,
    time_walking: u128,
    last_inserted_triangle: Option<usize>,
    /// Input vertices that were dropped, because a vertex with the same coordinates was already given.
    num_duplicate_vertices: usize,
}

impl Default for Triangulation {
    fn default() -> Self {
        Self::new()
    }
}

/// Key for exact coordinate equality, with `-0.0` and `0.0` being the same coordinate.
fn vertex_key(v: &Vertex2) -> [u64; 2] {
    [(v[0] + 0.0).to_bits(), (v[1] + 0.0).to_bits()]
}

impl Triangulation {
    pub fn new() -> Self {
        Self {
            tds: TriDataStructure::new(),
            vertices: Vec::new(),
            vertex_lookup: HashMap::new(),
            time_flipping: 0,
            time_inserting: 0,
            time_walking: 0,
            last_inserted_triangle: None,
            num_duplicate_vertices: 0,
        }
    }

    /// Utility function for locate via vis walk.
    ///
    /// Checks all edges for a triangle to go to the next tri or return None, i.e. stop locate at current tri.
    #[must_use]
    pub fn choose_hedge<'a>(
        &self,
        v_hedges: &[HedgeIterator<'a>],
        v: &Vertex2,
    ) -> Option<HedgeIterator<'a>> {
        for hedge in v_hedges {
            // only process casual hedges
            if let (VertexNode::Casual(v0), VertexNode::Casual(v1)) =
                (hedge.starting_node(), hedge.end_node())
            {
                let v0 = &self.vertices[v0];
                let v1 = &self.vertices[v1];

                let orientation = orient_2d(v0, v1, v);

                if hedge.tri().is_conceptual() {
                    if orientation <= 0.0 {
                        return Some(*hedge);
                    }
                } else if orientation < 0.0 {
                    return Some(*hedge);
                } else if orientation == 0.0
                    && hedge.twin().is_some_and(|twin| twin.tri().is_conceptual())
                    && is_strictly_between(v0, v1, v)
                {
                    // the vertex lies on a hull edge, it has to split the conceptual triangle,
                    // otherwise the casual triangle would become flat
                    return Some(*hedge);
                }
            }
        }
        None
    }

    /// For a tri idx get the triangle variant, i.e. a normal triangle, or a line with one of its three indices at infinity
    pub fn get_tri_type(&self, tri_idx: TriIteratorIdx) -> Result<TriangleExtended> {
        let [node0, node1, node2] = self.tds.get_tri(tri_idx)?.nodes();

        let tri_extended = match (node0, node1, node2) {
            (VertexNode::Conceptual, VertexNode::Casual(idx1), VertexNode::Casual(idx2)) => {
                TriangleExtended::ConceptualTriangle([self.vertices[idx1], self.vertices[idx2]])
            }
            (VertexNode::Casual(idx0), VertexNode::Conceptual, VertexNode::Casual(idx2)) => {
                TriangleExtended::ConceptualTriangle([self.vertices[idx2], self.vertices[idx0]])
            }
            (VertexNode::Casual(idx0), VertexNode::Casual(idx1), VertexNode::Conceptual) => {
                TriangleExtended::ConceptualTriangle([self.vertices[idx0], self.vertices[idx1]])
            }
            (VertexNode::Casual(idx0), VertexNode::Casual(idx1), VertexNode::Casual(idx2)) => {
                TriangleExtended::Triangle([
                    self.vertices[idx0],
                    self.vertices[idx1],
                    self.vertices[idx2],
                ])
            }
            (_, _, _) => return Err(anyhow::Error::msg("An unexpected triangle case occurred")),
        };

        Ok(tri_extended)
    }

    pub fn insert_init_tri(&mut self, v_idxs: &mut Vec<VertexIdx>) -> Result<()> {
        let now = std::time::Instant::now();

        let (Some(idx0), Some(idx1)) = (v_idxs.pop(), v_idxs.pop()) else {
            return Err(anyhow::Error::msg(
                "Needs at least 3 vertices to compute a 2D Triangulation!",
            ));
        };

        let v0 = self.vertices[idx0];
        let v1 = self.vertices[idx1];

        let mut aligned = Vec::new();

        loop {
            let Some(idx2) = v_idxs.pop() else {
                return Err(anyhow::Error::msg(
                    "All points are aligned, i.e. could not find 3 non-aligned points !",
                ));
            };

            let orientation = orient_2d(&v0, &v1, &self.vertices[idx2]);

            // insert the triangle in ccw order, or if aligned, find another point to build the starting triangle
            match orientation.partial_cmp(&0.0) {
                Some(cmp::Ordering::Greater) => {
                    self.tds.add_init_tri([idx0, idx1, idx2])?;
                }
                Some(cmp::Ordering::Less) => {
                    self.tds.add_init_tri([idx0, idx2, idx1])?;
                }
                _ => {
                    aligned.push(idx2);
                    continue;
                }
            }
            break;
        }

        v_idxs.append(&mut aligned); // re-add the aligned points

        self.last_inserted_triangle = Some(0); // here the first triangle is the last inserted, as it is the initial casual triangle

        log::trace!(
            "Initial triangle inserted in {:.4} µs",
            now.elapsed().as_micros()
        );
        Ok(())
    }

    /// Insert a set of vertices and compute their Delaunay triangulation.
    ///
    /// Vertices with the same coordinates as an earlier one are skipped. The triangulation can only
    /// be computed once, the conceptual triangles are removed at the end.
    pub fn insert_vertices(&mut self, vertices: &[Vertex2], spatial_sorting: bool) -> Result<()> {
        if self.tds.num_all_tris() > 0 {
            return Err(anyhow::Error::msg(
                "Vertices can only be inserted into an empty triangulation!",
            ));
        }

        if let Some(v) = vertices.iter().find(|v| !v[0].is_finite() || !v[1].is_finite()) {
            return Err(anyhow::Error::msg(format!(
                "Vertex {v:?} has a non-finite coordinate!"
            )));
        }

        let mut idxs_to_insert = Vec::with_capacity(vertices.len());

        for v in vertices {
            let next_idx = self.vertices.len();
            let v_idx = *self.vertex_lookup.entry(vertex_key(v)).or_insert(next_idx);

            if v_idx == next_idx {
                idxs_to_insert.push(v_idx);
                self.vertices.push(*v);
            } else {
                self.num_duplicate_vertices += 1;
            }
        }

        if self.num_duplicate_vertices > 0 {
            log::debug!("Skipped {} duplicate vertices", self.num_duplicate_vertices);
        }

        if self.vertices.len() < 3 {
            return Err(anyhow::Error::msg(
                "Needs at least 3 vertices to compute a 2D Triangulation!",
            ));
        }

        if spatial_sorting {
            let now = std::time::Instant::now();

            idxs_to_insert = sort_along_hilbert_curve_2d(&self.vertices, &idxs_to_insert);

            log::trace!(
                "Spatial sorting (hilbert curve) computed in {:.4} µs",
                now.elapsed().as_micros()
            );
        }

        self.insert_init_tri(&mut idxs_to_insert)?;

        log::debug!("Inserting {} vertices", idxs_to_insert.len() + 3);

        while let Some(v_idx) = idxs_to_insert.pop() {
            let near_to_idx = self
                .last_inserted_triangle
                .unwrap_or(self.tds.num_all_tris() - 1);

            self.insert_v_helper(v_idx, near_to_idx)?;
        }

        self.remove_conceptual_tris()?;

        self.log_time();

        Ok(())
    }

    pub fn insert_v_helper(&mut self, v_idx: VertexIdx, near_to: TriIteratorIdx) -> Result<()> {
        // Perform locate and measure time
        let now = std::time::Instant::now();
        let containing_tri_idx = self.locate_vis_walk(v_idx, near_to)?;

        self.time_walking += now.elapsed().as_micros();

        // Perform insert and measure time
        let now = std::time::Instant::now();

        // Hedges are remembered by their nodes, as flips move the outer hedges of a quad to other slots.
        // Each entry is the twin of a hedge of the containing triangle.
        let mut hedges_to_verify: Vec<[VertexNode; 2]> = self
            .tds
            .get_tri(containing_tri_idx)?
            .hedges()
            .iter()
            .map(|hedge| [hedge.end_node(), hedge.starting_node()])
            .collect();

        let [t0, _, _] = self.tds.flip_1_to_3(containing_tri_idx, v_idx)?;
        self.last_inserted_triangle = Some(t0.idx);
        self.time_inserting += now.elapsed().as_micros();

        // Perform flips and measure time
        let now = std::time::Instant::now();
        while let Some([from, to]) = hedges_to_verify.pop() {
            let Some(hedge_idx) = self.tds.find_hedge(from, to).map(|hedge| hedge.idx) else {
                continue;
            };

            if self.should_flip_hedge(hedge_idx)? {
                let hedge = self.tds.get_hedge(hedge_idx)?;

                // We only need to push 2 new hedges on the stack, as follows
                // Denote the inserted vertex v, the hedge to test ab and the opposing point o, that shares ab with v
                // The flip makes vab and abo become vao and vbo respectively
                // Now the hedges to test are the ones not connected to v in any way, i.e. ao and bo
                let prev = hedge.prev();
                let next = hedge.next();
                hedges_to_verify.push([prev.end_node(), prev.starting_node()]);
                hedges_to_verify.push([next.end_node(), next.starting_node()]);

                let diagonal_idx = self.tds.flip_2_to_2(hedge_idx)?;
                self.last_inserted_triangle = Some(diagonal_idx / 3);
            }
        }
        self.time_flipping += now.elapsed().as_micros();

        Ok(())
    }

    /// Check if a triangle is flat, i.e. exists of three co-linear points.
    pub fn is_tri_flat(&self, tri_idx: TriIteratorIdx) -> Result<bool> {
        let tri = self.get_tri_type(tri_idx)?;

        let is_flat = match tri {
            TriangleExtended::Triangle([a, b, c]) => orient_2d(&a, &b, &c) == 0.0,
            TriangleExtended::ConceptualTriangle(_) => false, // the conceptual triangle can't be flat
        };

        Ok(is_flat)
    }

    /// Check for a vertex, if it lies inside the circumcircle of a triangle.
    ///
    /// The circumcircle of a conceptual triangle is the open half-plane on the outer side of its casual edge.
    pub fn is_v_in_circle(&self, v_idx: VertexIdx, tri_idx: TriIteratorIdx) -> Result<bool> {
        let p = &self.vertices[v_idx];

        // the casual case passes references into the vertex list, the symbolic perturbation
        // of the in-circle test depends on the addresses of the points
        let in_circle = match self.tds.get_tri(tri_idx)?.nodes().map(|node| node.idx()) {
            [Some(a), Some(b), Some(c)] => in_circle(
                &self.vertices[a],
                &self.vertices[b],
                &self.vertices[c],
                p,
            ),
            _ => match self.get_tri_type(tri_idx)? {
                TriangleExtended::ConceptualTriangle([a, b]) => orient_2d(&a, &b, p),
                TriangleExtended::Triangle(_) => {
                    return Err(anyhow::Error::msg("Expected a conceptual triangle!"))
                }
            },
        };

        Ok(in_circle > 0.0)
    }

    /// Decide whether the hedge has to be flipped to restore the Delaunay property during insertion.
    ///
    /// For the hedge `b -> d`, `a` is the apex of its triangle and `c` the apex of its twin's triangle.
    pub fn should_flip_hedge(&self, hedge_idx: HedgeIteratorIdx) -> Result<bool> {
        let hedge = self.tds.get_hedge(hedge_idx)?;

        let Some(hedge_twin) = hedge.twin() else {
            return Ok(false);
        };

        let tri_idx_abd = hedge.tri().idx;
        let node_a = hedge.prev().starting_node();
        let node_b = hedge.starting_node();

        let tri_idx_bcd = hedge_twin.tri().idx;
        let node_c = hedge_twin.prev().starting_node();
        let node_d = hedge_twin.starting_node();

        match (node_a, node_b, node_c, node_d) {
            (
                VertexNode::Casual(idx_node_a),
                VertexNode::Casual(_), // from the hedge
                VertexNode::Casual(idx_node_c),
                VertexNode::Casual(_), // from the hedge
            ) => Ok(self.is_v_in_circle(idx_node_c, tri_idx_abd)?
                || self.is_v_in_circle(idx_node_a, tri_idx_bcd)?),
            (
                VertexNode::Conceptual,
                VertexNode::Casual(_),
                VertexNode::Casual(_),
                VertexNode::Casual(_),
            ) => Ok(false),
            (
                VertexNode::Casual(idx_node_a),
                VertexNode::Conceptual,
                VertexNode::Casual(idx_node_c),
                VertexNode::Casual(idx_node_d),
            ) => Ok(is_convex(
                self.vertices[idx_node_c],
                self.vertices[idx_node_d],
                self.vertices[idx_node_a],
            )),
            (
                VertexNode::Casual(idx_node_a),
                VertexNode::Casual(_),
                VertexNode::Conceptual,
                VertexNode::Casual(_),
            ) => Ok(self.is_v_in_circle(idx_node_a, tri_idx_bcd)?
                || self.is_tri_flat(tri_idx_abd)?),
            (
                VertexNode::Casual(idx_node_a),
                VertexNode::Casual(idx_node_b),
                VertexNode::Casual(idx_node_c),
                VertexNode::Conceptual,
            ) => Ok(is_convex(
                self.vertices[idx_node_a],
                self.vertices[idx_node_b],
                self.vertices[idx_node_c],
            )),
            (_, _, _, _) => Err(anyhow::Error::msg(
                "Unexpected node configuration to decide flip for!",
            )),
        }
    }

    /// Locate the triangle that contains a point by using the visibility walk.
    pub fn locate_vis_walk(
        &self,
        v_idx: VertexIdx,
        tri_idx_start: TriIteratorIdx,
    ) -> Result<TriIteratorIdx> {
        let v = self.vertices[v_idx];

        let mut tri_idx = tri_idx_start; // variable to store the current triangle index

        // start with all hedges of the starting triangle
        let mut v_hedges = self.tds.get_tri(tri_idx)?.hedges().to_vec();

        let mut side = true;

        // choose one of the two (three) hedges of the triangle
        while let Some(hedge) = self.choose_hedge(&v_hedges, &v) {
            let Some(hedge_twin) = hedge.twin() else {
                return Err(anyhow::Error::msg(format!(
                    "Walk towards {} left the triangulation at {hedge}",
                    DisplayWrapper(v)
                )));
            };
            tri_idx = hedge_twin.tri().idx; // the triangle in question is the one incident to the twin hedge
            v_hedges.clear(); // delete the old hedges, to only look at hedges for the current tri

            // alternate the order, so the walk can not cycle
            if side {
                v_hedges.push(hedge_twin.next());
                v_hedges.push(hedge_twin.prev());
            } else {
                v_hedges.push(hedge_twin.prev());
                v_hedges.push(hedge_twin.next());
            }

            side = !side;
        }

        Ok(tri_idx)
    }

    /// Remove all triangles connected to the vertex at infinity, the hull hedges become boundary hedges.
    fn remove_conceptual_tris(&mut self) -> Result<()> {
        let conceptual_tris: Vec<TriIteratorIdx> = self
            .tds
            .tris()
            .filter(TriIterator::is_conceptual)
            .map(|tri| tri.idx)
            .collect();

        for tri_idx in conceptual_tris {
            self.tds.delete_tri(tri_idx)?;
        }

        self.last_inserted_triangle = None;

        Ok(())
    }

    fn log_time(&self) {
        log::debug!("-------------------------------------------");
        log::debug!("Time elapsed:");
        log::debug!("Inserts computed in {} μs", self.time_inserting);
        log::debug!("Walks computed in {} μs", self.time_walking);
        log::debug!("Flips computed in {} μs", self.time_flipping);
    }

    /// Get the index of the vertex with exactly these coordinates.
    #[must_use]
    pub fn vertex_idx(&self, v: &Vertex2) -> Option<VertexIdx> {
        self.vertex_lookup.get(&vertex_key(v)).copied()
    }

    /// Find the hedge of an edge, in either direction.
    #[must_use]
    pub fn find_edge(&self, [i, j]: VertexEdge) -> Option<HedgeIterator> {
        let [ni, nj] = [VertexNode::Casual(i), VertexNode::Casual(j)];
        self.tds
            .find_hedge(ni, nj)
            .or_else(|| self.tds.find_hedge(nj, ni))
    }

    /// Check if two points are connected by an edge of the triangulation.
    #[must_use]
    pub fn contains_edge(&self, p: &Vertex2, q: &Vertex2) -> bool {
        match (self.vertex_idx(p), self.vertex_idx(q)) {
            (Some(i), Some(j)) => self.find_edge([i, j]).is_some(),
            _ => false,
        }
    }

    /// All edges of the triangulation, each once, as vertex index pairs.
    #[must_use]
    pub fn unique_edges(&self) -> Vec<VertexEdge> {
        self.tds
            .unique_hedges()
            .filter_map(|hedge| hedge_vertex_edge(&hedge))
            .collect()
    }

    /// The coordinates of a casual triangle.
    pub fn tri_vertices(&self, tri_idx: TriIteratorIdx) -> Result<Triangle2> {
        match self.get_tri_type(tri_idx)? {
            TriangleExtended::Triangle(tri) => Ok(tri),
            TriangleExtended::ConceptualTriangle(_) => Err(anyhow::Error::msg(
                "Conceptual triangles have no coordinates!",
            )),
        }
    }

    /// Flip the edge of a hedge, s. [`TriDataStructure::flip_2_to_2`].
    ///
    /// Returns the hedge index of the new diagonal.
    pub fn flip_2_to_2(&mut self, hedge_idx: HedgeIteratorIdx) -> Result<HedgeIteratorIdx> {
        self.tds.flip_2_to_2(hedge_idx)
    }

    /// Remove a triangle, s. [`TriDataStructure::delete_tri`].
    pub fn delete_tri(&mut self, tri_idx: TriIteratorIdx) -> Result<()> {
        self.tds.delete_tri(tri_idx)
    }

    #[must_use]
    pub fn is_sound(&self) -> bool {
        let mut sound = self.tds.is_sound();

        for tri in self.tds.tris() {
            if self.is_tri_flat(tri.idx).unwrap_or(true) {
                error!("Flat triangle: {tri}");
                sound = false;
            }
        }

        if !sound {
            error!("Triangulation is not sound!");
        }
        sound
    }

    /// Checks the Delaunay property in a parallel manner using `rayon`s `par_iter()`.
    ///
    /// Returns the fraction of interior edges that are locally Delaunay.
    #[must_use]
    pub fn is_delaunay_p(&self) -> f64 {
        self.locally_delaunay_fraction_p(&[])
    }

    /// Fraction of interior edges that are locally Delaunay, the edges in `skip` are not counted.
    #[must_use]
    pub fn locally_delaunay_fraction_p(&self, skip: &[VertexEdge]) -> f64 {
        let interior_hedges: Vec<HedgeIteratorIdx> = self
            .tds
            .unique_hedges()
            .filter(|hedge| hedge.twin().is_some())
            .filter(|hedge| {
                hedge_vertex_edge(hedge)
                    .is_some_and(|edge| !skip.iter().any(|s| is_same_vertex_edge(s, &edge)))
            })
            .map(|hedge| hedge.idx)
            .collect();

        if interior_hedges.is_empty() {
            return 1.0;
        }

        let num_violated_edges = interior_hedges
            .par_iter()
            .filter(|&&hedge_idx| !self.is_hedge_locally_delaunay(hedge_idx))
            .count();

        1.0 - num_violated_edges as f64 / interior_hedges.len() as f64
    }

    fn is_hedge_locally_delaunay(&self, hedge_idx: HedgeIteratorIdx) -> bool {
        let hedge = HedgeIterator::new(&self.tds, hedge_idx);
        let Some(twin) = hedge.twin() else {
            return true;
        };

        let nodes = [
            hedge.starting_node(),
            hedge.end_node(),
            hedge.prev().starting_node(),
            twin.prev().starting_node(),
        ];

        match nodes.map(|node| node.idx()) {
            [Some(from), Some(to), Some(apex), Some(opposite_apex)] => !should_flip_edge(
                &self.vertices[from],
                &self.vertices[to],
                &self.vertices[apex],
                &self.vertices[opposite_apex],
            ),
            _ => true,
        }
    }

    /// The number of all `tris` in the triangulation.
    #[must_use]
    pub const fn num_tris(&self) -> usize {
        self.tds.num_tris()
    }

    /// The number of `casual` `tris`, i.e. without the ones that have an connection to the dummy point.
    #[must_use]
    pub fn num_casual_tris(&self) -> usize {
        self.tds.num_casual_tris()
    }

    /// The number of total tris, i.e. `casual`, `conceptual` and `deleted` tris.
    #[must_use]
    pub const fn num_all_tris(&self) -> usize {
        self.tds.num_all_tris()
    }

    /// The number of input vertices that were skipped as duplicates.
    #[must_use]
    pub const fn num_duplicate_vertices(&self) -> usize {
        self.num_duplicate_vertices
    }

    /// Get the triangulation data structure, as reference.
    #[must_use]
    pub const fn tds(&self) -> &TriDataStructure {
        &self.tds
    }

    /// Get the vertices.
    #[must_use]
    pub const fn vertices(&self) -> &Vec<Vertex2> {
        &self.vertices
    }
}

/// The vertex indices of a hedge, if both of its nodes are casual.
pub fn hedge_vertex_edge(hedge: &HedgeIterator) -> Option<VertexEdge> {
    match (hedge.starting_node(), hedge.end_node()) {
        (VertexNode::Casual(i), VertexNode::Casual(j)) => Some([i, j]),
        _ => None,
    }
}

/// Check if `v`, collinear with `v0` and `v1`, lies strictly inside the segment `v0v1`.
fn is_strictly_between(v0: &Vertex2, v1: &Vertex2, v: &Vertex2) -> bool {
    let dot = |p: &Vertex2, q: &Vertex2| (v[0] - p[0]) * (q[0] - p[0]) + (v[1] - p[1]) * (q[1] - p[1]);
    dot(v0, v1) > 0.0 && dot(v1, v0) > 0.0
}
