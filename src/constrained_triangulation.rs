use anyhow::{Ok as HowOk, Result as HowResult};

use crate::{
    config::CdtConfig,
    constraints::{
        constraint_segments,
        insertion::{insert_segment, segment_display},
        intersection::{BruteForceFinder, CrossingEdgeFinder},
        region::fill_interior_region,
        restoration::restore_delaunay,
        CdtReport, RegionOutcome, SegmentReport,
    },
    triangulation::Triangulation,
    utils::{
        helper::{is_same_vertex_edge, DisplayWrapper},
        types::{Vertex2, VertexEdge, VertexIdx},
    },
};

/// A constrained Delaunay triangulation.
///
/// The Delaunay triangulation of all points is computed first, then the constraints are flipped
/// into it. Closed constraints given in clockwise order can cut out the region they enclose.
///
/// ```
/// use rita_cdt::ConstrainedTriangulation;
///
/// let points = vec![
///     [0.0, 0.0],
///     [4.0, 0.0],
///     [4.0, 4.0],
///     [0.0, 4.0],
///     [2.0, 0.5],
/// ];
/// // a clockwise hole
/// let hole = vec![[1.0, 1.0], [1.0, 3.0], [3.0, 3.0], [3.0, 1.0]];
///
/// let mut cdt = ConstrainedTriangulation::default();
/// let report = cdt.insert_vertices(&points, Some(hole.as_slice()), true).unwrap();
///
/// assert!(report.all_present());
/// assert_eq!(report.region.num_erased(), 2);
/// assert!(cdt.triangulation().contains_edge(&[1.0, 1.0], &[3.0, 1.0]));
/// ```
pub struct ConstrainedTriangulation<F: CrossingEdgeFinder = BruteForceFinder> {
    triangulation: Triangulation,
    config: CdtConfig,
    finder: F,
    /// All constraint segments inserted so far, they are never flipped by the restoration.
    constraint_segments: Vec<VertexEdge>,
}

impl Default for ConstrainedTriangulation {
    fn default() -> Self {
        Self::new(CdtConfig::default())
    }
}

impl ConstrainedTriangulation {
    pub fn new(config: CdtConfig) -> Self {
        Self::with_finder(config, BruteForceFinder)
    }
}

impl<F: CrossingEdgeFinder> ConstrainedTriangulation<F> {
    pub fn with_finder(config: CdtConfig, finder: F) -> Self {
        Self {
            triangulation: Triangulation::new(),
            config,
            finder,
            constraint_segments: Vec::new(),
        }
    }

    /// Triangulate the points together with the vertices of the constraint, then insert the constraint.
    ///
    /// With `erase_interior` the triangles enclosed by the (clockwise) constraint are removed.
    pub fn insert_vertices(
        &mut self,
        points: &[Vertex2],
        constraint: Option<&[Vertex2]>,
        erase_interior: bool,
    ) -> HowResult<CdtReport> {
        let mut vertices = points.to_vec();
        if let Some(constraint) = constraint {
            vertices.extend_from_slice(constraint);
        }

        let now = std::time::Instant::now();
        self.triangulation
            .insert_vertices(&vertices, self.config.spatial_sorting)?;
        log::trace!(
            "Delaunay triangulation computed in {:.4} µs",
            now.elapsed().as_micros()
        );

        match constraint {
            Some(constraint) => self.add_constraint(constraint, erase_interior),
            None => HowOk(CdtReport::empty()),
        }
    }

    /// Insert a constraint into the triangulation.
    ///
    /// All vertices of the constraint must be vertices of the triangulation. The segments of
    /// earlier constraints stay protected.
    pub fn add_constraint(
        &mut self,
        constraint: &[Vertex2],
        erase_interior: bool,
    ) -> HowResult<CdtReport> {
        let constraint = self.constraint_idxs(constraint)?;
        let segments = constraint_segments(&constraint);

        for segment in &segments {
            if !self
                .constraint_segments
                .iter()
                .any(|s| is_same_vertex_edge(s, segment))
            {
                self.constraint_segments.push(*segment);
            }
        }

        let now = std::time::Instant::now();
        let mut segment_reports = Vec::with_capacity(segments.len());
        for segment in segments {
            segment_reports.push(self.insert_constraint_segment(segment)?);
        }

        let report = CdtReport {
            region: self.erase_region(&constraint, erase_interior)?,
            segments: segment_reports,
        };

        log::debug!(
            "Constraint with {} segments inserted in {} µs: {} flips, {} triangles erased",
            report.segments.len(),
            now.elapsed().as_micros(),
            report.total_flips(),
            report.region.num_erased()
        );

        HowOk(report)
    }

    /// Map the constraint to vertex indices, dropping repeated consecutive vertices.
    fn constraint_idxs(&self, constraint: &[Vertex2]) -> HowResult<Vec<VertexIdx>> {
        let mut idxs: Vec<VertexIdx> = Vec::with_capacity(constraint.len());

        for v in constraint {
            let Some(v_idx) = self.triangulation.vertex_idx(v) else {
                return Err(anyhow::Error::msg(format!(
                    "Constraint vertex {} is not a vertex of the triangulation!",
                    DisplayWrapper(*v)
                )));
            };

            if idxs.last() != Some(&v_idx) {
                idxs.push(v_idx);
            }
        }

        while idxs.len() > 1 && idxs.first() == idxs.last() {
            idxs.pop();
        }

        if idxs.len() < constraint.len() {
            log::debug!(
                "Dropped {} repeated constraint vertices",
                constraint.len() - idxs.len()
            );
        }

        HowOk(idxs)
    }

    fn insert_constraint_segment(&mut self, segment: VertexEdge) -> HowResult<SegmentReport> {
        if self.triangulation.find_edge(segment).is_some() {
            return HowOk(SegmentReport::already_present(segment));
        }

        let crossing_edges = self.finder.crossing_edges(&self.triangulation, segment);
        let crossings = crossing_edges.len();

        let mut insertion = insert_segment(
            &mut self.triangulation,
            segment,
            crossing_edges,
            &self.constraint_segments,
            self.config.max_flip_iterations,
        )?;

        let restoration = restore_delaunay(
            &mut self.triangulation,
            &mut insertion.new_edges,
            &self.constraint_segments,
            self.config.max_restore_flips,
        )?;

        let present = self.triangulation.find_edge(segment).is_some();
        if !present {
            log::warn!(
                "Segment {} could not be inserted",
                segment_display(&self.triangulation, segment)
            );
        }

        log::trace!(
            "Segment {}: {crossings} crossings, insertion {}, restoration {}",
            segment_display(&self.triangulation, segment),
            insertion.convergence,
            restoration
        );

        HowOk(SegmentReport {
            segment,
            already_present: false,
            crossings,
            insertion: insertion.convergence,
            restoration,
            present,
        })
    }

    fn erase_region(
        &mut self,
        constraint: &[VertexIdx],
        erase_interior: bool,
    ) -> HowResult<RegionOutcome> {
        if !erase_interior {
            return HowOk(RegionOutcome::Skipped);
        }

        let outcome =
            fill_interior_region(&self.triangulation, constraint, self.config.max_fill_iterations);

        if let RegionOutcome::Erased { triangles, .. } = &outcome {
            for &tri_idx in triangles {
                self.triangulation.delete_tri(tri_idx)?;
            }
        }

        HowOk(outcome)
    }

    /// Fraction of interior edges, apart from the constraint segments, that are locally Delaunay.
    #[must_use]
    pub fn is_constrained_delaunay_p(&self) -> f64 {
        self.triangulation
            .locally_delaunay_fraction_p(&self.constraint_segments)
    }

    /// Get the triangulation.
    #[must_use]
    pub const fn triangulation(&self) -> &Triangulation {
        &self.triangulation
    }

    /// Take the triangulation out.
    #[must_use]
    pub fn into_triangulation(self) -> Triangulation {
        self.triangulation
    }

    /// All constraint segments inserted so far.
    #[must_use]
    pub fn constraint_segments(&self) -> &[VertexEdge] {
        &self.constraint_segments
    }

    #[must_use]
    pub const fn config(&self) -> &CdtConfig {
        &self.config
    }
}
