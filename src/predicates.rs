//! Geometric predicates.
//!
//! With feature `geogram` (default): uses [geogram_predicates] (FFI to C++ geogram). The
//! in-circle test is the lifted orientation with symbolic perturbation, so cocircular points are
//! decided consistently instead of returning zero.
//!
//! With feature `robust`: uses the pure-Rust [robust] crate. Cocircular points yield zero, i.e.
//! "not inside".
//!
//! All predicates return the sign of their determinant as `-1.0`, `0.0` or `1.0`.

#![allow(non_snake_case)] // match geogram_predicates API (orient_2dlifted_SOS)

use crate::utils::types::Vertex2;

#[cfg(not(any(feature = "geogram", feature = "robust")))]
compile_error!(
    "One of the features 'geogram' or 'robust' must be enabled. Use default (geogram) or --no-default-features --features robust."
);

#[cfg(feature = "geogram")]
mod imp {
    use super::*;
    use geogram_predicates as gp;

    #[inline]
    fn sign_i16(r: i16) -> f64 {
        match r {
            r if r > 0 => 1.0,
            r if r < 0 => -1.0,
            _ => 0.0,
        }
    }

    #[inline]
    pub fn orient_2d(a: &Vertex2, b: &Vertex2, c: &Vertex2) -> f64 {
        sign_i16(gp::orient_2d(a, b, c))
    }

    /// In-circle test as the orientation of the points lifted onto the paraboloid `z = x² + y²`.
    #[inline]
    pub fn in_circle(a: &Vertex2, b: &Vertex2, c: &Vertex2, p: &Vertex2) -> f64 {
        let lift = |v: &Vertex2| v[0].powi(2) + v[1].powi(2);

        sign_i16(gp::orient_2dlifted_SOS(
            a,
            b,
            c,
            p,
            lift(a),
            lift(b),
            lift(c),
            lift(p),
        ))
    }
}

#[cfg(all(feature = "robust", not(feature = "geogram")))]
mod imp {
    use super::*;
    use robust::{incircle, orient2d, Coord};

    #[inline]
    fn coord2(p: &Vertex2) -> Coord<f64> {
        Coord { x: p[0], y: p[1] }
    }

    #[inline]
    fn sign_f64(x: f64) -> f64 {
        if x > 0.0 {
            1.0
        } else if x < 0.0 {
            -1.0
        } else {
            0.0
        }
    }

    #[inline]
    pub fn orient_2d(a: &Vertex2, b: &Vertex2, c: &Vertex2) -> f64 {
        sign_f64(orient2d(coord2(a), coord2(b), coord2(c)))
    }

    #[inline]
    pub fn in_circle(a: &Vertex2, b: &Vertex2, c: &Vertex2, p: &Vertex2) -> f64 {
        sign_f64(incircle(coord2(a), coord2(b), coord2(c), coord2(p)))
    }
}

/// Orientation of `c` relative to the directed line `a -> b`: positive if `c` is to the left
/// (i.e. `abc` is counter-clockwise), negative if to the right, zero if collinear.
pub use imp::orient_2d;

/// Sign of `p` relative to the circumcircle of the counter-clockwise triangle `abc`: positive if
/// `p` lies inside.
pub use imp::in_circle;

/// Check if the segments `p1p2` and `q1q2` intersect.
///
/// With `include_endpoints == false` only proper crossings count: touching at an endpoint, an
/// endpoint lying on the other segment and collinear overlap are not intersections.
pub fn segments_intersect(
    p1: &Vertex2,
    p2: &Vertex2,
    q1: &Vertex2,
    q2: &Vertex2,
    include_endpoints: bool,
) -> bool {
    let o1 = orient_2d(p1, p2, q1);
    let o2 = orient_2d(p1, p2, q2);
    let o3 = orient_2d(q1, q2, p1);
    let o4 = orient_2d(q1, q2, p2);

    if !include_endpoints {
        return o1 * o2 < 0.0 && o3 * o4 < 0.0;
    }

    if o1 * o2 > 0.0 || o3 * o4 > 0.0 {
        return false;
    }

    if o1 == 0.0 && o2 == 0.0 {
        // collinear, the segments intersect iff their extents overlap on both axes
        let overlaps = |axis: usize| {
            p1[axis].min(p2[axis]) <= q1[axis].max(q2[axis])
                && q1[axis].min(q2[axis]) <= p1[axis].max(p2[axis])
        };
        return overlaps(0) && overlaps(1);
    }

    true
}

/// Check if the quadrilateral `abcd` (vertices in cyclic order) is strictly convex, i.e. its
/// diagonals `ac` and `bd` cross in their interiors.
pub fn is_quad_convex(a: &Vertex2, b: &Vertex2, c: &Vertex2, d: &Vertex2) -> bool {
    segments_intersect(a, c, b, d, false)
}

/// Check if the edge `from -> to` violates the Delaunay criterion.
///
/// `apex` is the third vertex of the counter-clockwise triangle `(from, to, apex)`, `opposite_apex`
/// the third vertex of the triangle on the other side of the edge.
pub fn should_flip_edge(
    from: &Vertex2,
    to: &Vertex2,
    apex: &Vertex2,
    opposite_apex: &Vertex2,
) -> bool {
    in_circle(from, to, apex, opposite_apex) > 0.0 || in_circle(to, from, opposite_apex, apex) > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation() {
        assert_eq!(orient_2d(&[0.0, 0.0], &[1.0, 0.0], &[0.0, 1.0]), 1.0);
        assert_eq!(orient_2d(&[0.0, 0.0], &[0.0, 1.0], &[1.0, 0.0]), -1.0);
        assert_eq!(orient_2d(&[0.0, 0.0], &[1.0, 1.0], &[2.0, 2.0]), 0.0);
    }

    #[test]
    fn test_in_circle() {
        let [a, b, c] = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]];

        assert!(in_circle(&a, &b, &c, &[0.4, 0.4]) > 0.0);
        assert!(in_circle(&a, &b, &c, &[2.0, 2.0]) < 0.0);
    }

    #[test]
    fn test_proper_crossing() {
        let p = [[0.0, 0.0], [1.0, 1.0]];
        let q = [[0.0, 1.0], [1.0, 0.0]];

        assert!(segments_intersect(&p[0], &p[1], &q[0], &q[1], false));
        assert!(segments_intersect(&p[0], &p[1], &q[0], &q[1], true));
    }

    #[test]
    fn test_shared_endpoint_is_no_crossing() {
        let a = [0.0, 0.0];
        let b = [1.0, 0.0];
        let c = [2.0, 0.0];
        let d = [1.0, 1.0];

        // collinear, sharing b
        assert!(!segments_intersect(&a, &b, &b, &c, false));
        assert!(segments_intersect(&a, &b, &b, &c, true));
        // sharing b at an angle
        assert!(!segments_intersect(&a, &b, &b, &d, false));
        assert!(segments_intersect(&a, &b, &b, &d, true));
    }

    #[test]
    fn test_touching_and_disjoint() {
        let a = [0.0, 0.0];
        let b = [2.0, 0.0];

        // endpoint of the second segment lies on the first one
        assert!(!segments_intersect(&a, &b, &[1.0, 0.0], &[1.0, 1.0], false));
        assert!(segments_intersect(&a, &b, &[1.0, 0.0], &[1.0, 1.0], true));

        // collinear but apart
        assert!(!segments_intersect(&a, &b, &[3.0, 0.0], &[4.0, 0.0], true));
        // parallel
        assert!(!segments_intersect(&a, &b, &[0.0, 1.0], &[2.0, 1.0], true));
    }

    #[test]
    fn test_quad_convexity() {
        let square = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        assert!(is_quad_convex(&square[0], &square[1], &square[2], &square[3]));

        // the dart has a reflex vertex at [0.5, 0.25]
        let dart = [[0.0, 0.0], [1.0, 1.0], [0.5, 0.25], [0.0, 1.0]];
        assert!(!is_quad_convex(&dart[0], &dart[1], &dart[2], &dart[3]));

        // three collinear vertices make the quad degenerate
        let flat = [[0.0, 0.0], [1.0, 0.0], [2.0, 0.0], [1.0, 1.0]];
        assert!(!is_quad_convex(&flat[0], &flat[1], &flat[2], &flat[3]));
    }

    #[test]
    fn test_should_flip_edge() {
        let from = [0.0, 0.0];
        let to = [1.0, 0.0];

        // two flat triangles: each apex is well inside the other's circumcircle
        assert!(should_flip_edge(&from, &to, &[0.5, 0.1], &[0.5, -0.1]));
        // two tall triangles: the edge is Delaunay
        assert!(!should_flip_edge(&from, &to, &[0.5, 2.0], &[0.5, -2.0]));
    }
}
