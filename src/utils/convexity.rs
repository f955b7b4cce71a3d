use std::cmp;

use crate::predicates::orient_2d;

use super::types::Vertex2;

/// Checks if ang(v1--v0, v1--v2) is convex.
///
/// A flat angle counts as convex only if `v0` and `v2` lie on the same side of `v1`, i.e. the
/// angle is zero and not a straight angle.
pub fn is_convex(v0: Vertex2, v1: Vertex2, v2: Vertex2) -> bool {
    let sign = orient_2d(&v0, &v1, &v2);

    match sign.partial_cmp(&0.0) {
        Some(cmp::Ordering::Greater) => true,
        Some(cmp::Ordering::Equal) => {
            let v1_v0 = [v1[0] - v0[0], v1[1] - v0[1]];
            let v1_v2 = [v1[0] - v2[0], v1[1] - v2[1]];
            let dot_prod = v1_v0[0] * v1_v2[0] + v1_v0[1] * v1_v2[1];

            dot_prod > 0.
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convex_angles() {
        assert!(!is_convex([1.0, 0.0], [0.0, 0.0], [0.0, 1.0]));
        assert!(is_convex([0.0, 1.0], [0.0, 0.0], [1.0, 0.0]));
    }

    #[test]
    fn test_flat_angles() {
        // straight angle, v1 between v0 and v2
        assert!(!is_convex([0.0, 0.0], [1.0, 0.0], [2.0, 0.0]));
        // zero angle, v0 and v2 on the same side of v1
        assert!(is_convex([1.0, 0.0], [0.0, 0.0], [2.0, 0.0]));
        assert!(is_convex([0.0, 0.0], [2.0, 0.0], [1.0, 0.0]));
    }
}
