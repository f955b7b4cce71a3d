use super::types::{Vertex2, VertexIdx};

// Quadrants of a cell, split at its center.
const LOWER_LEFT: usize = 0;
const UPPER_LEFT: usize = 1;
const UPPER_RIGHT: usize = 2;
const LOWER_RIGHT: usize = 3;

/// For each of the 8 curve states: the sub-cells in the order they are pushed on the work stack,
/// as `(state of the sub-cell, quadrant)`.
const HILBERT_2D: [[(usize, usize); 4]; 8] = [
    [(3, LOWER_LEFT), (0, UPPER_LEFT), (0, UPPER_RIGHT), (7, LOWER_RIGHT)],
    [(6, LOWER_RIGHT), (1, UPPER_RIGHT), (1, UPPER_LEFT), (2, LOWER_LEFT)],
    [(5, UPPER_LEFT), (2, UPPER_RIGHT), (2, LOWER_RIGHT), (1, LOWER_LEFT)],
    [(0, LOWER_LEFT), (3, LOWER_RIGHT), (3, UPPER_RIGHT), (4, UPPER_LEFT)],
    [(7, UPPER_RIGHT), (4, LOWER_RIGHT), (4, LOWER_LEFT), (3, UPPER_LEFT)],
    [(2, UPPER_LEFT), (5, LOWER_LEFT), (5, LOWER_RIGHT), (6, UPPER_RIGHT)],
    [(1, LOWER_RIGHT), (6, LOWER_LEFT), (6, UPPER_LEFT), (5, UPPER_RIGHT)],
    [(4, UPPER_RIGHT), (7, UPPER_LEFT), (7, LOWER_LEFT), (0, LOWER_RIGHT)],
];

/// Sorts vertex indices along a 2D Hilbert curve.
///
/// Consecutive indices of the result are spatially close, which keeps the visibility walk of the
/// incremental insertion short.
pub fn sort_along_hilbert_curve_2d(
    vertices: &[Vertex2],
    indices_to_add: &[VertexIdx],
) -> Vec<VertexIdx> {
    let mut curve_order = Vec::with_capacity(indices_to_add.len());

    let Some((v_min, v_max)) = bounding_box(vertices, indices_to_add) else {
        return curve_order;
    };

    let mut to_subdiv = vec![(0, v_min, v_max, indices_to_add.to_vec())];

    while let Some((state, pt_min, pt_max, indices)) = to_subdiv.pop() {
        if indices.len() == 1 {
            curve_order.push(indices[0]);
            continue;
        }
        if indices.is_empty() {
            continue;
        }

        let sep = [(pt_min[0] + pt_max[0]) / 2.0, (pt_min[1] + pt_max[1]) / 2.0];

        let mut quadrants: [Vec<VertexIdx>; 4] = Default::default();
        for idx in indices {
            let [x, y] = vertices[idx];
            let quadrant = match (x < sep[0], y < sep[1]) {
                (true, true) => LOWER_LEFT,
                (true, false) => UPPER_LEFT,
                (false, false) => UPPER_RIGHT,
                (false, true) => LOWER_RIGHT,
            };
            quadrants[quadrant].push(idx);
        }

        for (sub_state, quadrant) in HILBERT_2D[state] {
            let (sub_min, sub_max) = match quadrant {
                LOWER_LEFT => (pt_min, sep),
                UPPER_LEFT => ([pt_min[0], sep[1]], [sep[0], pt_max[1]]),
                UPPER_RIGHT => (sep, pt_max),
                _ => ([sep[0], pt_min[1]], [pt_max[0], sep[1]]),
            };
            let sub_indices = std::mem::take(&mut quadrants[quadrant]);
            to_subdiv.push((sub_state, sub_min, sub_max, sub_indices));
        }
    }

    curve_order
}

// Finds the minimum and maximum x and y values of the vertices
fn bounding_box(vertices: &[Vertex2], indices: &[VertexIdx]) -> Option<(Vertex2, Vertex2)> {
    let first = vertices[*indices.first()?];

    Some(indices.iter().fold((first, first), |(lo, hi), &idx| {
        let [x, y] = vertices[idx];
        ([lo[0].min(x), lo[1].min(y)], [hi[0].max(x), hi[1].max(y)])
    }))
}
