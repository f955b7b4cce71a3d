use super::types::{Edge2, Vertex2, VertexEdge};

/// Formats a vertex with two decimals, used in log messages.
pub struct DisplayWrapper(pub Vertex2);

impl std::fmt::Display for DisplayWrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "[{:.2}, {:.2}]", self.0[0], self.0[1])
    }
}

/// Formats an edge as `[x0, y0] -> [x1, y1]`.
pub struct EdgeDisplay(pub Edge2);

impl std::fmt::Display for EdgeDisplay {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} -> {}", DisplayWrapper(self.0[0]), DisplayWrapper(self.0[1]))
    }
}

/// Check if two index edges connect the same two vertices, regardless of direction.
pub fn is_same_vertex_edge(e0: &VertexEdge, e1: &VertexEdge) -> bool {
    (e0[0] == e1[0] && e0[1] == e1[1]) || (e0[0] == e1[1] && e0[1] == e1[0])
}

/// The centroid of a triangle.
pub fn centroid(tri: &[Vertex2; 3]) -> Vertex2 {
    [
        (tri[0][0] + tri[1][0] + tri[2][0]) / 3.0,
        (tri[0][1] + tri[1][1] + tri[2][1]) / 3.0,
    ]
}

/// Twice the signed area of a polygon, negative for clockwise vertex order.
pub fn signed_area_doubled(polygon: &[Vertex2]) -> f64 {
    let n = polygon.len();
    (0..n)
        .map(|i| {
            let p = polygon[i];
            let q = polygon[(i + 1) % n];
            p[0] * q[1] - q[0] * p[1]
        })
        .sum()
}
