// Type aliases for data values.
//
// Points are compared by exact coordinate equality (`==` on both components), there is no
// epsilon. Two vertices with identical coordinates are the same vertex.
pub type Vertex2 = [f64; 2];
pub type Edge2 = [Vertex2; 2];
pub type Triangle2 = [Vertex2; 3];

// Type aliases for data indices.
pub type VertexIdx = usize;

/// An edge given by the indices of its two vertices.
pub type VertexEdge = [VertexIdx; 2];

// Type aliases for data structure indices.
// This is to know, when a function accepts or returns a usize, what it is for.
pub type HedgeIteratorIdx = usize;
pub type TriIteratorIdx = usize;
