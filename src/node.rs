use crate::utils::types::VertexIdx;
use core::fmt;

/// A half-edge vertex node.
///
/// A `casual node` has an index into the vertex list of the triangulation.
///
/// A `conceptual node` is the vertex at infinity. It only exists while the Delaunay
/// triangulation is built: every hull edge is closed by a conceptual triangle, so every
/// half-edge has a twin during insertion.
///
/// A `deleted node` marks the half-edges of a removed triangle.
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum VertexNode {
    Casual(VertexIdx),
    Conceptual,
    Deleted,
}

impl VertexNode {
    /// Get the index of the node.
    pub const fn idx(&self) -> Option<VertexIdx> {
        match self {
            VertexNode::Casual(idx) => Some(*idx),
            _ => None,
        }
    }

    /// Check if the node is conceptual.
    pub const fn is_conceptual(&self) -> bool {
        matches!(self, VertexNode::Conceptual)
    }

    /// Check if the node is deleted.
    pub const fn is_deleted(&self) -> bool {
        matches!(self, VertexNode::Deleted)
    }
}

impl fmt::Display for VertexNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VertexNode::Casual(v_idx) => write!(f, "Casual({v_idx})"),
            VertexNode::Conceptual => write!(f, "Conceptual"),
            VertexNode::Deleted => write!(f, "Deleted"),
        }
    }
}
