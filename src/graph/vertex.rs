use crate::math::Point2;

use super::edge::EdgeId;

slotmap::new_key_type! {
    /// Unique identifier for a vertex in the contour graph.
    pub struct VertexId;
}

/// Data associated with a graph vertex.
#[derive(Debug, Clone)]
pub struct VertexData {
    /// The 2D position of the vertex.
    pub point: Point2,
    /// Stable integer index, assigned in insertion order.
    pub index: usize,
    /// Component the vertex was created in (before stitching).
    pub component: usize,
    /// Edges ending at this vertex. One per pass of the traversal through it.
    pub incoming: Vec<EdgeId>,
}

impl VertexData {
    /// Creates a new vertex at the given point.
    #[must_use]
    pub fn new(point: Point2, index: usize, component: usize) -> Self {
        Self {
            point,
            index,
            component,
            incoming: Vec::with_capacity(1),
        }
    }
}
