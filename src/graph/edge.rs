use serde::{Deserialize, Serialize};

use super::vertex::VertexId;

slotmap::new_key_type! {
    /// Unique identifier for an edge in the contour graph.
    pub struct EdgeId;
}

/// Provenance of a directed graph edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Segment of an extracted contour.
    Contour,
    /// Run along the grid rectangle closing open contours.
    Boundary,
    /// Bridge leg from the splice point of the surviving traversal.
    BridgeForward,
    /// Bridge leg walking back to the first splice point.
    BridgeReturn,
    /// Successor link created by an edge swap.
    Link,
}

impl EdgeKind {
    /// True for either leg of a bridge pair.
    #[must_use]
    pub fn is_bridge(self) -> bool {
        matches!(self, EdgeKind::BridgeForward | EdgeKind::BridgeReturn)
    }
}

/// Data associated with a directed graph edge.
///
/// Edges form closed successor chains: `next` is the edge the traversal takes
/// after this one.
#[derive(Debug, Clone)]
pub struct EdgeData {
    /// Start vertex of the edge.
    pub from: VertexId,
    /// End vertex of the edge.
    pub to: VertexId,
    pub kind: EdgeKind,
    /// Successor in the traversal.
    pub next: EdgeId,
    /// Stable integer index, assigned in insertion order.
    pub index: usize,
}
