//! Caller-owned spatial index over the vertices of a contour graph.

use slotmap::SecondaryMap;
use spade::handles::FixedVertexHandle;
use spade::{DelaunayTriangulation, InsertionError, Point2 as SpadePoint2, Triangulation};

use crate::error::StitchError;
use crate::graph::{ContourGraph, VertexId};

/// Coordinates below this magnitude are snapped to zero before insertion.
const SNAP_TO_ZERO: f64 = 1e-30;

/// Delaunay triangulation of all graph vertices.
///
/// The closest vertex pair between any two vertex sets is an edge of the
/// Delaunay triangulation, so its edges are a complete candidate list for
/// nearest-pair bridging. Vertices sharing a position share one
/// triangulation vertex and are kept together as its members.
pub struct BridgeIndex {
    triangulation: DelaunayTriangulation<SpadePoint2<f64>>,
    members: Vec<Vec<VertexId>>,
    handles: SecondaryMap<VertexId, FixedVertexHandle>,
}

impl BridgeIndex {
    /// Indexes every vertex of `graph`.
    ///
    /// The index stays valid while stitching, which only adds edges between
    /// existing vertices.
    ///
    /// # Errors
    ///
    /// Returns [`StitchError::Index`] if a vertex position cannot be inserted
    /// into the triangulation.
    pub fn build(graph: &ContourGraph) -> Result<Self, StitchError> {
        let mut triangulation = DelaunayTriangulation::<SpadePoint2<f64>>::new();
        let mut members: Vec<Vec<VertexId>> = Vec::new();
        let mut handles = SecondaryMap::with_capacity(graph.vertex_count());

        for (id, vertex) in graph.vertices() {
            let point = SpadePoint2::new(snap(vertex.point.x), snap(vertex.point.y));
            let handle = triangulation
                .insert(point)
                .map_err(|e: InsertionError| StitchError::Index(format!("insert: {e}")))?;
            if handle.index() < members.len() {
                members[handle.index()].push(id);
            } else {
                members.push(vec![id]);
            }
            handles.insert(id, handle);
        }

        Ok(Self {
            triangulation,
            members,
            handles,
        })
    }

    /// Number of indexed graph vertices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Vertex pairs joined by a triangulation edge, plus pairs of coincident
    /// vertices.
    #[must_use]
    pub fn candidate_pairs(&self) -> Vec<(VertexId, VertexId)> {
        let mut pairs = Vec::with_capacity(self.triangulation.num_undirected_edges());
        for edge in self.triangulation.undirected_edges() {
            let [a, b] = edge.vertices();
            for &u in self.members_of(a.fix()) {
                for &v in self.members_of(b.fix()) {
                    pairs.push((u, v));
                }
            }
        }
        for group in &self.members {
            for (i, &u) in group.iter().enumerate() {
                for &v in &group[i + 1..] {
                    pairs.push((u, v));
                }
            }
        }
        pairs
    }

    /// Graph vertices adjacent to `vertex` in the triangulation, including
    /// vertices at the same position.
    #[must_use]
    pub fn neighbors(&self, vertex: VertexId) -> Vec<VertexId> {
        let Some(&handle) = self.handles.get(vertex) else {
            return Vec::new();
        };
        let mut out: Vec<VertexId> = self
            .members_of(handle)
            .iter()
            .copied()
            .filter(|&v| v != vertex)
            .collect();
        for edge in self.triangulation.vertex(handle).out_edges() {
            out.extend_from_slice(self.members_of(edge.to().fix()));
        }
        out
    }

    fn members_of(&self, handle: FixedVertexHandle) -> &[VertexId] {
        self.members
            .get(handle.index())
            .map_or(&[][..], Vec::as_slice)
    }
}

fn snap(v: f64) -> f64 {
    if v.abs() < SNAP_TO_ZERO {
        0.0
    } else {
        v
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::graph::EdgeKind;
    use crate::math::Point2;

    fn square(x0: f64, size: f64) -> Vec<Point2> {
        vec![
            Point2::new(x0, 0.0),
            Point2::new(x0 + size, 0.0),
            Point2::new(x0 + size, size),
            Point2::new(x0, size),
        ]
    }

    #[test]
    fn indexes_every_vertex() {
        let mut graph = ContourGraph::new();
        graph
            .add_loop(&square(0.0, 1.0), &[EdgeKind::Contour; 4], vec![0])
            .unwrap();
        graph
            .add_loop(&square(3.0, 1.0), &[EdgeKind::Contour; 4], vec![1])
            .unwrap();
        let index = BridgeIndex::build(&graph).unwrap();
        assert_eq!(index.len(), 8);

        let pairs = index.candidate_pairs();
        let crosses = pairs.iter().any(|&(u, v)| {
            graph.vertex(u).unwrap().component != graph.vertex(v).unwrap().component
        });
        assert!(crosses);
    }

    #[test]
    fn coincident_vertices_are_paired() {
        let mut graph = ContourGraph::new();
        graph
            .add_loop(&square(0.0, 1.0), &[EdgeKind::Contour; 4], vec![0])
            .unwrap();
        // Shares the corner (1, 0) with the first square.
        graph
            .add_loop(&square(1.0, 1.0), &[EdgeKind::Contour; 4], vec![1])
            .unwrap();
        let index = BridgeIndex::build(&graph).unwrap();
        assert_eq!(index.len(), 8);

        let shared: Vec<VertexId> = graph
            .vertices()
            .filter(|(_, v)| (v.point - Point2::new(1.0, 0.0)).norm() < 1e-12)
            .map(|(id, _)| id)
            .collect();
        assert_eq!(shared.len(), 2);
        assert!(index.neighbors(shared[0]).contains(&shared[1]));
        assert!(index
            .candidate_pairs()
            .iter()
            .any(|&p| p == (shared[0], shared[1]) || p == (shared[1], shared[0])));
    }

    #[test]
    fn empty_graph_gives_empty_index() {
        let index = BridgeIndex::build(&ContourGraph::new()).unwrap();
        assert!(index.is_empty());
        assert!(index.candidate_pairs().is_empty());
    }
}
