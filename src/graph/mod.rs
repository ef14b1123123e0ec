mod boundary;
mod build;
pub mod edge;
pub mod vertex;

pub use build::BuildContourGraph;
pub use edge::{EdgeData, EdgeId, EdgeKind};
pub use vertex::{VertexData, VertexId};

use slotmap::SlotMap;

use crate::error::StitchError;
use crate::math::intersect_2d::segments_cross_properly;
use crate::math::Point2;

/// One closed loop of the graph as built, before any stitching.
#[derive(Debug, Clone)]
pub struct ComponentData {
    /// First edge of the loop.
    pub start: EdgeId,
    /// Number of edges in the loop.
    pub edge_count: usize,
    /// Indices of the contours this loop was built from.
    pub contours: Vec<usize>,
}

/// Central arena that owns the vertices and edges of the contour graph.
///
/// Entities reference each other via typed IDs (generational indices), so the
/// cyclic successor structure needs no self-referential ownership.
#[derive(Debug, Default)]
pub struct ContourGraph {
    vertices: SlotMap<VertexId, VertexData>,
    edges: SlotMap<EdgeId, EdgeData>,
    components: Vec<ComponentData>,
    next_edge_index: usize,
}

impl ContourGraph {
    /// Creates a new, empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Vertex operations ---

    /// Inserts a vertex belonging to `component` and returns its ID.
    pub fn add_vertex(&mut self, point: Point2, component: usize) -> VertexId {
        let index = self.vertices.len();
        self.vertices
            .insert(VertexData::new(point, index, component))
    }

    /// Returns a reference to the vertex data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the graph.
    pub fn vertex(&self, id: VertexId) -> Result<&VertexData, StitchError> {
        self.vertices
            .get(id)
            .ok_or_else(|| StitchError::MalformedGraph("vertex not found".into()))
    }

    /// Iterates over all vertices in insertion order.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &VertexData)> {
        self.vertices.iter()
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    // --- Edge operations ---

    /// Inserts a directed edge and registers it as incoming at `to`.
    ///
    /// The successor is left unset; callers link it with [`ContourGraph::set_next`].
    ///
    /// # Errors
    ///
    /// Returns an error if `to` is not in the graph.
    pub fn add_edge(
        &mut self,
        from: VertexId,
        to: VertexId,
        kind: EdgeKind,
    ) -> Result<EdgeId, StitchError> {
        if !self.vertices.contains_key(from) {
            return Err(StitchError::MalformedGraph("edge start not found".into()));
        }
        let index = self.next_edge_index;
        self.next_edge_index += 1;
        let id = self.edges.insert(EdgeData {
            from,
            to,
            kind,
            next: EdgeId::default(),
            index,
        });
        match self.vertices.get_mut(to) {
            Some(v) => {
                v.incoming.push(id);
                Ok(id)
            }
            None => {
                self.edges.remove(id);
                Err(StitchError::MalformedGraph("edge end not found".into()))
            }
        }
    }

    /// Returns a reference to the edge data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the graph.
    pub fn edge(&self, id: EdgeId) -> Result<&EdgeData, StitchError> {
        self.edges
            .get(id)
            .ok_or_else(|| StitchError::MalformedGraph("edge not found".into()))
    }

    /// Sets the traversal successor of `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if either edge is not in the graph.
    pub fn set_next(&mut self, id: EdgeId, next: EdgeId) -> Result<(), StitchError> {
        if !self.edges.contains_key(next) {
            return Err(StitchError::MalformedGraph("successor edge not found".into()));
        }
        let edge = self
            .edges
            .get_mut(id)
            .ok_or_else(|| StitchError::MalformedGraph("edge not found".into()))?;
        edge.next = next;
        Ok(())
    }

    /// Removes an edge and unregisters it from its end vertex.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge is not in the graph.
    pub fn remove_edge(&mut self, id: EdgeId) -> Result<EdgeData, StitchError> {
        let data = self
            .edges
            .remove(id)
            .ok_or_else(|| StitchError::MalformedGraph("edge not found".into()))?;
        if let Some(v) = self.vertices.get_mut(data.to) {
            v.incoming.retain(|&e| e != id);
        }
        Ok(data)
    }

    /// Iterates over all edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &EdgeData)> {
        self.edges.iter()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of edges of the given kind.
    #[must_use]
    pub fn count_kind(&self, kind: EdgeKind) -> usize {
        self.edges.values().filter(|e| e.kind == kind).count()
    }

    /// Start and end points of an edge.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge or its vertices are missing.
    pub fn edge_points(&self, id: EdgeId) -> Result<(Point2, Point2), StitchError> {
        let edge = self.edge(id)?;
        Ok((self.vertex(edge.from)?.point, self.vertex(edge.to)?.point))
    }

    /// True when the segment `a`-`b` properly crosses any edge of the graph.
    #[must_use]
    pub fn segment_crosses_any(&self, a: &Point2, b: &Point2) -> bool {
        self.edges.values().any(|e| {
            match (self.vertices.get(e.from), self.vertices.get(e.to)) {
                (Some(p), Some(q)) => segments_cross_properly(a, b, &p.point, &q.point),
                _ => false,
            }
        })
    }

    // --- Component operations ---

    /// Registers a loop as a component and returns its index.
    pub fn add_component(&mut self, data: ComponentData) -> usize {
        self.components.push(data);
        self.components.len() - 1
    }

    /// Loops as built, before stitching.
    #[must_use]
    pub fn components(&self) -> &[ComponentData] {
        &self.components
    }

    #[must_use]
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Adds a closed loop through `points`, with `kinds[i]` tagging the edge
    /// from `points[i]` to `points[i + 1]` (wrapping), and registers it as a
    /// new component.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than two points are given or the slices
    /// differ in length.
    pub fn add_loop(
        &mut self,
        points: &[Point2],
        kinds: &[EdgeKind],
        contours: Vec<usize>,
    ) -> Result<usize, StitchError> {
        if points.len() < 2 || points.len() != kinds.len() {
            return Err(StitchError::MalformedGraph(format!(
                "loop needs matching points and kinds, got {} and {}",
                points.len(),
                kinds.len()
            )));
        }
        let component = self.components.len();
        let ids: Vec<VertexId> = points
            .iter()
            .map(|&p| self.add_vertex(p, component))
            .collect();
        let n = ids.len();
        let mut edges = Vec::with_capacity(n);
        for i in 0..n {
            edges.push(self.add_edge(ids[i], ids[(i + 1) % n], kinds[i])?);
        }
        for i in 0..n {
            self.set_next(edges[i], edges[(i + 1) % n])?;
        }
        Ok(self.add_component(ComponentData {
            start: edges[0],
            edge_count: n,
            contours,
        }))
    }
}
