pub mod resample;

use serde::{Deserialize, Serialize};
use slotmap::SecondaryMap;
use tracing::debug;

use crate::error::{FormatError, Result, TraversalInvariantError};
use crate::graph::{ContourGraph, EdgeId, EdgeKind};
use crate::math::polygon_2d::polyline_length;
use crate::math::Point2;
use crate::params::FinalizeParams;

use resample::resample_closed;

/// The final closed trajectory.
///
/// The last point connects back to the first. A bridge endpoint appears once
/// per pass of the traversal through it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CycleDocument", into = "CycleDocument")]
pub struct Cycle {
    points: Vec<Point2>,
    closed: bool,
}

impl Cycle {
    /// Creates a closed cycle through `points`.
    #[must_use]
    pub fn new(points: Vec<Point2>) -> Self {
        Self {
            points,
            closed: true,
        }
    }

    #[must_use]
    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    /// Always `true` for a cycle produced by [`FinalizePath`].
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// True when there was no geometry to traverse. This is a valid result.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of edges, including the closing one.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.points.len()
    }

    /// Total length including the closing edge.
    #[must_use]
    pub fn length(&self) -> f64 {
        polyline_length(&self.points, true)
    }
}

/// Serialized shape of a [`Cycle`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CycleDocument {
    points: Vec<Point2>,
    closed: bool,
}

impl TryFrom<CycleDocument> for Cycle {
    type Error = FormatError;

    fn try_from(doc: CycleDocument) -> std::result::Result<Self, Self::Error> {
        if !doc.closed {
            return Err(FormatError::OpenCycle);
        }
        if let Some(index) = doc
            .points
            .iter()
            .position(|p| !p.x.is_finite() || !p.y.is_finite())
        {
            return Err(FormatError::NonFinitePoint { index });
        }
        Ok(Cycle::new(doc.points))
    }
}

impl From<Cycle> for CycleDocument {
    fn from(cycle: Cycle) -> Self {
        Self {
            points: cycle.points,
            closed: cycle.closed,
        }
    }
}

/// Linearizes a stitched graph into a [`Cycle`].
pub struct FinalizePath {
    params: FinalizeParams,
}

impl FinalizePath {
    /// Creates a new `FinalizePath` operation.
    #[must_use]
    pub fn new(params: FinalizeParams) -> Self {
        Self { params }
    }

    /// Walks the successor chain from the first edge and checks that it is a
    /// single closed traversal using every edge exactly once.
    ///
    /// An empty graph gives an empty cycle.
    ///
    /// # Errors
    ///
    /// Returns a [`TraversalInvariantError`] if a vertex is unbalanced, the
    /// bridge legs do not pair up, the walk does not return to its start,
    /// an edge is visited other than once, or some edges are unreached.
    /// Returns a [`FormatError`] if the resample
    /// spacing is not positive or too fine for the cycle.
    pub fn execute(&self, graph: &ContourGraph) -> Result<Cycle> {
        let Some((start, _)) = graph.edges().next() else {
            return Ok(Cycle::new(Vec::new()));
        };
        check_balance(graph)?;

        let forward = graph.count_kind(EdgeKind::BridgeForward);
        let backward = graph.count_kind(EdgeKind::BridgeReturn);
        if forward != backward {
            return Err(TraversalInvariantError::BridgePairMismatch { forward, backward }.into());
        }

        let expected = graph.edge_count();
        let mut visits: SecondaryMap<EdgeId, usize> = SecondaryMap::with_capacity(expected);
        let mut points = Vec::with_capacity(expected);
        let mut current = start;
        loop {
            let Ok(edge) = graph.edge(current) else {
                return Err(TraversalInvariantError::NotClosed {
                    visited: points.len(),
                    expected,
                }
                .into());
            };
            points.push(graph.vertex(edge.from)?.point);
            if let Some(slot) = visits.entry(current) {
                *slot.or_insert(0) += 1;
            }
            current = edge.next;
            if current == start {
                break;
            }
            if points.len() > expected {
                return Err(TraversalInvariantError::NotClosed {
                    visited: points.len(),
                    expected,
                }
                .into());
            }
        }

        for (id, &count) in &visits {
            if count != 1 {
                return Err(TraversalInvariantError::EdgeVisitCount {
                    edge: graph.edge(id)?.index,
                    count,
                }
                .into());
            }
        }
        if visits.len() < expected {
            return Err(TraversalInvariantError::Disconnected {
                components: 1 + count_cycles(graph, &visits),
            }
            .into());
        }

        debug!(
            edges = expected,
            bridges = forward,
            "traversed stitched graph"
        );

        let points = match self.params.resample_spacing {
            Some(spacing) => resample_closed(&points, spacing)?,
            None => points,
        };
        Ok(Cycle::new(points))
    }
}

/// Every vertex must have as many incoming as outgoing edges.
fn check_balance(graph: &ContourGraph) -> std::result::Result<(), TraversalInvariantError> {
    let mut outgoing: SecondaryMap<_, usize> = SecondaryMap::with_capacity(graph.vertex_count());
    for (_, edge) in graph.edges() {
        if let Some(slot) = outgoing.entry(edge.from) {
            *slot.or_insert(0) += 1;
        }
    }
    for (id, vertex) in graph.vertices() {
        let out = outgoing.get(id).copied().unwrap_or(0);
        if out != vertex.incoming.len() {
            return Err(TraversalInvariantError::UnbalancedVertex {
                vertex: vertex.index,
                incoming: vertex.incoming.len(),
                outgoing: out,
            });
        }
    }
    Ok(())
}

/// Number of successor cycles among the edges not in `seen`.
fn count_cycles(graph: &ContourGraph, seen: &SecondaryMap<EdgeId, usize>) -> usize {
    let mut marked: SecondaryMap<EdgeId, ()> = SecondaryMap::new();
    let mut cycles = 0;
    for (id, _) in graph.edges() {
        if seen.contains_key(id) || marked.contains_key(id) {
            continue;
        }
        cycles += 1;
        let mut current = id;
        while !marked.contains_key(current) && !seen.contains_key(current) {
            marked.insert(current, ());
            match graph.edge(current) {
                Ok(edge) => current = edge.next,
                Err(_) => break,
            }
        }
    }
    cycles
}
