mod index;
mod splice;
mod swap;

pub use index::BridgeIndex;

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use petgraph::unionfind::UnionFind;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::error::{Result, StitchError};
use crate::graph::{ContourGraph, VertexId};
use crate::math::Point2;
use crate::params::{StitchParams, StitchStrategy};

use splice::splice_bridge;
use swap::merge_by_edge_swaps;

/// One accepted connection between two components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bridge {
    /// Index of the start vertex.
    pub from: usize,
    /// Index of the end vertex.
    pub to: usize,
    pub from_point: Point2,
    pub to_point: Point2,
    /// Euclidean length for a bridge pair, patching energy for an edge swap.
    pub cost: f64,
}

/// Summary of one stitching run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StitchReport {
    pub bridges: Vec<Bridge>,
    pub total_cost: f64,
}

impl StitchReport {
    fn from_bridges(bridges: Vec<Bridge>) -> Self {
        let total_cost = bridges.iter().map(|b| b.cost).sum();
        Self {
            bridges,
            total_cost,
        }
    }
}

/// A candidate bridge in the priority queue.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    cost: f64,
    a: VertexId,
    b: VertexId,
    order: (usize, usize),
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cost
            .total_cmp(&other.cost)
            .then(self.order.cmp(&other.order))
    }
}

/// Merges every component of a contour graph into one closed traversal.
///
/// The graph is modified in place. `index` must have been built from the same
/// graph; stitching adds edges only, so one index serves the whole run.
pub struct StitchCycles {
    params: StitchParams,
}

impl StitchCycles {
    /// Creates a new `StitchCycles` operation.
    #[must_use]
    pub fn new(params: StitchParams) -> Self {
        Self { params }
    }

    /// Executes the stitching.
    ///
    /// A graph with zero or one component is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`StitchError::NoBridgeCandidate`] if some components cannot be
    /// reached, and [`StitchError::MalformedGraph`] if the successor structure
    /// is inconsistent.
    pub fn execute(&self, graph: &mut ContourGraph, index: &BridgeIndex) -> Result<StitchReport> {
        let components = graph.component_count();
        if components <= 1 {
            debug!(components, "nothing to stitch");
            return Ok(StitchReport::default());
        }
        let bridges = match self.params.strategy {
            StitchStrategy::Bridge => self.stitch_bridges(graph, index)?,
            StitchStrategy::EdgeSwap => {
                merge_by_edge_swaps(graph, index, self.params.reject_crossing_bridges)?
            }
        };
        let report = StitchReport::from_bridges(bridges);
        info!(
            components,
            bridges = report.bridges.len(),
            total_cost = report.total_cost,
            strategy = ?self.params.strategy,
            "stitched components"
        );
        Ok(report)
    }

    /// Kruskal over the triangulation edges joining different components.
    fn stitch_bridges(
        &self,
        graph: &mut ContourGraph,
        index: &BridgeIndex,
    ) -> std::result::Result<Vec<Bridge>, StitchError> {
        let n = graph.component_count();
        let mut sets = UnionFind::<usize>::new(n);
        let mut bridges = Vec::with_capacity(n - 1);

        let mut heap = BinaryHeap::new();
        for (u, v) in index.candidate_pairs() {
            if let Some(c) = candidate(graph, u, v)? {
                heap.push(Reverse(c));
            }
        }
        debug!(candidates = heap.len(), "queued bridge candidates");

        let mut remaining = n;
        while remaining > 1 {
            let Some(Reverse(c)) = heap.pop() else {
                break;
            };
            let ca = graph.vertex(c.a)?.component;
            let cb = graph.vertex(c.b)?.component;
            if sets.equiv(ca, cb) {
                continue;
            }
            if self.params.reject_crossing_bridges && crosses(graph, &c)? {
                trace!(from = c.order.0, to = c.order.1, "bridge crosses an edge, skipped");
                continue;
            }
            bridges.push(accept(graph, &mut sets, &c)?);
            remaining -= 1;
        }

        while remaining > 1 {
            let Some(c) = self.nearest_pair(graph, &sets)? else {
                return Err(StitchError::NoBridgeCandidate {
                    components: remaining,
                });
            };
            warn!(
                from = c.order.0,
                to = c.order.1,
                cost = c.cost,
                "no triangulation candidate left, using nearest pair"
            );
            bridges.push(accept(graph, &mut sets, &c)?);
            remaining -= 1;
        }
        Ok(bridges)
    }

    /// Brute-force closest pair across different sets.
    ///
    /// Prefers pairs that cross no edge when crossing rejection is on.
    fn nearest_pair(
        &self,
        graph: &ContourGraph,
        sets: &UnionFind<usize>,
    ) -> std::result::Result<Option<Candidate>, StitchError> {
        let vertices: Vec<(VertexId, usize)> = graph
            .vertices()
            .map(|(id, v)| (id, sets.find(v.component)))
            .collect();
        let mut nearest: Option<Candidate> = None;
        let mut clear: Option<Candidate> = None;
        for (i, &(u, ru)) in vertices.iter().enumerate() {
            for &(v, rv) in &vertices[i + 1..] {
                if ru == rv {
                    continue;
                }
                let Some(c) = candidate(graph, u, v)? else {
                    continue;
                };
                if nearest.is_none_or(|best| c < best) {
                    nearest = Some(c);
                }
                if self.params.reject_crossing_bridges
                    && clear.is_none_or(|best| c < best)
                    && !crosses(graph, &c)?
                {
                    clear = Some(c);
                }
            }
        }
        Ok(clear.or(nearest))
    }
}

fn crosses(graph: &ContourGraph, c: &Candidate) -> std::result::Result<bool, StitchError> {
    let p = graph.vertex(c.a)?.point;
    let q = graph.vertex(c.b)?.point;
    Ok(graph.segment_crosses_any(&p, &q))
}

/// Splices the bridge for `c` and merges the two sets.
fn accept(
    graph: &mut ContourGraph,
    sets: &mut UnionFind<usize>,
    c: &Candidate,
) -> std::result::Result<Bridge, StitchError> {
    splice_bridge(graph, c.a, c.b)?;
    let a = graph.vertex(c.a)?;
    let b = graph.vertex(c.b)?;
    sets.union(a.component, b.component);
    debug!(
        from = a.index,
        to = b.index,
        cost = c.cost,
        "inserted bridge pair"
    );
    Ok(Bridge {
        from: a.index,
        to: b.index,
        from_point: a.point,
        to_point: b.point,
        cost: c.cost,
    })
}

/// Candidate between `u` and `v` if they lie in different components,
/// ordered so the lower vertex index comes first.
fn candidate(
    graph: &ContourGraph,
    u: VertexId,
    v: VertexId,
) -> std::result::Result<Option<Candidate>, StitchError> {
    let (vu, vv) = (graph.vertex(u)?, graph.vertex(v)?);
    if vu.component == vv.component {
        return Ok(None);
    }
    let (a, b, va, vb) = if vu.index <= vv.index {
        (u, v, vu, vv)
    } else {
        (v, u, vv, vu)
    };
    Ok(Some(Candidate {
        cost: (vb.point - va.point).norm(),
        a,
        b,
        order: (va.index, vb.index),
    }))
}
