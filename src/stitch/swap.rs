//! Edge-swap merging: two nearby edges of different loops exchange their
//! endpoints, which joins the loops without adding a junction.

use petgraph::unionfind::UnionFind;
use tracing::{debug, trace, warn};

use crate::error::StitchError;
use crate::graph::{ContourGraph, EdgeId, EdgeKind, VertexId};
use crate::math::intersect_2d::segments_cross_properly;
use crate::math::Point2;

use super::index::BridgeIndex;
use super::Bridge;

/// One candidate pair: `inner` belongs to the loop being merged.
#[derive(Debug, Clone, Copy)]
struct SwapCandidate {
    inner: EdgeId,
    outer: EdgeId,
    energy: f64,
    order: (usize, usize),
}

/// Segment endpoints of an edge, with its vertex IDs.
struct Ends {
    from: VertexId,
    to: VertexId,
    p: Point2,
    q: Point2,
}

fn ends(graph: &ContourGraph, e: EdgeId) -> Result<Ends, StitchError> {
    let edge = graph.edge(e)?;
    Ok(Ends {
        from: edge.from,
        to: edge.to,
        p: graph.vertex(edge.from)?.point,
        q: graph.vertex(edge.to)?.point,
    })
}

/// Extra length of replacing `I = i1 -> i2` and `J = j1 -> j2` by the links
/// `i1 -> j2` and `j1 -> i2`.
fn patching_energy(i: &Ends, j: &Ends) -> f64 {
    (i.p - j.q).norm() + (j.p - i.q).norm() - (i.q - i.p).norm() - (j.q - j.p).norm()
}

/// Merges every loop of `graph` into one simple cycle by edge swaps.
pub(crate) fn merge_by_edge_swaps(
    graph: &mut ContourGraph,
    index: &BridgeIndex,
    reject_crossing: bool,
) -> Result<Vec<Bridge>, StitchError> {
    let n = graph.component_count();
    let mut sets = UnionFind::<usize>::new(n);
    let mut sizes: Vec<usize> = graph.components().iter().map(|c| c.edge_count).collect();
    let mut swaps = Vec::with_capacity(n.saturating_sub(1));

    for remaining in (2..=n).rev() {
        let Some(smallest) = (0..n)
            .filter(|&c| sets.find(c) == c)
            .min_by_key(|&c| (sizes[c], c))
        else {
            break;
        };

        let candidates = collect_candidates(graph, index, &sets, smallest, true)?;
        let candidates = if candidates.is_empty() {
            debug!(component = smallest, "no nearby swap partner, scanning all edges");
            collect_candidates(graph, index, &sets, smallest, false)?
        } else {
            candidates
        };
        let chosen = pick(graph, &candidates, reject_crossing)?.ok_or(
            StitchError::NoBridgeCandidate {
                components: remaining,
            },
        )?;

        let other = graph.vertex(graph.edge(chosen.outer)?.from)?.component;
        let swap = apply_swap(graph, chosen.inner, chosen.outer, chosen.energy)?;
        debug!(
            from = swap.from,
            to = swap.to,
            energy = chosen.energy,
            "swapped edges"
        );
        swaps.push(swap);

        let (ra, rb) = (sets.find(smallest), sets.find(other));
        sets.union(ra, rb);
        let root = sets.find(ra);
        sizes[root] = sizes[ra] + sizes[rb];
    }
    Ok(swaps)
}

/// Candidate pairs for every edge of the loop rooted at `component`.
///
/// With `nearby`, partners are limited to edges incident to triangulation
/// neighbours of the inner edge's endpoints.
fn collect_candidates(
    graph: &ContourGraph,
    index: &BridgeIndex,
    sets: &UnionFind<usize>,
    component: usize,
    nearby: bool,
) -> Result<Vec<SwapCandidate>, StitchError> {
    let root_of = |v: VertexId| -> Result<usize, StitchError> {
        Ok(sets.find(graph.vertex(v)?.component))
    };

    let mut inner_edges = Vec::new();
    let mut outer_edges = Vec::new();
    for (id, edge) in graph.edges() {
        if root_of(edge.from)? == component {
            inner_edges.push(id);
        } else if !nearby {
            outer_edges.push(id);
        }
    }

    let mut out = Vec::new();
    for &inner in &inner_edges {
        let i = ends(graph, inner)?;
        let partners = if nearby {
            let mut partners = Vec::new();
            for v in index
                .neighbors(i.from)
                .into_iter()
                .chain(index.neighbors(i.to))
            {
                if root_of(v)? == component {
                    continue;
                }
                for &e in &graph.vertex(v)?.incoming {
                    partners.push(e);
                    partners.push(graph.edge(e)?.next);
                }
            }
            partners.sort_unstable();
            partners.dedup();
            partners
        } else {
            outer_edges.clone()
        };
        for outer in partners {
            let j = ends(graph, outer)?;
            out.push(SwapCandidate {
                inner,
                outer,
                energy: patching_energy(&i, &j),
                order: (graph.edge(inner)?.index, graph.edge(outer)?.index),
            });
        }
    }
    Ok(out)
}

/// Cheapest candidate, skipping those whose links would cross when asked to.
fn pick(
    graph: &ContourGraph,
    candidates: &[SwapCandidate],
    reject_crossing: bool,
) -> Result<Option<SwapCandidate>, StitchError> {
    let mut sorted = candidates.to_vec();
    sorted.sort_by(|a, b| a.energy.total_cmp(&b.energy).then(a.order.cmp(&b.order)));
    if !reject_crossing {
        return Ok(sorted.first().copied());
    }
    for c in &sorted {
        let i = ends(graph, c.inner)?;
        let j = ends(graph, c.outer)?;
        let crossing = segments_cross_properly(&i.p, &j.q, &j.p, &i.q)
            || graph.segment_crosses_any(&i.p, &j.q)
            || graph.segment_crosses_any(&j.p, &i.q);
        if crossing {
            trace!(inner = c.order.0, outer = c.order.1, "swap links cross, skipped");
            continue;
        }
        return Ok(Some(*c));
    }
    if let Some(first) = sorted.first() {
        warn!(
            inner = first.order.0,
            outer = first.order.1,
            "every swap candidate crosses existing edges, using the cheapest"
        );
    }
    Ok(sorted.first().copied())
}

/// The edge arriving at `edge.from` whose successor is `edge`.
fn predecessor(graph: &ContourGraph, edge: EdgeId) -> Result<EdgeId, StitchError> {
    let from = graph.edge(edge)?.from;
    for &e in &graph.vertex(from)?.incoming {
        if graph.edge(e)?.next == edge {
            return Ok(e);
        }
    }
    Err(StitchError::MalformedGraph(format!(
        "edge {} has no predecessor",
        graph.edge(edge)?.index
    )))
}

fn apply_swap(
    graph: &mut ContourGraph,
    inner: EdgeId,
    outer: EdgeId,
    energy: f64,
) -> Result<Bridge, StitchError> {
    let i = ends(graph, inner)?;
    let j = ends(graph, outer)?;
    let before_i = predecessor(graph, inner)?;
    let before_j = predecessor(graph, outer)?;
    let after_i = graph.edge(inner)?.next;
    let after_j = graph.edge(outer)?.next;

    let first = graph.add_edge(i.from, j.to, EdgeKind::Link)?;
    let second = graph.add_edge(j.from, i.to, EdgeKind::Link)?;
    graph.set_next(before_i, first)?;
    graph.set_next(first, after_j)?;
    graph.set_next(before_j, second)?;
    graph.set_next(second, after_i)?;
    graph.remove_edge(inner)?;
    graph.remove_edge(outer)?;

    Ok(Bridge {
        from: graph.vertex(i.from)?.index,
        to: graph.vertex(j.to)?.index,
        from_point: i.p,
        to_point: j.q,
        cost: energy,
    })
}
