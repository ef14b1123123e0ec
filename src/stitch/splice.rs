//! Junction splicing of bridge pairs into the successor structure.

use tracing::debug;

use crate::error::StitchError;
use crate::graph::{ContourGraph, EdgeId, EdgeKind, VertexId};
use crate::math::polygon_2d::ccw_angle;
use crate::math::{Vector2, TOLERANCE};

/// Splices a forward/return bridge pair between `a` and `b`.
///
/// With `ea` arriving at `a` and `eb` arriving at `b`, the traversal
/// `ea -> next(ea)` becomes `ea -> (a->b) -> next(eb)` and
/// `eb -> next(eb)` becomes `eb -> (b->a) -> next(ea)`. When `a` and `b` lie on
/// different loops the two loops merge into one; every vertex keeps as many
/// incoming as outgoing edges.
///
/// Returns the forward and return edge IDs.
///
/// # Errors
///
/// Returns an error if either vertex has no incoming edge.
pub(crate) fn splice_bridge(
    graph: &mut ContourGraph,
    a: VertexId,
    b: VertexId,
) -> Result<(EdgeId, EdgeId), StitchError> {
    let b_point = graph.vertex(b)?.point;
    let a_point = graph.vertex(a)?.point;
    let ea = choose_slot(graph, a, b_point - a_point)?;
    let eb = choose_slot(graph, b, a_point - b_point)?;
    let after_a = graph.edge(ea)?.next;
    let after_b = graph.edge(eb)?.next;

    let forward = graph.add_edge(a, b, EdgeKind::BridgeForward)?;
    let back = graph.add_edge(b, a, EdgeKind::BridgeReturn)?;
    graph.set_next(ea, forward)?;
    graph.set_next(forward, after_b)?;
    graph.set_next(eb, back)?;
    graph.set_next(back, after_a)?;
    Ok((forward, back))
}

/// Picks the incoming edge at `vertex` after which a new edge leaving in
/// direction `toward` is inserted.
///
/// Each incoming edge `e` opens a slot between the ray back along `e` and the
/// ray along `next(e)`. The chosen slot has `toward` inside one of its two
/// angular sectors with no other incident ray in that sector, so the
/// traversal does not cross itself at the vertex.
pub(crate) fn choose_slot(
    graph: &ContourGraph,
    vertex: VertexId,
    toward: Vector2,
) -> Result<EdgeId, StitchError> {
    let data = graph.vertex(vertex)?;
    let origin = data.point;
    let Some(&first) = data.incoming.first() else {
        return Err(StitchError::MalformedGraph(format!(
            "vertex {} has no incoming edge",
            data.index
        )));
    };
    if data.incoming.len() == 1 {
        return Ok(first);
    }

    let mut slots = Vec::with_capacity(data.incoming.len());
    let mut rays = Vec::with_capacity(2 * data.incoming.len());
    for &e in &data.incoming {
        let edge = graph.edge(e)?;
        let back = graph.vertex(edge.from)?.point - origin;
        let out = graph.vertex(graph.edge(edge.next)?.to)?.point - origin;
        slots.push((e, back, out));
        rays.push(back);
        rays.push(out);
    }

    for &(e, back, out) in &slots {
        if sector_is_free(&back, &out, &toward, &rays)
            || sector_is_free(&out, &back, &toward, &rays)
        {
            return Ok(e);
        }
    }
    debug!(
        vertex = data.index,
        incoming = data.incoming.len(),
        "no free sector at junction, using first slot"
    );
    Ok(first)
}

/// True when `d` lies in the sector swept counter-clockwise from `start` to
/// `end`, and no ray of `rays` lies strictly inside it.
fn sector_is_free(start: &Vector2, end: &Vector2, d: &Vector2, rays: &[Vector2]) -> bool {
    let span = ccw_angle(start, end);
    let at = ccw_angle(start, d);
    if at <= TOLERANCE || at >= span - TOLERANCE {
        return false;
    }
    rays.iter().all(|r| {
        let angle = ccw_angle(start, r);
        angle <= TOLERANCE || angle >= span - TOLERANCE
    })
}
