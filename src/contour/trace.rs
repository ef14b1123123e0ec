use std::collections::HashMap;

use crate::math::Point2;

use super::cell::{CellSegment, GridEdge};

/// A polyline linked from cell segments, before orientation.
#[derive(Debug, Clone)]
pub(crate) struct RawTrace {
    pub points: Vec<Point2>,
    pub closed: bool,
}

/// Crossing shared by at most two segments (one per adjacent cell).
#[derive(Debug, Clone, Copy)]
struct Junction {
    point: Point2,
    segments: [usize; 2],
    count: usize,
}

/// Links cell segments into polylines by following shared crossings.
///
/// Open traces (touching the grid boundary) are collected first, starting
/// from their boundary end; the remaining segments form closed loops.
/// Segment order drives the traversal order, so the output is deterministic.
pub(crate) fn link_segments(segments: &[CellSegment]) -> Vec<RawTrace> {
    let mut junctions: HashMap<GridEdge, Junction> = HashMap::with_capacity(segments.len());
    for (i, seg) in segments.iter().enumerate() {
        for (key, point) in [(seg.a, seg.pa), (seg.b, seg.pb)] {
            let j = junctions.entry(key).or_insert(Junction {
                point,
                segments: [usize::MAX; 2],
                count: 0,
            });
            if j.count < 2 {
                j.segments[j.count] = i;
            }
            j.count += 1;
        }
    }

    let mut used = vec![false; segments.len()];
    let mut traces = Vec::new();

    for (i, seg) in segments.iter().enumerate() {
        if used[i] {
            continue;
        }
        for key in [seg.a, seg.b] {
            if junctions.get(&key).is_some_and(|j| j.count == 1) && !used[i] {
                traces.push(walk(segments, &junctions, &mut used, i, key));
            }
        }
    }

    for (i, seg) in segments.iter().enumerate() {
        if !used[i] {
            traces.push(walk(segments, &junctions, &mut used, i, seg.a));
        }
    }

    traces
}

/// Walks from crossing `start` along segment `first` until the walk returns
/// to `start` or reaches a crossing with no unused segment.
fn walk(
    segments: &[CellSegment],
    junctions: &HashMap<GridEdge, Junction>,
    used: &mut [bool],
    first: usize,
    start: GridEdge,
) -> RawTrace {
    let mut points = vec![point_of(junctions, start, &segments[first])];
    let mut current = first;
    let mut at = start;

    loop {
        used[current] = true;
        let seg = &segments[current];
        let (next, next_point) = if seg.a == at { (seg.b, seg.pb) } else { (seg.a, seg.pa) };
        if next == start {
            return RawTrace {
                points,
                closed: true,
            };
        }
        points.push(next_point);

        let onward = junctions.get(&next).and_then(|j| {
            j.segments[..j.count.min(2)]
                .iter()
                .copied()
                .find(|&s| !used[s])
        });
        match onward {
            Some(s) => {
                current = s;
                at = next;
            }
            None => {
                return RawTrace {
                    points,
                    closed: false,
                }
            }
        }
    }
}

fn point_of(junctions: &HashMap<GridEdge, Junction>, key: GridEdge, seg: &CellSegment) -> Point2 {
    junctions
        .get(&key)
        .map_or(if seg.a == key { seg.pa } else { seg.pb }, |j| j.point)
}

/// Removes consecutive points closer than `tolerance`, including the
/// wrap-around pair of a closed polyline.
pub(crate) fn merge_close_points(points: &mut Vec<Point2>, closed: bool, tolerance: f64) {
    points.dedup_by(|b, a| (*b - *a).norm() <= tolerance);
    if closed {
        while points.len() > 1 {
            let first = points[0];
            let last = points[points.len() - 1];
            if (last - first).norm() <= tolerance {
                points.pop();
            } else {
                break;
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn seg(a: GridEdge, pa: (f64, f64), b: GridEdge, pb: (f64, f64)) -> CellSegment {
        CellSegment {
            a,
            b,
            pa: Point2::new(pa.0, pa.1),
            pb: Point2::new(pb.0, pb.1),
        }
    }

    #[test]
    fn links_a_diamond_into_a_loop() {
        let h0 = GridEdge::horizontal(0, 0);
        let v1 = GridEdge::vertical(1, 0);
        let h1 = GridEdge::horizontal(0, 1);
        let v0 = GridEdge::vertical(0, 0);
        // Deliberately shuffled segment order and directions.
        let segments = vec![
            seg(h0, (0.5, 0.0), v1, (1.0, 0.5)),
            seg(h1, (0.5, 1.0), v0, (0.0, 0.5)),
            seg(h1, (0.5, 1.0), v1, (1.0, 0.5)),
            seg(v0, (0.0, 0.5), h0, (0.5, 0.0)),
        ];
        let traces = link_segments(&segments);
        assert_eq!(traces.len(), 1);
        assert!(traces[0].closed);
        assert_eq!(traces[0].points.len(), 4);
    }

    #[test]
    fn open_trace_starts_at_boundary_end() {
        let a = GridEdge::horizontal(0, 0);
        let b = GridEdge::vertical(1, 0);
        let c = GridEdge::horizontal(1, 1);
        let segments = vec![
            seg(b, (1.0, 0.5), c, (1.5, 1.0)),
            seg(a, (0.5, 0.0), b, (1.0, 0.5)),
        ];
        let traces = link_segments(&segments);
        assert_eq!(traces.len(), 1);
        assert!(!traces[0].closed);
        assert_eq!(traces[0].points.len(), 3);
        // The first segment in order touches `c` (a single-segment crossing) first.
        assert!((traces[0].points[0].x - 1.5).abs() < 1e-12);
    }

    #[test]
    fn merge_close_points_handles_wraparound() {
        let mut pts = vec![
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(1e-12, 0.0),
        ];
        merge_close_points(&mut pts, true, 1e-9);
        assert_eq!(pts.len(), 3);
        let mut open = vec![Point2::new(0.0, 0.0), Point2::new(2.0, 0.0), Point2::new(0.0, 0.0)];
        merge_close_points(&mut open, false, 1e-9);
        assert_eq!(open.len(), 3);
    }
}
