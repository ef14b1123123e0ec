//! Closing open contours along the grid rectangle.
//!
//! An open contour enters and leaves the rectangle `[0, w] x [0, h]`. Walking
//! it with higher values on the left, the region of higher values continues
//! counter-clockwise along the rectangle from the exit point, up to the next
//! entry point. Chaining contours this way turns every set of open contours
//! into closed loops.
//!
//! An endpoint may sit exactly on a grid node when a boundary sample equals
//! the isovalue, so an exit and an entry can share one perimeter point. Such
//! ties are resolved as if every entry lay just clockwise of its crossing and
//! every exit just counter-clockwise: the high run between them wraps the
//! whole perimeter.

use crate::contour::Contour;
use crate::error::StitchError;
use crate::math::Point2;

use super::edge::EdgeKind;

/// A closed loop made of open contours and boundary runs.
#[derive(Debug, Clone, Default)]
pub(crate) struct BoundaryLoop {
    pub points: Vec<Point2>,
    /// `kinds[i]` tags the edge leaving `points[i]`.
    pub kinds: Vec<EdgeKind>,
    pub contours: Vec<usize>,
}

impl BoundaryLoop {
    /// Appends a point, folding it into the previous one when they coincide.
    fn push(&mut self, point: Point2, kind: EdgeKind, tolerance: f64) {
        if let Some(last) = self.points.last() {
            if (point - last).norm() <= tolerance {
                if let Some(k) = self.kinds.last_mut() {
                    *k = kind;
                }
                return;
            }
        }
        self.points.push(point);
        self.kinds.push(kind);
    }

    fn close(&mut self, tolerance: f64) {
        while self.points.len() > 1 {
            let first = self.points[0];
            let last = self.points[self.points.len() - 1];
            if (last - first).norm() > tolerance {
                break;
            }
            self.points.pop();
            self.kinds.pop();
        }
    }
}

/// Counter-clockwise perimeter coordinate of the rectangle, starting at the origin.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Perimeter {
    width: f64,
    height: f64,
}

impl Perimeter {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn length(self) -> f64 {
        2.0 * (self.width + self.height)
    }

    /// Perimeter parameter of the rectangle side nearest to `p`.
    pub fn param(self, p: &Point2) -> f64 {
        let (w, h) = (self.width, self.height);
        let sides = [
            (p.y.abs(), p.x.clamp(0.0, w)),
            ((p.x - w).abs(), w + p.y.clamp(0.0, h)),
            ((p.y - h).abs(), w + h + (w - p.x.clamp(0.0, w))),
            (p.x.abs(), 2.0 * w + h + (h - p.y.clamp(0.0, h))),
        ];
        let mut best = sides[0];
        for side in &sides[1..] {
            if side.0 < best.0 {
                best = *side;
            }
        }
        best.1 % self.length()
    }

    /// Counter-clockwise distance from `from` to `to`, in `[0, length)`.
    pub fn ccw_distance(self, from: f64, to: f64) -> f64 {
        (to - from).rem_euclid(self.length())
    }

    /// Rectangle corners with their parameters.
    fn corners(self) -> [(f64, Point2); 4] {
        let (w, h) = (self.width, self.height);
        [
            (0.0, Point2::new(0.0, 0.0)),
            (w, Point2::new(w, 0.0)),
            (w + h, Point2::new(w, h)),
            (2.0 * w + h, Point2::new(0.0, h)),
        ]
    }

    /// Length of the counter-clockwise run from an exit at `exit` to an entry
    /// at `entry`. Coincident points give the full perimeter.
    pub fn run_length(self, exit: f64, entry: f64, tolerance: f64) -> f64 {
        let d = self.ccw_distance(exit, entry);
        if d <= tolerance || d >= self.length() - tolerance {
            self.length()
        } else {
            d
        }
    }

    /// Corners strictly inside the run from `from` to `to`, in
    /// counter-clockwise order.
    pub fn corners_between(self, from: f64, to: f64, tolerance: f64) -> Vec<Point2> {
        let span = self.run_length(from, to, tolerance);
        let mut passed: Vec<(f64, Point2)> = self
            .corners()
            .iter()
            .map(|&(t, p)| (self.ccw_distance(from, t), p))
            .filter(|&(d, _)| d > tolerance && d < span - tolerance)
            .collect();
        passed.sort_by(|a, b| a.0.total_cmp(&b.0));
        passed.into_iter().map(|(_, p)| p).collect()
    }
}

/// Chains open contours into closed loops along the rectangle.
///
/// `open` pairs each open contour with its index in the contour set.
pub(crate) fn close_open_contours(
    open: &[(usize, &Contour)],
    perimeter: Perimeter,
    tolerance: f64,
) -> Result<Vec<BoundaryLoop>, StitchError> {
    let entries: Vec<f64> = open
        .iter()
        .map(|(_, c)| perimeter.param(&c.points()[0]))
        .collect();
    let exits: Vec<f64> = open
        .iter()
        .map(|(_, c)| perimeter.param(&c.points()[c.points().len() - 1]))
        .collect();

    // Each exit continues to the nearest entry counter-clockwise.
    let successor: Vec<usize> = exits
        .iter()
        .map(|&exit| {
            (0..entries.len())
                .min_by(|&a, &b| {
                    perimeter
                        .run_length(exit, entries[a], tolerance)
                        .total_cmp(&perimeter.run_length(exit, entries[b], tolerance))
                })
                .unwrap_or(0)
        })
        .collect();

    let mut visited = vec![false; open.len()];
    let mut loops = Vec::new();
    for start in 0..open.len() {
        if visited[start] {
            continue;
        }
        let mut lp = BoundaryLoop::default();
        let mut current = start;
        loop {
            if visited[current] {
                return Err(StitchError::MalformedGraph(format!(
                    "open contour {} is reached twice while closing along the boundary",
                    open[current].0
                )));
            }
            visited[current] = true;
            let (contour_index, contour) = open[current];
            lp.contours.push(contour_index);

            let pts = contour.points();
            for &p in &pts[..pts.len() - 1] {
                lp.push(p, EdgeKind::Contour, tolerance);
            }
            lp.push(pts[pts.len() - 1], EdgeKind::Boundary, tolerance);

            let next = successor[current];
            for corner in perimeter.corners_between(exits[current], entries[next], tolerance) {
                lp.push(corner, EdgeKind::Boundary, tolerance);
            }
            current = next;
            if current == start {
                break;
            }
        }
        lp.close(tolerance);
        loops.push(lp);
    }
    Ok(loops)
}
