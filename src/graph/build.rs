use tracing::debug;

use crate::contour::{Contour, ContourSet};
use crate::error::Result;

use super::boundary::{close_open_contours, Perimeter};
use super::edge::EdgeKind;
use super::ContourGraph;

/// Builds the stitching input graph from an extracted contour set.
///
/// Every closed contour becomes one loop component. Open contours are closed
/// along the grid rectangle `[0, width] x [0, height]` first, so a component
/// may hold several of them.
pub struct BuildContourGraph {
    extent: (f64, f64),
    tolerance: f64,
}

impl BuildContourGraph {
    /// Creates a new `BuildContourGraph` operation.
    ///
    /// `extent` is the world-space size of the grid and `tolerance` the
    /// distance under which consecutive points are treated as one.
    #[must_use]
    pub fn new(extent: (f64, f64), tolerance: f64) -> Self {
        Self { extent, tolerance }
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns an error if open contours cannot be paired up along the
    /// boundary.
    pub fn execute(&self, contours: &ContourSet) -> Result<ContourGraph> {
        let mut graph = ContourGraph::new();
        let mut open: Vec<(usize, &Contour)> = Vec::new();

        for (index, contour) in contours.iter().enumerate() {
            if !contour.is_closed() {
                open.push((index, contour));
                continue;
            }
            let kinds = vec![EdgeKind::Contour; contour.points().len()];
            graph.add_loop(contour.points(), &kinds, vec![index])?;
        }

        if !open.is_empty() {
            let perimeter = Perimeter::new(self.extent.0, self.extent.1);
            let loops = close_open_contours(&open, perimeter, self.tolerance)?;
            debug!(
                open = open.len(),
                loops = loops.len(),
                "closed open contours along the boundary"
            );
            for lp in loops {
                if lp.points.len() < 3 {
                    debug!(contours = ?lp.contours, "skipped degenerate boundary loop");
                    continue;
                }
                graph.add_loop(&lp.points, &lp.kinds, lp.contours)?;
            }
        }

        debug!(
            vertices = graph.vertex_count(),
            edges = graph.edge_count(),
            components = graph.component_count(),
            "built contour graph"
        );
        Ok(graph)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point2;

    fn square(x0: f64, y0: f64, size: f64) -> Contour {
        Contour::new(
            vec![
                Point2::new(x0, y0),
                Point2::new(x0 + size, y0),
                Point2::new(x0 + size, y0 + size),
                Point2::new(x0, y0 + size),
            ],
            true,
            0.0,
        )
    }

    #[test]
    fn empty_set_gives_empty_graph() {
        let graph = BuildContourGraph::new((4.0, 4.0), 1e-9)
            .execute(&ContourSet::default())
            .unwrap();
        assert_eq!(graph.vertex_count(), 0);
        assert_eq!(graph.component_count(), 0);
    }

    #[test]
    fn closed_contours_become_components() {
        let set = ContourSet::new(vec![square(1.0, 1.0, 1.0), square(5.0, 1.0, 2.0)]);
        let graph = BuildContourGraph::new((10.0, 10.0), 1e-9)
            .execute(&set)
            .unwrap();
        assert_eq!(graph.component_count(), 2);
        assert_eq!(graph.edge_count(), set.total_edge_count());
        assert_eq!(graph.count_kind(EdgeKind::Contour), 8);
        assert_eq!(graph.components()[1].contours, vec![1]);
    }

    #[test]
    fn open_contour_is_closed_with_boundary_edges() {
        let open = Contour::new(
            vec![Point2::new(2.0, 4.0), Point2::new(2.0, 0.0)],
            false,
            0.0,
        );
        let set = ContourSet::new(vec![open, square(0.5, 0.5, 1.0)]);
        let graph = BuildContourGraph::new((4.0, 4.0), 1e-9)
            .execute(&set)
            .unwrap();
        assert_eq!(graph.component_count(), 2);
        assert_eq!(graph.count_kind(EdgeKind::Contour), 5);
        // (2,0) -> (4,0) -> (4,4) -> (2,4)
        assert_eq!(graph.count_kind(EdgeKind::Boundary), 3);
        assert_eq!(graph.components()[1].contours, vec![0]);
    }
}
