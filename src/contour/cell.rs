use crate::field::ScalarField;
use crate::math::Point2;

/// Orientation of a grid edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GridAxis {
    /// Joins `(col, row)` and `(col + 1, row)`.
    Horizontal,
    /// Joins `(col, row)` and `(col, row + 1)`.
    Vertical,
}

/// A grid edge, identified by its axis and its lower-index node.
///
/// Every isovalue crossing lies on exactly one grid edge, so the edge doubles
/// as the key that glues segments from neighbouring cells together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridEdge {
    pub axis: GridAxis,
    pub col: usize,
    pub row: usize,
}

impl GridEdge {
    #[must_use]
    pub fn horizontal(col: usize, row: usize) -> Self {
        Self {
            axis: GridAxis::Horizontal,
            col,
            row,
        }
    }

    #[must_use]
    pub fn vertical(col: usize, row: usize) -> Self {
        Self {
            axis: GridAxis::Vertical,
            col,
            row,
        }
    }

    /// The two nodes joined by this edge, lower index first.
    #[must_use]
    pub fn nodes(self) -> [(usize, usize); 2] {
        match self.axis {
            GridAxis::Horizontal => [(self.col, self.row), (self.col + 1, self.row)],
            GridAxis::Vertical => [(self.col, self.row), (self.col, self.row + 1)],
        }
    }

    /// Point on this edge where linear interpolation of the two node values
    /// reaches the isovalue, in world coordinates.
    ///
    /// Always interpolates from the lower-index node, so both cells sharing
    /// the edge compute the identical point.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn crossing(self, field: &ScalarField) -> Point2 {
        let [(c0, r0), (c1, r1)] = self.nodes();
        let v0 = field.value(c0, r0);
        let v1 = field.value(c1, r1);
        let denom = v1 - v0;
        let t = if denom.abs() < f64::EPSILON {
            0.5
        } else {
            ((field.isovalue() - v0) / denom).clamp(0.0, 1.0)
        };
        let x = c0 as f64 + t * (c1 as f64 - c0 as f64);
        let y = r0 as f64 + t * (r1 as f64 - r0 as f64);
        field.to_world(x, y)
    }
}

/// The four sides of a cell, in counter-clockwise order starting at the bottom.
///
/// Side `k` joins corner `k` and corner `k + 1`, where corners are numbered
/// counter-clockwise from `(col, row)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellEdge {
    Bottom,
    Right,
    Top,
    Left,
}

impl CellEdge {
    const ALL: [CellEdge; 4] = [CellEdge::Bottom, CellEdge::Right, CellEdge::Top, CellEdge::Left];

    /// The grid edge this side of cell `(col, row)` lies on.
    #[must_use]
    pub fn grid_edge(self, col: usize, row: usize) -> GridEdge {
        match self {
            CellEdge::Bottom => GridEdge::horizontal(col, row),
            CellEdge::Right => GridEdge::vertical(col + 1, row),
            CellEdge::Top => GridEdge::horizontal(col, row + 1),
            CellEdge::Left => GridEdge::vertical(col, row),
        }
    }
}

/// A segment between two crossings inside one cell. Undirected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct CellSegment {
    pub a: GridEdge,
    pub b: GridEdge,
    pub pa: Point2,
    pub pb: Point2,
}

/// Marching-squares case index: bit `k` is set when corner `k` exceeds the isovalue.
pub(crate) fn case_index(corners: [f64; 4], isovalue: f64) -> u8 {
    corners
        .iter()
        .enumerate()
        .fold(0u8, |acc, (k, &v)| if v > isovalue { acc | (1 << k) } else { acc })
}

/// Pairs of cell sides joined by a segment for one cell.
///
/// Ambiguous saddle cases (5 and 10) are resolved by the cell-centre value:
/// when the centre exceeds the isovalue the two high corners stay connected and
/// the low corners are cut off, otherwise the high corners are cut off.
pub(crate) fn side_pairs(corners: [f64; 4], isovalue: f64) -> Vec<(CellEdge, CellEdge)> {
    let case = case_index(corners, isovalue);
    let above = |k: usize| case & (1 << k) != 0;
    let active: Vec<CellEdge> = (0..4)
        .filter(|&k| above(k) != above((k + 1) % 4))
        .map(|k| CellEdge::ALL[k])
        .collect();

    match active.len() {
        2 => vec![(active[0], active[1])],
        4 => {
            let center = corners.iter().sum::<f64>() / 4.0;
            let keep_high_connected = center > isovalue;
            // Cut off each corner on the isolated side: corner k sits between
            // side k - 1 and side k.
            (0..4)
                .filter(|&k| above(k) != keep_high_connected)
                .map(|k| (CellEdge::ALL[(k + 3) % 4], CellEdge::ALL[k]))
                .collect()
        }
        _ => Vec::new(),
    }
}

/// Appends the segments of every cell in grid row `row` to `out`.
pub(crate) fn row_segments(field: &ScalarField, row: usize, out: &mut Vec<CellSegment>) {
    let iso = field.isovalue();
    for col in 0..field.width() - 1 {
        let corners = [
            field.value(col, row),
            field.value(col + 1, row),
            field.value(col + 1, row + 1),
            field.value(col, row + 1),
        ];
        for (sa, sb) in side_pairs(corners, iso) {
            let a = sa.grid_edge(col, row);
            let b = sb.grid_edge(col, row);
            out.push(CellSegment {
                a,
                b,
                pa: a.crossing(field),
                pb: b.crossing(field),
            });
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn uniform_cells_are_inactive() {
        assert!(side_pairs([0.0; 4], 0.5).is_empty());
        assert!(side_pairs([1.0; 4], 0.5).is_empty());
        // All four corners exactly on the isovalue: degenerate, skipped.
        assert!(side_pairs([0.5; 4], 0.5).is_empty());
    }

    #[test]
    fn single_corner_case() {
        // Only corner 0 above: crossing on bottom and left.
        let pairs = side_pairs([1.0, 0.0, 0.0, 0.0], 0.5);
        assert_eq!(pairs, vec![(CellEdge::Bottom, CellEdge::Left)]);
        assert_eq!(case_index([1.0, 0.0, 0.0, 0.0], 0.5), 1);
    }

    #[test]
    fn all_sixteen_cases_have_even_active_sides() {
        for case in 0u8..16 {
            let corners: [f64; 4] =
                std::array::from_fn(|k| if case & (1 << k) != 0 { 1.0 } else { 0.0 });
            let pairs = side_pairs(corners, 0.5);
            let expected = match case {
                0 | 15 => 0,
                5 | 10 => 2,
                _ => 1,
            };
            assert_eq!(pairs.len(), expected, "case {case}");
        }
    }

    #[test]
    fn saddle_with_high_centre_joins_high_corners() {
        // Corners 0 and 2 high, centre mean 0.6 > 0.5: low corners 1 and 3 cut off.
        let pairs = side_pairs([1.0, 0.2, 1.0, 0.2], 0.5);
        assert_eq!(
            pairs,
            vec![
                (CellEdge::Bottom, CellEdge::Right),
                (CellEdge::Top, CellEdge::Left)
            ]
        );
    }

    #[test]
    fn saddle_with_low_centre_separates_high_corners() {
        // Corners 0 and 2 high, centre mean 0.4 < 0.5: high corners cut off.
        let pairs = side_pairs([0.7, 0.1, 0.7, 0.1], 0.5);
        assert_eq!(
            pairs,
            vec![
                (CellEdge::Left, CellEdge::Bottom),
                (CellEdge::Right, CellEdge::Top)
            ]
        );
    }

    #[test]
    fn crossing_is_shared_and_on_level() {
        let field = ScalarField::new(3, 2, 2.0, 0.5, vec![0.0, 1.0, 0.0, 1.0, 2.0, 1.0]).unwrap();
        let edge = GridEdge::horizontal(0, 0);
        let p = edge.crossing(&field);
        assert!((p.x - 1.0).abs() < 1e-12);
        assert!(p.y.abs() < 1e-12);
        assert!((field.sample_at(&p).unwrap() - 0.5).abs() < 1e-12);
        // The cell to the right and the one to the left agree on the shared vertical edge.
        assert_eq!(
            CellEdge::Right.grid_edge(0, 0),
            CellEdge::Left.grid_edge(1, 0)
        );
    }

    #[test]
    fn row_segments_emits_per_cell() {
        let field = ScalarField::new(3, 2, 1.0, 0.5, vec![0.0, 1.0, 0.0, 0.0, 1.0, 0.0]).unwrap();
        let mut out = Vec::new();
        row_segments(&field, 0, &mut out);
        assert_eq!(out.len(), 2);
        for seg in &out {
            assert!((field.sample_at(&seg.pa).unwrap() - 0.5).abs() < 1e-12);
            assert!((field.sample_at(&seg.pb).unwrap() - 0.5).abs() < 1e-12);
        }
    }
}
