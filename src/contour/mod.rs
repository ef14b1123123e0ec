mod cell;
mod extract;
mod trace;

pub use cell::{CellEdge, GridAxis, GridEdge};
pub use extract::ExtractContours;

use serde::{Deserialize, Serialize};

use crate::error::FormatError;
use crate::math::polygon_2d::signed_area_2d;
use crate::math::Point2;

/// Winding sign of a contour: positive when it encloses higher field values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum Orientation {
    Positive,
    Negative,
}

impl Orientation {
    /// `+1` or `-1`.
    #[must_use]
    pub fn sign(self) -> i8 {
        match self {
            Orientation::Positive => 1,
            Orientation::Negative => -1,
        }
    }

    /// Orientation of a loop whose higher values lie on its left.
    #[must_use]
    pub fn from_signed_area(area: f64) -> Self {
        if area >= 0.0 {
            Orientation::Positive
        } else {
            Orientation::Negative
        }
    }
}

impl From<Orientation> for i8 {
    fn from(o: Orientation) -> Self {
        o.sign()
    }
}

impl TryFrom<i8> for Orientation {
    type Error = String;

    fn try_from(v: i8) -> Result<Self, Self::Error> {
        match v {
            1 => Ok(Orientation::Positive),
            -1 => Ok(Orientation::Negative),
            other => Err(format!("orientation must be 1 or -1, got {other}")),
        }
    }
}

/// One extracted isocontour.
///
/// Points are in world coordinates and ordered so that higher field values
/// lie on the left of the walking direction. A closed contour's last point
/// connects back to its first (the first point is not repeated).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ContourDocument", into = "ContourDocument")]
pub struct Contour {
    points: Vec<Point2>,
    closed: bool,
    orientation: Orientation,
    isovalue: f64,
}

impl Contour {
    /// Creates a contour, deriving its orientation from the point order.
    ///
    /// Open contours use the polygon closed by their end-to-start chord.
    #[must_use]
    pub fn new(points: Vec<Point2>, closed: bool, isovalue: f64) -> Self {
        let orientation = Orientation::from_signed_area(signed_area_2d(&points));
        Self {
            points,
            closed,
            orientation,
            isovalue,
        }
    }

    #[must_use]
    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    /// True for a loop, false for a polyline ending on the grid boundary.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    #[must_use]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// The level this contour was extracted at.
    #[must_use]
    pub fn isovalue(&self) -> f64 {
        self.isovalue
    }

    /// Number of segments: `n` for a closed contour, `n - 1` for an open one.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        if self.closed {
            self.points.len()
        } else {
            self.points.len().saturating_sub(1)
        }
    }

    /// Iterates over consecutive point pairs, including the closing pair.
    pub fn segments(&self) -> impl Iterator<Item = (Point2, Point2)> + '_ {
        let n = self.points.len();
        (0..self.edge_count()).map(move |i| (self.points[i], self.points[(i + 1) % n]))
    }
}

/// Serialized shape of a [`Contour`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ContourDocument {
    points: Vec<Point2>,
    closed: bool,
    orientation: Orientation,
    isovalue: f64,
}

impl TryFrom<ContourDocument> for Contour {
    type Error = FormatError;

    fn try_from(doc: ContourDocument) -> Result<Self, Self::Error> {
        if let Some(index) = doc
            .points
            .iter()
            .position(|p| !p.x.is_finite() || !p.y.is_finite())
        {
            return Err(FormatError::NonFinitePoint { index });
        }
        let (kind, min) = if doc.closed { ("closed", 3) } else { ("open", 2) };
        if doc.points.len() < min {
            return Err(FormatError::TooFewContourPoints {
                kind,
                min,
                found: doc.points.len(),
            });
        }
        if !doc.isovalue.is_finite() {
            return Err(FormatError::NonFiniteIsovalue);
        }
        let contour = Contour::new(doc.points, doc.closed, doc.isovalue);
        if contour.orientation != doc.orientation {
            return Err(FormatError::OrientationMismatch {
                declared: doc.orientation.sign(),
                winding: contour.orientation.sign(),
            });
        }
        Ok(contour)
    }
}

impl From<Contour> for ContourDocument {
    fn from(contour: Contour) -> Self {
        Self {
            points: contour.points,
            closed: contour.closed,
            orientation: contour.orientation,
            isovalue: contour.isovalue,
        }
    }
}

/// Ordered collection of contours produced by one extraction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContourSet {
    contours: Vec<Contour>,
}

impl ContourSet {
    #[must_use]
    pub fn new(contours: Vec<Contour>) -> Self {
        Self { contours }
    }

    /// True when the field has no isovalue crossings. This is a valid result.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contours.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.contours.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Contour> {
        self.contours.iter()
    }

    #[must_use]
    pub fn contours(&self) -> &[Contour] {
        &self.contours
    }

    /// Sum of [`Contour::edge_count`] over all contours.
    #[must_use]
    pub fn total_edge_count(&self) -> usize {
        self.contours.iter().map(Contour::edge_count).sum()
    }
}

impl<'a> IntoIterator for &'a ContourSet {
    type Item = &'a Contour;
    type IntoIter = std::slice::Iter<'a, Contour>;

    fn into_iter(self) -> Self::IntoIter {
        self.contours.iter()
    }
}
