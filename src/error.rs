use thiserror::Error;

/// Top-level error type for the isoloop pipeline.
#[derive(Debug, Error)]
pub enum IsoloopError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    OutOfRange(#[from] OutOfRangeError),

    #[error(transparent)]
    Stitch(#[from] StitchError),

    #[error(transparent)]
    Traversal(#[from] TraversalInvariantError),
}

/// Malformed or missing field input (and other artifact documents).
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("grid must be at least 2x2 with an addressable node count, got {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("expected {expected} samples, found {found}")]
    SampleCountMismatch { expected: usize, found: usize },

    #[error("sample {index} is not finite")]
    NonFiniteSample { index: usize },

    #[error("grid spacing must be finite and positive, got {0}")]
    InvalidSpacing(f64),

    #[error("isovalue is not finite")]
    NonFiniteIsovalue,

    #[error("contour point {index} is not finite")]
    NonFinitePoint { index: usize },

    #[error("{kind} contour needs at least {min} points, found {found}")]
    TooFewContourPoints {
        kind: &'static str,
        min: usize,
        found: usize,
    },

    #[error("contour declares orientation {declared} but its points wind as {winding}")]
    OrientationMismatch { declared: i8, winding: i8 },

    #[error("cycle document is marked open")]
    OpenCycle,

    #[error("resample spacing must be finite and positive, got {0}")]
    InvalidResampleSpacing(f64),

    #[error("resample spacing {spacing} would place more than {limit} points on a loop of length {length}")]
    ResampleTooFine {
        spacing: f64,
        length: f64,
        limit: usize,
    },
}

/// A sampling query outside the grid.
#[derive(Debug, Error)]
#[error("sample position ({x}, {y}) is outside the {width}x{height} grid")]
pub struct OutOfRangeError {
    pub x: f64,
    pub y: f64,
    pub width: usize,
    pub height: usize,
}

/// Stitching could not join the remaining components.
#[derive(Debug, Error)]
pub enum StitchError {
    #[error("no bridge candidate left while {components} components remain")]
    NoBridgeCandidate { components: usize },

    #[error("spatial index construction failed: {0}")]
    Index(String),

    #[error("malformed contour graph: {0}")]
    MalformedGraph(String),
}

/// The Eulerian traversal of the stitched graph violated an invariant.
#[derive(Debug, Error)]
pub enum TraversalInvariantError {
    #[error("vertex {vertex} has {incoming} incoming and {outgoing} outgoing edges")]
    UnbalancedVertex {
        vertex: usize,
        incoming: usize,
        outgoing: usize,
    },

    #[error("traversal visited {visited} edges before returning, expected {expected}")]
    NotClosed { visited: usize, expected: usize },

    #[error("edge {edge} was traversed {count} times")]
    EdgeVisitCount { edge: usize, count: usize },

    #[error("{forward} forward bridge edges but {backward} return bridge edges")]
    BridgePairMismatch { forward: usize, backward: usize },

    #[error("graph still has {components} components")]
    Disconnected { components: usize },
}

/// Convenience type alias for results using [`IsoloopError`].
pub type Result<T> = std::result::Result<T, IsoloopError>;
