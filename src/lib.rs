pub mod contour;
pub mod error;
pub mod field;
pub mod graph;
pub mod io;
pub mod math;
pub mod params;
pub mod path;
pub mod pipeline;
pub mod stitch;

pub use contour::{Contour, ContourSet, ExtractContours, Orientation};
pub use error::{IsoloopError, Result};
pub use field::ScalarField;
pub use graph::{BuildContourGraph, ContourGraph};
pub use params::{ExtractParams, FinalizeParams, PipelineParams, StitchParams, StitchStrategy};
pub use path::{Cycle, FinalizePath};
pub use pipeline::{Pipeline, PipelineFailure, PipelineOutput};
pub use stitch::{Bridge, BridgeIndex, StitchCycles, StitchReport};
