use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::contour::{ContourSet, ExtractContours};
use crate::error::IsoloopError;
use crate::field::ScalarField;
use crate::graph::BuildContourGraph;
use crate::params::PipelineParams;
use crate::path::{Cycle, FinalizePath};
use crate::stitch::{BridgeIndex, StitchCycles, StitchReport};

/// Artifacts of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineOutput {
    pub contours: ContourSet,
    pub cycle: Cycle,
    pub report: StitchReport,
}

/// A failed run. Failures after extraction keep the contour set so the
/// caller can inspect the geometry that could not be stitched.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct PipelineFailure {
    #[source]
    pub error: IsoloopError,
    pub contours: Option<ContourSet>,
}

impl PipelineFailure {
    fn new(error: impl Into<IsoloopError>, contours: Option<&ContourSet>) -> Self {
        Self {
            error: error.into(),
            contours: contours.cloned(),
        }
    }
}

/// Runs field -> contours -> graph -> stitched cycle.
pub struct Pipeline {
    params: PipelineParams,
}

impl Pipeline {
    /// Creates a new `Pipeline`.
    #[must_use]
    pub fn new(params: PipelineParams) -> Self {
        Self { params }
    }

    /// Executes the full run on `field`.
    ///
    /// A field without crossings gives an empty contour set and an empty
    /// cycle.
    ///
    /// # Errors
    ///
    /// Returns a [`PipelineFailure`] wrapping the first error. Stitch and
    /// traversal failures carry the extracted contours.
    pub fn execute(&self, field: &ScalarField) -> Result<PipelineOutput, PipelineFailure> {
        let contours = ExtractContours::new(self.params.extract)
            .execute(field)
            .map_err(|e| PipelineFailure::new(e, None))?;
        if contours.is_empty() {
            info!(isovalue = field.isovalue(), "no isovalue crossings");
            return Ok(PipelineOutput {
                contours,
                cycle: Cycle::new(Vec::new()),
                report: StitchReport::default(),
            });
        }

        let (cycle, report) = self
            .stitch(field, &contours)
            .map_err(|e| PipelineFailure::new(e, Some(&contours)))?;
        info!(
            contours = contours.len(),
            bridges = report.bridges.len(),
            points = cycle.points().len(),
            length = cycle.length(),
            "pipeline finished"
        );
        Ok(PipelineOutput {
            contours,
            cycle,
            report,
        })
    }

    fn stitch(
        &self,
        field: &ScalarField,
        contours: &ContourSet,
    ) -> crate::error::Result<(Cycle, StitchReport)> {
        let tolerance = self.params.extract.tolerance_fraction * field.spacing();
        let mut graph = BuildContourGraph::new(field.extent(), tolerance).execute(contours)?;
        let index = BridgeIndex::build(&graph)?;
        let report = StitchCycles::new(self.params.stitch).execute(&mut graph, &index)?;
        let cycle = FinalizePath::new(self.params.finalize).execute(&graph)?;
        Ok((cycle, report))
    }
}
