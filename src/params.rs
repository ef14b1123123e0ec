//! Run configuration.
//!
//! Every struct implements `Default` and deserializes with `#[serde(default)]`,
//! so a partial JSON document only overrides the keys it names.

use serde::{Deserialize, Serialize};

/// Parameters controlling isocontour extraction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractParams {
    /// Point-merge tolerance as a fraction of the grid spacing.
    pub tolerance_fraction: f64,
    /// Closed contours with fewer distinct points are dropped as degenerate.
    pub min_closed_points: usize,
    /// Classify grid rows on the rayon thread pool.
    pub parallel: bool,
}

impl Default for ExtractParams {
    fn default() -> Self {
        Self {
            tolerance_fraction: 1e-6,
            min_closed_points: 3,
            parallel: true,
        }
    }
}

/// How disjoint components are merged into one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StitchStrategy {
    /// Splice a forward/return bridge pair between the nearest vertex pair.
    #[default]
    Bridge,
    /// Exchange the successors of two nearby edges, yielding a simple cycle.
    EdgeSwap,
}

/// Parameters controlling component stitching.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StitchParams {
    pub strategy: StitchStrategy,
    /// Skip bridge candidates whose segment crosses an existing edge.
    pub reject_crossing_bridges: bool,
}

impl Default for StitchParams {
    fn default() -> Self {
        Self {
            strategy: StitchStrategy::Bridge,
            reject_crossing_bridges: true,
        }
    }
}

/// Parameters for the final path post-process.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FinalizeParams {
    /// Resample the cycle to this arc-length spacing (world units).
    pub resample_spacing: Option<f64>,
}

/// Parameters for a full pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineParams {
    pub extract: ExtractParams,
    pub stitch: StitchParams,
    pub finalize: FinalizeParams,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn partial_document_keeps_defaults() {
        let params: PipelineParams =
            serde_json::from_str(r#"{"stitch":{"strategy":"edge_swap"}}"#).unwrap();
        assert_eq!(params.stitch.strategy, StitchStrategy::EdgeSwap);
        assert!(params.stitch.reject_crossing_bridges);
        assert_eq!(params.extract, ExtractParams::default());
        assert!(params.finalize.resample_spacing.is_none());
    }

    #[test]
    fn empty_document_is_default() {
        let params: PipelineParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params, PipelineParams::default());
    }
}
