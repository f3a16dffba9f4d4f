//! Metadata sidecar written next to each exported artifact.
use crate::config::ModelConfig;
use crate::grid::Dimensions;
use crate::property::Statistics;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub(super) struct ArtifactMetadata<'a> {
    pub(super) name: &'a str,
    pub(super) tagname: &'a str,
    pub(super) content: &'static str,
    pub(super) format: &'static str,
    pub(super) source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) grid: Option<&'a str>,
    pub(super) dimensions: DimensionsMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) statistics: Option<StatisticsMetadata>,
    pub(super) checksum_sha256: String,
    pub(super) model: &'a ModelConfig,
    #[serde(skip_serializing_if = "is_null")]
    pub(super) masterdata: &'a serde_yaml::Value,
    #[serde(skip_serializing_if = "is_null")]
    pub(super) access: &'a serde_yaml::Value,
}

#[derive(Debug, Serialize)]
pub(super) struct DimensionsMetadata {
    ncol: usize,
    nrow: usize,
    nlay: usize,
}

impl From<Dimensions> for DimensionsMetadata {
    fn from(dimensions: Dimensions) -> Self {
        Self {
            ncol: dimensions.nx,
            nrow: dimensions.ny,
            nlay: dimensions.nz,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct StatisticsMetadata {
    min: f64,
    max: f64,
    mean: f64,
}

impl From<Statistics> for StatisticsMetadata {
    fn from(stats: Statistics) -> Self {
        Self {
            min: stats.min,
            max: stats.max,
            mean: stats.mean,
        }
    }
}

fn is_null(value: &&serde_yaml::Value) -> bool {
    value.is_null()
}
