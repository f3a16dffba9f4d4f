//! Export sink contract and artifact naming.
//!
//! The grid loader and the batch driver only see `ExportSink`; how artifacts
//! are stored, and what metadata goes with them, belongs to the sink.
mod archive;
mod metadata;

pub use archive::{ArchiveExporter, Collision};

use crate::error::ExportError;
use crate::grid::Grid;
use crate::property::GridProperty;
use serde::Serialize;
use std::path::PathBuf;

/// Tag for a grid read from the simulator's EGRID output.
pub const EGRID_TAG: &str = "egrid";
/// Tag for the GRDECL grid that properties are bound to.
pub const GRDECL_GRID_TAG: &str = "grdecl_grid";

/// Tag for properties bound to the grid named `grid_name`.
pub fn property_tag(grid_name: &str) -> String {
    format!("{grid_name}_{GRDECL_GRID_TAG}")
}

#[derive(Debug, Clone, Copy)]
pub enum Artifact<'a> {
    Grid(&'a Grid),
    Property(&'a GridProperty),
}

impl Artifact<'_> {
    pub fn kind(&self) -> &'static str {
        match self {
            Artifact::Grid(_) => "grid",
            Artifact::Property(_) => "property",
        }
    }
}

/// Destination for exported artifacts.
pub trait ExportSink {
    /// Persist `artifact` under (`name`, `tagname`) and return where it went.
    fn export(
        &mut self,
        artifact: Artifact<'_>,
        name: &str,
        tagname: &str,
    ) -> Result<PathBuf, ExportError>;
}

/// What was handed to the sink, and where it ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRecord {
    pub name: String,
    pub tagname: String,
    pub kind: &'static str,
    pub location: PathBuf,
}

fn export_named(
    sink: &mut dyn ExportSink,
    artifact: Artifact<'_>,
    name: &str,
    tagname: &str,
) -> Result<ExportRecord, ExportError> {
    let location = sink.export(artifact, name, tagname)?;
    tracing::info!(artifact = name, tagname, "Exported to {}", location.display());
    Ok(ExportRecord {
        name: name.to_string(),
        tagname: tagname.to_string(),
        kind: artifact.kind(),
        location,
    })
}

/// Export a grid under its normalized name.
pub fn export_grid(
    sink: &mut dyn ExportSink,
    grid: &Grid,
    tagname: &str,
) -> Result<ExportRecord, ExportError> {
    export_named(sink, Artifact::Grid(grid), &grid.name, tagname)
}

/// Export a bound property under its keyword, tagged with its grid.
pub fn export_property(
    sink: &mut dyn ExportSink,
    property: &GridProperty,
) -> Result<ExportRecord, ExportError> {
    let tagname = property_tag(&property.grid_name);
    export_named(sink, Artifact::Property(property), &property.name, &tagname)
}

/// Sink that remembers calls instead of writing anything.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct MemorySink {
    pub(crate) calls: Vec<(String, String, &'static str)>,
}

#[cfg(test)]
impl ExportSink for MemorySink {
    fn export(
        &mut self,
        artifact: Artifact<'_>,
        name: &str,
        tagname: &str,
    ) -> Result<PathBuf, ExportError> {
        self.calls
            .push((name.to_string(), tagname.to_string(), artifact.kind()));
        Ok(PathBuf::from(format!("memory://{name}--{tagname}")))
    }
}
