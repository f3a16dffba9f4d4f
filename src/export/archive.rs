//! File archive sink: GRDECL data files plus YAML metadata sidecars.
//!
//! Layout under the export root:
//!
//! ```text
//! share/results/grids/<name>--<tagname>.grdecl
//! share/results/grids/.<name>--<tagname>.grdecl.yml
//! ```
//!
//! Stems are lowercased and made file-system safe. Files are replaced
//! atomically, so exporting the same (name, tagname) twice leaves one copy.
//! Distinct pairs can still share a stem (`PORO` and `poro`); the sidecar
//! records the exact pair, and replacing a different pair is logged and
//! kept as a `Collision`.
use super::metadata::{ArtifactMetadata, StatisticsMetadata};
use super::{Artifact, ExportSink};
use crate::config::{ExportConfig, ModelConfig};
use crate::error::ExportError;
use crate::grid::Grid;
use crate::property::GridProperty;
use crate::util::{safe_file_stem, sha256_hex};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

const RESULTS_DIR_REL: &str = "share/results/grids";
const VALUES_PER_LINE: usize = 6;

/// An export whose files replaced those of a different (name, tagname).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Collision {
    pub location: PathBuf,
    pub previous_name: String,
    pub previous_tagname: String,
    pub name: String,
    pub tagname: String,
}

/// The identifying part of an existing sidecar.
#[derive(Debug, Deserialize)]
struct SidecarIdentity {
    name: String,
    tagname: String,
}

#[derive(Debug)]
pub struct ArchiveExporter {
    results_dir: PathBuf,
    model: ModelConfig,
    masterdata: serde_yaml::Value,
    access: serde_yaml::Value,
    collisions: Vec<Collision>,
}

impl ArchiveExporter {
    pub fn new(config: &ExportConfig) -> Self {
        Self::with_root(&config.export_root(), config)
    }

    pub fn with_root(root: &Path, config: &ExportConfig) -> Self {
        Self {
            results_dir: root.join(RESULTS_DIR_REL),
            model: config.model.clone(),
            masterdata: config.masterdata.clone(),
            access: config.access.clone(),
            collisions: Vec::new(),
        }
    }

    pub fn results_dir(&self) -> &Path {
        &self.results_dir
    }

    pub fn collisions(&self) -> &[Collision] {
        &self.collisions
    }

    fn check_collision(&mut self, meta_path: &Path, location: &Path, name: &str, tagname: &str) {
        let Some(previous) = read_identity(meta_path) else {
            return;
        };
        if previous.name == name && previous.tagname == tagname {
            return;
        }
        tracing::warn!(
            location = %location.display(),
            previous_name = %previous.name,
            previous_tagname = %previous.tagname,
            "{name} ({tagname}) replaces a different artifact with the same file name"
        );
        self.collisions.push(Collision {
            location: location.to_path_buf(),
            previous_name: previous.name,
            previous_tagname: previous.tagname,
            name: name.to_string(),
            tagname: tagname.to_string(),
        });
    }

    fn metadata<'a>(
        &'a self,
        artifact: Artifact<'a>,
        name: &'a str,
        tagname: &'a str,
        data: &[u8],
    ) -> ArtifactMetadata<'a> {
        let (source, grid, dimensions, statistics) = match artifact {
            Artifact::Grid(grid) => (&grid.source, None, grid.dimensions, None),
            Artifact::Property(property) => (
                &property.source,
                Some(property.grid_name.as_str()),
                property.dimensions,
                property.statistics().map(StatisticsMetadata::from),
            ),
        };
        ArtifactMetadata {
            name,
            tagname,
            content: artifact.kind(),
            format: "grdecl",
            source: source.display().to_string(),
            grid,
            dimensions: dimensions.into(),
            statistics,
            checksum_sha256: sha256_hex(data),
            model: &self.model,
            masterdata: &self.masterdata,
            access: &self.access,
        }
    }
}

impl ExportSink for ArchiveExporter {
    fn export(
        &mut self,
        artifact: Artifact<'_>,
        name: &str,
        tagname: &str,
    ) -> Result<PathBuf, ExportError> {
        if name.trim().is_empty() {
            return Err(ExportError::EmptyName {
                kind: artifact.kind(),
            });
        }
        fs::create_dir_all(&self.results_dir).map_err(|source| ExportError::Write {
            path: self.results_dir.clone(),
            source,
        })?;

        let stem = safe_file_stem(&format!("{name}--{tagname}"));
        let data_path = self.results_dir.join(format!("{stem}.grdecl"));
        let meta_path = self.results_dir.join(format!(".{stem}.grdecl.yml"));
        self.check_collision(&meta_path, &data_path, name, tagname);

        let data = match artifact {
            Artifact::Grid(grid) => render_grid(grid),
            Artifact::Property(property) => render_property(property),
        };
        let metadata = self.metadata(artifact, name, tagname, data.as_bytes());
        let meta_text = serde_yaml::to_string(&metadata).map_err(|source| ExportError::Metadata {
            name: name.to_string(),
            source,
        })?;

        write_atomic(&data_path, data.as_bytes())?;
        write_atomic(&meta_path, meta_text.as_bytes())?;
        tracing::debug!(
            data = %data_path.display(),
            metadata = %meta_path.display(),
            "wrote artifact"
        );
        Ok(data_path)
    }
}

/// Identity recorded in an existing sidecar; `None` when absent or unreadable.
fn read_identity(meta_path: &Path) -> Option<SidecarIdentity> {
    let text = fs::read_to_string(meta_path).ok()?;
    serde_yaml::from_str(&text).ok()
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    let write_error = |source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    };
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_error)?;
    tmp.write_all(bytes).map_err(write_error)?;
    tmp.persist(path).map_err(|err| write_error(err.error))?;
    Ok(())
}

fn push_values<T: Display>(out: &mut String, keyword: &str, values: &[T]) {
    out.push_str(keyword);
    out.push('\n');
    for line in values.chunks(VALUES_PER_LINE) {
        let rendered: Vec<String> = line.iter().map(ToString::to_string).collect();
        out.push(' ');
        out.push_str(&rendered.join(" "));
        out.push('\n');
    }
    out.push_str("/\n\n");
}

fn render_grid(grid: &Grid) -> String {
    let dims = grid.dimensions;
    let mut out = format!(
        "-- {} exported from {}\nSPECGRID\n {} {} {} 1 F /\n\n",
        grid.name,
        grid.source.display(),
        dims.nx,
        dims.ny,
        dims.nz
    );
    push_values(&mut out, "COORD", &grid.coord);
    push_values(&mut out, "ZCORN", &grid.zcorn);
    push_values(&mut out, "ACTNUM", &grid.actnum);
    out
}

fn render_property(property: &GridProperty) -> String {
    let mut out = format!(
        "-- {} on {} exported from {}\n",
        property.name,
        property.grid_name,
        property.source.display()
    );
    push_values(&mut out, &property.name, &property.values);
    out
}
