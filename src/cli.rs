//! CLI argument parsing for the grid export job.
use clap::Parser;
use std::path::PathBuf;

/// Export a GRDECL grid and every grid property include file beside a
/// simulation deck, each with a metadata sidecar.
#[derive(Parser, Debug)]
#[command(
    name = "grid-export",
    version,
    about = "Export grid data with metadata",
    after_help = "Property files are collected recursively from the grandparent directory of DATAFILE.\nSet GRID_EXPORT_LOG (or RUST_LOG) to change log verbosity; the default is debug.\n\nExample:\n  grid-export eclipse/model/DROGON-0.DATA ../../fmuconfig/output/global_variables.yml rms/output/grid/geogrid.grdecl"
)]
pub struct Args {
    /// Path to the simulation datafile
    #[arg(value_name = "DATAFILE")]
    pub datafile: PathBuf,

    /// Path to the export config (global variables YAML)
    #[arg(value_name = "CONFIG_PATH")]
    pub config_path: PathBuf,

    /// Path to the GRDECL grid the properties belong to
    #[arg(value_name = "GRDECL_GRID")]
    pub grdecl_grid: PathBuf,

    /// Also export the EGRID written next to the datafile
    #[arg(long)]
    pub export_egrid: bool,

    /// Write a JSON report of exported artifacts and skips
    #[arg(long, value_name = "PATH")]
    pub summary_json: Option<PathBuf>,
}
