use anyhow::{anyhow, Context, Result};
use clap::Parser;
use serde::Serialize;
use std::path::Path;

mod batch;
mod binder;
mod cli;
mod config;
mod egrid;
mod error;
mod export;
mod grdecl;
mod grid;
mod keyword;
mod logging;
mod property;
mod util;

use batch::{include_root, run_batch, BatchSummary};
use cli::Args;
use export::{
    export_grid, ArchiveExporter, Collision, ExportRecord, EGRID_TAG, GRDECL_GRID_TAG,
};

/// Everything one run exported, written with `--summary-json`.
#[derive(Debug, Serialize)]
struct RunReport {
    grid: ExportRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    egrid: Option<ExportRecord>,
    properties: BatchSummary,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    collisions: Vec<Collision>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(&logging::LogSettings::default())?;
    run(&args)
}

fn run(args: &Args) -> Result<()> {
    let config = config::load_config(&args.config_path)?;
    let mut exporter = ArchiveExporter::new(&config);
    tracing::debug!(
        results = %exporter.results_dir().display(),
        "export destination"
    );

    let grid = grid::load_grid(&args.grdecl_grid)
        .with_context(|| format!("load grid {}", args.grdecl_grid.display()))?;
    let grid_record = export_grid(&mut exporter, &grid, GRDECL_GRID_TAG)
        .with_context(|| format!("export grid {}", grid.name))?;

    let egrid_record = if args.export_egrid {
        Some(export_egrid(&args.datafile, &mut exporter)?)
    } else {
        None
    };

    let root = include_root(&args.datafile);
    let properties = run_batch(&root, &grid, config.export.keyword_policy, &mut exporter)?;

    if let Some(path) = &args.summary_json {
        let report = RunReport {
            grid: grid_record,
            egrid: egrid_record,
            properties,
            collisions: exporter.collisions().to_vec(),
        };
        write_json(path, &report).with_context(|| format!("write summary {}", path.display()))?;
    }
    Ok(())
}

fn export_egrid(datafile: &Path, exporter: &mut ArchiveExporter) -> Result<ExportRecord> {
    let path = egrid::egrid_path_for(datafile)
        .ok_or_else(|| anyhow!("datafile {} has no .DATA extension", datafile.display()))?;
    let grid = egrid::load_egrid(&path)?;
    let record = export_grid(exporter, &grid, EGRID_TAG)
        .with_context(|| format!("export egrid {}", grid.name))?;
    Ok(record)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)?;
    Ok(())
}
