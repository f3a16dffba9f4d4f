//! Shared test infrastructure for integration tests.
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// A scratch FMU-style case: deck, grid, config and an export root.
pub struct Case {
    pub temp_dir: TempDir,
    pub datafile: PathBuf,
    pub config: PathBuf,
    pub grid: PathBuf,
    pub out_root: PathBuf,
}

impl Case {
    /// Deck at `eclipse/model/DROGON-0.DATA`, a 2x1x1 grid at
    /// `rms/output/grid/GEO-0.grdecl`, and a config exporting under `out/`.
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("create temp dir");
        let root = temp_dir.path().to_path_buf();
        let datafile = root.join("eclipse/model/DROGON-0.DATA");
        write(&datafile, "RUNSPEC\n");
        let grid = root.join("rms/output/grid/GEO-0.grdecl");
        write(&grid, &box_grid_grdecl(2, 1, 1));
        let out_root = root.join("out");
        let config = root.join("fmuconfig/output/global_variables.yml");
        write(&config, &config_yaml(&out_root));
        Self {
            temp_dir,
            datafile,
            config,
            grid,
            out_root,
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write a file under the deck's include root (`eclipse/`).
    pub fn include(&self, rel: &str, contents: &[u8]) -> PathBuf {
        let path = self.root().join("eclipse").join(rel);
        write_bytes(&path, contents);
        path
    }

    pub fn results_dir(&self) -> PathBuf {
        self.out_root.join("share/results/grids")
    }

    /// Sorted file names in the results directory, sidecars included.
    pub fn result_files(&self) -> Vec<String> {
        let Ok(entries) = fs::read_dir(self.results_dir()) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .map(|entry| {
                entry
                    .expect("read dir entry")
                    .file_name()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect();
        names.sort();
        names
    }

    /// Exported data files only.
    pub fn data_files(&self) -> Vec<String> {
        self.result_files()
            .into_iter()
            .filter(|name| !name.starts_with('.'))
            .collect()
    }

    pub fn run(&self, extra: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_grid-export"))
            .current_dir(self.root())
            .env("GRID_EXPORT_LOG", "debug")
            .env_remove("RUST_LOG")
            .arg(&self.datafile)
            .arg(&self.config)
            .arg(&self.grid)
            .args(extra)
            .output()
            .expect("run grid-export")
    }
}

pub fn config_yaml(out_root: &Path) -> String {
    format!(
        "global:\n  dates: []\nmodel:\n  name: drogon\n  revision: 21.0.0\nmasterdata:\n  smda:\n    field: DROGON\naccess:\n  asset:\n    name: Drogon\nexport:\n  root: '{}'\n",
        out_root.display()
    )
}

pub fn write(path: &Path, contents: &str) {
    write_bytes(path, contents.as_bytes());
}

pub fn write_bytes(path: &Path, contents: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent directory");
    }
    fs::write(path, contents).expect("write file");
}

/// Corner-point box grid in GRDECL text with unit cells.
pub fn box_grid_grdecl(nx: usize, ny: usize, nz: usize) -> String {
    let mut text = format!("SPECGRID\n {nx} {ny} {nz} 1 F /\n\nCOORD\n");
    for j in 0..=ny {
        for i in 0..=nx {
            text.push_str(&format!("{i} {j} 0 {i} {j} {nz}\n"));
        }
    }
    text.push_str("/\n\nZCORN\n");
    let layer = 4 * nx * ny;
    for k in 0..nz {
        text.push_str(&format!("{layer}*{k} {layer}*{}\n", k + 1));
    }
    text.push_str(&format!("/\n\nACTNUM\n{}*1 /\n", nx * ny * nz));
    text
}

fn frame(out: &mut Vec<u8>, payload: &[u8]) {
    let len = i32::try_from(payload.len()).expect("record length");
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(payload);
    out.extend_from_slice(&len.to_be_bytes());
}

fn keyword(out: &mut Vec<u8>, name: &str, count: usize, kind: &str) {
    let mut payload = format!("{name:<8}").into_bytes();
    payload.extend_from_slice(&i32::try_from(count).expect("count").to_be_bytes());
    payload.extend_from_slice(kind.as_bytes());
    frame(out, &payload);
}

/// Big-endian EGRID bytes for an `nx` x `ny` x `nz` box.
pub fn box_egrid(nx: usize, ny: usize, nz: usize) -> Vec<u8> {
    let mut out = Vec::new();
    let head: Vec<i32> = [1, nx, ny, nz]
        .iter()
        .map(|v| i32::try_from(*v).expect("dimension"))
        .collect();
    keyword(&mut out, "GRIDHEAD", head.len(), "INTE");
    frame(
        &mut out,
        &head.iter().flat_map(|v| v.to_be_bytes()).collect::<Vec<u8>>(),
    );
    for (name, len) in [
        ("COORD", (nx + 1) * (ny + 1) * 6),
        ("ZCORN", nx * ny * nz * 8),
    ] {
        keyword(&mut out, name, len, "REAL");
        let payload: Vec<u8> = (0..len).flat_map(|_| 1.0_f32.to_be_bytes()).collect();
        frame(&mut out, &payload);
    }
    keyword(&mut out, "ENDGRID", 0, "INTE");
    out
}
