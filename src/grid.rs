//! Grid geometry loading and naming.
//!
//! A run loads exactly one grid. Every property exported afterwards is bound
//! to it, and its normalized name is the join key in the property tags.
use crate::error::GridError;
use crate::grdecl::{self, Record};
use regex::Regex;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
}

/// Largest accepted cell count; simulator cell indices are 32-bit.
const MAX_CELLS: usize = i32::MAX as usize;

/// Array lengths implied by a set of dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrayLengths {
    pub cells: usize,
    pub coord: usize,
    pub zcorn: usize,
}

impl Dimensions {
    /// Only meaningful for dimensions that passed `array_lengths`.
    pub fn cell_count(&self) -> usize {
        self.nx * self.ny * self.nz
    }

    /// Expected array lengths, or why the dimensions are unusable.
    pub fn array_lengths(&self) -> Result<ArrayLengths, String> {
        let shape = format!("{}x{}x{}", self.nx, self.ny, self.nz);
        match self.checked_lengths() {
            Some(lengths) if lengths.cells == 0 => {
                Err(format!("dimensions must be positive (got {shape})"))
            }
            Some(lengths) if lengths.cells <= MAX_CELLS => Ok(lengths),
            _ => Err(format!("{shape} exceeds {MAX_CELLS} cells")),
        }
    }

    fn checked_lengths(&self) -> Option<ArrayLengths> {
        let cells = self.nx.checked_mul(self.ny)?.checked_mul(self.nz)?;
        let coord = self
            .nx
            .checked_add(1)?
            .checked_mul(self.ny.checked_add(1)?)?
            .checked_mul(6)?;
        let zcorn = cells.checked_mul(8)?;
        Some(ArrayLengths {
            cells,
            coord,
            zcorn,
        })
    }
}

/// Corner-point grid geometry. Immutable after load.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub name: String,
    pub dimensions: Dimensions,
    pub coord: Vec<f64>,
    pub zcorn: Vec<f64>,
    pub actnum: Vec<i32>,
    pub source: PathBuf,
}

impl Grid {
    /// Assemble a grid, checking array lengths against the dimensions.
    ///
    /// A missing `actnum` marks every cell active.
    pub fn from_parts(
        source: &Path,
        dimensions: Dimensions,
        coord: Vec<f64>,
        zcorn: Vec<f64>,
        actnum: Option<Vec<i32>>,
    ) -> Result<Self, GridError> {
        let invalid = |message: String| GridError::Invalid {
            path: source.to_path_buf(),
            message,
        };
        let lengths = dimensions.array_lengths().map_err(invalid)?;
        if coord.len() != lengths.coord {
            return Err(invalid(format!(
                "COORD has {} values, expected {}",
                coord.len(),
                lengths.coord
            )));
        }
        if zcorn.len() != lengths.zcorn {
            return Err(invalid(format!(
                "ZCORN has {} values, expected {}",
                zcorn.len(),
                lengths.zcorn
            )));
        }
        let actnum = actnum.unwrap_or_else(|| vec![1; lengths.cells]);
        if actnum.len() != lengths.cells {
            return Err(invalid(format!(
                "ACTNUM has {} values, expected {}",
                actnum.len(),
                lengths.cells
            )));
        }

        Ok(Self {
            name: normalize_grid_name(&file_name(source)),
            dimensions,
            coord,
            zcorn,
            actnum,
            source: source.to_path_buf(),
        })
    }

    pub fn cell_count(&self) -> usize {
        self.dimensions.cell_count()
    }

    pub fn active_cell_count(&self) -> usize {
        self.actnum.iter().filter(|flag| **flag != 0).count()
    }
}

fn file_name(path: &Path) -> String {
    match path.file_name() {
        Some(name) => name.to_string_lossy().to_string(),
        None => path.display().to_string(),
    }
}

/// Drop the run index that realizations append to grid names.
///
/// `FIELD-3.EGRID` becomes `FIELD.EGRID`; names without a `-<digits>.`
/// segment are returned unchanged.
pub fn normalize_grid_name(name: &str) -> String {
    let run_index = Regex::new(r"-\d+\.").expect("regex for grid run index");
    run_index.replace_all(name, ".").into_owned()
}

/// Load a GRDECL grid (`SPECGRID`/`DIMENS`, `COORD`, `ZCORN`, optional `ACTNUM`).
pub fn load_grid(path: &Path) -> Result<Grid, GridError> {
    let bytes = fs::read(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => GridError::NotFound {
            path: path.to_path_buf(),
        },
        _ => GridError::Read {
            path: path.to_path_buf(),
            source,
        },
    })?;
    let text = String::from_utf8(bytes).map_err(|_| GridError::NotText {
        path: path.to_path_buf(),
    })?;
    let records = grdecl::read_records(&text).map_err(|source| GridError::Syntax {
        path: path.to_path_buf(),
        source,
    })?;

    let syntax = |source| GridError::Syntax {
        path: path.to_path_buf(),
        source,
    };
    let find = |keyword: &'static str| records.iter().find(|record| record.keyword == keyword);
    let required = |keyword: &'static str| {
        find(keyword).ok_or_else(|| GridError::MissingKeyword {
            path: path.to_path_buf(),
            keyword,
        })
    };

    let spec = find("SPECGRID")
        .or_else(|| find("DIMENS"))
        .ok_or_else(|| GridError::MissingKeyword {
            path: path.to_path_buf(),
            keyword: "SPECGRID",
        })?;
    let dimensions = read_dimensions(path, spec)?;
    let lengths = dimensions
        .array_lengths()
        .map_err(|message| GridError::Invalid {
            path: path.to_path_buf(),
            message,
        })?;
    let coord = grdecl::float_values(required("COORD")?, lengths.coord).map_err(syntax)?;
    let zcorn = grdecl::float_values(required("ZCORN")?, lengths.zcorn).map_err(syntax)?;
    let actnum = match find("ACTNUM") {
        Some(record) => Some(
            grdecl::int_values(record, lengths.cells)
                .map_err(syntax)?
                .into_iter()
                .map(|flag| i32::from(flag != 0))
                .collect(),
        ),
        None => None,
    };

    let grid = Grid::from_parts(path, dimensions, coord, zcorn, actnum)?;
    tracing::info!(
        path = %path.display(),
        name = %grid.name,
        nx = grid.dimensions.nx,
        ny = grid.dimensions.ny,
        nz = grid.dimensions.nz,
        active = grid.active_cell_count(),
        "loaded grid"
    );
    Ok(grid)
}

/// The first three `SPECGRID`/`DIMENS` items; the rest are flags.
fn read_dimensions(path: &Path, record: &Record) -> Result<Dimensions, GridError> {
    let leading = Record {
        tokens: record.tokens.iter().take(3).cloned().collect(),
        ..record.clone()
    };
    let values = grdecl::int_values(&leading, 3).map_err(|source| GridError::Syntax {
        path: path.to_path_buf(),
        source,
    })?;
    let dim = |idx: usize| -> Result<usize, GridError> {
        values
            .get(idx)
            .and_then(|value| usize::try_from(*value).ok())
            .ok_or_else(|| GridError::Invalid {
                path: path.to_path_buf(),
                message: format!("{} must start with nx ny nz", record.keyword),
            })
    };
    Ok(Dimensions {
        nx: dim(0)?,
        ny: dim(1)?,
        nz: dim(2)?,
    })
}

/// A regular box grid in GRDECL text, one unit per cell.
#[cfg(test)]
pub(crate) fn box_grid_grdecl(nx: usize, ny: usize, nz: usize) -> String {
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
