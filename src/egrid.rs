//! Reader for binary EGRID files written by the simulator.
//!
//! EGRID is Fortran-unformatted and big-endian. Every record is framed by
//! its byte length on both sides; a keyword is a 16-byte header record
//! (8-char name, element count, 4-char type) followed by data records that
//! together hold `count` elements.
use crate::error::GridError;
use crate::grid::{Dimensions, Grid};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const HEADER_LEN: usize = 16;

#[derive(Debug, Clone, PartialEq)]
enum Values {
    Int(Vec<i32>),
    Float(Vec<f64>),
    Skipped,
}

#[derive(Debug, Clone, PartialEq)]
struct Keyword {
    name: String,
    values: Values,
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.pos)
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], String> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| format!("truncated record at byte {}", self.pos))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn marker(&mut self) -> Result<usize, String> {
        let raw = self.take(4)?;
        let value = i32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]);
        usize::try_from(value).map_err(|_| format!("negative record length {value}"))
    }

    /// One framed record payload.
    fn record(&mut self) -> Result<&'a [u8], String> {
        let start = self.pos;
        let len = self.marker()?;
        let payload = self.take(len)?;
        let trailer = self.marker()?;
        if trailer != len {
            return Err(format!(
                "record at byte {start}: head length {len} does not match tail length {trailer}"
            ));
        }
        Ok(payload)
    }
}

fn element_size(kind: &str) -> Result<usize, String> {
    match kind {
        "INTE" | "REAL" | "LOGI" => Ok(4),
        "DOUB" | "CHAR" => Ok(8),
        "MESS" => Ok(0),
        _ => match kind.strip_prefix('C') {
            Some(width) => width
                .parse::<usize>()
                .map_err(|_| format!("unknown element type {kind:?}")),
            None => Err(format!("unknown element type {kind:?}")),
        },
    }
}

fn decode(kind: &str, data: &[u8]) -> Values {
    match kind {
        "INTE" | "LOGI" => Values::Int(
            data.chunks_exact(4)
                .map(|c| i32::from_be_bytes([c[0], c[1], c[2], c[3]]))
                .collect(),
        ),
        "REAL" => Values::Float(
            data.chunks_exact(4)
                .map(|c| f64::from(f32::from_be_bytes([c[0], c[1], c[2], c[3]])))
                .collect(),
        ),
        "DOUB" => Values::Float(
            data.chunks_exact(8)
                .map(|c| f64::from_be_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]))
                .collect(),
        ),
        _ => Values::Skipped,
    }
}

fn read_keyword(cursor: &mut Cursor<'_>) -> Result<Keyword, String> {
    let header = cursor.record()?;
    if header.len() != HEADER_LEN {
        return Err(format!(
            "expected a {HEADER_LEN}-byte keyword header, found {} bytes",
            header.len()
        ));
    }
    let name = String::from_utf8_lossy(&header[0..8]).trim_end().to_string();
    let count = i32::from_be_bytes([header[8], header[9], header[10], header[11]]);
    let count = usize::try_from(count).map_err(|_| format!("{name}: negative count {count}"))?;
    let kind = String::from_utf8_lossy(&header[12..16]).to_string();
    let size = element_size(&kind).map_err(|err| format!("{name}: {err}"))?;
    let expected = count
        .checked_mul(size)
        .ok_or_else(|| format!("{name}: {count} elements overflow"))?;

    let mut data = Vec::with_capacity(expected.min(cursor.remaining()));
    while data.len() < expected {
        let block = cursor.record()?;
        data.extend_from_slice(block);
    }
    if data.len() != expected {
        return Err(format!(
            "{name}: expected {expected} data bytes, found {}",
            data.len()
        ));
    }

    Ok(Keyword {
        values: decode(&kind, &data),
        name,
    })
}

/// Keywords of the main grid, up to the first `ENDGRID`.
fn read_main_grid(bytes: &[u8]) -> Result<Vec<Keyword>, String> {
    let mut cursor = Cursor::new(bytes);
    let mut keywords = Vec::new();
    while !cursor.at_end() {
        let keyword = read_keyword(&mut cursor)?;
        if keyword.name == "ENDGRID" {
            break;
        }
        keywords.push(keyword);
    }
    Ok(keywords)
}

/// Load the main grid of an EGRID file.
pub fn load_egrid(path: &Path) -> Result<Grid, GridError> {
    let bytes = fs::read(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => GridError::NotFound {
            path: path.to_path_buf(),
        },
        _ => GridError::Read {
            path: path.to_path_buf(),
            source,
        },
    })?;
    let invalid = |message: String| GridError::Invalid {
        path: path.to_path_buf(),
        message,
    };
    let keywords = read_main_grid(&bytes).map_err(invalid)?;

    let find = |name: &'static str| keywords.iter().find(|keyword| keyword.name == name);
    let ints = |name: &'static str| match find(name).map(|keyword| &keyword.values) {
        Some(Values::Int(values)) => Ok(Some(values.clone())),
        Some(_) => Err(invalid(format!("{name} is not an integer array"))),
        None => Ok(None),
    };
    let floats = |name: &'static str| match find(name).map(|keyword| &keyword.values) {
        Some(Values::Float(values)) => Ok(values.clone()),
        Some(_) => Err(invalid(format!("{name} is not a floating point array"))),
        None => Err(GridError::MissingKeyword {
            path: path.to_path_buf(),
            keyword: name,
        }),
    };

    let head = ints("GRIDHEAD")?.ok_or_else(|| GridError::MissingKeyword {
        path: path.to_path_buf(),
        keyword: "GRIDHEAD",
    })?;
    let dim = |idx: usize| {
        head.get(idx)
            .and_then(|value| usize::try_from(*value).ok())
            .ok_or_else(|| invalid("GRIDHEAD is too short".to_string()))
    };
    let dimensions = Dimensions {
        nx: dim(1)?,
        ny: dim(2)?,
        nz: dim(3)?,
    };

    let grid = Grid::from_parts(
        path,
        dimensions,
        floats("COORD")?,
        floats("ZCORN")?,
        ints("ACTNUM")?,
    )?;
    tracing::info!(
        path = %path.display(),
        name = %grid.name,
        nx = grid.dimensions.nx,
        ny = grid.dimensions.ny,
        nz = grid.dimensions.nz,
        "loaded egrid"
    );
    Ok(grid)
}

/// The EGRID written next to a `.DATA` deck.
pub fn egrid_path_for(datafile: &Path) -> Option<PathBuf> {
    match datafile.extension() {
        Some(ext) if ext == "DATA" => Some(datafile.with_extension("EGRID")),
        _ => None,
    }
}
