//! Grid property parsing.
use crate::error::PropertyParseError;
use crate::grdecl::{self, strip_comment};
use crate::grid::{Dimensions, Grid};
use std::path::PathBuf;

/// Per-cell values bound to a grid.
#[derive(Debug, Clone, PartialEq)]
pub struct GridProperty {
    pub name: String,
    pub grid_name: String,
    pub dimensions: Dimensions,
    pub values: Vec<f64>,
    pub source: PathBuf,
}

impl GridProperty {
    pub fn statistics(&self) -> Option<Statistics> {
        Statistics::of(&self.values)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Statistics {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl Statistics {
    /// Over finite values only; `None` when there are none.
    pub fn of(values: &[f64]) -> Option<Self> {
        let mut count = 0usize;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for value in values.iter().copied().filter(|value| value.is_finite()) {
            count += 1;
            sum += value;
            min = min.min(value);
            max = max.max(value);
        }
        (count > 0).then(|| Self {
            min,
            max,
            mean: sum / count as f64,
        })
    }
}

/// Whether `line` is the header for `keyword`.
///
/// Keywords recovered from whole lines match the line itself; bare keywords
/// match the first token.
fn is_header(line: &str, keyword: &str) -> bool {
    let line = line.strip_suffix('\r').unwrap_or(line);
    if line == keyword {
        return true;
    }
    strip_comment(line).split_whitespace().next() == Some(keyword)
}

/// Parse the values of `keyword` from GRDECL text, one value per grid cell.
pub fn parse_property(
    text: &str,
    keyword: &str,
    grid: &Grid,
    source: PathBuf,
) -> Result<GridProperty, PropertyParseError> {
    let header_index = text
        .lines()
        .position(|line| is_header(line, keyword))
        .ok_or_else(|| PropertyParseError::KeywordNotFound {
            keyword: keyword.to_string(),
        })?;
    let record = grdecl::read_block(text, header_index, keyword)?;
    let values = grdecl::float_values(&record, grid.cell_count())?;
    if values.len() != grid.cell_count() {
        return Err(PropertyParseError::CountMismatch {
            expected: grid.cell_count(),
            found: values.len(),
        });
    }

    Ok(GridProperty {
        name: keyword.to_string(),
        grid_name: grid.name.clone(),
        dimensions: grid.dimensions,
        values,
        source,
    })
}
