//! Binding of property include files to the run's grid.
//!
//! Each candidate ends in exactly one of two outcomes: bound, or skipped
//! with a reason. Failures that are not a property of the file's content
//! come back as `BindError` and are not absorbed here.
use crate::error::{BindError, PropertyParseError};
use crate::grid::Grid;
use crate::keyword::{read_keyword, KeywordPolicy, KeywordScan, MAX_LINE_BYTES};
use crate::property::{parse_property, GridProperty};
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// No keyword line in the scanned window.
    EmptyKeyword,
    NotText,
    /// A line before the keyword exceeds the scan limit. `line` is 1-based.
    LineTooLong { line: usize },
    Malformed {
        keyword: String,
        error: PropertyParseError,
    },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::EmptyKeyword => write!(f, "found no keyword, file is probably empty"),
            SkipReason::NotText => write!(f, "file is not text"),
            SkipReason::LineTooLong { line } => {
                write!(f, "line {line} is longer than {MAX_LINE_BYTES} bytes")
            }
            SkipReason::Malformed { keyword, error } => {
                write!(f, "could not read {keyword:?}: {error}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BindOutcome {
    Bound(GridProperty),
    Skipped(SkipReason),
}

/// Load one property candidate against `grid`.
pub fn bind_property(
    path: &Path,
    grid: &Grid,
    policy: KeywordPolicy,
) -> Result<BindOutcome, BindError> {
    let io_error = |source: io::Error| BindError::Io {
        path: path.to_path_buf(),
        source,
    };

    let keyword = match read_keyword(path, policy).map_err(io_error)? {
        KeywordScan::Keyword(keyword) => keyword,
        KeywordScan::NotText => return Ok(skip(path, SkipReason::NotText)),
        KeywordScan::LineTooLong { line } => {
            return Ok(skip(path, SkipReason::LineTooLong { line }));
        }
    };
    tracing::debug!(path = %path.display(), keyword = %keyword, "property keyword");
    if keyword.is_empty() {
        return Ok(skip(path, SkipReason::EmptyKeyword));
    }

    let bytes = fs::read(path).map_err(io_error)?;
    let Ok(text) = String::from_utf8(bytes) else {
        return Ok(skip(path, SkipReason::NotText));
    };
    match parse_property(&text, &keyword, grid, path.to_path_buf()) {
        Ok(property) => Ok(BindOutcome::Bound(property)),
        Err(error) => Ok(skip(path, SkipReason::Malformed { keyword, error })),
    }
}

fn skip(path: &Path, reason: SkipReason) -> BindOutcome {
    tracing::warn!(path = %path.display(), "skipping property file: {reason}");
    BindOutcome::Skipped(reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GrdeclError;
    use crate::grid::{box_grid_grdecl, load_grid};
    use std::path::PathBuf;

    struct Fixture {
        _dir: tempfile::TempDir,
        root: PathBuf,
        grid: Grid,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().expect("temp dir");
        let root = dir.path().to_path_buf();
        let grid_path = root.join("GRID-0.grdecl");
        fs::write(&grid_path, box_grid_grdecl(2, 2, 1)).expect("write grid");
        let grid = load_grid(&grid_path).expect("load grid");
        Fixture {
            _dir: dir,
            root,
            grid,
        }
    }

    fn write(fixture: &Fixture, name: &str, contents: &[u8]) -> PathBuf {
        let path = fixture.root.join(name);
        fs::write(&path, contents).expect("write property");
        path
    }

    #[test]
    fn binds_property_to_grid() {
        let fx = fixture();
        let path = write(&fx, "poro.grdecl", b"ECHO\nPORO\n0.1 0.2 0.3 0.4 /\n");
        let outcome = bind_property(&path, &fx.grid, KeywordPolicy::WholeLine).expect("bind");
        let BindOutcome::Bound(property) = outcome else {
            panic!("expected bound property, got {outcome:?}");
        };
        assert_eq!(property.name, "PORO");
        assert_eq!(property.grid_name, "GRID.grdecl");
        assert_eq!(property.values.len(), 4);
    }

    #[test]
    fn echo_only_file_is_skipped_as_empty() {
        let fx = fixture();
        let path = write(&fx, "echo.grdecl", b"ECHO\n-- nothing here\nNOECHO\n");
        let outcome = bind_property(&path, &fx.grid, KeywordPolicy::WholeLine).expect("bind");
        assert_eq!(outcome, BindOutcome::Skipped(SkipReason::EmptyKeyword));
    }

    #[test]
    fn malformed_values_are_skipped() {
        let fx = fixture();
        let path = write(&fx, "permx.grdecl", b"PERMX\n1 2 x 4 /\n");
        let outcome = bind_property(&path, &fx.grid, KeywordPolicy::WholeLine).expect("bind");
        let BindOutcome::Skipped(SkipReason::Malformed { keyword, error }) = outcome else {
            panic!("expected malformed skip, got {outcome:?}");
        };
        assert_eq!(keyword, "PERMX");
        assert!(matches!(
            error,
            PropertyParseError::Grdecl(GrdeclError::InvalidValue { .. })
        ));
    }

    #[test]
    fn oversized_repeat_count_is_skipped_not_fatal() {
        let fx = fixture();
        for (name, contents) in [
            ("huge.grdecl", &b"PORO\n2000000000000000000*0.1 /\n"[..]),
            ("wrap.grdecl", &b"PORO\n1*0.1 18446744073709551615*0.1 /\n"[..]),
        ] {
            let path = write(&fx, name, contents);
            let outcome =
                bind_property(&path, &fx.grid, KeywordPolicy::WholeLine).expect("bind");
            let BindOutcome::Skipped(SkipReason::Malformed { keyword, error }) = outcome else {
                panic!("expected malformed skip for {name}, got {outcome:?}");
            };
            assert_eq!(keyword, "PORO");
            assert!(matches!(
                error,
                PropertyParseError::Grdecl(GrdeclError::TooManyValues { limit: 4, .. })
            ));
        }
    }

    #[test]
    fn single_line_property_is_skipped_as_too_long() {
        let fx = fixture();
        let contents = format!("PORO{} /\n", " 0.25".repeat(MAX_LINE_BYTES / 4));
        let path = write(&fx, "oneline.grdecl", contents.as_bytes());
        let outcome = bind_property(&path, &fx.grid, KeywordPolicy::WholeLine).expect("bind");
        assert_eq!(
            outcome,
            BindOutcome::Skipped(SkipReason::LineTooLong { line: 1 })
        );
    }

    #[test]
    fn binary_file_is_skipped() {
        let fx = fixture();
        let path = write(&fx, "blob.grdecl", &[0x00, 0xc3, 0x28, b'\n']);
        let outcome = bind_property(&path, &fx.grid, KeywordPolicy::WholeLine).expect("bind");
        assert_eq!(outcome, BindOutcome::Skipped(SkipReason::NotText));
    }

    #[test]
    fn whole_line_keyword_with_trailing_comment_binds() {
        let fx = fixture();
        let path = write(&fx, "ntg.grdecl", b"NTG -- net to gross\n4*1.0 /\n");
        let outcome = bind_property(&path, &fx.grid, KeywordPolicy::WholeLine).expect("bind");
        let BindOutcome::Bound(property) = outcome else {
            panic!("expected bound property, got {outcome:?}");
        };
        assert_eq!(property.name, "NTG -- net to gross");
    }

    #[test]
    fn first_token_policy_names_property_by_keyword() {
        let fx = fixture();
        let path = write(&fx, "ntg.grdecl", b"NTG -- net to gross\n4*1.0 /\n");
        let outcome = bind_property(&path, &fx.grid, KeywordPolicy::FirstToken).expect("bind");
        let BindOutcome::Bound(property) = outcome else {
            panic!("expected bound property, got {outcome:?}");
        };
        assert_eq!(property.name, "NTG");
    }

    #[test]
    fn unreadable_path_is_an_error() {
        let fx = fixture();
        let err = bind_property(&fx.root.join("gone.grdecl"), &fx.grid, KeywordPolicy::WholeLine)
            .unwrap_err();
        assert!(matches!(err, BindError::Io { .. }));
    }
}
