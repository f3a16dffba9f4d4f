//! Line-oriented reader for GRDECL text.
//!
//! GRDECL files are sequences of keyword blocks: a keyword line followed by
//! whitespace-separated values closed by `/`. `--` starts a comment that runs
//! to the end of the line, and `n*v` repeats `v` `n` times.
use crate::error::GrdeclError;

/// Keywords that carry no value block.
const FLAG_KEYWORDS: &[&str] = &["ECHO", "NOECHO"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub line: usize,
}

/// One keyword block. `line` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub keyword: String,
    pub line: usize,
    pub tokens: Vec<Token>,
}

impl Record {
    fn new(keyword: &str, line: usize) -> Self {
        Self {
            keyword: keyword.to_string(),
            line,
            tokens: Vec::new(),
        }
    }
}

pub fn starts_with_letter(text: &str) -> bool {
    text.chars().next().is_some_and(|ch| ch.is_ascii_alphabetic())
}

pub fn strip_comment(line: &str) -> &str {
    match line.find("--") {
        Some(idx) => &line[..idx],
        None => line,
    }
}

/// Append a body token, returning true when it closes the block.
fn push_body_token(record: &mut Record, token: &str, line: usize) -> bool {
    match token.strip_suffix('/') {
        Some(body) => {
            if !body.is_empty() {
                record.tokens.push(Token {
                    text: body.to_string(),
                    line,
                });
            }
            true
        }
        None => {
            record.tokens.push(Token {
                text: token.to_string(),
                line,
            });
            false
        }
    }
}

/// Split GRDECL text into keyword blocks.
pub fn read_records(text: &str) -> Result<Vec<Record>, GrdeclError> {
    let mut records = Vec::new();
    let mut open: Option<Record> = None;

    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        for token in strip_comment(raw).split_whitespace() {
            if let Some(mut record) = open.take() {
                if push_body_token(&mut record, token, line) {
                    records.push(record);
                    // Anything after the terminator on this line is ignored.
                    break;
                }
                open = Some(record);
                continue;
            }
            if !starts_with_letter(token) {
                return Err(GrdeclError::UnexpectedToken {
                    line,
                    token: token.to_string(),
                });
            }
            if FLAG_KEYWORDS.contains(&token) {
                records.push(Record::new(token, line));
                continue;
            }
            open = Some(Record::new(token, line));
        }
    }

    match open {
        Some(record) => Err(GrdeclError::MissingTerminator {
            keyword: record.keyword,
        }),
        None => Ok(records),
    }
}

/// Read the value block that follows the header at `header_index` (0-based).
///
/// The rest of the header line is not part of the block.
pub fn read_block(
    text: &str,
    header_index: usize,
    keyword: &str,
) -> Result<Record, GrdeclError> {
    let mut record = Record::new(keyword, header_index + 1);
    for (idx, raw) in text.lines().enumerate().skip(header_index + 1) {
        for token in strip_comment(raw).split_whitespace() {
            if push_body_token(&mut record, token, idx + 1) {
                return Ok(record);
            }
        }
    }
    Err(GrdeclError::MissingTerminator {
        keyword: keyword.to_string(),
    })
}

fn expand<T, F>(record: &Record, limit: usize, parse: F) -> Result<Vec<T>, GrdeclError>
where
    T: Clone,
    F: Fn(&str) -> Option<T>,
{
    let invalid = |token: &Token| GrdeclError::InvalidValue {
        keyword: record.keyword.clone(),
        line: token.line,
        token: token.text.clone(),
    };
    let too_many = |token: &Token| GrdeclError::TooManyValues {
        keyword: record.keyword.clone(),
        line: token.line,
        limit,
    };

    let mut values = Vec::with_capacity(record.tokens.len().min(limit));
    for token in &record.tokens {
        match token.text.split_once('*') {
            Some((count, value)) => {
                let count: usize = count.parse().map_err(|_| invalid(token))?;
                // `n*` alone means defaulted values; numeric arrays have no default.
                let value = parse(value).ok_or_else(|| invalid(token))?;
                let total = values
                    .len()
                    .checked_add(count)
                    .filter(|total| *total <= limit)
                    .ok_or_else(|| too_many(token))?;
                values.resize(total, value);
            }
            None => {
                if values.len() >= limit {
                    return Err(too_many(token));
                }
                values.push(parse(&token.text).ok_or_else(|| invalid(token))?);
            }
        }
    }
    Ok(values)
}

/// Floating point values, accepting Fortran `D` exponents.
///
/// Expansion stops with an error once more than `limit` values are produced.
pub fn float_values(record: &Record, limit: usize) -> Result<Vec<f64>, GrdeclError> {
    expand(record, limit, |text| {
        text.replace(['D', 'd'], "E").parse::<f64>().ok()
    })
}

pub fn int_values(record: &Record, limit: usize) -> Result<Vec<i64>, GrdeclError> {
    expand(record, limit, |text| text.parse::<i64>().ok())
}
