//! CSV readers for weight matrices and ID lists.
//!
//! Weight files hold one row per line, factors separated by commas. ID files
//! hold unsigned integers separated by commas and/or newlines. Blank lines are
//! skipped in both.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::TopKError;

fn open(path: &Path) -> Result<BufReader<File>, TopKError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|e| TopKError::Io(format!("{}: {}", path.display(), e)))
}

/// Read a `num_rows × num_cols` row-major f32 matrix.
pub fn read_weights<R: BufRead>(
    reader: R,
    num_rows: usize,
    num_cols: usize,
) -> Result<Vec<f32>, TopKError> {
    let mut out = Vec::with_capacity(num_rows.saturating_mul(num_cols));
    let mut rows = 0usize;
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let lineno = idx + 1;
        if rows == num_rows {
            return Err(TopKError::Parse {
                line: lineno,
                message: format!("expected {} rows, found more", num_rows),
            });
        }
        let before = out.len();
        for field in line.split(',') {
            let field = field.trim();
            let v: f32 = field.parse().map_err(|_| TopKError::Parse {
                line: lineno,
                message: format!("invalid number '{}'", field),
            })?;
            out.push(v);
        }
        if out.len() - before != num_cols {
            return Err(TopKError::Parse {
                line: lineno,
                message: format!("expected {} columns, found {}", num_cols, out.len() - before),
            });
        }
        rows += 1;
    }
    if rows != num_rows {
        return Err(TopKError::InconsistentInputLengths {
            what: "weight rows",
            expected: num_rows,
            actual: rows,
        });
    }
    Ok(out)
}

/// Read exactly `num_ids` unsigned integer ids.
pub fn read_ids<R: BufRead>(reader: R, num_ids: usize) -> Result<Vec<u32>, TopKError> {
    let mut out = Vec::with_capacity(num_ids);
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        for field in line.split(',').map(str::trim).filter(|f| !f.is_empty()) {
            let id: u32 = field.parse().map_err(|_| TopKError::Parse {
                line: idx + 1,
                message: format!("invalid id '{}'", field),
            })?;
            out.push(id);
        }
    }
    if out.len() != num_ids {
        return Err(TopKError::InconsistentInputLengths {
            what: "ids",
            expected: num_ids,
            actual: out.len(),
        });
    }
    Ok(out)
}

pub fn parse_weights_csv(
    path: impl AsRef<Path>,
    num_rows: usize,
    num_cols: usize,
) -> Result<Vec<f32>, TopKError> {
    read_weights(open(path.as_ref())?, num_rows, num_cols)
}

pub fn parse_ids_csv(path: impl AsRef<Path>, num_ids: usize) -> Result<Vec<u32>, TopKError> {
    read_ids(open(path.as_ref())?, num_ids)
}
