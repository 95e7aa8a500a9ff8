//! Per-user diagnostic records and where they go.
//!
//! One record per user: `user_id,cluster_id,theta_uc,num_items_visited`,
//! comma-separated and newline-terminated, in processing order.

use std::fmt;
use std::io::Write;

use crate::error::TopKError;
use crate::types::UserId;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiagnosticRecord {
    pub user_id: UserId,
    pub cluster_id: u32,
    pub theta_uc: f64,
    pub visited: usize,
}

impl fmt::Display for DiagnosticRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.user_id, self.cluster_id, self.theta_uc, self.visited
        )
    }
}

/// Receives diagnostic records in the order users are processed.
pub trait DiagnosticSink {
    fn record(&mut self, rec: &DiagnosticRecord) -> Result<(), TopKError>;
}

impl DiagnosticSink for Vec<DiagnosticRecord> {
    #[inline]
    fn record(&mut self, rec: &DiagnosticRecord) -> Result<(), TopKError> {
        self.push(*rec);
        Ok(())
    }
}

/// Discards every record.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    #[inline]
    fn record(&mut self, _rec: &DiagnosticRecord) -> Result<(), TopKError> {
        Ok(())
    }
}

/// Writes records as CSV lines to any `Write`.
pub struct CsvSink<W: Write> {
    out: W,
    written: usize,
}

impl<W: Write> CsvSink<W> {
    pub fn new(out: W) -> Self {
        Self { out, written: 0 }
    }

    /// Number of records written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn flush(&mut self) -> Result<(), TopKError> {
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> DiagnosticSink for CsvSink<W> {
    fn record(&mut self, rec: &DiagnosticRecord) -> Result<(), TopKError> {
        writeln!(self.out, "{}", rec)?;
        self.written += 1;
        Ok(())
    }
}
