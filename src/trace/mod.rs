//! Execution traces
//!
//! A trace is the complete, ordered history of one program's run: one
//! [`TraceState`] per observable execution point (each statement boundary
//! and each call return). Traces are append-only while being generated and
//! read-only afterwards; only index order reflects chronological order,
//! since loops and calls revisit earlier lines.

use crate::interpreter::scope::ScopeSnapshot;

/// Marks what kind of execution point a snapshot was taken at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TracePosition {
    /// An ordinary statement boundary
    Normal,
    /// Taken right after a routine returned (or after a calling assignment
    /// consumed the return value)
    AfterReturn,
}

/// Immutable record of a program's visible state at one execution point
#[derive(Debug, Clone)]
pub struct TraceState {
    program_id: String,
    line: usize,
    position: TracePosition,
    snapshot: ScopeSnapshot,
}

impl TraceState {
    pub fn new(
        program_id: impl Into<String>,
        line: usize,
        position: TracePosition,
        snapshot: ScopeSnapshot,
    ) -> Self {
        Self {
            program_id: program_id.into(),
            line,
            position,
            snapshot,
        }
    }

    pub fn program_id(&self) -> &str {
        &self.program_id
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn position(&self) -> TracePosition {
        self.position
    }

    pub fn snapshot(&self) -> &ScopeSnapshot {
        &self.snapshot
    }
}
