//! Runtime error types for trace generation and expression evaluation
//!
//! [`RuntimeError`] covers everything that can go wrong while a program is
//! being executed into a trace or while a term is evaluated against scopes
//! or snapshots. All runtime errors are fatal to the run that raised them:
//! no partial trace is ever installed, and no retry happens anywhere.

use std::fmt;

/// Runtime errors raised during trace generation or term evaluation
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeError {
    /// Reference to a variable or routine that is not bound
    IdentifierNotFound { name: String, line: usize },

    /// Operator or assignment applied to incompatible types
    TypeMismatch {
        expected: String,
        got: String,
        line: usize,
    },

    /// The shared loop-iteration counter exceeded the configured ceiling
    MaximumIterationsExceeded { limit: usize, line: usize },

    /// The shared function-call counter exceeded the configured ceiling
    MaximumFunctionCallsExceeded { limit: usize, line: usize },

    /// Integer or long division/modulo by zero
    DivisionByZero { line: usize },

    /// Routine called with the wrong number of arguments
    ArgumentCountMismatch {
        routine: String,
        expected: usize,
        got: usize,
        line: usize,
    },
}

impl RuntimeError {
    /// The source line the error was raised at.
    pub fn line(&self) -> usize {
        match self {
            RuntimeError::IdentifierNotFound { line, .. }
            | RuntimeError::TypeMismatch { line, .. }
            | RuntimeError::MaximumIterationsExceeded { line, .. }
            | RuntimeError::MaximumFunctionCallsExceeded { line, .. }
            | RuntimeError::DivisionByZero { line }
            | RuntimeError::ArgumentCountMismatch { line, .. } => *line,
        }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::IdentifierNotFound { name, line } => {
                write!(f, "Identifier '{}' not found at line {}", name, line)
            }
            RuntimeError::TypeMismatch {
                expected,
                got,
                line,
            } => {
                write!(
                    f,
                    "Type mismatch at line {}: expected {}, got {}",
                    line, expected, got
                )
            }
            RuntimeError::MaximumIterationsExceeded { limit, line } => {
                write!(
                    f,
                    "Maximum loop iterations ({}) exceeded at line {}",
                    limit, line
                )
            }
            RuntimeError::MaximumFunctionCallsExceeded { limit, line } => {
                write!(
                    f,
                    "Maximum function calls ({}) exceeded at line {}",
                    limit, line
                )
            }
            RuntimeError::DivisionByZero { line } => {
                write!(f, "Division by zero at line {}", line)
            }
            RuntimeError::ArgumentCountMismatch {
                routine,
                expected,
                got,
                line,
            } => {
                write!(
                    f,
                    "Routine '{}' expects {} argument{}, got {} at line {}",
                    routine,
                    expected,
                    if *expected == 1 { "" } else { "s" },
                    got,
                    line
                )
            }
        }
    }
}

impl std::error::Error for RuntimeError {}
