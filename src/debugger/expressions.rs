//! Watch expressions and conditional breakpoints
//!
//! Both wrap a parsed term plus a list of [`ScopeRange`]s and are evaluated
//! in snapshot mode: against the set of trace states the cursors currently
//! point at, one state per program. In this mode only qualified references
//! (`A.x`) resolve; an unqualified variable always fails, and routine-call
//! terms are not evaluable because no live interpreter exists.
//!
//! An expression outside all of its ranges is "not applicable": it has no
//! value, which is distinct from evaluating with an error.

use crate::interpreter::errors::RuntimeError;
use crate::interpreter::value::{apply_binary, apply_unary, Value};
use crate::parser::ast::Term;
use crate::parser::parse::{ParseError, Parser};
use crate::trace::TraceState;
use serde::{Deserialize, Serialize};

/// Line interval of one program in which an expression applies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeRange {
    pub program_id: String,
    pub start_line: usize,
    pub end_line: usize,
}

impl ScopeRange {
    pub fn new(program_id: impl Into<String>, start_line: usize, end_line: usize) -> Self {
        ScopeRange {
            program_id: program_id.into(),
            start_line,
            end_line,
        }
    }

    fn contains(&self, line: usize) -> bool {
        self.start_line <= line && line <= self.end_line
    }
}

/// True when the expression guarded by `ranges` applies at `states`.
///
/// Every program that declares at least one range must currently sit on a
/// line inside one of its ranges; programs without declared ranges do not
/// constrain applicability. An empty range list is always applicable.
fn applicable(ranges: &[ScopeRange], states: &[TraceState]) -> bool {
    let mut programs: Vec<&str> = ranges.iter().map(|r| r.program_id.as_str()).collect();
    programs.sort_unstable();
    programs.dedup();

    programs.into_iter().all(|program| {
        let Some(state) = states.iter().find(|s| s.program_id() == program) else {
            return false;
        };
        ranges
            .iter()
            .any(|r| r.program_id == program && r.contains(state.line()))
    })
}

/// Evaluate `term` against a set of per-program snapshots.
pub fn evaluate_in_states(term: &Term, states: &[TraceState]) -> Result<Value, RuntimeError> {
    match term {
        Term::BoolLiteral(value, _) => Ok(Value::Bool(*value)),
        Term::CharLiteral(value, _) => Ok(Value::Char(*value)),
        Term::IntLiteral(value, _) => Ok(Value::Int(*value)),
        Term::LongLiteral(value, _) => Ok(Value::Long(*value)),
        Term::DoubleLiteral(value, _) => Ok(Value::Double(*value)),
        Term::StringLiteral(value, _) => Ok(Value::Str(value.clone())),

        // Qualification is mandatory across programs
        Term::Variable(name, location) => Err(RuntimeError::IdentifierNotFound {
            name: name.clone(),
            line: location.line,
        }),

        Term::Qualified {
            program,
            name,
            location,
        } => states
            .iter()
            .find(|s| s.program_id() == *program)
            .and_then(|s| s.snapshot().value_of(name))
            .cloned()
            .ok_or_else(|| RuntimeError::IdentifierNotFound {
                name: format!("{}.{}", program, name),
                line: location.line,
            }),

        Term::Unary {
            op,
            operand,
            location,
        } => {
            let value = evaluate_in_states(operand, states)?;
            apply_unary(*op, &value, location.line)
        }

        Term::Binary {
            op,
            left,
            right,
            location,
        } => {
            let left_value = evaluate_in_states(left, states)?;
            let right_value = evaluate_in_states(right, states)?;
            apply_binary(*op, &left_value, &right_value, location.line)
        }

        // No routine table exists in snapshot mode
        Term::Call { name, location, .. } => Err(RuntimeError::IdentifierNotFound {
            name: name.clone(),
            line: location.line,
        }),
    }
}

/// An expression re-evaluated for display at every cursor position
#[derive(Debug, Clone)]
pub struct WatchExpression {
    source: String,
    term: Term,
    ranges: Vec<ScopeRange>,
}

impl WatchExpression {
    /// Parse `source` with the term grammar. The ranges restrict where the
    /// expression applies; an empty list means everywhere.
    pub fn new(source: &str, ranges: Vec<ScopeRange>) -> Result<Self, ParseError> {
        let term = Parser::new(source)?.parse_term_only()?;
        Ok(WatchExpression {
            source: source.to_string(),
            term,
            ranges,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn ranges(&self) -> &[ScopeRange] {
        &self.ranges
    }

    /// `None` when not applicable at `states`.
    pub fn evaluate(&self, states: &[TraceState]) -> Option<Result<Value, RuntimeError>> {
        if !applicable(&self.ranges, states) {
            return None;
        }
        Some(evaluate_in_states(&self.term, states))
    }
}

/// A boolean expression that halts `continue` when it evaluates true
#[derive(Debug, Clone)]
pub struct ConditionalBreakpoint {
    source: String,
    term: Term,
    ranges: Vec<ScopeRange>,
}

impl ConditionalBreakpoint {
    pub fn new(source: &str, ranges: Vec<ScopeRange>) -> Result<Self, ParseError> {
        let term = Parser::new(source)?.parse_term_only()?;
        Ok(ConditionalBreakpoint {
            source: source.to_string(),
            term,
            ranges,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn ranges(&self) -> &[ScopeRange] {
        &self.ranges
    }

    /// `None` when not applicable at `states`.
    pub fn evaluate(&self, states: &[TraceState]) -> Option<Result<Value, RuntimeError>> {
        if !applicable(&self.ranges, states) {
            return None;
        }
        Some(evaluate_in_states(&self.term, states))
    }

    /// Whether the breakpoint fires at `states`. Not-applicable,
    /// evaluation failures and non-boolean results all count as "no".
    pub fn is_triggered(&self, states: &[TraceState]) -> bool {
        matches!(self.evaluate(states), Some(Ok(Value::Bool(true))))
    }
}
