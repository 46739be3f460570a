//! Live-mode term evaluation
//!
//! Evaluates terms against the interpreter's current scope chain while a
//! trace is being generated. Routine-call terms execute the routine and
//! count against the function-call ceiling.
//!
//! Both operands of a binary term are always evaluated, left to right; the
//! logical operators do not short-circuit, so an unbound identifier in the
//! right operand is reported rather than masked.
//!
//! The snapshot-mode counterpart, used for watch expressions across
//! programs, lives in `debugger::expressions`.

use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::value::{apply_binary, apply_unary, Value};
use crate::parser::ast::Term;

impl Interpreter {
    pub(crate) fn evaluate_term(&mut self, term: &Term) -> Result<Value, RuntimeError> {
        match term {
            Term::BoolLiteral(value, _) => Ok(Value::Bool(*value)),
            Term::CharLiteral(value, _) => Ok(Value::Char(*value)),
            Term::IntLiteral(value, _) => Ok(Value::Int(*value)),
            Term::LongLiteral(value, _) => Ok(Value::Long(*value)),
            Term::DoubleLiteral(value, _) => Ok(Value::Double(*value)),
            Term::StringLiteral(value, _) => Ok(Value::Str(value.clone())),

            Term::Variable(name, location) => self
                .arena
                .value_of(self.current_scope(), name)
                .cloned()
                .ok_or_else(|| RuntimeError::IdentifierNotFound {
                    name: name.clone(),
                    line: location.line,
                }),

            // Qualified references only resolve across snapshots, never
            // against a live scope
            Term::Qualified {
                program,
                name,
                location,
            } => Err(RuntimeError::IdentifierNotFound {
                name: format!("{}.{}", program, name),
                line: location.line,
            }),

            Term::Unary {
                op,
                operand,
                location,
            } => {
                let value = self.evaluate_term(operand)?;
                apply_unary(*op, &value, location.line)
            }

            Term::Binary {
                op,
                left,
                right,
                location,
            } => {
                let left_value = self.evaluate_term(left)?;
                let right_value = self.evaluate_term(right)?;
                apply_binary(*op, &left_value, &right_value, location.line)
            }

            Term::Call {
                name,
                args,
                location,
            } => self.run_routine(name, args, *location),
        }
    }
}
