//! Command execution
//!
//! Each command appends the snapshots it produces to the trace being built:
//!
//! - Assignments snapshot once, at their own line, after the scope mutation.
//! - Conditionals and loops emit no snapshot of their own; only the chosen
//!   branch / each body iteration contributes.
//! - `return` snapshots once, tagged [`TracePosition::AfterReturn`], with
//!   the return register already filled.
//! - A calling assignment replaces the call's final snapshot with an
//!   AfterReturn one at the calling line, carrying the post-assignment
//!   scope.
//!
//! All methods are `pub(crate)` on [`Interpreter`] so they share the scope
//! stack, the resource counters and the trace.

use crate::interpreter::engine::{Flow, Interpreter};
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::value::Value;
use crate::parser::ast::{Command, SourceLocation, Term, Type};
use crate::trace::TracePosition;

impl Interpreter {
    pub(crate) fn execute_command(&mut self, command: &Command) -> Result<Flow, RuntimeError> {
        match command {
            Command::Assignment {
                name,
                declared,
                term,
                location,
            } => {
                self.execute_assignment(name, *declared, term, *location)?;
                Ok(Flow::Normal)
            }
            Command::CallingAssignment {
                name,
                routine,
                args,
                location,
            } => {
                self.execute_calling_assignment(name, routine, args, *location)?;
                Ok(Flow::Normal)
            }
            Command::Conditional {
                guard,
                then_branch,
                else_branch,
                location,
            } => self.execute_conditional(guard, then_branch, else_branch.as_deref(), *location),
            Command::Loop {
                guard,
                body,
                location,
            } => self.execute_loop(guard, body, *location),
            Command::RoutineCall {
                name,
                args,
                location,
            } => {
                // Bare call: the return value is discarded
                self.run_routine(name, args, *location)?;
                Ok(Flow::Normal)
            }
            Command::Return { term, location } => self.execute_return(term, *location),
        }
    }

    fn execute_assignment(
        &mut self,
        name: &str,
        declared: Option<Type>,
        term: &Term,
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        let value = self.evaluate_term(term)?;
        let scope = self.current_scope();

        match declared {
            Some(ty) => {
                // Explicit declaration, possibly shadowing an outer binding
                self.check_assignable(ty, &value, location.line)?;
                self.arena.declare(scope, name, ty);
                self.arena.set_value(scope, name, value);
            }
            None => match self.arena.binding_scope(scope, name) {
                Some(binding) => {
                    let ty = self
                        .arena
                        .type_of(scope, name)
                        .expect("binding scope implies a declared type");
                    self.check_assignable(ty, &value, location.line)?;
                    self.arena.set_value(binding, name, value);
                }
                None => {
                    // First assignment declares with the inferred type
                    self.arena.declare(scope, name, value.value_type());
                    self.arena.set_value(scope, name, value);
                }
            },
        }

        self.take_snapshot(location.line, TracePosition::Normal);
        Ok(())
    }

    fn execute_calling_assignment(
        &mut self,
        name: &str,
        routine: &str,
        args: &[Term],
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        let scope = self.current_scope();

        // The target must already be declared
        let ty = self.arena.type_of(scope, name).ok_or_else(|| {
            RuntimeError::IdentifierNotFound {
                name: name.to_string(),
                line: location.line,
            }
        })?;

        let value = self.run_routine(routine, args, location)?;
        self.check_assignable(ty, &value, location.line)?;

        let binding = self
            .arena
            .binding_scope(scope, name)
            .expect("declared type implies a binding scope");
        self.arena.set_value(binding, name, value);

        // Replace the call's final snapshot with the post-assignment state
        // at the calling line
        self.trace.pop();
        self.take_snapshot(location.line, TracePosition::AfterReturn);
        Ok(())
    }

    fn execute_conditional(
        &mut self,
        guard: &Term,
        then_branch: &[Command],
        else_branch: Option<&[Command]>,
        location: SourceLocation,
    ) -> Result<Flow, RuntimeError> {
        let guard_value = self.evaluate_term(guard)?;
        let taken = guard_value.expect_bool(location.line)?;

        let branch = if taken {
            Some(then_branch)
        } else {
            else_branch
        };

        let Some(commands) = branch else {
            return Ok(Flow::Normal);
        };

        self.push_scope(Some(self.current_scope()));
        let flow = self.execute_commands(commands);
        self.pop_scope();
        flow
    }

    fn execute_loop(
        &mut self,
        guard: &Term,
        body: &[Command],
        location: SourceLocation,
    ) -> Result<Flow, RuntimeError> {
        loop {
            let guard_value = self.evaluate_term(guard)?;
            if !guard_value.expect_bool(location.line)? {
                return Ok(Flow::Normal);
            }

            // The counter is shared by every loop of the run
            self.iterations += 1;
            if self.iterations > self.max_iterations {
                return Err(RuntimeError::MaximumIterationsExceeded {
                    limit: self.max_iterations,
                    line: location.line,
                });
            }

            self.push_scope(Some(self.current_scope()));
            let flow = self.execute_commands(body);
            self.pop_scope();
            if flow? == Flow::Returned {
                return Ok(Flow::Returned);
            }
        }
    }

    fn execute_return(
        &mut self,
        term: &Term,
        location: SourceLocation,
    ) -> Result<Flow, RuntimeError> {
        let value = self.evaluate_term(term)?;
        let scope = self.current_scope();
        self.arena.set_return_value(scope, value);
        self.take_snapshot(location.line, TracePosition::AfterReturn);
        Ok(Flow::Returned)
    }

    /// Run a routine: arguments are evaluated in the caller's scope, the
    /// body runs in a fresh rooted scope, and the returned value lands in
    /// the caller's return register.
    pub(crate) fn run_routine(
        &mut self,
        name: &str,
        args: &[Term],
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let routine =
            self.routines
                .get(name)
                .cloned()
                .ok_or_else(|| RuntimeError::IdentifierNotFound {
                    name: name.to_string(),
                    line: location.line,
                })?;

        if args.len() != routine.params.len() {
            return Err(RuntimeError::ArgumentCountMismatch {
                routine: name.to_string(),
                expected: routine.params.len(),
                got: args.len(),
                line: location.line,
            });
        }

        let mut arg_values = Vec::with_capacity(args.len());
        for arg in args {
            arg_values.push(self.evaluate_term(arg)?);
        }

        self.function_calls += 1;
        if self.function_calls > self.max_function_calls {
            return Err(RuntimeError::MaximumFunctionCallsExceeded {
                limit: self.max_function_calls,
                line: location.line,
            });
        }

        let caller_scope = self.current_scope();
        let call_scope = self.push_scope(None);
        for (param, value) in routine.params.iter().zip(arg_values) {
            self.check_assignable(param.param_type, &value, location.line)?;
            self.arena.declare(call_scope, &param.name, param.param_type);
            self.arena.set_value(call_scope, &param.name, value);
        }

        self.execute_commands(&routine.body)?;

        let returned = self.arena.return_value(call_scope).cloned();
        self.pop_scope();

        let value = returned.ok_or_else(|| RuntimeError::TypeMismatch {
            expected: routine.return_type.to_string(),
            got: "no return value".to_string(),
            line: location.line,
        })?;
        self.check_assignable(routine.return_type, &value, location.line)?;

        self.arena.set_return_value(caller_scope, value.clone());
        Ok(value)
    }

    fn check_assignable(
        &self,
        declared: Type,
        value: &Value,
        line: usize,
    ) -> Result<(), RuntimeError> {
        if value.value_type() == declared {
            Ok(())
        } else {
            Err(RuntimeError::TypeMismatch {
                expected: declared.to_string(),
                got: value.value_type().to_string(),
                line,
            })
        }
    }
}
