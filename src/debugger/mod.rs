//! Stepping coordinator
//!
//! [`Debugger`] owns one trace and one cursor per program and drives them in
//! lockstep: `step` advances every cursor, `single_step` one, and
//! `continue_debug` loops until a breakpoint, a true conditional breakpoint
//! or the end of all traces. It is a two-state machine: `NotRunning` (edit
//! mode, no traces) and `Running` (after a successful [`Debugger::launch_run`]).
//! Mutating operations called in the wrong mode fail with
//! [`DebugError::IllegalState`] without touching any state.
//!
//! Every stop reports its cause as a returned [`StopCause`] value; nothing
//! here calls back into the consumer.

pub mod expressions;

use crate::debugger::expressions::{ConditionalBreakpoint, ScopeRange, WatchExpression};
use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::value::Value;
use crate::parser::ast::{Term, UnOp};
use crate::parser::parse::{ParseError, Parser};
use crate::trace::TraceState;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Errors raised by the coordinator
#[derive(Debug)]
pub enum DebugError {
    /// Operation invoked in the wrong mode (stepping while not running, or
    /// editing while running)
    IllegalState { operation: String },

    /// No program registered under this id
    UnknownProgram { id: String },

    /// No watch expression or conditional breakpoint registered under this id
    UnknownExpression { id: u32 },

    /// A program or expression string failed to parse
    Parse(ParseError),

    /// Trace generation for one program failed; no trace was installed
    Generation {
        program_id: String,
        error: RuntimeError,
    },

    /// A watch expression failed to evaluate at the current snapshots
    Evaluation(RuntimeError),
}

impl fmt::Display for DebugError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DebugError::IllegalState { operation } => {
                write!(f, "Operation '{}' is not allowed in this mode", operation)
            }
            DebugError::UnknownProgram { id } => write!(f, "Unknown program '{}'", id),
            DebugError::UnknownExpression { id } => write!(f, "Unknown expression id {}", id),
            DebugError::Parse(err) => write!(f, "{}", err),
            DebugError::Generation { program_id, error } => {
                write!(f, "Program '{}' failed: {}", program_id, error)
            }
            DebugError::Evaluation(err) => write!(f, "Evaluation failed: {}", err),
        }
    }
}

impl std::error::Error for DebugError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DebugError::Parse(err) => Some(err),
            DebugError::Generation { error, .. } => Some(error),
            DebugError::Evaluation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ParseError> for DebugError {
    fn from(err: ParseError) -> Self {
        DebugError::Parse(err)
    }
}

/// One program as submitted by the caller
#[derive(Debug, Clone)]
pub struct ProgramInput {
    /// Stable program id ("A", "B", ...)
    pub id: String,
    /// Mini-language source text
    pub source: String,
    /// Semicolon-separated `name = literal` input assignments
    pub input: String,
}

impl ProgramInput {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        input: impl Into<String>,
    ) -> Self {
        ProgramInput {
            id: id.into(),
            source: source.into(),
            input: input.into(),
        }
    }
}

/// How [`Debugger::step`] advances the cursors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepMode {
    /// Every cursor advances by its program's configured step size
    Sized,
    /// Every cursor advances by exactly one state; `continue_debug` steps
    /// this way so no candidate stop point is skipped
    Uniform,
}

/// Why `continue_debug` stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopCause {
    /// A cursor landed on a registered line breakpoint
    Breakpoint { program_id: String, line: usize },
    /// A conditional breakpoint evaluated to true
    ConditionalBreakpoint { id: u32 },
    /// Every cursor reached the end of its trace
    EndOfTraces,
}

/// Per-program stepping state. Step size and line breakpoints survive
/// relaunches and resets; trace and cursor do not.
#[derive(Debug)]
struct ProgramState {
    id: String,
    source: String,
    input: String,
    step_size: usize,
    breakpoints: BTreeSet<usize>,
    trace: Vec<TraceState>,
    cursor: usize,
}

impl ProgramState {
    fn at_end(&self) -> bool {
        self.cursor + 1 >= self.trace.len()
    }

    fn current(&self) -> Option<&TraceState> {
        self.trace.get(self.cursor)
    }
}

const DEFAULT_MAX_ITERATIONS: usize = 1000;
const DEFAULT_MAX_FUNCTION_CALLS: usize = 1000;

/// The top-level coordinator
pub struct Debugger {
    programs: Vec<ProgramState>,
    watches: BTreeMap<u32, WatchExpression>,
    conditionals: BTreeMap<u32, ConditionalBreakpoint>,
    max_iterations: usize,
    max_function_calls: usize,
    running: bool,
}

impl Default for Debugger {
    fn default() -> Self {
        Debugger::new()
    }
}

impl Debugger {
    pub fn new() -> Self {
        Debugger {
            programs: Vec::new(),
            watches: BTreeMap::new(),
            conditionals: BTreeMap::new(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            max_function_calls: DEFAULT_MAX_FUNCTION_CALLS,
            running: false,
        }
    }

    fn require_running(&self, operation: &str) -> Result<(), DebugError> {
        if self.running {
            Ok(())
        } else {
            Err(DebugError::IllegalState {
                operation: operation.to_string(),
            })
        }
    }

    fn require_not_running(&self, operation: &str) -> Result<(), DebugError> {
        if self.running {
            Err(DebugError::IllegalState {
                operation: operation.to_string(),
            })
        } else {
            Ok(())
        }
    }

    fn program(&self, id: &str) -> Result<&ProgramState, DebugError> {
        self.programs
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| DebugError::UnknownProgram { id: id.to_string() })
    }

    fn program_mut(&mut self, id: &str) -> Result<&mut ProgramState, DebugError> {
        self.programs
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| DebugError::UnknownProgram { id: id.to_string() })
    }

    // ===== Program submission =====

    /// Replace the registered program definitions. Step sizes and line
    /// breakpoints of programs that keep their id survive the replacement.
    /// Edit mode only.
    pub fn submit_programs(&mut self, programs: Vec<ProgramInput>) -> Result<(), DebugError> {
        self.require_not_running("submit_programs")?;

        let old = std::mem::take(&mut self.programs);
        self.programs = programs
            .into_iter()
            .map(|p| {
                let previous = old.iter().find(|o| o.id == p.id);
                ProgramState {
                    id: p.id,
                    source: p.source,
                    input: p.input,
                    step_size: previous.map(|o| o.step_size).unwrap_or(1),
                    breakpoints: previous.map(|o| o.breakpoints.clone()).unwrap_or_default(),
                    trace: Vec::new(),
                    cursor: 0,
                }
            })
            .collect();
        Ok(())
    }

    /// Generate a trace for every submitted program and enter `Running`
    /// with all cursors at 0.
    ///
    /// All-or-nothing: if any program fails to parse or to generate, no
    /// trace is installed and the mode stays `NotRunning`.
    pub fn launch_run(&mut self, programs: Vec<ProgramInput>) -> Result<(), DebugError> {
        self.submit_programs(programs)?;
        self.start_run()
    }

    /// Run the already-submitted programs (used when re-launching after a
    /// reset, or after restoring a saved session).
    pub fn start_run(&mut self) -> Result<(), DebugError> {
        self.require_not_running("start_run")?;

        let mut traces = Vec::with_capacity(self.programs.len());
        for program in &self.programs {
            traces.push(generate_trace(
                &program.id,
                &program.source,
                &program.input,
                self.max_iterations,
                self.max_function_calls,
            )?);
        }

        for (program, trace) in self.programs.iter_mut().zip(traces) {
            program.trace = trace;
            program.cursor = 0;
        }
        self.running = true;
        Ok(())
    }

    // ===== Stepping =====

    /// Advance every cursor, clamped to the last state of its trace.
    pub fn step(&mut self, mode: StepMode) -> Result<(), DebugError> {
        self.require_running("step")?;
        for program in &mut self.programs {
            let amount = match mode {
                StepMode::Sized => program.step_size,
                StepMode::Uniform => 1,
            };
            let last = program.trace.len().saturating_sub(1);
            program.cursor = (program.cursor + amount).min(last);
        }
        Ok(())
    }

    /// Advance exactly one program's cursor by one state, leaving the
    /// others fixed.
    pub fn single_step(&mut self, program_id: &str) -> Result<(), DebugError> {
        self.require_running("single_step")?;
        let program = self.program_mut(program_id)?;
        let last = program.trace.len().saturating_sub(1);
        program.cursor = (program.cursor + 1).min(last);
        Ok(())
    }

    /// Step all cursors until a line breakpoint is hit, a conditional
    /// breakpoint evaluates true, or every cursor reaches the end of its
    /// trace. Always terminates: each round advances every unfinished
    /// cursor by one state.
    pub fn continue_debug(&mut self) -> Result<StopCause, DebugError> {
        self.require_running("continue_debug")?;

        while !self.all_at_end() {
            let before: Vec<usize> = self.programs.iter().map(|p| p.cursor).collect();
            self.step(StepMode::Uniform)?;
            if let Some(cause) = self.stop_cause_after_step(&before) {
                return Ok(cause);
            }
        }
        Ok(StopCause::EndOfTraces)
    }

    fn all_at_end(&self) -> bool {
        self.programs.iter().all(ProgramState::at_end)
    }

    /// Stop cause at the cursor positions reached by the last step.
    /// `before` holds each program's cursor prior to the step; line
    /// breakpoints only count for cursors that actually moved, so a
    /// finished program parked on a breakpoint line cannot re-fire while
    /// the others run on.
    fn stop_cause_after_step(&self, before: &[usize]) -> Option<StopCause> {
        for (program, previous) in self.programs.iter().zip(before) {
            if program.cursor == *previous {
                continue;
            }
            if let Some(state) = program.current() {
                if program.breakpoints.contains(&state.line()) {
                    return Some(StopCause::Breakpoint {
                        program_id: program.id.clone(),
                        line: state.line(),
                    });
                }
            }
        }

        let states = self.cursor_states();
        for (id, breakpoint) in &self.conditionals {
            if breakpoint.is_triggered(&states) {
                return Some(StopCause::ConditionalBreakpoint { id: *id });
            }
        }
        None
    }

    /// The snapshot set at the current cursor positions, one state per
    /// program with a non-empty trace.
    fn cursor_states(&self) -> Vec<TraceState> {
        self.programs
            .iter()
            .filter_map(|p| p.current().cloned())
            .collect()
    }

    // ===== Run lifecycle =====

    /// Discard all traces and cursors and return to edit mode. Program
    /// definitions, step sizes, line breakpoints, watch expressions and
    /// conditional breakpoints all survive.
    pub fn reset(&mut self) {
        for program in &mut self.programs {
            program.trace = Vec::new();
            program.cursor = 0;
        }
        self.running = false;
    }

    /// Leave debug mode. Identical to [`Debugger::reset`].
    pub fn end_run(&mut self) {
        self.reset();
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    // ===== Configuration =====

    /// Step size for one program; values below 1 are raised to 1.
    pub fn set_step_size(&mut self, program_id: &str, size: usize) -> Result<(), DebugError> {
        self.program_mut(program_id)?.step_size = size.max(1);
        Ok(())
    }

    pub fn step_size(&self, program_id: &str) -> Result<usize, DebugError> {
        Ok(self.program(program_id)?.step_size)
    }

    /// Loop-iteration ceiling for subsequent runs, shared by all loops of
    /// one run.
    pub fn set_maximum_iterations(&mut self, limit: usize) {
        self.max_iterations = limit;
    }

    /// Function-call ceiling for subsequent runs, shared by all calls of
    /// one run.
    pub fn set_maximum_function_calls(&mut self, limit: usize) {
        self.max_function_calls = limit;
    }

    pub fn maximum_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn maximum_function_calls(&self) -> usize {
        self.max_function_calls
    }

    // ===== Line breakpoints =====

    pub fn create_breakpoint(&mut self, program_id: &str, line: usize) -> Result<(), DebugError> {
        self.program_mut(program_id)?.breakpoints.insert(line);
        Ok(())
    }

    pub fn delete_breakpoint(&mut self, program_id: &str, line: usize) -> Result<(), DebugError> {
        self.program_mut(program_id)?.breakpoints.remove(&line);
        Ok(())
    }

    pub fn breakpoints(&self, program_id: &str) -> Result<Vec<usize>, DebugError> {
        Ok(self.program(program_id)?.breakpoints.iter().copied().collect())
    }

    // ===== Watch expressions =====

    pub fn create_watch(
        &mut self,
        id: u32,
        source: &str,
        ranges: Vec<ScopeRange>,
    ) -> Result<(), DebugError> {
        let watch = WatchExpression::new(source, ranges)?;
        self.watches.insert(id, watch);
        Ok(())
    }

    pub fn change_watch(
        &mut self,
        id: u32,
        source: &str,
        ranges: Vec<ScopeRange>,
    ) -> Result<(), DebugError> {
        if !self.watches.contains_key(&id) {
            return Err(DebugError::UnknownExpression { id });
        }
        let watch = WatchExpression::new(source, ranges)?;
        self.watches.insert(id, watch);
        Ok(())
    }

    pub fn delete_watch(&mut self, id: u32) -> Result<(), DebugError> {
        self.watches
            .remove(&id)
            .map(|_| ())
            .ok_or(DebugError::UnknownExpression { id })
    }

    /// Registered watch expressions in ascending id order.
    pub fn watches(&self) -> impl Iterator<Item = (u32, &WatchExpression)> {
        self.watches.iter().map(|(id, w)| (*id, w))
    }

    /// Display value of one watch expression at the current cursors.
    /// `Ok(None)` when the expression is outside all of its scope ranges.
    pub fn watch_value(&self, id: u32) -> Result<Option<String>, DebugError> {
        self.require_running("watch_value")?;
        let watch = self
            .watches
            .get(&id)
            .ok_or(DebugError::UnknownExpression { id })?;
        match watch.evaluate(&self.cursor_states()) {
            None => Ok(None),
            Some(Ok(value)) => Ok(Some(value.to_string())),
            Some(Err(err)) => Err(DebugError::Evaluation(err)),
        }
    }

    // ===== Conditional breakpoints =====

    pub fn create_conditional_breakpoint(
        &mut self,
        id: u32,
        source: &str,
        ranges: Vec<ScopeRange>,
    ) -> Result<(), DebugError> {
        let breakpoint = ConditionalBreakpoint::new(source, ranges)?;
        self.conditionals.insert(id, breakpoint);
        Ok(())
    }

    pub fn change_conditional_breakpoint(
        &mut self,
        id: u32,
        source: &str,
        ranges: Vec<ScopeRange>,
    ) -> Result<(), DebugError> {
        if !self.conditionals.contains_key(&id) {
            return Err(DebugError::UnknownExpression { id });
        }
        let breakpoint = ConditionalBreakpoint::new(source, ranges)?;
        self.conditionals.insert(id, breakpoint);
        Ok(())
    }

    pub fn delete_conditional_breakpoint(&mut self, id: u32) -> Result<(), DebugError> {
        self.conditionals
            .remove(&id)
            .map(|_| ())
            .ok_or(DebugError::UnknownExpression { id })
    }

    /// Registered conditional breakpoints in ascending id order.
    pub fn conditional_breakpoints(&self) -> impl Iterator<Item = (u32, &ConditionalBreakpoint)> {
        self.conditionals.iter().map(|(id, b)| (*id, b))
    }

    // ===== Inspection =====

    /// Program ids in submission order.
    pub fn program_ids(&self) -> Vec<&str> {
        self.programs.iter().map(|p| p.id.as_str()).collect()
    }

    pub fn program_source(&self, program_id: &str) -> Result<&str, DebugError> {
        Ok(&self.program(program_id)?.source)
    }

    pub fn program_input(&self, program_id: &str) -> Result<&str, DebugError> {
        Ok(&self.program(program_id)?.input)
    }

    /// The trace state at one program's cursor; `None` for an empty trace.
    pub fn current_state(&self, program_id: &str) -> Result<Option<&TraceState>, DebugError> {
        self.require_running("current_state")?;
        Ok(self.program(program_id)?.current())
    }

    /// Source line at the cursor.
    pub fn current_line(&self, program_id: &str) -> Result<Option<usize>, DebugError> {
        Ok(self.current_state(program_id)?.map(|s| s.line()))
    }

    /// Value of a variable visible at the cursor.
    pub fn value_of(&self, program_id: &str, name: &str) -> Result<Option<Value>, DebugError> {
        Ok(self
            .current_state(program_id)?
            .and_then(|s| s.snapshot().value_of(name).cloned()))
    }

    /// All variables visible at the cursor, sorted by name.
    pub fn all_variables(&self, program_id: &str) -> Result<Vec<String>, DebugError> {
        Ok(self
            .current_state(program_id)?
            .map(|s| s.snapshot().variables())
            .unwrap_or_default())
    }

    /// Return register of the state at the cursor.
    pub fn return_value(&self, program_id: &str) -> Result<Option<Value>, DebugError> {
        Ok(self
            .current_state(program_id)?
            .and_then(|s| s.snapshot().return_value().cloned()))
    }

    /// Whether one program's cursor sits on the last state of its trace.
    pub fn at_end(&self, program_id: &str) -> Result<bool, DebugError> {
        self.require_running("at_end")?;
        Ok(self.program(program_id)?.at_end())
    }

    /// Trace length of one program.
    pub fn trace_length(&self, program_id: &str) -> Result<usize, DebugError> {
        self.require_running("trace_length")?;
        Ok(self.program(program_id)?.trace.len())
    }
}

/// Parse one program, bind its inputs and execute it into a full trace.
fn generate_trace(
    program_id: &str,
    source: &str,
    input: &str,
    max_iterations: usize,
    max_function_calls: usize,
) -> Result<Vec<TraceState>, DebugError> {
    let program = Parser::new(source)?.parse_program()?;

    let mut interpreter =
        Interpreter::new(program_id, program, max_iterations, max_function_calls);
    for (name, value) in parse_input_assignments(input) {
        interpreter.bind_input(&name, value);
    }

    interpreter.run().map_err(|error| DebugError::Generation {
        program_id: program_id.to_string(),
        error,
    })
}

/// Parse a semicolon-separated `name = literal` input list. Pairs without
/// exactly one `=`, with an empty name, or with a non-literal value are
/// ignored rather than reported.
pub fn parse_input_assignments(input: &str) -> Vec<(String, Value)> {
    input
        .split(';')
        .filter_map(|pair| {
            let pair = pair.trim();
            if pair.is_empty() {
                return None;
            }
            let mut parts = pair.split('=');
            let name = parts.next()?.trim();
            let literal = parts.next()?.trim();
            if parts.next().is_some() || name.is_empty() {
                return None;
            }
            let term = Parser::new(literal).ok()?.parse_term_only().ok()?;
            Some((name.to_string(), literal_value(&term)?))
        })
        .collect()
}

/// The value of a literal term, including a negated numeric literal.
/// `None` for anything that would need evaluation.
fn literal_value(term: &Term) -> Option<Value> {
    match term {
        Term::BoolLiteral(b, _) => Some(Value::Bool(*b)),
        Term::CharLiteral(c, _) => Some(Value::Char(*c)),
        Term::IntLiteral(n, _) => Some(Value::Int(*n)),
        Term::LongLiteral(n, _) => Some(Value::Long(*n)),
        Term::DoubleLiteral(n, _) => Some(Value::Double(*n)),
        Term::StringLiteral(s, _) => Some(Value::Str(s.clone())),
        Term::Unary {
            op: UnOp::Neg,
            operand,
            ..
        } => match literal_value(operand)? {
            Value::Int(n) => Some(Value::Int(-n)),
            Value::Long(n) => Some(Value::Long(-n)),
            Value::Double(n) => Some(Value::Double(-n)),
            _ => None,
        },
        _ => None,
    }
}
