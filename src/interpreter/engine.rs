// Trace generation engine: executes one program's command tree to completion

use crate::interpreter::errors::RuntimeError;
use crate::interpreter::scope::{ScopeArena, ScopeId};
use crate::interpreter::value::Value;
use crate::parser::ast::{Command, Program, Routine};
use crate::trace::{TracePosition, TraceState};
use rustc_hash::FxHashMap;

/// Signals whether a command sequence ran to its end or was cut short by a
/// `return`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Normal,
    Returned,
}

/// Per-program execution driver.
///
/// Owns the scope arena and scope stack, the routine table and the two
/// resource counters. [`Interpreter::run`] executes the whole command tree
/// eagerly and returns the complete trace; any type error, unbound
/// identifier or ceiling breach aborts the run, and the caller must not
/// treat a partial trace as authoritative.
pub struct Interpreter {
    program_id: String,
    body: Vec<Command>,
    pub(crate) routines: FxHashMap<String, Routine>,

    pub(crate) arena: ScopeArena,
    pub(crate) scope_stack: Vec<ScopeId>,

    pub(crate) trace: Vec<TraceState>,

    /// Shared across every loop of the run
    pub(crate) iterations: usize,
    /// Shared across every routine call of the run
    pub(crate) function_calls: usize,
    pub(crate) max_iterations: usize,
    pub(crate) max_function_calls: usize,
}

impl Interpreter {
    /// Create an interpreter for one parsed program.
    pub fn new(
        program_id: impl Into<String>,
        program: Program,
        max_iterations: usize,
        max_function_calls: usize,
    ) -> Self {
        let mut routines = FxHashMap::default();
        for routine in program.routines {
            routines.insert(routine.name.clone(), routine);
        }

        let mut arena = ScopeArena::new();
        let root = arena.alloc(None);

        Interpreter {
            program_id: program_id.into(),
            body: program.body,
            routines,
            arena,
            scope_stack: vec![root],
            trace: Vec::new(),
            iterations: 0,
            function_calls: 0,
            max_iterations,
            max_function_calls,
        }
    }

    /// Bind an input assignment into the root scope before the run starts.
    /// The declared type is inferred from the literal's value.
    pub fn bind_input(&mut self, name: &str, value: Value) {
        let root = self.scope_stack[0];
        self.arena.declare(root, name, value.value_type());
        self.arena.set_value(root, name, value);
    }

    /// Execute the whole command tree and hand back the finished trace.
    pub fn run(mut self) -> Result<Vec<TraceState>, RuntimeError> {
        let body = std::mem::take(&mut self.body);
        self.execute_commands(&body)?;
        Ok(self.trace)
    }

    pub(crate) fn execute_commands(&mut self, commands: &[Command]) -> Result<Flow, RuntimeError> {
        for command in commands {
            if self.execute_command(command)? == Flow::Returned {
                return Ok(Flow::Returned);
            }
        }
        Ok(Flow::Normal)
    }

    pub(crate) fn current_scope(&self) -> ScopeId {
        *self
            .scope_stack
            .last()
            .expect("scope stack is never empty")
    }

    pub(crate) fn push_scope(&mut self, parent: Option<ScopeId>) -> ScopeId {
        let scope = self.arena.alloc(parent);
        self.scope_stack.push(scope);
        scope
    }

    pub(crate) fn pop_scope(&mut self) {
        self.scope_stack.pop();
    }

    /// Append a snapshot of the current scope to the trace.
    pub(crate) fn take_snapshot(&mut self, line: usize, position: TracePosition) {
        let snapshot = self.arena.snapshot(self.current_scope());
        self.trace
            .push(TraceState::new(self.program_id.clone(), line, position, snapshot));
    }
}
