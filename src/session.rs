//! Session persistence
//!
//! A [`Session`] is the serde-serializable snapshot of a debugger's
//! configuration: program texts and inputs, per-program step sizes, line
//! breakpoints and last reached line, watch expressions and conditional
//! breakpoints with their scope ranges, and both resource ceilings. It
//! round-trips through JSON; applying a captured session yields a debugger
//! in edit mode ready to be launched again.
//!
//! Traces themselves are never persisted. They are regenerated
//! deterministically from the program text and inputs.

use crate::debugger::expressions::ScopeRange;
use crate::debugger::{DebugError, Debugger, ProgramInput};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// Errors raised while loading or saving a session file
#[derive(Debug)]
pub enum SessionError {
    Io(std::io::Error),
    Format(serde_json::Error),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Io(err) => write!(f, "Session file error: {}", err),
            SessionError::Format(err) => write!(f, "Session format error: {}", err),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Io(err) => Some(err),
            SessionError::Format(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for SessionError {
    fn from(err: std::io::Error) -> Self {
        SessionError::Io(err)
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        SessionError::Format(err)
    }
}

/// One program's persisted definition and stepping configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionProgram {
    pub id: String,
    pub source: String,
    #[serde(default)]
    pub input: String,
    pub step_size: usize,
    #[serde(default)]
    pub breakpoints: Vec<usize>,
    /// Line at the cursor when the session was captured, if a run was live
    #[serde(default)]
    pub last_line: Option<usize>,
}

/// A persisted watch expression or conditional breakpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionExpression {
    pub id: u32,
    pub source: String,
    #[serde(default)]
    pub ranges: Vec<ScopeRange>,
}

/// Complete persisted debugger configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub programs: Vec<SessionProgram>,
    #[serde(default)]
    pub watch_expressions: Vec<SessionExpression>,
    #[serde(default)]
    pub conditional_breakpoints: Vec<SessionExpression>,
    pub max_iterations: usize,
    pub max_function_calls: usize,
}

impl Session {
    /// Capture the current configuration of a debugger.
    pub fn capture(debugger: &Debugger) -> Session {
        let programs = debugger
            .program_ids()
            .into_iter()
            .map(|id| SessionProgram {
                id: id.to_string(),
                source: debugger
                    .program_source(id)
                    .expect("listed program exists")
                    .to_string(),
                input: debugger
                    .program_input(id)
                    .expect("listed program exists")
                    .to_string(),
                step_size: debugger.step_size(id).expect("listed program exists"),
                breakpoints: debugger.breakpoints(id).expect("listed program exists"),
                last_line: debugger.current_line(id).ok().flatten(),
            })
            .collect();

        let watch_expressions = debugger
            .watches()
            .map(|(id, watch)| SessionExpression {
                id,
                source: watch.source().to_string(),
                ranges: watch.ranges().to_vec(),
            })
            .collect();

        let conditional_breakpoints = debugger
            .conditional_breakpoints()
            .map(|(id, breakpoint)| SessionExpression {
                id,
                source: breakpoint.source().to_string(),
                ranges: breakpoint.ranges().to_vec(),
            })
            .collect();

        Session {
            programs,
            watch_expressions,
            conditional_breakpoints,
            max_iterations: debugger.maximum_iterations(),
            max_function_calls: debugger.maximum_function_calls(),
        }
    }

    /// Build a debugger in edit mode carrying everything this session
    /// persisted. Launch it with [`Debugger::start_run`].
    pub fn apply(&self) -> Result<Debugger, DebugError> {
        let mut debugger = Debugger::new();
        debugger.set_maximum_iterations(self.max_iterations);
        debugger.set_maximum_function_calls(self.max_function_calls);

        let inputs = self
            .programs
            .iter()
            .map(|p| ProgramInput::new(&p.id, &p.source, &p.input))
            .collect();
        debugger.submit_programs(inputs)?;

        for program in &self.programs {
            debugger.set_step_size(&program.id, program.step_size)?;
            for line in &program.breakpoints {
                debugger.create_breakpoint(&program.id, *line)?;
            }
        }

        for watch in &self.watch_expressions {
            debugger.create_watch(watch.id, &watch.source, watch.ranges.clone())?;
        }
        for breakpoint in &self.conditional_breakpoints {
            debugger.create_conditional_breakpoint(
                breakpoint.id,
                &breakpoint.source,
                breakpoint.ranges.clone(),
            )?;
        }

        Ok(debugger)
    }

    pub fn to_json(&self) -> Result<String, SessionError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<Session, SessionError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Session, SessionError> {
        Session::from_json(&fs::read_to_string(path)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SessionError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
