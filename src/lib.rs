//! # Introduction
//!
//! Lockstep is a multi-program, line-stepping debugger simulator. Each
//! submitted program, written in a small imperative mini-language, is
//! executed eagerly into a complete trace of scope snapshots; a coordinator
//! then walks all traces synchronously, applying line breakpoints,
//! conditional breakpoints and watch expressions scoped to line ranges.
//!
//! ## Pipeline
//!
//! ```text
//! Source → Lexer → Parser → Commands → Interpreter → Trace → Debugger
//! ```
//!
//! 1. [`parser`] — tokenises each program's source and builds its command
//!    tree; also parses standalone watch/condition expression strings.
//! 2. [`interpreter`] — runs a command tree to completion under iteration
//!    and function-call ceilings, emitting one [`trace::TraceState`] per
//!    observable execution point.
//! 3. [`trace`] — the immutable snapshot history of one program.
//! 4. [`debugger`] — cursors, stepping, breakpoints and cross-program
//!    expression evaluation over the finished traces.
//! 5. [`session`] — JSON persistence of the debugger configuration.
//! 6. [`suggest`] — pluggable step-size / input / expression heuristics.
//!
//! ## Mini-language
//!
//! Types: `boolean`, `char`, `int`, `long`, `double`, `string`.
//! Statements: assignment (first assignment declares), typed declaration,
//! calling assignment, `if/else`, `while`, routine declaration, `return`.
//! Logical `&&` and `||` evaluate both operands unconditionally.

pub mod debugger;
pub mod interpreter;
pub mod parser;
pub mod session;
pub mod suggest;
pub mod trace;
