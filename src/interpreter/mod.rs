//! Trace-generating interpreter
//!
//! Executes one parsed program eagerly to completion, materializing a
//! [`crate::trace::TraceState`] per observable execution point. Split like
//! the parser: `engine` holds the driver struct, `statements` and
//! `expressions` add execution methods to it, `scope` and `value` are the
//! data model, `errors` the failure taxonomy.

pub mod engine;
pub mod errors;
pub mod expressions;
pub mod scope;
pub mod statements;
pub mod value;
