//! Mini-language parser
//!
//! This module transforms program text into a command tree:
//! - [`lexer`]: tokenization (source text → tokens)
//! - [`parse`]: parsing (tokens → commands and routines)
//! - [`expressions`]: term parsing with precedence climbing
//! - [`ast`]: command and term definitions
//!
//! # Supported language
//!
//! - Types: `boolean`, `char`, `int`, `long`, `double`, `string`
//! - Statements: assignments, typed declarations, `if`/`else`, `while`,
//!   routine declarations, routine calls, `return`
//! - Terms: literals, variables, qualified references (`A.x`), unary `-`/`!`,
//!   arithmetic, comparisons, logical `&&`/`||`, routine calls
//!
//! Hand-written recursive descent parser; no parser-generator dependencies.
//! Watch-expression and conditional-breakpoint strings reuse the term
//! grammar via [`parse::Parser::parse_term_only`].

pub mod ast;
pub mod expressions;
pub mod lexer;
pub mod parse;
