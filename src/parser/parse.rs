//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing
//! infrastructure, including error types, helper methods and the two parse
//! entry points: whole programs and standalone term strings (the form watch
//! expressions and conditional breakpoints arrive in).
//!
//! # Parser Architecture
//!
//! Recursive descent, split across `impl Parser` blocks:
//! - This module: Parser struct, helpers, statement and routine parsing
//! - `expressions`: term parsing with precedence climbing

use crate::parser::ast::*;
use crate::parser::lexer::{LexError, Lexer, Token};
use std::fmt;

/// Parser error type
#[derive(Debug)]
pub struct ParseError {
    pub message: String,
    pub location: SourceLocation,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Parse error at line {}, column {}: {}",
            self.location.line, self.location.column, self.message
        )
    }
}

impl std::error::Error for ParseError {}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError {
            message: err.message,
            location: err.location,
        }
    }
}

/// Recursive descent parser for the mini-language
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) position: usize,
}

impl Parser {
    pub fn new(source: &str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(source);
        let tokens = lexer.tokenize()?;
        Ok(Self {
            tokens,
            position: 0,
        })
    }

    /// Parse an entire program: routine declarations plus top-level commands.
    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut program = Program::new();

        while !self.is_at_end() {
            if self.is_type_keyword() && self.looks_like_routine() {
                let routine = self.parse_routine()?;
                program.routines.push(routine);
            } else {
                let cmd = self.parse_statement()?;
                program.body.push(cmd);
            }
        }

        Ok(program)
    }

    /// Parse a standalone term, as used for watch expressions and
    /// conditional breakpoints. The whole input must be consumed.
    pub fn parse_term_only(&mut self) -> Result<Term, ParseError> {
        let term = self.parse_term()?;
        if !self.is_at_end() {
            return Err(ParseError {
                message: format!("Unexpected {} after expression", self.peek()),
                location: self.current_location(),
            });
        }
        Ok(term)
    }

    // ===== Statements =====

    pub(crate) fn parse_statement(&mut self) -> Result<Command, ParseError> {
        match self.peek_token() {
            Token::If(loc) => {
                self.advance();
                self.parse_conditional(loc)
            }
            Token::While(loc) => {
                self.advance();
                self.parse_loop(loc)
            }
            Token::Return(loc) => {
                self.advance();
                let term = self.parse_term()?;
                self.expect_semicolon("after return value")?;
                Ok(Command::Return {
                    term,
                    location: loc,
                })
            }
            _ if self.is_type_keyword() => self.parse_declaration(),
            Token::Ident(name, loc) => {
                self.advance();
                self.parse_assignment_or_call(name, loc)
            }
            other => Err(ParseError {
                message: format!("Expected statement, found {}", other),
                location: self.current_location(),
            }),
        }
    }

    /// `<type> x = term;`
    fn parse_declaration(&mut self) -> Result<Command, ParseError> {
        let loc = self.current_location();
        let declared = self.parse_type()?;
        let name = self.expect_identifier()?;
        self.expect_token(&Token::Eq(loc), "Expected '=' in declaration")?;
        let term = self.parse_term()?;
        self.expect_semicolon("after declaration")?;
        Ok(Command::Assignment {
            name,
            declared: Some(declared),
            term,
            location: loc,
        })
    }

    /// Statement starting with an identifier: `x = term;`, `x = f(...);`
    /// or a bare routine call `f(...);`.
    fn parse_assignment_or_call(
        &mut self,
        name: String,
        loc: SourceLocation,
    ) -> Result<Command, ParseError> {
        if self.check(&Token::LParen(loc)) {
            self.advance();
            let args = self.parse_arguments()?;
            self.expect_semicolon("after routine call")?;
            return Ok(Command::RoutineCall {
                name,
                args,
                location: loc,
            });
        }

        self.expect_token(&Token::Eq(loc), "Expected '=' in assignment")?;
        let term = self.parse_term()?;
        self.expect_semicolon("after assignment")?;

        // `x = f(...)` with the call as the whole right-hand side is a
        // calling assignment; calls nested deeper stay ordinary terms.
        if let Term::Call {
            name: routine,
            args,
            ..
        } = term
        {
            return Ok(Command::CallingAssignment {
                name,
                routine,
                args,
                location: loc,
            });
        }

        Ok(Command::Assignment {
            name,
            declared: None,
            term,
            location: loc,
        })
    }

    fn parse_conditional(&mut self, loc: SourceLocation) -> Result<Command, ParseError> {
        self.expect_lparen("after 'if'")?;
        let guard = self.parse_term()?;
        self.expect_rparen("after if guard")?;
        let then_branch = self.parse_block("if body")?;

        let else_branch = if self.match_token(&Token::Else(loc)) {
            Some(self.parse_block("else body")?)
        } else {
            None
        };

        Ok(Command::Conditional {
            guard,
            then_branch,
            else_branch,
            location: loc,
        })
    }

    fn parse_loop(&mut self, loc: SourceLocation) -> Result<Command, ParseError> {
        self.expect_lparen("after 'while'")?;
        let guard = self.parse_term()?;
        self.expect_rparen("after loop guard")?;
        let body = self.parse_block("loop body")?;
        Ok(Command::Loop {
            guard,
            body,
            location: loc,
        })
    }

    fn parse_block(&mut self, ctx: &str) -> Result<Vec<Command>, ParseError> {
        self.expect_lbrace(&format!("to open {}", ctx))?;
        let mut commands = Vec::new();
        while !self.check(&Token::RBrace(self.current_location())) && !self.is_at_end() {
            commands.push(self.parse_statement()?);
        }
        self.expect_rbrace(&format!("to close {}", ctx))?;
        Ok(commands)
    }

    // ===== Routines =====

    /// `<type> name(<type> p, ...) { body }`
    fn parse_routine(&mut self) -> Result<Routine, ParseError> {
        let loc = self.current_location();
        let return_type = self.parse_type()?;
        let name = self.expect_identifier()?;
        self.expect_lparen("after routine name")?;

        let mut params = Vec::new();
        if !self.check(&Token::RParen(loc)) {
            loop {
                let param_type = self.parse_type()?;
                let param_name = self.expect_identifier()?;
                params.push(Param {
                    name: param_name,
                    param_type,
                });
                if !self.match_token(&Token::Comma(loc)) {
                    break;
                }
            }
        }
        self.expect_rparen("after parameter list")?;

        let body = self.parse_block("routine body")?;
        Ok(Routine {
            name,
            params,
            return_type,
            body,
            location: loc,
        })
    }

    pub(crate) fn parse_type(&mut self) -> Result<Type, ParseError> {
        let ty = match self.peek_token() {
            Token::Boolean(_) => Type::Boolean,
            Token::Char(_) => Type::Char,
            Token::Int(_) => Type::Int,
            Token::Long(_) => Type::Long,
            Token::Double(_) => Type::Double,
            Token::Str(_) => Type::String,
            other => {
                return Err(ParseError {
                    message: format!("Expected type, found {}", other),
                    location: self.current_location(),
                });
            }
        };
        self.advance();
        Ok(ty)
    }

    // ===== Helper methods =====

    pub(crate) fn is_type_keyword(&self) -> bool {
        matches!(
            self.peek_token(),
            Token::Boolean(_)
                | Token::Char(_)
                | Token::Int(_)
                | Token::Long(_)
                | Token::Double(_)
                | Token::Str(_)
        )
    }

    /// Distinguishes `int f(` (routine) from `int x =` (declaration).
    fn looks_like_routine(&self) -> bool {
        matches!(self.peek_ahead(1), Some(Token::Ident(_, _)))
            && matches!(self.peek_ahead(2), Some(Token::LParen(_)))
    }

    pub(crate) fn match_token(&mut self, token: &Token) -> bool {
        if std::mem::discriminant(&self.peek_token()) == std::mem::discriminant(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn check(&self, token: &Token) -> bool {
        std::mem::discriminant(&self.peek_token()) == std::mem::discriminant(token)
    }

    pub(crate) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.position += 1;
        }
        self.previous()
    }

    pub(crate) fn is_at_end(&self) -> bool {
        matches!(self.peek_token(), Token::Eof(_))
    }

    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.position]
    }

    pub(crate) fn peek_token(&self) -> Token {
        self.tokens[self.position].clone()
    }

    pub(crate) fn peek_ahead(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.position + n)
    }

    pub(crate) fn previous(&self) -> &Token {
        &self.tokens[self.position - 1]
    }

    pub(crate) fn previous_location(&self) -> SourceLocation {
        self.previous().location()
    }

    pub(crate) fn current_location(&self) -> SourceLocation {
        self.peek().location()
    }

    pub(crate) fn expect_token(&mut self, token: &Token, message: &str) -> Result<(), ParseError> {
        if self.check(token) {
            self.advance();
            Ok(())
        } else {
            Err(ParseError {
                message: format!("{}, found {}", message, self.peek()),
                location: self.current_location(),
            })
        }
    }

    pub(crate) fn expect_lparen(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(
            &Token::LParen(self.current_location()),
            &format!("Expected '(' {ctx}"),
        )
    }

    pub(crate) fn expect_rparen(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(
            &Token::RParen(self.current_location()),
            &format!("Expected ')' {ctx}"),
        )
    }

    pub(crate) fn expect_lbrace(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(
            &Token::LBrace(self.current_location()),
            &format!("Expected '{{' {ctx}"),
        )
    }

    pub(crate) fn expect_rbrace(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(
            &Token::RBrace(self.current_location()),
            &format!("Expected '}}' {ctx}"),
        )
    }

    pub(crate) fn expect_semicolon(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(
            &Token::Semicolon(self.current_location()),
            &format!("Expected ';' {ctx}"),
        )
    }

    pub(crate) fn expect_identifier(&mut self) -> Result<String, ParseError> {
        if let Token::Ident(name, _) = self.peek_token() {
            self.advance();
            Ok(name)
        } else {
            Err(ParseError {
                message: format!("Expected identifier, found {}", self.peek()),
                location: self.current_location(),
            })
        }
    }
}
