//! Term parsing implementation
//!
//! Precedence climbing for binary operators, recursive descent for the rest.
//! The same grammar serves program text and watch/condition strings; only in
//! the latter do qualified references (`A.x`) ever resolve, but the parser
//! accepts them uniformly and leaves the distinction to evaluation.
//!
//! Precedence, loosest to tightest: `||`, `&&`, `== !=`, `< <= > >=`,
//! `+ -`, `* / %`, unary `- !`.

use crate::parser::ast::*;
use crate::parser::lexer::Token;
use crate::parser::parse::{ParseError, Parser};

impl Parser {
    /// Parse a term (top-level entry point)
    pub(crate) fn parse_term(&mut self) -> Result<Term, ParseError> {
        self.parse_logical_or()
    }

    fn parse_logical_or(&mut self) -> Result<Term, ParseError> {
        let mut left = self.parse_logical_and()?;

        while self.match_token(&Token::OrOr(self.current_location())) {
            let loc = self.previous_location();
            let right = Box::new(self.parse_logical_and()?);
            left = Term::Binary {
                op: BinOp::Or,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    fn parse_logical_and(&mut self) -> Result<Term, ParseError> {
        let mut left = self.parse_equality()?;

        while self.match_token(&Token::AndAnd(self.current_location())) {
            let loc = self.previous_location();
            let right = Box::new(self.parse_equality()?);
            left = Term::Binary {
                op: BinOp::And,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Term, ParseError> {
        let mut left = self.parse_comparison()?;

        loop {
            let op = if self.match_token(&Token::EqEq(self.current_location())) {
                BinOp::Eq
            } else if self.match_token(&Token::NotEq(self.current_location())) {
                BinOp::Ne
            } else {
                break;
            };
            let loc = self.previous_location();
            let right = Box::new(self.parse_comparison()?);
            left = Term::Binary {
                op,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Term, ParseError> {
        let mut left = self.parse_additive()?;

        loop {
            let op = if self.match_token(&Token::Lt(self.current_location())) {
                BinOp::Lt
            } else if self.match_token(&Token::Le(self.current_location())) {
                BinOp::Le
            } else if self.match_token(&Token::Gt(self.current_location())) {
                BinOp::Gt
            } else if self.match_token(&Token::Ge(self.current_location())) {
                BinOp::Ge
            } else {
                break;
            };
            let loc = self.previous_location();
            let right = Box::new(self.parse_additive()?);
            left = Term::Binary {
                op,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Term, ParseError> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = if self.match_token(&Token::Plus(self.current_location())) {
                BinOp::Add
            } else if self.match_token(&Token::Minus(self.current_location())) {
                BinOp::Sub
            } else {
                break;
            };
            let loc = self.previous_location();
            let right = Box::new(self.parse_multiplicative()?);
            left = Term::Binary {
                op,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Term, ParseError> {
        let mut left = self.parse_unary()?;

        loop {
            let op = if self.match_token(&Token::Star(self.current_location())) {
                BinOp::Mul
            } else if self.match_token(&Token::Slash(self.current_location())) {
                BinOp::Div
            } else if self.match_token(&Token::Percent(self.current_location())) {
                BinOp::Mod
            } else {
                break;
            };
            let loc = self.previous_location();
            let right = Box::new(self.parse_unary()?);
            left = Term::Binary {
                op,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Term, ParseError> {
        if self.match_token(&Token::Minus(self.current_location())) {
            let loc = self.previous_location();
            let operand = Box::new(self.parse_unary()?);
            return Ok(Term::Unary {
                op: UnOp::Neg,
                operand,
                location: loc,
            });
        }
        if self.match_token(&Token::Bang(self.current_location())) {
            let loc = self.previous_location();
            let operand = Box::new(self.parse_unary()?);
            return Ok(Term::Unary {
                op: UnOp::Not,
                operand,
                location: loc,
            });
        }

        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Term, ParseError> {
        match self.peek_token() {
            Token::IntLiteral(value, loc) => {
                self.advance();
                Ok(Term::IntLiteral(value, loc))
            }
            Token::LongLiteral(value, loc) => {
                self.advance();
                Ok(Term::LongLiteral(value, loc))
            }
            Token::DoubleLiteral(value, loc) => {
                self.advance();
                Ok(Term::DoubleLiteral(value, loc))
            }
            Token::CharLiteral(value, loc) => {
                self.advance();
                Ok(Term::CharLiteral(value, loc))
            }
            Token::StringLiteral(value, loc) => {
                self.advance();
                Ok(Term::StringLiteral(value, loc))
            }
            Token::True(loc) => {
                self.advance();
                Ok(Term::BoolLiteral(true, loc))
            }
            Token::False(loc) => {
                self.advance();
                Ok(Term::BoolLiteral(false, loc))
            }
            Token::Ident(name, loc) => {
                self.advance();
                self.parse_reference_or_call(name, loc)
            }
            Token::LParen(_) => {
                self.advance();
                let term = self.parse_term()?;
                self.expect_rparen("to close grouping")?;
                Ok(term)
            }
            other => Err(ParseError {
                message: format!("Expected term, found {}", other),
                location: self.current_location(),
            }),
        }
    }

    /// An identifier continues as `A.x` (qualified reference), `f(args)`
    /// (routine call) or stands alone as a variable reference.
    fn parse_reference_or_call(
        &mut self,
        name: String,
        loc: SourceLocation,
    ) -> Result<Term, ParseError> {
        if self.match_token(&Token::Dot(loc)) {
            let member = self.expect_identifier()?;
            return Ok(Term::Qualified {
                program: name,
                name: member,
                location: loc,
            });
        }

        if self.check(&Token::LParen(loc)) {
            self.advance();
            let args = self.parse_arguments()?;
            return Ok(Term::Call {
                name,
                args,
                location: loc,
            });
        }

        Ok(Term::Variable(name, loc))
    }

    /// Comma-separated argument terms up to the closing parenthesis,
    /// which is consumed.
    pub(crate) fn parse_arguments(&mut self) -> Result<Vec<Term>, ParseError> {
        let mut args = Vec::new();
        if self.check(&Token::RParen(self.current_location())) {
            self.advance();
            return Ok(args);
        }
        loop {
            args.push(self.parse_term()?);
            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
        }
        self.expect_rparen("after arguments")?;
        Ok(args)
    }
}
