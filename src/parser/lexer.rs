//! Lexer for the debugged mini-language
//!
//! Converts program text (or a watch-expression string) into a flat [`Token`]
//! stream consumed by the parser.

use super::ast::SourceLocation;
use std::fmt;

/// All token variants produced by the lexer.
///
/// Every variant carries a [`SourceLocation`] so that parse errors can report
/// an accurate line and column without a separate token→location table.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    IntLiteral(i32, SourceLocation),
    LongLiteral(i64, SourceLocation),
    DoubleLiteral(f64, SourceLocation),
    CharLiteral(char, SourceLocation),
    StringLiteral(String, SourceLocation),
    True(SourceLocation),
    False(SourceLocation),

    // Identifiers
    Ident(String, SourceLocation),

    // Type keywords
    Boolean(SourceLocation),
    Char(SourceLocation),
    Int(SourceLocation),
    Long(SourceLocation),
    Double(SourceLocation),
    Str(SourceLocation),

    // Control keywords
    If(SourceLocation),
    Else(SourceLocation),
    While(SourceLocation),
    Return(SourceLocation),

    // Arithmetic
    Plus(SourceLocation),    // +
    Minus(SourceLocation),   // -
    Star(SourceLocation),    // *
    Slash(SourceLocation),   // /
    Percent(SourceLocation), // %

    // Comparison
    EqEq(SourceLocation),  // ==
    NotEq(SourceLocation), // !=
    Lt(SourceLocation),    // <
    Le(SourceLocation),    // <=
    Gt(SourceLocation),    // >
    Ge(SourceLocation),    // >=

    // Logical
    AndAnd(SourceLocation), // &&
    OrOr(SourceLocation),   // ||
    Bang(SourceLocation),   // !

    // Assignment
    Eq(SourceLocation), // =

    // Punctuation
    Dot(SourceLocation),       // .
    LParen(SourceLocation),    // (
    RParen(SourceLocation),    // )
    LBrace(SourceLocation),    // {
    RBrace(SourceLocation),    // }
    Semicolon(SourceLocation), // ;
    Comma(SourceLocation),     // ,

    // End of file
    Eof(SourceLocation),
}

impl Token {
    /// Returns the source location where this token appears.
    pub fn location(&self) -> SourceLocation {
        match self {
            Token::IntLiteral(_, loc)
            | Token::LongLiteral(_, loc)
            | Token::DoubleLiteral(_, loc)
            | Token::CharLiteral(_, loc)
            | Token::StringLiteral(_, loc)
            | Token::Ident(_, loc)
            | Token::True(loc)
            | Token::False(loc)
            | Token::Boolean(loc)
            | Token::Char(loc)
            | Token::Int(loc)
            | Token::Long(loc)
            | Token::Double(loc)
            | Token::Str(loc)
            | Token::If(loc)
            | Token::Else(loc)
            | Token::While(loc)
            | Token::Return(loc)
            | Token::Plus(loc)
            | Token::Minus(loc)
            | Token::Star(loc)
            | Token::Slash(loc)
            | Token::Percent(loc)
            | Token::EqEq(loc)
            | Token::NotEq(loc)
            | Token::Lt(loc)
            | Token::Le(loc)
            | Token::Gt(loc)
            | Token::Ge(loc)
            | Token::AndAnd(loc)
            | Token::OrOr(loc)
            | Token::Bang(loc)
            | Token::Eq(loc)
            | Token::Dot(loc)
            | Token::LParen(loc)
            | Token::RParen(loc)
            | Token::LBrace(loc)
            | Token::RBrace(loc)
            | Token::Semicolon(loc)
            | Token::Comma(loc)
            | Token::Eof(loc) => *loc,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::IntLiteral(n, _) => write!(f, "integer literal '{}'", n),
            Token::LongLiteral(n, _) => write!(f, "long literal '{}'", n),
            Token::DoubleLiteral(n, _) => write!(f, "double literal '{}'", n),
            Token::CharLiteral(c, _) => write!(f, "character literal '{}'", c),
            Token::StringLiteral(s, _) => write!(f, "string literal \"{}\"", s),
            Token::True(_) => write!(f, "'true'"),
            Token::False(_) => write!(f, "'false'"),
            Token::Ident(name, _) => write!(f, "identifier '{}'", name),
            Token::Boolean(_) => write!(f, "'boolean'"),
            Token::Char(_) => write!(f, "'char'"),
            Token::Int(_) => write!(f, "'int'"),
            Token::Long(_) => write!(f, "'long'"),
            Token::Double(_) => write!(f, "'double'"),
            Token::Str(_) => write!(f, "'string'"),
            Token::If(_) => write!(f, "'if'"),
            Token::Else(_) => write!(f, "'else'"),
            Token::While(_) => write!(f, "'while'"),
            Token::Return(_) => write!(f, "'return'"),
            Token::Plus(_) => write!(f, "'+'"),
            Token::Minus(_) => write!(f, "'-'"),
            Token::Star(_) => write!(f, "'*'"),
            Token::Slash(_) => write!(f, "'/'"),
            Token::Percent(_) => write!(f, "'%'"),
            Token::EqEq(_) => write!(f, "'=='"),
            Token::NotEq(_) => write!(f, "'!='"),
            Token::Lt(_) => write!(f, "'<'"),
            Token::Le(_) => write!(f, "'<='"),
            Token::Gt(_) => write!(f, "'>'"),
            Token::Ge(_) => write!(f, "'>='"),
            Token::AndAnd(_) => write!(f, "'&&'"),
            Token::OrOr(_) => write!(f, "'||'"),
            Token::Bang(_) => write!(f, "'!'"),
            Token::Eq(_) => write!(f, "'='"),
            Token::Dot(_) => write!(f, "'.'"),
            Token::LParen(_) => write!(f, "'('"),
            Token::RParen(_) => write!(f, "')'"),
            Token::LBrace(_) => write!(f, "'{{'"),
            Token::RBrace(_) => write!(f, "'}}'"),
            Token::Semicolon(_) => write!(f, "';'"),
            Token::Comma(_) => write!(f, "','"),
            Token::Eof(_) => write!(f, "end of file"),
        }
    }
}

/// Lexer error type
#[derive(Debug)]
pub struct LexError {
    pub message: String,
    pub location: SourceLocation,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Lexer error at line {}, column {}: {}",
            self.location.line, self.location.column, self.message
        )
    }
}

impl std::error::Error for LexError {}

/// Lexer for mini-language source text
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace_and_comments();

            if self.is_at_end() {
                tokens.push(Token::Eof(self.current_location()));
                break;
            }

            tokens.push(self.next_token()?);
        }

        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Token, LexError> {
        let loc = self.current_location();
        let ch = self.advance().ok_or_else(|| LexError {
            message: "Unexpected end of file".to_string(),
            location: loc,
        })?;

        match ch {
            '"' => self.string_literal(loc),
            '\'' => self.char_literal(loc),
            '0'..='9' => self.number_literal(ch, loc),
            'a'..='z' | 'A'..='Z' | '_' => Ok(self.identifier_or_keyword(ch, loc)),

            '+' => Ok(Token::Plus(loc)),
            '-' => Ok(Token::Minus(loc)),
            '*' => Ok(Token::Star(loc)),
            '/' => Ok(Token::Slash(loc)),
            '%' => Ok(Token::Percent(loc)),
            '=' => {
                if self.peek() == Some('=') {
                    self.advance();
                    Ok(Token::EqEq(loc))
                } else {
                    Ok(Token::Eq(loc))
                }
            }
            '!' => {
                if self.peek() == Some('=') {
                    self.advance();
                    Ok(Token::NotEq(loc))
                } else {
                    Ok(Token::Bang(loc))
                }
            }
            '<' => {
                if self.peek() == Some('=') {
                    self.advance();
                    Ok(Token::Le(loc))
                } else {
                    Ok(Token::Lt(loc))
                }
            }
            '>' => {
                if self.peek() == Some('=') {
                    self.advance();
                    Ok(Token::Ge(loc))
                } else {
                    Ok(Token::Gt(loc))
                }
            }
            '&' => {
                if self.peek() == Some('&') {
                    self.advance();
                    Ok(Token::AndAnd(loc))
                } else {
                    Err(LexError {
                        message: "Expected '&&'".to_string(),
                        location: loc,
                    })
                }
            }
            '|' => {
                if self.peek() == Some('|') {
                    self.advance();
                    Ok(Token::OrOr(loc))
                } else {
                    Err(LexError {
                        message: "Expected '||'".to_string(),
                        location: loc,
                    })
                }
            }
            '.' => Ok(Token::Dot(loc)),
            '(' => Ok(Token::LParen(loc)),
            ')' => Ok(Token::RParen(loc)),
            '{' => Ok(Token::LBrace(loc)),
            '}' => Ok(Token::RBrace(loc)),
            ';' => Ok(Token::Semicolon(loc)),
            ',' => Ok(Token::Comma(loc)),

            _ => Err(LexError {
                message: format!("Unexpected character: '{}'", ch),
                location: loc,
            }),
        }
    }

    fn string_literal(&mut self, loc: SourceLocation) -> Result<Token, LexError> {
        let mut string = String::new();

        while let Some(ch) = self.peek() {
            if ch == '"' {
                self.advance();
                return Ok(Token::StringLiteral(string, loc));
            }

            if ch == '\\' {
                self.advance();
                let escaped = self.advance().ok_or_else(|| LexError {
                    message: "Unexpected end of file in string literal".to_string(),
                    location: self.current_location(),
                })?;
                string.push(Self::unescape(escaped, self.current_location())?);
            } else {
                string.push(ch);
                self.advance();
            }
        }

        Err(LexError {
            message: "Unterminated string literal".to_string(),
            location: loc,
        })
    }

    fn char_literal(&mut self, loc: SourceLocation) -> Result<Token, LexError> {
        let ch = self.advance().ok_or_else(|| LexError {
            message: "Unexpected end of file in character literal".to_string(),
            location: self.current_location(),
        })?;

        let value = if ch == '\\' {
            let escaped = self.advance().ok_or_else(|| LexError {
                message: "Unexpected end of file in character literal".to_string(),
                location: self.current_location(),
            })?;
            Self::unescape(escaped, self.current_location())?
        } else {
            ch
        };

        match self.advance() {
            Some('\'') => Ok(Token::CharLiteral(value, loc)),
            _ => Err(LexError {
                message: "Expected closing ' in character literal".to_string(),
                location: self.current_location(),
            }),
        }
    }

    fn unescape(escaped: char, location: SourceLocation) -> Result<char, LexError> {
        match escaped {
            'n' => Ok('\n'),
            't' => Ok('\t'),
            'r' => Ok('\r'),
            '\\' => Ok('\\'),
            '\'' => Ok('\''),
            '"' => Ok('"'),
            '0' => Ok('\0'),
            _ => Err(LexError {
                message: format!("Unknown escape sequence: \\{}", escaped),
                location,
            }),
        }
    }

    /// Parse a numeric literal: int by default, `L` suffix for long, a
    /// decimal point for double.
    fn number_literal(&mut self, first: char, loc: SourceLocation) -> Result<Token, LexError> {
        let mut text = String::new();
        text.push(first);

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                text.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        // Fractional part; a '.' not followed by a digit is left for the
        // parser (qualified references use '.')
        if self.peek() == Some('.')
            && self
                .peek_ahead(1)
                .map(|c| c.is_ascii_digit())
                .unwrap_or(false)
        {
            text.push('.');
            self.advance();
            while let Some(ch) = self.peek() {
                if ch.is_ascii_digit() {
                    text.push(ch);
                    self.advance();
                } else {
                    break;
                }
            }
            let value = text.parse::<f64>().map_err(|_| LexError {
                message: format!("Invalid double literal: {}", text),
                location: loc,
            })?;
            return Ok(Token::DoubleLiteral(value, loc));
        }

        if self.peek() == Some('L') || self.peek() == Some('l') {
            self.advance();
            let value = text.parse::<i64>().map_err(|_| LexError {
                message: format!("Invalid long literal: {}", text),
                location: loc,
            })?;
            return Ok(Token::LongLiteral(value, loc));
        }

        let value = text.parse::<i32>().map_err(|_| LexError {
            message: format!("Invalid integer literal: {}", text),
            location: loc,
        })?;
        Ok(Token::IntLiteral(value, loc))
    }

    fn identifier_or_keyword(&mut self, first: char, loc: SourceLocation) -> Token {
        let mut text = String::new();
        text.push(first);

        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                text.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        match text.as_str() {
            "true" => Token::True(loc),
            "false" => Token::False(loc),
            "boolean" => Token::Boolean(loc),
            "char" => Token::Char(loc),
            "int" => Token::Int(loc),
            "long" => Token::Long(loc),
            "double" => Token::Double(loc),
            "string" => Token::Str(loc),
            "if" => Token::If(loc),
            "else" => Token::Else(loc),
            "while" => Token::While(loc),
            "return" => Token::Return(loc),
            _ => Token::Ident(text, loc),
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(ch) if ch.is_whitespace() => {
                    self.advance();
                }
                // Line comment: // to end of line
                Some('/') if self.peek_ahead(1) == Some('/') => {
                    while let Some(ch) = self.peek() {
                        if ch == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.input.get(self.position).copied()?;
        self.position += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_assignment() {
        let mut lexer = Lexer::new("a = 3-2;");
        let tokens = lexer.tokenize().unwrap();
        assert!(matches!(tokens[0], Token::Ident(ref n, _) if n == "a"));
        assert!(matches!(tokens[1], Token::Eq(_)));
        assert!(matches!(tokens[2], Token::IntLiteral(3, _)));
        assert!(matches!(tokens[3], Token::Minus(_)));
        assert!(matches!(tokens[4], Token::IntLiteral(2, _)));
        assert!(matches!(tokens[5], Token::Semicolon(_)));
        assert!(matches!(tokens[6], Token::Eof(_)));
    }

    #[test]
    fn tokenizes_literals() {
        let mut lexer = Lexer::new("5.3 12345L 'x' \"hi\" true false");
        let tokens = lexer.tokenize().unwrap();
        assert!(matches!(tokens[0], Token::DoubleLiteral(v, _) if v == 5.3));
        assert!(matches!(tokens[1], Token::LongLiteral(12345, _)));
        assert!(matches!(tokens[2], Token::CharLiteral('x', _)));
        assert!(matches!(tokens[3], Token::StringLiteral(ref s, _) if s == "hi"));
        assert!(matches!(tokens[4], Token::True(_)));
        assert!(matches!(tokens[5], Token::False(_)));
    }

    #[test]
    fn dot_after_integer_is_qualified_access() {
        // "A.a" style qualified reads must not be eaten as a double literal
        let mut lexer = Lexer::new("3+A.a");
        let tokens = lexer.tokenize().unwrap();
        assert!(matches!(tokens[0], Token::IntLiteral(3, _)));
        assert!(matches!(tokens[1], Token::Plus(_)));
        assert!(matches!(tokens[2], Token::Ident(ref n, _) if n == "A"));
        assert!(matches!(tokens[3], Token::Dot(_)));
        assert!(matches!(tokens[4], Token::Ident(ref n, _) if n == "a"));
    }

    #[test]
    fn tracks_line_numbers() {
        let mut lexer = Lexer::new("a = 1;\nb = 2;");
        let tokens = lexer.tokenize().unwrap();
        assert_eq!(tokens[0].location().line, 1);
        assert_eq!(tokens[4].location().line, 2);
    }
}
