// AST definitions for the debugged mini-language

use std::fmt;

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Declared types of the mini-language.
///
/// Every bound identifier carries one of these; assignment-time checks compare
/// the declared type against the type tag of the assigned value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Type {
    Boolean,
    Char,
    Int,
    Long,
    Double,
    String,
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Type::Boolean => "boolean",
            Type::Char => "char",
            Type::Int => "int",
            Type::Long => "long",
            Type::Double => "double",
            Type::String => "string",
        };
        write!(f, "{}", name)
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    // Logical (no short-circuit: both operands are always evaluated)
    And,
    Or,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg, // -x
    Not, // !x
}

/// Expression nodes.
///
/// Terms are evaluated in two modes: against the live scope chain during
/// trace generation, and against a set of per-program snapshots during
/// watch-expression and conditional-breakpoint evaluation. Qualified
/// references (`A.x`) are only meaningful in the second mode.
#[derive(Debug, Clone)]
pub enum Term {
    BoolLiteral(bool, SourceLocation),
    CharLiteral(char, SourceLocation),
    IntLiteral(i32, SourceLocation),
    LongLiteral(i64, SourceLocation),
    DoubleLiteral(f64, SourceLocation),
    StringLiteral(String, SourceLocation),
    Variable(String, SourceLocation),
    /// `A.x`: variable `x` read from program `A`'s snapshot
    Qualified {
        program: String,
        name: String,
        location: SourceLocation,
    },
    Unary {
        op: UnOp,
        operand: Box<Term>,
        location: SourceLocation,
    },
    Binary {
        op: BinOp,
        left: Box<Term>,
        right: Box<Term>,
        location: SourceLocation,
    },
    /// Routine call used as a term; only evaluable during trace generation
    Call {
        name: String,
        args: Vec<Term>,
        location: SourceLocation,
    },
}

impl Term {
    pub fn location(&self) -> SourceLocation {
        match self {
            Term::BoolLiteral(_, loc)
            | Term::CharLiteral(_, loc)
            | Term::IntLiteral(_, loc)
            | Term::LongLiteral(_, loc)
            | Term::DoubleLiteral(_, loc)
            | Term::StringLiteral(_, loc)
            | Term::Variable(_, loc) => *loc,
            Term::Qualified { location, .. }
            | Term::Unary { location, .. }
            | Term::Binary { location, .. }
            | Term::Call { location, .. } => *location,
        }
    }
}

/// Statement nodes.
///
/// A closed set: running one appends snapshots to the trace being generated.
#[derive(Debug, Clone)]
pub enum Command {
    /// `x = term;` or `int x = term;`. With `declared` set this is an
    /// explicit declaration; without it, the first assignment to an unbound
    /// name declares it with the inferred type.
    Assignment {
        name: String,
        declared: Option<Type>,
        term: Term,
        location: SourceLocation,
    },
    /// `x = f(a, b);` — runs the call, then assigns the routine's return
    /// value to an already-declared variable.
    CallingAssignment {
        name: String,
        routine: String,
        args: Vec<Term>,
        location: SourceLocation,
    },
    Conditional {
        guard: Term,
        then_branch: Vec<Command>,
        else_branch: Option<Vec<Command>>,
        location: SourceLocation,
    },
    Loop {
        guard: Term,
        body: Vec<Command>,
        location: SourceLocation,
    },
    /// Bare routine call statement; the return value is discarded.
    RoutineCall {
        name: String,
        args: Vec<Term>,
        location: SourceLocation,
    },
    Return {
        term: Term,
        location: SourceLocation,
    },
}

impl Command {
    pub fn location(&self) -> SourceLocation {
        match self {
            Command::Assignment { location, .. }
            | Command::CallingAssignment { location, .. }
            | Command::Conditional { location, .. }
            | Command::Loop { location, .. }
            | Command::RoutineCall { location, .. }
            | Command::Return { location, .. } => *location,
        }
    }
}

/// Routine parameter
#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub param_type: Type,
}

/// A declared routine: parameter list, return type and body.
///
/// Declarations register the routine; they emit no trace snapshot themselves.
#[derive(Debug, Clone)]
pub struct Routine {
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: Type,
    pub body: Vec<Command>,
    pub location: SourceLocation,
}

/// A parsed program: routine declarations plus the top-level command tree.
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub routines: Vec<Routine>,
    pub body: Vec<Command>,
}

impl Program {
    pub fn new() -> Self {
        Program::default()
    }
}
