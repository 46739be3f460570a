//! Runtime value representation
//!
//! [`Value`] is the tagged union of everything a mini-language variable can
//! hold. Values are immutable once constructed; every operation returns a
//! fresh value. Arithmetic promotes across the numeric tower Int → Long →
//! Double; any operation between incompatible tags fails with a
//! [`RuntimeError::TypeMismatch`].

use crate::interpreter::errors::RuntimeError;
use crate::parser::ast::{BinOp, Type, UnOp};
use std::fmt;

/// Runtime values
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Char(char),
    Int(i32),
    Long(i64),
    Double(f64),
    Str(String),
}

/// Numeric values after promotion to a common representation
enum Numeric {
    Long(i64, i64),
    Double(f64, f64),
}

impl Value {
    /// The type tag of this value, as used for declaration checks.
    pub fn value_type(&self) -> Type {
        match self {
            Value::Bool(_) => Type::Boolean,
            Value::Char(_) => Type::Char,
            Value::Int(_) => Type::Int,
            Value::Long(_) => Type::Long,
            Value::Double(_) => Type::Double,
            Value::Str(_) => Type::String,
        }
    }

    fn type_name(&self) -> String {
        self.value_type().to_string()
    }

    /// Promote two numeric operands to a common representation. `None` if
    /// either operand is not numeric.
    fn promote(&self, other: &Value) -> Option<Numeric> {
        match (self, other) {
            (Value::Double(_), _) | (_, Value::Double(_)) => {
                Some(Numeric::Double(self.as_f64()?, other.as_f64()?))
            }
            _ => Some(Numeric::Long(self.as_i64()?, other.as_i64()?)),
        }
    }

    fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n as i64),
            Value::Long(n) => Some(*n),
            _ => None,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Long(n) => Some(*n as f64),
            Value::Double(n) => Some(*n),
            _ => None,
        }
    }

    /// True when both operands are Int; Int arithmetic stays Int.
    fn both_int(&self, other: &Value) -> bool {
        matches!((self, other), (Value::Int(_), Value::Int(_)))
    }

    pub fn expect_bool(&self, line: usize) -> Result<bool, RuntimeError> {
        match self {
            Value::Bool(b) => Ok(*b),
            other => Err(RuntimeError::TypeMismatch {
                expected: "boolean".to_string(),
                got: other.type_name(),
                line,
            }),
        }
    }

    /// Equality between values of compatible types. Numeric values compare
    /// after promotion; anything else requires identical tags.
    pub fn equals(&self, other: &Value, line: usize) -> Result<bool, RuntimeError> {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => Ok(a == b),
            (Value::Char(a), Value::Char(b)) => Ok(a == b),
            (Value::Str(a), Value::Str(b)) => Ok(a == b),
            _ => match self.promote(other) {
                Some(Numeric::Long(a, b)) => Ok(a == b),
                Some(Numeric::Double(a, b)) => Ok(a == b),
                None => Err(self.incompatible(other, line)),
            },
        }
    }

    /// Strict ordering; defined on numeric values and chars.
    pub fn greater_than(&self, other: &Value, line: usize) -> Result<bool, RuntimeError> {
        match (self, other) {
            (Value::Char(a), Value::Char(b)) => Ok(a > b),
            _ => match self.promote(other) {
                Some(Numeric::Long(a, b)) => Ok(a > b),
                Some(Numeric::Double(a, b)) => Ok(a > b),
                None => Err(self.incompatible(other, line)),
            },
        }
    }

    pub fn less_than(&self, other: &Value, line: usize) -> Result<bool, RuntimeError> {
        match (self, other) {
            (Value::Char(a), Value::Char(b)) => Ok(a < b),
            _ => match self.promote(other) {
                Some(Numeric::Long(a, b)) => Ok(a < b),
                Some(Numeric::Double(a, b)) => Ok(a < b),
                None => Err(self.incompatible(other, line)),
            },
        }
    }

    fn incompatible(&self, other: &Value, line: usize) -> RuntimeError {
        RuntimeError::TypeMismatch {
            expected: self.type_name(),
            got: other.type_name(),
            line,
        }
    }
}

/// Apply a binary operator to two already-evaluated operands.
///
/// Both operands are always evaluated before this is called; the logical
/// operators deliberately do not short-circuit, so an unbound identifier on
/// the right-hand side is reported rather than masked.
pub fn apply_binary(
    op: BinOp,
    left: &Value,
    right: &Value,
    line: usize,
) -> Result<Value, RuntimeError> {
    match op {
        BinOp::Add => arithmetic(left, right, line, i64::wrapping_add, |a, b| a + b),
        BinOp::Sub => arithmetic(left, right, line, i64::wrapping_sub, |a, b| a - b),
        BinOp::Mul => arithmetic(left, right, line, i64::wrapping_mul, |a, b| a * b),
        BinOp::Div => {
            if integer_zero_divisor(left, right) {
                return Err(RuntimeError::DivisionByZero { line });
            }
            arithmetic(left, right, line, i64::wrapping_div, |a, b| a / b)
        }
        BinOp::Mod => {
            if integer_zero_divisor(left, right) {
                return Err(RuntimeError::DivisionByZero { line });
            }
            arithmetic(left, right, line, i64::wrapping_rem, |a, b| a % b)
        }
        BinOp::Eq => Ok(Value::Bool(left.equals(right, line)?)),
        BinOp::Ne => Ok(Value::Bool(!left.equals(right, line)?)),
        BinOp::Lt => Ok(Value::Bool(left.less_than(right, line)?)),
        BinOp::Gt => Ok(Value::Bool(left.greater_than(right, line)?)),
        BinOp::Le => Ok(Value::Bool(!left.greater_than(right, line)?)),
        BinOp::Ge => Ok(Value::Bool(!left.less_than(right, line)?)),
        BinOp::And => Ok(Value::Bool(
            left.expect_bool(line)? & right.expect_bool(line)?,
        )),
        BinOp::Or => Ok(Value::Bool(
            left.expect_bool(line)? | right.expect_bool(line)?,
        )),
    }
}

/// Apply a unary operator to an already-evaluated operand.
pub fn apply_unary(op: UnOp, operand: &Value, line: usize) -> Result<Value, RuntimeError> {
    match (op, operand) {
        (UnOp::Neg, Value::Int(n)) => Ok(Value::Int(n.wrapping_neg())),
        (UnOp::Neg, Value::Long(n)) => Ok(Value::Long(n.wrapping_neg())),
        (UnOp::Neg, Value::Double(n)) => Ok(Value::Double(-n)),
        (UnOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
        (UnOp::Neg, other) => Err(RuntimeError::TypeMismatch {
            expected: "numeric".to_string(),
            got: other.type_name(),
            line,
        }),
        (UnOp::Not, other) => Err(RuntimeError::TypeMismatch {
            expected: "boolean".to_string(),
            got: other.type_name(),
            line,
        }),
    }
}

/// A zero divisor is only fatal when the operation stays integral; with a
/// double on the left, promotion makes it a double division, which yields
/// inf/NaN instead.
fn integer_zero_divisor(left: &Value, right: &Value) -> bool {
    matches!(right, Value::Int(0) | Value::Long(0)) && !matches!(left, Value::Double(_))
}

fn arithmetic(
    left: &Value,
    right: &Value,
    line: usize,
    int_op: fn(i64, i64) -> i64,
    float_op: fn(f64, f64) -> f64,
) -> Result<Value, RuntimeError> {
    match left.promote(right) {
        Some(Numeric::Double(a, b)) => Ok(Value::Double(float_op(a, b))),
        Some(Numeric::Long(a, b)) => {
            let result = int_op(a, b);
            if left.both_int(right) {
                Ok(Value::Int(result as i32))
            } else {
                Ok(Value::Long(result))
            }
        }
        None => Err(left.incompatible(right, line)),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Char(c) => write!(f, "{}", c),
            Value::Int(n) => write!(f, "{}", n),
            Value::Long(n) => write!(f, "{}", n),
            Value::Double(n) => write!(f, "{}", n),
            Value::Str(s) => write!(f, "{}", s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_arithmetic_stays_int() {
        let v = apply_binary(BinOp::Add, &Value::Int(1), &Value::Int(2), 1).unwrap();
        assert_eq!(v, Value::Int(3));
    }

    #[test]
    fn int_double_promotes() {
        let v = apply_binary(BinOp::Add, &Value::Int(3), &Value::Double(5.3), 1).unwrap();
        assert_eq!(v, Value::Double(8.3));
        assert_eq!(v.to_string(), "8.3");
    }

    #[test]
    fn int_long_promotes_to_long() {
        let v = apply_binary(BinOp::Mul, &Value::Int(2), &Value::Long(30), 1).unwrap();
        assert_eq!(v, Value::Long(60));
    }

    #[test]
    fn division_by_zero_fails() {
        let err = apply_binary(BinOp::Div, &Value::Int(1), &Value::Int(0), 7).unwrap_err();
        assert!(matches!(err, RuntimeError::DivisionByZero { line: 7 }));

        let err = apply_binary(BinOp::Mod, &Value::Long(1), &Value::Int(0), 7).unwrap_err();
        assert!(matches!(err, RuntimeError::DivisionByZero { line: 7 }));
    }

    #[test]
    fn double_division_by_zero_promotes_instead_of_failing() {
        let v = apply_binary(BinOp::Div, &Value::Double(5.3), &Value::Int(0), 1).unwrap();
        assert!(matches!(v, Value::Double(d) if d.is_infinite()));

        let v = apply_binary(BinOp::Mod, &Value::Double(5.3), &Value::Int(0), 1).unwrap();
        assert!(matches!(v, Value::Double(d) if d.is_nan()));
    }

    #[test]
    fn bool_and_int_incompatible() {
        let err = apply_binary(BinOp::Add, &Value::Bool(true), &Value::Int(1), 2).unwrap_err();
        assert!(matches!(err, RuntimeError::TypeMismatch { .. }));
    }

    #[test]
    fn comparison_chain() {
        // 3 < 1+3
        let sum = apply_binary(BinOp::Add, &Value::Int(1), &Value::Int(3), 1).unwrap();
        let v = apply_binary(BinOp::Lt, &Value::Int(3), &sum, 1).unwrap();
        assert_eq!(v, Value::Bool(true));
    }
}
