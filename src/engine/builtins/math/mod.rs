use crate::engine::env::EnvRef;
use crate::engine::eval::EvalError;
use crate::engine::value::Value;
use std::cmp::Ordering;
use tracing::{debug, trace};

/// A numeric operand. Every non-number variant reads as `Int(0)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub(crate) fn of(value: &Value) -> Number {
        match value {
            Value::Int(i) => Number::Int(*i),
            Value::Float(f) => Number::Float(*f),
            other => {
                debug!(operand = %other, "Non-numeric operand read as 0");
                Number::Int(0)
            }
        }
    }

    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    fn into_value(self) -> Value {
        match self {
            Number::Int(i) => Value::Int(i),
            Number::Float(f) => Value::Float(f),
        }
    }
}

/// Reads an operand as `f64`; non-numbers read as 0.
pub(crate) fn number_arg(args: &[Value], index: usize) -> f64 {
    args.get(index).map_or(0.0, |v| Number::of(v).as_f64())
}

// Integer results until a float shows up; integer steps wrap.
fn fold_numbers(
    init: Number,
    operands: &[Value],
    int_op: fn(i64, i64) -> i64,
    float_op: fn(f64, f64) -> f64,
) -> Number {
    operands.iter().map(Number::of).fold(init, |acc, n| match (acc, n) {
        (Number::Int(a), Number::Int(b)) => Number::Int(int_op(a, b)),
        (a, b) => Number::Float(float_op(a.as_f64(), b.as_f64())),
    })
}

#[tracing::instrument(level = "trace", skip(args, _env), ret, err)]
pub fn native_add(args: Vec<Value>, _env: &EnvRef) -> Result<Value, EvalError> {
    trace!("Executing native '+' function");
    Ok(fold_numbers(Number::Int(0), &args, i64::wrapping_add, |a, b| a + b).into_value())
}

#[tracing::instrument(level = "trace", skip(args, _env), ret, err)]
pub fn native_subtract(args: Vec<Value>, _env: &EnvRef) -> Result<Value, EvalError> {
    trace!("Executing native '-' function");
    let Some((first, rest)) = args.split_first() else {
        return Ok(Value::Int(0));
    };
    // A single operand comes back unchanged; there is no unary negation.
    Ok(fold_numbers(Number::of(first), rest, i64::wrapping_sub, |a, b| a - b).into_value())
}

#[tracing::instrument(level = "trace", skip(args, _env), ret, err)]
pub fn native_multiply(args: Vec<Value>, _env: &EnvRef) -> Result<Value, EvalError> {
    trace!("Executing native '*' function");
    Ok(fold_numbers(Number::Int(1), &args, i64::wrapping_mul, |a, b| a * b).into_value())
}

/// Always produces a float. Division by zero follows IEEE rules.
#[tracing::instrument(level = "trace", skip(args, _env), ret, err)]
pub fn native_divide(args: Vec<Value>, _env: &EnvRef) -> Result<Value, EvalError> {
    trace!("Executing native '/' function");
    let Some((first, rest)) = args.split_first() else {
        return Ok(Value::Int(0));
    };
    let quotient = rest
        .iter()
        .fold(Number::of(first).as_f64(), |acc, v| acc / Number::of(v).as_f64());
    Ok(Value::Float(quotient))
}

// Missing operands read as 0. Two ints compare exactly, anything else as f64.
fn compare_operands(args: &[Value]) -> Option<Ordering> {
    let lhs = args.first().map_or(Number::Int(0), Number::of);
    let rhs = args.get(1).map_or(Number::Int(0), Number::of);
    match (lhs, rhs) {
        (Number::Int(a), Number::Int(b)) => Some(a.cmp(&b)),
        (a, b) => a.as_f64().partial_cmp(&b.as_f64()),
    }
}

// Helper macro to generate comparison functions
macro_rules! define_comparison_fn {
    ($fn_name:ident, $op_str:expr, $ordering:pat) => {
        #[tracing::instrument(level = "trace", skip(args, _env), ret, err)]
        pub fn $fn_name(args: Vec<Value>, _env: &EnvRef) -> Result<Value, EvalError> {
            trace!("Executing native '{}' function", $op_str);
            Ok(Value::from(matches!(compare_operands(&args), Some($ordering))))
        }
    };
}

define_comparison_fn!(native_less_than, "<", Ordering::Less);
define_comparison_fn!(native_greater_than, ">", Ordering::Greater);
define_comparison_fn!(native_less_than_or_equal, "<=", Ordering::Less | Ordering::Equal);
define_comparison_fn!(native_greater_than_or_equal, ">=", Ordering::Greater | Ordering::Equal);

/// `1` when both operands are ints, floats or strings of the same variant with equal
/// payloads. Every other pair, including two lists or two functions, gives `0`.
#[tracing::instrument(level = "trace", skip(args, _env), ret, err)]
pub fn native_equals(args: Vec<Value>, _env: &EnvRef) -> Result<Value, EvalError> {
    trace!("Executing native '=' function");
    match args.as_slice() {
        [Value::Int(a), Value::Int(b), ..] => Ok(Value::from(a == b)),
        [Value::Float(a), Value::Float(b), ..] => Ok(Value::from(a == b)),
        [Value::String(a), Value::String(b), ..] => Ok(Value::from(a == b)),
        [lhs, rhs, ..] => {
            trace!(lhs = lhs.type_name(), rhs = rhs.type_name(), "Only numbers and strings compare equal");
            Ok(Value::Int(0))
        }
        _ => {
            debug!(argc = args.len(), "'=' needs two operands");
            Ok(Value::Int(0))
        }
    }
}

pub fn native_not(args: Vec<Value>, _env: &EnvRef) -> Result<Value, EvalError> {
    Ok(Value::from(args.first().is_none_or(|v| v.int_field() == 0)))
}

pub fn native_and(args: Vec<Value>, _env: &EnvRef) -> Result<Value, EvalError> {
    Ok(Value::from(args.iter().all(Value::is_truthy)))
}

pub fn native_or(args: Vec<Value>, _env: &EnvRef) -> Result<Value, EvalError> {
    Ok(Value::from(args.iter().any(Value::is_truthy)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::env::Environment;
    use crate::engine::eval::evaluate_source;
    use crate::logging::init_test_logging;

    fn call(func: crate::engine::value::NativeFn, args: Vec<Value>) -> Value {
        init_test_logging();
        let env = Environment::new();
        func(args, &env).unwrap()
    }

    fn run(code: &str) -> Value {
        init_test_logging();
        let env = Environment::new_with_prelude();
        evaluate_source(code, &env).unwrap()
    }

    #[test]
    fn test_native_add() {
        assert_eq!(call(native_add, vec![]), Value::Int(0));
        assert_eq!(call(native_add, vec![Value::Int(1), Value::Int(2), Value::Int(3)]), Value::Int(6));
        assert_eq!(call(native_add, vec![Value::Int(1), Value::Float(0.5)]), Value::Float(1.5));
        assert_eq!(call(native_add, vec![Value::Float(0.5), Value::Int(1)]), Value::Float(1.5));
    }

    #[test]
    fn test_native_add_non_numbers_read_as_zero() {
        assert_eq!(
            call(native_add, vec![Value::Int(4), Value::String("9".into()), Value::Nil]),
            Value::Int(4)
        );
    }

    #[test]
    fn test_integer_arithmetic_wraps() {
        assert_eq!(call(native_add, vec![Value::Int(i64::MAX), Value::Int(1)]), Value::Int(i64::MIN));
        assert_eq!(call(native_multiply, vec![Value::Int(i64::MAX), Value::Int(2)]), Value::Int(-2));
    }

    #[test]
    fn test_native_subtract() {
        assert_eq!(call(native_subtract, vec![]), Value::Int(0));
        assert_eq!(call(native_subtract, vec![Value::Int(5)]), Value::Int(5));
        assert_eq!(call(native_subtract, vec![Value::Float(2.5)]), Value::Float(2.5));
        assert_eq!(call(native_subtract, vec![Value::Int(10), Value::Int(3), Value::Int(2)]), Value::Int(5));
        assert_eq!(call(native_subtract, vec![Value::Int(1), Value::Float(0.25)]), Value::Float(0.75));
    }

    #[test]
    fn test_native_multiply() {
        assert_eq!(call(native_multiply, vec![]), Value::Int(1));
        assert_eq!(call(native_multiply, vec![Value::Int(2), Value::Int(3)]), Value::Int(6));
        assert_eq!(call(native_multiply, vec![Value::Int(2), Value::Float(1.5)]), Value::Float(3.0));
    }

    #[test]
    fn test_native_divide_always_float() {
        assert_eq!(call(native_divide, vec![]), Value::Int(0));
        assert_eq!(call(native_divide, vec![Value::Int(4), Value::Int(2)]), Value::Float(2.0));
        assert_eq!(call(native_divide, vec![Value::Int(7)]), Value::Float(7.0));
        assert_eq!(call(native_divide, vec![Value::Int(1), Value::Int(4)]), Value::Float(0.25));
        assert_eq!(
            call(native_divide, vec![Value::Int(1), Value::Int(0)]),
            Value::Float(f64::INFINITY)
        );
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(run("(< 1 2)"), Value::Int(1));
        assert_eq!(run("(< 2 1)"), Value::Int(0));
        assert_eq!(run("(<= 2 2)"), Value::Int(1));
        assert_eq!(run("(>= 1 2.5)"), Value::Int(0));
        assert_eq!(run("(> 3 2.5)"), Value::Int(1));
        assert_eq!(run("(< 1)"), Value::Int(0));
        assert_eq!(run("(< -1)"), Value::Int(1));
    }

    #[test]
    fn test_comparing_large_ints_is_exact() {
        assert_eq!(
            call(
                native_less_than,
                vec![Value::Int(9_007_199_254_740_992), Value::Int(9_007_199_254_740_993)]
            ),
            Value::Int(1)
        );
    }

    #[test]
    fn test_native_equals() {
        assert_eq!(run("(= 3 3)"), Value::Int(1));
        assert_eq!(run("(= 3 3.0)"), Value::Int(0));
        assert_eq!(run("(= \"a\" \"a\")"), Value::Int(1));
        assert_eq!(run("(= 2.5 2.5)"), Value::Int(1));
        assert_eq!(run("(= \"a\" \"b\")"), Value::Int(0));
        assert_eq!(run("(= 1)"), Value::Int(0));
    }

    #[test]
    fn test_equals_is_false_outside_numbers_and_strings() {
        assert_eq!(run("(= (list 1 2) (list 1 2))"), Value::Int(0));
        assert_eq!(run("(= undefined-a undefined-b)"), Value::Int(0));
        assert_eq!(run("(= + +)"), Value::Int(0));
        assert_eq!(run("(begin (def f (lambda () 1)) (= f f))"), Value::Int(0));
    }

    #[test]
    fn test_logic() {
        assert_eq!(run("(not 0)"), Value::Int(1));
        assert_eq!(run("(not 5)"), Value::Int(0));
        assert_eq!(run("(not)"), Value::Int(1));
        assert_eq!(run("(not \"s\")"), Value::Int(1));
        assert_eq!(run("(and 1 2 3)"), Value::Int(1));
        assert_eq!(run("(and 1 0)"), Value::Int(0));
        assert_eq!(run("(and)"), Value::Int(1));
        assert_eq!(run("(or 0 0 7)"), Value::Int(1));
        assert_eq!(run("(or 0 1.5)"), Value::Int(0));
        assert_eq!(run("(or)"), Value::Int(0));
    }
}
