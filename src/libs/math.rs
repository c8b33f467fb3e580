use crate::engine::builtins::math::{number_arg, Number};
use crate::engine::env::{EnvRef, Environment};
use crate::engine::eval::EvalError;
use crate::engine::value::Value;
use tracing::{debug, trace};

pub fn load_math_lib(env: &mut Environment) {
    trace!("Loading math module");
    let functions: [(&str, crate::engine::value::NativeFn); 11] = [
        ("sqrt", native_sqrt),
        ("abs", native_abs),
        ("pow", native_pow),
        ("min", native_min),
        ("max", native_max),
        ("sin", native_sin),
        ("cos", native_cos),
        ("tan", native_tan),
        ("arcsin", native_arcsin),
        ("arccos", native_arccos),
        ("arctan", native_arctan),
    ];
    for (name, func) in functions {
        env.define(name, Value::native(&format!("math.{name}"), func));
    }
    env.define("pi", Value::Float(std::f64::consts::PI));
    env.define("e", Value::Float(std::f64::consts::E));
}

/// Keeps the operand's variant. Anything that is not a number is `nil`.
pub fn native_abs(args: Vec<Value>, _env: &EnvRef) -> Result<Value, EvalError> {
    match args.first() {
        None => Ok(Value::Int(0)),
        Some(Value::Int(i)) => Ok(Value::Int(i.wrapping_abs())),
        Some(Value::Float(f)) => Ok(Value::Float(f.abs())),
        Some(other) => {
            debug!(operand = %other, "'math.abs' of a non-number");
            Ok(Value::Nil)
        }
    }
}

/// Negative or non-numeric operands give `nil`.
pub fn native_sqrt(args: Vec<Value>, _env: &EnvRef) -> Result<Value, EvalError> {
    let operand = match args.first() {
        None => return Ok(Value::Int(0)),
        Some(v @ (Value::Int(_) | Value::Float(_))) => Number::of(v).as_f64(),
        Some(_) => return Ok(Value::Nil),
    };
    if operand < 0.0 {
        debug!(operand, "'math.sqrt' of a negative number");
        return Ok(Value::Nil);
    }
    Ok(Value::Float(operand.sqrt()))
}

pub fn native_pow(args: Vec<Value>, _env: &EnvRef) -> Result<Value, EvalError> {
    if args.len() < 2 {
        return Ok(Value::Float(0.0));
    }
    Ok(Value::Float(number_arg(&args, 0).powf(number_arg(&args, 1))))
}

fn extremum(args: &[Value], keep: fn(f64, f64) -> bool) -> Value {
    let mut operands = args.iter().map(|v| Number::of(v).as_f64());
    let Some(first) = operands.next() else {
        return Value::Nil;
    };
    Value::Float(operands.fold(first, |best, x| if keep(x, best) { x } else { best }))
}

pub fn native_min(args: Vec<Value>, _env: &EnvRef) -> Result<Value, EvalError> {
    Ok(extremum(&args, |x, best| x < best))
}

pub fn native_max(args: Vec<Value>, _env: &EnvRef) -> Result<Value, EvalError> {
    Ok(extremum(&args, |x, best| x > best))
}

// Helper macro for the single-operand float functions; no operand gives 0.0.
macro_rules! define_unary_fn {
    ($fn_name:ident, $method:ident) => {
        pub fn $fn_name(args: Vec<Value>, _env: &EnvRef) -> Result<Value, EvalError> {
            if args.is_empty() {
                return Ok(Value::Float(0.0));
            }
            Ok(Value::Float(number_arg(&args, 0).$method()))
        }
    };
}

define_unary_fn!(native_sin, sin);
define_unary_fn!(native_cos, cos);
define_unary_fn!(native_tan, tan);
define_unary_fn!(native_arcsin, asin);
define_unary_fn!(native_arccos, acos);
define_unary_fn!(native_arctan, atan);
