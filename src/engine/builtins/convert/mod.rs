use crate::engine::builtins::str_arg;
use crate::engine::env::EnvRef;
use crate::engine::eval::EvalError;
use crate::engine::value::Value;
use nom::{
    IResult, Parser,
    character::complete::{digit1, one_of},
    combinator::{opt, recognize},
    number::complete::double,
    sequence::pair,
};
use tracing::{debug, trace};

// C-style leading whitespace: space, \t, \n, \v, \f, \r.
fn leading_space(input: &str) -> &str {
    input.trim_start_matches([' ', '\t', '\n', '\u{b}', '\u{c}', '\r'])
}

fn integer_prefix(input: &str) -> IResult<&str, &str> {
    recognize(pair(opt(one_of("+-")), digit1)).parse(input)
}

/// Reads the longest integer prefix of `text`, ignoring leading whitespace.
/// Text without one reads as 0; out-of-range magnitudes saturate.
pub(crate) fn parse_int_prefix(text: &str) -> i64 {
    match integer_prefix(leading_space(text)) {
        Ok((_, digits)) => digits.parse::<i64>().unwrap_or_else(|_| {
            if digits.starts_with('-') {
                i64::MIN
            } else {
                i64::MAX
            }
        }),
        Err(_) => 0,
    }
}

/// Reads the longest floating-point prefix of `text`, ignoring leading whitespace.
pub(crate) fn parse_float_prefix(text: &str) -> f64 {
    let parsed: IResult<&str, f64> = double(leading_space(text));
    parsed.map_or(0.0, |(_, n)| n)
}

/// `(int s)`: integer prefix of a string; any other argument gives 0.
#[tracing::instrument(level = "trace", skip(args, _env), ret, err)]
pub fn native_int(args: Vec<Value>, _env: &EnvRef) -> Result<Value, EvalError> {
    match str_arg(&args, 0) {
        Some(text) => Ok(Value::Int(parse_int_prefix(text))),
        None => {
            debug!(argument = ?args.first(), "'int' only converts strings");
            Ok(Value::Int(0))
        }
    }
}

#[tracing::instrument(level = "trace", skip(args, _env), ret, err)]
pub fn native_float(args: Vec<Value>, _env: &EnvRef) -> Result<Value, EvalError> {
    #[allow(clippy::cast_precision_loss)]
    let converted = match args.first() {
        Some(Value::Int(i)) => *i as f64,
        Some(Value::Float(f)) => *f,
        Some(Value::String(s)) => parse_float_prefix(s),
        _ => 0.0,
    };
    Ok(Value::Float(converted))
}

pub fn native_string(args: Vec<Value>, _env: &EnvRef) -> Result<Value, EvalError> {
    trace!("Executing native 'string' function");
    let text = args.first().and_then(Value::display_text).unwrap_or_default();
    Ok(Value::String(text))
}

pub fn native_type(args: Vec<Value>, _env: &EnvRef) -> Result<Value, EvalError> {
    let name = args.first().map_or("nil", Value::type_name);
    Ok(Value::String(name.to_string()))
}
