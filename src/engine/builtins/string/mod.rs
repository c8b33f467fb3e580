//! String builtins. Positions and lengths count characters, not bytes.

use crate::engine::builtins::{int_arg, str_arg};
use crate::engine::env::EnvRef;
use crate::engine::eval::EvalError;
use crate::engine::value::Value;
use tracing::{debug, trace};

pub fn native_strlen(args: Vec<Value>, _env: &EnvRef) -> Result<Value, EvalError> {
    let len = str_arg(&args, 0).map_or(0, |s| s.chars().count());
    Ok(Value::Int(i64::try_from(len).unwrap_or(i64::MAX)))
}

/// Joins every string argument; other arguments are skipped.
pub fn native_concat(args: Vec<Value>, _env: &EnvRef) -> Result<Value, EvalError> {
    trace!("Executing native string function: concat");
    let mut result = String::new();
    for arg in &args {
        match arg {
            Value::String(s) => result.push_str(s),
            other => debug!(argument = %other, "'concat' skips non-string argument"),
        }
    }
    Ok(Value::String(result))
}

/// `(substr s start len)`: a negative start counts as 0, a negative length takes the
/// rest of the string.
#[tracing::instrument(level = "trace", skip(args, _env), ret, err)]
pub fn native_substr(args: Vec<Value>, _env: &EnvRef) -> Result<Value, EvalError> {
    if args.len() < 3 {
        return Ok(Value::String(String::new()));
    }
    let Some(text) = str_arg(&args, 0) else {
        return Ok(Value::String(String::new()));
    };
    let start = usize::try_from(int_arg(&args, 1).max(0)).unwrap_or(usize::MAX);
    let len = usize::try_from(int_arg(&args, 2)).unwrap_or(usize::MAX);
    Ok(Value::String(text.chars().skip(start).take(len).collect()))
}

pub fn native_char_at(args: Vec<Value>, _env: &EnvRef) -> Result<Value, EvalError> {
    let Some(text) = str_arg(&args, 0) else {
        return Ok(Value::String(String::new()));
    };
    let index = int_arg(&args, 1);
    let found = usize::try_from(index)
        .ok()
        .and_then(|i| text.chars().nth(i))
        .map(String::from)
        .unwrap_or_default();
    Ok(Value::String(found))
}

/// `(split s delim)`: every piece between occurrences of `delim`, empty pieces included.
/// An empty delimiter yields the whole string as the only piece.
#[tracing::instrument(level = "trace", skip(args, _env), ret, err)]
pub fn native_split(args: Vec<Value>, _env: &EnvRef) -> Result<Value, EvalError> {
    let (Some(text), Some(delim)) = (str_arg(&args, 0), str_arg(&args, 1)) else {
        return Ok(Value::List(Vec::new()));
    };
    if delim.is_empty() {
        debug!("'split' with empty delimiter");
        return Ok(Value::List(vec![Value::String(text.to_string())]));
    }
    let pieces = text
        .split(delim)
        .map(|piece| Value::String(piece.to_string()))
        .collect();
    Ok(Value::List(pieces))
}
