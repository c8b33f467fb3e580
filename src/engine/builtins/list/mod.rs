//! List builtins. Lists are values: every "mutating" operation returns a new list and
//! leaves its argument untouched.

use crate::engine::builtins::{index_in, int_arg};
use crate::engine::env::EnvRef;
use crate::engine::eval::EvalError;
use crate::engine::value::Value;
use tracing::{debug, trace};

fn list_arg(args: &[Value], op_name: &str) -> Option<Vec<Value>> {
    match args.first() {
        Some(Value::List(items)) => Some(items.clone()),
        other => {
            debug!(operator = %op_name, argument = ?other, "Expected a list");
            None
        }
    }
}

pub fn native_list(args: Vec<Value>, _env: &EnvRef) -> Result<Value, EvalError> {
    Ok(Value::List(args))
}

/// `(get list index)`: the item at `index`, or `nil` when out of range.
pub fn native_get(args: Vec<Value>, _env: &EnvRef) -> Result<Value, EvalError> {
    trace!("Executing native list function: get");
    if args.len() < 2 {
        return Ok(Value::Nil);
    }
    let Some(items) = list_arg(&args, "get") else {
        return Ok(Value::Nil);
    };
    let index = int_arg(&args, 1);
    match index_in(index, items.len()) {
        Some(i) => Ok(items[i].clone()),
        None => {
            debug!(index, len = items.len(), "'get' index out of range");
            Ok(Value::Nil)
        }
    }
}

/// `(set list index value)`: a copy with one slot replaced. An out-of-range index
/// returns the copy unchanged.
pub fn native_set(mut args: Vec<Value>, _env: &EnvRef) -> Result<Value, EvalError> {
    trace!("Executing native list function: set");
    if args.len() < 3 {
        return Ok(Value::Nil);
    }
    let Some(mut items) = list_arg(&args, "set") else {
        return Ok(Value::Nil);
    };
    let index = int_arg(&args, 1);
    match index_in(index, items.len()) {
        Some(i) => items[i] = args.swap_remove(2),
        None => debug!(index, len = items.len(), "'set' index out of range"),
    }
    Ok(Value::List(items))
}

pub fn native_len(args: Vec<Value>, _env: &EnvRef) -> Result<Value, EvalError> {
    let len = match args.first() {
        Some(Value::List(items)) => items.len(),
        _ => 0,
    };
    Ok(Value::Int(i64::try_from(len).unwrap_or(i64::MAX)))
}

pub fn native_push(mut args: Vec<Value>, _env: &EnvRef) -> Result<Value, EvalError> {
    if args.len() < 2 {
        return Ok(Value::Nil);
    }
    let Some(mut items) = list_arg(&args, "push") else {
        return Ok(Value::Nil);
    };
    items.push(args.swap_remove(1));
    Ok(Value::List(items))
}

/// `(pop list)`: a copy without the last item; `nil` for an empty list.
pub fn native_pop(args: Vec<Value>, _env: &EnvRef) -> Result<Value, EvalError> {
    let Some(mut items) = list_arg(&args, "pop") else {
        return Ok(Value::Nil);
    };
    if items.pop().is_none() {
        debug!("'pop' on an empty list");
        return Ok(Value::Nil);
    }
    Ok(Value::List(items))
}

/// `(slice list start end)`: items in `[start, end)`, both ends clamped to the list.
pub fn native_slice(args: Vec<Value>, _env: &EnvRef) -> Result<Value, EvalError> {
    trace!("Executing native list function: slice");
    if args.len() < 3 {
        return Ok(Value::Nil);
    }
    let Some(items) = list_arg(&args, "slice") else {
        return Ok(Value::Nil);
    };
    let clamp = |bound: i64| usize::try_from(bound.max(0)).unwrap_or(usize::MAX).min(items.len());
    let start = clamp(int_arg(&args, 1));
    let end = clamp(int_arg(&args, 2));
    if start >= end {
        return Ok(Value::List(Vec::new()));
    }
    Ok(Value::List(items[start..end].to_vec()))
}
