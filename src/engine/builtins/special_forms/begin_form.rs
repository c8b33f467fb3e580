use crate::engine::env::{EnvRef, Environment};
use crate::engine::eval::{eval, EvalError};
use crate::engine::value::Value;
use std::rc::Rc;
use tracing::{instrument, trace};

/// `(begin expr*)`: evaluates the body in one new child frame and returns the last value.
#[instrument(level = "trace", skip(args, env), fields(argc = args.len()), ret, err)]
pub fn eval_begin(args: &[Value], env: EnvRef) -> Result<Value, EvalError> {
    trace!("Executing 'begin' special form");
    let local = Environment::new_enclosed(env);
    let mut last = Value::Nil;
    for expr in args {
        last = eval(expr, Rc::clone(&local))?;
    }
    Ok(last)
}
