use super::eval_operand;
use crate::engine::env::EnvRef;
use crate::engine::eval::EvalError;
use crate::engine::value::Value;
use tracing::{instrument, trace};

/// `(while cond body)`: re-evaluates `body` while `cond` is truthy. There is no
/// iteration limit; an always-true condition never returns.
#[instrument(level = "trace", skip(args, env), fields(argc = args.len()), ret, err)]
pub fn eval_while(args: &[Value], env: EnvRef) -> Result<Value, EvalError> {
    trace!("Executing 'while' special form");
    let mut last = Value::Nil;
    let mut iterations = 0u64;
    while eval_operand(args, 0, &env)?.is_truthy() {
        last = eval_operand(args, 1, &env)?;
        iterations += 1;
    }
    trace!(iterations, "'while' loop finished");
    Ok(last)
}
