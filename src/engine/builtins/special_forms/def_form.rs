use super::eval_operand;
use crate::engine::env::EnvRef;
use crate::engine::eval::EvalError;
use crate::engine::value::Value;
use tracing::{debug, instrument, trace};

/// `(def name expr)`: binds the value of `expr` in the current frame and returns it.
#[instrument(level = "trace", skip(args, env), fields(argc = args.len()), ret, err)]
pub fn eval_def(args: &[Value], env: EnvRef) -> Result<Value, EvalError> {
    trace!("Executing 'def' special form");
    let value = eval_operand(args, 1, &env)?;
    match args.first() {
        Some(Value::Symbol(name)) => {
            env.borrow_mut().define(name.as_str(), value.clone());
        }
        other => {
            debug!(name = ?other, "'def' target is not a symbol, nothing bound");
        }
    }
    Ok(value)
}
