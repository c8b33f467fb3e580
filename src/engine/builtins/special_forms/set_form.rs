use super::eval_operand;
use crate::engine::env::EnvRef;
use crate::engine::eval::EvalError;
use crate::engine::value::Value;
use tracing::{debug, instrument, trace};

/// `(set! name expr)`: overwrites the nearest existing binding of `name`.
/// Assigning an unbound name creates nothing; the value is returned either way.
#[instrument(level = "trace", skip(args, env), fields(argc = args.len()), ret, err)]
pub fn eval_set(args: &[Value], env: EnvRef) -> Result<Value, EvalError> {
    trace!("Executing 'set!' special form");
    let value = eval_operand(args, 1, &env)?;
    match args.first() {
        Some(Value::Symbol(name)) => {
            if !env.borrow_mut().set_existing(name, value.clone()) {
                debug!(name = %name, "'set!' on unbound name ignored");
            }
        }
        other => {
            debug!(name = ?other, "'set!' target is not a symbol, nothing assigned");
        }
    }
    Ok(value)
}
