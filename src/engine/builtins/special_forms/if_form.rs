use super::eval_operand;
use crate::engine::env::EnvRef;
use crate::engine::eval::EvalError;
use crate::engine::value::Value;
use tracing::{instrument, trace};

#[instrument(level = "trace", skip(args, env), fields(argc = args.len()), ret, err)]
pub fn eval_if(args: &[Value], env: EnvRef) -> Result<Value, EvalError> {
    trace!("Executing 'if' special form");
    let condition = eval_operand(args, 0, &env)?;
    if condition.is_truthy() {
        trace!("Condition is truthy, evaluating then-branch");
        eval_operand(args, 1, &env)
    } else {
        trace!(condition = %condition, "Condition is false, evaluating else-branch");
        eval_operand(args, 2, &env)
    }
}
