// Declare modules for each special form
pub mod begin_form;
pub mod def_form;
pub mod if_form;
pub mod include_form;
pub mod lambda_form;
pub mod set_form;
pub mod while_form;

// Re-export public evaluation functions
pub use begin_form::eval_begin;
pub use def_form::eval_def;
pub use if_form::eval_if;
pub use include_form::{eval_include, include_module};
pub use lambda_form::eval_lambda;
pub use set_form::eval_set;
pub use while_form::eval_while;

use crate::engine::env::EnvRef;
use crate::engine::eval::{eval, EvalError};
use crate::engine::value::Value;

/// Evaluates the operand at `index`; a missing operand reads as `nil`.
pub(crate) fn eval_operand(args: &[Value], index: usize, env: &EnvRef) -> Result<Value, EvalError> {
    match args.get(index) {
        Some(expr) => eval(expr, std::rc::Rc::clone(env)),
        None => Ok(Value::Nil),
    }
}
