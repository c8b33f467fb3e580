use crate::engine::builtins::special_forms;
use crate::engine::env::{EnvRef, Environment};
use crate::engine::parser::Reader;
use crate::engine::special_forms as special_form_constants;
use crate::engine::stack::ensure_sufficient_stack;
use crate::engine::value::Value;
use std::rc::Rc;
use thiserror::Error;
use tracing::{debug, instrument, trace};

/// Conditions that abort a whole run. Everything a script can get wrong short of
/// these evaluates to `nil` and is only reported through the log.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("script requested exit")]
    Exit,
    #[error("evaluation nested deeper than {limit} levels")]
    DepthExceeded { limit: usize },
}

/// Parses and evaluates every top-level form of `source` against `env`, returning the
/// value of the last form (`nil` if there is none).
pub fn evaluate_source(source: &str, env: &EnvRef) -> Result<Value, EvalError> {
    let mut reader = Reader::new(source);
    let mut last = Value::Nil;
    while !reader.eof() {
        let form = reader.parse();
        last = eval(&form, Rc::clone(env))?;
    }
    Ok(last)
}

#[instrument(level = "trace", skip(expr, env), fields(expr = %expr), ret, err)]
pub fn eval(expr: &Value, env: EnvRef) -> Result<Value, EvalError> {
    let run = Rc::clone(env.borrow().run());
    let _depth = run.enter()?;
    ensure_sufficient_stack(|| match expr {
        Value::Int(_)
        | Value::Float(_)
        | Value::String(_)
        | Value::NativeFunction(_)
        | Value::Closure(_)
        | Value::Module(_)
        | Value::Nil => Ok(expr.clone()),
        Value::Symbol(name) => Ok(resolve_symbol(name, &env)),
        Value::List(items) => eval_list(items, env),
    })
}

fn resolve_symbol(name: &str, env: &EnvRef) -> Value {
    if let Some((module, member)) = name.split_once('.') {
        return resolve_member(module, member, env);
    }
    env.borrow().get(name).unwrap_or_else(|| {
        debug!(symbol = %name, "Unbound symbol evaluates to nil");
        Value::Nil
    })
}

// The module frame chains to the scope that included it, so a member missing from the
// module itself can still resolve to a binding of the including scope.
fn resolve_member(module: &str, member: &str, env: &EnvRef) -> Value {
    let resolved = env.borrow().get(module);
    match resolved {
        Some(Value::Module(handle)) => handle.env.borrow().get(member).unwrap_or_else(|| {
            debug!(module, member, "Module member not found");
            Value::Nil
        }),
        Some(other) => {
            debug!(module, member, found = other.type_name(), "Dotted lookup on a non-module value");
            Value::Nil
        }
        None => {
            debug!(module, member, "Dotted lookup on an unbound module name");
            Value::Nil
        }
    }
}

fn eval_list(items: &[Value], env: EnvRef) -> Result<Value, EvalError> {
    let Some((head, rest)) = items.split_first() else {
        trace!("List is empty, evaluating to nil");
        return Ok(Value::Nil);
    };

    if let Value::Symbol(form) = head {
        match form.as_str() {
            special_form_constants::DEF => return special_forms::eval_def(rest, env),
            special_form_constants::SET => return special_forms::eval_set(rest, env),
            special_form_constants::BEGIN => return special_forms::eval_begin(rest, env),
            special_form_constants::IF => return special_forms::eval_if(rest, env),
            special_form_constants::WHILE => return special_forms::eval_while(rest, env),
            special_form_constants::LAMBDA => return special_forms::eval_lambda(rest, env),
            special_form_constants::INCLUDE => return special_forms::eval_include(rest, env),
            _ => {}
        }
    }

    let callee = eval(head, Rc::clone(&env))?;
    let mut args = Vec::with_capacity(rest.len());
    for arg_expr in rest {
        args.push(eval(arg_expr, Rc::clone(&env))?);
    }
    apply(callee, args, env)
}

/// Applies a closure or native function to already-evaluated arguments.
///
/// Closure parameters without a matching argument are bound to `nil`; surplus
/// arguments are ignored. Calling anything else yields `nil`.
#[instrument(level = "trace", skip(callee, args, env), fields(callee = %callee, argc = args.len()), ret, err)]
pub fn apply(callee: Value, args: Vec<Value>, env: EnvRef) -> Result<Value, EvalError> {
    match callee {
        Value::NativeFunction(native) => {
            trace!(native_function_name = %native.name, "Applying native function");
            (native.func)(args, &env)
        }
        Value::Closure(closure) => {
            if args.len() < closure.params.len() {
                debug!(
                    expected = closure.params.len(),
                    got = args.len(),
                    "Missing closure arguments bound to nil"
                );
            }
            let call_env = Environment::new_enclosed(Rc::clone(&closure.env));
            {
                let mut frame = call_env.borrow_mut();
                let mut args = args.into_iter();
                for param in closure.params.iter() {
                    frame.define(param.clone(), args.next().unwrap_or(Value::Nil));
                }
            }
            eval(&closure.body, call_env)
        }
        other => {
            debug!(callee = %other, "Attempted to call a non-function, result is nil");
            Ok(Value::Nil)
        }
    }
}
