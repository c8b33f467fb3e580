use crate::engine::env::EnvRef;
use crate::engine::eval::EvalError;
use crate::engine::value::{Closure, Value};
use std::rc::Rc;
use tracing::{debug, instrument, trace};

/// `(lambda (params...) body)`: captures the current frame by reference. The body is
/// not evaluated until the closure is applied.
#[instrument(level = "trace", skip(args, env), fields(argc = args.len()), ret, err)]
pub fn eval_lambda(args: &[Value], env: EnvRef) -> Result<Value, EvalError> {
    trace!("Executing 'lambda' special form");
    let params: Vec<String> = match args.first() {
        Some(Value::List(items)) => items
            .iter()
            .map(|param| match param {
                Value::Symbol(name) => name.clone(),
                other => {
                    debug!(param = %other, "Non-symbol lambda parameter bound under empty name");
                    String::new()
                }
            })
            .collect(),
        other => {
            debug!(params = ?other, "Lambda parameter form is not a list, no parameters");
            Vec::new()
        }
    };
    let body = args.get(1).cloned().unwrap_or(Value::Nil);

    debug!(?params, body = %body, "Created closure");
    Ok(Value::Closure(Closure {
        params: params.into(),
        body: Rc::new(body),
        env,
    }))
}

#[cfg(test)]
mod tests {
    use crate::engine::env::Environment;
    use crate::engine::eval::evaluate_source;
    use crate::engine::value::Value;
    use crate::logging::init_test_logging;
    use std::rc::Rc;

    #[test]
    fn lambda_captures_params_body_and_frame() {
        init_test_logging();
        let env = Environment::new_with_prelude();
        let value = evaluate_source("(lambda (a b) (+ a b))", &env).unwrap();
        let Value::Closure(closure) = value else {
            panic!("expected a closure, got {value:?}");
        };
        assert_eq!(&*closure.params, &["a".to_string(), "b".to_string()]);
        assert_eq!(closure.body.to_string(), "(+ a b)");
        assert!(Rc::ptr_eq(&closure.env, &env));
    }

    #[test]
    fn lambda_body_is_not_evaluated_at_creation() {
        init_test_logging();
        let env = Environment::new_with_prelude();
        evaluate_source("(def n 0) (def f (lambda () (set! n 1)))", &env).unwrap();
        assert_eq!(env.borrow().get("n"), Some(Value::Int(0)));
        evaluate_source("(f)", &env).unwrap();
        assert_eq!(env.borrow().get("n"), Some(Value::Int(1)));
    }

    #[test]
    fn lambda_without_body_returns_nil() {
        init_test_logging();
        let env = Environment::new_with_prelude();
        assert_eq!(evaluate_source("((lambda (x)) 5)", &env), Ok(Value::Nil));
    }

    #[test]
    fn non_list_params_mean_no_parameters() {
        init_test_logging();
        let env = Environment::new_with_prelude();
        assert_eq!(evaluate_source("((lambda x 7) 1 2)", &env), Ok(Value::Int(7)));
    }

    #[test]
    fn each_lambda_evaluation_is_a_distinct_closure() {
        init_test_logging();
        let env = Environment::new_with_prelude();
        evaluate_source("(def mk (lambda () (lambda () 1))) (def g (mk))", &env).unwrap();
        let first = evaluate_source("(mk)", &env).unwrap();
        let second = evaluate_source("(mk)", &env).unwrap();
        assert_ne!(first, second);
        assert_eq!(evaluate_source("g", &env).unwrap(), evaluate_source("g", &env).unwrap());
    }
}
