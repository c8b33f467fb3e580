use crate::engine::env::{EnvRef, Environment};
use crate::engine::eval::{evaluate_source, EvalError};
use crate::engine::modules::{module_path, IncludeOutcome, CORE_MODULE};
use crate::engine::value::{ModuleHandle, Value};
use std::rc::Rc;
use tracing::{debug, info, instrument, trace};

/// `(include name)`: loads a module into the including scope. Always evaluates to `nil`;
/// how the load went is only visible in the log.
#[instrument(level = "trace", skip(args, env), fields(argc = args.len()), ret, err)]
pub fn eval_include(args: &[Value], env: EnvRef) -> Result<Value, EvalError> {
    trace!("Executing 'include' special form");
    match args.first() {
        Some(Value::Symbol(name)) => {
            let outcome = include_module(name, &env)?;
            debug!(module = %name, ?outcome, "Include finished");
        }
        other => {
            debug!(argument = ?other, "'include' expects a symbol, ignoring");
        }
    }
    Ok(Value::Nil)
}

/// Runs the include protocol for `name` against `env`.
///
/// The name is recorded in the run's loaded-set before anything else happens, so a
/// later include of the same name is a no-op even when this load fails. Native
/// modules take precedence over `<name>.txt` in storage. The module frame is a child
/// of `env`, and the handle is bound in `env` under `name`.
pub fn include_module(name: &str, env: &EnvRef) -> Result<IncludeOutcome, EvalError> {
    let run = Rc::clone(env.borrow().run());

    if !run.mark_loaded(name) {
        trace!(module = %name, "Module already included in this run");
        return Ok(IncludeOutcome::AlreadyLoaded);
    }

    if name == CORE_MODULE {
        trace!("'core' is built in, nothing to load");
        return Ok(IncludeOutcome::Reserved);
    }

    if let Some(loader) = run.registry().get(name) {
        let module_env = Environment::new_enclosed(Rc::clone(env));
        loader(&mut module_env.borrow_mut());
        bind_handle(name, module_env, env);
        info!(module = %name, "Loaded native module");
        return Ok(IncludeOutcome::Native);
    }

    let path = module_path(name);
    let source = match run.storage().read_text(&path) {
        Ok(source) => source,
        Err(e) => {
            debug!(module = %name, path = %path, error = %e, "Module not found");
            return Ok(IncludeOutcome::NotFound);
        }
    };

    let module_env = Environment::new_enclosed(Rc::clone(env));
    evaluate_source(&source, &module_env)?;
    bind_handle(name, module_env, env);
    info!(module = %name, path = %path, "Loaded module from storage");
    Ok(IncludeOutcome::File)
}

fn bind_handle(name: &str, module_env: EnvRef, env: &EnvRef) {
    env.borrow_mut().define(
        name,
        Value::Module(ModuleHandle {
            name: name.to_string(),
            env: module_env,
        }),
    );
}
