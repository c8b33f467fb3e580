use crate::engine::builtins::math::Number;
use crate::engine::env::{EnvRef, Environment};
use crate::engine::eval::EvalError;
use crate::engine::value::Value;
use std::rc::Rc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, trace};

pub fn load_sys_lib(env: &mut Environment) {
    trace!("Loading sys module");
    env.define("cls", Value::native("sys.cls", native_cls));
    env.define("time", Value::native("sys.time", native_time));
    env.define("delay", Value::native("sys.delay", native_delay));
    env.define("exit", Value::native("sys.exit", native_exit));
}

/// Clears the output device.
pub fn native_cls(_args: Vec<Value>, env: &EnvRef) -> Result<Value, EvalError> {
    env.borrow().run().clear_screen();
    Ok(Value::Nil)
}

/// Milliseconds since the current run started.
pub fn native_time(_args: Vec<Value>, env: &EnvRef) -> Result<Value, EvalError> {
    Ok(Value::Int(env.borrow().run().elapsed_ms()))
}

/// Blocks the evaluating thread. Floats are truncated; negative durations do nothing.
#[allow(clippy::cast_possible_truncation)]
pub fn native_delay(args: Vec<Value>, env: &EnvRef) -> Result<Value, EvalError> {
    let Some(arg) = args.first() else {
        return Ok(Value::Nil);
    };
    let ms = match Number::of(arg) {
        Number::Int(i) => i,
        Number::Float(f) => f as i64,
    };
    let ms = u64::try_from(ms).unwrap_or(0);
    debug!(ms, "Delaying");
    // Output written so far should be visible while the script waits.
    let run = Rc::clone(env.borrow().run());
    run.flush();
    thread::sleep(Duration::from_millis(ms));
    Ok(Value::Nil)
}

/// Stops the whole run.
pub fn native_exit(_args: Vec<Value>, _env: &EnvRef) -> Result<Value, EvalError> {
    info!("Script requested exit");
    Err(EvalError::Exit)
}

#[cfg(test)]
mod tests {
    use crate::engine::eval::EvalError;
    use crate::engine::runtime::Interpreter;
    use crate::engine::sink::{BufferSink, CharSink};
    use crate::engine::value::Value;
    use crate::libs::standard_registry;
    use crate::logging::init_test_logging;
    use std::cell::Cell;
    use std::rc::Rc;

    fn interpreter(out: &BufferSink) -> Interpreter {
        Interpreter::builder()
            .sink(out.clone())
            .registry(standard_registry())
            .build()
    }

    #[test]
    fn exit_stops_the_run() {
        init_test_logging();
        let out = BufferSink::new();
        let result = interpreter(&out)
            .run_script("(include sys) (println \"before\") (sys.exit) (println \"after\")");
        assert_eq!(result, Err(EvalError::Exit));
        assert_eq!(out.contents(), "before\n");
    }

    #[test]
    fn exit_inside_nested_calls_unwinds() {
        init_test_logging();
        let out = BufferSink::new();
        let result = interpreter(&out).run_script(
            "(include sys) (def f (lambda (n) (if (< n 3) (f (+ n 1)) (sys.exit)))) (f 0) (println 1)",
        );
        assert_eq!(result, Err(EvalError::Exit));
        assert_eq!(out.contents(), "");
    }

    #[test]
    fn time_is_an_increasing_int() {
        init_test_logging();
        let out = BufferSink::new();
        let result = interpreter(&out)
            .run_script("(include sys) (def t0 (sys.time)) (sys.delay 5) (- (sys.time) t0)");
        match result {
            Ok(Value::Int(elapsed)) => assert!(elapsed >= 5, "elapsed {elapsed}"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn delay_ignores_bad_durations() {
        init_test_logging();
        let out = BufferSink::new();
        assert_eq!(
            interpreter(&out).run_script("(include sys) (sys.delay -100) (sys.delay \"x\") (sys.delay)"),
            Ok(Value::Nil)
        );
    }

    #[derive(Clone, Default)]
    struct CountingSink {
        clears: Rc<Cell<usize>>,
    }

    impl CharSink for CountingSink {
        fn put_char(&mut self, _c: char) {}

        fn clear(&mut self) {
            self.clears.set(self.clears.get() + 1);
        }
    }

    #[test]
    fn cls_clears_the_sink() {
        init_test_logging();
        let sink = CountingSink::default();
        let interpreter = Interpreter::builder()
            .sink(sink.clone())
            .registry(standard_registry())
            .build();
        interpreter.run_script("(include sys) (sys.cls) (sys.cls)").unwrap();
        assert_eq!(sink.clears.get(), 2);
    }
}
