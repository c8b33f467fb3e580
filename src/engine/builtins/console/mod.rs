use crate::engine::env::EnvRef;
use crate::engine::eval::EvalError;
use crate::engine::value::Value;
use std::rc::Rc;
use tracing::trace;

// Numbers and strings are written; every other argument is skipped.
fn emit_args(args: &[Value], env: &EnvRef) {
    let run = Rc::clone(env.borrow().run());
    for text in args.iter().filter_map(Value::display_text) {
        run.emit(&text);
    }
}

pub fn native_print(args: Vec<Value>, env: &EnvRef) -> Result<Value, EvalError> {
    trace!(argc = args.len(), "Executing native 'print' function");
    emit_args(&args, env);
    Ok(Value::Nil)
}

pub fn native_println(args: Vec<Value>, env: &EnvRef) -> Result<Value, EvalError> {
    trace!(argc = args.len(), "Executing native 'println' function");
    emit_args(&args, env);
    env.borrow().run().emit("\n");
    Ok(Value::Nil)
}

#[cfg(test)]
mod tests {
    use crate::engine::runtime::Interpreter;
    use crate::engine::sink::BufferSink;
    use crate::engine::value::Value;
    use crate::logging::init_test_logging;

    fn output_of(code: &str) -> String {
        init_test_logging();
        let out = BufferSink::new();
        let interpreter = Interpreter::builder().sink(out.clone()).build();
        assert_eq!(interpreter.run_script(code), Ok(Value::Nil));
        out.contents()
    }

    #[test]
    fn print_writes_without_newline() {
        assert_eq!(output_of("(print \"x=\" 3)"), "x=3");
    }

    #[test]
    fn println_appends_newline() {
        assert_eq!(output_of("(println \"a\" \"b\") (println)"), "ab\n\n");
    }

    #[test]
    fn floats_print_with_two_decimals() {
        assert_eq!(output_of("(println 1.5 (/ 2 3) 2.0)"), "1.500.672\n");
    }

    #[test]
    fn unprintable_arguments_are_skipped() {
        assert_eq!(output_of("(println (list 1 2) + nothing \"ok\")"), "ok\n");
    }
}
