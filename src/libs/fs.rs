//! `fs`: file access over the run's storage capability. Failures are reported to the
//! script as `0` (or `""` for `read`) and logged.

use crate::engine::builtins::str_arg;
use crate::engine::env::{EnvRef, Environment};
use crate::engine::eval::EvalError;
use crate::engine::storage::StorageError;
use crate::engine::value::Value;
use std::rc::Rc;
use tracing::{debug, trace};

pub fn load_fs_lib(env: &mut Environment) {
    trace!("Loading fs module");
    env.define("exists", Value::native("fs.exists", native_exists));
    env.define("read", Value::native("fs.read", native_read));
    env.define("write", Value::native("fs.write", native_write));
    env.define("append", Value::native("fs.append", native_append));
    env.define("remove", Value::native("fs.remove", native_remove));
}

fn report(op: &str, path: &str, result: Result<(), StorageError>) -> Value {
    match result {
        Ok(()) => Value::Int(1),
        Err(e) => {
            debug!(op, path, error = %e, "Storage operation failed");
            Value::Int(0)
        }
    }
}

pub fn native_exists(args: Vec<Value>, env: &EnvRef) -> Result<Value, EvalError> {
    let Some(path) = str_arg(&args, 0) else {
        return Ok(Value::Int(0));
    };
    let run = Rc::clone(env.borrow().run());
    Ok(Value::from(run.storage().exists(path)))
}

pub fn native_read(args: Vec<Value>, env: &EnvRef) -> Result<Value, EvalError> {
    let Some(path) = str_arg(&args, 0) else {
        return Ok(Value::String(String::new()));
    };
    let run = Rc::clone(env.borrow().run());
    let text = run.storage().read_text(path).unwrap_or_else(|e| {
        debug!(path, error = %e, "'fs.read' failed");
        String::new()
    });
    Ok(Value::String(text))
}

pub fn native_write(args: Vec<Value>, env: &EnvRef) -> Result<Value, EvalError> {
    let (Some(path), Some(contents)) = (str_arg(&args, 0), str_arg(&args, 1)) else {
        return Ok(Value::Int(0));
    };
    let run = Rc::clone(env.borrow().run());
    Ok(report("write", path, run.storage().write(path, contents)))
}

pub fn native_append(args: Vec<Value>, env: &EnvRef) -> Result<Value, EvalError> {
    let (Some(path), Some(contents)) = (str_arg(&args, 0), str_arg(&args, 1)) else {
        return Ok(Value::Int(0));
    };
    let run = Rc::clone(env.borrow().run());
    Ok(report("append", path, run.storage().append(path, contents)))
}

pub fn native_remove(args: Vec<Value>, env: &EnvRef) -> Result<Value, EvalError> {
    let Some(path) = str_arg(&args, 0) else {
        return Ok(Value::Int(0));
    };
    let run = Rc::clone(env.borrow().run());
    Ok(report("remove", path, run.storage().remove(path)))
}

#[cfg(test)]
mod tests {
    use crate::engine::runtime::Interpreter;
    use crate::engine::sink::BufferSink;
    use crate::engine::storage::{DirStorage, MemoryStorage};
    use crate::engine::value::Value;
    use crate::libs::standard_registry;
    use crate::logging::init_test_logging;
    use tempfile::TempDir;

    fn run_with(storage: impl crate::engine::storage::Storage + 'static, code: &str) -> Value {
        init_test_logging();
        let interpreter = Interpreter::builder()
            .sink(BufferSink::new())
            .storage(storage)
            .registry(standard_registry())
            .build();
        interpreter.run_script(&format!("(include fs) {code}")).unwrap()
    }

    #[test]
    fn write_then_read() {
        let value = run_with(
            MemoryStorage::new(),
            "(list (fs.write \"notes.txt\" \"a\") (fs.append \"notes.txt\" \"b\") (fs.read \"notes.txt\"))",
        );
        assert_eq!(
            value,
            Value::List(vec![Value::Int(1), Value::Int(1), Value::String("ab".into())])
        );
    }

    #[test]
    fn exists_and_remove() {
        let storage = MemoryStorage::new().with_file("data.txt", "x");
        let value = run_with(
            storage,
            "(list (fs.exists \"data.txt\") (fs.remove \"data.txt\") (fs.exists \"data.txt\") (fs.remove \"data.txt\"))",
        );
        assert_eq!(
            value,
            Value::List(vec![Value::Int(1), Value::Int(1), Value::Int(0), Value::Int(0)])
        );
    }

    #[test]
    fn read_of_missing_file_is_empty() {
        assert_eq!(
            run_with(MemoryStorage::new(), "(fs.read \"missing.txt\")"),
            Value::String(String::new())
        );
    }

    #[test]
    fn read_strips_carriage_returns() {
        let storage = MemoryStorage::new().with_file("crlf.txt", "a\r\nb\r\n");
        assert_eq!(
            run_with(storage, "(fs.read \"crlf.txt\")"),
            Value::String("a\nb\n".into())
        );
    }

    #[test]
    fn non_string_arguments_fail() {
        assert_eq!(
            run_with(MemoryStorage::new(), "(list (fs.write 1 \"x\") (fs.exists) (fs.read 3))"),
            Value::List(vec![Value::Int(0), Value::Int(0), Value::String(String::new())])
        );
    }

    #[test]
    fn dir_storage_round_trip_and_escape_rejected() {
        let dir = TempDir::new().unwrap();
        let value = run_with(
            DirStorage::new(dir.path()),
            "(list (fs.write \"/log.txt\" \"hello\") (fs.write \"../outside.txt\" \"x\"))",
        );
        assert_eq!(value, Value::List(vec![Value::Int(1), Value::Int(0)]));
        assert_eq!(std::fs::read_to_string(dir.path().join("log.txt")).unwrap(), "hello");
        assert!(!dir.path().parent().unwrap().join("outside.txt").exists());
    }
}
