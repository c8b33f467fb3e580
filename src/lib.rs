//! `cinder`: an embeddable S-expression scripting runtime.
//!
//! A host builds an [`Interpreter`] with the capabilities it wants to expose (a
//! character sink for output, a storage medium for module files and native modules
//! registered by name) and then runs scripts against it:
//!
//! ```
//! use cinder::{BufferSink, Interpreter, Value};
//!
//! let out = BufferSink::new();
//! let interpreter = Interpreter::builder().sink(out.clone()).build();
//! let result = interpreter.run_script("(def x 20) (println \"x=\" x) (+ x 22)");
//! assert_eq!(result, Ok(Value::Int(42)));
//! assert_eq!(out.contents(), "x=20\n");
//! ```

pub mod engine;
pub mod libs;
pub mod logging;

pub use engine::env::{EnvRef, Environment};
pub use engine::eval::{apply, eval, evaluate_source, EvalError};
pub use engine::modules::{IncludeOutcome, ModuleRegistry};
pub use engine::runtime::{Interpreter, InterpreterBuilder, RuntimeConfig, Session};
pub use engine::sink::{BufferSink, CharSink, NullSink, StdoutSink};
pub use engine::storage::{DirStorage, MemoryStorage, Storage, StorageError};
pub use engine::value::Value;
