//! The scripting engine: value model, reader, environments, evaluator, special forms,
//! core builtins, the module protocol and the host capabilities it consumes.

pub mod builtins;
pub mod env;
pub mod eval;
pub mod modules;
pub mod parser;
pub mod runtime;
pub mod sink;
pub mod special_forms;
pub mod stack;
pub mod storage;
pub mod value;
