//! Core builtins installed into every global frame, plus the special form evaluators.

pub mod console;
pub mod convert;
pub mod globals;
pub mod list;
pub mod math;
pub mod special_forms;
pub mod string;

use crate::engine::value::Value;

/// The integer field of the argument at `index`; missing or non-`Int` reads as 0.
pub(crate) fn int_arg(args: &[Value], index: usize) -> i64 {
    args.get(index).map_or(0, Value::int_field)
}

pub(crate) fn str_arg(args: &[Value], index: usize) -> Option<&str> {
    match args.get(index) {
        Some(Value::String(s)) => Some(s.as_str()),
        _ => None,
    }
}

/// An in-range position for a sequence of `len` items.
pub(crate) fn index_in(index: i64, len: usize) -> Option<usize> {
    usize::try_from(index).ok().filter(|&i| i < len)
}
