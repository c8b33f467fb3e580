use crate::engine::builtins::console::{native_print, native_println};
use crate::engine::builtins::convert::{native_float, native_int, native_string, native_type};
use crate::engine::builtins::list::{
    native_get, native_len, native_list, native_pop, native_push, native_set, native_slice,
};
use crate::engine::builtins::math::{
    native_add, native_and, native_divide, native_equals, native_greater_than,
    native_greater_than_or_equal, native_less_than, native_less_than_or_equal, native_multiply,
    native_not, native_or, native_subtract,
};
use crate::engine::builtins::string::{
    native_char_at, native_concat, native_split, native_strlen, native_substr,
};
use crate::engine::env::Environment;
use crate::engine::value::{NativeFn, Value};
use tracing::trace;

/// Every builtin bound directly in the global frame. These make up the reserved `core`
/// module, which is never behind a namespace.
pub const CORE_BUILTINS: &[(&str, NativeFn)] = &[
    ("+", native_add),
    ("-", native_subtract),
    ("*", native_multiply),
    ("/", native_divide),
    ("<", native_less_than),
    ("<=", native_less_than_or_equal),
    (">", native_greater_than),
    (">=", native_greater_than_or_equal),
    ("=", native_equals),
    ("int", native_int),
    ("float", native_float),
    ("string", native_string),
    ("type", native_type),
    ("not", native_not),
    ("and", native_and),
    ("or", native_or),
    ("list", native_list),
    ("get", native_get),
    ("set", native_set),
    ("len", native_len),
    ("push", native_push),
    ("pop", native_pop),
    ("slice", native_slice),
    ("strlen", native_strlen),
    ("concat", native_concat),
    ("substr", native_substr),
    ("charAt", native_char_at),
    ("split", native_split),
    ("print", native_print),
    ("println", native_println),
];

/// Populates the given environment with the core builtins.
pub fn populate_globals(env: &mut Environment) {
    for &(name, func) in CORE_BUILTINS {
        env.define(name, Value::native(name, func));
    }
    trace!(count = CORE_BUILTINS.len(), "Installed core builtins");
}
