use crate::engine::env::EnvRef;
use crate::engine::eval::EvalError;
use std::fmt;
use std::rc::Rc;

/// A user-defined function created by the `lambda` special form.
///
/// The defining frame is captured by reference, so later mutations of that frame
/// are visible the next time the closure runs.
#[derive(Clone)]
pub struct Closure {
    pub params: Rc<[String]>,
    pub body: Rc<Value>,
    pub env: EnvRef,
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Closure")
            .field("params", &self.params)
            .field("body", &self.body)
            .field("env", &"<captured_env>") // Frames can be cyclic, never print them
            .finish()
    }
}

// Two closures are the same closure only if they came from the same `lambda` evaluation.
impl PartialEq for Closure {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.body, &other.body) && Rc::ptr_eq(&self.env, &other.env)
    }
}

/// Signature of a host-provided operation callable from scripts.
/// Receives the evaluated arguments and the frame the call happened in.
pub type NativeFn = fn(Vec<Value>, &EnvRef) -> Result<Value, EvalError>;

#[derive(Clone)]
pub struct NativeFunction {
    pub name: String, // For debugging and identification
    pub func: NativeFn,
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .field("func", &"<native_fn_ptr>")
            .finish()
    }
}

impl PartialEq for NativeFunction {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

/// A loaded module bound into the including scope under its own name.
/// `name.member` resolves `member` against `env`.
#[derive(Clone)]
pub struct ModuleHandle {
    pub name: String,
    pub env: EnvRef,
}

impl fmt::Debug for ModuleHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleHandle")
            .field("name", &self.name)
            .field("env", &"<module_env>")
            .finish()
    }
}

impl PartialEq for ModuleHandle {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && Rc::ptr_eq(&self.env, &other.env)
    }
}

/// Every runtime datum. Equality never crosses variants: `Int(3) != Float(3.0)`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    String(String),
    Symbol(String),
    List(Vec<Value>),
    NativeFunction(NativeFunction),
    Closure(Closure),
    Module(ModuleHandle),
    Nil,
}

impl Value {
    pub fn native(name: &str, func: NativeFn) -> Value {
        Value::NativeFunction(NativeFunction {
            name: name.to_string(),
            func,
        })
    }

    pub fn symbol(name: &str) -> Value {
        Value::Symbol(name.to_string())
    }

    /// Conditions are decided by the integer field alone: only a non-zero `Int` is true.
    pub fn is_truthy(&self) -> bool {
        matches!(self, Value::Int(i) if *i != 0)
    }

    /// The integer payload, or 0 for every other variant.
    pub fn int_field(&self) -> i64 {
        match self {
            Value::Int(i) => *i,
            _ => 0,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::NativeFunction(_) | Value::Closure(_) => "function",
            Value::Symbol(_) | Value::Module(_) | Value::Nil => "nil",
        }
    }

    /// Text used by `print`, `println` and `string`. Floats carry two decimals.
    /// Only numbers and strings have a printable form.
    pub fn display_text(&self) -> Option<String> {
        match self {
            Value::Int(i) => Some(i.to_string()),
            Value::Float(f) => Some(format!("{f:.2}")),
            Value::String(s) => Some(s.clone()),
            Value::Symbol(_)
            | Value::List(_)
            | Value::NativeFunction(_)
            | Value::Closure(_)
            | Value::Module(_)
            | Value::Nil => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Int(i64::from(b))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) if x.is_finite() && x.fract() == 0.0 => write!(f, "{x:.1}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::String(s) => write!(f, "\"{s}\""),
            Value::Symbol(s) => write!(f, "{s}"),
            Value::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
            Value::NativeFunction(n) => write!(f, "<native {}>", n.name),
            Value::Closure(c) => write!(f, "<lambda/{}>", c.params.len()),
            Value::Module(m) => write!(f, "<module {}>", m.name),
            Value::Nil => write!(f, "nil"),
        }
    }
}
