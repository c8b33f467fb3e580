use crate::engine::builtins::globals::populate_globals;
use crate::engine::runtime::RunContext;
use crate::engine::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, trace};

pub type EnvRef = Rc<RefCell<Environment>>;

/// One lexical scope frame.
///
/// Every frame descended from the same root shares one [`RunContext`], which owns the
/// set of already-included module names and the host capabilities.
pub struct Environment {
    bindings: HashMap<String, Value>,
    outer: Option<EnvRef>,
    run: Rc<RunContext>,
}

impl Environment {
    /// Creates an empty root frame attached to a detached run context
    /// (no modules, in-memory storage, output discarded).
    pub fn new() -> EnvRef {
        Environment::new_root(Rc::new(RunContext::detached()))
    }

    /// Same as [`Environment::new`] with the core builtins installed.
    pub fn new_with_prelude() -> EnvRef {
        let env = Environment::new();
        populate_globals(&mut env.borrow_mut());
        trace!(env = ?env.borrow(), "Environment after adding prelude");
        env
    }

    /// Creates the global frame of a run.
    pub fn new_root(run: Rc<RunContext>) -> EnvRef {
        debug!("Creating new root environment");
        let env = Rc::new(RefCell::new(Environment {
            bindings: HashMap::new(),
            outer: None,
            run: Rc::clone(&run),
        }));
        run.track(&env);
        env
    }

    /// Creates a child frame sharing the outer frame's run context.
    pub fn new_enclosed(outer_env: EnvRef) -> EnvRef {
        trace!("Creating new enclosed environment");
        let run = Rc::clone(&outer_env.borrow().run);
        let env = Rc::new(RefCell::new(Environment {
            bindings: HashMap::new(),
            outer: Some(outer_env),
            run: Rc::clone(&run),
        }));
        run.track(&env);
        env
    }

    pub fn run(&self) -> &Rc<RunContext> {
        &self.run
    }

    /// Binds `name` in this frame, shadowing any binding further out.
    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        trace!(name = %name, value = %value, "Defining variable in current environment");
        self.bindings.insert(name, value);
    }

    /// Looks `name` up innermost-frame-first.
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.bindings.get(name) {
            return Some(value.clone());
        }
        match &self.outer {
            Some(outer_env) => outer_env.borrow().get(name),
            None => None,
        }
    }

    /// Overwrites the nearest existing binding of `name`.
    /// Returns `false` without creating anything when no frame in the chain holds it.
    pub fn set_existing(&mut self, name: &str, value: Value) -> bool {
        if let Some(slot) = self.bindings.get_mut(name) {
            *slot = value;
            return true;
        }
        match &self.outer {
            Some(outer_env) => outer_env.borrow_mut().set_existing(name, value),
            None => false,
        }
    }

    pub(crate) fn outer(&self) -> Option<&EnvRef> {
        self.outer.as_ref()
    }

    pub(crate) fn values(&self) -> impl Iterator<Item = &Value> {
        self.bindings.values()
    }

    pub fn contains_local(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Drops every binding and the parent link. Used when a run is torn down so that
    /// closures stored in their own defining frame stop keeping it alive.
    pub(crate) fn clear(&mut self) {
        self.bindings.clear();
        self.outer = None;
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.bindings.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("Environment")
            .field("bindings", &names)
            .field("has_outer", &self.outer.is_some())
            .finish()
    }
}
