//! Embedding surface: the host builds an [`Interpreter`] once, then runs scripts.
//! Each run gets its own [`RunContext`], so concurrent or successive runs never
//! share loaded-module state.

use crate::engine::builtins::globals::populate_globals;
use crate::engine::env::{EnvRef, Environment};
use crate::engine::eval::{evaluate_source, EvalError};
use crate::engine::modules::ModuleRegistry;
use crate::engine::sink::{CharSink, StdoutSink};
use crate::engine::storage::{MemoryStorage, Storage};
use crate::engine::value::Value;
use std::any::{Any, TypeId};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::{Rc, Weak};
use std::time::Instant;
use tracing::{debug, info, instrument};

pub const DEFAULT_MAX_DEPTH: usize = 2048;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Maximum nesting of evaluations before a run is aborted with
    /// [`EvalError::DepthExceeded`].
    pub max_depth: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// State shared by every frame of one program run.
pub struct RunContext {
    loaded_modules: RefCell<HashSet<String>>,
    registry: Rc<ModuleRegistry>,
    storage: Rc<dyn Storage>,
    sink: Rc<RefCell<dyn CharSink>>,
    frames: RefCell<Vec<Weak<RefCell<Environment>>>>,
    retained: RefCell<HashSet<*const RefCell<Environment>>>,
    module_state: RefCell<HashMap<TypeId, Box<dyn Any>>>,
    depth: Cell<usize>,
    config: RuntimeConfig,
    started: Instant,
}

impl RunContext {
    pub fn new(
        registry: Rc<ModuleRegistry>,
        storage: Rc<dyn Storage>,
        sink: Rc<RefCell<dyn CharSink>>,
        config: RuntimeConfig,
    ) -> Self {
        Self {
            loaded_modules: RefCell::new(HashSet::new()),
            registry,
            storage,
            sink,
            frames: RefCell::new(Vec::new()),
            retained: RefCell::new(HashSet::new()),
            module_state: RefCell::new(HashMap::new()),
            depth: Cell::new(0),
            config,
            started: Instant::now(),
        }
    }

    /// A context with no native modules, empty in-memory storage and discarded output.
    pub fn detached() -> Self {
        Self::new(
            Rc::new(ModuleRegistry::new()),
            Rc::new(MemoryStorage::new()),
            Rc::new(RefCell::new(crate::engine::sink::NullSink)),
            RuntimeConfig::default(),
        )
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.loaded_modules.borrow().contains(name)
    }

    /// Records an include attempt. Returns `false` if `name` was already recorded.
    pub fn mark_loaded(&self, name: &str) -> bool {
        self.loaded_modules.borrow_mut().insert(name.to_string())
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    pub fn config(&self) -> RuntimeConfig {
        self.config
    }

    /// Sends `text` to the sink one character at a time.
    pub fn emit(&self, text: &str) {
        let mut sink = self.sink.borrow_mut();
        for c in text.chars() {
            sink.put_char(c);
        }
    }

    pub fn clear_screen(&self) {
        self.sink.borrow_mut().clear();
    }

    pub fn flush(&self) {
        self.sink.borrow_mut().flush();
    }

    /// Milliseconds since the run started.
    pub fn elapsed_ms(&self) -> i64 {
        i64::try_from(self.started.elapsed().as_millis()).unwrap_or(i64::MAX)
    }

    /// Runs `f` on this run's instance of a native module's state, creating it on
    /// first use. `f` must not call back into `with_state`.
    pub fn with_state<T: Default + 'static, R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut states = self.module_state.borrow_mut();
        let slot = states
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(T::default()));
        match slot.downcast_mut::<T>() {
            Some(state) => f(state),
            None => f(&mut T::default()),
        }
    }

    pub(crate) fn track(&self, frame: &EnvRef) {
        let mut frames = self.frames.borrow_mut();
        if frames.len() == frames.capacity() {
            frames.retain(|f| f.strong_count() > 0);
        }
        frames.push(Rc::downgrade(frame));
    }

    pub(crate) fn enter(&self) -> Result<DepthGuard<'_>, EvalError> {
        let depth = self.depth.get();
        if depth >= self.config.max_depth {
            return Err(EvalError::DepthExceeded {
                limit: self.config.max_depth,
            });
        }
        self.depth.set(depth + 1);
        Ok(DepthGuard { depth: &self.depth })
    }

    /// Exempts every frame `value` can reach from teardown, so a closure or module
    /// handle handed back to the host keeps its bindings.
    pub(crate) fn retain_reachable(&self, value: &Value) {
        let mut retained = self.retained.borrow_mut();
        let mut pending = Vec::new();
        frames_held_by(value, &mut pending);
        while let Some(frame) = pending.pop() {
            if !retained.insert(Rc::as_ptr(&frame)) {
                continue;
            }
            let env = frame.borrow();
            for bound in env.values() {
                frames_held_by(bound, &mut pending);
            }
            if let Some(outer) = env.outer() {
                pending.push(Rc::clone(outer));
            }
        }
        debug!(retained = retained.len(), "Frames kept alive for the returned value");
    }

    /// Clears every frame created during this run that is still alive and not retained.
    fn teardown(&self) {
        let frames = std::mem::take(&mut *self.frames.borrow_mut());
        let retained = self.retained.borrow();
        let mut cleared = 0usize;
        for frame in frames.iter().filter_map(Weak::upgrade) {
            if retained.contains(&Rc::as_ptr(&frame)) {
                continue;
            }
            if let Ok(mut env) = frame.try_borrow_mut() {
                env.clear();
                cleared += 1;
            }
        }
        debug!(cleared, "Run torn down");
    }
}

fn frames_held_by(value: &Value, out: &mut Vec<EnvRef>) {
    match value {
        Value::Closure(closure) => out.push(Rc::clone(&closure.env)),
        Value::Module(handle) => out.push(Rc::clone(&handle.env)),
        Value::List(items) => items.iter().for_each(|item| frames_held_by(item, out)),
        _ => {}
    }
}

pub(crate) struct DepthGuard<'a> {
    depth: &'a Cell<usize>,
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}

pub struct Interpreter {
    registry: Rc<ModuleRegistry>,
    storage: Rc<dyn Storage>,
    sink: Rc<RefCell<dyn CharSink>>,
    config: RuntimeConfig,
}

impl Interpreter {
    pub fn builder() -> InterpreterBuilder {
        InterpreterBuilder::default()
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    pub fn config(&self) -> RuntimeConfig {
        self.config
    }

    /// Starts a run: fresh global frame with the core builtins and an empty
    /// loaded-module set.
    pub fn session(&self) -> Session {
        let run = Rc::new(RunContext::new(
            Rc::clone(&self.registry),
            Rc::clone(&self.storage),
            Rc::clone(&self.sink),
            self.config,
        ));
        let global = Environment::new_root(Rc::clone(&run));
        populate_globals(&mut global.borrow_mut());
        Session { global, run }
    }

    /// Evaluates every top-level form of `source` in a fresh run and returns the
    /// value of the last one. Frames the returned value reaches survive the run;
    /// every other frame is released.
    #[instrument(level = "debug", skip(self, source), fields(len = source.len()))]
    pub fn run_script(&self, source: &str) -> Result<Value, EvalError> {
        let session = self.session();
        let result = session.eval_source(source);
        session.run.flush();
        if let Ok(value) = &result {
            session.run.retain_reachable(value);
        }
        result
    }
}

#[derive(Default)]
pub struct InterpreterBuilder {
    registry: ModuleRegistry,
    storage: Option<Rc<dyn Storage>>,
    sink: Option<Rc<RefCell<dyn CharSink>>>,
    config: RuntimeConfig,
}

impl InterpreterBuilder {
    pub fn storage(mut self, storage: impl Storage + 'static) -> Self {
        self.storage = Some(Rc::new(storage));
        self
    }

    pub fn sink(mut self, sink: impl CharSink + 'static) -> Self {
        self.sink = Some(Rc::new(RefCell::new(sink)));
        self
    }

    pub fn module<F>(mut self, name: &str, loader: F) -> Self
    where
        F: Fn(&mut Environment) + 'static,
    {
        self.registry.register(name, loader);
        self
    }

    pub fn registry(mut self, registry: ModuleRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Interpreter {
        info!(modules = ?self.registry.names(), max_depth = self.config.max_depth, "Building interpreter");
        Interpreter {
            registry: Rc::new(self.registry),
            storage: self
                .storage
                .unwrap_or_else(|| Rc::new(MemoryStorage::new())),
            sink: self
                .sink
                .unwrap_or_else(|| Rc::new(RefCell::new(StdoutSink))),
            config: self.config,
        }
    }
}

/// One program run whose global frame outlives a single call, e.g. a REPL.
/// Dropping it releases the frames it created.
pub struct Session {
    global: EnvRef,
    run: Rc<RunContext>,
}

impl Session {
    pub fn global(&self) -> &EnvRef {
        &self.global
    }

    pub fn run_context(&self) -> &Rc<RunContext> {
        &self.run
    }

    pub fn eval_source(&self, source: &str) -> Result<Value, EvalError> {
        evaluate_source(source, &self.global)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.run.teardown();
    }
}
