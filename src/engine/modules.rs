//! Registry of native capability bundles and the naming conventions of the
//! module system. The `include` protocol itself lives in the `include` special form.

use crate::engine::env::Environment;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Name reserved for the builtins that are pre-registered in the global frame.
pub const CORE_MODULE: &str = "core";

pub const MODULE_FILE_EXTENSION: &str = "txt";

/// Populates a fresh module frame with native functions and constants.
pub type NativeModuleLoader = Rc<dyn Fn(&mut Environment)>;

/// Storage path of a file-backed module: `<name>.txt`.
pub fn module_path(name: &str) -> String {
    format!("{name}.{MODULE_FILE_EXTENSION}")
}

/// What an `include` actually did. Scripts only ever see `nil`; hosts see this in the logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncludeOutcome {
    /// The name was already attempted during this run.
    AlreadyLoaded,
    /// `core`, always satisfied.
    Reserved,
    Native,
    File,
    NotFound,
}

#[derive(Clone, Default)]
pub struct ModuleRegistry {
    loaders: HashMap<String, NativeModuleLoader>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) the loader for `name`.
    pub fn register<F>(&mut self, name: impl Into<String>, loader: F)
    where
        F: Fn(&mut Environment) + 'static,
    {
        self.loaders.insert(name.into(), Rc::new(loader));
    }

    pub fn get(&self, name: &str) -> Option<NativeModuleLoader> {
        self.loaders.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.loaders.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.loaders.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("modules", &self.names())
            .finish()
    }
}
