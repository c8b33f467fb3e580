//! Native capability bundles a host can register for `include`.

pub mod fs;
pub mod http;
pub mod math;
pub mod sys;

use crate::engine::modules::ModuleRegistry;

/// Registers `math`, `sys`, `fs` and `http`.
pub fn register_standard_libs(registry: &mut ModuleRegistry) {
    registry.register("math", math::load_math_lib);
    registry.register("sys", sys::load_sys_lib);
    registry.register("fs", fs::load_fs_lib);
    registry.register("http", http::load_http_lib);
}

/// A registry holding the standard bundles.
pub fn standard_registry() -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    register_standard_libs(&mut registry);
    registry
}
