/// Initializes tracing for the `cinder` binary.
/// The level comes from the RUST_LOG environment variable
/// (e.g., RUST_LOG=cinder=debug). Logs go to stderr so they never mix with
/// script output on stdout.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}

/// Initializes tracing specifically for tests.
/// Runs once per test binary at debug level, captured by the test runner.
#[cfg(test)]
pub fn init_test_logging() {
    static TRACING_INIT: std::sync::Once = std::sync::Once::new();
    TRACING_INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("debug") // Trace-level eval spans make deep-recursion tests quadratic
            .with_test_writer()
            .try_init()
            .ok(); // Another test harness may already own the global subscriber
    });
}
