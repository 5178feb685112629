//! Testonly utilities for concurrent tests.
use std::{future::Future, io::IsTerminal as _};

/// Installs a tracing subscriber writing to the test output.
/// Filtering is controlled with `RUST_LOG`. Safe to call multiple times.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .with_ansi(std::env::var("NO_COLOR").is_err() && std::io::stdout().is_terminal())
        .with_line_number(true)
        .try_init();
}

/// Executes a test under multiple configurations of the tokio runtime.
/// Fan-out code should behave the same on a single thread and on a thread pool.
pub fn with_runtimes<Fut: Future>(test: impl Fn() -> Fut) {
    for (name, mut b) in [
        (
            "current_thread",
            tokio::runtime::Builder::new_current_thread(),
        ),
        ("multi_thread", tokio::runtime::Builder::new_multi_thread()),
    ] {
        tracing::info!("tokio runtime: {name}");
        let r = b.enable_all().build().unwrap();
        r.block_on(test());
    }
}
