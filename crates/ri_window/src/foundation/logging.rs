//! Logging utilities and structured logging support

pub use log::{debug, info, warn, error, trace};

/// Initialize the logging system from `RUST_LOG`
pub fn init() {
    // A second initialization (tests, embedding apps) is not an error
    let _ = env_logger::try_init();
}

/// Initialize the logging system, falling back to `level` when `RUST_LOG` is unset
pub fn init_with_level(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    let _ = env_logger::Builder::from_env(env).try_init();
}
