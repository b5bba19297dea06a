// Library surface for headless/integration tests and reuse.
// The binary only adds CLI parsing and terminal setup on top of this.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;
pub mod session;
pub mod timer;
pub mod ui;
pub mod word_source;

/// How long the runtime waits for input before polling the tick schedule
pub const POLL_INTERVAL_MS: u64 = 100;
