// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod auth;
pub mod config;
pub mod content;
pub mod countdown;
pub mod drill;
pub mod error;
pub mod history;
pub mod logging;
pub mod notify;
pub mod progress;
pub mod quiz;
pub mod runtime;
pub mod session;
pub mod util;
