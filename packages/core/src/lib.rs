// Library root — exposes internal modules for integration tests in `tests/`.
// Production entry point remains `src/main.rs`.

pub mod alerts;
pub mod config;
pub mod error;
pub mod monitor;
pub mod rates;
pub mod scheduler;
pub mod services;

// These modules are only needed by the binary.
pub mod cli;
pub mod logging;
