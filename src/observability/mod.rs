//! Observability: structured logging via `tracing`.
//!
//! Console output format and the default filter come from
//! `[observability.logging]`; `RUST_LOG` overrides the configured filter.

mod tracing_init;

pub use tracing_init::init_tracing;
