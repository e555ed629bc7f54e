//! Configuration schema and loading.
//!
//! Settings come from a `warelay.toml` (project-local, then user config
//! dir), with the environment variables the deployment historically used
//! (`INCLUDED_ONLY`, `EXCLUDED`, `RESPONDER_URL`, `WARELAY_SIDECAR_URL`)
//! taking precedence. Everything is resolved once at startup; the resulting
//! config is immutable for the process lifetime.

pub mod loader;
pub mod schema;

pub use {
    loader::{discover_and_load, load_config},
    schema::{FilterConfig, RelayConfig, ResponderConfig, TimingConfig, TransportConfig},
};
