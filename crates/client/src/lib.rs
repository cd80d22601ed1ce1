//! Headless battle client.
//!
//! Composition root that assembles content, runtime and event reporting:
//!
//! ```text
//! ClientConfig ──→ session::build ──→ Runtime (auto-played)
//!                        │
//!                        └──→ EventBus ──→ reporter (tracing output)
//! ```
pub mod config;
pub mod logging;
pub mod reporter;
pub mod session;

pub use config::ClientConfig;
