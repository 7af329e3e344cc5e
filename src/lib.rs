// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod analyze;
pub mod api;
pub mod config;
pub mod metrics;
pub mod scan;

// ---- Re-exports for stable public API ----
pub use analyze::ai_adapter;
pub use crate::api::{router, AppState};

