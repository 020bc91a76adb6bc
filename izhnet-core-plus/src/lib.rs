//! izhnet-core-plus: Compact runtime atop izhnet-core (keeps izhnet-core unchanged)
//!
//! Additions:
//! - Depth-2 state ring instead of full per-step history (memory O(N + C))
//! - Mean-potential trace streamed per step rather than computed post hoc
//! - Adjacency index (source -> connections) for spike-driven trace bumps
//!
//! This crate composes izhnet-core's configuration, wiring and integration
//! step, and reproduces its output streams bit for bit.

pub mod runtime_plus;

// Re-exports
pub use runtime_plus::CompactSimulator;
