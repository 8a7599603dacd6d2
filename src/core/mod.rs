/*!
 * Core Module
 * Error types, configuration and guard primitives shared by all subsystems
 */

pub mod config;
pub mod errors;
pub mod guard;

// Re-export for convenience
pub use config::LockConfig;
pub use errors::*;
pub use guard::{Guard, GuardDrop, GuardError, GuardMetadata, GuardResult, TimeoutPolicy};
