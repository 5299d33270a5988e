//! Top-level machine and program loading.

/// Program-image assembly from encoded bit patterns.
pub mod loader;
/// The machine: single owner of every component.
pub mod machine;

pub use machine::Machine;
