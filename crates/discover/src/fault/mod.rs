//! Deterministic fault injection over successful API responses.

pub mod config;
pub mod hash;
pub mod store;
pub mod transform;

pub use config::{FaultConfig, FaultMode, FaultPick, FaultTargets, HttpSim};
pub use store::{FaultConfigSource, NoFaults, SessionFaultStore};
pub use transform::{FaultTarget, should_corrupt, target_from_path, transform};
