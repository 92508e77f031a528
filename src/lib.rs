pub mod comms;
pub mod config;
pub mod constants;
pub mod control;
pub mod drive;
pub mod error;
pub mod heading;
pub mod sensor;
pub mod vision;

#[cfg(feature = "simulation")]
pub mod simulation;

pub use config::HelmConfig;
pub use error::{HelmError, Result};
