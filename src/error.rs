use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HelmError {
    #[error("No fresh heading sample for {0:?}")]
    SensorStall(Duration),

    #[error("Sensor error: {0}")]
    Sensor(String),

    #[error("Motion sink error: {0}")]
    Motion(String),

    #[error("Heading feed closed: {0}")]
    FeedClosed(String),

    #[error("Malformed message: {0}")]
    Message(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, HelmError>;
