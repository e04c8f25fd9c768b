use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModemError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid amplitude {0}: must be in (0, 1]")]
    InvalidAmplitude(f32),
}

pub type Result<T> = std::result::Result<T, ModemError>;
