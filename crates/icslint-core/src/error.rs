use thiserror::Error;

/// Core error type with minimal dependencies
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(#[from] config::ConfigError),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
