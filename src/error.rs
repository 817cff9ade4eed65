use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum StereoError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("lapjv: {0}")]
    LapjvError(String),
}
