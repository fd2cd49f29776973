use thiserror::Error;

#[derive(Debug, Error)]
pub enum BalanceError {
    /// A parameter outside its documented domain. Never clamped silently.
    #[error("{name} = {value} is outside the domain [1, 100]")]
    DomainViolation { name: &'static str, value: f64 },

    /// A command-line value that is present but not a number.
    #[error("{name}: cannot parse {raw:?} as a number")]
    InvalidArgument { name: &'static str, raw: String },

    #[error("invalid layout: {0}")]
    InvalidLayout(String),

    #[error("seed must be finite, got {0}")]
    InvalidSeed(f64),

    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, BalanceError>;
