// src/error.rs
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("invalid engine configuration: {0}")]
    InvalidConfig(String),
    #[error("binary frame has {len} bytes; int16 samples need an even byte count")]
    OddByteCount { len: usize },
    #[error("token {index} ({token:?}) is not a finite number")]
    InvalidToken { index: usize, token: String },
    #[error("sample {index} is not finite")]
    NonFiniteSample { index: usize },
    #[error("input batch contains no samples")]
    EmptyInput,
}
