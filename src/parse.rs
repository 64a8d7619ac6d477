// src/parse.rs
//! Boundary parsing of raw device input into scaled samples.
use crate::config::ScalingPolicy;
use crate::error::EngineError;

/// Raw input as delivered by a transport.
#[derive(Clone, Debug, PartialEq)]
pub enum RawInput {
    Sample(f64),
    Samples(Vec<f64>),
    /// Consecutive little-endian signed 16-bit device counts.
    Int16Le(Vec<u8>),
    /// Numbers separated by commas, semicolons or whitespace.
    Text(String),
}

impl From<f64> for RawInput {
    fn from(value: f64) -> Self {
        RawInput::Sample(value)
    }
}

impl From<Vec<f64>> for RawInput {
    fn from(values: Vec<f64>) -> Self {
        RawInput::Samples(values)
    }
}

impl From<&str> for RawInput {
    fn from(text: &str) -> Self {
        RawInput::Text(text.to_owned())
    }
}

/// Resolves `input` into samples with `scaling` applied.
pub fn parse_input(input: &RawInput, scaling: ScalingPolicy) -> Result<Vec<f64>, EngineError> {
    let raw = match input {
        RawInput::Sample(value) => vec![*value],
        RawInput::Samples(values) => values.clone(),
        RawInput::Int16Le(bytes) => decode_int16_le(bytes)?,
        RawInput::Text(text) => parse_text(text)?,
    };
    if raw.is_empty() {
        return Err(EngineError::EmptyInput);
    }
    if let Some(index) = raw.iter().position(|v| !v.is_finite()) {
        return Err(EngineError::NonFiniteSample { index });
    }
    Ok(raw.into_iter().map(|v| scaling.apply(v)).collect())
}

pub fn decode_int16_le(bytes: &[u8]) -> Result<Vec<f64>, EngineError> {
    if bytes.len() % 2 != 0 {
        return Err(EngineError::OddByteCount { len: bytes.len() });
    }
    Ok(bytes
        .chunks_exact(2)
        .map(|pair| f64::from(i16::from_le_bytes([pair[0], pair[1]])))
        .collect())
}

pub fn parse_text(text: &str) -> Result<Vec<f64>, EngineError> {
    text.split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .enumerate()
        .map(|(index, token)| match token.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(EngineError::InvalidToken {
                index,
                token: token.to_owned(),
            }),
        })
        .collect()
}
