//! Error types shared across the crate.

use thiserror::Error;

pub type SnowslideResult<T> = Result<T, SnowslideError>;

#[derive(Debug, Error)]
pub enum SnowslideError {
    /// Elevation and snow-depth grids must have identical shapes.
    #[error("shape mismatch: elevation is {expected:?}, snow depth is {actual:?}")]
    InvalidInputShape {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    /// A parameter failed validation before the simulation started.
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },
}

impl SnowslideError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_mismatch_message_names_both_shapes() {
        let err = SnowslideError::InvalidInputShape {
            expected: (10, 20),
            actual: (10, 19),
        };
        let msg = err.to_string();
        assert!(msg.contains("(10, 20)"));
        assert!(msg.contains("(10, 19)"));
    }

    #[test]
    fn config_constructor() {
        let err = SnowslideError::config("epsilon must be positive");
        assert!(err.to_string().contains("epsilon must be positive"));
    }
}
