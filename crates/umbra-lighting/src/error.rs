/// Errors that can occur while loading lighting entities from map data.
///
/// Geometry and raster paths never fail: degenerate input is skipped and
/// unknown enum strings fall back to their defaults.
#[derive(Debug, Clone, PartialEq)]
pub enum LightingError {
    /// A colour property was not `#RRGGBB` or `#AARRGGBB`.
    InvalidColor(String),

    /// A numeric property could not be parsed.
    InvalidNumber { key: String, value: String },

    /// The map object is not of the kind the loader expected.
    UnexpectedObjectKind { expected: String, found: String },
}

impl std::fmt::Display for LightingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LightingError::InvalidColor(value) => write!(f, "Invalid color: {:?}", value),
            LightingError::InvalidNumber { key, value } => {
                write!(f, "Invalid number for property '{}': {:?}", key, value)
            }
            LightingError::UnexpectedObjectKind { expected, found } => write!(
                f,
                "Unexpected map object kind: expected {}, found {}",
                expected, found
            ),
        }
    }
}

impl std::error::Error for LightingError {}

/// Result type for lighting operations.
pub type LightingResult<T> = Result<T, LightingError>;
