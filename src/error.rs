//! Error types for city generation

use thiserror::Error;

/// Errors that can abort a generation run or reject a configuration
///
/// Degraded results (a street that could not be routed, a subdivision that
/// produced no buildings) are not errors: they are recorded on the model and
/// the run completes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CityError {
    /// Configuration validation failed
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The citadel patch lost its round shape while the walls were built
    #[error("bad citadel shape: compactness {compactness:.3} is below {min}")]
    BadCitadelShape {
        /// Compactness measured after the castle wall was built
        compactness: f64,
        /// Required minimum compactness
        min: f64,
    },

    /// The Delaunay triangulation rejected a seed point
    #[error("tessellation failed: {0}")]
    Tessellation(String),
}

/// Result type alias for city generation
pub type Result<T> = std::result::Result<T, CityError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CityError::InvalidConfig("seed must be positive".into());
        assert_eq!(err.to_string(), "invalid configuration: seed must be positive");

        let err = CityError::BadCitadelShape { compactness: 0.5, min: 0.75 };
        assert_eq!(err.to_string(), "bad citadel shape: compactness 0.500 is below 0.75");
    }
}
