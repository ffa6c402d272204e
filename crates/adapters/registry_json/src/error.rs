//! Registry file error type.

use powerscout_domain::error::PowerScoutError;

/// Errors reading the registry export as a whole.
///
/// Individual malformed elements are not errors; they are skipped.
#[derive(Debug, thiserror::Error)]
pub enum RegistryFileError {
    /// The file could not be read.
    #[error("unable to read registry file {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The file is not a JSON object with the expected arrays.
    #[error("registry file is not valid JSON")]
    Json(#[from] serde_json::Error),
}

impl From<RegistryFileError> for PowerScoutError {
    fn from(err: RegistryFileError) -> Self {
        Self::Storage(Box::new(err))
    }
}
