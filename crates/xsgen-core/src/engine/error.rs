use super::backend::BackendError;
use super::config::ConfigError;
use crate::core::io::binary::LibraryIoError;
use crate::core::models::ids::{XsId, XsIdError, format_xs_ids};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {source}")]
    Configuration {
        #[from]
        source: ConfigError,
    },

    #[error("Invalid cross-section identifier on block '{block}': {source}")]
    InvalidXsId {
        block: String,
        #[source]
        source: XsIdError,
    },

    #[error(
        "The attached library has no cross sections for XS IDs {} and none were generated",
        format_xs_ids(.missing)
    )]
    MissingData { missing: Vec<XsId> },

    #[error(
        "Lattice physics calculation failed for XS IDs {}: {reason}",
        format_xs_ids(.xs_ids)
    )]
    ExternalCalculation { xs_ids: Vec<XsId>, reason: String },

    #[error("Cross-section library I/O failed: {source}")]
    Library {
        #[from]
        source: LibraryIoError,
    },

    #[error("Lattice physics backend '{backend}' failed: {source}")]
    Backend {
        backend: String,
        #[source]
        source: BackendError,
    },
}
