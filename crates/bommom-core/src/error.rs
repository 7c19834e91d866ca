use thiserror::Error;

use crate::formats::csv::MAX_ELEMENTS;

/// Errors returned by the model, codecs and stores.
#[derive(Debug, Error)]
pub enum BomError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("BOM {owner}/{name} already has a version '{version}'")]
    AlreadyExists {
        owner: String,
        name: String,
        version: String,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Failed to decode {format}: {message}")]
    DecodeFailed {
        format: &'static str,
        message: String,
    },

    /// A metadata record exists but has no head version to resolve.
    #[error("Head version of {owner}/{name} is undefined")]
    PreconditionFailed { owner: String, name: String },

    #[error("Too large a quantity of elements ({0}, expected <= {max})", max = MAX_ELEMENTS)]
    QuantityTooLarge(u64),

    #[error("BOM already has a line item for {manufacturer} {mpn}")]
    DuplicateLineItem { manufacturer: String, mpn: String },

    #[error("Unknown file extension '{0}' (use --format)")]
    UnknownFormat(String),

    #[error("Loading {0} is not supported")]
    UnsupportedFormat(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BomError {
    pub(crate) fn decode(format: &'static str, err: impl std::fmt::Display) -> Self {
        BomError::DecodeFailed {
            format,
            message: err.to_string(),
        }
    }

    /// True for failures the caller can address by changing its input.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, BomError::PreconditionFailed { .. } | BomError::Io(_))
    }
}

/// Identifier and timestamp invariants checked before anything is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid version '{0}': must be a ShortName")]
    InvalidVersion(String),

    #[error("BOM has no creation timestamp")]
    MissingTimestamp,

    #[error("Invalid BOM name '{0}': must be a ShortName")]
    InvalidName(String),

    #[error("Invalid owner '{0}': must be a ShortName")]
    InvalidOwner(String),

    #[error("Not a valid ShortName: '{0}'")]
    InvalidShortName(String),

    #[error("BOM says version '{bom}' but is being stored as '{version}'")]
    VersionMismatch { bom: String, version: String },
}

pub type Result<T> = std::result::Result<T, BomError>;
