//! Error types for HESPE access

use thiserror::Error;

use crate::fits::FitsError;

/// Errors raised while talking to HESPE or decoding its products.
///
/// Nothing in this crate retries or recovers: the first error aborts the
/// operation and is handed straight back to the caller.
#[derive(Debug, Error)]
pub enum HespeError {
    /// Server answered with a non-success status code
    #[error("Address \"{url}\" returned HTTP-Code {status}")]
    HttpStatus { url: String, status: u16 },

    /// Connection or transfer failure below the HTTP status level
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response body was not the expected JSON
    #[error("JSON decode error: {0}")]
    Json(#[from] serde_json::Error),

    /// No record of the flare carries the requested ivsType
    #[error("Unsupported ivsType: {0}")]
    UnsupportedIvsType(String),

    #[error("Unknown ivsType name: {0}")]
    UnknownIvsType(String),

    #[error("Unknown image algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("Unknown ray type: {0}")]
    UnknownRayType(String),

    /// An image descriptor has no URL for the selected algorithm
    #[error("Image product has no \"{key}\" entry")]
    MissingProduct { key: &'static str },

    #[error("Flare record has no lightcurves entry")]
    MissingLightCurve,

    /// URL rewrite expected a quicklook PNG
    #[error("Expected a png-file: {0}")]
    NotPng(String),

    /// Filename does not embed a HESPE timestamp
    #[error("Cannot decode HESPE timestamp from \"{0}\"")]
    Timestamp(String),

    #[error("Missing column {0} in map table")]
    MissingColumn(String),

    /// Decoded arrays disagree in size
    #[error("Shape mismatch: {0}")]
    Shape(String),

    #[error("FITS error: {0}")]
    Fits(#[from] FitsError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, HespeError>;
