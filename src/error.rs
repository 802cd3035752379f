//! Error types for the raster conversion pipeline and protocol encoder.
//!
//! Unsupported capabilities are deliberately *not* errors: a cut request on a
//! model without a cutter degrades to a no-op so the same job logic runs
//! unmodified across the whole printer family.

use thiserror::Error;

/// Main error type for raster conversion and command encoding.
#[derive(Error, Debug)]
pub enum Error {
    /// The device model identifier is not in the capability table.
    ///
    /// This is a configuration error; it is surfaced before any command
    /// bytes are produced.
    #[error("Unknown printer model: {0}")]
    UnknownModel(String),

    /// The label identifier is not in the media table.
    #[error("Unknown label media: {0}")]
    UnknownLabel(String),

    /// A bit-plane was handed to the encoder with the wrong pixel width.
    ///
    /// The plane width must equal `bytes_per_row * 8` of the target model.
    /// This is a programming-interface error, not a runtime condition to
    /// recover from.
    #[error("Wrong pixel width: {actual}, expected {expected}")]
    InvalidPixelWidth { expected: u32, actual: u32 },

    /// Invalid configuration parameter provided.
    #[error("Invalid configuration parameter: {0}")]
    InvalidConfig(String),
}
