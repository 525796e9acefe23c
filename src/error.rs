//! Error types for toolpath generation.
//!
//! This module defines all possible errors that can occur while reading a
//! bitmap, configuring the converter and writing the command stream.

use std::io;
use thiserror::Error;

/// Main error type for bitmap conversion.
#[derive(Error, Debug)]
pub enum Error {
    /// The input does not start with a binary PBM header.
    ///
    /// Raised before any command is written, so the output stays empty.
    #[error("Input is not a PBM: {0}")]
    MalformedHeader(String),

    #[error("Invalid bitmap dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    /// The raster ended before all declared rows were read.
    ///
    /// Commands for the bands completed so far are already written and
    /// are left as they are.
    #[error("Input error at row {row}: {source}")]
    TruncatedData {
        row: usize,
        #[source]
        source: io::Error,
    },

    /// Invalid configuration parameter provided.
    ///
    /// This error occurs when the jet count or the row pitch is out of range.
    #[error("Invalid configuration parameter: {0}")]
    InvalidConfig(String),

    /// Writing the command stream failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}
