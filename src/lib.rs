//! BrundleFab Toolpath Generator
//!
//! This crate converts a monochrome PBM bitmap into the command stream that
//! drives the 12-jet ink head of a BrundleFab style fabricator.
//!
//! Bitmap rows are packed into bands of `jet_count` rows. Every band becomes
//! one row of toolmasks (one bitmask per column, bit `k` set when jet `k`
//! must fire) and each toolmask row is played back as a pass of the head.
//!
//! # Example
//!
//! ```rust,no_run
//! use brundlefab::{Config, Converter, Encoding};
//!
//! let config = Config::new(Encoding::HexRun).jet_count(12).row_pitch(3.15);
//! let converter = Converter::new(config).unwrap();
//!
//! let stdin = std::io::stdin();
//! let stdout = std::io::stdout();
//! converter.convert(stdin.lock(), stdout.lock()).unwrap();
//! ```

mod band;
mod bitmap;
mod converter;
mod error;
mod toolpath;
mod utils;

pub use crate::{
    band::{Band, BandPacker},
    bitmap::{Bitmap, PbmReader},
    converter::{Config, Converter, Summary},
    error::Error,
    toolpath::{runs, EmitBand, Encoding, Geometry, HexRunEmitter, PackedEmitter, Run},
    utils::threshold_luma,
};

/// Bitmask of the jets firing at one column of a band.
///
/// Bit `k` belongs to row `k` of the band, so the type bounds the number
/// of jets a head may have.
pub type Toolmask = u16;

/// Number of jets of the stock HP C6602 ink head.
pub const DEFAULT_JET_COUNT: usize = 12;

/// Widest head a `Toolmask` can describe.
pub const MAX_JET_COUNT: usize = 16;

/// Widest bitmap accepted, in columns.
///
/// Far beyond the travel of any head, it bounds the toolmask row
/// allocated from an untrusted header.
pub const MAX_WIDTH: usize = 65536;

/// Distance covered by one full band on the slow (X) axis, in millimeters.
///
/// The column pitch on the fast (Y) axis is this value divided by the
/// jet count, 0.2625 mm for the default head.
pub const DEFAULT_ROW_PITCH_MM: f64 = 3.15;
