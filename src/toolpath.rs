//! Playback of toolmask rows as ink head commands.
//!
//! A band is turned into a pass along the fast (Y) axis at the band's
//! slow (X) axis offset. Two encodings of the pass are available:
//!
//! - `HexRunEmitter` selects a spray pattern per run of identical
//!   toolmasks and moves the head to the end of the run.
//! - `PackedEmitter` sends the whole band as a base64 encoded bitmap and
//!   sweeps the head over it in one move.

use base64::{engine::general_purpose, Engine as _};
use log::trace;
use std::io::{self, Write};

use crate::{band::Band, Toolmask};

/// Physical layout of the ink head.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub jet_count: usize,
    /// Millimeters covered by one band on the slow axis.
    pub row_pitch: f64,
}

impl Geometry {
    pub fn new(jet_count: usize, row_pitch: f64) -> Self {
        Geometry {
            jet_count,
            row_pitch,
        }
    }

    /// Millimeters between two columns on the fast axis.
    pub fn col_pitch(&self) -> f64 {
        self.row_pitch / self.jet_count as f64
    }

    pub fn slow_axis(&self, band_index: usize) -> f64 {
        band_index as f64 * self.row_pitch
    }

    pub fn fast_axis(&self, column: usize) -> f64 {
        column as f64 * self.col_pitch()
    }

    /// Bytes needed to send one toolmask.
    pub fn bytes_per_column(&self) -> usize {
        if self.jet_count > 8 {
            2
        } else {
            1
        }
    }
}

/// Maximal span of columns sharing one toolmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    pub start: usize,
    /// Last column of the run, inclusive.
    pub end: usize,
    pub mask: Toolmask,
}

/// Split a toolmask row into runs.
///
/// Leading blank columns are skipped, so a blank row has no runs. From the
/// first inked column on every column belongs to exactly one run and the
/// last run always ends at the last column.
pub fn runs(toolmask: &[Toolmask]) -> Vec<Run> {
    let origin = match toolmask.iter().position(|&mask| mask != 0) {
        Some(origin) => origin,
        None => return Vec::new(),
    };

    let mut runs = Vec::new();
    let mut start = origin;
    for column in origin + 1..toolmask.len() {
        if toolmask[column] != toolmask[start] {
            runs.push(Run {
                start,
                end: column - 1,
                mask: toolmask[start],
            });
            start = column;
        }
    }
    runs.push(Run {
        start,
        end: toolmask.len() - 1,
        mask: toolmask[start],
    });

    runs
}

/// Writes the commands for one band.
pub trait EmitBand {
    fn emit_band(&self, band: &Band<'_>, out: &mut dyn Write) -> io::Result<()>;
}

/// Output encoding, selected once per conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// One pattern select and one move per run (`HexRunEmitter`).
    HexRun,
    /// One base64 bitmap per band (`PackedEmitter`).
    Packed,
}

impl Encoding {
    /// Build the emitter for this encoding.
    ///
    /// `skip_trailing_blank` only affects `Encoding::HexRun`.
    pub fn emitter(self, geometry: Geometry, skip_trailing_blank: bool) -> Box<dyn EmitBand> {
        match self {
            Self::HexRun => Box::new(HexRunEmitter {
                geometry,
                skip_trailing_blank,
            }),
            Self::Packed => Box::new(PackedEmitter { geometry }),
        }
    }
}

/// Human readable encoding, one `T1 P<mask>` / `G1 Y<end>` pair per run.
///
/// Blank bands produce no output at all.
#[derive(Debug, Clone)]
pub struct HexRunEmitter {
    pub geometry: Geometry,
    /// Drop a final run of blank columns instead of sweeping over it.
    pub skip_trailing_blank: bool,
}

impl HexRunEmitter {
    pub fn new(geometry: Geometry) -> Self {
        HexRunEmitter {
            geometry,
            skip_trailing_blank: false,
        }
    }
}

impl EmitBand for HexRunEmitter {
    fn emit_band(&self, band: &Band<'_>, out: &mut dyn Write) -> io::Result<()> {
        let runs = runs(band.toolmask);
        let origin = match runs.first() {
            Some(run) => run.start,
            None => return Ok(()),
        };

        let mut runs = &runs[..];
        if self.skip_trailing_blank {
            if let Some((last, rest)) = runs.split_last() {
                if last.mask == 0 {
                    runs = rest;
                }
            }
        }

        writeln!(out, "T0")?;
        writeln!(
            out,
            "G0 X{:.3} Y{:.3} ; Band {}",
            self.geometry.slow_axis(band.index),
            self.geometry.fast_axis(origin),
            band.index
        )?;

        for run in runs {
            trace!(
                "band {}: run {}..={} pattern {:03X}",
                band.index,
                run.start,
                run.end,
                run.mask
            );
            writeln!(out, "T1 P{} ; Pattern {:03X}", run.mask, run.mask)?;
            writeln!(
                out,
                "G1 Y{:.3} ; Spray pattern",
                self.geometry.fast_axis(run.end)
            )?;
        }
        Ok(())
    }
}

/// Compact encoding, the band's toolmasks sent as one base64 payload.
///
/// Every band is emitted, blank or not, so the head always sweeps the full
/// width.
#[derive(Debug, Clone)]
pub struct PackedEmitter {
    pub geometry: Geometry,
}

impl PackedEmitter {
    pub fn new(geometry: Geometry) -> Self {
        PackedEmitter { geometry }
    }

    /// Toolmasks as bytes, big-endian `u16` per column for heads wider
    /// than 8 jets, else one byte per column.
    pub fn payload(&self, toolmask: &[Toolmask]) -> Vec<u8> {
        let mut buf = Vec::with_capacity(toolmask.len() * self.geometry.bytes_per_column());
        for &mask in toolmask {
            if self.geometry.bytes_per_column() == 2 {
                buf.extend_from_slice(&mask.to_be_bytes());
            } else {
                buf.push(mask as u8);
            }
        }
        buf
    }
}

impl EmitBand for PackedEmitter {
    fn emit_band(&self, band: &Band<'_>, out: &mut dyn Write) -> io::Result<()> {
        let span = self.geometry.fast_axis(band.width());
        let payload = self.payload(band.toolmask);

        writeln!(
            out,
            "G0 X{:.3} Y{:.3} ; Band {}",
            self.geometry.slow_axis(band.index),
            0.0,
            band.index
        )?;
        writeln!(out, "T1 S{:.3} L{} ; Packed pattern", span, payload.len())?;
        writeln!(out, "{}", general_purpose::STANDARD.encode(&payload))?;
        writeln!(out, "G1 Y{:.3} ; Spray packed pattern", span)?;
        Ok(())
    }
}
