//! Packing of bitmap rows into per-column toolmasks.

use log::debug;

use crate::Toolmask;

/// A completed band, borrowed from the packer for the time of emission.
#[derive(Debug, Clone, Copy)]
pub struct Band<'a> {
    /// 0-based band number, which sets the slow axis offset.
    pub index: usize,
    /// Bitmap row packed into bit 0.
    pub first_row: usize,
    /// Rows packed into this band, less than the jet count for a trailing
    /// partial band.
    pub rows: usize,
    pub toolmask: &'a [Toolmask],
}

impl<'a> Band<'a> {
    pub fn width(&self) -> usize {
        self.toolmask.len()
    }

    pub fn is_blank(&self) -> bool {
        self.toolmask.iter().all(|&mask| mask == 0)
    }
}

/// Accumulates bitmap rows into the single live toolmask row.
///
/// Row `k` of a band sets bit `k` of every column where the row has a dark
/// pixel. Once `jet_count` rows are in, the band is handed to the emit
/// callback and the toolmask row is cleared for the next band.
#[derive(Debug)]
pub struct BandPacker {
    jet_count: usize,
    toolmask: Vec<Toolmask>,
    rows: usize,
    index: usize,
}

impl BandPacker {
    /// `jet_count` must lie in `1..=MAX_JET_COUNT`; `Converter` validates it.
    pub fn new(width: usize, jet_count: usize) -> Self {
        debug_assert!(jet_count >= 1 && jet_count <= crate::MAX_JET_COUNT);

        BandPacker {
            jet_count,
            toolmask: vec![0; width],
            rows: 0,
            index: 0,
        }
    }

    /// Set bit `row_offset` of every column where `row_bits` is dark.
    ///
    /// Columns are packed MSB-first, so column 0 is bit 7 of byte 0. Bits
    /// past the bitmap width are ignored.
    pub fn accumulate(&mut self, row_bits: &[u8], row_offset: usize) {
        debug_assert!(row_offset < self.jet_count);

        let bit: Toolmask = 1 << row_offset;
        for (column, mask) in self.toolmask.iter_mut().enumerate() {
            if row_bits[column >> 3] & (0x80 >> (column & 7)) != 0 {
                *mask |= bit;
            }
        }
    }

    /// Add the next row of the bitmap, calling `emit` if it fills the band.
    pub fn push_row<F, E>(&mut self, row_bits: &[u8], emit: F) -> Result<(), E>
    where
        F: FnOnce(&Band<'_>) -> Result<(), E>,
    {
        self.accumulate(row_bits, self.rows);
        self.rows += 1;

        if self.rows == self.jet_count {
            self.flush(emit)?;
        }
        Ok(())
    }

    /// Flush the trailing partial band, if any rows are pending.
    ///
    /// When the bitmap height is a multiple of the jet count the last band
    /// was already flushed by `push_row` and nothing happens here.
    pub fn finish<F, E>(&mut self, emit: F) -> Result<(), E>
    where
        F: FnOnce(&Band<'_>) -> Result<(), E>,
    {
        if self.rows > 0 {
            self.flush(emit)?;
        }
        Ok(())
    }

    /// Number of bands flushed so far.
    pub fn bands(&self) -> usize {
        self.index
    }

    /// Current toolmask row.
    pub fn toolmask(&self) -> &[Toolmask] {
        &self.toolmask
    }

    fn flush<F, E>(&mut self, emit: F) -> Result<(), E>
    where
        F: FnOnce(&Band<'_>) -> Result<(), E>,
    {
        let band = Band {
            index: self.index,
            first_row: self.index * self.jet_count,
            rows: self.rows,
            toolmask: &self.toolmask,
        };
        debug!(
            "band {}: rows {}..{}{}",
            band.index,
            band.first_row,
            band.first_row + band.rows,
            if band.is_blank() { " (blank)" } else { "" }
        );
        emit(&band)?;

        for mask in self.toolmask.iter_mut() {
            *mask = 0;
        }
        self.rows = 0;
        self.index += 1;
        Ok(())
    }
}
