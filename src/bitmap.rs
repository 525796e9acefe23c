//! Binary PBM (`P4`) reader.
//!
//! Only the raw 1-bit variant is understood. Rows are handed out one at a
//! time so the converter never holds more than a single row of raster data.

use log::{debug, trace};
use std::io::{self, BufRead};

use crate::error::Error;

/// Longest header token accepted, enough for any sane dimension.
const MAX_TOKEN_LEN: usize = 20;

/// Declared dimensions of a bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bitmap {
    pub width: usize,
    pub height: usize,
}

impl Bitmap {
    /// Create bitmap dimensions, rejecting an empty raster or one wider
    /// than `MAX_WIDTH`.
    pub fn new(width: usize, height: usize) -> Result<Self, Error> {
        if width == 0 || height == 0 || width > crate::MAX_WIDTH {
            return Err(Error::InvalidDimensions { width, height });
        }
        Ok(Bitmap { width, height })
    }

    /// Bytes per raster row, 8 pixels packed MSB-first into each byte.
    pub fn stride(&self) -> usize {
        (self.width + 7) / 8
    }
}

/// Sequential reader over a binary PBM stream.
pub struct PbmReader<R> {
    input: R,
    bitmap: Bitmap,
    rows: usize,
}

impl<R: BufRead> PbmReader<R> {
    /// Parse the PBM header and position the reader at the first row.
    ///
    /// The header is the magic `P4`, the width and the height, separated by
    /// whitespace and optional `#` comments. A single whitespace byte
    /// separates the height from the raster.
    pub fn new(mut input: R) -> Result<Self, Error> {
        let magic = read_token(&mut input)?;
        if magic != "P4" {
            return Err(Error::MalformedHeader(format!(
                "unsupported magic {:?}",
                magic
            )));
        }

        let width = read_number(&mut input, "width")?;
        let height = read_number(&mut input, "height")?;
        let bitmap = Bitmap::new(width, height)?;

        debug!(
            "PBM header: {}x{} ({} bytes per row)",
            bitmap.width,
            bitmap.height,
            bitmap.stride()
        );

        Ok(PbmReader {
            input,
            bitmap,
            rows: 0,
        })
    }

    pub fn bitmap(&self) -> Bitmap {
        self.bitmap
    }

    /// Number of rows read so far.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Read the next raster row into `buf[..stride]`.
    ///
    /// `buf` must hold at least `stride()` bytes. A short read, or a read
    /// past the declared height, fails with `Error::TruncatedData`.
    pub fn read_row(&mut self, buf: &mut [u8]) -> Result<(), Error> {
        let row = self.rows;
        if row >= self.bitmap.height {
            return Err(Error::TruncatedData {
                row,
                source: io::Error::new(io::ErrorKind::UnexpectedEof, "all rows already read"),
            });
        }

        let stride = self.bitmap.stride();
        self.input
            .read_exact(&mut buf[..stride])
            .map_err(|source| Error::TruncatedData { row, source })?;
        self.rows += 1;

        trace!("row {}: {:02X?}", row, &buf[..stride]);
        Ok(())
    }
}

fn next_byte<R: BufRead>(input: &mut R) -> Result<Option<u8>, Error> {
    let byte = loop {
        match input.fill_buf() {
            Ok(buf) => break buf.first().copied(),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::MalformedHeader(e.to_string())),
        }
    };
    if byte.is_some() {
        input.consume(1);
    }
    Ok(byte)
}

/// Read one whitespace delimited header token, consuming the single
/// whitespace byte that ends it.
fn read_token<R: BufRead>(input: &mut R) -> Result<String, Error> {
    let mut token = String::new();

    // Skip leading whitespace and comments
    let mut byte = loop {
        match next_byte(input)? {
            Some(b'#') => {
                while let Some(b) = next_byte(input)? {
                    if b == b'\n' || b == b'\r' {
                        break;
                    }
                }
            }
            Some(b) if b.is_ascii_whitespace() => continue,
            Some(b) => break b,
            None => return Err(Error::MalformedHeader("unexpected end of header".to_string())),
        }
    };

    loop {
        if token.len() >= MAX_TOKEN_LEN {
            return Err(Error::MalformedHeader(format!("header token too long: {:?}", token)));
        }
        token.push(byte as char);
        match next_byte(input)? {
            Some(b) if b.is_ascii_whitespace() => break,
            Some(b) => byte = b,
            None => return Err(Error::MalformedHeader("unexpected end of header".to_string())),
        }
    }

    Ok(token)
}

fn read_number<R: BufRead>(input: &mut R, name: &str) -> Result<usize, Error> {
    let token = read_token(input)?;
    token
        .parse()
        .map_err(|_| Error::MalformedHeader(format!("invalid {} {:?}", name, token)))
}
