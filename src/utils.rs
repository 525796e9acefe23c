//! Convert 8-bit grayscale pixels into packed 1-bit rows.

use crate::error::Error;

/// Threshold `pixels` (row-major, one byte per pixel) into PBM style rows.
///
/// A pixel at or below `threshold` is dark. Each row is packed MSB-first
/// into `ceil(width / 8)` bytes, the padding bits left clear.
pub fn threshold_luma(
    threshold: u8,
    width: usize,
    height: usize,
    pixels: &[u8],
) -> Result<Vec<Vec<u8>>, Error> {
    if width == 0 || height == 0 || pixels.len() != width * height {
        return Err(Error::InvalidDimensions { width, height });
    }

    // threshold = 80 seems to work fine if original data is monochrome.
    let stride = (width + 7) / 8;
    let mut bw: Vec<Vec<u8>> = Vec::with_capacity(height);

    for line in pixels.chunks(width) {
        let mut buf = vec![0u8; stride];
        for (x, &pixel) in line.iter().enumerate() {
            if pixel <= threshold {
                buf[x >> 3] |= 0x80 >> (x & 7);
            }
        }
        bw.push(buf);
    }

    Ok(bw)
}
