//! Wiring of reader, packer and emitter.

use log::{debug, info};
use std::io::{BufRead, Write};

use crate::{
    band::BandPacker,
    bitmap::PbmReader,
    error::Error,
    toolpath::{EmitBand, Encoding, Geometry},
};

/// Config
///
#[derive(Debug, Clone)]
pub struct Config {
    jet_count: usize,
    row_pitch: f64,
    encoding: Encoding,
    preamble: bool,
    skip_trailing_blank: bool,
}

impl Config {
    /// Initialize configuration data with default values.
    ///
    /// The head defaults to 12 jets spanning 3.15mm per band. The encoding
    /// is not modifiable after the initialization.
    ///
    /// # Example
    ///
    /// ```
    /// use brundlefab::{Config, Encoding};
    ///
    /// let config = Config::new(Encoding::Packed).jet_count(8).preamble(true);
    /// ```
    ///
    pub fn new(encoding: Encoding) -> Config {
        Config {
            jet_count: crate::DEFAULT_JET_COUNT,
            row_pitch: crate::DEFAULT_ROW_PITCH_MM,
            encoding,
            preamble: false,
            skip_trailing_blank: false,
        }
    }

    /// Number of jets on the head, at most `MAX_JET_COUNT`.
    pub fn jet_count(self, jet_count: usize) -> Self {
        Config { jet_count, ..self }
    }

    /// Millimeters covered by one band on the slow axis.
    pub fn row_pitch(self, row_pitch: f64) -> Self {
        Config { row_pitch, ..self }
    }

    /// Start the stream with unit and positioning mode commands.
    pub fn preamble(self, flag: bool) -> Self {
        Config {
            preamble: flag,
            ..self
        }
    }

    pub fn skip_trailing_blank(self, flag: bool) -> Self {
        Config {
            skip_trailing_blank: flag,
            ..self
        }
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn geometry(&self) -> Geometry {
        Geometry::new(self.jet_count, self.row_pitch)
    }

    fn validate(&self) -> Result<(), Error> {
        if self.jet_count == 0 || self.jet_count > crate::MAX_JET_COUNT {
            return Err(Error::InvalidConfig(format!(
                "jet count {} is not in 1..={}",
                self.jet_count,
                crate::MAX_JET_COUNT
            )));
        }
        if !self.row_pitch.is_finite() || self.row_pitch <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "row pitch {} must be a positive length",
                self.row_pitch
            )));
        }
        Ok(())
    }
}

/// Outcome of a successful conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub width: usize,
    pub height: usize,
    /// Bands flushed, including a trailing partial band.
    pub bands: usize,
}

/// Bitmap to toolpath converter.
pub struct Converter {
    config: Config,
    emitter: Box<dyn EmitBand>,
}

impl Converter {
    pub fn new(config: Config) -> Result<Self, Error> {
        config.validate()?;
        debug!("{:?}", config);

        let emitter = config
            .encoding
            .emitter(config.geometry(), config.skip_trailing_blank);

        Ok(Converter { config, emitter })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Convert a binary PBM read from `input` into commands on `output`.
    ///
    /// Nothing is written when the header is rejected. A truncated raster
    /// aborts after the bands completed so far have been written.
    pub fn convert<R: BufRead, W: Write>(&self, input: R, mut output: W) -> Result<Summary, Error> {
        let mut reader = PbmReader::new(input)?;
        let bitmap = reader.bitmap();

        if self.config.preamble {
            writeln!(output, "G21 ; Units are mm")?;
            writeln!(output, "G90 ; Absolute positioning")?;
        }

        let emitter = self.emitter.as_ref();
        let mut packer = BandPacker::new(bitmap.width, self.config.jet_count);
        let mut row = vec![0u8; bitmap.stride()];

        for _ in 0..bitmap.height {
            reader.read_row(&mut row)?;
            packer.push_row(&row, |band| emitter.emit_band(band, &mut output))?;
        }
        packer.finish(|band| emitter.emit_band(band, &mut output))?;
        output.flush()?;

        let summary = Summary {
            width: bitmap.width,
            height: bitmap.height,
            bands: packer.bands(),
        };
        info!(
            "converted {}x{} bitmap into {} bands",
            summary.width, summary.height, summary.bands
        );
        Ok(summary)
    }
}
