use base64::{engine::general_purpose, Engine as _};
use brundlefab::{Config, Converter, Encoding, Error, Summary};
use std::io::{self, Cursor, Write};

fn pbm(width: usize, rows: &[Vec<u8>]) -> Vec<u8> {
    let mut data = format!("P4\n{} {}\n", width, rows.len()).into_bytes();
    for row in rows {
        data.extend_from_slice(row);
    }
    data
}

fn convert(config: Config, data: Vec<u8>) -> (Result<Summary, Error>, String) {
    let converter = Converter::new(config).unwrap();
    let mut out = Vec::new();
    let result = converter.convert(Cursor::new(data), &mut out);
    (result, String::from_utf8(out).unwrap())
}

#[test]
fn blank_bitmap_hex_has_no_commands() {
    let data = pbm(20, &vec![vec![0; 3]; 30]);
    let (result, text) = convert(Config::new(Encoding::HexRun), data);

    assert_eq!(
        result.unwrap(),
        Summary {
            width: 20,
            height: 30,
            bands: 3
        }
    );
    assert_eq!(text, "");
}

#[test]
fn blank_bitmap_packed_has_one_group_per_band() {
    let data = pbm(20, &vec![vec![0; 3]; 30]);
    let (result, text) = convert(Config::new(Encoding::Packed), data);
    assert_eq!(result.unwrap().bands, 3);

    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 12);
    for (band, group) in lines.chunks(4).enumerate() {
        assert!(group[0].starts_with("G0 X"));
        assert!(group[0].ends_with(&format!("; Band {}", band)));
        assert_eq!(group[1], "T1 S5.250 L40 ; Packed pattern");
        let payload = general_purpose::STANDARD.decode(group[2]).unwrap();
        assert_eq!(payload, vec![0; 40]);
        assert_eq!(group[3], "G1 Y5.250 ; Spray packed pattern");
    }
}

#[test]
fn partial_band_is_flushed_once() {
    // Column 0 inked on every row, 30 rows is two full bands and 6 rows
    let data = pbm(8, &vec![vec![0x80]; 30]);
    let (result, text) = convert(Config::new(Encoding::HexRun), data);
    assert_eq!(result.unwrap().bands, 3);

    assert_eq!(
        text,
        "T0\n\
         G0 X0.000 Y0.000 ; Band 0\n\
         T1 P4095 ; Pattern FFF\n\
         G1 Y0.000 ; Spray pattern\n\
         T1 P0 ; Pattern 000\n\
         G1 Y1.838 ; Spray pattern\n\
         T0\n\
         G0 X3.150 Y0.000 ; Band 1\n\
         T1 P4095 ; Pattern FFF\n\
         G1 Y0.000 ; Spray pattern\n\
         T1 P0 ; Pattern 000\n\
         G1 Y1.838 ; Spray pattern\n\
         T0\n\
         G0 X6.300 Y0.000 ; Band 2\n\
         T1 P63 ; Pattern 03F\n\
         G1 Y0.000 ; Spray pattern\n\
         T1 P0 ; Pattern 000\n\
         G1 Y1.838 ; Spray pattern\n"
    );
}

#[test]
fn height_multiple_of_jets_has_no_extra_band() {
    let data = pbm(8, &vec![vec![0xFF]; 24]);
    let (result, text) = convert(Config::new(Encoding::Packed), data);
    assert_eq!(result.unwrap().bands, 2);
    assert_eq!(text.lines().count(), 8);
}

#[test]
fn runs_and_scaling() {
    // Row 0 inks columns 0..=4, row 1 inks columns 3..=5
    let data = pbm(6, &[vec![0xF8], vec![0x1C]]);
    let (result, text) = convert(Config::new(Encoding::HexRun), data);
    assert_eq!(result.unwrap().bands, 1);

    assert_eq!(
        text,
        "T0\n\
         G0 X0.000 Y0.000 ; Band 0\n\
         T1 P1 ; Pattern 001\n\
         G1 Y0.525 ; Spray pattern\n\
         T1 P3 ; Pattern 003\n\
         G1 Y1.050 ; Spray pattern\n\
         T1 P2 ; Pattern 002\n\
         G1 Y1.312 ; Spray pattern\n"
    );
}

#[test]
fn skip_trailing_blank_drops_last_run() {
    let data = pbm(8, &[vec![0x30]]);
    let config = Config::new(Encoding::HexRun).skip_trailing_blank(true);
    let (result, text) = convert(config, data);
    assert!(result.is_ok());

    assert_eq!(
        text,
        "T0\n\
         G0 X0.000 Y0.525 ; Band 0\n\
         T1 P1 ; Pattern 001\n\
         G1 Y0.788 ; Spray pattern\n"
    );
}

#[test]
fn narrow_head_packs_bytes() {
    let rows = vec![vec![0xC0], vec![0x40], vec![0x00]];
    let config = Config::new(Encoding::Packed).jet_count(2).row_pitch(1.0);
    let (result, text) = convert(config, pbm(3, &rows));
    assert_eq!(result.unwrap().bands, 2);

    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines[0], "G0 X0.000 Y0.000 ; Band 0");
    assert_eq!(lines[1], "T1 S1.500 L3 ; Packed pattern");
    assert_eq!(general_purpose::STANDARD.decode(lines[2]).unwrap(), vec![1, 3, 0]);
    assert_eq!(lines[4], "G0 X1.000 Y0.000 ; Band 1");
    assert_eq!(general_purpose::STANDARD.decode(lines[6]).unwrap(), vec![0, 0, 0]);
}

#[test]
fn preamble_comes_first() {
    let config = Config::new(Encoding::HexRun).preamble(true);
    let (result, text) = convert(config, pbm(8, &[vec![0x00]]));
    assert!(result.is_ok());
    assert_eq!(text, "G21 ; Units are mm\nG90 ; Absolute positioning\n");
}

#[test]
fn malformed_header_writes_nothing() {
    let config = Config::new(Encoding::Packed).preamble(true);
    let (result, text) = convert(config, b"P5\n8 8\n255\n".to_vec());
    assert!(matches!(result, Err(Error::MalformedHeader(_))));
    assert_eq!(text, "");
}

#[test]
fn truncated_raster_keeps_completed_bands() {
    let mut data = pbm(8, &vec![vec![0xFF]; 14]);
    // Declare 24 rows but only provide 14
    data.splice(0..8, b"P4\n8 24\n".iter().cloned());
    let (result, text) = convert(Config::new(Encoding::Packed), data);

    match result {
        Err(Error::TruncatedData { row, source }) => {
            assert_eq!(row, 14);
            assert_eq!(source.kind(), io::ErrorKind::UnexpectedEof);
        }
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(text.lines().count(), 4);
    assert!(text.starts_with("G0 X0.000 Y0.000 ; Band 0\n"));
}

#[test]
fn oversized_header_is_rejected() {
    let (result, text) = convert(
        Config::new(Encoding::HexRun),
        b"P4\n18446744073709551615 1\n\x00".to_vec(),
    );
    assert!(matches!(result, Err(Error::InvalidDimensions { .. })));
    assert_eq!(text, "");
}

struct BrokenPipe;

impl Write for BrokenPipe {
    fn write(&mut self, _: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn output_failure_is_io_error() {
    let converter = Converter::new(Config::new(Encoding::Packed)).unwrap();
    let result = converter.convert(Cursor::new(pbm(8, &[vec![0xFF]])), BrokenPipe);
    assert!(matches!(result, Err(Error::Io(_))));
}
