use clap::Parser;
use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Write},
    path::PathBuf,
    process,
};

use brundlefab::{Config, Converter, Encoding, Error, Summary};

//
// pbm2fab part.pbm -o part.gcode
// convert logo.png pbm:- | pbm2fab --encoding packed
//

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum Format {
    /// One pattern select and move per run of identical columns
    Hex,
    /// One base64 encoded bitmap per band
    Packed,
}

impl From<Format> for Encoding {
    fn from(format: Format) -> Self {
        match format {
            Format::Hex => Encoding::HexRun,
            Format::Packed => Encoding::Packed,
        }
    }
}

/// Convert a binary PBM bitmap into BrundleFab ink head commands.
#[derive(Parser, Debug)]
#[command(name = "pbm2fab")]
struct Args {
    /// Input PBM file, `-` or nothing for stdin
    input: Option<PathBuf>,

    /// Output file, stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Command encoding
    #[arg(short, long, value_enum, default_value = "hex")]
    encoding: Format,

    /// Number of jets on the ink head
    #[arg(short, long, default_value_t = brundlefab::DEFAULT_JET_COUNT)]
    jets: usize,

    /// Millimeters covered by one band on the slow axis
    #[arg(short = 'p', long, default_value_t = brundlefab::DEFAULT_ROW_PITCH_MM)]
    row_pitch: f64,

    /// Emit unit and positioning mode commands first
    #[arg(long)]
    preamble: bool,

    /// Do not sweep over blank columns at the end of a band
    #[arg(long)]
    skip_trailing_blank: bool,
}

fn main() {
    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}:{}] {} - {}",
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.level(),
                record.args()
            )
        })
        .init();

    let args = Args::parse();

    if let Err(err) = run(args) {
        log::debug!("{:?}", err);
        eprintln!("pbm2fab: {}", err);
        process::exit(1);
    }
}

fn run(args: Args) -> Result<Summary, Error> {
    let config = Config::new(args.encoding.into())
        .jet_count(args.jets)
        .row_pitch(args.row_pitch)
        .preamble(args.preamble)
        .skip_trailing_blank(args.skip_trailing_blank);
    let converter = Converter::new(config)?;

    let input: Box<dyn io::BufRead> = match args.input {
        Some(path) if path.as_os_str() != "-" => Box::new(BufReader::new(File::open(path)?)),
        _ => Box::new(BufReader::new(io::stdin())),
    };

    let output: Box<dyn Write> = match args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout())),
    };

    converter.convert(input, output)
}
