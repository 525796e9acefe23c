use brundlefab::{threshold_luma, Config, Converter, Encoding};
use std::env;
use std::io::{self, Cursor, Write};

//
// cargo run --example png_to_toolpath -- layer.png [hex|packed]
//

fn print_usage() {
    println!("Usage: cargo run --example png_to_toolpath -- IMAGE [ENCODING]");
    println!("Encodings:");
    println!("  hex      One pattern select and move per run (default)");
    println!("  packed   One base64 bitmap per band");
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

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return;
    }

    let encoding = match args.get(2).map(|s| s.to_lowercase()) {
        None => Encoding::HexRun,
        Some(ref s) if s == "hex" => Encoding::HexRun,
        Some(ref s) if s == "packed" => Encoding::Packed,
        Some(s) => {
            eprintln!("Error: Unknown encoding '{}'", s);
            print_usage();
            return;
        }
    };

    let image = image::open(&args[1]).unwrap().to_luma8();
    let (width, height) = image.dimensions();
    let rows = threshold_luma(80, width as usize, height as usize, image.as_raw()).unwrap();

    let mut pbm = format!("P4\n{} {}\n", width, height).into_bytes();
    for row in rows {
        pbm.extend_from_slice(&row);
    }

    let converter = Converter::new(Config::new(encoding).preamble(true)).unwrap();
    let stdout = io::stdout();
    match converter.convert(Cursor::new(pbm), stdout.lock()) {
        Ok(summary) => eprintln!("{} bands", summary.bands),
        Err(err) => eprintln!("ERROR {:#?}", err),
    }
}
