use std::io::{self, Read, Write};
use std::path::PathBuf;

use clap::Parser;
use log::debug;

use svg2carray::{DataType, QuantizationConfig};

#[derive(Parser, Debug)]
#[command(
    name = "svg2carray",
    version,
    about = "Convert the line paths of an SVG file to fixed-point C coordinate arrays."
)]
struct Cli {
    /// Path to the SVG file (read from stdin if omitted)
    #[arg(long, value_name = "FILE")]
    svg: Option<PathBuf>,

    /// Data type for the coordinate arrays: uint8_t, uint16_t or uint32_t
    #[arg(long = "data_type", default_value = "uint16_t")]
    data_type: String,

    /// DAC resolution, i.e. the span of the scaled coordinates
    #[arg(long, default_value_t = 4096)]
    resolution: u32,

    /// Path element to convert (all paths if omitted)
    #[arg(long = "path_num")]
    path_num: Option<usize>,

    /// X offset
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    x: i64,

    /// Y offset
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    y: i64,

    /// Print code only
    #[arg(long = "code")]
    code_only: bool,

    /// Prefix for generated data structures
    #[arg(long, default_value = "image")]
    prefix: String,
}

fn main() {
    fn inner() -> Result<(), Box<dyn std::error::Error>> {
        env_logger::init();
        let cli = Cli::parse();
        debug!("{:?}", cli);

        // Reject bad settings before touching the input
        let data_type: DataType = cli.data_type.parse()?;
        let config = QuantizationConfig::new(data_type, cli.resolution, cli.x, cli.y)?;

        let input = match &cli.svg {
            Some(path) => std::fs::read_to_string(path)?,
            None => {
                let mut buffer = String::new();
                io::stdin().read_to_string(&mut buffer)?;
                buffer
            }
        };

        let table = svg2carray::convert(&input, &config, cli.path_num)?;

        let stdout = io::stdout();
        let mut out = stdout.lock();
        if !cli.code_only {
            write!(out, "{}", table.diagnostics())?;
        }
        write!(out, "{}", table.declarations(&cli.prefix))?;
        out.flush()?;

        Ok(())
    }

    if let Err(e) = inner() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
