use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;

use streaming_inflate_rs::{GzipDecoder, ZlibDecoder};
use structopt::StructOpt;

enum Container {
    Gzip,
    Zlib,
}

impl std::str::FromStr for Container {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gzip" | "gz" => Ok(Container::Gzip),
            "zlib" => Ok(Container::Zlib),
            other => Err(format!("unknown container format: {other}")),
        }
    }
}

#[derive(StructOpt)]
struct InflateParams {
    input: PathBuf,
    output: Option<PathBuf>,

    /// Container framing to expect. Defaults to gzip unless the input ends
    /// in `.zz`/`.zlib`.
    #[structopt(long)]
    format: Option<Container>,

    /// Decompress and discard output, for timing/smoke-testing a large
    /// file without paying for disk writes.
    #[structopt(short)]
    simulate: bool,
}

fn guess_format(path: &PathBuf) -> Container {
    match path.extension().and_then(|e| e.to_str()) {
        Some("zz") | Some("zlib") => Container::Zlib,
        _ => Container::Gzip,
    }
}

fn main() -> std::io::Result<()> {
    env_logger::init();
    let params = InflateParams::from_args();

    let format = params.format.unwrap_or_else(|| guess_format(&params.input));
    let reader = BufReader::new(File::open(&params.input)?);

    let mut out: Box<dyn Write> = if params.simulate {
        Box::new(std::io::sink())
    } else {
        let output_path = params
            .output
            .clone()
            .unwrap_or_else(|| params.input.with_extension(""));
        Box::new(BufWriter::new(File::create(output_path)?))
    };

    match format {
        Container::Gzip => {
            let mut decoder = GzipDecoder::new(reader)?;
            std::io::copy(&mut decoder, &mut out)?;
        }
        Container::Zlib => {
            let mut decoder = ZlibDecoder::new(reader)?;
            std::io::copy(&mut decoder, &mut out)?;
        }
    }

    out.flush()
}
