//! A streaming, resumable DEFLATE/zlib/gzip decompressor.
//!
//! The [`inflator::Inflator`] is the core: a state machine that decodes one
//! DEFLATE bitstream incrementally, suspending cleanly whenever its input or
//! output buffer runs out and resuming exactly where it left off. On top of
//! it, [`zlib::ZlibDecoder`] and [`gzip::GzipDecoder`] add container framing
//! and checksum verification behind an ordinary `std::io::Read` adapter, and
//! [`decompress_to_vec`] gives a one-shot whole-buffer convenience for
//! callers that don't need streaming.

#[macro_use]
extern crate static_assertions;

pub mod bitreader;
mod deflate_constants;
pub mod error;
pub mod gzip;
pub mod inflator;
pub mod table;
pub mod unchecked;
pub mod window;
pub mod zlib;

use std::io::Read;

pub use error::{InflateError, Result};
pub use gzip::GzipDecoder;
pub use inflator::{InflateStatus, Inflator};
pub use zlib::ZlibDecoder;

/// Which container framing wraps a compressed buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// No container: a raw DEFLATE bitstream.
    Raw,
    Zlib,
    Gzip,
}

const GROWTH_CHUNK: usize = 64 * 1024;

/// Decompresses a whole buffer into a freshly allocated `Vec<u8>`, growing
/// the output as needed. For callers that already hold the entire
/// compressed payload in memory and don't need the incremental `Inflator`
/// or `Read` adapters.
pub fn decompress_to_vec(bytes: &[u8], format: Format) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    match format {
        Format::Raw => {
            let mut inflator = Inflator::new();
            let mut consumed = 0usize;
            loop {
                let start = out.len();
                out.resize(start + GROWTH_CHUNK, 0);
                unsafe {
                    inflator.set_source(&bytes[consumed..]);
                    inflator.set_target(&mut out[start..]);
                }
                let status = inflator.inflate(true)?;
                consumed += inflator.source_end();
                let produced = inflator.target_end();
                out.truncate(start + produced);
                if status == InflateStatus::Ok {
                    return Ok(out);
                }
            }
        }
        Format::Zlib => {
            let mut decoder = ZlibDecoder::new(bytes).map_err(read_err_to_inflate_err)?;
            decoder.read_to_end(&mut out).map_err(read_err_to_inflate_err)?;
            Ok(out)
        }
        Format::Gzip => {
            let mut decoder = GzipDecoder::new(bytes).map_err(read_err_to_inflate_err)?;
            decoder.read_to_end(&mut out).map_err(read_err_to_inflate_err)?;
            Ok(out)
        }
    }
}

fn read_err_to_inflate_err(e: std::io::Error) -> InflateError {
    e.get_ref()
        .and_then(|inner| inner.downcast_ref::<InflateError>())
        .copied()
        .unwrap_or(InflateError::Io)
}
