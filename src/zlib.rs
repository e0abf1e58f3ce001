//! Zlib container framing: header/trailer parsing and Adler-32 verification
//! layered on top of the raw [`Inflator`](crate::inflator::Inflator).

use std::hash::Hasher;
use std::io::{self, Read};

use log::warn;
use simd_adler32::Adler32;

use crate::error::InflateError;
use crate::inflator::{InflateStatus, Inflator};

const INBUF_SIZE: usize = 8192;

fn io_err(e: InflateError) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, e)
}

/// Reads a zlib stream and exposes the decompressed bytes through
/// `std::io::Read`, verifying the Adler-32 trailer as it is consumed.
pub struct ZlibDecoder<R> {
    reader: R,
    inflator: Inflator,
    inbuf: Box<[u8]>,
    in_pos: usize,
    in_len: usize,
    adler: Adler32,
    finished: bool,
    reader_eof: bool,
    needs_dictionary: bool,
    dict_supplied: bool,
}

impl<R: Read> ZlibDecoder<R> {
    pub fn new(reader: R) -> io::Result<Self> {
        let mut decoder = Self {
            reader,
            inflator: Inflator::new(),
            inbuf: vec![0u8; INBUF_SIZE].into_boxed_slice(),
            in_pos: 0,
            in_len: 0,
            adler: Adler32::new(),
            finished: false,
            reader_eof: false,
            needs_dictionary: false,
            dict_supplied: false,
        };
        decoder.parse_header()?;
        Ok(decoder)
    }

    /// Installs a preset dictionary. Required before the first `read` call
    /// iff the stream's `FDICT` bit was set, matching the reference
    /// `zstrm.c` contract that the caller must supply a matching
    /// dictionary up front rather than discovering the need mid-stream.
    pub fn set_dictionary(&mut self, dict: &[u8]) -> io::Result<()> {
        self.inflator.set_dictionary(dict).map_err(io_err)?;
        self.dict_supplied = true;
        Ok(())
    }

    fn read_byte(&mut self) -> io::Result<u8> {
        if self.in_pos >= self.in_len {
            self.in_len = self.reader.read(&mut self.inbuf)?;
            self.in_pos = 0;
            if self.in_len == 0 {
                self.reader_eof = true;
                return Err(io::ErrorKind::UnexpectedEof.into());
            }
        }
        let b = self.inbuf[self.in_pos];
        self.in_pos += 1;
        Ok(b)
    }

    fn parse_header(&mut self) -> io::Result<()> {
        let cmf = self.read_byte()?;
        let flg = self.read_byte()?;
        if (cmf as u16 * 256 + flg as u16) % 31 != 0 {
            warn!("zlib header: fcheck mismatch");
            return Err(io_err(InflateError::BadHeader));
        }
        if cmf & 0x0f != 8 {
            warn!("zlib header: unsupported compression method");
            return Err(io_err(InflateError::BadHeader));
        }
        if (cmf >> 4) & 0x0f > 7 {
            warn!("zlib header: window size too large");
            return Err(io_err(InflateError::BadHeader));
        }
        if flg & 0x20 != 0 {
            // FDICT: a 4-byte dictionary id follows; the decoder doesn't
            // need the id itself (there is nowhere to look it up), only
            // the fact that a matching dictionary must be supplied.
            for _ in 0..4 {
                self.read_byte()?;
            }
            self.needs_dictionary = true;
        }
        Ok(())
    }

    fn finish_stream(&mut self) -> io::Result<()> {
        let computed = self.adler.finish() as u32;
        let mut bytes = [0u8; 4];
        for b in &mut bytes {
            *b = self.read_byte()?;
        }
        let stream_adler = u32::from_be_bytes(bytes);
        if stream_adler != computed {
            warn!("zlib trailer mismatch: adler32 {stream_adler:#x} vs {computed:#x}");
            return Err(io_err(InflateError::ChecksumMismatch));
        }
        self.finished = true;
        Ok(())
    }
}

impl<R: Read> Read for ZlibDecoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.finished || buf.is_empty() {
            return Ok(0);
        }
        if self.needs_dictionary && !self.dict_supplied {
            return Err(io_err(InflateError::IncorrectUse));
        }
        loop {
            if self.in_pos >= self.in_len && !self.reader_eof {
                self.in_len = self.reader.read(&mut self.inbuf)?;
                self.in_pos = 0;
                if self.in_len == 0 {
                    self.reader_eof = true;
                }
            }

            let input = &self.inbuf[self.in_pos..self.in_len];
            unsafe {
                self.inflator.set_source(input);
                self.inflator.set_target(buf);
            }
            let status = self
                .inflator
                .inflate(self.reader_eof)
                .map_err(io_err)?;
            self.in_pos += self.inflator.source_end();

            let produced = self.inflator.target_end();
            if produced > 0 {
                self.adler.write(&buf[..produced]);
            }

            match status {
                InflateStatus::Ok => {
                    self.finish_stream()?;
                    return Ok(produced);
                }
                InflateStatus::TgtExhausted => return Ok(produced),
                InflateStatus::SrcExhausted => {
                    if produced > 0 {
                        return Ok(produced);
                    }
                }
            }
        }
    }
}
