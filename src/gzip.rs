//! Gzip container framing: header/trailer parsing and CRC-32 verification
//! layered on top of the raw [`Inflator`](crate::inflator::Inflator).

use std::hash::Hasher;
use std::io::{self, Read};

use log::{trace, warn};

use crate::error::InflateError;
use crate::inflator::{InflateStatus, Inflator};

const INBUF_SIZE: usize = 8192;

const FTEXT: u8 = 0x01;
const FHCRC: u8 = 0x02;
const FEXTRA: u8 = 0x04;
const FNAME: u8 = 0x08;
const FCOMMENT: u8 = 0x10;

fn io_err(e: InflateError) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, e)
}

/// Reads a gzip stream and exposes the decompressed bytes through
/// `std::io::Read`, verifying the CRC-32/ISIZE trailer of every member as
/// it is consumed. Concatenated members are decoded transparently, the way
/// `gzip -d` treats a multi-member `.gz` file as one logical stream.
pub struct GzipDecoder<R> {
    reader: R,
    inflator: Inflator,
    inbuf: Box<[u8]>,
    in_pos: usize,
    in_len: usize,
    crc: crc32fast::Hasher,
    produced: u32,
    finished: bool,
    reader_eof: bool,
}

impl<R: Read> GzipDecoder<R> {
    pub fn new(reader: R) -> io::Result<Self> {
        let mut decoder = Self {
            reader,
            inflator: Inflator::new(),
            inbuf: vec![0u8; INBUF_SIZE].into_boxed_slice(),
            in_pos: 0,
            in_len: 0,
            crc: crc32fast::Hasher::new(),
            produced: 0,
            finished: false,
            reader_eof: false,
        };
        decoder.parse_header()?;
        Ok(decoder)
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

    /// Whether at least one more byte is available without blocking
    /// indefinitely past end-of-stream; used to detect a trailing member.
    fn has_more_input(&mut self) -> io::Result<bool> {
        if self.in_pos < self.in_len {
            return Ok(true);
        }
        self.in_len = self.reader.read(&mut self.inbuf)?;
        self.in_pos = 0;
        if self.in_len == 0 {
            self.reader_eof = true;
        }
        Ok(self.in_len > 0)
    }

    fn parse_header(&mut self) -> io::Result<()> {
        let mut header_crc = crc32fast::Hasher::new();
        let mut byte = |s: &mut Self| -> io::Result<u8> {
            let b = s.read_byte()?;
            header_crc.update(&[b]);
            Ok(b)
        };

        if byte(self)? != 0x1f || byte(self)? != 0x8b {
            warn!("gzip header: bad magic");
            return Err(io_err(InflateError::BadHeader));
        }
        if byte(self)? != 8 {
            warn!("gzip header: unsupported compression method");
            return Err(io_err(InflateError::BadHeader));
        }
        let flg = byte(self)?;
        for _ in 0..4 {
            byte(self)?; // MTIME
        }
        byte(self)?; // XFL
        byte(self)?; // OS

        if flg & FEXTRA != 0 {
            let lo = byte(self)?;
            let hi = byte(self)?;
            let xlen = u16::from_le_bytes([lo, hi]);
            for _ in 0..xlen {
                byte(self)?;
            }
        }
        if flg & FNAME != 0 {
            loop {
                if byte(self)? == 0 {
                    break;
                }
            }
        }
        if flg & FCOMMENT != 0 {
            loop {
                if byte(self)? == 0 {
                    break;
                }
            }
        }
        if flg & FHCRC != 0 {
            let expected = u16::from_le_bytes([self.read_byte()?, self.read_byte()?]);
            let actual = (header_crc.finalize() & 0xffff) as u16;
            if actual != expected {
                return Err(io_err(InflateError::ChecksumMismatch));
            }
        }
        let _ = flg & FTEXT; // no behavioral effect on binary-safe decompression
        Ok(())
    }

    fn read_trailer_word(&mut self) -> io::Result<u32> {
        let mut bytes = [0u8; 4];
        for b in &mut bytes {
            *b = self.read_byte()?;
        }
        Ok(u32::from_le_bytes(bytes))
    }

    fn finish_member(&mut self) -> io::Result<()> {
        let computed_crc = self.crc.clone().finalize();
        let stream_crc = self.read_trailer_word()?;
        let isize_ = self.read_trailer_word()?;
        if stream_crc != computed_crc || isize_ != self.produced {
            warn!("gzip trailer mismatch: crc {stream_crc:#x} vs {computed_crc:#x}, isize {isize_} vs {}", self.produced);
            return Err(io_err(InflateError::ChecksumMismatch));
        }

        if self.has_more_input()? {
            trace!("gzip member finished, more input follows");
            self.inflator.reset();
            self.crc = crc32fast::Hasher::new();
            self.produced = 0;
            self.parse_header()?;
        } else {
            self.finished = true;
        }
        Ok(())
    }
}

impl<R: Read> Read for GzipDecoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.finished || buf.is_empty() {
            return Ok(0);
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
                self.crc.update(&buf[..produced]);
                self.produced = self.produced.wrapping_add(produced as u32);
            }

            match status {
                InflateStatus::Ok => {
                    self.finish_member()?;
                    return Ok(produced);
                }
                InflateStatus::TgtExhausted => return Ok(produced),
                InflateStatus::SrcExhausted => {
                    if produced > 0 {
                        return Ok(produced);
                    }
                    // loop back around to pull more bytes from `reader`.
                }
            }
        }
    }
}
