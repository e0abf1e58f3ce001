//! The resumable DEFLATE block driver.
//!
//! One `Inflator` holds everything needed to pick up a stream exactly where
//! the previous call left off: a bit-level cursor, two Huffman decode
//! tables, a sliding window, and a handful of scratch integers that stand
//! in for the C original's substate-indexed locals.

use crate::bitreader::BitReader;
use crate::deflate_constants::{
    fixed_dist_lengths, fixed_litlen_lengths, CMAXSYMBOL, CODE_LENGTH_ORDER, DMAXSYMBOL, DROOTBITS, ENOUGH_D,
    ENOUGH_L, LMAXSYMBOL, LROOTBITS, MAX_CODE_LEN,
};
use crate::error::{InflateError, Result};
use crate::table::{self, build_table, TableEntry, TableMode, END_OF_BLOCK, INVALID, LITERAL};
use crate::unchecked::{UncheckedArray, UncheckedSlice};
use crate::window::Window;
use log::{trace, warn};

#[cfg(target_pointer_width = "64")]
const FAST_SRC: usize = 14;
#[cfg(target_pointer_width = "64")]
const FAST_TGT: usize = 274;
#[cfg(not(target_pointer_width = "64"))]
const FAST_SRC: usize = 10;
#[cfg(not(target_pointer_width = "64"))]
const FAST_TGT: usize = 266;

/// `(extra_bits, base_repeat)` for code-length alphabet symbols 16, 17, 18.
const REPEAT_INFO: [(u32, u32); 3] = [(2, 3), (3, 3), (7, 11)];

#[derive(Copy, Clone, PartialEq, Eq)]
enum DriverState {
    AwaitHeader,
    Stored,
    Fixed,
    Dynamic,
    Symbols,
    Done,
}

enum StepResult {
    Suspend(InflateStatus),
    Done,
}

enum FastResult {
    Continue,
    EndOfBlock,
}

/// What an `inflate` call accomplished before returning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InflateStatus {
    /// The stream reached a natural end; nothing further to do.
    Ok,
    /// All supplied input was consumed; call again with more.
    SrcExhausted,
    /// The output buffer filled up; call again with a fresh one.
    TgtExhausted,
}

/// A streaming, resumable DEFLATE decompressor.
///
/// Input and output buffers are supplied through [`set_source`]/
/// [`set_target`] and consumed incrementally by [`inflate`]; the decoder
/// never buffers more than one in-flight symbol's worth of state between
/// calls, so a caller can feed it one byte of input or one byte of output
/// space at a time and it will pick up exactly where it left off.
///
/// [`set_source`]: Inflator::set_source
/// [`set_target`]: Inflator::set_target
/// [`inflate`]: Inflator::inflate
pub struct Inflator {
    state: DriverState,
    substate: u32,
    final_block: bool,
    finalinput: bool,
    used: bool,
    error: Option<InflateError>,

    bitbuf: usize,
    bitcount: u32,

    aux0: usize,
    aux1: usize,
    aux2: usize,
    aux3: usize,

    window: Window,

    litlen_table: UncheckedArray<TableEntry, ENOUGH_L>,
    dist_table: UncheckedArray<TableEntry, ENOUGH_D>,
    fixed_litlen_table: UncheckedArray<TableEntry, ENOUGH_L>,
    fixed_dist_table: UncheckedArray<TableEntry, ENOUGH_D>,
    fixed_tables_ready: bool,
    using_fixed: bool,

    lengths_scratch: [u16; LMAXSYMBOL + DMAXSYMBOL],

    src_begin: *const u8,
    src_len: usize,
    in_pos: usize,

    tgt_begin: *mut u8,
    tgt_len: usize,
    out_pos: usize,
}

impl Default for Inflator {
    fn default() -> Self {
        Self::new()
    }
}

impl Inflator {
    pub fn new() -> Self {
        Self {
            state: DriverState::AwaitHeader,
            substate: 0,
            final_block: false,
            finalinput: false,
            used: false,
            error: None,
            bitbuf: 0,
            bitcount: 0,
            aux0: 0,
            aux1: 0,
            aux2: 0,
            aux3: 0,
            window: Window::new(),
            litlen_table: UncheckedArray::default(),
            dist_table: UncheckedArray::default(),
            fixed_litlen_table: UncheckedArray::default(),
            fixed_dist_table: UncheckedArray::default(),
            fixed_tables_ready: false,
            using_fixed: false,
            lengths_scratch: [0u16; LMAXSYMBOL + DMAXSYMBOL],
            src_begin: std::ptr::null(),
            src_len: 0,
            in_pos: 0,
            tgt_begin: std::ptr::null_mut(),
            tgt_len: 0,
            out_pos: 0,
        }
    }

    /// Restores initial state. Table/window allocations are kept; the
    /// window's history is cleared unless the caller installs a fresh
    /// dictionary with [`set_dictionary`] before the next `inflate` call.
    ///
    /// [`set_dictionary`]: Inflator::set_dictionary
    pub fn reset(&mut self) {
        self.state = DriverState::AwaitHeader;
        self.substate = 0;
        self.final_block = false;
        self.finalinput = false;
        self.used = false;
        self.error = None;
        self.bitbuf = 0;
        self.bitcount = 0;
        self.aux0 = 0;
        self.aux1 = 0;
        self.aux2 = 0;
        self.aux3 = 0;
        self.using_fixed = false;
        self.window.reset();
        self.in_pos = 0;
        self.out_pos = 0;
    }

    /// Installs a preset dictionary. Must be called before the first
    /// `inflate`, immediately after `new`/`reset`.
    pub fn set_dictionary(&mut self, dict: &[u8]) -> Result<()> {
        if self.used {
            return Err(InflateError::IncorrectUse);
        }
        self.window.load_dictionary(dict);
        self.used = true;
        Ok(())
    }

    /// Points the decoder at a new input buffer.
    ///
    /// # Safety
    /// `buf` must remain valid and unmoved until the next call to
    /// [`inflate`](Inflator::inflate).
    pub unsafe fn set_source(&mut self, buf: &[u8]) {
        self.src_begin = buf.as_ptr();
        self.src_len = buf.len();
        self.in_pos = 0;
    }

    /// Points the decoder at a new output buffer.
    ///
    /// # Safety
    /// `buf` must remain valid and unmoved until the next call to
    /// [`inflate`](Inflator::inflate).
    pub unsafe fn set_target(&mut self, buf: &mut [u8]) {
        self.tgt_begin = buf.as_mut_ptr();
        self.tgt_len = buf.len();
        self.out_pos = 0;
    }

    /// Bytes consumed from the current source buffer.
    pub fn source_end(&self) -> usize {
        self.in_pos
    }

    /// Bytes written into the current target buffer.
    pub fn target_end(&self) -> usize {
        self.out_pos
    }

    /// Advances decoding using whatever was supplied through `set_source`/
    /// `set_target`. `final_input` tells the decoder that no more bytes
    /// will ever follow the current source buffer's contents, so running
    /// out of input before the stream naturally ends is an error rather
    /// than a suspension.
    pub fn inflate(&mut self, final_input: bool) -> Result<InflateStatus> {
        if let Some(e) = self.error {
            return Err(e);
        }
        if self.state == DriverState::Done {
            self.error = Some(InflateError::BadState);
            return Err(InflateError::BadState);
        }
        if final_input {
            self.finalinput = true;
        }
        self.used = true;

        // Safety: valid per the contract documented on `set_source`/`set_target`.
        let input: &[u8] = unsafe { std::slice::from_raw_parts(self.src_begin, self.src_len) };
        let output: &mut [u8] = unsafe { std::slice::from_raw_parts_mut(self.tgt_begin, self.tgt_len) };

        let mut br = BitReader::resume(&input[self.in_pos..], self.bitbuf, self.bitcount);
        let result = self.run(&mut br, output);

        let (bitbuf, bitcount) = br.save();
        self.bitbuf = bitbuf;
        self.bitcount = bitcount;
        self.in_pos += br.bytes_consumed();

        match result {
            Ok(InflateStatus::SrcExhausted) if self.finalinput => {
                warn!("input ended with stream incomplete");
                self.error = Some(InflateError::InputEnd);
                Err(InflateError::InputEnd)
            }
            Ok(status) => Ok(status),
            Err(e) => {
                warn!("inflate failed: {e}");
                self.error = Some(e);
                Err(e)
            }
        }
    }

    fn run(&mut self, br: &mut BitReader, output: &mut [u8]) -> Result<InflateStatus> {
        loop {
            match self.state {
                DriverState::Done => return Ok(InflateStatus::Ok),

                DriverState::AwaitHeader => {
                    if !br.try_fill(3) {
                        self.window.append(&output[..self.out_pos]);
                        return Ok(InflateStatus::SrcExhausted);
                    }
                    self.final_block = br.peek(1) != 0;
                    br.drop(1);
                    let btype = br.peek(2);
                    br.drop(2);
                    self.state = match btype {
                        0 => DriverState::Stored,
                        1 => DriverState::Fixed,
                        2 => DriverState::Dynamic,
                        _ => return Err(InflateError::BadBlock),
                    };
                    trace!("block header: final={} btype={}", self.final_block, btype);
                    self.substate = 0;
                }

                DriverState::Stored => match self.decode_stored(br, output)? {
                    StepResult::Suspend(s) => return Ok(s),
                    StepResult::Done => self.finish_block(),
                },

                DriverState::Fixed => {
                    self.install_fixed_tables()?;
                    self.state = DriverState::Symbols;
                    self.substate = 0;
                }

                DriverState::Dynamic => match self.decode_dynamic_header(br, output)? {
                    StepResult::Suspend(s) => return Ok(s),
                    StepResult::Done => {
                        self.using_fixed = false;
                        self.state = DriverState::Symbols;
                        self.substate = 0;
                    }
                },

                DriverState::Symbols => match self.decode_symbols(br, output)? {
                    StepResult::Suspend(s) => return Ok(s),
                    StepResult::Done => self.finish_block(),
                },
            }
        }
    }

    fn finish_block(&mut self) {
        self.substate = 0;
        self.state = if self.final_block {
            DriverState::Done
        } else {
            DriverState::AwaitHeader
        };
    }

    fn install_fixed_tables(&mut self) -> Result<()> {
        if !self.fixed_tables_ready {
            trace!("building fixed huffman tables");
            let lit_lens = fixed_litlen_lengths();
            build_table(
                &lit_lens,
                lit_lens.len(),
                self.fixed_litlen_table.as_unchecked_slice_mut(),
                TableMode::LitLen,
            )?;
            let dist_lens = fixed_dist_lengths();
            build_table(
                &dist_lens,
                dist_lens.len(),
                self.fixed_dist_table.as_unchecked_slice_mut(),
                TableMode::Dist,
            )?;
            self.fixed_tables_ready = true;
        }
        self.using_fixed = true;
        Ok(())
    }

    fn active_litlen(&self) -> &UncheckedSlice<TableEntry> {
        if self.using_fixed {
            self.fixed_litlen_table.as_unchecked_slice()
        } else {
            self.litlen_table.as_unchecked_slice()
        }
    }

    fn active_dist(&self) -> &UncheckedSlice<TableEntry> {
        if self.using_fixed {
            self.fixed_dist_table.as_unchecked_slice()
        } else {
            self.dist_table.as_unchecked_slice()
        }
    }

    /// Byte-aligns, reads LEN/NLEN, then copies the literal payload
    /// straight from the input slice to the output slice (no Huffman
    /// decode involved in a stored block).
    fn decode_stored(&mut self, br: &mut BitReader, output: &mut [u8]) -> Result<StepResult> {
        if self.substate == 0 {
            if br.try_fill(8) {
                br.align_to_byte();
            } else {
                self.window.append(&output[..self.out_pos]);
                return Ok(StepResult::Suspend(InflateStatus::SrcExhausted));
            }
            self.substate = 1;
        }

        if self.substate == 1 {
            if br.try_fill(16) {
                self.aux0 = br.peek(16);
                br.drop(16);
            } else {
                self.window.append(&output[..self.out_pos]);
                return Ok(StepResult::Suspend(InflateStatus::SrcExhausted));
            }
            self.substate = 2;
        }

        if self.substate == 2 {
            if br.try_fill(16) {
                let nlen = br.peek(16) as u16;
                br.drop(16);
                if !(self.aux0 as u16) != nlen {
                    return Err(InflateError::BadBlock);
                }
            } else {
                self.window.append(&output[..self.out_pos]);
                return Ok(StepResult::Suspend(InflateStatus::SrcExhausted));
            }
            self.substate = 3;
        }

        loop {
            if self.aux0 == 0 {
                self.substate = 0;
                return Ok(StepResult::Done);
            }

            let src = br.raw_remaining();
            let dst = &mut output[self.out_pos..];
            let dst_len = dst.len();
            let maxrun = self.aux0.min(src.len()).min(dst_len);
            dst[..maxrun].copy_from_slice(&src[..maxrun]);
            br.advance_raw(maxrun);
            self.out_pos += maxrun;
            self.aux0 -= maxrun;

            if self.aux0 != 0 {
                self.window.append(&output[..self.out_pos]);
                let status = if dst_len == maxrun {
                    InflateStatus::TgtExhausted
                } else {
                    InflateStatus::SrcExhausted
                };
                return Ok(StepResult::Suspend(status));
            }
        }
    }

    /// Parses HLIT/HDIST/HCLEN, the code-length alphabet's own lengths,
    /// then the combined literal/length + distance length sequence, and
    /// finally builds both real decode tables. The code-length table is
    /// built directly into the literal/length table's buffer, since that
    /// buffer is otherwise unused until the real table replaces it.
    fn decode_dynamic_header(&mut self, br: &mut BitReader, output: &mut [u8]) -> Result<StepResult> {
        if self.substate == 0 {
            if br.try_fill(14) {
                self.aux0 = br.peek(5) + 257; // HLIT -> literal/length code count
                br.drop(5);
                self.aux1 = br.peek(5) + 1; // HDIST -> distance code count
                br.drop(5);
                self.aux2 = br.peek(4) + 4; // HCLEN -> code-length code count
                br.drop(4);
                if self.aux0 > 286 || self.aux1 > 30 {
                    return Err(InflateError::BadTree);
                }
            } else {
                self.window.append(&output[..self.out_pos]);
                return Ok(StepResult::Suspend(InflateStatus::SrcExhausted));
            }
            self.substate = 1;
            self.aux3 = 0;
        }

        if self.substate == 1 {
            while self.aux3 < self.aux2 {
                if br.try_fill(3) {
                    let sym = CODE_LENGTH_ORDER[self.aux3] as usize;
                    self.lengths_scratch[sym] = br.peek(3) as u16;
                    br.drop(3);
                    self.aux3 += 1;
                } else {
                    self.window.append(&output[..self.out_pos]);
                    return Ok(StepResult::Suspend(InflateStatus::SrcExhausted));
                }
            }
            for i in self.aux3..CMAXSYMBOL {
                self.lengths_scratch[CODE_LENGTH_ORDER[i] as usize] = 0;
            }

            build_table(
                &self.lengths_scratch[..CMAXSYMBOL],
                CMAXSYMBOL,
                self.litlen_table.as_unchecked_slice_mut(),
                TableMode::CodeLen,
            )?;

            self.substate = 2;
            self.aux3 = 0;
        }

        match self.read_lengths(br, output, self.aux0 + self.aux1)? {
            StepResult::Suspend(s) => return Ok(StepResult::Suspend(s)),
            StepResult::Done => {}
        }

        if self.lengths_scratch[256] == 0 {
            return Err(InflateError::BadTree);
        }

        let slcount = self.aux0;
        let sdcount = self.aux1;
        build_table(
            &self.lengths_scratch[..slcount],
            slcount,
            self.litlen_table.as_unchecked_slice_mut(),
            TableMode::LitLen,
        )?;
        build_table(
            &self.lengths_scratch[slcount..slcount + sdcount],
            sdcount,
            self.dist_table.as_unchecked_slice_mut(),
            TableMode::Dist,
        )?;
        trace!("built dynamic huffman tables: {slcount} litlen codes, {sdcount} dist codes");

        self.substate = 0;
        Ok(StepResult::Done)
    }

    /// Expands the code-length-coded length sequence (repeat codes 16/17/18
    /// included) into `self.lengths_scratch[0..n]`. Resumable via `aux3` as
    /// the running fill index.
    fn read_lengths(&mut self, br: &mut BitReader, output: &mut [u8], n: usize) -> Result<StepResult> {
        while self.aux3 < n {
            let e = match table::decode_symbol(self.litlen_table.as_unchecked_slice(), crate::deflate_constants::CROOTBITS, br) {
                Some(e) => e,
                None => {
                    self.window.append(&output[..self.out_pos]);
                    return Ok(StepResult::Suspend(InflateStatus::SrcExhausted));
                }
            };

            if e.info < 16 {
                br.drop(e.length as u32);
                self.lengths_scratch[self.aux3] = e.info;
                self.aux3 += 1;
                continue;
            }

            let (extra_bits, mut base_repeat) = REPEAT_INFO[(e.info - 16) as usize];
            if !br.try_fill(e.length as u32 + extra_bits) {
                self.window.append(&output[..self.out_pos]);
                return Ok(StepResult::Suspend(InflateStatus::SrcExhausted));
            }
            br.drop(e.length as u32);
            base_repeat += br.peek(extra_bits) as u32;
            br.drop(extra_bits);

            let repeat_len = if e.info == 16 {
                if self.aux3 == 0 {
                    return Err(InflateError::BadTree);
                }
                self.lengths_scratch[self.aux3 - 1]
            } else {
                0
            };

            if self.aux3 + base_repeat as usize > LMAXSYMBOL + DMAXSYMBOL {
                return Err(InflateError::BadTree);
            }
            for _ in 0..base_repeat {
                self.lengths_scratch[self.aux3] = repeat_len;
                self.aux3 += 1;
            }
        }
        Ok(StepResult::Done)
    }

    /// The per-symbol decoder: tries the fast path once (only when entered
    /// fresh, matching the reference's single fast-path attempt per block
    /// re-entry), then falls back to a suspension-safe slow path that can
    /// resume mid-symbol at any of four points.
    fn decode_symbols(&mut self, br: &mut BitReader, output: &mut [u8]) -> Result<StepResult> {
        let mut length = self.aux0;
        let mut bextra = self.aux1 as u32;
        let mut distance = self.aux2;
        let mut phase = self.substate;

        if phase == 0 {
            let target_left = output.len() - self.out_pos;
            let source_left = br.bytes_remaining();
            if target_left >= FAST_TGT && source_left >= FAST_SRC {
                match self.decode_fast(br, output)? {
                    FastResult::EndOfBlock => return Ok(StepResult::Done),
                    FastResult::Continue => {}
                }
            }
        }

        loop {
            if phase == 0 {
                let e = match table::decode_symbol(self.active_litlen(), LROOTBITS, br) {
                    Some(e) => e,
                    None => {
                        self.window.append(&output[..self.out_pos]);
                        self.substate = 0;
                        return Ok(StepResult::Suspend(InflateStatus::SrcExhausted));
                    }
                };

                if e.etag == LITERAL {
                    if self.out_pos < output.len() {
                        br.drop(e.length as u32);
                        output[self.out_pos] = e.info as u8;
                        self.out_pos += 1;
                        phase = 0;
                        continue;
                    }
                    self.window.append(&output[..self.out_pos]);
                    self.substate = 0;
                    return Ok(StepResult::Suspend(InflateStatus::TgtExhausted));
                }

                if e.etag == END_OF_BLOCK {
                    br.drop(e.length as u32);
                    self.substate = 0;
                    return Ok(StepResult::Done);
                }

                if e.etag == INVALID {
                    return Err(InflateError::BadCode);
                }

                br.drop(e.length as u32);
                length = e.info as usize;
                bextra = e.etag as u32;
                phase = 1;
            }

            if phase == 1 {
                if br.try_fill(bextra) {
                    length += br.peek(bextra);
                    br.drop(bextra);
                } else {
                    self.save_symbol_aux(length, bextra, distance, 1);
                    self.window.append(&output[..self.out_pos]);
                    return Ok(StepResult::Suspend(InflateStatus::SrcExhausted));
                }
                phase = 2;
            }

            if phase == 2 {
                let e = match table::decode_symbol(self.active_dist(), DROOTBITS, br) {
                    Some(e) => e,
                    None => {
                        self.save_symbol_aux(length, bextra, distance, 2);
                        self.window.append(&output[..self.out_pos]);
                        return Ok(StepResult::Suspend(InflateStatus::SrcExhausted));
                    }
                };
                if e.etag == INVALID {
                    return Err(InflateError::BadCode);
                }
                br.drop(e.length as u32);
                distance = e.info as usize;
                bextra = e.etag as u32;
                phase = 3;
            }

            if phase == 3 {
                if br.try_fill(bextra) {
                    distance += br.peek(bextra);
                    br.drop(bextra);
                } else {
                    self.save_symbol_aux(length, bextra, distance, 3);
                    self.window.append(&output[..self.out_pos]);
                    return Ok(StepResult::Suspend(InflateStatus::SrcExhausted));
                }
                phase = 4;
            }

            // phase 4: copy.
            let written = self.window.copy_match(output, self.out_pos, distance, length)?;
            self.out_pos += written;
            length -= written;
            if length > 0 {
                self.save_symbol_aux(length, bextra, distance, 4);
                self.window.append(&output[..self.out_pos]);
                return Ok(StepResult::Suspend(InflateStatus::TgtExhausted));
            }

            phase = 0;
        }
    }

    fn save_symbol_aux(&mut self, length: usize, bextra: u32, distance: usize, substate: u32) {
        self.aux0 = length;
        self.aux1 = bextra as usize;
        self.aux2 = distance;
        self.substate = substate;
    }

    /// Decodes symbols without suspension bookkeeping, relying on the
    /// headroom check the caller already performed: enough input is
    /// buffered and enough output space remains that every `try_fill` and
    /// bounds check below is guaranteed to succeed. Rechecks headroom once
    /// per symbol and falls back to the caller's slow path once it runs
    /// out, rather than risking a partial decode with no way to resume.
    fn decode_fast(&mut self, br: &mut BitReader, output: &mut [u8]) -> Result<FastResult> {
        loop {
            let target_left = output.len() - self.out_pos;
            let source_left = br.bytes_remaining();
            if target_left < FAST_TGT || source_left < FAST_SRC {
                return Ok(FastResult::Continue);
            }

            br.try_fill(MAX_CODE_LEN);
            let e = table::decode_symbol(self.active_litlen(), LROOTBITS, br)
                .expect("fast-path headroom guarantees enough buffered bits");
            br.drop(e.length as u32);

            if e.etag == LITERAL {
                output[self.out_pos] = e.info as u8;
                self.out_pos += 1;
                continue;
            }
            if e.etag == END_OF_BLOCK {
                return Ok(FastResult::EndOfBlock);
            }
            if e.etag == INVALID {
                return Err(InflateError::BadCode);
            }

            let mut length = e.info as usize;
            let bextra = e.etag as u32;
            br.try_fill(bextra.max(MAX_CODE_LEN));
            length += br.peek(bextra);
            br.drop(bextra);

            br.try_fill(MAX_CODE_LEN);
            let de = table::decode_symbol(self.active_dist(), DROOTBITS, br)
                .expect("fast-path headroom guarantees enough buffered bits");
            br.drop(de.length as u32);
            if de.etag == INVALID {
                return Err(InflateError::BadCode);
            }

            let mut distance = de.info as usize;
            let dbextra = de.etag as u32;
            br.try_fill(dbextra.max(MAX_CODE_LEN));
            distance += br.peek(dbextra);
            br.drop(dbextra);

            if distance <= self.out_pos {
                let src = self.out_pos - distance;
                for i in 0..length {
                    output[self.out_pos + i] = output[src + i];
                }
                self.out_pos += length;
            } else {
                let written = self.window.copy_match(output, self.out_pos, distance, length)?;
                self.out_pos += written;
                if written < length {
                    // The headroom check above guarantees room for the
                    // whole match; a short copy here means the window
                    // genuinely didn't have the history to cover it.
                    return Err(InflateError::FarOffset);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inflate_all(mut deflate: &[u8]) -> Result<Vec<u8>> {
        let mut inflator = Inflator::new();
        let mut out = vec![0u8; 1 << 16];
        let mut produced = Vec::new();
        loop {
            unsafe {
                inflator.set_source(deflate);
                inflator.set_target(&mut out);
            }
            let status = inflator.inflate(true)?;
            produced.extend_from_slice(&out[..inflator.target_end()]);
            deflate = &deflate[inflator.source_end()..];
            if status == InflateStatus::Ok {
                return Ok(produced);
            }
        }
    }

    /// A single stored (uncompressed) block containing `b"hi"`, final bit
    /// set: BFINAL=1, BTYPE=00, then byte-aligned LEN=0x0002, NLEN=0xfffd,
    /// then the two literal bytes.
    #[test]
    fn stored_block_round_trips() {
        let data = [0b0000_0001u8, 0x02, 0x00, 0xfd, 0xff, b'h', b'i'];
        let out = inflate_all(&data).unwrap();
        assert_eq!(out, b"hi");
    }

    #[test]
    fn stored_block_rejects_len_nlen_mismatch() {
        let data = [0b0000_0001u8, 0x02, 0x00, 0x00, 0x00, b'h', b'i'];
        assert_eq!(inflate_all(&data), Err(InflateError::BadBlock));
    }

    #[test]
    fn empty_stored_block_is_final_stream() {
        let data = [0b0000_0001u8, 0x00, 0x00, 0xff, 0xff];
        let out = inflate_all(&data).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn reserved_block_type_is_rejected() {
        // BFINAL=1, BTYPE=11 (reserved).
        let data = [0b0000_0111u8];
        assert_eq!(inflate_all(&data), Err(InflateError::BadBlock));
    }

    #[test]
    fn one_byte_chunks_resume_correctly() {
        let data = [0b0000_0001u8, 0x03, 0x00, 0xfc, 0xff, b'a', b'b', b'c'];
        let mut inflator = Inflator::new();
        let mut produced = Vec::new();
        let mut out = [0u8; 1];
        for i in 0..data.len() {
            loop {
                let is_last_byte = i == data.len() - 1;
                unsafe {
                    inflator.set_source(&data[i..i + 1]);
                    inflator.set_target(&mut out);
                }
                let status = inflator.inflate(is_last_byte).unwrap();
                produced.extend_from_slice(&out[..inflator.target_end()]);
                if inflator.source_end() == 1 {
                    break;
                }
            }
        }
        assert_eq!(produced, b"abc");
    }
}
