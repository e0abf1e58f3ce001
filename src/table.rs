//! Canonical Huffman table builder: turns an array of code lengths into a
//! flat root-plus-subtable lookup array that decodes any code in at most
//! two indexed reads.

use crate::bitreader::BitReader;
use crate::deflate_constants::{DIST_INFO, LENGTH_INFO, MAX_CODE_LEN};
use crate::error::{InflateError, Result};
use crate::unchecked::UncheckedSlice;

/// Tag carried by a table entry's `etag` field. Values `0..=13` instead mean
/// "this many extra bits follow a length/distance base value".
pub const LITERAL: u8 = 0x10;
pub const END_OF_BLOCK: u8 = 0x11;
pub const SUBTABLE: u8 = 0x12;
pub const INVALID: u8 = 0x13;

/// A single entry of the flat decode table: `info` carries a literal byte,
/// a length/distance base, or a subtable offset; `etag` says which; `length`
/// is the codeword's bit length (or, for a subtable pointer, the longest
/// codeword length reachable under that root slot).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[repr(C)]
pub struct TableEntry {
    pub info: u16,
    pub etag: u8,
    pub length: u8,
}

impl TableEntry {
    const INVALID_ENTRY: TableEntry = TableEntry {
        info: 0xffff,
        etag: INVALID,
        length: 15,
    };
}

#[derive(Copy, Clone, PartialEq, Eq)]
pub enum TableMode {
    LitLen,
    Dist,
    CodeLen,
}

impl TableMode {
    fn root_bits(self) -> u32 {
        match self {
            TableMode::LitLen => crate::deflate_constants::LROOTBITS,
            TableMode::Dist => crate::deflate_constants::DROOTBITS,
            TableMode::CodeLen => crate::deflate_constants::CROOTBITS,
        }
    }
}

/// Reverses the low `len` bits of `code`, leaving the rest zero. DEFLATE
/// codes are transmitted MSB-first but read LSB-first, so every code used
/// to index a decode table must go through this first.
fn reverse_bits(code: u16, len: u32) -> u16 {
    if len == 0 {
        return 0;
    }
    code.reverse_bits() >> (16 - len)
}

/// Builds a canonical Huffman decode table from `lengths[0..n]` into `table`.
/// `table` must be at least `ENOUGH_L`/`ENOUGH_D` entries long for
/// `LitLen`/`Dist` mode respectively (the caller slices the shared flat
/// array accordingly); for `CodeLen` a `1 << CROOTBITS`-entry table suffices
/// since the code-length alphabet never needs a subtable.
pub fn build_table(lengths: &[u16], n: usize, table: &mut UncheckedSlice<TableEntry>, mode: TableMode) -> Result<()> {
    let mbits = mode.root_bits();
    let mut counts = [0u16; MAX_CODE_LEN as usize + 1];

    for &l in &lengths[..n] {
        counts[l as usize] += 1;
    }

    if counts[0] as usize == n {
        // RFC: one distance code of zero bits means no distance codes are
        // used at all (the data is all literals).
        if mode == TableMode::Dist {
            for i in 0..(1usize << mbits) {
                table[i] = TableEntry::INVALID_ENTRY;
            }
            return Ok(());
        }
        // A literal/length alphabet always needs at least the end-of-block
        // symbol (256).
        return Err(InflateError::BadTree);
    }
    counts[0] = 0;

    let mut mlen = MAX_CODE_LEN as usize;
    while counts[mlen] == 0 {
        mlen -= 1;
    }

    // Kraft inequality.
    let mut left: i32 = 1;
    for l in 1..=MAX_CODE_LEN as usize {
        left = (left << 1) - counts[l] as i32;
        if left < 0 {
            return Err(InflateError::BadTree); // over-subscribed
        }
    }
    if left > 0 {
        // Under-subscribed: tolerated only for the single 1-bit distance
        // code special case (RFC: "one distance code of one bit, one
        // unused code").
        if mlen != 1 || mode != TableMode::Dist {
            return Err(InflateError::BadTree);
        }
    }

    // First codeword of each length, already bit-reversed to stream order.
    let mut next_code = [0u16; MAX_CODE_LEN as usize + 1];
    let mut code: u16 = 0;
    for l in 1..=mlen {
        code = (code + counts[l - 1]) << 1;
        next_code[l] = reverse_bits(code, l as u32);
    }

    let mmask: u16 = ((1u32 << mbits) - 1) as u16;

    if mlen > mbits as usize {
        for i in 0..=mmask as usize {
            table[i].etag = 0;
        }

        let mut offset: usize = mmask as usize + 1;
        for r in (1..=mlen - mbits as usize).rev() {
            let count = counts[mbits as usize + r] as usize;
            if count == 0 {
                continue;
            }

            let mut slot = (next_code[mbits as usize + r] & mmask) as usize;
            let mut buckets = count >> r;
            if count & ((1 << r) - 1) != 0 {
                buckets += 1;
            }

            for _ in 0..buckets {
                if table[slot].etag == SUBTABLE {
                    continue;
                }
                table[slot].etag = SUBTABLE;
                table[slot].info = offset as u16;
                table[slot].length = (mbits as usize + r) as u8;

                slot = reverse_bits(slot as u16, mbits) as usize;
                offset += 1usize << r;
            }
        }

        let enough = if mode == TableMode::Dist {
            crate::deflate_constants::ENOUGH_D
        } else {
            crate::deflate_constants::ENOUGH_L
        };
        if offset > enough {
            return Err(InflateError::BadTree);
        }
    }

    // Populate the direct/subtable entries for every used symbol.
    let mut last_code: u16 = 0;
    for symbol in 0..n {
        let full_length = lengths[symbol] as usize;
        if full_length == 0 {
            continue;
        }

        let mut e = TableEntry::default();
        if mode == TableMode::Dist || symbol >= 256 {
            let info = if mode == TableMode::Dist {
                DIST_INFO[symbol]
            } else {
                LENGTH_INFO[symbol - 256]
            };
            e.info = info.base;
            e.etag = if mode == TableMode::LitLen && symbol == 256 {
                END_OF_BLOCK
            } else {
                info.extra_bits
            };
        } else {
            e.info = symbol as u16;
            e.etag = LITERAL;
        }
        e.length = full_length as u8;

        let code = next_code[full_length];
        let natural = reverse_bits(code, full_length as u32);
        next_code[full_length] = reverse_bits(natural + 1, full_length as u32);
        last_code = code;

        let (base, slots, sub_code, fill_len) = if full_length > mbits as usize {
            let root_entry = table[(code & mmask) as usize];
            let slots = root_entry.length as usize - full_length;
            let fill_len = full_length - mbits as usize;
            (root_entry.info as usize, slots, (code >> mbits) as usize, fill_len)
        } else {
            (0usize, mbits as usize - full_length, code as usize, full_length)
        };

        for j in (0..(1usize << slots)).rev() {
            table[base + (sub_code | (j << fill_len))] = e;
        }
    }

    // RFC: if only one distance code is used, it is encoded with one bit
    // (not zero), leaving a single unused code. Mark the odd slots invalid.
    if mlen == 1 && last_code == 0 {
        let code = 1usize;
        for j in 0..(1usize << (mbits as usize - 1)) {
            table[code | (j << 1)] = TableEntry::INVALID_ENTRY;
        }
    }

    Ok(())
}

/// Indexes the root table with whatever bits are currently buffered,
/// topping up one byte at a time until the resolved entry's codeword
/// length is satisfied. Returns `None` on genuine input exhaustion.
#[inline(always)]
fn decode_root(table: &UncheckedSlice<TableEntry>, root_bits: u32, br: &mut BitReader) -> Option<TableEntry> {
    loop {
        let idx = br.peek(root_bits);
        let e = table[idx];
        if e.length as u32 <= br.bits_buffered() {
            return Some(e);
        }
        if !br.fetch_byte() {
            return None;
        }
    }
}

/// Decodes one symbol from `table`, following a root entry into its
/// subtable when the codeword is longer than `root_bits`. Does not drop
/// the consumed bits: the caller does that once it knows how many (the
/// returned entry's `length`).
pub fn decode_symbol(table: &UncheckedSlice<TableEntry>, root_bits: u32, br: &mut BitReader) -> Option<TableEntry> {
    let mut e = decode_root(table, root_bits, br)?;
    if e.etag == SUBTABLE {
        let base = e.info as usize;
        let sub_bits = e.length as u32;
        loop {
            let idx = base + (br.peek(sub_bits) >> root_bits);
            let sub = table[idx];
            if sub.length as u32 <= br.bits_buffered() {
                e = sub;
                break;
            }
            if !br.fetch_byte() {
                return None;
            }
        }
    }
    Some(e)
}
