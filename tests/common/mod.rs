//! Hand-rolled DEFLATE bitstream encoder shared by the integration tests.
//!
//! Not a general-purpose compressor: just enough to emit the fixed-Huffman
//! block shapes the test scenarios need, one symbol at a time.

/// LSB-first bit packer. DEFLATE's ordinary fields (block header bits,
/// HLIT/HDIST/HCLEN, extra bits) are sent low-order-bit-first; Huffman
/// codewords are sent most-significant-bit-first and must go through
/// [`BitWriter::push_huffman_code`] instead.
pub struct BitWriter {
    bytes: Vec<u8>,
    cur: u8,
    nbits: u8,
}

impl BitWriter {
    pub fn new() -> Self {
        Self { bytes: Vec::new(), cur: 0, nbits: 0 }
    }

    fn push_bit(&mut self, bit: u8) {
        self.cur |= (bit & 1) << self.nbits;
        self.nbits += 1;
        if self.nbits == 8 {
            self.bytes.push(self.cur);
            self.cur = 0;
            self.nbits = 0;
        }
    }

    /// An ordinary field: `value`'s low `n` bits, low-order bit first.
    pub fn push_field(&mut self, value: u32, n: u32) {
        for i in 0..n {
            self.push_bit(((value >> i) & 1) as u8);
        }
    }

    /// A canonical Huffman codeword, transmitted most-significant-bit first.
    pub fn push_huffman_code(&mut self, code: u32, n: u32) {
        for i in (0..n).rev() {
            self.push_bit(((code >> i) & 1) as u8);
        }
    }

    pub fn align_to_byte(&mut self) {
        while self.nbits != 0 {
            self.push_bit(0);
        }
    }

    pub fn finish(mut self) -> Vec<u8> {
        if self.nbits != 0 {
            self.bytes.push(self.cur);
        }
        self.bytes
    }
}

/// Fixed (BTYPE=01) literal/length codeword for a literal byte, per RFC 1951
/// §3.2.6's canonical assignment.
pub fn fixed_literal_code(byte: u8) -> (u32, u32) {
    let sym = byte as u32;
    if sym < 144 {
        (0x30 + sym, 8)
    } else {
        (0x190 + (sym - 144), 9)
    }
}

/// Fixed end-of-block codeword (symbol 256).
pub fn fixed_end_of_block() -> (u32, u32) {
    (0, 7)
}

/// Fixed codeword for a length-alphabet symbol (257..285).
pub fn fixed_length_code(symbol: u32) -> (u32, u32) {
    if symbol <= 279 {
        (symbol - 256, 7)
    } else {
        (192 + (symbol - 280), 8)
    }
}

/// Fixed codeword for a distance-alphabet symbol (0..29): all 5 bits,
/// canonically assigned in ascending symbol order starting at 0.
pub fn fixed_distance_code(symbol: u32) -> (u32, u32) {
    (symbol, 5)
}

/// Emits `BFINAL`+`BTYPE=01` (fixed Huffman), the literal codes for `data`,
/// then an end-of-block marker, byte-aligned at the end.
pub fn fixed_block_literals(data: &[u8]) -> Vec<u8> {
    let mut w = BitWriter::new();
    w.push_field(1, 1); // BFINAL
    w.push_field(1, 2); // BTYPE = fixed
    for &b in data {
        let (code, bits) = fixed_literal_code(b);
        w.push_huffman_code(code, bits);
    }
    let (code, bits) = fixed_end_of_block();
    w.push_huffman_code(code, bits);
    w.align_to_byte();
    w.finish()
}

/// Emits a single literal byte followed by a length/distance back-reference,
/// wrapped in a final fixed-Huffman block. `length` must map onto a
/// zero-extra-bits length symbol (257..264 or 285) and `distance` onto a
/// zero-extra-bits distance symbol (1..4) to keep the encoding simple.
pub fn fixed_block_literal_then_copy(first: u8, length: u32, distance: u32) -> Vec<u8> {
    let mut w = BitWriter::new();
    w.push_field(1, 1);
    w.push_field(1, 2);

    let (code, bits) = fixed_literal_code(first);
    w.push_huffman_code(code, bits);

    let (lsym, lextra, lvalue) = length_symbol(length);
    let (lcode, lbits) = fixed_length_code(lsym);
    w.push_huffman_code(lcode, lbits);
    if lextra > 0 {
        w.push_field(lvalue, lextra);
    }

    let (dsym, dextra, dvalue) = distance_symbol(distance);
    let (dcode, dbits) = fixed_distance_code(dsym);
    w.push_huffman_code(dcode, dbits);
    if dextra > 0 {
        w.push_field(dvalue, dextra);
    }

    let (code, bits) = fixed_end_of_block();
    w.push_huffman_code(code, bits);
    w.align_to_byte();
    w.finish()
}

/// `(symbol, extra_bits, extra_value)` for a DEFLATE length 3..258.
fn length_symbol(length: u32) -> (u32, u32, u32) {
    const LENGTH_INFO: [(u32, u32); 29] = [
        (3, 0), (4, 0), (5, 0), (6, 0), (7, 0), (8, 0), (9, 0), (10, 0),
        (11, 1), (13, 1), (15, 1), (17, 1),
        (19, 2), (23, 2), (27, 2), (31, 2),
        (35, 3), (43, 3), (51, 3), (59, 3),
        (67, 4), (83, 4), (99, 4), (115, 4),
        (131, 5), (163, 5), (195, 5), (227, 5),
        (258, 0),
    ];
    if length == 258 {
        return (285, 0, 0);
    }
    for (i, &(base, extra)) in LENGTH_INFO.iter().enumerate().rev() {
        if base <= length {
            return (257 + i as u32, extra, length - base);
        }
    }
    unreachable!("length out of range")
}

/// `(symbol, extra_bits, extra_value)` for a DEFLATE distance 1..32768.
fn distance_symbol(distance: u32) -> (u32, u32, u32) {
    const DIST_INFO: [(u32, u32); 30] = [
        (1, 0), (2, 0), (3, 0), (4, 0),
        (5, 1), (7, 1),
        (9, 2), (13, 2),
        (17, 3), (25, 3),
        (33, 4), (49, 4),
        (65, 5), (97, 5),
        (129, 6), (193, 6),
        (257, 7), (385, 7),
        (513, 8), (769, 8),
        (1025, 9), (1537, 9),
        (2049, 10), (3073, 10),
        (4097, 11), (6145, 11),
        (8193, 12), (12289, 12),
        (16385, 13), (24577, 13),
    ];
    for (i, &(base, extra)) in DIST_INFO.iter().enumerate().rev() {
        if base <= distance {
            return (i as u32, extra, distance - base);
        }
    }
    unreachable!("distance out of range")
}

/// A fixed-Huffman block emitting `prefix.len()` literal bytes (cycling
/// through `prefix`'s own bytes as filler isn't required: callers pass the
/// exact bytes they want), then a back-reference copying `length` bytes from
/// `distance` bytes back, then end-of-block.
pub fn fixed_block_fill_then_copy(filler: &[u8], length: u32, distance: u32) -> Vec<u8> {
    let mut w = BitWriter::new();
    w.push_field(1, 1);
    w.push_field(1, 2);

    for &b in filler {
        let (code, bits) = fixed_literal_code(b);
        w.push_huffman_code(code, bits);
    }

    let (lsym, lextra, lvalue) = length_symbol(length);
    let (lcode, lbits) = fixed_length_code(lsym);
    w.push_huffman_code(lcode, lbits);
    if lextra > 0 {
        w.push_field(lvalue, lextra);
    }

    let (dsym, dextra, dvalue) = distance_symbol(distance);
    let (dcode, dbits) = fixed_distance_code(dsym);
    w.push_huffman_code(dcode, dbits);
    if dextra > 0 {
        w.push_field(dvalue, dextra);
    }

    let (code, bits) = fixed_end_of_block();
    w.push_huffman_code(code, bits);
    w.align_to_byte();
    w.finish()
}

/// Runs a whole buffer through a fresh [`streaming_inflate_rs::Inflator`] in
/// one shot, growing the output as needed. Panics on decode error, so only
/// suitable for the "this must succeed" half of a test.
pub fn inflate_whole(mut deflate: &[u8]) -> Vec<u8> {
    use streaming_inflate_rs::{InflateStatus, Inflator};
    let mut inflator = Inflator::new();
    let mut out = vec![0u8; 1 << 16];
    let mut produced = Vec::new();
    loop {
        unsafe {
            inflator.set_source(deflate);
            inflator.set_target(&mut out);
        }
        let status = inflator.inflate(true).expect("decode should succeed");
        produced.extend_from_slice(&out[..inflator.target_end()]);
        deflate = &deflate[inflator.source_end()..];
        if status == InflateStatus::Ok {
            return produced;
        }
    }
}

/// Like [`inflate_whole`] but drives one byte of input and one byte of
/// output through the decoder at a time, to exercise suspend/resume at
/// every possible granularity.
pub fn inflate_one_byte_at_a_time(data: &[u8]) -> Vec<u8> {
    use streaming_inflate_rs::Inflator;
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
            let status = inflator.inflate(is_last_byte).expect("decode should succeed");
            produced.extend_from_slice(&out[..inflator.target_end()]);
            if inflator.source_end() == 1 {
                break;
            }
            let _ = status;
        }
    }
    produced
}
