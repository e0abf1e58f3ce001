//! RFC 1951 constants: alphabet sizes, symbol-info tables, and the
//! root-bit/ENOUGH bounds used to size the flat Huffman decode table.

/// Maximum length, in bits, of any canonical DEFLATE code.
pub const MAX_CODE_LEN: u32 = 15;

/// Size of the circular history window.
pub const WINDOW_SIZE: usize = 32768;

/// Root-table bits for the literal/length, distance, and code-length tables.
pub const LROOTBITS: u32 = 9;
pub const DROOTBITS: u32 = 7;
pub const CROOTBITS: u32 = 7;

pub const LMAXSYMBOL: usize = 288;
pub const DMAXSYMBOL: usize = 32;
pub const CMAXSYMBOL: usize = 19;

/// Upper bound on total table entries (root + subtables) for the
/// literal/length and distance alphabets at their respective root widths
/// and a 15-bit maximum code length. Precomputed the way zlib's `enough`
/// utility would derive them; recompute if the root bits above change.
pub const ENOUGH_L: usize = 854;
pub const ENOUGH_D: usize = 402;

const_assert!(LROOTBITS == 9 && ENOUGH_L == 854);
const_assert!(DROOTBITS == 7 && ENOUGH_D == 402);

/// Symbol/base-value/extra-bits entry for the length and distance alphabets.
#[derive(Copy, Clone)]
pub struct SymbolInfo {
    pub base: u16,
    pub extra_bits: u8,
}

const fn si(base: u16, extra_bits: u8) -> SymbolInfo {
    SymbolInfo { base, extra_bits }
}

/// Indexed by `symbol - 256`. Entry 0 (symbol 256, end-of-block) is never
/// read for its `base`; its `extra_bits` field is unused because the table
/// builder special-cases symbol 256 directly.
pub const LENGTH_INFO: [SymbolInfo; 30] = [
    si(256, 0),
    si(3, 0),
    si(4, 0),
    si(5, 0),
    si(6, 0),
    si(7, 0),
    si(8, 0),
    si(9, 0),
    si(10, 0),
    si(11, 1),
    si(13, 1),
    si(15, 1),
    si(17, 1),
    si(19, 2),
    si(23, 2),
    si(27, 2),
    si(31, 2),
    si(35, 3),
    si(43, 3),
    si(51, 3),
    si(59, 3),
    si(67, 4),
    si(83, 4),
    si(99, 4),
    si(115, 4),
    si(131, 5),
    si(163, 5),
    si(195, 5),
    si(227, 5),
    si(258, 0),
];

/// Indexed by distance symbol 0..29.
pub const DIST_INFO: [SymbolInfo; 30] = [
    si(1, 0),
    si(2, 0),
    si(3, 0),
    si(4, 0),
    si(5, 1),
    si(7, 1),
    si(9, 2),
    si(13, 2),
    si(17, 3),
    si(25, 3),
    si(33, 4),
    si(49, 4),
    si(65, 5),
    si(97, 5),
    si(129, 6),
    si(193, 6),
    si(257, 7),
    si(385, 7),
    si(513, 8),
    si(769, 8),
    si(1025, 9),
    si(1537, 9),
    si(2049, 10),
    si(3073, 10),
    si(4097, 11),
    si(6145, 11),
    si(8193, 12),
    si(12289, 12),
    si(16385, 13),
    si(24577, 13),
];

/// Order in which code-length-code lengths are transmitted in a dynamic
/// block header.
pub const CODE_LENGTH_ORDER: [u8; 19] = [
    16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15,
];

/// Fixed (BTYPE=1) literal/length code lengths, per RFC 1951 §3.2.6.
pub fn fixed_litlen_lengths() -> [u16; LMAXSYMBOL] {
    let mut lengths = [0u16; LMAXSYMBOL];
    let mut i = 0;
    while i < 144 {
        lengths[i] = 8;
        i += 1;
    }
    while i < 256 {
        lengths[i] = 9;
        i += 1;
    }
    while i < 280 {
        lengths[i] = 7;
        i += 1;
    }
    while i < 288 {
        lengths[i] = 8;
        i += 1;
    }
    lengths
}

/// Fixed (BTYPE=1) distance code lengths: all 5 bits.
pub fn fixed_dist_lengths() -> [u16; DMAXSYMBOL] {
    [5u16; DMAXSYMBOL]
}
