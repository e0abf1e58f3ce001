use std::fmt;

/// Error taxonomy for the inflate core and the zlib/gzip façade built on it.
///
/// All variants are fatal: once an `Inflator` returns one of these, it
/// latches into a terminal bad state and every subsequent call returns the
/// same error. Suspension (`InflateStatus::SrcExhausted`/`TgtExhausted`) is
/// never represented here — only a truly dead stream is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InflateError {
    /// Reserved block type 3, or a stored-block LEN/NLEN mismatch.
    BadBlock,
    /// Dynamic-block header violates a constraint (alphabet size, missing
    /// end-of-block symbol, bad first repeat code, length overflow, or an
    /// over/under-subscribed canonical code).
    BadTree,
    /// A decoded code landed on an `INVALID` table slot.
    BadCode,
    /// A back-reference distance exceeds the bytes produced so far plus the
    /// installed dictionary/window history.
    FarOffset,
    /// The caller declared `final_input = true` but the decoder still needs
    /// more input to make progress.
    InputEnd,
    /// Allocation failed.
    Oom,
    /// API misuse, e.g. installing a dictionary after decoding has begun.
    IncorrectUse,
    /// Operation attempted on an Inflator that has already failed.
    BadState,
    /// The zlib or gzip container header was malformed or used an
    /// unsupported compression method.
    BadHeader,
    /// The trailer checksum did not match the decompressed data.
    ChecksumMismatch,
    /// The underlying reader returned an I/O error.
    Io,
}

impl fmt::Display for InflateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            InflateError::BadBlock => "invalid or reserved block type / stored-block length mismatch",
            InflateError::BadTree => "dynamic Huffman tree violates DEFLATE constraints",
            InflateError::BadCode => "decoded an invalid Huffman code",
            InflateError::FarOffset => "back-reference distance exceeds available history",
            InflateError::InputEnd => "input ended before the stream was complete",
            InflateError::Oom => "allocation failed",
            InflateError::IncorrectUse => "invalid API usage",
            InflateError::BadState => "operation attempted on a failed decoder",
            InflateError::BadHeader => "malformed container header",
            InflateError::ChecksumMismatch => "checksum verification failed",
            InflateError::Io => "I/O error",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for InflateError {}

impl From<std::io::Error> for InflateError {
    fn from(_: std::io::Error) -> Self {
        InflateError::Io
    }
}

pub type Result<T> = std::result::Result<T, InflateError>;
