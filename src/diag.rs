//! Hex and binary-string conversions for tests, logs and the `uper_bits` tool.

use crate::bitstream::{BitSink, Bitstream};
use crate::error::{CodecError, Result};

/// Upper-case hex, two digits per octet.
pub fn to_hex(bytes: &[u8]) -> String {
    hex::encode_upper(bytes)
}

/// Parse hex digits (either case). Whitespace is ignored; an odd digit count fails.
pub fn from_hex(s: &str) -> Result<Vec<u8>> {
    let digits: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    hex::decode(&digits).map_err(|e| match e {
        hex::FromHexError::OddLength => {
            CodecError::invalid_argument(format!("odd number of hex digits ({})", digits.len()))
        }
        other => CodecError::invalid_argument(other.to_string()),
    })
}

/// `0`/`1` per bit, most significant first.
pub fn to_binary(bytes: &[u8]) -> String {
    Bitstream::from_bytes(bytes).render_binary()
}

/// Parse a `0`/`1` string; the last octet is zero-padded. Whitespace and `_` are ignored.
pub fn from_binary(s: &str) -> Result<Vec<u8>> {
    let mut stream = Bitstream::growable(s.len());
    for c in s.chars().filter(|c| !c.is_whitespace() && *c != '_') {
        match c {
            '0' => stream.append_bit(false)?,
            '1' => stream.append_bit(true)?,
            other => return Err(CodecError::invalid_argument(format!("'{}' is not a binary digit", other))),
        }
    }
    Ok(stream.to_bytes())
}
