//! Shared X.691 building blocks: constrained whole numbers, length determinants, size
//! determinants and open-type wrapping.
//!
//! The bit width of a constrained whole number is derived from the range alone
//! ([`bit_width`]) and is computed identically by encoder and decoder; any disagreement
//! would desynchronize every following field.

use crate::bitstream::{BitQueue, BitSink, Bitstream};
use crate::error::{CodecError, Result};
use crate::schema::SizeConstraint;

/// Largest count a single (unfragmented) length determinant can carry.
pub const MAX_LENGTH: usize = 16383;

/// Size bounds at or above this use a length determinant instead of a constrained count.
const SIZE_UB_LIMIT: usize = 65536;

/// `ceil(log2(max - min + 1))`; 0 when the range holds a single value.
pub fn bit_width(min: i64, max: i64) -> u32 {
    if max <= min {
        return 0;
    }
    let span = (max as i128 - min as i128) as u128;
    128 - span.leading_zeros()
}

/// Encode `value` in `[min, max]` as an offset from `min` in [`bit_width`] bits.
///
/// With `extensible`, a leading bit tells whether the value lies in the root range; values
/// outside it are an extension and fail with `NotImplemented` after that bit is written.
pub fn encode_constrained(w: &mut dyn BitSink, value: i64, min: i64, max: i64, extensible: bool) -> Result<()> {
    if min > max {
        return Err(CodecError::schema_mismatch(format!("empty range [{}, {}]", min, max)));
    }
    let in_root = min <= value && value <= max;
    if extensible {
        w.append_bit(!in_root)?;
        if !in_root {
            return Err(CodecError::not_implemented(format!(
                "value {} outside extension root [{}, {}]",
                value, min, max
            )));
        }
    }
    if !in_root {
        return Err(CodecError::out_of_range(format!("value {} not in [{}, {}]", value, min, max)));
    }
    let offset = (value as i128 - min as i128) as u64;
    w.append_bits(offset, bit_width(min, max))
}

pub fn decode_constrained(r: &mut Bitstream, min: i64, max: i64, extensible: bool) -> Result<i64> {
    if min > max {
        return Err(CodecError::schema_mismatch(format!("empty range [{}, {}]", min, max)));
    }
    if extensible && r.read_bit()? {
        return Err(CodecError::not_implemented(format!(
            "extension value outside root [{}, {}]",
            min, max
        )));
    }
    let offset = r.read_bits(bit_width(min, max))?;
    let value = min as i128 + offset as i128;
    if value > max as i128 {
        return Err(CodecError::malformed(format!("offset {} exceeds range [{}, {}]", offset, min, max)));
    }
    Ok(value as i64)
}

/// Unconstrained length determinant: 8 bits below 128, 16 bits below 16384.
pub fn encode_length(w: &mut dyn BitSink, n: usize) -> Result<()> {
    if n < 128 {
        w.append_bit(false)?;
        w.append_bits(n as u64, 7)
    } else if n <= MAX_LENGTH {
        w.append_bits(0b10, 2)?;
        w.append_bits(n as u64, 14)
    } else {
        Err(CodecError::not_implemented(format!("fragmented length determinant for {} items", n)))
    }
}

pub fn decode_length(r: &mut Bitstream) -> Result<usize> {
    if !r.read_bit()? {
        return Ok(r.read_bits(7)? as usize);
    }
    if !r.read_bit()? {
        return Ok(r.read_bits(14)? as usize);
    }
    Err(CodecError::not_implemented("fragmented length determinant"))
}

/// Normally small length (n >= 1), used for the sequence extension bitmap.
pub fn encode_small_length(w: &mut dyn BitSink, n: usize) -> Result<()> {
    if n == 0 {
        return Err(CodecError::schema_mismatch("normally small length must be at least 1"));
    }
    if n <= 64 {
        w.append_bit(false)?;
        w.append_bits((n - 1) as u64, 6)
    } else {
        w.append_bit(true)?;
        encode_length(w, n)
    }
}

pub fn decode_small_length(r: &mut Bitstream) -> Result<usize> {
    if !r.read_bit()? {
        return Ok(r.read_bits(6)? as usize + 1);
    }
    let n = decode_length(r)?;
    if n == 0 {
        return Err(CodecError::malformed("normally small length of zero"));
    }
    Ok(n)
}

/// Item count of a sized type: nothing for a fixed size, a constrained number for a
/// range, a length determinant when unbounded.
pub fn encode_count(w: &mut dyn BitSink, n: usize, size: SizeConstraint, extensible: bool) -> Result<()> {
    match size {
        SizeConstraint::Fixed(k) => {
            if extensible {
                encode_constrained(w, n as i64, k as i64, k as i64, true)
            } else if n != k {
                Err(CodecError::out_of_range(format!("size {} differs from fixed size {}", n, k)))
            } else {
                Ok(())
            }
        }
        SizeConstraint::Range { min, max } if max < SIZE_UB_LIMIT => {
            encode_constrained(w, n as i64, min as i64, max as i64, extensible)
        }
        SizeConstraint::Range { min, max } => {
            let in_root = min <= n && n <= max;
            if extensible {
                w.append_bit(!in_root)?;
                if !in_root {
                    return Err(CodecError::not_implemented(format!(
                        "size {} outside extension root [{}, {}]",
                        n, min, max
                    )));
                }
            }
            if !in_root {
                return Err(CodecError::out_of_range(format!("size {} not in [{}, {}]", n, min, max)));
            }
            encode_length(w, n)
        }
        SizeConstraint::Unbounded => encode_length(w, n),
    }
}

pub fn decode_count(r: &mut Bitstream, size: SizeConstraint, extensible: bool) -> Result<usize> {
    match size {
        SizeConstraint::Fixed(k) => {
            if extensible {
                decode_constrained(r, k as i64, k as i64, true)?;
            }
            Ok(k)
        }
        SizeConstraint::Range { min, max } if max < SIZE_UB_LIMIT => {
            Ok(decode_constrained(r, min as i64, max as i64, extensible)? as usize)
        }
        SizeConstraint::Range { min, max } => {
            if extensible && r.read_bit()? {
                return Err(CodecError::not_implemented(format!(
                    "size outside extension root [{}, {}]",
                    min, max
                )));
            }
            let n = decode_length(r)?;
            if n < min || n > max {
                return Err(CodecError::malformed(format!("size {} not in [{}, {}]", n, min, max)));
            }
            Ok(n)
        }
        SizeConstraint::Unbounded => decode_length(r),
    }
}

/// Encode through `body` into a fresh buffer, pad it to whole octets (at least one), then
/// write the octet count as a length determinant followed by the buffer.
pub fn encode_open_type<F>(w: &mut dyn BitSink, body: F) -> Result<()>
where
    F: FnOnce(&mut dyn BitSink) -> Result<()>,
{
    let mut inner = BitQueue::new();
    body(&mut inner)?;
    if inner.is_empty() {
        inner.append_byte(0)?;
    }
    inner.pad_to_octet();
    encode_length(w, inner.len() / 8)?;
    inner.drain_into(w)
}

/// Read a length-prefixed open type and return its octets as a stream for the inner decode.
pub fn decode_open_type(r: &mut Bitstream) -> Result<Bitstream> {
    let octets = decode_length(r)?;
    let bytes = r.read_bytes(octets)?;
    Ok(Bitstream::from_bytes(&bytes))
}
