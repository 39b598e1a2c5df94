//! BIT STRING, in two shapes: a record of named flags, or a sized bit string.

use crate::bitstream::{BitSink, Bitstream};
use crate::error::{CodecError, Result};
use crate::schema::{BitStringType, SizeConstraint};
use crate::whole_number::{decode_count, encode_count};

fn named_width(ty: &BitStringType) -> Result<usize> {
    match ty.size {
        SizeConstraint::Fixed(n) if n == ty.named_bits.len() => Ok(n),
        size => Err(CodecError::schema_mismatch(format!(
            "{} named bits declared with size {:?}",
            ty.named_bits.len(),
            size
        ))),
    }
}

pub fn encode_bit_string(w: &mut dyn BitSink, ty: &BitStringType, bits: &[bool]) -> Result<()> {
    if !ty.named_bits.is_empty() {
        let n = named_width(ty)?;
        if bits.len() != n {
            return Err(CodecError::schema_mismatch(format!("{} flags for {} named bits", bits.len(), n)));
        }
        if ty.extensible {
            w.append_bit(false)?;
        }
    } else {
        if ty.extensible {
            return Err(CodecError::not_implemented("extensible BIT STRING size"));
        }
        if !ty.size.contains(bits.len()) {
            return Err(CodecError::out_of_range(format!(
                "bit string of {} bits outside size {:?}",
                bits.len(),
                ty.size
            )));
        }
        encode_count(w, bits.len(), ty.size, false)?;
    }
    for &b in bits {
        w.append_bit(b)?;
    }
    Ok(())
}

pub fn decode_bit_string(r: &mut Bitstream, ty: &BitStringType) -> Result<Vec<bool>> {
    let n = if !ty.named_bits.is_empty() {
        let n = named_width(ty)?;
        if ty.extensible && r.read_bit()? {
            return Err(CodecError::not_implemented("named bit string outside extension root"));
        }
        n
    } else {
        if ty.extensible {
            return Err(CodecError::not_implemented("extensible BIT STRING size"));
        }
        decode_count(r, ty.size, false)?
    };
    if n > r.remaining() {
        return Err(CodecError::out_of_data(format!("bit string of {} bits, {} remaining", n, r.remaining())));
    }
    (0..n).map(|_| r.read_bit()).collect()
}
