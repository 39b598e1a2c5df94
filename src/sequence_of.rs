//! SEQUENCE OF: size determinant (fixed, ranged or length determinant), then each element
//! encoded with the declared element type.

use crate::bitstream::{BitSink, Bitstream};
use crate::codec::{decode_value, encode_value, Context};
use crate::error::{CodecError, Result};
use crate::schema::{SequenceOfType, SizeConstraint, TypeDescriptor};
use crate::value::Value;
use crate::whole_number::{decode_count, encode_count};

pub fn encode_sequence_of(w: &mut dyn BitSink, ty: &SequenceOfType, items: &[Value], ctx: Context) -> Result<()> {
    let ctx = ctx.nested()?;
    encode_count(w, items.len(), ty.size, ty.extensible)?;
    for (i, item) in items.iter().enumerate() {
        encode_value(w, &ty.element, item, ctx).map_err(|e| e.within(&format!("[{}]", i)))?;
    }
    Ok(())
}

pub fn decode_sequence_of(r: &mut Bitstream, ty: &SequenceOfType, ctx: Context) -> Result<Value> {
    let ctx = ctx.nested()?;
    let n = decode_count(r, ty.size, ty.extensible)?;
    if n.saturating_mul(min_bits(&ty.element)) > r.remaining() {
        return Err(CodecError::malformed(format!(
            "{} elements announced, {} bits remaining",
            n,
            r.remaining()
        )));
    }
    let mut list = Vec::with_capacity(n.min(r.remaining()));
    for i in 0..n {
        list.push(decode_value(r, &ty.element, ctx).map_err(|e| e.within(&format!("[{}]", i)))?);
    }
    Ok(Value::List(list))
}

/// Lower bound on an element's encoded size; only used to reject absurd counts early.
fn min_bits(ty: &TypeDescriptor) -> usize {
    match ty {
        TypeDescriptor::Boolean => 1,
        TypeDescriptor::Byte | TypeDescriptor::BigInteger(_) => 8,
        TypeDescriptor::RestrictedString(s) if s.size == SizeConstraint::Unbounded => 8,
        TypeDescriptor::SequenceOf(s) if s.size == SizeConstraint::Unbounded => 8,
        _ => 0,
    }
}
