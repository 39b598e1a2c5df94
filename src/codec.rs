//! Encode/decode values against type descriptors.
//!
//! [`encode_value`] and [`decode_value`] are the single dispatch point: one match over the
//! closed set of [`TypeDescriptor`] kinds. Composite codecs recurse back into them for their
//! children, each one level deeper in the [`Context`].

use crate::bit_string::{decode_bit_string, encode_bit_string};
use crate::bitstream::{BitSink, Bitstream};
use crate::char_string::{decode_string, encode_string};
use crate::choice::{decode_choice, encode_choice};
use crate::config::{BufferKind, CodecConfig};
use crate::error::{CodecError, DecodeError, EncodeError, ErrorKind, Result};
use crate::primitive::*;
use crate::schema::TypeDescriptor;
use crate::sequence::{decode_sequence, encode_sequence};
use crate::sequence_of::{decode_sequence_of, encode_sequence_of};
use crate::value::Value;
use log::{debug, trace};

/// Per-call traversal state.
#[derive(Debug, Clone, Copy)]
pub struct Context {
    depth: usize,
    max_depth: usize,
}

impl Context {
    pub fn new(config: &CodecConfig) -> Self {
        Context { depth: 0, max_depth: config.max_depth }
    }

    /// Context for the children of a composite.
    pub fn nested(self) -> Result<Self> {
        if self.depth >= self.max_depth {
            return Err(CodecError::new(
                ErrorKind::DepthExceeded,
                format!("composite nesting deeper than {}", self.max_depth),
            ));
        }
        Ok(Context { depth: self.depth + 1, ..self })
    }

    pub fn depth(&self) -> usize {
        self.depth
    }
}

pub fn encode_value(w: &mut dyn BitSink, ty: &TypeDescriptor, v: &Value, ctx: Context) -> Result<()> {
    trace!("encode {} at bit {} (depth {})", ty.kind_name(), w.bit_len(), ctx.depth);
    match (ty, v) {
        (TypeDescriptor::Boolean, Value::Boolean(b)) => encode_boolean(w, *b),
        (TypeDescriptor::Integer(t), Value::Integer(x)) => encode_integer(w, t, *x),
        (TypeDescriptor::BigInteger(t), Value::BigInteger(x)) => encode_big_integer(w, t, x),
        (TypeDescriptor::Byte, Value::Byte(x)) => encode_byte(w, *x),
        (TypeDescriptor::Enumerated(t), Value::Enumerated(id)) => encode_enumerated(w, t, id),
        (TypeDescriptor::BitString(t), Value::Bits(bits)) => encode_bit_string(w, t, bits),
        (TypeDescriptor::SequenceOf(t), Value::List(items)) => encode_sequence_of(w, t, items, ctx),
        (TypeDescriptor::RestrictedString(t), Value::String(s)) => encode_string(w, t, s),
        (TypeDescriptor::Sequence(t), Value::Sequence(fields)) => encode_sequence(w, t, fields, ctx),
        (TypeDescriptor::Choice(t), Value::Choice(slots)) => encode_choice(w, t, slots, ctx),
        (ty, v) => Err(CodecError::schema_mismatch(format!(
            "{} value cannot be encoded as {}",
            v.kind_name(),
            ty.kind_name()
        ))),
    }
}

pub fn decode_value(r: &mut Bitstream, ty: &TypeDescriptor, ctx: Context) -> Result<Value> {
    trace!("decode {} at bit {} (depth {})", ty.kind_name(), r.position(), ctx.depth);
    Ok(match ty {
        TypeDescriptor::Boolean => Value::Boolean(decode_boolean(r)?),
        TypeDescriptor::Integer(t) => Value::Integer(decode_integer(r, t)?),
        TypeDescriptor::BigInteger(t) => Value::BigInteger(decode_big_integer(r, t)?),
        TypeDescriptor::Byte => Value::Byte(decode_byte(r)?),
        TypeDescriptor::Enumerated(t) => Value::Enumerated(decode_enumerated(r, t)?),
        TypeDescriptor::BitString(t) => Value::Bits(decode_bit_string(r, t)?),
        TypeDescriptor::SequenceOf(t) => decode_sequence_of(r, t, ctx)?,
        TypeDescriptor::RestrictedString(t) => Value::String(decode_string(r, t)?),
        TypeDescriptor::Sequence(t) => decode_sequence(r, t, ctx)?,
        TypeDescriptor::Choice(t) => decode_choice(r, t, ctx)?,
    })
}

/// UPER codec with fixed options. Stateless between calls; share freely across threads.
#[derive(Debug, Clone, Default)]
pub struct Codec {
    config: CodecConfig,
}

impl Codec {
    pub fn new(config: CodecConfig) -> Self {
        Codec { config }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    fn new_stream(&self) -> Bitstream {
        match self.config.buffer {
            BufferKind::Growable { initial_bits } => Bitstream::growable(initial_bits),
            BufferKind::Fixed { capacity_bits } => Bitstream::fixed(capacity_bits),
        }
    }

    /// Encode `value` as `schema` into whole octets, last octet zero-padded.
    /// An empty encoding becomes a single zero octet.
    pub fn encode(&self, value: &Value, schema: &TypeDescriptor) -> Result<Vec<u8>, EncodeError> {
        let stream = self.encode_to_stream(value, schema)?;
        let mut bytes = stream.to_bytes();
        if bytes.is_empty() {
            bytes.push(0);
        }
        debug!("encoded {} into {} bits ({} octets)", schema.kind_name(), stream.len(), bytes.len());
        Ok(bytes)
    }

    /// Encode without octet padding; the stream is finalized for reading.
    pub fn encode_to_stream(&self, value: &Value, schema: &TypeDescriptor) -> Result<Bitstream, EncodeError> {
        let mut stream = self.new_stream();
        encode_value(&mut stream, schema, value, Context::new(&self.config)).map_err(|e| {
            debug!("encode of {} failed: {}", schema.kind_name(), e);
            EncodeError(e)
        })?;
        stream.finalize_for_reading();
        Ok(stream)
    }

    pub fn decode(&self, bytes: &[u8], schema: &TypeDescriptor) -> Result<Value, DecodeError> {
        self.decode_with_extent(bytes, schema).map(|(v, _)| v)
    }

    /// Decode and also return the number of bits consumed.
    pub fn decode_with_extent(&self, bytes: &[u8], schema: &TypeDescriptor) -> Result<(Value, usize), DecodeError> {
        let mut stream = Bitstream::from_bytes(bytes);
        let result = decode_value(&mut stream, schema, Context::new(&self.config))
            .and_then(|v| self.check_trailing(&mut stream).map(|()| v));
        match result {
            Ok(v) => {
                debug!("decoded {} from {} octets, {} bits consumed", schema.kind_name(), bytes.len(), stream.position());
                Ok((v, stream.position()))
            }
            Err(e) => {
                debug!("decode of {} failed at bit {}: {}", schema.kind_name(), stream.position(), e);
                Err(DecodeError(e))
            }
        }
    }

    fn check_trailing(&self, stream: &mut Bitstream) -> Result<()> {
        if !self.config.strict_trailing {
            return Ok(());
        }
        let consumed = stream.position();
        let left = stream.remaining();
        if left > 7 && !(consumed == 0 && left == 8) {
            return Err(CodecError::malformed(format!("{} trailing bits after value", left)));
        }
        if stream.read_bits(left as u32)? != 0 {
            return Err(CodecError::malformed("non-zero padding bits"));
        }
        stream.seek(consumed)
    }
}

/// Encode with the default configuration.
pub fn encode(value: &Value, schema: &TypeDescriptor) -> Result<Vec<u8>, EncodeError> {
    Codec::default().encode(value, schema)
}

/// Decode with the default configuration.
pub fn decode(bytes: &[u8], schema: &TypeDescriptor) -> Result<Value, DecodeError> {
    Codec::default().decode(bytes, schema)
}
