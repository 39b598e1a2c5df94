//! Scalar codecs: BOOLEAN, constrained INTEGER, unsigned byte, unconstrained big INTEGER
//! and ENUMERATED.

use crate::bitstream::{BitSink, Bitstream};
use crate::error::{CodecError, Result};
use crate::schema::{BigIntegerType, EnumeratedType, IntegerType};
use crate::whole_number::{decode_constrained, decode_length, encode_constrained, encode_length};
use num_bigint::BigInt;

pub fn encode_boolean(w: &mut dyn BitSink, v: bool) -> Result<()> {
    w.append_bit(v)
}

pub fn decode_boolean(r: &mut Bitstream) -> Result<bool> {
    r.read_bit()
}

pub fn encode_integer(w: &mut dyn BitSink, ty: &IntegerType, v: i64) -> Result<()> {
    encode_constrained(w, v, ty.min, ty.max, ty.extensible)
}

pub fn decode_integer(r: &mut Bitstream, ty: &IntegerType) -> Result<i64> {
    decode_constrained(r, ty.min, ty.max, ty.extensible)
}

pub fn encode_byte(w: &mut dyn BitSink, v: u8) -> Result<()> {
    encode_constrained(w, v as i64, 0, 255, false)
}

pub fn decode_byte(r: &mut Bitstream) -> Result<u8> {
    Ok(decode_constrained(r, 0, 255, false)? as u8)
}

/// Minimal two's-complement octets behind a length determinant.
pub fn encode_big_integer(w: &mut dyn BitSink, ty: &BigIntegerType, v: &BigInt) -> Result<()> {
    if let Some((lo, hi)) = &ty.bounds {
        return Err(CodecError::not_implemented(format!("constrained big integer ({}..{})", lo, hi)));
    }
    let octets = v.to_signed_bytes_be();
    encode_length(w, octets.len())?;
    w.append_bytes(&octets)
}

pub fn decode_big_integer(r: &mut Bitstream, ty: &BigIntegerType) -> Result<BigInt> {
    if let Some((lo, hi)) = &ty.bounds {
        return Err(CodecError::not_implemented(format!("constrained big integer ({}..{})", lo, hi)));
    }
    let n = decode_length(r)?;
    if n == 0 {
        return Err(CodecError::malformed("integer with zero content octets"));
    }
    let octets = r.read_bytes(n)?;
    Ok(BigInt::from_signed_bytes_be(&octets))
}

/// Index within the extension root; an addition identifier fails with `NotImplemented`.
pub fn encode_enumerated(w: &mut dyn BitSink, ty: &EnumeratedType, id: &str) -> Result<()> {
    if ty.root.is_empty() {
        return Err(CodecError::schema_mismatch("enumeration without root values"));
    }
    match ty.root.iter().position(|r| r == id) {
        Some(index) => {
            if ty.extensible {
                w.append_bit(false)?;
            }
            encode_constrained(w, index as i64, 0, ty.root.len() as i64 - 1, false)
        }
        None if ty.extensible && ty.additions.iter().any(|a| a == id) => {
            w.append_bit(true)?;
            Err(CodecError::not_implemented(format!("enumeration extension value '{}'", id)))
        }
        None => Err(CodecError::invalid_value(format!("'{}' is not a value of the enumeration", id))),
    }
}

pub fn decode_enumerated(r: &mut Bitstream, ty: &EnumeratedType) -> Result<String> {
    if ty.root.is_empty() {
        return Err(CodecError::schema_mismatch("enumeration without root values"));
    }
    if ty.extensible && r.read_bit()? {
        return Err(CodecError::not_implemented("enumeration extension value"));
    }
    let index = decode_constrained(r, 0, ty.root.len() as i64 - 1, false)? as usize;
    ty.root
        .get(index)
        .cloned()
        .ok_or_else(|| CodecError::malformed(format!("enumeration index {} >= {}", index, ty.root.len())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn colours() -> EnumeratedType {
        EnumeratedType::new(["red", "green", "blue"])
    }

    #[test]
    fn enumerated_root_index() {
        let mut s = Bitstream::default();
        encode_enumerated(&mut s, &colours(), "blue").unwrap();
        assert_eq!(s.render_binary(), "10");
        s.finalize_for_reading();
        assert_eq!(decode_enumerated(&mut s, &colours()).unwrap(), "blue");
    }

    #[test]
    fn enumerated_extensible_root_value_has_leading_zero() {
        let ty = colours().with_additions(["violet"]);
        let mut s = Bitstream::default();
        encode_enumerated(&mut s, &ty, "green").unwrap();
        assert_eq!(s.render_binary(), "001");
    }

    #[test]
    fn enumerated_addition_not_implemented() {
        let ty = colours().with_additions(["violet"]);
        let mut s = Bitstream::default();
        assert_eq!(encode_enumerated(&mut s, &ty, "violet").unwrap_err().kind(), ErrorKind::NotImplemented);
        let mut s = Bitstream::from_bytes(&[0x80]);
        assert_eq!(decode_enumerated(&mut s, &ty).unwrap_err().kind(), ErrorKind::NotImplemented);
    }

    #[test]
    fn enumerated_unknown_identifier() {
        let mut s = Bitstream::default();
        assert_eq!(encode_enumerated(&mut s, &colours(), "pink").unwrap_err().kind(), ErrorKind::InvalidValue);
    }

    #[test]
    fn big_integer_minimal_octets() {
        for (v, hex) in [(0i64, "0100"), (127, "017F"), (128, "020080"), (-1, "01FF"), (-129, "02FF7F")] {
            let mut s = Bitstream::default();
            encode_big_integer(&mut s, &BigIntegerType::default(), &BigInt::from(v)).unwrap();
            assert_eq!(s.render_hex(), hex, "value {}", v);
            s.finalize_for_reading();
            assert_eq!(decode_big_integer(&mut s, &BigIntegerType::default()).unwrap(), BigInt::from(v));
        }
    }

    #[test]
    fn big_integer_bounds_not_implemented() {
        let ty = BigIntegerType { bounds: Some((BigInt::from(0), BigInt::from(10))) };
        let mut s = Bitstream::default();
        assert_eq!(encode_big_integer(&mut s, &ty, &BigInt::from(3)).unwrap_err().kind(), ErrorKind::NotImplemented);
    }

    #[test]
    fn byte_is_eight_bits() {
        let mut s = Bitstream::default();
        encode_byte(&mut s, 0x5A).unwrap();
        assert_eq!(s.render_hex(), "5A");
        s.finalize_for_reading();
        assert_eq!(decode_byte(&mut s).unwrap(), 0x5A);
    }
}
