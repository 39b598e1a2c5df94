//! Restricted character strings.
//!
//! UTF8String is an octet count followed by raw octets. IA5String and VisibleString are a
//! character count followed by one constrained number per character: the index into the
//! sorted permitted alphabet when that alphabet fits in fewer than 7 bits, otherwise the
//! US-ASCII code.

use crate::bitstream::{BitSink, Bitstream};
use crate::error::{CodecError, Result};
use crate::schema::{AlphabetKind, SizeConstraint, StringType};
use crate::whole_number::{
    bit_width, decode_constrained, decode_count, decode_length, encode_constrained, encode_count, encode_length,
};

const ASCII_BITS: u32 = 7;

/// Sorted, de-duplicated permitted alphabet when it beats the 7-bit ASCII form.
fn reduced_alphabet(ty: &StringType) -> Option<Vec<char>> {
    let permitted = ty.permitted.as_deref()?;
    let mut chars: Vec<char> = permitted.chars().collect();
    chars.sort_unstable();
    chars.dedup();
    if chars.is_empty() || bit_width(0, chars.len() as i64 - 1) >= ASCII_BITS {
        return None;
    }
    Some(chars)
}

fn check_size(ty: &StringType, count: usize) -> Result<()> {
    if ty.size.contains(count) {
        return Ok(());
    }
    if ty.extensible && ty.size != SizeConstraint::Unbounded {
        return Err(CodecError::not_implemented(format!(
            "{} of {} characters outside extension root {:?}",
            ty.alphabet.asn1_name(),
            count,
            ty.size
        )));
    }
    Err(CodecError::out_of_range(format!(
        "{} of {} characters outside size {:?}",
        ty.alphabet.asn1_name(),
        count,
        ty.size
    )))
}

pub fn encode_string(w: &mut dyn BitSink, ty: &StringType, s: &str) -> Result<()> {
    if ty.alphabet == AlphabetKind::Utf8 {
        check_size(ty, s.chars().count())?;
        let octets = s.as_bytes();
        encode_length(w, octets.len())?;
        for &b in octets {
            encode_constrained(w, b as i64, 0, 255, false)?;
        }
        return Ok(());
    }

    let chars: Vec<char> = s.chars().collect();
    encode_count(w, chars.len(), ty.size, ty.extensible)?;
    let permitted = ty.permitted.as_deref();
    match reduced_alphabet(ty) {
        Some(alphabet) => {
            for c in chars {
                let index = alphabet.binary_search(&c).map_err(|_| {
                    CodecError::invalid_value(format!("'{}' is not in the permitted alphabet", c))
                })?;
                encode_constrained(w, index as i64, 0, alphabet.len() as i64 - 1, false)?;
            }
        }
        None => {
            let max = ty.alphabet.max_code();
            for c in chars {
                if permitted.is_some_and(|p| !p.contains(c)) {
                    return Err(CodecError::invalid_value(format!("'{}' is not in the permitted alphabet", c)));
                }
                let code = c as u32 as i64;
                if code > max {
                    return Err(CodecError::out_of_range(format!(
                        "'{}' (U+{:04X}) is not a {} character",
                        c,
                        code,
                        ty.alphabet.asn1_name()
                    )));
                }
                encode_constrained(w, code, 0, max, false)?;
            }
        }
    }
    Ok(())
}

pub fn decode_string(r: &mut Bitstream, ty: &StringType) -> Result<String> {
    if ty.alphabet == AlphabetKind::Utf8 {
        let n = decode_length(r)?;
        let octets = r.read_bytes(n)?;
        let s = String::from_utf8(octets).map_err(|e| CodecError::malformed(format!("invalid UTF-8: {}", e)))?;
        if !ty.size.contains(s.chars().count()) {
            return Err(CodecError::malformed(format!(
                "UTF8String of {} characters outside size {:?}",
                s.chars().count(),
                ty.size
            )));
        }
        return Ok(s);
    }

    let n = decode_count(r, ty.size, ty.extensible)?;
    let mut out = String::with_capacity(n.min(r.remaining()));
    match reduced_alphabet(ty) {
        Some(alphabet) => {
            for _ in 0..n {
                let index = decode_constrained(r, 0, alphabet.len() as i64 - 1, false)? as usize;
                out.push(alphabet[index]);
            }
        }
        None => {
            let max = ty.alphabet.max_code();
            let permitted = ty.permitted.as_deref();
            for _ in 0..n {
                let c = decode_constrained(r, 0, max, false)? as u8 as char;
                if permitted.is_some_and(|p| !p.contains(c)) {
                    return Err(CodecError::malformed(format!("'{}' is not in the permitted alphabet", c)));
                }
                out.push(c);
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn roundtrip(ty: &StringType, s: &str) -> Bitstream {
        let mut b = Bitstream::default();
        encode_string(&mut b, ty, s).unwrap();
        let mut back = b.clone();
        back.finalize_for_reading();
        assert_eq!(decode_string(&mut back, ty).unwrap(), s);
        b
    }

    #[test]
    fn utf8_octet_count_prefix() {
        let ty = StringType::new(AlphabetKind::Utf8, SizeConstraint::Unbounded);
        let b = roundtrip(&ty, "cde");
        assert_eq!(b.render_hex(), "03636465");
        let b = roundtrip(&ty, "é");
        assert_eq!(b.render_hex(), "02C3A9");
    }

    #[test]
    fn ia5_seven_bits_per_char() {
        let ty = StringType::new(AlphabetKind::Ia5, SizeConstraint::Range { min: 1, max: 4 });
        let b = roundtrip(&ty, "AB");
        // count 1 in 2 bits, 'A' 1000001, 'B' 1000010
        assert_eq!(b.render_binary(), "0110000011000010");
    }

    #[test]
    fn custom_alphabet_uses_sorted_index() {
        let ty = StringType::new(AlphabetKind::Visible, SizeConstraint::Fixed(3)).permitted("9876543210");
        let b = roundtrip(&ty, "205");
        // digits sort to 0..9, 4 bits each, no count for fixed size
        assert_eq!(b.render_binary(), "001000000101");
    }

    #[test]
    fn large_custom_alphabet_falls_back_to_ascii() {
        let all: String = (32u8..=126).map(char::from).collect();
        let ty = StringType::new(AlphabetKind::Ia5, SizeConstraint::Fixed(1)).permitted(all);
        let b = roundtrip(&ty, "Z");
        assert_eq!(b.len(), 7);
    }

    #[test]
    fn decoded_ascii_code_outside_large_alphabet() {
        let alnum: String = ('A'..='Z').chain('a'..='z').chain('0'..='9').chain("_-.".chars()).collect();
        let ty = StringType::new(AlphabetKind::Ia5, SizeConstraint::Fixed(1)).permitted(alnum);
        assert!(reduced_alphabet(&ty).is_none());
        // 0100001 is '!'
        let mut r = Bitstream::from_bytes(&[0x42]);
        assert_eq!(decode_string(&mut r, &ty).unwrap_err().kind(), ErrorKind::MalformedInput);
        let mut r = Bitstream::from_bytes(&[0x82]);
        assert_eq!(decode_string(&mut r, &ty).unwrap(), "A");
    }

    #[test]
    fn character_outside_alphabet() {
        let ty = StringType::new(AlphabetKind::Ia5, SizeConstraint::Unbounded).permitted("ABC");
        let mut b = Bitstream::default();
        assert_eq!(encode_string(&mut b, &ty, "AD").unwrap_err().kind(), ErrorKind::InvalidValue);
    }

    #[test]
    fn visible_string_rejects_del() {
        let ty = StringType::new(AlphabetKind::Visible, SizeConstraint::Unbounded);
        let mut b = Bitstream::default();
        assert_eq!(encode_string(&mut b, &ty, "\u{7f}").unwrap_err().kind(), ErrorKind::OutOfRange);
    }

    #[test]
    fn utf8_size_bounds_characters() {
        let ty = StringType::new(AlphabetKind::Utf8, SizeConstraint::Range { min: 1, max: 2 });
        roundtrip(&ty, "éé");
        let mut b = Bitstream::default();
        assert_eq!(encode_string(&mut b, &ty, "abc").unwrap_err().kind(), ErrorKind::OutOfRange);
    }
}
