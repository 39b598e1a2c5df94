//! SEQUENCE: extension bit, optional-field presence bitmap, root fields in order, then the
//! extension-addition bitmap and open-type wrapped additions.
//!
//! Fields marked as instrumentation are invisible on the wire: they take no presence bit,
//! no extension index, and decode as absent.

use crate::bitstream::{BitSink, Bitstream};
use crate::codec::{decode_value, encode_value, Context};
use crate::error::{CodecError, Result};
use crate::schema::{Presence, SequenceType};
use crate::value::Value;
use crate::whole_number::{decode_open_type, decode_small_length, encode_open_type, encode_small_length};
use log::trace;

fn check_layout(ty: &SequenceType) -> Result<()> {
    let mut seen_addition = false;
    for f in ty.fields.iter().filter(|f| !f.instrumentation) {
        match f.presence {
            Presence::ExtensionAddition => {
                if !ty.extensible {
                    return Err(CodecError::schema_mismatch(format!(
                        "{}: extension addition '{}' in a non-extensible sequence",
                        ty.name, f.name
                    )));
                }
                seen_addition = true;
            }
            _ if seen_addition => {
                return Err(CodecError::schema_mismatch(format!(
                    "{}: root field '{}' declared after extension additions",
                    ty.name, f.name
                )));
            }
            _ => {}
        }
    }
    Ok(())
}

pub fn encode_sequence(w: &mut dyn BitSink, ty: &SequenceType, fields: &[Option<Value>], ctx: Context) -> Result<()> {
    let ctx = ctx.nested()?;
    check_layout(ty)?;
    if fields.len() != ty.fields.len() {
        return Err(CodecError::schema_mismatch(format!(
            "{}: {} values for {} declared fields",
            ty.name,
            fields.len(),
            ty.fields.len()
        )));
    }

    let extensions: Vec<usize> = ty.extension_indices().collect();
    let any_extension = extensions.iter().any(|&i| fields[i].is_some());
    if ty.extensible {
        w.append_bit(any_extension)?;
    }

    let root: Vec<usize> = ty.root_indices().collect();
    for &i in &root {
        if ty.fields[i].presence == Presence::Optional {
            w.append_bit(fields[i].is_some())?;
        }
    }

    for &i in &root {
        let f = &ty.fields[i];
        match (&fields[i], f.presence) {
            (Some(v), _) => {
                trace!("{}.{} at bit {}", ty.name, f.name, w.bit_len());
                encode_value(w, &f.ty, v, ctx).map_err(|e| e.within(&f.name))?;
            }
            (None, Presence::Optional) => {}
            (None, _) => {
                return Err(CodecError::invalid_value(format!("mandatory field of {} is absent", ty.name))
                    .within(&f.name));
            }
        }
    }

    if !any_extension {
        return Ok(());
    }
    encode_small_length(w, extensions.len())?;
    for &i in &extensions {
        w.append_bit(fields[i].is_some())?;
    }
    for &i in &extensions {
        if let Some(v) = &fields[i] {
            let f = &ty.fields[i];
            trace!("{}.{} (extension) at bit {}", ty.name, f.name, w.bit_len());
            encode_open_type(w, |inner| encode_value(inner, &f.ty, v, ctx)).map_err(|e| e.within(&f.name))?;
        }
    }
    Ok(())
}

pub fn decode_sequence(r: &mut Bitstream, ty: &SequenceType, ctx: Context) -> Result<Value> {
    let ctx = ctx.nested()?;
    check_layout(ty)?;
    let mut out: Vec<Option<Value>> = vec![None; ty.fields.len()];

    let has_extensions = ty.extensible && r.read_bit()?;

    let root: Vec<usize> = ty.root_indices().collect();
    let mut present = Vec::with_capacity(root.len());
    for &i in &root {
        let bit = match ty.fields[i].presence {
            Presence::Optional => r.read_bit()?,
            _ => true,
        };
        present.push(bit);
    }

    for (&i, &is_present) in root.iter().zip(&present) {
        if !is_present {
            continue;
        }
        let f = &ty.fields[i];
        trace!("{}.{} at bit {}", ty.name, f.name, r.position());
        out[i] = Some(decode_value(r, &f.ty, ctx).map_err(|e| e.within(&f.name))?);
    }

    if !has_extensions {
        return Ok(Value::Sequence(out));
    }
    let extensions: Vec<usize> = ty.extension_indices().collect();
    let count = decode_small_length(r)?;
    let mut bitmap = Vec::with_capacity(count);
    for _ in 0..count {
        bitmap.push(r.read_bit()?);
    }
    if !bitmap.iter().any(|&b| b) {
        return Err(CodecError::malformed(format!("{}: extension bit set but no addition present", ty.name)));
    }
    for k in (0..bitmap.len()).filter(|&k| bitmap[k]) {
        let i = *extensions.get(k).ok_or_else(|| {
            CodecError::malformed(format!(
                "{}: extension addition {} present but only {} declared",
                ty.name,
                k,
                extensions.len()
            ))
        })?;
        let f = &ty.fields[i];
        trace!("{}.{} (extension) at bit {}", ty.name, f.name, r.position());
        let mut inner = decode_open_type(r).map_err(|e| e.within(&f.name))?;
        out[i] = Some(decode_value(&mut inner, &f.ty, ctx).map_err(|e| e.within(&f.name))?);
    }
    Ok(Value::Sequence(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CodecConfig;
    use crate::error::ErrorKind;
    use crate::schema::{FieldDescriptor, TypeDescriptor};

    fn ctx() -> Context {
        Context::new(&CodecConfig::default())
    }

    fn header() -> SequenceType {
        SequenceType::new(
            "Header",
            vec![
                FieldDescriptor::mandatory("version", TypeDescriptor::integer(0, 3)),
                FieldDescriptor::optional("flag", TypeDescriptor::Boolean),
                FieldDescriptor::optional("count", TypeDescriptor::integer(0, 7)),
            ],
        )
    }

    #[test]
    fn presence_bits_precede_fields() {
        let mut s = Bitstream::default();
        let v = [Some(Value::int(2)), None, Some(Value::int(5))];
        encode_sequence(&mut s, &header(), &v, ctx()).unwrap();
        // presence 0 1, version 10, count 101
        assert_eq!(s.render_binary(), "0110101");
        s.finalize_for_reading();
        assert_eq!(decode_sequence(&mut s, &header(), ctx()).unwrap(), Value::Sequence(v.to_vec()));
    }

    #[test]
    fn missing_mandatory_field() {
        let mut s = Bitstream::default();
        let err = encode_sequence(&mut s, &header(), &[None, None, None], ctx()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
        assert_eq!(err.path(), &["version".to_string()]);
        assert_eq!(err.message(), "mandatory field of Header is absent");
    }

    #[test]
    fn instrumentation_field_is_skipped() {
        let mut fields = header().fields;
        fields.insert(1, FieldDescriptor::optional("trace", TypeDescriptor::Boolean).instrumentation());
        let ty = SequenceType::new("Header", fields);
        let mut s = Bitstream::default();
        let v = [Some(Value::int(2)), Some(Value::Boolean(true)), None, Some(Value::int(5))];
        encode_sequence(&mut s, &ty, &v, ctx()).unwrap();
        assert_eq!(s.render_binary(), "0110101");
        s.finalize_for_reading();
        let back = decode_sequence(&mut s, &ty, ctx()).unwrap();
        assert_eq!(back, Value::Sequence(vec![Some(Value::int(2)), None, None, Some(Value::int(5))]));
    }

    #[test]
    fn root_after_addition_is_rejected() {
        let ty = SequenceType::new(
            "Bad",
            vec![
                FieldDescriptor::extension("later", TypeDescriptor::Boolean),
                FieldDescriptor::mandatory("early", TypeDescriptor::Boolean),
            ],
        );
        let mut s = Bitstream::default();
        let err = encode_sequence(&mut s, &ty, &[None, Some(Value::Boolean(true))], ctx()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaMismatch);
    }

    #[test]
    fn extension_addition_as_open_type() {
        let mut fields = header().fields;
        fields.push(FieldDescriptor::extension("extra", TypeDescriptor::integer(0, 15)));
        let ty = SequenceType::new("Header", fields);
        let v = [Some(Value::int(1)), None, None, Some(Value::int(9))];
        let mut s = Bitstream::default();
        encode_sequence(&mut s, &ty, &v, ctx()).unwrap();
        // ext 1, presence 00, version 01, small length 0000000, bitmap 1,
        // open type length 00000001, payload 1001 0000
        assert_eq!(s.render_binary(), "1000100000001000000011001_0000".replace('_', ""));
        s.finalize_for_reading();
        assert_eq!(decode_sequence(&mut s, &ty, ctx()).unwrap(), Value::Sequence(v.to_vec()));
    }

    #[test]
    fn undeclared_extension_present_is_malformed() {
        // ext 1, version 00, small length 1 -> 2 additions, bitmap 01, open type length 1, one octet
        let mut s = Bitstream::default();
        s.append_bit(true).unwrap();
        s.append_bits(0, 2).unwrap();
        s.append_bit(false).unwrap();
        s.append_bits(1, 6).unwrap();
        s.append_bits(0b01, 2).unwrap();
        s.append_bits(1, 8).unwrap();
        s.append_byte(0).unwrap();
        s.finalize_for_reading();
        let ty = SequenceType::new(
            "Tiny",
            vec![
                FieldDescriptor::mandatory("v", TypeDescriptor::integer(0, 3)),
                FieldDescriptor::extension("x", TypeDescriptor::Boolean),
            ],
        );
        assert_eq!(decode_sequence(&mut s, &ty, ctx()).unwrap_err().kind(), ErrorKind::MalformedInput);
    }
}
