//! CHOICE: optional extension bit, index among root alternatives, then the selected value.

use crate::bitstream::{BitSink, Bitstream};
use crate::codec::{decode_value, encode_value, Context};
use crate::error::{CodecError, Result};
use crate::schema::ChoiceType;
use crate::value::Value;
use crate::whole_number::{decode_constrained, encode_constrained};
use log::trace;

pub fn encode_choice(w: &mut dyn BitSink, ty: &ChoiceType, slots: &[Option<Value>], ctx: Context) -> Result<()> {
    let ctx = ctx.nested()?;
    if slots.len() != ty.alternatives.len() {
        return Err(CodecError::schema_mismatch(format!(
            "{}: {} slots for {} declared alternatives",
            ty.name,
            slots.len(),
            ty.alternatives.len()
        )));
    }
    let root = ty.root_indices();
    if root.is_empty() {
        return Err(CodecError::schema_mismatch(format!("{}: no root alternatives", ty.name)));
    }

    let set = slots.iter().filter(|s| s.is_some()).count();
    if set > 1 {
        return Err(CodecError::invalid_value(format!(
            "{}: {} alternatives selected, expected one",
            ty.name, set
        )));
    }

    let selected: Vec<(usize, &Value)> =
        root.iter().enumerate().filter_map(|(k, &i)| slots[i].as_ref().map(|v| (k, v))).collect();
    let (index, v) = match selected.as_slice() {
        [(k, v)] => (*k, *v),
        [] if ty.extensible => {
            let addition = ty.alternatives.iter().zip(slots).find(|(a, s)| !a.is_ordinary() && s.is_some());
            let what = match addition {
                Some((a, _)) => format!("{}: extension alternative '{}'", ty.name, a.name),
                None => format!("{}: no root alternative selected", ty.name),
            };
            w.append_bit(true)?;
            return Err(CodecError::not_implemented(what));
        }
        _ => return Err(CodecError::invalid_value(format!("{}: no alternative selected", ty.name))),
    };

    if ty.extensible {
        w.append_bit(false)?;
    }
    if root.len() > 1 {
        encode_constrained(w, index as i64, 0, root.len() as i64 - 1, false)?;
    }
    let alt = &ty.alternatives[root[index]];
    trace!("{} -> {} at bit {}", ty.name, alt.name, w.bit_len());
    encode_value(w, &alt.ty, v, ctx).map_err(|e| e.within(&alt.name))
}

pub fn decode_choice(r: &mut Bitstream, ty: &ChoiceType, ctx: Context) -> Result<Value> {
    let ctx = ctx.nested()?;
    let root = ty.root_indices();
    if root.is_empty() {
        return Err(CodecError::schema_mismatch(format!("{}: no root alternatives", ty.name)));
    }
    if ty.extensible && r.read_bit()? {
        return Err(CodecError::not_implemented(format!("{}: extension alternative", ty.name)));
    }
    let index = if root.len() > 1 {
        decode_constrained(r, 0, root.len() as i64 - 1, false)? as usize
    } else {
        0
    };
    let position = root[index];
    let alt = &ty.alternatives[position];
    trace!("{} -> {} at bit {}", ty.name, alt.name, r.position());
    let v = decode_value(r, &alt.ty, ctx).map_err(|e| e.within(&alt.name))?;
    let mut slots = vec![None; ty.alternatives.len()];
    slots[position] = Some(v);
    Ok(Value::Choice(slots))
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

    fn shape() -> ChoiceType {
        ChoiceType::new(
            "Shape",
            vec![
                FieldDescriptor::mandatory("circle", TypeDescriptor::integer(0, 255)),
                FieldDescriptor::mandatory("square", TypeDescriptor::integer(0, 15)),
                FieldDescriptor::mandatory("dot", TypeDescriptor::Boolean),
            ],
        )
    }

    #[test]
    fn index_then_value() {
        let slots = [None, Some(Value::int(6)), None];
        let mut s = Bitstream::default();
        encode_choice(&mut s, &shape(), &slots, ctx()).unwrap();
        assert_eq!(s.render_binary(), "010110");
        s.finalize_for_reading();
        assert_eq!(decode_choice(&mut s, &shape(), ctx()).unwrap(), Value::choice(3, 1, Value::int(6)));
    }

    #[test]
    fn single_alternative_has_no_index() {
        let ty = ChoiceType::new("One", vec![FieldDescriptor::mandatory("only", TypeDescriptor::Boolean)]);
        let mut s = Bitstream::default();
        encode_choice(&mut s, &ty, &[Some(Value::Boolean(true))], ctx()).unwrap();
        assert_eq!(s.render_binary(), "1");
    }

    #[test]
    fn zero_or_two_selected() {
        let mut s = Bitstream::default();
        let none = [None, None, None];
        assert_eq!(encode_choice(&mut s, &shape(), &none, ctx()).unwrap_err().kind(), ErrorKind::InvalidValue);
        let two = [Some(Value::int(1)), None, Some(Value::Boolean(false))];
        assert_eq!(encode_choice(&mut s, &shape(), &two, ctx()).unwrap_err().kind(), ErrorKind::InvalidValue);
    }

    #[test]
    fn extensible_with_addition_selected() {
        let mut alts = shape().alternatives;
        alts.push(FieldDescriptor::extension("hexagon", TypeDescriptor::Boolean));
        let ty = ChoiceType::new("Shape", alts);
        let v = [None, None, None, Some(Value::Boolean(true))];
        let mut s = Bitstream::default();
        assert_eq!(encode_choice(&mut s, &ty, &v, ctx()).unwrap_err().kind(), ErrorKind::NotImplemented);

        let root = [None, None, Some(Value::Boolean(true)), None];
        let mut s = Bitstream::default();
        encode_choice(&mut s, &ty, &root, ctx()).unwrap();
        assert_eq!(s.render_binary(), "0101");
    }

    #[test]
    fn root_and_addition_both_set() {
        let ty = ChoiceType::new(
            "Grown",
            vec![
                FieldDescriptor::mandatory("a", TypeDescriptor::Boolean),
                FieldDescriptor::extension("b", TypeDescriptor::Byte),
            ],
        );
        let both = [Some(Value::Boolean(true)), Some(Value::Byte(7))];
        let mut s = Bitstream::default();
        assert_eq!(encode_choice(&mut s, &ty, &both, ctx()).unwrap_err().kind(), ErrorKind::InvalidValue);
        assert!(s.is_empty());
    }
}
