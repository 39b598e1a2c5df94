//! Format values for display: an indented, field-named tree for logs and test failures.

use crate::schema::TypeDescriptor;
use crate::value::Value;
use std::fmt::Write;

/// Render `value` as described by `ty`. Absent fields are omitted; a value whose shape does
/// not match the descriptor is printed with `{:?}` rather than rejected.
pub fn render(value: &Value, ty: &TypeDescriptor) -> String {
    let mut out = String::new();
    render_into(&mut out, value, ty, 0);
    out
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn bits_text(bits: &[bool]) -> String {
    bits.iter().map(|&b| if b { '1' } else { '0' }).collect()
}

fn render_into(out: &mut String, value: &Value, ty: &TypeDescriptor, depth: usize) {
    match (ty, value) {
        (TypeDescriptor::Sequence(t), Value::Sequence(fields)) => {
            let _ = writeln!(out, "{} {{", t.name);
            for (f, v) in t.fields.iter().zip(fields) {
                if let Some(v) = v {
                    indent(out, depth + 1);
                    let _ = write!(out, "{}: ", f.name);
                    render_into(out, v, &f.ty, depth + 1);
                }
            }
            indent(out, depth);
            out.push_str("}\n");
        }
        (TypeDescriptor::Choice(t), Value::Choice(slots)) => {
            let selected = t.alternatives.iter().zip(slots).find_map(|(a, s)| s.as_ref().map(|v| (a, v)));
            match selected {
                Some((alt, v)) => {
                    let _ = write!(out, "{}: ", alt.name);
                    render_into(out, v, &alt.ty, depth);
                }
                None => out.push_str("<no alternative>\n"),
            }
        }
        (TypeDescriptor::SequenceOf(t), Value::List(items)) => {
            let _ = writeln!(out, "[{} items]", items.len());
            for (i, item) in items.iter().enumerate() {
                indent(out, depth + 1);
                let _ = write!(out, "[{}] ", i);
                render_into(out, item, &t.element, depth + 1);
            }
        }
        (TypeDescriptor::BitString(t), Value::Bits(bits)) if !t.named_bits.is_empty() => {
            let set: Vec<&str> = t
                .named_bits
                .iter()
                .zip(bits)
                .filter(|(_, b)| **b)
                .map(|(n, _)| n.as_str())
                .collect();
            let _ = writeln!(out, "{} {{{}}}", bits_text(bits), set.join(", "));
        }
        (_, Value::Bits(bits)) => {
            let _ = writeln!(out, "'{}'B", bits_text(bits));
        }
        (_, Value::Boolean(b)) => {
            let _ = writeln!(out, "{}", b);
        }
        (_, Value::Integer(x)) => {
            let _ = writeln!(out, "{}", x);
        }
        (_, Value::BigInteger(x)) => {
            let _ = writeln!(out, "{}", x);
        }
        (_, Value::Byte(x)) => {
            let _ = writeln!(out, "{} (0x{:02X})", x, x);
        }
        (_, Value::Enumerated(id)) => {
            let _ = writeln!(out, "{}", id);
        }
        (_, Value::String(s)) => {
            let _ = writeln!(out, "{:?}", s);
        }
        (_, other) => {
            let _ = writeln!(out, "{:?}", other);
        }
    }
}
