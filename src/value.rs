//! Runtime values for encoding/decoding (codec representation).
//!
//! A `Value` mirrors the shape of its [`TypeDescriptor`](crate::schema::TypeDescriptor):
//! composites hold one slot per declared field or alternative, in declaration order.

use num_bigint::BigInt;

/// A single value (scalar or composite).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Boolean(bool),
    Integer(i64),
    BigInteger(BigInt),
    Byte(u8),
    /// Enumeration identifier.
    Enumerated(String),
    /// Bit string or named-bit record, first bit first.
    Bits(Vec<bool>),
    /// SEQUENCE OF elements.
    List(Vec<Value>),
    String(String),
    /// One slot per declared field; `None` = absent.
    Sequence(Vec<Option<Value>>),
    /// One slot per declared alternative; exactly one is expected to be `Some`.
    Choice(Vec<Option<Value>>),
}

impl Value {
    pub fn int(v: impl Into<i64>) -> Self {
        Value::Integer(v.into())
    }

    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    pub fn enumerated(id: impl Into<String>) -> Self {
        Value::Enumerated(id.into())
    }

    /// Sequence value with every field present.
    pub fn seq<I: IntoIterator<Item = Value>>(fields: I) -> Self {
        Value::Sequence(fields.into_iter().map(Some).collect())
    }

    /// Choice of `alternatives` slots with `index` selected.
    ///
    /// `index` must be below `alternatives`. Debug builds panic otherwise; release builds
    /// return a choice with no slot set, which the encoder rejects as `InvalidValue`.
    pub fn choice(alternatives: usize, index: usize, v: Value) -> Self {
        debug_assert!(index < alternatives, "alternative {} of {}", index, alternatives);
        let mut slots = vec![None; alternatives];
        if let Some(slot) = slots.get_mut(index) {
            *slot = Some(v);
        }
        Value::Choice(slots)
    }

    /// Short kind name for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::BigInteger(_) => "big integer",
            Value::Byte(_) => "byte",
            Value::Enumerated(_) => "enumerated",
            Value::Bits(_) => "bits",
            Value::List(_) => "list",
            Value::String(_) => "string",
            Value::Sequence(_) => "sequence",
            Value::Choice(_) => "choice",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Integer(x) => Some(*x),
            Value::Byte(x) => Some(*x as i64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Enumerated(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bits(&self) -> Option<&[bool]> {
        match self {
            Value::Bits(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_fields(&self) -> Option<&[Option<Value>]> {
        match self {
            Value::Sequence(f) => Some(f),
            _ => None,
        }
    }

    /// Field `i` of a sequence, if present.
    pub fn field(&self, i: usize) -> Option<&Value> {
        self.as_fields().and_then(|f| f.get(i)).and_then(Option::as_ref)
    }

    /// Selected alternative of a choice when exactly one slot is set.
    pub fn selected(&self) -> Option<(usize, &Value)> {
        match self {
            Value::Choice(slots) => {
                let mut set = slots.iter().enumerate().filter_map(|(i, s)| s.as_ref().map(|v| (i, v)));
                let first = set.next()?;
                match set.next() {
                    None => Some(first),
                    Some(_) => None,
                }
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choice_helper_sets_one_slot() {
        let v = Value::choice(3, 1, Value::Boolean(true));
        assert_eq!(v.selected(), Some((1, &Value::Boolean(true))));
    }

    #[test]
    fn selected_rejects_multiple() {
        let v = Value::Choice(vec![Some(Value::int(1)), Some(Value::int(2))]);
        assert_eq!(v.selected(), None);
        assert_eq!(Value::Choice(vec![None, None]).selected(), None);
    }

    #[test]
    #[should_panic(expected = "alternative 3 of 3")]
    #[cfg(debug_assertions)]
    fn choice_helper_index_out_of_range() {
        let _ = Value::choice(3, 3, Value::Boolean(true));
    }

    #[test]
    fn bits_access() {
        let v = Value::Bits(vec![true, false, true]);
        assert_eq!(v.as_bits(), Some(&[true, false, true][..]));
        assert_eq!(Value::Byte(1).as_bits(), None);
    }

    #[test]
    fn field_access() {
        let v = Value::Sequence(vec![Some(Value::int(7)), None]);
        assert_eq!(v.field(0).and_then(Value::as_int), Some(7));
        assert!(v.field(1).is_none());
        assert!(v.field(5).is_none());
    }
}
