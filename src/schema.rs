//! Type descriptors: the statically built shape of every value the codec handles.
//!
//! A message catalog builds one [`TypeDescriptor`] tree per PDU type at startup and shares
//! it read-only afterwards. Field and alternative order is the ASN.1 declaration order and
//! is significant on the wire.

use num_bigint::BigInt;

/// Shape of a value.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDescriptor {
    Boolean,
    Integer(IntegerType),
    /// Unconstrained INTEGER of arbitrary precision.
    BigInteger(BigIntegerType),
    /// Unsigned octet, `INTEGER (0..255)`.
    Byte,
    Enumerated(EnumeratedType),
    BitString(BitStringType),
    SequenceOf(SequenceOfType),
    RestrictedString(StringType),
    Sequence(SequenceType),
    Choice(ChoiceType),
}

impl TypeDescriptor {
    /// Short kind name for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            TypeDescriptor::Boolean => "BOOLEAN",
            TypeDescriptor::Integer(_) => "INTEGER",
            TypeDescriptor::BigInteger(_) => "INTEGER (unconstrained)",
            TypeDescriptor::Byte => "INTEGER (0..255)",
            TypeDescriptor::Enumerated(_) => "ENUMERATED",
            TypeDescriptor::BitString(_) => "BIT STRING",
            TypeDescriptor::SequenceOf(_) => "SEQUENCE OF",
            TypeDescriptor::RestrictedString(s) => s.alphabet.asn1_name(),
            TypeDescriptor::Sequence(_) => "SEQUENCE",
            TypeDescriptor::Choice(_) => "CHOICE",
        }
    }

    pub fn integer(min: i64, max: i64) -> Self {
        TypeDescriptor::Integer(IntegerType::range(min, max))
    }

    pub fn natural(width: NaturalWidth) -> Self {
        TypeDescriptor::Integer(IntegerType::natural(width))
    }

    pub fn big_integer() -> Self {
        TypeDescriptor::BigInteger(BigIntegerType::default())
    }

    pub fn sequence_of(element: TypeDescriptor, size: SizeConstraint) -> Self {
        TypeDescriptor::SequenceOf(SequenceOfType { element: Box::new(element), size, extensible: false })
    }
}

/// Value range of a host integer width, declared explicitly in the schema when the ASN.1
/// source gives no constraint. Only a convenience for building [`IntegerType`]; the range
/// that reaches the wire is always the `min`/`max` stored on the descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NaturalWidth {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
}

impl NaturalWidth {
    pub fn bounds(self) -> (i64, i64) {
        match self {
            NaturalWidth::I8 => (i8::MIN as i64, i8::MAX as i64),
            NaturalWidth::I16 => (i16::MIN as i64, i16::MAX as i64),
            NaturalWidth::I32 => (i32::MIN as i64, i32::MAX as i64),
            NaturalWidth::I64 => (i64::MIN, i64::MAX),
            NaturalWidth::U8 => (0, u8::MAX as i64),
            NaturalWidth::U16 => (0, u16::MAX as i64),
            NaturalWidth::U32 => (0, u32::MAX as i64),
        }
    }
}

/// `INTEGER (min..max[, ...])`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntegerType {
    pub min: i64,
    pub max: i64,
    pub extensible: bool,
}

impl IntegerType {
    pub fn range(min: i64, max: i64) -> Self {
        IntegerType { min, max, extensible: false }
    }

    pub fn natural(width: NaturalWidth) -> Self {
        let (min, max) = width.bounds();
        IntegerType { min, max, extensible: false }
    }

    pub fn extensible(mut self) -> Self {
        self.extensible = true;
        self
    }
}

/// Unconstrained INTEGER. A declared range is not supported and fails with `NotImplemented`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BigIntegerType {
    pub bounds: Option<(BigInt, BigInt)>,
}

/// `ENUMERATED { root..., ..., additions... }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumeratedType {
    /// Extension-root identifiers in declaration order.
    pub root: Vec<String>,
    /// Extension-addition identifiers; encoding one fails with `NotImplemented`.
    pub additions: Vec<String>,
    pub extensible: bool,
}

impl EnumeratedType {
    pub fn new<I, S>(root: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        EnumeratedType { root: root.into_iter().map(Into::into).collect(), additions: Vec::new(), extensible: false }
    }

    /// Mark extensible and declare addition identifiers (possibly none).
    pub fn with_additions<I, S>(mut self, additions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.additions = additions.into_iter().map(Into::into).collect();
        self.extensible = true;
        self
    }
}

/// SIZE constraint on a string or list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeConstraint {
    Fixed(usize),
    Range { min: usize, max: usize },
    Unbounded,
}

impl SizeConstraint {
    pub fn contains(&self, n: usize) -> bool {
        match *self {
            SizeConstraint::Fixed(k) => n == k,
            SizeConstraint::Range { min, max } => min <= n && n <= max,
            SizeConstraint::Unbounded => true,
        }
    }
}

/// `BIT STRING`.
///
/// With `named_bits` non-empty it is a record of independently named flags whose declared
/// size must be `Fixed(named_bits.len())`; otherwise a plain sized bit string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitStringType {
    pub named_bits: Vec<String>,
    pub size: SizeConstraint,
    pub extensible: bool,
}

impl BitStringType {
    pub fn sized(size: SizeConstraint) -> Self {
        BitStringType { named_bits: Vec::new(), size, extensible: false }
    }

    pub fn named<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let named_bits: Vec<String> = names.into_iter().map(Into::into).collect();
        let size = SizeConstraint::Fixed(named_bits.len());
        BitStringType { named_bits, size, extensible: false }
    }

    pub fn extensible(mut self) -> Self {
        self.extensible = true;
        self
    }
}

/// `SEQUENCE (SIZE(...)) OF element`.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceOfType {
    pub element: Box<TypeDescriptor>,
    pub size: SizeConstraint,
    pub extensible: bool,
}

/// Character restriction of a string type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlphabetKind {
    Utf8,
    Ia5,
    /// VisibleString, also used for ISO646String.
    Visible,
}

impl AlphabetKind {
    pub fn asn1_name(self) -> &'static str {
        match self {
            AlphabetKind::Utf8 => "UTF8String",
            AlphabetKind::Ia5 => "IA5String",
            AlphabetKind::Visible => "VisibleString",
        }
    }

    /// Largest code point of the default per-character encoding.
    pub(crate) fn max_code(self) -> i64 {
        match self {
            AlphabetKind::Ia5 => 127,
            AlphabetKind::Visible => 126,
            AlphabetKind::Utf8 => 255,
        }
    }
}

/// Restricted character string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringType {
    pub alphabet: AlphabetKind,
    /// `FROM("...")` permitted alphabet.
    pub permitted: Option<String>,
    /// Bounds the character count.
    pub size: SizeConstraint,
    pub extensible: bool,
}

impl StringType {
    pub fn new(alphabet: AlphabetKind, size: SizeConstraint) -> Self {
        StringType { alphabet, permitted: None, size, extensible: false }
    }

    pub fn permitted(mut self, alphabet: impl Into<String>) -> Self {
        self.permitted = Some(alphabet.into());
        self
    }

    /// `SIZE(..., ...)`.
    pub fn extensible(mut self) -> Self {
        self.extensible = true;
        self
    }
}

/// How a sequence field (or choice alternative) participates in the encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Mandatory,
    Optional,
    /// Declared after the extension marker.
    ExtensionAddition,
}

/// One named component of a sequence or alternative of a choice.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Diagnostics only; never encoded.
    pub name: String,
    pub ty: TypeDescriptor,
    pub presence: Presence,
    /// Test instrumentation: not part of the wire format, skipped by encoder and decoder.
    pub instrumentation: bool,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, ty: TypeDescriptor, presence: Presence) -> Self {
        FieldDescriptor { name: name.into(), ty, presence, instrumentation: false }
    }

    pub fn mandatory(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self::new(name, ty, Presence::Mandatory)
    }

    pub fn optional(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self::new(name, ty, Presence::Optional)
    }

    pub fn extension(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self::new(name, ty, Presence::ExtensionAddition)
    }

    pub fn instrumentation(mut self) -> Self {
        self.instrumentation = true;
        self
    }

    /// Mandatory or optional, i.e. part of the extension root.
    pub fn is_ordinary(&self) -> bool {
        self.presence != Presence::ExtensionAddition
    }
}

/// `SEQUENCE { fields... }`.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceType {
    pub name: String,
    pub fields: Vec<FieldDescriptor>,
    pub extensible: bool,
}

impl SequenceType {
    pub fn new(name: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        let extensible = fields.iter().any(|f| f.presence == Presence::ExtensionAddition);
        SequenceType { name: name.into(), fields, extensible }
    }

    pub fn extensible(mut self) -> Self {
        self.extensible = true;
        self
    }

    /// Indices of wire-visible fields that belong to the extension root.
    pub(crate) fn root_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.fields
            .iter()
            .enumerate()
            .filter(|(_, f)| !f.instrumentation && f.is_ordinary())
            .map(|(i, _)| i)
    }

    /// Indices of wire-visible extension additions, in declaration order.
    pub(crate) fn extension_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.fields
            .iter()
            .enumerate()
            .filter(|(_, f)| !f.instrumentation && !f.is_ordinary())
            .map(|(i, _)| i)
    }
}

/// `CHOICE { alternatives... }`.
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceType {
    pub name: String,
    /// Root alternatives use `Mandatory`, additions `ExtensionAddition`.
    pub alternatives: Vec<FieldDescriptor>,
    pub extensible: bool,
}

impl ChoiceType {
    pub fn new(name: impl Into<String>, alternatives: Vec<FieldDescriptor>) -> Self {
        let extensible = alternatives.iter().any(|a| !a.is_ordinary());
        ChoiceType { name: name.into(), alternatives, extensible }
    }

    pub fn extensible(mut self) -> Self {
        self.extensible = true;
        self
    }

    /// Indices of root alternatives; the wire index is the position within this list.
    pub(crate) fn root_indices(&self) -> Vec<usize> {
        self.alternatives
            .iter()
            .enumerate()
            .filter(|(_, a)| a.is_ordinary())
            .map(|(i, _)| i)
            .collect()
    }
}
