//! Decoder fuzz target: feed arbitrary bytes to the UPER decoder under a schema that
//! touches every composite kind. Decoding must not panic; it returns a value or an error.
//! A successful decode must re-encode without error.
//! Build with: cargo fuzz run decode_fuzz (requires nightly and cargo fuzz).

#![cfg_attr(fuzzing, no_main)]

#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;
#[cfg(fuzzing)]
use uperkit::{
    AlphabetKind, BitStringType, ChoiceType, EnumeratedType, FieldDescriptor, SequenceType, SizeConstraint,
    StringType, TypeDescriptor,
};

#[cfg(fuzzing)]
fn schema() -> TypeDescriptor {
    TypeDescriptor::Sequence(SequenceType::new(
        "Fuzz",
        vec![
            FieldDescriptor::optional("flags", TypeDescriptor::BitString(BitStringType::named(["a", "b", "c"]).extensible())),
            FieldDescriptor::mandatory("kind", TypeDescriptor::Enumerated(EnumeratedType::new(["x", "y", "z"]))),
            FieldDescriptor::mandatory(
                "items",
                TypeDescriptor::sequence_of(TypeDescriptor::integer(-1000, 1000), SizeConstraint::Unbounded),
            ),
            FieldDescriptor::mandatory(
                "body",
                TypeDescriptor::Choice(
                    ChoiceType::new(
                        "Body",
                        vec![
                            FieldDescriptor::mandatory(
                                "text",
                                TypeDescriptor::RestrictedString(StringType::new(AlphabetKind::Utf8, SizeConstraint::Unbounded)),
                            ),
                            FieldDescriptor::mandatory(
                                "code",
                                TypeDescriptor::RestrictedString(
                                    StringType::new(AlphabetKind::Ia5, SizeConstraint::Range { min: 1, max: 8 }).permitted("0123456789"),
                                ),
                            ),
                            FieldDescriptor::mandatory("big", TypeDescriptor::big_integer()),
                        ],
                    )
                    .extensible(),
                ),
            ),
            FieldDescriptor::extension("later", TypeDescriptor::Byte),
        ],
    ))
}

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    let ty = schema();
    if let Ok(v) = uperkit::decode(data, &ty) {
        uperkit::encode(&v, &ty).expect("decoded value must re-encode");
    }
});

#[cfg(not(fuzzing))]
fn main() {
    eprintln!("Build with: cargo fuzz run decode_fuzz");
}
