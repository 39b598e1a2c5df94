//! # uperkit: ASN.1 Unaligned PER codec
//!
//! Encodes and decodes values to and from the ASN.1 Unaligned Packed Encoding Rules
//! (UPER, ITU-T X.691) using explicit type descriptors instead of generated code. Intended
//! for safety-message PDUs (vehicular awareness/notification messages) exchanged with
//! independent UPER implementations, so output is bit-exact.
//!
//! ## Model
//!
//! - [`TypeDescriptor`]: the schema, built once per message type by a catalog.
//! - [`Value`]: the payload, shaped like its descriptor (one slot per field/alternative).
//! - [`Codec`] / [`encode`] / [`decode`]: whole-octet entry points.
//!
//! ## Supported
//!
//! BOOLEAN, constrained INTEGER (optionally extensible), unconstrained big INTEGER,
//! unsigned byte, ENUMERATED, BIT STRING (named bits or sized), SEQUENCE OF, IA5String,
//! VisibleString, UTF8String (with permitted alphabets), SEQUENCE (optional fields,
//! extension additions as open types) and CHOICE.
//!
//! ## Not supported (fails with `ErrorKind::NotImplemented`)
//!
//! - Fragmented lengths (16K items or more).
//! - Extension values of CHOICE, ENUMERATED, SEQUENCE OF, BIT STRING and INTEGER.
//! - Constrained big integers.
//!
//! ## Example
//!
//! ```
//! use uperkit::{decode, encode, FieldDescriptor, SequenceType, TypeDescriptor, Value};
//!
//! let header = TypeDescriptor::Sequence(SequenceType::new(
//!     "Header",
//!     vec![
//!         FieldDescriptor::mandatory("protocolVersion", TypeDescriptor::integer(0, 255)),
//!         FieldDescriptor::mandatory("messageId", TypeDescriptor::integer(0, 255)),
//!     ],
//! ));
//! let value = Value::seq([Value::int(2), Value::int(4)]);
//! let bytes = encode(&value, &header).unwrap();
//! assert_eq!(bytes, vec![0x02, 0x04]);
//! assert_eq!(decode(&bytes, &header).unwrap(), value);
//! ```

pub mod bit_string;
pub mod bitstream;
pub mod char_string;
pub mod choice;
pub mod codec;
pub mod config;
pub mod diag;
pub mod dump;
pub mod error;
pub mod lint;
pub mod primitive;
pub mod schema;
pub mod sequence;
pub mod sequence_of;
pub mod value;
pub mod whole_number;

pub use bitstream::{BitQueue, BitSink, Bitstream};
pub use codec::{decode, encode, Codec};
pub use config::{BufferKind, CodecConfig};
pub use error::{CodecError, DecodeError, EncodeError, ErrorKind};
pub use schema::{
    AlphabetKind, BigIntegerType, BitStringType, ChoiceType, EnumeratedType, FieldDescriptor, IntegerType,
    NaturalWidth, Presence, SequenceOfType, SequenceType, SizeConstraint, StringType, TypeDescriptor,
};
pub use value::Value;
