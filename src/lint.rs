//! Structural checks on a type descriptor tree, run once when a message catalog is built.
//!
//! ## Rules
//!
//! - **Root fields first**: no mandatory/optional field after an extension addition.
//! - **Named bits size**: a named-bit BIT STRING must have `SIZE(n)` with n = number of names.
//! - **Ordered ranges**: `min <= max` for every integer and size range.
//! - **Alphabet**: permitted alphabets are non-empty, free of duplicates, and ASCII for
//!   IA5String/VisibleString.
//! - **Enumeration**: at least one root value; identifiers unique across root and additions.
//! - **Choice**: at least one root alternative.
//! - **Unique field names** (warning): duplicate names make error paths ambiguous.
//!
//! The codec re-checks whatever it depends on at encode/decode time; this pass reports every
//! problem at once instead of the first one hit on a particular value.

use crate::schema::{AlphabetKind, BitStringType, Presence, SizeConstraint, TypeDescriptor};
use std::collections::HashSet;

/// Severity of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// Identifies which rule produced the finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaRule {
    RootFieldsFirst,
    NamedBitsSize,
    OrderedRange,
    Alphabet,
    Enumeration,
    ChoiceAlternatives,
    UniqueFieldNames,
}

impl SchemaRule {
    pub fn id(self) -> &'static str {
        match self {
            SchemaRule::RootFieldsFirst => "root-fields-first",
            SchemaRule::NamedBitsSize => "named-bits-size",
            SchemaRule::OrderedRange => "ordered-range",
            SchemaRule::Alphabet => "alphabet",
            SchemaRule::Enumeration => "enumeration",
            SchemaRule::ChoiceAlternatives => "choice-alternatives",
            SchemaRule::UniqueFieldNames => "unique-field-names",
        }
    }
}

/// A single finding with the dotted path of the offending descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaFinding {
    pub path: String,
    pub rule: SchemaRule,
    pub severity: Severity,
    pub message: String,
}

/// Run every rule over `ty`. Findings are in depth-first declaration order.
pub fn check(ty: &TypeDescriptor) -> Vec<SchemaFinding> {
    let mut out = Vec::new();
    walk(ty, "", &mut out);
    out
}

/// True when `check` reports no error-level findings.
pub fn is_valid(ty: &TypeDescriptor) -> bool {
    check(ty).iter().all(|f| f.severity != Severity::Error)
}

fn push(out: &mut Vec<SchemaFinding>, path: &str, rule: SchemaRule, severity: Severity, message: String) {
    let path = if path.is_empty() { "<root>".to_string() } else { path.to_string() };
    out.push(SchemaFinding { path, rule, severity, message });
}

fn child(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", path, name)
    }
}

fn check_size(size: SizeConstraint, path: &str, out: &mut Vec<SchemaFinding>) {
    if let SizeConstraint::Range { min, max } = size {
        if min > max {
            push(out, path, SchemaRule::OrderedRange, Severity::Error, format!("size range {}..{} is empty", min, max));
        }
    }
}

fn check_bit_string(t: &BitStringType, path: &str, out: &mut Vec<SchemaFinding>) {
    check_size(t.size, path, out);
    if t.named_bits.is_empty() {
        return;
    }
    if t.size != SizeConstraint::Fixed(t.named_bits.len()) {
        push(
            out,
            path,
            SchemaRule::NamedBitsSize,
            Severity::Error,
            format!("{} named bits but size {:?}", t.named_bits.len(), t.size),
        );
    }
}

fn walk(ty: &TypeDescriptor, path: &str, out: &mut Vec<SchemaFinding>) {
    match ty {
        TypeDescriptor::Boolean | TypeDescriptor::Byte | TypeDescriptor::BigInteger(_) => {}
        TypeDescriptor::Integer(t) => {
            if t.min > t.max {
                push(
                    out,
                    path,
                    SchemaRule::OrderedRange,
                    Severity::Error,
                    format!("integer range {}..{} is empty", t.min, t.max),
                );
            }
        }
        TypeDescriptor::Enumerated(t) => {
            if t.root.is_empty() {
                push(out, path, SchemaRule::Enumeration, Severity::Error, "no root values".to_string());
            }
            let mut seen = HashSet::new();
            for id in t.root.iter().chain(&t.additions) {
                if !seen.insert(id.as_str()) {
                    push(out, path, SchemaRule::Enumeration, Severity::Error, format!("duplicate value '{}'", id));
                }
            }
        }
        TypeDescriptor::BitString(t) => check_bit_string(t, path, out),
        TypeDescriptor::SequenceOf(t) => {
            check_size(t.size, path, out);
            walk(&t.element, &child(path, "[]"), out);
        }
        TypeDescriptor::RestrictedString(t) => {
            check_size(t.size, path, out);
            if let Some(alphabet) = &t.permitted {
                if alphabet.is_empty() {
                    push(out, path, SchemaRule::Alphabet, Severity::Error, "empty permitted alphabet".to_string());
                }
                let mut seen = HashSet::new();
                for c in alphabet.chars() {
                    if !seen.insert(c) {
                        push(out, path, SchemaRule::Alphabet, Severity::Error, format!("duplicate character '{}'", c));
                    }
                    if t.alphabet != AlphabetKind::Utf8 && (c as u32 as i64) > t.alphabet.max_code() {
                        push(
                            out,
                            path,
                            SchemaRule::Alphabet,
                            Severity::Error,
                            format!("'{}' is not a {} character", c, t.alphabet.asn1_name()),
                        );
                    }
                }
            }
        }
        TypeDescriptor::Sequence(t) => {
            let seq_path = if path.is_empty() { t.name.clone() } else { path.to_string() };
            let mut seen_addition = false;
            let mut names = HashSet::new();
            for f in &t.fields {
                let field_path = child(&seq_path, &f.name);
                if !names.insert(f.name.as_str()) {
                    push(
                        out,
                        &field_path,
                        SchemaRule::UniqueFieldNames,
                        Severity::Warning,
                        format!("duplicate field name '{}'", f.name),
                    );
                }
                if !f.instrumentation {
                    if f.presence == Presence::ExtensionAddition {
                        seen_addition = true;
                    } else if seen_addition {
                        push(
                            out,
                            &field_path,
                            SchemaRule::RootFieldsFirst,
                            Severity::Error,
                            "root field declared after extension additions".to_string(),
                        );
                    }
                }
                walk(&f.ty, &field_path, out);
            }
        }
        TypeDescriptor::Choice(t) => {
            let choice_path = if path.is_empty() { t.name.clone() } else { path.to_string() };
            if !t.alternatives.iter().any(|a| a.is_ordinary()) {
                push(
                    out,
                    &choice_path,
                    SchemaRule::ChoiceAlternatives,
                    Severity::Error,
                    "no root alternatives".to_string(),
                );
            }
            let mut names = HashSet::new();
            for a in &t.alternatives {
                let alt_path = child(&choice_path, &a.name);
                if !names.insert(a.name.as_str()) {
                    push(
                        out,
                        &alt_path,
                        SchemaRule::UniqueFieldNames,
                        Severity::Warning,
                        format!("duplicate alternative name '{}'", a.name),
                    );
                }
                walk(&a.ty, &alt_path, out);
            }
        }
    }
}
