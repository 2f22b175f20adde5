//! Algebraic property sets.
//!
//! An [`AlgProp`] records which algebraic laws govern an operator or a
//! sequence: associativity, commutativity, idempotency, an absorbing element
//! and an identity element. Every field is optional and every field is an
//! atom, so a property set can be partially specified or symbolic (a pattern
//! variable in place of `true`), and property sets can be matched against one
//! another.
//!
//! # Invariants
//! - A boolean slot holds a boolean literal or a non-constant atom.
//! - Idempotent being truthy, or an absorber or identity being present,
//!   requires associative to be present and not the literal `false`.
//!
//! Both are checked by [`AlgPropBuilder::build`], which every other
//! constructor goes through.
//!
//! # Citations
//! - Plotkin, "Building-in equational theories", Machine Intelligence 7 (1972)
//! - Baader & Nipkow, "Term Rewriting and All That", Chapter 10 (1998)

use crate::constants::DOMAIN_ALGPROP_V0;
use crate::core::Atom;
use crate::fingerprint::{FingerprintBuilder, HashValue};
use crate::matching::SequenceMatcher;
use crate::outcome::{Bindings, MatchContext, MatchFailure, Outcome};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the five property slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PropField {
    Associative,
    Commutative,
    Idempotent,
    Absorber,
    Identity,
}

impl PropField {
    /// All fields in canonical order.
    pub const ALL: [PropField; 5] = [
        PropField::Associative,
        PropField::Commutative,
        PropField::Idempotent,
        PropField::Absorber,
        PropField::Identity,
    ];

    /// Field name as rendered in errors.
    pub fn name(self) -> &'static str {
        match self {
            PropField::Associative => "associative",
            PropField::Commutative => "commutative",
            PropField::Idempotent => "idempotent",
            PropField::Absorber => "absorber",
            PropField::Identity => "identity",
        }
    }

    /// Whether the slot holds a truth value rather than an element.
    pub fn is_boolean(self) -> bool {
        matches!(
            self,
            PropField::Associative | PropField::Commutative | PropField::Idempotent
        )
    }
}

impl fmt::Display for PropField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Illegal property specification.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyError {
    /// A boolean slot holds a constant that is not a boolean literal.
    NotBoolean { field: PropField, value: Atom },
    /// The field requires associativity, which is absent or `false`.
    RequiresAssociative { field: PropField },
    /// A symbolic boolean field cannot be negated.
    SymbolicNegation { field: PropField, value: Atom },
}

impl fmt::Display for PropertyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyError::NotBoolean { field, value } => {
                write!(f, "{} must be a boolean, got `{}`", field, value)
            }
            PropertyError::RequiresAssociative { field } => {
                write!(f, "{} requires the associative property", field)
            }
            PropertyError::SymbolicNegation { field, value } => {
                write!(f, "cannot negate symbolic {} `{}`", field, value)
            }
        }
    }
}

impl std::error::Error for PropertyError {}

/// Unvalidated property set; [`build`](AlgPropBuilder::build) checks it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlgPropBuilder {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    associative: Option<Atom>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    commutative: Option<Atom>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    idempotent: Option<Atom>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    absorber: Option<Atom>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    identity: Option<Atom>,
}

impl AlgPropBuilder {
    /// An empty builder; every field unspecified.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the associative slot to `true`, `false` or a symbolic atom.
    pub fn associative(self, value: impl Into<Atom>) -> Self {
        self.set(PropField::Associative, Some(value.into()))
    }

    /// Sets the commutative slot.
    pub fn commutative(self, value: impl Into<Atom>) -> Self {
        self.set(PropField::Commutative, Some(value.into()))
    }

    /// Sets the idempotent slot. Requires associativity.
    pub fn idempotent(self, value: impl Into<Atom>) -> Self {
        self.set(PropField::Idempotent, Some(value.into()))
    }

    /// Sets the absorbing element. Requires associativity.
    pub fn absorber(self, value: impl Into<Atom>) -> Self {
        self.set(PropField::Absorber, Some(value.into()))
    }

    /// Sets the identity element. Requires associativity.
    pub fn identity(self, value: impl Into<Atom>) -> Self {
        self.set(PropField::Identity, Some(value.into()))
    }

    /// Sets or clears one slot.
    pub fn set(mut self, field: PropField, value: Option<Atom>) -> Self {
        *self.slot_mut(field) = value;
        self
    }

    fn slot_mut(&mut self, field: PropField) -> &mut Option<Atom> {
        match field {
            PropField::Associative => &mut self.associative,
            PropField::Commutative => &mut self.commutative,
            PropField::Idempotent => &mut self.idempotent,
            PropField::Absorber => &mut self.absorber,
            PropField::Identity => &mut self.identity,
        }
    }

    /// Validates the property set.
    pub fn build(self) -> Result<AlgProp, PropertyError> {
        for (field, value) in [
            (PropField::Associative, &self.associative),
            (PropField::Commutative, &self.commutative),
            (PropField::Idempotent, &self.idempotent),
        ] {
            if let Some(value) = value {
                if value.is_constant() && value.as_bool().is_none() {
                    return Err(PropertyError::NotBoolean {
                        field,
                        value: value.clone(),
                    });
                }
            }
        }

        let associative_holds = self
            .associative
            .as_ref()
            .map_or(false, |a| a.as_bool() != Some(false));
        if !associative_holds {
            let idempotent_truthy = self
                .idempotent
                .as_ref()
                .map_or(false, |i| i.as_bool() != Some(false));
            if idempotent_truthy {
                return Err(PropertyError::RequiresAssociative {
                    field: PropField::Idempotent,
                });
            }
            if self.absorber.is_some() {
                return Err(PropertyError::RequiresAssociative {
                    field: PropField::Absorber,
                });
            }
            if self.identity.is_some() {
                return Err(PropertyError::RequiresAssociative {
                    field: PropField::Identity,
                });
            }
        }

        Ok(AlgProp {
            associative: self.associative,
            commutative: self.commutative,
            idempotent: self.idempotent,
            absorber: self.absorber,
            identity: self.identity,
        })
    }
}

/// A validated, possibly partial, set of algebraic properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AlgPropBuilder", into = "AlgPropBuilder")]
pub struct AlgProp {
    associative: Option<Atom>,
    commutative: Option<Atom>,
    idempotent: Option<Atom>,
    absorber: Option<Atom>,
    identity: Option<Atom>,
}

impl TryFrom<AlgPropBuilder> for AlgProp {
    type Error = PropertyError;

    fn try_from(builder: AlgPropBuilder) -> Result<Self, Self::Error> {
        builder.build()
    }
}

impl From<AlgProp> for AlgPropBuilder {
    fn from(props: AlgProp) -> Self {
        props.to_builder()
    }
}

impl AlgProp {
    /// Starts an empty property set.
    pub fn builder() -> AlgPropBuilder {
        AlgPropBuilder::new()
    }

    /// The property set with every field unspecified.
    pub fn none() -> Self {
        Self::default()
    }

    /// Returns a builder pre-filled with this set's fields.
    pub fn to_builder(&self) -> AlgPropBuilder {
        AlgPropBuilder {
            associative: self.associative.clone(),
            commutative: self.commutative.clone(),
            idempotent: self.idempotent.clone(),
            absorber: self.absorber.clone(),
            identity: self.identity.clone(),
        }
    }

    /// Raw associative slot; see [`is_associative`](Self::is_associative) for the flag.
    pub fn associative(&self) -> Option<&Atom> {
        self.associative.as_ref()
    }

    /// Raw commutative slot.
    pub fn commutative(&self) -> Option<&Atom> {
        self.commutative.as_ref()
    }

    /// Raw idempotent slot.
    pub fn idempotent(&self) -> Option<&Atom> {
        self.idempotent.as_ref()
    }

    /// Absorbing element, if declared.
    pub fn absorber(&self) -> Option<&Atom> {
        self.absorber.as_ref()
    }

    /// Identity element, if declared.
    pub fn identity(&self) -> Option<&Atom> {
        self.identity.as_ref()
    }

    /// Returns the value of one slot.
    pub fn get(&self, field: PropField) -> Option<&Atom> {
        match field {
            PropField::Associative => self.associative(),
            PropField::Commutative => self.commutative(),
            PropField::Idempotent => self.idempotent(),
            PropField::Absorber => self.absorber(),
            PropField::Identity => self.identity(),
        }
    }

    /// Iterates over the specified slots in canonical order.
    pub fn fields(&self) -> impl Iterator<Item = (PropField, &Atom)> {
        PropField::ALL
            .into_iter()
            .filter_map(move |field| self.get(field).map(|value| (field, value)))
    }

    /// Whether every slot is unspecified.
    pub fn is_empty(&self) -> bool {
        self.fields().next().is_none()
    }

    /// True only when associative is the literal `true`.
    #[inline]
    pub fn is_associative(&self) -> bool {
        literal_true(&self.associative)
    }

    /// True only when commutative is the literal `true`.
    #[inline]
    pub fn is_commutative(&self) -> bool {
        literal_true(&self.commutative)
    }

    /// True only when idempotent is the literal `true`.
    #[inline]
    pub fn is_idempotent(&self) -> bool {
        literal_true(&self.idempotent)
    }

    /// Whether no slot contains a free variable.
    pub fn is_constant(&self) -> bool {
        self.fields().all(|(_, value)| value.is_constant())
    }

    /// Greatest binding index over the slots.
    pub fn de_bruijn_index(&self) -> usize {
        self.fields()
            .map(|(_, value)| value.de_bruijn_index())
            .max()
            .unwrap_or(0)
    }

    /// Structural fingerprint of the property set.
    pub fn fingerprint(&self) -> HashValue {
        PropField::ALL
            .into_iter()
            .fold(FingerprintBuilder::new(DOMAIN_ALGPROP_V0), |fp, field| {
                fp.optional(self.get(field).map(|value| value.fingerprint()))
            })
            .finish()
    }

    /// Override-merge: fields specified in `other` replace those in `self`.
    pub fn and(&self, other: &AlgProp) -> Result<AlgProp, PropertyError> {
        let mut builder = self.to_builder();
        for (field, value) in other.fields() {
            builder = builder.set(field, Some(value.clone()));
        }
        builder.build()
    }

    /// Flips the boolean literals and drops absorber and identity.
    pub fn negate(&self) -> Result<AlgProp, PropertyError> {
        let mut builder = AlgPropBuilder::new();
        for field in [
            PropField::Associative,
            PropField::Commutative,
            PropField::Idempotent,
        ] {
            if let Some(value) = self.get(field) {
                let flipped = match value.as_bool() {
                    Some(b) => Atom::boolean(!b),
                    None => {
                        return Err(PropertyError::SymbolicNegation {
                            field,
                            value: value.clone(),
                        })
                    }
                };
                builder = builder.set(field, Some(flipped));
            }
        }
        builder.build()
    }

    /// Matches this (pattern) property set against `subject`.
    ///
    /// Unspecified pattern fields match anything. A specified boolean field is
    /// matched against the subject's value, with an unspecified subject value
    /// read as `false`. A specified absorber or identity fails against a
    /// subject that lacks one.
    pub fn try_match(&self, subject: &AlgProp, binds: &Bindings, ctx: &MatchContext) -> Outcome {
        let mut patterns = Vec::with_capacity(5);
        let mut subjects = Vec::with_capacity(5);
        for (field, value) in self.fields() {
            let effective = match subject.get(field) {
                Some(value) => value.clone(),
                None if field.is_boolean() => Atom::boolean(false),
                None => {
                    return Outcome::Fail(MatchFailure::new(format!(
                        "subject properties lack the {} `{}`",
                        field, value
                    )))
                }
            };
            patterns.push(value.clone());
            subjects.push(effective);
        }
        if patterns.is_empty() {
            return Outcome::Match(binds.clone());
        }
        SequenceMatcher::try_match(&patterns, &subjects, binds, ctx)
    }
}

fn literal_true(value: &Option<Atom>) -> bool {
    value.as_ref().and_then(Atom::as_bool) == Some(true)
}

impl fmt::Display for AlgProp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (field, letter) in [
            (PropField::Associative, 'A'),
            (PropField::Commutative, 'C'),
            (PropField::Idempotent, 'I'),
        ] {
            match self.get(field) {
                None => {}
                Some(value) => match value.as_bool() {
                    Some(true) => write!(f, "{}", letter)?,
                    Some(false) => write!(f, "!{}", letter)?,
                    None => write!(f, "{}[{}]", letter, value)?,
                },
            }
        }
        let mut leading = self.associative.is_some()
            || self.commutative.is_some()
            || self.idempotent.is_some();
        if let Some(absorber) = &self.absorber {
            write!(f, "{}B[{}]", if leading { " " } else { "" }, absorber)?;
            leading = true;
        }
        if let Some(identity) = &self.identity {
            write!(f, "{}D[{}]", if leading { " " } else { "" }, identity)?;
        }
        Ok(())
    }
}
