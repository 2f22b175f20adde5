//! Canonical atom sequences.
//!
//! An [`AtomSeq`] is an ordered list of atoms governed by an [`AlgProp`].
//! Construction normalizes the list under the properties:
//!
//! 1. idempotent: duplicates are removed, keeping the first occurrence;
//! 2. associative: nested sequences with identical properties are spliced,
//!    identities are dropped, and an absorber collapses the whole list to
//!    `[absorber]`;
//!
//! repeated until neither step changes the list. Only the literal `true`
//! enables a step; symbolic properties leave the list untouched.
//!
//! # Invariants
//! - Normalizing an already-normalized sequence is a no-op.
//! - A list consisting only of identities normalizes to the empty sequence.

use crate::constants::DOMAIN_SEQUENCE_V0;
use crate::core::Atom;
use crate::fingerprint::{FingerprintBuilder, HashValue};
use crate::props::AlgProp;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// Fingerprint of a constant child to the positions holding it.
pub type ConstantPool = BTreeMap<HashValue, Vec<usize>>;

struct SeqNode {
    props: AlgProp,
    atoms: Arc<[Atom]>,
    associative: bool,
    commutative: bool,
    idempotent: bool,
    constant_pool: ConstantPool,
    is_constant: bool,
    depth: usize,
    de_bruijn_index: usize,
    fingerprint: HashValue,
}

#[derive(Clone, Serialize, Deserialize)]
struct SeqParts {
    #[serde(default)]
    props: AlgProp,
    atoms: Vec<Atom>,
}

/// Immutable, normalized sequence of atoms with its properties.
#[derive(Clone, Serialize, Deserialize)]
#[serde(from = "SeqParts", into = "SeqParts")]
pub struct AtomSeq(Arc<SeqNode>);

impl AtomSeq {
    /// Normalizes `atoms` under `props`.
    pub fn new(props: AlgProp, atoms: impl IntoIterator<Item = Atom>) -> Self {
        let atoms = normalize(&props, atoms.into_iter().collect());

        let mut constant_pool = ConstantPool::new();
        for (i, atom) in atoms.iter().enumerate() {
            if atom.is_constant() {
                constant_pool.entry(*atom.fingerprint()).or_default().push(i);
            }
        }

        let fingerprint = atoms
            .iter()
            .fold(
                FingerprintBuilder::new(DOMAIN_SEQUENCE_V0)
                    .hash(&props.fingerprint())
                    .u64(atoms.len() as u64),
                |fp, atom| fp.hash(atom.fingerprint()),
            )
            .finish();

        Self(Arc::new(SeqNode {
            associative: props.is_associative(),
            commutative: props.is_commutative(),
            idempotent: props.is_idempotent(),
            is_constant: props.is_constant() && atoms.iter().all(Atom::is_constant),
            depth: atoms.iter().map(Atom::depth).max().unwrap_or(0) + 1,
            de_bruijn_index: atoms
                .iter()
                .map(Atom::de_bruijn_index)
                .chain(std::iter::once(props.de_bruijn_index()))
                .max()
                .unwrap_or(0),
            constant_pool,
            fingerprint,
            atoms: atoms.into(),
            props,
        }))
    }

    /// A sequence without properties; nothing is normalized.
    pub fn plain(atoms: impl IntoIterator<Item = Atom>) -> Self {
        Self::new(AlgProp::none(), atoms)
    }

    #[inline]
    pub fn atoms(&self) -> &[Atom] {
        &self.0.atoms
    }

    /// Shared handle on the element slice, for lazy matchers that outlive
    /// the borrow.
    #[inline]
    pub fn shared_atoms(&self) -> Arc<[Atom]> {
        Arc::clone(&self.0.atoms)
    }

    #[inline]
    pub fn props(&self) -> &AlgProp {
        &self.0.props
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.atoms.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.atoms.is_empty()
    }

    /// Element at `index`.
    pub fn get(&self, index: usize) -> Option<&Atom> {
        self.0.atoms.get(index)
    }

    /// Iterates the elements in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Atom> {
        self.0.atoms.iter()
    }

    #[inline]
    pub fn is_associative(&self) -> bool {
        self.0.associative
    }

    #[inline]
    pub fn is_commutative(&self) -> bool {
        self.0.commutative
    }

    #[inline]
    pub fn is_idempotent(&self) -> bool {
        self.0.idempotent
    }

    /// Absorbing element of the properties.
    pub fn absorber(&self) -> Option<&Atom> {
        self.0.props.absorber()
    }

    /// Identity element of the properties.
    pub fn identity(&self) -> Option<&Atom> {
        self.0.props.identity()
    }

    /// Constant elements grouped by fingerprint, with their positions.
    pub fn constant_pool(&self) -> &ConstantPool {
        &self.0.constant_pool
    }

    #[inline]
    pub fn is_constant(&self) -> bool {
        self.0.is_constant
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.0.depth
    }

    #[inline]
    pub fn de_bruijn_index(&self) -> usize {
        self.0.de_bruijn_index
    }

    #[inline]
    pub fn fingerprint(&self) -> &HashValue {
        &self.0.fingerprint
    }
}

fn normalize(props: &AlgProp, mut atoms: Vec<Atom>) -> Vec<Atom> {
    let idempotent = props.is_idempotent();
    let associative = props.is_associative();
    loop {
        let mut changed = false;

        if idempotent {
            let before = atoms.len();
            let mut seen = HashSet::with_capacity(before);
            atoms.retain(|atom| seen.insert(atom.clone()));
            changed |= atoms.len() != before;
        }

        if associative {
            let absorber = props.absorber();
            let identity = props.identity();
            let mut next = Vec::with_capacity(atoms.len());
            for atom in &atoms {
                if absorber == Some(atom) {
                    return vec![atom.clone()];
                }
                if identity == Some(atom) {
                    changed = true;
                    continue;
                }
                match atom.as_seq() {
                    Some(child) if child.props() == props => {
                        next.extend(child.iter().cloned());
                        changed = true;
                    }
                    _ => next.push(atom.clone()),
                }
            }
            atoms = next;
        }

        if !changed {
            return atoms;
        }
    }
}

impl From<SeqParts> for AtomSeq {
    fn from(parts: SeqParts) -> Self {
        AtomSeq::new(parts.props, parts.atoms)
    }
}

impl From<AtomSeq> for SeqParts {
    fn from(seq: AtomSeq) -> Self {
        SeqParts {
            props: seq.props().clone(),
            atoms: seq.atoms().to_vec(),
        }
    }
}

impl PartialEq for AtomSeq {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
            || (self.depth() == other.depth() && self.fingerprint() == other.fingerprint())
    }
}

impl Eq for AtomSeq {}

impl<'a> IntoIterator for &'a AtomSeq {
    type Item = &'a Atom;
    type IntoIter = std::slice::Iter<'a, Atom>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for AtomSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}(", self.props())?;
        for (i, atom) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", atom)?;
        }
        f.write_str(")")
    }
}

impl fmt::Debug for AtomSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AtomSeq({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[i64]) -> Vec<Atom> {
        values.iter().copied().map(Atom::integer).collect()
    }

    fn assoc_with(absorber: Option<i64>, identity: Option<i64>) -> AlgProp {
        let mut builder = AlgProp::builder().associative(true).commutative(true);
        if let Some(z) = absorber {
            builder = builder.absorber(z);
        }
        if let Some(e) = identity {
            builder = builder.identity(e);
        }
        builder.build().unwrap()
    }

    #[test]
    fn plain_sequence_is_untouched() {
        let seq = AtomSeq::plain(ints(&[1, 1, 0, 2]));
        assert_eq!(seq.atoms(), ints(&[1, 1, 0, 2]).as_slice());
    }

    #[test]
    fn normalizing_twice_is_a_no_op() {
        let props = assoc_with(None, Some(0));
        let once = AtomSeq::new(props.clone(), ints(&[3, 0, 2]));
        let twice = AtomSeq::new(props, once.atoms().to_vec());
        assert_eq!(once, twice);
    }

    #[test]
    fn associative_nesting_is_flattened() {
        let props = AlgProp::builder().associative(true).build().unwrap();
        let inner = AtomSeq::new(props.clone(), ints(&[2, 3]));
        let nested = AtomSeq::new(props.clone(), vec![Atom::integer(1), Atom::seq(inner)]);
        let flat = AtomSeq::new(props, ints(&[1, 2, 3]));
        assert_eq!(nested, flat);
    }

    #[test]
    fn nesting_with_different_properties_is_kept() {
        let outer = AlgProp::builder().associative(true).build().unwrap();
        let inner = AtomSeq::plain(ints(&[2, 3]));
        let seq = AtomSeq::new(outer, vec![Atom::integer(1), Atom::seq(inner)]);
        assert_eq!(seq.len(), 2);
    }

    #[test]
    fn identity_is_elided() {
        let props = assoc_with(None, Some(0));
        let seq = AtomSeq::new(props.clone(), ints(&[1, 0, 2]));
        assert_eq!(seq, AtomSeq::new(props, ints(&[1, 2])));
    }

    #[test]
    fn all_identities_normalize_to_empty() {
        let seq = AtomSeq::new(assoc_with(None, Some(0)), ints(&[0, 0]));
        assert!(seq.is_empty());
    }

    #[test]
    fn absorber_short_circuits_regardless_of_order() {
        let props = assoc_with(Some(0), Some(1));
        for order in [[5, 0, 7], [0, 7, 5], [7, 5, 0]] {
            let seq = AtomSeq::new(props.clone(), ints(&order));
            assert_eq!(seq.atoms(), ints(&[0]).as_slice());
        }
    }

    #[test]
    fn absorber_in_spliced_child_collapses_parent() {
        let props = assoc_with(Some(0), None);
        let inner = Atom::seq(AtomSeq::new(props.clone(), ints(&[4, 0])));
        let seq = AtomSeq::new(props, vec![Atom::integer(9), inner]);
        assert_eq!(seq.atoms(), ints(&[0]).as_slice());
    }

    #[test]
    fn absorber_under_foreign_properties_is_not_promoted() {
        let props = assoc_with(Some(0), None);
        let foreign = Atom::seq(AtomSeq::plain(ints(&[0])));
        let seq = AtomSeq::new(props, vec![Atom::integer(4), foreign.clone()]);
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.get(1), Some(&foreign));
    }

    #[test]
    fn idempotent_deduplicates_keeping_first() {
        let props = AlgProp::builder()
            .associative(true)
            .idempotent(true)
            .build()
            .unwrap();
        let seq = AtomSeq::new(props, ints(&[2, 1, 2, 3, 1]));
        assert_eq!(seq.atoms(), ints(&[2, 1, 3]).as_slice());
    }

    #[test]
    fn constant_pool_indexes_constants() {
        let seq = AtomSeq::plain(vec![Atom::integer(1), Atom::var("x"), Atom::integer(1)]);
        let pool = seq.constant_pool();
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.get(Atom::integer(1).fingerprint()), Some(&vec![0, 2]));
    }

    #[test]
    fn flags_are_cached_from_properties() {
        let seq = AtomSeq::new(assoc_with(Some(0), Some(1)), ints(&[2, 3]));
        assert!(seq.is_associative());
        assert!(seq.is_commutative());
        assert!(!seq.is_idempotent());
        assert_eq!(seq.absorber(), Some(&Atom::integer(0)));
        assert_eq!(seq.identity(), Some(&Atom::integer(1)));
        assert_eq!(seq.to_string(), "%AC B[0] D[1](2, 3)");
    }
}
