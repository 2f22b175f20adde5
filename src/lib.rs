//! acterm: a term-rewriting core with associative-commutative matching.
//!
//! This crate provides:
//! - immutable, structurally hashed symbolic terms ([`Atom`]);
//! - algebraic property sets ([`AlgProp`]) and canonical sequences
//!   ([`AtomSeq`]) that normalize under associativity, idempotency, absorbing
//!   and identity elements;
//! - a lazy backtracking matcher that honors commutativity and associativity
//!   ([`Atom::try_match`], returning an [`Outcome`]);
//! - operator application with argument-list normalization, parameter binding
//!   and native handlers ([`Atom::apply`], [`Operator::apply`]).
//!
//! # Matching model
//!
//! Matching never raises: it yields a single binding set, a lazy stream of
//! binding sets, or a failure with a chained explanation. Under
//! associativity and commutativity the stream enumerates groupings and
//! permutations on demand, so callers pay only for the alternatives they
//! pull.
//!
//! # References
//!
//! - Plotkin, G. "Building-in equational theories" (1972)
//! - Stickel, M. "A unification algorithm for associative-commutative functions" (1981)
//! - Baader, F. & Nipkow, T. "Term Rewriting and All That" (1998)
//!
//! # Example
//!
//! ```
//! use acterm::prelude::*;
//!
//! let props = AlgProp::builder()
//!     .associative(true)
//!     .commutative(true)
//!     .identity(0)
//!     .build()
//!     .unwrap();
//! let plus = Operator::builder("+")
//!     .props(props)
//!     .params([Atom::var("x"), Atom::var("y")])
//!     .build()
//!     .unwrap();
//! let op = Atom::operator(plus);
//!
//! let subject = Atom::apply(&op, &Atom::seq(AtomSeq::plain(vec![
//!     Atom::integer(1),
//!     Atom::integer(2),
//!     Atom::integer(3),
//! ])))
//! .unwrap();
//! let pattern = Atom::apply(&op, &Atom::seq(AtomSeq::plain(vec![
//!     Atom::var("rest"),
//!     Atom::integer(2),
//! ])))
//! .unwrap();
//!
//! let binds = pattern.try_match(&subject, &Bindings::new()).into_result().unwrap();
//! assert_eq!(binds.get("rest").unwrap().to_string(), "+(1, 3)");
//! ```

pub mod constants;
pub mod core;
pub mod fingerprint;
pub mod matching;
pub mod operator;
pub mod outcome;
pub mod persist;
pub mod props;
pub mod rewrite;
pub mod sequence;

pub use crate::core::{Application, Atom, AtomError, AtomKind, Literal, Variable};
pub use crate::fingerprint::HashValue;
pub use crate::matching::{
    ACMatcher, AMatcher, CMatcher, GroupWrapper, GroupingIterator, Permutations, SequenceMatcher,
};
pub use crate::operator::{ArgumentListError, HandlerCall, NativeHandler, Operator, OperatorBuilder};
pub use crate::outcome::{
    Bindings, LogObserver, MatchContext, MatchFailure, MatchIter, MatchObserver, Outcome,
};
pub use crate::props::{AlgProp, AlgPropBuilder, PropField, PropertyError};
pub use crate::sequence::{AtomSeq, ConstantPool};

/// Prelude for convenient usage.
pub mod prelude {
    pub use crate::core::{Atom, AtomError, AtomKind};
    pub use crate::matching::{CMatcher, GroupWrapper, GroupingIterator, SequenceMatcher};
    pub use crate::operator::{ArgumentListError, Operator};
    pub use crate::outcome::{Bindings, MatchContext, MatchFailure, MatchObserver, Outcome};
    pub use crate::props::{AlgProp, PropertyError};
    pub use crate::sequence::AtomSeq;
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    fn ints(values: &[i64]) -> Vec<Atom> {
        values.iter().copied().map(Atom::integer).collect()
    }

    fn list(atoms: Vec<Atom>) -> Atom {
        Atom::seq(AtomSeq::plain(atoms))
    }

    fn plus() -> Atom {
        let props = AlgProp::builder()
            .associative(true)
            .commutative(true)
            .identity(0)
            .build()
            .unwrap();
        Atom::operator(
            Operator::builder("+")
                .props(props)
                .params([Atom::var("x"), Atom::var("y")])
                .build()
                .unwrap(),
        )
    }

    /// `+` is AC with identity 0: `[3, 0, 2]` becomes `+(3, 2)`.
    #[test]
    fn identity_elided_on_application() {
        let result = Atom::apply(&plus(), &list(ints(&[3, 0, 2]))).unwrap();
        assert_eq!(result.to_string(), "+(3, 2)");
        let args = result.as_apply().unwrap().args().unwrap();
        assert_eq!(args.atoms(), ints(&[3, 2]).as_slice());
    }

    /// `*` is AC with absorber 0 and identity 1: `[5, 0, 7]` becomes `0`.
    #[test]
    fn absorber_short_circuits_application() {
        let props = AlgProp::builder()
            .associative(true)
            .commutative(true)
            .absorber(0)
            .identity(1)
            .build()
            .unwrap();
        let times = Atom::operator(
            Operator::builder("*")
                .props(props)
                .params([Atom::var("x"), Atom::var("y")])
                .build()
                .unwrap(),
        );
        for order in [[5, 0, 7], [0, 5, 7], [7, 5, 0]] {
            let result = Atom::apply(&times, &list(ints(&order))).unwrap();
            assert_eq!(result, Atom::integer(0));
        }
    }

    /// Commutative `[$x, $y]` against `[2, 1]` yields both assignments lazily.
    #[test]
    fn commutative_pattern_yields_both_assignments() {
        let props = AlgProp::builder().commutative(true).build().unwrap();
        let pattern = AtomSeq::new(props.clone(), vec![Atom::var("x"), Atom::var("y")]);
        let subject = AtomSeq::new(props, ints(&[2, 1]));
        let outcome = CMatcher::try_match(&pattern, &subject, &Bindings::new(), &MatchContext::default());
        assert!(matches!(outcome, Outcome::Many(_)));
        let results: Vec<Bindings> = outcome.into_iter().collect();
        let expected_a = Bindings::new().with("x", Atom::integer(2)).with("y", Atom::integer(1));
        let expected_b = Bindings::new().with("x", Atom::integer(1)).with("y", Atom::integer(2));
        assert!(results.contains(&expected_a));
        assert!(results.contains(&expected_b));
    }

    /// Associative arity-3 pattern against `[1, 2, 3, 4]` enumerates three groupings.
    #[test]
    fn associative_pattern_enumerates_groupings() {
        let props = AlgProp::builder().associative(true).build().unwrap();
        let pattern = Atom::seq(AtomSeq::new(
            props.clone(),
            vec![Atom::var("x"), Atom::var("y"), Atom::var("z")],
        ));
        let subject = Atom::seq(AtomSeq::new(props, ints(&[1, 2, 3, 4])));
        let results: Vec<String> = pattern
            .try_match(&subject, &Bindings::new())
            .into_iter()
            .map(|b| format!("{} {} {}", b.get("x").unwrap(), b.get("y").unwrap(), b.get("z").unwrap()))
            .collect();
        assert_eq!(
            results,
            vec!["1 2 %A(3, 4)", "1 %A(2, 3) 4", "%A(1, 2) 3 4"]
        );
    }

    /// AC matching finds blocks that are not contiguous in the subject.
    #[test]
    fn ac_application_binds_non_contiguous_block() {
        let op = plus();
        let subject = Atom::apply(&op, &list(ints(&[1, 2, 3]))).unwrap();
        let pattern = Atom::apply(&op, &list(vec![Atom::var("x"), Atom::integer(2)])).unwrap();
        let binds = pattern.try_match(&subject, &Bindings::new()).into_result().unwrap();
        let bound = binds.get("x").unwrap();
        assert_eq!(bound.to_string(), "+(1, 3)");
        assert_eq!(bound, &Atom::apply(&op, &list(ints(&[1, 3]))).unwrap());
    }

    /// An associative, non-commutative operator matches argument runs in
    /// order, wrapping each run in a structural application.
    #[test]
    fn associative_application_groups_in_order() {
        let props = AlgProp::builder().associative(true).build().unwrap();
        let f = Atom::operator(
            Operator::builder("f")
                .props(props)
                .params([Atom::var("x"), Atom::var("y")])
                .build()
                .unwrap(),
        );
        let subject = Atom::apply(&f, &list(ints(&[1, 2, 3]))).unwrap();
        let pattern = Atom::apply(&f, &list(vec![Atom::var("x"), Atom::var("y")])).unwrap();
        let results: Vec<(Atom, Atom)> = pattern
            .try_match(&subject, &Bindings::new())
            .into_iter()
            .map(|b| (b.get("x").unwrap().clone(), b.get("y").unwrap().clone()))
            .collect();
        let f_of = |values: &[i64]| Atom::apply(&f, &list(ints(values))).unwrap();
        assert_eq!(
            results,
            vec![
                (Atom::integer(1), f_of(&[2, 3])),
                (f_of(&[1, 2]), Atom::integer(3)),
            ]
        );
        assert_eq!(results[1].0.to_string(), "f(1, 2)");
    }

    /// Bindings that make a guard rewrite to `false` are rejected.
    #[test]
    fn guard_rejects_binding() {
        let positive = Atom::operator(
            Operator::builder("positive")
                .param(Atom::var("v"))
                .handler(|call| {
                    call.arg("v")
                        .and_then(Atom::as_integer)
                        .map(|v| Atom::boolean(v > 0))
                })
                .build()
                .unwrap(),
        );
        let guard = Atom::apply(&positive, &Atom::var("n")).unwrap();
        let pattern = Atom::guarded_var("n", Atom::integer_type(), guard);
        assert!(pattern.try_match(&Atom::integer(3), &Bindings::new()).is_match());
        assert!(pattern.try_match(&Atom::integer(-3), &Bindings::new()).is_fail());
    }

    /// Lambdas that differ only in parameter names are equal.
    #[test]
    fn lambdas_are_alpha_equivalent() {
        let x = Atom::var("x");
        let y = Atom::var("y");
        let f = Atom::lambda(&x, &list(vec![x.clone(), Atom::integer(1)])).unwrap();
        let g = Atom::lambda(&y, &list(vec![y.clone(), Atom::integer(1)])).unwrap();
        assert_eq!(f, g);
        assert_eq!(f.fingerprint(), g.fingerprint());
    }

    /// Rewriting with no applicable binding returns the same instance.
    #[test]
    fn rewrite_without_substitution_is_identity() {
        let atom = Atom::apply(&plus(), &list(vec![Atom::var("a"), Atom::integer(4)])).unwrap();
        let (same, changed) = atom.rewrite(&Bindings::new().with("b", Atom::integer(1))).unwrap();
        assert!(!changed);
        assert!(Atom::ptr_eq(&atom, &same));
    }

    /// Rewriting a pattern with any of its match results rebuilds the subject
    /// up to argument order.
    #[test]
    fn rewrite_with_match_result_reproduces_subject() {
        let op = plus();
        let subject = Atom::apply(&op, &list(ints(&[1, 2, 3]))).unwrap();
        let pattern = Atom::apply(&op, &list(vec![Atom::var("x"), Atom::integer(2)])).unwrap();
        let mut seen = 0;
        for binds in pattern.try_match(&subject, &Bindings::new()) {
            let (rebuilt, changed) = pattern.rewrite(&binds).unwrap();
            assert!(changed);
            assert!(rebuilt.is_constant());
            assert_eq!(rebuilt.as_apply().unwrap().args().unwrap().len(), 3);
            assert!(rebuilt.try_match(&subject, &Bindings::new()).is_match());
            seen += 1;
        }
        assert_eq!(seen, 2);
    }

    /// Atoms and bindings survive a CBOR round trip.
    #[test]
    fn cbor_round_trip() {
        let atom = Atom::apply(&plus(), &list(vec![Atom::var("a"), Atom::integer(4)])).unwrap();
        let decoded = Atom::from_cbor(&atom.to_cbor().unwrap()).unwrap();
        assert_eq!(decoded.fingerprint(), atom.fingerprint());
        let binds = Bindings::new().with("a", atom);
        assert_eq!(Bindings::from_cbor(&binds.to_cbor().unwrap()).unwrap(), binds);
    }

    /// Atoms can be shared across threads.
    #[test]
    fn atoms_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Atom>();
        assert_send_sync::<AtomSeq>();
        assert_send_sync::<Bindings>();

        let op = plus();
        let subject = Atom::apply(&op, &list(ints(&[1, 2, 3]))).unwrap();
        let pattern = Atom::apply(&op, &list(vec![Atom::var("x"), Atom::integer(2)])).unwrap();
        let handles: Vec<_> = (0..2)
            .map(|_| {
                let (pattern, subject) = (pattern.clone(), subject.clone());
                std::thread::spawn(move || pattern.try_match(&subject, &Bindings::new()).is_match())
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }
}
