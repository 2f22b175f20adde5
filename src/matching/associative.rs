//! Associative and associative-commutative matching.
//!
//! Both matchers reduce a `k`-pattern, `n`-subject problem (`k < n`) to
//! positional trials over groupings of the subjects.
//!
//! For AC matching, constants are eliminated first. The outer loop then
//! enumerates permutations of the remaining subjects (lexicographic, identity
//! first) and the inner loop enumerates groupings of each permuted list
//! (lexicographic markers). The first match therefore prefers the original
//! subject order and, within it, the earliest cut points. Every partition of
//! the subject multiset into `k` non-empty blocks is reached; the same binding
//! set may be produced more than once.
//!
//! # Citations
//! - Stickel, "A unification algorithm for associative-commutative functions", JACM (1981)
//! - Benanav, Kapur & Narendran, "Complexity of matching problems", JSC (1987)

use crate::core::Atom;
use crate::matching::commutative::{eliminate_constants, permutation_matches, Permutations};
use crate::matching::{GroupWrapper, GroupingIterator, SequenceMatcher};
use crate::outcome::{Bindings, MatchContext, MatchFailure, Outcome};
use crate::sequence::AtomSeq;
use log::trace;
use std::sync::Arc;

/// Matcher for associative, non-commutative sequences.
#[derive(Debug, Clone, Copy, Default)]
pub struct AMatcher;

impl AMatcher {
    /// Matches `patterns` against every grouping of `subjects` into
    /// `patterns.len()` contiguous runs, lazily.
    ///
    /// Runs longer than one subject are wrapped with `wrapper`.
    pub fn try_match(
        patterns: &AtomSeq,
        subjects: &AtomSeq,
        wrapper: &GroupWrapper,
        binds: &Bindings,
        ctx: &MatchContext,
    ) -> Outcome {
        let (k, n) = (patterns.len(), subjects.len());
        if k == n {
            return SequenceMatcher::try_match_shared(
                patterns.shared_atoms(),
                subjects.shared_atoms(),
                binds,
                ctx,
            );
        }
        if k == 0 || k > n {
            return Outcome::fail(format!(
                "cannot group {} subjects into {} runs",
                n, k
            ));
        }
        let matches = grouping_matches(
            patterns.shared_atoms(),
            subjects.shared_atoms(),
            wrapper.clone(),
            binds.clone(),
            ctx.clone(),
        );
        Outcome::from_matches(matches, || {
            MatchFailure::new("no grouping of the subject list matches")
        })
    }
}

/// Matcher for associative-commutative sequences.
#[derive(Debug, Clone, Copy, Default)]
pub struct ACMatcher;

impl ACMatcher {
    /// Matches `patterns` against every partition of `subjects` into
    /// `patterns.len()` non-empty blocks, lazily.
    ///
    /// Constant patterns are eliminated first. Permutations of the remaining
    /// subjects form the outer loop and groupings the inner one.
    pub fn try_match(
        patterns: &AtomSeq,
        subjects: &AtomSeq,
        wrapper: &GroupWrapper,
        binds: &Bindings,
        ctx: &MatchContext,
    ) -> Outcome {
        let (patterns, subjects) = match eliminate_constants(patterns, subjects) {
            Ok(remaining) => remaining,
            Err(failure) => return Outcome::Fail(failure),
        };
        let (k, n) = (patterns.len(), subjects.len());
        if k == 0 {
            return if n == 0 {
                Outcome::Match(binds.clone())
            } else {
                Outcome::fail(format!("{} subject elements left unmatched", n))
            };
        }
        if k > n {
            return Outcome::fail(format!(
                "{} patterns left for {} subject elements",
                k, n
            ));
        }
        if k == n {
            return Outcome::from_matches(permutation_matches(patterns, subjects, binds, ctx), || {
                MatchFailure::new("no permutation of the subject list matches")
            });
        }

        let patterns: Arc<[Atom]> = patterns.into();
        let subjects: Arc<[Atom]> = subjects.into();
        let wrapper = wrapper.clone();
        let binds = binds.clone();
        let ctx = ctx.clone();
        let matches = Permutations::new(n).flat_map(move |perm| {
            let permuted: Arc<[Atom]> = perm.iter().map(|&i| subjects[i].clone()).collect();
            grouping_matches(
                patterns.clone(),
                permuted,
                wrapper.clone(),
                binds.clone(),
                ctx.clone(),
            )
        });
        Outcome::from_matches(matches, || {
            MatchFailure::new("no arrangement of the subject list matches")
        })
    }
}

fn grouping_matches(
    patterns: Arc<[Atom]>,
    subjects: Arc<[Atom]>,
    wrapper: GroupWrapper,
    binds: Bindings,
    ctx: MatchContext,
) -> impl Iterator<Item = Bindings> + 'static {
    GroupingIterator::new(patterns.len(), subjects, wrapper).flat_map(move |grouping| {
        SequenceMatcher::try_match_shared(patterns.clone(), grouping.into(), &binds, &ctx)
            .into_iter()
            .inspect(|found| trace!("grouping matched: {}", found))
    })
}
