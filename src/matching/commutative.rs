//! Commutative matching.
//!
//! Constants are eliminated first through the constant pools of both sides;
//! what remains is matched against every permutation of the remaining
//! subjects, lazily, in lexicographic order of subject indices starting with
//! the identity permutation.
//!
//! # Citations
//! - Knuth, "The Art of Computer Programming", Vol. 4A, Algorithm 7.2.1.2L (2011)
//! - Eker, "Associative-commutative matching via bipartite graph matching", Computer Journal (1995)

use crate::core::Atom;
use crate::matching::SequenceMatcher;
use crate::outcome::{Bindings, MatchContext, MatchFailure, Outcome};
use crate::sequence::AtomSeq;
use log::trace;
use std::sync::Arc;

/// Lexicographic permutations of `0..n`, identity first.
///
/// `n = 0` yields the single empty permutation.
#[derive(Debug, Clone)]
pub struct Permutations {
    indices: Vec<usize>,
    started: bool,
    done: bool,
}

impl Permutations {
    /// Permutations of `0..n`.
    pub fn new(n: usize) -> Self {
        Self {
            indices: (0..n).collect(),
            started: false,
            done: false,
        }
    }
}

impl Iterator for Permutations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        if self.done {
            return None;
        }
        if !self.started {
            self.started = true;
            return Some(self.indices.clone());
        }
        if next_permutation(&mut self.indices) {
            Some(self.indices.clone())
        } else {
            self.done = true;
            None
        }
    }
}

/// Advances `v` to its lexicographic successor; false when `v` is the last.
fn next_permutation(v: &mut [usize]) -> bool {
    if v.len() < 2 {
        return false;
    }
    let mut i = v.len() - 1;
    while i > 0 && v[i - 1] >= v[i] {
        i -= 1;
    }
    if i == 0 {
        return false;
    }
    let pivot = i - 1;
    let mut j = v.len() - 1;
    while v[j] <= v[pivot] {
        j -= 1;
    }
    v.swap(pivot, j);
    v[i..].reverse();
    true
}

/// Matcher for sequences whose order does not matter.
#[derive(Debug, Clone, Copy, Default)]
pub struct CMatcher;

impl CMatcher {
    /// Matches equal-length sequences up to reordering of the subject.
    pub fn try_match(
        patterns: &AtomSeq,
        subjects: &AtomSeq,
        binds: &Bindings,
        ctx: &MatchContext,
    ) -> Outcome {
        if patterns.len() != subjects.len() {
            return Outcome::fail(format!(
                "commutative match needs equal lengths, got {} patterns and {} subjects",
                patterns.len(),
                subjects.len()
            ));
        }
        let (patterns, subjects) = match eliminate_constants(patterns, subjects) {
            Ok(remaining) => remaining,
            Err(failure) => return Outcome::Fail(failure),
        };
        Outcome::from_matches(permutation_matches(patterns, subjects, binds, ctx), || {
            MatchFailure::new("no permutation of the subject list matches")
        })
    }
}

/// Removes, for every constant pattern, one structurally equal subject.
///
/// Returns the remaining patterns and subjects in their original order. A
/// constant pattern without an equal subject fails, unless it is a sequence
/// or application, which may still match structurally and is kept.
pub(crate) fn eliminate_constants(
    patterns: &AtomSeq,
    subjects: &AtomSeq,
) -> Result<(Vec<Atom>, Vec<Atom>), MatchFailure> {
    let mut pattern_taken = vec![false; patterns.len()];
    let mut subject_taken = vec![false; subjects.len()];
    let subject_pool = subjects.constant_pool();

    for (fingerprint, positions) in patterns.constant_pool() {
        let mut candidates = subject_pool
            .get(fingerprint)
            .map(|c| c.as_slice())
            .unwrap_or(&[])
            .iter()
            .copied();
        for &p in positions {
            let pattern = &patterns.atoms()[p];
            let found = candidates.find(|&s| !subject_taken[s] && subjects.atoms()[s] == *pattern);
            match found {
                Some(s) => {
                    pattern_taken[p] = true;
                    subject_taken[s] = true;
                }
                None if pattern.is_structured() => {}
                None => {
                    trace!("constant `{}` not found in `{}`", pattern, subjects);
                    return Err(MatchFailure::between(
                        "element not found in subject list",
                        pattern,
                        &Atom::seq(subjects.clone()),
                    ));
                }
            }
        }
    }

    let remaining_patterns = patterns
        .iter()
        .zip(&pattern_taken)
        .filter(|(_, &taken)| !taken)
        .map(|(atom, _)| atom.clone())
        .collect();
    let remaining_subjects = subjects
        .iter()
        .zip(&subject_taken)
        .filter(|(_, &taken)| !taken)
        .map(|(atom, _)| atom.clone())
        .collect();
    Ok((remaining_patterns, remaining_subjects))
}

/// Lazily matches `patterns` against every permutation of `subjects`.
pub(crate) fn permutation_matches(
    patterns: Vec<Atom>,
    subjects: Vec<Atom>,
    binds: &Bindings,
    ctx: &MatchContext,
) -> impl Iterator<Item = Bindings> + 'static {
    let patterns: Arc<[Atom]> = patterns.into();
    let subjects: Arc<[Atom]> = subjects.into();
    let binds = binds.clone();
    let ctx = ctx.clone();
    Permutations::new(subjects.len()).flat_map(move |perm| {
        let permuted: Arc<[Atom]> = perm.iter().map(|&i| subjects[i].clone()).collect();
        SequenceMatcher::try_match_shared(patterns.clone(), permuted, &binds, &ctx)
            .into_iter()
            .inspect(move |found| trace!("permutation {:?} matched: {}", perm, found))
    })
}
