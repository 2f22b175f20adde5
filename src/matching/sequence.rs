//! Ordered positional matching.

use crate::core::Atom;
use crate::outcome::{Bindings, MatchContext, MatchFailure, Outcome};
use std::sync::Arc;

/// Matches patterns against subjects position by position.
///
/// The head position is matched under the current bindings and the tail is
/// matched under every binding set the head yields, lazily. Every richer
/// matcher reduces its trials to this one.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequenceMatcher;

impl SequenceMatcher {
    /// Matches `patterns[i]` against `subjects[i]` for every `i`.
    ///
    /// Lists of unequal length fail immediately.
    pub fn try_match(
        patterns: &[Atom],
        subjects: &[Atom],
        binds: &Bindings,
        ctx: &MatchContext,
    ) -> Outcome {
        if patterns.len() != subjects.len() {
            return length_mismatch(patterns.len(), subjects.len());
        }
        Self::try_match_shared(Arc::from(patterns), Arc::from(subjects), binds, ctx)
    }

    /// Same as [`try_match`](Self::try_match) over shared slices, avoiding a
    /// copy when the caller already holds them.
    pub fn try_match_shared(
        patterns: Arc<[Atom]>,
        subjects: Arc<[Atom]>,
        binds: &Bindings,
        ctx: &MatchContext,
    ) -> Outcome {
        if patterns.len() != subjects.len() {
            return length_mismatch(patterns.len(), subjects.len());
        }
        match_from(patterns, subjects, 0, binds.clone(), ctx.clone())
    }
}

fn length_mismatch(patterns: usize, subjects: usize) -> Outcome {
    Outcome::fail(format!(
        "cannot match {} patterns against {} subjects",
        patterns, subjects
    ))
}

fn match_from(
    patterns: Arc<[Atom]>,
    subjects: Arc<[Atom]>,
    index: usize,
    binds: Bindings,
    ctx: MatchContext,
) -> Outcome {
    if index == patterns.len() {
        return Outcome::Match(binds);
    }
    let pattern = &patterns[index];
    let subject = &subjects[index];
    let head = pattern.try_match_with(subject, &binds, &ctx).map_fail(|failure| {
        MatchFailure::between("elements do not match", pattern, subject)
            .at_index(index)
            .caused_by(failure)
    });
    head.and_then(move |binds| {
        match_from(
            patterns.clone(),
            subjects.clone(),
            index + 1,
            binds,
            ctx.clone(),
        )
    })
}
