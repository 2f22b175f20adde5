//! Pattern matching over atoms.
//!
//! [`Atom::try_match`] is the single entry point; it dispatches on the atom
//! kind. Sequences pick a matcher from the subject's properties and the two
//! lengths:
//!
//! | subject | `k == n` | `k < n` |
//! |---|---|---|
//! | plain | [`SequenceMatcher`] | fail |
//! | commutative | [`CMatcher`] | fail |
//! | associative | [`SequenceMatcher`] | [`AMatcher`] |
//! | associative + commutative | [`CMatcher`] | [`ACMatcher`] |
//!
//! # Citations
//! - Huet, "Résolution d'équations dans des langages d'ordre 1, 2, ..., ω" (1976)
//! - Baader & Snyder, "Unification Theory", Handbook of Automated Reasoning (2001)

pub mod associative;
pub mod commutative;
pub mod grouping;
pub mod sequence;

pub use associative::{ACMatcher, AMatcher};
pub use commutative::{CMatcher, Permutations};
pub use grouping::{GroupWrapper, GroupingIterator};
pub use sequence::SequenceMatcher;

use crate::core::{Atom, AtomKind, Variable};
use crate::outcome::{Bindings, MatchContext, MatchFailure, Outcome};
use crate::sequence::AtomSeq;

impl Atom {
    /// Matches this pattern against `subject` under `binds`.
    pub fn try_match(&self, subject: &Atom, binds: &Bindings) -> Outcome {
        self.try_match_with(subject, binds, &MatchContext::default())
    }

    /// Like [`try_match`](Self::try_match), reporting to the context's
    /// observer.
    pub fn try_match_with(&self, subject: &Atom, binds: &Bindings, ctx: &MatchContext) -> Outcome {
        ctx.attempt(self, subject, binds);
        let outcome = self.match_dispatch(subject, binds, ctx);
        ctx.outcome(self, subject, &outcome);
        outcome
    }

    fn match_dispatch(&self, subject: &Atom, binds: &Bindings, ctx: &MatchContext) -> Outcome {
        if self.is_any() {
            return Outcome::Match(binds.clone());
        }
        if let Some(var) = self.as_variable() {
            return match_variable(self, var, subject, binds, ctx);
        }
        if self.is_constant() {
            if self == subject {
                return Outcome::Match(binds.clone());
            }
            if !self.is_structured() {
                return Outcome::fail_between("constant differs from subject", self, subject);
            }
        }
        if self.depth() > subject.depth() {
            return Outcome::fail_between("pattern is deeper than subject", self, subject);
        }

        let (pattern, subject_owned, ctx_owned) = (self.clone(), subject.clone(), ctx.clone());
        self.ty()
            .try_match_with(subject.ty(), binds, ctx)
            .map_fail(|failure| {
                MatchFailure::between("types do not match", self, subject).caused_by(failure)
            })
            .and_then(move |binds| match_structure(&pattern, &subject_owned, &binds, &ctx_owned))
    }
}

fn match_variable(
    pattern: &Atom,
    var: &Variable,
    subject: &Atom,
    binds: &Bindings,
    ctx: &MatchContext,
) -> Outcome {
    if var.is_bound() {
        return if pattern == subject {
            Outcome::Match(binds.clone())
        } else {
            Outcome::fail_between("bound variable matches only itself", pattern, subject)
        };
    }
    if pattern == subject {
        return match binds.get(var.name()) {
            Some(existing) if existing != subject => Outcome::Fail(MatchFailure::between(
                format!("${} is already bound to `{}`", var.name(), existing),
                pattern,
                subject,
            )),
            _ => Outcome::Match(binds.clone()),
        };
    }

    let (pattern_owned, var_owned, subject_owned) = (pattern.clone(), var.clone(), subject.clone());
    var.ty()
        .try_match_with(subject.ty(), binds, ctx)
        .map_fail(|failure| {
            MatchFailure::between("subject type is not accepted by variable", pattern, subject)
                .caused_by(failure)
        })
        .and_then(move |binds| bind_variable(&pattern_owned, &var_owned, &subject_owned, binds))
}

fn bind_variable(pattern: &Atom, var: &Variable, subject: &Atom, binds: Bindings) -> Outcome {
    if let Some(existing) = binds.get(var.name()) {
        return if existing == subject {
            Outcome::Match(binds)
        } else {
            Outcome::Fail(MatchFailure::between(
                format!("${} is already bound to `{}`", var.name(), existing),
                pattern,
                subject,
            ))
        };
    }
    let extended = binds.with(var.name(), subject.clone());
    let Some(guard) = var.guard() else {
        return Outcome::Match(extended);
    };
    match guard.rewrite(&extended) {
        Ok((verdict, _)) if verdict.as_bool() == Some(true) => Outcome::Match(extended),
        Ok((verdict, _)) => Outcome::Fail(MatchFailure::between(
            format!("guard reduced to `{}`", verdict),
            pattern,
            subject,
        )),
        Err(err) => Outcome::Fail(MatchFailure::between(
            format!("guard could not be evaluated: {}", err),
            pattern,
            subject,
        )),
    }
}

fn match_structure(pattern: &Atom, subject: &Atom, binds: &Bindings, ctx: &MatchContext) -> Outcome {
    match (pattern.kind(), subject.kind()) {
        (AtomKind::Seq(p), AtomKind::Seq(s)) => {
            p.try_match_under(s, &GroupWrapper::Seq(s.props().clone()), binds, ctx)
        }
        (AtomKind::Apply(p), AtomKind::Apply(s)) => {
            let (p_arg, s_op, s_arg, ctx_owned) =
                (p.arg().clone(), s.op().clone(), s.arg().clone(), ctx.clone());
            p.op()
                .try_match_with(s.op(), binds, ctx)
                .map_fail(|failure| {
                    MatchFailure::between("operators do not match", pattern, subject).caused_by(failure)
                })
                .and_then(move |binds| match_arguments(&p_arg, &s_op, &s_arg, &binds, &ctx_owned))
        }
        (AtomKind::Lambda { param: pp, body: pb }, AtomKind::Lambda { param: sp, body: sb }) => {
            SequenceMatcher::try_match(
                &[pp.clone(), pb.clone()],
                &[sp.clone(), sb.clone()],
                binds,
                ctx,
            )
        }
        (AtomKind::Prop(p), AtomKind::Prop(s)) => p.try_match(s, binds, ctx),
        _ => Outcome::fail_between("atom kinds differ", pattern, subject),
    }
}

fn match_arguments(
    pattern: &Atom,
    op: &Atom,
    subject: &Atom,
    binds: &Bindings,
    ctx: &MatchContext,
) -> Outcome {
    match (pattern.as_seq(), subject.as_seq()) {
        (Some(p), Some(s)) => {
            let wrapper = if op.as_operator().is_some() {
                GroupWrapper::Apply {
                    op: op.clone(),
                    props: s.props().clone(),
                }
            } else {
                GroupWrapper::Seq(s.props().clone())
            };
            p.try_match_under(s, &wrapper, binds, ctx)
        }
        _ => pattern.try_match_with(subject, binds, ctx),
    }
}

impl AtomSeq {
    /// Matches this pattern sequence against `subject`, wrapping
    /// multi-element runs with `wrapper` when grouping is needed.
    ///
    /// Properties are matched first; the matcher is then chosen from the
    /// subject's flags and the two lengths.
    pub fn try_match_under(
        &self,
        subject: &AtomSeq,
        wrapper: &GroupWrapper,
        binds: &Bindings,
        ctx: &MatchContext,
    ) -> Outcome {
        let (pattern, subject_owned, wrapper_owned, ctx_owned) =
            (self.clone(), subject.clone(), wrapper.clone(), ctx.clone());
        self.props()
            .try_match(subject.props(), binds, ctx)
            .map_fail(|failure| MatchFailure::new("sequence properties do not match").caused_by(failure))
            .and_then(move |binds| {
                pattern.match_elements(&subject_owned, &wrapper_owned, &binds, &ctx_owned)
            })
    }

    fn match_elements(
        &self,
        subject: &AtomSeq,
        wrapper: &GroupWrapper,
        binds: &Bindings,
        ctx: &MatchContext,
    ) -> Outcome {
        let (k, n) = (self.len(), subject.len());
        match (k == n, subject.is_associative(), subject.is_commutative()) {
            (true, _, true) => CMatcher::try_match(self, subject, binds, ctx),
            (true, _, false) => SequenceMatcher::try_match_shared(
                self.shared_atoms(),
                subject.shared_atoms(),
                binds,
                ctx,
            ),
            (false, true, true) if k < n => ACMatcher::try_match(self, subject, wrapper, binds, ctx),
            (false, true, false) if k < n => AMatcher::try_match(self, subject, wrapper, binds, ctx),
            _ => Outcome::fail(format!(
                "cannot match {} patterns against {} subjects",
                k, n
            )),
        }
    }
}
