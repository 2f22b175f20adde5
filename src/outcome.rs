//! Match outcomes, bindings and lazy match iterators.
//!
//! A match attempt never raises an error: it returns an [`Outcome`], which is
//! either a single binding set, a lazily enumerated stream of binding sets, or
//! a [`MatchFailure`] describing why the pattern was rejected. Enclosing
//! searches backtrack by pulling the next binding set from a stream, or by
//! abandoning it.
//!
//! # Citations
//! - Backtracking via lazy streams: Wadler, "How to replace failure by a list of successes" (1985)
//! - Persistent maps: Okasaki, "Purely Functional Data Structures", Chapter 2 (1999)

use crate::core::Atom;
use log::trace;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::iter;
use std::sync::Arc;

/// Persistent mapping from pattern-variable names to matched atoms.
///
/// Extending a binding set produces a new set and leaves the receiver
/// untouched, so a backtracking search can hold on to older sets freely.
///
/// # Invariant
/// - A name, once bound in a set, is never rebound in a set derived from it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bindings(Arc<BTreeMap<String, Atom>>);

impl Bindings {
    /// Creates an empty binding set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the atom bound to `name`, if any.
    #[inline]
    pub fn get(&self, name: &str) -> Option<&Atom> {
        self.0.get(name)
    }

    /// Returns whether `name` is bound.
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Returns a new binding set extended with `name -> atom`.
    pub fn with(&self, name: impl Into<String>, atom: Atom) -> Self {
        let mut map = BTreeMap::clone(&self.0);
        map.insert(name.into(), atom);
        Self(Arc::new(map))
    }

    /// Number of bound names.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether no name is bound.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the bindings in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Atom)> {
        self.0.iter().map(|(name, atom)| (name.as_str(), atom))
    }
}

impl<S: Into<String>> FromIterator<(S, Atom)> for Bindings {
    fn from_iter<I: IntoIterator<Item = (S, Atom)>>(iter: I) -> Self {
        Self(Arc::new(
            iter.into_iter().map(|(name, atom)| (name.into(), atom)).collect(),
        ))
    }
}

impl fmt::Display for Bindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{binds")?;
        for (i, (name, atom)) in self.iter().enumerate() {
            let sep = if i == 0 { " " } else { ", " };
            write!(f, "{}${} -> {}", sep, name, atom)?;
        }
        write!(f, "}}")
    }
}

/// Why a pattern did not match a subject.
///
/// Failures chain: a sequence matcher that fails at position `i` records the
/// index and keeps the element-level failure as its `prior`.
#[derive(Debug, Clone)]
pub struct MatchFailure {
    reason: Cow<'static, str>,
    pattern: Option<Atom>,
    subject: Option<Atom>,
    prior: Option<Box<MatchFailure>>,
    index: Option<usize>,
}

impl MatchFailure {
    /// Creates a failure with only a reason.
    pub fn new(reason: impl Into<Cow<'static, str>>) -> Self {
        Self {
            reason: reason.into(),
            pattern: None,
            subject: None,
            prior: None,
            index: None,
        }
    }

    /// Creates a failure naming the offending pattern/subject pair.
    pub fn between(reason: impl Into<Cow<'static, str>>, pattern: &Atom, subject: &Atom) -> Self {
        Self {
            pattern: Some(pattern.clone()),
            subject: Some(subject.clone()),
            ..Self::new(reason)
        }
    }

    /// Records the failing position.
    pub fn at_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// Chains the failure that caused this one.
    pub fn caused_by(mut self, prior: MatchFailure) -> Self {
        self.prior = Some(Box::new(prior));
        self
    }

    /// Human-readable reason for this level of the failure.
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Pattern involved, if recorded.
    pub fn pattern(&self) -> Option<&Atom> {
        self.pattern.as_ref()
    }

    /// Subject involved, if recorded.
    pub fn subject(&self) -> Option<&Atom> {
        self.subject.as_ref()
    }

    /// Failure one level down that caused this one.
    pub fn prior(&self) -> Option<&MatchFailure> {
        self.prior.as_deref()
    }

    /// Failing position, if the failure came from a positional match.
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// The innermost failure of the chain.
    pub fn root_cause(&self) -> &MatchFailure {
        let mut current = self;
        while let Some(prior) = current.prior() {
            current = prior;
        }
        current
    }
}

impl fmt::Display for MatchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reason)?;
        if let (Some(pattern), Some(subject)) = (&self.pattern, &self.subject) {
            write!(f, " (pattern `{}`, subject `{}`)", pattern, subject)?;
        }
        if let Some(index) = self.index {
            write!(f, " at index {}", index)?;
        }
        if let Some(prior) = &self.prior {
            write!(f, "; caused by: {}", prior)?;
        }
        Ok(())
    }
}

/// Lazy stream of binding sets.
///
/// Pulling the next item performs exactly the search needed to find the next
/// success. Dropping the iterator abandons the remaining search.
pub struct MatchIter(Box<dyn Iterator<Item = Bindings>>);

impl MatchIter {
    /// Wraps any iterator of binding sets.
    pub fn new<I>(iter: I) -> Self
    where
        I: Iterator<Item = Bindings> + 'static,
    {
        Self(Box::new(iter))
    }

    /// An iterator with no results.
    pub fn empty() -> Self {
        Self::new(iter::empty())
    }
}

impl Iterator for MatchIter {
    type Item = Bindings;

    #[inline]
    fn next(&mut self) -> Option<Bindings> {
        self.0.next()
    }
}

impl fmt::Debug for MatchIter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MatchIter(..)")
    }
}

/// Result of matching a pattern against a subject.
#[derive(Debug)]
pub enum Outcome {
    /// Exactly one way to match.
    Match(Bindings),
    /// At least one way to match; further alternatives are produced on demand.
    Many(MatchIter),
    /// No way to match.
    Fail(MatchFailure),
}

impl Outcome {
    /// Shorthand for a failure with only a reason.
    pub fn fail(reason: impl Into<Cow<'static, str>>) -> Self {
        Outcome::Fail(MatchFailure::new(reason))
    }

    /// Shorthand for a failure naming the pattern/subject pair.
    pub fn fail_between(
        reason: impl Into<Cow<'static, str>>,
        pattern: &Atom,
        subject: &Atom,
    ) -> Self {
        Outcome::Fail(MatchFailure::between(reason, pattern, subject))
    }

    /// Builds a `Many` from a lazy stream, or a `Fail` when the stream is empty.
    ///
    /// Only the first binding set is computed here; the rest stay lazy.
    pub fn from_matches<I, F>(iter: I, on_empty: F) -> Self
    where
        I: Iterator<Item = Bindings> + 'static,
        F: FnOnce() -> MatchFailure,
    {
        let mut iter = iter;
        match iter.next() {
            Some(first) => Outcome::Many(MatchIter::new(iter::once(first).chain(iter))),
            None => Outcome::Fail(on_empty()),
        }
    }

    #[inline]
    pub fn is_match(&self) -> bool {
        !self.is_fail()
    }

    #[inline]
    pub fn is_fail(&self) -> bool {
        matches!(self, Outcome::Fail(_))
    }

    /// The failure, if this outcome is one.
    pub fn failure(&self) -> Option<&MatchFailure> {
        match self {
            Outcome::Fail(failure) => Some(failure),
            _ => None,
        }
    }

    /// Monadic bind: continues every successful binding set with `f`.
    ///
    /// For `Many`, continuation happens lazily per pulled binding set, so the
    /// cross product of alternatives is never materialized.
    pub fn and_then<F>(self, f: F) -> Outcome
    where
        F: Fn(Bindings) -> Outcome + 'static,
    {
        match self {
            Outcome::Match(binds) => f(binds),
            Outcome::Fail(failure) => Outcome::Fail(failure),
            Outcome::Many(alternatives) => Outcome::from_matches(
                alternatives.flat_map(move |binds| f(binds).into_iter()),
                || MatchFailure::new("no alternative binding set could be continued"),
            ),
        }
    }

    /// Rewrites the failure, leaving successes untouched.
    pub fn map_fail<F>(self, f: F) -> Outcome
    where
        F: FnOnce(MatchFailure) -> MatchFailure,
    {
        match self {
            Outcome::Fail(failure) => Outcome::Fail(f(failure)),
            other => other,
        }
    }

    /// Returns the first binding set, or the failure.
    pub fn into_result(self) -> Result<Bindings, MatchFailure> {
        match self {
            Outcome::Match(binds) => Ok(binds),
            Outcome::Many(mut alternatives) => alternatives
                .next()
                .ok_or_else(|| MatchFailure::new("empty match stream")),
            Outcome::Fail(failure) => Err(failure),
        }
    }

    /// Returns the first binding set, if any.
    pub fn first(self) -> Option<Bindings> {
        self.into_result().ok()
    }
}

impl IntoIterator for Outcome {
    type Item = Bindings;
    type IntoIter = MatchIter;

    fn into_iter(self) -> MatchIter {
        match self {
            Outcome::Match(binds) => MatchIter::new(iter::once(binds)),
            Outcome::Many(alternatives) => alternatives,
            Outcome::Fail(_) => MatchIter::empty(),
        }
    }
}

/// Observer of individual match attempts.
///
/// Installed per call through [`MatchContext`]; there is no global switch.
pub trait MatchObserver {
    /// Called before `pattern` is tried against `subject`.
    fn attempt(&self, _pattern: &Atom, _subject: &Atom, _bindings: &Bindings) {}

    /// Called with the outcome of the attempt. For `Many`, only the first
    /// alternative has been computed at this point.
    fn outcome(&self, _pattern: &Atom, _subject: &Atom, _outcome: &Outcome) {}
}

/// Observer that forwards every attempt to `log::trace!`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl MatchObserver for LogObserver {
    fn attempt(&self, pattern: &Atom, subject: &Atom, bindings: &Bindings) {
        trace!("try `{}` against `{}` under {}", pattern, subject, bindings);
    }

    fn outcome(&self, pattern: &Atom, subject: &Atom, outcome: &Outcome) {
        match outcome {
            Outcome::Match(binds) => trace!("`{}` matched `{}`: {}", pattern, subject, binds),
            Outcome::Many(_) => trace!("`{}` matched `{}` in several ways", pattern, subject),
            Outcome::Fail(failure) => trace!("`{}` rejected `{}`: {}", pattern, subject, failure),
        }
    }
}

/// Per-call matching configuration.
#[derive(Clone, Default)]
pub struct MatchContext {
    observer: Option<Arc<dyn MatchObserver + Send + Sync>>,
}

impl MatchContext {
    /// A context without an observer.
    pub fn new() -> Self {
        Self::default()
    }

    /// A context reporting every attempt to `observer`.
    pub fn with_observer(observer: Arc<dyn MatchObserver + Send + Sync>) -> Self {
        Self {
            observer: Some(observer),
        }
    }

    #[inline]
    pub(crate) fn attempt(&self, pattern: &Atom, subject: &Atom, bindings: &Bindings) {
        if let Some(observer) = &self.observer {
            observer.attempt(pattern, subject, bindings);
        }
    }

    #[inline]
    pub(crate) fn outcome(&self, pattern: &Atom, subject: &Atom, outcome: &Outcome) {
        if let Some(observer) = &self.observer {
            observer.outcome(pattern, subject, outcome);
        }
    }
}

impl fmt::Debug for MatchContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchContext")
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binds(pairs: &[(&str, i64)]) -> Bindings {
        pairs
            .iter()
            .map(|(name, value)| (*name, Atom::integer(*value)))
            .collect()
    }

    #[test]
    fn bindings_extension_is_persistent() {
        let empty = Bindings::new();
        let one = empty.with("x", Atom::integer(1));
        let two = one.with("y", Atom::integer(2));
        assert!(empty.is_empty());
        assert_eq!(one.len(), 1);
        assert!(!one.contains("y"));
        assert_eq!(two.get("x"), Some(&Atom::integer(1)));
        assert_eq!(two.get("y"), Some(&Atom::integer(2)));
    }

    #[test]
    fn from_matches_on_empty_stream_fails() {
        let outcome = Outcome::from_matches(iter::empty(), || MatchFailure::new("nothing"));
        assert_eq!(outcome.failure().map(|f| f.reason()), Some("nothing"));
    }

    #[test]
    fn and_then_flattens_many_lazily() {
        let alternatives = vec![binds(&[("x", 1)]), binds(&[("x", 2)]), binds(&[("x", 3)])];
        let outcome = Outcome::from_matches(alternatives.into_iter(), || MatchFailure::new("none"));
        let continued = outcome.and_then(|b| {
            if b.get("x") == Some(&Atom::integer(2)) {
                Outcome::fail("two is rejected")
            } else {
                Outcome::Match(b.with("y", Atom::integer(0)))
            }
        });
        let results: Vec<Bindings> = continued.into_iter().collect();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|b| b.contains("y")));
    }

    #[test]
    fn and_then_on_fail_keeps_failure() {
        let outcome = Outcome::fail("original").and_then(|b| Outcome::Match(b));
        assert_eq!(outcome.failure().map(|f| f.reason()), Some("original"));
    }

    #[test]
    fn failure_display_includes_chain_and_index() {
        let inner = MatchFailure::new("inner reason");
        let outer = MatchFailure::new("outer reason").at_index(3).caused_by(inner);
        let text = outer.to_string();
        assert!(text.contains("outer reason"));
        assert!(text.contains("at index 3"));
        assert!(text.contains("caused by: inner reason"));
        assert_eq!(outer.root_cause().reason(), "inner reason");
    }

    #[test]
    fn into_result_takes_first_alternative() {
        let alternatives = vec![binds(&[("x", 1)]), binds(&[("x", 2)])];
        let outcome = Outcome::from_matches(alternatives.into_iter(), || MatchFailure::new("none"));
        assert_eq!(outcome.into_result().unwrap(), binds(&[("x", 1)]));
    }
}
