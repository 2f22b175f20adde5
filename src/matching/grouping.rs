//! Enumeration of contiguous groupings for associative matching.
//!
//! Matching `k` patterns against `n > k` subjects under associativity means
//! trying every way to cut the subject list into `k` contiguous non-empty
//! runs. A grouping is described by `k - 1` strictly increasing markers over
//! `[0, n - 2]`, marker `m` meaning "a run ends after subject `m`". Markers
//! are enumerated in lexicographic order, `C(n - 1, k - 1)` in total.

use crate::core::Atom;
use crate::outcome::Bindings;
use crate::props::AlgProp;
use crate::sequence::AtomSeq;
use std::sync::Arc;

/// How a run of more than one subject is turned back into a single atom.
#[derive(Debug, Clone)]
pub enum GroupWrapper {
    /// A sequence carrying the subject's properties.
    Seq(AlgProp),
    /// A structural application of the subject's operator.
    Apply { op: Atom, props: AlgProp },
}

impl GroupWrapper {
    /// Wraps a run. A run of one is the bare element. Native handlers are
    /// never invoked.
    pub fn wrap(&self, group: &[Atom]) -> Atom {
        if let [single] = group {
            return single.clone();
        }
        match self {
            GroupWrapper::Seq(props) => Atom::seq(AtomSeq::new(props.clone(), group.to_vec())),
            GroupWrapper::Apply { op, props } => Atom::apply_as_is(
                op.clone(),
                Atom::seq(AtomSeq::new(props.clone(), group.to_vec())),
                Bindings::new(),
            ),
        }
    }
}

/// Lazy iterator over the groupings of a subject list into `k` runs.
///
/// Empty when `k == 0` or `k >= n`.
#[derive(Debug, Clone)]
pub struct GroupingIterator {
    subjects: Arc<[Atom]>,
    wrapper: GroupWrapper,
    markers: Vec<usize>,
    done: bool,
}

impl GroupingIterator {
    /// Groupings of `subjects` into `k` runs, wrapped with `wrapper`.
    pub fn new(k: usize, subjects: Arc<[Atom]>, wrapper: GroupWrapper) -> Self {
        let n = subjects.len();
        Self {
            done: k == 0 || k >= n,
            markers: (0..k.saturating_sub(1)).collect(),
            subjects,
            wrapper,
        }
    }

    /// Current marker positions.
    pub fn markers(&self) -> &[usize] {
        &self.markers
    }

    fn current(&self) -> Vec<Atom> {
        let mut grouping = Vec::with_capacity(self.markers.len() + 1);
        let mut start = 0;
        for &end in &self.markers {
            grouping.push(self.wrapper.wrap(&self.subjects[start..=end]));
            start = end + 1;
        }
        grouping.push(self.wrapper.wrap(&self.subjects[start..]));
        grouping
    }

    /// Moves the markers to their lexicographic successor.
    fn advance(&mut self) {
        let n = self.subjects.len();
        let k1 = self.markers.len();
        // marker i may go up to n - 2 - (k1 - 1 - i)
        let Some(i) = (0..k1).rev().find(|&i| self.markers[i] < n - 1 - k1 + i) else {
            self.done = true;
            return;
        };
        self.markers[i] += 1;
        for j in i + 1..k1 {
            self.markers[j] = self.markers[j - 1] + 1;
        }
    }
}

impl Iterator for GroupingIterator {
    type Item = Vec<Atom>;

    fn next(&mut self) -> Option<Vec<Atom>> {
        if self.done {
            return None;
        }
        let grouping = self.current();
        self.advance();
        Some(grouping)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[i64]) -> Arc<[Atom]> {
        values.iter().copied().map(Atom::integer).collect()
    }

    fn plain() -> GroupWrapper {
        GroupWrapper::Seq(AlgProp::none())
    }

    fn binomial(n: usize, k: usize) -> usize {
        (0..k).fold(1, |acc, i| acc * (n - i) / (i + 1))
    }

    #[test]
    fn three_runs_of_four() {
        let groupings: Vec<Vec<Atom>> = GroupingIterator::new(3, ints(&[1, 2, 3, 4]), plain()).collect();
        let rendered: Vec<String> = groupings
            .iter()
            .map(|g| g.iter().map(Atom::to_string).collect::<Vec<_>>().join(" | "))
            .collect();
        assert_eq!(
            rendered,
            vec!["1 | 2 | %(3, 4)", "1 | %(2, 3) | 4", "%(1, 2) | 3 | 4"]
        );
    }

    #[test]
    fn counts_match_binomial() {
        for n in 2..8 {
            for k in 1..n {
                let subjects: Arc<[Atom]> = (0..n as i64).map(Atom::integer).collect();
                let count = GroupingIterator::new(k, subjects, plain()).count();
                assert_eq!(count, binomial(n - 1, k - 1), "n = {}, k = {}", n, k);
            }
        }
    }

    #[test]
    fn every_grouping_is_an_ordered_partition() {
        let subjects = ints(&[1, 2, 3, 4, 5]);
        for grouping in GroupingIterator::new(3, subjects.clone(), plain()) {
            assert_eq!(grouping.len(), 3);
            let flat: Vec<Atom> = grouping
                .iter()
                .flat_map(|atom| match atom.as_seq() {
                    Some(seq) => seq.atoms().to_vec(),
                    None => vec![atom.clone()],
                })
                .collect();
            assert_eq!(flat.as_slice(), &*subjects);
        }
    }

    #[test]
    fn degenerate_arities_are_empty() {
        assert_eq!(GroupingIterator::new(0, ints(&[1, 2]), plain()).count(), 0);
        assert_eq!(GroupingIterator::new(2, ints(&[1, 2]), plain()).count(), 0);
        assert_eq!(GroupingIterator::new(3, ints(&[1, 2]), plain()).count(), 0);
    }

    #[test]
    fn single_run_wraps_everything() {
        let groupings: Vec<Vec<Atom>> = GroupingIterator::new(1, ints(&[1, 2, 3]), plain()).collect();
        assert_eq!(groupings.len(), 1);
        assert_eq!(groupings[0][0].to_string(), "%(1, 2, 3)");
    }
}
