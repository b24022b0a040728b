// outcome.rs - Result of a match attempt: overall span plus capture spans.
//
// Built from a MatchState once the entry node has succeeded; the state
// itself can then be discarded or reused for the next attempt.

use std::ops::Range;

use smallvec::SmallVec;

use crate::state::MatchState;

/// Outcome of [`run`](crate::exec::run) or [`search`](crate::exec::search).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome<'t> {
    Matched(Captures<'t>),
    NoMatch,
}

impl<'t> MatchOutcome<'t> {
    pub fn is_match(&self) -> bool {
        matches!(self, MatchOutcome::Matched(_))
    }

    pub fn captures(&self) -> Option<&Captures<'t>> {
        match self {
            MatchOutcome::Matched(caps) => Some(caps),
            MatchOutcome::NoMatch => None,
        }
    }

    pub fn into_captures(self) -> Option<Captures<'t>> {
        match self {
            MatchOutcome::Matched(caps) => Some(caps),
            MatchOutcome::NoMatch => None,
        }
    }

    /// The overall match (group 0), if any.
    pub fn get_match(&self) -> Option<Match<'t>> {
        self.captures().and_then(|c| c.get(0))
    }
}

// === Match ===

/// A single matched span referencing the original text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match<'t> {
    text: &'t str,
    start: usize,
    end: usize,
}

impl<'t> Match<'t> {
    /// Byte offset of the start of the match.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Byte offset of the end of the match (exclusive).
    pub fn end(&self) -> usize {
        self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn as_str(&self) -> &'t str {
        &self.text[self.start..self.end]
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

// === Captures ===

/// All capture groups of a successful match.
///
/// Group 0 is the entire match. Groups that never participated are `None`.
#[derive(Clone, PartialEq, Eq)]
pub struct Captures<'t> {
    text: &'t str,
    spans: SmallVec<[Option<(usize, usize)>; 8]>,
}

impl<'t> Captures<'t> {
    pub(crate) fn from_state(text: &'t str, state: &MatchState) -> Self {
        Captures {
            text,
            spans: (0..state.groups_len()).map(|i| state.group(i)).collect(),
        }
    }

    /// Get capture group `i`, or `None` if it did not participate.
    pub fn get(&self, i: usize) -> Option<Match<'t>> {
        let (start, end) = (*self.spans.get(i)?)?;
        Some(Match {
            text: self.text,
            start,
            end,
        })
    }

    /// Start of the overall match.
    pub fn start(&self) -> usize {
        self.spans[0].map_or(0, |(s, _)| s)
    }

    /// End of the overall match.
    pub fn end(&self) -> usize {
        self.spans[0].map_or(0, |(_, e)| e)
    }

    pub fn range(&self) -> Range<usize> {
        self.start()..self.end()
    }

    /// Number of groups, group 0 included.
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn iter(&self) -> CapturesIter<'_, 't> {
        CapturesIter {
            captures: self,
            index: 0,
        }
    }
}

impl std::fmt::Debug for Captures<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut list = f.debug_list();
        for i in 0..self.len() {
            list.entry(&self.get(i).map(|m| m.range()));
        }
        list.finish()
    }
}

// === CapturesIter ===

/// Iterator over the groups of a [`Captures`].
pub struct CapturesIter<'c, 't> {
    captures: &'c Captures<'t>,
    index: usize,
}

impl<'c, 't> Iterator for CapturesIter<'c, 't> {
    type Item = Option<Match<'t>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.captures.len() {
            return None;
        }
        let m = self.captures.get(self.index);
        self.index += 1;
        Some(m)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.captures.len() - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for CapturesIter<'_, '_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    fn caps(text: &str) -> Captures<'_> {
        Captures {
            text,
            spans: smallvec![Some((2, 5)), Some((2, 3)), None],
        }
    }

    #[test]
    fn match_accessors() {
        let c = caps("xxabcxx");
        let m = c.get(0).unwrap();
        assert_eq!(m.as_str(), "abc");
        assert_eq!(m.range(), 2..5);
        assert_eq!(m.len(), 3);
        assert!(!m.is_empty());
        assert_eq!(c.range(), 2..5);
    }

    #[test]
    fn unset_and_out_of_range_groups() {
        let c = caps("xxabcxx");
        assert!(c.get(2).is_none());
        assert!(c.get(9).is_none());
        assert_eq!(c.len(), 3);
    }

    #[test]
    fn iterates_all_groups() {
        let c = caps("xxabcxx");
        let items: Vec<_> = c.iter().map(|m| m.map(|m| m.as_str())).collect();
        assert_eq!(items, vec![Some("abc"), Some("a"), None]);
        assert_eq!(c.iter().len(), 3);
        assert_eq!(format!("{:?}", c), "[Some(2..5), Some(2..3), None]");
    }

    #[test]
    fn outcome_helpers() {
        let hit = MatchOutcome::Matched(caps("xxabcxx"));
        assert!(hit.is_match());
        assert_eq!(hit.get_match().unwrap().as_str(), "abc");
        assert!(hit.into_captures().is_some());
        assert!(!MatchOutcome::NoMatch.is_match());
        assert!(MatchOutcome::NoMatch.get_match().is_none());
    }
}
