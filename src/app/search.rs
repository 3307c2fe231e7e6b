//! In-page search over the rendered output.
//!
//! The rendered output is a flat ordered sequence of styled token pieces;
//! search treats those pieces as segments with cumulative byte offsets,
//! matches the escaped term case-insensitively against the concatenated
//! text, and resolves match boundaries back to (segment, local offset)
//! pairs. The match set is rebuilt on every term change or re-render and
//! never persisted.

use regex_lite::Regex;

use super::error::{AppError, Result};

/// One styled token piece of the rendered output, addressed by its byte
/// offset into the concatenated text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub start: usize,
    pub len: usize,
}

impl Segment {
    pub fn end(self) -> usize {
        self.start + self.len
    }
}

/// Byte range of one match in the concatenated text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchRange {
    pub start: usize,
    pub end: usize,
}

/// A match boundary resolved to a concrete segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentPos {
    pub segment: usize,
    pub offset: usize,
}

/// Find every occurrence of `term` in `text`. The term is matched literally
/// (regex metacharacters escaped) and case-insensitively.
pub fn find_matches(text: &str, term: &str) -> Result<Vec<MatchRange>> {
    let pattern = format!("(?i){}", regex_lite::escape(term));
    let regex = Regex::new(&pattern).map_err(|e| AppError::Search(e.to_string()))?;
    Ok(regex
        .find_iter(text)
        .map(|m| MatchRange {
            start: m.start(),
            end: m.end(),
        })
        .collect())
}

/// Resolve a match to its start and end segments.
///
/// Start offsets are inclusive (`seg.start <= off < seg.end()`); end offsets
/// belong to the segment whose exclusive upper bound contains them
/// (`seg.start < off <= seg.end()`). A boundary falling exactly between two
/// segments therefore resolves the match start to the later segment and the
/// match end to the earlier one.
pub fn resolve_bounds(segments: &[Segment], m: MatchRange) -> Option<(SegmentPos, SegmentPos)> {
    let start_idx = segments
        .iter()
        .position(|s| m.start >= s.start && m.start < s.end())?;
    let end_idx = segments
        .iter()
        .position(|s| m.end > s.start && m.end <= s.end())?;
    Some((
        SegmentPos {
            segment: start_idx,
            offset: m.start - segments[start_idx].start,
        },
        SegmentPos {
            segment: end_idx,
            offset: m.end - segments[end_idx].start,
        },
    ))
}

/// Ordered match set plus the currently active match.
#[derive(Debug, Default)]
pub struct SearchState {
    pub matches: Vec<MatchRange>,
    pub active: Option<usize>,
}

impl SearchState {
    /// Run a search pass. An empty term yields the cleared state; a
    /// non-empty term with matches activates the first one.
    pub fn build(text: &str, term: &str) -> Result<SearchState> {
        if term.is_empty() {
            return Ok(SearchState::default());
        }
        let matches = find_matches(text, term)?;
        let active = if matches.is_empty() { None } else { Some(0) };
        Ok(SearchState { matches, active })
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn active_range(&self) -> Option<MatchRange> {
        self.active.and_then(|i| self.matches.get(i).copied())
    }

    /// Advance to the next match, wrapping past the last one.
    pub fn next(&mut self) {
        self.step(1);
    }

    /// Step back to the previous match, wrapping past the first one.
    pub fn prev(&mut self) {
        self.step(-1);
    }

    fn step(&mut self, delta: isize) {
        let len = self.matches.len();
        if len == 0 {
            return;
        }
        let current = self.active.unwrap_or(0) as isize;
        self.active = Some((current + delta).rem_euclid(len as isize) as usize);
    }

    /// Label for the match counter. "0/0" is the zero-match terminal state,
    /// shown rather than hidden.
    pub fn counter_label(&self) -> String {
        match self.active {
            Some(i) => format!("{}/{}", i + 1, self.matches.len()),
            None => "0/0".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segments_of(lens: &[usize]) -> Vec<Segment> {
        let mut out = Vec::new();
        let mut start = 0;
        for &len in lens {
            out.push(Segment { start, len });
            start += len;
        }
        out
    }

    #[test]
    fn test_find_matches_case_insensitive() {
        let matches = find_matches("Foo foo FOO", "foo").unwrap();
        assert_eq!(
            matches,
            vec![
                MatchRange { start: 0, end: 3 },
                MatchRange { start: 4, end: 7 },
                MatchRange { start: 8, end: 11 },
            ]
        );
    }

    #[test]
    fn test_find_matches_escapes_metacharacters() {
        let matches = find_matches("a.b axb a.b", "a.b").unwrap();
        assert_eq!(
            matches,
            vec![MatchRange { start: 0, end: 3 }, MatchRange { start: 8, end: 11 }]
        );

        let matches = find_matches("x(1) y(2)", "(1)").unwrap();
        assert_eq!(matches, vec![MatchRange { start: 1, end: 4 }]);
    }

    #[test]
    fn test_zero_matches_is_terminal_state() {
        let state = SearchState::build("fn main() {}", "zebra").unwrap();
        assert!(state.is_empty());
        assert_eq!(state.active, None);
        assert_eq!(state.counter_label(), "0/0");
    }

    #[test]
    fn test_empty_term_clears() {
        let state = SearchState::build("anything", "").unwrap();
        assert!(state.is_empty());
        assert_eq!(state.active_range(), None);
    }

    #[test]
    fn test_first_match_activated() {
        let state = SearchState::build("ab ab ab", "ab").unwrap();
        assert_eq!(state.matches.len(), 3);
        assert_eq!(state.active, Some(0));
        assert_eq!(state.counter_label(), "1/3");
    }

    #[test]
    fn test_navigation_wraps_circularly() {
        let mut state = SearchState::build("ab ab ab", "ab").unwrap();

        state.next();
        state.next();
        assert_eq!(state.active, Some(2));
        state.next();
        assert_eq!(state.active, Some(0), "next wraps N-1 -> 0");

        state.prev();
        assert_eq!(state.active, Some(2), "prev wraps 0 -> N-1");
        state.prev();
        assert_eq!(state.active, Some(1));
    }

    #[test]
    fn test_navigation_on_empty_set_is_noop() {
        let mut state = SearchState::default();
        state.next();
        state.prev();
        assert_eq!(state.active, None);
    }

    #[test]
    fn test_resolve_bounds_within_one_segment() {
        let segments = segments_of(&[4, 4, 4]);
        let (start, end) =
            resolve_bounds(&segments, MatchRange { start: 5, end: 7 }).unwrap();
        assert_eq!(start, SegmentPos { segment: 1, offset: 1 });
        assert_eq!(end, SegmentPos { segment: 1, offset: 3 });
    }

    #[test]
    fn test_resolve_bounds_boundary_between_segments() {
        // Offset 4 is the exclusive end of segment 0 and the inclusive start
        // of segment 1: as a match START it resolves to segment 1, as a
        // match END it resolves to segment 0.
        let segments = segments_of(&[4, 4]);
        let (start, end) =
            resolve_bounds(&segments, MatchRange { start: 4, end: 6 }).unwrap();
        assert_eq!(start, SegmentPos { segment: 1, offset: 0 });
        assert_eq!(end.segment, 1);

        let (start, end) =
            resolve_bounds(&segments, MatchRange { start: 2, end: 4 }).unwrap();
        assert_eq!(start, SegmentPos { segment: 0, offset: 2 });
        assert_eq!(end, SegmentPos { segment: 0, offset: 4 });
    }

    #[test]
    fn test_resolve_bounds_spanning_segments() {
        let segments = segments_of(&[4, 4, 4]);
        let (start, end) =
            resolve_bounds(&segments, MatchRange { start: 2, end: 10 }).unwrap();
        assert_eq!(start, SegmentPos { segment: 0, offset: 2 });
        assert_eq!(end, SegmentPos { segment: 2, offset: 2 });
    }

    #[test]
    fn test_resolve_bounds_outside_segments() {
        let segments = segments_of(&[4]);
        assert_eq!(resolve_bounds(&segments, MatchRange { start: 4, end: 6 }), None);
        assert_eq!(resolve_bounds(&[], MatchRange { start: 0, end: 1 }), None);
    }
}
