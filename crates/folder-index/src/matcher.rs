//! Segment-wise folder path matching for the folder picker.

use crate::path::PATH_SEPARATOR;
use crate::record::FolderRecord;

// ---------------------------------------------------------------------------
// Segment matching types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentMatchKind {
    Substr,
    Exact,
}

/// Case-insensitive matcher for one path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentMatcher {
    kind: SegmentMatchKind,
    value: String,
}

impl SegmentMatcher {
    pub fn new(kind: SegmentMatchKind, value: &str) -> Self {
        Self {
            kind,
            value: value.to_lowercase(),
        }
    }

    pub fn kind(&self) -> SegmentMatchKind {
        self.kind
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// `candidate` must already be lowercased.
    pub fn matches(&self, candidate: &str) -> bool {
        match self.kind {
            SegmentMatchKind::Substr => candidate.contains(self.value.as_str()),
            SegmentMatchKind::Exact => candidate == self.value,
        }
    }
}

// ---------------------------------------------------------------------------
// Path query
// ---------------------------------------------------------------------------

/// A parsed picker query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathQuery {
    /// Empty query, or nothing but separators.
    All,
    /// A single word without any separator: matches any segment.
    AnySegment(SegmentMatcher),
    /// Leading segments exact, last segment substring, anchored at the root.
    Positional(Vec<SegmentMatcher>),
}

impl PathQuery {
    pub fn parse(raw: &str) -> Self {
        let parts: Vec<&str> = split_segments(raw).collect();
        if parts.is_empty() {
            return PathQuery::All;
        }

        if parts.len() == 1 && !raw.contains(PATH_SEPARATOR) {
            return PathQuery::AnySegment(SegmentMatcher::new(SegmentMatchKind::Substr, parts[0]));
        }

        let last = parts.len() - 1;
        PathQuery::Positional(
            parts
                .into_iter()
                .enumerate()
                .map(|(index, part)| {
                    let kind = if index == last {
                        SegmentMatchKind::Substr
                    } else {
                        SegmentMatchKind::Exact
                    };
                    SegmentMatcher::new(kind, part)
                })
                .collect(),
        )
    }

    pub fn matches(&self, path: &str) -> bool {
        let lowered = path.to_lowercase();
        let segments: Vec<&str> = split_segments(&lowered).collect();
        match self {
            PathQuery::All => true,
            PathQuery::AnySegment(matcher) => {
                segments.iter().any(|segment| matcher.matches(segment))
            }
            PathQuery::Positional(matchers) => {
                segments.len() >= matchers.len()
                    && matchers
                        .iter()
                        .zip(&segments)
                        .all(|(matcher, segment)| matcher.matches(segment))
            }
        }
    }
}

/// Filters `records` by `query`, keeping their original order.
pub fn match_folders<'a>(query: &str, records: &'a [FolderRecord]) -> Vec<&'a FolderRecord> {
    let query = PathQuery::parse(query);
    if query == PathQuery::All {
        return records.iter().collect();
    }
    records
        .iter()
        .filter(|record| query.matches(&record.path))
        .collect()
}

pub(crate) fn split_segments(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(PATH_SEPARATOR).filter(|segment| !segment.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, path: &str) -> FolderRecord {
        FolderRecord {
            id: id.to_string(),
            title: path.rsplit('/').next().unwrap_or(path).to_string(),
            path: path.to_string(),
        }
    }

    fn paths<'a>(matches: &[&'a FolderRecord]) -> Vec<&'a str> {
        matches.iter().map(|r| r.path.as_str()).collect()
    }

    #[test]
    fn empty_query_returns_everything_in_order() {
        let records = vec![record("1", "B"), record("2", "A"), record("3", "A/C")];
        let matches = match_folders("", &records);
        assert_eq!(paths(&matches), vec!["B", "A", "A/C"]);
    }

    #[test]
    fn separator_only_query_returns_everything() {
        let records = vec![record("1", "B"), record("2", "A")];
        assert_eq!(match_folders("//", &records).len(), 2);
    }

    #[test]
    fn multi_segment_query_is_anchored() {
        let records = vec![record("1", "Work/Projects"), record("2", "Work/Personal")];
        let matches = match_folders("work/proj", &records);
        assert_eq!(paths(&matches), vec!["Work/Projects"]);
    }

    #[test]
    fn leading_segments_must_be_exact() {
        let records = vec![record("1", "Workshop/Projects"), record("2", "Work/Projects")];
        let matches = match_folders("work/proj", &records);
        assert_eq!(paths(&matches), vec!["Work/Projects"]);
    }

    #[test]
    fn single_word_matches_any_segment() {
        let records = vec![record("1", "Work/Projects"), record("2", "Other/X")];
        let matches = match_folders("proj", &records);
        assert_eq!(paths(&matches), vec!["Work/Projects"]);
    }

    #[test]
    fn single_word_is_case_insensitive() {
        let records = vec![record("1", "Reading List"), record("2", "Music")];
        assert_eq!(paths(&match_folders("LIST", &records)), vec!["Reading List"]);
    }

    #[test]
    fn trailing_slash_switches_to_positional() {
        let records = vec![record("1", "Work"), record("2", "Home/Work"), record("3", "Work/Docs")];
        let matches = match_folders("work/", &records);
        assert_eq!(paths(&matches), vec!["Work", "Work/Docs"]);
    }

    #[test]
    fn positional_query_needs_enough_segments() {
        let records = vec![record("1", "Work"), record("2", "Work/Docs/Old")];
        let matches = match_folders("work/docs/o", &records);
        assert_eq!(paths(&matches), vec!["Work/Docs/Old"]);
    }

    #[test]
    fn parse_builds_expected_matchers() {
        let PathQuery::Positional(matchers) = PathQuery::parse("A/b/C") else {
            panic!("expected positional query");
        };
        let kinds: Vec<SegmentMatchKind> = matchers.iter().map(SegmentMatcher::kind).collect();
        assert_eq!(
            kinds,
            vec![SegmentMatchKind::Exact, SegmentMatchKind::Exact, SegmentMatchKind::Substr]
        );
        assert_eq!(matchers[2].value(), "c");
    }
}
