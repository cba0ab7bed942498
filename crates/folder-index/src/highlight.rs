//! Highlight spans for rendering picker matches.
//!
//! Each path segment is highlighted against the query segment at the same
//! position; the last query segment is reused for every path segment at or
//! beyond the query's length. Terms are matched literally and case-insensitively.

use serde::Serialize;

use crate::matcher::split_segments;
use crate::path::PATH_SEPARATOR;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HighlightSpan {
    pub text: String,
    pub highlighted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HighlightedSegment {
    pub spans: Vec<HighlightSpan>,
}

impl HighlightedSegment {
    pub fn text(&self) -> String {
        self.spans.iter().map(|span| span.text.as_str()).collect()
    }

    pub fn is_highlighted(&self) -> bool {
        self.spans.iter().any(|span| span.highlighted)
    }
}

pub fn highlight_path(path: &str, query: &str) -> Vec<HighlightedSegment> {
    let lowered = query.to_lowercase();
    let terms: Vec<&str> = split_segments(&lowered).collect();
    let last_term = terms.last().copied().unwrap_or("");

    // Terms line up with non-empty segments, as in the matcher.
    let mut position = 0;
    path.split(PATH_SEPARATOR)
        .map(|segment| {
            if segment.is_empty() {
                return HighlightedSegment { spans: Vec::new() };
            }
            let term = if position + 1 < terms.len() {
                terms[position]
            } else {
                last_term
            };
            position += 1;
            HighlightedSegment {
                spans: highlight_text(segment, term),
            }
        })
        .collect()
}

/// Splits `text` into plain and highlighted spans around every occurrence of `term`.
pub fn highlight_text(text: &str, term: &str) -> Vec<HighlightSpan> {
    if text.is_empty() {
        return Vec::new();
    }
    let needle: Vec<char> = term.trim().to_lowercase().chars().collect();
    if needle.is_empty() {
        return vec![plain(text)];
    }

    let mut spans = Vec::new();
    let mut plain_start = 0usize;
    let mut cursor = 0usize;
    while cursor < text.len() {
        match match_end(text, cursor, &needle) {
            Some(end) => {
                if plain_start < cursor {
                    spans.push(plain(&text[plain_start..cursor]));
                }
                spans.push(HighlightSpan {
                    text: text[cursor..end].to_string(),
                    highlighted: true,
                });
                cursor = end;
                plain_start = end;
            }
            None => {
                cursor += text[cursor..].chars().next().map_or(1, char::len_utf8);
            }
        }
    }
    if plain_start < text.len() {
        spans.push(plain(&text[plain_start..]));
    }
    spans
}

fn plain(text: &str) -> HighlightSpan {
    HighlightSpan {
        text: text.to_string(),
        highlighted: false,
    }
}

/// Byte offset just past a case-insensitive occurrence of `needle` at `start`.
fn match_end(text: &str, start: usize, needle: &[char]) -> Option<usize> {
    let mut expected = needle.iter();
    let mut remaining = needle.len();
    for (offset, ch) in text[start..].char_indices() {
        for lowered in ch.to_lowercase() {
            if expected.next() != Some(&lowered) {
                return None;
            }
            remaining -= 1;
        }
        if remaining == 0 {
            return Some(start + offset + ch.len_utf8());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marked(segments: &[HighlightedSegment]) -> Vec<String> {
        segments
            .iter()
            .map(|segment| {
                segment
                    .spans
                    .iter()
                    .map(|span| {
                        if span.highlighted {
                            format!("[{}]", span.text)
                        } else {
                            span.text.clone()
                        }
                    })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn highlights_matching_position() {
        let segments = highlight_path("Work/Projects", "work/proj");
        assert_eq!(marked(&segments), vec!["[Work]", "[Proj]ects"]);
    }

    #[test]
    fn empty_segments_do_not_shift_terms() {
        let segments = highlight_path("Work//Projects/Rust", "work/proj/ru");
        assert_eq!(marked(&segments), vec!["[Work]", "", "[Proj]ects", "[Ru]st"]);
    }

    #[test]
    fn last_term_reused_beyond_query_length() {
        let segments = highlight_path("Docs/Old Docs/docs", "docs");
        assert_eq!(marked(&segments), vec!["[Docs]", "Old [Docs]", "[docs]"]);
    }

    #[test]
    fn every_occurrence_is_marked() {
        let spans = highlight_text("abcABCab", "ab");
        let rendered: Vec<(String, bool)> =
            spans.into_iter().map(|s| (s.text, s.highlighted)).collect();
        assert_eq!(
            rendered,
            vec![
                ("ab".to_string(), true),
                ("c".to_string(), false),
                ("AB".to_string(), true),
                ("C".to_string(), false),
                ("ab".to_string(), true),
            ]
        );
    }

    #[test]
    fn query_is_taken_literally() {
        let segments = highlight_path("C++ (old)", "+ (");
        assert_eq!(marked(&segments), vec!["C+[+ (]old)"]);
    }

    #[test]
    fn empty_query_leaves_text_plain() {
        let segments = highlight_path("Work/News", "");
        assert!(segments.iter().all(|segment| !segment.is_highlighted()));
        assert_eq!(segments[1].text(), "News");
    }

    #[test]
    fn multibyte_text_keeps_char_boundaries() {
        let spans = highlight_text("Café Crème", "crè");
        assert_eq!(spans[1].text, "Crè");
        assert!(spans[1].highlighted);
        assert_eq!(spans[2].text, "me");
    }
}
