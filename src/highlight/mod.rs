//! Text highlighting collaborator
//!
//! Produces scored `{offset, text}` fragments for a query against document
//! content, plus the second resolution pass that turns one fragment into a
//! display-ready excerpt. The two passes are a deliberate contract: fragment
//! text alone is not assumed display-ready, so the snippet assembler calls
//! [`Highlighter::find_offsets`] on each fragment after sorting.

pub mod snippet;

use crate::util::escape_html;

/// One matched region within a document's content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    /// Byte offset of the fragment within the scanned content
    pub offset: usize,
    pub text: String,
}

/// A scored fragment as emitted by the highlighter
#[derive(Debug, Clone, PartialEq)]
pub struct Highlight {
    /// Fraction of query terms the fragment covers
    pub score: f32,
    pub fragment: Fragment,
}

/// Fragment producer and excerpt resolver
pub trait Highlighter: Send + Sync {
    /// Scan up to `max_length` characters of `content` and emit scored
    /// fragments, best first. Offset order is NOT guaranteed; consumers
    /// that need it must sort.
    fn highlight(&self, query: &str, content: &str, max_length: usize) -> Vec<Highlight>;

    /// Resolve one fragment into a display-ready excerpt: escaped HTML with
    /// query-term matches wrapped in `<mark>`.
    fn find_offsets(&self, query: &str, fragment_text: &str) -> String;
}

/// Case-insensitive term-window highlighter
pub struct TermHighlighter {
    /// Upper bound on fragments emitted per document
    max_fragments: usize,
    /// Characters of surrounding context kept on each side of a match
    context: usize,
}

impl Default for TermHighlighter {
    fn default() -> Self {
        Self {
            max_fragments: 4,
            context: 40,
        }
    }
}

/// Lowercased, deduplicated query terms.
fn query_terms(query: &str) -> Vec<String> {
    let mut terms: Vec<String> = query
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect();
    terms.sort();
    terms.dedup();
    terms
}

/// Byte spans of every term occurrence in `haystack_lower`, merged where
/// they overlap, in ascending order.
fn term_spans(terms: &[String], haystack_lower: &str) -> Vec<(usize, usize)> {
    let mut spans: Vec<(usize, usize)> = Vec::new();
    for term in terms {
        if term.is_empty() {
            continue;
        }
        let mut from = 0;
        while let Some(pos) = haystack_lower[from..].find(term.as_str()) {
            let start = from + pos;
            spans.push((start, start + term.len()));
            from = start + term.len();
        }
    }
    spans.sort();
    let mut merged: Vec<(usize, usize)> = Vec::new();
    for (start, end) in spans {
        match merged.last_mut() {
            Some((_, last_end)) if start <= *last_end => *last_end = (*last_end).max(end),
            _ => merged.push((start, end)),
        }
    }
    merged
}

/// Widen a byte range to whitespace boundaries within `content`.
fn widen_to_words(content: &str, mut start: usize, mut end: usize) -> (usize, usize) {
    while start > 0 && !content.is_char_boundary(start) {
        start -= 1;
    }
    while start > 0 && !content[..start].ends_with(char::is_whitespace) {
        start -= 1;
        while start > 0 && !content.is_char_boundary(start) {
            start -= 1;
        }
    }
    while end < content.len() && !content.is_char_boundary(end) {
        end += 1;
    }
    while end < content.len() && !content[end..].starts_with(char::is_whitespace) {
        end += 1;
        while end < content.len() && !content.is_char_boundary(end) {
            end += 1;
        }
    }
    (start, end)
}

impl Highlighter for TermHighlighter {
    fn highlight(&self, query: &str, content: &str, max_length: usize) -> Vec<Highlight> {
        let terms = query_terms(query);
        if terms.is_empty() || content.is_empty() {
            return Vec::new();
        }

        // Scan window: the first max_length characters of the document
        let window_end = content
            .char_indices()
            .nth(max_length)
            .map(|(idx, _)| idx)
            .unwrap_or(content.len());
        let window = &content[..window_end];
        let window_lower = window.to_lowercase();

        // Lowercasing can change byte lengths for some scripts; matching is
        // only byte-accurate when it doesn't
        if window_lower.len() != window.len() {
            return fallback_fragment(window, self.context);
        }

        let mut candidates: Vec<Highlight> = Vec::new();
        for (span_start, span_end) in term_spans(&terms, &window_lower) {
            let start = span_start.saturating_sub(self.context);
            let end = (span_end + self.context).min(window.len());
            let (start, end) = widen_to_words(window, start, end);

            // Merge into the previous candidate when the windows touch
            if let Some(prev) = candidates.last_mut() {
                let prev_end = prev.fragment.offset + prev.fragment.text.len();
                if start <= prev_end {
                    let merged_end = end.max(prev_end);
                    prev.fragment.text = window[prev.fragment.offset..merged_end].to_string();
                    continue;
                }
            }
            candidates.push(Highlight {
                score: 0.0,
                fragment: Fragment {
                    offset: start,
                    text: window[start..end].to_string(),
                },
            });
        }

        for candidate in &mut candidates {
            let text_lower = candidate.fragment.text.to_lowercase();
            let matched = terms.iter().filter(|t| text_lower.contains(t.as_str())).count();
            candidate.score = matched as f32 / terms.len() as f32;
        }

        // Best first: sort by score descending, position breaks ties
        candidates.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.fragment.offset.cmp(&b.fragment.offset))
        });
        candidates.truncate(self.max_fragments);
        candidates
    }

    fn find_offsets(&self, query: &str, fragment_text: &str) -> String {
        let terms = query_terms(query);
        let lower = fragment_text.to_lowercase();
        if terms.is_empty() || lower.len() != fragment_text.len() {
            return escape_html(fragment_text);
        }

        let mut out = String::with_capacity(fragment_text.len() + 16);
        let mut cursor = 0;
        for (start, end) in term_spans(&terms, &lower) {
            out.push_str(&escape_html(&fragment_text[cursor..start]));
            out.push_str("<mark>");
            out.push_str(&escape_html(&fragment_text[start..end]));
            out.push_str("</mark>");
            cursor = end;
        }
        out.push_str(&escape_html(&fragment_text[cursor..]));
        out
    }
}

/// When byte-accurate matching is impossible, fall back to one leading
/// fragment so the result still gets a preview.
fn fallback_fragment(window: &str, context: usize) -> Vec<Highlight> {
    let end = window
        .char_indices()
        .nth(context * 2)
        .map(|(idx, _)| idx)
        .unwrap_or(window.len());
    vec![Highlight {
        score: 0.0,
        fragment: Fragment {
            offset: 0,
            text: window[..end].to_string(),
        },
    }]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highlight_finds_term_windows() {
        let hl = TermHighlighter::default();
        let content = "The quick brown fox jumps over the lazy dog near the riverbank every single morning.";
        let fragments = hl.highlight("fox", content, 3000);
        assert_eq!(fragments.len(), 1);
        assert!(fragments[0].fragment.text.contains("fox"));
        assert!(fragments[0].score > 0.0);
    }

    #[test]
    fn highlight_is_case_insensitive() {
        let hl = TermHighlighter::default();
        let fragments = hl.highlight("FOX", "A Fox ran by.", 3000);
        assert_eq!(fragments.len(), 1);
        assert!(fragments[0].fragment.text.contains("Fox"));
    }

    #[test]
    fn highlight_empty_query_yields_no_fragments() {
        let hl = TermHighlighter::default();
        assert!(hl.highlight("", "some content", 3000).is_empty());
        assert!(hl.highlight("   ", "some content", 3000).is_empty());
    }

    #[test]
    fn highlight_respects_scan_window() {
        let hl = TermHighlighter::default();
        let content = format!("{}needle", "x".repeat(500));
        // Needle sits past the 100-char scan window
        assert!(hl.highlight("needle", &content, 100).is_empty());
    }

    #[test]
    fn highlight_emits_best_fragment_first() {
        let hl = TermHighlighter::default();
        let mut content = String::new();
        content.push_str("alpha appears here alone.");
        content.push_str(&" filler".repeat(30));
        content.push_str(" alpha and beta appear together in this later stretch of text.");
        let fragments = hl.highlight("alpha beta", &content, 3000);
        assert!(fragments.len() >= 2);
        // The two-term window outranks the earlier one-term window
        assert!(fragments[0].fragment.text.contains("beta"));
        assert!(fragments[0].fragment.offset > fragments[1].fragment.offset);
    }

    #[test]
    fn highlight_caps_fragment_count() {
        let hl = TermHighlighter::default();
        let content = "needle ".to_string() + &"filler word stack here padding more ".repeat(30).replace("padding", "needle");
        let fragments = hl.highlight("needle", &content, 3000);
        assert!(fragments.len() <= 4);
    }

    #[test]
    fn find_offsets_wraps_matches_in_mark() {
        let hl = TermHighlighter::default();
        let out = hl.find_offsets("fox", "the Fox ran");
        assert_eq!(out, "the <mark>Fox</mark> ran");
    }

    #[test]
    fn find_offsets_escapes_fragment_html() {
        let hl = TermHighlighter::default();
        let out = hl.find_offsets("script", "<script>alert(1)</script>");
        assert!(!out.contains("<script>"));
        assert!(out.contains("&lt;"));
        assert!(out.contains("<mark>script</mark>"));
    }

    #[test]
    fn find_offsets_without_match_still_escapes() {
        let hl = TermHighlighter::default();
        let out = hl.find_offsets("zzz", "a < b");
        assert_eq!(out, "a &lt; b");
    }

    #[test]
    fn term_spans_merges_overlaps() {
        let terms = vec!["abcd".to_string(), "cdef".to_string()];
        let spans = term_spans(&terms, "xxabcdefxx");
        assert_eq!(spans, vec![(2, 8)]);
    }
}
