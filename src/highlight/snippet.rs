//! Snippet assembly for search result previews
//!
//! Merges a document's highlight fragments into one ordered, truncated
//! preview string: sort ascending by offset (the producer emits best-first,
//! not offset-ordered), resolve each fragment through the highlighter's
//! second pass, then join with a fixed separator.

use super::Highlighter;

/// Separator between resolved excerpts; also used once as the prefix.
const SEPARATOR: &str = " ... ";

/// Assemble a display snippet for one document.
///
/// Pure and deterministic given identical inputs. An empty fragment
/// sequence yields just the prefix marker.
pub fn assemble(
    highlighter: &dyn Highlighter,
    query: &str,
    content: &str,
    max_length: usize,
) -> String {
    let mut highlights = highlighter.highlight(query, content, max_length);
    // Stable: fragments at equal offsets keep the producer's relative order
    highlights.sort_by_key(|h| h.fragment.offset);

    let excerpts: Vec<String> = highlights
        .iter()
        .map(|h| highlighter.find_offsets(query, &h.fragment.text))
        .collect();

    format!("... {}", excerpts.join(SEPARATOR))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::{Fragment, Highlight, TermHighlighter};

    /// Scripted highlighter that returns a fixed fragment list and resolves
    /// fragments by upper-casing, so tests can observe ordering and the
    /// second resolution pass independently of the real scanner.
    struct Scripted {
        fragments: Vec<Highlight>,
    }

    impl Scripted {
        fn at_offsets(offsets: &[usize]) -> Self {
            Self {
                fragments: offsets
                    .iter()
                    .map(|&offset| Highlight {
                        score: 1.0,
                        fragment: Fragment {
                            offset,
                            text: format!("frag{offset}"),
                        },
                    })
                    .collect(),
            }
        }
    }

    impl Highlighter for Scripted {
        fn highlight(&self, _query: &str, _content: &str, _max_length: usize) -> Vec<Highlight> {
            self.fragments.clone()
        }

        fn find_offsets(&self, _query: &str, fragment_text: &str) -> String {
            fragment_text.to_uppercase()
        }
    }

    #[test]
    fn fragments_are_merged_in_offset_order() {
        let hl = Scripted::at_offsets(&[50, 10, 30]);
        let snippet = assemble(&hl, "q", "content", 3000);
        assert_eq!(snippet, "... FRAG10 ... FRAG30 ... FRAG50");
    }

    #[test]
    fn empty_fragment_list_yields_prefix_marker() {
        let hl = Scripted { fragments: vec![] };
        assert_eq!(assemble(&hl, "q", "content", 3000), "... ");
    }

    #[test]
    fn single_fragment_gets_prefix_only() {
        let hl = Scripted::at_offsets(&[5]);
        assert_eq!(assemble(&hl, "q", "content", 3000), "... FRAG5");
    }

    #[test]
    fn assembly_is_deterministic() {
        let hl = Scripted::at_offsets(&[9, 2, 2, 7]);
        let first = assemble(&hl, "q", "content", 3000);
        for _ in 0..5 {
            assert_eq!(assemble(&hl, "q", "content", 3000), first);
        }
    }

    #[test]
    fn equal_offsets_keep_producer_order() {
        let hl = Scripted {
            fragments: vec![
                Highlight {
                    score: 0.9,
                    fragment: Fragment {
                        offset: 4,
                        text: "first".into(),
                    },
                },
                Highlight {
                    score: 0.1,
                    fragment: Fragment {
                        offset: 4,
                        text: "second".into(),
                    },
                },
            ],
        };
        assert_eq!(assemble(&hl, "q", "content", 3000), "... FIRST ... SECOND");
    }

    #[test]
    fn end_to_end_with_term_highlighter_marks_query() {
        let hl = TermHighlighter::default();
        let content = "Rust makes systems programming approachable for everyone who tries it.";
        let snippet = assemble(&hl, "systems", content, 3000);
        assert!(snippet.starts_with("... "));
        assert!(snippet.contains("<mark>systems</mark>"));
    }
}
