//! Pure HTML views
//!
//! String-templating functions with no side effects. Every title, url, and
//! query interpolated here is escaped; snippets are inserted as-is because
//! the highlighter's resolution pass already emits safe HTML.

use std::collections::HashMap;

use crate::archive::{DocId, DocRecord, HighlightOverride, IndexEntry};
use crate::util::{escape_html, truncate_display};

/// Display knobs shared by both views
#[derive(Debug, Clone)]
pub struct ViewOptions {
    /// Prefix list entries with the internal document id
    pub debug_ids: bool,
    /// Maximum characters of a title shown in listings
    pub max_title_length: usize,
}

/// One search result ready for rendering
#[derive(Debug, Clone)]
pub struct ResultItem {
    pub record: DocRecord,
    /// Safe HTML, assembled by the snippet module
    pub snippet: String,
}

fn debug_prefix(opts: &ViewOptions, id: DocId) -> String {
    if opts.debug_ids {
        format!("{id}: ")
    } else {
        String::new()
    }
}

/// The full archive listing: title, search form, and one entry per archived
/// URL in collaborator order.
pub fn index_view(entries: &[IndexEntry], opts: &ViewOptions) -> String {
    let items: Vec<String> = entries
        .iter()
        .map(|(url, meta)| {
            let label = meta.title.as_deref().unwrap_or(url);
            format!(
                "      <li>\n        {prefix}<a target=\"_blank\" href=\"{href}\">{label}</a>\n      </li>",
                prefix = debug_prefix(opts, meta.id),
                href = escape_html(url),
                label = escape_html(truncate_display(label, opts.max_title_length)),
            )
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<meta charset="utf-8">
<title>Your Archive</title>
<link rel="stylesheet" href="/style.css">
<header>
  <h1><a href="/">webshelf</a> &mdash; Archive Index</h1>
</header>
<form method="GET" action="/search">
  <fieldset class="search">
    <legend>Search your archive</legend>
    <input class="search" type="search" name="query" placeholder="search your library">
    <button>Search</button>
  </fieldset>
</form>
<ul>
{items}
</ul>
"#,
        items = items.join("\n")
    )
}

/// Search results: the echoed query, then one entry per result preferring
/// highlighter-supplied override title/url over the raw record's.
pub fn search_results_view(
    results: &[ResultItem],
    query: &str,
    highlights: &HashMap<DocId, HighlightOverride>,
    opts: &ViewOptions,
) -> String {
    let items: Vec<String> = results
        .iter()
        .map(|item| {
            let record = &item.record;
            let over = highlights.get(&record.id);
            let title = over
                .and_then(|o| o.title.as_deref())
                .or(record.title.as_deref())
                .unwrap_or(&record.url);
            let shown_url = over
                .and_then(|o| o.url.as_deref())
                .unwrap_or(&record.url);
            format!(
                "      <li>\n        {prefix}<a target=\"_blank\" href=\"{href}\">{title}</a>\n        <br>\n        <small class=\"url\">{url}</small>\n        <p>{snippet}</p>\n      </li>",
                prefix = debug_prefix(opts, record.id),
                href = escape_html(&record.url),
                title = escape_html(truncate_display(title, opts.max_title_length)),
                url = escape_html(shown_url),
                snippet = item.snippet,
            )
        })
        .collect();

    let query_escaped = escape_html(query);
    format!(
        r#"<!DOCTYPE html>
<meta charset="utf-8">
<title>{query_escaped} - webshelf search results</title>
<link rel="stylesheet" href="/style.css">
<header>
  <h1><a href="/">webshelf</a> &mdash; Search Results</h1>
</header>
<p>
  View <a href="/archive_index.html">your index</a>, or
</p>
<form method="GET" action="/search">
  <fieldset class="search">
    <legend>Search again</legend>
    <input class="search" type="search" name="query" placeholder="search your library" value="{query_escaped}">
    <button>Search</button>
  </fieldset>
</form>
<p>
  Showing results for <b>{query_escaped}</b>
</p>
<ol>
{items}
</ol>
"#,
        items = items.join("\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::IndexMeta;

    fn opts() -> ViewOptions {
        ViewOptions {
            debug_ids: false,
            max_title_length: 140,
        }
    }

    fn entry(url: &str, title: Option<&str>, id: DocId) -> IndexEntry {
        (
            url.to_string(),
            IndexMeta {
                title: title.map(str::to_string),
                id,
            },
        )
    }

    fn item(id: DocId, url: &str, title: Option<&str>, snippet: &str) -> ResultItem {
        ResultItem {
            record: DocRecord {
                id,
                url: url.to_string(),
                title: title.map(str::to_string),
                content: String::new(),
            },
            snippet: snippet.to_string(),
        }
    }

    #[test]
    fn index_view_labels_with_title_or_url() {
        let entries = vec![
            entry("https://a.example", Some("A Title"), 1),
            entry("https://b.example", None, 2),
        ];
        let html = index_view(&entries, &opts());
        assert!(html.contains(">A Title</a>"));
        // Missing title falls back to the url as the label
        assert!(html.contains(">https://b.example</a>"));
        let a_pos = html.find("a.example").unwrap();
        let b_pos = html.find("b.example").unwrap();
        assert!(a_pos < b_pos, "entries must keep collaborator order");
    }

    #[test]
    fn index_view_truncates_long_titles() {
        let long_title = "t".repeat(300);
        let entries = vec![entry("https://a.example", Some(&long_title), 1)];
        let html = index_view(&entries, &opts());
        assert!(html.contains(&"t".repeat(140)));
        assert!(!html.contains(&"t".repeat(141)));
    }

    #[test]
    fn index_view_escapes_hostile_titles_and_urls() {
        let entries = vec![entry(
            "https://a.example/\"><script>",
            Some("<script>alert(1)</script>"),
            1,
        )];
        let html = index_view(&entries, &opts());
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("&quot;&gt;"));
    }

    #[test]
    fn index_view_shows_debug_ids_when_enabled() {
        let entries = vec![entry("https://a.example", None, 42)];
        let mut o = opts();
        assert!(!index_view(&entries, &o).contains("42: "));
        o.debug_ids = true;
        assert!(index_view(&entries, &o).contains("42: "));
    }

    #[test]
    fn search_view_escapes_the_query_everywhere() {
        let html = search_results_view(&[], "<b>bold</b>", &HashMap::new(), &opts());
        assert!(!html.contains("<b>bold</b>"));
        assert!(html.contains("&lt;b&gt;bold&lt;/b&gt;"));
        // The query is echoed into the re-search box
        assert!(html.contains("value=\"&lt;b&gt;bold&lt;/b&gt;\""));
    }

    #[test]
    fn search_view_prefers_highlight_overrides() {
        let results = vec![item(1, "https://raw.example", Some("Raw Title"), "... s")];
        let mut highlights = HashMap::new();
        highlights.insert(
            1,
            HighlightOverride {
                title: Some("Override Title".to_string()),
                url: Some("https://override.example".to_string()),
            },
        );
        let html = search_results_view(&results, "q", &highlights, &opts());
        assert!(html.contains("Override Title"));
        assert!(!html.contains(">Raw Title<"));
        assert!(html.contains("https://override.example"));
        // The link target stays the raw record url
        assert!(html.contains("href=\"https://raw.example\""));
    }

    #[test]
    fn search_view_falls_back_to_url_for_missing_titles() {
        let results = vec![item(2, "https://b.example", None, "... s")];
        let html = search_results_view(&results, "q", &HashMap::new(), &opts());
        assert!(html.contains(">https://b.example</a>"));
    }

    #[test]
    fn search_view_inserts_snippets_verbatim() {
        let results = vec![item(1, "https://a.example", None, "... <mark>hit</mark>")];
        let html = search_results_view(&results, "q", &HashMap::new(), &opts());
        assert!(html.contains("<p>... <mark>hit</mark></p>"));
    }
}
