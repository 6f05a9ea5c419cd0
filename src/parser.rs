use chrono::{DateTime, Utc};
use feed_rs::model::Entry;
use feed_rs::parser;
use scraper::Html;
use tracing::debug;

use crate::error::ParseError;
use crate::registry::is_http_url;

#[derive(Debug, Clone, PartialEq)]
pub struct StoryItem {
    pub title: String,
    pub link: String,
    /// Display name of the registry source, never taken from the feed itself
    pub source_name: String,
    pub published_at: Option<DateTime<Utc>>,
    /// Plain-text summary, possibly empty
    pub description: String,
}

#[derive(Debug, Clone, Copy)]
pub struct ParseOptions {
    pub max_description_length: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_description_length: 200,
        }
    }
}

/// Parse an RSS or Atom document into stories tagged with `source_name`.
///
/// The format is detected from the root element. Entries without a title or
/// without an absolute http(s) link are skipped; a timestamp that cannot be
/// parsed is treated as absent.
pub fn parse_feed(
    bytes: &[u8],
    source_name: &str,
    options: &ParseOptions,
) -> Result<Vec<StoryItem>, ParseError> {
    let parsed = parser::parse(bytes).map_err(|cause| ParseError {
        source_name: source_name.to_string(),
        cause,
    })?;

    debug!(
        "Parsed {:?} feed from {} with {} entries",
        parsed.feed_type,
        source_name,
        parsed.entries.len()
    );

    Ok(parsed
        .entries
        .into_iter()
        .filter_map(|entry| story_from_entry(entry, source_name, options))
        .collect())
}

fn story_from_entry(entry: Entry, source_name: &str, options: &ParseOptions) -> Option<StoryItem> {
    let title = entry
        .title
        .as_ref()
        .map(|t| t.content.trim().to_string())
        .unwrap_or_default();

    if title.is_empty() {
        debug!("Skipping entry without title from {}", source_name);
        return None;
    }

    // Atom entries may carry several links; the article is the alternate one
    let link = entry
        .links
        .iter()
        .find(|l| l.rel.as_deref().map_or(true, |rel| rel == "alternate"))
        .or_else(|| entry.links.first())
        .map(|l| l.href.trim().to_string())
        .unwrap_or_default();

    if !is_http_url(&link) {
        debug!("Skipping entry with invalid link from {}: {}", source_name, title);
        return None;
    }

    let published_at = entry.published.or(entry.updated);

    let description = entry
        .summary
        .map(|s| s.content)
        .or_else(|| entry.content.and_then(|c| c.body))
        .map(|html| truncate(&strip_html(&html), options.max_description_length))
        .unwrap_or_default();

    Some(StoryItem {
        title,
        link,
        source_name: source_name.to_string(),
        published_at,
        description,
    })
}

/// Reduce an HTML fragment to its text with entities decoded and whitespace
/// collapsed.
pub fn strip_html(html: &str) -> String {
    if html.is_empty() {
        return String::new();
    }

    let fragment = Html::parse_fragment(html);
    let text: String = fragment.root_element().text().collect();
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cut `text` to at most `max_length` characters on a word boundary, marking
/// the cut with "...".
pub fn truncate(text: &str, max_length: usize) -> String {
    if text.chars().count() <= max_length {
        return text.to_string();
    }

    let cut: String = text.chars().take(max_length.saturating_sub(3)).collect();
    let head = match cut.rsplit_once(' ') {
        Some((head, _)) => head,
        None => cut.as_str(),
    };
    format!("{}...", head)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
        <rss version="2.0">
            <channel>
                <title>Some Other Name</title>
                <link>https://technews.example.com</link>
                <description>Latest tech news</description>
                <item>
                    <title>Breaking: New Technology Announced</title>
                    <link>https://technews.example.com/article/1</link>
                    <description>&lt;p&gt;A &lt;b&gt;big&lt;/b&gt; day &amp;amp; more&lt;/p&gt;</description>
                    <pubDate>Mon, 09 Dec 2024 12:00:00 GMT</pubDate>
                </item>
                <item>
                    <title>   </title>
                    <link>https://technews.example.com/article/2</link>
                </item>
                <item>
                    <title>Script link</title>
                    <link>javascript:alert(1)</link>
                </item>
                <item>
                    <title>Bad date</title>
                    <link>https://technews.example.com/article/4</link>
                    <pubDate>sometime last week</pubDate>
                </item>
            </channel>
        </rss>
    "#;

    const ATOM: &str = r#"<?xml version="1.0" encoding="utf-8"?>
        <feed xmlns="http://www.w3.org/2005/Atom">
            <title>Example Atom</title>
            <id>urn:uuid:60a76c80-d399-11d9-b93C-0003939e0af6</id>
            <updated>2024-12-10T18:30:02Z</updated>
            <entry>
                <title>Atom entry</title>
                <link rel="replies" href="https://atom.example.com/post/1/comments"/>
                <link rel="alternate" href="https://atom.example.com/post/1"/>
                <id>urn:uuid:1225c695-cfb8-4ebb-aaaa-80da344efa6a</id>
                <updated>2024-12-10T18:30:02Z</updated>
                <summary>Short summary</summary>
            </entry>
            <entry>
                <title>No link</title>
                <id>urn:uuid:1225c695-cfb8-4ebb-aaaa-80da344efa6b</id>
                <updated>2024-12-09T18:30:02Z</updated>
            </entry>
        </feed>
    "#;

    fn parse(xml: &str) -> Vec<StoryItem> {
        parse_feed(xml.as_bytes(), "Tech News", &ParseOptions::default()).unwrap()
    }

    #[test]
    fn test_rss_keeps_only_entries_with_title_and_link() {
        let stories = parse(RSS);
        let titles: Vec<_> = stories.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Breaking: New Technology Announced", "Bad date"]);
    }

    #[test]
    fn test_rss_fields() {
        let story = &parse(RSS)[0];
        assert_eq!(story.link, "https://technews.example.com/article/1");
        assert_eq!(
            story.published_at,
            Some(Utc.with_ymd_and_hms(2024, 12, 9, 12, 0, 0).unwrap())
        );
        assert_eq!(story.description, "A big day & more");
    }

    #[test]
    fn test_source_name_comes_from_registry() {
        for story in parse(RSS) {
            assert_eq!(story.source_name, "Tech News");
        }
    }

    #[test]
    fn test_unparseable_date_is_absent() {
        let stories = parse(RSS);
        assert_eq!(stories[1].title, "Bad date");
        assert_eq!(stories[1].published_at, None);
    }

    #[test]
    fn test_atom_entries() {
        let stories = parse(ATOM);
        assert_eq!(stories.len(), 1);
        assert_eq!(stories[0].title, "Atom entry");
        assert_eq!(stories[0].link, "https://atom.example.com/post/1");
        assert_eq!(
            stories[0].published_at,
            Some(Utc.with_ymd_and_hms(2024, 12, 10, 18, 30, 2).unwrap())
        );
        assert_eq!(stories[0].description, "Short summary");
    }

    #[test]
    fn test_malformed_feed_is_a_parse_error() {
        let result = parse_feed(b"<html><body>nope", "Broken", &ParseOptions::default());
        let err = result.unwrap_err();
        assert_eq!(err.source_name, "Broken");
    }

    #[test]
    fn test_description_length_is_bounded() {
        let long = "word ".repeat(100);
        let xml = format!(
            r#"<rss version="2.0"><channel><title>t</title>
            <item><title>Long</title><link>https://example.com/long</link>
            <description>{}</description></item></channel></rss>"#,
            long
        );
        let options = ParseOptions {
            max_description_length: 20,
        };
        let stories = parse_feed(xml.as_bytes(), "Tech News", &options).unwrap();
        assert_eq!(stories[0].description, "word word word...");
    }

    mod strip_html_tests {
        use super::*;

        #[test]
        fn test_strips_tags_and_decodes_entities() {
            assert_eq!(strip_html("<p>Fish &amp; <i>chips</i></p>"), "Fish & chips");
        }

        #[test]
        fn test_inline_tags_do_not_split_words() {
            assert_eq!(
                strip_html("Read <a href=\"x\">the post</a>, then <b>T</b>est it."),
                "Read the post, then Test it."
            );
        }

        #[test]
        fn test_collapses_whitespace() {
            assert_eq!(strip_html("  a\n\n   b\tc "), "a b c");
        }

        #[test]
        fn test_empty() {
            assert_eq!(strip_html(""), "");
        }
    }

    mod truncate_tests {
        use super::*;

        #[test]
        fn test_short_text_unchanged() {
            assert_eq!(truncate("hello world", 20), "hello world");
        }

        #[test]
        fn test_cuts_on_word_boundary() {
            assert_eq!(truncate("the quick brown fox jumps", 15), "the quick...");
        }

        #[test]
        fn test_single_long_word() {
            assert_eq!(truncate("abcdefghijklmnop", 8), "abcde...");
        }

        #[test]
        fn test_multibyte_text() {
            assert_eq!(truncate("ééééé ééééé", 8), "ééééé...");
        }
    }
}
