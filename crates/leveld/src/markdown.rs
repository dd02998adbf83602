//! Markdown metadata - frontmatter, inline tags, and outgoing links.
//!
//! Produces the [`DocumentMetadata`] a note-taking host would hand the
//! engine: a frontmatter map, `#tag` annotations, and resolved link targets.
//! Code blocks and inline code are ignored for tags and links.

use level_common::DocumentMetadata;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

/// `#tag` preceded by start of text or whitespace
static INLINE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\s)#([\p{L}\p{N}_/\-]+)").unwrap());

/// `[[target]]`, `[[target|alias]]`, `![[embed]]`
static WIKILINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(!?)\[\[([^\[\]]+?)\]\]").unwrap());

/// `[text](target)`, `[text](<target with spaces>)`, optional title, `![alt](image)`
static MARKDOWN_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(!?)\[[^\]]*\]\(\s*(?:<([^<>\n]+)>|([^)\s<>]+))(?:\s+"[^"]*")?\s*\)"#).unwrap()
});

static EXTERNAL_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?i:[a-z][a-z0-9+.\-]*://|mailto:)").unwrap());

static INLINE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`[^`\n]*`").unwrap());

// ============================================================================
// Parsing
// ============================================================================

/// Parse a note into host metadata
pub fn parse(content: &str) -> DocumentMetadata {
    let (yaml, body) = split_frontmatter(content);
    let text = strip_code(body);

    DocumentMetadata {
        links: links(&text),
        frontmatter: yaml.and_then(parse_frontmatter),
        inline_tags: inline_tags(&text),
    }
}

/// Split off a leading `---` block. Returns the YAML text (without fences)
/// and the remaining body. The closing fence is `---` or `...`.
pub fn split_frontmatter(content: &str) -> (Option<&str>, &str) {
    let text = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut lines = text.split_inclusive('\n');

    match lines.next() {
        Some(first) if first.trim_end() == "---" => {
            let start = first.len();
            let mut offset = start;
            for line in lines {
                let trimmed = line.trim_end();
                if trimmed == "---" || trimmed == "..." {
                    return (Some(&text[start..offset]), &text[offset + line.len()..]);
                }
                offset += line.len();
            }
            (None, text)
        }
        _ => (None, text),
    }
}

/// YAML mapping to JSON values. Anything but a mapping is "no frontmatter".
pub fn parse_frontmatter(yaml: &str) -> Option<BTreeMap<String, Value>> {
    if yaml.trim().is_empty() {
        return None;
    }

    match serde_yaml::from_str::<BTreeMap<String, Value>>(yaml) {
        Ok(map) => Some(map),
        Err(e) => {
            debug!("Ignoring unreadable frontmatter: {}", e);
            None
        }
    }
}

/// Inline `#tags` as written, including the `#`
pub fn inline_tags(text: &str) -> Vec<String> {
    INLINE_TAG
        .captures_iter(text)
        .filter_map(|cap| cap.get(1))
        .map(|m| m.as_str().trim_end_matches('/'))
        .filter(|tag| !tag.is_empty() && !tag.chars().all(|c| c.is_numeric()))
        .map(|tag| format!("#{}", tag))
        .collect()
}

/// Internal link targets. Embeds and external URLs are not links.
pub fn links(text: &str) -> Vec<String> {
    let wiki = WIKILINK
        .captures_iter(text)
        .filter(|cap| cap[1].is_empty())
        .filter_map(|cap| {
            let inner = cap.get(2)?.as_str();
            let target = inner.split('|').next().unwrap_or(inner).trim();
            (!target.is_empty()).then(|| target.to_string())
        });

    let markdown = MARKDOWN_LINK
        .captures_iter(text)
        .filter(|cap| cap[1].is_empty())
        .filter_map(|cap| cap.get(2).or_else(|| cap.get(3)).map(|m| m.as_str().trim()))
        .filter(|target| {
            !target.is_empty() && !EXTERNAL_URL.is_match(target) && !target.starts_with('#')
        })
        .map(str::to_string);

    wiki.chain(markdown).collect()
}

/// Blank out fenced code blocks and inline code spans
fn strip_code(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut fence: Option<&'static str> = None;

    for line in body.lines() {
        let trimmed = line.trim_start();
        match fence {
            Some(marker) => {
                if trimmed.starts_with(marker) {
                    fence = None;
                }
            }
            None if trimmed.starts_with("```") => fence = Some("```"),
            None if trimmed.starts_with("~~~") => fence = Some("~~~"),
            None => out.push_str(&INLINE_CODE.replace_all(line, " ")),
        }
        out.push('\n');
    }

    out
}
