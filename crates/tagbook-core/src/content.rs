//! Content model: a rendering-independent view of note content.
//!
//! The editor renders a note as a sequence of plain text runs and atomic tag
//! annotations. This module models that sequence as typed nodes so the
//! reconciler never touches markup: a renderer maps `Vec<ContentNode>`
//! to/from whatever UI toolkit is in play.
//!
//! Tag names are taken verbatim (no case folding); two annotations differing
//! only by case are distinct tags.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

/// A tag marker: `#` followed by one or more non-whitespace, non-`#` chars.
static TAG_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#([^\s#]+)").expect("tag marker pattern is valid"));

/// One node of rendered note content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentNode {
    /// A run of plain text.
    Text(String),
    /// An atomic tag annotation carrying the verbatim tag name.
    TagRef(String),
}

/// Parse plain text into content nodes, turning each `#name` marker into a
/// `TagRef`.
pub fn parse(text: &str) -> Vec<ContentNode> {
    let mut nodes = Vec::new();
    let mut cursor = 0;
    for caps in TAG_MARKER.captures_iter(text) {
        let m = caps.get(0).expect("match 0 always present");
        if m.start() > cursor {
            nodes.push(ContentNode::Text(text[cursor..m.start()].to_string()));
        }
        nodes.push(ContentNode::TagRef(caps[1].to_string()));
        cursor = m.end();
    }
    if cursor < text.len() {
        nodes.push(ContentNode::Text(text[cursor..].to_string()));
    }
    nodes
}

/// Render content nodes back to plain text; a `TagRef("work")` becomes
/// `#work`.
pub fn to_plain(nodes: &[ContentNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        match node {
            ContentNode::Text(text) => out.push_str(text),
            ContentNode::TagRef(name) => {
                out.push('#');
                out.push_str(name);
            }
        }
    }
    out
}

/// The set of tag names currently present as annotations, deduplicated,
/// verbatim.
pub fn tags_of(nodes: &[ContentNode]) -> BTreeSet<String> {
    nodes
        .iter()
        .filter_map(|node| match node {
            ContentNode::TagRef(name) => Some(name.clone()),
            ContentNode::Text(_) => None,
        })
        .collect()
}

/// Compute the tag signature: sorted, deduplicated names joined with `|`.
///
/// Two content states with equal signatures carry the same tag set; the
/// reconciler compares signatures to skip needless view invalidation.
pub fn signature(nodes: &[ContentNode]) -> String {
    signature_of(tags_of(nodes).iter().map(String::as_str))
}

/// Signature of an arbitrary tag collection (e.g. a note's stored tag list).
pub fn signature_of<'a>(tags: impl Iterator<Item = &'a str>) -> String {
    let set: BTreeSet<&str> = tags.collect();
    set.into_iter().collect::<Vec<_>>().join("|")
}

/// A pending typed-text-to-annotation conversion at the caret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagTrigger {
    /// Byte offset of the `#` within the text run before the caret.
    pub start: usize,
    /// The candidate tag name (never empty, no whitespace, no `#`).
    pub name: String,
    /// The whitespace-class delimiter that triggered conversion. Preserved
    /// after the annotation, with the caret repositioned after it.
    pub delimiter: char,
}

/// Detect a tag conversion trigger in the text run before the caret.
///
/// Fires when the character immediately before the caret is whitespace and
/// the text before that delimiter ends with `#name`. Empty or
/// whitespace-only candidates never convert (the marker pattern requires at
/// least one non-whitespace, non-`#` character).
pub fn convert_trigger(text_before_caret: &str) -> Option<TagTrigger> {
    let delimiter = text_before_caret.chars().next_back()?;
    if !delimiter.is_whitespace() {
        return None;
    }
    let without_delimiter = &text_before_caret[..text_before_caret.len() - delimiter.len_utf8()];
    let caps = TAG_MARKER.captures_iter(without_delimiter).last()?;
    let m = caps.get(0).expect("match 0 always present");
    if m.end() != without_delimiter.len() {
        return None;
    }
    Some(TagTrigger {
        start: m.start(),
        name: caps[1].to_string(),
        delimiter,
    })
}

/// Apply a detected trigger to a text run, producing the replacement nodes:
/// leading text (if any), the annotation, and the preserved delimiter plus
/// any trailing text.
pub fn apply_trigger(text_run: &str, trigger: &TagTrigger) -> Vec<ContentNode> {
    let mut nodes = Vec::new();
    if trigger.start > 0 {
        nodes.push(ContentNode::Text(text_run[..trigger.start].to_string()));
    }
    nodes.push(ContentNode::TagRef(trigger.name.clone()));
    let rest = &text_run[trigger.start + 1 + trigger.name.len()..];
    if !rest.is_empty() {
        nodes.push(ContentNode::Text(rest.to_string()));
    }
    nodes
}

/// Convert every annotation with this name back to literal `#name ` text,
/// coalescing adjacent text runs. The trailing space re-triggers marker
/// parsing on the next reconciliation only if the user retypes a delimiter
/// elsewhere; the literal text itself still reads as a marker.
pub fn remove_tag(nodes: &[ContentNode], name: &str) -> Vec<ContentNode> {
    let mut out: Vec<ContentNode> = Vec::with_capacity(nodes.len());
    for node in nodes {
        let replacement = match node {
            ContentNode::TagRef(tag) if tag == name => {
                ContentNode::Text(format!("#{} ", tag))
            }
            other => other.clone(),
        };
        push_coalesced(&mut out, replacement);
    }
    out
}

fn push_coalesced(out: &mut Vec<ContentNode>, node: ContentNode) {
    if let (Some(ContentNode::Text(prev)), ContentNode::Text(next)) = (out.last_mut(), &node) {
        prev.push_str(next);
        return;
    }
    out.push(node);
}
