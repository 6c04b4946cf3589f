//! Markdown → presentation tree, and presentation tree → HTML.
//!
//! Stands in for the host renderer: wikilinks become linked-reference nodes
//! that remember their target, `#tags` become tag nodes and every line break
//! becomes a break node, which is what the projection engine expects to
//! find in a rendered document.

use std::sync::OnceLock;

use html_escape::{encode_double_quoted_attribute, encode_text};
use pulldown_cmark::{Event, LinkType, Options, Parser, Tag};
use regex::Regex;

use super::tree::{NodeId, NodeKind, PresentationTree};

fn tag_pattern() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| {
        Regex::new(r"(?:^|\s)(#[\p{L}_][\p{L}\p{N}_/-]*)").expect("Invalid tag regex")
    })
}

/// Renders markdown into a fresh tree rooted at a `div`.
pub fn render_markdown(markdown: &str) -> PresentationTree {
    let mut tree = PresentationTree::new(NodeKind::element("div"));
    let root = tree.root();
    let mut stack = vec![root];
    let options = Options::ENABLE_WIKILINKS | Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;

    for event in Parser::new_ext(markdown, options) {
        let parent = stack.last().copied().unwrap_or(root);
        match event {
            Event::Start(tag) => {
                let id = tree.build(parent, open_kind(&tag));
                stack.push(id);
            }
            Event::End(_) => {
                if stack.len() > 1 {
                    stack.pop();
                }
            }
            Event::Text(text) => push_text(&mut tree, parent, &text),
            Event::Code(code) => {
                let id = tree.build(parent, NodeKind::element("code"));
                tree.build(id, NodeKind::text(code.as_ref()));
            }
            Event::SoftBreak | Event::HardBreak => {
                tree.build(parent, NodeKind::LineBreak);
            }
            Event::Rule => {
                tree.build(parent, NodeKind::element("hr"));
            }
            _ => {}
        }
    }
    tree
}

fn open_kind(tag: &Tag<'_>) -> NodeKind {
    let name = match tag {
        Tag::Link {
            link_type: LinkType::WikiLink { .. },
            dest_url,
            ..
        } => {
            return NodeKind::LinkedReference {
                target: Some(dest_url.to_string()),
            };
        }
        Tag::Paragraph => "p",
        Tag::Heading { level, .. } => return NodeKind::element(&level.to_string()),
        Tag::BlockQuote(_) => "blockquote",
        Tag::CodeBlock(_) => "pre",
        Tag::List(Some(_)) => "ol",
        Tag::List(None) => "ul",
        Tag::Item => "li",
        Tag::Table(_) => "table",
        Tag::TableHead => "thead",
        Tag::TableRow => "tr",
        Tag::TableCell => "td",
        Tag::Emphasis => "em",
        Tag::Strong => "strong",
        Tag::Strikethrough => "del",
        Tag::Link { .. } => "a",
        _ => "span",
    };
    NodeKind::element(name)
}

/// Appends `text` under `parent`, lifting `#tags` into tag nodes.
fn push_text(tree: &mut PresentationTree, parent: NodeId, text: &str) {
    let mut last = 0;
    for caps in tag_pattern().captures_iter(text) {
        let Some(m) = caps.get(1) else { continue };
        if m.start() > last {
            tree.build(parent, NodeKind::text(&text[last..m.start()]));
        }
        let tag = tree.build(parent, NodeKind::Tag);
        tree.build(tag, NodeKind::text(m.as_str()));
        last = m.end();
    }
    if last < text.len() {
        tree.build(parent, NodeKind::text(&text[last..]));
    }
}

const VOID_ELEMENTS: &[&str] = &["hr", "img"];

/// Serializes the tree to HTML.
pub fn to_html(tree: &PresentationTree) -> String {
    let mut out = String::new();
    write_node(tree, tree.root(), &mut out);
    out
}

fn write_children(tree: &PresentationTree, node: NodeId, out: &mut String) {
    for &child in tree.children(node) {
        write_node(tree, child, out);
    }
}

fn write_node(tree: &PresentationTree, node: NodeId, out: &mut String) {
    match tree.kind(node) {
        NodeKind::Text(s) => out.push_str(&encode_text(s)),
        NodeKind::LineBreak => out.push_str("<br>"),
        NodeKind::Hint(s) => {
            out.push_str("<span class=\"food-log-hint\">");
            out.push_str(&encode_text(s));
            out.push_str("</span>");
        }
        NodeKind::Highlight(kind) => {
            out.push_str(&format!("<span class=\"{}\">", kind.class()));
            write_children(tree, node, out);
            out.push_str("</span>");
        }
        NodeKind::LinkedReference { target } => {
            let href = target.clone().unwrap_or_else(|| tree.text_content(node));
            out.push_str(&format!(
                "<a class=\"internal-link\" data-href=\"{}\">",
                encode_double_quoted_attribute(&href)
            ));
            write_children(tree, node, out);
            out.push_str("</a>");
        }
        NodeKind::Tag => {
            out.push_str(&format!(
                "<a class=\"tag\" href=\"{}\">",
                encode_double_quoted_attribute(&tree.text_content(node))
            ));
            write_children(tree, node, out);
            out.push_str("</a>");
        }
        NodeKind::Element(element) => {
            out.push('<');
            out.push_str(&element.tag);
            if !element.classes.is_empty() {
                out.push_str(&format!(
                    " class=\"{}\"",
                    encode_double_quoted_attribute(&element.classes.join(" "))
                ));
            }
            out.push('>');
            if VOID_ELEMENTS.contains(&element.tag.as_str()) {
                return;
            }
            write_children(tree, node, out);
            out.push_str("</");
            out.push_str(&element.tag);
            out.push('>');
        }
    }
}
