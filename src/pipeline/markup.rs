use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};

// `<!-- wp:x {..} -->`, `<!-- /wp:x -->` and `<!-- wp:x /-->`. Only the
// markers go; whatever sits between a pair stays. A match never runs past
// the first `-->`, so a broken marker cannot swallow the markup after it.
static BLOCK_ANNOTATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<!--\s*/?wp:.*?-->").unwrap());

static BODY: LazyLock<Selector> = LazyLock::new(|| Selector::parse("body").unwrap());
static IMG: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img").unwrap());
static POST_NAVIGATION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"[class*="post-navigation"]"#).unwrap());
static SPACER: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".wp-block-spacer").unwrap());
static COLUMNS: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".wp-block-columns").unwrap());
static COLUMN: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".wp-block-column").unwrap());

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];
const STRUCTURAL_ELEMENTS: &[&str] = &["html", "head", "body"];

/// What to detach when an element matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Node,
    /// The enclosing block, or the node itself when the parent is `body`.
    Parent,
}

/// Working copy of one item's body markup.
pub struct Fragment {
    html: Html,
}

impl Fragment {
    /// Strips block annotations from the raw text, then parses it as a
    /// document so an `<html>/<head>/<body>` wrapper collapses into `body`.
    pub fn parse(raw: &str) -> Self {
        let stripped = strip_block_annotations(raw);
        Fragment {
            html: Html::parse_document(&stripped),
        }
    }

    pub fn body(&self) -> Option<ElementRef<'_>> {
        self.html.root_element().select(&BODY).next()
    }

    /// First element under `body` matching `selector` and `pred`. Its value
    /// is read with `extract`; with `consume` the element is then removed.
    pub fn take<P, E>(&mut self, selector: &Selector, pred: P, extract: E, consume: bool) -> Option<String>
    where
        P: Fn(ElementRef<'_>) -> bool,
        E: Fn(ElementRef<'_>) -> String,
    {
        let (id, value) = {
            let body = self.body()?;
            let el = body.select(selector).find(|el| pred(*el))?;
            (el.id(), extract(el))
        };
        if consume {
            if let Some(mut node) = self.html.tree.get_mut(id) {
                node.detach();
            }
        }
        Some(value)
    }

    /// Removes every match (or its enclosing block). Returns the match count.
    pub fn detach_matching<P>(&mut self, selector: &Selector, pred: P, target: Target) -> usize
    where
        P: Fn(ElementRef<'_>) -> bool,
    {
        let ids: Vec<_> = match self.body() {
            Some(body) => body
                .select(selector)
                .filter(|el| pred(*el))
                .map(|el| {
                    el.parent()
                        .filter(|p| target == Target::Parent && !is_structural(p.value()))
                        .map_or(el.id(), |p| p.id())
                })
                .collect(),
            None => return 0,
        };

        let count = ids.len();
        for id in ids {
            if let Some(mut node) = self.html.tree.get_mut(id) {
                node.detach();
            }
        }
        count
    }

    /// Replaces every match with its own children, order preserved.
    pub fn unwrap_matching(&mut self, selector: &Selector) {
        let ids: Vec<_> = match self.body() {
            Some(body) => body.select(selector).map(|el| el.id()).collect(),
            None => return,
        };

        for id in ids {
            let children: Vec<_> = match self.html.tree.get(id) {
                Some(node) if node.parent().is_some() => node.children().map(|c| c.id()).collect(),
                _ => continue,
            };
            if let Some(mut node) = self.html.tree.get_mut(id) {
                for child in children {
                    node.insert_id_before(child);
                }
                node.detach();
            }
        }
    }

    /// Drops leftover block annotations and makes every other comment safe
    /// to wrap in `{/* */}`. Walks the whole tree, nested comments included.
    pub fn convert_comments(&mut self) {
        let ids: Vec<_> = self
            .html
            .tree
            .root()
            .descendants()
            .filter(|n| n.value().is_comment())
            .map(|n| n.id())
            .collect();

        for id in ids {
            let Some(mut node) = self.html.tree.get_mut(id) else {
                continue;
            };
            let annotation = match node.value() {
                Node::Comment(c) if is_block_annotation(&c.comment) => true,
                Node::Comment(c) => {
                    c.comment = escape_comment(&c.comment).as_str().into();
                    false
                }
                _ => false,
            };
            if annotation {
                node.detach();
            }
        }
    }

    /// Empty image placeholders, post navigation and spacers.
    pub fn remove_dead_content(&mut self) {
        self.detach_matching(
            &IMG,
            |img| img.value().attr("src").map_or(true, |src| src.trim().is_empty()),
            Target::Parent,
        );
        self.detach_matching(&POST_NAVIGATION, |_| true, Target::Node);
        self.detach_matching(&SPACER, |_| true, Target::Node);
    }

    /// Column layouts collapse into their content.
    pub fn flatten_layout(&mut self) {
        self.unwrap_matching(&COLUMNS);
        self.unwrap_matching(&COLUMN);
    }

    /// Serializes the body content for MDX. Void elements are always
    /// self-closed and the `head` section is dropped.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for node in self.html.tree.root().children() {
            match node.value() {
                Node::Comment(c) => push_comment(&c.comment, &mut out),
                Node::Element(_) => {
                    if let Some(el) = ElementRef::wrap(node) {
                        write_structural(el, &mut out);
                    }
                }
                _ => {}
            }
        }
        out.trim().to_string()
    }

    /// The transformer stages after field extraction, then serialization.
    pub fn transform(mut self) -> String {
        self.convert_comments();
        self.remove_dead_content();
        self.flatten_layout();
        self.render()
    }
}

pub fn strip_block_annotations(raw: &str) -> String {
    BLOCK_ANNOTATION_RE.replace_all(raw, "").into_owned()
}

fn is_block_annotation(comment: &str) -> bool {
    let text = comment.trim_start().to_ascii_lowercase();
    text.starts_with("wp:") || text.starts_with("/wp:")
}

/// `*/` would close the MDX comment early and braces open expressions.
fn escape_comment(comment: &str) -> String {
    comment
        .replace("*/", "*\\/")
        .replace('{', "\\{")
        .replace('}', "\\}")
}

fn is_structural(node: &Node) -> bool {
    node.as_element()
        .map_or(true, |e| STRUCTURAL_ELEMENTS.contains(&e.name()))
}

fn push_comment(comment: &str, out: &mut String) {
    out.push_str("{/*");
    out.push_str(comment);
    out.push_str("*/}");
}

// html, then body; head is skipped.
fn write_structural(el: ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        match child.value() {
            Node::Comment(c) => push_comment(&c.comment, out),
            Node::Text(t) => escape_text(&t.text, out),
            Node::Element(e) if e.name() == "head" => {}
            Node::Element(e) => {
                let Some(child_el) = ElementRef::wrap(child) else {
                    continue;
                };
                if STRUCTURAL_ELEMENTS.contains(&e.name()) {
                    write_structural(child_el, out);
                } else {
                    write_element(child_el, out);
                }
            }
            _ => {}
        }
    }
}

/// `script`/`style` bodies go out as one template-literal expression so
/// their braces stay code instead of opening MDX expressions.
fn write_raw_text(el: ElementRef<'_>, out: &mut String) {
    let text: String = el.text().collect();
    if text.is_empty() {
        return;
    }
    out.push_str("{`");
    out.push_str(
        &text
            .replace('\\', "\\\\")
            .replace('`', "\\`")
            .replace("${", "\\${"),
    );
    out.push_str("`}");
}

fn write_children(el: ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        match child.value() {
            Node::Text(t) => escape_text(&t.text, out),
            Node::Comment(c) => push_comment(&c.comment, out),
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    write_element(child_el, out);
                }
            }
            _ => {}
        }
    }
}

fn write_element(el: ElementRef<'_>, out: &mut String) {
    let name = el.value().name();
    out.push('<');
    out.push_str(name);
    for (key, value) in el.value().attrs.iter() {
        out.push(' ');
        // foreign attributes such as `xlink:href` keep their prefix
        if let Some(prefix) = &key.prefix {
            out.push_str(prefix);
            out.push(':');
        }
        out.push_str(&key.local);
        out.push_str("=\"");
        escape_attr(value, out);
        out.push('"');
    }

    if VOID_ELEMENTS.contains(&name) {
        out.push_str(" />");
        return;
    }

    out.push('>');
    if RAW_TEXT_ELEMENTS.contains(&name) {
        write_raw_text(el, out);
    } else {
        write_children(el, out);
    }
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '{' => out.push_str("&#123;"),
            '}' => out.push_str("&#125;"),
            _ => out.push(c),
        }
    }
}

fn escape_attr(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}
