pub mod item;

use std::path::Path;

use anyhow::Context;
use quick_xml::events::{BytesStart, Event};
use thiserror::Error;

pub use item::{AttachmentIndex, ItemView, TaxonomyTerm};

/// Errors that abort the whole run: the export cannot be read or is not
/// well-formed XML.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("XML parse error at byte {position}: {source}")]
    Parse {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },

    #[error("malformed export: {0}")]
    Malformed(String),
}

/// One child of an element. CDATA payloads are kept apart from plain text.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlContent {
    Element(XmlElement),
    Text(String),
    CData(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct XmlElement {
    /// Qualified name as written, e.g. `wp:post_type`.
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlContent>,
}

impl XmlElement {
    fn from_start(e: &BytesStart<'_>) -> Result<Self, quick_xml::Error> {
        let mut attributes = Vec::new();
        for attr in e.attributes() {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            attributes.push((key, value));
        }
        Ok(XmlElement {
            name: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
            attributes,
            children: Vec::new(),
        })
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|c| match c {
            XmlContent::Element(e) => Some(e),
            _ => None,
        })
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.elements().filter(move |e| e.name == name)
    }

    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.elements().find(|e| e.name == name)
    }
}

/// Uniform accessor for fields that may be plain text, CDATA-wrapped, or
/// missing. Total: absent yields `""`, CDATA wins over surrounding text.
pub fn read_text(value: Option<&XmlElement>) -> String {
    let Some(el) = value else {
        return String::new();
    };

    let cdata: Vec<&str> = el
        .children
        .iter()
        .filter_map(|c| match c {
            XmlContent::CData(s) => Some(s.as_str()),
            _ => None,
        })
        .collect();
    if !cdata.is_empty() {
        return cdata.concat();
    }

    el.children
        .iter()
        .filter_map(|c| match c {
            XmlContent::Text(s) => Some(s.as_str()),
            _ => None,
        })
        .collect()
}

/// Parsed WXR export. Read-only once built.
#[derive(Debug)]
pub struct ExportDocument {
    root: XmlElement,
}

impl ExportDocument {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let xml = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read export {}", path.display()))?;
        let doc = Self::parse(&xml)
            .with_context(|| format!("Failed to parse export {}", path.display()))?;
        Ok(doc)
    }

    pub fn parse(xml: &str) -> Result<Self, ExportError> {
        let mut reader = quick_xml::Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            let event = reader.read_event().map_err(|source| ExportError::Parse {
                position: reader.buffer_position() as u64,
                source,
            })?;
            let wrap = |source: quick_xml::Error| ExportError::Parse {
                position: reader.buffer_position() as u64,
                source,
            };

            match event {
                Event::Start(e) => stack.push(XmlElement::from_start(&e).map_err(wrap)?),
                Event::Empty(e) => {
                    let el = XmlElement::from_start(&e).map_err(wrap)?;
                    attach(&mut stack, &mut root, el)?;
                }
                Event::End(_) => {
                    let el = stack
                        .pop()
                        .ok_or_else(|| ExportError::Malformed("unexpected closing tag".into()))?;
                    attach(&mut stack, &mut root, el)?;
                }
                Event::Text(e) => {
                    let text = e.unescape().map_err(wrap)?;
                    if let Some(top) = stack.last_mut() {
                        if !text.is_empty() {
                            top.children.push(XmlContent::Text(text.into_owned()));
                        }
                    }
                }
                Event::CData(e) => {
                    if let Some(top) = stack.last_mut() {
                        let payload = String::from_utf8_lossy(&e.into_inner()).into_owned();
                        top.children.push(XmlContent::CData(payload));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(ExportError::Malformed(format!(
                "unclosed element <{}> at end of input",
                open.name
            )));
        }
        let root = root.ok_or_else(|| ExportError::Malformed("no root element".into()))?;
        Ok(ExportDocument { root })
    }

    /// Post records at `rss/channel/item`, in document order. A document
    /// without that path simply has no items.
    pub fn items(&self) -> Vec<ItemView<'_>> {
        if self.root.name != "rss" {
            return Vec::new();
        }
        self.root
            .child("channel")
            .map(|channel| channel.children_named("item").map(ItemView::new).collect())
            .unwrap_or_default()
    }
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    el: XmlElement,
) -> Result<(), ExportError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(XmlContent::Element(el)),
        None if root.is_none() => *root = Some(el),
        None => {
            return Err(ExportError::Malformed(format!(
                "second root element <{}>",
                el.name
            )))
        }
    }
    Ok(())
}
