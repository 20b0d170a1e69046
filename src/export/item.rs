use std::collections::HashMap;

use super::{read_text, XmlElement};

const ATTACHMENT_POST_TYPE: &str = "attachment";
const THUMBNAIL_META_KEY: &str = "_thumbnail_id";
const ATTACHMENT_ALT_META_KEY: &str = "_wp_attachment_image_alt";

/// Borrowed view over one `<item>` record. Every accessor is total: a
/// missing field reads as an empty string.
#[derive(Debug, Clone, Copy)]
pub struct ItemView<'a> {
    el: &'a XmlElement,
}

/// A `<category domain=".." nicename="..">` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonomyTerm {
    pub domain: String,
    pub nicename: String,
}

impl TaxonomyTerm {
    /// Bare-string entries (no `nicename`) are not terms.
    fn from_element(el: &XmlElement) -> Option<Self> {
        let nicename = el.attr("nicename").map(str::trim).filter(|n| !n.is_empty())?;
        Some(TaxonomyTerm {
            domain: el.attr("domain").unwrap_or_default().to_string(),
            nicename: nicename.to_string(),
        })
    }
}

impl<'a> ItemView<'a> {
    pub fn new(el: &'a XmlElement) -> Self {
        ItemView { el }
    }

    fn field(&self, name: &str) -> String {
        read_text(self.el.child(name))
    }

    pub fn post_type(&self) -> String {
        self.field("wp:post_type")
    }

    pub fn status(&self) -> String {
        self.field("wp:status")
    }

    pub fn title(&self) -> String {
        self.field("title")
    }

    pub fn post_name(&self) -> String {
        self.field("wp:post_name").trim().to_string()
    }

    pub fn post_id(&self) -> String {
        self.field("wp:post_id").trim().to_string()
    }

    /// Primary date field, `YYYY-MM-DD HH:MM:SS` in site-local time.
    pub fn post_date(&self) -> String {
        self.field("wp:post_date")
    }

    /// Fallback date field, RFC 2822.
    pub fn pub_date(&self) -> String {
        self.field("pubDate")
    }

    pub fn content(&self) -> String {
        self.field("content:encoded")
    }

    pub fn excerpt(&self) -> String {
        self.field("excerpt:encoded")
    }

    pub fn attachment_url(&self) -> String {
        self.field("wp:attachment_url").trim().to_string()
    }

    /// First `wp:postmeta` value stored under `key`.
    pub fn meta(&self, key: &str) -> Option<String> {
        self.el
            .children_named("wp:postmeta")
            .find(|m| read_text(m.child("wp:meta_key")) == key)
            .map(|m| read_text(m.child("wp:meta_value")))
    }

    /// Taxonomy terms in export order. Zero, one or many `<category>`
    /// elements all come back as a sequence; malformed entries are dropped.
    pub fn terms(&self) -> Vec<TaxonomyTerm> {
        self.el
            .children_named("category")
            .filter_map(TaxonomyTerm::from_element)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub url: String,
    pub alt: String,
}

/// Attachment records keyed by post id, used to resolve featured images.
#[derive(Debug, Default)]
pub struct AttachmentIndex {
    by_id: HashMap<String, Attachment>,
}

impl AttachmentIndex {
    pub fn build(items: &[ItemView<'_>]) -> Self {
        let by_id = items
            .iter()
            .filter(|item| item.post_type() == ATTACHMENT_POST_TYPE)
            .filter_map(|item| {
                let id = item.post_id();
                let url = item.attachment_url();
                if id.is_empty() || url.is_empty() {
                    return None;
                }
                let alt = item
                    .meta(ATTACHMENT_ALT_META_KEY)
                    .map(|a| a.trim().to_string())
                    .unwrap_or_default();
                Some((id, Attachment { url, alt }))
            })
            .collect();
        AttachmentIndex { by_id }
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Featured image of `item`, via its `_thumbnail_id` post meta.
    pub fn cover_for(&self, item: &ItemView<'_>) -> Option<&Attachment> {
        let id = item.meta(THUMBNAIL_META_KEY)?;
        self.by_id.get(id.trim())
    }
}
