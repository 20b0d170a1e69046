pub mod date;
pub mod fields;
pub mod filter;
pub mod markup;
pub mod taxonomy;

use thiserror::Error;

use crate::config::Settings;
use crate::export::{AttachmentIndex, ItemView};
use crate::record::ExtractedRecord;
use crate::utils::slugify;
use markup::Fragment;

/// Read-only inputs shared by every item of one run.
pub struct Context<'a> {
    pub settings: &'a Settings,
    pub attachments: &'a AttachmentIndex,
}

/// Why a target item produced no file. The run continues.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Skip {
    #[error("no usable publish date for \"{title}\" ({slug}): post_date={post_date:?} pubDate={pub_date:?}")]
    Undated {
        title: String,
        slug: String,
        post_date: String,
        pub_date: String,
    },

    #[error("no slug could be derived for \"{title}\"")]
    NoSlug { title: String },
}

/// One export item in, one record out. Fields are read from the body
/// before the transformer strips the markup they live in.
pub fn process_item(item: &ItemView<'_>, ctx: &Context<'_>) -> Result<ExtractedRecord, Skip> {
    let title = item.title().trim().to_string();
    let slug = match item.post_name() {
        s if s.is_empty() => slugify(&title),
        s => s,
    };
    if slug.is_empty() {
        return Err(Skip::NoSlug { title });
    }

    let post_date = item.post_date();
    let pub_date = item.pub_date();
    let Some(publish_date) = date::publish_date(&post_date, &pub_date) else {
        return Err(Skip::Undated {
            title,
            slug,
            post_date,
            pub_date,
        });
    };

    let mut fragment = Fragment::parse(&item.content());
    let extracted = fields::extract(&mut fragment);
    let body = fragment.transform();

    let taxonomy = taxonomy::classify(&item.terms(), ctx.settings);

    let (cover, cover_alt) = match ctx.attachments.cover_for(item) {
        Some(a) if a.alt.is_empty() => (a.url.clone(), title.clone()),
        Some(a) => (a.url.clone(), a.alt.clone()),
        None => (String::new(), String::new()),
    };

    let excerpt = item.excerpt().trim().to_string();
    let description = if excerpt.is_empty() { title.clone() } else { excerpt };

    Ok(ExtractedRecord {
        title,
        description,
        publish_date,
        slug,
        intro: extracted.intro,
        client: extracted.client,
        project_date: extracted.project_date,
        cover,
        cover_alt,
        tag: taxonomy.tags.first().cloned().unwrap_or_default(),
        tags: taxonomy.tags,
        category: taxonomy.category,
        body,
    })
}
