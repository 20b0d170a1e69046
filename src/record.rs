use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// One fully extracted portfolio entry, ready to serialize.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedRecord {
    pub title: String,
    pub description: String,
    /// Always canonical `YYYY-MM-DD`.
    pub publish_date: String,
    pub slug: String,
    pub intro: String,
    pub client: String,
    pub project_date: String,
    pub cover: String,
    pub cover_alt: String,
    pub tag: String,
    pub tags: Vec<String>,
    pub category: Vec<String>,
    pub body: String,
}

impl ExtractedRecord {
    /// Front matter in fixed key order, a blank line, then the body.
    pub fn to_mdx(&self) -> String {
        let mut out = String::with_capacity(self.body.len() + 512);
        out.push_str("---\n");
        push_scalar(&mut out, "title", &self.title);
        push_scalar(&mut out, "description", &self.description);
        push_scalar(&mut out, "publishDate", &self.publish_date);
        push_scalar(&mut out, "slug", &self.slug);
        push_scalar(&mut out, "intro", &self.intro);
        push_scalar(&mut out, "client", &self.client);
        push_scalar(&mut out, "projectDate", &self.project_date);
        push_scalar(&mut out, "cover", &self.cover);
        push_scalar(&mut out, "coverAlt", &self.cover_alt);
        push_array(&mut out, "category", &self.category);
        push_scalar(&mut out, "tag", &self.tag);
        push_array(&mut out, "tags", &self.tags);
        out.push_str("---\n\n");
        out.push_str(&self.body);
        out.push('\n');
        out
    }
}

/// Only double quotes are escaped.
pub fn yaml_escape(s: &str) -> String {
    s.replace('"', "\\\"")
}

fn push_scalar(out: &mut String, key: &str, value: &str) {
    out.push_str(&format!("{}: \"{}\"\n", key, yaml_escape(value)));
}

fn push_array(out: &mut String, key: &str, values: &[String]) {
    let literal = serde_json::to_string(values).unwrap_or_else(|_| "[]".to_string());
    out.push_str(&format!("{}: {}\n", key, literal));
}

/// Writes `out_dir/<slug>/<file_name>`, replacing any previous file.
pub fn write_record(out_dir: &Path, record: &ExtractedRecord, file_name: &str) -> Result<PathBuf> {
    let folder = out_dir.join(&record.slug);
    std::fs::create_dir_all(&folder)
        .with_context(|| format!("Failed to create {}", folder.display()))?;
    let path = folder.join(file_name);
    std::fs::write(&path, record.to_mdx())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lamp() -> ExtractedRecord {
        ExtractedRecord {
            title: "Lamp \"Aurora\"".into(),
            description: "Lamp \"Aurora\"".into(),
            publish_date: "2021-03-05".into(),
            slug: "lamp-aurora".into(),
            intro: "Intro text".into(),
            client: "Acme".into(),
            project_date: "March 2021".into(),
            cover: String::new(),
            cover_alt: String::new(),
            tag: "brass".into(),
            tags: vec!["brass".into(), "desk".into()],
            category: vec!["lighting".into()],
            body: "<p>Body</p>".into(),
        }
    }

    #[test]
    fn front_matter_layout() {
        let mdx = lamp().to_mdx();
        let expected = r#"---
title: "Lamp \"Aurora\""
description: "Lamp \"Aurora\""
publishDate: "2021-03-05"
slug: "lamp-aurora"
intro: "Intro text"
client: "Acme"
projectDate: "March 2021"
cover: ""
coverAlt: ""
category: ["lighting"]
tag: "brass"
tags: ["brass","desk"]
---

<p>Body</p>
"#;
        assert_eq!(mdx, expected);
    }

    #[test]
    fn empty_arrays_still_rendered() {
        let record = ExtractedRecord {
            slug: "x".into(),
            publish_date: "2021-01-01".into(),
            ..Default::default()
        };
        let mdx = record.to_mdx();
        assert!(mdx.contains("\ncategory: []\n"));
        assert!(mdx.contains("\ntags: []\n"));
        assert!(mdx.contains("\ncover: \"\"\n"));
    }

    #[test]
    fn writes_under_slug_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let mut record = lamp();
        let path = write_record(dir.path(), &record, "index.mdx").unwrap();
        assert_eq!(path, dir.path().join("lamp-aurora").join("index.mdx"));

        record.body = "<p>Second</p>".into();
        write_record(dir.path(), &record, "index.mdx").unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.ends_with("<p>Second</p>\n"));
        assert!(!written.contains("<p>Body</p>"));
    }
}
