use crate::config::Settings;
use crate::export::TaxonomyTerm;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Taxonomy {
    pub category: Vec<String>,
    pub tags: Vec<String>,
}

/// Split terms by domain. Export order is kept and duplicates stay.
pub fn classify(terms: &[TaxonomyTerm], settings: &Settings) -> Taxonomy {
    let mut out = Taxonomy::default();
    for term in terms {
        if term.domain == settings.category_domain {
            out.category.push(term.nicename.to_lowercase());
        } else if term.domain == settings.tag_domain {
            out.tags.push(term.nicename.to_lowercase());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn term(domain: &str, nicename: &str) -> TaxonomyTerm {
        TaxonomyTerm {
            domain: domain.into(),
            nicename: nicename.into(),
        }
    }

    #[test]
    fn splits_by_domain() {
        let terms = vec![
            term("eternel-portfolio-category", "Lighting"),
            term("eternel-portfolio-tag", "Brass"),
            term("category", "news"),
            term("post_tag", "misc"),
            term("eternel-portfolio-tag", "brass"),
            term("eternel-portfolio-category", "Home-Decor"),
        ];
        let t = classify(&terms, &Settings::default());
        assert_eq!(t.category, vec!["lighting", "home-decor"]);
        assert_eq!(t.tags, vec!["brass", "brass"]);
    }

    #[test]
    fn unknown_domains_never_leak() {
        let terms = vec![term("category", "news"), term("", "bare")];
        let t = classify(&terms, &Settings::default());
        assert!(t.category.is_empty());
        assert!(t.tags.is_empty());
    }
}
