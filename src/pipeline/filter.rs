use crate::config::Settings;
use crate::export::ItemView;

/// Published items of the target post type. Exact, case-sensitive match on
/// both fields.
pub fn is_target(item: &ItemView<'_>, settings: &Settings) -> bool {
    item.post_type() == settings.post_type && item.status() == settings.status
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::ExportDocument;

    fn item_xml(post_type: &str, status: &str) -> String {
        format!(
            "<rss><channel><item><wp:post_type><![CDATA[{post_type}]]></wp:post_type><wp:status><![CDATA[{status}]]></wp:status></item></channel></rss>"
        )
    }

    fn keeps(post_type: &str, status: &str) -> bool {
        let doc = ExportDocument::parse(&item_xml(post_type, status)).unwrap();
        let items = doc.items();
        is_target(&items[0], &Settings::default())
    }

    #[test]
    fn published_portfolio_kept() {
        assert!(keeps("eternel-portfolio", "publish"));
    }

    #[test]
    fn other_types_and_statuses_dropped() {
        assert!(!keeps("page", "publish"));
        assert!(!keeps("eternel-portfolio", "draft"));
        assert!(!keeps("eternel-portfolio", "inherit"));
        assert!(!keeps("Eternel-Portfolio", "publish"));
        assert!(!keeps("eternel-portfolio", "Publish"));
    }
}
