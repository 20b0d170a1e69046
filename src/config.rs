/// Export vocabulary the pipeline selects on. Built once from the CLI and
/// passed by reference to every stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub post_type: String,
    pub status: String,
    pub category_domain: String,
    pub tag_domain: String,
    pub file_name: String,
}

pub const DEFAULT_POST_TYPE: &str = "eternel-portfolio";
pub const DEFAULT_STATUS: &str = "publish";
pub const DEFAULT_CATEGORY_DOMAIN: &str = "eternel-portfolio-category";
pub const DEFAULT_TAG_DOMAIN: &str = "eternel-portfolio-tag";
pub const DEFAULT_FILE_NAME: &str = "index.mdx";

impl Default for Settings {
    fn default() -> Self {
        Settings {
            post_type: DEFAULT_POST_TYPE.into(),
            status: DEFAULT_STATUS.into(),
            category_domain: DEFAULT_CATEGORY_DOMAIN.into(),
            tag_domain: DEFAULT_TAG_DOMAIN.into(),
            file_name: DEFAULT_FILE_NAME.into(),
        }
    }
}
