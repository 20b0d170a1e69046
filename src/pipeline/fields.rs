use std::sync::LazyLock;

use scraper::{ElementRef, Selector};

use super::markup::{Fragment, Target};

static INTRO_HEADING: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h5.wp-block-heading.has-medium-font-size").unwrap());
static LABEL_HEADING: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h5").unwrap());

/// Headings of the meta sidebar panel. The panel must not reach the body.
const SIDEBAR_LABELS: &[&str] = &["client", "project date", "tags"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Intro,
    Client,
    ProjectDate,
}

#[derive(Debug, Clone, Copy)]
enum Predicate {
    Any,
    /// Trimmed, lower-cased heading text equals the label.
    Label(&'static str),
}

#[derive(Debug, Clone, Copy)]
enum Extract {
    OwnText,
    /// Text of the next element sibling when it is a `<p>`.
    NextParagraph,
}

#[derive(Debug, Clone, Copy)]
enum Scope {
    IntroHeading,
    LabelHeading,
}

impl Scope {
    fn selector(self) -> &'static Selector {
        match self {
            Scope::IntroHeading => &*INTRO_HEADING,
            Scope::LabelHeading => &*LABEL_HEADING,
        }
    }
}

struct FieldRule {
    field: Field,
    scope: Scope,
    predicate: Predicate,
    extract: Extract,
    /// Remove the matched node once read.
    consume: bool,
}

// Evaluated top to bottom; the first match for a field wins.
const RULES: &[FieldRule] = &[
    FieldRule {
        field: Field::Intro,
        scope: Scope::IntroHeading,
        predicate: Predicate::Any,
        extract: Extract::OwnText,
        consume: true,
    },
    FieldRule {
        field: Field::Client,
        scope: Scope::LabelHeading,
        predicate: Predicate::Label("client"),
        extract: Extract::NextParagraph,
        consume: false,
    },
    FieldRule {
        field: Field::ProjectDate,
        scope: Scope::LabelHeading,
        predicate: Predicate::Label("project date"),
        extract: Extract::NextParagraph,
        consume: false,
    },
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedFields {
    pub intro: String,
    pub client: String,
    pub project_date: String,
}

impl ExtractedFields {
    fn slot(&mut self, field: Field) -> &mut String {
        match field {
            Field::Intro => &mut self.intro,
            Field::Client => &mut self.client,
            Field::ProjectDate => &mut self.project_date,
        }
    }
}

/// Runs the rule table, then strips the meta sidebar the rules read from.
pub fn extract(fragment: &mut Fragment) -> ExtractedFields {
    let mut fields = ExtractedFields::default();
    let mut settled: Vec<Field> = Vec::with_capacity(RULES.len());

    for rule in RULES {
        if settled.contains(&rule.field) {
            continue;
        }
        let predicate = rule.predicate;
        let extract = rule.extract;
        if let Some(value) = fragment.take(
            rule.scope.selector(),
            |el| predicate.matches(el),
            |el| extract.apply(el),
            rule.consume,
        ) {
            *fields.slot(rule.field) = value;
            settled.push(rule.field);
        }
    }

    remove_sidebar(fragment);
    fields
}

/// Each sidebar heading goes together with its containing block.
pub fn remove_sidebar(fragment: &mut Fragment) -> usize {
    fragment.detach_matching(
        &LABEL_HEADING,
        |el| SIDEBAR_LABELS.contains(&label_text(el).as_str()),
        Target::Parent,
    )
}

impl Predicate {
    fn matches(self, el: ElementRef<'_>) -> bool {
        match self {
            Predicate::Any => true,
            Predicate::Label(label) => label_text(el) == label,
        }
    }
}

impl Extract {
    fn apply(self, el: ElementRef<'_>) -> String {
        match self {
            Extract::OwnText => text_of(el),
            Extract::NextParagraph => el
                .next_siblings()
                .find_map(ElementRef::wrap)
                .filter(|next| next.value().name() == "p")
                .map(text_of)
                .unwrap_or_default(),
        }
    }
}

fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

fn label_text(el: ElementRef<'_>) -> String {
    text_of(el).to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"<h5 class="wp-block-heading has-medium-font-size"> Intro text </h5>
<p>Story paragraph.</p>
<div class="wp-block-group sidebar">
<h5 class="wp-block-heading">Client</h5>
<p>Acme Lighting</p>
<h5 class="wp-block-heading">Project Date</h5>
<p>March 2021</p>
</div>
<div class="wp-block-group"><h5>Tags</h5><p>brass, lamp</p></div>"#;

    #[test]
    fn extracts_intro_and_labels() {
        let mut fragment = Fragment::parse(BODY);
        let fields = extract(&mut fragment);
        assert_eq!(fields.intro, "Intro text");
        assert_eq!(fields.client, "Acme Lighting");
        assert_eq!(fields.project_date, "March 2021");
    }

    #[test]
    fn intro_and_sidebar_leave_the_body() {
        let mut fragment = Fragment::parse(BODY);
        extract(&mut fragment);
        let out = fragment.render();
        assert!(!out.contains("Intro text"));
        assert!(!out.contains("Acme Lighting"));
        assert!(!out.contains("brass, lamp"));
        assert!(out.contains("<p>Story paragraph.</p>"));
    }

    #[test]
    fn only_first_styled_heading_is_intro() {
        let mut fragment = Fragment::parse(
            r#"<h5 class="has-medium-font-size wp-block-heading">First</h5><h5 class="wp-block-heading has-medium-font-size">Second</h5>"#,
        );
        let fields = extract(&mut fragment);
        assert_eq!(fields.intro, "First");
        assert!(fragment.render().contains("Second"));
    }

    #[test]
    fn plain_h5_is_not_intro() {
        let mut fragment = Fragment::parse("<h5>Just a heading</h5>");
        let fields = extract(&mut fragment);
        assert_eq!(fields.intro, "");
        assert!(fragment.render().contains("Just a heading"));
    }

    #[test]
    fn missing_labels_are_empty() {
        let mut fragment = Fragment::parse("<p>Nothing to see.</p>");
        assert_eq!(extract(&mut fragment), ExtractedFields::default());
    }

    #[test]
    fn label_without_paragraph_is_empty() {
        let mut fragment = Fragment::parse("<div><h5>Client</h5><ul><li>Acme</li></ul></div>");
        assert_eq!(extract(&mut fragment).client, "");
    }

    #[test]
    fn first_label_match_wins() {
        let mut fragment = Fragment::parse(
            "<div><h5>client</h5><p>First</p></div><div><h5>CLIENT</h5><p>Second</p></div>",
        );
        assert_eq!(extract(&mut fragment).client, "First");
    }

    #[test]
    fn sidebar_heading_at_top_level_removes_only_itself() {
        let mut fragment = Fragment::parse("<h5>Tags</h5><p>kept</p>");
        assert_eq!(remove_sidebar(&mut fragment), 1);
        assert_eq!(fragment.render(), "<p>kept</p>");
    }
}
