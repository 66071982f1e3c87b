//! Allow-list HTML policy.
//!
//! A policy is composed from [`PolicyBuilder`] values with [`PolicyBuilder::and`].
//! Composition is a plain set union, so any grouping and any order of the same
//! rule sets yields the same policy. Disallowed elements are terminal: once an
//! element is disallowed by any composed rule set, no allow rule brings it
//! back.
//!
//! ```rust
//! use bulwark_xss::{HtmlPolicy, RuleSet};
//!
//! let policy = HtmlPolicy::from_rule_sets(RuleSet::ALL);
//! assert_eq!(policy.clean("<b>hello</b>"), "<b>hello</b>");
//! assert_eq!(policy.clean("<script>alert(1)</script>"), "");
//! ```

use ammonia::Builder;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Elements that are never emitted, whatever else is allowed.
pub const DISALLOWED_ELEMENTS: [&str; 9] = [
    "body", "embed", "iframe", "meta", "object", "script", "link", "base", "style",
];

/// Disallowed elements whose content is dropped along with the tag.
const DROP_CONTENT_ELEMENTS: &[&str] = &["script", "style", "iframe", "object"];

const FORM_ELEMENTS: &[&str] = &[
    "input", "label", "legend", "textarea", "select", "optgroup", "option", "button", "form",
    "meter", "output", "progress",
];

const EXTRA_ELEMENTS: &[&str] = &[
    "area", "audio", "canvas", "data", "datalist", "del", "details", "dialog", "dir",
    "fieldset", "figcaption", "figure", "footer", "header", "hr", "main", "map", "menu",
    "menuitem", "nav", "param", "picture", "pre", "q", "rp", "rt", "ruby", "s", "samp",
    "section", "source", "strike", "summary", "time", "track", "tt", "u", "var", "video",
    "wbr",
];

const STYLE_PROPERTIES: &[&str] = &[
    "background-color", "border", "border-bottom", "border-collapse", "border-color",
    "border-left", "border-radius", "border-right", "border-spacing", "border-style",
    "border-top", "border-width", "clear", "color", "float", "font", "font-family",
    "font-size", "font-style", "font-variant", "font-weight", "height", "letter-spacing",
    "line-height", "list-style-type", "margin", "margin-bottom", "margin-left", "margin-right",
    "margin-top", "padding", "padding-bottom", "padding-left", "padding-right", "padding-top",
    "text-align", "text-decoration", "width",
];

const TABLE_SECTIONS: &[&str] = &[
    "table", "tr", "td", "th", "colgroup", "col", "thead", "tbody", "tfoot",
];

/// Named allow-list rule sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleSet {
    /// Inline text formatting: `b`, `i`, `em`, `strong`, `span`, ...
    Formatting,
    /// `a[href]` with http, https and mailto targets; links get `rel="nofollow"`
    Links,
    /// `img` with `alt`, `src` and size attributes
    Images,
    /// Paragraphs, divisions, headings, lists and block quotes
    Blocks,
    /// Tables and their sections
    Tables,
    /// The `style` attribute, restricted to a list of CSS properties
    Styles,
}

impl RuleSet {
    pub const ALL: [RuleSet; 6] = [
        RuleSet::Formatting,
        RuleSet::Links,
        RuleSet::Images,
        RuleSet::Blocks,
        RuleSet::Tables,
        RuleSet::Styles,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            RuleSet::Formatting => "formatting",
            RuleSet::Links => "links",
            RuleSet::Images => "images",
            RuleSet::Blocks => "blocks",
            RuleSet::Tables => "tables",
            RuleSet::Styles => "styles",
        }
    }

    /// The rules this set contributes.
    pub fn rules(&self) -> PolicyBuilder {
        let rules = PolicyBuilder::new();
        match self {
            RuleSet::Formatting => rules.allow_elements([
                "b", "i", "font", "s", "u", "o", "sup", "sub", "ins", "del", "strong", "strike",
                "tt", "code", "big", "small", "br", "span", "em",
            ]),
            RuleSet::Links => rules
                .allow_url_schemes(["http", "https", "mailto"])
                .allow_elements(["a"])
                .allow_attributes_on("a", ["href"])
                .require_nofollow(),
            RuleSet::Images => rules
                .allow_url_schemes(["http", "https"])
                .allow_elements(["img"])
                .allow_attributes_on("img", ["alt", "src", "border", "height", "width"]),
            RuleSet::Blocks => rules.allow_elements([
                "p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol", "li", "blockquote",
            ]),
            RuleSet::Tables => {
                let mut rules = rules
                    .allow_elements(TABLE_SECTIONS.iter().copied())
                    .allow_elements(["caption"])
                    .allow_attributes_on("table", ["summary"]);
                for &element in TABLE_SECTIONS {
                    rules = rules.allow_attributes_on(element, ["align", "valign"]);
                }
                rules
                    .allow_attributes_on("td", ["colspan", "rowspan"])
                    .allow_attributes_on("th", ["colspan", "rowspan"])
            }
            RuleSet::Styles => rules
                .allow_global_attributes(["style"])
                .allow_style_properties(STYLE_PROPERTIES.iter().copied()),
        }
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RuleSet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        RuleSet::ALL
            .into_iter()
            .find(|set| set.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown rule set '{}'", wanted))
    }
}

/// Composable description of allowed and disallowed markup.
///
/// Element and attribute names are lowercase; HTML parsing lowercases the
/// input before it is matched against them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyBuilder {
    elements: BTreeSet<&'static str>,
    element_attributes: BTreeMap<&'static str, BTreeSet<&'static str>>,
    global_attributes: BTreeSet<&'static str>,
    url_schemes: BTreeSet<&'static str>,
    style_properties: BTreeSet<&'static str>,
    nofollow: bool,
    disallowed: BTreeSet<&'static str>,
    drop_content: BTreeSet<&'static str>,
}

impl PolicyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow_elements(mut self, names: impl IntoIterator<Item = &'static str>) -> Self {
        self.elements.extend(names);
        self
    }

    pub fn allow_attributes_on(
        mut self,
        element: &'static str,
        attributes: impl IntoIterator<Item = &'static str>,
    ) -> Self {
        self.element_attributes
            .entry(element)
            .or_default()
            .extend(attributes);
        self
    }

    pub fn allow_global_attributes(
        mut self,
        attributes: impl IntoIterator<Item = &'static str>,
    ) -> Self {
        self.global_attributes.extend(attributes);
        self
    }

    pub fn allow_url_schemes(mut self, schemes: impl IntoIterator<Item = &'static str>) -> Self {
        self.url_schemes.extend(schemes);
        self
    }

    pub fn allow_style_properties(
        mut self,
        properties: impl IntoIterator<Item = &'static str>,
    ) -> Self {
        self.style_properties.extend(properties);
        self
    }

    /// Add `rel="nofollow"` to every emitted link.
    pub fn require_nofollow(mut self) -> Self {
        self.nofollow = true;
        self
    }

    /// Never emit these elements. Overrides every allow rule.
    pub fn disallow_elements(mut self, names: impl IntoIterator<Item = &'static str>) -> Self {
        self.disallowed.extend(names);
        self
    }

    /// Drop the content of these elements along with the tags. Implies
    /// disallowing them.
    pub fn drop_content_of(mut self, names: impl IntoIterator<Item = &'static str>) -> Self {
        let names: Vec<&'static str> = names.into_iter().collect();
        self.disallowed.extend(names.iter().copied());
        self.drop_content.extend(names);
        self
    }

    /// Union of two rule sets.
    pub fn and(mut self, other: PolicyBuilder) -> Self {
        self.elements.extend(other.elements);
        for (element, attributes) in other.element_attributes {
            self.element_attributes
                .entry(element)
                .or_default()
                .extend(attributes);
        }
        self.global_attributes.extend(other.global_attributes);
        self.url_schemes.extend(other.url_schemes);
        self.style_properties.extend(other.style_properties);
        self.nofollow |= other.nofollow;
        self.disallowed.extend(other.disallowed);
        self.drop_content.extend(other.drop_content);
        self
    }

    /// Freeze the rules into an immutable policy.
    pub fn build(self) -> HtmlPolicy {
        let cleaner = self.compile();
        HtmlPolicy {
            rules: self,
            cleaner,
        }
    }

    fn is_allowed(&self, element: &str) -> bool {
        self.elements.contains(element) && !self.disallowed.contains(element)
    }

    // `rel` is managed by the cleaner when links are forced to nofollow
    fn attribute_set(&self, attrs: &BTreeSet<&'static str>) -> HashSet<&'static str> {
        attrs
            .iter()
            .copied()
            .filter(|attr| !(self.nofollow && *attr == "rel"))
            .collect()
    }

    fn compile(&self) -> Builder<'static> {
        let tags: HashSet<&'static str> = self
            .elements
            .iter()
            .copied()
            .filter(|el| !self.disallowed.contains(el))
            .collect();

        let tag_attributes: HashMap<&'static str, HashSet<&'static str>> = self
            .element_attributes
            .iter()
            .filter(|(el, _)| tags.contains(*el))
            .map(|(el, attrs)| (*el, self.attribute_set(attrs)))
            .collect();
        let generic_attributes = self.attribute_set(&self.global_attributes);

        let mut cleaner = Builder::empty();
        cleaner
            .clean_content_tags(self.drop_content.iter().copied().collect())
            .tags(tags)
            .tag_attributes(tag_attributes)
            .generic_attributes(generic_attributes)
            .url_schemes(self.url_schemes.iter().copied().collect())
            .link_rel(self.nofollow.then_some("nofollow"))
            .strip_comments(true)
            .attribute_filter(|_element, _attribute, value| Some(strip_angle_brackets(value)));

        if !self.style_properties.is_empty() {
            cleaner.filter_style_properties(self.style_properties.iter().copied().collect());
        }

        cleaner
    }
}

/// Kept attribute values never carry `<` or `>`, whatever the HTML
/// serializer does with them.
fn strip_angle_brackets(value: &str) -> Cow<'_, str> {
    if value.contains(['<', '>']) {
        Cow::Owned(value.replace(['<', '>'], ""))
    } else {
        Cow::Borrowed(value)
    }
}

/// Elements allowed on top of the named rule sets.
pub fn custom_rules() -> PolicyBuilder {
    PolicyBuilder::new()
        .allow_elements(FORM_ELEMENTS.iter().copied())
        .allow_elements(EXTRA_ELEMENTS.iter().copied())
}

/// The terminal deny list.
pub fn disallow_rules() -> PolicyBuilder {
    PolicyBuilder::new()
        .disallow_elements(DISALLOWED_ELEMENTS)
        .drop_content_of(DROP_CONTENT_ELEMENTS.iter().copied())
}

static SHARED: Lazy<Arc<HtmlPolicy>> =
    Lazy::new(|| Arc::new(HtmlPolicy::from_rule_sets(RuleSet::ALL)));

/// Immutable allow-list policy.
///
/// Build it once and share it by `Arc`; cleaning never mutates it, so it can
/// be used from any number of threads at once.
pub struct HtmlPolicy {
    rules: PolicyBuilder,
    cleaner: Builder<'static>,
}

impl HtmlPolicy {
    pub fn builder() -> PolicyBuilder {
        PolicyBuilder::new()
    }

    /// The named rule sets unioned with the custom elements, under the
    /// deny list.
    pub fn from_rule_sets(sets: impl IntoIterator<Item = RuleSet>) -> Self {
        sets.into_iter()
            .fold(PolicyBuilder::new(), |acc, set| acc.and(set.rules()))
            .and(custom_rules())
            .and(disallow_rules())
            .build()
    }

    /// Process-wide policy with every named rule set, built on first use.
    pub fn shared() -> Arc<HtmlPolicy> {
        Arc::clone(&SHARED)
    }

    /// Clean untrusted HTML down to the allowed subset.
    ///
    /// Never fails: malformed or disallowed markup is discarded and the
    /// remaining text is kept, so the worst case is an empty string.
    pub fn clean(&self, raw: &str) -> String {
        self.cleaner.clean(raw).to_string()
    }

    pub fn allows_element(&self, element: &str) -> bool {
        self.rules.is_allowed(&element.to_ascii_lowercase())
    }

    pub fn allows_attribute(&self, element: &str, attribute: &str) -> bool {
        let element = element.to_ascii_lowercase();
        let attribute = attribute.to_ascii_lowercase();
        if !self.rules.is_allowed(&element) {
            return false;
        }
        self.rules.global_attributes.contains(attribute.as_str())
            || self
                .rules
                .element_attributes
                .get(element.as_str())
                .is_some_and(|attrs| attrs.contains(attribute.as_str()))
    }

    /// The composed rules this policy was built from.
    pub fn rules(&self) -> &PolicyBuilder {
        &self.rules
    }
}

impl fmt::Debug for HtmlPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HtmlPolicy")
            .field("rules", &self.rules)
            .finish_non_exhaustive()
    }
}

impl Default for HtmlPolicy {
    fn default() -> Self {
        Self::from_rule_sets(RuleSet::ALL)
    }
}
