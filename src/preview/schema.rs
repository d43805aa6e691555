use ammonia::Builder;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use super::PreviewError;

/// Conservative baseline: text-level and block formatting, links, images
/// and task-list checkboxes. No tables.
const BASELINE_TAGS: &[&str] = &[
    "a", "b", "blockquote", "br", "code", "dd", "del", "details", "div", "dl", "dt", "em", "h1",
    "h2", "h3", "h4", "h5", "h6", "hr", "i", "img", "input", "ins", "kbd", "li", "ol", "p", "pre",
    "q", "rp", "rt", "ruby", "s", "samp", "span", "strike", "strong", "sub", "summary", "sup",
    "tt", "ul", "var",
];

const BASELINE_ATTRIBUTES: &[(&str, &[&str])] = &[
    ("a", &["href", "title"]),
    ("blockquote", &["cite"]),
    ("del", &["cite"]),
    ("img", &["src", "alt", "title", "width", "height"]),
    ("input", &["checked", "disabled"]),
    ("ins", &["cite"]),
    ("ol", &["start"]),
    ("q", &["cite"]),
];

const BASELINE_URL_SCHEMES: &[&str] = &["http", "https", "mailto"];

const TABLE_TAGS: &[&str] = &["table", "thead", "tbody", "tr", "th", "td"];

const TABLE_ATTRIBUTES: &[(&str, &[&str])] = &[
    ("table", &["class"]),
    ("th", &["colspan", "rowspan", "align"]),
    ("td", &["colspan", "rowspan", "align"]),
    ("code", &["class"]),
];

/// Tags an operator layer may never allow.
const FORBIDDEN_TAGS: &[&str] = &[
    "base", "embed", "form", "frame", "frameset", "iframe", "link", "meta", "object", "script",
    "style",
];

/// Attributes an operator layer may never allow, besides `on*` handlers.
const FORBIDDEN_ATTRIBUTES: &[&str] = &["formaction", "srcdoc", "style"];

/// One layer of allow-list additions, as written in configuration.
///
/// Tags are added to the allowed set. An attribute entry replaces whatever
/// the earlier layers allowed for that tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SchemaLayer {
    pub tags: Vec<String>,
    pub attributes: BTreeMap<String, Vec<String>>,
}

impl SchemaLayer {
    fn from_static(tags: &[&str], attributes: &[(&str, &[&str])]) -> Self {
        Self {
            tags: tags.iter().map(|t| t.to_string()).collect(),
            attributes: attributes
                .iter()
                .map(|(tag, attrs)| {
                    (
                        tag.to_string(),
                        attrs.iter().map(|a| a.to_string()).collect(),
                    )
                })
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty() && self.attributes.is_empty()
    }

    /// Reject entries that would let script execution or style injection
    /// through the sanitizer.
    pub fn validate(&self) -> Result<(), PreviewError> {
        for tag in self.tags.iter().chain(self.attributes.keys()) {
            let tag = tag.trim();
            if tag.is_empty() {
                return Err(PreviewError::EmptyName);
            }
            if FORBIDDEN_TAGS.contains(&tag.to_ascii_lowercase().as_str()) {
                return Err(PreviewError::ForbiddenTag(tag.to_string()));
            }
        }

        for (tag, attributes) in &self.attributes {
            for attribute in attributes {
                let name = attribute.trim().to_ascii_lowercase();
                if name.is_empty() {
                    return Err(PreviewError::EmptyName);
                }
                if name.starts_with("on") || FORBIDDEN_ATTRIBUTES.contains(&name.as_str()) {
                    return Err(PreviewError::ForbiddenAttribute {
                        tag: tag.clone(),
                        attribute: attribute.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Allow-list of HTML tags and per-tag attributes for rendered previews.
///
/// Anything not listed is removed by [`Schema::cleaner`]: disallowed elements
/// are unwrapped (their text stays), disallowed attributes are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    tags: BTreeSet<String>,
    attributes: BTreeMap<String, BTreeSet<String>>,
    attribute_values: BTreeMap<String, BTreeMap<String, BTreeSet<String>>>,
    url_schemes: BTreeSet<String>,
}

impl Schema {
    pub fn baseline() -> Self {
        let mut schema = Self {
            tags: BTreeSet::new(),
            attributes: BTreeMap::new(),
            attribute_values: BTreeMap::new(),
            url_schemes: BASELINE_URL_SCHEMES.iter().map(|s| s.to_string()).collect(),
        };
        schema.apply(&SchemaLayer::from_static(BASELINE_TAGS, BASELINE_ATTRIBUTES));
        // Checkboxes only ever come from task lists.
        schema.attribute_values.insert(
            "input".into(),
            BTreeMap::from([("type".into(), BTreeSet::from(["checkbox".into()]))]),
        );
        schema
    }

    /// The baseline extended with table markup.
    pub fn with_tables() -> Self {
        let mut schema = Self::baseline();
        schema.apply(&SchemaLayer::from_static(TABLE_TAGS, TABLE_ATTRIBUTES));
        schema
    }

    /// Apply an operator-supplied layer on top of this schema.
    pub fn merge(mut self, layer: &SchemaLayer) -> Result<Self, PreviewError> {
        layer.validate()?;
        self.apply(layer);
        Ok(self)
    }

    fn apply(&mut self, layer: &SchemaLayer) {
        self.tags
            .extend(layer.tags.iter().map(|t| t.trim().to_ascii_lowercase()));
        for (tag, attributes) in &layer.attributes {
            self.attributes.insert(
                tag.trim().to_ascii_lowercase(),
                attributes
                    .iter()
                    .map(|a| a.trim().to_ascii_lowercase())
                    .collect(),
            );
        }
    }

    pub fn allows_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn allows_attribute(&self, tag: &str, attribute: &str) -> bool {
        self.attributes
            .get(tag)
            .is_some_and(|attrs| attrs.contains(attribute))
            || self
                .attribute_values
                .get(tag)
                .is_some_and(|attrs| attrs.contains_key(attribute))
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    /// An `ammonia` sanitizer configured from this schema and nothing else.
    pub fn cleaner(&self) -> Builder<'_> {
        let tags: HashSet<&str> = self.tags().collect();
        let tag_attributes: HashMap<&str, HashSet<&str>> = self
            .attributes
            .iter()
            .map(|(tag, attrs)| (tag.as_str(), attrs.iter().map(String::as_str).collect()))
            .collect();
        let tag_attribute_values: HashMap<&str, HashMap<&str, HashSet<&str>>> = self
            .attribute_values
            .iter()
            .map(|(tag, attrs)| {
                let attrs = attrs
                    .iter()
                    .map(|(attr, values)| {
                        (attr.as_str(), values.iter().map(String::as_str).collect())
                    })
                    .collect();
                (tag.as_str(), attrs)
            })
            .collect();
        let url_schemes: HashSet<&str> = self.url_schemes.iter().map(String::as_str).collect();

        let mut builder = Builder::new();
        builder
            .tags(tags)
            .tag_attributes(tag_attributes)
            .tag_attribute_values(tag_attribute_values)
            .generic_attributes(HashSet::new())
            .url_schemes(url_schemes)
            .link_rel(None);
        builder
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::with_tables()
    }
}
