/*!
 * Extraction rules.
 *
 * A rule selects an attribute (or the text runs) of elements with a given
 * name. Translatable rules produce the texts that get sent to the gateway;
 * reference rules mark attributes that name a worksheet or dashboard defined
 * elsewhere and only follow a translation that already exists for the same
 * text, which keeps renamed sheets linked to the zones, windows and actions
 * that point at them.
 */

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::document::Element;

use super::filter::{TextFilter, TextFilterConfig};

/// Wildcard element name
pub const ANY_ELEMENT: &str = "*";

/// What a rule contributes to the translation plan
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuleRole {
    /// Text is submitted for translation
    #[default]
    Translatable,
    /// Text follows the translation of an identical translatable text
    Reference,
}

/// Extra attribute test on the element
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttributeCondition {
    /// Attribute to inspect
    pub attribute: String,
    /// Accepted values
    pub one_of: Vec<String>,
}

/// Single extraction rule
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rule {
    /// Element name, `*` for any element
    #[serde(default = "default_element")]
    pub element: String,

    /// Attribute name; `None` selects the element's text runs
    #[serde(default)]
    pub attribute: Option<String>,

    /// Role of the matched text
    #[serde(default)]
    pub role: RuleRole,

    /// Optional condition on another attribute of the element
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<AttributeCondition>,
}

fn default_element() -> String {
    ANY_ELEMENT.to_string()
}

impl Rule {
    /// Rule selecting an attribute
    pub fn attribute(element: &str, attribute: &str, role: RuleRole) -> Self {
        Self {
            element: element.to_string(),
            attribute: Some(attribute.to_string()),
            role,
            when: None,
        }
    }

    /// Rule selecting the text runs of an element
    pub fn text(element: &str) -> Self {
        Self {
            element: element.to_string(),
            attribute: None,
            role: RuleRole::Translatable,
            when: None,
        }
    }

    /// Restrict the rule to elements whose `attribute` is one of `values`
    pub fn when(mut self, attribute: &str, values: &[&str]) -> Self {
        self.when = Some(AttributeCondition {
            attribute: attribute.to_string(),
            one_of: values.iter().map(|v| v.to_string()).collect(),
        });
        self
    }

    /// Whether the rule applies to this element at all
    pub fn applies_to(&self, element: &Element) -> bool {
        if self.element != ANY_ELEMENT && self.element != element.name {
            return false;
        }
        match &self.when {
            None => true,
            Some(condition) => element
                .attribute(&condition.attribute)
                .is_some_and(|value| condition.one_of.iter().any(|v| v == value)),
        }
    }

    /// Short label such as `worksheet@name` or `run#text`
    pub fn label(&self) -> String {
        match &self.attribute {
            Some(attribute) => format!("{}@{}", self.element, attribute),
            None => format!("{}#text", self.element),
        }
    }
}

/// Rule set as stored in the configuration file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractionConfig {
    /// Ordered rules; the first rule matching an attribute wins
    #[serde(default = "default_rules")]
    pub rules: Vec<Rule>,

    /// Texts that are never translated (place names, company names, terms)
    #[serde(default)]
    pub exclusions: Vec<String>,

    /// Natural-language heuristic
    #[serde(default)]
    pub filter: TextFilterConfig,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            rules: default_rules(),
            exclusions: Vec::new(),
            filter: TextFilterConfig::default(),
        }
    }
}

/// Rules for Tableau workbooks
pub fn default_rules() -> Vec<Rule> {
    use RuleRole::{Reference, Translatable};

    vec![
        Rule::attribute("worksheet", "name", Translatable),
        Rule::attribute("dashboard", "name", Translatable),
        Rule::attribute(ANY_ELEMENT, "caption", Translatable),
        Rule::attribute("alias", "value", Translatable),
        Rule::attribute("member", "alias", Translatable),
        Rule::text("run"),
        Rule::attribute(ANY_ELEMENT, "worksheet", Reference),
        Rule::attribute(ANY_ELEMENT, "dashboard", Reference),
        Rule::attribute("zone", "name", Reference),
        Rule::attribute("param", "value", Reference).when("name", &["target"]),
        Rule::attribute("window", "name", Reference).when("class", &["worksheet", "dashboard"]),
        Rule::attribute("thumbnail", "name", Reference),
        Rule::attribute("viewpoint", "name", Reference),
    ]
}

/// Compiled rule set handed to the locator
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<Rule>,
    exclusions: Vec<String>,
    excluded: HashSet<String>,
    filter: TextFilter,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::new(default_rules(), Vec::new(), TextFilter::default())
    }
}

impl RuleSet {
    /// Build a rule set from its parts
    pub fn new(rules: Vec<Rule>, exclusions: Vec<String>, filter: TextFilter) -> Self {
        let excluded = exclusions.iter().cloned().collect();
        Self {
            rules,
            exclusions,
            excluded,
            filter,
        }
    }

    /// Compile the configuration, failing on invalid skip patterns
    pub fn from_config(config: &ExtractionConfig) -> Result<Self, regex::Error> {
        let filter = TextFilter::from_config(&config.filter)?;
        Ok(Self::new(config.rules.clone(), config.exclusions.clone(), filter))
    }

    /// All rules in priority order
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Exclusions in configuration order
    pub fn exclusions(&self) -> &[String] {
        &self.exclusions
    }

    /// Case-sensitive exact membership in the exclusion set
    pub fn is_excluded(&self, text: &str) -> bool {
        self.excluded.contains(text)
    }

    /// Whether a canonical text may become (or follow) a translation unit
    pub fn accepts(&self, text: &str) -> bool {
        !text.is_empty() && !self.is_excluded(text) && self.filter.is_natural_language(text)
    }

    /// Index of the first rule selecting `attribute` on `element`
    pub fn attribute_rule(&self, element: &Element, attribute: &str) -> Option<usize> {
        self.rules.iter().position(|rule| {
            rule.attribute.as_deref() == Some(attribute) && rule.applies_to(element)
        })
    }

    /// Index of the first rule selecting the text runs of `element`
    pub fn text_rule(&self, element: &Element) -> Option<usize> {
        self.rules
            .iter()
            .position(|rule| rule.attribute.is_none() && rule.applies_to(element))
    }
}
