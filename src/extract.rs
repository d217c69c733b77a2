use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

// One storefront attribute block: a dt label paired with a dd value.
static ITEM_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.information-list__item.l-row").unwrap());
static LABEL_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("dt").unwrap());
static VALUE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("dd").unwrap());

static APP_ID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/id(\d+)").unwrap());

/// The fixed set of attribute labels the crawl cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeLabel {
    Compatibility,
    Languages,
}

impl AttributeLabel {
    fn from_text(text: &str) -> Option<Self> {
        match text {
            "Compatibility" => Some(Self::Compatibility),
            "Languages" => Some(Self::Languages),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Compatibility => "Compatibility",
            Self::Languages => "Languages",
        }
    }
}

impl fmt::Display for AttributeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw label -> value pairs extracted from one page. Lives only until
/// normalization; labels outside the fixed set are never stored.
pub type RawAttributeMap = HashMap<AttributeLabel, String>;

/// Pull the labeled attribute blocks out of a storefront page. A missing
/// label is not an extraction failure; normalization reports it.
pub fn attribute_map(html: &str) -> RawAttributeMap {
    let doc = Html::parse_document(html);
    let mut map = RawAttributeMap::new();

    for item in doc.select(&ITEM_SEL) {
        let Some(dt) = item.select(&LABEL_SEL).next() else {
            continue;
        };
        let Some(label) = AttributeLabel::from_text(own_text(dt).trim()) else {
            continue;
        };
        let Some(dd) = item.select(&VALUE_SEL).next() else {
            continue;
        };
        if let Some(value) = attribute_value(dd) {
            map.insert(label, value);
        }
    }

    map
}

// The storefront renders the same semantic value two ways: an aria-label
// attribute on the dd, or plain text inside it. Shapes are tried in order.
const VALUE_STRATEGIES: &[fn(ElementRef) -> Option<String>] = &[aria_label_value, text_value];

fn attribute_value(dd: ElementRef) -> Option<String> {
    VALUE_STRATEGIES.iter().find_map(|strategy| strategy(dd))
}

fn aria_label_value(dd: ElementRef) -> Option<String> {
    dd.value()
        .attr("aria-label")
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(str::to_string)
}

fn text_value(dd: ElementRef) -> Option<String> {
    let text = own_text(dd);
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

fn own_text(el: ElementRef) -> String {
    el.text().collect::<String>()
}

/// A storefront URL without the /id marker cannot name an app.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("no app identifier marker in URL: {0}")]
pub struct IdentifierError(pub String);

/// Derive the numeric app identifier from a storefront URL: the digit run
/// after the /id path marker. Independent of page content.
pub fn app_identifier(url: &str) -> Result<String, IdentifierError> {
    APP_ID_RE
        .captures(url)
        .map(|caps| caps[1].to_string())
        .ok_or_else(|| IdentifierError(url.to_string()))
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(name: &str) -> String {
        std::fs::read_to_string(format!("tests/fixtures/{}.html", name)).unwrap()
    }

    #[test]
    fn aria_label_shape() {
        let map = attribute_map(&fixture("instablend"));
        assert_eq!(
            map.get(&AttributeLabel::Compatibility).map(String::as_str),
            Some("Requires iOS 11.0 or later. Compatible with iPhone, iPad, and iPod touch.")
        );
        assert_eq!(
            map.get(&AttributeLabel::Languages).map(String::as_str),
            Some("English, Spanish, Tagalog")
        );
    }

    #[test]
    fn plain_text_shape() {
        let map = attribute_map(&fixture("banana"));
        assert_eq!(
            map.get(&AttributeLabel::Compatibility).map(String::as_str),
            Some("Requires iOS 13.0 or later. Some devices are not supported.")
        );
        assert_eq!(
            map.get(&AttributeLabel::Languages).map(String::as_str),
            Some("English, French")
        );
    }

    #[test]
    fn absent_label_absent_from_map() {
        let map = attribute_map(&fixture("no_languages"));
        assert!(map.contains_key(&AttributeLabel::Compatibility));
        assert!(!map.contains_key(&AttributeLabel::Languages));
    }

    #[test]
    fn unrelated_labels_ignored() {
        let html = r#"
            <div class="information-list__item l-row">
              <dt>Seller</dt>
              <dd>Example Inc.</dd>
            </div>"#;
        assert!(attribute_map(html).is_empty());
    }

    #[test]
    fn aria_label_preferred_over_text() {
        let html = r#"
            <div class="information-list__item l-row">
              <dt>Languages</dt>
              <dd aria-label="English, Spanish">English and 1 more</dd>
            </div>"#;
        let map = attribute_map(html);
        assert_eq!(
            map.get(&AttributeLabel::Languages).map(String::as_str),
            Some("English, Spanish")
        );
    }

    #[test]
    fn empty_aria_label_falls_back_to_text() {
        let html = r#"
            <div class="information-list__item l-row">
              <dt>Languages</dt>
              <dd aria-label="">English</dd>
            </div>"#;
        let map = attribute_map(html);
        assert_eq!(
            map.get(&AttributeLabel::Languages).map(String::as_str),
            Some("English")
        );
    }

    #[test]
    fn identifier_from_url() {
        assert_eq!(
            app_identifier("https://apps.apple.com/us/app/instablend/id1023").as_deref(),
            Ok("1023")
        );
        assert_eq!(
            app_identifier("https://itunes.apple.com/us/app/id87?mt=8").as_deref(),
            Ok("87")
        );
    }

    #[test]
    fn identifier_missing_marker() {
        let err = app_identifier("https://apps.apple.com/us/app/banana").unwrap_err();
        assert!(err.to_string().contains("banana"));
    }
}
