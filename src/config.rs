//! Story consent configuration: schema checks and normalization.
//!
//! The configuration is authored as a JSON object inside the consent
//! markup. [`validate`] checks it field by field in a fixed order (required
//! fields first, then `onlyAccept`, then `externalLink`) and returns the
//! first failure, so a given input always produces the same message.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ConfigError;

/// Optional link rendered under the consent message.
///
/// Either both fields are set or neither is; [`validate`] rejects
/// anything in between.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExternalLink {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    href: Option<String>,
}

impl ExternalLink {
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn href(&self) -> Option<&str> {
        self.href.as_deref()
    }

    /// Whether the link has both a title and a target and should be shown
    pub fn is_complete(&self) -> bool {
        self.title.is_some() && self.href.is_some()
    }
}

/// A validated consent configuration.
///
/// Only obtainable through [`validate`] (or the helpers built on it), and
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentConfig {
    title: String,
    message: String,
    vendors: Vec<String>,
    only_accept: bool,
    external_link: ExternalLink,
}

impl ConsentConfig {
    /// Parse JSON text and validate the resulting object
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let raw: Value = serde_json::from_str(text)?;
        validate(&raw)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn vendors(&self) -> &[String] {
        &self.vendors
    }

    pub fn only_accept(&self) -> bool {
        self.only_accept
    }

    pub fn external_link(&self) -> &ExternalLink {
        &self.external_link
    }

    /// Normalized JSON form. Feeding it back into [`validate`] yields an
    /// equal configuration.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl TryFrom<&Value> for ConsentConfig {
    type Error = ConfigError;

    fn try_from(raw: &Value) -> Result<Self, Self::Error> {
        validate(raw)
    }
}

/// Validate a raw configuration object.
pub fn validate(raw: &Value) -> Result<ConsentConfig, ConfigError> {
    let obj = raw.as_object().ok_or(ConfigError::NotAnObject)?;

    let title = required_string(obj, "title").ok_or(ConfigError::MissingTitle)?;
    let message = required_string(obj, "message").ok_or(ConfigError::MissingMessage)?;
    let vendors = vendor_list(obj).ok_or(ConfigError::MissingVendors)?;

    let only_accept = match obj.get("onlyAccept") {
        None => false,
        Some(Value::Bool(b)) => *b,
        Some(_) => return Err(ConfigError::OnlyAcceptNotBoolean),
    };

    let external_link = match obj.get("externalLink") {
        None | Some(Value::Null) => ExternalLink::default(),
        Some(Value::Object(link)) => external_link(link)?,
        Some(_) => return Err(ConfigError::ExternalLinkNotObject),
    };

    Ok(ConsentConfig {
        title,
        message,
        vendors,
        only_accept,
        external_link,
    })
}

fn required_string(obj: &Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn vendor_list(obj: &Map<String, Value>) -> Option<Vec<String>> {
    obj.get("vendors")?
        .as_array()?
        .iter()
        .map(|v| v.as_str().map(str::to_string))
        .collect()
}

// Falsy values (null, false, 0, "") count as absent.
fn link_field<'a>(link: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    link.get(key).filter(|v| !is_falsy(v))
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn external_link(link: &Map<String, Value>) -> Result<ExternalLink, ConfigError> {
    let title = link_field(link, "title");
    let href = link_field(link, "href");

    match (title, href) {
        (None, None) => Ok(ExternalLink::default()),
        (None, Some(_)) => Err(ConfigError::ExternalLinkTitle),
        (Some(_), None) => Err(ConfigError::ExternalLinkHref),
        (Some(title), Some(href)) => {
            let title = title.as_str().ok_or(ConfigError::ExternalLinkTitle)?;
            let href = href
                .as_str()
                .ok_or_else(|| ConfigError::ExternalLinkScheme(href.to_string()))?;
            if !is_http_or_https(href) {
                return Err(ConfigError::ExternalLinkScheme(href.to_string()));
            }
            Ok(ExternalLink {
                title: Some(title.to_string()),
                href: Some(href.to_string()),
            })
        }
    }
}

fn is_http_or_https(href: &str) -> bool {
    let scheme_len = match href.find("://") {
        Some(idx) => idx,
        None => return false,
    };
    let scheme = &href[..scheme_len];
    scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https")
}
