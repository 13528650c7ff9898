//! Error types for consent prompt configuration and build

use thiserror::Error;

/// Result type alias for consent prompt operations
pub type Result<T> = std::result::Result<T, Error>;

/// Broad class of a configuration failure.
///
/// All classes are fatal to the build; they only differ in where the
/// problem was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigErrorKind {
    /// A required field is missing or has the wrong type
    Shape,
    /// `externalLink` pairing or URL scheme problem
    Link,
    /// The configuration could not be read from the document
    Integration,
}

/// Validation failure for a story consent configuration.
///
/// The `Display` text of every variant is stable and may be matched on by
/// callers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("config requires a title")]
    MissingTitle,

    #[error("config requires a message")]
    MissingMessage,

    #[error("config requires an array of vendors")]
    MissingVendors,

    #[error("config requires \"onlyAccept\" to be a boolean")]
    OnlyAcceptNotBoolean,

    #[error("config requires \"externalLink\" to be an object")]
    ExternalLinkNotObject,

    #[error("config requires \"externalLink.title\" to be a string")]
    ExternalLinkTitle,

    #[error("config requires \"externalLink.href\" to be an absolute URL")]
    ExternalLinkHref,

    /// Carries the rejected href
    #[error("URL must start with \"http://\" or \"https://\"")]
    ExternalLinkScheme(String),

    #[error("story-consent config must be a JSON object")]
    NotAnObject,

    #[error("story-consent config must be inside a <script> tag with type=\"application/json\"")]
    MissingScript,

    #[error("story-consent config is not valid JSON: {0}")]
    MalformedJson(String),
}

impl ConfigError {
    pub fn kind(&self) -> ConfigErrorKind {
        match self {
            ConfigError::MissingTitle
            | ConfigError::MissingMessage
            | ConfigError::MissingVendors
            | ConfigError::OnlyAcceptNotBoolean
            | ConfigError::ExternalLinkNotObject
            | ConfigError::NotAnObject => ConfigErrorKind::Shape,
            ConfigError::ExternalLinkTitle
            | ConfigError::ExternalLinkHref
            | ConfigError::ExternalLinkScheme(_) => ConfigErrorKind::Link,
            ConfigError::MissingScript | ConfigError::MalformedJson(_) => {
                ConfigErrorKind::Integration
            }
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::MalformedJson(err.to_string())
    }
}

/// Errors that can occur while building a consent prompt
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid or unreadable configuration; the message is passed through verbatim
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The background color string could not be parsed
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// No enclosing consent container identifier was found
    #[error("amp-story-consent must be a child of an <amp-consent> element with an id")]
    MissingConsentId,

    /// `build` was called twice on the same prompt
    #[error("consent prompt has already been built")]
    AlreadyBuilt,

    /// An interaction arrived before `build` succeeded
    #[error("consent prompt has not been built")]
    NotBuilt,

    /// Markup could not be processed
    #[error("Markup error: {0}")]
    Markup(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_messages_are_passed_through() {
        let err: Error = ConfigError::MissingVendors.into();
        assert_eq!(err.to_string(), "config requires an array of vendors");
    }

    #[test]
    fn link_errors_are_classified() {
        assert_eq!(ConfigError::ExternalLinkHref.kind(), ConfigErrorKind::Link);
        assert_eq!(
            ConfigError::ExternalLinkScheme("/foo.html".into()).kind(),
            ConfigErrorKind::Link
        );
        assert_eq!(ConfigError::MissingTitle.kind(), ConfigErrorKind::Shape);
        assert_eq!(ConfigError::MissingScript.kind(), ConfigErrorKind::Integration);
    }
}
