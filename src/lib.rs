//! Story Consent
//!
//! Builds the consent prompt shown inside a story document from the JSON
//! configuration embedded in its markup.
//!
//! # Features
//!
//! - **Strict configuration**: every field is checked, in a fixed order,
//!   with stable user-facing error messages
//! - **Legible buttons**: black or white button text is chosen from the
//!   perceived brightness of the computed background
//! - **Injected services**: the shared store, action allowlist and host
//!   surface are traits, so the build runs the same against a real page or
//!   in-memory fakes
//! - **Markup extraction** (feature `markup`, default): reads the
//!   configuration and consent id straight from HTML
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use story_consent::services::{InMemoryStore, RecordingActions, StaticBackground};
//! use story_consent::{ConsentPrompt, ConsentSource, Rgb};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let source = ConsentSource::new(
//!     r#"{"title": "Cookies", "message": "We use them.", "vendors": []}"#,
//!     "my-consent",
//! );
//! let mut prompt = ConsentPrompt::new(
//!     Arc::new(InMemoryStore::new()),
//!     Arc::new(RecordingActions::new()),
//! );
//! let plan = prompt.build(&source, &StaticBackground::new("rgb(255, 255, 255)"))?;
//! assert_eq!(plan.text_color, Rgb::BLACK);
//! assert_eq!(plan.accept.on, "tap:my-consent.accept");
//! # Ok(())
//! # }
//! ```

pub mod color;
pub mod config;
pub mod error;
pub mod prompt;
pub mod services;

// HTML extraction of the embedded configuration
#[cfg(feature = "markup")]
pub mod markup;

pub use color::{select_foreground_color, BackgroundSample, Rgb};
pub use config::{validate, ConsentConfig, ExternalLink};
pub use error::{ConfigError, ConfigErrorKind, Error, Result};
pub use prompt::{ConsentPrompt, ConsentSource, RenderPlan, Visibility};

/// Options for building a consent prompt
///
/// The defaults match a story rendered on a white page with the standard
/// `<amp-consent>` action namespace.
///
/// # Examples
///
/// ```
/// let opts = story_consent::BuildOptions::default();
/// assert_eq!(opts.allowlist_namespace, "AMP-CONSENT");
/// ```
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Opaque color translucent backgrounds are composited over
    pub canvas: Rgb,
    /// Namespace the consent actions are allowlisted under
    pub allowlist_namespace: String,
    /// Event name used in rendered `on` attributes
    pub tap_event: String,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            canvas: Rgb::WHITE,
            allowlist_namespace: "AMP-CONSENT".to_string(),
            tap_event: "tap".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = BuildOptions::default();
        assert_eq!(opts.canvas, Rgb::WHITE);
        assert_eq!(opts.tap_event, "tap");
    }
}
