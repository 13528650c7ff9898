//! Consent prompt build: turns the embedded configuration and the host
//! background into a [`RenderPlan`], registering the consent with the shared
//! store and the action allowlist on the way.
//!
//! The plan is plain data. Creating and styling elements from it is left to
//! whichever surface hosts the prompt.

use std::sync::Arc;

use log::{debug, warn};
use serde::Serialize;
use serde_json::Value;

use crate::color::{select_foreground_color_over, BackgroundSample, Rgb};
use crate::config::ConsentConfig;
use crate::error::ConfigError;
use crate::services::{ActionInvocation, ActionService, BackgroundProvider, StateProperty, StoreService};
use crate::{BuildOptions, Error, Result};

/// Actions of the consent container that elements inside the prompt may trigger
pub const CONSENT_ACTIONS: [&str; 3] = ["accept", "prompt", "reject"];

pub const ACCEPT_BUTTON_CLASS: &str = "i-amphtml-story-consent-action-accept";
pub const REJECT_BUTTON_CLASS: &str = "i-amphtml-story-consent-action-reject";
pub const EXTERNAL_LINK_CLASS: &str = "i-amphtml-story-consent-external-link";

/// Raw inputs read from the document: the JSON text of the configuration
/// script (if one was found) and the id of the enclosing consent container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsentSource {
    pub config_json: Option<String>,
    pub consent_id: Option<String>,
}

impl ConsentSource {
    pub fn new(config_json: impl Into<String>, consent_id: impl Into<String>) -> Self {
        Self {
            config_json: Some(config_json.into()),
            consent_id: Some(consent_id.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Block,
    None,
}

impl Visibility {
    fn shown_if(cond: bool) -> Self {
        if cond {
            Visibility::Block
        } else {
            Visibility::None
        }
    }

    /// CSS `display` value
    pub fn as_css(self) -> &'static str {
        match self {
            Visibility::Block => "block",
            Visibility::None => "none",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ButtonPlan {
    pub class: &'static str,
    /// `on` attribute wiring the button to the consent container
    pub on: String,
    /// Inline style; carries the contrast color override
    pub style: String,
    pub display: Visibility,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkPlan {
    pub class: &'static str,
    pub title: Option<String>,
    pub href: Option<String>,
    pub display: Visibility,
}

/// Everything the host needs to render one consent prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderPlan {
    pub consent_id: String,
    pub config: ConsentConfig,
    pub text_color: Rgb,
    pub accept: ButtonPlan,
    pub reject: ButtonPlan,
    pub external_link: LinkPlan,
}

/// Builds a consent prompt against injected page services.
///
/// A prompt is built at most once; the consent id is written to the store
/// exactly once per instance.
pub struct ConsentPrompt {
    store: Arc<dyn StoreService>,
    actions: Arc<dyn ActionService>,
    options: BuildOptions,
    plan: Option<RenderPlan>,
}

impl ConsentPrompt {
    pub fn new(store: Arc<dyn StoreService>, actions: Arc<dyn ActionService>) -> Self {
        Self::with_options(store, actions, BuildOptions::default())
    }

    pub fn with_options(
        store: Arc<dyn StoreService>,
        actions: Arc<dyn ActionService>,
        options: BuildOptions,
    ) -> Self {
        Self {
            store,
            actions,
            options,
            plan: None,
        }
    }

    /// The plan produced by a successful [`build`](Self::build)
    pub fn plan(&self) -> Option<&RenderPlan> {
        self.plan.as_ref()
    }

    /// Validate the configuration, pick the button text color and register
    /// the consent with the store and allowlist.
    ///
    /// Every fallible step runs before the store or allowlist is touched, so
    /// a failed build leaves no registrations behind.
    pub fn build(
        &mut self,
        source: &ConsentSource,
        background: &dyn BackgroundProvider,
    ) -> Result<&RenderPlan> {
        if self.plan.is_some() {
            return Err(Error::AlreadyBuilt);
        }

        let json = source
            .config_json
            .as_deref()
            .ok_or(ConfigError::MissingScript)?;
        let config = ConsentConfig::from_json_str(json).map_err(|e| {
            warn!("rejected story consent config: {}", e);
            e
        })?;

        let consent_id = source
            .consent_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or(Error::MissingConsentId)?
            .to_string();

        // An unrecognized computed color only costs contrast; read the text
        // against the canvas instead.
        let sample = match background.background_sample() {
            Ok(sample) => sample,
            Err(Error::InvalidColor(color)) => {
                warn!(
                    "unsupported background color {:?}, using canvas {}",
                    color, self.options.canvas
                );
                BackgroundSample::from(self.options.canvas)
            }
            Err(e) => return Err(e),
        };
        let text_color = select_foreground_color_over(sample, self.options.canvas);

        self.store
            .set(StateProperty::ConsentId, Value::String(consent_id.clone()));
        for action in CONSENT_ACTIONS {
            self.actions
                .add_to_allowlist(&self.options.allowlist_namespace, action);
        }
        debug!(
            "built consent prompt {} ({} vendors, text color {})",
            consent_id,
            config.vendors().len(),
            text_color
        );

        let style = text_color.to_important_style();
        let event = &self.options.tap_event;
        let link = config.external_link();
        let plan = RenderPlan {
            accept: ButtonPlan {
                class: ACCEPT_BUTTON_CLASS,
                on: format!("{}:{}.accept", event, consent_id),
                style: style.clone(),
                display: Visibility::Block,
            },
            reject: ButtonPlan {
                class: REJECT_BUTTON_CLASS,
                on: format!("{}:{}.reject", event, consent_id),
                style,
                display: Visibility::shown_if(!config.only_accept()),
            },
            external_link: LinkPlan {
                class: EXTERNAL_LINK_CLASS,
                title: link.title().map(str::to_string),
                href: link.href().map(str::to_string),
                display: Visibility::shown_if(link.is_complete()),
            },
            text_color,
            consent_id,
            config,
        };

        Ok(self.plan.insert(plan))
    }

    /// Forward a tap on an element inside the prompt to the action service.
    ///
    /// `on` is the element's `on` attribute, if it has one. Returns how many
    /// handlers were triggered.
    pub fn dispatch_tap(&self, on: Option<&str>) -> Result<usize> {
        if self.plan.is_none() {
            return Err(Error::NotBuilt);
        }
        let Some(on) = on else {
            return Ok(0);
        };

        let mut count = 0;
        for invocation in ActionInvocation::parse_all(on)
            .into_iter()
            .filter(|inv| inv.event == self.options.tap_event)
        {
            debug!("triggering {}", invocation);
            self.actions.trigger(&invocation);
            count += 1;
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{InMemoryStore, RecordingActions, StaticBackground};
    use serde_json::json;

    const CONSENT_ID: &str = "CONSENT_ID";

    fn default_config() -> Value {
        json!({
            "title": "Foo title.",
            "message": "Foo message about the consent.",
            "vendors": ["Item 1", "Item 2"],
            "onlyAccept": false,
            "externalLink": {},
        })
    }

    fn prompt() -> (ConsentPrompt, Arc<InMemoryStore>, Arc<RecordingActions>) {
        let store = Arc::new(InMemoryStore::new());
        let actions = Arc::new(RecordingActions::new());
        let p = ConsentPrompt::new(store.clone(), actions.clone());
        (p, store, actions)
    }

    fn source(config: &Value) -> ConsentSource {
        ConsentSource::new(config.to_string(), CONSENT_ID)
    }

    #[test]
    fn failed_build_registers_nothing() {
        let (mut p, store, actions) = prompt();
        let mut cfg = default_config();
        cfg.as_object_mut().unwrap().remove("title");
        let err = p
            .build(&source(&cfg), &StaticBackground::new("rgb(0, 0, 0)"))
            .unwrap_err();
        assert_eq!(err.to_string(), "config requires a title");
        assert!(store.get(StateProperty::ConsentId).is_none());
        assert!(actions.allowlist().is_empty());
        assert!(p.plan().is_none());
    }

    #[test]
    fn unsupported_background_falls_back_to_canvas() {
        let (mut p, store, actions) = prompt();
        let plan = p
            .build(
                &source(&default_config()),
                &StaticBackground::new("oklch(0.5 0.1 30)"),
            )
            .expect("build renders without contrast input");
        assert_eq!(plan.text_color, Rgb::BLACK);
        assert_eq!(
            store.get(StateProperty::ConsentId),
            Some(Value::from(CONSENT_ID))
        );
        assert_eq!(actions.allowlist().len(), 3);
    }

    #[test]
    fn host_failure_fails_before_registration() {
        let (mut p, store, actions) = prompt();
        let detached = || -> Result<String> { Err(Error::Markup("surface detached".into())) };
        let err = p.build(&source(&default_config()), &detached).unwrap_err();
        assert!(matches!(err, Error::Markup(_)));
        assert!(store.get(StateProperty::ConsentId).is_none());
        assert!(actions.allowlist().is_empty());
    }

    #[test]
    fn missing_script_is_reported() {
        let (mut p, _, _) = prompt();
        let src = ConsentSource {
            config_json: None,
            consent_id: Some(CONSENT_ID.into()),
        };
        let err = p.build(&src, &StaticBackground::new("rgb(0, 0, 0)")).unwrap_err();
        assert!(err.to_string().contains("<script> tag"));
    }

    #[test]
    fn missing_consent_id_is_reported() {
        let (mut p, _, _) = prompt();
        let src = ConsentSource {
            config_json: Some(default_config().to_string()),
            consent_id: Some(String::new()),
        };
        let err = p.build(&src, &StaticBackground::new("rgb(0, 0, 0)")).unwrap_err();
        assert!(matches!(err, Error::MissingConsentId));
    }

    #[test]
    fn second_build_is_rejected() {
        let (mut p, _, actions) = prompt();
        let bg = StaticBackground::new("rgb(0, 0, 0)");
        p.build(&source(&default_config()), &bg).unwrap();
        assert!(matches!(
            p.build(&source(&default_config()), &bg),
            Err(Error::AlreadyBuilt)
        ));
        assert_eq!(actions.allowlist().len(), 3);
    }

    #[test]
    fn custom_namespace_and_canvas() {
        let store = Arc::new(InMemoryStore::new());
        let actions = Arc::new(RecordingActions::new());
        let options = BuildOptions {
            allowlist_namespace: "MY-CONSENT".into(),
            canvas: Rgb::BLACK,
            ..Default::default()
        };
        let mut p = ConsentPrompt::with_options(store, actions.clone(), options);
        let plan = p
            .build(&source(&default_config()), &StaticBackground::new("transparent"))
            .unwrap();
        assert_eq!(plan.text_color, Rgb::WHITE);
        assert!(actions
            .allowlist()
            .iter()
            .all(|e| e.namespace == "MY-CONSENT"));
    }

    #[test]
    fn taps_before_build_are_rejected() {
        let (p, _, _) = prompt();
        assert!(matches!(
            p.dispatch_tap(Some("tap:ABC.accept")),
            Err(Error::NotBuilt)
        ));
    }

    #[test]
    fn only_tap_handlers_are_dispatched() {
        let (mut p, _, actions) = prompt();
        p.build(&source(&default_config()), &StaticBackground::new("rgb(0, 0, 0)"))
            .unwrap();
        assert_eq!(p.dispatch_tap(None).unwrap(), 0);
        assert_eq!(
            p.dispatch_tap(Some("change:ABC.prompt;tap:ABC.accept")).unwrap(),
            1
        );
        assert_eq!(
            actions.triggered(),
            vec![ActionInvocation::new("tap", "ABC", "accept")]
        );
    }
}
