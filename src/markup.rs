//! Reading the consent configuration out of story markup.
//!
//! Expected structure:
//!
//! ```html
//! <amp-consent id="CONSENT_ID">
//!   <amp-story-consent>
//!     <script type="application/json">{ ... }</script>
//!   </amp-story-consent>
//! </amp-consent>
//! ```

use scraper::{ElementRef, Html, Selector};

use crate::prompt::ConsentSource;
use crate::{Error, Result};

const STORY_CONSENT_TAG: &str = "amp-story-consent";
const CONSENT_TAG: &str = "amp-consent";

/// Extract the first story consent found in `html`.
///
/// A missing configuration script or consent container is not an error
/// here; it is left empty in the returned [`ConsentSource`] and reported
/// when the prompt is built.
pub fn extract(html: &str) -> Result<ConsentSource> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(STORY_CONSENT_TAG)
        .map_err(|e| Error::Markup(format!("invalid selector: {:?}", e)))?;

    let element = document
        .select(&selector)
        .next()
        .ok_or_else(|| Error::Markup(format!("no <{}> element found", STORY_CONSENT_TAG)))?;

    Ok(ConsentSource {
        config_json: config_script(element)?,
        consent_id: consent_id(element),
    })
}

// The config must be the element's only direct <script> child.
fn config_script(element: ElementRef<'_>) -> Result<Option<String>> {
    let scripts: Vec<ElementRef<'_>> = element
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name() == "script")
        .collect();

    let script = match scripts.as_slice() {
        [] => return Ok(None),
        [script] => script,
        _ => {
            return Err(Error::Markup(format!(
                "<{}> must have exactly one <script> child, found {}",
                STORY_CONSENT_TAG,
                scripts.len()
            )))
        }
    };

    let is_json = script
        .value()
        .attr("type")
        .map(|t| t.trim().eq_ignore_ascii_case("application/json"))
        .unwrap_or(false);
    Ok(is_json.then(|| script.text().collect::<String>()))
}

fn consent_id(element: ElementRef<'_>) -> Option<String> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|a| a.value().name() == CONSENT_TAG)
        .and_then(|a| a.value().attr("id"))
        .map(str::to_string)
}
