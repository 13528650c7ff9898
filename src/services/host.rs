//! Host surface queries used while building the prompt

use crate::color::BackgroundSample;
use crate::Result;

/// Reports the effective background color behind the consent prompt.
pub trait BackgroundProvider {
    /// Computed `background-color` string, e.g. `rgb(0, 0, 0)`
    fn background_color(&self) -> Result<String>;

    fn background_sample(&self) -> Result<BackgroundSample> {
        self.background_color()?.parse()
    }
}

/// A fixed computed color, as a stubbed `getComputedStyle` would return
#[derive(Debug, Clone)]
pub struct StaticBackground(pub String);

impl StaticBackground {
    pub fn new(color: impl Into<String>) -> Self {
        StaticBackground(color.into())
    }
}

impl BackgroundProvider for StaticBackground {
    fn background_color(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

impl<F> BackgroundProvider for F
where
    F: Fn() -> Result<String>,
{
    fn background_color(&self) -> Result<String> {
        self()
    }
}
