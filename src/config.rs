use std::path::Path;
use std::time::Duration;

use anyhow::{Result, ensure};
use serde::Deserialize;

/// Ids of pre-built slot elements, used when the viewer does not build its own scaffold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct ElementIds {
    pub container1: String,
    pub img1: String,
    pub link1: Option<String>,
    pub container2: String,
    pub img2: String,
    pub link2: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Configuration {
    /// Placeholder source shown by freshly built slots.
    pub blank_image: String,
    /// Transparency added to one slot and removed from the other per fade step.
    pub fade_step: u8,
    /// Interval between fade steps.
    #[serde(with = "humantime_serde")]
    pub fade_time: Duration,
    /// Time a settled image stays on screen before the slideshow advances.
    #[serde(with = "humantime_serde")]
    pub slideshow_delay: Duration,
    /// Advance the slideshow randomly instead of sequentially.
    pub slideshow_random: bool,
    /// Wrap around at both ends of the album instead of stopping.
    pub endless_album: bool,
    /// Fade the outgoing slot as well as the incoming one.
    pub fade_both: bool,
    /// Whether each slot carries a link element pointing at the image.
    pub enable_links: bool,
    /// Loads that finish within this window never raise `loading_started`.
    #[serde(with = "humantime_serde")]
    pub loading_grace: Duration,
    /// Optional deterministic seed for random navigation.
    pub random_seed: Option<u64>,
    /// Element to build the default scaffold into.
    pub container: Option<String>,
    /// Pre-built slot elements, consulted when `container` is absent or unknown.
    pub elements: Option<ElementIds>,
    /// Maximum number of image loads the loader runs at once.
    pub loader_max_concurrent_loads: usize,
}

impl Configuration {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let s = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&s)?)
    }

    /// Validate runtime invariants that cannot be expressed via serde defaults alone.
    pub fn validated(self) -> Result<Self> {
        ensure!(
            (1..=100).contains(&self.fade_step),
            "fade-step must be between 1 and 100"
        );
        ensure!(!self.fade_time.is_zero(), "fade-time must be positive");
        ensure!(
            !self.slideshow_delay.is_zero(),
            "slideshow-delay must be positive"
        );
        ensure!(
            !self.blank_image.trim().is_empty(),
            "blank-image must not be blank"
        );
        ensure!(
            self.loader_max_concurrent_loads > 0,
            "loader-max-concurrent-loads must be greater than zero"
        );
        ensure!(
            self.container.is_some() || self.elements.is_some(),
            "either container or elements must be configured"
        );
        if let Some(container) = &self.container {
            ensure!(
                !container.trim().is_empty(),
                "container must not be blank when provided"
            );
        }
        Ok(self)
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            blank_image: "images/blank.png".to_string(),
            fade_step: 2,
            fade_time: Duration::from_millis(12),
            slideshow_delay: Duration::from_millis(5000),
            slideshow_random: false,
            endless_album: true,
            fade_both: true,
            enable_links: true,
            loading_grace: Duration::from_millis(10),
            random_seed: None,
            container: None,
            elements: None,
            loader_max_concurrent_loads: 4,
        }
    }
}
