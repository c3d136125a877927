//! Configuration for document expiry
//!
//! `ExpirySettings` is the raw section as written in the configuration file.
//! It is validated once into an immutable `ExpiryConfig`, which is what every
//! component receives.

use crate::JanitorError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Placeholder written into a document after its content has been removed
pub const DEFAULT_REPLACEMENT_TEXT: &str =
    "The content of this document has been deleted since it was older than the configured delay.";

/// Raw expiry settings as read from the configuration file
///
/// Numbers are kept signed so that invalid values can be reported instead of
/// failing to parse.
///
/// # Examples
///
/// ```
/// use lapse_janitor::ExpirySettings;
///
/// let settings = ExpirySettings {
///     delay: Some(86_400),
///     ..Default::default()
/// };
/// let config = settings.validate().unwrap();
/// assert_eq!(config.delay_secs(), 86_400);
/// assert!(config.loop_enabled());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpirySettings {
    /// Idle delay in seconds after which a document expires (required)
    #[serde(default)]
    pub delay: Option<i64>,

    /// Run sweeps repeatedly
    /// Default: true
    #[serde(rename = "loop", default = "default_true")]
    pub loop_enabled: bool,

    /// Seconds between the end of one pass's submission and the next pass
    /// Default: 3600
    #[serde(alias = "loopDelay", default = "default_loop_delay")]
    pub loop_delay: i64,

    /// Run one pass immediately at startup
    /// Default: true
    #[serde(alias = "deleteAtStart", default = "default_true")]
    pub delete_at_start: bool,

    /// Replacement text for expired documents
    #[serde(default)]
    pub text: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_loop_delay() -> i64 {
    3600
}

impl Default for ExpirySettings {
    fn default() -> Self {
        Self {
            delay: None,
            loop_enabled: true,
            loop_delay: default_loop_delay(),
            delete_at_start: true,
            text: None,
        }
    }
}

impl ExpirySettings {
    /// Validate the settings into an immutable configuration
    ///
    /// Every problem found is reported in a single error.
    pub fn validate(self) -> Result<ExpiryConfig, JanitorError> {
        let mut problems = Vec::new();

        let delay = match self.delay {
            Some(d) if d > 0 => d as u64,
            Some(d) => {
                problems.push(format!("delay must be a positive number of seconds (got {})", d));
                0
            }
            None => {
                problems.push("delay is required".to_string());
                0
            }
        };

        if self.loop_delay <= 0 {
            problems.push(format!(
                "loop_delay must be a positive number of seconds (got {})",
                self.loop_delay
            ));
        }

        if !problems.is_empty() {
            return Err(JanitorError::Config(problems.join("; ")));
        }

        let replacement_text = match self.text {
            Some(text) if !text.is_empty() => text,
            _ => DEFAULT_REPLACEMENT_TEXT.to_string(),
        };

        Ok(ExpiryConfig {
            delay_secs: delay,
            loop_enabled: self.loop_enabled,
            loop_delay_secs: self.loop_delay as u64,
            delete_at_start: self.delete_at_start,
            replacement_text,
        })
    }
}

/// Validated expiry configuration
///
/// Constructed once at startup through [`ExpirySettings::validate`] and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiryConfig {
    delay_secs: u64,
    loop_enabled: bool,
    loop_delay_secs: u64,
    delete_at_start: bool,
    replacement_text: String,
}

impl ExpiryConfig {
    /// Idle delay in seconds
    pub fn delay_secs(&self) -> u64 {
        self.delay_secs
    }

    /// Idle delay as Duration
    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }

    /// Whether sweeps repeat
    pub fn loop_enabled(&self) -> bool {
        self.loop_enabled
    }

    /// Pause between passes as Duration
    pub fn loop_delay(&self) -> Duration {
        Duration::from_secs(self.loop_delay_secs)
    }

    /// Whether a pass runs at startup
    pub fn delete_at_start(&self) -> bool {
        self.delete_at_start
    }

    /// Text written into expired documents
    pub fn replacement_text(&self) -> &str {
        &self.replacement_text
    }
}
