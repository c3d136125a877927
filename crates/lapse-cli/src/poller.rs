//! TTL polling against a Lapse router.
//!
//! Polls back off as the expiry gets further away: a document that will
//! live for days is checked about once an hour, one that is minutes away
//! every ten minutes.

use crate::error::{CliError, Result};
use colored::Colorize;
use std::fmt;
use std::time::Duration;

pub use lapse_janitor::TtlResponse;

const SECONDS_PER_DAY: i64 = 86_400;
const SECONDS_PER_HOUR: i64 = 3_600;

/// Delay before the very first poll.
pub const FIRST_POLL: Duration = Duration::from_secs(1);

/// Delay while the server reports no TTL.
const UNKNOWN_TTL_POLL: Duration = Duration::from_secs(1);
const DAYS_POLL: Duration = Duration::from_secs(3_500);
const HOURS_POLL: Duration = Duration::from_secs(1_800);
const MINUTES_POLL: Duration = Duration::from_secs(600);

/// Expiry warning shown to the user, in the largest sensible unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Notice {
    /// More than a day left
    Days(f64),
    /// More than an hour left
    Hours(f64),
    /// An hour or less left
    Minutes(f64),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Days(n) => write!(f, "This document will expire in {} days", n),
            Notice::Hours(n) => write!(f, "This document will expire in {} hours", n),
            Notice::Minutes(n) => write!(f, "This document will expire in {} minutes", n),
        }
    }
}

/// Outcome of one poll: when to poll next and what to show.
#[derive(Debug, Clone, PartialEq)]
pub struct PollStep {
    /// Wait before the next poll
    pub delay: Duration,
    /// Warning to show, if any
    pub notice: Option<Notice>,
}

/// Truncate to one decimal place.
fn one_decimal(value: f64) -> f64 {
    (value * 10.0).floor() / 10.0
}

/// Decide the next poll delay and notice for a reported TTL.
///
/// A TTL of zero or less means the document is due for the next sweep;
/// nothing is shown and the previous delay is kept.
pub fn next_poll(ttl: Option<i64>, previous: Duration) -> PollStep {
    let Some(ttl) = ttl else {
        return PollStep {
            delay: UNKNOWN_TTL_POLL,
            notice: None,
        };
    };

    if ttl <= 0 {
        return PollStep {
            delay: previous,
            notice: None,
        };
    }

    let secs = ttl as f64;
    let (delay, notice) = if ttl > SECONDS_PER_DAY {
        (DAYS_POLL, Notice::Days(one_decimal(secs / SECONDS_PER_DAY as f64)))
    } else if ttl > SECONDS_PER_HOUR {
        (HOURS_POLL, Notice::Hours(one_decimal(secs / SECONDS_PER_HOUR as f64)))
    } else {
        (MINUTES_POLL, Notice::Minutes(one_decimal(secs / 60.0)))
    };

    PollStep {
        delay,
        notice: Some(notice),
    }
}

/// Print a notice the way `watch` shows it.
pub fn print_notice(document_id: &str, notice: &Notice) {
    println!("{} {}", format!("[{}]", document_id).cyan(), notice.to_string().yellow());
}

/// HTTP client for the router's TTL endpoint.
pub struct TtlClient {
    http: reqwest::Client,
    base_url: reqwest::Url,
}

impl TtlClient {
    /// Create a client for a router base URL such as `http://127.0.0.1:9001`.
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = reqwest::Url::parse(base_url)
            .map_err(|e| CliError::InvalidInput(format!("bad router URL '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(CliError::InvalidInput(format!(
                "router URL '{}' cannot carry a path",
                base_url
            )));
        }

        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
        })
    }

    /// URL of the TTL endpoint for a document, with the id percent-encoded.
    pub fn ttl_url(&self, document_id: &str) -> Result<reqwest::Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| CliError::InvalidInput(format!("router URL '{}' cannot carry a path", self.base_url)))?
            .pop_if_empty()
            .push("ttl")
            .push(document_id);
        Ok(url)
    }

    /// Query the remaining TTL of a document once.
    pub async fn fetch(&self, document_id: &str) -> Result<TtlResponse> {
        let response = self.http.get(self.ttl_url(document_id)?).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CliError::Server {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_ttl_polls_fast() {
        let step = next_poll(None, Duration::from_secs(1800));
        assert_eq!(step.delay, Duration::from_secs(1));
        assert_eq!(step.notice, None);
    }

    #[test]
    fn test_days_tier() {
        let step = next_poll(Some(2 * 86_400 + 43_200), FIRST_POLL);
        assert_eq!(step.delay, Duration::from_secs(3500));
        assert_eq!(step.notice, Some(Notice::Days(2.5)));
    }

    #[test]
    fn test_hours_tier_truncates() {
        // 7199 s = 1.99972 h, truncated rather than rounded
        let step = next_poll(Some(7_199), FIRST_POLL);
        assert_eq!(step.delay, Duration::from_secs(1800));
        assert_eq!(step.notice, Some(Notice::Hours(1.9)));
    }

    #[test]
    fn test_tier_boundaries() {
        // Exactly one day and one hour fall into the tier below
        assert_eq!(next_poll(Some(86_400), FIRST_POLL).notice, Some(Notice::Hours(24.0)));
        assert_eq!(next_poll(Some(3_600), FIRST_POLL).notice, Some(Notice::Minutes(60.0)));
    }

    #[test]
    fn test_minutes_tier() {
        let step = next_poll(Some(90), FIRST_POLL);
        assert_eq!(step.delay, Duration::from_secs(600));
        assert_eq!(step.notice, Some(Notice::Minutes(1.5)));
    }

    #[test]
    fn test_non_positive_ttl_keeps_previous_delay() {
        let previous = Duration::from_secs(1800);
        assert_eq!(
            next_poll(Some(0), previous),
            PollStep {
                delay: previous,
                notice: None
            }
        );
        assert_eq!(next_poll(Some(-3600), previous).delay, previous);
    }

    #[test]
    fn test_notice_display() {
        assert_eq!(
            Notice::Hours(1.9).to_string(),
            "This document will expire in 1.9 hours"
        );
        assert_eq!(
            Notice::Days(3.0).to_string(),
            "This document will expire in 3 days"
        );
    }

    #[test]
    fn test_ttl_url_encodes_document_id() {
        let client = TtlClient::new("http://127.0.0.1:9001/").unwrap();
        assert_eq!(
            client.ttl_url("my notes").unwrap().as_str(),
            "http://127.0.0.1:9001/ttl/my%20notes"
        );

        let prefixed = TtlClient::new("http://docs.example.org/lapse").unwrap();
        assert_eq!(
            prefixed.ttl_url("a/b").unwrap().as_str(),
            "http://docs.example.org/lapse/ttl/a%2Fb"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            TtlClient::new("not a url"),
            Err(CliError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_router_body_drives_next_poll() {
        let body: TtlResponse =
            serde_json::from_str(r#"{"ttl": null, "msg": "New or empty document"}"#).unwrap();
        assert_eq!(body.msg.as_deref(), Some(lapse_janitor::NEW_DOCUMENT_MSG));
        assert_eq!(next_poll(body.ttl, HOURS_POLL).delay, UNKNOWN_TTL_POLL);

        let body: TtlResponse = serde_json::from_str(r#"{"ttl": 5400}"#).unwrap();
        assert_eq!(next_poll(body.ttl, FIRST_POLL).notice, Some(Notice::Hours(1.5)));
    }
}
