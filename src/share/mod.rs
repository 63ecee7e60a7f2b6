//! Share links that carry the current count, and the `count` import on open.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Url;
use serde::Serialize;

use crate::settings::ShareSettings;

mod terminal;

pub use terminal::TerminalShare;

pub const COUNT_PARAM: &str = "count";

pub const COPIED_NOTICE: &str = "Link copied to clipboard!";
pub const COPY_FAILED_NOTICE: &str = "Could not copy link.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShareData {
    pub title: String,
    pub text: String,
    pub url: String,
}

impl ShareData {
    pub fn new(settings: &ShareSettings, current_count: u64) -> Result<Self> {
        let mut url = Url::parse(&settings.base_url)
            .with_context(|| format!("invalid share base URL {}", settings.base_url))?;

        let text = if current_count > 0 {
            set_count_param(&mut url, current_count);
            format!(
                "I have completed {current_count} Pradakshina rounds in this session. Join me on the path."
            )
        } else {
            "Track your spiritual circumambulation journey with Pradakshina Path.".to_string()
        };

        Ok(Self {
            title: settings.title.clone(),
            text,
            url: url.to_string(),
        })
    }
}

/// A positive round count, as accepted from a link or typed input.
pub fn parse_count(raw: &str) -> Option<u64> {
    raw.trim().parse::<u64>().ok().filter(|count| *count > 0)
}

fn set_count_param(url: &mut Url, count: u64) {
    let others: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != COUNT_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let mut pairs = url.query_pairs_mut();
    pairs.clear();
    pairs.extend_pairs(others);
    pairs.append_pair(COUNT_PARAM, &count.to_string());
}

/// The address the journal was opened with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    url: Url,
}

impl Location {
    pub fn parse(raw: &str) -> Result<Self> {
        let url = Url::parse(raw).with_context(|| format!("invalid link {raw}"))?;
        Ok(Self { url })
    }

    /// The shared count, when the `count` parameter holds a positive integer.
    pub fn shared_count(&self) -> Option<u64> {
        self.url
            .query_pairs()
            .find(|(key, _)| key == COUNT_PARAM)
            .and_then(|(_, value)| parse_count(&value))
    }

    /// Drop every `count` parameter so reopening the address does not import again.
    pub fn strip_count(&mut self) {
        let others: Vec<(String, String)> = self
            .url
            .query_pairs()
            .filter(|(key, _)| key != COUNT_PARAM)
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        if others.is_empty() {
            self.url.set_query(None);
        } else {
            self.url.query_pairs_mut().clear().extend_pairs(others);
        }
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }
}

/// Platform hooks for handing a link to the user.
#[async_trait]
pub trait ShareChannel: Send + Sync {
    fn supports_native_share(&self) -> bool;
    async fn share_native(&self, data: &ShareData) -> Result<()>;
    async fn copy_to_clipboard(&self, text: &str) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareOutcome {
    Shared,
    Copied,
    Failed,
}

impl ShareOutcome {
    pub fn notice(self) -> Option<&'static str> {
        match self {
            ShareOutcome::Shared => None,
            ShareOutcome::Copied => Some(COPIED_NOTICE),
            ShareOutcome::Failed => Some(COPY_FAILED_NOTICE),
        }
    }
}

/// Native share first, then the clipboard, then give up with a notice.
pub async fn share_link(channel: &dyn ShareChannel, data: &ShareData) -> ShareOutcome {
    if channel.supports_native_share() {
        match channel.share_native(data).await {
            Ok(()) => return ShareOutcome::Shared,
            Err(err) => log::error!("Error sharing: {err:#}"),
        }
    }

    match channel.copy_to_clipboard(&data.url).await {
        Ok(()) => ShareOutcome::Copied,
        Err(err) => {
            log::warn!("Clipboard copy failed: {err:#}");
            ShareOutcome::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use std::sync::Mutex;

    fn settings() -> ShareSettings {
        ShareSettings::default()
    }

    #[test]
    fn link_carries_positive_count() {
        let data = ShareData::new(&settings(), 21).unwrap();
        assert_eq!(data.url, "https://pradakshina.app/?count=21");
        assert_eq!(data.title, "Pradakshina Path");
        assert!(data.text.contains("completed 21 Pradakshina rounds"));
    }

    #[test]
    fn zero_count_link_has_no_parameter() {
        let data = ShareData::new(&settings(), 0).unwrap();
        assert_eq!(data.url, "https://pradakshina.app/");
        assert_eq!(
            data.text,
            "Track your spiritual circumambulation journey with Pradakshina Path."
        );
    }

    #[test]
    fn existing_count_in_base_is_replaced() {
        let custom = ShareSettings {
            base_url: "http://localhost:5173/path?lang=en&count=3".into(),
            ..ShareSettings::default()
        };
        let data = ShareData::new(&custom, 9).unwrap();
        assert_eq!(data.url, "http://localhost:5173/path?lang=en&count=9");
    }

    #[test]
    fn parse_count_accepts_only_positive_integers() {
        assert_eq!(parse_count("21"), Some(21));
        assert_eq!(parse_count(" 108 "), Some(108));
        assert_eq!(parse_count("0"), None);
        assert_eq!(parse_count("-5"), None);
        assert_eq!(parse_count("abc"), None);
        assert_eq!(parse_count(""), None);
    }

    #[test]
    fn location_reads_and_strips_count() {
        let mut location = Location::parse("https://pradakshina.app/?count=21").unwrap();
        assert_eq!(location.shared_count(), Some(21));

        location.strip_count();
        assert_eq!(location.as_str(), "https://pradakshina.app/");
        assert_eq!(location.shared_count(), None);
    }

    #[test]
    fn strip_keeps_unrelated_parameters() {
        let mut location = Location::parse("https://pradakshina.app/?count=4&lang=hi").unwrap();
        location.strip_count();
        assert_eq!(location.as_str(), "https://pradakshina.app/?lang=hi");
    }

    #[test]
    fn invalid_count_is_not_imported() {
        let location = Location::parse("https://pradakshina.app/?count=abc").unwrap();
        assert_eq!(location.shared_count(), None);
    }

    #[derive(Default)]
    struct RecordingChannel {
        native: bool,
        native_fails: bool,
        clipboard_fails: bool,
        copied: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ShareChannel for RecordingChannel {
        fn supports_native_share(&self) -> bool {
            self.native
        }

        async fn share_native(&self, _data: &ShareData) -> Result<()> {
            if self.native_fails {
                bail!("share sheet dismissed");
            }
            Ok(())
        }

        async fn copy_to_clipboard(&self, text: &str) -> Result<()> {
            if self.clipboard_fails {
                bail!("clipboard unavailable");
            }
            self.copied.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    #[tokio::test]
    async fn native_share_is_preferred() {
        let channel = RecordingChannel {
            native: true,
            ..Default::default()
        };
        let data = ShareData::new(&settings(), 3).unwrap();

        assert_eq!(share_link(&channel, &data).await, ShareOutcome::Shared);
        assert!(channel.copied.lock().unwrap().is_empty());
        assert_eq!(ShareOutcome::Shared.notice(), None);
    }

    #[tokio::test]
    async fn failed_native_share_falls_back_to_clipboard() {
        let channel = RecordingChannel {
            native: true,
            native_fails: true,
            ..Default::default()
        };
        let data = ShareData::new(&settings(), 3).unwrap();

        let outcome = share_link(&channel, &data).await;
        assert_eq!(outcome, ShareOutcome::Copied);
        assert_eq!(outcome.notice(), Some(COPIED_NOTICE));
        assert_eq!(
            channel.copied.lock().unwrap().as_slice(),
            ["https://pradakshina.app/?count=3".to_string()]
        );
    }

    #[tokio::test]
    async fn clipboard_failure_reports_notice() {
        let channel = RecordingChannel {
            clipboard_fails: true,
            ..Default::default()
        };
        let data = ShareData::new(&settings(), 0).unwrap();

        let outcome = share_link(&channel, &data).await;
        assert_eq!(outcome, ShareOutcome::Failed);
        assert_eq!(outcome.notice(), Some(COPY_FAILED_NOTICE));
    }
}
