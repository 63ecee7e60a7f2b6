//! Short reflective text for a completed count of rounds.
//!
//! Generation is best effort. [`InsightGenerator::attempt`] keeps track of
//! which tier produced the text, [`InsightGenerator::generate`] collapses that
//! to plain text that is always safe to show.

use std::{sync::Arc, time::Duration};

use anyhow::Result;
use async_trait::async_trait;

use crate::settings::InsightSettings;
use crate::{log_error, log_info, log_warn};

mod gemini;

pub use gemini::{GeminiClient, DEFAULT_GEMINI_ENDPOINT, DEFAULT_GEMINI_MODEL};

const ENABLE_LOGS: bool = true;

pub const NO_CREDENTIAL_FALLBACK: &str =
    "Focus on your breath and your path. The journey inward is the true destination.";
pub const EMPTY_RESPONSE_FALLBACK: &str =
    "Every step taken in devotion brings you closer to the center of your being.";
pub const REQUEST_FAILED_FALLBACK: &str = "Every step is a prayer. Keep moving forward.";

/// Remote text generation. `Ok(None)` means the service answered with nothing.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate_text(&self, prompt: &str) -> Result<Option<String>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    MissingCredential,
    EmptyResponse,
    RequestFailed,
}

impl FallbackReason {
    pub fn text(self) -> &'static str {
        match self {
            FallbackReason::MissingCredential => NO_CREDENTIAL_FALLBACK,
            FallbackReason::EmptyResponse => EMPTY_RESPONSE_FALLBACK,
            FallbackReason::RequestFailed => REQUEST_FAILED_FALLBACK,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsightOutcome {
    Generated(String),
    Fallback(FallbackReason),
}

impl InsightOutcome {
    pub fn into_text(self) -> String {
        match self {
            InsightOutcome::Generated(text) => text,
            InsightOutcome::Fallback(reason) => reason.text().to_string(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, InsightOutcome::Fallback(_))
    }
}

#[derive(Clone, Default)]
pub struct InsightGenerator {
    client: Option<Arc<dyn TextGenerator>>,
}

impl InsightGenerator {
    pub fn new(client: Arc<dyn TextGenerator>) -> Self {
        Self {
            client: Some(client),
        }
    }

    /// A generator with no credential; always answers with the static text.
    pub fn disabled() -> Self {
        Self { client: None }
    }

    /// Builds the Gemini-backed generator, or a disabled one when no usable
    /// API key is configured.
    pub fn from_settings(settings: &InsightSettings, api_key: Option<String>) -> Result<Self> {
        let Some(api_key) = api_key.filter(|key| !key.trim().is_empty()) else {
            log_warn!("API key not found. Insight generation will use static text.");
            return Ok(Self::disabled());
        };

        let client = GeminiClient::new(
            api_key.trim(),
            settings.model.clone(),
            settings.endpoint.clone(),
            Duration::from_secs(settings.timeout_secs),
        )?;
        log_info!("Insight generation enabled with model {}", client.model());
        Ok(Self::new(Arc::new(client)))
    }

    pub fn is_enabled(&self) -> bool {
        self.client.is_some()
    }

    pub async fn attempt(&self, count: u64) -> InsightOutcome {
        let Some(client) = &self.client else {
            return InsightOutcome::Fallback(FallbackReason::MissingCredential);
        };

        match client.generate_text(&build_prompt(count)).await {
            Ok(Some(text)) if !text.trim().is_empty() => {
                InsightOutcome::Generated(text.trim().to_string())
            }
            Ok(_) => {
                log_warn!("Insight service returned no text for {count} rounds");
                InsightOutcome::Fallback(FallbackReason::EmptyResponse)
            }
            Err(err) => {
                log_error!("Insight generation failed: {err:#}");
                InsightOutcome::Fallback(FallbackReason::RequestFailed)
            }
        }
    }

    pub async fn generate(&self, count: u64) -> String {
        self.attempt(count).await.into_text()
    }
}

pub fn build_prompt(count: u64) -> String {
    format!(
        "The user has just completed {count} rounds of Pradakshina (circumambulation).\n\
         Please provide a very brief (max 2 sentences), serene, and spiritually uplifting quote \
         or insight related to the number {count} if it has significance (like 3, 7, 11, 21, 108), \
         or generally about the act of walking meditation, devotion, or cycles of time in \
         Hindu/Indic philosophy.\n\
         Tone: Peaceful, encouraging, timeless."
    )
}
