//! Machine translation of foreign-language items.
//!
//! The module uses a trait-based design:
//! - [`Translate`]: one call to a translation backend
//! - [`GoogleTranslate`]: the free web endpoint, over the shared HTTP client
//! - [`Translator`]: the policy layer that decides what to translate, keeps
//!   originals, paces calls and swallows per-item failures
//!
//! # Policy
//!
//! - Only items classified [`Language::Foreign`] have their title translated.
//! - Summaries are checked with the language heuristic on their own text.
//! - A backend answer identical to the input counts as "not translated".
//! - Input is cut to [`MAX_INPUT_CHARS`] characters before submission.
//! - A failed call keeps the original text; items are never dropped.

use crate::models::{Item, Language};
use crate::utils::{is_foreign_text, truncate_chars, truncate_for_log};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{info, instrument, warn};

/// Backend length limit, in characters.
pub const MAX_INPUT_CHARS: usize = 4500;

/// Pause between consecutive backend calls.
pub const CALL_PAUSE: Duration = Duration::from_millis(300);

const GOOGLE_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("translation request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("translation response was not JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unexpected translation response: {0}")]
    Shape(&'static str),
}

/// A translation backend with a fixed language pair.
pub trait Translate {
    /// Translate `text`, returning the backend's output.
    async fn translate(&self, text: &str) -> Result<String, TranslateError>;
}

/// The free Google Translate web endpoint.
#[derive(Debug, Clone)]
pub struct GoogleTranslate {
    client: Client,
    endpoint: String,
    source: String,
    target: String,
}

impl GoogleTranslate {
    /// Create a backend translating from `source` to `target` (ISO 639-1 codes).
    pub fn new(client: Client, source: &str, target: &str) -> Self {
        Self {
            client,
            endpoint: GOOGLE_ENDPOINT.to_string(),
            source: source.to_string(),
            target: target.to_string(),
        }
    }

    /// Point the backend at a different endpoint.
    #[cfg(test)]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

impl Translate for GoogleTranslate {
    async fn translate(&self, text: &str) -> Result<String, TranslateError> {
        let body = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", self.source.as_str()),
                ("tl", self.target.as_str()),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        parse_google_response(&body)
    }
}

/// The endpoint answers `[[["translated", "original", ...], ...], ...]`;
/// the translation is the concatenation of every segment's first element.
fn parse_google_response(body: &str) -> Result<String, TranslateError> {
    let value: Value = serde_json::from_str(body)?;
    let segments = value
        .get(0)
        .and_then(Value::as_array)
        .ok_or(TranslateError::Shape("missing segment list"))?;
    let translated: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();
    if translated.is_empty() {
        return Err(TranslateError::Shape("empty translation"));
    }
    Ok(translated)
}

/// Applies the translation policy to a run's items.
#[derive(Debug)]
pub struct Translator<T> {
    backend: T,
    pause: Duration,
}

impl<T: Translate> Translator<T> {
    pub fn new(backend: T, pause: Duration) -> Self {
        Self { backend, pause }
    }

    /// Translate every foreign item, returning the list in the same order.
    #[instrument(level = "info", skip_all, fields(items = items.len()))]
    pub async fn translate_items(&self, mut items: Vec<Item>) -> Vec<Item> {
        let foreign = items.iter().filter(|item| item.language == Language::Foreign).count();
        if foreign == 0 {
            return items;
        }
        info!(foreign, "Translating foreign-language items");

        let mut calls = 0usize;
        for (done, item) in items
            .iter_mut()
            .filter(|item| item.language == Language::Foreign)
            .enumerate()
        {
            let original = item.title.clone();
            item.translated_title = self.translate_text(&original, &mut calls).await;
            item.original_title = Some(original);
            if item.translated_title.is_some() {
                info!(
                    progress = done + 1,
                    total = foreign,
                    title = %truncate_for_log(&item.title, 40),
                    "Translated title"
                );
            }

            if !item.summary.is_empty() && is_foreign_text(&item.summary) {
                let summary = item.summary.clone();
                item.translated_summary = self.translate_text(&summary, &mut calls).await;
            }
        }

        let translated = items.iter().filter(|item| item.was_translated()).count();
        info!(translated, "Translation complete");
        items
    }

    /// One paced backend call; `None` when the call failed or changed nothing.
    async fn translate_text(&self, text: &str, calls: &mut usize) -> Option<String> {
        if *calls > 0 {
            sleep(self.pause).await;
        }
        *calls += 1;

        let input = truncate_chars(text, MAX_INPUT_CHARS);
        match self.backend.translate(&input).await {
            Ok(output) if output != input => Some(output),
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, text = %truncate_for_log(text, 50), "Translation skipped");
                None
            }
        }
    }
}
