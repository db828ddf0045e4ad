use std::time::Duration;

use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::text::truncate_chars;

/// Texts shorter than this are returned as-is.
const MIN_TRANSLATABLE_CHARS: usize = 3;

/// Upstream error bodies are cut to this many characters.
const ERROR_BODY_CHARS: usize = 300;

#[derive(Clone, Debug)]
pub struct TranslatorConfig {
    pub base_url: String,
    pub source_lang: String,
    pub target_lang: String,
    pub default_timeout: Duration,
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub chunk_chars: usize,
    /// Pause after every successful request.
    pub success_pause: Duration,
    /// Pause between the chunks of one long text.
    pub chunk_pause: Duration,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            base_url: "https://translate.googleapis.com/translate_a/single".to_string(),
            source_lang: "en".to_string(),
            target_lang: "es".to_string(),
            default_timeout: Duration::from_secs(30),
            max_retries: 3,
            initial_backoff: Duration::from_millis(2_000),
            max_backoff: Duration::from_millis(8_000),
            chunk_chars: 4_500,
            success_pause: Duration::from_millis(300),
            chunk_pause: Duration::from_millis(500),
        }
    }
}

impl TranslatorConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let base_url = std::env::var("TRANSLATE_BASE_URL").unwrap_or(defaults.base_url);
        let source_lang = std::env::var("TRANSLATE_SOURCE_LANG").unwrap_or(defaults.source_lang);
        let target_lang = std::env::var("TRANSLATE_TARGET_LANG").unwrap_or(defaults.target_lang);

        let default_timeout = std::env::var("TRANSLATE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.default_timeout);

        let max_retries = std::env::var("TRANSLATE_MAX_RETRIES")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(defaults.max_retries);

        let initial_backoff = std::env::var("TRANSLATE_RETRY_INITIAL_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.initial_backoff);

        let max_backoff = std::env::var("TRANSLATE_RETRY_MAX_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.max_backoff);

        let chunk_chars = std::env::var("TRANSLATE_CHUNK_CHARS")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(defaults.chunk_chars);

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            source_lang,
            target_lang,
            default_timeout,
            max_retries,
            initial_backoff,
            max_backoff,
            chunk_chars,
            ..defaults
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("invalid response JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("upstream returned error: status={status} body={body}")]
    Upstream { status: StatusCode, body: String },

    #[error("response carried no translated segments")]
    EmptyTranslation,
}

impl TranslateError {
    /// Timeouts, dropped connections, rate limiting and 5xx are worth another attempt.
    fn is_transient(&self) -> bool {
        match self {
            Self::Request(e) => e.is_timeout() || e.is_connect() || e.is_body(),
            Self::Upstream { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            Self::InvalidJson(_) | Self::EmptyTranslation => false,
        }
    }
}

/// Client for a Google-Translate-compatible `translate_a/single` endpoint.
///
/// Requests are issued one at a time; callers get the original text back whenever
/// the service cannot produce a translation.
#[derive(Clone)]
pub struct TranslateClient {
    config: TranslatorConfig,
    http: reqwest::Client,
}

impl TranslateClient {
    pub fn new(config: TranslatorConfig) -> Result<Self, TranslateError> {
        let http = reqwest::Client::builder()
            .user_agent("morphology-atlas/term-translate")
            .build()?;
        Ok(Self { config, http })
    }

    /// Translate `text`, falling back to the original on any persistent failure.
    ///
    /// Long texts are split into `chunk_chars` pieces, translated in order and joined
    /// with a single space.
    pub async fn translate_text(&self, text: &str) -> String {
        if text.trim().chars().count() < MIN_TRANSLATABLE_CHARS {
            return text.to_string();
        }

        let chunks = chunk_text(text, self.config.chunk_chars);
        let mut translated = Vec::with_capacity(chunks.len());
        for (i, chunk) in chunks.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.config.chunk_pause).await;
            }
            match self.translate_chunk(chunk).await {
                Ok(out) => translated.push(out),
                Err(e) => {
                    warn!(
                        error = %e,
                        preview = %truncate_chars(text, 50),
                        "translation failed, keeping original text"
                    );
                    return text.to_string();
                }
            }
        }
        translated.join(" ")
    }

    /// One chunk, retried on transient failures. Every success is followed by
    /// `success_pause` to stay under the service's rate limit.
    async fn translate_chunk(&self, chunk: &str) -> Result<String, TranslateError> {
        let mut retry = 0;
        loop {
            match self.request(chunk).await {
                Ok(translated) => {
                    debug!(chars = chunk.chars().count(), retries = retry, "translated chunk");
                    tokio::time::sleep(self.config.success_pause).await;
                    return Ok(translated);
                }
                Err(e) if retry < self.config.max_retries && e.is_transient() => {
                    retry += 1;
                    let delay = retry_delay(&self.config, retry);
                    warn!(
                        retry,
                        delay_ms = delay.as_millis(),
                        error = %e,
                        "translation request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn request(&self, chunk: &str) -> Result<String, TranslateError> {
        let resp = self
            .http
            .get(&self.config.base_url)
            .timeout(self.config.default_timeout)
            .query(&[
                ("client", "gtx"),
                ("sl", self.config.source_lang.as_str()),
                ("tl", self.config.target_lang.as_str()),
                ("dt", "t"),
                ("q", chunk),
            ])
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(TranslateError::Upstream {
                status,
                body: truncate_chars(&body, ERROR_BODY_CHARS),
            });
        }
        let value: serde_json::Value = serde_json::from_str(&body)?;
        parse_translation(&value).ok_or(TranslateError::EmptyTranslation)
    }
}

/// Wait before retry `retry` (1-based): `initial_backoff` doubled per earlier retry,
/// capped at `max_backoff`.
fn retry_delay(config: &TranslatorConfig, retry: u32) -> Duration {
    let factor = 2u32.saturating_pow(retry.saturating_sub(1));
    config
        .initial_backoff
        .saturating_mul(factor)
        .min(config.max_backoff)
}

/// Concatenate the translated segments `[0][i][0]` of a `dt=t` response.
pub fn parse_translation(value: &serde_json::Value) -> Option<String> {
    let segments = value.get(0)?.as_array()?;
    let out: String = segments
        .iter()
        .filter_map(|seg| seg.get(0).and_then(|s| s.as_str()))
        .collect();
    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}

/// Split `text` into consecutive pieces of at most `max_chars` characters.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(max_chars)
        .map(|piece| piece.iter().collect())
        .collect()
}
