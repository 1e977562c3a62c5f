//! Groq vision client — OpenAI-compatible chat completions over SSE.

use super::provider::{InferenceClient, InferenceRequest};
use super::streaming::{SseBuffer, DONE_SENTINEL};
use super::types::{ChatChunk, ChatCompletion, ChatRequest, Usage};
use crate::config::InferenceConfig;
use crate::error::TransportError;
use async_trait::async_trait;
use std::sync::RwLock;

pub struct GroqClient {
    http: reqwest::Client,
    config: InferenceConfig,
    /// Seeded from `config.api_key`; replaced when the user saves a new key.
    api_key: RwLock<Option<String>>,
}

impl GroqClient {
    pub fn new(config: InferenceConfig) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.timeout)
            .read_timeout(config.timeout)
            .build()?;
        let api_key = RwLock::new(config.api_key.clone());
        Ok(Self {
            http,
            config,
            api_key,
        })
    }

    /// Use `key` for every request from now on.
    pub fn set_api_key(&self, key: impl Into<String>) {
        let mut slot = self.api_key.write().unwrap_or_else(|p| p.into_inner());
        *slot = Some(key.into());
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key().is_ok()
    }

    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.api_base.trim_end_matches('/')
        )
    }

    fn api_key(&self) -> Result<String, TransportError> {
        let slot = self.api_key.read().unwrap_or_else(|p| p.into_inner());
        match slot.as_deref() {
            Some(key) if !key.is_empty() => Ok(key.to_string()),
            _ => Err(TransportError::MissingApiKey),
        }
    }

    async fn send(&self, request: &InferenceRequest, stream: bool) -> Result<reqwest::Response, TransportError> {
        let api_key = self.api_key().inspect_err(|_| {
            log::warn!("[LLM] No GROQ_API_KEY set");
        })?;
        let body = ChatRequest::vision(
            &self.config.model,
            self.config.max_tokens,
            &request.prompt,
            request.image.to_data_url(),
            stream,
        );

        log::info!("[LLM] Provider: groq (stream: {})", stream);
        log::info!("[LLM] Model: {}", self.config.model);
        log::debug!(
            "[LLM] Image {}x{} ({} PNG bytes)",
            request.image.width(),
            request.image.height(),
            request.image.png_bytes().len()
        );

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                log::error!("[LLM] HTTP request failed: {}", e);
                TransportError::Http(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("[LLM] Groq API returned {}: {}", status, body);
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

fn log_usage(usage: Option<Usage>) {
    if let Some(usage) = usage {
        log::info!("[LLM] Input tokens: {}", usage.prompt_tokens);
        log::info!("[LLM] Output tokens: {}", usage.completion_tokens);
    }
}

#[async_trait]
impl InferenceClient for GroqClient {
    async fn stream(
        &self,
        request: &InferenceRequest,
        on_fragment: &mut (dyn FnMut(String) + Send),
    ) -> Result<(), TransportError> {
        let start = std::time::Instant::now();
        let mut response = self.send(request, true).await?;
        log::info!("[LLM] TTFB: {}ms", start.elapsed().as_millis());

        let mut sse = SseBuffer::new();
        let mut ttft_logged = false;
        let mut fragments = 0usize;
        let mut usage = None;

        loop {
            match response.chunk().await {
                Ok(Some(chunk)) => {
                    sse.push(&chunk);
                    for data in sse.drain_events() {
                        if data == DONE_SENTINEL {
                            continue;
                        }
                        let chunk: ChatChunk = match serde_json::from_str(&data) {
                            Ok(chunk) => chunk,
                            Err(e) => {
                                log::warn!("[LLM] Skipping undecodable chunk: {} ({})", e, data);
                                continue;
                            }
                        };
                        if let Some(err) = &chunk.error {
                            log::error!("[LLM] Error event mid-stream: {}", err.message);
                            return Err(TransportError::Stream(err.message.clone()));
                        }
                        usage = chunk.usage().or(usage);
                        for choice in chunk.choices {
                            let Some(text) = choice.delta.content else {
                                continue;
                            };
                            if text.is_empty() {
                                continue;
                            }
                            if !ttft_logged {
                                log::info!("[LLM] TTFT: {}ms", start.elapsed().as_millis());
                                ttft_logged = true;
                            }
                            fragments += 1;
                            on_fragment(text);
                        }
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    log::error!("[LLM] Stream error: {}", e);
                    return Err(TransportError::Stream(e.to_string()));
                }
            }
        }

        if sse.pending_len() > 0 {
            log::warn!("[LLM] {} trailing bytes without event terminator", sse.pending_len());
        }
        log::info!(
            "[LLM] Stream complete: {}ms, {} fragment(s)",
            start.elapsed().as_millis(),
            fragments
        );
        log_usage(usage);
        Ok(())
    }

    async fn complete(&self, request: &InferenceRequest) -> Result<String, TransportError> {
        let start = std::time::Instant::now();
        let response = self.send(request, false).await?;
        let completion: ChatCompletion = response
            .json()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))?;
        log::info!("[LLM] Completion: {}ms", start.elapsed().as_millis());
        log_usage(completion.usage);

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| TransportError::Decode("response has no message content".to_string()))
    }
}
