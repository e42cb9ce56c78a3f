use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::time::Duration;

use super::{AiService, Turn};
use crate::config::Config;
use crate::error::{ServiceError, ServiceResult};
use crate::image::ImagePayload;

/// Client for the Gemini `generateContent` and Imagen `predict` endpoints
#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_base: String,
    api_key: Option<String>,
    text_model: String,
    image_model: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("api_base", &self.api_base)
            .field("has_api_key", &self.api_key.is_some())
            .field("text_model", &self.text_model)
            .field("image_model", &self.image_model)
            .finish()
    }
}

impl GeminiClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key: config.get_api_key(),
            text_model: config.text_model.clone(),
            image_model: config.image_model.clone(),
        })
    }

    fn api_key(&self) -> ServiceResult<&str> {
        self.api_key.as_deref().ok_or(ServiceError::MissingApiKey)
    }

    fn endpoint(&self, model: &str, method: &str) -> String {
        let model = model.trim();
        let model_path = if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{model}")
        };
        format!("{}/{}:{}", self.api_base, model_path, method)
    }

    /// POST a JSON payload and return the parsed JSON body
    async fn post(&self, url: &str, payload: &Value) -> ServiceResult<Value> {
        let api_key = self.api_key()?;
        let response = self
            .client
            .post(url)
            .query(&[("key", api_key)])
            .header("Content-Type", "application/json")
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<Value>().await?)
    }

    /// Convert turns to Gemini `contents`. Turns without text are skipped
    /// because the API rejects empty parts.
    fn contents(turns: &[Turn]) -> Vec<Value> {
        turns
            .iter()
            .filter(|turn| {
                let keep = !turn.text.trim().is_empty();
                if !keep {
                    tracing::debug!(role = %turn.role, "skipping empty turn");
                }
                keep
            })
            .map(|turn| {
                json!({
                    "role": turn.role.as_ref(),
                    "parts": [{ "text": turn.text }]
                })
            })
            .collect()
    }

    /// `candidates[0].content.parts[0].text`, non-empty
    fn extract_text(response: &Value) -> ServiceResult<String> {
        let text = response
            .get("candidates")
            .and_then(|c| c.get(0))
            .and_then(|candidate| candidate.get("content"))
            .and_then(|content| content.get("parts"))
            .and_then(|parts| parts.get(0))
            .and_then(|part| part.get("text"))
            .and_then(Value::as_str)
            .ok_or(ServiceError::Malformed("candidates[0].content.parts[0].text"))?;

        if text.trim().is_empty() {
            return Err(ServiceError::Malformed("non-empty text"));
        }
        Ok(text.to_string())
    }

    /// `predictions[0].bytesBase64Encoded` as a PNG data URI
    fn extract_image(response: &Value) -> ServiceResult<ImagePayload> {
        let prediction = response
            .get("predictions")
            .and_then(|p| p.get(0))
            .ok_or(ServiceError::Malformed("predictions[0]"))?;

        let encoded = prediction
            .get("bytesBase64Encoded")
            .and_then(Value::as_str)
            .filter(|data| !data.is_empty())
            .ok_or(ServiceError::Malformed("predictions[0].bytesBase64Encoded"))?;

        let mime_type = prediction
            .get("mimeType")
            .and_then(Value::as_str)
            .unwrap_or("image/png");

        Ok(ImagePayload::from_base64(mime_type, encoded))
    }
}

#[async_trait]
impl AiService for GeminiClient {
    #[tracing::instrument(skip(self, turns), fields(model = %self.text_model, turns = turns.len()))]
    async fn generate_text(&self, turns: &[Turn]) -> ServiceResult<String> {
        let url = self.endpoint(&self.text_model, "generateContent");
        let payload = json!({ "contents": Self::contents(turns) });

        let response = self.post(&url, &payload).await?;
        let text = Self::extract_text(&response)?;
        tracing::info!(chars = text.chars().count(), "text generation completed");
        Ok(text)
    }

    #[tracing::instrument(skip(self, image), fields(model = %self.text_model))]
    async fn analyze_image(&self, prompt: &str, image: &ImagePayload) -> ServiceResult<String> {
        let inline = image.inline_data().ok_or(ServiceError::InvalidImage)?;
        let url = self.endpoint(&self.text_model, "generateContent");
        let payload = json!({
            "contents": [{
                "role": "user",
                "parts": [
                    { "text": prompt },
                    {
                        "inlineData": {
                            "mimeType": inline.mime_type,
                            "data": inline.data
                        }
                    }
                ]
            }]
        });

        let response = self.post(&url, &payload).await?;
        let text = Self::extract_text(&response)?;
        tracing::info!(chars = text.chars().count(), "image analysis completed");
        Ok(text)
    }

    #[tracing::instrument(skip(self), fields(model = %self.image_model))]
    async fn generate_image(&self, prompt: &str) -> ServiceResult<ImagePayload> {
        let url = self.endpoint(&self.image_model, "predict");
        let payload = json!({
            "instances": { "prompt": prompt },
            "parameters": { "sampleCount": 1 }
        });

        let response = self.post(&url, &payload).await?;
        let image = Self::extract_image(&response)?;
        tracing::info!(size = image.approx_size().unwrap_or_default(), "image generation completed");
        Ok(image)
    }
}
