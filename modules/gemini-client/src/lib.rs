pub mod error;
pub mod types;

pub use error::{GeminiError, Result};
pub use types::{Candidate, Content, GenerateRequest, GenerateResponse, GenerationConfig, Part};

use serde::de::DeserializeOwned;

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        tracing::debug!(model = %self.model, "Gemini generateContent request");

        let resp = self.client.post(&url).json(request).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GeminiError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(resp.json().await?)
    }

    /// Generate a plain-text completion for a single prompt.
    pub async fn generate_text(&self, prompt: &str) -> Result<String> {
        let request = GenerateRequest::from_prompt(prompt);
        let response = self.generate(&request).await?;
        let text = response.text().ok_or(GeminiError::Empty)?;
        Ok(text.trim().to_string())
    }

    /// Generate a JSON completion and deserialize it into `T`.
    /// Requests JSON output mode, but still strips markdown fences:
    /// some model versions wrap JSON in ``` blocks regardless.
    pub async fn generate_json<T: DeserializeOwned>(&self, prompt: &str) -> Result<T> {
        let request = GenerateRequest::from_prompt(prompt).json_mode();
        let response = self.generate(&request).await?;
        let text = response.text().ok_or(GeminiError::Empty)?;
        let cleaned = strip_code_fences(&text);
        Ok(serde_json::from_str(cleaned)?)
    }
}

/// Remove a surrounding ```json ... ``` (or bare ```) fence, if present.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_json_fence() {
        let fenced = "```json\n{\"ok\": true}\n```";
        assert_eq!(strip_code_fences(fenced), "{\"ok\": true}");
    }

    #[test]
    fn strips_bare_fence() {
        let fenced = "```\n{\"ok\": true}\n```";
        assert_eq!(strip_code_fences(fenced), "{\"ok\": true}");
    }

    #[test]
    fn leaves_plain_json_alone() {
        assert_eq!(strip_code_fences("  {\"ok\": true} "), "{\"ok\": true}");
    }
}
