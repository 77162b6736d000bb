use serde::{Deserialize, Serialize};

// --- Request ---

#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    pub contents: Vec<Content>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

impl GenerateRequest {
    /// Single-turn user prompt.
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: prompt.into(),
                }],
            }],
            generation_config: None,
        }
    }

    pub fn json_mode(mut self) -> Self {
        self.generation_config = Some(GenerationConfig {
            response_mime_type: Some("application/json".to_string()),
            temperature: None,
        });
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        let config = self.generation_config.get_or_insert(GenerationConfig {
            response_mime_type: None,
            temperature: None,
        });
        config.temperature = Some(temperature);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationConfig {
    #[serde(rename = "responseMimeType", skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

// --- Response ---

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    pub content: Option<Content>,
    #[serde(rename = "finishReason")]
    pub finish_reason: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate, if any.
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        if content.parts.is_empty() {
            return None;
        }
        Some(
            content
                .parts
                .iter()
                .map(|p| p.text.as_str())
                .collect::<Vec<_>>()
                .join(""),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_text_joins_parts() {
        let raw = r#"{
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{"text": "Hello"}, {"text": " world"}]
                },
                "finishReason": "STOP"
            }]
        }"#;
        let resp: GenerateResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.text().as_deref(), Some("Hello world"));
    }

    #[test]
    fn response_text_none_when_no_candidates() {
        let resp: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.text().is_none());
    }

    #[test]
    fn request_serializes_camel_case_config() {
        let req = GenerateRequest::from_prompt("hi").json_mode();
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hi");
    }
}
