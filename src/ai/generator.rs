use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{AppError, Result};

/// Seam between the resolver and the text-generation backend.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    /// One synchronous completion request. `context` carries optional
    /// grounding text included in the prompt.
    async fn generate(&self, question: &str, context: Option<&str>) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
    top_p: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
    #[allow(dead_code)]
    done: bool,
}

pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
    temperature: f32,
    top_p: f32,
    num_predict: u32,
}

impl OllamaClient {
    pub fn new(config: &Config) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            base_url: config.ollama_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            top_p: config.top_p,
            num_predict: config.num_predict,
        }
    }

    /// One reachability check against the tags endpoint. Display-only:
    /// resolution never consults this.
    pub async fn probe(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);
        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!("Generation service unreachable: {}", e);
                false
            }
        }
    }

    fn build_prompt(question: &str, context: Option<&str>) -> String {
        match context {
            Some(context) => format!("Question: {question}\nContext: {context}\nAnswer:"),
            None => format!("Question: {question}\nAnswer:"),
        }
    }
}

#[async_trait]
impl AnswerGenerator for OllamaClient {
    async fn generate(&self, question: &str, context: Option<&str>) -> Result<String> {
        let request = GenerateRequest {
            model: self.model.clone(),
            prompt: Self::build_prompt(question, context),
            stream: false,
            options: GenerateOptions {
                temperature: self.temperature,
                top_p: self.top_p,
                num_predict: self.num_predict,
            },
        };

        let url = format!("{}/api/generate", self.base_url);
        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(AppError::Generation(format!("API error: {}", error_text)));
        }

        let generate_response: GenerateResponse = response.json().await?;

        Ok(generate_response.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_matches_wire_format() {
        let request = GenerateRequest {
            model: "mistral".to_string(),
            prompt: "Question: q\nAnswer:".to_string(),
            stream: false,
            options: GenerateOptions {
                temperature: 0.7,
                top_p: 0.9,
                num_predict: 2048,
            },
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "mistral");
        assert_eq!(json["stream"], false);
        assert_eq!(json["options"]["num_predict"], 2048);
        let top_p = json["options"]["top_p"].as_f64().unwrap();
        assert!((top_p - 0.9).abs() < 1e-6);
    }

    #[test]
    fn response_parses_wire_format() {
        let parsed: GenerateResponse =
            serde_json::from_str(r#"{"response": "42", "done": true}"#).unwrap();
        assert_eq!(parsed.response, "42");
    }

    #[test]
    fn prompt_includes_context_only_when_present() {
        assert_eq!(
            OllamaClient::build_prompt("q", None),
            "Question: q\nAnswer:"
        );
        assert_eq!(
            OllamaClient::build_prompt("q", Some("c")),
            "Question: q\nContext: c\nAnswer:"
        );
    }
}
