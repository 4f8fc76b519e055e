use serde::Deserialize;

use crate::config::GeneratorConfig;
use crate::generator::prompt::GenerationRequest;
use crate::generator::{PoemGenerator, SourceError};

#[derive(Deserialize)]
struct CompletionEnvelope {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<Message>,
}

#[derive(Deserialize)]
struct Message {
    content: Option<String>,
}

/// Pull `choices[0].message.content` out of a completion response body.
pub fn extract_content(body: &str) -> Result<String, SourceError> {
    let envelope: CompletionEnvelope = serde_json::from_str(body)
        .map_err(|e| SourceError::MalformedResponse(format!("response is not JSON: {e}")))?;
    envelope
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| SourceError::MalformedResponse("no content in response".to_string()))
}

/// Chat-completion endpoint reached over HTTP.
pub struct HttpGenerator {
    url: String,
    api_key: Option<String>,
    timeout_secs: u64,
}

impl HttpGenerator {
    pub fn new(url: &str, api_key: Option<&str>, timeout_secs: u64) -> Self {
        Self {
            url: url.to_string(),
            api_key: api_key.map(str::to_string),
            timeout_secs,
        }
    }

    /// Configured generator, or `None` when no endpoint is set.
    pub fn from_config(config: &GeneratorConfig) -> Option<Self> {
        let url = config.api_url.as_deref().filter(|u| !u.trim().is_empty())?;
        Some(Self::new(url, config.api_key.as_deref(), config.timeout_secs))
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[cfg(feature = "network")]
impl PoemGenerator for HttpGenerator {
    fn complete(&self, request: &GenerationRequest) -> Result<String, SourceError> {
        let payload = serde_json::to_string(request)
            .map_err(|e| SourceError::Transport(format!("cannot encode request: {e}")))?;
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(self.timeout_secs))
            .build()
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        let mut call = client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .body(payload);
        if let Some(key) = &self.api_key {
            call = call.header("Authorization", format!("Bearer {key}"));
        }

        let response = call
            .send()
            .map_err(|e| SourceError::Transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Transport(format!("HTTP error! status: {status}")));
        }
        let body = response
            .text()
            .map_err(|e| SourceError::Transport(e.to_string()))?;
        extract_content(&body)
    }
}

#[cfg(not(feature = "network"))]
impl PoemGenerator for HttpGenerator {
    fn complete(&self, _request: &GenerationRequest) -> Result<String, SourceError> {
        Err(SourceError::Transport(
            "built without the network feature".to_string(),
        ))
    }
}

/// Generator used when no endpoint is configured or `--offline` is given.
pub struct OfflineGenerator;

impl PoemGenerator for OfflineGenerator {
    fn complete(&self, _request: &GenerationRequest) -> Result<String, SourceError> {
        Err(SourceError::Transport("offline".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_content() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"{\"poem\":\"a\"}"}}]}"#;
        assert_eq!(extract_content(body).unwrap(), r#"{"poem":"a"}"#);
    }

    #[test]
    fn test_extract_content_missing() {
        for body in [
            r#"{"choices":[]}"#,
            r#"{}"#,
            r#"{"choices":[{"message":{"role":"assistant"}}]}"#,
            r#"{"choices":[{"message":{"content":"   "}}]}"#,
        ] {
            assert!(matches!(
                extract_content(body),
                Err(SourceError::MalformedResponse(_))
            ));
        }
    }

    #[test]
    fn test_extract_content_not_json() {
        assert!(matches!(
            extract_content("<html>502</html>"),
            Err(SourceError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_from_config_requires_url() {
        let mut config = GeneratorConfig::default();
        config.api_url = None;
        assert!(HttpGenerator::from_config(&config).is_none());
        config.api_url = Some("  ".to_string());
        assert!(HttpGenerator::from_config(&config).is_none());
        config.api_url = Some("https://llm.example.com/v1/chat/completions".to_string());
        let generator = HttpGenerator::from_config(&config).unwrap();
        assert_eq!(generator.url(), "https://llm.example.com/v1/chat/completions");
    }

    #[test]
    fn test_offline_is_transport_error() {
        let config = GeneratorConfig::default();
        let request = crate::generator::prompt::build_request(
            crate::engine::difficulty::Difficulty::Easy,
            &[],
            &config,
        );
        assert!(matches!(
            OfflineGenerator.complete(&request),
            Err(SourceError::Transport(_))
        ));
    }
}
