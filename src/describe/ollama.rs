use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::describe::{truncate_chars, DescriptionGenerator, MAX_DESCRIPTION_CHARS};
use crate::error::{Result, RosterError};

/// Default Ollama API host
pub const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";

/// Default generation model
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.2:1b";

/// Ollama chat-completion client.
///
/// Sends a single user-role prompt to `/api/chat` with streaming disabled
/// and truncates the generated text to [`MAX_DESCRIPTION_CHARS`].
pub struct OllamaClient {
    client: Client,
    host: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct ChatMessage {
    #[serde(default)]
    role: String,
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    message: ChatMessage,
}

impl OllamaClient {
    /// Create a new client for the given host and model
    pub fn new(host: impl Into<String>, model: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            host: host.into(),
            model: model.into(),
        }
    }

    fn prompt(player_name: &str, position: &str, team: Option<&str>) -> String {
        format!(
            "Generate a concise 280-character description for a baseball player with these details:\n\
             Name: {}\n\
             Position: {}\n\
             Team: {}\n\n\
             Include career highlights, playing style, and personal background.",
            player_name,
            position,
            team.unwrap_or("unknown")
        )
    }
}

impl Default for OllamaClient {
    fn default() -> Self {
        Self::new(DEFAULT_OLLAMA_HOST, DEFAULT_OLLAMA_MODEL)
    }
}

#[async_trait]
impl DescriptionGenerator for OllamaClient {
    async fn generate(
        &self,
        player_name: &str,
        position: &str,
        team: Option<&str>,
    ) -> Result<String> {
        let prompt = Self::prompt(player_name, position, team);
        debug!(model = %self.model, "Requesting description generation");

        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt,
            }],
            stream: false,
        };

        let response = self
            .client
            .post(format!("{}/api/chat", self.host))
            .json(&request)
            .send()
            .await
            .map_err(|e| RosterError::Describe(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(RosterError::Describe(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| RosterError::Describe(format!("Invalid JSON: {}", e)))?;

        let description = truncate_chars(&chat.message.content, MAX_DESCRIPTION_CHARS);
        debug!(length = description.len(), "Generated description");
        Ok(description)
    }
}
