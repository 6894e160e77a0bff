//! AI chat completion client
//!
//! Talks to an OpenAI-compatible `/v1/chat/completions` endpoint. The system
//! prompt asks the model to embed album picks as `RECOMMENDATION: {...}`
//! lines, which [`super::recommendation_parser`] extracts.

use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::upstream::{self, UpstreamError};

const SERVICE: &str = "chat";

pub const SYSTEM_PROMPT: &str = r#"You are an AI music discovery assistant for Musicboard, a music platform similar to Letterboxd for movies. Your role is to:

- Help users discover new music based on their preferences
- Recommend albums, artists, and genres using collaborative filtering concepts
- Explain why recommendations match their taste
- Be conversational, friendly, and enthusiastic about music
- Reference specific albums, artists, and genres
- Provide match percentages (e.g., "92% match with your taste")
- Use emojis sparingly but appropriately
- Keep responses concise but informative

When recommending albums, format them as JSON objects within your response that can be parsed, like this:
RECOMMENDATION: {"albumTitle": "Album Name", "artist": "Artist Name", "cover": "🎸", "matchPercentage": 92, "genres": ["indie", "rock"], "reasoning": "Loved by fans of similar artists"}

Always be helpful and guide users to discover music they'll genuinely enjoy. Ask clarifying questions to better understand their taste."#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<&'a ChatMessage>,
    stream: bool,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Chat completion client
pub struct ChatClient {
    http_client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    system_prompt: ChatMessage,
}

impl ChatClient {
    pub fn new(
        http_client: Client,
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
            model: model.into(),
            api_key,
            system_prompt: ChatMessage {
                role: ChatRole::System,
                content: SYSTEM_PROMPT.to_string(),
            },
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn completions_url(&self) -> Result<Url, UpstreamError> {
        upstream::endpoint(&self.base_url, &["v1", "chat", "completions"])
    }

    /// Send the conversation, prefixed with the system prompt
    ///
    /// Returns the first choice's text, or `""` when the model produced none.
    pub async fn complete(&self, messages: &[ChatMessage]) -> Result<String, UpstreamError> {
        let api_key = self.api_key.as_ref().ok_or(UpstreamError::NotConfigured("Chat"))?;

        let body = CompletionRequest {
            model: &self.model,
            messages: std::iter::once(&self.system_prompt).chain(messages).collect(),
            stream: false,
        };

        let request = self
            .http_client
            .post(self.completions_url()?)
            .bearer_auth(api_key)
            .json(&body)
            .build()
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        let response: CompletionResponse =
            upstream::fetch_json(&self.http_client, request, SERVICE).await?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .unwrap_or_default();

        info!(
            messages = messages.len(),
            reply_chars = content.chars().count(),
            "Chat completion received"
        );
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completions_url() {
        let client = ChatClient::new(Client::new(), "https://gateway.example", "m", None);
        assert_eq!(
            client.completions_url().unwrap().as_str(),
            "https://gateway.example/v1/chat/completions"
        );
    }

    #[test]
    fn test_request_body_prefixes_system_prompt() {
        let system = ChatMessage {
            role: ChatRole::System,
            content: "sys".into(),
        };
        let user = ChatMessage {
            role: ChatRole::User,
            content: "Something like Blonde?".into(),
        };
        let body = CompletionRequest {
            model: "m",
            messages: vec![&system, &user],
            stream: false,
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["stream"], false);
    }

    #[test]
    fn test_unknown_role_rejected() {
        let result: Result<ChatMessage, _> =
            serde_json::from_str(r#"{"role": "tool", "content": "x"}"#);
        assert!(result.is_err());
    }
}
