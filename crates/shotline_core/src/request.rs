//! Request and response types for language-model generation.

use crate::{Message, Role};
use serde::{Deserialize, Serialize};

/// Generic generation request.
///
/// # Examples
///
/// ```
/// use shotline_core::{GenerateRequest, Message, Role};
///
/// let request = GenerateRequest::builder()
///     .messages(vec![Message::new(Role::User, "Hello!")])
///     .max_tokens(Some(100))
///     .build()
///     .unwrap();
///
/// assert_eq!(request.messages.len(), 1);
/// assert_eq!(request.max_tokens, Some(100));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default, derive_builder::Builder)]
pub struct GenerateRequest {
    /// The conversation messages to send
    pub messages: Vec<Message>,
    /// Maximum number of tokens to generate
    #[builder(default)]
    pub max_tokens: Option<u32>,
    /// Sampling temperature (0.0 to 1.0)
    #[builder(default)]
    pub temperature: Option<f32>,
    /// Model identifier to use
    #[builder(default)]
    pub model: Option<String>,
}

impl GenerateRequest {
    /// Creates a new request builder.
    pub fn builder() -> GenerateRequestBuilder {
        GenerateRequestBuilder::default()
    }

    /// Request made of an optional system context followed by one user prompt.
    ///
    /// # Examples
    ///
    /// ```
    /// use shotline_core::{GenerateRequest, Role};
    ///
    /// let request = GenerateRequest::from_prompt("Write shot 3", "Episode 1 synopsis");
    /// assert_eq!(request.messages[0].role, Role::System);
    /// assert_eq!(request.messages[1].content, "Write shot 3");
    ///
    /// let bare = GenerateRequest::from_prompt("Write shot 3", "  ");
    /// assert_eq!(bare.messages.len(), 1);
    /// ```
    pub fn from_prompt(prompt: impl Into<String>, context: impl AsRef<str>) -> Self {
        let context = context.as_ref().trim();
        let mut messages = Vec::with_capacity(2);
        if !context.is_empty() {
            messages.push(Message::new(Role::System, context));
        }
        messages.push(Message::new(Role::User, prompt));
        Self {
            messages,
            ..Self::default()
        }
    }
}

/// Output produced by a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Output {
    /// Plain text output.
    Text(String),
    /// Structured JSON output.
    Json(serde_json::Value),
}

/// The unified response object.
///
/// # Examples
///
/// ```
/// use shotline_core::{GenerateResponse, Output};
///
/// let response = GenerateResponse {
///     outputs: vec![Output::Text("Shot 1".to_string()), Output::Text(" ready".to_string())],
/// };
/// assert_eq!(response.text(), "Shot 1 ready");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// The generated outputs from the model
    pub outputs: Vec<Output>,
}

impl GenerateResponse {
    /// Concatenated text of every output; JSON outputs are rendered compactly.
    pub fn text(&self) -> String {
        self.outputs
            .iter()
            .map(|output| match output {
                Output::Text(text) => text.clone(),
                Output::Json(value) => value.to_string(),
            })
            .collect()
    }
}
