//! Thin client for the generative-text API.
//!
//! Failure policy is deliberate: the chat endpoint must never break the
//! primary inventory workflows, so every error collapses into a canned
//! apology and is only visible in the logs.

use serde_json::{Value, json};

use crate::context::{ContextSnapshot, build_context};

const DEFAULT_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash-lite:generateContent";

const SYSTEM_PROMPT: &str = "You are the SupplyLine assistant, an AI expert in supply chain \
    management. Use the provided database context to answer the user's question. You SHOULD \
    aggregate, summarize, and count data when asked (e.g., 'total inventory', 'how many \
    products'). If the answer is not in the data, say you don't know. Be concise but \
    informative. Format money as EUR.";

/// Returned when the API answers 200 but not in the shape we expect.
const FALLBACK: &str = "I'm sorry, I couldn't understand that.";

/// Returned on any transport or HTTP failure.
pub const APOLOGY: &str = "I am experiencing technical difficulties. Please try again later.";

pub struct ChatClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl ChatClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_endpoint(DEFAULT_ENDPOINT, api_key)
    }

    /// Point the client somewhere else, e.g. a local stub in tests.
    pub fn with_endpoint(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }

    /// Answer `message` against the snapshot. Infallible by contract; see
    /// the module docs for why.
    pub async fn ask(&self, snapshot: &ContextSnapshot, message: &str) -> String {
        let prompt = compose_prompt(snapshot, message);
        match self.generate(&prompt).await {
            Ok(text) => text,
            Err(err) => {
                tracing::error!(error = %err, "chat completion failed");
                APOLOGY.to_string()
            }
        }
    }

    async fn generate(&self, prompt: &str) -> Result<String, reqwest::Error> {
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });
        let url = format!("{}?key={}", self.endpoint, self.api_key);
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        let payload: Value = response.json().await?;
        Ok(extract_text(&payload))
    }
}

fn compose_prompt(snapshot: &ContextSnapshot, message: &str) -> String {
    format!(
        "{SYSTEM_PROMPT}\n\nDATA CONTEXT:\n{}\n\nUSER QUESTION: {message}",
        build_context(snapshot)
    )
}

/// Pull the answer out of `candidates[0].content.parts[0].text`.
fn extract_text(payload: &Value) -> String {
    payload
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .map_or_else(|| FALLBACK.to_string(), str::to_string)
}
