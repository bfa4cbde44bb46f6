use std::process::Stdio;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use super::GenerationError;

/// Turns a prompt into raw model text.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError>;
}

const SYSTEM_PROMPT: &str =
    "You are a professional chef and nutritionist. You answer with a single JSON object only.";

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Mistral chat-completions endpoint. `api_url` is the full completions URL.
pub struct MistralBackend {
    client: Client,
    api_url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl MistralBackend {
    pub fn new(api_url: String, api_key: String, model: String, temperature: f32) -> anyhow::Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            api_url,
            api_key,
            model,
            temperature,
        })
    }
}

#[async_trait]
impl GenerationBackend for MistralBackend {
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::Backend(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            debug!(%status, body = %text, "generation backend returned an error");
            return Err(if status.is_client_error() && status != StatusCode::TOO_MANY_REQUESTS {
                GenerationError::Rejected(format!("status {status}"))
            } else {
                GenerationError::Backend(format!("status {status}"))
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Malformed(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(GenerationError::Empty)
    }
}

/// Runs a local program, writes the prompt to its stdin and reads the model
/// text from stdout.
pub struct CommandBackend {
    program: String,
    args: Vec<String>,
}

impl CommandBackend {
    pub fn new(program: String, args: Vec<String>) -> Self {
        Self { program, args }
    }
}

#[async_trait]
impl GenerationBackend for CommandBackend {
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| GenerationError::Backend(format!("failed to start {}: {e}", self.program)))?;

        if let Some(mut stdin) = child.stdin.take() {
            let input = prompt.to_owned();
            // A child that exits without reading stdin must not block us.
            tokio::spawn(async move {
                let _ = stdin.write_all(input.as_bytes()).await;
            });
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| GenerationError::Backend(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!(status = %output.status, stderr = %stderr.trim(), "generation command failed");
            return Err(GenerationError::Backend(format!(
                "{} exited with {}",
                self.program, output.status
            )));
        }

        let text = String::from_utf8(output.stdout).map_err(|e| GenerationError::Malformed(e.to_string()))?;
        if text.trim().is_empty() {
            return Err(GenerationError::Empty);
        }
        Ok(text)
    }
}
