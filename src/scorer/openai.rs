//! Chat-completions mood scorer.
//!
//! Sends one user message asking the model to rate each emotion from 1 to 10
//! and to answer with a JSON object of the form
//! `{"mood": {"happiness": 8, "fear": 3}}`. The reply must parse as exactly that
//! shape; there is no partial-result tolerance and no retry.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::domain::error::{MoodlogError, Result};
use crate::domain::MoodVector;
use crate::scorer::MoodScorer;
use crate::ScorerConfig;

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: ChatMessage,
}

/// Expected shape of the model's reply.
#[derive(Debug, Deserialize)]
struct MoodDocument {
    mood: MoodVector,
}

/// Scorer backed by an OpenAI-compatible `/chat/completions` endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiScorer {
    client: Client,
    endpoint: String,
    model: String,
    temperature: f32,
    api_key: Option<String>,
}

impl OpenAiScorer {
    /// Builds a scorer from configuration.
    ///
    /// A missing API key is allowed; requests then go out without an
    /// `Authorization` header, which suits local compatible servers.
    #[must_use]
    pub fn new(config: &ScorerConfig) -> Self {
        Self {
            client: Client::new(),
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            api_key: config.api_key.clone(),
        }
    }

    fn build_prompt(title: &str, body: &str) -> String {
        format!(
            "You detect emotions in journal entries. Read the entry below and rate each \
emotion it expresses on a scale from 1 to 10, where higher means stronger.\n\
\n\
title: {title}\n\
content: {body}\n\
\n\
Answer with JSON only, in this exact format:\n\
{{\n  \"mood\": {{\n    \"happiness\": 8,\n    \"fear\": 3,\n    \"anger\": 2,\n    \"excitement\": 6\n  }}\n}}\n\
Allowed keys are happiness, fear, anger, sadness and excitement. \
Leave out emotions that are not present."
        )
    }
}

#[async_trait]
impl MoodScorer for OpenAiScorer {
    #[tracing::instrument(
        name = "openai_detect",
        level = "debug",
        skip(self, title, body),
        fields(model = %self.model, title_len = title.len(), body_len = body.len())
    )]
    async fn detect(&self, title: &str, body: &str) -> Result<MoodVector> {
        let request = CompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: Self::build_prompt(title, body),
            }],
            temperature: self.temperature,
        };

        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| MoodlogError::Scoring(format!("request failed: {e}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| MoodlogError::Scoring(format!("failed to read response: {e}")))?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "mood scoring request rejected");
            return Err(MoodlogError::Scoring(format!("endpoint returned {status}: {text}")));
        }

        let mood = parse_completion(&text)?;
        tracing::debug!(dimensions = mood.iter().count(), "mood detected");
        Ok(mood)
    }
}

/// Extracts the mood vector from a raw chat-completions response body.
fn parse_completion(body: &str) -> Result<MoodVector> {
    let response: CompletionResponse = serde_json::from_str(body)
        .map_err(|e| MoodlogError::Scoring(format!("malformed completion response: {e}")))?;

    let content = response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or_else(|| MoodlogError::Scoring("completion had no choices".to_string()))?;

    parse_mood_document(&content)
}

/// Parses the model's reply text as `{"mood": {...}}`.
fn parse_mood_document(content: &str) -> Result<MoodVector> {
    serde_json::from_str::<MoodDocument>(content.trim())
        .map(|doc| doc.mood)
        .map_err(|e| MoodlogError::Scoring(format!("reply is not a mood object: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MoodDimension;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::sync::oneshot;

    fn completion(content: &str) -> String {
        serde_json::json!({
            "id": "chatcmpl-1",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }]
        })
        .to_string()
    }

    #[test]
    fn parses_sparse_mood_reply() {
        let body = completion(r#"{"mood": {"happiness": 8, "excitement": 6}}"#);
        let mood = parse_completion(&body).unwrap();
        assert_eq!(mood.score(MoodDimension::Happiness), 8);
        assert_eq!(mood.score(MoodDimension::Excitement), 6);
        assert_eq!(mood.get(MoodDimension::Fear), None);
    }

    #[test]
    fn ignores_unrecognized_keys() {
        let body = completion(r#"{"mood": {"joy": 4, "fear": 2}, "note": "x"}"#);
        let mood = parse_completion(&body).unwrap();
        assert_eq!(mood.score(MoodDimension::Fear), 2);
    }

    #[test]
    fn rejects_prose_replies() {
        let body = completion("The writer seems happy.");
        assert!(matches!(parse_completion(&body), Err(MoodlogError::Scoring(_))));
    }

    #[test]
    fn rejects_non_integer_scores() {
        let body = completion(r#"{"mood": {"happiness": "high"}}"#);
        assert!(matches!(parse_completion(&body), Err(MoodlogError::Scoring(_))));

        let body = completion(r#"{"mood": {"happiness": 7.5}}"#);
        assert!(matches!(parse_completion(&body), Err(MoodlogError::Scoring(_))));
    }

    #[test]
    fn rejects_missing_mood_and_empty_choices() {
        let body = completion(r#"{"happiness": 8}"#);
        assert!(matches!(parse_completion(&body), Err(MoodlogError::Scoring(_))));

        let body = r#"{"choices": []}"#;
        assert!(matches!(parse_completion(body), Err(MoodlogError::Scoring(_))));
    }

    #[test]
    fn prompt_embeds_entry_text() {
        let prompt = OpenAiScorer::build_prompt("Exam", "stressful day");
        assert!(prompt.contains("title: Exam"));
        assert!(prompt.contains("content: stressful day"));
        assert!(prompt.contains("\"mood\""));
    }

    fn local_scorer(endpoint: String) -> OpenAiScorer {
        let scorer = OpenAiScorer::new(&ScorerConfig {
            endpoint,
            api_key: Some("sk-test".to_string()),
            ..ScorerConfig::default()
        });
        OpenAiScorer {
            client: Client::builder().no_proxy().build().unwrap(),
            ..scorer
        }
    }

    /// Answers a single HTTP request on a loopback port and hands back the raw
    /// request text.
    async fn serve_once(status: &'static str, body: String) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            let _ = tx.send(request);
        });

        (format!("http://{addr}/v1/chat/completions"), rx)
    }

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
                let length = head
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    #[tokio::test]
    async fn rate_limited_reply_is_a_scoring_error() {
        let (endpoint, request) =
            serve_once("429 Too Many Requests", r#"{"error":"slow down"}"#.to_string()).await;

        let err = local_scorer(endpoint).detect("Run", "felt great").await.unwrap_err();
        match err {
            MoodlogError::Scoring(message) => {
                assert!(message.contains("429"), "{message}");
                assert!(message.contains("slow down"), "{message}");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let request = request.await.unwrap().to_lowercase();
        assert!(request.starts_with("post /v1/chat/completions"));
        assert!(request.contains("authorization: bearer sk-test"));
        assert!(request.contains("title: run"));
    }

    #[tokio::test]
    async fn successful_reply_is_parsed() {
        let body = completion(r#"{"mood": {"sadness": 4}}"#);
        let (endpoint, _request) = serve_once("200 OK", body).await;

        let mood = local_scorer(endpoint).detect("Rain", "stayed in").await.unwrap();
        assert_eq!(mood.score(MoodDimension::Sadness), 4);
        assert_eq!(mood.iter().count(), 1);
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_scoring_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let endpoint = format!("http://{addr}/v1/chat/completions");
        let err = local_scorer(endpoint).detect("Run", "felt great").await.unwrap_err();
        assert!(
            matches!(&err, MoodlogError::Scoring(message) if message.starts_with("request failed")),
            "{err:?}"
        );
    }
}
