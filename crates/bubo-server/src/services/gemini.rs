//! Gemini agent engine
//!
//! Implements [`AgentEngine`] against the generative-language
//! `generateContent` API. The model sees the registry's function
//! declarations; while it answers with `functionCall` parts the named tools
//! are executed and their results fed back as `functionResponse` parts, up to
//! a bounded number of rounds. Tool failures are serialized into the
//! function response so the model can surface them to the caller.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;

use bubo::{AgentEngine, DomainError, ToolRegistry};

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const DEFAULT_MODEL: &str = "gemini-1.5-pro";
const DEFAULT_INSTRUCTIONS: &str =
    "You are a powerful data assistant helping with Firebase, Excel, and Google Cloud services.";

/// Upper bound on tool-execution rounds within one generation.
const MAX_TOOL_ROUNDS: usize = 8;

/// Agent calling Gemini with the registered tools.
pub struct GeminiAgent {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    instructions: String,
    tools: Arc<ToolRegistry>,
}

impl GeminiAgent {
    /// Creates a new agent using the provided API key and tool registry.
    pub fn new(api_key: impl Into<String>, tools: Arc<ToolRegistry>) -> Self {
        Self {
            client: Client::new(),
            base_url: BASE_URL.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
            tools,
        }
    }

    /// Overrides the Gemini model name if needed.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Overrides the instruction string.
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    /// Overrides the API base URL (tests point this at a mock).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    async fn request(&self, contents: &[Value]) -> Result<Value, DomainError> {
        let url = format!(
            "{}/{model}:generateContent?key={api_key}",
            self.base_url,
            model = self.model,
            api_key = self.api_key
        );

        let mut body = serde_json::json!({
            "systemInstruction": {"parts": [{"text": self.instructions}]},
            "contents": contents,
        });
        if !self.tools.is_empty() {
            body["tools"] =
                serde_json::json!([{"functionDeclarations": self.tools.function_declarations()}]);
        }

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| DomainError::ExternalService(format!("agent request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(map_http_error(status, body));
        }

        response
            .json()
            .await
            .map_err(|e| DomainError::ExternalService(format!("agent response parse: {}", e)))
    }

    async fn run_tool(&self, name: &str, args: Value) -> Value {
        match self.tools.execute(name, args).await {
            Ok(value) => wrap_response(value),
            Err(e) => serde_json::json!({"error": e.to_string()}),
        }
    }
}

#[async_trait]
impl AgentEngine for GeminiAgent {
    async fn generate(&self, message: &str) -> Result<Value, DomainError> {
        let mut contents = vec![serde_json::json!({
            "role": "user",
            "parts": [{"text": message}],
        })];

        for _ in 0..MAX_TOOL_ROUNDS {
            let payload = self.request(&contents).await?;

            let content = payload
                .pointer("/candidates/0/content")
                .cloned()
                .ok_or_else(|| {
                    DomainError::ExternalService("model returned no candidates".to_string())
                })?;

            let calls = function_calls(&content);
            if calls.is_empty() {
                let answer = extract_answer(&payload).ok_or_else(|| {
                    DomainError::ExternalService("model returned no answer".to_string())
                })?;
                return Ok(Value::String(answer));
            }

            contents.push(content);

            let mut parts = Vec::with_capacity(calls.len());
            for (name, args) in calls {
                let response = self.run_tool(&name, args).await;
                parts.push(serde_json::json!({
                    "functionResponse": {"name": name, "response": response},
                }));
            }
            contents.push(serde_json::json!({"role": "user", "parts": parts}));
        }

        Err(DomainError::ExternalService(format!(
            "agent exceeded {} tool rounds without answering",
            MAX_TOOL_ROUNDS
        )))
    }
}

/// Function responses must be JSON objects; scalar and array results are
/// wrapped under a `result` key.
fn wrap_response(value: Value) -> Value {
    match value {
        Value::Object(_) => value,
        other => serde_json::json!({"result": other}),
    }
}

/// The `functionCall` parts of a content block, with missing args defaulted
/// to an empty object.
fn function_calls(content: &Value) -> Vec<(String, Value)> {
    let Some(parts) = content.get("parts").and_then(|p| p.as_array()) else {
        return Vec::new();
    };

    parts
        .iter()
        .filter_map(|part| part.get("functionCall"))
        .filter_map(|call| {
            let name = call.get("name").and_then(|n| n.as_str())?;
            let args = call
                .get("args")
                .cloned()
                .unwrap_or_else(|| serde_json::json!({}));
            Some((name.to_string(), args))
        })
        .collect()
}

fn extract_answer(root: &Value) -> Option<String> {
    let candidates = root.get("candidates")?.as_array()?;

    let mut collected = Vec::new();
    for candidate in candidates {
        if let Some(parts) = candidate
            .pointer("/content/parts")
            .and_then(|parts| parts.as_array())
        {
            for part in parts {
                if let Some(text) = part.get("text").and_then(|t| t.as_str()) {
                    let trimmed = text.trim();
                    if !trimmed.is_empty() {
                        collected.push(trimmed.to_string());
                    }
                }
            }
        }
    }

    if collected.is_empty() {
        None
    } else {
        Some(collected.join("\n\n"))
    }
}

fn map_http_error(status: StatusCode, body: String) -> DomainError {
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|json| {
            json.pointer("/error/message")
                .and_then(|msg| msg.as_str())
                .map(|msg| msg.to_string())
        })
        .unwrap_or(body);

    DomainError::ExternalService(format!("agent API error ({}): {}", status, message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use wiremock::matchers::{body_string_contains, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct CountingTool {
        calls: Arc<AtomicUsize>,
        result: Result<Value, String>,
    }

    #[async_trait]
    impl bubo::Tool for CountingTool {
        fn name(&self) -> &'static str {
            "lookup"
        }

        fn description(&self) -> &'static str {
            "Test lookup"
        }

        fn parameters(&self) -> Value {
            serde_json::json!({"type": "object", "properties": {}})
        }

        async fn execute(&self, _input: Value) -> Result<Value, DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.result {
                Ok(v) => Ok(v.clone()),
                Err(e) => Err(DomainError::Unavailable(e.clone())),
            }
        }
    }

    fn registry_with(tool: CountingTool) -> Arc<ToolRegistry> {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(tool)).unwrap();
        Arc::new(registry)
    }

    fn text_reply(text: &str) -> Value {
        serde_json::json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": text}]}
            }]
        })
    }

    #[tokio::test]
    async fn plain_text_reply_passes_through() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/gemini-1.5-pro:generateContent"))
            .and(query_param("key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_reply("Hello!")))
            .mount(&server)
            .await;

        let agent = GeminiAgent::new("test-key", Arc::new(ToolRegistry::new()))
            .with_base_url(server.uri());
        let out = agent.generate("hi").await.unwrap();
        assert_eq!(out, Value::String("Hello!".to_string()));
    }

    #[tokio::test]
    async fn function_call_round_trips_through_the_registry() {
        let server = MockServer::start().await;

        // Once the request carries our functionResponse, answer with text.
        Mock::given(method("POST"))
            .and(body_string_contains("functionResponse"))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_reply("done")))
            .mount(&server)
            .await;
        // First round: the model asks for the tool.
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": {
                        "role": "model",
                        "parts": [{"functionCall": {"name": "lookup", "args": {}}}]
                    }
                }]
            })))
            .mount(&server)
            .await;

        let calls = Arc::new(AtomicUsize::new(0));
        let registry = registry_with(CountingTool {
            calls: calls.clone(),
            result: Ok(serde_json::json!({"value": 42})),
        });

        let agent = GeminiAgent::new("test-key", registry).with_base_url(server.uri());
        let out = agent.generate("look it up").await.unwrap();

        assert_eq!(out, Value::String("done".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn tool_failures_are_fed_back_not_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("functionResponse"))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_reply(
                "The realtime database is not configured.",
            )))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": {
                        "role": "model",
                        "parts": [{"functionCall": {"name": "lookup"}}]
                    }
                }]
            })))
            .mount(&server)
            .await;

        let calls = Arc::new(AtomicUsize::new(0));
        let registry = registry_with(CountingTool {
            calls: calls.clone(),
            result: Err("not configured".to_string()),
        });

        let agent = GeminiAgent::new("test-key", registry).with_base_url(server.uri());
        let out = agent.generate("look it up").await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(out.as_str().unwrap().contains("not configured"));
    }

    #[tokio::test]
    async fn api_errors_surface_as_external_service() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "error": {"message": "backend exploded"}
            })))
            .mount(&server)
            .await;

        let agent = GeminiAgent::new("test-key", Arc::new(ToolRegistry::new()))
            .with_base_url(server.uri());
        let err = agent.generate("hi").await.unwrap_err();
        assert!(matches!(err, DomainError::ExternalService(msg) if msg.contains("backend exploded")));
    }

    #[test]
    fn scalar_tool_results_are_wrapped() {
        assert_eq!(
            wrap_response(Value::from(42)),
            serde_json::json!({"result": 42})
        );
        let obj = serde_json::json!({"a": 1});
        assert_eq!(wrap_response(obj.clone()), obj);
    }
}
