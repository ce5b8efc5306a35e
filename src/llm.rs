use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{AppError, Result};

/// Generation settings forwarded to the model with every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GenerationParams {
    pub max_length: u32,
    pub min_length: u32,
    pub do_sample: bool,
}

/// A pretrained text-to-text model. Loaded once at startup and only read
/// afterwards, so implementations must be shareable across requests.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, input: &str, params: &GenerationParams) -> Result<String>;
}

#[derive(Serialize)]
struct GenerationRequest<'a> {
    inputs: &'a str,
    parameters: &'a GenerationParams,
}

#[derive(Deserialize)]
struct GeneratedText {
    generated_text: String,
}

/// Client for a text2text-generation runtime serving one named model.
pub struct HttpTextGenerator {
    client: Client,
    model_path: String,
    endpoint: String,
    api_token: Option<String>,
}

impl HttpTextGenerator {
    pub fn load(config: &Config) -> Self {
        let endpoint = format!(
            "{}/models/{}",
            config.inference_url.trim_end_matches('/'),
            config.model_path
        );

        Self {
            client: Client::new(),
            model_path: config.model_path.clone(),
            endpoint,
            api_token: config.inference_api_token.clone(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TextGenerator for HttpTextGenerator {
    fn name(&self) -> &str {
        &self.model_path
    }

    async fn generate(&self, input: &str, params: &GenerationParams) -> Result<String> {
        let body = GenerationRequest {
            inputs: input,
            parameters: params,
        };

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let res = request
            .send()
            .await
            .and_then(|res| res.error_for_status())
            .map_err(|e| AppError::InferenceError(format!("Model request failed: {}", e)))?;

        let outputs: Vec<GeneratedText> = res
            .json()
            .await
            .map_err(|e| AppError::InferenceError(format!("Invalid response from model: {}", e)))?;

        outputs
            .into_iter()
            .next()
            .map(|output| output.generated_text)
            .ok_or_else(|| AppError::InferenceError("Model returned no output".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use axum::{
        extract::State,
        http::{header::AUTHORIZATION, HeaderMap, StatusCode},
        routing::post,
        Json, Router,
    };
    use serde_json::{json, Value};

    fn config(inference_url: &str) -> Config {
        Config {
            server_addr: "127.0.0.1:3000".parse().unwrap(),
            model_path: "salamodel/TA-bartindo".to_string(),
            inference_url: inference_url.to_string(),
            inference_api_token: None,
            search_url: "https://www.detik.com/search/searchall".to_string(),
        }
    }

    #[test]
    fn endpoint_joins_runtime_and_model_path() {
        let model = HttpTextGenerator::load(&config("http://localhost:8080/"));
        assert_eq!(model.endpoint(), "http://localhost:8080/models/salamodel/TA-bartindo");
        assert_eq!(model.name(), "salamodel/TA-bartindo");
    }

    type Seen = Arc<Mutex<Vec<(Option<String>, Value)>>>;

    #[derive(Clone)]
    struct ModelServer {
        status: StatusCode,
        reply: Value,
        seen: Seen,
    }

    async fn handle(
        State(server): State<ModelServer>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        let auth = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        server.seen.lock().unwrap().push((auth, body));
        (server.status, Json(server.reply.clone()))
    }

    /// Serves one canned reply on the model route and records every request.
    async fn start_model_server(status: StatusCode, reply: Value) -> (String, Seen) {
        let seen = Seen::default();
        let app = Router::new()
            .route("/models/salamodel/TA-bartindo", post(handle))
            .with_state(ModelServer {
                status,
                reply,
                seen: seen.clone(),
            });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}", addr), seen)
    }

    fn params() -> GenerationParams {
        GenerationParams {
            max_length: 150,
            min_length: 50,
            do_sample: true,
        }
    }

    #[tokio::test]
    async fn generate_returns_first_generated_text() {
        let (url, seen) = start_model_server(
            StatusCode::OK,
            json!([{ "generated_text": "Banjir melanda Jakarta." }, { "generated_text": "lain" }]),
        )
        .await;
        let model = HttpTextGenerator::load(&config(&url));

        let summary = model.generate("teks", &params()).await.unwrap();

        assert_eq!(summary, "Banjir melanda Jakarta.");
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, None);
        assert_eq!(
            seen[0].1,
            json!({
                "inputs": "teks",
                "parameters": { "max_length": 150, "min_length": 50, "do_sample": true }
            })
        );
    }

    #[tokio::test]
    async fn generate_sends_bearer_token_when_configured() {
        let (url, seen) = start_model_server(StatusCode::OK, json!([{ "generated_text": "Ok." }])).await;
        let mut config = config(&url);
        config.inference_api_token = Some("rahasia".to_string());
        let model = HttpTextGenerator::load(&config);

        model.generate("teks", &params()).await.unwrap();

        assert_eq!(seen.lock().unwrap()[0].0.as_deref(), Some("Bearer rahasia"));
    }

    #[tokio::test]
    async fn empty_output_is_an_inference_error() {
        let (url, _) = start_model_server(StatusCode::OK, json!([])).await;
        let model = HttpTextGenerator::load(&config(&url));

        let err = model.generate("teks", &params()).await.unwrap_err();

        assert!(matches!(err, AppError::InferenceError(msg) if msg == "Model returned no output"));
    }

    #[tokio::test]
    async fn error_status_is_an_inference_error() {
        let (url, _) = start_model_server(
            StatusCode::SERVICE_UNAVAILABLE,
            json!({ "error": "Model is loading" }),
        )
        .await;
        let model = HttpTextGenerator::load(&config(&url));

        let err = model.generate("teks", &params()).await.unwrap_err();

        assert!(matches!(err, AppError::InferenceError(msg) if msg.starts_with("Model request failed")));
    }
}
