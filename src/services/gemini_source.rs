//! Question source backed by the Gemini generative-language REST API.

use std::time::Duration;

use futures::{FutureExt, future::BoxFuture};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::{
    dto::question::QuestionPayload,
    services::question_source::{QuestionSource, QuestionSourceError},
    state::question::Question,
};

const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Connection settings for [`GeminiQuestionSource`].
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    api_key: String,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl GeminiConfig {
    /// Settings for `api_key` with the default model, endpoint and timeout.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Read `GEMINI_API_KEY` (or `API_KEY`), `GEMINI_MODEL` and `GEMINI_BASE_URL`.
    pub fn from_env() -> Result<Self, QuestionSourceError> {
        let api_key = non_empty_env("GEMINI_API_KEY")
            .or_else(|| non_empty_env("API_KEY"))
            .ok_or(QuestionSourceError::MissingEnvVar {
                var: "GEMINI_API_KEY",
            })?;

        let mut config = Self::new(api_key);
        if let Some(model) = non_empty_env("GEMINI_MODEL") {
            config.model = model;
        }
        if let Some(base_url) = non_empty_env("GEMINI_BASE_URL") {
            config.base_url = base_url;
        }
        Ok(config)
    }

    /// Use another model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Send requests to another endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Give up on requests slower than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Model questions are requested from.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

fn non_empty_env(var: &str) -> Option<String> {
    std::env::var(var)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Asks Gemini for a mix of arithmetic and word problems.
#[derive(Clone)]
pub struct GeminiQuestionSource {
    client: Client,
    config: GeminiConfig,
}

impl GeminiQuestionSource {
    /// Source sending requests with `config`.
    pub fn new(config: GeminiConfig) -> Result<Self, QuestionSourceError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| QuestionSourceError::unavailable("failed to build HTTP client", err))?;
        Ok(Self { client, config })
    }
}

impl QuestionSource for GeminiQuestionSource {
    fn generate(
        &self,
        count: usize,
        max_operand: u32,
    ) -> BoxFuture<'static, Result<Vec<Question>, QuestionSourceError>> {
        let client = self.client.clone();
        let url = self.config.endpoint();
        let api_key = self.config.api_key.clone();
        let body = GenerateContentRequest::questions(count, max_operand);

        async move {
            debug!(%url, count, max_operand, "requesting questions");
            let response = client
                .post(&url)
                .header("x-goog-api-key", api_key)
                .json(&body)
                .send()
                .await
                .and_then(reqwest::Response::error_for_status)
                .map_err(|err| QuestionSourceError::unavailable("Gemini request failed", err))?;

            let parsed: GenerateContentResponse = response.json().await.map_err(|err| {
                QuestionSourceError::InvalidResponse(format!("failed to parse Gemini response: {err}"))
            })?;

            let questions = parse_questions(parsed)?;
            if questions.len() != count {
                warn!(requested = count, received = questions.len(), "question count mismatch");
            }
            Ok(questions)
        }
        .boxed()
    }
}

fn parse_questions(response: GenerateContentResponse) -> Result<Vec<Question>, QuestionSourceError> {
    let text = response
        .candidates
        .unwrap_or_default()
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().find_map(|part| part.text))
        .ok_or_else(|| {
            QuestionSourceError::InvalidResponse("Gemini returned no text candidate".into())
        })?;

    let payload: QuestionPayload = serde_json::from_str(text.trim())
        .map_err(|err| QuestionSourceError::InvalidResponse(err.to_string()))?;
    if payload.questions.is_empty() {
        debug!("Gemini returned an empty question list");
    }
    payload.into_questions()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<TextPart>,
}

#[derive(Debug, Serialize)]
struct TextPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
}

impl GenerateContentRequest {
    fn questions(count: usize, max_operand: u32) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![TextPart {
                    text: prompt(count, max_operand),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: response_schema(),
            },
        }
    }
}

fn prompt(count: usize, max_operand: u32) -> String {
    format!(
        "Generate {count} diverse math problems for a math game. Include a mix of arithmetic \
         problems (addition, subtraction, multiplication, division) and situation-based word problems.\n\
         For arithmetic problems:\n\
         - Provide two numbers (num1, num2), the operation ('+', '-', '*', '/'), the correct numerical \
         answer, and the full question text (e.g., \"10 + 5 = ?\").\n\
         - Ensure division problems have integer results and positive operands.\n\
         - Numbers should be between 1 and {max_operand}.\n\
         - Set 'type' to 'arithmetic'.\n\
         For situation-based word problems:\n\
         - Provide a 'situationText' describing the scenario.\n\
         - Provide a 'questionText' that is the specific question derived from the situation.\n\
         - Provide the correct numerical 'answer'.\n\
         - Set 'type' to 'situation'.\n\
         Return the output in JSON format according to the provided schema."
    )
}

fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "questions": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "type": { "type": "STRING", "description": "Type of question: \"arithmetic\" or \"situation\"" },
                        "num1": { "type": "NUMBER" },
                        "num2": { "type": "NUMBER" },
                        "operation": { "type": "STRING" },
                        "answer": { "type": "NUMBER" },
                        "questionText": { "type": "STRING" },
                        "situationText": { "type": "STRING" }
                    },
                    "required": ["type", "answer", "questionText"]
                }
            }
        },
        "required": ["questions"]
    })
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}
