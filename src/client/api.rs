use crate::dto::quiz_dto::{ErrorResponse, ExplainResponse, GenerateQuizResponse};
use crate::error::{Error, Result};
use crate::models::{ExplanationRequest, QuizConfiguration, QuizPayload};
use crate::services::ai_service::QuizGenerator;
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

/// Talks to a running quiz server. From the form's point of view the server
/// is just another [`QuizGenerator`].
#[derive(Clone)]
pub struct HttpQuizClient {
    client: Client,
    base_url: String,
}

impl HttpQuizClient {
    pub fn new(base_url: impl Into<String>, client: Client) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

async fn read_body<T: DeserializeOwned>(res: Response) -> Result<T> {
    let status = res.status();
    if status.is_success() {
        return Ok(res.json::<T>().await?);
    }

    let text = res.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&text)
        .map(|e| e.message)
        .unwrap_or_else(|_| format!("Request failed with status {}", status));
    Err(Error::Generation(message))
}

#[async_trait]
impl QuizGenerator for HttpQuizClient {
    async fn generate_quiz(&self, config: &QuizConfiguration) -> Result<QuizPayload> {
        let res = self
            .client
            .post(self.url("/api/quiz/generate"))
            .json(config)
            .send()
            .await?;
        let body: GenerateQuizResponse = read_body(res).await?;
        Ok(body.quiz)
    }

    async fn generate_explanation(&self, request: &ExplanationRequest) -> Result<String> {
        let res = self
            .client
            .post(self.url("/api/quiz/explain"))
            .json(request)
            .send()
            .await?;
        let body: ExplainResponse = read_body(res).await?;
        Ok(body.explanation)
    }
}
