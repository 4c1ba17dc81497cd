use crate::error::{Error, Result};
use crate::models::{ExplanationRequest, QuizPayload};
use crate::utils::validation::ConfigInput;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use validator::Validate;

pub const MISSING_EXPLANATION_FIELDS: &str =
    "Missing required fields: question, correctAnswer, userAnswer";

/// Body of `POST /api/quiz/generate`. Fields are kept loosely typed so that a
/// wrong type becomes a validation message instead of a parse failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQuizPayload {
    #[serde(default)]
    pub topic: Option<JsonValue>,
    #[serde(default)]
    pub difficulty: Option<JsonValue>,
    #[serde(default)]
    pub question_type: Option<JsonValue>,
    #[serde(default)]
    pub number_of_questions: Option<JsonValue>,
    #[serde(default)]
    pub total_time: Option<JsonValue>,
}

impl From<GenerateQuizPayload> for ConfigInput {
    fn from(payload: GenerateQuizPayload) -> Self {
        Self {
            topic: payload.topic.and_then(|v| match v {
                JsonValue::String(s) => Some(s),
                _ => None,
            }),
            difficulty: payload.difficulty.and_then(text_value),
            question_type: payload.question_type.and_then(text_value),
            number_of_questions: payload.number_of_questions.as_ref().and_then(numeric_value),
            total_time: payload
                .total_time
                .as_ref()
                .filter(|v| is_set(v))
                .and_then(numeric_value),
        }
    }
}

fn text_value(value: JsonValue) -> Option<String> {
    match value {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// `0`, `""`, `false` and `null` all mean "no total time chosen" and fall back
/// to the suggested minimum. `"0"` is a real value.
fn is_set(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => false,
        JsonValue::Bool(b) => *b,
        JsonValue::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        JsonValue::String(s) => !s.is_empty(),
        JsonValue::Array(_) | JsonValue::Object(_) => true,
    }
}

/// `null` counts as absent. Strings are read like `parseInt`: optional sign,
/// then leading digits; anything unreadable becomes `NaN`.
fn numeric_value(value: &JsonValue) -> Option<f64> {
    match value {
        JsonValue::Null => None,
        JsonValue::Number(n) => Some(n.as_f64().unwrap_or(f64::NAN)),
        JsonValue::String(s) => Some(parse_leading_int(s)),
        _ => Some(f64::NAN),
    }
}

fn parse_leading_int(raw: &str) -> f64 {
    let trimmed = raw.trim_start();
    let (sign, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1.0, &trimmed[1..]),
        Some(b'+') => (1.0, &trimmed[1..]),
        _ => (1.0, trimmed),
    };
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    match digits.parse::<f64>() {
        Ok(n) if !digits.is_empty() => sign * n,
        _ => f64::NAN,
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ExplainPayload {
    #[validate(required, custom(function = "not_blank"))]
    pub question: Option<String>,
    #[validate(required, custom(function = "not_blank"))]
    pub correct_answer: Option<String>,
    #[validate(required, custom(function = "not_blank"))]
    pub user_answer: Option<String>,
}

fn not_blank(value: &str) -> std::result::Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("blank"));
    }
    Ok(())
}

impl ExplainPayload {
    pub fn into_request(self) -> Result<ExplanationRequest> {
        if self.validate().is_err() {
            return Err(Error::BadRequest(MISSING_EXPLANATION_FIELDS.to_string()));
        }
        let trimmed = |v: Option<String>| v.unwrap_or_default().trim().to_string();
        Ok(ExplanationRequest {
            question: trimmed(self.question),
            correct_answer: trimmed(self.correct_answer),
            user_answer: trimmed(self.user_answer),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateQuizResponse {
    pub success: bool,
    pub message: String,
    #[serde(flatten)]
    pub quiz: QuizPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplainResponse {
    pub success: bool,
    pub explanation: String,
}

/// Failure body shared by every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: bool,
    pub message: String,
}
