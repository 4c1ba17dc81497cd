use crate::dto::quiz_dto::{
    ExplainPayload, ExplainResponse, GenerateQuizPayload, GenerateQuizResponse,
};
use crate::error::{Error, Result};
use crate::utils::validation::{validate, ConfigInput};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

pub const QUIZ_GENERATED_MESSAGE: &str = "Quiz generated successfully";

pub async fn generate_quiz(
    State(state): State<AppState>,
    payload: std::result::Result<Json<GenerateQuizPayload>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(payload) = payload.map_err(|e| Error::BadRequest(e.body_text()))?;

    tracing::info!(
        topic = ?payload.topic,
        difficulty = ?payload.difficulty,
        question_type = ?payload.question_type,
        number_of_questions = ?payload.number_of_questions,
        total_time = ?payload.total_time,
        "Quiz generation request"
    );

    let input = ConfigInput::from(payload);
    let config = validate(&input, &state.policy).map_err(|err| {
        tracing::warn!(
            code = err.code(),
            reason = %err,
            suggested_seconds = ?input.suggested_minimum_seconds(&state.policy),
            "quiz configuration rejected"
        );
        err
    })?;

    let quiz = state
        .quiz_generator
        .generate_quiz(&config)
        .await
        .map_err(|err| {
            tracing::error!(error = %err, topic = %config.topic, "quiz generation failed");
            err
        })?;

    Ok((
        StatusCode::OK,
        Json(GenerateQuizResponse {
            success: true,
            message: QUIZ_GENERATED_MESSAGE.to_string(),
            quiz,
        }),
    ))
}

pub async fn explain_answer(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ExplainPayload>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(payload) = payload.map_err(|e| Error::BadRequest(e.body_text()))?;
    let request = payload.into_request()?;

    tracing::info!(
        question = %request.question,
        correct_answer = %request.correct_answer,
        user_answer = %request.user_answer,
        "Explanation request"
    );

    let explanation = state
        .quiz_generator
        .generate_explanation(&request)
        .await
        .map_err(|err| {
            tracing::error!(error = %err, "explanation generation failed");
            err
        })?;

    Ok((
        StatusCode::OK,
        Json(ExplainResponse {
            success: true,
            explanation,
        }),
    ))
}
