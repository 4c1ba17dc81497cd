//! Quiz configuration validation.
//!
//! [`validate`] is the single check suite run by the configuration form before
//! submitting and by the generate handler before calling the generator. The
//! checks run in a fixed order and the first failure wins, so the same input
//! always produces the same message.

use crate::models::{Difficulty, QuestionType, QuizConfiguration};
use crate::utils::timing::{minutes_rounded_up, QuizPolicy};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing required fields: {0}")]
    MissingField(&'static str),

    #[error("Topic must be at least {min_length} characters long")]
    TopicTooShort { min_length: usize },

    #[error("Invalid difficulty. Must be one of: easy, medium, hard")]
    InvalidDifficulty,

    #[error("Invalid question type. Must be one of: mcq, true-false")]
    InvalidQuestionType,

    #[error("Number of questions must be between {min} and {max}")]
    QuestionCountOutOfRange { min: u32, max: u32 },

    #[error(
        "Total time must be at least {} minutes for this configuration",
        whole_minutes(.min_required)
    )]
    TotalTimeTooLow { min_required: u32 },

    #[error("Total time cannot exceed {} minutes", whole_minutes(.max_allowed))]
    TotalTimeTooHigh { max_allowed: u32 },
}

fn whole_minutes(seconds: &u32) -> u32 {
    minutes_rounded_up(*seconds)
}

impl ValidationError {
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::MissingField(_) => "MISSING_FIELD",
            ValidationError::TopicTooShort { .. } => "TOPIC_TOO_SHORT",
            ValidationError::InvalidDifficulty => "INVALID_DIFFICULTY",
            ValidationError::InvalidQuestionType => "INVALID_QUESTION_TYPE",
            ValidationError::QuestionCountOutOfRange { .. } => "QUESTION_COUNT_OUT_OF_RANGE",
            ValidationError::TotalTimeTooLow { .. } => "TOTAL_TIME_TOO_LOW",
            ValidationError::TotalTimeTooHigh { .. } => "TOTAL_TIME_TOO_HIGH",
        }
    }
}

/// A configuration as it arrives from an untyped boundary. Numbers are kept as
/// `f64` so fractional, negative and unparseable (`NaN`) values reach the
/// checks instead of failing deserialization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigInput {
    pub topic: Option<String>,
    pub difficulty: Option<String>,
    pub question_type: Option<String>,
    pub number_of_questions: Option<f64>,
    pub total_time: Option<f64>,
}

impl From<&QuizConfiguration> for ConfigInput {
    fn from(config: &QuizConfiguration) -> Self {
        Self {
            topic: Some(config.topic.clone()),
            difficulty: Some(config.difficulty.as_str().to_string()),
            question_type: Some(config.question_type.as_str().to_string()),
            number_of_questions: Some(f64::from(config.number_of_questions)),
            total_time: Some(f64::from(config.total_time)),
        }
    }
}

impl ConfigInput {
    /// Minimum total time for this input as sent, before any check has run.
    /// `None` when the question count is not a usable whole number.
    pub fn suggested_minimum_seconds(&self, policy: &QuizPolicy) -> Option<u32> {
        let n = self
            .number_of_questions
            .filter(|n| n.fract() == 0.0 && *n >= 0.0 && *n <= f64::from(u32::MAX))?;
        Some(policy.suggested_minimum_seconds_raw(
            self.difficulty.as_deref().unwrap_or_default(),
            self.question_type.as_deref().unwrap_or_default(),
            n as u32,
        ))
    }
}

pub fn validate(
    input: &ConfigInput,
    policy: &QuizPolicy,
) -> Result<QuizConfiguration, ValidationError> {
    let topic = input
        .topic
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(ValidationError::MissingField("topic"))?;

    if topic.chars().count() < policy.min_topic_length {
        return Err(ValidationError::TopicTooShort {
            min_length: policy.min_topic_length,
        });
    }

    let difficulty: Difficulty = input
        .difficulty
        .as_deref()
        .and_then(|d| d.parse().ok())
        .ok_or(ValidationError::InvalidDifficulty)?;

    let question_type: QuestionType = input
        .question_type
        .as_deref()
        .and_then(|q| q.parse().ok())
        .ok_or(ValidationError::InvalidQuestionType)?;

    let number_of_questions = input
        .number_of_questions
        .and_then(|n| whole_number_in(n, policy.min_questions, policy.max_questions))
        .ok_or(ValidationError::QuestionCountOutOfRange {
            min: policy.min_questions,
            max: policy.max_questions,
        })?;

    let min_required =
        policy.suggested_minimum_seconds(difficulty, question_type, number_of_questions);

    let total_time = match input.total_time {
        None => min_required,
        Some(raw) => {
            // Integer part only, the way a form field or query string is read.
            let seconds = raw.trunc();
            if seconds.is_nan() || seconds < f64::from(min_required) {
                return Err(ValidationError::TotalTimeTooLow { min_required });
            }
            // Saturates, so anything huge still trips the ceiling below.
            seconds as u32
        }
    };

    if total_time > policy.max_total_seconds {
        return Err(ValidationError::TotalTimeTooHigh {
            max_allowed: policy.max_total_seconds,
        });
    }

    Ok(QuizConfiguration {
        topic: topic.to_string(),
        difficulty,
        question_type,
        number_of_questions,
        total_time,
    })
}

fn whole_number_in(value: f64, min: u32, max: u32) -> Option<u32> {
    if value.fract() != 0.0 || value < f64::from(min) || value > f64::from(max) {
        return None;
    }
    Some(value as u32)
}
