use crate::error::{Error, Result};
use crate::models::{
    ExplanationRequest, GeneratedQuestion, GeneratedQuiz, QuestionType, QuizConfiguration,
    QuizPayload,
};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value as JsonValue;
use std::time::Duration;

/// The content generator behind the quiz endpoints. Implementations own
/// their retries and timeouts; callers treat every error as final.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuizGenerator: Send + Sync {
    async fn generate_quiz(&self, config: &QuizConfiguration) -> Result<QuizPayload>;

    async fn generate_explanation(&self, request: &ExplanationRequest) -> Result<String>;
}

#[derive(Clone)]
pub struct GeminiService {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl GeminiService {
    pub fn new(
        api_key: String,
        model: String,
        base_url: String,
        timeout: Duration,
        client: Client,
    ) -> Self {
        Self {
            client,
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    async fn generate_content(&self, prompt: String, json_output: bool) -> Result<String> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        let mut generation_config = serde_json::json!({ "temperature": 0.7 });
        if json_output {
            generation_config["responseMimeType"] = JsonValue::from("application/json");
        }
        let payload = serde_json::json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "generationConfig": generation_config,
        });

        let res = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&payload)
            .timeout(self.timeout)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(Error::Generation(format!(
                "Gemini API error {}: {}",
                status, text
            )));
        }

        let body: JsonValue = res.json().await?;
        extract_text(&body)
            .ok_or_else(|| Error::Generation("Invalid Gemini response format".to_string()))
    }
}

#[async_trait]
impl QuizGenerator for GeminiService {
    async fn generate_quiz(&self, config: &QuizConfiguration) -> Result<QuizPayload> {
        tracing::info!(
            topic = %config.topic,
            model = %self.model,
            "requesting quiz from Gemini"
        );
        let text = self.generate_content(quiz_prompt(config), true).await?;
        let raw: JsonValue = serde_json::from_str(strip_code_fences(&text)).map_err(|e| {
            tracing::warn!(error = %e, "Gemini returned unparseable quiz JSON");
            Error::Generation("Generated quiz was not valid JSON".to_string())
        })?;

        let quiz = build_quiz(config, &raw)?;
        tracing::info!(questions = quiz.questions.len(), "quiz generated");
        Ok(QuizPayload::try_from(&quiz)?)
    }

    async fn generate_explanation(&self, request: &ExplanationRequest) -> Result<String> {
        let text = self.generate_content(explanation_prompt(request), false).await?;
        let explanation = text.trim();
        if explanation.is_empty() {
            return Err(Error::Generation("Empty explanation returned".to_string()));
        }
        Ok(explanation.to_string())
    }
}

fn quiz_prompt(config: &QuizConfiguration) -> String {
    let format_rules = match config.question_type {
        QuestionType::MultipleChoice => {
            "Each question must have exactly 4 distinct options and \"correctAnswer\" must be the exact text of one option."
        }
        QuestionType::TrueFalse => {
            "Each question is a statement; \"options\" must be [\"True\", \"False\"] and \"correctAnswer\" must be \"True\" or \"False\"."
        }
    };

    format!(
        r#"You are an expert quiz author.
Create a {difficulty} quiz about "{topic}" with exactly {count} {kind} questions.
The quiz will be taken with a total time limit of {seconds} seconds, so questions must be answerable in about {per_question} seconds each.
{format_rules}
Include a short "explanation" for every question.
Respond with JSON only, in this shape:
{{"title": "string", "questions": [{{"question": "string", "options": ["string"], "correctAnswer": "string", "explanation": "string"}}]}}"#,
        difficulty = config.difficulty,
        topic = config.topic,
        count = config.number_of_questions,
        kind = config.question_type.label(),
        seconds = config.total_time,
        per_question = crate::utils::timing::seconds_per_question(
            config.total_time,
            config.number_of_questions
        ),
        format_rules = format_rules,
    )
}

fn explanation_prompt(request: &ExplanationRequest) -> String {
    format!(
        "A student answered a quiz question incorrectly.\n\
         Question: {}\n\
         Correct answer: {}\n\
         Student's answer: {}\n\
         In 2-4 friendly sentences, explain why the correct answer is right and why the student's answer is not. Respond with plain text only.",
        request.question, request.correct_answer, request.user_answer
    )
}

fn extract_text(body: &JsonValue) -> Option<String> {
    let parts = body
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .as_array()?;
    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
        .collect();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

/// Turns the model's JSON into a [`GeneratedQuiz`], dropping questions that
/// do not fit the requested format.
pub fn build_quiz(config: &QuizConfiguration, raw: &JsonValue) -> Result<GeneratedQuiz> {
    let items = raw
        .get("questions")
        .and_then(|q| q.as_array())
        .or_else(|| raw.as_array())
        .cloned()
        .unwrap_or_default();

    let questions: Vec<GeneratedQuestion> = items
        .iter()
        .filter_map(|item| sanitize_question(item, config.question_type))
        .take(config.number_of_questions as usize)
        .enumerate()
        .map(|(idx, mut q)| {
            q.id = idx as u32 + 1;
            q
        })
        .collect();

    if questions.is_empty() {
        return Err(Error::Generation(
            "Generated quiz contained no usable questions".to_string(),
        ));
    }
    if questions.len() < config.number_of_questions as usize {
        tracing::warn!(
            requested = config.number_of_questions,
            usable = questions.len(),
            "generator returned fewer usable questions than requested"
        );
    }

    let title = raw
        .get("title")
        .and_then(|t| t.as_str())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .unwrap_or_else(|| format!("{} Quiz", config.topic));

    Ok(GeneratedQuiz {
        title,
        topic: config.topic.clone(),
        difficulty: config.difficulty,
        question_type: config.question_type,
        number_of_questions: questions.len() as u32,
        total_time: config.total_time,
        questions,
    })
}

fn sanitize_question(val: &JsonValue, question_type: QuestionType) -> Option<GeneratedQuestion> {
    let question = val
        .get("question")
        .and_then(|q| q.as_str())
        .map(str::trim)
        .filter(|q| !q.is_empty())?
        .to_string();
    let answer = val
        .get("correctAnswer")
        .or_else(|| val.get("correct_answer"))
        .and_then(answer_text)?;
    let explanation = val
        .get("explanation")
        .and_then(|e| e.as_str())
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(String::from);

    let (options, correct_answer) = match question_type {
        QuestionType::MultipleChoice => {
            let mut options: Vec<String> = Vec::new();
            for option in val.get("options")?.as_array()? {
                let text = option.as_str().map(str::trim).unwrap_or_default();
                if !text.is_empty() && !options.iter().any(|o| o == text) {
                    options.push(text.to_string());
                }
            }
            if options.len() < 2 {
                return None;
            }
            let correct = options.iter().find(|o| **o == answer)?.clone();
            (options, correct)
        }
        QuestionType::TrueFalse => {
            let correct = match answer.to_ascii_lowercase().as_str() {
                "true" => "True",
                "false" => "False",
                _ => return None,
            };
            (
                vec!["True".to_string(), "False".to_string()],
                correct.to_string(),
            )
        }
    };

    Some(GeneratedQuestion {
        id: 0,
        question,
        options,
        correct_answer,
        explanation,
    })
}

fn answer_text(val: &JsonValue) -> Option<String> {
    match val {
        JsonValue::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        JsonValue::Bool(b) => Some(if *b { "True" } else { "False" }.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Difficulty;
    use serde_json::json;

    fn config(question_type: QuestionType, n: u32) -> QuizConfiguration {
        QuizConfiguration {
            topic: "Astronomy".into(),
            difficulty: Difficulty::Medium,
            question_type,
            number_of_questions: n,
            total_time: 600,
        }
    }

    #[test]
    fn keeps_well_formed_multiple_choice_questions() {
        let raw = json!({
            "title": "Stars and Planets",
            "questions": [
                {
                    "question": "Which planet is largest?",
                    "options": ["Mars", "Jupiter", "Venus", "Mercury"],
                    "correctAnswer": "Jupiter",
                    "explanation": "Jupiter is the largest planet."
                },
                {
                    "question": "Answer not among options",
                    "options": ["A", "B"],
                    "correctAnswer": "C"
                },
                {
                    "question": "Too few options",
                    "options": ["Only", "Only"],
                    "correctAnswer": "Only"
                }
            ]
        });
        let quiz = build_quiz(&config(QuestionType::MultipleChoice, 5), &raw).unwrap();
        assert_eq!(quiz.title, "Stars and Planets");
        assert_eq!(quiz.questions.len(), 1);
        assert_eq!(quiz.number_of_questions, 1);
        assert_eq!(quiz.questions[0].id, 1);
        assert_eq!(quiz.questions[0].correct_answer, "Jupiter");
        assert_eq!(quiz.total_time, 600);
    }

    #[test]
    fn normalizes_true_false_answers() {
        let raw = json!([
            { "question": "The Sun is a star.", "options": ["yes", "no"], "correctAnswer": "true" },
            { "question": "The Moon is a planet.", "correctAnswer": false },
            { "question": "Maybe?", "correctAnswer": "perhaps" }
        ]);
        let quiz = build_quiz(&config(QuestionType::TrueFalse, 5), &raw).unwrap();
        assert_eq!(quiz.questions.len(), 2);
        assert_eq!(quiz.questions[0].options, vec!["True", "False"]);
        assert_eq!(quiz.questions[0].correct_answer, "True");
        assert_eq!(quiz.questions[1].correct_answer, "False");
        assert_eq!(quiz.title, "Astronomy Quiz");
    }

    #[test]
    fn truncates_to_requested_count() {
        let questions: Vec<JsonValue> = (0..6)
            .map(|i| json!({ "question": format!("Q{}", i), "correctAnswer": "True" }))
            .collect();
        let raw = json!({ "questions": questions });
        let quiz = build_quiz(&config(QuestionType::TrueFalse, 3), &raw).unwrap();
        assert_eq!(quiz.questions.len(), 3);
        assert_eq!(quiz.questions[2].id, 3);
    }

    #[test]
    fn no_usable_questions_is_an_error() {
        let err = build_quiz(&config(QuestionType::MultipleChoice, 3), &json!({})).unwrap_err();
        assert!(matches!(err, Error::Generation(_)));
    }

    #[test]
    fn strips_markdown_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("  {\"a\":1} "), "{\"a\":1}");
    }

    #[test]
    fn extracts_candidate_text() {
        let body = json!({
            "candidates": [{ "content": { "parts": [{ "text": "Hello " }, { "text": "world" }] } }]
        });
        assert_eq!(extract_text(&body).as_deref(), Some("Hello world"));
        assert_eq!(extract_text(&json!({ "candidates": [] })), None);
    }

    #[test]
    fn prompt_mentions_configuration() {
        let prompt = quiz_prompt(&config(QuestionType::TrueFalse, 4));
        assert!(prompt.contains("\"Astronomy\""));
        assert!(prompt.contains("exactly 4 True/False questions"));
        assert!(prompt.contains("about 150 seconds each"));
    }
}
